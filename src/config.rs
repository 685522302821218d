//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cardsort.toml` files.

use crate::models::SimilarityMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".cardsort.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "cardsort_report.md".to_string()
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How card co-occurrence is counted.
    #[serde(default)]
    pub similarity_mode: SimilarityMode,

    /// Similarity percentage above which a pair counts as strongly related.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_mode: SimilarityMode::default(),
            strong_threshold: default_strong_threshold(),
        }
    }
}

fn default_strong_threshold() -> f64 {
    50.0
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// List cards nobody placed in a category.
    #[serde(default)]
    pub include_zero_counts: bool,

    /// Maximum co-occurrence rows in the report (0 = all).
    #[serde(default = "default_max_similarities")]
    pub max_similarities: usize,

    /// Include the list of participant-created categories.
    #[serde(default = "default_true")]
    pub include_custom_categories: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_zero_counts: false,
            max_similarities: default_max_similarities(),
            include_custom_categories: true,
        }
    }
}

fn default_max_similarities() -> usize {
    25
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.cardsort.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(mode) = args.similarity {
            self.analysis.similarity_mode = mode;
        }

        if let Some(threshold) = args.strong_threshold {
            self.analysis.strong_threshold = threshold;
        }

        if let Some(max) = args.max_similarities {
            self.report.max_similarities = max;
        }

        if args.include_zero_counts {
            self.report.include_zero_counts = true;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "cardsort_report.md");
        assert_eq!(config.analysis.similarity_mode, SimilarityMode::Approximate);
        assert_eq!(config.analysis.strong_threshold, 50.0);
        assert_eq!(config.report.max_similarities, 25);
        assert!(config.report.include_custom_categories);
        assert!(!config.report.include_zero_counts);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "results.html"
verbose = true

[analysis]
similarity_mode = "exact"
strong_threshold = 70.0

[report]
max_similarities = 0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "results.html");
        assert!(config.general.verbose);
        assert_eq!(config.analysis.similarity_mode, SimilarityMode::Exact);
        assert_eq!(config.analysis.strong_threshold, 70.0);
        assert_eq!(config.report.max_similarities, 0);
        assert!(config.report.include_custom_categories);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.analysis.strong_threshold, 50.0);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[analysis]\nstrong_threshold = 80.0\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.analysis.strong_threshold, 80.0);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_fixture_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/cardsort.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.general.output, "grocery_results.md");
        assert_eq!(config.analysis.similarity_mode, SimilarityMode::Exact);
        assert_eq!(config.report.max_similarities, 10);
    }

    #[test]
    fn test_merge_only_explicit_args() {
        let mut config: Config = toml::from_str(
            "[analysis]\nsimilarity_mode = \"exact\"\nstrong_threshold = 70.0\n",
        )
        .unwrap();

        let mut args = make_args();
        config.merge_with_args(&args);
        assert_eq!(config.analysis.similarity_mode, SimilarityMode::Exact);
        assert_eq!(config.analysis.strong_threshold, 70.0);
        assert_eq!(config.general.output, "cardsort_report.md");

        args.similarity = Some(SimilarityMode::Approximate);
        args.strong_threshold = Some(40.0);
        args.output = Some(PathBuf::from("out.csv"));
        config.merge_with_args(&args);
        assert_eq!(config.analysis.similarity_mode, SimilarityMode::Approximate);
        assert_eq!(config.analysis.strong_threshold, 40.0);
        assert_eq!(config.general.output, "out.csv");
    }
}
