//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::SimilarityMode;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Cardsort - card sorting study results
///
/// Aggregates participant submissions for a card sorting session into
/// per-category placement statistics and card co-occurrence, then writes
/// a Markdown, JSON, CSV or HTML report.
///
/// Examples:
///   cardsort --session session.json --submissions sorts/
///   cardsort --session session.json --submissions sorts.json --format csv -o results.csv
///   cardsort --session session.json --submissions sorts/ --similarity exact
///   cardsort --session session.json --submissions sorts/ --dry-run
///   cardsort --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Session definition (JSON)
    ///
    /// Holds the session's cards and predefined categories.
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "init_config"
    )]
    pub session: Option<PathBuf>,

    /// Participant submissions: a JSON file or a directory of JSON files
    ///
    /// Each file may hold a single submission or an array of them.
    #[arg(long, value_name = "PATH", required_unless_present = "init_config")]
    pub submissions: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting, or cardsort_report.md.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv, html)
    ///
    /// If omitted, inferred from the output file extension.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cardsort.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// How card co-occurrence is counted
    ///
    /// approximate: sum of min(count) per category (compatible with the web app)
    /// exact: submissions that placed both cards in the same category
    #[arg(long, value_name = "MODE", env = "CARDSORT_SIMILARITY")]
    pub similarity: Option<SimilarityMode>,

    /// Similarity percentage above which a pair is a strong relationship
    #[arg(long, value_name = "PCT")]
    pub strong_threshold: Option<f64>,

    /// Maximum co-occurrence rows in the report (0 = all)
    #[arg(long, value_name = "COUNT")]
    pub max_similarities: Option<usize>,

    /// List cards that were never placed in a category
    #[arg(long)]
    pub include_zero_counts: bool,

    /// Fail if fewer submissions than this were aggregated
    ///
    /// Useful in scripts. Exit code 2 when the minimum is not met.
    #[arg(long, value_name = "COUNT")]
    pub min_participants: Option<usize>,

    /// Load and validate inputs without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Generate a default .cardsort.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Comma-separated values
    Csv,
    /// Standalone HTML page
    Html,
}

impl OutputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "html" | "htm" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(threshold) = self.strong_threshold {
            if !(0.0..=100.0).contains(&threshold) {
                return Err("Strong threshold must be between 0 and 100".to_string());
            }
        }

        if let Some(ref session) = self.session {
            if !session.is_file() {
                return Err(format!("Session file does not exist: {}", session.display()));
            }
        }

        if let Some(ref submissions) = self.submissions {
            if !submissions.exists() {
                return Err(format!(
                    "Submissions path does not exist: {}",
                    submissions.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file.
    /// `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Format to write, given the resolved output path.
    pub fn effective_format(&self, output: &Path) -> OutputFormat {
        self.format
            .or_else(|| OutputFormat::from_path(output))
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            session: None,
            submissions: None,
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            similarity: None,
            strong_threshold: None,
            max_similarities: None,
            include_zero_counts: false,
            min_participants: None,
            dry_run: false,
            stdout: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_threshold_range() {
        let mut args = make_args();
        args.strong_threshold = Some(120.0);
        assert!(args.validate().is_err());

        args.strong_threshold = Some(50.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_inputs() {
        let mut args = make_args();
        args.session = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.submissions = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_effective_format() {
        let mut args = make_args();
        assert_eq!(
            args.effective_format(Path::new("out.csv")),
            OutputFormat::Csv
        );
        assert_eq!(
            args.effective_format(Path::new("out.HTML")),
            OutputFormat::Html
        );
        assert_eq!(
            args.effective_format(Path::new("report")),
            OutputFormat::Markdown
        );

        args.format = Some(OutputFormat::Json);
        assert_eq!(
            args.effective_format(Path::new("out.csv")),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "cardsort",
            "--session",
            "s.json",
            "--submissions",
            "sorts",
            "--similarity",
            "exact",
            "--strong-threshold",
            "65",
        ])
        .unwrap();
        assert_eq!(args.similarity, Some(SimilarityMode::Exact));
        assert_eq!(args.strong_threshold, Some(65.0));

        assert!(Args::try_parse_from(["cardsort", "--session", "s.json"]).is_err());
        assert!(Args::try_parse_from(["cardsort", "--init-config"]).is_ok());
    }
}
