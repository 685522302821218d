//! Cardsort - card sorting study results
//!
//! A CLI tool that aggregates participant submissions for a card sorting
//! session and writes placement and co-occurrence reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing file, parse failure, invalid session, etc.)
//!   2 - Fewer submissions than --min-participants

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use std::time::Instant;
use store::{FileSubmissionSource, SubmissionSource};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging so that `[general] verbose` can raise the level
    let loaded = load_config(&args);
    let config_verbose = matches!(&loaded, Ok((config, _)) if config.general.verbose);
    init_logging(args.log_level(config_verbose));

    info!("cardsort v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = loaded.and_then(|(config, origin)| {
        origin.log();
        run(args, config)
    });

    match result {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .cardsort.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the similarity mode, thresholds and report options.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load inputs, aggregate and write the report. Returns exit code (0 or 2).
fn run(args: Args, mut config: Config) -> Result<i32> {
    let start_time = Instant::now();
    let chatty = !args.quiet && !args.stdout;

    config.merge_with_args(&args);

    // validate() guarantees both are present unless --init-config
    let session_path = args
        .session
        .clone()
        .context("Missing --session argument")?;
    let submissions_path = args
        .submissions
        .clone()
        .context("Missing --submissions argument")?;

    // Step 1: Load the session definition
    let session = store::load_session(&session_path)?;
    if chatty {
        println!(
            "📋 Session: {} ({} sort, {})",
            display_title(&session),
            session.session_type,
            session.status
        );
        println!(
            "   Cards: {} | Predefined categories: {}",
            session.cards.len(),
            session.categories.len()
        );
    }

    // Step 2: Load the submissions snapshot
    let source = FileSubmissionSource::new(submissions_path, chatty);
    let submissions = source.load(&session.id)?;
    info!("Loaded {} submissions", submissions.len());

    if submissions.is_empty() {
        warn!("No submissions found for session '{}'", session.id);
    }

    if args.dry_run {
        println!("\n🔍 Dry run: inputs are valid.");
        println!("   Submissions: {}", submissions.len());
        println!("\n✅ Dry run complete. No report was written.");
        return Ok(0);
    }

    // Step 3: Aggregate
    let analysis = analysis::analyze_session(
        &session,
        &submissions,
        config.analysis.similarity_mode,
        config.analysis.strong_threshold,
    );
    debug!(
        "Aggregated {} categories and {} related pairs",
        analysis.categories.len(),
        analysis.similarities.len()
    );

    let restricted =
        !session.session_type.allows_custom_categories() || !session.allow_new_categories;
    if restricted && !analysis.custom_categories.is_empty() {
        warn!(
            "Session does not allow new categories, but submissions used {} undefined ones",
            analysis.custom_categories.len()
        );
    }

    let report = report::build_report(&session, analysis, &config.analysis);

    // Step 4: Render and write
    let output_path = PathBuf::from(&config.general.output);
    let format = args.effective_format(&output_path);

    let output = match format {
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Csv => report::generate_csv_report(&report),
        OutputFormat::Html => report::generate_html_report(&report),
    };

    if args.stdout {
        print!("{}", output);
    } else {
        std::fs::write(&output_path, &output)
            .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
    }

    let duration = start_time.elapsed().as_secs_f64();

    if chatty {
        println!("\n📊 Results Summary:");
        println!("   Participants: {}", report.summary.participants);
        println!(
            "   Categories: {} ({} custom)",
            report.summary.categories, report.summary.custom_categories
        );
        println!(
            "   Related pairs: {} | Strong (> {:.0}%): {}",
            report.summary.related_pairs,
            report.metadata.strong_threshold,
            report.summary.strong_pairs
        );
        println!("   Duration: {:.2}s", duration);
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if let Some(min) = args.min_participants {
        if report.summary.participants < min {
            eprintln!(
                "\n⛔ Only {} submissions, fewer than the required {}. Failing (exit code 2).",
                report.summary.participants, min
            );
            return Ok(2);
        }
    }

    Ok(0)
}

fn display_title(session: &models::Session) -> &str {
    if session.title.is_empty() {
        &session.id
    } else {
        &session.title
    }
}

/// Where the configuration came from, reported once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    DefaultFileFailed(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::DefaultFileFailed(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so nothing is logged here.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::DefaultFileFailed(e))),
    }
}
