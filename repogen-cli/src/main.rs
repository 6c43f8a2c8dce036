//! Repogen CLI - Command-line interface for repogen
//!
//! Generates README, requirements.txt, documentation and .gitignore for a
//! repository URL or a local checkout.

use anyhow::Context;
use clap::{Parser, Subcommand};
use repogen_artifacts::{AnalysisPipeline, AnalysisReport};
use repogen_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ErrorContext,
    LoggingConfig, RepogenConfig, RepogenError, RepogenResult,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "repogen")]
#[command(about = "Generate README, requirements.txt, docs and .gitignore for a repository")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository and generate its artifacts
    Analyze {
        /// Repository URL or local path
        repo: String,

        /// Write the artifacts into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,

        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,

        /// Print the configuration file location
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A broken config file is reported by the command that needs it
    let loaded = RepogenConfig::load(cli.config.as_deref());
    let logging_config = cli_logging(
        loaded.as_ref().map(|c| c.logging.clone()).unwrap_or_default(),
        cli.verbose,
    );

    init_logging(&logging_config).map_err(|e| RepogenError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check logging configuration"),
    })?;

    info!("Starting repogen CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze { repo, output, json } => {
            let config = loaded?;
            config.validate()?;
            handle_analyze(&repo, output.as_deref(), json, &config).await?;
        }
        Commands::Config {
            init,
            force,
            show,
            validate,
            path,
        } => {
            handle_config(cli.config.as_deref(), init, force, show, validate, path)?;
        }
    }

    Ok(())
}

/// Configured logging, with console output moved to stderr so stdout stays clean for --json
fn cli_logging(mut config: LoggingConfig, verbose: bool) -> LoggingConfig {
    config.use_stderr = true;
    if verbose {
        config.level = "debug".to_string();
        config.filter_directives.clear();
    }
    config
}

async fn handle_analyze(
    repo: &str,
    output: Option<&Path>,
    json: bool,
    config: &RepogenConfig,
) -> RepogenResult<()> {
    log_operation_start!("analyze", repo = %repo);

    let pipeline = AnalysisPipeline::new(config);
    let report = match pipeline.analyze(repo, true).await {
        Ok(report) => report,
        Err(e) => {
            log_operation_error!("analyze", e, repo = %repo);
            return Err(e);
        }
    };

    let written = match output {
        Some(dir) => report.write_to(dir).await?,
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
        for path in &written {
            println!("📝 Wrote {}", path.display());
        }
    }

    log_operation_success!("analyze", health = report.analytics.health.score);
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let analytics = &report.analytics;

    println!("✅ {}", report.message);
    println!("📁 Working copy: {}", report.repo_path);
    println!(
        "🌳 {} files, {} folders, depth {}",
        analytics.tree.files, analytics.tree.folders, analytics.tree.max_depth
    );
    if analytics.languages.is_empty() {
        println!("🔤 Languages: Unknown");
    } else {
        println!("🔤 Languages: {}", analytics.languages.join(", "));
    }
    println!("💯 Health score: {}/100", analytics.health.score);
    for check in analytics.health.failed() {
        println!("   ❌ {} (-{})", check.name, check.weight);
    }
    println!();
    println!("{}", report.artifacts.readme);
}

fn handle_config(
    explicit: Option<&Path>,
    init: bool,
    force: bool,
    show: bool,
    validate: bool,
    path: bool,
) -> anyhow::Result<()> {
    if init {
        let config_path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(RepogenConfig::user_config_path);
        if config_path.exists() && !force {
            anyhow::bail!(
                "{} already exists, pass --force to overwrite it",
                config_path.display()
            );
        }
        RepogenConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {}", config_path.display());
    }

    if path {
        match explicit
            .map(Path::to_path_buf)
            .or_else(|| RepogenConfig::default_locations().into_iter().find(|p| p.exists()))
        {
            Some(found) => println!("{}", found.display()),
            None => println!(
                "No configuration file found; `config --init` writes {}",
                RepogenConfig::user_config_path().display()
            ),
        }
    }

    if show {
        let config = RepogenConfig::load(explicit)?;
        let rendered =
            toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        let config = RepogenConfig::load(explicit)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
