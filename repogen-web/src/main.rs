//! Repogen Web Server
//!
//! HTTP service that turns a Git repository URL into README, requirements.txt,
//! documentation and .gitignore artifacts.

use clap::Parser;
use repogen_core::{init_logging, RepogenConfig};
use repogen_web::{apply_env_overrides, RepogenServerBuilder};
use std::path::PathBuf;

/// Repogen Web Server - repository artifact generation over HTTP
#[derive(Parser)]
#[command(name = "repogen-web")]
#[command(about = "HTTP service for repogen")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides config and REPOGEN_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides config and REPOGEN_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = match RepogenConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    apply_env_overrides(&mut config);
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.filter_directives = ["repogen_core", "repogen_repo", "repogen_artifacts"]
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect();
        config.logging.level = level;
    }
    let web_directive = format!("repogen_web={}", config.logging.level);
    config.logging.filter_directives.push(web_directive);
    config
        .logging
        .filter_directives
        .push("tower_http=debug".to_string());

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("⚠️  Failed to initialize logging: {}", e);
    }

    println!("🚀 Starting repogen web server");
    println!("📍 Server: http://{}:{}", config.server.host, config.server.port);
    println!("📁 Clone directory: {}", config.repository.clone_base_dir);

    let server = match RepogenServerBuilder::new().config(config).build() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed: {}", e);
        std::process::exit(1);
    }

    println!("✅ Server shut down gracefully");
}
