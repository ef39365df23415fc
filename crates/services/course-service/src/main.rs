//! Course Service - command-line entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_service_lib::{cli::commands, cli::Cli, config::CourseServiceConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CourseServiceConfig::from_env();

    init_tracing(cli.verbose, &config.service.log_level);
    tracing::debug!("Configuration loaded: {:?}", config);

    if let Err(e) = commands::execute(cli.command, config).await {
        // A missing record is a caller mistake, not a service fault
        if e.is_not_found() {
            tracing::warn!("Command failed: {}", e);
        } else {
            tracing::error!("Command failed: {}", e);
        }
        eprintln!("{}: {}", e.code(), e.user_message());
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber (verbose mode forces debug level)
fn init_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
