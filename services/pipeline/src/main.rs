//! Climate indicator map pipeline.
//!
//! One run classifies indicator rasters against their palette tables,
//! renders them with boundary overlays, organizes each series by date,
//! composes the maps onto background templates and publishes the
//! finished tree to the remote API.

mod config;
mod run;
mod summary;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(about = "Climate indicator map rendering and publishing pipeline")]
struct Args {
    /// Run configuration file
    #[arg(long, env = "PIPELINE_CONFIG", default_value = "config/pipeline.yaml")]
    config: PathBuf,

    /// Render and compose, but do not upload
    #[arg(long)]
    skip_publish: bool,

    /// Basic auth user for the publish endpoint
    #[arg(long, env = "PUBLISH_USERNAME")]
    publish_username: Option<String>,

    /// Basic auth password for the publish endpoint
    #[arg(long, env = "PUBLISH_PASSWORD", hide_env_values = true)]
    publish_password: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(config = %args.config.display(), "Starting map pipeline");

    let config = PipelineConfig::load(&args.config)?;

    let (username, password) = if args.skip_publish {
        (String::new(), String::new())
    } else {
        match (args.publish_username, args.publish_password) {
            (Some(user), Some(pass)) => (user, pass),
            _ => bail!(
                "Publish credentials required; set PUBLISH_USERNAME and PUBLISH_PASSWORD \
                 or pass --skip-publish"
            ),
        }
    };

    run::run(&config, &username, &password, args.skip_publish).await?;
    Ok(())
}
