//! Riskscope entrypoint: serves the analysis routes, or runs a single
//! analysis and prints the JSON document.

use clap::{Parser, Subcommand};
use riskscope::{
    config::ServiceConfig,
    logging::StructuredLogger,
    server,
    views::View,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "riskscope")]
#[command(about = "Anomaly, cluster and risk analysis over activity records", long_about = None)]
struct Args {
    /// JSON config file (defaults to $RISKSCOPE_CONFIG_PATH, then config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record source (.csv, .json, .ndjson); overrides the config file
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Listen address; overrides the config file
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Print the dashboard document once
    Dashboard,
    /// Print the user activity document once
    Useractivity,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var("RISKSCOPE_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = ServiceConfig::load(&config_path);
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    StructuredLogger::init(config.log.json, &config.log.level);
    config.analysis.validate()?;
    info!(config = %config_path.display(), data = %config.data_path.display(), "riskscope starting");

    let view = match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            server::serve(config).await?;
            info!("riskscope stopping");
            return Ok(());
        }
        Command::Dashboard => View::Dashboard,
        Command::Useractivity => View::UserActivity,
    };

    // one-shot: same path the routes use
    let doc = server::render_view(Arc::new(config), view).await?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
