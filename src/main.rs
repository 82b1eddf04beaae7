use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

use detective::config::{ConfigBuilder, DetectiveConfig, ENV_PREFIX, LogLevel};
use detective::plugins;
use detective::prelude::*;
use detective::util::logging;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "detective", version, about = "Collect metrics from every plugin once and print them as JSON")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// List the enabled plugins and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = ConfigBuilder::<DetectiveConfig>::new().use_defaults();
    if let Some(path) = &args.config {
        if !path.exists() {
            bail!("Configuration file not found: {}", path.display());
        }
        builder = builder.add_file(path);
    }
    let mut config = builder
        .add_env(ENV_PREFIX)
        .build()
        .context("Failed to load configuration")?;

    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    logging::init(&config.log_level);
    debug!("Running with configuration: {:?}", config);

    let registry = Arc::new(PluginRegistry::new());
    plugins::register_builtin(&registry, &config.plugins.enabled)?;

    if args.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    info!("detective {} collecting from {} plugin(s)", detective::VERSION, registry.len());

    let collection = Detective::with_config(registry, config.collection.clone())
        .collect_all_metrics()
        .await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&collection)?
    } else {
        serde_json::to_string(&collection)?
    };
    println!("{}", output);

    Ok(())
}
