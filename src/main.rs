mod demo;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use waypoint::config::{self, Config};
use waypoint::logging;

use crate::demo::Scenario;

#[derive(Parser)]
#[command(
    name = "waypoint",
    version,
    about = "Drive a scripted navigation scenario and print the resulting stack"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(value_enum, default_value_t = Scenario::Push)]
    scenario: Scenario,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    logging::init_tracing(&config.logging);
    config::install(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build tokio runtime")?;
    let local = tokio::task::LocalSet::new();
    let report = local.block_on(&runtime, demo::run(cli.scenario));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
