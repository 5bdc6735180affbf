#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a short castle siege around the bridge.

mod siege;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use siege_bridge_battlefield::{query, BattleConfig, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replays a scripted siege and prints every battlefield event.
#[derive(Debug, Parser)]
#[command(name = "siege-bridge", version)]
struct Cli {
    /// Battle configuration in TOML; defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short)]
    verbose: bool,
}

/// Entry point for the siege bridge command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => BattleConfig::load(path)
            .with_context(|| format!("could not load battle config {}", path.display()))?,
        None => BattleConfig::default(),
    };
    info!(
        initial_position = ?config.bridge.initial_position,
        bypass = ?config.bridge.bypass,
        "battle configured"
    );

    let mut world = World::new(&config);
    println!("{}", query::welcome_banner(&world));
    println!("bridge: {:?}", query::bridge_status(&world));

    for line in siege::replay(&mut world) {
        println!("{line}");
    }

    println!("bridge: {:?}", query::bridge_status(&world));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
