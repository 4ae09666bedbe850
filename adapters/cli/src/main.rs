#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Boss Room fight and reports
//! what the deception layer did to a scripted player.

mod hooks;
mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use boss_room_core::seconds;
use boss_room_orchestrator::{FightConfig, FightOrchestrator};
use clap::Parser;
use glam::Vec2;
use tracing_subscriber::EnvFilter;

use crate::{hooks::Headless, report::Summary};

/// Extra time simulated after defeat so the exit script can finish.
const EPILOGUE_SECS: f32 = 15.0;

/// Simulates one boss fight against a scripted player.
#[derive(Debug, Parser)]
#[command(name = "boss-room", version, about)]
struct Cli {
    /// TOML file with fight tuning; defaults apply to missing keys.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Damage requested by each player swing.
    #[arg(long, default_value_t = 4.0)]
    hit_damage: f32,
    /// Seconds between player swings.
    #[arg(long, default_value_t = 1.0)]
    hit_interval: f32,
    /// Upper bound on simulated seconds.
    #[arg(long, default_value_t = 480.0)]
    max_seconds: f32,
    /// Prints the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Boss Room command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = match &cli.config {
        Some(path) => FightConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FightConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let headless = Headless::new(Vec2::new(6.0, 0.0));
    let mut orchestrator = FightOrchestrator::from_config(config, headless.collaborators());
    simulate(&cli, &mut orchestrator, &headless);

    let summary = Summary::collect(&orchestrator, &headless.tally());
    if cli.json {
        println!("{}", summary.to_json().context("serializing summary")?);
    } else {
        println!("{}", summary.to_text());
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(cli: &Cli, orchestrator: &mut FightOrchestrator, headless: &Headless) {
    let step = Duration::from_millis(cli.tick_ms);
    let limit = seconds(cli.max_seconds);
    let swing_every = seconds(cli.hit_interval);
    let epilogue = seconds(EPILOGUE_SECS);

    orchestrator.register_markers(3);
    orchestrator.start();

    let mut elapsed = Duration::ZERO;
    let mut since_swing = Duration::ZERO;
    let mut swings: usize = 0;
    let mut defeated_at = None;
    while elapsed < limit {
        orchestrator.tick(step);
        elapsed += step;
        since_swing += step;

        if orchestrator.is_active() && since_swing >= swing_every {
            since_swing = Duration::ZERO;
            if headless.tally().input_enabled {
                swings += 1;
                let _ = orchestrator.request_damage(cli.hit_damage);
                orchestrator.strike_marker(swings % 3);
            }
        }

        if !orchestrator.is_active() {
            let defeated = *defeated_at.get_or_insert(elapsed);
            let finished = orchestrator
                .subsystems()
                .defeat
                .as_ref()
                .map_or(true, |defeat| defeat.is_finished());
            if finished || elapsed >= defeated + epilogue {
                break;
            }
        }
    }
    tracing::info!(
        target: "boss_room::cli",
        swings,
        secs = elapsed.as_secs_f32(),
        "simulation finished"
    );
}
