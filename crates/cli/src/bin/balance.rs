use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use emr_controller::config::load_engine_configs;
use emr_controller::controller::{ControlMode, ResourceAmount};
use emr_controller::engine;
use emr_controller::export;
use env_logger::{Builder, Env};
use log::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Closed-loop mixture ratio that empties every tank together"
)]
struct Cli {
    /// Engine catalog: TOML file, directory of TOML files, or YAML list
    #[arg(long, default_value = "configs/engines")]
    engines: PathBuf,

    /// Engine name (case-insensitive, defaults to first in catalog)
    #[arg(long)]
    engine: Option<String>,

    /// Configuration name (defaults to the first calibrated configuration)
    #[arg(long)]
    config: Option<String>,

    /// Remaining propellant as RESOURCE_ID=AMOUNT (repeatable)
    #[arg(long = "remaining", value_parser = parse_remaining, required = true)]
    remaining: Vec<(i32, f64)>,

    /// Boiloff reserve percent; positive burns fuel-rich, negative burns oxidizer-rich
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    reserve: f64,

    /// Write the controller status as JSON ('-' for stdout)
    #[arg(long)]
    json: Option<PathBuf>,
}

fn parse_remaining(raw: &str) -> Result<(i32, f64), String> {
    let (id, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected RESOURCE_ID=AMOUNT, got '{raw}'"))?;
    let id = id
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("invalid resource id '{id}': {err}"))?;
    let amount = amount
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid amount '{amount}': {err}"))?;
    if amount < 0.0 {
        return Err(format!("amount for resource {id} must be non-negative"));
    }
    Ok((id, amount))
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let catalog = load_engine_configs(&cli.engines)
        .with_context(|| format!("loading engines from {}", cli.engines.display()))?;
    let engine_cfg = engine::select(&catalog, cli.engine.as_deref())?;
    let (mut controller, mut state) = engine::controller_for(engine_cfg, cli.config.as_deref())?;

    let telemetry: BTreeMap<i32, ResourceAmount> = cli
        .remaining
        .iter()
        .map(|&(id, amount)| {
            (
                id,
                ResourceAmount {
                    amount,
                    capacity: amount,
                },
            )
        })
        .collect();

    controller.set_reserve_percent(cli.reserve);
    controller.set_mode(ControlMode::ClosedLoop);
    match controller.update_closed_loop(&mut state, &telemetry)? {
        Some(applied) => info!("closed loop settled at {:.3}:1", applied.emr),
        None => info!("closed loop made no change"),
    }

    let status = controller.status(&telemetry);
    println!(
        "Engine: {}  configuration: '{}'",
        engine_cfg.name, status.config_name
    );
    println!("Optimal ratio: {}", status.optimal_text);
    println!("Reserve setting: {}", status.reserve_setting_text);
    println!("Expected leftovers: {}", status.reserve_text);
    if let Some(emr) = controller.last_applied_emr() {
        println!("Applied ratio: {emr:.3}:1");
        println!("Propellant ratios:");
        for channel in &state.channels {
            println!("  {:<16} {:.4}", channel.name, channel.ratio);
        }
    }

    if let Some(path) = cli.json.as_deref() {
        export::snapshot::write_json(path, &status)
            .with_context(|| format!("writing status to {}", path.display()))?;
    }

    Ok(())
}
