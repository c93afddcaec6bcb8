use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use emr_controller::config::{load_engine_configs, load_mixture_configs};
use emr_controller::controller::ControlMode;
use emr_controller::controller::display::describe_record;
use emr_controller::engine;
use emr_controller::export;
use env_logger::{Builder, Env};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Interpolate an engine's calibration at a chosen mixture ratio"
)]
struct Cli {
    /// Engine catalog: TOML file, directory of TOML files, or YAML list
    #[arg(long, default_value = "configs/engines")]
    engines: PathBuf,

    /// Engine name (case-insensitive, defaults to first in catalog)
    #[arg(long)]
    engine: Option<String>,

    /// Mixture calibration file (YAML list or TOML `mixture` array) replacing the engine's own
    #[arg(long)]
    mixtures: Option<PathBuf>,

    /// Configuration name (defaults to the first calibrated configuration)
    #[arg(long)]
    config: Option<String>,

    /// Starting mixture ratio (defaults to the highest calibrated ratio)
    #[arg(long)]
    ratio: Option<f64>,

    /// Final mixture ratio for the propellant blend (defaults to --ratio)
    #[arg(long)]
    final_ratio: Option<f64>,

    /// Share of the burn spent at the final ratio, percent
    #[arg(long, default_value_t = 0.0)]
    blend: f64,

    /// Boiloff reserve percent; positive burns fuel-rich, negative burns oxidizer-rich
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    reserve: f64,

    /// Write the sampled ISP curve as CSV ('-' for stdout)
    #[arg(long)]
    curve_out: Option<PathBuf>,

    /// Number of pressure samples written by --curve-out
    #[arg(long, default_value_t = 11)]
    samples: usize,

    /// Print the engine's compact serialized calibration
    #[arg(long, default_value_t = false)]
    serialize: bool,
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let catalog = load_engine_configs(&cli.engines)
        .with_context(|| format!("loading engines from {}", cli.engines.display()))?;
    let mut engine_cfg = engine::select(&catalog, cli.engine.as_deref())?.clone();
    if let Some(path) = cli.mixtures.as_deref() {
        engine_cfg.mixtures = load_mixture_configs(path)
            .with_context(|| format!("loading mixtures from {}", path.display()))?;
    }
    let (mut controller, mut state) = engine::controller_for(&engine_cfg, cli.config.as_deref())?;

    let Some((min, max)) = controller.active_pair().range() else {
        anyhow::bail!(
            "engine '{}' has no mixture calibration named '{}'",
            engine_cfg.name,
            controller.config_name()
        );
    };

    if let Some(ratio) = cli.ratio {
        controller.set_starting_emr(ratio);
        controller.set_final_emr(cli.final_ratio.unwrap_or(ratio));
    } else if let Some(final_ratio) = cli.final_ratio {
        controller.set_final_emr(final_ratio);
    }
    controller.set_blend_percent(cli.blend);
    controller.set_reserve_percent(cli.reserve);
    controller.set_mode(ControlMode::Editing);

    let applied = controller
        .apply(&mut state)?
        .context("controller did not apply a mixture")?;
    let inputs = controller.inputs();

    println!(
        "Engine: {}  configuration: '{}'",
        engine_cfg.name,
        controller.config_name()
    );
    println!("Calibrated range: {min:.2}:1 - {max:.2}:1");
    println!(
        "Mixture {:.2}:1  {}",
        applied.emr,
        describe_record(&applied.record)
    );
    println!(
        "Thrust bounds: {:.1} - {:.1} kN",
        state.min_thrust, state.max_thrust
    );
    if inputs.final_emr != inputs.starting_emr || inputs.reserve_percent != 0.0 {
        println!(
            "Blend: {:.0}% at {:.2}:1, reserve {:+.1}%",
            inputs.blend_percent, inputs.final_emr, inputs.reserve_percent
        );
    }
    println!("Propellant ratios:");
    for channel in &state.channels {
        println!("  {:<16} {:.4}", channel.name, channel.ratio);
    }

    if let Some(path) = cli.curve_out.as_deref() {
        export::curve::export(path, &applied.record.curve, cli.samples)
            .with_context(|| format!("writing curve to {}", path.display()))?;
    }

    if cli.serialize {
        println!("{}", controller.store().serialized());
    }

    Ok(())
}
