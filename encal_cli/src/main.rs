mod cli;
mod logging;
mod report;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use cli::Args;
use encal_config::Config;
use encal_core::{DriveCfg, Geometry, TickPacing, build_calibrator, runner};
use encal_hardware::{MemoryTable, SimCfg, SimulatedMechanism};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            encal_config::load_toml(&text).wrap_err("parsing config")?
        }
        None => Config::default(),
    };
    cfg.validate()?;

    let _log_guard = logging::init(&cfg.logging)?;

    let geometry = Geometry {
        resolution: cfg.geometry.resolution(),
        steps: cfg.geometry.steps,
        microsteps: cfg.geometry.microsteps,
        read_count: cfg.geometry.read_count,
    };
    let drive = DriveCfg {
        cal_current_ma: cfg.drive.cal_current_ma,
    };
    let sim = SimCfg {
        distortion_amplitude: cfg.sim.distortion_amplitude,
        phase_offset: cfg.sim.phase_offset,
        reverse_polarity: cfg.sim.reverse_polarity || args.reverse,
        noise: cfg.sim.noise,
        seed: args.seed.unwrap_or(cfg.sim.seed),
        backlash_pulses: cfg.sim.backlash_pulses,
        fail_after: None,
    };
    tracing::info!(?geometry, ?sim, "starting calibration against the simulated rig");

    let (sensor, driver) = SimulatedMechanism::split(sim, geometry.resolution, geometry.pulses());
    let table = MemoryTable::new(geometry.resolution as usize);
    let mut calibrator = build_calibrator(sensor, driver, table, geometry, drive)?;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&cancel_flag);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("installing Ctrl-C handler")?;
    }
    let cancel_check = {
        let flag = Arc::clone(&cancel_flag);
        move || flag.load(Ordering::SeqCst)
    };

    let pacing = match args.tick_hz {
        Some(hz) => TickPacing::Paced(hz),
        None => TickPacing::FreeRunning,
    };

    let run_report = runner::run(&mut calibrator, pacing, Some(&cancel_check))
        .wrap_err("calibration run did not complete")?;

    let table_valid = calibrator.table().is_valid();
    if args.json {
        println!("{}", report::json(&run_report, table_valid));
    } else {
        println!("{}", report::human(&run_report, table_valid));
    }

    if !run_report.ok() {
        std::process::exit(1);
    }
    Ok(())
}
