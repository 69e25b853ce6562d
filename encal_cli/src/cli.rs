use clap::Parser;
use std::path::PathBuf;

/// Run one encoder-calibration cycle against the simulated rig.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config; built-in defaults apply when absent.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit the final report as a single JSON object on stdout.
    #[arg(long)]
    pub json: bool,

    /// Pace ticks at this rate instead of free-running.
    #[arg(long)]
    pub tick_hz: Option<u32>,

    /// Override the simulated rig's noise seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reverse the simulated sensor polarity.
    #[arg(long)]
    pub reverse: bool,
}
