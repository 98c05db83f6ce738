use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

pub(crate) const SPEED_MIN: f32 = 0.001;
pub(crate) const SPEED_MAX: f32 = 0.1;
pub(crate) const SPEED_STEP: f32 = 0.005;

pub(crate) const DENSITY_MIN: usize = 10;
pub(crate) const DENSITY_MAX: usize = 500;
pub(crate) const DENSITY_STEP: usize = 10;
pub(crate) const DENSITY_PRESETS: [usize; 5] = [50, 100, 200, 350, 500];

pub(crate) const WARP_MULTIPLIER: f32 = 3.0;

pub(crate) const FPS_MIN: u32 = 10;
pub(crate) const FPS_MAX: u32 = 120;

pub(crate) const STATUS_ROWS: u16 = 2;

#[derive(Parser, Debug)]
#[command(name = "starfield-warp", about = "Warp-speed starfield for your terminal")]
pub(crate) struct Args {
    /// frames (ticks) per second
    #[arg(long, default_value_t = 33)]
    pub(crate) fps: u32,

    /// initial number of stars (10..=500)
    #[arg(long, default_value_t = 200)]
    pub(crate) stars: usize,

    /// initial speed (depth units per tick)
    #[arg(long, default_value_t = 0.02)]
    pub(crate) speed: f32,

    /// RNG seed, 0 picks one from the clock
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// start with trails disabled
    #[arg(long)]
    pub(crate) no_trails: bool,

    /// start with color disabled
    #[arg(long)]
    pub(crate) no_color: bool,

    /// how many ticks a warp lasts
    #[arg(long, default_value_t = 90)]
    pub(crate) warp_ticks: u32,

    /// write diagnostics to this file (RUST_LOG overrides the level)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

impl Args {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            fps: self.fps.clamp(FPS_MIN, FPS_MAX),
            density: self.stars.clamp(DENSITY_MIN, DENSITY_MAX),
            speed: clamp_speed(self.speed),
            seed: self.seed,
            trails: !self.no_trails,
            color: !self.no_color,
            warp_ticks: self.warp_ticks.max(1),
        }
    }
}

// launch-time values, the target of Reset
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) fps: u32,
    pub(crate) density: usize,
    pub(crate) speed: f32,
    pub(crate) seed: u64,
    pub(crate) trails: bool,
    pub(crate) color: bool,
    pub(crate) warp_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: 33,
            density: 200,
            speed: 0.02,
            seed: 0,
            trails: true,
            color: true,
            warp_ticks: 90,
        }
    }
}

pub(crate) fn clamp_speed(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(SPEED_MIN, SPEED_MAX)
    } else {
        Settings::default().speed
    }
}

pub(crate) fn init_logging(path: Option<&Path>) -> Result<()> {
    // Nothing may go to stdout/stderr while the alternate screen is up.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("could not install logger: {e}"))?;
    Ok(())
}
