//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "roast", version, about = "Drum-roaster digital twin CLI")]
pub struct Cli {
    /// Path to config TOML (typed); defaults are used when the file is absent
    #[arg(long, value_name = "FILE", default_value = "etc/roast_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Which controller drives the actuators during a roast.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ControllerMode {
    /// Direct heater/fan slider passthrough
    Manual,
    /// PID heater loop against the profile setpoint; fan stays manual
    Pid,
    /// Neural receding-horizon controller for both channels
    Neural,
}

/// Reference-profile source for pid/neural runs and the `profile` command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProfileKind {
    /// Fixed 4-waypoint default roast curve
    Default,
    /// Seeded randomized profile
    Random,
    /// Two-point linear ramp
    Ramp,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one charge→roast→drop session
    Run {
        /// Controller driving the roast
        #[arg(long, value_enum, default_value = "manual")]
        mode: ControllerMode,
        /// Roast length from charge to drop, in simulated minutes
        #[arg(long, default_value_t = 10.0)]
        duration_min: f64,
        /// Heater slider in [0,1] (manual mode; also pid/neural mass run-up)
        #[arg(long, default_value_t = 0.5)]
        heater: f64,
        /// Fan slider in [0,1]
        #[arg(long, default_value_t = 0.5)]
        fan: f64,
        /// Bean charge mass in grams
        #[arg(long, default_value_t = 100.0)]
        mass_g: f64,
        /// Profile source for pid/neural modes
        #[arg(long, value_enum, default_value = "default")]
        profile: ProfileKind,
        /// Waypoint CSV (`minutes,celsius`) overriding --profile
        #[arg(long, value_name = "FILE")]
        profile_csv: Option<PathBuf>,
        /// Seed for --profile random
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Wall-clock speedup override (physics timestep is unaffected)
        #[arg(long)]
        speedup: Option<f64>,
        /// Write the roast history as JSON lines to this file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Generate and print a reference profile
    Profile {
        #[arg(long, value_enum, default_value = "default")]
        kind: ProfileKind,
        /// Seed for the randomized generator
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Total profile duration in minutes (random/ramp)
        #[arg(long, default_value_t = 10.0)]
        total_min: f64,
        /// Ramp start temperature (°C)
        #[arg(long, default_value_t = 24.0)]
        start_c: f64,
        /// Ramp end temperature (°C)
        #[arg(long, default_value_t = 203.0)]
        end_c: f64,
    },
    /// Exercise the surrogate oracle and policy wiring, then exit
    SelfCheck,
}
