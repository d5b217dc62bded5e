#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and profile-waypoint parsing for the roaster twin.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Profile CSV loader enforces the `minutes,celsius` header and
//!   strictly increasing times before the waypoints reach the core.
use serde::Deserialize;

/// Profile CSV schema.
///
/// Expected headers:
/// minutes,celsius
///
/// Example:
/// minutes,celsius
/// 0.0,24.0
/// 0.5,100.0
/// 10.0,203.0
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ProfileRow {
    pub minutes: f64,
    pub celsius: f64,
}

/// Simulation loop parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SimulationCfg {
    /// Physical timestep per tick, in seconds.
    pub timestep_s: f64,
    /// Drum preheat temperature at session start (°C).
    pub preheat_temp_c: f64,
    /// Settling time between charge and roasting, in simulated seconds.
    pub charge_settle_s: f64,
    /// Forecast look-ahead horizon, in physical seconds.
    pub forecast_horizon_s: f64,
    /// Real-time speedup multiplier for the tick driver. Affects only the
    /// wall-clock tick rate, never the physics timestep.
    pub speedup: f64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            timestep_s: 1.5,
            preheat_temp_c: 180.0,
            charge_settle_s: 2.0,
            forecast_horizon_s: 240.0,
            speedup: 1.0,
        }
    }
}

/// Session-constant environment parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FixedCfg {
    /// Drum speed fraction in [0, 1].
    pub drum: f64,
    /// Ambient temperature (°C).
    pub ambient_c: f64,
    /// Relative humidity in [0, 1].
    pub humidity: f64,
}

impl Default for FixedCfg {
    fn default() -> Self {
        Self {
            drum: 0.5,
            ambient_c: 25.0,
            humidity: 0.5,
        }
    }
}

/// PID gains and clamps for the heater loop.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PidCfg {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub output_min: f64,
    pub output_max: f64,
    pub integral_min: f64,
    pub integral_max: f64,
}

impl Default for PidCfg {
    fn default() -> Self {
        Self {
            kp: 0.01,
            ki: 0.001,
            kd: 0.005,
            output_min: 0.0,
            output_max: 1.0,
            integral_min: -1.0,
            integral_max: 1.0,
        }
    }
}

/// Neural (MPC) controller metadata. Normally exported alongside the trained
/// policy network; `input_dim` must match the policy's input layer exactly.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MpcCfg {
    /// Prediction horizon in seconds.
    pub n_horizon_s: f64,
    /// Sample spacing for future/forecast samples, in seconds.
    pub dstep_s: f64,
    /// Length of the past-state and past-action sliding windows.
    pub n_past_states: usize,
    /// Number of future reference/forecast samples.
    pub n_samples: usize,
    /// Input dimension of the policy network.
    pub input_dim: usize,
}

impl Default for MpcCfg {
    fn default() -> Self {
        // 10 samples over 60 s at 6 s spacing, 4-deep history:
        // 3*10 + 5 + 4*4 = 51 inputs.
        Self {
            n_horizon_s: 60.0,
            dstep_s: 6.0,
            n_past_states: 4,
            n_samples: 10,
            input_dim: 51,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationCfg,
    pub fixed: FixedCfg,
    pub pid: PidCfg,
    pub mpc: MpcCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Simulation
        if !(self.simulation.timestep_s > 0.0) {
            eyre::bail!("simulation.timestep_s must be > 0");
        }
        if self.simulation.timestep_s > 60.0 {
            eyre::bail!("simulation.timestep_s is unreasonably large (>60s)");
        }
        if !(0.0..=400.0).contains(&self.simulation.preheat_temp_c) {
            eyre::bail!("simulation.preheat_temp_c must be in [0, 400] °C");
        }
        if self.simulation.charge_settle_s < 0.0 {
            eyre::bail!("simulation.charge_settle_s must be >= 0");
        }
        if !(self.simulation.forecast_horizon_s > 0.0) {
            eyre::bail!("simulation.forecast_horizon_s must be > 0");
        }
        if !(self.simulation.speedup > 0.0) {
            eyre::bail!("simulation.speedup must be > 0");
        }

        // Fixed parameters
        if !(0.0..=1.0).contains(&self.fixed.drum) {
            eyre::bail!("fixed.drum must be in [0.0, 1.0]");
        }
        if !(0.0..=1.0).contains(&self.fixed.humidity) {
            eyre::bail!("fixed.humidity must be in [0.0, 1.0]");
        }
        if !(-50.0..=60.0).contains(&self.fixed.ambient_c) {
            eyre::bail!("fixed.ambient_c must be in [-50, 60] °C");
        }

        // PID
        if self.pid.output_min >= self.pid.output_max {
            eyre::bail!("pid.output_min must be < pid.output_max");
        }
        if self.pid.integral_min >= self.pid.integral_max {
            eyre::bail!("pid.integral_min must be < pid.integral_max");
        }
        for (name, v) in [
            ("pid.kp", self.pid.kp),
            ("pid.ki", self.pid.ki),
            ("pid.kd", self.pid.kd),
        ] {
            if !v.is_finite() || v < 0.0 {
                eyre::bail!("{name} must be finite and >= 0");
            }
        }

        // MPC
        if !(self.mpc.n_horizon_s > 0.0) {
            eyre::bail!("mpc.n_horizon_s must be > 0");
        }
        if !(self.mpc.dstep_s > 0.0) {
            eyre::bail!("mpc.dstep_s must be > 0");
        }
        if self.mpc.n_past_states == 0 {
            eyre::bail!("mpc.n_past_states must be >= 1");
        }
        if self.mpc.n_samples == 0 {
            eyre::bail!("mpc.n_samples must be >= 1");
        }
        if self.mpc.input_dim == 0 {
            eyre::bail!("mpc.input_dim must be >= 1");
        }
        if self.mpc.n_samples as f64 * self.mpc.dstep_s > self.mpc.n_horizon_s {
            eyre::bail!("mpc.n_horizon_s must cover n_samples * dstep_s");
        }

        Ok(())
    }
}

/// Load reference-profile waypoints from a CSV file with strict headers.
pub fn load_profile_csv(path: &std::path::Path) -> eyre::Result<Vec<ProfileRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open profile CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["minutes", "celsius"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "profile CSV must have headers 'minutes,celsius', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ProfileRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    validate_profile_rows(&rows)?;
    Ok(rows)
}

/// Waypoint sanity checks shared by the CSV loader: at least two points,
/// finite values, strictly increasing times.
pub fn validate_profile_rows(rows: &[ProfileRow]) -> eyre::Result<()> {
    if rows.len() < 2 {
        eyre::bail!("profile requires at least two waypoints, got {}", rows.len());
    }
    for (i, r) in rows.iter().enumerate() {
        if !r.minutes.is_finite() || !r.celsius.is_finite() {
            eyre::bail!("profile waypoint {} has non-finite values", i);
        }
    }
    for i in 1..rows.len() {
        if rows[i].minutes <= rows[i - 1].minutes {
            eyre::bail!(
                "profile times must be strictly increasing (rows {} and {})",
                i - 1,
                i
            );
        }
    }
    Ok(())
}
