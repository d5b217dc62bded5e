//! The top-level fixed-timestep roast session.
//!
//! One explicit session object per roast: it owns the oracle, the active
//! controller, the phase state machine, the history buffers, and the current
//! forecast. The tick driver (see `runner`) calls `tick()` at a paced rate;
//! physics always advances by the configured timestep regardless of how fast
//! ticks are delivered.

use roast_traits::{PolicyNetwork, PredictionOracle};

use crate::error::{BuildError, Result, RoastError};
use crate::forecast::{Forecast, ForecastEngine, LiveAnchor};
use crate::mpc::NeuralController;
use crate::pid::PidController;
use crate::profile::ReferenceProfile;
use crate::state::{
    ControlInputs, DEFAULT_BEAN_CAPACITY, FixedParams, SECS_PER_MIN, StateVector, TEMP_SCALE,
    assemble_controls,
};

/// Roast phase state machine: `Idle → Charging → Roasting → Dropped`,
/// back to `Idle` via explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoastPhase {
    Idle,
    Charging,
    Roasting,
    Dropped,
}

/// Active control strategy. PID drives the heater only (fan stays manual);
/// neural drives both channels.
pub enum Controller {
    Manual,
    Pid(PidController),
    Neural(NeuralController<Box<dyn PolicyNetwork>>),
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Controller::Manual => write!(f, "Manual"),
            Controller::Pid(_) => write!(f, "Pid"),
            Controller::Neural(_) => write!(f, "Neural"),
        }
    }
}

/// One denormalized history row.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct HistorySample {
    pub time_min: f64,
    pub drum_c: f64,
    pub bean_core_c: f64,
    pub air_c: f64,
    pub bean_probe_c: f64,
    pub env_probe_c: f64,
    pub ror_c_per_min: f64,
    pub heater: f64,
    pub fan: f64,
}

/// Append-only parallel time series for a roast; cleared on reset.
#[derive(Debug, Default, Clone)]
pub struct RoastHistory {
    samples: Vec<HistorySample>,
}

impl RoastHistory {
    pub fn samples(&self) -> &[HistorySample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&HistorySample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn push(&mut self, s: HistorySample) {
        self.samples.push(s);
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Public status of a single tick of the roast loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Keep ticking.
    Running,
    /// Session is idle or the post-drop grace tick has completed.
    Stopped,
}

pub struct RoastSession<O: PredictionOracle> {
    oracle: O,
    fixed: FixedParams,
    manual: ControlInputs,
    profile: Option<ReferenceProfile>,
    controller: Controller,
    forecast_engine: ForecastEngine,
    preheat_temp_c: f64,
    timestep_s: f64,
    charge_settle_s: f64,

    phase: RoastPhase,
    state: StateVector,
    sim_time_s: f64,
    running: bool,
    history: RoastHistory,
    forecast: Option<Forecast>,
}

impl<O: PredictionOracle> std::fmt::Debug for RoastSession<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoastSession")
            .field("phase", &self.phase)
            .field("sim_time_s", &self.sim_time_s)
            .field("bean_probe_c", &self.state.bean_probe_c())
            .field("controller", &self.controller)
            .finish()
    }
}

impl<O: PredictionOracle> RoastSession<O> {
    pub fn builder() -> RoastSessionBuilder<O> {
        RoastSessionBuilder::default()
    }

    pub fn phase(&self) -> RoastPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> StateVector {
        self.state
    }

    /// Simulation clock in seconds (accumulated timesteps, not wall time).
    pub fn sim_time_s(&self) -> f64 {
        self.sim_time_s
    }

    pub fn timestep_s(&self) -> f64 {
        self.timestep_s
    }

    pub fn history(&self) -> &RoastHistory {
        &self.history
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn profile(&self) -> Option<&ReferenceProfile> {
        self.profile.as_ref()
    }

    pub fn manual(&self) -> ControlInputs {
        self.manual
    }

    /// Update the operator sliders (heater/fan/mass).
    pub fn set_manual(&mut self, manual: ControlInputs) {
        self.manual = manual;
    }

    /// Mutable access to the active controller, e.g. for live PID retuning.
    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    /// Charge beans: valid from `Idle` only. Clears history, restores the
    /// preheat state, and arms the tick driver.
    pub fn charge(&mut self) -> Result<()> {
        if self.phase != RoastPhase::Idle {
            return Err(eyre::Report::new(RoastError::State(format!(
                "charge only valid from Idle, current phase {:?}",
                self.phase
            ))));
        }
        self.restore_preheat();
        self.phase = RoastPhase::Charging;
        self.running = true;
        tracing::info!(
            preheat_temp_c = self.preheat_temp_c,
            mass_g = self.manual.mass_g,
            "charge"
        );
        Ok(())
    }

    /// Drop beans: valid from `Roasting` only. The next tick is a grace tick
    /// (roaster-only drift, final plot update); after it the driver stops.
    pub fn drop_beans(&mut self) -> Result<()> {
        if self.phase != RoastPhase::Roasting {
            return Err(eyre::Report::new(RoastError::State(format!(
                "drop only valid from Roasting, current phase {:?}",
                self.phase
            ))));
        }
        self.phase = RoastPhase::Dropped;
        tracing::info!(
            sim_min = self.sim_time_s / SECS_PER_MIN,
            bean_probe_c = self.state.bean_probe_c(),
            "drop"
        );
        Ok(())
    }

    /// Return to `Idle`: clears all history and the forecast, restores the
    /// preheat state, and resets controller memory.
    pub fn reset(&mut self) {
        self.phase = RoastPhase::Idle;
        self.running = false;
        self.restore_preheat();
        match &mut self.controller {
            Controller::Manual => {}
            Controller::Pid(pid) => pid.reset(),
            Controller::Neural(ctrl) => ctrl.reset(),
        }
        tracing::debug!("session reset");
    }

    fn restore_preheat(&mut self) {
        self.state = StateVector::preheat(self.preheat_temp_c);
        self.sim_time_s = 0.0;
        self.history.clear();
        self.forecast = None;
    }

    /// Advance the simulation by one fixed physical timestep.
    ///
    /// Any oracle or controller failure is fatal to the session: the loop is
    /// marked not-running and the error propagates without retry, since a
    /// mid-physics retry could run on a half-updated state.
    pub fn tick(&mut self) -> Result<TickStatus> {
        match self.phase {
            RoastPhase::Idle => return Ok(TickStatus::Stopped),
            RoastPhase::Dropped if !self.running => return Ok(TickStatus::Stopped),
            _ => {}
        }

        let result = self.tick_inner();
        if let Err(e) = &result {
            self.running = false;
            tracing::error!(error = %e, "tick failed; session halted");
        }
        result
    }

    fn tick_inner(&mut self) -> Result<TickStatus> {
        let beans_present = matches!(self.phase, RoastPhase::Charging | RoastPhase::Roasting);

        let capacity = if beans_present {
            self.oracle
                .bean_thermal_capacity(self.state.t_b)
                .map_err(|e| eyre::Report::new(RoastError::Oracle(e.to_string())))?
        } else {
            DEFAULT_BEAN_CAPACITY
        };

        let t_min = self.sim_time_s / SECS_PER_MIN;
        let anchor = self.history.last().map(|s| LiveAnchor {
            time_min: s.time_min,
            bean_probe_c: s.bean_probe_c,
        });

        let (heater, fan) = match &mut self.controller {
            Controller::Manual => (self.manual.heater, self.manual.fan),
            Controller::Pid(pid) => {
                let profile = self
                    .profile
                    .as_ref()
                    .ok_or_else(|| RoastError::State("pid mode requires a profile".into()))?;
                let setpoint = profile.evaluate(t_min);
                let heater = pid.compute(setpoint, self.state.bean_probe_c(), self.sim_time_s);
                (heater, self.manual.fan)
            }
            Controller::Neural(ctrl) => {
                let profile = self
                    .profile
                    .as_ref()
                    .ok_or_else(|| RoastError::State("neural mode requires a profile".into()))?;
                // Causality: the forecast is generated under the previous
                // tick's action, not the yet-uncomputed current one.
                let last = ctrl.last_action();
                let fc = if beans_present {
                    Some(self.forecast_engine.generate(
                        &mut self.oracle,
                        self.state,
                        &self.fixed,
                        self.manual.mass_g,
                        last[0],
                        last[1],
                        self.sim_time_s,
                        anchor,
                    )?)
                } else {
                    None
                };
                let action = ctrl.compute(&self.state, t_min, profile, fc.as_ref())?;
                (action[0], action[1])
            }
        };

        let mass_g = if beans_present { self.manual.mass_g } else { 0.0 };
        let controls = assemble_controls(heater, fan, &self.fixed, mass_g, capacity);
        let next = self
            .oracle
            .step_state(&self.state.to_array(), &controls, self.timestep_s / SECS_PER_MIN)
            .map_err(|e| eyre::Report::new(RoastError::Oracle(e.to_string())))?;
        let next = StateVector::from_array(next);
        if !next.is_finite() {
            return Err(eyre::Report::new(RoastError::Oracle(
                "oracle returned non-finite state".into(),
            )));
        }

        self.state = next;
        self.sim_time_s += self.timestep_s;
        let time_min = self.sim_time_s / SECS_PER_MIN;

        // Instantaneous rate of rise; zero for the very first sample.
        let ror = match self.history.last() {
            Some(prev) => {
                let dt_min = time_min - prev.time_min;
                if dt_min > 0.0 {
                    (self.state.bean_probe_c() - prev.bean_probe_c) / dt_min
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.history.push(HistorySample {
            time_min,
            drum_c: self.state.t_r * TEMP_SCALE,
            bean_core_c: self.state.t_b * TEMP_SCALE,
            air_c: self.state.t_air * TEMP_SCALE,
            bean_probe_c: self.state.t_bm * TEMP_SCALE,
            env_probe_c: self.state.t_atm * TEMP_SCALE,
            ror_c_per_min: ror,
            heater: controls[0],
            fan: controls[1],
        });

        // Charge settling: beans take a moment to register before roasting.
        if self.phase == RoastPhase::Charging && self.sim_time_s >= self.charge_settle_s {
            self.phase = RoastPhase::Roasting;
            tracing::info!(sim_s = self.sim_time_s, "settled; roasting");
        }

        if beans_present {
            let anchor = self.history.last().map(|s| LiveAnchor {
                time_min: s.time_min,
                bean_probe_c: s.bean_probe_c,
            });
            self.forecast = Some(self.forecast_engine.generate(
                &mut self.oracle,
                self.state,
                &self.fixed,
                self.manual.mass_g,
                controls[0],
                controls[1],
                self.sim_time_s,
                anchor,
            )?);
        } else {
            self.forecast = None;
        }

        if self.phase == RoastPhase::Dropped {
            // Grace tick complete; the driver stops here.
            self.running = false;
            return Ok(TickStatus::Stopped);
        }
        Ok(TickStatus::Running)
    }
}

/// Plain builder; all fields validated on `build()`.
pub struct RoastSessionBuilder<O: PredictionOracle> {
    oracle: Option<O>,
    fixed: FixedParams,
    manual: ControlInputs,
    profile: Option<ReferenceProfile>,
    controller: Controller,
    preheat_temp_c: f64,
    timestep_s: f64,
    charge_settle_s: f64,
    forecast_horizon_s: f64,
}

impl<O: PredictionOracle> Default for RoastSessionBuilder<O> {
    fn default() -> Self {
        Self {
            oracle: None,
            fixed: FixedParams::default(),
            manual: ControlInputs::default(),
            profile: None,
            controller: Controller::Manual,
            preheat_temp_c: 180.0,
            timestep_s: 1.5,
            charge_settle_s: 2.0,
            forecast_horizon_s: 240.0,
        }
    }
}

impl<O: PredictionOracle> RoastSessionBuilder<O> {
    pub fn oracle(mut self, oracle: O) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn fixed(mut self, fixed: FixedParams) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn manual(mut self, manual: ControlInputs) -> Self {
        self.manual = manual;
        self
    }

    pub fn profile(mut self, profile: ReferenceProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn preheat_temp_c(mut self, c: f64) -> Self {
        self.preheat_temp_c = c;
        self
    }

    pub fn timestep_s(mut self, s: f64) -> Self {
        self.timestep_s = s;
        self
    }

    pub fn charge_settle_s(mut self, s: f64) -> Self {
        self.charge_settle_s = s;
        self
    }

    pub fn forecast_horizon_s(mut self, s: f64) -> Self {
        self.forecast_horizon_s = s;
        self
    }

    pub fn simulation(mut self, cfg: &roast_config::SimulationCfg) -> Self {
        self.preheat_temp_c = cfg.preheat_temp_c;
        self.timestep_s = cfg.timestep_s;
        self.charge_settle_s = cfg.charge_settle_s;
        self.forecast_horizon_s = cfg.forecast_horizon_s;
        self
    }

    pub fn build(self) -> Result<RoastSession<O>> {
        let oracle = self
            .oracle
            .ok_or_else(|| eyre::Report::new(BuildError::MissingOracle))?;
        if !(self.timestep_s > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "timestep_s must be > 0",
            )));
        }
        if !(self.forecast_horizon_s > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "forecast_horizon_s must be > 0",
            )));
        }
        if self.charge_settle_s < 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "charge_settle_s must be >= 0",
            )));
        }
        if self.profile.is_none()
            && matches!(self.controller, Controller::Pid(_) | Controller::Neural(_))
        {
            return Err(eyre::Report::new(BuildError::MissingProfile));
        }

        let forecast_engine = ForecastEngine::new(self.forecast_horizon_s, self.timestep_s);
        let state = StateVector::preheat(self.preheat_temp_c);
        Ok(RoastSession {
            oracle,
            fixed: self.fixed,
            manual: self.manual,
            profile: self.profile,
            controller: self.controller,
            forecast_engine,
            preheat_temp_c: self.preheat_temp_c,
            timestep_s: self.timestep_s,
            charge_settle_s: self.charge_settle_s,
            phase: RoastPhase::Idle,
            state,
            sim_time_s: 0.0,
            running: false,
            history: RoastHistory::default(),
            forecast: None,
        })
    }
}
