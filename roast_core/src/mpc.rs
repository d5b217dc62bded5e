//! Receding-horizon neural controller.
//!
//! Each tick the controller samples the reference profile forward, compares
//! it against a held-control forecast generated with the *previous* action
//! (the current action cannot depend on itself), assembles the fixed-layout
//! input vector, and asks the policy network for `[heater, fan]`.

use std::collections::VecDeque;

use roast_traits::PolicyNetwork;

use crate::error::{Result, RoastError};
use crate::forecast::Forecast;
use crate::profile::ReferenceProfile;
use crate::state::{SECS_PER_MIN, StateVector, TEMP_SCALE};

/// MPC metadata loaded alongside the trained policy.
#[derive(Debug, Clone, Copy)]
pub struct MpcParams {
    pub n_horizon_s: f64,
    pub dstep_s: f64,
    pub n_past_states: usize,
    pub n_samples: usize,
    pub input_dim: usize,
}

impl From<&roast_config::MpcCfg> for MpcParams {
    fn from(c: &roast_config::MpcCfg) -> Self {
        Self {
            n_horizon_s: c.n_horizon_s,
            dstep_s: c.dstep_s,
            n_past_states: c.n_past_states,
            n_samples: c.n_samples,
            input_dim: c.input_dim,
        }
    }
}

/// Input layout is `forecast_error(n_samples) ++ future_ref(n_samples) ++
/// sampled_forecast(n_samples) ++ state(5) ++ past_states(n_past) ++
/// historical_error(n_past) ++ past_actions_flat(2*n_past)`.
pub fn expected_input_dim(n_samples: usize, n_past_states: usize) -> usize {
    3 * n_samples + roast_traits::STATE_DIM + 4 * n_past_states
}

pub struct NeuralController<P: PolicyNetwork> {
    params: MpcParams,
    timestep_s: f64,
    policy: P,
    /// Sliding window of past normalized bean-core temperatures, oldest first.
    past_states: VecDeque<f64>,
    /// Sliding window of past `[heater, fan]` actions, oldest first.
    past_actions: VecDeque<[f64; 2]>,
    last_action: [f64; 2],
}

impl<P: PolicyNetwork> std::fmt::Debug for NeuralController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralController")
            .field("params", &self.params)
            .field("last_action", &self.last_action)
            .finish()
    }
}

impl<P: PolicyNetwork> NeuralController<P> {
    /// Fail fast on a config/policy layout mismatch: a wrong `input_dim` is
    /// a fatal configuration error, never silently truncated or padded.
    pub fn new(params: MpcParams, timestep_s: f64, policy: P) -> Result<Self> {
        if !(params.dstep_s > 0.0) {
            return Err(eyre::Report::new(RoastError::Config(
                "mpc dstep_s must be > 0".into(),
            )));
        }
        if !(timestep_s > 0.0) {
            return Err(eyre::Report::new(RoastError::Config(
                "timestep_s must be > 0".into(),
            )));
        }
        if params.n_past_states == 0 || params.n_samples == 0 {
            return Err(eyre::Report::new(RoastError::Config(
                "mpc n_past_states and n_samples must be >= 1".into(),
            )));
        }
        // The sampled points must fit inside the stated horizon.
        if params.n_samples as f64 * params.dstep_s > params.n_horizon_s {
            return Err(eyre::Report::new(RoastError::Config(format!(
                "mpc n_horizon_s {} too short for {} samples at {} s spacing",
                params.n_horizon_s, params.n_samples, params.dstep_s,
            ))));
        }
        let expected = expected_input_dim(params.n_samples, params.n_past_states);
        if expected != params.input_dim {
            return Err(eyre::Report::new(RoastError::Config(format!(
                "policy input_dim mismatch: configured {}, layout requires {} \
                 (forecast_error={} + future_ref={} + sampled_forecast={} + state=5 \
                 + past_states={} + historical_error={} + past_actions={})",
                params.input_dim,
                expected,
                params.n_samples,
                params.n_samples,
                params.n_samples,
                params.n_past_states,
                params.n_past_states,
                2 * params.n_past_states,
            ))));
        }
        let n = params.n_past_states;
        Ok(Self {
            params,
            timestep_s,
            policy,
            past_states: VecDeque::from(vec![0.0; n]),
            past_actions: VecDeque::from(vec![[0.0, 0.0]; n]),
            last_action: [0.0, 0.0],
        })
    }

    pub fn params(&self) -> MpcParams {
        self.params
    }

    /// Action applied on the previous tick; the session generates the
    /// forecast with this before calling `compute`.
    pub fn last_action(&self) -> [f64; 2] {
        self.last_action
    }

    /// One control computation. `forecast` is the held-control trajectory
    /// generated with `last_action()`; `None` (beans absent, first tick)
    /// falls back to the current bean-probe reading.
    pub fn compute(
        &mut self,
        state: &StateVector,
        t_min: f64,
        profile: &ReferenceProfile,
        forecast: Option<&Forecast>,
    ) -> Result<[f64; 2]> {
        let n_samples = self.params.n_samples;
        let n_past = self.params.n_past_states;
        let dstep_min = self.params.dstep_s / SECS_PER_MIN;
        let tick_min = self.timestep_s / SECS_PER_MIN;

        // Future reference samples at fixed dstep spacing, normalized.
        let future_ref: Vec<f64> = (0..n_samples)
            .map(|i| profile.evaluate(t_min + i as f64 * dstep_min) / TEMP_SCALE)
            .collect();

        // Downsample the forecast bean-probe series at dstep spacing; pad
        // with the last available value (or the live reading when empty) so
        // a short horizon never fails.
        let sampled_forecast: Vec<f64> = (0..n_samples)
            .map(|i| {
                let series = forecast.map(|f| f.bean_probe_c.as_slice()).unwrap_or(&[]);
                if series.is_empty() {
                    return state.t_bm;
                }
                let idx = ((i as f64 * self.params.dstep_s / self.timestep_s).round() as usize)
                    .min(series.len() - 1);
                series[idx] / TEMP_SCALE
            })
            .collect();

        // Signed deviation of the predicted trajectory from target.
        let forecast_error: Vec<f64> = sampled_forecast
            .iter()
            .zip(future_ref.iter())
            .map(|(f, r)| f - r)
            .collect();

        // Deviation of each buffered past state from its reference.
        let historical_error: Vec<f64> = self
            .past_states
            .iter()
            .enumerate()
            .map(|(i, past)| {
                let t_past = t_min - (n_past - 1 - i) as f64 * tick_min;
                past - profile.evaluate(t_past) / TEMP_SCALE
            })
            .collect();

        let mut input = Vec::with_capacity(self.params.input_dim);
        input.extend_from_slice(&forecast_error);
        input.extend_from_slice(&future_ref);
        input.extend_from_slice(&sampled_forecast);
        input.extend_from_slice(&state.to_array());
        input.extend(self.past_states.iter().copied());
        input.extend_from_slice(&historical_error);
        for a in &self.past_actions {
            input.push(a[0]);
            input.push(a[1]);
        }

        if input.len() != self.params.input_dim {
            return Err(eyre::Report::new(RoastError::Config(format!(
                "assembled input length {} != input_dim {} \
                 (forecast_error={} future_ref={} sampled_forecast={} state=5 \
                 past_states={} historical_error={} past_actions={})",
                input.len(),
                self.params.input_dim,
                forecast_error.len(),
                future_ref.len(),
                sampled_forecast.len(),
                self.past_states.len(),
                historical_error.len(),
                2 * self.past_actions.len(),
            ))));
        }

        let raw = self
            .policy
            .infer(&input)
            .map_err(|e| eyre::Report::new(RoastError::Policy(e.to_string())))?;
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(eyre::Report::new(RoastError::Policy(
                "policy returned non-finite action".into(),
            )));
        }
        let action = [raw[0].clamp(0.0, 1.0), raw[1].clamp(0.0, 1.0)];

        // Sliding-window update, exactly once per call.
        self.past_states.pop_front();
        self.past_states.push_back(state.t_b);
        self.past_actions.pop_front();
        self.past_actions.push_back(action);
        self.last_action = action;

        Ok(action)
    }

    /// Re-zero both windows; a new roast must not see a prior roast's history.
    pub fn reset(&mut self) {
        for v in self.past_states.iter_mut() {
            *v = 0.0;
        }
        for a in self.past_actions.iter_mut() {
            *a = [0.0, 0.0];
        }
        self.last_action = [0.0, 0.0];
    }

    /// Diagnostics: the past-state window, oldest first.
    pub fn past_states(&self) -> &VecDeque<f64> {
        &self.past_states
    }

    /// Diagnostics: the past-action window, oldest first.
    pub fn past_actions(&self) -> &VecDeque<[f64; 2]> {
        &self.past_actions
    }
}
