//! Receding, held-control multi-step prediction.
//!
//! The engine repeatedly applies the prediction oracle to a private copy of
//! the live state, holding the current actuator commands constant for the
//! whole horizon. Emitted times are relative to the live simulation clock so
//! forecast and history share one time axis.

use roast_traits::PredictionOracle;

use crate::error::{Result, RoastError};
use crate::state::{FixedParams, StateVector, SECS_PER_MIN, TEMP_SCALE, assemble_controls};
use crate::util::steps_for_horizon;

/// Denormalized multi-step-ahead trajectory, one series per state field.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Forecast {
    /// Absolute simulation time of each point, in minutes.
    pub times_min: Vec<f64>,
    pub drum_c: Vec<f64>,
    pub bean_core_c: Vec<f64>,
    pub air_c: Vec<f64>,
    pub bean_probe_c: Vec<f64>,
    pub env_probe_c: Vec<f64>,
    /// Bean-probe rate of rise, °C/min; the first element splices against
    /// the last live measurement so there is no discontinuity at the boundary.
    pub ror_c_per_min: Vec<f64>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.times_min.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times_min.is_empty()
    }
}

/// The last live history point the forecast RoR splices against.
#[derive(Debug, Clone, Copy)]
pub struct LiveAnchor {
    pub time_min: f64,
    pub bean_probe_c: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastEngine {
    horizon_s: f64,
    timestep_s: f64,
}

impl ForecastEngine {
    pub fn new(horizon_s: f64, timestep_s: f64) -> Self {
        Self {
            horizon_s,
            timestep_s,
        }
    }

    /// Roll the oracle forward `ceil(horizon/timestep)` steps from `state`
    /// under held `(heater, fan)`. The live state is copied, never mutated.
    #[allow(clippy::too_many_arguments)]
    pub fn generate<O: PredictionOracle>(
        &self,
        oracle: &mut O,
        state: StateVector,
        fixed: &FixedParams,
        mass_g: f64,
        heater: f64,
        fan: f64,
        sim_time_s: f64,
        anchor: Option<LiveAnchor>,
    ) -> Result<Forecast> {
        let steps = steps_for_horizon(self.horizon_s, self.timestep_s);
        let dt_min = self.timestep_s / SECS_PER_MIN;
        let base_min = sim_time_s / SECS_PER_MIN;

        let mut out = Forecast::default();
        out.times_min.reserve(steps);

        let mut current = state;
        for step in 0..steps {
            let capacity = oracle
                .bean_thermal_capacity(current.t_b)
                .map_err(|e| eyre::Report::new(RoastError::Oracle(e.to_string())))?;
            let controls = assemble_controls(heater, fan, fixed, mass_g, capacity);
            let next = oracle
                .step_state(&current.to_array(), &controls, dt_min)
                .map_err(|e| eyre::Report::new(RoastError::Oracle(e.to_string())))?;
            let next = StateVector::from_array(next);
            if !next.is_finite() {
                return Err(eyre::Report::new(RoastError::Oracle(
                    "forecast step produced non-finite state".into(),
                )));
            }

            current = next;
            out.times_min.push(base_min + (step + 1) as f64 * dt_min);
            out.drum_c.push(current.t_r * TEMP_SCALE);
            out.bean_core_c.push(current.t_b * TEMP_SCALE);
            out.air_c.push(current.t_air * TEMP_SCALE);
            out.bean_probe_c.push(current.t_bm * TEMP_SCALE);
            out.env_probe_c.push(current.t_atm * TEMP_SCALE);
        }

        out.ror_c_per_min = splice_ror(&out.times_min, &out.bean_probe_c, anchor);
        Ok(out)
    }
}

/// Rate of rise for the forecast series. The first element differences
/// against the live anchor; subsequent elements difference consecutive
/// forecast points. Zero when a time delta is not positive.
fn splice_ror(times_min: &[f64], temps_c: &[f64], anchor: Option<LiveAnchor>) -> Vec<f64> {
    let mut ror = Vec::with_capacity(temps_c.len());
    for i in 0..temps_c.len() {
        let (prev_t, prev_temp) = if i == 0 {
            match anchor {
                Some(a) => (a.time_min, a.bean_probe_c),
                None => {
                    ror.push(0.0);
                    continue;
                }
            }
        } else {
            (times_min[i - 1], temps_c[i - 1])
        };
        let dt = times_min[i] - prev_t;
        if dt > 0.0 {
            ror.push((temps_c[i] - prev_temp) / dt);
        } else {
            ror.push(0.0);
        }
    }
    ror
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ror_splices_against_live_anchor() {
        let times = [1.0, 1.5, 2.0];
        let temps = [110.0, 115.0, 121.0];
        let anchor = LiveAnchor {
            time_min: 0.5,
            bean_probe_c: 100.0,
        };
        let ror = splice_ror(&times, &temps, Some(anchor));
        assert_relative_eq!(ror[0], 20.0); // (110-100)/0.5
        assert_relative_eq!(ror[1], 10.0);
        assert_relative_eq!(ror[2], 12.0);
    }

    #[test]
    fn ror_without_anchor_starts_at_zero() {
        let times = [1.0, 2.0];
        let temps = [110.0, 120.0];
        let ror = splice_ror(&times, &temps, None);
        assert_relative_eq!(ror[0], 0.0);
        assert_relative_eq!(ror[1], 10.0);
    }
}
