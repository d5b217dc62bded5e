#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Built-in stand-ins for the trained prediction models.
//!
//! The real twin consumes exported function approximators (state evolution,
//! bean thermal capacity, control policy) through the `roast_traits`
//! contracts. This crate provides deterministic closed-form substitutes with
//! the same numeric interface, so the simulator and CLI run end-to-end
//! without model files and real models drop in unchanged.

use roast_traits::{CONTROL_DIM, PolicyNetwork, PredictionOracle, STATE_DIM};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ModelError {
    #[error("non-finite input to surrogate model")]
    NonFiniteInput,
    #[error("policy input length {got} does not match configured input_dim {expected}")]
    InputDim { got: usize, expected: usize },
}

/// First-order lumped-capacitance thermal surrogate for the drum roaster.
///
/// Works entirely in normalized units (°C / 100, dt in minutes). The heater
/// feeds the drum toward an effective flame temperature, the drum heats the
/// chamber air, air heats the bean mass (slowed by bean load), and the two
/// probes lag their sources. The fan vents chamber air toward ambient and
/// strips heat from the drum. Not calibrated physics; a plausible,
/// deterministic stand-in for the trained state model.
#[derive(Debug, Clone, Copy)]
pub struct SurrogateOracle {
    /// Heater→drum coupling per minute.
    pub k_heat: f64,
    /// Drum→ambient loss per minute.
    pub k_loss: f64,
    /// Fan→drum stripping per minute per unit fan.
    pub k_fan_drum: f64,
    /// Drum→air coupling per minute.
    pub k_air: f64,
    /// Fan venting of air toward ambient per minute per unit fan.
    pub k_vent: f64,
    /// Air→bean coupling per minute (before bean-load slowdown).
    pub k_bean: f64,
    /// Probe lag per minute.
    pub k_probe: f64,
}

impl Default for SurrogateOracle {
    fn default() -> Self {
        Self {
            k_heat: 0.35,
            k_loss: 0.05,
            k_fan_drum: 0.10,
            k_air: 0.60,
            k_vent: 0.40,
            k_bean: 0.80,
            k_probe: 2.00,
        }
    }
}

impl SurrogateOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective flame temperature for a heater command: 100 °C idle pilot
    /// up to 400 °C at full power, normalized.
    fn flame_norm(heater: f64) -> f64 {
        1.0 + 3.0 * heater.clamp(0.0, 1.0)
    }
}

impl PredictionOracle for SurrogateOracle {
    fn step_state(
        &mut self,
        state: &[f64; STATE_DIM],
        controls: &[f64; CONTROL_DIM],
        dt: f64,
    ) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error + Send + Sync>> {
        if state.iter().chain(controls.iter()).any(|v| !v.is_finite()) || !dt.is_finite() {
            return Err(Box::new(ModelError::NonFiniteInput));
        }
        let [t_r, t_b, t_air, t_bm, t_atm] = *state;
        let [heater, fan, _drum, ambient, _humidity, mass, capacity] = *controls;
        // ambient arrives pre-scaled (°C / 100); drum speed and humidity are
        // second-order effects the surrogate ignores.
        let t_amb = ambient;

        let d_t_r = self.k_heat * heater * (Self::flame_norm(heater) - t_r)
            - self.k_loss * (t_r - t_amb)
            - self.k_fan_drum * fan * (t_r - t_air);
        let d_t_air = self.k_air * (t_r - t_air) - self.k_vent * fan * (t_air - t_amb);
        // Bean load slows bean-core response: heavier/denser charges heat slower.
        let bean_load = 1.0 + 2.0 * mass.max(0.0) * capacity.max(0.0);
        let d_t_b = self.k_bean * (t_air - t_b) / bean_load;
        // Probes read a mix of their source and the surrounding air.
        let d_t_bm = self.k_probe * (0.7 * t_b + 0.3 * t_air - t_bm);
        let d_t_atm = self.k_probe * (t_air - t_atm);

        let next = [
            t_r + d_t_r * dt,
            t_b + d_t_b * dt,
            t_air + d_t_air * dt,
            t_bm + d_t_bm * dt,
            t_atm + d_t_atm * dt,
        ];
        if next.iter().any(|v| !v.is_finite()) {
            return Err(Box::new(ModelError::NonFiniteInput));
        }
        Ok(next)
    }

    fn bean_thermal_capacity(
        &mut self,
        bean_temp: f64,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        if !bean_temp.is_finite() {
            return Err(Box::new(ModelError::NonFiniteInput));
        }
        // Specific heat of coffee rises roughly linearly with temperature.
        Ok(0.3 + 0.4 * (bean_temp.clamp(0.0, 2.5) / 2.5))
    }
}

/// Deterministic stand-in for the trained MPC policy network.
///
/// Reads the leading `forecast_error` block of the fixed input layout and
/// applies a proportional correction around a nominal operating point: a
/// forecast running hot reduces heat and raises fan, and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicPolicy {
    input_dim: usize,
    n_samples: usize,
    /// Nominal heater command when on-trajectory.
    pub base_heat: f64,
    /// Nominal fan command when on-trajectory.
    pub base_fan: f64,
    /// Proportional gain on mean forecast error (normalized units).
    pub gain: f64,
}

impl HeuristicPolicy {
    pub fn new(input_dim: usize, n_samples: usize) -> Self {
        Self {
            input_dim,
            n_samples,
            base_heat: 0.55,
            base_fan: 0.40,
            gain: 4.0,
        }
    }
}

impl PolicyNetwork for HeuristicPolicy {
    fn infer(
        &mut self,
        input: &[f64],
    ) -> Result<[f64; 2], Box<dyn std::error::Error + Send + Sync>> {
        if input.len() != self.input_dim {
            return Err(Box::new(ModelError::InputDim {
                got: input.len(),
                expected: self.input_dim,
            }));
        }
        let n = self.n_samples.min(input.len()).max(1);
        let mean_err: f64 = input[..n].iter().sum::<f64>() / n as f64;

        let heat = (self.base_heat - self.gain * mean_err).clamp(0.0, 1.0);
        let fan = (self.base_fan + self.gain * mean_err).clamp(0.0, 1.0);
        tracing::trace!(mean_err, heat, fan, "heuristic policy");
        Ok([heat, fan])
    }
}
