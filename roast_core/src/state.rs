//! The 5-dimensional physical state and its normalization contract.
//!
//! All quantities crossing the oracle boundary are normalized: raw physical
//! units divided by a fixed per-quantity scale. Temperatures and control
//! percentages divide by 100, mass by 100 g, time by 60 s. The core works in
//! normalized units throughout and denormalizes only at the history/plotting
//! edge, mirroring the one-canonical-unit discipline of a fixed-point loop.

use roast_traits::{CONTROL_DIM, STATE_DIM};

/// Normalization scale for temperatures (°C per normalized unit).
pub const TEMP_SCALE: f64 = 100.0;
/// Normalization scale for percentage channels (drum, humidity).
pub const PERCENT_SCALE: f64 = 100.0;
/// Normalization scale for bean mass (grams per normalized unit).
pub const MASS_SCALE_G: f64 = 100.0;
/// Normalization scale for time (seconds per minute).
pub const SECS_PER_MIN: f64 = 60.0;

/// Placeholder bean thermal capacity used when no beans are present or the
/// capacity model cannot be consulted.
pub const DEFAULT_BEAN_CAPACITY: f64 = 0.5;

/// Normalized 5-field physical state, in fixed field order.
///
/// Replaced wholesale by each oracle step; never partially mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    /// Roaster/drum body temperature.
    pub t_r: f64,
    /// Bean core (latent, unmeasured) temperature.
    pub t_b: f64,
    /// Chamber air temperature.
    pub t_air: f64,
    /// Bean-probe measured temperature (the primary observable).
    pub t_bm: f64,
    /// Measured air/environment-probe temperature.
    pub t_atm: f64,
}

impl StateVector {
    /// Deterministic session-start state derived from one preheat temperature.
    ///
    /// Drum runs 50 °C above the probe, chamber air 40 °C below, beans sit at
    /// room temperature (not yet charged); both probes read the preheat value.
    pub fn preheat(preheat_temp_c: f64) -> Self {
        Self {
            t_r: (preheat_temp_c + 50.0) / TEMP_SCALE,
            t_b: 25.0 / TEMP_SCALE,
            t_air: (preheat_temp_c - 40.0) / TEMP_SCALE,
            t_bm: preheat_temp_c / TEMP_SCALE,
            t_atm: preheat_temp_c / TEMP_SCALE,
        }
    }

    /// Fixed-order array form used at the oracle boundary.
    pub fn to_array(self) -> [f64; STATE_DIM] {
        [self.t_r, self.t_b, self.t_air, self.t_bm, self.t_atm]
    }

    pub fn from_array(a: [f64; STATE_DIM]) -> Self {
        Self {
            t_r: a[0],
            t_b: a[1],
            t_air: a[2],
            t_bm: a[3],
            t_atm: a[4],
        }
    }

    /// Bean-probe temperature in °C.
    #[inline]
    pub fn bean_probe_c(&self) -> f64 {
        self.t_bm * TEMP_SCALE
    }

    /// True if every field is a finite number. An oracle returning NaN/Inf
    /// has corrupted the state and the tick must abort.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Operator-owned actuator inputs. PID/neural modes overwrite `heater`
/// (and `fan`, for neural) each tick; manual mode passes them through.
#[derive(Debug, Clone, Copy)]
pub struct ControlInputs {
    /// Heater command in [0, 1].
    pub heater: f64,
    /// Fan command in [0, 1].
    pub fan: f64,
    /// Bean charge mass in grams.
    pub mass_g: f64,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            heater: 0.5,
            fan: 0.5,
            mass_g: 100.0,
        }
    }
}

/// Session-constant environment parameters; not part of controllable state.
#[derive(Debug, Clone, Copy)]
pub struct FixedParams {
    /// Drum speed fraction in [0, 1].
    pub drum: f64,
    /// Ambient temperature (°C).
    pub ambient_c: f64,
    /// Relative humidity in [0, 1].
    pub humidity: f64,
}

impl Default for FixedParams {
    fn default() -> Self {
        Self {
            drum: 0.5,
            ambient_c: 25.0,
            humidity: 0.5,
        }
    }
}

impl From<&roast_config::FixedCfg> for FixedParams {
    fn from(c: &roast_config::FixedCfg) -> Self {
        Self {
            drum: c.drum,
            ambient_c: c.ambient_c,
            humidity: c.humidity,
        }
    }
}

/// Assemble the 7-element control vector in the fixed order the oracle
/// expects: `[heater, fan, drum, ambient/100, humidity/100, mass/100, capacity]`.
///
/// Heater and fan are clamped to [0, 1] here so no controller output can
/// push an out-of-range actuator command into the model.
pub fn assemble_controls(
    heater: f64,
    fan: f64,
    fixed: &FixedParams,
    mass_g: f64,
    capacity: f64,
) -> [f64; CONTROL_DIM] {
    [
        heater.clamp(0.0, 1.0),
        fan.clamp(0.0, 1.0),
        fixed.drum,
        fixed.ambient_c / PERCENT_SCALE,
        fixed.humidity / PERCENT_SCALE,
        mass_g.max(0.0) / MASS_SCALE_G,
        capacity,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn preheat_state_is_deterministic() {
        let s = StateVector::preheat(180.0);
        let expect = [2.30, 0.25, 1.40, 1.80, 1.80];
        for (got, want) in s.to_array().iter().zip(expect.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn control_vector_order_and_scaling() {
        let fixed = FixedParams {
            drum: 0.7,
            ambient_c: 25.0,
            humidity: 0.4,
        };
        let v = assemble_controls(0.5, 0.25, &fixed, 100.0, 0.5);
        assert_relative_eq!(v[0], 0.5);
        assert_relative_eq!(v[1], 0.25);
        assert_relative_eq!(v[2], 0.7);
        assert_relative_eq!(v[3], 0.25);
        assert_relative_eq!(v[4], 0.004);
        assert_relative_eq!(v[5], 1.0);
        assert_relative_eq!(v[6], 0.5);
    }

    #[test]
    fn actuators_clamp_and_mass_floors_at_zero() {
        let fixed = FixedParams::default();
        let v = assemble_controls(1.7, -0.3, &fixed, -5.0, 0.5);
        assert_relative_eq!(v[0], 1.0);
        assert_relative_eq!(v[1], 0.0);
        assert_relative_eq!(v[5], 0.0);
    }
}
