pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Number of scalar fields in the physical state vector, in fixed order:
/// `[T_r, T_b, T_air, T_bm, T_atm]` (all normalized).
pub const STATE_DIM: usize = 5;

/// Number of scalar fields in the control vector, in fixed order:
/// `[heater, fan, drum, ambient/100, humidity/100, mass/100, bean_capacity]`.
pub const CONTROL_DIM: usize = 7;

/// Black-box prediction model behind the simulation.
///
/// Implementations wrap the trained state-evolution and bean-thermal-capacity
/// function approximators. Both calls are pure numeric: normalized values in,
/// normalized values out. `dt` is in minutes (physical seconds / 60).
pub trait PredictionOracle {
    /// Advance the 5-element state by `dt` under the 7-element control vector.
    fn step_state(
        &mut self,
        state: &[f64; STATE_DIM],
        controls: &[f64; CONTROL_DIM],
        dt: f64,
    ) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error + Send + Sync>>;

    /// Thermal capacity of the bean mass at the given normalized core temperature.
    fn bean_thermal_capacity(
        &mut self,
        bean_temp: f64,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Black-box control policy consumed by the neural (MPC) controller.
///
/// The input layout and length are fixed configuration; see the controller's
/// input-assembly contract. Output is `[heater, fan]`, nominally in `[0, 1]`.
pub trait PolicyNetwork {
    fn infer(
        &mut self,
        input: &[f64],
    ) -> Result<[f64; 2], Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: PredictionOracle + ?Sized> PredictionOracle for Box<T> {
    fn step_state(
        &mut self,
        state: &[f64; STATE_DIM],
        controls: &[f64; CONTROL_DIM],
        dt: f64,
    ) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error + Send + Sync>> {
        (**self).step_state(state, controls, dt)
    }

    fn bean_thermal_capacity(
        &mut self,
        bean_temp: f64,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        (**self).bean_thermal_capacity(bean_temp)
    }
}

impl<T: PolicyNetwork + ?Sized> PolicyNetwork for Box<T> {
    fn infer(
        &mut self,
        input: &[f64],
    ) -> Result<[f64; 2], Box<dyn std::error::Error + Send + Sync>> {
        (**self).infer(input)
    }
}
