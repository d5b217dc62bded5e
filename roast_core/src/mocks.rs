//! Test and helper mocks for roast_core

use roast_traits::{CONTROL_DIM, PolicyNetwork, PredictionOracle, STATE_DIM};

/// An oracle that warms every field by a fixed normalized rate per minute
/// and reports a constant bean thermal capacity. Useful for loop/controller
/// tests where the physics itself is irrelevant.
#[derive(Debug, Clone, Copy)]
pub struct ConstantOracle {
    /// Normalized temperature gain per minute applied to every field.
    pub rate_per_min: f64,
    pub capacity: f64,
}

impl Default for ConstantOracle {
    fn default() -> Self {
        Self {
            rate_per_min: 0.1,
            capacity: 0.5,
        }
    }
}

impl PredictionOracle for ConstantOracle {
    fn step_state(
        &mut self,
        state: &[f64; STATE_DIM],
        _controls: &[f64; CONTROL_DIM],
        dt: f64,
    ) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error + Send + Sync>> {
        let mut next = *state;
        for v in &mut next {
            *v += self.rate_per_min * dt;
        }
        Ok(next)
    }

    fn bean_thermal_capacity(
        &mut self,
        _bean_temp: f64,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.capacity)
    }
}

/// An oracle that fails after a configured number of successful steps, for
/// exercising the fatal-tick path.
#[derive(Debug, Default)]
pub struct FailingOracle {
    pub ok_steps: usize,
    steps: usize,
}

impl FailingOracle {
    pub fn after(ok_steps: usize) -> Self {
        Self { ok_steps, steps: 0 }
    }
}

impl PredictionOracle for FailingOracle {
    fn step_state(
        &mut self,
        state: &[f64; STATE_DIM],
        _controls: &[f64; CONTROL_DIM],
        _dt: f64,
    ) -> Result<[f64; STATE_DIM], Box<dyn std::error::Error + Send + Sync>> {
        if self.steps >= self.ok_steps {
            return Err(Box::new(std::io::Error::other("numerical instability")));
        }
        self.steps += 1;
        Ok(*state)
    }

    fn bean_thermal_capacity(
        &mut self,
        _bean_temp: f64,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(0.5)
    }
}

/// A policy that records the input lengths it saw and returns a fixed action.
#[derive(Debug, Default)]
pub struct EchoPolicy {
    pub action: [f64; 2],
    pub seen_lens: Vec<usize>,
}

impl EchoPolicy {
    pub fn returning(heater: f64, fan: f64) -> Self {
        Self {
            action: [heater, fan],
            seen_lens: Vec::new(),
        }
    }
}

impl PolicyNetwork for EchoPolicy {
    fn infer(
        &mut self,
        input: &[f64],
    ) -> Result<[f64; 2], Box<dyn std::error::Error + Send + Sync>> {
        self.seen_lens.push(input.len());
        Ok(self.action)
    }
}
