//! Classic single-loop PID producing one scalar actuator command.
//!
//! The heater loop runs this against the bean probe and the profile
//! setpoint. Anti-windup clamps the integral accumulator before the I term
//! is formed; the final output is clamped to the actuator range.

/// Proportional/integral/derivative gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.01,
            ki: 0.001,
            kd: 0.005,
        }
    }
}

/// Last computed terms, exposed for tuning UIs and test assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTerms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub output: f64,
    pub integral: f64,
}

#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    output_min: f64,
    output_max: f64,
    integral_min: f64,
    integral_max: f64,

    integral: f64,
    prev_error: f64,
    prev_time_s: Option<f64>,
    last_terms: PidTerms,
}

impl Default for PidController {
    fn default() -> Self {
        Self::new(PidGains::default(), (0.0, 1.0), (-1.0, 1.0))
    }
}

impl PidController {
    pub fn new(gains: PidGains, output_range: (f64, f64), integral_range: (f64, f64)) -> Self {
        Self {
            gains,
            output_min: output_range.0,
            output_max: output_range.1,
            integral_min: integral_range.0,
            integral_max: integral_range.1,
            integral: 0.0,
            prev_error: 0.0,
            prev_time_s: None,
            last_terms: PidTerms::default(),
        }
    }

    /// One control computation. `now_s` is the simulation clock in seconds.
    ///
    /// The first call, or a non-monotonic clock, uses dt = 1.0 s so the
    /// derivative term cannot blow up on a zero or negative time delta.
    pub fn compute(&mut self, setpoint: f64, measurement: f64, now_s: f64) -> f64 {
        let error = setpoint - measurement;
        let dt = match self.prev_time_s {
            Some(prev) if now_s - prev > 0.0 => now_s - prev,
            _ => 1.0,
        };

        let p = self.gains.kp * error;

        // Anti-windup: saturate the accumulator before forming the I term.
        self.integral += error * dt;
        self.integral = self.integral.clamp(self.integral_min, self.integral_max);
        let i = self.gains.ki * self.integral;

        let d = self.gains.kd * (error - self.prev_error) / dt;

        let output = (p + i + d).clamp(self.output_min, self.output_max);

        self.prev_error = error;
        self.prev_time_s = Some(now_s);
        self.last_terms = PidTerms {
            p,
            i,
            d,
            output,
            integral: self.integral,
        };
        output
    }

    /// Zero the accumulator and timing state; gains and clamps survive.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.prev_time_s = None;
        self.last_terms = PidTerms::default();
    }

    /// Live retune without losing integral state, so gains can be adjusted
    /// mid-roast.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Diagnostics from the most recent `compute` call.
    pub fn terms(&self) -> PidTerms {
        self.last_terms
    }
}

impl From<&roast_config::PidCfg> for PidController {
    fn from(c: &roast_config::PidCfg) -> Self {
        Self::new(
            PidGains {
                kp: c.kp,
                ki: c.ki,
                kd: c.kd,
            },
            (c.output_min, c.output_max),
            (c.integral_min, c.integral_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_call_uses_unit_dt() {
        let mut pid = PidController::default();
        let out = pid.compute(10.0, 0.0, 42.0);
        let t = pid.terms();
        // D = kd * (error - 0) / 1.0, no spurious blow-up
        assert_relative_eq!(t.d, 0.005 * 10.0);
        assert_relative_eq!(out, t.output);
    }

    #[test]
    fn backwards_time_falls_back_to_unit_dt() {
        let mut pid = PidController::default();
        pid.compute(1.0, 0.0, 10.0);
        pid.compute(1.0, 0.0, 5.0);
        // would divide by -5 otherwise; D stays finite
        assert!(pid.terms().d.is_finite());
    }
}
