//! Common time/period helpers for roast_core.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Wall-clock period between tick deliveries for a physical timestep and a
/// real-time speedup multiplier.
/// - Clamps `speedup` to a small positive value to avoid division by zero.
/// - Ensures the result is at least 1 microsecond.
#[inline]
pub fn tick_period(timestep_s: f64, speedup: f64) -> Duration {
    let speedup = if speedup.is_finite() && speedup > 0.0 {
        speedup
    } else {
        1.0
    };
    let us = (timestep_s * MICROS_PER_SEC / speedup).max(1.0);
    Duration::from_micros(us as u64)
}

/// Number of oracle steps needed to cover `horizon_s` at `timestep_s`
/// (ceiling division, at least 1).
#[inline]
pub fn steps_for_horizon(horizon_s: f64, timestep_s: f64) -> usize {
    if !(horizon_s > 0.0) || !(timestep_s > 0.0) {
        return 1;
    }
    (horizon_s / timestep_s).ceil().max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_period_scales_with_speedup() {
        assert_eq!(tick_period(1.5, 1.0), Duration::from_micros(1_500_000));
        assert_eq!(tick_period(1.5, 100.0), Duration::from_micros(15_000));
        // degenerate speedup falls back to 1x
        assert_eq!(tick_period(1.0, 0.0), Duration::from_micros(1_000_000));
    }

    #[test]
    fn horizon_steps_round_up() {
        assert_eq!(steps_for_horizon(240.0, 1.5), 160);
        assert_eq!(steps_for_horizon(10.0, 3.0), 4);
        assert_eq!(steps_for_horizon(0.0, 1.5), 1);
    }
}
