use proptest::prelude::*;
use roast_core::{PidController, PidGains};

proptest! {
    // Whatever the gains, setpoint trajectory, and clock behavior, the
    // actuator command never leaves its configured range and never goes
    // non-finite.
    #[test]
    fn pid_output_stays_in_actuator_range(
        kp in 0.0f64..10.0,
        ki in 0.0f64..1.0,
        kd in 0.0f64..1.0,
        setpoints in prop::collection::vec(-500.0f64..500.0, 1..200),
        measurements in prop::collection::vec(-500.0f64..500.0, 1..200),
        // deliberately includes zero and negative steps
        dt_steps in prop::collection::vec(-2.0f64..5.0, 1..200),
    ) {
        let mut pid = PidController::new(
            PidGains { kp, ki, kd },
            (0.0, 1.0),
            (-1.0, 1.0),
        );
        let mut now = 0.0;
        let n = setpoints.len().min(measurements.len()).min(dt_steps.len());
        for i in 0..n {
            now += dt_steps[i];
            let out = pid.compute(setpoints[i], measurements[i], now);
            prop_assert!(out.is_finite());
            prop_assert!((0.0..=1.0).contains(&out));
            prop_assert!((-1.0..=1.0).contains(&pid.terms().integral));
        }
    }

    // The integral clamp bounds the I contribution regardless of how long
    // a large error persists.
    #[test]
    fn integral_term_is_bounded_by_clamp(
        error in 1.0f64..1000.0,
        steps in 1usize..500,
    ) {
        let mut pid = PidController::new(
            PidGains { kp: 0.0, ki: 1.0, kd: 0.0 },
            (0.0, 10.0),
            (-2.0, 2.0),
        );
        for step in 0..steps {
            pid.compute(error, 0.0, step as f64 + 1.0);
        }
        prop_assert!(pid.terms().i <= 2.0 + 1e-12);
    }
}
