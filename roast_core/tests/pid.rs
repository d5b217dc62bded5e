use roast_core::{PidController, PidGains};

fn pid_with(ki: f64, integral_range: (f64, f64)) -> PidController {
    PidController::new(
        PidGains {
            kp: 0.0,
            ki,
            kd: 0.0,
        },
        (0.0, 1.0),
        integral_range,
    )
}

#[test]
fn integral_saturates_instead_of_winding_up() {
    let mut pid = pid_with(1.0, (-1.0, 1.0));
    // Large persistent error: raw accumulation would reach 100s.
    for step in 1..=100 {
        pid.compute(100.0, 0.0, step as f64);
    }
    assert!(pid.terms().integral <= 1.0);
    assert!(pid.terms().integral >= -1.0);

    // Recovery: once the error flips sign, the clamped accumulator lets
    // the output move immediately rather than burning off wound-up error.
    pid.compute(0.0, 100.0, 101.0);
    assert!(pid.terms().integral < 1.0);
}

#[test]
fn output_respects_actuator_range() {
    let mut pid = PidController::new(
        PidGains {
            kp: 10.0,
            ki: 1.0,
            kd: 1.0,
        },
        (0.0, 1.0),
        (-1.0, 1.0),
    );
    let hi = pid.compute(1000.0, 0.0, 1.0);
    assert_eq!(hi, 1.0);
    let lo = pid.compute(0.0, 1000.0, 2.0);
    assert_eq!(lo, 0.0);
}

#[test]
fn reset_restores_first_call_behavior() {
    let mut pid = PidController::default();
    let first = pid.compute(10.0, 0.0, 5.0);
    pid.compute(10.0, 2.0, 6.5);
    pid.compute(10.0, 4.0, 8.0);

    pid.reset();
    let again = pid.compute(10.0, 0.0, 5.0);
    assert_eq!(first, again);
    assert_eq!(pid.terms().integral, 10.0_f64.min(1.0));

    // Double reset is a no-op.
    pid.reset();
    pid.reset();
    let third = pid.compute(10.0, 0.0, 5.0);
    assert_eq!(first, third);
}

#[test]
fn retune_keeps_integral_state() {
    let mut pid = PidController::default();
    pid.compute(10.0, 0.0, 1.0);
    pid.compute(10.0, 0.0, 2.0);
    let integral_before = pid.terms().integral;

    pid.set_gains(PidGains {
        kp: 0.05,
        ki: 0.002,
        kd: 0.0,
    });
    pid.compute(10.0, 0.0, 3.0);
    assert!(pid.terms().integral >= integral_before);
    assert_eq!(pid.gains().kp, 0.05);
}

#[test]
fn zero_error_holds_steady_output() {
    let mut pid = PidController::default();
    let a = pid.compute(150.0, 150.0, 1.0);
    let b = pid.compute(150.0, 150.0, 2.0);
    assert_eq!(a, b);
    assert_eq!(pid.terms().p, 0.0);
    assert_eq!(pid.terms().d, 0.0);
}
