use roast_core::mocks::{ConstantOracle, EchoPolicy};
use roast_core::{
    ForecastEngine, FixedParams, MpcParams, NeuralController, ReferenceProfile, StateVector,
    expected_input_dim,
};

fn params() -> MpcParams {
    MpcParams {
        n_horizon_s: 60.0,
        dstep_s: 6.0,
        n_past_states: 4,
        n_samples: 10,
        input_dim: 51,
    }
}

#[test]
fn layout_formula_matches_defaults() {
    assert_eq!(expected_input_dim(10, 4), 51);
    assert_eq!(expected_input_dim(1, 1), 3 + 5 + 4);
}

#[test]
fn construction_rejects_input_dim_mismatch() {
    let mut p = params();
    p.input_dim = 50;
    let err = NeuralController::new(p, 1.5, EchoPolicy::default())
        .err()
        .unwrap();
    let msg = err.to_string();
    assert!(msg.contains("input_dim mismatch"), "got: {msg}");
    assert!(msg.contains("51"), "message should name the required size");
}

#[test]
fn construction_rejects_horizon_shorter_than_sample_span() {
    // 10 samples at 6 s spacing need 60 s of horizon.
    let mut p = params();
    p.n_horizon_s = 30.0;
    let err = NeuralController::new(p, 1.5, EchoPolicy::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("n_horizon_s"), "got: {err}");

    let mut p = params();
    p.n_horizon_s = 60.0;
    assert!(NeuralController::new(p, 1.5, EchoPolicy::default()).is_ok());
}

#[test]
fn construction_rejects_degenerate_windows() {
    let mut p = params();
    p.n_past_states = 0;
    p.input_dim = expected_input_dim(p.n_samples, 0);
    assert!(NeuralController::new(p, 1.5, EchoPolicy::default()).is_err());

    let mut p = params();
    p.dstep_s = 0.0;
    assert!(NeuralController::new(p, 1.5, EchoPolicy::default()).is_err());
}

#[test]
fn policy_always_sees_the_configured_input_length() {
    let mut ctrl = NeuralController::new(params(), 1.5, EchoPolicy::returning(0.6, 0.4)).unwrap();
    let profile = ReferenceProfile::default_roast();
    let state = StateVector::preheat(180.0);

    let mut oracle = ConstantOracle::default();
    let engine = ForecastEngine::new(60.0, 1.5);
    let fc = engine
        .generate(
            &mut oracle,
            state,
            &FixedParams::default(),
            100.0,
            0.5,
            0.5,
            0.0,
            None,
        )
        .unwrap();

    for step in 0..5 {
        let t_min = step as f64 * 1.5 / 60.0;
        // Alternate between having a forecast and not; length must not vary.
        let forecast = if step % 2 == 0 { Some(&fc) } else { None };
        ctrl.compute(&state, t_min, &profile, forecast).unwrap();
    }
    // EchoPolicy is owned by the controller; verify via the diagnostics
    // windows instead: every compute pushed exactly one entry.
    assert_eq!(ctrl.past_states().len(), 4);
    assert_eq!(ctrl.past_actions().len(), 4);
}

#[test]
fn sliding_windows_advance_exactly_once_per_compute() {
    let mut ctrl = NeuralController::new(params(), 1.5, EchoPolicy::returning(0.7, 0.3)).unwrap();
    let profile = ReferenceProfile::default_roast();

    let mut state = StateVector::preheat(180.0);
    for i in 0..3 {
        state.t_b = 0.25 + 0.1 * i as f64;
        ctrl.compute(&state, i as f64 * 0.025, &profile, None).unwrap();
    }

    // Window holds [0.0 (seed), 0.25, 0.35, 0.45], oldest first.
    let past: Vec<f64> = ctrl.past_states().iter().copied().collect();
    assert_eq!(past.len(), 4);
    assert_eq!(past[0], 0.0);
    assert_eq!(past[1], 0.25);
    assert_eq!(past[2], 0.35);
    assert_eq!(past[3], 0.45);

    let actions: Vec<[f64; 2]> = ctrl.past_actions().iter().copied().collect();
    assert_eq!(actions[3], [0.7, 0.3]);
    assert_eq!(actions[0], [0.0, 0.0]);
    assert_eq!(ctrl.last_action(), [0.7, 0.3]);
}

#[test]
fn reset_rezeroes_windows_and_keeps_length() {
    let mut ctrl = NeuralController::new(params(), 1.5, EchoPolicy::returning(0.9, 0.1)).unwrap();
    let profile = ReferenceProfile::default_roast();
    let state = StateVector::preheat(180.0);
    for i in 0..6 {
        ctrl.compute(&state, i as f64 * 0.025, &profile, None).unwrap();
    }

    ctrl.reset();
    assert_eq!(ctrl.past_states().len(), 4);
    assert!(ctrl.past_states().iter().all(|&v| v == 0.0));
    assert!(ctrl.past_actions().iter().all(|&a| a == [0.0, 0.0]));
    assert_eq!(ctrl.last_action(), [0.0, 0.0]);

    // Idempotent.
    ctrl.reset();
    assert!(ctrl.past_states().iter().all(|&v| v == 0.0));
}

#[test]
fn out_of_range_actions_are_clamped() {
    let mut ctrl = NeuralController::new(params(), 1.5, EchoPolicy::returning(3.0, -1.0)).unwrap();
    let profile = ReferenceProfile::default_roast();
    let state = StateVector::preheat(180.0);
    let action = ctrl.compute(&state, 0.0, &profile, None).unwrap();
    assert_eq!(action, [1.0, 0.0]);
    assert_eq!(ctrl.last_action(), [1.0, 0.0]);
}

#[test]
fn short_forecast_is_padded_with_last_value() {
    // A 3 s horizon at a 1.5 s timestep yields only 2 forecast points while
    // the layout samples 10; padding must keep compute working.
    let mut ctrl = NeuralController::new(params(), 1.5, EchoPolicy::returning(0.5, 0.5)).unwrap();
    let profile = ReferenceProfile::default_roast();
    let state = StateVector::preheat(180.0);

    let mut oracle = ConstantOracle::default();
    let engine = ForecastEngine::new(3.0, 1.5);
    let fc = engine
        .generate(
            &mut oracle,
            state,
            &FixedParams::default(),
            100.0,
            0.5,
            0.5,
            0.0,
            None,
        )
        .unwrap();
    assert_eq!(fc.len(), 2);
    assert!(ctrl.compute(&state, 0.0, &profile, Some(&fc)).is_ok());
}
