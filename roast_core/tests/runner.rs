use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use roast_core::mocks::ConstantOracle;
use roast_core::runner::{RunParams, run_roast};
use roast_core::{ControlInputs, RoastPhase, RoastSession};

fn fast_session() -> RoastSession<ConstantOracle> {
    RoastSession::builder()
        .oracle(ConstantOracle::default())
        .manual(ControlInputs::default())
        .timestep_s(1.5)
        .charge_settle_s(2.0)
        // short horizon keeps per-tick work trivial at high speedup
        .forecast_horizon_s(3.0)
        .build()
        .unwrap()
}

#[test]
fn run_covers_full_duration_and_drops() {
    let mut session = fast_session();
    let params = RunParams {
        duration_min: 0.5,
        speedup: 20_000.0,
    };
    let outcome = run_roast(&mut session, &params, Arc::new(AtomicBool::new(false))).unwrap();

    // 0.5 min = 30 s simulated at 1.5 s per tick, plus the grace tick.
    assert_eq!(session.phase(), RoastPhase::Dropped);
    assert!(!session.is_running());
    assert!(outcome.sim_minutes >= 0.5);
    assert!(outcome.ticks >= 20);
    assert_eq!(outcome.ticks as usize, session.history().len());
}

#[test]
fn shutdown_flag_forces_an_early_drop() {
    let mut session = fast_session();
    let params = RunParams {
        duration_min: 60.0,
        speedup: 20_000.0,
    };
    let shutdown = Arc::new(AtomicBool::new(true));
    let outcome = run_roast(&mut session, &params, shutdown).unwrap();

    assert_eq!(session.phase(), RoastPhase::Dropped);
    assert!(outcome.sim_minutes < 60.0);
}
