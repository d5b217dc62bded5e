//! Headless paced roast driver.
//!
//! Runs a full charge → roast → drop cycle against a session, consuming
//! ticks from a `Ticker` at `timestep / speedup` wall seconds each. Physics
//! is advanced only by `RoastSession::tick`, so speedup changes delivery
//! rate, never the timestep. One tick is processed at a time; a stop or
//! reset takes effect before the next tick is consumed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use roast_traits::PredictionOracle;
use roast_traits::clock::MonotonicClock;

use crate::error::Result;
use crate::session::{RoastPhase, RoastSession, TickStatus};
use crate::state::SECS_PER_MIN;
use crate::ticker::Ticker;
use crate::util::tick_period;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Roast length from charge to drop, in simulated minutes.
    pub duration_min: f64,
    /// Wall-clock speedup multiplier for tick delivery.
    pub speedup: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            duration_min: 10.0,
            speedup: 1.0,
        }
    }
}

/// Result summary of a completed roast run.
#[derive(Debug, Clone, Copy)]
pub struct RoastOutcome {
    pub final_bean_probe_c: f64,
    pub sim_minutes: f64,
    pub ticks: u64,
}

/// Drive `session` through one complete roast.
///
/// `shutdown` (e.g. wired to SIGINT) requests an early drop: the current
/// roast ends with the normal drop + grace tick path rather than mid-tick.
pub fn run_roast<O: PredictionOracle>(
    session: &mut RoastSession<O>,
    params: &RunParams,
    shutdown: Arc<AtomicBool>,
) -> Result<RoastOutcome> {
    session.charge()?;
    tracing::info!(
        duration_min = params.duration_min,
        speedup = params.speedup,
        "roast start"
    );

    let ticker = Ticker::spawn(
        tick_period(session.timestep_s(), params.speedup),
        MonotonicClock::new(),
    );

    let mut ticks: u64 = 0;
    loop {
        let Some(_seq) = ticker.recv() else {
            break;
        };
        // A tick that was already in flight when the session was reset is
        // discarded; the phase check makes the stop effective immediately.
        if session.phase() == RoastPhase::Idle {
            tracing::debug!("discarding tick delivered after reset");
            break;
        }

        if shutdown.load(Ordering::Relaxed) && session.phase() == RoastPhase::Roasting {
            tracing::warn!("shutdown requested; dropping beans early");
            session.drop_beans()?;
        }

        match session.tick()? {
            TickStatus::Running => {
                ticks += 1;
                if session.phase() == RoastPhase::Roasting
                    && session.sim_time_s() >= params.duration_min * SECS_PER_MIN
                {
                    session.drop_beans()?;
                }
            }
            TickStatus::Stopped => {
                ticks += 1;
                break;
            }
        }
    }
    drop(ticker);

    let final_bean_probe_c = session
        .history()
        .last()
        .map(|s| s.bean_probe_c)
        .unwrap_or_else(|| session.state().bean_probe_c());
    let outcome = RoastOutcome {
        final_bean_probe_c,
        sim_minutes: session.sim_time_s() / SECS_PER_MIN,
        ticks,
    };
    tracing::info!(
        final_bean_probe_c = outcome.final_bean_probe_c,
        sim_minutes = outcome.sim_minutes,
        ticks = outcome.ticks,
        "roast complete"
    );
    Ok(outcome)
}
