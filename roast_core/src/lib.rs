#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core roaster-twin logic (model-agnostic).
//!
//! This crate provides the simulation/control loop for a drum-roaster
//! digital twin. All model interactions go through the
//! `roast_traits::PredictionOracle` and `roast_traits::PolicyNetwork` traits.
//!
//! ## Architecture
//!
//! - **State**: 5-field normalized state vector and scale contract (`state`)
//! - **Profiles**: piecewise-linear reference trajectories (`profile`)
//! - **Control**: manual passthrough, PID heater loop (`pid`), receding-horizon
//!   neural controller (`mpc`)
//! - **Forecast**: held-control multi-step prediction (`forecast`)
//! - **Session**: phase state machine and fixed-timestep tick (`session`)
//! - **Pacing**: tick delivery thread and headless driver (`ticker`, `runner`)
//!
//! ## Units
//!
//! Internals operate in **normalized units** (physical value ÷ fixed scale;
//! 100 for temperatures, percentages and grams, 60 for seconds→minutes) for
//! deterministic behavior at the oracle boundary. History and forecast series
//! are denormalized at the edge.

// Module declarations
pub mod error;
pub mod forecast;
pub mod mocks;
pub mod mpc;
pub mod pid;
pub mod profile;
pub mod runner;
pub mod session;
pub mod state;
pub mod ticker;
pub mod util;

pub use error::{BuildError, Result, RoastError};
pub use forecast::{Forecast, ForecastEngine, LiveAnchor};
pub use mpc::{MpcParams, NeuralController, expected_input_dim};
pub use pid::{PidController, PidGains, PidTerms};
pub use profile::{ProfileSummary, ReferenceProfile, Waypoint};
pub use session::{
    Controller, HistorySample, RoastHistory, RoastPhase, RoastSession, RoastSessionBuilder,
    TickStatus,
};
pub use state::{
    ControlInputs, DEFAULT_BEAN_CAPACITY, FixedParams, MASS_SCALE_G, PERCENT_SCALE, SECS_PER_MIN,
    StateVector, TEMP_SCALE, assemble_controls,
};
