use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RoastError {
    #[error("prediction oracle error: {0}")]
    Oracle(String),
    #[error("policy network error: {0}")]
    Policy(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid profile: {0}")]
    Profile(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing prediction oracle")]
    MissingOracle,
    #[error("missing reference profile (required for pid and neural modes)")]
    MissingProfile,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
