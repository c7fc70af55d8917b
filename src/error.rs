use crate::mdps::mdp::{Action, State};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MdpError>;

#[derive(Debug, Error)]
pub enum MdpError {
    #[error("invalid dimension: n_s = {n_s}, n_a = {n_a} (both must be positive)")]
    InvalidDimension { n_s: usize, n_a: usize },

    #[error("invalid discount factor: {0} (must be in [0, 1))")]
    InvalidDiscount(f64),

    #[error("invalid tolerance: {0} (must be positive and finite)")]
    InvalidTolerance(f64),

    #[error("malformed transition model at state {state}, action {action}: {detail}")]
    MalformedTransitionModel {
        state: State,
        action: Action,
        detail: String,
    },

    #[error("invalid state {state} (n_s = {n_s})")]
    InvalidState { state: State, n_s: usize },

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("invalid policy: {detail}")]
    InvalidPolicy { detail: String },

    #[error("invalid value function: expected {expected} entries, got {actual}")]
    InvalidValueFunction { expected: usize, actual: usize },

    #[error("{algorithm} did not converge within {iterations} iterations (last delta {delta})")]
    NonConvergence {
        algorithm: &'static str,
        iterations: usize,
        delta: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from gym server: {0}")]
    GymProtocol(String),
}

impl MdpError {
    pub(crate) fn malformed(state: State, action: Action, detail: impl Into<String>) -> Self {
        Self::MalformedTransitionModel {
            state,
            action,
            detail: detail.into(),
        }
    }
}
