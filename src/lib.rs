//! Policy iteration and value iteration for finite, fully observed MDPs.

pub mod config;
pub mod envs;
pub mod error;
pub mod logging;
pub mod mdps;

pub use config::SolverConfig;
pub use error::{MdpError, Result};
pub use mdps::mdp::{Action, Mdp, State, Transition, TransitionModel};
pub use mdps::mdp_solver::{MdpSolver, Solution};
pub use mdps::solvers::{
    policy_evaluation, policy_improvement, policy_iteration, value_iteration,
};
