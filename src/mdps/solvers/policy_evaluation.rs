use super::common::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::{Action, Mdp};
use tracing::debug;

/// Value function of a fixed deterministic `policy`.
///
/// Synchronous backups: every sweep builds a fresh array from the previous one and stops
/// once the largest per-state change is strictly below `tol`.
pub fn policy_evaluation<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &[Action],
    gamma: f64,
    tol: f64,
) -> Result<Vec<f64>> {
    policy_evaluation_bounded(mdp, policy, gamma, tol, DEFAULT_MAX_ITERATIONS)
}

/// [`policy_evaluation`] with an explicit cap on the number of sweeps.
pub fn policy_evaluation_bounded<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &[Action],
    gamma: f64,
    tol: f64,
    max_sweeps: usize,
) -> Result<Vec<f64>> {
    check_inputs(mdp, gamma, tol)?;
    check_policy(mdp, policy)?;

    evaluate(mdp, policy, gamma, tol, max_sweeps)
}

pub(crate) fn evaluate<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &[Action],
    gamma: f64,
    tol: f64,
    max_sweeps: usize,
) -> Result<Vec<f64>> {
    let mut v = vec![0.; mdp.n_s()];
    let mut delta = f64::INFINITY;

    for sweep in 1..=max_sweeps {
        let v_new = policy
            .iter()
            .enumerate()
            .map(|(s, &a)| q_value(mdp, &v, gamma, s, a))
            .collect::<Vec<_>>();

        delta = max_abs_diff(&v_new, &v);
        v = v_new;
        if delta < tol {
            debug!(sweep, delta, "policy evaluation converged");
            return Ok(v);
        }
    }

    Err(MdpError::NonConvergence {
        algorithm: "policy evaluation",
        iterations: max_sweeps,
        delta,
    })
}
