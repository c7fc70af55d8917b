use super::common::*;
use super::policy_improvement::improve;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::{has_non_negative_rewards, Mdp};
use crate::mdps::mdp_solver::{solver_rng, MdpSolver, Solution};
use rand::prelude::*;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Value iteration followed by one greedy extraction pass.
///
/// Each sweep sets `V'[s] = max_a Q(s, a)` from the previous sweep and the loop stops
/// when the largest per-state change is strictly below `tol`. Ties in the final policy
/// are broken uniformly through `rng`.
///
/// Precondition: rewards are non-negative. The per-state maximum is seeded from action
/// 0 rather than from negative infinity, which matches the optimal backup only when no
/// Q-value can be negative (e.g. goal-reaching tasks with 0/1 rewards).
pub fn value_iteration<M, R>(mdp: &M, gamma: f64, tol: f64, rng: &mut R) -> Result<Solution>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    value_iteration_bounded(mdp, gamma, tol, DEFAULT_MAX_ITERATIONS, rng)
}

/// [`value_iteration`] with an explicit cap on the number of sweeps.
pub fn value_iteration_bounded<M, R>(
    mdp: &M,
    gamma: f64,
    tol: f64,
    max_sweeps: usize,
    rng: &mut R,
) -> Result<Solution>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    check_inputs(mdp, gamma, tol)?;
    if !has_non_negative_rewards(mdp) {
        warn!("value iteration on a model with negative rewards");
    }

    let mut v = vec![0.; mdp.n_s()];
    let mut delta = f64::INFINITY;

    for sweep in 1..=max_sweeps {
        let v_new = (0..mdp.n_s())
            .map(|s| seeded_max(&q_values(mdp, &v, gamma, s)))
            .collect::<Vec<_>>();

        delta = max_abs_diff(&v_new, &v);
        v = v_new;
        debug!(sweep, delta, "value iteration");
        if delta < tol {
            info!(sweeps = sweep, "value iteration converged");
            let policy = improve(mdp, &v, gamma, rng);
            return Ok(Solution {
                v,
                policy,
                iterations: sweep,
            });
        }
    }

    Err(MdpError::NonConvergence {
        algorithm: "value iteration",
        iterations: max_sweeps,
        delta,
    })
}

pub struct ValueIteration {
    mdp: Rc<dyn Mdp>,
    rng: StdRng,
    solution: Option<Solution>,
}

impl ValueIteration {
    pub fn new(mdp: Rc<dyn Mdp>, seed: Option<u64>) -> Self {
        Self {
            mdp,
            rng: solver_rng(seed),
            solution: None,
        }
    }
}

impl MdpSolver for ValueIteration {
    fn mdp(&self) -> &dyn Mdp {
        self.mdp.as_ref()
    }

    fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    fn exec(&mut self, tol: f64, num_iterations: Option<usize>) -> Result<usize> {
        let solution = value_iteration_bounded(
            self.mdp.as_ref(),
            self.mdp.gamma(),
            tol,
            num_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            &mut self.rng,
        )?;
        let iterations = solution.iterations;
        self.solution = Some(solution);

        Ok(iterations)
    }
}
