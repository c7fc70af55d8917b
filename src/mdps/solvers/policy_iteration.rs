use super::common::*;
use super::policy_evaluation::evaluate;
use super::policy_improvement::improve;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::Mdp;
use crate::mdps::mdp_solver::{solver_rng, MdpSolver, Solution};
use rand::prelude::*;
use std::rc::Rc;
use tracing::{debug, info};

/// Policy iteration starting from the all-zero policy.
///
/// Each round evaluates the current policy, improves it greedily and evaluates the
/// candidate. The loop ends when the candidate equals the current policy, or when the
/// two value functions differ by less than `tol`. On the first round a below-`tol`
/// difference only counts if the new values are not all zero.
pub fn policy_iteration<M, R>(mdp: &M, gamma: f64, tol: f64, rng: &mut R) -> Result<Solution>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    policy_iteration_bounded(mdp, gamma, tol, DEFAULT_MAX_ITERATIONS, rng)
}

/// [`policy_iteration`] with one cap shared by the outer loop and every evaluation.
pub fn policy_iteration_bounded<M, R>(
    mdp: &M,
    gamma: f64,
    tol: f64,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Solution>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    check_inputs(mdp, gamma, tol)?;

    let mut policy = vec![0; mdp.n_s()];
    let mut v = evaluate(mdp, &policy, gamma, tol, max_iterations)?;
    let mut delta = f64::INFINITY;

    for iteration in 1..=max_iterations {
        let candidate = improve(mdp, &v, gamma, rng);
        let v_new = evaluate(mdp, &candidate, gamma, tol, max_iterations)?;

        delta = max_abs_diff(&v_new, &v);
        let stable = candidate == policy;
        let settled = delta < tol && (iteration > 1 || v_new.iter().any(|&x| x != 0.));
        debug!(iteration, delta, stable, "policy iteration");

        policy = candidate;
        v = v_new;
        if stable || settled {
            info!(iterations = iteration, stable, "policy iteration converged");
            return Ok(Solution {
                v,
                policy,
                iterations: iteration,
            });
        }
    }

    Err(MdpError::NonConvergence {
        algorithm: "policy iteration",
        iterations: max_iterations,
        delta,
    })
}

pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    rng: StdRng,
    solution: Option<Solution>,
}

impl PolicyIteration {
    pub fn new(mdp: Rc<dyn Mdp>, seed: Option<u64>) -> Self {
        Self {
            mdp,
            rng: solver_rng(seed),
            solution: None,
        }
    }
}

impl MdpSolver for PolicyIteration {
    fn mdp(&self) -> &dyn Mdp {
        self.mdp.as_ref()
    }

    fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    fn exec(&mut self, tol: f64, num_iterations: Option<usize>) -> Result<usize> {
        let solution = policy_iteration_bounded(
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
