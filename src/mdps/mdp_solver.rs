use super::mdp::{Action, Mdp, State};
use super::solvers::common::q_value;
use crate::error::Result;
use rand::prelude::*;
use serde::Serialize;

/// Converged value function and greedy policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub v: Vec<f64>,
    pub policy: Vec<Action>,
    /// Outer iterations for policy iteration, sweeps for value iteration.
    pub iterations: usize,
}

impl Solution {
    pub fn into_parts(self) -> (Vec<f64>, Vec<Action>) {
        (self.v, self.policy)
    }
}

pub trait MdpSolver {
    fn mdp(&self) -> &dyn Mdp;

    fn solution(&self) -> Option<&Solution>;

    /// Runs the solver with the model's discount. Returns the number of iterations taken.
    fn exec(&mut self, tol: f64, num_iterations: Option<usize>) -> Result<usize>;

    fn v_star(&self, s: State) -> Option<f64> {
        self.solution()?.v.get(s).copied()
    }

    fn q_star(&self, s: State, a: Action) -> Option<f64> {
        let mdp = self.mdp();
        if s >= mdp.n_s() || a >= mdp.n_a() {
            return None;
        }
        let v = &self.solution()?.v;

        Some(q_value(mdp, v, mdp.gamma(), s, a))
    }

    fn pi_star(&self, s: State) -> Option<Action> {
        self.solution()?.policy.get(s).copied()
    }
}

pub(crate) fn solver_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
