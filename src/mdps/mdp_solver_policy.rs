use super::mdp::{Action, State};
use super::mdp_solver::{MdpSolver, Solution};
use std::rc::Rc;

pub trait Policy {
    fn policy(&self, s: State) -> Option<Action>;
}

impl Policy for [Action] {
    fn policy(&self, s: State) -> Option<Action> {
        self.get(s).copied()
    }
}

impl Policy for Vec<Action> {
    fn policy(&self, s: State) -> Option<Action> {
        self.as_slice().policy(s)
    }
}

impl Policy for Solution {
    fn policy(&self, s: State) -> Option<Action> {
        self.policy.policy(s)
    }
}

pub struct MdpSolverPolicy {
    pub mdp_solver: Rc<dyn MdpSolver>,
}

impl Policy for MdpSolverPolicy {
    fn policy(&self, s: State) -> Option<Action> {
        self.mdp_solver.pi_star(s)
    }
}
