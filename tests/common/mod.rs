use rand::prelude::*;
use rl_dp::mdps::solvers::q_values;
use rl_dp::{Action, Mdp, Transition, TransitionModel};

#[allow(dead_code)]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// State 0 pays 1 on its way into the absorbing state 1.
#[allow(dead_code)]
pub fn two_state_chain(gamma: f64) -> TransitionModel {
    TransitionModel::from_table(
        gamma,
        vec![
            vec![vec![Transition::new(1., 1, 1., true)]],
            vec![vec![Transition::new(1., 1, 0., true)]],
        ],
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn random_policy<M: Mdp>(mdp: &M, rng: &mut StdRng) -> Vec<Action> {
    (0..mdp.n_s()).map(|_| rng.gen_range(0..mdp.n_a())).collect()
}

#[allow(dead_code)]
pub fn max_q<M: Mdp>(mdp: &M, v: &[f64], gamma: f64, s: usize) -> f64 {
    q_values(mdp, v, gamma, s)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max)
}
