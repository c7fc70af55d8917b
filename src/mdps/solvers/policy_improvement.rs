use super::common::*;
use crate::error::Result;
use crate::mdps::mdp::{validate, Action, Mdp};
use rand::Rng;

/// Greedy policy with respect to `v`.
///
/// For every state picks an action maximizing the one-step lookahead. When several
/// actions reach the maximum exactly, one of them is drawn uniformly from `rng`, so the
/// result is reproducible only for a pinned random source.
pub fn policy_improvement<M, R>(mdp: &M, v: &[f64], gamma: f64, rng: &mut R) -> Result<Vec<Action>>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    validate(mdp)?;
    check_discount(gamma)?;
    check_values(mdp, v)?;

    Ok(improve(mdp, v, gamma, rng))
}

pub(crate) fn improve<M, R>(mdp: &M, v: &[f64], gamma: f64, rng: &mut R) -> Vec<Action>
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    (0..mdp.n_s())
        .map(|s| greedy_action(mdp, v, gamma, s, rng))
        .collect()
}
