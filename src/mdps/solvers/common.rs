use crate::error::{MdpError, Result};
use crate::mdps::mdp::{validate, Action, Mdp, State};
use itertools::Itertools;
use rand::prelude::*;
use std::iter::zip;

/// Safety cap used by the solver entry points that do not take one.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

pub fn check_discount(gamma: f64) -> Result<()> {
    if (0.0..1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(MdpError::InvalidDiscount(gamma))
    }
}

pub fn check_tolerance(tol: f64) -> Result<()> {
    if tol.is_finite() && tol > 0. {
        Ok(())
    } else {
        Err(MdpError::InvalidTolerance(tol))
    }
}

pub(crate) fn check_inputs<M: Mdp + ?Sized>(mdp: &M, gamma: f64, tol: f64) -> Result<()> {
    validate(mdp)?;
    check_discount(gamma)?;
    check_tolerance(tol)
}

pub(crate) fn check_policy<M: Mdp + ?Sized>(mdp: &M, policy: &[Action]) -> Result<()> {
    if policy.len() != mdp.n_s() {
        return Err(MdpError::InvalidPolicy {
            detail: format!("expected {} entries, got {}", mdp.n_s(), policy.len()),
        });
    }
    if let Some((s, a)) = policy.iter().find_position(|&&a| a >= mdp.n_a()) {
        return Err(MdpError::InvalidPolicy {
            detail: format!("state {s} selects action {a} (n_a = {})", mdp.n_a()),
        });
    }

    Ok(())
}

pub(crate) fn check_values<M: Mdp + ?Sized>(mdp: &M, v: &[f64]) -> Result<()> {
    if v.len() == mdp.n_s() {
        Ok(())
    } else {
        Err(MdpError::InvalidValueFunction {
            expected: mdp.n_s(),
            actual: v.len(),
        })
    }
}

/// One-step lookahead Q(s, a) = Σ p · (r + γ · V[s']). Zero for an empty outcome list.
pub fn q_value<M: Mdp + ?Sized>(mdp: &M, v: &[f64], gamma: f64, s: State, a: Action) -> f64 {
    mdp.transitions(s, a)
        .iter()
        .map(|t| t.probability * (t.reward + gamma * v[t.next_state]))
        .sum()
}

/// Q(s, a) for every action of `s`.
pub fn q_values<M: Mdp + ?Sized>(mdp: &M, v: &[f64], gamma: f64, s: State) -> Vec<f64> {
    (0..mdp.n_a())
        .map(|a| q_value(mdp, v, gamma, s, a))
        .collect()
}

/// Largest Q, seeded from action 0 and compared with `>`.
///
/// Callers rely on the reward model being non-negative: with that precondition every
/// Q is >= 0 and the seeded reduction agrees with the optimal backup.
pub(crate) fn seeded_max(qs: &[f64]) -> f64 {
    qs.iter()
        .skip(1)
        .fold(qs[0], |max, &q| if q > max { q } else { max })
}

/// Greedy action for `s` under `v`. Actions whose Q equals the maximum exactly are
/// drawn uniformly from `rng`.
pub(crate) fn greedy_action<M, R>(mdp: &M, v: &[f64], gamma: f64, s: State, rng: &mut R) -> Action
where
    M: Mdp + ?Sized,
    R: Rng + ?Sized,
{
    let qs = q_values(mdp, v, gamma, s);
    let max = seeded_max(&qs);
    let ties = qs.iter().positions(|&q| q == max).collect::<Vec<_>>();

    ties.choose(rng).copied().unwrap_or_default()
}

pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    zip(a, b).fold(0., |d, (x, y)| f64::max(d, (x - y).abs()))
}
