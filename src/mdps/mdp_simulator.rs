use super::mdp::{Action, Mdp, State, Transition};
use super::mdp_solver_policy::Policy;
use crate::error::{MdpError, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::debug;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> f64;
}

impl Weighted<Transition> for Transition {
    fn s(&self) -> Transition {
        *self
    }

    fn p(&self) -> f64 {
        self.probability
    }
}

/// Samples one item by weight. `None` when `ts` is empty or carries no weight.
pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Option<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p())).ok()?;
    ts.get(dist.sample(rng)).map(|item| item.s())
}

#[derive(Debug, Clone, Copy)]
pub struct EpisodeStep {
    pub t: usize,
    pub s: State,
    pub a: Action,
    pub next: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_reward: f64,
    /// Whether a terminal outcome was reached within the step budget.
    pub done: bool,
    pub last_state: State,
}

/// Plays `policy` on `mdp` from `start` for at most `max_steps` steps, sampling outcomes
/// by probability. `on_step` sees every step as it happens.
pub fn play_episode<M, P, R, F>(
    mdp: &M,
    policy: &P,
    start: State,
    max_steps: usize,
    rng: &mut R,
    mut on_step: F,
) -> Result<EpisodeSummary>
where
    M: Mdp + ?Sized,
    P: Policy + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&EpisodeStep),
{
    if start >= mdp.n_s() {
        return Err(MdpError::InvalidState {
            state: start,
            n_s: mdp.n_s(),
        });
    }

    let mut summary = EpisodeSummary {
        steps: 0,
        total_reward: 0.,
        done: false,
        last_state: start,
    };

    let mut s = start;
    for t in 0..max_steps {
        let a = policy
            .policy(s)
            .filter(|&a| a < mdp.n_a())
            .ok_or_else(|| MdpError::InvalidPolicy {
                detail: format!("no valid action for state {s}"),
            })?;
        let next: Transition = pick_next(rng, mdp.transitions(s, a))
            .ok_or_else(|| MdpError::malformed(s, a, "no outcomes to sample"))?;

        let step = EpisodeStep { t, s, a, next };
        on_step(&step);

        summary.steps += 1;
        summary.total_reward += next.reward;
        summary.last_state = next.next_state;
        s = next.next_state;
        if next.done {
            summary.done = true;
            break;
        }
    }

    debug!(
        steps = summary.steps,
        reward = summary.total_reward,
        done = summary.done,
        "episode finished"
    );
    Ok(summary)
}
