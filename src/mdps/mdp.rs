use crate::error::{MdpError, Result};
use crate::mdps::solvers::common::check_discount;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub type State = usize;
pub type Action = usize;

/// Outcome probabilities of a non-empty (state, action) list must sum to 1 within this.
pub const PROB_TOLERANCE: f64 = 1e-6;

/// One outcome of taking an action. Serialized as the gym tuple
/// `[probability, next_state, reward, done]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, State, f64, bool)", into = "(f64, State, f64, bool)")]
pub struct Transition {
    pub probability: f64,
    pub next_state: State,
    pub reward: f64,
    pub done: bool,
}

impl Transition {
    pub fn new(probability: f64, next_state: State, reward: f64, done: bool) -> Self {
        Self {
            probability,
            next_state,
            reward,
            done,
        }
    }
}

impl From<(f64, State, f64, bool)> for Transition {
    fn from((probability, next_state, reward, done): (f64, State, f64, bool)) -> Self {
        Self::new(probability, next_state, reward, done)
    }
}

impl From<Transition> for (f64, State, f64, bool) {
    fn from(t: Transition) -> Self {
        (t.probability, t.next_state, t.reward, t.done)
    }
}

/// Markov Decision Process - Sutton & Barto 2018.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    /// Ordered outcomes of taking `a` in `s`. Empty when nothing is known about the pair.
    fn transitions(&self, s: State, a: Action) -> &[Transition];

    // TODO: Gamma should not be here. Move it into SolverConfig.
    fn gamma(&self) -> f64;
}

/// Checks dimensions and every outcome list of `mdp`.
///
/// An empty outcome list is accepted: it contributes zero value during backups.
pub fn validate<M: Mdp + ?Sized>(mdp: &M) -> Result<()> {
    let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
    if n_s == 0 || n_a == 0 {
        return Err(MdpError::InvalidDimension { n_s, n_a });
    }

    for s in 0..n_s {
        for a in 0..n_a {
            let ts = mdp.transitions(s, a);
            if ts.is_empty() {
                continue;
            }

            let mut sum = 0.;
            for (i, t) in ts.iter().enumerate() {
                if !t.probability.is_finite() || !(0.0..=1.0).contains(&t.probability) {
                    return Err(MdpError::malformed(
                        s,
                        a,
                        format!("outcome {i} has probability {}", t.probability),
                    ));
                }
                if !t.reward.is_finite() {
                    return Err(MdpError::malformed(
                        s,
                        a,
                        format!("outcome {i} has reward {}", t.reward),
                    ));
                }
                if t.next_state >= n_s {
                    return Err(MdpError::malformed(
                        s,
                        a,
                        format!("outcome {i} leads to state {} (n_s = {n_s})", t.next_state),
                    ));
                }
                sum += t.probability;
            }

            if (sum - 1.).abs() > PROB_TOLERANCE {
                return Err(MdpError::malformed(
                    s,
                    a,
                    format!("probabilities sum to {sum}"),
                ));
            }
        }
    }

    Ok(())
}

/// Dense transition model laid out state-major, action-minor.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    n_s: usize,
    n_a: usize,
    gamma: f64,
    outcomes: Vec<Vec<Transition>>,
}

impl TransitionModel {
    /// A model where every (state, action) pair has no outcomes yet.
    pub fn new(n_s: usize, n_a: usize, gamma: f64) -> Result<Self> {
        if n_s == 0 || n_a == 0 {
            return Err(MdpError::InvalidDimension { n_s, n_a });
        }
        check_discount(gamma)?;

        Ok(Self {
            n_s,
            n_a,
            gamma,
            outcomes: vec![Vec::new(); n_s * n_a],
        })
    }

    /// Builds and validates a model from `table[s][a]` outcome lists.
    pub fn from_table(gamma: f64, table: Vec<Vec<Vec<Transition>>>) -> Result<Self> {
        let n_s = table.len();
        let n_a = table.first().map_or(0, Vec::len);
        let mut model = Self::new(n_s, n_a, gamma)?;

        for (s, row) in table.into_iter().enumerate() {
            if row.len() != n_a {
                return Err(MdpError::malformed(
                    s,
                    row.len().min(n_a),
                    format!("expected {n_a} actions, got {}", row.len()),
                ));
            }
            for (a, ts) in row.into_iter().enumerate() {
                model.outcomes[s * n_a + a] = ts;
            }
        }

        validate(&model)?;
        Ok(model)
    }

    /// Replaces the outcomes of (`s`, `a`). Outcome contents are checked by [`validate`].
    pub fn insert(&mut self, s: State, a: Action, ts: Vec<Transition>) -> Result<()> {
        if s >= self.n_s || a >= self.n_a {
            return Err(MdpError::malformed(
                s,
                a,
                format!("pair outside {}x{} model", self.n_s, self.n_a),
            ));
        }
        self.outcomes[s * self.n_a + a] = ts;
        Ok(())
    }

    pub fn with_gamma(mut self, gamma: f64) -> Result<Self> {
        check_discount(gamma)?;
        self.gamma = gamma;
        Ok(self)
    }

    /// True when no outcome carries a negative reward.
    pub fn has_non_negative_rewards(&self) -> bool {
        has_non_negative_rewards(self)
    }

    pub fn to_model_file(&self) -> ModelFile {
        ModelFile {
            gamma: self.gamma,
            transitions: self
                .outcomes
                .chunks(self.n_a)
                .map(|row| row.to_vec())
                .collect(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: ModelFile = serde_json::from_reader(reader)?;
        file.compile()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut w, &self.to_model_file())?;
        w.flush()?;
        Ok(())
    }
}

impl Mdp for TransitionModel {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self, s: State, a: Action) -> &[Transition] {
        &self.outcomes[s * self.n_a + a]
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }
}

pub fn has_non_negative_rewards<M: Mdp + ?Sized>(mdp: &M) -> bool {
    (0..mdp.n_s()).all(|s| {
        (0..mdp.n_a()).all(|a| mdp.transitions(s, a).iter().all(|t| t.reward >= 0.))
    })
}

/// Serializable form of a [`TransitionModel`]: `transitions[s][a]` is a list of
/// `[probability, next_state, reward, done]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub gamma: f64,
    pub transitions: Vec<Vec<Vec<Transition>>>,
}

impl ModelFile {
    pub fn compile(self) -> Result<TransitionModel> {
        TransitionModel::from_table(self.gamma, self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertor::*;

    fn two_state() -> Vec<Vec<Vec<Transition>>> {
        vec![
            vec![vec![Transition::new(1., 1, 1., true)]],
            vec![vec![Transition::new(1., 1, 0., true)]],
        ]
    }

    #[test]
    fn from_table_is_state_major() {
        let m = TransitionModel::from_table(0.9, two_state()).unwrap();

        assert_eq!(m.n_s(), 2);
        assert_eq!(m.n_a(), 1);
        assert_eq!(m.transitions(0, 0)[0].next_state, 1);
        assert_eq!(m.transitions(1, 0)[0].reward, 0.);
    }

    #[test]
    fn empty_outcome_list_is_valid() {
        let mut m = TransitionModel::new(2, 2, 0.5).unwrap();
        m.insert(0, 1, vec![Transition::new(1., 1, 0., false)])
            .unwrap();

        assert!(validate(&m).is_ok());
        assert!(m.transitions(1, 1).is_empty());
        assert_that!(m.transitions(0, 1).to_vec())
            .contains_exactly(vec![Transition::new(1., 1, 0., false)]);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            TransitionModel::new(0, 4, 0.9),
            Err(MdpError::InvalidDimension { n_s: 0, n_a: 4 })
        ));
        assert!(matches!(
            TransitionModel::from_table(0.9, vec![]),
            Err(MdpError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        let mut table = two_state();
        table[0][0] = vec![
            Transition::new(0.5, 0, 0., false),
            Transition::new(0.4, 1, 1., true),
        ];

        let err = TransitionModel::from_table(0.9, table).unwrap_err();
        assert!(matches!(
            err,
            MdpError::MalformedTransitionModel {
                state: 0,
                action: 0,
                ..
            }
        ));
    }

    #[test]
    fn next_state_must_be_in_range() {
        let mut table = two_state();
        table[1][0] = vec![Transition::new(1., 2, 0., true)];

        let err = TransitionModel::from_table(0.9, table).unwrap_err();
        assert!(matches!(
            err,
            MdpError::MalformedTransitionModel {
                state: 1,
                action: 0,
                ..
            }
        ));
    }

    #[test]
    fn ragged_table_is_rejected() {
        let mut table = two_state();
        table[1].push(vec![]);

        assert!(TransitionModel::from_table(0.9, table).is_err());
    }

    #[test]
    fn discount_is_checked_on_construction() {
        assert!(matches!(
            TransitionModel::from_table(1.0, two_state()),
            Err(MdpError::InvalidDiscount(_))
        ));
    }

    #[test]
    fn json_uses_gym_tuples() {
        let json = r#"{"gamma": 0.9, "transitions": [[[[1.0, 1, 1.0, true]]], [[[1.0, 1, 0.0, true]]]]}"#;
        let m = TransitionModel::from_reader(json.as_bytes()).unwrap();

        assert_eq!(m, TransitionModel::from_table(0.9, two_state()).unwrap());

        let back = serde_json::to_value(m.to_model_file()).unwrap();
        assert_eq!(back["transitions"][0][0][0][1], 1);
    }

    #[test]
    fn reward_sign_check() {
        let mut table = two_state();
        assert!(TransitionModel::from_table(0.9, table.clone())
            .unwrap()
            .has_non_negative_rewards());

        table[0][0][0].reward = -1.;
        assert!(!TransitionModel::from_table(0.9, table)
            .unwrap()
            .has_non_negative_rewards());
    }
}
