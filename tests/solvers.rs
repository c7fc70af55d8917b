mod common;

use assertor::*;
use common::*;
use float_eq::*;
use rl_dp::envs::frozen_lake::FrozenLake;
use rl_dp::envs::simple_golf::SimpleGolf;
use rl_dp::mdps::solvers::*;
use rl_dp::{Mdp, MdpError, Transition, TransitionModel};
use rstest::rstest;

fn lake(map: &str, slippery: bool, gamma: f64) -> FrozenLake {
    match map {
        "4x4" => FrozenLake::map_4x4(slippery, gamma).unwrap(),
        _ => FrozenLake::map_8x8(slippery, gamma).unwrap(),
    }
}

#[test]
fn two_state_scenario() {
    let mdp = two_state_chain(0.9);

    for sol in [
        policy_iteration(&mdp, 0.9, 1e-8, &mut rng(1)).unwrap(),
        value_iteration(&mdp, 0.9, 1e-8, &mut rng(1)).unwrap(),
    ] {
        assert_float_eq!(sol.v, vec![1., 0.], abs_all <= 1e-8);
        assert_eq!(sol.policy[0], 0);
    }
}

#[rstest]
#[case("4x4", false)]
#[case("4x4", true)]
#[case("8x8", false)]
#[case("8x8", true)]
fn evaluation_satisfies_bellman_expectation(#[case] map: &str, #[case] slippery: bool) {
    let mdp = lake(map, slippery, 0.9);
    let policy = random_policy(&mdp, &mut rng(11));
    let tol = 1e-9;

    let v = policy_evaluation(&mdp, &policy, 0.9, tol).unwrap();

    assert_that!(v.len()).is_equal_to(mdp.n_s());
    for (s, &a) in policy.iter().enumerate() {
        assert_float_eq!(v[s], q_value(&mdp, &v, 0.9, s, a), abs <= tol);
    }
}

#[rstest]
#[case("4x4", true, 3)]
#[case("8x8", true, 5)]
#[case("8x8", false, 8)]
fn improvement_is_greedy_and_monotone(
    #[case] map: &str,
    #[case] slippery: bool,
    #[case] seed: u64,
) {
    let mdp = lake(map, slippery, 0.9);
    let r = &mut rng(seed);
    let policy = random_policy(&mdp, r);

    let v = policy_evaluation(&mdp, &policy, 0.9, 1e-10).unwrap();
    let improved = policy_improvement(&mdp, &v, 0.9, r).unwrap();
    let v_new = policy_evaluation(&mdp, &improved, 0.9, 1e-10).unwrap();

    for s in 0..mdp.n_s() {
        assert_eq!(q_value(&mdp, &v, 0.9, s, improved[s]), max_q(&mdp, &v, 0.9, s));
        assert!(v_new[s] >= v[s] - 1e-8, "state {s}: {} < {}", v_new[s], v[s]);
    }
}

#[rstest]
#[case("4x4", false, 0.9)]
#[case("4x4", true, 0.9)]
#[case("8x8", false, 0.9)]
#[case("8x8", true, 0.95)]
fn policy_and_value_iteration_agree(#[case] map: &str, #[case] slippery: bool, #[case] gamma: f64) {
    let mdp = lake(map, slippery, gamma);
    let tol = 1e-10;

    let pi = policy_iteration(&mdp, gamma, tol, &mut rng(2718)).unwrap();
    let vi = value_iteration(&mdp, gamma, tol, &mut rng(2718)).unwrap();

    assert_float_eq!(pi.v, vi.v, abs_all <= 1e-6);
    // Both policies are greedy with respect to the optimal values.
    for s in 0..mdp.n_s() {
        let best = max_q(&mdp, &vi.v, gamma, s);
        assert_float_eq!(q_value(&mdp, &vi.v, gamma, s, pi.policy[s]), best, abs <= 1e-6);
        assert_float_eq!(q_value(&mdp, &vi.v, gamma, s, vi.policy[s]), best, abs <= 1e-6);
    }
}

#[test]
fn deterministic_lake_values_are_discounted_distances() {
    let mdp = FrozenLake::map_4x4(false, 0.9).unwrap();

    let sol = value_iteration(&mdp, 0.9, 1e-10, &mut rng(0)).unwrap();

    // 0.9^(steps to the goal - 1); holes and the goal itself are worth nothing.
    let expected = vec![
        0.59049, 0.6561, 0.729, 0.6561, //
        0.6561, 0., 0.81, 0., //
        0.729, 0.81, 0.9, 0., //
        0., 0.9, 1., 0.,
    ];
    assert_float_eq!(sol.v, expected, abs_all <= 1e-8);
}

#[test]
fn zero_discount_is_one_backup() {
    let mdp = FrozenLake::map_4x4(true, 0.).unwrap();

    let sol = value_iteration(&mdp, 0., 1e-8, &mut rng(0)).unwrap();

    assert_eq!(sol.iterations, 2);
    // Only the cells next to the goal can earn anything immediately.
    assert_float_eq!(sol.v[14], 1. / 3., abs <= 1e-12);
    assert_float_eq!(sol.v[11], 0., abs <= 1e-12);
    assert_float_eq!(sol.v[0], 0., abs <= 1e-12);
}

#[test]
fn empty_outcome_lists_do_not_fail() {
    let mdp = SimpleGolf::new(0.9);

    let pi = policy_iteration(&mdp, 0.9, 1e-10, &mut rng(5)).unwrap();
    let vi = value_iteration(&mdp, 0.9, 1e-10, &mut rng(5)).unwrap();

    assert_float_eq!(pi.v, vi.v, abs_all <= 1e-8);
    assert_eq!(vi.v[2], 0.);
}

#[test]
fn inputs_are_checked_before_iterating() {
    let mdp = two_state_chain(0.9);
    let r = &mut rng(0);

    assert!(matches!(
        value_iteration(&mdp, 1.0, 1e-8, r),
        Err(MdpError::InvalidDiscount(_))
    ));
    assert!(matches!(
        value_iteration(&mdp, 0.9, 0., r),
        Err(MdpError::InvalidTolerance(_))
    ));
    assert!(matches!(
        policy_iteration(&mdp, -0.5, 1e-8, r),
        Err(MdpError::InvalidDiscount(_))
    ));
    assert!(matches!(
        policy_evaluation(&mdp, &[0, 0], 0.9, f64::NAN),
        Err(MdpError::InvalidTolerance(_))
    ));
}

/// Wraps a model without going through `TransitionModel::from_table` validation.
struct Unchecked(Vec<Vec<Transition>>);

impl Mdp for Unchecked {
    fn n_s(&self) -> usize {
        self.0.len()
    }

    fn n_a(&self) -> usize {
        1
    }

    fn transitions(&self, s: usize, _a: usize) -> &[Transition] {
        &self.0[s]
    }

    fn gamma(&self) -> f64 {
        0.9
    }
}

#[test]
fn malformed_models_fail_fast() {
    let leaky = Unchecked(vec![vec![Transition::new(0.7, 0, 1., false)]]);
    let dangling = Unchecked(vec![vec![Transition::new(1., 4, 1., false)]]);
    let empty = Unchecked(vec![]);

    for mdp in [&leaky, &dangling] {
        assert!(matches!(
            value_iteration(mdp, 0.9, 1e-8, &mut rng(0)),
            Err(MdpError::MalformedTransitionModel { state: 0, .. })
        ));
        assert!(matches!(
            policy_iteration(mdp, 0.9, 1e-8, &mut rng(0)),
            Err(MdpError::MalformedTransitionModel { .. })
        ));
    }
    assert!(matches!(
        policy_evaluation(&empty, &[], 0.9, 1e-8),
        Err(MdpError::InvalidDimension { n_s: 0, .. })
    ));
}

#[test]
fn caps_surface_as_non_convergence() {
    let mdp = FrozenLake::map_8x8(true, 0.99).unwrap();

    let err = value_iteration_bounded(&mdp, 0.99, 1e-12, 10, &mut rng(0)).unwrap_err();
    assert!(matches!(err, MdpError::NonConvergence { iterations: 10, .. }));

    let err = policy_iteration_bounded(&mdp, 0.99, 1e-12, 10, &mut rng(0)).unwrap_err();
    assert!(matches!(err, MdpError::NonConvergence { .. }));
}

#[test]
fn model_file_round_trip_solves_the_same() {
    let lake = FrozenLake::map_4x4(true, 0.9).unwrap();
    let json = serde_json::to_string(&lake.model().to_model_file()).unwrap();
    let loaded = TransitionModel::from_reader(json.as_bytes()).unwrap();

    let a = value_iteration(&lake, 0.9, 1e-8, &mut rng(1)).unwrap();
    let b = value_iteration(&loaded, 0.9, 1e-8, &mut rng(1)).unwrap();

    assert_eq!(loaded.n_s(), lake.n_s());
    assert_float_eq!(a.v, b.v, abs_all <= 1e-12);
}
