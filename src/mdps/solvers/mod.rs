pub mod common;
pub mod policy_evaluation;
pub mod policy_improvement;
pub mod policy_iteration;
pub mod value_iteration;

pub use common::{max_abs_diff, q_value, q_values, DEFAULT_MAX_ITERATIONS};
pub use policy_evaluation::{policy_evaluation, policy_evaluation_bounded};
pub use policy_improvement::policy_improvement;
pub use policy_iteration::{policy_iteration, policy_iteration_bounded, PolicyIteration};
pub use value_iteration::{value_iteration, value_iteration_bounded, ValueIteration};
