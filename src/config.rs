use crate::error::Result;
use crate::mdps::solvers::common::{check_discount, check_tolerance, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parameters shared by every solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub gamma: f64,
    pub tol: f64,
    /// Cap on sweeps and outer iterations; exceeding it is a non-convergence error.
    pub max_iterations: usize,
    /// Pins tie-breaking. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            tol: 1e-8,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_discount(self.gamma)?;
        check_tolerance(self.tol)
    }
}
