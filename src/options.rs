//! Resolved numeric options forwarded to the external estimator tools.
//!
//! The struct doubles as the schema of the per-run options manifest so a
//! later audit can reproduce exact parameters.

use serde::Serialize;

use crate::cli::RootArgs;

/// Numeric parameters for the FastSpar tool chain, resolved once per run.
#[derive(Debug, Clone, Serialize)]
pub struct EstimatorOptions {
    /// Random seed for bootstrap resampling.
    pub seed: u64,
    /// Number of bootstrap count tables to generate.
    pub num_random: u32,
    /// Number of permutations for the p-value test.
    #[serde(rename = "num_permuts")]
    pub permutations: u32,
    /// Estimator iterations for the full-table correlation call.
    pub iterations: u32,
    /// Exclusion-refinement iterations of the estimator.
    pub exclusion_iterations: u32,
    /// Reduced iteration count for the bootstrap fan-out calls.
    pub iterations_parallel: u32,
    /// Correlation strength threshold for pair exclusion.
    pub exclusion_threshold: f64,
    /// Thread count for the correlation and p-value calls.
    pub threads: u32,
}

impl EstimatorOptions {
    /// Resolve options from the parsed command line.
    pub fn from_cli(args: &RootArgs) -> Self {
        Self {
            seed: args.seed,
            num_random: args.num_random,
            permutations: args.permutations,
            iterations: args.iterations,
            exclusion_iterations: args.exclusion_iterations,
            iterations_parallel: args.iterations_parallel,
            exclusion_threshold: args.exclusion_threshold,
            threads: args.threads,
        }
    }
}
