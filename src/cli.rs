//! CLI argument parsing for the grouped correlation pipeline.
//!
//! The CLI is intentionally thin: it resolves defaults and hands a flat
//! argument set to the workflow without embedding policy.

use clap::Parser;
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "sparpipe",
    version,
    about = "Grouped FastSpar correlation pipeline over abundance tables",
    after_help = "Example:\n  sparpipe -o results -a otus.tsv -m metadata.tsv -s Time,Group"
)]
pub struct RootArgs {
    /// Raw abundance table (OTU counts, TSV)
    #[arg(
        short,
        long,
        value_name = "PATH",
        help_heading = "General input and output options"
    )]
    pub abundances: PathBuf,

    /// Metadata table with a sampleID column (TSV)
    #[arg(
        short,
        long,
        value_name = "PATH",
        help_heading = "General input and output options"
    )]
    pub metadata: Option<PathBuf>,

    /// Comma-separated metadata variables to split the data by
    #[arg(
        short,
        long,
        value_name = "VARS",
        default_value = "",
        help_heading = "General input and output options"
    )]
    pub split_vars: String,

    /// Output directory
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = "FastSpar",
        help_heading = "General input and output options"
    )]
    pub out_dir: PathBuf,

    /// Remove per-group bootstrap directories after each group finishes
    #[arg(
        short,
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help_heading = "General input and output options"
    )]
    pub cleanup: bool,

    /// Stop a group's remaining stages after the first failed stage
    #[arg(long, help_heading = "General input and output options")]
    pub halt_on_failure: bool,

    /// Random seed for bootstrap resampling
    #[arg(
        short = 'w',
        long,
        value_name = "INT",
        default_value_t = 123,
        help_heading = "FastSpar options"
    )]
    pub seed: u64,

    /// Number of FastSpar iterations for the full-table call
    #[arg(
        short,
        long,
        value_name = "INT",
        default_value_t = 50,
        help_heading = "FastSpar options"
    )]
    pub iterations: u32,

    /// Number of FastSpar exclusion iterations
    #[arg(
        short = 'x',
        long,
        value_name = "INT",
        default_value_t = 10,
        help_heading = "FastSpar options"
    )]
    pub exclusion_iterations: u32,

    /// Number of iterations for the bootstrapped tables
    #[arg(
        short = 'j',
        long,
        value_name = "INT",
        default_value_t = 5,
        help_heading = "FastSpar options"
    )]
    pub iterations_parallel: u32,

    /// Number of bootstrap count tables to generate
    #[arg(
        short = 'n',
        long,
        value_name = "INT",
        default_value_t = 1000,
        help_heading = "FastSpar options"
    )]
    pub num_random: u32,

    /// Number of permutations for the p-value test
    #[arg(
        short,
        long,
        value_name = "INT",
        default_value_t = 1000,
        help_heading = "FastSpar options"
    )]
    pub permutations: u32,

    /// Correlation strength exclusion threshold
    #[arg(
        short,
        long,
        value_name = "FLOAT",
        default_value_t = 0.1,
        help_heading = "FastSpar options"
    )]
    pub exclusion_threshold: f64,

    /// Threads for the correlation and p-value calls
    #[arg(
        short,
        long,
        value_name = "INT",
        default_value_t = 1,
        help_heading = "FastSpar options"
    )]
    pub threads: u32,
}
