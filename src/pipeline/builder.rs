//! Construction of the per-group stage sequence.
//!
//! Every artifact a stage reads was written by an earlier stage under a
//! deterministic name, so the builder only ever needs the persisted group
//! file, the derived artifact paths, and the resolved numeric options.

use std::path::Path;

use super::{Stage, StageAction, StageKind};
use crate::options::EstimatorOptions;
use crate::workspace::GroupArtifacts;

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// Build the ordered stage list for one persisted group file.
///
/// Four stages, plus a trailing cleanup stage when requested. The list is
/// strictly positional: each stage consumes the previous stage's outputs by
/// path convention.
pub fn build_stages(
    group_file: &Path,
    artifacts: &GroupArtifacts,
    options: &EstimatorOptions,
    cleanup: bool,
) -> Vec<Stage> {
    let base = group_file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("group");
    let group_file_arg = path_arg(group_file);
    let correlation = path_arg(&artifacts.correlation);
    let covariance = path_arg(&artifacts.covariance);
    let counts_dir = path_arg(&artifacts.bootstrap_counts_dir);
    let correlation_dir = path_arg(&artifacts.bootstrap_correlation_dir);

    let mut stages = vec![
        Stage {
            kind: StageKind::Correlation,
            action: StageAction::Command {
                program: "fastspar".to_string(),
                args: vec![
                    "--yes".to_string(),
                    "--otu_table".to_string(),
                    group_file_arg.clone(),
                    "--correlation".to_string(),
                    correlation.clone(),
                    "--covariance".to_string(),
                    covariance,
                    "--iterations".to_string(),
                    options.iterations.to_string(),
                    "-x".to_string(),
                    options.exclusion_iterations.to_string(),
                    "-e".to_string(),
                    options.exclusion_threshold.to_string(),
                    "-t".to_string(),
                    options.threads.to_string(),
                ],
                fan_out_dir: None,
            },
            requires: vec![group_file.to_path_buf()],
        },
        Stage {
            kind: StageKind::BootstrapGenerate,
            action: StageAction::Command {
                program: "fastspar_bootstrap".to_string(),
                args: vec![
                    "--otu_table".to_string(),
                    group_file_arg.clone(),
                    "--number".to_string(),
                    options.num_random.to_string(),
                    "--prefix".to_string(),
                    format!("{counts_dir}/{base}"),
                    "-s".to_string(),
                    options.seed.to_string(),
                ],
                fan_out_dir: None,
            },
            requires: vec![
                group_file.to_path_buf(),
                artifacts.bootstrap_counts_dir.clone(),
            ],
        },
        Stage {
            kind: StageKind::BootstrapCorrelate,
            action: StageAction::Command {
                program: "parallel".to_string(),
                args: vec![
                    "fastspar".to_string(),
                    "--yes".to_string(),
                    "--otu_table".to_string(),
                    "{}".to_string(),
                    "--correlation".to_string(),
                    format!("{correlation_dir}/cor_{{/}}"),
                    "--covariance".to_string(),
                    format!("{correlation_dir}/cov_{{/}}"),
                    "-i".to_string(),
                    options.iterations_parallel.to_string(),
                ],
                fan_out_dir: Some(artifacts.bootstrap_counts_dir.clone()),
            },
            requires: vec![
                artifacts.bootstrap_counts_dir.clone(),
                artifacts.bootstrap_correlation_dir.clone(),
            ],
        },
        Stage {
            kind: StageKind::PValue,
            action: StageAction::Command {
                program: "fastspar_pvalues".to_string(),
                args: vec![
                    "--otu_table".to_string(),
                    group_file_arg,
                    "--correlation".to_string(),
                    correlation,
                    "--prefix".to_string(),
                    format!("{correlation_dir}/cor_{base}"),
                    "--permutations".to_string(),
                    options.permutations.to_string(),
                    "-t".to_string(),
                    options.threads.to_string(),
                    "--outfile".to_string(),
                    path_arg(&artifacts.pvalues),
                ],
                fan_out_dir: None,
            },
            requires: vec![
                group_file.to_path_buf(),
                artifacts.correlation.clone(),
                artifacts.bootstrap_correlation_dir.clone(),
            ],
        },
    ];

    if cleanup {
        stages.push(Stage {
            kind: StageKind::Cleanup,
            action: StageAction::RemoveDirs(vec![
                artifacts.bootstrap_counts_dir.clone(),
                artifacts.bootstrap_correlation_dir.clone(),
            ]),
            requires: Vec::new(),
        });
    }

    stages
}
