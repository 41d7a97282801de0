//! Sequential execution of per-group stage lists.
//!
//! One external command is in flight at a time; the executor blocks until
//! each invocation terminates. In the default mode a failed stage is logged
//! and execution continues with the next stage, matching the established
//! run behavior; `halt_on_failure` opts into stopping the group early and
//! verifying each stage's declared preconditions before launch.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::{error, info, warn};

use super::{GroupPlan, Stage, StageAction, StageKind};
use crate::error::SparError;

/// Outcome of one group's stage list.
#[derive(Debug)]
pub struct GroupOutcome {
    pub name: String,
    pub failures: Vec<SparError>,
}

impl GroupOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs group stage lists strictly sequentially.
pub struct PipelineExecutor {
    halt_on_failure: bool,
}

impl PipelineExecutor {
    pub fn new(halt_on_failure: bool) -> Self {
        Self { halt_on_failure }
    }

    /// Run every group in input order.
    ///
    /// Groups own disjoint files and directories, so one group's failures
    /// never affect the next; each group's list is fully processed before
    /// the next group starts.
    pub fn run_all(&self, plans: &[GroupPlan]) -> Vec<GroupOutcome> {
        plans
            .iter()
            .map(|plan| {
                info!("running correlation pipeline for {}", plan.name);
                let outcome = self.run_group(plan);
                info!("finished correlation pipeline for {}", plan.name);
                outcome
            })
            .collect()
    }

    /// Run one group's stages in order, blocking on each.
    pub fn run_group(&self, plan: &GroupPlan) -> GroupOutcome {
        let mut failures = Vec::new();
        for stage in &plan.stages {
            if self.halt_on_failure && !failures.is_empty() {
                warn!(
                    "skipping {} stage for {}: an earlier stage failed",
                    stage.kind.name(),
                    plan.name
                );
                continue;
            }
            if self.halt_on_failure {
                if let Some(missing) = stage.requires.iter().find(|path| !path.exists()) {
                    let err = SparError::ExternalProcess {
                        stage: stage.kind.name(),
                        reason: format!("required path {} does not exist", missing.display()),
                    };
                    error!("{err}");
                    failures.push(err);
                    continue;
                }
            }
            if let Err(reason) = run_stage(stage) {
                let err = SparError::ExternalProcess {
                    stage: stage.kind.name(),
                    reason,
                };
                error!("{err}");
                failures.push(err);
            }
        }
        GroupOutcome {
            name: plan.name.clone(),
            failures,
        }
    }
}

fn run_stage(stage: &Stage) -> Result<(), String> {
    match &stage.action {
        StageAction::Command {
            program,
            args,
            fan_out_dir,
        } => run_command(stage.kind, program, args, fan_out_dir.as_deref()),
        StageAction::RemoveDirs(dirs) => {
            remove_dirs(dirs);
            Ok(())
        }
    }
}

fn run_command(
    kind: StageKind,
    program: &str,
    args: &[String],
    fan_out_dir: Option<&Path>,
) -> Result<(), String> {
    let mut argv: Vec<String> = args.to_vec();
    if let Some(dir) = fan_out_dir {
        let inputs = fan_out_files(dir)
            .map_err(|err| format!("could not list {}: {err}", dir.display()))?;
        argv.push(":::".to_string());
        argv.extend(inputs.iter().map(|path| path.display().to_string()));
    }

    info!("{}: {} {}", kind.name(), program, shell_words::join(&argv));
    match Command::new(program).args(&argv).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("exited with {}", exit_status_string(&status))),
        Err(err) => Err(format!("failed to spawn {program}: {err}")),
    }
}

/// Files of the fan-out directory, sorted for a stable invocation order.
fn fan_out_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn remove_dirs(dirs: &[PathBuf]) {
    for dir in dirs {
        if dir.is_dir() {
            if let Err(err) = fs::remove_dir_all(dir) {
                warn!("failed to remove {}: {err}", dir.display());
            }
        }
    }
}

fn exit_status_string(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("status {code}")
    } else {
        "termination by signal".to_string()
    }
}
