//! Run orchestration: load, partition, persist, then drive the pipeline.
//!
//! Tables are loaded once; after the split tables are persisted, each file
//! owns its directory tree and stage sequence for the rest of the run.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RootArgs;
use crate::group;
use crate::options::EstimatorOptions;
use crate::pipeline::{self, GroupPlan, PipelineExecutor};
use crate::prereqs;
use crate::table::{AbundanceTable, Metadata};
use crate::workspace::Workspace;

/// Run the full grouped pipeline for one abundance table.
pub fn run(args: &RootArgs) -> Result<()> {
    if args.cleanup {
        warn!("cleaning intermediate files after each group");
    }

    let workspace = Workspace::new(&args.out_dir);
    workspace.ensure_root();

    let options = EstimatorOptions::from_cli(args);
    workspace
        .write_options_manifest(&options)
        .with_context(|| format!("write options manifest under {}", workspace.root().display()))?;

    let metadata = load_metadata(args)?;
    let abundances = AbundanceTable::from_tsv(&args.abundances)
        .with_context(|| format!("read abundance table {}", args.abundances.display()))?;

    let grouped = group::partition(&abundances, &metadata, &args.split_vars)?;

    let original_name = args
        .abundances
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("abundances");

    let mut plans = Vec::new();
    for (key, table) in &grouped {
        let path = workspace.split_table_path(original_name, &key.label());
        table
            .write_tsv(&path)
            .with_context(|| format!("write split table {}", path.display()))?;
        info!("written split table: {}", path.display());

        let base = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("group")
            .to_string();
        let artifacts = workspace.group_artifacts(&base);
        workspace.ensure_group_dirs(&artifacts);
        let stages = pipeline::build_stages(&path, &artifacts, &options, args.cleanup);
        plans.push(GroupPlan { name: base, stages });
    }

    for tool in prereqs::missing_tools() {
        warn!("external tool '{tool}' not found on PATH");
    }

    let executor = PipelineExecutor::new(args.halt_on_failure);
    let outcomes = executor.run_all(&plans);

    let failed: Vec<_> = outcomes
        .iter()
        .filter(|outcome| !outcome.is_success())
        .collect();
    if failed.is_empty() {
        info!("all {} groups finished", outcomes.len());
    } else {
        for outcome in &failed {
            warn!(
                "group {}: {} failed stages",
                outcome.name,
                outcome.failures.len()
            );
        }
    }
    Ok(())
}

fn load_metadata(args: &RootArgs) -> Result<Metadata> {
    match &args.metadata {
        Some(path) if path.is_file() => Metadata::from_tsv(path)
            .with_context(|| format!("read metadata table {}", path.display())),
        _ => {
            warn!("metadata file not found; treating the run as ungrouped");
            Ok(Metadata::empty())
        }
    }
}
