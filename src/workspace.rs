//! Output-directory lifecycle and typed artifact paths.
//!
//! Centralizing path construction keeps the filesystem naming contract
//! between pipeline stages in one place: every artifact is named
//! `<kind>_<groupBaseName>` under a single output root, so multiple groups'
//! artifacts coexist without collision.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{Result, SparError};
use crate::options::EstimatorOptions;

/// File name of the per-run options manifest.
pub const OPTIONS_MANIFEST_REL: &str = "fastspar_options.json";

/// Per-group artifact paths, derived from the group's base file name.
#[derive(Debug, Clone)]
pub struct GroupArtifacts {
    pub correlation: PathBuf,
    pub covariance: PathBuf,
    pub pvalues: PathBuf,
    pub bootstrap_counts_dir: PathBuf,
    pub bootstrap_correlation_dir: PathBuf,
}

/// Output root owning all run artifacts.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output root.
    ///
    /// An existing directory is success; any other creation failure is
    /// logged and the run proceeds, so later writes surface the real error.
    pub fn ensure_root(&self) {
        if self.root.is_dir() {
            info!("output directory {} already exists", self.root.display());
            return;
        }
        match fs::create_dir_all(&self.root) {
            Ok(()) => info!("directory created: {}", self.root.display()),
            Err(source) => error!(
                "{}",
                SparError::DirectoryCreation {
                    path: self.root.clone(),
                    source,
                }
            ),
        }
    }

    /// Path for a persisted split table.
    pub fn split_table_path(&self, original_name: &str, label: &str) -> PathBuf {
        self.root
            .join(format!("splitAbn_{original_name}_{label}.tsv"))
    }

    /// Derive all artifact paths for one group base name.
    pub fn group_artifacts(&self, base_name: &str) -> GroupArtifacts {
        GroupArtifacts {
            correlation: self.root.join(format!("median_correlation_{base_name}.tsv")),
            covariance: self.root.join(format!("median_covariance_{base_name}.tsv")),
            pvalues: self.root.join(format!("pvalues_{base_name}.tsv")),
            bootstrap_counts_dir: self.root.join(format!("bootstrap_counts_{base_name}")),
            bootstrap_correlation_dir: self
                .root
                .join(format!("bootstrap_correlation_{base_name}")),
        }
    }

    /// Create the two per-group bootstrap directories.
    ///
    /// Must run before any command references them. Failures are logged and
    /// tolerated; the affected stage will then fail visibly on its own.
    pub fn ensure_group_dirs(&self, artifacts: &GroupArtifacts) {
        for dir in [
            &artifacts.bootstrap_counts_dir,
            &artifacts.bootstrap_correlation_dir,
        ] {
            if let Err(source) = fs::create_dir_all(dir) {
                error!(
                    "{}",
                    SparError::DirectoryCreation {
                        path: dir.clone(),
                        source,
                    }
                );
            }
        }
    }

    pub fn options_manifest_path(&self) -> PathBuf {
        self.root.join(OPTIONS_MANIFEST_REL)
    }

    /// Persist the resolved numeric options, once per run.
    pub fn write_options_manifest(&self, options: &EstimatorOptions) -> Result<()> {
        let path = self.options_manifest_path();
        let text = serde_json::to_string_pretty(options)?;
        fs::write(&path, text.as_bytes())?;
        info!("written estimator options: {}", path.display());
        Ok(())
    }
}
