//! Partitioning of an abundance table into metadata-defined subgroups.
//!
//! Grouping is cartesian over the chosen covariates: samples belong to the
//! same group only when they agree on every split variable. Keys stay
//! structured in memory; the underscore-joined label is only a file-naming
//! serialization, and label collisions between distinct keys are rejected
//! up front instead of silently merging two groups' files.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{Result, SparError};
use crate::table::{AbundanceTable, Metadata};

/// Ordered tuple of covariate values identifying one subgroup.
///
/// The empty tuple is the sentinel for the unpartitioned case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    values: Vec<String>,
}

impl GroupKey {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Sentinel key for an ungrouped run.
    pub fn unpartitioned() -> Self {
        Self { values: Vec::new() }
    }

    /// Serialized form used in file names.
    pub fn label(&self) -> String {
        if self.values.is_empty() {
            "all".to_string()
        } else {
            self.values.join("_")
        }
    }
}

/// Group tables in deterministic key order.
pub type GroupedTables = BTreeMap<GroupKey, AbundanceTable>;

/// Split an abundance table by the comma-separated covariate list.
///
/// With empty metadata or an empty variable list the table passes through
/// under the sentinel key. Otherwise every abundance column must be covered
/// by a metadata row; each group's columns are that group's sample
/// identifiers in metadata order, restricted to columns actually present.
pub fn partition(
    abundances: &AbundanceTable,
    metadata: &Metadata,
    split_variables: &str,
) -> Result<GroupedTables> {
    let variables: Vec<&str> = split_variables
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    if metadata.n_rows() == 0 || variables.is_empty() {
        warn!("not splitting data into groups");
        let mut result = GroupedTables::new();
        result.insert(GroupKey::unpartitioned(), abundances.clone());
        return Ok(result);
    }

    for variable in &variables {
        if !metadata.has_column(variable) {
            return Err(SparError::Configuration(format!(
                "split variable '{variable}' not found in metadata"
            )));
        }
    }

    let metadata_samples = metadata.sample_ids()?;
    let covered: HashSet<&str> = metadata_samples.iter().copied().collect();
    for sample in abundances.sample_ids() {
        if !covered.contains(sample.as_str()) {
            return Err(SparError::Configuration(format!(
                "sample '{sample}' from the abundance table has no metadata row"
            )));
        }
    }

    let mut members: BTreeMap<GroupKey, Vec<String>> = BTreeMap::new();
    for (row, sample) in metadata_samples.iter().copied().enumerate() {
        let values: Vec<String> = variables
            .iter()
            .filter_map(|v| metadata.value(row, v))
            .map(str::to_string)
            .collect();
        if values.len() < variables.len() || values.iter().any(String::is_empty) {
            debug!("sample '{sample}' has missing split values; assigned to no group");
            continue;
        }
        members
            .entry(GroupKey::new(values))
            .or_default()
            .push(sample.to_string());
    }

    warn!("splitting data into {} groups", members.len());

    let mut labels: HashMap<String, &GroupKey> = HashMap::new();
    for key in members.keys() {
        if let Some(previous) = labels.insert(key.label(), key) {
            return Err(SparError::Configuration(format!(
                "group keys {:?} and {:?} both serialize to '{}'",
                previous.values,
                key.values,
                key.label()
            )));
        }
    }

    let mut result = GroupedTables::new();
    for (key, samples) in members {
        let table = abundances.restrict_samples(&samples);
        debug!(
            "group '{}' has {} sample columns",
            key.label(),
            table.n_samples()
        );
        result.insert(key, table);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn abundance(columns: &str) -> AbundanceTable {
        let mut file = NamedTempFile::new().unwrap();
        let cells = columns.split('\t').map(|_| "1").collect::<Vec<_>>().join("\t");
        writeln!(file, "#OTU ID\t{columns}").unwrap();
        writeln!(file, "OTU_1\t{cells}").unwrap();
        file.flush().unwrap();
        AbundanceTable::from_tsv(file.path()).unwrap()
    }

    fn metadata(content: &str) -> Metadata {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        Metadata::from_tsv(file.path()).unwrap()
    }

    #[test]
    fn empty_metadata_passes_table_through() {
        let table = abundance("S1\tS2");
        let groups = partition(&table, &Metadata::empty(), "Time").unwrap();
        assert_eq!(groups.len(), 1);
        let (key, all) = groups.iter().next().unwrap();
        assert_eq!(key.label(), "all");
        assert_eq!(all.sample_ids(), table.sample_ids());
    }

    #[test]
    fn empty_split_list_passes_table_through() {
        let table = abundance("S1\tS2");
        let meta = metadata("sampleID\tTime\nS1\t0\nS2\t1\n");
        let groups = partition(&table, &meta, "").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.keys().next().unwrap().label(), "all");
    }

    #[test]
    fn single_covariate_split() {
        let table = abundance("S1\tS2\tS3\tS4");
        let meta = metadata("sampleID\tTime\nS1\t0\nS2\t0\nS3\t1\nS4\t1\n");
        let groups = partition(&table, &meta, "Time").unwrap();

        let labels: Vec<String> = groups.keys().map(GroupKey::label).collect();
        assert_eq!(labels, vec!["0", "1"]);
        let tables: Vec<&AbundanceTable> = groups.values().collect();
        assert_eq!(tables[0].sample_ids(), &["S1", "S2"]);
        assert_eq!(tables[1].sample_ids(), &["S3", "S4"]);
    }

    #[test]
    fn groups_are_disjoint_and_cover_all_samples() {
        let table = abundance("S1\tS2\tS3\tS4\tS5");
        let meta = metadata("sampleID\tSite\nS1\tgut\nS2\tskin\nS3\tgut\nS4\toral\nS5\tskin\n");
        let groups = partition(&table, &meta, "Site").unwrap();

        let mut seen = std::collections::HashSet::new();
        for group in groups.values() {
            for sample in group.sample_ids() {
                assert!(seen.insert(sample.clone()), "sample {sample} in two groups");
            }
        }
        assert_eq!(seen.len(), table.n_samples());
    }

    #[test]
    fn cartesian_grouping_over_two_covariates() {
        let table = abundance("S1\tS2\tS3\tS4");
        let meta = metadata(
            "sampleID\tTime\tGroup\nS1\t0\tA\nS2\t0\tB\nS3\t1\tA\nS4\t1\tB\n",
        );
        let groups = partition(&table, &meta, "Time,Group").unwrap();
        let labels: Vec<String> = groups.keys().map(GroupKey::label).collect();
        assert_eq!(labels, vec!["0_A", "0_B", "1_A", "1_B"]);
    }

    #[test]
    fn uncovered_sample_is_a_configuration_error() {
        let table = abundance("S1\tS2");
        let meta = metadata("sampleID\tTime\nS1\t0\n");
        assert!(matches!(
            partition(&table, &meta, "Time"),
            Err(SparError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_split_variable_is_a_configuration_error() {
        let table = abundance("S1");
        let meta = metadata("sampleID\tTime\nS1\t0\n");
        assert!(matches!(
            partition(&table, &meta, "Depth"),
            Err(SparError::Configuration(_))
        ));
    }

    #[test]
    fn group_with_no_matching_columns_is_valid() {
        let table = abundance("S1");
        // S2 is covered by metadata only; its group ends up with zero columns.
        let meta = metadata("sampleID\tTime\nS1\t0\nS2\t1\n");
        let groups = partition(&table, &meta, "Time").unwrap();
        assert_eq!(groups.len(), 2);
        let empty = groups.get(&GroupKey::new(vec!["1".to_string()])).unwrap();
        assert_eq!(empty.n_samples(), 0);
    }

    #[test]
    fn colliding_labels_are_rejected() {
        let table = abundance("S1\tS2");
        let meta = metadata(
            "sampleID\tA\tB\nS1\tx_y\tz\nS2\tx\ty_z\n",
        );
        assert!(matches!(
            partition(&table, &meta, "A,B"),
            Err(SparError::Configuration(_))
        ));
    }

    #[test]
    fn missing_split_values_join_no_group() {
        let table = abundance("S1\tS2\tS3");
        let meta = metadata("sampleID\tTime\nS1\t0\nS2\t\nS3\t0\n");
        let groups = partition(&table, &meta, "Time").unwrap();
        assert_eq!(groups.len(), 1);
        let only = groups.values().next().unwrap();
        assert_eq!(only.sample_ids(), &["S1", "S3"]);
    }
}
