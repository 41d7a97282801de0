//! Abundance and metadata tables loaded from tab-separated files.
//!
//! The abundance table keeps only numeric columns, mirroring how count
//! tables are usually cleaned before correlation estimation; the metadata
//! table stays untyped since it is only consulted for grouping.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SparError};

/// Metadata column that carries sample identifiers.
pub const SAMPLE_ID_COLUMN: &str = "sampleID";

/// Header written for the feature-identifier column of persisted tables.
pub const FEATURE_ID_HEADER: &str = "#OTU ID";

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "NA" || cell == "na"
}

/// Dense numeric count matrix: rows are features, columns are samples.
#[derive(Debug, Clone)]
pub struct AbundanceTable {
    feature_ids: Vec<String>,
    sample_ids: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl AbundanceTable {
    /// Load an abundance table from a TSV file.
    ///
    /// The first column holds feature identifiers under an arbitrary header.
    /// A remaining column is kept only if every non-missing cell parses as a
    /// number; other columns are dropped.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            SparError::Configuration(format!("abundance table {} is empty", path.display()))
        })??;
        let header: Vec<&str> = header_line.split('\t').collect();
        let candidate_ids: Vec<String> = header.iter().skip(1).copied().map(str::to_string).collect();

        let mut feature_ids = Vec::new();
        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let feature_id = fields.next().unwrap_or_default().to_string();
            let mut cells: Vec<String> = fields.map(str::to_string).collect();
            cells.resize(candidate_ids.len(), String::new());
            feature_ids.push(feature_id);
            raw_rows.push(cells);
        }

        // Column-wise dtype inference: a column survives only if it is
        // numeric across all rows.
        let numeric: Vec<usize> = (0..candidate_ids.len())
            .filter(|&col| {
                raw_rows.iter().all(|row| {
                    let cell = row[col].trim();
                    is_missing(cell) || cell.parse::<f64>().is_ok()
                })
            })
            .collect();

        let sample_ids: Vec<String> = numeric
            .iter()
            .map(|&col| candidate_ids[col].clone())
            .collect();
        let rows: Vec<Vec<f64>> = raw_rows
            .iter()
            .map(|row| {
                numeric
                    .iter()
                    .map(|&col| {
                        let cell = row[col].trim();
                        if is_missing(cell) {
                            f64::NAN
                        } else {
                            cell.parse::<f64>().unwrap_or(f64::NAN)
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            feature_ids,
            sample_ids,
            rows,
        })
    }

    /// Write the table as TSV with the canonical feature-id header.
    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{FEATURE_ID_HEADER}")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{sample_id}")?;
        }
        writeln!(writer)?;

        for (feature_id, row) in self.feature_ids.iter().zip(&self.rows) {
            write!(writer, "{feature_id}")?;
            for value in row {
                write!(writer, "\t{value}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Restrict the table to the given samples, in the given order.
    ///
    /// Identifiers with no matching column are skipped, so a selection with
    /// zero matches yields a valid zero-column table.
    pub fn restrict_samples(&self, ids: &[String]) -> Self {
        let cols: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.sample_ids.iter().position(|s| s == id))
            .collect();
        Self {
            feature_ids: self.feature_ids.clone(),
            sample_ids: cols.iter().map(|&c| self.sample_ids[c].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| cols.iter().map(|&c| row[c]).collect())
                .collect(),
        }
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }
}

/// Untyped sample annotations; consulted only for grouping.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Metadata {
    /// Empty metadata, the valid ungrouped state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load metadata from a TSV file with a header row.
    pub fn from_tsv(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            SparError::Configuration(format!("metadata table {} is empty", path.display()))
        })??;
        let columns: Vec<String> = header_line.split('\t').map(str::to_string).collect();

        let mut rows = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut cells: Vec<String> = line.split('\t').map(str::to_string).collect();
            cells.resize(columns.len(), String::new());
            rows.push(cells);
        }

        Ok(Self { columns, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value for a row, by column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].trim())
    }

    /// Sample identifiers in row order.
    ///
    /// Fails when the designated identifier column is absent, which makes
    /// grouping impossible.
    pub fn sample_ids(&self) -> Result<Vec<&str>> {
        let col = self.column_index(SAMPLE_ID_COLUMN).ok_or_else(|| {
            SparError::Configuration(format!(
                "metadata is missing the {SAMPLE_ID_COLUMN} column"
            ))
        })?;
        Ok(self.rows.iter().map(|r| r[col].trim()).collect())
    }
}
