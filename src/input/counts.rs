use std::collections::HashSet;
use std::path::Path;

use crate::input::{InputError, read_indexed_csv};

/// Raw read counts, features x samples, as laid out in `counts.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable {
    pub feature_ids: Vec<String>,
    pub sample_ids: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

/// Counts transposed so that rows are samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCounts {
    pub sample_ids: Vec<String>,
    pub feature_ids: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl CountTable {
    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn transpose(&self) -> SampleCounts {
        let counts = (0..self.n_samples())
            .map(|s| self.counts.iter().map(|row| row[s]).collect())
            .collect();
        SampleCounts {
            sample_ids: self.sample_ids.clone(),
            feature_ids: self.feature_ids.clone(),
            counts,
        }
    }
}

pub fn read_counts(path: &Path) -> Result<CountTable, InputError> {
    let table = read_indexed_csv(path)?;
    if table.columns.is_empty() || table.rows.is_empty() {
        return Err(InputError::EmptyTable(path.to_path_buf()));
    }
    ensure_unique(path, "sample", table.columns.iter())?;
    ensure_unique(path, "feature", table.rows.iter().map(|r| &r.id))?;

    let mut feature_ids = Vec::with_capacity(table.rows.len());
    let mut counts = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let mut values = Vec::with_capacity(row.fields.len());
        for (col, raw) in row.fields.iter().enumerate() {
            let value = parse_count(raw).ok_or_else(|| InputError::InvalidCount {
                path: path.to_path_buf(),
                line: row.line,
                column: table.columns[col].clone(),
                value: raw.clone(),
            })?;
            values.push(value);
        }
        feature_ids.push(row.id);
        counts.push(values);
    }

    Ok(CountTable {
        feature_ids,
        sample_ids: table.columns,
        counts,
    })
}

/// Accepts plain integers and integral floats such as `12.0`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

pub(crate) fn ensure_unique<'a>(
    path: &Path,
    kind: &'static str,
    ids: impl Iterator<Item = &'a String>,
) -> Result<(), InputError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(InputError::DuplicateId {
                path: path.to_path_buf(),
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/counts.rs"]
mod tests;
