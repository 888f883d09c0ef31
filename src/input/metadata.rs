use std::collections::HashMap;
use std::path::Path;

use crate::input::counts::ensure_unique;
use crate::input::{InputError, read_indexed_csv};

/// Per-sample covariates. Every column is treated as a categorical design factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    pub index_name: String,
    pub factors: Vec<String>,
    pub sample_ids: Vec<String>,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub metadata: SampleMetadata,
    pub dropped: Vec<String>,
}

impl SampleMetadata {
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn factor_index(&self, factor: &str) -> Option<usize> {
        self.factors.iter().position(|f| f == factor)
    }

    /// Distinct levels of a factor in first-seen order.
    pub fn levels(&self, factor: &str) -> Option<Vec<&str>> {
        let idx = self.factor_index(factor)?;
        let mut levels: Vec<&str> = Vec::new();
        for row in &self.values {
            let level = row[idx].as_str();
            if !levels.contains(&level) {
                levels.push(level);
            }
        }
        Some(levels)
    }

    /// Reorders rows to follow `samples` and drops rows not listed there.
    pub fn align_to(&self, samples: &[String]) -> Result<Alignment, InputError> {
        let by_id: HashMap<&str, usize> = self
            .sample_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let missing: Vec<String> = samples
            .iter()
            .filter(|s| !by_id.contains_key(s.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(InputError::MissingSamples(missing));
        }

        let values = samples
            .iter()
            .map(|s| self.values[by_id[s.as_str()]].clone())
            .collect();
        let dropped = self
            .sample_ids
            .iter()
            .filter(|id| !samples.contains(id))
            .cloned()
            .collect();

        Ok(Alignment {
            metadata: SampleMetadata {
                index_name: self.index_name.clone(),
                factors: self.factors.clone(),
                sample_ids: samples.to_vec(),
                values,
            },
            dropped,
        })
    }

    pub fn ensure_reference(&self, factor: &str, level: &str) -> Result<(), InputError> {
        let levels = self
            .levels(factor)
            .ok_or_else(|| InputError::MissingFactor(factor.to_string()))?;
        if !levels.contains(&level) {
            return Err(InputError::MissingReferenceLevel {
                factor: factor.to_string(),
                level: level.to_string(),
            });
        }
        Ok(())
    }
}

pub fn read_metadata(path: &Path) -> Result<SampleMetadata, InputError> {
    let table = read_indexed_csv(path)?;
    if table.rows.is_empty() {
        return Err(InputError::EmptyTable(path.to_path_buf()));
    }
    ensure_unique(path, "sample", table.rows.iter().map(|r| &r.id))?;

    let (sample_ids, values) = table.rows.into_iter().map(|r| (r.id, r.fields)).unzip();
    Ok(SampleMetadata {
        index_name: table.index_name,
        factors: table.columns,
        sample_ids,
        values,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/metadata.rs"]
mod tests;
