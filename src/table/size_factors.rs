use std::path::{Path, PathBuf};

use crate::input::read_indexed_csv;
use crate::table::{TableError, format_value, parse_value};

pub const SIZE_FACTOR_COLUMN: &str = "size_factor";

/// One normalization scalar per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeFactors {
    pub sample_ids: Vec<String>,
    pub values: Vec<f64>,
}

impl SizeFactors {
    pub fn len(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["", SIZE_FACTOR_COLUMN])?;
        for (sample, value) in self.sample_ids.iter().zip(&self.values) {
            writer.write_record([sample.as_str(), format_value(Some(*value)).as_str()])?;
        }
        writer.into_inner().map_err(|e| TableError::Io(e.into_error()))
    }
}

/// Reads a single-column size factor table. The column name is not checked.
pub fn read_size_factors(path: &Path) -> Result<SizeFactors, TableError> {
    let csv = read_indexed_csv(path)?;
    if csv.columns.len() != 1 {
        return Err(TableError::MissingColumn {
            path: path.to_path_buf(),
            column: SIZE_FACTOR_COLUMN.to_string(),
        });
    }

    let mut sample_ids = Vec::with_capacity(csv.rows.len());
    let mut values = Vec::with_capacity(csv.rows.len());
    for row in csv.rows {
        let raw = &row.fields[0];
        let value = parse_value(raw)
            .flatten()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| invalid(path, row.line, raw))?;
        sample_ids.push(row.id);
        values.push(value);
    }
    Ok(SizeFactors { sample_ids, values })
}

fn invalid(path: &Path, line: u64, raw: &str) -> TableError {
    TableError::InvalidValue {
        path: PathBuf::from(path),
        line,
        column: SIZE_FACTOR_COLUMN.to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/table/size_factors.rs"]
mod tests;
