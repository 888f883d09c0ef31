pub mod join;
pub mod size_factors;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::{InputError, read_indexed_csv};

pub const MEAN_COUNT_COLUMN: &str = "baseMean";
pub const FOLD_CHANGE_COLUMN: &str = "log2FoldChange";
pub const ADJUSTED_P_COLUMN: &str = "padj";

/// Columns every engine result table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [MEAN_COUNT_COLUMN, FOLD_CHANGE_COLUMN, ADJUSTED_P_COLUMN];

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{}: invalid numeric value {value:?} at line {line}, column {column}", .path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
    #[error("duplicate feature id {0:?}")]
    DuplicateFeature(String),
    #[error("row for {feature:?} has {found} values, expected {expected}")]
    RowWidth {
        feature: String,
        expected: usize,
        found: usize,
    },
    #[error("{}: missing required column {column:?}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("joined column name {0:?} is not unique")]
    ColumnCollision(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Differential expression results keyed by feature id.
///
/// Both engines produce this shape, so joins and summaries never need to
/// know which engine a table came from. Missing values (`NA`, empty cells)
/// are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    index_name: String,
    columns: Vec<String>,
    feature_ids: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
    position: HashMap<String, usize>,
}

impl ResultTable {
    pub fn new(index_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index_name: index_name.into(),
            columns,
            feature_ids: Vec::new(),
            values: Vec::new(),
            position: HashMap::new(),
        }
    }

    pub fn push_row(
        &mut self,
        feature_id: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), TableError> {
        let feature_id = feature_id.into();
        if values.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                feature: feature_id,
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        if self.position.contains_key(&feature_id) {
            return Err(TableError::DuplicateFeature(feature_id));
        }
        self.position.insert(feature_id.clone(), self.feature_ids.len());
        self.feature_ids.push(feature_id);
        self.values.push(values);
        Ok(())
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn len(&self) -> usize {
        self.feature_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_ids.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.position.contains_key(feature_id)
    }

    pub fn row(&self, feature_id: &str) -> Option<&[Option<f64>]> {
        self.position
            .get(feature_id)
            .map(|&i| self.values[i].as_slice())
    }

    pub fn get(&self, feature_id: &str, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.row(feature_id).and_then(|row| row[col])
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_index(name)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.feature_ids
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let header = std::iter::once(self.index_name.as_str())
            .chain(self.columns.iter().map(String::as_str));
        writer.write_record(header)?;
        for (id, row) in self.rows() {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(id.to_string());
            record.extend(row.iter().map(|v| format_value(*v)));
            writer.write_record(&record)?;
        }
        writer.into_inner().map_err(|e| TableError::Io(e.into_error()))
    }
}

pub fn read_result_table(path: &Path) -> Result<ResultTable, TableError> {
    let csv = read_indexed_csv(path)?;
    for required in REQUIRED_COLUMNS {
        if !csv.columns.iter().any(|c| c == required) {
            return Err(TableError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }

    let mut table = ResultTable::new(csv.index_name, csv.columns);
    for row in csv.rows {
        let mut values = Vec::with_capacity(row.fields.len());
        for (col, raw) in row.fields.iter().enumerate() {
            let value = parse_value(raw).ok_or_else(|| TableError::InvalidValue {
                path: path.to_path_buf(),
                line: row.line,
                column: table.columns[col].clone(),
                value: raw.clone(),
            })?;
            values.push(value);
        }
        table.push_row(row.id, values)?;
    }
    Ok(table)
}

/// Parses one numeric cell as written by R (`NA`, `Inf`) or pandas (empty, `inf`).
/// The outer `None` means the cell is not numeric at all.
pub fn parse_value(raw: &str) -> Option<Option<f64>> {
    let raw = raw.trim();
    match raw {
        "" | "NA" | "NaN" | "nan" | "<NA>" => Some(None),
        "Inf" | "inf" | "+Inf" => Some(Some(f64::INFINITY)),
        "-Inf" | "-inf" => Some(Some(f64::NEG_INFINITY)),
        _ => raw
            .parse::<f64>()
            .ok()
            .map(|v| if v.is_nan() { None } else { Some(v) }),
    }
}

/// Shortest round-trip text; exponent form outside [1e-4, 1e16).
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_nan() => String::new(),
        Some(v) if v == f64::INFINITY => "inf".to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-inf".to_string(),
        Some(v) => {
            let abs = v.abs();
            if v == 0.0 || (1e-4..1e16).contains(&abs) {
                format!("{v}")
            } else {
                format!("{v:e}")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/table/mod.rs"]
mod tests;
