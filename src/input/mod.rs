pub mod counts;
pub mod metadata;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const COUNTS_FILE: &str = "counts.csv";
pub const METADATA_FILE: &str = "metadata.csv";

#[derive(Error, Debug)]
pub enum InputError {
    #[error("missing required file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("csv error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("empty table: {}", .0.display())]
    EmptyTable(PathBuf),
    #[error("{}: row at line {line} has {found} fields, expected {expected}", .path.display())]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{}: invalid count {value:?} at line {line}, column {column}", .path.display())]
    InvalidCount {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
    #[error("{}: duplicate {kind} id {id:?}", .path.display())]
    DuplicateId {
        path: PathBuf,
        kind: &'static str,
        id: String,
    },
    #[error("metadata has no row for counts samples: {}", .0.join(", "))]
    MissingSamples(Vec<String>),
    #[error("metadata missing design factor column: {0}")]
    MissingFactor(String),
    #[error("reference level {level:?} not present in factor {factor:?}")]
    MissingReferenceLevel { factor: String, level: String },
}

/// A CSV table whose first column is the row index, with every cell kept as text.
#[derive(Debug, Clone)]
pub struct IndexedCsv {
    pub index_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<IndexedRow>,
}

#[derive(Debug, Clone)]
pub struct IndexedRow {
    pub line: u64,
    pub id: String,
    pub fields: Vec<String>,
}

pub fn read_indexed_csv(path: &Path) -> Result<IndexedCsv, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingFile(path.to_path_buf()));
    }
    let csv_err = |source: csv::Error| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(csv_err)?,
        None => return Err(InputError::EmptyTable(path.to_path_buf())),
    };
    let mut header_fields = header.iter().map(str::to_string);
    let index_name = header_fields.next().unwrap_or_default();
    let columns: Vec<String> = header_fields.collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        if record.len() != columns.len() + 1 {
            return Err(InputError::RaggedRow {
                path: path.to_path_buf(),
                line,
                expected: columns.len() + 1,
                found: record.len(),
            });
        }
        let mut fields = record.iter().map(str::to_string);
        let id = fields.next().unwrap_or_default();
        rows.push(IndexedRow {
            line,
            id,
            fields: fields.collect(),
        });
    }

    Ok(IndexedCsv {
        index_name,
        columns,
        rows,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/mod.rs"]
mod tests;
