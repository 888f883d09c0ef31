use std::collections::HashSet;

use crate::table::{ResultTable, TableError};

/// Left join on feature id.
///
/// Keeps the left table's index and row order. Column names present in both
/// tables get `left_suffix` / `right_suffix`; all other names are kept as is.
/// Features missing from the right table get `None` for every right column.
pub fn join_on_index(
    left: &ResultTable,
    right: &ResultTable,
    left_suffix: &str,
    right_suffix: &str,
) -> Result<ResultTable, TableError> {
    let left_names: HashSet<&str> = left.columns().iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right.columns().iter().map(String::as_str).collect();

    let mut columns = Vec::with_capacity(left.columns().len() + right.columns().len());
    for name in left.columns() {
        if right_names.contains(name.as_str()) {
            columns.push(format!("{name}{left_suffix}"));
        } else {
            columns.push(name.clone());
        }
    }
    for name in right.columns() {
        if left_names.contains(name.as_str()) {
            columns.push(format!("{name}{right_suffix}"));
        } else {
            columns.push(name.clone());
        }
    }

    let mut seen = HashSet::new();
    for name in &columns {
        if !seen.insert(name.as_str()) {
            return Err(TableError::ColumnCollision(name.clone()));
        }
    }

    let right_width = right.columns().len();
    let mut joined = ResultTable::new(left.index_name(), columns);
    for (id, left_row) in left.rows() {
        let mut values = Vec::with_capacity(left_row.len() + right_width);
        values.extend_from_slice(left_row);
        match right.row(id) {
            Some(right_row) => values.extend_from_slice(right_row),
            None => values.extend(std::iter::repeat_n(None, right_width)),
        }
        joined.push_row(id, values)?;
    }
    Ok(joined)
}

#[cfg(test)]
#[path = "../../tests/src_inline/table/join.rs"]
mod tests;
