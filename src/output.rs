use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

pub const PY_PRE_SHRUNK_FILE: &str = "py_results_pre_shrunk.csv";
pub const PY_POST_SHRUNK_FILE: &str = "py_results_post_shrunk.csv";
pub const PY_SIZE_FACTORS_FILE: &str = "py_size_factors.csv";
pub const R_PRE_SHRUNK_FILE: &str = "r_results_pre_shrunk.csv";
pub const R_POST_SHRUNK_FILE: &str = "r_results_post_shrunk.csv";
pub const JOINED_PRE_SHRUNK_FILE: &str = "joined_results_pre_shrunk.csv";
pub const JOINED_POST_SHRUNK_FILE: &str = "joined_results_post_shrunk.csv";
pub const SUMMARY_FILE: &str = "comparison_summary.json";

/// Writes `bytes` to a sibling temp file and renames it over `path`.
///
/// Readers see either the old file or the complete new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/output.rs"]
mod tests;
