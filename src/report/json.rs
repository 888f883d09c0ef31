use std::path::Path;

use crate::output::{SUMMARY_FILE, write_atomic};
use crate::report::ComparisonSummary;

pub fn write_summary(out_dir: &Path, summary: &ComparisonSummary) -> std::io::Result<()> {
    let mut json = serde_json::to_vec_pretty(summary)?;
    json.push(b'\n');
    write_atomic(&out_dir.join(SUMMARY_FILE), &json)
}
