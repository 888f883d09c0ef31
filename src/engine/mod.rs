pub mod pydeseq2;
pub mod rscript;

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use crate::input::InputError;
use crate::table::{ResultTable, TableError};

pub use pydeseq2::PyDeseq2Engine;
pub use rscript::RscriptEngine;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("script not found: {}", .0.display())]
    MissingScript(PathBuf),
    #[error("failed to spawn {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command:?} failed: {status}")]
    Failed { command: String, status: ExitStatus },
    #[error("{engine} output does not match its input: {reason}")]
    Misaligned { engine: String, reason: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unshrunk and shrunk results from one DESeq2 implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResults {
    pub pre_shrunk: ResultTable,
    pub post_shrunk: ResultTable,
}

/// One DESeq2 implementation that can be pointed at a data directory.
///
/// Implementations leave their own artifacts in `out_dir` and hand back the
/// two result tables for joining.
pub trait DeseqEngine {
    fn name(&self) -> &str;

    fn run(&self, data_dir: &Path, out_dir: &Path) -> Result<EngineResults, EngineError>;
}

/// Runs a command to completion with inherited stdio. Non-zero exit is an error.
pub(crate) fn run_command(command: &mut Command) -> Result<(), EngineError> {
    let program = command.get_program().to_string_lossy().to_string();
    debug!("running: {command:?}");
    let start = Instant::now();
    let status = command.status().map_err(|source| EngineError::Spawn {
        command: program.clone(),
        source,
    })?;
    info!(
        command = %program,
        status = %status,
        elapsed_ms = start.elapsed().as_millis(),
        "subprocess finished"
    );
    if !status.success() {
        return Err(EngineError::Failed {
            command: program,
            status,
        });
    }
    Ok(())
}

/// Checks that `table` is indexed by exactly `expected`, in order.
pub(crate) fn ensure_feature_index(
    engine: &str,
    label: &str,
    table: &ResultTable,
    expected: &[String],
) -> Result<(), EngineError> {
    if table.feature_ids() == expected {
        return Ok(());
    }
    let reason = match expected
        .iter()
        .zip(table.feature_ids())
        .position(|(a, b)| a != b)
    {
        Some(i) => format!(
            "{label}: feature {} is {:?}, expected {:?}",
            i + 1,
            table.feature_ids()[i],
            expected[i]
        ),
        None => format!(
            "{label}: {} features, expected {}",
            table.len(),
            expected.len()
        ),
    };
    Err(EngineError::Misaligned {
        engine: engine.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/engine/mod.rs"]
mod tests;
