use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::config::CompareConfig;
use crate::engine::{DeseqEngine, EngineError, EngineResults};
use crate::output::{JOINED_POST_SHRUNK_FILE, JOINED_PRE_SHRUNK_FILE, write_atomic};
use crate::report::json::write_summary;
use crate::report::{ComparisonSummary, EnginePair, JoinInputs, ToolSummary, summarize_join};
use crate::table::join::join_on_index;
use crate::table::{ResultTable, TableError};

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{engine} failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },
    #[error("join error: {0}")]
    Join(#[from] TableError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub write_joined: bool,
    pub config: CompareConfig,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub pre_shrunk: ResultTable,
    pub post_shrunk: ResultTable,
    pub summary: ComparisonSummary,
}

/// Runs the in-process engine, then the external one, and joins their tables.
///
/// Every step blocks until done; the first error aborts the run.
pub fn run_comparison(
    request: &CompareRequest,
    in_process: &dyn DeseqEngine,
    external: &dyn DeseqEngine,
) -> Result<Comparison, CompareError> {
    let out_dir = request.out_dir.as_path();
    let config = &request.config;

    let start = Instant::now();
    info!(stage = "prepare_output", "starting stage");
    std::fs::create_dir_all(out_dir).map_err(|source| CompareError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;
    info!(
        stage = "prepare_output",
        elapsed_ms = start.elapsed().as_millis(),
        out = %out_dir.display(),
        "finished stage"
    );

    let left = run_engine("run_in_process", in_process, request)?;
    let right = run_engine("run_external", external, request)?;

    let start = Instant::now();
    info!(stage = "join", "starting stage");
    let (ls, rs) = (config.left_suffix.as_str(), config.right_suffix.as_str());
    let pre_shrunk = join_on_index(&left.pre_shrunk, &right.pre_shrunk, ls, rs)?;
    let post_shrunk = join_on_index(&left.post_shrunk, &right.post_shrunk, ls, rs)?;
    info!(
        stage = "join",
        elapsed_ms = start.elapsed().as_millis(),
        pre_rows = pre_shrunk.len(),
        post_rows = post_shrunk.len(),
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "report", "starting stage");
    let summarize = |l: &ResultTable, r: &ResultTable, joined: &ResultTable| {
        summarize_join(
            &JoinInputs {
                left: l,
                right: r,
                joined,
                left_suffix: ls,
                right_suffix: rs,
            },
            config.significance_alpha,
        )
    };
    let summary = ComparisonSummary {
        tool: ToolSummary {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        engines: EnginePair {
            left: in_process.name().to_string(),
            right: external.name().to_string(),
        },
        significance_alpha: config.significance_alpha,
        pre_shrunk: summarize(&left.pre_shrunk, &right.pre_shrunk, &pre_shrunk),
        post_shrunk: summarize(&left.post_shrunk, &right.post_shrunk, &post_shrunk),
    };
    write_summary(out_dir, &summary)?;
    if request.write_joined {
        write_atomic(&out_dir.join(JOINED_PRE_SHRUNK_FILE), &pre_shrunk.to_csv_bytes()?)?;
        write_atomic(&out_dir.join(JOINED_POST_SHRUNK_FILE), &post_shrunk.to_csv_bytes()?)?;
    }
    info!(
        stage = "report",
        elapsed_ms = start.elapsed().as_millis(),
        shared_features = summary.pre_shrunk.shared_features,
        left_only = summary.pre_shrunk.left_only_features,
        right_only = summary.pre_shrunk.right_only_features,
        "finished stage"
    );

    Ok(Comparison {
        pre_shrunk,
        post_shrunk,
        summary,
    })
}

fn run_engine(
    stage: &'static str,
    engine: &dyn DeseqEngine,
    request: &CompareRequest,
) -> Result<EngineResults, CompareError> {
    let start = Instant::now();
    info!(stage, engine = engine.name(), "starting stage");
    let results = engine
        .run(&request.data_dir, &request.out_dir)
        .map_err(|source| CompareError::Engine {
            engine: engine.name().to_string(),
            source,
        })?;
    info!(
        stage,
        elapsed_ms = start.elapsed().as_millis(),
        features = results.pre_shrunk.len(),
        "finished stage"
    );
    Ok(results)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/compare.rs"]
mod tests;
