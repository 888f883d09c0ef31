use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::config::CompareConfig;
use crate::engine::{DeseqEngine, EngineError, EngineResults, run_command};
use crate::output::{R_POST_SHRUNK_FILE, R_PRE_SHRUNK_FILE};
use crate::table::read_result_table;

/// R DESeq2 run through `Rscript <script> <data_dir> <out_dir>`.
///
/// The script owns its outputs: it must leave `r_results_pre_shrunk.csv` and
/// `r_results_post_shrunk.csv` in the output directory.
#[derive(Debug, Clone)]
pub struct RscriptEngine {
    command: String,
    script: PathBuf,
}

impl RscriptEngine {
    pub fn new(command: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &CompareConfig, script: &Path) -> Self {
        Self::new(config.rscript_command.clone(), script)
    }
}

impl DeseqEngine for RscriptEngine {
    fn name(&self) -> &str {
        "r-deseq2"
    }

    fn run(&self, data_dir: &Path, out_dir: &Path) -> Result<EngineResults, EngineError> {
        if !self.script.is_file() {
            return Err(EngineError::MissingScript(self.script.clone()));
        }

        run_command(
            Command::new(&self.command)
                .arg(&self.script)
                .arg(data_dir)
                .arg(out_dir),
        )?;

        let pre_shrunk = read_result_table(&out_dir.join(R_PRE_SHRUNK_FILE))?;
        let post_shrunk = read_result_table(&out_dir.join(R_POST_SHRUNK_FILE))?;
        info!(
            engine = self.name(),
            features_pre = pre_shrunk.len(),
            features_post = post_shrunk.len(),
            "loaded results"
        );
        Ok(EngineResults {
            pre_shrunk,
            post_shrunk,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/engine/rscript.rs"]
mod tests;
