use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::config::CompareConfig;
use crate::engine::{DeseqEngine, EngineError, EngineResults, ensure_feature_index, run_command};
use crate::input::counts::{SampleCounts, read_counts};
use crate::input::metadata::{SampleMetadata, read_metadata};
use crate::input::{COUNTS_FILE, METADATA_FILE};
use crate::output::{PY_POST_SHRUNK_FILE, PY_PRE_SHRUNK_FILE, PY_SIZE_FACTORS_FILE, write_atomic};
use crate::table::read_result_table;
use crate::table::size_factors::{SizeFactors, read_size_factors};

const BRIDGE_SCRIPT: &str = include_str!("pydeseq2_bridge.py");

const STAGED_COUNTS: &str = "counts.csv";
const STAGED_METADATA: &str = "metadata.csv";
const STAGED_PRE_SHRUNK: &str = "results_pre_shrunk.csv";
const STAGED_POST_SHRUNK: &str = "results_post_shrunk.csv";
const STAGED_SIZE_FACTORS: &str = "size_factors.csv";

/// How the model input is built from the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignSpec {
    pub reference_factor: String,
    pub reference_level: String,
    pub refit_cooks: bool,
}

impl From<&CompareConfig> for DesignSpec {
    fn from(config: &CompareConfig) -> Self {
        Self {
            reference_factor: config.reference_factor.clone(),
            reference_level: config.reference_level.clone(),
            refit_cooks: config.refit_cooks,
        }
    }
}

/// pyDESeq2 driven from Rust.
///
/// Inputs are read, transposed and aligned here; the fit itself runs in the
/// pyDESeq2 library through a bridge script inside a private staging
/// directory. Results are validated against the input before the three
/// `py_*` files are written.
#[derive(Debug, Clone)]
pub struct PyDeseq2Engine {
    python: String,
    bridge: Option<PathBuf>,
    design: DesignSpec,
}

#[derive(Debug)]
struct ModelInput {
    counts: SampleCounts,
    metadata: SampleMetadata,
}

impl PyDeseq2Engine {
    pub fn new(python: impl Into<String>, bridge: Option<PathBuf>, design: DesignSpec) -> Self {
        Self {
            python: python.into(),
            bridge,
            design,
        }
    }

    pub fn from_config(config: &CompareConfig) -> Self {
        Self::new(
            config.python_command.clone(),
            config.pydeseq2_bridge_path.clone(),
            DesignSpec::from(config),
        )
    }

    fn load_input(&self, data_dir: &Path) -> Result<ModelInput, EngineError> {
        let counts = read_counts(&data_dir.join(COUNTS_FILE))?;
        let metadata = read_metadata(&data_dir.join(METADATA_FILE))?;
        info!(
            features = counts.n_features(),
            samples = counts.n_samples(),
            factors = metadata.factors.len(),
            "loaded counts and metadata"
        );

        let counts = counts.transpose();
        let aligned = metadata.align_to(&counts.sample_ids)?;
        if !aligned.dropped.is_empty() {
            warn!(
                dropped = %aligned.dropped.join(","),
                "metadata rows without counts were dropped"
            );
        }
        aligned.metadata.ensure_reference(
            &self.design.reference_factor,
            &self.design.reference_level,
        )?;

        Ok(ModelInput {
            counts,
            metadata: aligned.metadata,
        })
    }

    fn fit(&self, input: &ModelInput, staging: &Path) -> Result<FitOutput, EngineError> {
        fs::write(staging.join(STAGED_COUNTS), sample_counts_csv(&input.counts)?)?;
        fs::write(staging.join(STAGED_METADATA), metadata_csv(&input.metadata)?)?;

        let bridge = match &self.bridge {
            Some(path) => {
                if !path.is_file() {
                    return Err(EngineError::MissingScript(path.clone()));
                }
                path.clone()
            }
            None => {
                let path = staging.join("pydeseq2_bridge.py");
                fs::write(&path, BRIDGE_SCRIPT)?;
                path
            }
        };

        run_command(
            Command::new(&self.python)
                .arg(&bridge)
                .arg(staging)
                .arg(&self.design.reference_factor)
                .arg(&self.design.reference_level)
                .arg(if self.design.refit_cooks { "true" } else { "false" }),
        )?;

        Ok(FitOutput {
            results: EngineResults {
                pre_shrunk: read_result_table(&staging.join(STAGED_PRE_SHRUNK))?,
                post_shrunk: read_result_table(&staging.join(STAGED_POST_SHRUNK))?,
            },
            size_factors: read_size_factors(&staging.join(STAGED_SIZE_FACTORS))?,
        })
    }

    fn validate(&self, input: &ModelInput, fit: &FitOutput) -> Result<(), EngineError> {
        let features = &input.counts.feature_ids;
        ensure_feature_index(self.name(), PY_PRE_SHRUNK_FILE, &fit.results.pre_shrunk, features)?;
        ensure_feature_index(self.name(), PY_POST_SHRUNK_FILE, &fit.results.post_shrunk, features)?;
        if fit.size_factors.sample_ids != input.counts.sample_ids {
            return Err(EngineError::Misaligned {
                engine: self.name().to_string(),
                reason: format!(
                    "{PY_SIZE_FACTORS_FILE}: {} samples, expected {} in counts order",
                    fit.size_factors.len(),
                    input.counts.sample_ids.len()
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
struct FitOutput {
    results: EngineResults,
    size_factors: SizeFactors,
}

impl DeseqEngine for PyDeseq2Engine {
    fn name(&self) -> &str {
        "pydeseq2"
    }

    fn run(&self, data_dir: &Path, out_dir: &Path) -> Result<EngineResults, EngineError> {
        let input = self.load_input(data_dir)?;

        let staging = tempfile::Builder::new().prefix("pydeseq2-").tempdir()?;
        let fit = self.fit(&input, staging.path())?;
        self.validate(&input, &fit)?;
        staging.close()?;

        write_atomic(
            &out_dir.join(PY_PRE_SHRUNK_FILE),
            &fit.results.pre_shrunk.to_csv_bytes()?,
        )?;
        write_atomic(
            &out_dir.join(PY_POST_SHRUNK_FILE),
            &fit.results.post_shrunk.to_csv_bytes()?,
        )?;
        write_atomic(
            &out_dir.join(PY_SIZE_FACTORS_FILE),
            &fit.size_factors.to_csv_bytes()?,
        )?;
        info!(
            engine = self.name(),
            features = fit.results.pre_shrunk.len(),
            samples = fit.size_factors.len(),
            "wrote results"
        );

        Ok(fit.results)
    }
}

fn sample_counts_csv(counts: &SampleCounts) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(std::iter::once("").chain(counts.feature_ids.iter().map(String::as_str)))?;
    for (sample, row) in counts.sample_ids.iter().zip(&counts.counts) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(sample.clone());
        record.extend(row.iter().map(u64::to_string));
        writer.write_record(&record)?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

fn metadata_csv(metadata: &SampleMetadata) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(
        std::iter::once(metadata.index_name.as_str())
            .chain(metadata.factors.iter().map(String::as_str)),
    )?;
    for (sample, row) in metadata.sample_ids.iter().zip(&metadata.values) {
        writer.write_record(std::iter::once(sample).chain(row.iter()))?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
#[path = "../../tests/src_inline/engine/pydeseq2.rs"]
mod tests;
