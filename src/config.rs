use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Knobs shared by both engine adapters and the comparison driver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub rscript_command: String,
    pub python_command: String,
    /// Replaces the embedded pyDESeq2 bridge script when set.
    pub pydeseq2_bridge_path: Option<PathBuf>,
    pub reference_factor: String,
    pub reference_level: String,
    pub refit_cooks: bool,
    pub left_suffix: String,
    pub right_suffix: String,
    pub significance_alpha: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            rscript_command: "Rscript".to_string(),
            python_command: "python3".to_string(),
            pydeseq2_bridge_path: None,
            reference_factor: "condition".to_string(),
            reference_level: "control".to_string(),
            refit_cooks: true,
            left_suffix: "_py".to_string(),
            right_suffix: "_r".to_string(),
            significance_alpha: 0.05,
        }
    }
}

impl CompareConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CompareConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rscript_command.trim().is_empty() {
            return Err(invalid("rscript_command", "must not be empty"));
        }
        if self.python_command.trim().is_empty() {
            return Err(invalid("python_command", "must not be empty"));
        }
        if self.reference_factor.is_empty() {
            return Err(invalid("reference_factor", "must not be empty"));
        }
        if self.reference_level.is_empty() {
            return Err(invalid("reference_level", "must not be empty"));
        }
        if self.left_suffix.is_empty() || self.right_suffix.is_empty() {
            return Err(invalid("left_suffix/right_suffix", "must not be empty"));
        }
        if self.left_suffix == self.right_suffix {
            return Err(invalid("left_suffix/right_suffix", "suffixes must differ"));
        }
        if !(self.significance_alpha > 0.0 && self.significance_alpha < 1.0) {
            return Err(invalid(
                "significance_alpha",
                &format!("{} is outside (0, 1)", self.significance_alpha),
            ));
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<CompareConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(CompareConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CompareConfig::from_toml_str(&text)
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
