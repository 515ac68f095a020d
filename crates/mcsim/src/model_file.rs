//! Model files
//!
//! A model file is the YAML form of [`ModelConfig`].

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use mcsim_core::config::ModelConfig;

use crate::util::io::atomic_write;

pub fn from_yaml(yaml: &str) -> Result<ModelConfig, serde_saphyr::Error> {
    serde_saphyr::from_str(yaml)
}

pub fn to_yaml(config: &ModelConfig) -> Result<String, serde_saphyr::ser::Error> {
    serde_saphyr::to_string(config)
}

/// Read and parse a model file
pub fn load(path: &Path) -> color_eyre::Result<ModelConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read model file {}", path.display()))?;
    let config = from_yaml(&content)
        .wrap_err_with(|| format!("failed to parse model file {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        variables = config.variables.len(),
        "loaded model file"
    );
    Ok(config)
}

/// Write a model file, replacing any existing one
pub fn save(path: &Path, config: &ModelConfig) -> color_eyre::Result<()> {
    let yaml = to_yaml(config).wrap_err("failed to serialize model")?;
    atomic_write(path, yaml.as_bytes())
        .wrap_err_with(|| format!("failed to write model file {}", path.display()))?;
    Ok(())
}
