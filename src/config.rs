//! JSON runtime configuration for embedding applications and the demo
//! binary. The core pipeline itself only ever sees the immutable
//! [`AnalyzerParams`] value inside.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analyzer::AnalyzerParams;

#[derive(Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the serialized analysis report, if anywhere.
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeConfig {
    /// CSV file with (height_mm, volume_mm3) rows.
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analyzer: AnalyzerParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
