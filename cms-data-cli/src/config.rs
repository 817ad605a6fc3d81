//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use cms_data_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How decoded containers are rendered
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Samples printed per line of the time signal table
    #[serde(default = "default_values_per_row")]
    pub values_per_row: usize,
    /// Separate raw and scaled values with a tab instead of a space
    #[serde(default = "default_true")]
    pub separator: bool,
    #[serde(default = "default_true")]
    pub show_index: bool,
    /// Print `(raw - offset) * scaling_factor` next to each raw sample
    #[serde(default = "default_true")]
    pub show_scaled: bool,
}

fn default_values_per_row() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            values_per_row: default_values_per_row(),
            separator: true,
            show_index: true,
            show_scaled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Reject settings the renderer cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.output.values_per_row == 0 {
            bail!("output.values_per_row must be at least 1");
        }
        if self.decoder.max_payload_len == 0 {
            bail!("decoder.max_payload_len must be at least 1");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}
