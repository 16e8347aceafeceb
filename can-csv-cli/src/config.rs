//! Configuration loading and parsing

use anyhow::{Context, Result};
use can_csv_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: Option<DecoderConfig>,
    #[serde(default)]
    pub preset: Option<Preset>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    pub file: Option<PathBuf>,
}

/// Named starting points for the decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Add temperature offset, `<id>.csv`, identifier column
    Legacy,
    /// Subtract temperature offset, timestamped names, 0x500 raw
    Extended,
}

impl Preset {
    pub fn config(&self) -> DecoderConfig {
        match self {
            Preset::Legacy => DecoderConfig::legacy(),
            Preset::Extended => DecoderConfig::extended(),
        }
    }
}

impl AppConfig {
    /// Decoder configuration from the file
    ///
    /// An explicit `[decoder]` table wins over `preset`; with neither the
    /// library default applies.
    pub fn decoder_config(&self) -> DecoderConfig {
        match (&self.decoder, self.preset) {
            (Some(decoder), _) => decoder.clone(),
            (None, Some(preset)) => preset.config(),
            (None, None) => DecoderConfig::default(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .decoder_config()
        .validate()
        .with_context(|| format!("Invalid decoder settings in {:?}", path))?;

    Ok(config)
}
