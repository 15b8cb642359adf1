use crate::cli::{Args, ResampleFilter};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Conversion defaults stored as JSON, e.g.
///
/// ```json
/// { "quality": 85, "target": "1920, 1080, 1", "folder": "-small" }
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub quality: Option<u32>,
    pub ratio: Option<u32>,
    pub target: Option<String>,
    pub folder: Option<String>,
    pub filter: Option<ResampleFilter>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            self.merge_from_config(config);
            tracing::debug!("Loaded configuration from: {}", config_path.display());
        }
        Ok(())
    }

    fn merge_from_config(&mut self, config: ConfigFile) {
        // Options are `None` unless given on the command line
        if self.quality.is_none() {
            self.quality = config.quality;
        }
        if self.ratio.is_none() {
            self.ratio = config.ratio;
        }
        if self.target.is_none() {
            self.target = config.target;
        }
        if self.folder.is_none() {
            self.folder = config.folder;
        }
        if self.filter.is_none() {
            self.filter = config.filter;
        }
    }
}
