//! Brain configuration loader.

use std::path::Path;

use npc_core::BrainConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for shared brain configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load brain config from a TOML file.
    ///
    /// Missing keys keep their defaults; the result is validated.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing a BrainConfig
    ///
    /// # Returns
    ///
    /// Returns a validated BrainConfig.
    pub fn load(path: &Path) -> LoadResult<BrainConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid brain config {}: {}", path.display(), e))
    }

    /// Parse and validate brain config from TOML text.
    pub fn parse(content: &str) -> LoadResult<BrainConfig> {
        let config: BrainConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse brain config TOML: {}", e))?;
        config.validate()?;

        Ok(config)
    }
}
