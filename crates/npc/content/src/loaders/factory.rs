//! Content factory for loading NPC data from a data directory.

use std::path::{Path, PathBuf};

use npc_core::{BrainConfig, BuildingGraph, NpcProfile};

use crate::loaders::{BuildingLoader, ConfigLoader, LoadResult, ProfileLoader};

/// Content factory that loads all NPC content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── brain.toml
/// ├── profiles.ron
/// └── buildings/
///     └── tower.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the shared brain configuration from `brain.toml`.
    pub fn load_config(&self) -> LoadResult<BrainConfig> {
        let path = self.data_dir.join("brain.toml");
        ConfigLoader::load(&path)
    }

    /// Load profiles from `profiles.ron`, using `brain.toml` as their base.
    pub fn load_profiles(&self) -> LoadResult<Vec<NpcProfile>> {
        let base = self.load_config()?;
        let path = self.data_dir.join("profiles.ron");
        ProfileLoader::load(&path, &base)
    }

    /// Load a building graph from `buildings/{name}.ron`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the building file (without `.ron` extension)
    pub fn load_building(&self, name: &str) -> LoadResult<BuildingGraph> {
        let path = self
            .data_dir
            .join("buildings")
            .join(format!("{}.ron", name));
        BuildingLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
