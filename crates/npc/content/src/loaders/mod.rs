//! Content loaders for reading NPC data from files.
//!
//! Every loader parses straight into `npc-core` types and runs the same
//! validation the engine would, so a bad file fails at load time instead of
//! degrading a brain at runtime.

pub mod building;
pub mod config;
pub mod factory;
pub mod profile;

pub use building::BuildingLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use profile::{ProfileLoader, parse_groups};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
