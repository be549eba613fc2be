//! NPC profile loader.
//!
//! Loads profiles from RON files. Hostile groups are written by name and
//! resolved here, so data files stay readable and unknown names are caught
//! at load time.

use std::collections::HashSet;
use std::path::Path;

use npc_core::{ActionTemplate, BrainConfig, Groups, NpcProfile};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Profile entry as written in RON files.
#[derive(Debug, Clone, Deserialize)]
struct ProfileSpec {
    name: String,
    /// Group names, e.g. `["PLAYER", "GUARD"]`.
    hostile: Vec<String>,
    /// Overrides the shared brain config when present.
    #[serde(default)]
    config: Option<BrainConfig>,
    #[serde(default)]
    actions: Vec<ActionTemplate>,
}

/// Loader for NPC profiles from RON files.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load a profile list from a RON file.
    ///
    /// RON format: `Vec<ProfileSpec>`
    ///
    /// ```ron
    /// [
    ///     (
    ///         name: "thug",
    ///         hostile: ["PLAYER"],
    ///         actions: [
    ///             melee((damage: 12.0)),
    ///             move_to_target((stop_range: 30.0)),
    ///         ],
    ///     ),
    /// ]
    /// ```
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file
    /// * `base` - Brain config used by profiles that do not declare their own
    ///
    /// # Returns
    ///
    /// Returns the profiles in file order, each with a validated config.
    pub fn load(path: &Path, base: &BrainConfig) -> LoadResult<Vec<NpcProfile>> {
        let content = read_file(path)?;
        Self::parse(&content, base)
            .map_err(|e| anyhow::anyhow!("Invalid profiles {}: {}", path.display(), e))
    }

    /// Parse profiles from RON text.
    pub fn parse(content: &str, base: &BrainConfig) -> LoadResult<Vec<NpcProfile>> {
        let specs: Vec<ProfileSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profile RON: {}", e))?;

        let mut seen = HashSet::new();
        let mut profiles = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.name.clone()) {
                anyhow::bail!("Duplicate profile '{}'", spec.name);
            }
            profiles.push(Self::resolve(spec, base)?);
        }

        Ok(profiles)
    }

    fn resolve(spec: ProfileSpec, base: &BrainConfig) -> LoadResult<NpcProfile> {
        let hostile_groups = parse_groups(&spec.hostile).map_err(|e| {
            anyhow::anyhow!("Failed to resolve groups for profile '{}': {}", spec.name, e)
        })?;

        let config = spec.config.unwrap_or_else(|| base.clone());
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Profile '{}' has an invalid config: {}", spec.name, e))?;

        if spec.actions.is_empty() {
            tracing::warn!(profile = %spec.name, "profile declares no actions");
        }

        let mut profile = NpcProfile::new(spec.name, hostile_groups).with_config(config);
        profile.actions = spec.actions;
        Ok(profile)
    }
}

/// Resolves group names, case-insensitively, into a mask.
pub fn parse_groups(names: &[String]) -> LoadResult<Groups> {
    names.iter().try_fold(Groups::empty(), |mask, name| {
        Groups::from_name(&name.to_ascii_uppercase())
            .map(|group| mask | group)
            .ok_or_else(|| anyhow::anyhow!("unknown group '{}'", name))
    })
}
