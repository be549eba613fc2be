//! Scenario files: which building to load and who stands where.
//!
//! Scenarios keep placement separate from content. The same profiles and
//! building graphs can be combined into different encounters, and entity
//! IDs are allocated at build time in placement order.

use std::path::Path;

use npc_content::{ContentFactory, parse_groups};
use npc_core::{BuildingGraph, EntityId, NpcProfile, RegionId, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::simulation::Simulation;
use crate::world::{Body, Obstacle};

/// Who is placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementKind {
    /// Character without a brain, e.g. the player.
    Character { groups: Vec<String> },

    /// NPC built from a profile in `profiles.ron`.
    Npc {
        profile: String,
        groups: Vec<String>,
    },
}

/// One entity placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec2,
    /// Building region, `None` for outside.
    #[serde(default)]
    pub region: Option<RegionId>,
    #[serde(default)]
    pub health: Option<f32>,
    pub kind: PlacementKind,
}

/// Scenario configuration for simulation setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Building file under `buildings/`, if the scene has one.
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Scenario {
    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Scenario(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        ron::from_str(content)
            .map_err(|e| RuntimeError::Scenario(format!("failed to parse scenario RON: {}", e)))
    }

    /// Builds a simulation, loading profiles and the building from `content`.
    pub fn build(&self, content: &ContentFactory) -> Result<Simulation> {
        let profiles = content
            .load_profiles()
            .map_err(|e| RuntimeError::Content(e.into()))?;
        let graph = match &self.building {
            Some(name) => content
                .load_building(name)
                .map_err(|e| RuntimeError::Content(e.into()))?,
            None => BuildingGraph::default(),
        };
        self.build_with(graph, &profiles)
    }

    /// Builds a simulation from already-loaded content.
    pub fn build_with(&self, graph: BuildingGraph, profiles: &[NpcProfile]) -> Result<Simulation> {
        let mut builder = Simulation::builder()
            .config(self.runtime.clone())
            .graph(graph);
        for obstacle in &self.obstacles {
            builder = builder.obstacle(*obstacle);
        }

        for (index, placement) in self.placements.iter().enumerate() {
            let id = EntityId(index as u32 + 1);
            let groups = match &placement.kind {
                PlacementKind::Character { groups } | PlacementKind::Npc { groups, .. } => groups,
            };
            let groups = parse_groups(groups)
                .map_err(|e| RuntimeError::Scenario(format!("placement {}: {}", index, e)))?;

            let mut body = Body::new(id, placement.position, groups);
            body.region = placement.region;
            if let Some(health) = placement.health {
                body.health = health;
            }

            builder = match &placement.kind {
                PlacementKind::Character { .. } => builder.character(body),
                PlacementKind::Npc { profile, .. } => {
                    let profile = profiles
                        .iter()
                        .find(|p| &p.name == profile)
                        .ok_or_else(|| RuntimeError::UnknownProfile(profile.clone()))?;
                    builder.npc(body, profile)
                }
            };
        }

        tracing::info!(
            placements = self.placements.len(),
            obstacles = self.obstacles.len(),
            "building simulation from scenario"
        );
        builder.build()
    }
}
