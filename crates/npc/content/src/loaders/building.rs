//! Building graph loader.

use std::path::Path;

use npc_core::{BuildingGraph, GraphData};

use crate::loaders::{LoadResult, read_file};

/// Loader for building graphs from RON files.
///
/// RON format: a `GraphData` with `regions`, `stairs` and `doors`. A stairs
/// link only needs to be declared on one side; the graph fills in the other.
///
/// ```ron
/// (
///     regions: [
///         (id: RegionId(0), building: BuildingId(0), level: 0, exit: Some(DoorId(0))),
///         (id: RegionId(1), building: BuildingId(0), level: 1),
///     ],
///     stairs: [
///         (id: StairsId(0), region: RegionId(0), position: (x: 40.0, y: 0.0), target: Some(StairsId(1))),
///         (id: StairsId(1), region: RegionId(1), position: (x: 40.0, y: 0.0)),
///     ],
///     doors: [
///         (id: DoorId(0), region: RegionId(0), inside: (x: 0.0, y: 90.0), outside: (x: 0.0, y: 110.0)),
///     ],
/// )
/// ```
pub struct BuildingLoader;

impl BuildingLoader {
    /// Load and validate a building graph from a RON file.
    pub fn load(path: &Path) -> LoadResult<BuildingGraph> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid building graph {}: {}", path.display(), e))
    }

    /// Parse and validate a building graph from RON text.
    pub fn parse(content: &str) -> LoadResult<BuildingGraph> {
        let data: GraphData = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse building RON: {}", e))?;
        let graph = BuildingGraph::new(data)?;

        tracing::debug!(
            regions = graph.regions().count(),
            "loaded building graph"
        );
        Ok(graph)
    }
}
