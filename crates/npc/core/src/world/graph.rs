//! Building region graph.
//!
//! Regions are the nodes (one floor or room of a building), stairs are the
//! edges. Each stairs is declared inside one region and names the stairs it
//! leads to; only one side of a pair needs to declare the link, the other side
//! is filled in when the graph is built. The graph is immutable afterwards.

use std::collections::HashMap;

use crate::error::{ErrorSeverity, NpcError};
use crate::math::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StairsId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoorId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingId(pub u32);

/// One walkable area of a building.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingRegion {
    pub id: RegionId,
    pub building: BuildingId,
    /// Elevation level, 0 for the ground floor.
    pub level: i32,
    /// Exterior door, present only on regions with an exit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exit: Option<DoorId>,
    /// Stairs owned by this region, in declaration order. Filled by the graph.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stairs: Vec<StairsId>,
}

impl BuildingRegion {
    pub fn new(id: RegionId, building: BuildingId, level: i32) -> Self {
        Self {
            id,
            building,
            level,
            exit: None,
            stairs: Vec::new(),
        }
    }

    pub fn with_exit(mut self, door: DoorId) -> Self {
        self.exit = Some(door);
        self
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }
}

/// A stairs link standing in `region` and leading to `target`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stairs {
    pub id: StairsId,
    pub region: RegionId,
    pub position: Vec2,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<StairsId>,
}

impl Stairs {
    pub fn new(id: StairsId, region: RegionId, position: Vec2) -> Self {
        Self {
            id,
            region,
            position,
            target: None,
        }
    }

    pub fn leading_to(mut self, target: StairsId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Exterior door connecting a region to the outside.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Door {
    pub id: DoorId,
    pub region: RegionId,
    /// Standing point just inside the door.
    pub inside: Vec2,
    /// Standing point just outside the door.
    pub outside: Vec2,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate region {0:?}")]
    DuplicateRegion(RegionId),

    #[error("duplicate stairs {0:?}")]
    DuplicateStairs(StairsId),

    #[error("duplicate door {0:?}")]
    DuplicateDoor(DoorId),

    #[error("stairs {stairs:?} stands in unknown region {region:?}")]
    UnknownRegion { stairs: StairsId, region: RegionId },

    #[error("stairs {stairs:?} leads to unknown stairs {target:?}")]
    DanglingLink { stairs: StairsId, target: StairsId },

    #[error("stairs {0:?} leads back into its own region")]
    SelfLink(StairsId),

    #[error("stairs {stairs:?} and {target:?} declare conflicting links")]
    ConflictingLink { stairs: StairsId, target: StairsId },

    #[error("stairs {0:?} is not linked to any other stairs")]
    Unlinked(StairsId),

    #[error("region {region:?} names unknown exit door {door:?}")]
    UnknownDoor { region: RegionId, door: DoorId },
}

impl NpcError for GraphError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Misconfiguration
    }

    fn error_code(&self) -> &'static str {
        use GraphError::*;
        match self {
            DuplicateRegion(_) => "GRAPH_DUPLICATE_REGION",
            DuplicateStairs(_) => "GRAPH_DUPLICATE_STAIRS",
            DuplicateDoor(_) => "GRAPH_DUPLICATE_DOOR",
            UnknownRegion { .. } => "GRAPH_UNKNOWN_REGION",
            DanglingLink { .. } => "GRAPH_DANGLING_LINK",
            SelfLink(_) => "GRAPH_SELF_LINK",
            ConflictingLink { .. } => "GRAPH_CONFLICTING_LINK",
            Unlinked(_) => "GRAPH_UNLINKED",
            UnknownDoor { .. } => "GRAPH_UNKNOWN_DOOR",
        }
    }
}

/// Raw graph declaration, as loaded from content files.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphData {
    pub regions: Vec<BuildingRegion>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stairs: Vec<Stairs>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub doors: Vec<Door>,
}

/// Validated, immutable building graph.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "GraphData"))]
pub struct BuildingGraph {
    regions: Vec<BuildingRegion>,
    stairs: Vec<Stairs>,
    doors: Vec<Door>,
    region_index: HashMap<RegionId, usize>,
    stairs_index: HashMap<StairsId, usize>,
    door_index: HashMap<DoorId, usize>,
}

impl BuildingGraph {
    /// Builds the graph, completing one-sided stairs declarations.
    pub fn new(data: GraphData) -> Result<Self, GraphError> {
        let GraphData {
            mut regions,
            mut stairs,
            doors,
        } = data;

        let mut region_index = HashMap::with_capacity(regions.len());
        for (idx, region) in regions.iter_mut().enumerate() {
            region.stairs.clear();
            if region_index.insert(region.id, idx).is_some() {
                return Err(GraphError::DuplicateRegion(region.id));
            }
        }

        let mut door_index = HashMap::with_capacity(doors.len());
        for (idx, door) in doors.iter().enumerate() {
            if door_index.insert(door.id, idx).is_some() {
                return Err(GraphError::DuplicateDoor(door.id));
            }
        }
        for region in &regions {
            if let Some(door) = region.exit
                && !door_index.contains_key(&door)
            {
                return Err(GraphError::UnknownDoor {
                    region: region.id,
                    door,
                });
            }
        }

        let mut stairs_index = HashMap::with_capacity(stairs.len());
        for (idx, s) in stairs.iter().enumerate() {
            if stairs_index.insert(s.id, idx).is_some() {
                return Err(GraphError::DuplicateStairs(s.id));
            }
            if !region_index.contains_key(&s.region) {
                return Err(GraphError::UnknownRegion {
                    stairs: s.id,
                    region: s.region,
                });
            }
        }

        // Every declared link must resolve before any reverse side is written.
        for s in &stairs {
            if let Some(target) = s.target
                && !stairs_index.contains_key(&target)
            {
                return Err(GraphError::DanglingLink {
                    stairs: s.id,
                    target,
                });
            }
        }

        // Complete the reverse side of one-directional declarations.
        for idx in 0..stairs.len() {
            let Some(target) = stairs[idx].target else {
                continue;
            };
            let id = stairs[idx].id;
            let target_idx = stairs_index[&target];
            if stairs[target_idx].region == stairs[idx].region {
                return Err(GraphError::SelfLink(id));
            }
            match stairs[target_idx].target {
                None => stairs[target_idx].target = Some(id),
                Some(back) if back == id => {}
                Some(_) => return Err(GraphError::ConflictingLink { stairs: id, target }),
            }
        }

        for s in &stairs {
            if s.target.is_none() {
                return Err(GraphError::Unlinked(s.id));
            }
            let region_idx = region_index[&s.region];
            regions[region_idx].stairs.push(s.id);
        }

        Ok(Self {
            regions,
            stairs,
            doors,
            region_index,
            stairs_index,
            door_index,
        })
    }

    pub fn region(&self, id: RegionId) -> Option<&BuildingRegion> {
        self.region_index.get(&id).map(|&idx| &self.regions[idx])
    }

    pub fn stairs(&self, id: StairsId) -> Option<&Stairs> {
        self.stairs_index.get(&id).map(|&idx| &self.stairs[idx])
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.door_index.get(&id).map(|&idx| &self.doors[idx])
    }

    /// The stairs on the other end of `id`.
    pub fn counterpart(&self, id: StairsId) -> Option<&Stairs> {
        self.stairs(id)
            .and_then(|s| s.target)
            .and_then(|target| self.stairs(target))
    }

    /// Region a character arrives in after taking `id`.
    pub fn destination_region(&self, id: StairsId) -> Option<RegionId> {
        self.counterpart(id).map(|s| s.region)
    }

    /// Exterior door of `region`, if it has one.
    pub fn exit_door(&self, region: RegionId) -> Option<&Door> {
        self.region(region)
            .and_then(|r| r.exit)
            .and_then(|door| self.door(door))
    }

    pub fn regions(&self) -> impl Iterator<Item = &BuildingRegion> {
        self.regions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns true if both regions belong to the same building.
    pub fn same_building(&self, a: RegionId, b: RegionId) -> bool {
        match (self.region(a), self.region(b)) {
            (Some(a), Some(b)) => a.building == b.building,
            _ => false,
        }
    }
}

impl TryFrom<GraphData> for BuildingGraph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        Self::new(data)
    }
}
