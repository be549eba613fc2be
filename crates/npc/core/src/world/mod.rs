//! Read-only view of the world the brain consumes.
//!
//! The decision engine never owns characters, collision or building data. The
//! host exposes them through [`WorldView`], fills each brain's [`Perception`]
//! from its own sensor, and resolves the [`crate::action::NpcCommand`]s the
//! brain emits.

pub mod graph;
pub mod perception;

use std::fmt;

use crate::math::Vec2;

pub use graph::{
    BuildingGraph, BuildingId, BuildingRegion, Door, DoorId, GraphData, GraphError, RegionId,
    Stairs, StairsId,
};
pub use perception::{BodyKey, Perception, SensedBody, Shape};

/// Unique identifier for a character (player or NPC) in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a static obstacle (wall segment, crate, pillar).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleId(pub u32);

bitflags::bitflags! {
    /// Group membership of a character.
    ///
    /// A brain treats a character as hostile when the character shares at
    /// least one group with the brain's hostile mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Groups: u32 {
        const PLAYER = 1 << 0;
        const CIVILIAN = 1 << 1;
        const GUARD = 1 << 2;
        const GANG = 1 << 3;
        const MONSTER = 1 << 4;
    }
}

impl Groups {
    /// Returns true if any group of `self` is also in `mask`.
    pub fn is_member_of_any(self, mask: Groups) -> bool {
        self.intersects(mask)
    }
}

/// Snapshot of a character as seen by the decision engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterView {
    pub id: EntityId,
    pub position: Vec2,
    /// Facing angle in radians.
    pub facing: f32,
    pub radius: f32,
    pub health: f32,
    pub groups: Groups,
    /// Building region the character stands in, `None` when outside.
    pub region: Option<RegionId>,
}

impl CharacterView {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Unit vector along the facing angle.
    pub fn facing_vector(&self) -> Vec2 {
        Vec2::from_angle(self.facing)
    }
}

/// What a ray trace stopped on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collider {
    Character(EntityId),
    Obstacle(ObstacleId),
}

/// Result of [`WorldView::raycast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub position: Vec2,
    pub normal: Vec2,
    pub collider: Collider,
}

/// Read-only access to the world for one brain tick.
pub trait WorldView {
    /// Looks up a character; `None` once it has left the world.
    fn character(&self, id: EntityId) -> Option<CharacterView>;

    /// Iterates every character currently in the world, in a stable order.
    fn characters(&self) -> Box<dyn Iterator<Item = CharacterView> + '_>;

    /// Static building graph used for multi-floor routing.
    fn building_graph(&self) -> &BuildingGraph;

    /// Returns true if the door can currently be walked through.
    fn is_door_open(&self, door: DoorId) -> bool;

    /// Traces a segment and reports the first collider hit, ignoring `exclude`.
    fn raycast(&self, from: Vec2, to: Vec2, exclude: EntityId) -> Option<RayHit>;

    /// Plans waypoints from `from` to `to` on the walkable area.
    ///
    /// The default walks straight at the goal; hosts with a navigation mesh
    /// override it.
    fn navigate(&self, from: Vec2, to: Vec2) -> Vec<Vec2> {
        let _ = from;
        vec![to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_membership_requires_overlap() {
        let gang_member = Groups::GANG | Groups::CIVILIAN;
        assert!(gang_member.is_member_of_any(Groups::GANG | Groups::GUARD));
        assert!(!gang_member.is_member_of_any(Groups::PLAYER));
        assert!(!Groups::empty().is_member_of_any(Groups::all()));
    }
}
