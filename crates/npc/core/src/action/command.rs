//! Side effects requested by actions.
//!
//! Commands are deferred continuations: the brain only records them, and the
//! host resolves them after the tick. The host must check that both the
//! issuing NPC and any target are still alive before applying an effect and
//! drop the command silently otherwise.

use crate::math::Vec2;
use crate::world::{DoorId, EntityId, StairsId};

/// Payload handed to the host's impact resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    pub attacker: EntityId,
    pub target: EntityId,
    /// World point where the hit landed.
    pub location: Vec2,
    /// Surface normal at the impact point, facing the attacker.
    pub normal: Vec2,
    pub damage: f32,
    /// Knockback velocity to apply to the target.
    pub knockback: Vec2,
    /// Seconds the target is stunned by the hit.
    pub stun: f32,
}

/// A request from a brain to the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NpcCommand {
    /// Resolve an attack hit.
    ApplyHit(Impact),
    /// Traverse the given stairs to its counterpart.
    UseStairs { npc: EntityId, stairs: StairsId },
    /// Open an exterior door.
    OpenDoor { npc: EntityId, door: DoorId },
}

impl NpcCommand {
    /// The NPC that issued the command.
    pub fn issuer(&self) -> EntityId {
        match *self {
            NpcCommand::ApplyHit(impact) => impact.attacker,
            NpcCommand::UseStairs { npc, .. } | NpcCommand::OpenDoor { npc, .. } => npc,
        }
    }
}
