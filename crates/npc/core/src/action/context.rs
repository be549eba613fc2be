//! Inputs and outputs of an action call.
//!
//! [`ActionContext`] is the read-only blackboard assembled once per logic
//! tick; [`ActionOutput`] collects everything an action wants to change:
//! locomotion goals, the stairs route cache and commands for the host.

use crate::action::command::NpcCommand;
use crate::config::BrainConfig;
use crate::math::Vec2;
use crate::routing::StairsRouter;
use crate::world::{CharacterView, EntityId, WorldView};

/// Read-only state shared by every action during one logic tick.
pub struct ActionContext<'a> {
    pub world: &'a dyn WorldView,
    /// The NPC that owns the brain.
    pub owner: CharacterView,
    /// Target chosen by target acquisition this tick.
    pub target: Option<CharacterView>,
    /// Brain clock, in seconds since the brain was initialized.
    pub now: f32,
    pub config: &'a BrainConfig,
}

impl<'a> ActionContext<'a> {
    /// Current target, if it is still alive.
    pub fn live_target(&self) -> Option<&CharacterView> {
        self.target.as_ref().filter(|t| t.is_alive())
    }

    /// Squared distance from the owner to the current target.
    pub fn target_distance_squared(&self) -> Option<f32> {
        self.target
            .as_ref()
            .map(|t| self.owner.position.distance_squared_to(t.position))
    }

    /// True when `other` stands in the owner's region (or both are outside).
    pub fn shares_region(&self, other: &CharacterView) -> bool {
        self.owner.region == other.region
    }

    /// Fresh lookup of a character an action committed to earlier.
    ///
    /// Returns `None` once the character died or left the world.
    pub fn living(&self, id: EntityId) -> Option<CharacterView> {
        self.world.character(id).filter(CharacterView::is_alive)
    }
}

/// Movement intent written by actions and consumed by the physics tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Locomotion {
    goal: Option<Vec2>,
    look_at: Option<Vec2>,
}

impl Locomotion {
    pub fn goal(&self) -> Option<Vec2> {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Vec2) {
        self.goal = Some(goal);
    }

    pub fn clear_goal(&mut self) {
        self.goal = None;
    }

    pub fn look_at(&self) -> Option<Vec2> {
        self.look_at
    }

    pub fn set_look_at(&mut self, point: Vec2) {
        self.look_at = Some(point);
    }

    pub fn clear_look_at(&mut self) {
        self.look_at = None;
    }
}

/// Mutable side of an action call.
pub struct ActionOutput<'a> {
    pub router: &'a mut StairsRouter,
    pub locomotion: &'a mut Locomotion,
    commands: &'a mut Vec<NpcCommand>,
}

impl<'a> ActionOutput<'a> {
    pub fn new(
        router: &'a mut StairsRouter,
        locomotion: &'a mut Locomotion,
        commands: &'a mut Vec<NpcCommand>,
    ) -> Self {
        Self {
            router,
            locomotion,
            commands,
        }
    }

    /// Queues a command for the host to resolve after the tick.
    pub fn emit(&mut self, command: NpcCommand) {
        self.commands.push(command);
    }
}
