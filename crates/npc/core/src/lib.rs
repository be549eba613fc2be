//! NPC decision engine: utility action selection, context steering and
//! multi-floor stairs routing.
//!
//! `npc-core` never owns characters, physics or building data. Hosts expose
//! them through [`world::WorldView`], feed each [`brain::Brain`] its
//! [`world::Perception`], drive the two tick entry points at fixed rates and
//! resolve the [`action::NpcCommand`]s the brains emit.
pub mod action;
pub mod brain;
pub mod config;
pub mod error;
pub mod math;
pub mod profile;
pub mod routing;
pub mod steering;
pub mod targeting;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    Action, ActionCatalog, ActionContext, ActionKind, ActionOutput, ActionSelector, ActionState,
    ActionStatus, ActionTemplate, AttackTiming, IdleConfig, Impact, Locomotion, MeleeAttackConfig,
    MoveToTargetConfig, NpcCommand, RangedAttackConfig, Score, Selection,
};
pub use brain::{Brain, BrainPhase, Motion, NavigationPath};
pub use config::{BrainConfig, ConfigError, EscapeBias, SteeringConfig};
pub use error::{ErrorSeverity, NpcError};
pub use math::Vec2;
pub use profile::NpcProfile;
pub use routing::{RouteCacheStats, RouteError, StairsRoute, StairsRouter};
pub use steering::{ContextSteering, DangerSample};
pub use targeting::TargetAcquisition;
pub use world::{
    BodyKey, BuildingGraph, BuildingId, BuildingRegion, CharacterView, Collider, Door, DoorId,
    EntityId, GraphData, GraphError, Groups, ObstacleId, Perception, RayHit, RegionId, SensedBody,
    Shape, Stairs, StairsId, WorldView,
};
