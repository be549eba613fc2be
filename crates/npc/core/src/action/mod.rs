//! Selectable NPC behaviors.
//!
//! - [`state`]: the `Action` trait and the activation lifecycle
//! - [`kinds`]: melee, ranged, move-to-target and idle behaviors
//! - [`catalog`]: templates and per-brain instantiation
//! - [`selector`]: utility-based selection over a catalog
//! - [`context`] / [`command`]: what an action reads and what it may emit

pub mod catalog;
pub mod command;
pub mod context;
pub mod kinds;
pub mod selector;
pub mod state;

pub use catalog::{ActionCatalog, ActionKind, ActionTemplate};
pub use command::{Impact, NpcCommand};
pub use context::{ActionContext, ActionOutput, Locomotion};
pub use kinds::{
    AttackTiming, Idle, IdleConfig, MeleeAttack, MeleeAttackConfig, MoveToTarget,
    MoveToTargetConfig, RangedAttack, RangedAttackConfig,
};
pub use selector::{ActionSelector, Selection};
pub use state::{Action, ActionState, ActionStatus, Score};
