//! Action templates and the per-brain catalog built from them.
//!
//! Templates are plain data shared by every NPC using the same profile. A
//! brain never holds a template directly: at spawn each template is
//! instantiated into a fresh boxed action, so timers, victims and cooldowns
//! are owned by exactly one NPC.

use super::kinds::{
    Idle, IdleConfig, MeleeAttack, MeleeAttackConfig, MoveToTarget, MoveToTargetConfig,
    RangedAttack, RangedAttackConfig,
};
use super::state::{Action, ActionState};

/// Design-time description of one selectable behavior.
#[derive(Clone, Debug, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(
    name(ActionKind),
    derive(Hash, strum::Display, strum::EnumString, strum::AsRefStr),
    strum(serialize_all = "snake_case", ascii_case_insensitive)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionTemplate {
    Melee(MeleeAttackConfig),
    Ranged(RangedAttackConfig),
    MoveToTarget(MoveToTargetConfig),
    Idle(IdleConfig),
}

impl ActionTemplate {
    pub fn kind(&self) -> ActionKind {
        ActionKind::from(self)
    }

    /// Produces an owned action instance with fresh runtime state.
    pub fn instantiate(&self) -> Box<dyn Action> {
        match self {
            ActionTemplate::Melee(config) => Box::new(MeleeAttack::new(config.clone())),
            ActionTemplate::Ranged(config) => Box::new(RangedAttack::new(config.clone())),
            ActionTemplate::MoveToTarget(config) => Box::new(MoveToTarget::new(config.clone())),
            ActionTemplate::Idle(config) => Box::new(Idle::new(config.clone())),
        }
    }
}

/// Ordered, per-brain list of action instances.
///
/// Order matters: on equal scores the earlier action wins.
#[derive(Debug, Default)]
pub struct ActionCatalog {
    actions: Vec<ActionState>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates every template, preserving order.
    pub fn from_templates(templates: &[ActionTemplate]) -> Self {
        Self {
            actions: templates
                .iter()
                .map(|template| ActionState::new(template.instantiate()))
                .collect(),
        }
    }

    /// Appends an already-built action.
    pub fn push(&mut self, action: Box<dyn Action>) {
        self.actions.push(ActionState::new(action));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ActionState> {
        self.actions.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ActionState> {
        self.actions.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionState> {
        self.actions.iter()
    }

    /// Number of actions currently active. Never more than one.
    pub fn active_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_active()).count()
    }

    /// Index of the active action, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.actions.iter().position(ActionState::is_active)
    }
}
