//! Lifecycle contract shared by every selectable behavior.
//!
//! # State Machine
//!
//! ```text
//! Inactive --activate--> Active --(finished | interrupted | deactivate)--> Inactive
//! ```
//!
//! [`ActionState`] owns the `is_active` flag and guarantees that
//! [`Action::on_activate`] runs exactly once per Inactive → Active transition
//! and [`Action::on_deactivate`] exactly once per Active → Inactive transition.
//! Concrete actions never flip the flag themselves; they report
//! [`ActionStatus::Finished`] from `on_update` and the state performs the
//! transition.

use core::fmt;

use super::context::{ActionContext, ActionOutput};

/// Utility score of an action, always `>= 0`.
///
/// A score of exactly zero means "not usable right now" (out of range, on
/// cooldown, no target). Non-finite and negative inputs collapse to zero.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Score(f32);

impl Score {
    pub const UNUSABLE: Self = Self(0.0);

    pub fn new(value: f32) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::UNUSABLE
        }
    }

    pub const fn value(self) -> f32 {
        self.0
    }

    pub fn is_usable(self) -> bool {
        self.0 > 0.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Result of one `on_update` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    /// Keep the action active for another tick.
    Running,
    /// The action completed or lost its target; deactivate it.
    Finished,
}

/// A selectable NPC behavior.
///
/// Implementations hold their own private sub-timers (prepare, execute,
/// cooldown) and read everything else from the [`ActionContext`]. They never
/// reach back into the brain; side effects go through [`ActionOutput`].
pub trait Action: fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Utility of running this action now.
    fn calculate_score(&self, ctx: &ActionContext<'_>) -> Score;

    /// Called once on the Inactive → Active transition.
    fn on_activate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        let _ = (ctx, out);
    }

    /// Called every logic tick while active, starting the tick after activation.
    fn on_update(
        &mut self,
        ctx: &ActionContext<'_>,
        out: &mut ActionOutput<'_>,
        delta: f32,
    ) -> ActionStatus;

    /// Called once on the Active → Inactive transition.
    fn on_deactivate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        let _ = (ctx, out);
    }

    /// Whether a higher-scoring action may replace this one right now.
    fn can_interrupt(&self, ctx: &ActionContext<'_>) -> bool {
        let _ = ctx;
        true
    }

    /// Whether the NPC should stand still while this action is active.
    fn suppresses_locomotion(&self) -> bool {
        false
    }
}

/// An action instance plus its activation flag.
#[derive(Debug)]
pub struct ActionState {
    action: Box<dyn Action>,
    active: bool,
}

impl ActionState {
    pub fn new(action: Box<dyn Action>) -> Self {
        Self {
            action,
            active: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.action.name()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True only while active and the action asks to stand still.
    pub fn suppresses_locomotion(&self) -> bool {
        self.active && self.action.suppresses_locomotion()
    }

    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    pub fn score(&self, ctx: &ActionContext<'_>) -> Score {
        self.action.calculate_score(ctx)
    }

    /// Transitions to Active. No-op if already active.
    pub fn activate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        if self.active {
            return;
        }
        self.active = true;
        self.action.on_activate(ctx, out);
    }

    /// Runs one update; a finished action deactivates itself.
    pub fn update(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>, delta: f32) {
        if !self.active {
            return;
        }
        if self.action.on_update(ctx, out, delta) == ActionStatus::Finished {
            self.deactivate(ctx, out);
        }
    }

    /// Transitions to Inactive. No-op if already inactive.
    pub fn deactivate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        if !self.active {
            return;
        }
        self.active = false;
        self.action.on_deactivate(ctx, out);
    }

    /// Deactivates the action if it agrees to be interrupted.
    ///
    /// Returns true when the action is inactive afterwards.
    pub fn try_interrupt(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) -> bool {
        if !self.active {
            return true;
        }
        if !self.action.can_interrupt(ctx) {
            return false;
        }
        self.deactivate(ctx, out);
        true
    }
}
