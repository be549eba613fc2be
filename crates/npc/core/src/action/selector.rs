//! Utility-based action selection.
//!
//! Every logic tick the selector scores the whole catalog and decides which
//! action runs. The current action's own re-evaluated score is the baseline:
//! a candidate must score strictly higher to replace it, and on equal scores
//! the earlier catalog entry wins.
//!
//! # Zero scores
//!
//! A winning score of zero means nothing is usable. The current action is
//! then interrupted if it allows it; a refusing action keeps running.

use super::catalog::ActionCatalog;
use super::context::{ActionContext, ActionOutput};
use super::state::Score;

/// Outcome of one selection pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Selection {
    /// No action is usable and none is running.
    Nothing,
    /// The current action keeps running.
    Continued { index: usize, score: Score },
    /// The current action lost but refused interruption.
    Refused {
        current: usize,
        challenger: usize,
        score: Score,
    },
    /// A new action was activated this tick.
    Activated { index: usize, score: Score },
    /// The current action was interrupted and nothing replaced it.
    Stopped { index: usize },
}

impl Selection {
    /// Catalog index of the action that ran this tick, if any.
    pub fn running(&self) -> Option<usize> {
        match *self {
            Selection::Continued { index, .. } | Selection::Activated { index, .. } => Some(index),
            Selection::Refused { current, .. } => Some(current),
            Selection::Nothing | Selection::Stopped { .. } => None,
        }
    }
}

/// Selection state of one brain: the catalog plus the current action index.
#[derive(Debug, Default)]
pub struct ActionSelector {
    catalog: ActionCatalog,
    current: Option<usize>,
}

impl ActionSelector {
    pub fn new(catalog: ActionCatalog) -> Self {
        Self {
            catalog,
            current: None,
        }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Index of the current action, cleared once it is no longer active.
    pub fn current(&self) -> Option<usize> {
        self.current.filter(|&idx| {
            self.catalog
                .get(idx)
                .is_some_and(|action| action.is_active())
        })
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current()
            .and_then(|idx| self.catalog.get(idx))
            .map(|action| action.name())
    }

    /// True while the running action asks the NPC to stand still.
    pub fn suppresses_locomotion(&self) -> bool {
        self.current()
            .and_then(|idx| self.catalog.get(idx))
            .is_some_and(|action| action.suppresses_locomotion())
    }

    /// Runs one selection pass.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Blackboard for this tick (owner, target, clock)
    /// * `out` - Locomotion, router and command sinks
    /// * `delta` - Logic tick length in seconds
    ///
    /// # Returns
    ///
    /// What happened, for logging and tests.
    pub fn tick(
        &mut self,
        ctx: &ActionContext<'_>,
        out: &mut ActionOutput<'_>,
        delta: f32,
    ) -> Selection {
        // An action that finished on its own last tick is no longer current.
        self.current = self.current();

        let mut best_index = self.current;
        let mut best_score = match self.current.and_then(|idx| self.catalog.get(idx)) {
            Some(action) => action.score(ctx),
            None => Score::UNUSABLE,
        };

        for (idx, action) in self.catalog.iter().enumerate() {
            if Some(idx) == self.current {
                continue;
            }
            let score = action.score(ctx);
            tracing::trace!(action = action.name(), %score, "scored");
            if score > best_score {
                best_index = Some(idx);
                best_score = score;
            }
        }

        if !best_score.is_usable() {
            return self.stop_current(ctx, out, delta);
        }
        let Some(winner) = best_index else {
            return Selection::Nothing;
        };

        if let Some(current) = self.current
            && current != winner
        {
            let challenger = self.catalog.get(winner).map(|a| a.name());
            let Some(action) = self.catalog.get_mut(current) else {
                self.current = None;
                return Selection::Nothing;
            };
            if !action.try_interrupt(ctx, out) {
                tracing::trace!(current = action.name(), challenger, "interrupt refused");
                self.update_current(ctx, out, delta);
                return Selection::Refused {
                    current,
                    challenger: winner,
                    score: best_score,
                };
            }
        }

        let Some(action) = self.catalog.get_mut(winner) else {
            return Selection::Nothing;
        };
        self.current = Some(winner);
        if action.is_active() {
            action.update(ctx, out, delta);
            Selection::Continued {
                index: winner,
                score: best_score,
            }
        } else {
            tracing::debug!(npc = %ctx.owner.id, action = action.name(), score = %best_score, "action activated");
            action.activate(ctx, out);
            Selection::Activated {
                index: winner,
                score: best_score,
            }
        }
    }

    /// Deactivates the current action, if any, without selecting a new one.
    pub fn deactivate_current(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        if let Some(action) = self.current.and_then(|idx| self.catalog.get_mut(idx)) {
            action.deactivate(ctx, out);
        }
        self.current = None;
    }

    fn stop_current(
        &mut self,
        ctx: &ActionContext<'_>,
        out: &mut ActionOutput<'_>,
        delta: f32,
    ) -> Selection {
        let Some(index) = self.current else {
            return Selection::Nothing;
        };
        let Some(action) = self.catalog.get_mut(index) else {
            self.current = None;
            return Selection::Nothing;
        };
        if action.try_interrupt(ctx, out) {
            self.current = None;
            Selection::Stopped { index }
        } else {
            action.update(ctx, out, delta);
            Selection::Continued {
                index,
                score: Score::UNUSABLE,
            }
        }
    }

    fn update_current(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>, delta: f32) {
        if let Some(action) = self.current.and_then(|idx| self.catalog.get_mut(idx)) {
            action.update(ctx, out, delta);
        }
    }
}
