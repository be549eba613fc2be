//! Fallback behavior when nothing else is usable.

use crate::action::context::{ActionContext, ActionOutput};
use crate::action::state::{Action, ActionStatus, Score};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IdleConfig {
    /// Seconds to stand still before the action finishes and is re-scored.
    pub duration: f32,
    pub score: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            score: 0.05,
        }
    }
}

/// Stand in place with a small constant score.
#[derive(Debug)]
pub struct Idle {
    config: IdleConfig,
    since: f32,
}

impl Idle {
    pub fn new(config: IdleConfig) -> Self {
        Self { config, since: 0.0 }
    }
}

impl Action for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn calculate_score(&self, _ctx: &ActionContext<'_>) -> Score {
        Score::new(self.config.score)
    }

    fn on_activate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        self.since = ctx.now;
        out.locomotion.clear_goal();
    }

    fn on_update(
        &mut self,
        ctx: &ActionContext<'_>,
        _out: &mut ActionOutput<'_>,
        _delta: f32,
    ) -> ActionStatus {
        if ctx.now - self.since >= self.config.duration {
            ActionStatus::Finished
        } else {
            ActionStatus::Running
        }
    }

    fn suppresses_locomotion(&self) -> bool {
        true
    }
}
