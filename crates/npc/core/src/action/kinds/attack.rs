//! Prepare → execute → cooldown timing shared by attack actions.
//!
//! The clock stores timestamps instead of suspended continuations: each
//! update compares the brain clock against the phase start and reports when
//! the hit should land.

/// Wind-up, effect and recovery durations, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackTiming {
    /// Delay between activation and the start of the swing/shot.
    pub prepare: f32,
    /// Delay between the start of the swing/shot and the hit landing.
    pub execute: f32,
    /// Window after the hit during which the attack scores zero.
    pub cooldown: f32,
}

impl AttackTiming {
    pub const fn new(prepare: f32, execute: f32, cooldown: f32) -> Self {
        Self {
            prepare,
            execute,
            cooldown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub(crate) enum AttackPhase {
    #[default]
    Ready,
    Preparing {
        since: f32,
    },
    Executing {
        since: f32,
    },
}

/// What the owning action should do after advancing the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttackStep {
    /// Still winding up or swinging.
    Waiting,
    /// The execute delay elapsed: apply the effect now.
    Fire,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct AttackClock {
    phase: AttackPhase,
    last_fired: Option<f32>,
}

impl AttackClock {
    #[cfg(test)]
    pub(crate) fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub(crate) fn is_executing(&self) -> bool {
        matches!(self.phase, AttackPhase::Executing { .. })
    }

    pub(crate) fn on_cooldown(&self, now: f32, timing: &AttackTiming) -> bool {
        self.last_fired
            .is_some_and(|fired| now - fired < timing.cooldown)
    }

    pub(crate) fn begin(&mut self, now: f32) {
        self.phase = AttackPhase::Preparing { since: now };
    }

    /// Moves through at most one phase boundary.
    pub(crate) fn advance(&mut self, now: f32, timing: &AttackTiming) -> AttackStep {
        match self.phase {
            AttackPhase::Ready => AttackStep::Waiting,
            AttackPhase::Preparing { since } => {
                if now - since >= timing.prepare {
                    self.phase = AttackPhase::Executing { since: now };
                }
                AttackStep::Waiting
            }
            AttackPhase::Executing { since } => {
                if now - since >= timing.execute {
                    self.phase = AttackPhase::Ready;
                    self.last_fired = Some(now);
                    AttackStep::Fire
                } else {
                    AttackStep::Waiting
                }
            }
        }
    }

    /// Abandons a swing in progress without starting the cooldown.
    pub(crate) fn cancel(&mut self) {
        self.phase = AttackPhase::Ready;
    }
}
