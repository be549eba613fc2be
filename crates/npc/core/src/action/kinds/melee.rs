//! Close-range attack.

use tracing::debug;

use super::attack::{AttackClock, AttackStep, AttackTiming};
use crate::action::command::{Impact, NpcCommand};
use crate::action::context::{ActionContext, ActionOutput};
use crate::action::state::{Action, ActionStatus, Score};
use crate::world::{CharacterView, EntityId};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeleeAttackConfig {
    /// Centre-to-centre distance within which the attack can start.
    pub max_range: f32,
    pub damage: f32,
    /// Knockback speed given to the victim.
    pub knockback: f32,
    /// Stun duration given to the victim, in seconds.
    pub stun: f32,
    pub timing: AttackTiming,
    /// Score while usable.
    pub score: f32,
}

impl Default for MeleeAttackConfig {
    fn default() -> Self {
        Self {
            max_range: 48.0,
            damage: 10.0,
            knockback: 200.0,
            stun: 0.3,
            timing: AttackTiming::new(0.25, 0.1, 1.0),
            score: 1.0,
        }
    }
}

/// Swing at the current target once it is within reach.
///
/// The NPC stands still and faces the victim for the whole attack. A swing
/// that has started executing cannot be interrupted.
#[derive(Debug)]
pub struct MeleeAttack {
    config: MeleeAttackConfig,
    clock: AttackClock,
    victim: Option<EntityId>,
}

impl MeleeAttack {
    pub fn new(config: MeleeAttackConfig) -> Self {
        Self {
            config,
            clock: AttackClock::default(),
            victim: None,
        }
    }

    fn strike(&self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>, victim: &CharacterView) {
        let offset = victim.position - ctx.owner.position;
        let reach = self.config.max_range + victim.radius;
        if offset.length_squared() > reach * reach {
            debug!(npc = %ctx.owner.id, victim = %victim.id, "melee swing missed, victim out of reach");
            return;
        }

        let mut direction = offset.normalized();
        if direction.is_zero() {
            direction = ctx.owner.facing_vector();
        }
        out.emit(NpcCommand::ApplyHit(Impact {
            attacker: ctx.owner.id,
            target: victim.id,
            location: victim.position - direction * victim.radius,
            normal: -direction,
            damage: self.config.damage,
            knockback: direction * self.config.knockback,
            stun: self.config.stun,
        }));
    }
}

impl Action for MeleeAttack {
    fn name(&self) -> &'static str {
        "melee_attack"
    }

    fn calculate_score(&self, ctx: &ActionContext<'_>) -> Score {
        // An attack in progress keeps its score so the swing can finish.
        if let Some(victim) = self.victim {
            return match ctx.living(victim) {
                Some(_) => Score::new(self.config.score),
                None => Score::UNUSABLE,
            };
        }
        if self.clock.on_cooldown(ctx.now, &self.config.timing) {
            return Score::UNUSABLE;
        }
        let Some(target) = ctx.live_target() else {
            return Score::UNUSABLE;
        };
        let range = self.config.max_range;
        if !ctx.shares_region(target)
            || ctx.owner.position.distance_squared_to(target.position) > range * range
        {
            return Score::UNUSABLE;
        }
        Score::new(self.config.score)
    }

    fn on_activate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        self.victim = ctx.target.map(|t| t.id);
        self.clock.begin(ctx.now);
        if let Some(target) = ctx.target {
            out.locomotion.set_look_at(target.position);
        }
    }

    fn on_update(
        &mut self,
        ctx: &ActionContext<'_>,
        out: &mut ActionOutput<'_>,
        _delta: f32,
    ) -> ActionStatus {
        let Some(victim) = self.victim.and_then(|id| ctx.living(id)) else {
            return ActionStatus::Finished;
        };
        if !ctx.owner.is_alive() {
            return ActionStatus::Finished;
        }
        out.locomotion.set_look_at(victim.position);

        match self.clock.advance(ctx.now, &self.config.timing) {
            AttackStep::Waiting => ActionStatus::Running,
            AttackStep::Fire => {
                self.strike(ctx, out, &victim);
                ActionStatus::Finished
            }
        }
    }

    fn on_deactivate(&mut self, _ctx: &ActionContext<'_>, _out: &mut ActionOutput<'_>) {
        self.victim = None;
        self.clock.cancel();
    }

    fn can_interrupt(&self, _ctx: &ActionContext<'_>) -> bool {
        !self.clock.is_executing()
    }

    fn suppresses_locomotion(&self) -> bool {
        true
    }
}
