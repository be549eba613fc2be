//! Ranged attack gated on an aim cone and line of sight.

use tracing::debug;

use super::attack::{AttackClock, AttackStep, AttackTiming};
use crate::action::command::{Impact, NpcCommand};
use crate::action::context::{ActionContext, ActionOutput};
use crate::action::state::{Action, ActionStatus, Score};
use crate::world::{CharacterView, Collider, EntityId};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangedAttackConfig {
    pub min_range: f32,
    pub max_range: f32,
    /// Minimum dot product between facing and the direction to the target.
    pub aim_tolerance: f32,
    /// Require an unobstructed trace to the target.
    pub line_of_sight: bool,
    pub damage: f32,
    pub knockback: f32,
    pub stun: f32,
    pub timing: AttackTiming,
    pub score: f32,
    /// Stand still while aiming and firing.
    pub hold_position: bool,
}

impl Default for RangedAttackConfig {
    fn default() -> Self {
        Self {
            min_range: 0.0,
            max_range: 400.0,
            aim_tolerance: 0.95,
            line_of_sight: true,
            damage: 6.0,
            knockback: 80.0,
            stun: 0.1,
            timing: AttackTiming::new(0.3, 0.05, 1.5),
            score: 0.8,
            hold_position: true,
        }
    }
}

/// Fire at the current target once it is in range, in the aim cone and visible.
#[derive(Debug)]
pub struct RangedAttack {
    config: RangedAttackConfig,
    clock: AttackClock,
    victim: Option<EntityId>,
}

impl RangedAttack {
    pub fn new(config: RangedAttackConfig) -> Self {
        Self {
            config,
            clock: AttackClock::default(),
            victim: None,
        }
    }

    fn in_range(&self, ctx: &ActionContext<'_>, target: &CharacterView) -> bool {
        let distance_sq = ctx.owner.position.distance_squared_to(target.position);
        let min = self.config.min_range;
        let max = self.config.max_range;
        distance_sq >= min * min && distance_sq <= max * max
    }

    fn is_aimed(&self, ctx: &ActionContext<'_>, target: &CharacterView) -> bool {
        let to_target = ctx.owner.position.direction_to(target.position);
        ctx.owner.facing_vector().dot(to_target) > self.config.aim_tolerance
    }

    fn has_line_of_sight(&self, ctx: &ActionContext<'_>, target: &CharacterView) -> bool {
        if !self.config.line_of_sight {
            return true;
        }
        match ctx
            .world
            .raycast(ctx.owner.position, target.position, ctx.owner.id)
        {
            None => true,
            Some(hit) => hit.collider == Collider::Character(target.id),
        }
    }

    fn fire(&self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>, victim: &CharacterView) {
        let mut direction = ctx.owner.position.direction_to(victim.position);
        if direction.is_zero() {
            direction = ctx.owner.facing_vector();
        }
        let mut location = victim.position - direction * victim.radius;
        let mut normal = -direction;

        if self.config.line_of_sight
            && let Some(hit) = ctx
                .world
                .raycast(ctx.owner.position, victim.position, ctx.owner.id)
        {
            if hit.collider != Collider::Character(victim.id) {
                debug!(npc = %ctx.owner.id, victim = %victim.id, "shot blocked before reaching victim");
                return;
            }
            location = hit.position;
            normal = hit.normal;
        }

        out.emit(NpcCommand::ApplyHit(Impact {
            attacker: ctx.owner.id,
            target: victim.id,
            location,
            normal,
            damage: self.config.damage,
            knockback: direction * self.config.knockback,
            stun: self.config.stun,
        }));
    }
}

impl Action for RangedAttack {
    fn name(&self) -> &'static str {
        "ranged_attack"
    }

    fn calculate_score(&self, ctx: &ActionContext<'_>) -> Score {
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
        if !ctx.shares_region(target)
            || !self.in_range(ctx, target)
            || !self.is_aimed(ctx, target)
            || !self.has_line_of_sight(ctx, target)
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
                self.fire(ctx, out, &victim);
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
        self.config.hold_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::state::ActionState;
    use crate::math::Vec2;
    use crate::testing::{TestWorld, character};
    use crate::world::{ObstacleId, RayHit};

    fn instant() -> RangedAttackConfig {
        RangedAttackConfig {
            timing: AttackTiming::new(0.0, 0.0, 2.0),
            ..RangedAttackConfig::default()
        }
    }

    #[test]
    fn target_behind_the_shooter_is_outside_the_aim_cone() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(-100.0, 0.0)));
        let mut harness = world.harness_targeting(EntityId(2));
        let attack = RangedAttack::new(instant());

        assert_eq!(harness.run(|ctx, _| attack.calculate_score(ctx)), Score::UNUSABLE);
    }

    #[test]
    fn aimed_target_in_range_is_usable() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(200.0, 10.0)));
        let mut harness = world.harness_targeting(EntityId(2));
        let attack = RangedAttack::new(instant());

        assert_eq!(
            harness.run(|ctx, _| attack.calculate_score(ctx)),
            Score::new(0.8)
        );
    }

    #[test]
    fn blocked_line_of_sight_scores_zero() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(200.0, 0.0)));
        world.block_rays(RayHit {
            position: Vec2::new(100.0, 0.0),
            normal: Vec2::new(-1.0, 0.0),
            collider: Collider::Obstacle(ObstacleId(5)),
        });
        let mut harness = world.harness_targeting(EntityId(2));
        let attack = RangedAttack::new(instant());

        assert_eq!(harness.run(|ctx, _| attack.calculate_score(ctx)), Score::UNUSABLE);

        let lobbed = RangedAttack::new(RangedAttackConfig {
            line_of_sight: false,
            ..instant()
        });
        assert!(harness.run(|ctx, _| lobbed.calculate_score(ctx)).is_usable());
    }

    #[test]
    fn out_of_range_scores_zero() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(500.0, 0.0)));
        let mut harness = world.harness_targeting(EntityId(2));
        let attack = RangedAttack::new(instant());

        assert_eq!(harness.run(|ctx, _| attack.calculate_score(ctx)), Score::UNUSABLE);
    }

    #[test]
    fn shot_uses_trace_hit_point() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(200.0, 0.0)));
        world.block_rays(RayHit {
            position: Vec2::new(190.0, 0.0),
            normal: Vec2::new(-1.0, 0.0),
            collider: Collider::Character(EntityId(2)),
        });
        let mut harness = world.harness_targeting(EntityId(2));
        let mut state = ActionState::new(Box::new(RangedAttack::new(instant())));

        harness.run(|ctx, out| {
            state.activate(ctx, out);
            state.update(ctx, out, 0.0);
            state.update(ctx, out, 0.0);
        });

        assert!(!state.is_active());
        let hits = harness.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].location, Vec2::new(190.0, 0.0));
        assert_eq!(hits[0].normal, Vec2::new(-1.0, 0.0));
    }
}
