//! Per-NPC orchestration of targeting, action selection and steering.
//!
//! # Lifecycle
//!
//! 1. [`Brain::new`] validates the configuration and instantiates a private
//!    action catalog from the profile's templates.
//! 2. [`Brain::post_world_init`] is called by the host once every NPC and the
//!    building graph exist. Until then both ticks are no-ops.
//! 3. [`Brain::think`] runs at the logic rate and returns commands for the
//!    host; [`Brain::think_physics`] runs at the physics rate and returns the
//!    desired [`Motion`].
//!
//! Nothing escapes a tick as an error: a missing or dead owner turns the tick
//! into a no-op, an unreachable target makes the pursuit stand down.

pub mod navigation;

use tracing::{debug, trace, warn};

use crate::action::{
    ActionCatalog, ActionContext, ActionOutput, ActionSelector, Locomotion, NpcCommand, Selection,
};
use crate::config::{BrainConfig, ConfigError};
use crate::math::{EPSILON, Vec2, rotate_toward, wrap_angle};
use crate::profile::NpcProfile;
use crate::routing::StairsRouter;
use crate::steering::{ContextSteering, collect_danger_samples};
use crate::targeting::TargetAcquisition;
use crate::world::{CharacterView, EntityId, Groups, Perception, WorldView};

pub use navigation::NavigationPath;

/// Output of a physics tick, applied by the host's movement primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub velocity: Vec2,
    /// Facing angle in radians.
    pub look_angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrainPhase {
    /// Built, waiting for [`Brain::post_world_init`].
    Constructed,
    Ready,
}

#[derive(Debug)]
pub struct Brain {
    owner: EntityId,
    config: BrainConfig,
    selector: ActionSelector,
    targeting: TargetAcquisition,
    steering: ContextSteering,
    perception: Perception,
    navigation: NavigationPath,
    locomotion: Locomotion,
    phase: BrainPhase,
    clock: f32,
    velocity: Vec2,
    look_angle: f32,
    stun_remaining: f32,
    warned_unready: bool,
}

impl Brain {
    /// Builds a brain for `owner` from a shared profile.
    ///
    /// Every template is instantiated anew, so no action state is shared with
    /// other NPCs using the same profile.
    pub fn new(owner: EntityId, profile: &NpcProfile) -> Result<Self, ConfigError> {
        let catalog = ActionCatalog::from_templates(&profile.actions);
        Self::with_catalog(owner, profile.config.clone(), profile.hostile_groups, catalog)
    }

    /// Builds a brain around an already-instantiated catalog.
    pub fn with_catalog(
        owner: EntityId,
        config: BrainConfig,
        hostile_groups: Groups,
        catalog: ActionCatalog,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.is_empty() {
            warn!(npc = %owner, "brain has no actions; it will stand still");
        }
        if hostile_groups.is_empty() {
            warn!(npc = %owner, "brain has no hostile groups; it will never acquire a target");
        }

        Ok(Self {
            owner,
            targeting: TargetAcquisition::new(hostile_groups, config.aggro_reset_range),
            steering: ContextSteering::new(config.steering.clone()),
            selector: ActionSelector::new(catalog),
            perception: Perception::new(),
            navigation: NavigationPath::new(),
            locomotion: Locomotion::default(),
            phase: BrainPhase::Constructed,
            clock: 0.0,
            velocity: Vec2::ZERO,
            look_angle: 0.0,
            stun_remaining: 0.0,
            warned_unready: false,
            config,
        })
    }

    /// Second initialization phase, once the world is fully populated.
    pub fn post_world_init(&mut self, world: &dyn WorldView) {
        match world.character(self.owner) {
            Some(owner) => self.look_angle = wrap_angle(owner.facing),
            None => warn!(npc = %self.owner, "owner missing at world init; brain stays idle"),
        }
        self.phase = BrainPhase::Ready;
        debug!(npc = %self.owner, actions = self.selector.catalog().len(), "brain ready");
    }

    fn ready(&mut self) -> bool {
        if self.phase == BrainPhase::Ready {
            return true;
        }
        if !self.warned_unready {
            warn!(npc = %self.owner, "tick before post_world_init ignored");
            self.warned_unready = true;
        }
        false
    }

    fn living_owner(&self, world: &dyn WorldView) -> Option<CharacterView> {
        world.character(self.owner).filter(CharacterView::is_alive)
    }

    /// Logic tick: refresh the target and run action selection.
    ///
    /// # Arguments
    ///
    /// * `world` - Read-only world view for this tick
    /// * `router` - Shared stairs route cache
    /// * `delta` - Seconds since the previous logic tick
    ///
    /// # Returns
    ///
    /// Commands for the host to resolve after the tick.
    pub fn think(
        &mut self,
        world: &dyn WorldView,
        router: &mut StairsRouter,
        delta: f32,
    ) -> Vec<NpcCommand> {
        let mut commands = Vec::new();
        if !self.ready() {
            return commands;
        }
        self.clock += delta;

        let Some(owner) = self.living_owner(world) else {
            trace!(npc = %self.owner, "owner missing or dead; think skipped");
            return commands;
        };

        let target = self.targeting.refresh(&owner, world);
        // Attacks re-assert their look target every update.
        self.locomotion.clear_look_at();

        let ctx = ActionContext {
            world,
            owner,
            target,
            now: self.clock,
            config: &self.config,
        };
        let mut out = ActionOutput::new(router, &mut self.locomotion, &mut commands);
        let selection = self.selector.tick(&ctx, &mut out, delta);

        match selection {
            Selection::Activated { .. } | Selection::Stopped { .. } => debug!(
                npc = %self.owner,
                ?selection,
                action = self.selector.current_name(),
                target = ?target.map(|t| t.id),
                "selection changed"
            ),
            _ => trace!(npc = %self.owner, ?selection, "selection"),
        }
        commands
    }

    /// Physics tick: follow the path, avoid dangers and produce a velocity.
    pub fn think_physics(&mut self, world: &dyn WorldView, delta: f32) -> Motion {
        if !self.ready() {
            return self.motion();
        }
        let Some(owner) = self.living_owner(world) else {
            self.velocity = Vec2::ZERO;
            self.steering.clear();
            return self.motion();
        };

        if self.stun_remaining > 0.0 {
            self.stun_remaining = (self.stun_remaining - delta).max(0.0);
            let decay = (self.config.knockback_decay * delta).min(1.0);
            self.velocity = self.velocity.lerp(Vec2::ZERO, decay);
            self.steering.clear();
            return self.motion();
        }

        match self.locomotion.goal() {
            Some(goal) => {
                self.navigation
                    .follow(world, owner.position, goal, self.clock, &self.config)
            }
            None => self.navigation.clear(),
        }
        let path_direction = self
            .navigation
            .direction_from(owner.position, self.config.waypoint_reach);

        let samples = collect_danger_samples(
            &owner,
            self.targeting.current(),
            &self.perception,
            world,
            &self.config.steering,
        );
        let direction = self.steering.steer(
            owner.position,
            self.look_angle,
            owner.radius,
            path_direction,
            &samples,
        );

        let desired = if self.selector.suppresses_locomotion() {
            Vec2::ZERO
        } else {
            direction * self.config.top_speed
        };
        self.velocity = self
            .velocity
            .move_toward(desired, self.config.acceleration * delta)
            .limit_length(self.config.top_speed);

        let look_target = match self.locomotion.look_at() {
            Some(point) if point.distance_squared_to(owner.position) > EPSILON => {
                Some((point - owner.position).angle())
            }
            _ if self.velocity.length_squared() > EPSILON => Some(self.velocity.angle()),
            _ => None,
        };
        if let Some(angle) = look_target {
            self.look_angle = wrap_angle(rotate_toward(
                self.look_angle,
                angle,
                self.config.turn_speed * delta,
            ));
        }
        self.motion()
    }

    /// Starts a stun with the given knockback velocity.
    ///
    /// While stunned, steering is suppressed and velocity decays toward zero.
    pub fn apply_knockback(&mut self, impulse: Vec2, stun: f32) {
        self.velocity = impulse;
        self.stun_remaining = self.stun_remaining.max(stun);
        self.navigation.clear();
    }

    fn motion(&self) -> Motion {
        Motion {
            velocity: self.velocity,
            look_angle: self.look_angle,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn phase(&self) -> BrainPhase {
        self.phase
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    /// Id of the tracked target, if any.
    pub fn target(&self) -> Option<EntityId> {
        self.targeting.current()
    }

    pub fn current_action(&self) -> Option<&'static str> {
        self.selector.current_name()
    }

    pub fn catalog(&self) -> &ActionCatalog {
        self.selector.catalog()
    }

    pub fn steering(&self) -> &ContextSteering {
        &self.steering
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    /// Sensor entry point.
    pub fn perception_mut(&mut self) -> &mut Perception {
        &mut self.perception
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn navigation(&self) -> &NavigationPath {
        &self.navigation
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn look_angle(&self) -> f32 {
        self.look_angle
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    /// Seconds of brain time elapsed since `post_world_init`.
    pub fn clock(&self) -> f32 {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionTemplate, IdleConfig, MeleeAttackConfig, MoveToTargetConfig};
    use crate::testing::{Counters, OWNER, ScriptedAction, TestWorld, character};

    const DT: f32 = 0.1;

    fn grunt() -> NpcProfile {
        NpcProfile::new("grunt", Groups::PLAYER)
            .with_action(ActionTemplate::Melee(MeleeAttackConfig::default()))
            .with_action(ActionTemplate::MoveToTarget(MoveToTargetConfig::default()))
            .with_action(ActionTemplate::Idle(IdleConfig::default()))
    }

    fn ready_brain(world: &TestWorld, profile: &NpcProfile) -> Brain {
        let mut brain = Brain::new(OWNER, profile).expect("valid profile");
        brain.post_world_init(world);
        brain
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut profile = grunt();
        profile.config.steering.directions = 7;
        assert!(matches!(
            Brain::new(OWNER, &profile),
            Err(ConfigError::OddDirectionCount(7))
        ));
    }

    #[test]
    fn ticks_before_world_init_are_ignored() {
        let world = TestWorld::new();
        let mut brain = Brain::new(OWNER, &grunt()).unwrap();
        let mut router = StairsRouter::new();

        assert!(brain.think(&world, &mut router, DT).is_empty());
        assert_eq!(brain.current_action(), None);
        assert_eq!(brain.clock(), 0.0);
        assert_eq!(brain.phase(), BrainPhase::Constructed);
    }

    #[test]
    fn idles_without_target_then_pursues() {
        let mut world = TestWorld::new();
        let mut brain = ready_brain(&world, &grunt());
        let mut router = StairsRouter::new();

        brain.think(&world, &mut router, DT);
        assert_eq!(brain.current_action(), Some("idle"));

        world.add(character(2, Vec2::new(300.0, 0.0)));
        brain.think(&world, &mut router, DT);
        assert_eq!(brain.target(), Some(EntityId(2)));
        assert_eq!(brain.current_action(), Some("move_to_target"));
        assert_eq!(brain.locomotion().goal(), Some(Vec2::new(300.0, 0.0)));
        assert_eq!(brain.catalog().active_count(), 1);
    }

    #[test]
    fn target_in_reach_is_attacked() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(30.0, 0.0)));
        let mut brain = ready_brain(&world, &grunt());
        let mut router = StairsRouter::new();

        let mut hits = 0;
        for _ in 0..10 {
            hits += brain
                .think(&world, &mut router, DT)
                .iter()
                .filter(|c| matches!(c, NpcCommand::ApplyHit(_)))
                .count();
            assert!(brain.catalog().active_count() <= 1);
        }
        assert_eq!(hits, 1);
    }

    #[test]
    fn refusing_action_blocks_higher_score_for_the_tick() {
        let world = TestWorld::new();
        let (a, b) = (Counters::default(), Counters::default());
        let challenger = ScriptedAction::new("b", 0.1, &b);
        let dial = challenger.dial();
        let mut catalog = ActionCatalog::new();
        catalog.push(Box::new(ScriptedAction::new("a", 0.5, &a).refusing_interrupts()));
        catalog.push(Box::new(challenger));
        let mut brain =
            Brain::with_catalog(OWNER, BrainConfig::default(), Groups::PLAYER, catalog).unwrap();
        brain.post_world_init(&world);
        let mut router = StairsRouter::new();

        brain.think(&world, &mut router, DT);
        dial.set(0.9);
        brain.think(&world, &mut router, DT);

        assert_eq!(brain.current_action(), Some("a"));
        assert_eq!(b.activations(), 0);
        assert_eq!(brain.catalog().active_count(), 1);
    }

    #[test]
    fn physics_accelerates_toward_goal_and_caps_speed() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(500.0, 0.0)));
        let mut brain = ready_brain(&world, &grunt());
        let mut router = StairsRouter::new();
        brain.think(&world, &mut router, DT);

        let first = brain.think_physics(&world, 0.05);
        assert!(first.velocity.x > 0.0);
        assert!((first.velocity.length() - 30.0).abs() < 1.0e-3);

        let mut motion = first;
        for _ in 0..20 {
            motion = brain.think_physics(&world, 0.05);
        }
        assert!(motion.velocity.length() <= BrainConfig::DEFAULT_TOP_SPEED + 1.0e-3);
        assert!(motion.velocity.x > 119.0);
    }

    #[test]
    fn suppressing_action_holds_position() {
        let world = TestWorld::new();
        let counters = Counters::default();
        let mut catalog = ActionCatalog::new();
        catalog.push(Box::new(ScriptedAction::new("hold", 1.0, &counters).suppressing()));
        let mut brain =
            Brain::with_catalog(OWNER, BrainConfig::default(), Groups::PLAYER, catalog).unwrap();
        brain.post_world_init(&world);
        let mut router = StairsRouter::new();
        brain.think(&world, &mut router, DT);
        brain.locomotion.set_goal(Vec2::new(100.0, 0.0));

        let motion = brain.think_physics(&world, 0.05);
        assert_eq!(motion.velocity, Vec2::ZERO);
    }

    #[test]
    fn knockback_decays_and_suppresses_steering() {
        let world = TestWorld::new();
        let mut brain = ready_brain(&world, &grunt());
        brain.apply_knockback(Vec2::new(-200.0, 0.0), 0.3);
        assert!(brain.is_stunned());

        let motion = brain.think_physics(&world, 0.1);
        assert!((motion.velocity.x - -120.0).abs() < 1.0e-3);
        assert!(brain.steering().interest().iter().all(|&v| v == 0.0));

        for _ in 0..4 {
            brain.think_physics(&world, 0.1);
        }
        assert!(!brain.is_stunned());
    }

    #[test]
    fn dead_owner_does_nothing() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(30.0, 0.0)));
        world.kill(OWNER);
        let mut brain = ready_brain(&world, &grunt());
        let mut router = StairsRouter::new();

        assert!(brain.think(&world, &mut router, DT).is_empty());
        assert_eq!(brain.current_action(), None);
        assert_eq!(brain.think_physics(&world, DT).velocity, Vec2::ZERO);
    }

    #[test]
    fn turns_toward_look_target_at_bounded_rate() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(0.0, 30.0)));
        let mut brain = ready_brain(&world, &grunt());
        let mut router = StairsRouter::new();
        brain.think(&world, &mut router, DT);
        assert_eq!(brain.current_action(), Some("melee_attack"));

        let motion = brain.think_physics(&world, 0.1);
        // 6 rad/s for 0.1 s.
        assert!((motion.look_angle - 0.6).abs() < 1.0e-4);
    }
}
