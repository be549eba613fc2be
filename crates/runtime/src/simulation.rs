//! Fixed-rate host simulation driving a population of brains.
//!
//! The simulation owns the world, every [`Brain`] and the shared
//! [`StairsRouter`]. [`Simulation::advance`] feeds wall-clock time into two
//! accumulators and runs physics and logic ticks at their configured rates.
//! Commands emitted by brains during a logic tick are collected and resolved
//! after every brain has thought, so effects stay deferred.

use npc_core::{
    Brain, BuildingGraph, DoorId, EntityId, Impact, NpcCommand, NpcProfile, RegionId, StairsId,
    StairsRouter, Vec2, WorldView,
};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::impact::{ImpactOutcome, ImpactResolver};
use crate::movement::{MovementPrimitive, SlideMovement};
use crate::sensor::ProximitySensor;
use crate::world::{Body, Obstacle, SimWorld};

/// Something observable that happened while resolving commands or moving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimEvent {
    Hit {
        attacker: EntityId,
        target: EntityId,
        outcome: ImpactOutcome,
    },
    StairsUsed {
        npc: EntityId,
        stairs: StairsId,
        arrived: RegionId,
    },
    DoorOpened {
        npc: EntityId,
        door: DoorId,
    },
    /// A body walked through an open door; `region` is the side it entered.
    DoorCrossed {
        entity: EntityId,
        door: DoorId,
        region: Option<RegionId>,
    },
}

/// Ticks run by one [`Simulation::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub physics_steps: u32,
    pub logic_steps: u32,
}

pub struct Simulation {
    config: RuntimeConfig,
    world: SimWorld,
    brains: Vec<Brain>,
    router: StairsRouter,
    sensor: ProximitySensor,
    movement: Box<dyn MovementPrimitive>,
    impacts: ImpactResolver,
    events: Vec<SimEvent>,
    logic_accumulator: f32,
    physics_accumulator: f32,
    elapsed: f32,
    initialized: bool,
}

impl Simulation {
    /// Create a new simulation builder
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimWorld {
        &mut self.world
    }

    pub fn brain(&self, npc: EntityId) -> Option<&Brain> {
        self.brains.iter().find(|brain| brain.owner() == npc)
    }

    pub fn brain_mut(&mut self, npc: EntityId) -> Option<&mut Brain> {
        self.brains.iter_mut().find(|brain| brain.owner() == npc)
    }

    pub fn brains(&self) -> &[Brain] {
        &self.brains
    }

    pub fn router(&self) -> &StairsRouter {
        &self.router
    }

    /// Seconds of wall-clock time fed through [`Simulation::advance`].
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Adds a character that is not driven by a brain.
    pub fn spawn_character(&mut self, body: Body) -> Result<()> {
        self.world.add_body(body)
    }

    /// Adds an NPC body and its brain.
    ///
    /// NPCs spawned after [`Simulation::post_world_init`] are initialized
    /// immediately.
    pub fn spawn_npc(&mut self, body: Body, profile: &NpcProfile) -> Result<()> {
        let npc = body.id;
        let mut brain =
            Brain::new(npc, profile).map_err(|source| RuntimeError::Brain { npc, source })?;
        self.world.add_body(body)?;
        if self.initialized {
            brain.post_world_init(&self.world);
        }
        debug!(%npc, profile = %profile.name, "npc spawned");
        self.brains.push(brain);
        Ok(())
    }

    /// Runs the second initialization phase of every brain.
    ///
    /// Call once the world is fully populated; further calls are no-ops.
    pub fn post_world_init(&mut self) {
        if self.initialized {
            return;
        }
        for brain in &mut self.brains {
            brain.post_world_init(&self.world);
        }
        self.initialized = true;
        debug!(npcs = self.brains.len(), "simulation initialized");
    }

    /// Feeds `delta` seconds into the tick accumulators.
    ///
    /// Physics runs before logic within one call. Each rate runs at most
    /// `max_catch_up_steps` ticks; the remaining backlog is dropped.
    pub fn advance(&mut self, delta: f32) -> StepReport {
        let mut report = StepReport::default();
        if !self.initialized {
            warn!("advance called before post_world_init; ignored");
            return report;
        }
        self.elapsed += delta;
        self.physics_accumulator += delta;
        self.logic_accumulator += delta;

        let physics_step = self.config.physics_step();
        while self.physics_accumulator >= physics_step
            && report.physics_steps < self.config.max_catch_up_steps
        {
            self.step_physics();
            self.physics_accumulator -= physics_step;
            report.physics_steps += 1;
        }
        if self.physics_accumulator >= physics_step {
            warn!(backlog = self.physics_accumulator, "physics falling behind; dropping backlog");
            self.physics_accumulator = 0.0;
        }

        let logic_step = self.config.logic_step();
        while self.logic_accumulator >= logic_step
            && report.logic_steps < self.config.max_catch_up_steps
        {
            self.step_logic();
            self.logic_accumulator -= logic_step;
            report.logic_steps += 1;
        }
        if self.logic_accumulator >= logic_step {
            warn!(backlog = self.logic_accumulator, "logic falling behind; dropping backlog");
            self.logic_accumulator = 0.0;
        }
        report
    }

    /// Advances in fixed slices until `seconds` have elapsed.
    pub fn run_for(&mut self, seconds: f32) {
        let slice = self.config.physics_step();
        let mut remaining = seconds;
        while remaining > 0.0 {
            let delta = remaining.min(slice);
            self.advance(delta);
            remaining -= delta;
        }
    }

    /// One logic tick: sense, think, then resolve every emitted command.
    pub fn step_logic(&mut self) {
        let step = self.config.logic_step();
        let mut commands = Vec::new();
        for brain in &mut self.brains {
            if let Some(body) = self.world.body(brain.owner()).copied() {
                self.sensor
                    .update(&self.world, &body, brain.perception_mut());
            }
            commands.extend(brain.think(&self.world, &mut self.router, step));
        }
        for command in commands {
            self.resolve(command);
        }
    }

    /// One physics tick: collect brain motion, then move every living body.
    pub fn step_physics(&mut self) {
        let step = self.config.physics_step();
        for brain in &mut self.brains {
            let motion = brain.think_physics(&self.world, step);
            if let Some(body) = self.world.body_mut(brain.owner())
                && body.is_alive()
            {
                body.velocity = motion.velocity;
                body.facing = motion.look_angle;
            }
        }

        for index in 0..self.world.bodies().len() {
            let body = self.world.bodies()[index];
            if !body.is_alive() {
                continue;
            }
            let outcome = self.movement.move_and_collide(&self.world, &body, step);
            let moved = &mut self.world.bodies_mut()[index];
            moved.position = outcome.position;
            moved.velocity = outcome.velocity;
        }
        self.cross_doors();
    }

    fn resolve(&mut self, command: NpcCommand) {
        match command {
            NpcCommand::ApplyHit(impact) => self.resolve_hit(&impact),
            NpcCommand::UseStairs { npc, stairs } => self.use_stairs(npc, stairs),
            NpcCommand::OpenDoor { npc, door } => self.open_door(npc, door),
        }
    }

    fn resolve_hit(&mut self, impact: &Impact) {
        let outcome = self.impacts.resolve(&mut self.world, impact);
        if let ImpactOutcome::Damaged { .. } = outcome
            && let Some(victim) = self.brain_mut(impact.target)
        {
            victim.apply_knockback(impact.knockback, impact.stun);
        }
        if outcome.landed() {
            self.events.push(SimEvent::Hit {
                attacker: impact.attacker,
                target: impact.target,
                outcome,
            });
        }
    }

    /// Living NPC body and its interaction reach.
    fn interacting(&self, npc: EntityId) -> Option<(Body, f32)> {
        let body = self.world.body(npc).filter(|body| body.is_alive())?;
        let reach = self.brain(npc)?.config().interaction_distance;
        Some((*body, reach))
    }

    fn use_stairs(&mut self, npc: EntityId, stairs: StairsId) {
        let Some((body, reach)) = self.interacting(npc) else {
            debug!(%npc, ?stairs, "stairs request dropped, npc dead or gone");
            return;
        };
        let graph = self.world.graph();
        let (Some(entry), Some(exit)) = (graph.stairs(stairs), graph.counterpart(stairs)) else {
            warn!(%npc, ?stairs, "stairs request for unknown or unlinked stairs");
            return;
        };
        if body.region != Some(entry.region)
            || body.position.distance_squared_to(entry.position) > reach * reach
        {
            debug!(%npc, ?stairs, "stairs request dropped, npc not at the stairs");
            return;
        }

        let (arrival, arrived) = (exit.position, exit.region);
        if let Some(body) = self.world.body_mut(npc) {
            body.position = arrival;
            body.region = Some(arrived);
        }
        debug!(%npc, ?stairs, ?arrived, "stairs used");
        self.events.push(SimEvent::StairsUsed {
            npc,
            stairs,
            arrived,
        });
    }

    fn open_door(&mut self, npc: EntityId, door: DoorId) {
        let Some((body, reach)) = self.interacting(npc) else {
            debug!(%npc, ?door, "door request dropped, npc dead or gone");
            return;
        };
        let Some(entrance) = self.world.graph().door(door) else {
            warn!(%npc, ?door, "door request for unknown door");
            return;
        };
        let reach_sq = reach * reach;
        let near = body.position.distance_squared_to(entrance.inside) <= reach_sq
            || body.position.distance_squared_to(entrance.outside) <= reach_sq;
        if !near {
            debug!(%npc, ?door, "door request dropped, npc not at the door");
            return;
        }
        if self.world.open_door(door) {
            debug!(%npc, ?door, "door opened");
            self.events.push(SimEvent::DoorOpened { npc, door });
        }
    }

    /// Moves bodies standing at an open door's far point to that side.
    fn cross_doors(&mut self) {
        let radius_sq = self.config.door_transition_radius * self.config.door_transition_radius;
        let graph = self.world.graph();
        let mut crossings: Vec<(EntityId, DoorId, Option<RegionId>)> = Vec::new();

        for body in self.world.bodies().iter().filter(|body| body.is_alive()) {
            match body.region {
                Some(region) => {
                    if let Some(door) = graph.exit_door(region)
                        && self.world.is_door_open(door.id)
                        && body.position.distance_squared_to(door.outside) <= radius_sq
                    {
                        crossings.push((body.id, door.id, None));
                    }
                }
                None => {
                    let entered = graph
                        .regions()
                        .filter_map(|region| region.exit)
                        .filter_map(|door| graph.door(door))
                        .find(|door| {
                            self.world.is_door_open(door.id)
                                && body.position.distance_squared_to(door.inside) <= radius_sq
                        });
                    if let Some(door) = entered {
                        crossings.push((body.id, door.id, Some(door.region)));
                    }
                }
            }
        }

        for (entity, door, region) in crossings {
            if let Some(body) = self.world.body_mut(entity) {
                body.region = region;
            }
            debug!(%entity, ?door, ?region, "door crossed");
            self.events.push(SimEvent::DoorCrossed {
                entity,
                door,
                region,
            });
        }
    }
}

/// Builder for [`Simulation`].
pub struct SimulationBuilder {
    config: RuntimeConfig,
    graph: BuildingGraph,
    obstacles: Vec<Obstacle>,
    characters: Vec<Body>,
    npcs: Vec<(Body, NpcProfile)>,
    movement: Option<Box<dyn MovementPrimitive>>,
}

impl SimulationBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            graph: BuildingGraph::default(),
            obstacles: Vec::new(),
            characters: Vec::new(),
            npcs: Vec::new(),
            movement: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Building graph used for multi-floor routing
    pub fn graph(mut self, graph: BuildingGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Character without a brain (player, civilian, dummy)
    pub fn character(mut self, body: Body) -> Self {
        self.characters.push(body);
        self
    }

    /// NPC driven by a brain built from `profile`
    pub fn npc(mut self, body: Body, profile: &NpcProfile) -> Self {
        self.npcs.push((body, profile.clone()));
        self
    }

    /// Replace the default sliding movement
    pub fn movement(mut self, movement: impl MovementPrimitive + 'static) -> Self {
        self.movement = Some(Box::new(movement));
        self
    }

    /// Build the simulation and run `post_world_init` on every brain.
    pub fn build(self) -> Result<Simulation> {
        self.config.validate()?;

        let mut simulation = Simulation {
            sensor: ProximitySensor::new(self.config.sensor_radius),
            movement: self
                .movement
                .unwrap_or_else(|| Box::new(SlideMovement::default())),
            config: self.config,
            world: SimWorld::new(self.graph),
            brains: Vec::with_capacity(self.npcs.len()),
            router: StairsRouter::new(),
            impacts: ImpactResolver,
            events: Vec::new(),
            logic_accumulator: 0.0,
            physics_accumulator: 0.0,
            elapsed: 0.0,
            initialized: false,
        };
        for obstacle in self.obstacles {
            simulation.world.add_obstacle(obstacle);
        }
        for body in self.characters {
            simulation.spawn_character(body)?;
        }
        for (body, profile) in &self.npcs {
            simulation.spawn_npc(*body, profile)?;
        }
        simulation.post_world_init();
        Ok(simulation)
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Straight-line velocity toward `to`, for scripting non-brain characters.
pub fn velocity_toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    from.direction_to(to) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use npc_core::{ActionTemplate, Groups, IdleConfig};

    fn idle_profile() -> NpcProfile {
        NpcProfile::new("idler", Groups::PLAYER).with_action(ActionTemplate::Idle(IdleConfig::default()))
    }

    fn exact_rates() -> RuntimeConfig {
        RuntimeConfig {
            logic_rate: 4.0,
            physics_rate: 8.0,
            max_catch_up_steps: 3,
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn accumulators_run_each_rate() {
        let mut sim = Simulation::builder().config(exact_rates()).build().unwrap();

        assert_eq!(
            sim.advance(0.25),
            StepReport {
                physics_steps: 2,
                logic_steps: 1
            }
        );
        assert_eq!(
            sim.advance(0.125),
            StepReport {
                physics_steps: 1,
                logic_steps: 0
            }
        );
        assert_eq!(
            sim.advance(0.125),
            StepReport {
                physics_steps: 1,
                logic_steps: 1
            }
        );
    }

    #[test]
    fn backlog_beyond_catch_up_is_dropped() {
        let mut sim = Simulation::builder().config(exact_rates()).build().unwrap();
        let report = sim.advance(5.0);
        assert_eq!(report.physics_steps, 3);
        assert_eq!(report.logic_steps, 3);
        assert_eq!(sim.advance(0.0), StepReport::default());
    }

    #[test]
    fn late_spawn_is_initialized() {
        let mut sim = Simulation::builder().build().unwrap();
        sim.spawn_npc(Body::new(EntityId(5), Vec2::ZERO, Groups::GANG), &idle_profile())
            .unwrap();
        assert_eq!(
            sim.brain(EntityId(5)).map(Brain::phase),
            Some(npc_core::BrainPhase::Ready)
        );
    }

    #[test]
    fn duplicate_npc_is_rejected() {
        let body = Body::new(EntityId(5), Vec2::ZERO, Groups::GANG);
        let result = Simulation::builder()
            .character(body)
            .npc(body, &idle_profile())
            .build();
        assert!(matches!(result, Err(RuntimeError::DuplicateEntity(EntityId(5)))));
    }

    #[test]
    fn invalid_profile_config_is_reported() {
        let mut profile = idle_profile();
        profile.config.top_speed = -1.0;
        let result = Simulation::builder()
            .npc(Body::new(EntityId(5), Vec2::ZERO, Groups::GANG), &profile)
            .build();
        match result {
            Err(err @ RuntimeError::Brain { .. }) => {
                assert_eq!(err.error_code(), "CONFIG_NON_POSITIVE")
            }
            other => panic!("unexpected result {:?}", other.err()),
        }
    }

    fn walker(config: RuntimeConfig) -> Simulation {
        let mut body = Body::new(EntityId(2), Vec2::ZERO, Groups::PLAYER);
        body.velocity = velocity_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 8.0);
        Simulation::builder()
            .config(config)
            .character(body)
            .build()
            .unwrap()
    }

    #[test]
    fn scripted_characters_move() {
        let mut sim = walker(exact_rates());
        sim.run_for(0.5);
        let moved = sim.world().body(EntityId(2)).unwrap();
        assert!((moved.position.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn dropped_backlog_is_never_simulated() {
        let mut sim = walker(exact_rates());
        // 0.5 s at 8 Hz is four steps; the cap allows three.
        let report = sim.advance(0.5);
        assert_eq!(report.physics_steps, 3);
        assert!((sim.world().body(EntityId(2)).unwrap().position.x - 3.0).abs() < 1e-4);

        assert_eq!(sim.advance(0.0).physics_steps, 0);
        assert!((sim.world().body(EntityId(2)).unwrap().position.x - 3.0).abs() < 1e-4);
        assert!((sim.elapsed() - 0.5).abs() < 1e-6);
    }
}
