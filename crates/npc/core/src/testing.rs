//! Test fixtures shared by the unit tests of this crate.

use std::cell::Cell;
use std::rc::Rc;

use crate::action::{
    Action, ActionContext, ActionOutput, ActionStatus, Impact, Locomotion, NpcCommand, Score,
};
use crate::config::BrainConfig;
use crate::math::Vec2;
use crate::routing::StairsRouter;
use crate::world::{
    BuildingGraph, BuildingId, BuildingRegion, CharacterView, Door, DoorId, EntityId, GraphData,
    Groups, RayHit, RegionId, Stairs, StairsId, WorldView,
};

pub(crate) const OWNER: EntityId = EntityId(1);

/// A hostile player-group character with default stats.
pub(crate) fn character(id: u32, position: Vec2) -> CharacterView {
    CharacterView {
        id: EntityId(id),
        position,
        facing: 0.0,
        radius: 10.0,
        health: 100.0,
        groups: Groups::PLAYER,
        region: None,
    }
}

/// Three stacked floors with a ground exit, plus a sealed one-room building.
///
/// ```text
/// building 0:  r2 (s3 at -50,0)
///              r1 (s2 at -50,0) (s1 at 50,0)
///              r0 (s0 at 50,0)  door d0: inside (0,90) / outside (0,110)
/// building 1:  r3, no stairs, no exit
/// ```
pub(crate) fn tower_with_yard() -> BuildingGraph {
    let data = GraphData {
        regions: vec![
            BuildingRegion::new(RegionId(0), BuildingId(0), 0).with_exit(DoorId(0)),
            BuildingRegion::new(RegionId(1), BuildingId(0), 1),
            BuildingRegion::new(RegionId(2), BuildingId(0), 2),
            BuildingRegion::new(RegionId(3), BuildingId(1), 0),
        ],
        stairs: vec![
            Stairs::new(StairsId(0), RegionId(0), Vec2::new(50.0, 0.0)).leading_to(StairsId(1)),
            Stairs::new(StairsId(1), RegionId(1), Vec2::new(50.0, 0.0)),
            Stairs::new(StairsId(2), RegionId(1), Vec2::new(-50.0, 0.0)).leading_to(StairsId(3)),
            Stairs::new(StairsId(3), RegionId(2), Vec2::new(-50.0, 0.0)),
        ],
        doors: vec![Door {
            id: DoorId(0),
            region: RegionId(0),
            inside: Vec2::new(0.0, 90.0),
            outside: Vec2::new(0.0, 110.0),
        }],
    };
    match BuildingGraph::new(data) {
        Ok(graph) => graph,
        Err(err) => panic!("fixture graph is invalid: {err}"),
    }
}

/// In-memory world with the brain owner (`#1`, gang member at the origin).
pub(crate) struct TestWorld {
    characters: Vec<CharacterView>,
    graph: BuildingGraph,
    open_doors: Vec<DoorId>,
    ray_hit: Option<RayHit>,
    config: BrainConfig,
}

impl TestWorld {
    pub(crate) fn new() -> Self {
        Self::with_graph(BuildingGraph::default())
    }

    pub(crate) fn with_graph(graph: BuildingGraph) -> Self {
        let mut owner = character(OWNER.0, Vec2::ZERO);
        owner.groups = Groups::GANG;
        Self {
            characters: vec![owner],
            graph,
            open_doors: Vec::new(),
            ray_hit: None,
            config: BrainConfig::default(),
        }
    }

    pub(crate) fn add(&mut self, character: CharacterView) {
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => *existing = character,
            None => self.characters.push(character),
        }
    }

    fn get_mut(&mut self, id: EntityId) -> &mut CharacterView {
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(character) => character,
            None => panic!("no character {id} in test world"),
        }
    }

    pub(crate) fn kill(&mut self, id: EntityId) {
        self.get_mut(id).health = 0.0;
    }

    pub(crate) fn move_character(&mut self, id: EntityId, position: Vec2) {
        self.get_mut(id).position = position;
    }

    pub(crate) fn owner(&self) -> CharacterView {
        match self.character(OWNER) {
            Some(owner) => owner,
            None => panic!("owner missing from test world"),
        }
    }

    pub(crate) fn place_owner(&mut self, position: Vec2, region: Option<RegionId>) {
        let owner = self.get_mut(OWNER);
        owner.position = position;
        owner.region = region;
    }

    pub(crate) fn open_door(&mut self, door: DoorId) {
        self.open_doors.push(door);
    }

    /// Every raycast reports `hit` from now on.
    pub(crate) fn block_rays(&mut self, hit: RayHit) {
        self.ray_hit = Some(hit);
    }

    pub(crate) fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut BrainConfig {
        &mut self.config
    }

    pub(crate) fn harness(&self) -> Harness<'_> {
        Harness {
            world: self,
            target: None,
            now: 0.0,
            router: StairsRouter::new(),
            locomotion: Locomotion::default(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn harness_targeting(&self, target: EntityId) -> Harness<'_> {
        Harness {
            target: Some(target),
            ..self.harness()
        }
    }
}

impl WorldView for TestWorld {
    fn character(&self, id: EntityId) -> Option<CharacterView> {
        self.characters.iter().find(|c| c.id == id).copied()
    }

    fn characters(&self) -> Box<dyn Iterator<Item = CharacterView> + '_> {
        Box::new(self.characters.iter().copied())
    }

    fn building_graph(&self) -> &BuildingGraph {
        &self.graph
    }

    fn is_door_open(&self, door: DoorId) -> bool {
        self.open_doors.contains(&door)
    }

    fn raycast(&self, _from: Vec2, _to: Vec2, _exclude: EntityId) -> Option<RayHit> {
        self.ray_hit
    }
}

/// Builds contexts for calling actions directly, outside a brain.
pub(crate) struct Harness<'w> {
    world: &'w TestWorld,
    target: Option<EntityId>,
    now: f32,
    router: StairsRouter,
    locomotion: Locomotion,
    commands: Vec<NpcCommand>,
}

impl<'w> Harness<'w> {
    pub(crate) fn set_now(&mut self, now: f32) {
        self.now = now;
    }

    pub(crate) fn run<R>(&mut self, f: impl FnOnce(&ActionContext<'_>, &mut ActionOutput<'_>) -> R) -> R {
        let ctx = ActionContext {
            world: self.world,
            owner: self.world.owner(),
            target: self.target.and_then(|id| self.world.character(id)),
            now: self.now,
            config: self.world.config(),
        };
        let mut out = ActionOutput::new(&mut self.router, &mut self.locomotion, &mut self.commands);
        f(&ctx, &mut out)
    }

    pub(crate) fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    pub(crate) fn locomotion_mut(&mut self) -> &mut Locomotion {
        &mut self.locomotion
    }

    pub(crate) fn commands(&self) -> Vec<NpcCommand> {
        self.commands.clone()
    }

    pub(crate) fn hits(&self) -> Vec<Impact> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                NpcCommand::ApplyHit(impact) => Some(*impact),
                _ => None,
            })
            .collect()
    }
}

/// Shared hook counters of a [`ScriptedAction`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Counters {
    activations: Rc<Cell<u32>>,
    deactivations: Rc<Cell<u32>>,
    updates: Rc<Cell<u32>>,
}

impl Counters {
    pub(crate) fn activations(&self) -> u32 {
        self.activations.get()
    }

    pub(crate) fn deactivations(&self) -> u32 {
        self.deactivations.get()
    }

    pub(crate) fn updates(&self) -> u32 {
        self.updates.get()
    }
}

/// Action whose score and behavior are driven by the test.
#[derive(Debug)]
pub(crate) struct ScriptedAction {
    name: &'static str,
    score: Rc<Cell<f32>>,
    counters: Counters,
    finish_after: Option<u32>,
    updates_since_activation: u32,
    interruptible: bool,
    suppresses: bool,
}

impl ScriptedAction {
    pub(crate) fn new(name: &'static str, score: f32, counters: &Counters) -> Self {
        Self {
            name,
            score: Rc::new(Cell::new(score)),
            counters: counters.clone(),
            finish_after: None,
            updates_since_activation: 0,
            interruptible: true,
            suppresses: false,
        }
    }

    /// Report `Finished` on the n-th update after each activation.
    pub(crate) fn finishing_after(mut self, updates: u32) -> Self {
        self.finish_after = Some(updates);
        self
    }

    pub(crate) fn refusing_interrupts(mut self) -> Self {
        self.interruptible = false;
        self
    }

    pub(crate) fn suppressing(mut self) -> Self {
        self.suppresses = true;
        self
    }

    /// Handle for changing the score after the action moved into a catalog.
    pub(crate) fn dial(&self) -> Rc<Cell<f32>> {
        Rc::clone(&self.score)
    }
}

impl Action for ScriptedAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn calculate_score(&self, _ctx: &ActionContext<'_>) -> Score {
        Score::new(self.score.get())
    }

    fn on_activate(&mut self, _ctx: &ActionContext<'_>, _out: &mut ActionOutput<'_>) {
        self.updates_since_activation = 0;
        self.counters.activations.set(self.counters.activations.get() + 1);
    }

    fn on_update(
        &mut self,
        _ctx: &ActionContext<'_>,
        _out: &mut ActionOutput<'_>,
        _delta: f32,
    ) -> ActionStatus {
        self.updates_since_activation += 1;
        self.counters.updates.set(self.counters.updates.get() + 1);
        match self.finish_after {
            Some(limit) if self.updates_since_activation >= limit => ActionStatus::Finished,
            _ => ActionStatus::Running,
        }
    }

    fn on_deactivate(&mut self, _ctx: &ActionContext<'_>, _out: &mut ActionOutput<'_>) {
        self.counters
            .deactivations
            .set(self.counters.deactivations.get() + 1);
    }

    fn can_interrupt(&self, _ctx: &ActionContext<'_>) -> bool {
        self.interruptible
    }

    fn suppresses_locomotion(&self) -> bool {
        self.suppresses
    }
}
