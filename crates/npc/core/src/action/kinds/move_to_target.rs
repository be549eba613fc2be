//! Pursuit across regions, floors and buildings.
//!
//! Each update plans a single leg toward the current target:
//!
//! - same region (or both outside): walk straight at the target;
//! - different floors of one building: walk to the next stairs of the cached
//!   route and take it once within interaction distance;
//! - target outside or in another building: leave through the exterior door,
//!   or climb toward the nearest region that has one;
//! - NPC outside, target inside: enter through the door of the region the
//!   target can reach the exit from.
//!
//! When no leg exists the action finishes and scores zero for a while.

use tracing::debug;

use crate::action::command::NpcCommand;
use crate::action::context::{ActionContext, ActionOutput};
use crate::action::state::{Action, ActionStatus, Score};
use crate::math::Vec2;
use crate::routing::StairsRouter;
use crate::world::{BuildingGraph, CharacterView, DoorId, RegionId, StairsId};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoveToTargetConfig {
    /// Distance at which the pursuit stops and other actions take over.
    pub stop_range: f32,
    pub score: f32,
    /// Seconds to wait before retrying after the target was unreachable.
    pub retry_delay: f32,
}

impl Default for MoveToTargetConfig {
    fn default() -> Self {
        Self {
            stop_range: 40.0,
            score: 0.5,
            retry_delay: 1.0,
        }
    }
}

/// Next thing to walk toward.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Leg {
    Direct(Vec2),
    Stairs {
        stairs: StairsId,
        position: Vec2,
    },
    Door {
        door: DoorId,
        approach: Vec2,
        through: Vec2,
    },
    Unreachable,
}

#[derive(Debug)]
pub struct MoveToTarget {
    config: MoveToTargetConfig,
    retry_at: Option<f32>,
}

impl MoveToTarget {
    pub fn new(config: MoveToTargetConfig) -> Self {
        Self {
            config,
            retry_at: None,
        }
    }

    /// Only meaningful within one region: floors share coordinates.
    fn within_stop_range(&self, ctx: &ActionContext<'_>, target: &CharacterView) -> bool {
        let range = self.config.stop_range;
        ctx.owner.region == target.region
            && ctx.owner.position.distance_squared_to(target.position) <= range * range
    }

    fn plan_leg(
        graph: &BuildingGraph,
        router: &mut StairsRouter,
        owner: &CharacterView,
        target: &CharacterView,
    ) -> Leg {
        match (owner.region, target.region) {
            (from, to) if from == to => Leg::Direct(target.position),
            (Some(from), Some(to)) if graph.same_building(from, to) => {
                match router.find_route(graph, to, Some(from)) {
                    Ok(route) => match route.next_step() {
                        Some(stairs) => stairs_leg(graph, stairs),
                        None => Leg::Direct(target.position),
                    },
                    Err(_) => Leg::Unreachable,
                }
            }
            (Some(from), _) => exit_leg(graph, router, from),
            (None, Some(to)) => entry_leg(graph, router, to),
            (None, None) => Leg::Direct(target.position),
        }
    }
}

fn stairs_leg(graph: &BuildingGraph, stairs: StairsId) -> Leg {
    match graph.stairs(stairs) {
        Some(s) => Leg::Stairs {
            stairs,
            position: s.position,
        },
        None => Leg::Unreachable,
    }
}

fn exit_leg(graph: &BuildingGraph, router: &mut StairsRouter, from: RegionId) -> Leg {
    if let Some(door) = graph.exit_door(from) {
        return Leg::Door {
            door: door.id,
            approach: door.inside,
            through: door.outside,
        };
    }
    match router.find_route(graph, from, None) {
        Ok(route) => match route.next_step() {
            Some(stairs) => stairs_leg(graph, stairs),
            None => Leg::Unreachable,
        },
        Err(_) => Leg::Unreachable,
    }
}

fn entry_leg(graph: &BuildingGraph, router: &mut StairsRouter, to: RegionId) -> Leg {
    let Ok(route) = router.find_route(graph, to, None) else {
        return Leg::Unreachable;
    };
    match graph.exit_door(route.to()) {
        Some(door) => Leg::Door {
            door: door.id,
            approach: door.outside,
            through: door.inside,
        },
        None => Leg::Unreachable,
    }
}

impl Action for MoveToTarget {
    fn name(&self) -> &'static str {
        "move_to_target"
    }

    fn calculate_score(&self, ctx: &ActionContext<'_>) -> Score {
        if self.retry_at.is_some_and(|at| ctx.now < at) {
            return Score::UNUSABLE;
        }
        let Some(target) = ctx.live_target() else {
            return Score::UNUSABLE;
        };
        if self.within_stop_range(ctx, target) {
            return Score::UNUSABLE;
        }
        Score::new(self.config.score)
    }

    /// Points locomotion at the first leg right away; interactions wait for
    /// the first update.
    fn on_activate(&mut self, ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        self.retry_at = None;
        let Some(target) = ctx.live_target() else {
            return;
        };
        let graph = ctx.world.building_graph();
        match Self::plan_leg(graph, out.router, &ctx.owner, target) {
            Leg::Direct(position) | Leg::Stairs { position, .. } => out.locomotion.set_goal(position),
            Leg::Door {
                door,
                approach,
                through,
            } => out.locomotion.set_goal(if ctx.world.is_door_open(door) {
                through
            } else {
                approach
            }),
            Leg::Unreachable => {}
        }
    }

    fn on_update(
        &mut self,
        ctx: &ActionContext<'_>,
        out: &mut ActionOutput<'_>,
        _delta: f32,
    ) -> ActionStatus {
        let Some(target) = ctx.live_target().copied() else {
            return ActionStatus::Finished;
        };
        if self.within_stop_range(ctx, &target) {
            return ActionStatus::Finished;
        }

        let graph = ctx.world.building_graph();
        let leg = Self::plan_leg(graph, out.router, &ctx.owner, &target);
        let reach_sq = ctx.config.interaction_distance * ctx.config.interaction_distance;

        match leg {
            Leg::Direct(position) => out.locomotion.set_goal(position),
            Leg::Stairs { stairs, position } => {
                out.locomotion.set_goal(position);
                if ctx.owner.position.distance_squared_to(position) <= reach_sq {
                    out.emit(NpcCommand::UseStairs {
                        npc: ctx.owner.id,
                        stairs,
                    });
                }
            }
            Leg::Door {
                door,
                approach,
                through,
            } => {
                if ctx.world.is_door_open(door) {
                    out.locomotion.set_goal(through);
                } else {
                    out.locomotion.set_goal(approach);
                    if ctx.owner.position.distance_squared_to(approach) <= reach_sq {
                        if !ctx.config.can_open_doors {
                            return self.give_up(ctx, &target);
                        }
                        out.emit(NpcCommand::OpenDoor {
                            npc: ctx.owner.id,
                            door,
                        });
                    }
                }
            }
            Leg::Unreachable => return self.give_up(ctx, &target),
        }
        ActionStatus::Running
    }

    fn on_deactivate(&mut self, _ctx: &ActionContext<'_>, out: &mut ActionOutput<'_>) {
        out.locomotion.clear_goal();
    }
}

impl MoveToTarget {
    fn give_up(&mut self, ctx: &ActionContext<'_>, target: &CharacterView) -> ActionStatus {
        debug!(
            npc = %ctx.owner.id,
            target = %target.id,
            from = ?ctx.owner.region,
            to = ?target.region,
            "target unreachable, pausing pursuit"
        );
        self.retry_at = Some(ctx.now + self.config.retry_delay);
        ActionStatus::Finished
    }
}
