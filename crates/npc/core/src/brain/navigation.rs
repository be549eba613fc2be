//! Waypoint following toward the goal set by the running action.

use tracing::trace;

use crate::config::BrainConfig;
use crate::math::Vec2;
use crate::world::WorldView;

/// Planned waypoints toward a goal, consumed as the NPC reaches them.
///
/// The path is replanned through [`WorldView::navigate`] when the goal moves
/// further than the waypoint reach, and otherwise every `replan_interval`
/// seconds so moving obstacles are eventually routed around.
#[derive(Clone, Debug, Default)]
pub struct NavigationPath {
    waypoints: Vec<Vec2>,
    cursor: usize,
    goal: Option<Vec2>,
    planned_at: f32,
}

impl NavigationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goal(&self) -> Option<Vec2> {
        self.goal
    }

    /// Waypoints not reached yet.
    pub fn remaining(&self) -> &[Vec2] {
        self.waypoints.get(self.cursor..).unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.waypoints.len()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
        self.goal = None;
    }

    /// Keeps the path aimed at `goal`, replanning when needed.
    pub fn follow(
        &mut self,
        world: &dyn WorldView,
        position: Vec2,
        goal: Vec2,
        now: f32,
        config: &BrainConfig,
    ) {
        let reach_sq = config.waypoint_reach * config.waypoint_reach;
        let goal_moved = self
            .goal
            .is_none_or(|planned| planned.distance_squared_to(goal) > reach_sq);
        let stale = now - self.planned_at >= config.replan_interval;
        if !goal_moved && !stale {
            return;
        }

        self.waypoints = world.navigate(position, goal);
        self.cursor = 0;
        self.goal = Some(goal);
        self.planned_at = now;
        trace!(?goal, waypoints = self.waypoints.len(), "navigation replanned");
    }

    /// Direction to the next unreached waypoint, skipping reached ones.
    pub fn direction_from(&mut self, position: Vec2, reach: f32) -> Option<Vec2> {
        let reach_sq = reach * reach;
        while let Some(&waypoint) = self.waypoints.get(self.cursor) {
            if position.distance_squared_to(waypoint) > reach_sq {
                return Some(position.direction_to(waypoint));
            }
            self.cursor += 1;
        }
        None
    }
}
