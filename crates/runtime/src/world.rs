//! Host-side world state exposed to brains through [`WorldView`].

use std::collections::HashSet;

use npc_core::math::EPSILON;
use npc_core::{
    BuildingGraph, CharacterView, Collider, DoorId, EntityId, Groups, ObstacleId, RayHit,
    RegionId, Shape, Vec2, WorldView,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// A character body: player or NPC.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: f32,
    pub radius: f32,
    pub health: f32,
    pub groups: Groups,
    pub region: Option<RegionId>,
}

impl Body {
    pub const DEFAULT_RADIUS: f32 = 12.0;
    pub const DEFAULT_HEALTH: f32 = 100.0;

    pub fn new(id: EntityId, position: Vec2, groups: Groups) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            radius: Self::DEFAULT_RADIUS,
            health: Self::DEFAULT_HEALTH,
            groups,
            region: None,
        }
    }

    pub fn in_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn view(&self) -> CharacterView {
        CharacterView {
            id: self.id,
            position: self.position,
            facing: self.facing,
            radius: self.radius,
            health: self.health,
            groups: self.groups,
            region: self.region,
        }
    }
}

/// A static obstacle standing in one region (or outside, when `None`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub position: Vec2,
    pub shape: Shape,
    #[serde(default)]
    pub region: Option<RegionId>,
}

impl Obstacle {
    pub fn circle(id: ObstacleId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            shape: Shape::Circle { radius },
            region: None,
        }
    }

    pub fn rect(id: ObstacleId, position: Vec2, half_extents: Vec2) -> Self {
        Self {
            id,
            position,
            shape: Shape::Rect { half_extents },
            region: None,
        }
    }

    pub fn in_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    /// Closest point of the footprint to `point`; `point` itself when inside.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        match self.shape {
            Shape::Circle { radius } => {
                let offset = point - self.position;
                if offset.length_squared() <= radius * radius {
                    point
                } else {
                    self.position + offset.normalized() * radius
                }
            }
            Shape::Rect { half_extents: h } => Vec2::new(
                point.x.clamp(self.position.x - h.x, self.position.x + h.x),
                point.y.clamp(self.position.y - h.y, self.position.y + h.y),
            ),
        }
    }

    /// Entry time in `[0, 1]` and surface normal of the segment `from → to`.
    fn intersect(&self, from: Vec2, to: Vec2) -> Option<(f32, Vec2)> {
        match self.shape {
            Shape::Circle { radius } => segment_circle(from, to, self.position, radius),
            Shape::Rect { half_extents } => segment_rect(from, to, self.position, half_extents),
        }
    }
}

/// First intersection of a segment with a circle.
fn segment_circle(from: Vec2, to: Vec2, center: Vec2, radius: f32) -> Option<(f32, Vec2)> {
    let delta = to - from;
    let offset = from - center;
    let a = delta.length_squared();
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        // Starts inside: report a hit at the origin.
        return Some((0.0, offset.normalized()));
    }
    if a <= EPSILON {
        return None;
    }
    let b = offset.dot(delta);
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = from + delta * t;
    Some((t, (point - center).normalized()))
}

/// Slab test of a segment against an axis-aligned rectangle.
fn segment_rect(from: Vec2, to: Vec2, center: Vec2, half: Vec2) -> Option<(f32, Vec2)> {
    let delta = to - from;
    let min = center - half;
    let max = center + half;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;
    let mut normal = Vec2::ZERO;

    let axes = [
        (from.x, delta.x, min.x, max.x, Vec2::RIGHT),
        (from.y, delta.y, min.y, max.y, Vec2::UP),
    ];
    for (origin, d, lo, hi, axis) in axes {
        if d.abs() <= EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let (near, far, face) = if d > 0.0 {
            ((lo - origin) / d, (hi - origin) / d, -axis)
        } else {
            ((hi - origin) / d, (lo - origin) / d, axis)
        };
        if near > t_enter {
            t_enter = near;
            normal = face;
        }
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }
    Some((t_enter, normal))
}

/// Every body, obstacle and door state of a running simulation.
#[derive(Debug, Default)]
pub struct SimWorld {
    bodies: Vec<Body>,
    obstacles: Vec<Obstacle>,
    graph: BuildingGraph,
    open_doors: HashSet<DoorId>,
}

impl SimWorld {
    pub fn new(graph: BuildingGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    pub fn add_body(&mut self, body: Body) -> Result<()> {
        if self.body(body.id).is_some() {
            return Err(RuntimeError::DuplicateEntity(body.id));
        }
        self.bodies.push(body);
        Ok(())
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id == id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id == id)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Obstacles sharing `region` with a body.
    pub fn obstacles_in(&self, region: Option<RegionId>) -> impl Iterator<Item = &Obstacle> {
        self.obstacles
            .iter()
            .filter(move |obstacle| obstacle.region == region)
    }

    pub fn graph(&self) -> &BuildingGraph {
        &self.graph
    }

    /// Opens a door; returns false if it was already open.
    pub fn open_door(&mut self, door: DoorId) -> bool {
        self.open_doors.insert(door)
    }

    pub fn close_door(&mut self, door: DoorId) -> bool {
        self.open_doors.remove(&door)
    }
}

impl WorldView for SimWorld {
    fn character(&self, id: EntityId) -> Option<CharacterView> {
        self.body(id).map(Body::view)
    }

    fn characters(&self) -> Box<dyn Iterator<Item = CharacterView> + '_> {
        Box::new(self.bodies.iter().map(Body::view))
    }

    fn building_graph(&self) -> &BuildingGraph {
        &self.graph
    }

    fn is_door_open(&self, door: DoorId) -> bool {
        self.open_doors.contains(&door)
    }

    /// Traces against living bodies and obstacles in the caster's region.
    fn raycast(&self, from: Vec2, to: Vec2, exclude: EntityId) -> Option<RayHit> {
        let region = self.body(exclude).and_then(|body| body.region);
        let mut nearest: Option<(f32, RayHit)> = None;
        let mut consider = |t: f32, normal: Vec2, collider: Collider| {
            if nearest.as_ref().is_none_or(|(best, _)| t < *best) {
                let hit = RayHit {
                    position: from + (to - from) * t,
                    normal,
                    collider,
                };
                nearest = Some((t, hit));
            }
        };

        for body in &self.bodies {
            if body.id == exclude || !body.is_alive() || body.region != region {
                continue;
            }
            if let Some((t, normal)) = segment_circle(from, to, body.position, body.radius) {
                consider(t, normal, Collider::Character(body.id));
            }
        }
        for obstacle in self.obstacles_in(region) {
            if let Some((t, normal)) = obstacle.intersect(from, to) {
                consider(t, normal, Collider::Obstacle(obstacle.id));
            }
        }
        nearest.map(|(_, hit)| hit)
    }
}
