//! Movement primitive used to integrate bodies each physics tick.
//!
//! Brains only produce a desired velocity. The primitive turns it into a new
//! position, resolving overlap with obstacles in the mover's region.

use npc_core::math::EPSILON;
use npc_core::{ObstacleId, Vec2};

use crate::world::{Body, SimWorld};

/// Contact reported by a move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub position: Vec2,
    /// Surface normal pointing away from the obstacle.
    pub normal: Vec2,
    pub obstacle: ObstacleId,
}

/// Result of moving one body for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub position: Vec2,
    /// Velocity left after sliding along any contact.
    pub velocity: Vec2,
    pub collision: Option<Collision>,
}

/// Moves a body through the world.
pub trait MovementPrimitive {
    fn move_and_collide(&self, world: &SimWorld, body: &Body, delta: f32) -> MoveOutcome;
}

/// Moves in a straight line, then pushes out of obstacles and slides along
/// their surface.
#[derive(Clone, Copy, Debug)]
pub struct SlideMovement {
    /// Push-out passes per move; overlapping obstacles may need several.
    pub iterations: u32,
}

impl Default for SlideMovement {
    fn default() -> Self {
        Self { iterations: 3 }
    }
}

impl MovementPrimitive for SlideMovement {
    fn move_and_collide(&self, world: &SimWorld, body: &Body, delta: f32) -> MoveOutcome {
        let mut position = body.position + body.velocity * delta;
        let mut velocity = body.velocity;
        let mut collision = None;

        for _ in 0..self.iterations {
            let mut pushed = false;
            for obstacle in world.obstacles_in(body.region) {
                let contact = obstacle.closest_point(position);
                let offset = position - contact;
                let distance_sq = offset.length_squared();
                if distance_sq >= body.radius * body.radius {
                    continue;
                }

                // Centre inside the footprint: push back along the travel path.
                let normal = if distance_sq > EPSILON {
                    offset.normalized()
                } else if !velocity.is_zero() {
                    -velocity.normalized()
                } else {
                    (position - obstacle.position).normalized()
                };
                position = contact + normal * body.radius;

                let into = velocity.dot(normal);
                if into < 0.0 {
                    velocity -= normal * into;
                }
                collision = Some(Collision {
                    position: contact,
                    normal,
                    obstacle: obstacle.id,
                });
                pushed = true;
            }
            if !pushed {
                break;
            }
        }

        MoveOutcome {
            position,
            velocity,
            collision,
        }
    }
}
