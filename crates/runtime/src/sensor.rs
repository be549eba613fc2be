//! Proximity sensor feeding each brain's perception.

use std::collections::HashSet;

use npc_core::{BodyKey, Perception, SensedBody};
use tracing::trace;

use crate::world::{Body, SimWorld};

/// Circular sensor centred on its owner.
///
/// Only bodies in the owner's region are sensed. Each scan is diffed
/// against the perception so it receives enter and exit events the way a
/// physics area would report them.
#[derive(Clone, Copy, Debug)]
pub struct ProximitySensor {
    radius: f32,
}

impl ProximitySensor {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bodies currently within range of `owner`.
    pub fn scan(&self, world: &SimWorld, owner: &Body) -> Vec<SensedBody> {
        let range_sq = self.radius * self.radius;
        let characters = world
            .bodies()
            .iter()
            .filter(|body| body.id != owner.id && body.region == owner.region)
            .filter(|body| {
                let reach = self.radius + body.radius;
                owner.position.distance_squared_to(body.position) <= reach * reach
            })
            .map(|body| SensedBody::Character(body.id));
        let obstacles = world
            .obstacles_in(owner.region)
            .filter(|obstacle| {
                owner
                    .position
                    .distance_squared_to(obstacle.closest_point(owner.position))
                    <= range_sq
            })
            .map(|obstacle| SensedBody::Obstacle {
                id: obstacle.id,
                position: obstacle.position,
                shape: obstacle.shape,
            });
        characters.chain(obstacles).collect()
    }

    /// Scans and forwards the differences to `perception`.
    pub fn update(&self, world: &SimWorld, owner: &Body, perception: &mut Perception) {
        let sensed = self.scan(world, owner);
        let keys: HashSet<BodyKey> = sensed.iter().map(SensedBody::key).collect();

        let departed: Vec<BodyKey> = perception
            .bodies()
            .iter()
            .map(SensedBody::key)
            .filter(|key| !keys.contains(key))
            .collect();
        for key in departed {
            trace!(npc = %owner.id, ?key, "body left sensor range");
            perception.body_exited(key);
        }
        for body in sensed {
            perception.body_entered(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Obstacle;
    use npc_core::{EntityId, Groups, ObstacleId, RegionId, Vec2};

    fn owner() -> Body {
        Body::new(EntityId(1), Vec2::ZERO, Groups::GANG)
    }

    #[test]
    fn only_nearby_bodies_in_the_same_region_are_sensed() {
        let mut world = SimWorld::default();
        world.add_body(owner()).unwrap();
        world
            .add_body(Body::new(EntityId(2), Vec2::new(80.0, 0.0), Groups::PLAYER))
            .unwrap();
        world
            .add_body(Body::new(EntityId(3), Vec2::new(500.0, 0.0), Groups::PLAYER))
            .unwrap();
        world
            .add_body(
                Body::new(EntityId(4), Vec2::new(10.0, 0.0), Groups::PLAYER)
                    .in_region(RegionId(0)),
            )
            .unwrap();
        // Long wall whose centre is out of range but whose face is not.
        world.add_obstacle(Obstacle::rect(
            ObstacleId(9),
            Vec2::new(0.0, 140.0),
            Vec2::new(300.0, 10.0),
        ));

        let sensed = ProximitySensor::new(150.0).scan(&world, &owner());
        assert_eq!(
            sensed,
            vec![
                SensedBody::Character(EntityId(2)),
                SensedBody::Obstacle {
                    id: ObstacleId(9),
                    position: Vec2::new(0.0, 140.0),
                    shape: npc_core::Shape::Rect {
                        half_extents: Vec2::new(300.0, 10.0)
                    },
                },
            ]
        );
    }

    #[test]
    fn update_reports_departures() {
        let mut world = SimWorld::default();
        world.add_body(owner()).unwrap();
        world
            .add_body(Body::new(EntityId(2), Vec2::new(80.0, 0.0), Groups::PLAYER))
            .unwrap();
        let sensor = ProximitySensor::new(150.0);
        let mut perception = Perception::new();

        sensor.update(&world, &owner(), &mut perception);
        assert_eq!(perception.characters().collect::<Vec<_>>(), vec![EntityId(2)]);

        world.body_mut(EntityId(2)).unwrap().position = Vec2::new(400.0, 0.0);
        sensor.update(&world, &owner(), &mut perception);
        assert!(perception.bodies().is_empty());
    }
}
