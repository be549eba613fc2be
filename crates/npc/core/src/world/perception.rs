//! Bodies reported by the host's proximity sensor.
//!
//! The sensor pushes enter/exit events (or a full refresh) into a brain's
//! [`Perception`]; steering reads it during the physics tick. Bodies are a
//! tagged union queried through capability methods rather than type tests.

use crate::math::Vec2;
use crate::world::{EntityId, ObstacleId};

/// Collision footprint of a static obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned rectangle centred on the obstacle position.
    Rect { half_extents: Vec2 },
}

impl Shape {
    /// Midpoints of the four rectangle edges around `center`.
    ///
    /// Probing the faces lets steering react to a long wall whose centre is
    /// far away. Circles have no edges and return `None`.
    pub fn edge_midpoints(&self, center: Vec2) -> Option<[Vec2; 4]> {
        match *self {
            Shape::Circle { .. } => None,
            Shape::Rect { half_extents: h } => Some([
                center + Vec2::new(h.x, 0.0),
                center + Vec2::new(0.0, h.y),
                center - Vec2::new(h.x, 0.0),
                center - Vec2::new(0.0, h.y),
            ]),
        }
    }
}

/// A sensed body near the NPC.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SensedBody {
    /// Another character; its live position comes from the world view.
    Character(EntityId),
    /// A static obstacle with a fixed footprint.
    Obstacle {
        id: ObstacleId,
        position: Vec2,
        shape: Shape,
    },
}

/// Identity of a sensed body, used to match enter/exit events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKey {
    Character(EntityId),
    Obstacle(ObstacleId),
}

impl SensedBody {
    pub fn key(&self) -> BodyKey {
        match *self {
            SensedBody::Character(id) => BodyKey::Character(id),
            SensedBody::Obstacle { id, .. } => BodyKey::Obstacle(id),
        }
    }

    pub fn is_character(&self) -> bool {
        matches!(self, SensedBody::Character(_))
    }

    pub fn character_id(&self) -> Option<EntityId> {
        match *self {
            SensedBody::Character(id) => Some(id),
            SensedBody::Obstacle { .. } => None,
        }
    }
}

/// Bodies currently within sensor range of one NPC.
#[derive(Clone, Debug, Default)]
pub struct Perception {
    bodies: Vec<SensedBody>,
}

impl Perception {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a body entering range; a body already tracked is updated in place.
    pub fn body_entered(&mut self, body: SensedBody) {
        let key = body.key();
        match self.bodies.iter_mut().find(|b| b.key() == key) {
            Some(existing) => *existing = body,
            None => self.bodies.push(body),
        }
    }

    /// Records a body leaving range. Unknown keys are ignored.
    pub fn body_exited(&mut self, key: BodyKey) {
        self.bodies.retain(|b| b.key() != key);
    }

    /// Replaces the whole list, as a sensor that polls every tick would.
    pub fn refresh(&mut self, bodies: impl IntoIterator<Item = SensedBody>) {
        self.bodies.clear();
        for body in bodies {
            self.body_entered(body);
        }
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn bodies(&self) -> &[SensedBody] {
        &self.bodies
    }

    pub fn characters(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.bodies.iter().filter_map(SensedBody::character_id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_twice_keeps_one_entry() {
        let mut perception = Perception::new();
        perception.body_entered(SensedBody::Character(EntityId(3)));
        perception.body_entered(SensedBody::Character(EntityId(3)));
        perception.body_entered(SensedBody::Obstacle {
            id: ObstacleId(1),
            position: Vec2::ZERO,
            shape: Shape::Circle { radius: 2.0 },
        });

        assert_eq!(perception.len(), 2);
        assert_eq!(perception.characters().collect::<Vec<_>>(), vec![EntityId(3)]);
    }

    #[test]
    fn exit_removes_only_matching_body() {
        let mut perception = Perception::new();
        perception.refresh([
            SensedBody::Character(EntityId(1)),
            SensedBody::Character(EntityId(2)),
        ]);
        perception.body_exited(BodyKey::Character(EntityId(1)));
        perception.body_exited(BodyKey::Obstacle(ObstacleId(7)));

        assert_eq!(perception.characters().collect::<Vec<_>>(), vec![EntityId(2)]);
    }
}
