//! Hostile target acquisition with range hysteresis.
//!
//! A tracked target is kept while it is alive and closer than the aggro reset
//! range; only then is the world rescanned for the closest eligible hostile.
//! Every comparison uses squared distances.

use tracing::debug;

use crate::world::{CharacterView, EntityId, Groups, WorldView};

#[derive(Clone, Debug)]
pub struct TargetAcquisition {
    hostile: Groups,
    aggro_reset_range: f32,
    current: Option<EntityId>,
}

impl TargetAcquisition {
    pub fn new(hostile: Groups, aggro_reset_range: f32) -> Self {
        Self {
            hostile,
            aggro_reset_range,
            current: None,
        }
    }

    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    pub fn hostile_groups(&self) -> Groups {
        self.hostile
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Returns true if `candidate` is a valid target for `owner`.
    pub fn is_eligible(&self, owner: &CharacterView, candidate: &CharacterView) -> bool {
        candidate.id != owner.id
            && candidate.is_alive()
            && candidate.groups.is_member_of_any(self.hostile)
    }

    /// Re-evaluates the target for this tick.
    pub fn refresh(&mut self, owner: &CharacterView, world: &dyn WorldView) -> Option<CharacterView> {
        let range_sq = self.aggro_reset_range * self.aggro_reset_range;

        if let Some(tracked) = self.current.and_then(|id| world.character(id))
            && tracked.is_alive()
            && owner.position.distance_squared_to(tracked.position) < range_sq
        {
            return Some(tracked);
        }

        let mut best: Option<(CharacterView, f32)> = None;
        for candidate in world.characters() {
            if !self.is_eligible(owner, &candidate) {
                continue;
            }
            let distance_sq = owner.position.distance_squared_to(candidate.position);
            // Strictly closer wins; ties keep the first found.
            if best.is_none_or(|(_, best_sq)| distance_sq < best_sq) {
                best = Some((candidate, distance_sq));
            }
        }

        let next = best.map(|(candidate, _)| candidate);
        let next_id = next.map(|c| c.id);
        if next_id != self.current {
            debug!(npc = %owner.id, previous = ?self.current, next = ?next_id, "target changed");
        }
        self.current = next_id;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::testing::{TestWorld, character};

    fn acquisition() -> TargetAcquisition {
        TargetAcquisition::new(Groups::PLAYER, 300.0)
    }

    #[test]
    fn picks_closest_hostile_and_ignores_friends() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(200.0, 0.0)));
        world.add(character(3, Vec2::new(100.0, 0.0)));
        let mut friend = character(4, Vec2::new(10.0, 0.0));
        friend.groups = Groups::GANG;
        world.add(friend);

        let owner = world.owner();
        let target = acquisition().refresh(&owner, &world);
        assert_eq!(target.map(|t| t.id), Some(EntityId(3)));
    }

    #[test]
    fn ties_keep_first_found() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(0.0, 100.0)));
        world.add(character(3, Vec2::new(100.0, 0.0)));

        let owner = world.owner();
        let target = acquisition().refresh(&owner, &world);
        assert_eq!(target.map(|t| t.id), Some(EntityId(2)));
    }

    #[test]
    fn tracked_target_is_retained_inside_reset_range() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(100.0, 0.0)));
        let mut targeting = acquisition();
        let owner = world.owner();
        targeting.refresh(&owner, &world);

        // A closer hostile appears, but the tracked one is still in range.
        world.add(character(3, Vec2::new(20.0, 0.0)));
        world.move_character(EntityId(2), Vec2::new(250.0, 0.0));
        let target = targeting.refresh(&owner, &world);
        assert_eq!(target.map(|t| t.id), Some(EntityId(2)));
    }

    #[test]
    fn target_out_of_range_or_dead_is_replaced() {
        let mut world = TestWorld::new();
        world.add(character(2, Vec2::new(100.0, 0.0)));
        world.add(character(3, Vec2::new(150.0, 0.0)));
        let mut targeting = acquisition();
        let owner = world.owner();
        assert_eq!(targeting.refresh(&owner, &world).map(|t| t.id), Some(EntityId(2)));

        // Exactly at the reset range is already out.
        world.move_character(EntityId(2), Vec2::new(300.0, 0.0));
        assert_eq!(targeting.refresh(&owner, &world).map(|t| t.id), Some(EntityId(3)));

        world.kill(EntityId(3));
        assert_eq!(targeting.refresh(&owner, &world).map(|t| t.id), Some(EntityId(2)));

        world.kill(EntityId(2));
        assert_eq!(targeting.refresh(&owner, &world), None);
        assert_eq!(targeting.current(), None);
    }
}
