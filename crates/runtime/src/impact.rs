//! Resolution of attack hits emitted by brains.

use npc_core::Impact;
use tracing::{debug, info};

use crate::world::SimWorld;

/// What a resolved hit did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImpactOutcome {
    /// Attacker or victim was dead or gone; nothing was applied.
    Dropped,
    Damaged { remaining: f32 },
    Killed,
}

impl ImpactOutcome {
    pub fn landed(&self) -> bool {
        !matches!(self, ImpactOutcome::Dropped)
    }
}

/// Applies damage from [`Impact`]s after re-checking liveness.
///
/// Hits are deferred: the victim may have died, or the attacker may have
/// been killed by an earlier hit in the same batch. Either case drops the
/// hit silently. Knockback is left to the caller, which owns the brains.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImpactResolver;

impl ImpactResolver {
    pub fn resolve(&self, world: &mut SimWorld, impact: &Impact) -> ImpactOutcome {
        let attacker_alive = world
            .body(impact.attacker)
            .is_some_and(|body| body.is_alive());
        if !attacker_alive {
            debug!(attacker = %impact.attacker, "hit dropped, attacker dead or gone");
            return ImpactOutcome::Dropped;
        }
        let Some(victim) = world
            .body_mut(impact.target)
            .filter(|body| body.is_alive())
        else {
            debug!(victim = %impact.target, "hit dropped, victim dead or gone");
            return ImpactOutcome::Dropped;
        };

        victim.health = (victim.health - impact.damage).max(0.0);
        if victim.is_alive() {
            debug!(
                attacker = %impact.attacker,
                victim = %impact.target,
                damage = impact.damage,
                remaining = victim.health,
                "hit landed"
            );
            ImpactOutcome::Damaged {
                remaining: victim.health,
            }
        } else {
            victim.velocity = npc_core::Vec2::ZERO;
            info!(attacker = %impact.attacker, victim = %impact.target, "character killed");
            ImpactOutcome::Killed
        }
    }
}
