//! Concrete behaviors.

mod attack;
mod idle;
mod melee;
mod move_to_target;
mod ranged;

pub use attack::AttackTiming;
pub use idle::{Idle, IdleConfig};
pub use melee::{MeleeAttack, MeleeAttackConfig};
pub use move_to_target::{MoveToTarget, MoveToTargetConfig};
pub use ranged::{RangedAttack, RangedAttackConfig};
