//! Planar vector math used by steering, targeting and aiming.
//!
//! Angles are radians, measured counter-clockwise from `+x`.

use core::f32::consts::{PI, TAU};
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1.0e-4;

/// 2D vector in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle`.
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { x: cos, y: sin }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared_to(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    pub fn distance_to(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < EPSILON {
            Self::ZERO
        } else {
            self / len
        }
    }

    pub fn is_zero(self) -> bool {
        self.length_squared() < EPSILON * EPSILON
    }

    /// Angle of this vector, in `(-π, π]`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Direction from `self` toward `other`, normalized.
    pub fn direction_to(self, other: Self) -> Self {
        (other - self).normalized()
    }

    pub fn lerp(self, to: Self, weight: f32) -> Self {
        self + (to - self) * weight
    }

    /// Moves toward `to` by at most `max_delta`.
    pub fn move_toward(self, to: Self, max_delta: f32) -> Self {
        let delta = to - self;
        let len = delta.length();
        if len <= max_delta || len < EPSILON {
            to
        } else {
            self + delta / len * max_delta
        }
    }

    /// Clamps the length of this vector to `max`.
    pub fn limit_length(self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq > max * max && len_sq > 0.0 {
            self * (max / len_sq.sqrt())
        } else {
            self
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Wraps an angle into `[0, τ)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Smallest absolute difference between two angles, in `[0, π]`.
pub fn angle_distance(a: f32, b: f32) -> f32 {
    let diff = wrap_angle(a - b);
    if diff > PI { TAU - diff } else { diff }
}

/// Rotates `from` toward `to` by at most `max_step`, taking the short way round.
pub fn rotate_toward(from: f32, to: f32, max_step: f32) -> f32 {
    let mut diff = wrap_angle(to - from);
    if diff > PI {
        diff -= TAU;
    }
    if diff.abs() <= max_step {
        to
    } else {
        from + max_step * diff.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-4
    }

    #[test]
    fn normalizing_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!(approx(n.length(), 1.0));
    }

    #[test]
    fn angle_distance_wraps_around() {
        assert!(approx(angle_distance(0.1, TAU - 0.1), 0.2));
        assert!(approx(angle_distance(PI, -PI), 0.0));
        assert!(approx(angle_distance(0.0, PI), PI));
    }

    #[test]
    fn rotate_toward_takes_short_way() {
        let result = rotate_toward(0.1, TAU - 0.1, 0.05);
        assert!(approx(result, 0.05));
        assert!(approx(rotate_toward(0.0, 0.3, 1.0), 0.3));
    }

    #[test]
    fn limit_length_clamps_only_longer_vectors() {
        let v = Vec2::new(30.0, 40.0).limit_length(10.0);
        assert!(approx(v.length(), 10.0));
        assert_eq!(Vec2::new(1.0, 0.0).limit_length(10.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn move_toward_stops_at_target() {
        let v = Vec2::ZERO.move_toward(Vec2::new(10.0, 0.0), 4.0);
        assert!(approx(v.x, 4.0));
        assert_eq!(Vec2::ZERO.move_toward(Vec2::new(1.0, 0.0), 4.0), Vec2::new(1.0, 0.0));
    }
}
