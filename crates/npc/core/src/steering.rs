//! Context-based local steering.
//!
//! The NPC looks around in a fixed number of direction buckets, laid out
//! evenly starting at its facing. Each physics tick:
//!
//! 1. **Interest**: every bucket gets `max(floor, dot(bucket, path_dir))`
//!    while a path is being followed, zero otherwise.
//! 2. **Danger**: each nearby body and each rectangle edge probe marks the
//!    buckets within an arc around its bearing. Closer samples widen the arc.
//! 3. **Resolution**: the bucket opposite each danger receives the escape
//!    interest, then every dangerous bucket has its interest zeroed. The
//!    interest-weighted sum of bucket directions is the candidate; if it
//!    falls into a dangerous bucket the single best bucket is used instead.
//!
//! Both fields are recomputed from scratch every tick.

use core::f32::consts::{PI, TAU};

use arrayvec::ArrayVec;
use tracing::trace;

use crate::config::{EscapeBias, SteeringConfig};
use crate::math::{Vec2, angle_distance, wrap_angle};
use crate::world::{CharacterView, EntityId, Perception, SensedBody, WorldView};

type Field = ArrayVec<f32, { SteeringConfig::MAX_DIRECTIONS }>;

/// A point the NPC should keep away from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DangerSample {
    pub point: Vec2,
    /// Extra range beyond the NPC radius at which the sample counts.
    pub range: f32,
}

impl DangerSample {
    pub fn new(point: Vec2, range: f32) -> Self {
        Self { point, range }
    }
}

/// Gathers danger samples from the bodies the NPC currently senses.
///
/// Characters (other than the NPC itself and the target it is closing in on)
/// and circular obstacles contribute their centre. Rectangles contribute
/// their four edge midpoints with the shorter probe range.
pub fn collect_danger_samples(
    owner: &CharacterView,
    target: Option<EntityId>,
    perception: &Perception,
    world: &dyn WorldView,
    config: &SteeringConfig,
) -> Vec<DangerSample> {
    let mut samples = Vec::with_capacity(perception.len() * 4);
    for body in perception.bodies() {
        match *body {
            SensedBody::Character(id) => {
                if id == owner.id || Some(id) == target {
                    continue;
                }
                if let Some(other) = world.character(id).filter(CharacterView::is_alive)
                    && other.region == owner.region
                {
                    samples.push(DangerSample::new(other.position, config.body_danger_range));
                }
            }
            SensedBody::Obstacle {
                position, shape, ..
            } => match shape.edge_midpoints(position) {
                Some(probes) => samples.extend(
                    probes
                        .into_iter()
                        .map(|point| DangerSample::new(point, config.probe_danger_range)),
                ),
                None => samples.push(DangerSample::new(position, config.body_danger_range)),
            },
        }
    }
    samples
}

/// Interest/danger fields of one NPC.
#[derive(Clone, Debug)]
pub struct ContextSteering {
    config: SteeringConfig,
    interest: Field,
    danger: Field,
    path_direction: Option<Vec2>,
    last_direction: Vec2,
}

impl ContextSteering {
    /// Creates empty fields sized to `config.directions`.
    ///
    /// The direction count is clamped into `2..=MAX_DIRECTIONS` and rounded
    /// down to an even number; `BrainConfig::validate` rejects such configs
    /// before they get here.
    pub fn new(config: SteeringConfig) -> Self {
        let mut directions = config.directions.clamp(2, SteeringConfig::MAX_DIRECTIONS);
        directions -= directions % 2;
        let mut config = config;
        config.directions = directions;

        let mut interest = Field::new();
        let mut danger = Field::new();
        for _ in 0..directions {
            interest.push(0.0);
            danger.push(0.0);
        }
        Self {
            config,
            interest,
            danger,
            path_direction: None,
            last_direction: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn directions(&self) -> usize {
        self.interest.len()
    }

    pub fn interest(&self) -> &[f32] {
        &self.interest
    }

    pub fn danger(&self) -> &[f32] {
        &self.danger
    }

    /// Direction chosen by the last resolution.
    pub fn last_direction(&self) -> Vec2 {
        self.last_direction
    }

    fn step(&self) -> f32 {
        TAU / self.directions() as f32
    }

    /// World-space unit vector of bucket `index` for an NPC facing `facing`.
    pub fn bucket_direction(&self, facing: f32, index: usize) -> Vec2 {
        Vec2::from_angle(facing + index as f32 * self.step())
    }

    /// Bucket containing a bearing measured relative to the facing.
    pub fn bucket_of(&self, relative_angle: f32) -> usize {
        let n = self.directions();
        let index = (wrap_angle(relative_angle) / self.step()).round() as usize;
        index % n
    }

    /// Index of the bucket opposite `index`.
    pub fn opposite(&self, index: usize) -> usize {
        (index + self.directions() / 2) % self.directions()
    }

    /// Zeroes both fields, as when steering is suppressed.
    pub fn clear(&mut self) {
        self.interest.iter_mut().for_each(|v| *v = 0.0);
        self.danger.iter_mut().for_each(|v| *v = 0.0);
        self.path_direction = None;
        self.last_direction = Vec2::ZERO;
    }

    /// Fills the interest field from the direction toward the next waypoint.
    pub fn compute_interest(&mut self, facing: f32, path_direction: Option<Vec2>) {
        let floor = self.config.interest_floor;
        let path_direction = path_direction
            .map(Vec2::normalized)
            .filter(|d| !d.is_zero());
        self.path_direction = path_direction;
        for i in 0..self.directions() {
            let value = match path_direction {
                Some(dir) => self.bucket_direction(facing, i).dot(dir).max(floor),
                None => 0.0,
            };
            self.interest[i] = value;
        }
    }

    /// Fills the danger field from samples around `position`.
    pub fn compute_danger(
        &mut self,
        position: Vec2,
        facing: f32,
        radius: f32,
        samples: &[DangerSample],
    ) {
        self.danger.iter_mut().for_each(|v| *v = 0.0);
        let half_step = PI / self.directions() as f32;

        for sample in samples {
            let offset = sample.point - position;
            let distance = offset.length();
            let reach = radius + sample.range;
            if distance > reach {
                continue;
            }
            let weight = (1.0 - distance / reach).max(f32::EPSILON);
            let distance_scale = (1.0 - distance / self.config.danger_falloff).max(0.0);
            let arc = (self.config.base_arc + self.config.arc_growth * distance_scale) * half_step;
            let bearing = wrap_angle(offset.angle() - facing);

            for i in 0..self.directions() {
                let bucket_angle = i as f32 * self.step();
                if angle_distance(bucket_angle, bearing) <= arc {
                    self.danger[i] = self.danger[i].max(weight);
                }
            }
        }
    }

    /// Resolves both fields into a unit movement direction (or zero).
    pub fn resolve(&mut self, facing: f32) -> Vec2 {
        let n = self.directions();
        let escape = self.config.escape_interest;

        for i in 0..n {
            if self.danger[i] > 0.0 {
                let opposite = self.opposite(i);
                self.interest[opposite] = match self.config.escape_bias {
                    EscapeBias::Overwrite => escape,
                    EscapeBias::Floor => self.interest[opposite].max(escape),
                };
            }
        }
        // A separate pass so an escape write never revives a dangerous bucket.
        for i in 0..n {
            if self.danger[i] > 0.0 {
                self.interest[i] = 0.0;
            }
        }

        let mut sum = Vec2::ZERO;
        let mut best: Option<usize> = None;
        for i in 0..n {
            let value = self.interest[i];
            sum += self.bucket_direction(facing, i) * value;
            if value > 0.0 && best.is_none_or(|b| value > self.interest[b]) {
                best = Some(i);
            }
        }

        let mut direction = sum;
        if !sum.is_zero() {
            let bucket = self.bucket_of(sum.angle() - facing);
            let backtracking = self.config.reject_backtrack
                && self.path_direction.is_some_and(|path| sum.dot(path) < 0.0);
            if self.danger[bucket] > 0.0 || backtracking {
                direction = match best {
                    Some(b) => self.bucket_direction(facing, b),
                    None => Vec2::ZERO,
                };
            }
        }
        let direction = direction.normalized();

        if self.config.trace_fields {
            trace!(
                interest = ?self.interest.as_slice(),
                danger = ?self.danger.as_slice(),
                ?direction,
                "steering fields"
            );
        }
        self.last_direction = direction;
        direction
    }

    /// Runs the interest, danger and resolution passes in order.
    pub fn steer(
        &mut self,
        position: Vec2,
        facing: f32,
        radius: f32,
        path_direction: Option<Vec2>,
        samples: &[DangerSample],
    ) -> Vec2 {
        self.compute_interest(facing, path_direction);
        self.compute_danger(position, facing, radius, samples);
        self.resolve(facing)
    }
}
