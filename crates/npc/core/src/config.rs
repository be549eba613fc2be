//! Tunable parameters for brains and their steering.
//!
//! Every value is passed in explicitly at construction; nothing is read from
//! ambient global state.

use crate::error::{ErrorSeverity, NpcError};

/// How the escape boost is written into the bucket opposite a danger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EscapeBias {
    /// Assign the escape interest unconditionally, even if the bucket already
    /// held a higher waypoint-derived interest.
    #[default]
    Overwrite,
    /// Raise the bucket to at least the escape interest, keeping higher values.
    Floor,
}

/// Context-steering parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringConfig {
    /// Number of direction buckets. Must be even so every bucket has an opposite.
    pub directions: usize,
    /// Minimum interest kept by every bucket while following a path.
    pub interest_floor: f32,
    /// Interest assigned to the bucket opposite a danger.
    pub escape_interest: f32,
    pub escape_bias: EscapeBias,
    /// Extra range, beyond the NPC radius, at which a body centre is a danger.
    pub body_danger_range: f32,
    /// Extra range at which a rectangle edge-midpoint probe is a danger.
    pub probe_danger_range: f32,
    /// Distance at which a danger stops widening its arc.
    pub danger_falloff: f32,
    /// Arc half-width, in bucket half-steps, of a danger at the falloff distance.
    pub base_arc: f32,
    /// Additional half-steps added as a danger closes to zero distance.
    pub arc_growth: f32,
    /// Fall back to the best bucket when the blended vector points away from
    /// the path, as when escape boosts behind a single obstacle outweigh it.
    pub reject_backtrack: bool,
    /// Emit per-bucket fields at `trace` level after every resolution.
    pub trace_fields: bool,
}

impl SteeringConfig {
    pub const MAX_DIRECTIONS: usize = 32;
    pub const DEFAULT_DIRECTIONS: usize = 16;

    pub fn new() -> Self {
        Self {
            directions: Self::DEFAULT_DIRECTIONS,
            interest_floor: 0.1,
            escape_interest: 0.5,
            escape_bias: EscapeBias::Overwrite,
            body_danger_range: 100.0,
            probe_danger_range: 10.0,
            danger_falloff: 128.0,
            base_arc: 1.5,
            arc_growth: 3.0,
            reject_backtrack: true,
            trace_fields: false,
        }
    }

    pub fn with_directions(mut self, directions: usize) -> Self {
        self.directions = directions;
        self
    }

    pub fn with_escape_bias(mut self, escape_bias: EscapeBias) -> Self {
        self.escape_bias = escape_bias;
        self
    }

    pub fn with_backtrack_rejection(mut self, reject_backtrack: bool) -> Self {
        self.reject_backtrack = reject_backtrack;
        self
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-NPC brain configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrainConfig {
    pub steering: SteeringConfig,
    /// Maximum travel speed, in units per second.
    pub top_speed: f32,
    /// Velocity change per second while steering.
    pub acceleration: f32,
    /// Maximum turn rate toward the look target, in radians per second.
    pub turn_speed: f32,
    /// A tracked target further than this is dropped for the closest hostile.
    pub aggro_reset_range: f32,
    /// Distance at which a path waypoint counts as reached.
    pub waypoint_reach: f32,
    /// Seconds between navigation replans while a goal is set.
    pub replan_interval: f32,
    /// Fraction of knockback velocity removed per second while stunned.
    pub knockback_decay: f32,
    /// Distance within which stairs and doors can be used.
    pub interaction_distance: f32,
    /// Whether closed doors may be opened while routing.
    pub can_open_doors: bool,
}

impl BrainConfig {
    pub const DEFAULT_TOP_SPEED: f32 = 120.0;
    pub const DEFAULT_AGGRO_RESET_RANGE: f32 = 600.0;

    pub fn new() -> Self {
        Self {
            steering: SteeringConfig::new(),
            top_speed: Self::DEFAULT_TOP_SPEED,
            acceleration: 600.0,
            turn_speed: 6.0,
            aggro_reset_range: Self::DEFAULT_AGGRO_RESET_RANGE,
            waypoint_reach: 8.0,
            replan_interval: 0.5,
            knockback_decay: 4.0,
            interaction_distance: 24.0,
            can_open_doors: true,
        }
    }

    pub fn with_top_speed(mut self, top_speed: f32) -> Self {
        self.top_speed = top_speed;
        self
    }

    pub fn with_aggro_reset_range(mut self, range: f32) -> Self {
        self.aggro_reset_range = range;
        self
    }

    pub fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    pub fn with_door_opening(mut self, can_open_doors: bool) -> Self {
        self.can_open_doors = can_open_doors;
        self
    }

    /// Checks the invariants the steering and movement code relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let directions = self.steering.directions;
        if !(4..=SteeringConfig::MAX_DIRECTIONS).contains(&directions) {
            return Err(ConfigError::DirectionCount(directions));
        }
        if directions % 2 != 0 {
            return Err(ConfigError::OddDirectionCount(directions));
        }
        let positive = [
            ("top_speed", self.top_speed),
            ("acceleration", self.acceleration),
            ("turn_speed", self.turn_speed),
            ("aggro_reset_range", self.aggro_reset_range),
            ("waypoint_reach", self.waypoint_reach),
            ("interaction_distance", self.interaction_distance),
            ("danger_falloff", self.steering.danger_falloff),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("direction count {0} outside 4..={max}", max = SteeringConfig::MAX_DIRECTIONS)]
    DirectionCount(usize),

    #[error("direction count {0} must be even")]
    OddDirectionCount(usize),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
}

impl NpcError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Misconfiguration
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::DirectionCount(_) => "CONFIG_DIRECTION_COUNT",
            ConfigError::OddDirectionCount(_) => "CONFIG_ODD_DIRECTION_COUNT",
            ConfigError::NonPositive { .. } => "CONFIG_NON_POSITIVE",
        }
    }
}
