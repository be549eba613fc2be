//! Host simulation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Tick rates and sensor settings shared by every NPC in a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logic ticks per second (`Brain::think`).
    pub logic_rate: f32,
    /// Physics ticks per second (`Brain::think_physics` and movement).
    pub physics_rate: f32,
    /// Radius of the proximity sensor feeding each brain's perception.
    pub sensor_radius: f32,
    /// Upper bound on ticks run by one `advance` call, per rate.
    ///
    /// Time beyond the bound is dropped so a stalled host does not spiral.
    pub max_catch_up_steps: u32,
    /// Distance from a door's standing point at which a body changes side.
    pub door_transition_radius: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            logic_rate: 10.0,
            physics_rate: 60.0,
            sensor_radius: 250.0,
            max_catch_up_steps: 8,
            door_transition_radius: 12.0,
        }
    }
}

impl RuntimeConfig {
    pub fn logic_step(&self) -> f32 {
        1.0 / self.logic_rate
    }

    pub fn physics_step(&self) -> f32 {
        1.0 / self.physics_rate
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("logic_rate", self.logic_rate),
            ("physics_rate", self.physics_rate),
            ("sensor_radius", self.sensor_radius),
            ("door_transition_radius", self.door_transition_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(RuntimeError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        if self.max_catch_up_steps == 0 {
            return Err(RuntimeError::InvalidConfig(
                "max_catch_up_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.logic_step() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let config = RuntimeConfig {
            physics_rate: 0.0,
            ..RuntimeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("physics_rate"));
    }
}
