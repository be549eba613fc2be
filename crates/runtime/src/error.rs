//! Errors surfaced by the host simulation.
//!
//! Brains never return errors from their ticks; these cover setup and lookup
//! failures on the host side so callers can bubble them up with context.

use npc_core::{ConfigError, EntityId, GraphError, NpcError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("entity {0} is already in the world")]
    DuplicateEntity(EntityId),

    #[error("entity {0} is not in the world")]
    UnknownEntity(EntityId),

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("invalid runtime config: {0}")]
    InvalidConfig(String),

    #[error("brain for {npc} rejected its config")]
    Brain {
        npc: EntityId,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("failed to load scenario: {0}")]
    Scenario(String),

    #[error("failed to load content")]
    Content(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    /// Stable code for logs, borrowed from the engine error when wrapped.
    pub fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::DuplicateEntity(_) => "RUNTIME_DUPLICATE_ENTITY",
            RuntimeError::UnknownEntity(_) => "RUNTIME_UNKNOWN_ENTITY",
            RuntimeError::UnknownProfile(_) => "RUNTIME_UNKNOWN_PROFILE",
            RuntimeError::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
            RuntimeError::Brain { source, .. } => source.error_code(),
            RuntimeError::Graph(err) => err.error_code(),
            RuntimeError::Scenario(_) => "RUNTIME_SCENARIO",
            RuntimeError::Content(_) => "RUNTIME_CONTENT",
        }
    }
}
