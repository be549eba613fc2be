//! Common error infrastructure for npc-core.
//!
//! Domain-specific errors (`ConfigError`, `GraphError`, `RouteError`) live next
//! to the modules that produce them. None of them ever escapes a brain tick:
//! the tick entry points log and degrade instead of returning errors, so these
//! types surface only from construction, validation and routing queries.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition that resolves on a later tick.
    ///
    /// Examples: target out of range, no route this tick
    Recoverable,

    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: unknown region id, dangling stairs link
    Validation,

    /// Design-time data is broken; the affected behavior degrades to a no-op.
    ///
    /// Examples: zero direction buckets, empty action catalog
    Misconfiguration,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Misconfiguration => "misconfiguration",
        }
    }

    /// Returns true if this error is expected to clear up on its own.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all npc-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait NpcError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
