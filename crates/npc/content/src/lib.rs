//! Data-driven NPC content and its loaders.
//!
//! This crate reads the design-time data the decision engine is configured
//! with:
//! - NPC profiles (action templates, hostile groups, per-profile brain config)
//! - Shared brain configuration (TOML)
//! - Building graphs for multi-floor routing (RON)
//!
//! All loaders deserialize `npc-core` types directly through its `serde`
//! feature and validate them before handing them out.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    BuildingLoader, ConfigLoader, ContentFactory, LoadResult, ProfileLoader, parse_groups,
};
