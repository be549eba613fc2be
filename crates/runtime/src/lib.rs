//! Host simulation for the NPC decision engine.
//!
//! This crate plays the role of the game engine around `npc-core`: it owns
//! character bodies and obstacles, senses the surroundings of every NPC,
//! drives each [`npc_core::Brain`] from fixed-rate accumulators and resolves
//! the commands the brains emit.
//!
//! Modules are organized by responsibility:
//! - [`simulation`] hosts the tick loop, command resolution and builder
//! - [`world`] implements [`npc_core::WorldView`] over bodies and obstacles
//! - [`movement`] and [`sensor`] are the physics-side services
//! - [`impact`] applies attack hits
//! - [`scenario`] builds simulations from RON scenario files
pub mod config;
pub mod error;
pub mod impact;
pub mod logging;
pub mod movement;
pub mod scenario;
pub mod sensor;
pub mod simulation;
pub mod world;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use impact::{ImpactOutcome, ImpactResolver};
pub use logging::init_tracing;
pub use movement::{Collision, MoveOutcome, MovementPrimitive, SlideMovement};
pub use scenario::{Placement, PlacementKind, Scenario};
pub use sensor::ProximitySensor;
pub use simulation::{SimEvent, Simulation, SimulationBuilder, StepReport, velocity_toward};
pub use world::{Body, Obstacle, SimWorld};
