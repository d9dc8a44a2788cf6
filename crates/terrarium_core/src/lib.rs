//! # Terrarium Core
//!
//! The simulation engine for Terrarium, an artificial-life world where
//! energy-driven agents forage across procedurally generated terrain while a
//! simplified water model reshapes it.
//!
//! This crate contains the deterministic simulation logic:
//! - Heightmap generation (mountains, blur, slope limiting, terracing) and
//!   river carving
//! - Cellular hydrology (descent flow, diffusion, momentum, drying, erosion)
//! - A terrain-aware resource field
//! - Agent foraging, movement cost, and the age-indexed capacity curve
//! - A world driver that steps all of the above on fixed schedules
//!
//! Every stochastic step takes an explicit RNG, so a seeded world replays
//! identically.
//!
//! ## Example
//!
//! ```
//! use terrarium_core::config::AppConfig;
//! use terrarium_core::world::World;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! let mut world = World::new(config).expect("default config is valid");
//! for _ in 0..10 {
//!     world.step(0.016);
//! }
//! assert_eq!(world.tick, 10);
//! ```

/// Agent behaviour: foraging, movement, collection, aging
pub mod agent;
/// Configuration management for simulation parameters
pub mod config;
/// Water flow, drying, and erosion
pub mod hydrology;
/// Performance metrics collection and logging
pub mod metrics;
/// Harvestable resource field
pub mod resource;
/// Terrain grids, queries, generation, and rivers
pub mod terrain;
/// World state and the tick driver
pub mod world;

pub use config::AppConfig;
pub use hydrology::WaterState;
pub use metrics::{init_logging, Metrics};
pub use resource::ResourceField;
pub use terrain::{TerrainGrid, TerrainLogic};
pub use world::World;
