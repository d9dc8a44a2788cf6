//! Plain data shared by the Terrarium simulation core and its outer layers.
//!
//! Nothing in this crate runs simulation logic; it only describes state so that
//! renderers and loggers can read it without depending on the core.

pub mod data;

pub use data::agent::{Agent, Identity, Lifecycle, Position, Target, Vitals};
pub use data::environment::WorldEvent;
pub use data::grid::{Grid, NEIGHBORS_4, NEIGHBORS_8};
pub use data::terrain::{Flow, Rgb, TerrainType};
