pub use terrarium_core::TerrainLogic;
pub mod agent {
    pub use terrarium_core::agent::*;
}
pub mod config {
    pub use terrarium_core::config::*;
}
pub mod hydrology {
    pub use terrarium_core::hydrology::*;
}
pub mod metrics {
    pub use terrarium_core::metrics::*;
}
pub mod resource {
    pub use terrarium_core::resource::*;
}
pub mod terrain {
    pub use terrarium_core::terrain::*;
}
pub mod world {
    pub use terrarium_core::world::*;
}

pub mod state {
    pub use terrarium_data::*;
}
