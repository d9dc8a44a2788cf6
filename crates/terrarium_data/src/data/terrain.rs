use serde::{Deserialize, Serialize};

/// Terrain classification of a cell, ordered by the elevation band it covers.
///
/// The discriminants are stable (`0..=4`) so outer layers may store them as
/// small integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    /// Lowest band. Carries flow and dries out when isolated.
    Water = 0,
    /// Shoreline band.
    Sand = 1,
    /// Lowland plains, the easiest ground to cross.
    #[default]
    Grass = 2,
    /// Rocky highlands.
    Stone = 3,
    /// Peaks.
    Snow = 4,
}

/// Display colour of a cell. Owned by presentation layers; the core only
/// computes it during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend from `self` (t = 0) to `other` (t = 1), truncating each channel.
    #[must_use]
    pub fn blend(self, other: Rgb, t: f32) -> Rgb {
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Drift velocity of a water cell, in cells per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Flow {
    pub vx: f32,
    pub vy: f32,
}

impl Flow {
    pub const ZERO: Flow = Flow { vx: 0.0, vy: 0.0 };

    #[must_use]
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    #[must_use]
    pub fn scale(self, k: f32) -> Self {
        Self::new(self.vx * k, self.vy * k)
    }

    #[must_use]
    pub fn add(self, other: Flow) -> Self {
        Self::new(self.vx + other.vx, self.vy + other.vy)
    }

    #[must_use]
    pub fn magnitude(self) -> f32 {
        self.vx.hypot(self.vy)
    }
}
