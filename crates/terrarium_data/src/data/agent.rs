use super::terrain::Rgb;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who an agent is. `group` and `color` are opaque tags owned by the
/// rendering and reporting layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub group: u32,
    pub color: Rgb,
}

/// Continuous world position; not quantised to cells.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The cell containing this position.
    #[must_use]
    pub fn cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Energy budget and life history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub energy: f64,
    pub max_energy: f64,
    /// Whole aging intervals survived.
    pub age: u32,
    pub collected: u32,
    /// Simulation time of birth, in seconds.
    pub born_at: f64,
    /// Simulation time of the last successful collection.
    pub last_ate: Option<f64>,
}

/// The resource cell an agent is committed to, and how long it has tried.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Target {
    pub cell: Option<(i32, i32)>,
    pub attempts: u32,
}

impl Target {
    pub fn clear(&mut self) {
        self.cell = None;
        self.attempts = 0;
    }
}

/// One-way liveness state.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Alive,
    /// Captured once, on the tick energy reached zero.
    Dead { time: f64, x: f64, y: f64 },
}

/// A foraging agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub identity: Identity,
    pub position: Position,
    pub vitals: Vitals,
    pub target: Target,
    pub lifecycle: Lifecycle,
    /// Terrain speed multiplier applied on the most recent move attempt.
    pub speed_multiplier: f64,
}

impl Agent {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Alive)
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.position.x, self.position.y)
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.vitals.energy
    }

    #[must_use]
    pub fn max_energy(&self) -> f64 {
        self.vitals.max_energy
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.vitals.age
    }

    #[must_use]
    pub fn group(&self) -> u32 {
        self.identity.group
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.identity.color
    }

    /// Death time and frozen position, if the agent has died.
    #[must_use]
    pub fn death(&self) -> Option<(f64, f64, f64)> {
        match self.lifecycle {
            Lifecycle::Dead { time, x, y } => Some((time, x, y)),
            Lifecycle::Alive => None,
        }
    }
}
