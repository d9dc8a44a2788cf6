use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tagged union of the notable things that happened during a world step.
///
/// Serialised with `#[serde(tag = "event")]` so an outer logger can stream
/// them as JSON lines.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum WorldEvent {
    /// An agent harvested a resource cell.
    ResourceCollected {
        id: Uuid,
        x: i32,
        y: i32,
        amount: f32,
        energy_gained: f64,
        time: f64,
    },
    /// An agent's energy reached zero.
    AgentDied {
        id: Uuid,
        age: u32,
        time: f64,
        x: f64,
        y: f64,
    },
    /// An isolated water cell dried into grass.
    CellDried { x: i32, y: i32, time: f64 },
    /// The resource field was replaced wholesale.
    ResourcesRespawned { placed: usize, time: f64 },
    /// Every living agent aged one interval.
    AgentsAged { count: usize, time: f64 },
}
