//! Terrain-aware locomotion and its energy cost.

use crate::config::MovementConfig;
use crate::terrain::{TerrainGrid, TerrainLogic};
use rand::Rng;
use terrarium_data::{Agent, Position};

/// Energy to travel from `from` to `to`, priced by the terrain and slope at
/// the starting cell.
pub fn move_cost(terrain: &TerrainGrid, from: Position, to: Position, mv: &MovementConfig) -> f64 {
    let distance = (to.x - from.x).hypot(to.y - from.y);
    let (cx, cy) = from.cell();
    let multiplier = terrain
        .terrain_type_at(cx, cy)
        .map_or(mv.default_multiplier, |t| t.cost_multiplier(mv));
    let slope = terrain.slope_at(cx, cy) as f64;
    distance * multiplier * (mv.base_cost + mv.slope_factor * slope)
}

/// Cells per second at `position`, before scaling by the tick delta. The
/// terrain is sampled at the nearest cell centre.
pub fn speed_at(terrain: &TerrainGrid, position: Position, mv: &MovementConfig) -> (f64, f64) {
    let multiplier = terrain
        .terrain_type_at(position.x.round() as i32, position.y.round() as i32)
        .map_or(mv.default_multiplier, |t| t.speed_multiplier(mv));
    (mv.base_speed * multiplier, multiplier)
}

/// Attempt a step in direction `(dx, dy)`, each in `-1..=1`.
///
/// The step is rejected, leaving the agent untouched apart from its recorded
/// speed multiplier, when the destination is off-map, too far up or down,
/// unwalkable, or costs more energy than the agent has.
pub fn try_move(
    agent: &mut Agent,
    dx: i32,
    dy: i32,
    terrain: &TerrainGrid,
    mv: &MovementConfig,
    delta: f64,
) -> bool {
    let (speed, multiplier) = speed_at(terrain, agent.position, mv);
    agent.speed_multiplier = multiplier;

    let step = speed * delta;
    let from = agent.position;
    let to = Position::new(from.x + dx as f64 * step, from.y + dy as f64 * step);
    let (tx, ty) = to.cell();
    if !terrain.in_bounds(tx, ty) {
        return false;
    }

    let (fx, fy) = from.cell();
    let climb = (terrain.elevation_at(tx, ty) - terrain.elevation_at(fx, fy)).abs() as f64;
    if climb > mv.max_step_height || !terrain.is_walkable(tx, ty, mv) {
        return false;
    }

    let cost = move_cost(terrain, from, to, mv);
    if agent.vitals.energy < cost {
        return false;
    }
    agent.position = to;
    agent.vitals.energy -= cost;
    true
}

/// Uniform direction in `{-1, 0, 1}²`.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> (i32, i32) {
    (rng.gen_range(-1..=1), rng.gen_range(-1..=1))
}

/// Sign vector from `from` toward the cell `target`.
pub fn direction_toward(from: Position, target: (i32, i32)) -> (i32, i32) {
    let sign = |delta: f64| {
        if delta > 0.0 {
            1
        } else if delta < 0.0 {
            -1
        } else {
            0
        }
    };
    (sign(target.0 as f64 - from.x), sign(target.1 as f64 - from.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrarium_data::{Identity, Lifecycle, Rgb, Target, TerrainType, Vitals};
    use uuid::Uuid;

    fn agent_at(x: f64, y: f64, energy: f64) -> Agent {
        Agent {
            identity: Identity {
                id: Uuid::new_v4(),
                group: 0,
                color: Rgb(0, 0, 0),
            },
            position: Position::new(x, y),
            vitals: Vitals {
                energy,
                max_energy: 100.0,
                age: 0,
                collected: 0,
                born_at: 0.0,
                last_ate: None,
            },
            target: Target::default(),
            lifecycle: Lifecycle::Alive,
            speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_successful_move_costs_energy() {
        let terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Grass);
        let mv = MovementConfig::default();
        let mut agent = agent_at(5.0, 5.0, 100.0);
        assert!(try_move(&mut agent, 1, 0, &terrain, &mv, 0.1));
        // 4.0 * 1.2 * 0.1 cells at 0.3 * 0.2 energy per cell.
        assert!((agent.position.x - 5.48).abs() < 1e-9);
        assert!((agent.energy() - (100.0 - 0.48 * 0.3 * 0.2)).abs() < 1e-9);
        assert_eq!(agent.speed_multiplier, 1.2);
    }

    #[test]
    fn test_move_off_map_rejected() {
        let terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Grass);
        let mv = MovementConfig::default();
        let mut agent = agent_at(0.0, 0.0, 100.0);
        assert!(!try_move(&mut agent, -1, 0, &terrain, &mv, 0.1));
        assert_eq!(agent.position(), (0.0, 0.0));
        assert_eq!(agent.energy(), 100.0);
    }

    #[test]
    fn test_insufficient_energy_rejects_move() {
        let terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Grass);
        let mv = MovementConfig::default();
        let mut agent = agent_at(5.0, 5.0, 0.001);
        assert!(!try_move(&mut agent, 1, 1, &terrain, &mv, 0.1));
        assert_eq!(agent.position(), (5.0, 5.0));
    }

    #[test]
    fn test_unwalkable_destination_rejected() {
        let mut terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Grass);
        terrain.elevation.set(7, 5, 0.95);
        let mv = MovementConfig::default();
        // Cell (6,5) neighbours the spike, so its slope is too steep.
        let mut agent = agent_at(5.9, 5.0, 100.0);
        assert!(!try_move(&mut agent, 1, 0, &terrain, &mv, 0.1));
    }

    #[test]
    fn test_cost_scales_with_source_slope() {
        let mut terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Stone);
        let mv = MovementConfig::default();
        let from = Position::new(2.0, 2.0);
        let to = Position::new(3.0, 2.0);
        let flat = move_cost(&terrain, from, to, &mv);
        assert!((flat - 0.8 * 0.2).abs() < 1e-9);
        terrain.elevation.set(2, 1, 0.6);
        let steep = move_cost(&terrain, from, to, &mv);
        assert!(steep > flat);
    }

    #[test]
    fn test_unknown_terrain_cost_uses_default() {
        let terrain = TerrainGrid::flat(4, 4, 0.1, TerrainType::Water);
        let mv = MovementConfig::default();
        let cost = move_cost(&terrain, Position::new(1.0, 1.0), Position::new(2.0, 1.0), &mv);
        assert!((cost - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_direction_toward_signs() {
        assert_eq!(direction_toward(Position::new(5.0, 5.0), (7, 5)), (1, 0));
        assert_eq!(direction_toward(Position::new(5.5, 5.0), (2, 9)), (-1, 1));
        assert_eq!(direction_toward(Position::new(7.0, 5.0), (7, 5)), (0, 0));
    }
}
