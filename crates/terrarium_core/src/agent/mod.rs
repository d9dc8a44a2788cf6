//! Agent behaviour: metabolism, foraging, collection, drift and aging.
//!
//! Agent state lives in [`terrarium_data::Agent`]; everything here reads the
//! terrain by value through [`TerrainGrid`] queries and never keeps a grid
//! reference past a call.

pub mod capacity;
pub mod movement;
pub mod vision;

use crate::config::{AppConfig, LifecycleConfig};
use crate::hydrology::WaterState;
use crate::resource::{ResourceField, FULL};
use crate::terrain::TerrainGrid;
use rand::Rng;
use terrarium_data::{Agent, Identity, Lifecycle, Position, Target, TerrainType, Vitals};

/// A successful harvest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collection {
    pub cell: (i32, i32),
    pub amount: f32,
    pub energy_gained: f64,
}

/// What happened to one agent during one update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentOutcome {
    pub moved: bool,
    pub collection: Option<Collection>,
    /// Set only on the update in which the agent died.
    pub died: bool,
}

/// A newly born agent at `position`. Capacity is drawn for age zero.
pub fn spawn<R: Rng + ?Sized>(
    identity: Identity,
    position: Position,
    lc: &LifecycleConfig,
    time: f64,
    rng: &mut R,
) -> Agent {
    Agent {
        identity,
        position,
        vitals: Vitals {
            energy: lc.initial_energy,
            max_energy: capacity::max_energy(0, lc, rng),
            age: 0,
            collected: 0,
            born_at: time,
            last_ate: None,
        },
        target: Target::default(),
        lifecycle: Lifecycle::Alive,
        speed_multiplier: 1.0,
    }
}

/// Record death if energy is exhausted. Returns `true` only on the
/// transition; an already dead agent is left as it was.
pub fn settle_liveness(agent: &mut Agent, time: f64) -> bool {
    if !agent.is_alive() || agent.vitals.energy > 0.0 {
        return false;
    }
    agent.vitals.energy = 0.0;
    agent.lifecycle = Lifecycle::Dead {
        time,
        x: agent.position.x,
        y: agent.position.y,
    };
    agent.target.clear();
    true
}

/// Advance one agent by `delta` simulated seconds. Dead agents are not
/// touched.
#[allow(clippy::too_many_arguments)]
pub fn update<R: Rng + ?Sized>(
    agent: &mut Agent,
    terrain: &TerrainGrid,
    resources: &mut ResourceField,
    water: Option<&WaterState>,
    delta: f64,
    time: f64,
    config: &AppConfig,
    rng: &mut R,
) -> AgentOutcome {
    let mut outcome = AgentOutcome::default();
    if !agent.is_alive() {
        return outcome;
    }
    if settle_liveness(agent, time) {
        outcome.died = true;
        return outcome;
    }

    let decay = config.lifecycle.energy_decay_rate * delta;
    agent.vitals.energy = (agent.vitals.energy - decay).max(0.0);
    if settle_liveness(agent, time) {
        outcome.died = true;
        return outcome;
    }

    forage(agent, terrain, resources, delta, time, config, rng, &mut outcome);

    if let Some(water) = water {
        drift(agent, terrain, water, delta);
    }

    outcome.died = settle_liveness(agent, time);
    outcome
}

#[allow(clippy::too_many_arguments)]
fn forage<R: Rng + ?Sized>(
    agent: &mut Agent,
    terrain: &TerrainGrid,
    resources: &mut ResourceField,
    delta: f64,
    time: f64,
    config: &AppConfig,
    rng: &mut R,
    outcome: &mut AgentOutcome,
) {
    let mv = &config.movement;
    let Some(target) =
        vision::find_nearest_resource(agent.position, terrain, resources, mv.vision_range)
    else {
        let (dx, dy) = movement::random_direction(rng);
        outcome.moved = movement::try_move(agent, dx, dy, terrain, mv, delta);
        return;
    };

    if agent.target.cell == Some(target) {
        agent.target.attempts += 1;
        if agent.target.attempts > mv.max_attempts {
            tracing::trace!(id = %agent.identity.id, ?target, "Target abandoned");
            agent.target.clear();
            return;
        }
    } else {
        agent.target.cell = Some(target);
        agent.target.attempts = 0;
    }

    let (dx, dy) = movement::direction_toward(agent.position, target);
    outcome.moved = movement::try_move(agent, dx, dy, terrain, mv, delta);
    if !outcome.moved {
        let (dx, dy) = movement::random_direction(rng);
        outcome.moved = movement::try_move(agent, dx, dy, terrain, mv, delta);
    }

    let (tx, ty) = target;
    if (agent.position.x - tx as f64).abs() <= 1.0 && (agent.position.y - ty as f64).abs() <= 1.0 {
        outcome.collection = collect(agent, resources, target, &config.lifecycle, time);
        agent.target.clear();
    }
}

/// Harvest `cell` completely. Younger agents convert more of it into energy.
/// Energy never exceeds the larger of capacity and what the agent already had.
pub fn collect(
    agent: &mut Agent,
    resources: &mut ResourceField,
    cell: (i32, i32),
    lc: &LifecycleConfig,
    time: f64,
) -> Option<Collection> {
    let amount = resources.amount_at(cell.0, cell.1);
    if amount <= 0.0 {
        return None;
    }
    resources.deplete(cell.0, cell.1, FULL);

    let age_factor = (1.0 - agent.vitals.age as f64 / lc.max_age.max(1) as f64).max(lc.min_age_factor);
    let gain = amount as f64 * lc.collection_energy * age_factor;
    let before = agent.vitals.energy;
    let ceiling = agent.vitals.max_energy.max(before);
    agent.vitals.energy = (before + gain).min(ceiling);
    agent.vitals.collected += 1;
    agent.vitals.last_ate = Some(time);

    Some(Collection {
        cell,
        amount,
        energy_gained: agent.vitals.energy - before,
    })
}

/// Passive drift along the water current under the agent. The result is
/// kept on the map.
pub fn drift(agent: &mut Agent, terrain: &TerrainGrid, water: &WaterState, delta: f64) {
    let (cx, cy) = agent.position.cell();
    if terrain.terrain_type_at(cx, cy) != Some(TerrainType::Water) {
        return;
    }
    let flow = water.flow_at(cx, cy);
    let max_x = (terrain.width() as f64 - 1.0).max(0.0);
    let max_y = (terrain.height() as f64 - 1.0).max(0.0);
    agent.position.x = (agent.position.x + flow.vx as f64 * delta).clamp(0.0, max_x);
    agent.position.y = (agent.position.y + flow.vy as f64 * delta).clamp(0.0, max_y);
}

/// One aging interval: age, redraw capacity, and clamp energy down to it.
pub fn grow_older<R: Rng + ?Sized>(agent: &mut Agent, lc: &LifecycleConfig, rng: &mut R) {
    if !agent.is_alive() {
        return;
    }
    agent.vitals.age += 1;
    agent.vitals.max_energy = capacity::max_energy(agent.vitals.age, lc, rng);
    if agent.vitals.energy > agent.vitals.max_energy {
        agent.vitals.energy = agent.vitals.max_energy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use terrarium_data::{Flow, Rgb};
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            group: 1,
            color: Rgb(10, 20, 30),
        }
    }

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.lifecycle.capacity_noise = 0.0;
        config
    }

    #[test]
    fn test_spawn_starts_full_and_young() {
        let config = quiet_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let agent = spawn(identity(), Position::new(1.0, 2.0), &config.lifecycle, 3.0, &mut rng);
        assert!(agent.is_alive());
        assert_eq!(agent.energy(), 100.0);
        assert_eq!(agent.age(), 0);
        assert_eq!(agent.max_energy(), 10.0);
        assert_eq!(agent.vitals.born_at, 3.0);
    }

    #[test]
    fn test_collection_never_exceeds_ceiling() {
        let config = quiet_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut agent = spawn(identity(), Position::new(1.0, 1.0), &config.lifecycle, 0.0, &mut rng);
        agent.vitals.energy = 50.0;
        agent.vitals.max_energy = 80.0;
        let mut field = ResourceField::empty(4, 4);
        field.place(1, 1, 1.0);

        let got = collect(&mut agent, &mut field, (1, 1), &config.lifecycle, 2.0).expect("harvest");
        assert_eq!(agent.energy(), 80.0);
        assert_eq!(got.energy_gained, 30.0);
        assert_eq!(field.amount_at(1, 1), 0.0);
        assert_eq!(agent.vitals.collected, 1);
        assert_eq!(agent.vitals.last_ate, Some(2.0));

        // A second collector finds nothing.
        assert!(collect(&mut agent, &mut field, (1, 1), &config.lifecycle, 2.0).is_none());
    }

    #[test]
    fn test_collection_scales_with_age() {
        let config = quiet_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut agent = spawn(identity(), Position::new(1.0, 1.0), &config.lifecycle, 0.0, &mut rng);
        agent.vitals.energy = 0.5;
        agent.vitals.max_energy = 1000.0;
        agent.vitals.age = 90;
        let mut field = ResourceField::empty(4, 4);
        field.place(2, 2, 1.0);
        let got = collect(&mut agent, &mut field, (2, 2), &config.lifecycle, 0.0).expect("harvest");
        assert!((got.energy_gained - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_energy_kills_once() {
        let config = quiet_config();
        let terrain = TerrainGrid::flat(5, 5, 0.4, TerrainType::Grass);
        let mut field = ResourceField::empty(5, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut agent = spawn(identity(), Position::new(2.0, 2.0), &config.lifecycle, 0.0, &mut rng);
        agent.vitals.energy = 0.0;

        let first = update(&mut agent, &terrain, &mut field, None, 0.1, 7.0, &config, &mut rng);
        assert!(first.died);
        assert_eq!(agent.death(), Some((7.0, 2.0, 2.0)));

        let second = update(&mut agent, &terrain, &mut field, None, 0.1, 9.0, &config, &mut rng);
        assert!(!second.died);
        assert_eq!(agent.death(), Some((7.0, 2.0, 2.0)));
        assert!(!agent.is_alive());
    }

    #[test]
    fn test_metabolism_can_kill() {
        let mut config = quiet_config();
        config.lifecycle.energy_decay_rate = 10.0;
        let terrain = TerrainGrid::flat(5, 5, 0.4, TerrainType::Grass);
        let mut field = ResourceField::empty(5, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut agent = spawn(identity(), Position::new(2.0, 2.0), &config.lifecycle, 0.0, &mut rng);
        agent.vitals.energy = 0.5;
        let outcome = update(&mut agent, &terrain, &mut field, None, 0.1, 1.0, &config, &mut rng);
        assert!(outcome.died);
        assert_eq!(agent.energy(), 0.0);
    }

    #[test]
    fn test_abandons_target_after_max_attempts() {
        let mut config = quiet_config();
        config.movement.max_attempts = 2;
        let terrain = TerrainGrid::flat(10, 10, 0.4, TerrainType::Grass);
        let mut field = ResourceField::empty(10, 10);
        field.place(9, 9, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut agent = spawn(identity(), Position::new(0.0, 0.0), &config.lifecycle, 0.0, &mut rng);

        // Too little energy to move anywhere, so the target stays out of reach.
        agent.vitals.energy = 1e-6;
        for _ in 0..3 {
            update(&mut agent, &terrain, &mut field, None, 0.1, 0.0, &config, &mut rng);
        }
        assert_eq!(agent.target.attempts, 2);
        update(&mut agent, &terrain, &mut field, None, 0.1, 0.0, &config, &mut rng);
        assert_eq!(agent.target, Target::default());
    }

    #[test]
    fn test_drift_only_on_water() {
        let mut terrain = TerrainGrid::flat(5, 5, 0.1, TerrainType::Water);
        let mut water = WaterState::new(5, 5);
        water.flow.set(2, 2, Flow::new(1.0, -2.0));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let lc = LifecycleConfig::default();
        let mut agent = spawn(identity(), Position::new(2.5, 2.5), &lc, 0.0, &mut rng);

        drift(&mut agent, &terrain, &water, 0.5);
        assert_eq!(agent.position(), (3.0, 1.5));

        terrain.types.fill(TerrainType::Sand);
        agent.position = Position::new(2.5, 2.5);
        drift(&mut agent, &terrain, &water, 0.5);
        assert_eq!(agent.position(), (2.5, 2.5));
    }

    #[test]
    fn test_grow_older_clamps_energy() {
        let config = quiet_config();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut agent = spawn(identity(), Position::new(0.0, 0.0), &config.lifecycle, 0.0, &mut rng);
        grow_older(&mut agent, &config.lifecycle, &mut rng);
        assert_eq!(agent.age(), 1);
        assert!(agent.energy() <= agent.max_energy());
        assert!(agent.max_energy() > 10.0);
    }
}
