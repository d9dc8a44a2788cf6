//! The world: owned grids, the agent collection, and the tick driver.

use crate::agent::{self, AgentOutcome};
use crate::config::AppConfig;
use crate::hydrology::WaterState;
use crate::metrics::{Metrics, TickStats};
use crate::resource::ResourceField;
use crate::terrain::TerrainGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use terrarium_data::{Agent, Flow, Identity, Position, Rgb, TerrainType, WorldEvent};
use uuid::Uuid;

/// Simulation time of the last run of each periodic phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Timers {
    water: f64,
    respawn: f64,
    aging: f64,
    regen: f64,
}

pub struct World {
    pub config: AppConfig,
    pub terrain: TerrainGrid,
    pub water: WaterState,
    pub resources: ResourceField,
    pub agents: Vec<Agent>,
    /// Simulated seconds since creation.
    pub time: f64,
    pub tick: u64,
    group_colors: Vec<Rgb>,
    timers: Timers,
    rng: ChaCha8Rng,
    metrics: Metrics,
}

impl World {
    /// Generate a fresh world from `config`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let mut rng = if let Some(seed) = config.world.seed {
            ChaCha8Rng::seed_from_u64(seed)
        } else {
            ChaCha8Rng::from_entropy()
        };

        let (w, h) = (config.world.width, config.world.height);
        let mut terrain = TerrainGrid::generate(w, h, &config.heightmap, &mut rng);
        terrain.carve_rivers(&config.rivers, &config.heightmap.thresholds, &mut rng);
        let (resources, _) = ResourceField::distribute(
            &terrain,
            config.world.resource_count,
            &config.movement,
            &mut rng,
        );

        let mut world = Self::assemble(config, terrain, resources, Vec::new(), rng);
        for _ in 0..world.config.world.initial_agents {
            let position = world.random_spawn_point();
            let group = world.rng.gen_range(0..world.config.world.groups);
            world.add_agent(position, group);
        }

        tracing::info!(
            width = w,
            height = h,
            agents = world.agents.len(),
            resources = world.resources.count(),
            water = world.terrain.count_type(TerrainType::Water),
            fingerprint = %world.config.fingerprint(),
            "World created"
        );
        Ok(world)
    }

    /// Build a world from explicit parts. Every grid must match the
    /// configured map size.
    pub fn from_parts(
        config: AppConfig,
        terrain: TerrainGrid,
        resources: ResourceField,
        agents: Vec<Agent>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let (w, h) = (config.world.width, config.world.height);
        anyhow::ensure!(
            terrain.width() == w && terrain.height() == h,
            "Terrain is {}x{}, expected {}x{}",
            terrain.width(),
            terrain.height(),
            w,
            h
        );
        anyhow::ensure!(
            resources.amounts.width == w && resources.amounts.height == h,
            "Resource field does not match the map size"
        );
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::assemble(config, terrain, resources, agents, rng))
    }

    fn assemble(
        config: AppConfig,
        terrain: TerrainGrid,
        resources: ResourceField,
        agents: Vec<Agent>,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let group_colors = (0..config.world.groups)
            .map(|_| Rgb(rng.gen(), rng.gen(), rng.gen()))
            .collect();
        let water = WaterState::new(terrain.width(), terrain.height());
        let metrics = Metrics::new(config.schedule.log_interval);
        Self {
            config,
            terrain,
            water,
            resources,
            agents,
            time: 0.0,
            tick: 0,
            group_colors,
            timers: Timers::default(),
            rng,
            metrics,
        }
    }

    fn random_spawn_point(&mut self) -> Position {
        let walkable = self.terrain.walkable_cells(&self.config.movement);
        let (x, y) = if walkable.is_empty() {
            (
                self.rng.gen_range(0..self.terrain.width().max(1)) as i32,
                self.rng.gen_range(0..self.terrain.height().max(1)) as i32,
            )
        } else {
            walkable[self.rng.gen_range(0..walkable.len())]
        };
        Position::new(x as f64, y as f64)
    }

    /// Spawn a new agent of `group` at `position`. Returns its id.
    pub fn add_agent(&mut self, position: Position, group: u32) -> Uuid {
        let color = self
            .group_colors
            .get(group as usize)
            .copied()
            .unwrap_or_default();
        let identity = Identity {
            id: Uuid::from_u128(self.rng.gen()),
            group,
            color,
        };
        let agent = agent::spawn(
            identity,
            position,
            &self.config.lifecycle,
            self.time,
            &mut self.rng,
        );
        let id = agent.identity.id;
        self.agents.push(agent);
        id
    }

    /// Advance the world by `dt` seconds of simulated time.
    ///
    /// Phases run in a fixed order: hydrology (on its interval), every agent
    /// in insertion order, resource respawn, optional regrowth, then aging.
    pub fn step(&mut self, dt: f64) -> Vec<WorldEvent> {
        let started = Instant::now();
        let mut events = Vec::new();
        self.time += dt;
        self.tick += 1;
        let now = self.time;
        let schedule = &self.config.schedule;

        if now - self.timers.water >= schedule.water_interval {
            let elapsed = (now - self.timers.water) as f32;
            let dried = self.water.step(
                &mut self.terrain,
                elapsed,
                &self.config.hydrology,
                &self.config.heightmap.thresholds,
            );
            self.metrics.record_dried(dried.len());
            events.extend(
                dried
                    .into_iter()
                    .map(|(x, y)| WorldEvent::CellDried { x, y, time: now }),
            );
            self.timers.water = now;
        }

        let delta = dt * schedule.simulation_speed;
        for agent in &mut self.agents {
            let outcome = agent::update(
                agent,
                &self.terrain,
                &mut self.resources,
                Some(&self.water),
                delta,
                now,
                &self.config,
                &mut self.rng,
            );
            Self::report(agent, outcome, now, &self.metrics, &mut events);
        }

        if now - self.timers.respawn >= schedule.respawn_interval {
            let placed = self.resources.respawn(
                &self.terrain,
                self.config.world.resource_count,
                &self.config.movement,
                &mut self.rng,
            );
            events.push(WorldEvent::ResourcesRespawned {
                placed: placed.len(),
                time: now,
            });
            self.timers.respawn = now;
        }

        if let Some(interval) = schedule.regen_interval {
            if now - self.timers.regen >= interval {
                self.resources
                    .regenerate_all(&self.terrain, &self.config.resources);
                self.timers.regen = now;
            }
        }

        if now - self.timers.aging >= schedule.aging_interval {
            let mut count = 0;
            for agent in self.agents.iter_mut().filter(|a| a.is_alive()) {
                agent::grow_older(agent, &self.config.lifecycle, &mut self.rng);
                count += 1;
            }
            events.push(WorldEvent::AgentsAged { count, time: now });
            self.timers.aging = now;
        }

        self.metrics.record_tick(
            started.elapsed(),
            TickStats {
                alive_agents: self.alive_count(),
                resource_cells: self.resources.count(),
                water_cells: self.terrain.count_type(TerrainType::Water),
                sim_time: now,
            },
        );
        events
    }

    fn report(
        agent: &Agent,
        outcome: AgentOutcome,
        now: f64,
        metrics: &Metrics,
        events: &mut Vec<WorldEvent>,
    ) {
        let id = agent.identity.id;
        if let Some(c) = outcome.collection {
            metrics.record_collection();
            events.push(WorldEvent::ResourceCollected {
                id,
                x: c.cell.0,
                y: c.cell.1,
                amount: c.amount,
                energy_gained: c.energy_gained,
                time: now,
            });
        }
        if outcome.died {
            metrics.record_death();
            tracing::info!(%id, age = agent.age(), time = now, "Agent died");
            events.push(WorldEvent::AgentDied {
                id,
                age: agent.age(),
                time: now,
                x: agent.position.x,
                y: agent.position.y,
            });
        }
    }

    pub fn elevation_at(&self, x: i32, y: i32) -> f32 {
        self.terrain.elevation_at(x, y)
    }

    pub fn terrain_type_at(&self, x: i32, y: i32) -> Option<TerrainType> {
        self.terrain.terrain_type_at(x, y)
    }

    pub fn slope_at(&self, x: i32, y: i32) -> f32 {
        self.terrain.slope_at(x, y)
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.terrain.is_walkable(x, y, &self.config.movement)
    }

    pub fn resource_amount_at(&self, x: i32, y: i32) -> f32 {
        self.resources.amount_at(x, y)
    }

    pub fn flow_at(&self, x: i32, y: i32) -> Flow {
        self.water.flow_at(x, y)
    }

    pub fn agent(&self, id: Uuid) -> Option<&Agent> {
        self.agents.iter().find(|a| a.identity.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
