use terrarium_core::config::AppConfig;
use terrarium_core::resource::ResourceField;
use terrarium_core::terrain::TerrainGrid;
use terrarium_core::world::World;
use terrarium_data::{Position, TerrainType};

type TerrainMod = Box<dyn FnOnce(&mut TerrainGrid, &AppConfig)>;

/// Hand-built worlds on a flat grass map. Capacity noise is off and nothing
/// is spawned unless asked for.
#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    elevation: f32,
    terrain_mods: Vec<TerrainMod>,
    resources: Vec<(i32, i32, f32)>,
    agents: Vec<(f64, f64, u32)>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 10;
        config.world.height = 10;
        config.world.seed = Some(0);
        config.world.initial_agents = 0;
        config.world.resource_count = 0;
        config.lifecycle.capacity_noise = 0.0;
        Self {
            config,
            elevation: 0.4,
            terrain_mods: Vec::new(),
            resources: Vec::new(),
            agents: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.config.world.width = width;
        self.config.world.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_terrain(mut self, x: i32, y: i32, terrain_type: TerrainType) -> Self {
        self.terrain_mods.push(Box::new(move |terrain, config| {
            terrain.set_terrain_type(x, y, terrain_type, &config.heightmap.thresholds);
        }));
        self
    }

    pub fn with_elevation(mut self, x: i32, y: i32, h: f32) -> Self {
        self.terrain_mods.push(Box::new(move |terrain, _| {
            terrain.elevation.set(x, y, h);
        }));
        self
    }

    pub fn with_resource(mut self, x: i32, y: i32) -> Self {
        self.resources.push((x, y, 1.0));
        self
    }

    pub fn with_agent(mut self, x: f64, y: f64) -> Self {
        self.agents.push((x, y, 0));
        self
    }

    pub fn build(self) -> World {
        let (w, h) = (self.config.world.width, self.config.world.height);
        let mut terrain = TerrainGrid::flat(w, h, self.elevation, TerrainType::Grass);
        for m in self.terrain_mods {
            m(&mut terrain, &self.config);
        }
        let mut field = ResourceField::empty(w, h);
        for (x, y, amount) in self.resources {
            field.place(x, y, amount);
        }

        let mut world = World::from_parts(self.config, terrain, field, Vec::new())
            .expect("builder produces a consistent world");
        for (x, y, group) in self.agents {
            world.add_agent(Position::new(x, y), group);
        }
        world
    }
}
