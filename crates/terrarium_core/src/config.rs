//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. The core never reads files itself; an outer layer
//! parses the text and hands over a populated [`AppConfig`].
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing keys keep defaults)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 30
//! height = 30
//! initial_agents = 3
//! resource_count = 25
//! seed = 42
//!
//! [hydrology]
//! dryness_threshold = 5.0
//! erosion_rate = 0.0005
//!
//! [movement.cost]
//! grass = 0.3
//! ```

use serde::{Deserialize, Serialize};
use terrarium_data::TerrainType;

/// World-level simulation configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    pub seed: Option<u64>,
    pub initial_agents: usize,
    pub resource_count: usize,
    /// Number of opaque group tags handed out to agents.
    pub groups: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            seed: None,
            initial_agents: 3,
            resource_count: 25,
            groups: 2,
        }
    }
}

/// Elevation cutoffs for terrain classification. A cell takes the first band
/// whose cutoff it is strictly below; anything at or above `stone` is snow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TerrainThresholds {
    pub water: f32,
    pub sand: f32,
    pub grass: f32,
    pub stone: f32,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        Self {
            water: 0.2,
            sand: 0.3,
            grass: 0.6,
            stone: 0.75,
        }
    }
}

impl TerrainThresholds {
    #[must_use]
    pub fn classify(&self, h: f32) -> TerrainType {
        if h < self.water {
            TerrainType::Water
        } else if h < self.sand {
            TerrainType::Sand
        } else if h < self.grass {
            TerrainType::Grass
        } else if h < self.stone {
            TerrainType::Stone
        } else {
            TerrainType::Snow
        }
    }
}

/// Heightmap generator options.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HeightmapConfig {
    /// Mountain count bounds at the reference map size; scaled by area.
    pub min_mountains: u32,
    pub max_mountains: u32,
    pub reference_width: u16,
    pub reference_height: u16,
    /// Fraction of the shorter map side usable as a mountain radius.
    pub mountain_radius_factor: f32,
    pub mountain_height_divisor: f32,
    pub mountain_height_factor: f32,
    pub gaussian_sigma: f32,
    pub num_smoothing_iterations: u32,
    pub max_height_difference: f32,
    pub terrace_step: f32,
    pub thresholds: TerrainThresholds,
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            min_mountains: 7,
            max_mountains: 20,
            reference_width: 30,
            reference_height: 30,
            mountain_radius_factor: 0.5,
            mountain_height_divisor: 30.0,
            mountain_height_factor: 4.0,
            gaussian_sigma: 2.0,
            num_smoothing_iterations: 5,
            max_height_difference: 1.0,
            terrace_step: 1.0,
            thresholds: TerrainThresholds::default(),
        }
    }
}

/// Generation-time river carving.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RiverConfig {
    /// Number of river sources to carve. Zero disables carving.
    pub count: usize,
    pub smooth_radius: u16,
    /// Fractional height reduction at the centre of the carving brush.
    pub carve_depth: f32,
    pub branch_probability: f64,
    /// Height tolerance under which a lower neighbour counts as a near tie.
    pub branch_threshold: f32,
    /// Path length a river must reach before it may branch.
    pub min_length: usize,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            count: 0,
            smooth_radius: 2,
            carve_depth: 0.1,
            branch_probability: 0.2,
            branch_threshold: 0.02,
            min_length: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HydrologyConfig {
    /// Seconds an under-connected water cell survives before drying.
    pub dryness_threshold: f32,
    pub erosion_rate: f32,
    pub diffusion_rate: f32,
    pub momentum: f32,
}

impl Default for HydrologyConfig {
    fn default() -> Self {
        Self {
            dryness_threshold: 5.0,
            erosion_rate: 0.0005,
            diffusion_rate: 0.1,
            momentum: 0.5,
        }
    }
}

/// Per-terrain lookup table. Missing entries fall back to a caller-supplied
/// default.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct TerrainTable {
    pub water: Option<f64>,
    pub sand: Option<f64>,
    pub grass: Option<f64>,
    pub stone: Option<f64>,
    pub snow: Option<f64>,
}

impl TerrainTable {
    #[must_use]
    pub fn lookup(&self, terrain: TerrainType) -> Option<f64> {
        match terrain {
            TerrainType::Water => self.water,
            TerrainType::Sand => self.sand,
            TerrainType::Grass => self.grass,
            TerrainType::Stone => self.stone,
            TerrainType::Snow => self.snow,
        }
    }

    /// Table value for `terrain`, or `default` when unset or off-map.
    #[must_use]
    pub fn get_or(&self, terrain: Option<TerrainType>, default: f64) -> f64 {
        terrain.and_then(|t| self.lookup(t)).unwrap_or(default)
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        [self.water, self.sand, self.grass, self.stone, self.snow]
            .into_iter()
            .flatten()
    }
}

/// Resource growth rates per terrain.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ResourceConfig {
    pub growth: TerrainTable,
    /// Growth rate for terrain missing from `growth`.
    pub default_growth: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            growth: TerrainTable {
                water: None,
                sand: Some(0.1),
                grass: Some(0.5),
                stone: Some(0.05),
                snow: Some(0.01),
            },
            default_growth: 0.1,
        }
    }
}

/// Locomotion, walkability, and vision tunables.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MovementConfig {
    /// Cells per second before terrain scaling.
    pub base_speed: f64,
    pub speed: TerrainTable,
    pub cost: TerrainTable,
    /// Multiplier for terrain missing from `speed` / `cost`.
    pub default_multiplier: f64,
    pub base_cost: f64,
    pub slope_factor: f64,
    pub max_step_height: f64,
    pub max_slope: f32,
    pub snow_slope_factor: f32,
    pub stone_slope_factor: f32,
    pub vision_range: f64,
    pub max_attempts: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 4.0,
            speed: TerrainTable {
                water: Some(0.4),
                sand: Some(0.8),
                grass: Some(1.2),
                stone: Some(0.7),
                snow: Some(0.5),
            },
            cost: TerrainTable {
                water: None,
                sand: Some(0.6),
                grass: Some(0.3),
                stone: Some(0.8),
                snow: Some(1.0),
            },
            default_multiplier: 1.0,
            base_cost: 0.2,
            slope_factor: 0.5,
            max_step_height: 1.0,
            max_slope: 0.3,
            snow_slope_factor: 0.5,
            stone_slope_factor: 0.8,
            vision_range: 15.0,
            max_attempts: 50,
        }
    }
}

/// Energy, metabolism, and the age-indexed capacity curve.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LifecycleConfig {
    pub initial_energy: f64,
    /// Energy lost per simulated second regardless of movement.
    pub energy_decay_rate: f64,
    pub capacity_alpha: f64,
    pub capacity_beta: f64,
    pub max_age: u32,
    pub capacity_floor: f64,
    pub capacity_span: f64,
    /// Half-width of the uniform noise added to the capacity curve.
    pub capacity_noise: f64,
    /// Energy per unit of collected resource before age scaling.
    pub collection_energy: f64,
    pub min_age_factor: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            energy_decay_rate: 0.0,
            capacity_alpha: 2.0,
            capacity_beta: 5.0,
            max_age: 100,
            capacity_floor: 10.0,
            capacity_span: 90.0,
            capacity_noise: 5.0,
            collection_energy: 75.0,
            min_age_factor: 0.5,
        }
    }
}

/// Intervals of the periodic world phases, in simulated seconds.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Scales the tick delta handed to agents.
    pub simulation_speed: f64,
    pub water_interval: f64,
    pub respawn_interval: f64,
    pub aging_interval: f64,
    /// When set, resource cells regrow on this interval.
    pub regen_interval: Option<f64>,
    /// Ticks between metrics summaries.
    pub log_interval: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            simulation_speed: 0.1,
            water_interval: 5.0,
            respawn_interval: 30.0,
            aging_interval: 5.0,
            regen_interval: None,
            log_interval: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub heightmap: HeightmapConfig,
    pub rivers: RiverConfig,
    pub hydrology: HydrologyConfig,
    pub resources: ResourceConfig,
    pub movement: MovementConfig,
    pub lifecycle: LifecycleConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(self.world.height > 0, "World height must be positive");
        anyhow::ensure!(self.world.groups > 0, "Group count must be positive");
        anyhow::ensure!(
            self.float_tunables().all(f64::is_finite),
            "Numeric tunables must be finite"
        );

        let hm = &self.heightmap;
        anyhow::ensure!(
            hm.min_mountains <= hm.max_mountains,
            "min_mountains must not exceed max_mountains"
        );
        anyhow::ensure!(
            hm.reference_width > 0 && hm.reference_height > 0,
            "Reference map size must be positive"
        );
        anyhow::ensure!(
            hm.mountain_radius_factor >= 0.0,
            "Mountain radius factor must be non-negative"
        );
        anyhow::ensure!(
            hm.mountain_height_divisor > 0.0,
            "Mountain height divisor must be positive"
        );
        anyhow::ensure!(hm.gaussian_sigma >= 0.0, "Gaussian sigma must be non-negative");
        anyhow::ensure!(
            hm.max_height_difference >= 0.0,
            "Max height difference must be non-negative"
        );
        anyhow::ensure!(hm.terrace_step > 0.0, "Terrace step must be positive");
        let t = &hm.thresholds;
        anyhow::ensure!(
            t.water < t.sand && t.sand < t.grass && t.grass < t.stone,
            "Terrain thresholds must be strictly increasing"
        );

        anyhow::ensure!(
            (0.0..=1.0).contains(&self.rivers.branch_probability),
            "Branch probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.rivers.carve_depth),
            "Carve depth must be in [0.0, 1.0]"
        );

        let hy = &self.hydrology;
        anyhow::ensure!(
            hy.dryness_threshold >= 0.0,
            "Dryness threshold must be non-negative"
        );
        anyhow::ensure!(hy.erosion_rate >= 0.0, "Erosion rate must be non-negative");
        anyhow::ensure!(
            (0.0..=1.0).contains(&hy.diffusion_rate),
            "Diffusion rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&hy.momentum),
            "Momentum must be in [0.0, 1.0]"
        );

        anyhow::ensure!(
            self.resources.default_growth >= 0.0
                && self.resources.growth.values().all(|v| v >= 0.0),
            "Resource growth rates must be non-negative"
        );

        let mv = &self.movement;
        anyhow::ensure!(mv.base_speed >= 0.0, "Base speed must be non-negative");
        anyhow::ensure!(
            mv.speed.values().all(|v| v >= 0.0) && mv.default_multiplier >= 0.0,
            "Speed multipliers must be non-negative"
        );
        anyhow::ensure!(
            mv.cost.values().all(|v| v > 0.0) && mv.default_multiplier > 0.0,
            "Movement cost multipliers must be positive"
        );
        anyhow::ensure!(mv.base_cost > 0.0, "Base move cost must be positive");
        anyhow::ensure!(mv.slope_factor >= 0.0, "Slope factor must be non-negative");
        anyhow::ensure!(mv.max_slope >= 0.0, "Max slope must be non-negative");
        anyhow::ensure!(mv.vision_range >= 0.0, "Vision range must be non-negative");

        let lc = &self.lifecycle;
        anyhow::ensure!(lc.initial_energy > 0.0, "Initial energy must be positive");
        anyhow::ensure!(
            lc.energy_decay_rate >= 0.0,
            "Energy decay rate must be non-negative"
        );
        anyhow::ensure!(
            lc.capacity_alpha >= 1.0 && lc.capacity_beta >= 1.0,
            "Capacity curve shape parameters must be at least 1"
        );
        anyhow::ensure!(lc.max_age > 0, "Max age must be positive");
        anyhow::ensure!(
            lc.capacity_floor > 0.0 && lc.capacity_span >= 0.0,
            "Capacity floor must be positive and span non-negative"
        );
        anyhow::ensure!(lc.capacity_noise >= 0.0, "Capacity noise must be non-negative");
        anyhow::ensure!(
            (0.0..=1.0).contains(&lc.min_age_factor),
            "Minimum age factor must be in [0.0, 1.0]"
        );

        let sc = &self.schedule;
        anyhow::ensure!(sc.simulation_speed > 0.0, "Simulation speed must be positive");
        anyhow::ensure!(
            sc.water_interval > 0.0 && sc.respawn_interval > 0.0 && sc.aging_interval > 0.0,
            "Schedule intervals must be positive"
        );
        anyhow::ensure!(
            sc.regen_interval.map_or(true, |v| v > 0.0),
            "Regeneration interval must be positive when set"
        );
        anyhow::ensure!(sc.log_interval > 0, "Log interval must be positive");

        Ok(())
    }

    /// Every floating-point tunable, widened to `f64`.
    fn float_tunables(&self) -> impl Iterator<Item = f64> + '_ {
        let hm = &self.heightmap;
        let t = &hm.thresholds;
        let rv = &self.rivers;
        let hy = &self.hydrology;
        let mv = &self.movement;
        let lc = &self.lifecycle;
        let sc = &self.schedule;
        let narrow = [
            hm.mountain_radius_factor,
            hm.mountain_height_divisor,
            hm.mountain_height_factor,
            hm.gaussian_sigma,
            hm.max_height_difference,
            hm.terrace_step,
            t.water,
            t.sand,
            t.grass,
            t.stone,
            rv.carve_depth,
            rv.branch_threshold,
            hy.dryness_threshold,
            hy.erosion_rate,
            hy.diffusion_rate,
            hy.momentum,
            mv.max_slope,
            mv.snow_slope_factor,
            mv.stone_slope_factor,
        ];
        let wide = [
            rv.branch_probability,
            self.resources.default_growth,
            mv.base_speed,
            mv.default_multiplier,
            mv.base_cost,
            mv.slope_factor,
            mv.max_step_height,
            mv.vision_range,
            lc.initial_energy,
            lc.energy_decay_rate,
            lc.capacity_alpha,
            lc.capacity_beta,
            lc.capacity_floor,
            lc.capacity_span,
            lc.capacity_noise,
            lc.collection_energy,
            lc.min_age_factor,
            sc.simulation_speed,
            sc.water_interval,
            sc.respawn_interval,
            sc.aging_interval,
        ];
        narrow
            .into_iter()
            .map(f64::from)
            .chain(wide)
            .chain(sc.regen_interval)
            .chain(self.resources.growth.values())
            .chain(mv.speed.values())
            .chain(mv.cost.values())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable hash of every tunable that affects simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.heightmap).as_bytes());
        hasher.update(format!("{:?}", self.rivers).as_bytes());
        hasher.update(format!("{:?}", self.hydrology).as_bytes());
        hasher.update(format!("{:?}", self.resources).as_bytes());
        hasher.update(format!("{:?}", self.movement).as_bytes());
        hasher.update(format!("{:?}", self.lifecycle).as_bytes());
        hasher.update(format!("{:?}", self.schedule).as_bytes());
        hex::encode(hasher.finalize())
    }
}
