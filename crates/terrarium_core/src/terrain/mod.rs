pub use terrarium_data::{Grid, Rgb, TerrainType};

use crate::config::{MovementConfig, ResourceConfig, TerrainThresholds};

pub mod generation;
pub mod rivers;

pub const COLOR_WATER: Rgb = Rgb(60, 60, 200);
pub const COLOR_SAND: Rgb = Rgb(245, 222, 179);
pub const COLOR_GRASS: Rgb = Rgb(124, 252, 0);
pub const COLOR_STONE: Rgb = Rgb(112, 128, 144);
pub const COLOR_SNOW: Rgb = Rgb(255, 250, 250);

/// Per-terrain behaviour that does not depend on a cell's position.
pub trait TerrainLogic {
    /// Largest local slope a walker tolerates on this terrain.
    fn slope_tolerance(&self, movement: &MovementConfig) -> f32;
    fn speed_multiplier(&self, movement: &MovementConfig) -> f64;
    fn cost_multiplier(&self, movement: &MovementConfig) -> f64;
    fn growth_rate(&self, resources: &ResourceConfig) -> f64;
    fn symbol(&self) -> char;
}

impl TerrainLogic for TerrainType {
    fn slope_tolerance(&self, movement: &MovementConfig) -> f32 {
        match self {
            TerrainType::Snow => movement.max_slope * movement.snow_slope_factor,
            TerrainType::Stone => movement.max_slope * movement.stone_slope_factor,
            _ => movement.max_slope,
        }
    }

    fn speed_multiplier(&self, movement: &MovementConfig) -> f64 {
        movement
            .speed
            .get_or(Some(*self), movement.default_multiplier)
    }

    fn cost_multiplier(&self, movement: &MovementConfig) -> f64 {
        movement
            .cost
            .get_or(Some(*self), movement.default_multiplier)
    }

    fn growth_rate(&self, resources: &ResourceConfig) -> f64 {
        resources
            .growth
            .get_or(Some(*self), resources.default_growth)
    }

    fn symbol(&self) -> char {
        match self {
            TerrainType::Water => '~',
            TerrainType::Sand => '.',
            TerrainType::Grass => ',',
            TerrainType::Stone => '^',
            TerrainType::Snow => '*',
        }
    }
}

/// Display colour for a cell of `terrain` at elevation `h`, blended within
/// the terrain's elevation band.
#[must_use]
pub fn color_for(terrain: TerrainType, h: f32, t: &TerrainThresholds) -> Rgb {
    let band = |lo: f32, hi: f32| {
        if hi > lo {
            ((h - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    };
    match terrain {
        TerrainType::Water => COLOR_WATER,
        TerrainType::Sand => COLOR_SAND,
        TerrainType::Grass => COLOR_SAND.blend(COLOR_GRASS, band(t.sand, t.grass)),
        TerrainType::Stone => COLOR_GRASS.blend(COLOR_STONE, band(t.grass, t.stone)),
        TerrainType::Snow => COLOR_STONE.blend(COLOR_SNOW, band(t.stone, 1.0)),
    }
}

/// Elevation, classification, and display colour for every cell.
///
/// All three grids share one shape for the lifetime of the world. Queries
/// outside the grid return inert defaults instead of failing.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGrid {
    pub elevation: Grid<f32>,
    pub types: Grid<TerrainType>,
    pub colors: Grid<Rgb>,
}

impl TerrainGrid {
    /// Assemble a grid from explicit layers, colouring each cell from its type.
    /// Returns `None` when the layers disagree on shape.
    pub fn from_layers(
        elevation: Grid<f32>,
        types: Grid<TerrainType>,
        thresholds: &TerrainThresholds,
    ) -> Option<Self> {
        if elevation.width != types.width || elevation.height != types.height {
            return None;
        }
        let mut grid = Self {
            colors: Grid::new(elevation.width, elevation.height, Rgb::default()),
            elevation,
            types,
        };
        grid.recolor(thresholds);
        Some(grid)
    }

    /// A uniform map: every cell at `elevation` with type `terrain`.
    pub fn flat(width: u16, height: u16, elevation: f32, terrain: TerrainType) -> Self {
        let thresholds = TerrainThresholds::default();
        Self {
            elevation: Grid::new(width, height, elevation),
            types: Grid::new(width, height, terrain),
            colors: Grid::new(width, height, color_for(terrain, elevation, &thresholds)),
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.elevation.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.elevation.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.elevation.in_bounds(x, y)
    }

    /// Elevation of the cell, or 0 outside the map.
    pub fn elevation_at(&self, x: i32, y: i32) -> f32 {
        self.elevation.value_or_default(x, y)
    }

    pub fn terrain_type_at(&self, x: i32, y: i32) -> Option<TerrainType> {
        self.types.get(x, y).copied()
    }

    /// Black outside the map.
    pub fn color_at(&self, x: i32, y: i32) -> Rgb {
        self.colors.value_or_default(x, y)
    }

    /// Largest absolute elevation difference to an in-bounds 4-neighbour.
    /// Zero outside the map or on a single-cell map.
    pub fn slope_at(&self, x: i32, y: i32) -> f32 {
        let Some(&h) = self.elevation.get(x, y) else {
            return 0.0;
        };
        self.elevation
            .neighbors_4(x, y)
            .map(|(_, _, &nh)| (nh - h).abs())
            .fold(0.0, f32::max)
    }

    /// Whether the local slope is within the tolerance of the cell's terrain.
    /// Cells outside the map are never walkable.
    pub fn is_walkable(&self, x: i32, y: i32, movement: &MovementConfig) -> bool {
        match self.terrain_type_at(x, y) {
            Some(terrain) => self.slope_at(x, y) <= terrain.slope_tolerance(movement),
            None => false,
        }
    }

    /// Coordinates of every walkable cell, row-major.
    pub fn walkable_cells(&self, movement: &MovementConfig) -> Vec<(i32, i32)> {
        self.types
            .iter()
            .map(|(x, y, _)| (x as i32, y as i32))
            .filter(|&(x, y)| self.is_walkable(x, y, movement))
            .collect()
    }

    pub fn count_type(&self, terrain: TerrainType) -> usize {
        self.types.cells().iter().filter(|&&t| t == terrain).count()
    }

    /// Reclassify a cell and refresh its colour. Ignored outside the map.
    pub fn set_terrain_type(
        &mut self,
        x: i32,
        y: i32,
        terrain: TerrainType,
        thresholds: &TerrainThresholds,
    ) {
        if !self.in_bounds(x, y) {
            return;
        }
        let h = self.elevation_at(x, y);
        self.types.set(x, y, terrain);
        self.colors.set(x, y, color_for(terrain, h, thresholds));
    }

    /// Recompute every display colour from the current type and elevation.
    pub fn recolor(&mut self, thresholds: &TerrainThresholds) {
        let w = self.width().max(1) as usize;
        for (idx, color) in self.colors.cells_mut().iter_mut().enumerate() {
            let (x, y) = ((idx % w) as i32, (idx / w) as i32);
            let terrain = self.types.value_or_default(x, y);
            *color = color_for(terrain, self.elevation.value_or_default(x, y), thresholds);
        }
    }

    /// One character per cell, rows separated by newlines.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() as usize + 1) * self.height() as usize);
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                out.push(self.types.value_or_default(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }
}
