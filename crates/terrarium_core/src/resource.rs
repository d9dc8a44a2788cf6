//! Harvestable resource quantities, one per cell, in `[0, 1]`.

use crate::config::{MovementConfig, ResourceConfig};
use crate::terrain::{TerrainGrid, TerrainLogic};
use rand::Rng;
use terrarium_data::Grid;

/// Quantity of a freshly placed resource, and the cap for regrowth.
pub const FULL: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceField {
    pub amounts: Grid<f32>,
}

impl ResourceField {
    pub fn empty(width: u16, height: u16) -> Self {
        Self {
            amounts: Grid::new(width, height, 0.0),
        }
    }

    /// Place `count` full resources on walkable cells, sampled uniformly.
    /// Placements may collide; a collision overwrites rather than stacks.
    pub fn distribute<R: Rng + ?Sized>(
        terrain: &TerrainGrid,
        count: usize,
        movement: &MovementConfig,
        rng: &mut R,
    ) -> (Self, Vec<(i32, i32)>) {
        let mut field = Self::empty(terrain.width(), terrain.height());
        if count == 0 {
            return (field, Vec::new());
        }

        let walkable = terrain.walkable_cells(movement);
        if walkable.is_empty() {
            tracing::warn!(count, "No walkable cell to place resources on");
            return (field, Vec::new());
        }

        let locations: Vec<(i32, i32)> = (0..count)
            .map(|_| walkable[rng.gen_range(0..walkable.len())])
            .collect();
        for &(x, y) in &locations {
            field.amounts.set(x, y, FULL);
        }
        (field, locations)
    }

    /// Replace the whole field with a fresh distribution.
    pub fn respawn<R: Rng + ?Sized>(
        &mut self,
        terrain: &TerrainGrid,
        count: usize,
        movement: &MovementConfig,
        rng: &mut R,
    ) -> Vec<(i32, i32)> {
        let (field, locations) = Self::distribute(terrain, count, movement, rng);
        *self = field;
        tracing::debug!(placed = locations.len(), "Resources respawned");
        locations
    }

    /// Zero outside the map.
    pub fn amount_at(&self, x: i32, y: i32) -> f32 {
        self.amounts.value_or_default(x, y)
    }

    /// Place a resource of `amount`, clamped to `[0, 1]`. Ignored off-map.
    pub fn place(&mut self, x: i32, y: i32, amount: f32) {
        self.amounts.set(x, y, amount.clamp(0.0, FULL));
    }

    /// Subtract `amount`, flooring at zero. Returns what was removed.
    pub fn deplete(&mut self, x: i32, y: i32, amount: f32) -> f32 {
        match self.amounts.get_mut(x, y) {
            Some(cell) => {
                let taken = (*cell).min(amount.max(0.0));
                *cell -= taken;
                taken
            }
            None => 0.0,
        }
    }

    /// Grow one cell by its terrain's rate, capped at [`FULL`].
    pub fn regenerate(
        &mut self,
        terrain: &TerrainGrid,
        x: i32,
        y: i32,
        resources: &ResourceConfig,
    ) {
        let rate = terrain
            .terrain_type_at(x, y)
            .map_or(resources.default_growth, |t| t.growth_rate(resources));
        if let Some(cell) = self.amounts.get_mut(x, y) {
            *cell = (*cell + rate as f32).min(FULL);
        }
    }

    /// Regrow every cell that still holds a resource.
    pub fn regenerate_all(&mut self, terrain: &TerrainGrid, resources: &ResourceConfig) {
        for (x, y) in self.locations() {
            self.regenerate(terrain, x, y, resources);
        }
    }

    /// Cells with a positive quantity, row-major.
    pub fn locations(&self) -> Vec<(i32, i32)> {
        self.amounts
            .iter()
            .filter(|&(_, _, &a)| a > 0.0)
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.amounts.cells().iter().filter(|&&a| a > 0.0).count()
    }
}
