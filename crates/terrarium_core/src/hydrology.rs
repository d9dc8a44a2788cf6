//! Cellular water flow: steepest-descent flow vectors, lateral diffusion,
//! momentum damping, and drying/erosion of water cells.

use crate::config::{HydrologyConfig, TerrainThresholds};
use crate::terrain::TerrainGrid;
use rayon::prelude::*;
use terrarium_data::{Flow, Grid, TerrainType, NEIGHBORS_8};

/// Water cells need at least this many water neighbours to stay wet.
pub const MIN_WATER_NEIGHBORS: usize = 2;

/// Per-cell flow and dryness. Both are zero on every non-water cell after a
/// step.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterState {
    pub flow: Grid<Flow>,
    /// Seconds each water cell has spent under-connected.
    pub dryness: Grid<f32>,
}

impl WaterState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            flow: Grid::new(width, height, Flow::ZERO),
            dryness: Grid::new(width, height, 0.0),
        }
    }

    /// Zero outside the map.
    pub fn flow_at(&self, x: i32, y: i32) -> Flow {
        self.flow.value_or_default(x, y)
    }

    pub fn dryness_at(&self, x: i32, y: i32) -> f32 {
        self.dryness.value_or_default(x, y)
    }

    /// Advance the water simulation by `dt` seconds.
    ///
    /// Mutates flow, dryness, elevation (erosion) and terrain type (drying).
    /// Returns the cells that dried into grass, in row-major order.
    pub fn step(
        &mut self,
        terrain: &mut TerrainGrid,
        dt: f32,
        params: &HydrologyConfig,
        thresholds: &TerrainThresholds,
    ) -> Vec<(i32, i32)> {
        let raw = descent_flow(terrain);
        let diffused = diffuse(&raw, params.diffusion_rate);
        self.apply_momentum(terrain, &diffused, params.momentum);
        let dried = self.dry_and_erode(terrain, dt, params, thresholds);

        tracing::debug!(
            dt,
            dried = dried.len(),
            water = terrain.count_type(TerrainType::Water),
            "Hydrology step"
        );
        dried
    }

    fn apply_momentum(&mut self, terrain: &TerrainGrid, diffused: &Grid<Flow>, momentum: f32) {
        self.flow
            .cells_mut()
            .par_iter_mut()
            .zip(diffused.cells().par_iter())
            .zip(terrain.types.cells().par_iter())
            .for_each(|((flow, &d), &t)| {
                *flow = if t == TerrainType::Water {
                    flow.scale(momentum).add(d.scale(1.0 - momentum))
                } else {
                    Flow::ZERO
                };
            });
    }

    /// Sequential in place: a cell dried earlier in the pass no longer counts
    /// as a water neighbour for later cells.
    fn dry_and_erode(
        &mut self,
        terrain: &mut TerrainGrid,
        dt: f32,
        params: &HydrologyConfig,
        thresholds: &TerrainThresholds,
    ) -> Vec<(i32, i32)> {
        let mut dried = Vec::new();
        let (w, h) = (terrain.width() as i32, terrain.height() as i32);

        for y in 0..h {
            for x in 0..w {
                if terrain.terrain_type_at(x, y) != Some(TerrainType::Water) {
                    self.flow.set(x, y, Flow::ZERO);
                    self.dryness.set(x, y, 0.0);
                    continue;
                }

                let wet_neighbors = terrain
                    .types
                    .neighbors_8(x, y)
                    .filter(|&(_, _, &t)| t == TerrainType::Water)
                    .count();

                if wet_neighbors < MIN_WATER_NEIGHBORS {
                    let dryness = self.dryness_at(x, y) + dt;
                    if dryness > params.dryness_threshold {
                        terrain.set_terrain_type(x, y, TerrainType::Grass, thresholds);
                        self.flow.set(x, y, Flow::ZERO);
                        self.dryness.set(x, y, 0.0);
                        dried.push((x, y));
                        continue;
                    }
                    self.dryness.set(x, y, dryness);
                } else {
                    self.dryness.set(x, y, 0.0);
                }

                if let Some(e) = terrain.elevation.get_mut(x, y) {
                    *e = (*e - params.erosion_rate * dt).max(0.0);
                }
            }
        }
        dried
    }
}

/// Raw flow per cell: unit vector toward the lowest strictly-lower
/// 8-neighbour, scaled by the drop. Zero on land and in pits.
pub fn descent_flow(terrain: &TerrainGrid) -> Grid<Flow> {
    let (w, h) = (terrain.width(), terrain.height());
    let mut raw = Grid::new(w, h, Flow::ZERO);
    if raw.is_empty() {
        return raw;
    }

    raw.cells_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as i32;
                if terrain.terrain_type_at(x, y) != Some(TerrainType::Water) {
                    continue;
                }
                let here = terrain.elevation_at(x, y);
                let mut best = (0, 0, here);
                for (dx, dy) in NEIGHBORS_8 {
                    if let Some(&nh) = terrain.elevation.get(x + dx, y + dy) {
                        if nh < best.2 {
                            best = (dx, dy, nh);
                        }
                    }
                }
                let (dx, dy, low) = best;
                if dx != 0 || dy != 0 {
                    let len = (dx as f32).hypot(dy as f32);
                    let drop = here - low;
                    *out = Flow::new(dx as f32 / len * drop, dy as f32 / len * drop);
                }
            }
        });
    raw
}

/// Blend each cell's flow with the mean of its in-bounds 8-neighbours:
/// `(1 - k) * raw + k * mean`. A cell with no neighbours keeps its flow.
pub fn diffuse(raw: &Grid<Flow>, k: f32) -> Grid<Flow> {
    let w = raw.width;
    let mut out = raw.clone();
    if out.is_empty() {
        return out;
    }

    out.cells_mut()
        .par_chunks_mut(w as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for (x, cell) in row.iter_mut().enumerate() {
                let x = x as i32;
                let (sum, count) = raw
                    .neighbors_8(x, y)
                    .fold((Flow::ZERO, 0u32), |(s, n), (_, _, &f)| (s.add(f), n + 1));
                if count > 0 {
                    let mean = sum.scale(1.0 / count as f32);
                    *cell = cell.scale(1.0 - k).add(mean.scale(k));
                }
            }
        });
    out
}
