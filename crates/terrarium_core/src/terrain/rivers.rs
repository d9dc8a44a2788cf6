//! Generation-time river carving.
//!
//! A river greedily descends to its lowest strictly-lower neighbour, carving
//! a soft channel and marking the brush footprint as water. Near-tied
//! descents may fork off a branch once the river is long enough. Branches
//! are driven by an explicit stack so deep maps cannot overflow the call
//! stack, and one visited set is shared by the whole carving tree.

use super::{TerrainGrid, TerrainType};
use crate::config::{RiverConfig, TerrainThresholds};
use rand::Rng;
use std::collections::HashSet;

/// Candidate descent order: columns outer, rows inner. The first of several
/// equally low neighbours wins.
const DESCENT_ORDER: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy)]
enum Walker {
    /// Arrive at `cell` with `carved` cells already behind this river.
    Arrive { cell: (i32, i32), carved: usize },
    /// A branch forked at `cell` has finished; carve it and continue to `next`.
    Resume {
        cell: (i32, i32),
        next: (i32, i32),
        carved: usize,
    },
}

impl TerrainGrid {
    /// Carve `params.count` rivers from random high cells. Returns the number
    /// of cells visited across all rivers.
    pub fn carve_rivers<R: Rng + ?Sized>(
        &mut self,
        params: &RiverConfig,
        thresholds: &TerrainThresholds,
        rng: &mut R,
    ) -> usize {
        if params.count == 0 {
            return 0;
        }
        let sources: Vec<(i32, i32)> = self
            .elevation
            .iter()
            .filter(|&(_, _, &h)| h >= thresholds.stone)
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect();
        if sources.is_empty() {
            tracing::warn!("No cells high enough to source a river");
            return 0;
        }

        let mut total = 0;
        for _ in 0..params.count {
            let start = sources[rng.gen_range(0..sources.len())];
            let mut visited = HashSet::new();
            let path = self.carve_river(start, params, thresholds, &mut visited, rng);
            total += visited.len();
            tracing::debug!(?start, length = path.len(), "River carved");
        }
        total
    }

    /// Carve one river (and any branches) from `start`. Returns the main
    /// channel's carved cells in order. Cells already in `visited` stop the walk.
    pub fn carve_river<R: Rng + ?Sized>(
        &mut self,
        start: (i32, i32),
        params: &RiverConfig,
        thresholds: &TerrainThresholds,
        visited: &mut HashSet<(i32, i32)>,
        rng: &mut R,
    ) -> Vec<(i32, i32)> {
        let mut main_path = Vec::new();
        // Depth 0 is the main channel; anything deeper is a branch.
        let mut stack = vec![(
            0usize,
            Walker::Arrive {
                cell: start,
                carved: 0,
            },
        )];

        while let Some((depth, walker)) = stack.pop() {
            let (mut cell, mut carved) = match walker {
                Walker::Arrive { cell, carved } => (cell, carved),
                Walker::Resume { cell, next, carved } => {
                    self.carve_at(cell, params, thresholds);
                    if depth == 0 {
                        main_path.push(cell);
                    }
                    (next, carved + 1)
                }
            };

            loop {
                if !self.in_bounds(cell.0, cell.1) || !visited.insert(cell) {
                    break;
                }
                if self.is_edge(cell) && carved > 1 {
                    break;
                }
                let Some((next, branch)) = self.descend(cell, carved, params) else {
                    break;
                };

                if let Some(branch_start) = branch {
                    if rng.gen::<f64>() < params.branch_probability {
                        stack.push((depth, Walker::Resume { cell, next, carved }));
                        stack.push((
                            depth + 1,
                            Walker::Arrive {
                                cell: branch_start,
                                carved: 0,
                            },
                        ));
                        break;
                    }
                }

                self.carve_at(cell, params, thresholds);
                if depth == 0 {
                    main_path.push(cell);
                }
                carved += 1;
                cell = next;
            }
        }
        main_path
    }

    fn is_edge(&self, (x, y): (i32, i32)) -> bool {
        x == 0 || y == 0 || x == self.width() as i32 - 1 || y == self.height() as i32 - 1
    }

    /// Lowest strictly-lower neighbour, plus the first near-tied alternative
    /// when the river is long enough to branch.
    fn descend(
        &self,
        (x, y): (i32, i32),
        carved: usize,
        params: &RiverConfig,
    ) -> Option<((i32, i32), Option<(i32, i32)>)> {
        let here = self.elevation_at(x, y);
        let lower: Vec<((i32, i32), f32)> = DESCENT_ORDER
            .iter()
            .filter_map(|&(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                self.elevation
                    .get(nx, ny)
                    .filter(|&&h| h < here)
                    .map(|&h| ((nx, ny), h))
            })
            .collect();

        let mut best = *lower.first()?;
        for &candidate in &lower[1..] {
            if candidate.1 < best.1 {
                best = candidate;
            }
        }

        let branch = if carved >= params.min_length {
            lower
                .iter()
                .find(|&&(pos, h)| pos != best.0 && (h - best.1).abs() < params.branch_threshold)
                .map(|&(pos, _)| pos)
        } else {
            None
        };
        Some((best.0, branch))
    }

    /// Lower the brush footprint around `center` and mark it as water.
    fn carve_at(
        &mut self,
        (cx, cy): (i32, i32),
        params: &RiverConfig,
        thresholds: &TerrainThresholds,
    ) {
        let r = params.smooth_radius as i32;
        for j in -r..=r {
            for i in -r..=r {
                let (x, y) = (cx + i, cy + j);
                if !self.in_bounds(x, y) {
                    continue;
                }
                let dist = (i as f32).hypot(j as f32);
                if dist > r as f32 {
                    continue;
                }
                let falloff = if r == 0 { 1.0 } else { 1.0 - dist / r as f32 };
                let reduction = params.carve_depth * falloff;
                if let Some(h) = self.elevation.get_mut(x, y) {
                    *h = (*h).min(*h * (1.0 - reduction));
                }
                self.set_terrain_type(x, y, TerrainType::Water, thresholds);
            }
        }
    }
}
