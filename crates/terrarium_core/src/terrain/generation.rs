use super::{color_for, TerrainGrid, TerrainType};
use crate::config::{HeightmapConfig, TerrainThresholds};
use rand::Rng;
use rayon::prelude::*;
use terrarium_data::{Grid, Rgb};

/// Neighbour visiting order for the slope-limiting passes: edges first, then
/// diagonals. Each clamp is applied in place, so the order is observable.
const SMOOTHING_ORDER: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Kernel half-width in standard deviations.
const GAUSSIAN_TRUNCATE: f32 = 4.0;

impl TerrainGrid {
    /// Generate a normalized, terraced, classified heightmap.
    ///
    /// The RNG drives the mountain count, radii and centres; every later
    /// pass is a pure function of the accumulated heights.
    pub fn generate<R: Rng + ?Sized>(
        width: u16,
        height: u16,
        params: &HeightmapConfig,
        rng: &mut R,
    ) -> Self {
        let mut elevation = Grid::new(width, height, 0.0f32);
        if elevation.is_empty() {
            return Self::classify(elevation, &params.thresholds);
        }

        let mountains = place_mountains(&mut elevation, params, rng);
        let mut elevation = gaussian_blur(&elevation, params.gaussian_sigma);
        limit_slopes(
            &mut elevation,
            params.num_smoothing_iterations,
            params.max_height_difference,
        );
        normalize(&mut elevation);
        for h in elevation.cells_mut() {
            *h = smooth_terrace(*h, params.terrace_step);
        }

        tracing::debug!(width, height, mountains, "Heightmap generated");
        Self::classify(elevation, &params.thresholds)
    }

    /// Derive the type and colour layers from an elevation grid.
    pub fn classify(elevation: Grid<f32>, thresholds: &TerrainThresholds) -> Self {
        let (w, h) = (elevation.width, elevation.height);
        let mut types = Grid::new(w, h, TerrainType::default());
        let mut colors = Grid::new(w, h, Rgb::default());
        let row = (w as usize).max(1);

        types
            .cells_mut()
            .par_chunks_mut(row)
            .zip(colors.cells_mut().par_chunks_mut(row))
            .zip(elevation.cells().par_chunks(row))
            .for_each(|((type_row, color_row), heights)| {
                for ((t, c), &h) in type_row.iter_mut().zip(color_row.iter_mut()).zip(heights) {
                    *t = thresholds.classify(h);
                    *c = color_for(*t, h, thresholds);
                }
            });

        Self {
            elevation,
            types,
            colors,
        }
    }
}

/// Mountain count range for a map, scaled by area relative to the reference
/// size so the reference map keeps the configured bounds.
#[must_use]
pub fn mountain_count_bounds(width: u16, height: u16, params: &HeightmapConfig) -> (u32, u32) {
    let area = width as f64 * height as f64;
    let reference = params.reference_width as f64 * params.reference_height as f64;
    let scale = if reference > 0.0 { area / reference } else { 1.0 };
    let lo = ((params.min_mountains as f64 * scale) as u32).max(1);
    let hi = ((params.max_mountains as f64 * scale) as u32).max(lo);
    (lo, hi)
}

/// Add radial bumps, clamping each written cell against its current
/// 4-neighbours so overlapping mountains cannot spike. Returns the count.
fn place_mountains<R: Rng + ?Sized>(
    elevation: &mut Grid<f32>,
    params: &HeightmapConfig,
    rng: &mut R,
) -> u32 {
    let (w, h) = (elevation.width as i32, elevation.height as i32);
    let (lo, hi) = mountain_count_bounds(elevation.width, elevation.height, params);
    let count = rng.gen_range(lo..=hi);
    let shorter = w.min(h);
    let max_diff = params.max_height_difference;

    for _ in 0..count {
        let radius =
            (rng.gen_range(1..=shorter) as f32 * params.mountain_radius_factor) as i32;
        let peak = radius as f32 / params.mountain_height_divisor * params.mountain_height_factor;
        let cx = rng.gen_range(0..w);
        let cy = rng.gen_range(0..h);
        if radius <= 0 {
            continue;
        }

        let r = radius as f32;
        for y in (cy - radius).max(0)..=(cy + radius).min(h - 1) {
            for x in (cx - radius).max(0)..=(cx + radius).min(w - 1) {
                let dist = ((x - cx) as f32).hypot((y - cy) as f32);
                if dist > r {
                    continue;
                }
                let (lo_n, hi_n) = elevation
                    .neighbors_4(x, y)
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), (_, _, &v)| {
                        (lo.min(v), hi.max(v))
                    });
                if lo_n > hi_n {
                    continue;
                }
                let current = elevation.value_or_default(x, y);
                let raised = (current + peak * (1.0 - dist / r))
                    .min(hi_n + max_diff)
                    .max(lo_n - max_diff);
                elevation.set(x, y, raised);
            }
        }
    }
    count
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as i32;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Mirror an index into `0..n`, repeating the edge sample (`d c b a | a b c d`).
#[inline]
fn reflect(i: i32, n: i32) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - 1 - m }) as usize
}

/// Separable Gaussian blur with reflected edges.
pub fn gaussian_blur(grid: &Grid<f32>, sigma: f32) -> Grid<f32> {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i32;
    let (w, h) = (grid.width as usize, grid.height as usize);
    if w == 0 || h == 0 || kernel.len() == 1 {
        return grid.clone();
    }
    let src = grid.cells();

    let mut horizontal = vec![0.0f32; w * h];
    horizontal
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, out)| {
            let row = &src[y * w..(y + 1) * w];
            for (x, o) in out.iter_mut().enumerate() {
                *o = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &wgt)| wgt * row[reflect(x as i32 + k as i32 - radius, w as i32)])
                    .sum();
            }
        });

    let mut blurred = vec![0.0f32; w * h];
    blurred.par_chunks_mut(w).enumerate().for_each(|(y, out)| {
        for (x, o) in out.iter_mut().enumerate() {
            *o = kernel
                .iter()
                .enumerate()
                .map(|(k, &wgt)| {
                    let sy = reflect(y as i32 + k as i32 - radius, h as i32);
                    wgt * horizontal[sy * w + x]
                })
                .sum();
        }
    });

    Grid::from_cells(grid.width, grid.height, blurred).unwrap_or_else(|| grid.clone())
}

/// Pull every cell to within `max_diff` of each 8-neighbour, in place.
pub fn limit_slopes(elevation: &mut Grid<f32>, iterations: u32, max_diff: f32) {
    let (w, h) = (elevation.width as i32, elevation.height as i32);
    for _ in 0..iterations {
        for y in 0..h {
            for x in 0..w {
                for (dx, dy) in SMOOTHING_ORDER {
                    let Some(&neighbor) = elevation.get(x + dx, y + dy) else {
                        continue;
                    };
                    let Some(cell) = elevation.get_mut(x, y) else {
                        continue;
                    };
                    let diff = *cell - neighbor;
                    if diff.abs() > max_diff {
                        *cell = if diff > 0.0 {
                            neighbor + max_diff
                        } else {
                            neighbor - max_diff
                        };
                    }
                }
            }
        }
    }
}

/// Min-max rescale to `[0, 1]`. A flat grid is left untouched.
pub fn normalize(elevation: &mut Grid<f32>) {
    let (lo, hi) = elevation
        .cells()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if hi > lo {
        let span = hi - lo;
        for v in elevation.cells_mut() {
            *v = (*v - lo) / span;
        }
    }
}

/// Terrace `h` into bands of height `step`, easing each band edge with a
/// smoothstep, then clamp to `[0, 1]`.
#[must_use]
pub fn smooth_terrace(h: f32, step: f32) -> f32 {
    let scaled = h / step;
    let terraces = scaled.floor();
    let f = scaled - terraces;
    let eased = f * f * (3.0 - 2.0 * f);
    ((terraces + eased) * step).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_ranges_and_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let params = HeightmapConfig::default();
        let grid = TerrainGrid::generate(40, 25, &params, &mut rng);
        assert_eq!(grid.width(), 40);
        assert_eq!(grid.height(), 25);
        assert_eq!(grid.elevation.len(), 1000);
        assert!(grid.elevation.cells().iter().all(|h| (0.0..=1.0).contains(h)));
        for (x, y, &t) in grid.types.iter() {
            let h = grid.elevation_at(x as i32, y as i32);
            assert_eq!(t, params.thresholds.classify(h));
        }
    }

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let params = HeightmapConfig::default();
        let a = TerrainGrid::generate(20, 20, &params, &mut ChaCha8Rng::seed_from_u64(7));
        let b = TerrainGrid::generate(20, 20, &params, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_cell_map() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = TerrainGrid::generate(1, 1, &HeightmapConfig::default(), &mut rng);
        assert_eq!(grid.elevation.len(), 1);
        assert_eq!(grid.terrain_type_at(0, 0), Some(TerrainType::Water));
    }

    #[test]
    fn test_mountain_bounds_scale_with_area() {
        let params = HeightmapConfig::default();
        assert_eq!(mountain_count_bounds(30, 30, &params), (7, 20));
        assert_eq!(mountain_count_bounds(60, 30, &params), (14, 40));
        assert_eq!(mountain_count_bounds(10, 10, &params), (1, 2));
    }

    #[test]
    fn test_smooth_terrace_fixed_points() {
        assert_eq!(smooth_terrace(0.0, 1.0), 0.0);
        assert_eq!(smooth_terrace(0.5, 1.0), 0.5);
        assert_eq!(smooth_terrace(1.0, 1.0), 1.0);
        assert!(smooth_terrace(0.25, 1.0) < 0.25);
        assert!(smooth_terrace(0.75, 1.0) > 0.75);
    }

    #[test]
    fn test_normalize_flat_grid_is_noop() {
        let mut grid = Grid::new(3, 3, 0.4f32);
        normalize(&mut grid);
        assert!(grid.cells().iter().all(|&v| v == 0.4));

        let mut ramp = Grid::from_fn(4, 1, |x, _| x as f32 * 2.0);
        normalize(&mut ramp);
        assert_eq!(ramp.cells(), &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
    }

    #[test]
    fn test_limit_slopes_bounds_neighbour_difference() {
        // Cells are clamped in place, so earlier writes feed later cells.
        let mut grid = Grid::from_cells(3, 1, vec![0.0f32, 10.0, 0.0]).expect("shape");
        limit_slopes(&mut grid, 1, 1.0);
        assert_eq!(grid.cells(), &[9.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gaussian_blur_preserves_constant_and_mass_center() {
        let flat = Grid::new(6, 4, 3.0f32);
        let blurred = gaussian_blur(&flat, 2.0);
        assert!(blurred.cells().iter().all(|v| (v - 3.0).abs() < 1e-4));

        let mut spike = Grid::new(9, 9, 0.0f32);
        spike.set(4, 4, 1.0);
        let blurred = gaussian_blur(&spike, 1.0);
        let center = blurred.value_or_default(4, 4);
        assert!(blurred.cells().iter().all(|&v| v <= center));
        let total: f32 = blurred.cells().iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflect_repeats_edge() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(-9, 2), 0);
    }
}
