use crate::resource::ResourceField;
use crate::terrain::TerrainGrid;
use terrarium_data::Position;

/// Nearest resource cell within `range` of `from` that is no higher than the
/// ground under the viewer. Ties keep the first cell in row-major order.
pub fn find_nearest_resource(
    from: Position,
    terrain: &TerrainGrid,
    resources: &ResourceField,
    range: f64,
) -> Option<(i32, i32)> {
    let (cx, cy) = from.cell();
    let eye = terrain.elevation_at(cx, cy);

    let mut nearest = None;
    let mut best = f64::INFINITY;
    for (x, y, &amount) in resources.amounts.iter() {
        if amount <= 0.0 {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        let distance = (from.x - x as f64).hypot(from.y - y as f64);
        if distance > range || terrain.elevation_at(x, y) > eye {
            continue;
        }
        if distance < best {
            best = distance;
            nearest = Some((x, y));
        }
    }
    nearest
}
