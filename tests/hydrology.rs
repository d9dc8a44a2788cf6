mod common;

use common::WorldBuilder;
use terrarium_core::config::{HydrologyConfig, TerrainThresholds};
use terrarium_core::hydrology::{descent_flow, diffuse, WaterState};
use terrarium_core::terrain::TerrainGrid;
use terrarium_data::{Flow, TerrainType, WorldEvent};

fn pond(width: u16, height: u16) -> TerrainGrid {
    TerrainGrid::flat(width, height, 0.1, TerrainType::Water)
}

#[test]
fn test_isolated_water_dries_after_threshold() {
    let params = HydrologyConfig::default();
    let thresholds = TerrainThresholds::default();
    let mut terrain = TerrainGrid::flat(5, 5, 0.4, TerrainType::Grass);
    terrain.set_terrain_type(2, 2, TerrainType::Water, &thresholds);
    let mut water = WaterState::new(5, 5);

    // 5.0 is not strictly above the threshold.
    assert!(water.step(&mut terrain, 5.0, &params, &thresholds).is_empty());
    assert_eq!(terrain.terrain_type_at(2, 2), Some(TerrainType::Water));
    assert_eq!(water.dryness_at(2, 2), 5.0);

    let dried = water.step(&mut terrain, 0.5, &params, &thresholds);
    assert_eq!(dried, vec![(2, 2)]);
    assert_eq!(terrain.terrain_type_at(2, 2), Some(TerrainType::Grass));
    assert_eq!(water.dryness_at(2, 2), 0.0);
    assert_eq!(water.flow_at(2, 2), Flow::ZERO);
}

#[test]
fn test_connected_water_never_dries_and_erodes() {
    let params = HydrologyConfig::default();
    let thresholds = TerrainThresholds::default();
    let mut terrain = pond(4, 4);
    let mut water = WaterState::new(4, 4);

    for _ in 0..20 {
        assert!(water.step(&mut terrain, 5.0, &params, &thresholds).is_empty());
    }
    assert_eq!(terrain.count_type(TerrainType::Water), 16);
    // 20 steps of 5 s at 0.0005 per second.
    let expected = 0.1 - 20.0 * 5.0 * 0.0005;
    for &h in terrain.elevation.cells() {
        assert!((h - expected).abs() < 1e-5);
        assert!(h >= 0.0);
    }
}

#[test]
fn test_erosion_never_goes_below_zero() {
    let params = HydrologyConfig {
        erosion_rate: 1.0,
        ..HydrologyConfig::default()
    };
    let mut terrain = pond(3, 3);
    let mut water = WaterState::new(3, 3);
    water.step(&mut terrain, 10.0, &params, &TerrainThresholds::default());
    assert!(terrain.elevation.cells().iter().all(|&h| h == 0.0));
}

#[test]
fn test_flow_points_downhill_and_land_is_still() {
    let thresholds = TerrainThresholds::default();
    let mut terrain = pond(5, 1);
    for x in 0..5 {
        terrain.elevation.set(x, 0, 0.19 - x as f32 * 0.01);
    }
    terrain.set_terrain_type(0, 0, TerrainType::Sand, &thresholds);

    let raw = descent_flow(&terrain);
    assert_eq!(raw.value_or_default(0, 0), Flow::ZERO);
    let mid = raw.value_or_default(2, 0);
    assert!(mid.vx > 0.0);
    assert_eq!(mid.vy, 0.0);
    // The last cell is a pit.
    assert_eq!(raw.value_or_default(4, 0), Flow::ZERO);

    let mut water = WaterState::new(5, 1);
    water.step(&mut terrain, 0.1, &HydrologyConfig::default(), &thresholds);
    assert_eq!(water.flow_at(0, 0), Flow::ZERO);
    assert!(water.flow_at(2, 0).vx > 0.0);
}

#[test]
fn test_diffusion_zero_rate_is_identity() {
    let mut terrain = pond(4, 4);
    terrain.elevation.set(0, 0, 0.5);
    let raw = descent_flow(&terrain);
    assert_eq!(diffuse(&raw, 0.0), raw);
}

#[test]
fn test_world_reports_dried_cells() {
    let mut world = WorldBuilder::new()
        .with_terrain(4, 4, TerrainType::Water)
        .with_config(|c| c.schedule.water_interval = 3.0)
        .build();

    let mut dried = Vec::new();
    for _ in 0..100 {
        for event in world.step(0.1) {
            if let WorldEvent::CellDried { x, y, .. } = event {
                dried.push((x, y));
            }
        }
    }
    // Dryness accumulates 3 s per water step and trips on the second.
    assert_eq!(dried, vec![(4, 4)]);
    assert_eq!(world.terrain_type_at(4, 4), Some(TerrainType::Grass));
    assert_eq!(world.metrics().dried_cells(), 1);
}
