use crate::buildings::{Building, BuildingKind};
use crate::grid::{RoadType, WorldGrid};
use crate::params::ZoningParams;
use crate::pathfind::GridRect;

use super::state::ZoneMap;
use super::types::*;

fn rect(x0: usize, y0: usize, x1: usize, y1: usize) -> GridRect {
    GridRect { x0, y0, x1, y1 }
}

#[test]
fn test_new_residential_cell_initial_values() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    let result = zones.zone_area(&grid, rect(10, 10, 10, 10), ZoneType::Residential, ZoneDensity::Low);
    assert!(result.success);
    assert_eq!(result.cells_zoned, 1);

    let cell = zones.zone_at(10, 10).unwrap();
    assert_eq!(cell.demand, 60.0);
    assert_eq!(cell.level, 1);
    assert_eq!(cell.happiness, 50.0);
    assert_eq!(cell.land_value, 100.0);
    assert_eq!(cell.pollution, 0.0);
}

#[test]
fn test_zone_area_rejects_out_of_bounds() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    let result = zones.zone_area(&grid, rect(120, 120, 500, 500), ZoneType::Commercial, ZoneDensity::Low);
    assert!(!result.success);
    assert_eq!(result.reason, Some("out of bounds"));
    assert!(zones.zone_at(120, 120).is_none());
}

#[test]
fn test_residential_industrial_exclusivity() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    assert!(zones
        .zone_area(&grid, rect(5, 5, 8, 8), ZoneType::Industrial, ZoneDensity::Low)
        .success);

    // Overlapping residential is rejected whole, leaving no partial zoning.
    let result = zones.zone_area(&grid, rect(7, 7, 12, 12), ZoneType::Residential, ZoneDensity::Low);
    assert!(!result.success);
    assert_eq!(result.reason, Some("incompatible zone type"));
    assert!(zones.zone_at(12, 12).is_none());
    assert_eq!(zones.zone_at(7, 7).unwrap().zone_type, ZoneType::Industrial);

    // Commercial over industrial is allowed; existing cells keep their type.
    let result = zones.zone_area(&grid, rect(7, 7, 12, 12), ZoneType::Commercial, ZoneDensity::Low);
    assert!(result.success);
    assert_eq!(zones.zone_at(7, 7).unwrap().zone_type, ZoneType::Industrial);
    assert_eq!(zones.zone_at(12, 12).unwrap().zone_type, ZoneType::Commercial);
}

#[test]
fn test_mixed_is_always_compatible() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    assert!(zones
        .zone_area(&grid, rect(5, 5, 6, 6), ZoneType::Mixed, ZoneDensity::Medium)
        .success);
    assert!(zones
        .zone_area(&grid, rect(5, 5, 6, 6), ZoneType::Residential, ZoneDensity::Low)
        .success);
    assert!(zones
        .zone_area(&grid, rect(5, 5, 6, 6), ZoneType::Industrial, ZoneDensity::Low)
        .success);
}

#[test]
fn test_unzone_area() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(5, 5, 7, 7), ZoneType::Commercial, ZoneDensity::Low);
    assert_eq!(zones.unzone_area(rect(5, 5, 6, 6)), 4);
    assert!(zones.zone_at(5, 5).is_none());
    assert!(zones.zone_at(7, 7).is_some());
}

#[test]
fn test_pollution_falloff_from_industry() {
    let grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(20, 20, 20, 20), ZoneType::Commercial, ZoneDensity::Low);
    zones.zone_area(&grid, rect(40, 20, 40, 20), ZoneType::Commercial, ZoneDensity::Low);

    let factory = Building::new(BuildingKind::Factory, 25, 20);
    zones.update(&params, &grid, &[factory]);

    // Distance 5 from the factory: 50 - 3*5 = 35.
    let near = zones.zone_at(20, 20).unwrap();
    assert!((near.pollution - 35.0).abs() < 0.01);
    // Distance 15 contributes 50 - 45 = 5; distance 16+ would be zero.
    let far = zones.zone_at(40, 20).unwrap();
    assert!((far.pollution - 5.0).abs() < 0.01);
    assert!(near.happiness < far.happiness);
}

#[test]
fn test_service_flags_from_buildings_and_roads() {
    let mut grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(30, 30, 30, 30), ZoneType::Residential, ZoneDensity::Low);

    let mut network = crate::roads::RoadNetwork::default();
    let mut pathfinder = crate::pathfind::Pathfinder::default();
    let bp = network.plan_road(&grid, RoadType::Street, (28, 30), (28, 40));
    network.construct_road(&mut grid, &mut pathfinder, &bp).unwrap();

    let buildings = [
        Building::new(BuildingKind::PowerPlant, 35, 30),
        Building::new(BuildingKind::WaterTower, 30, 35),
        Building::new(BuildingKind::School, 32, 32),
    ];
    zones.update(&params, &grid, &buildings);

    let cell = zones.zone_at(30, 30).unwrap();
    assert!(cell.powered);
    assert!(cell.watered);
    assert!(cell.services_nearby);
    assert!(cell.road_access);
    assert_eq!(cell.satisfied_flags(), 4);
    // Four satisfied flags, no pollution: happiness rises above base.
    assert!(cell.happiness > 50.0);
}

#[test]
fn test_unserved_cell_has_lower_demand_than_served() {
    let grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(10, 10, 10, 10), ZoneType::Residential, ZoneDensity::Low);
    zones.zone_area(&grid, rect(100, 100, 100, 100), ZoneType::Residential, ZoneDensity::Low);

    let buildings = [
        Building::new(BuildingKind::PowerPlant, 12, 10),
        Building::new(BuildingKind::WaterTower, 10, 12),
        Building::new(BuildingKind::School, 11, 11),
    ];
    zones.update(&params, &grid, &buildings);

    let served = zones.zone_at(10, 10).unwrap();
    let unserved = zones.zone_at(100, 100).unwrap();
    assert!(served.satisfied_flags() > unserved.satisfied_flags());
    assert!(served.demand > unserved.demand);
}

#[test]
fn test_global_factors_from_buildings() {
    let grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();

    let mut house = Building::new(BuildingKind::House, 5, 5);
    house.population = 100;
    let mut office = Building::new(BuildingKind::Office, 6, 5);
    office.jobs = 60;
    zones.update(&params, &grid, &[house, office]);

    let factors = zones.global_factors();
    assert_eq!(factors.population, 100);
    assert_eq!(factors.jobs, 60);
    assert!((factors.employment_rate - 0.6).abs() < f32::EPSILON);
    assert!(factors.economy_index > 0.0 && factors.economy_index <= 1.0);
}

#[test]
fn test_demand_curves_denser_tiers_lower() {
    let grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();
    let mut house = Building::new(BuildingKind::House, 5, 5);
    house.population = 500;
    let mut office = Building::new(BuildingKind::Office, 6, 5);
    office.jobs = 500;
    zones.update(&params, &grid, &[house, office]);

    let demand = zones.demand();
    assert!(demand.low.residential > demand.medium.residential);
    assert!(demand.medium.residential > demand.high.residential);
}

#[test]
fn test_land_value_diffuses_toward_neighbors() {
    let grid = WorldGrid::default();
    let params = ZoningParams::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(50, 50, 54, 54), ZoneType::Residential, ZoneDensity::Low);

    // A civic cluster near one corner raises happiness there, pulling its
    // land value up; smoothing then drags neighbors along over updates.
    let buildings = [
        Building::new(BuildingKind::Park, 50, 50),
        Building::new(BuildingKind::School, 51, 50),
        Building::new(BuildingKind::PowerPlant, 50, 51),
        Building::new(BuildingKind::WaterTower, 51, 51),
    ];
    for _ in 0..10 {
        zones.update(&params, &grid, &buildings);
    }
    let corner = zones.zone_at(50, 50).unwrap().land_value;
    assert!(corner > 100.0, "served corner should appreciate, got {corner}");
}

#[test]
fn test_zone_stats() {
    let grid = WorldGrid::default();
    let mut zones = ZoneMap::default();
    zones.zone_area(&grid, rect(5, 5, 6, 5), ZoneType::Residential, ZoneDensity::Low);
    zones.zone_area(&grid, rect(10, 5, 10, 5), ZoneType::Industrial, ZoneDensity::High);

    let stats = zones.zone_stats();
    assert_eq!(stats.total_cells, 3);
    assert_eq!(stats.residential, 2);
    assert_eq!(stats.industrial, 1);
    assert!((stats.average_happiness - 50.0).abs() < f32::EPSILON);
    assert!((stats.average_level - 1.0).abs() < f32::EPSILON);
    assert_eq!(zones.zones_of_type(ZoneType::Residential).count(), 2);
}
