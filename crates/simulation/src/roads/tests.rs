use crate::clock::SimClock;
use crate::config::LIGHT_CYCLE_MS;
use crate::grid::{RoadType, WorldGrid};
use crate::pathfind::{EntityKind, PathRequest, Pathfinder};

use super::types::*;
use super::RoadNetwork;

fn setup() -> (WorldGrid, RoadNetwork, Pathfinder) {
    (WorldGrid::default(), RoadNetwork::default(), Pathfinder::default())
}

#[test]
fn test_bresenham_straight_and_diagonal() {
    let line = bresenham_line((2, 2), (6, 2));
    assert_eq!(line, vec![(2, 2), (3, 2), (4, 2), (5, 2), (6, 2)]);

    let diag = bresenham_line((0, 0), (3, 3));
    assert_eq!(diag, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}

#[test]
fn test_plan_is_pure() {
    let (grid, network, _) = setup();
    let bp = network.plan_road(&grid, RoadType::Street, (5, 5), (15, 5));
    assert!(bp.valid);
    assert_eq!(bp.path.len(), 11);
    // Nothing was mutated.
    assert!(!grid.get(5, 5).walkable);
    assert_eq!(network.network_stats().segments, 0);
}

#[test]
fn test_plan_rejects_out_of_bounds() {
    let (grid, network, _) = setup();
    let bp = network.plan_road(&grid, RoadType::Street, (5, 5), (9999, 5));
    assert!(!bp.valid);
    assert_eq!(bp.reason, Some("out of bounds"));
}

#[test]
fn test_plan_rejects_too_short() {
    let (grid, network, _) = setup();
    let bp = network.plan_road(&grid, RoadType::Street, (5, 5), (5, 5));
    assert!(!bp.valid);
    assert_eq!(bp.reason, Some("road too short"));
}

#[test]
fn test_plan_rejects_type_max_length() {
    let (grid, network, _) = setup();
    // Street max length is 40 cells.
    let bp = network.plan_road(&grid, RoadType::Street, (0, 5), (60, 5));
    assert!(!bp.valid);
    assert_eq!(bp.reason, Some("exceeds maximum length"));
    // The same span is fine as a highway.
    let bp = network.plan_road(&grid, RoadType::Highway, (0, 5), (60, 5));
    assert!(bp.valid);
}

#[test]
fn test_plan_rejects_mid_path_conflict() {
    let (mut grid, mut network, mut pf) = setup();
    let bp = network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10));
    network.construct_road(&mut grid, &mut pf, &bp).unwrap();

    // A road crossing mid-path over the existing one conflicts.
    let crossing = network.plan_road(&grid, RoadType::Street, (10, 5), (10, 15));
    assert!(!crossing.valid);
    assert_eq!(crossing.reason, Some("conflicts with existing road"));
}

#[test]
fn test_construct_invalid_blueprint_is_noop() {
    let (mut grid, mut network, mut pf) = setup();
    let bp = network.plan_road(&grid, RoadType::Street, (5, 5), (5, 5));
    assert!(network.construct_road(&mut grid, &mut pf, &bp).is_none());
    assert_eq!(network.network_stats().segments, 0);
}

#[test]
fn test_construct_marks_grid() {
    let (mut grid, mut network, mut pf) = setup();
    let bp = network.plan_road(&grid, RoadType::Avenue, (5, 5), (10, 5));
    let id = network.construct_road(&mut grid, &mut pf, &bp).unwrap();

    let segment = network.get(id).unwrap();
    for &(x, y) in &segment.path {
        assert!(grid.get(x, y).walkable);
        assert_eq!(grid.get(x, y).road_type, Some(RoadType::Avenue));
    }
    assert_eq!(segment.lanes, RoadType::Avenue.lanes());
    assert_eq!(segment.speed_limit, RoadType::Avenue.speed_limit());
}

#[test]
fn test_two_roads_meeting_form_one_unsignalized_intersection() {
    let (mut grid, mut network, mut pf) = setup();
    // Two length-5 streets meeting at a right angle at (9, 5).
    let a = network.plan_road(&grid, RoadType::Street, (5, 5), (9, 5));
    network.construct_road(&mut grid, &mut pf, &a).unwrap();
    let b = network.plan_road(&grid, RoadType::Street, (9, 5), (9, 9));
    network.construct_road(&mut grid, &mut pf, &b).unwrap();

    let intersections: Vec<_> = network.all_intersections().collect();
    assert_eq!(intersections.len(), 1);
    let junction = intersections[0];
    assert_eq!(junction.position, (9, 5));
    assert_eq!(junction.connected_roads.len(), 2);
    assert!(!junction.traffic_lights, "lights require three connections");
}

#[test]
fn test_three_way_junction_gets_lights() {
    let (mut grid, mut network, mut pf) = setup();
    let a = network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10));
    network.construct_road(&mut grid, &mut pf, &a).unwrap();
    let b = network.plan_road(&grid, RoadType::Street, (5, 10), (5, 20));
    network.construct_road(&mut grid, &mut pf, &b).unwrap();
    let c = network.plan_road(&grid, RoadType::Street, (5, 10), (5, 2));
    network.construct_road(&mut grid, &mut pf, &c).unwrap();

    let junction = network.intersection_at(5, 10).unwrap();
    assert_eq!(junction.connected_roads.len(), 3);
    assert!(junction.traffic_lights);
}

#[test]
fn test_light_phase_cycles() {
    let (mut grid, mut network, mut pf) = setup();
    for bp in [
        network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10)),
        network.plan_road(&grid, RoadType::Street, (5, 10), (5, 20)),
        network.plan_road(&grid, RoadType::Street, (5, 10), (5, 2)),
    ] {
        network.construct_road(&mut grid, &mut pf, &bp).unwrap();
    }
    assert_eq!(network.intersection_at(5, 10).unwrap().phase, LightPhase::NorthSouth);

    network.tick_lights(LIGHT_CYCLE_MS);
    assert_eq!(network.intersection_at(5, 10).unwrap().phase, LightPhase::EastWest);
    network.tick_lights(LIGHT_CYCLE_MS);
    assert_eq!(network.intersection_at(5, 10).unwrap().phase, LightPhase::AllStop);
    network.tick_lights(LIGHT_CYCLE_MS);
    assert_eq!(network.intersection_at(5, 10).unwrap().phase, LightPhase::NorthSouth);
}

#[test]
fn test_light_blocks_by_axis() {
    let (mut grid, mut network, mut pf) = setup();
    for bp in [
        network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10)),
        network.plan_road(&grid, RoadType::Street, (5, 10), (5, 20)),
        network.plan_road(&grid, RoadType::Street, (5, 10), (5, 2)),
    ] {
        network.construct_road(&mut grid, &mut pf, &bp).unwrap();
    }
    // NorthSouth phase: vertical movement passes, horizontal waits.
    assert!(!network.light_blocks(5, 10, 0, 1));
    assert!(network.light_blocks(5, 10, 1, 0));
    // AllStop blocks everything.
    network.tick_lights(LIGHT_CYCLE_MS * 2.0);
    assert!(network.light_blocks(5, 10, 0, 1));
    assert!(network.light_blocks(5, 10, 1, 0));
    // Unsignalized cells never block.
    assert!(!network.light_blocks(8, 10, 1, 0));
}

#[test]
fn test_remove_road_reverses_grid_and_prunes_intersection() {
    let (mut grid, mut network, mut pf) = setup();
    let a = network.plan_road(&grid, RoadType::Street, (5, 5), (9, 5));
    let a_id = network.construct_road(&mut grid, &mut pf, &a).unwrap();
    let b = network.plan_road(&grid, RoadType::Street, (9, 5), (9, 9));
    let b_id = network.construct_road(&mut grid, &mut pf, &b).unwrap();
    assert_eq!(network.all_intersections().count(), 1);

    assert!(network.remove_road(&mut grid, &mut pf, b_id));
    // The intersection dropped below two connections and disappeared.
    assert_eq!(network.all_intersections().count(), 0);
    // B's exclusive cells are reset; the shared cell still carries A.
    assert!(!grid.get(9, 9).walkable);
    assert!(grid.get(9, 5).walkable);
    assert_eq!(network.road_at(9, 5).unwrap().id, a_id);
    // A no longer lists B as connected.
    assert!(network.get(a_id).unwrap().connected.is_empty());
}

#[test]
fn test_remove_unknown_id_is_rejected() {
    let (mut grid, mut network, mut pf) = setup();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        network.remove_road(&mut grid, &mut pf, RoadId(999))
    }));
    // Debug builds assert; release builds return false.
    if let Ok(returned) = result {
        assert!(!returned);
    }
}

#[test]
fn test_construction_invalidates_path_cache() {
    let (mut grid, mut network, mut pf) = setup();
    let clock = SimClock::default();
    let a = network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10));
    network.construct_road(&mut grid, &mut pf, &a).unwrap();

    let req = PathRequest::new((5, 10), (15, 10), EntityKind::Car);
    pf.find_path(&grid, &clock, &req);
    assert_eq!(pf.cached_entries(), 1);

    let b = network.plan_road(&grid, RoadType::Street, (5, 10), (5, 20));
    network.construct_road(&mut grid, &mut pf, &b).unwrap();
    assert_eq!(pf.cached_entries(), 0, "construction must clear the cache");
}

#[test]
fn test_removal_changes_path_result() {
    let (mut grid, mut network, mut pf) = setup();
    let clock = SimClock::default();
    let a = network.plan_road(&grid, RoadType::Street, (5, 10), (15, 10));
    let a_id = network.construct_road(&mut grid, &mut pf, &a).unwrap();

    let req = PathRequest::new((5, 10), (15, 10), EntityKind::Car);
    assert!(pf.find_path(&grid, &clock, &req).success);

    network.remove_road(&mut grid, &mut pf, a_id);
    let after = pf.find_path(&grid, &clock, &req);
    assert!(!after.success, "removed road must not satisfy cached path");
}

#[test]
fn test_network_stats() {
    let (mut grid, mut network, mut pf) = setup();
    let a = network.plan_road(&grid, RoadType::Street, (5, 5), (9, 5));
    network.construct_road(&mut grid, &mut pf, &a).unwrap();
    let b = network.plan_road(&grid, RoadType::Street, (9, 5), (9, 9));
    network.construct_road(&mut grid, &mut pf, &b).unwrap();

    let stats = network.network_stats();
    assert_eq!(stats.segments, 2);
    assert_eq!(stats.intersections, 1);
    assert_eq!(stats.signalized_intersections, 0);
    assert_eq!(stats.total_length_cells, 10);
    assert!((stats.average_condition - 100.0).abs() < f32::EPSILON);
}
