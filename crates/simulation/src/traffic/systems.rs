use bevy::prelude::*;

use crate::clock::SimClock;
use crate::config::TICK_MS;
use crate::grid::WorldGrid;
use crate::pathfind::{EntityKind, Pathfinder};
use crate::roads::RoadNetwork;

use super::state::{CongestionGrid, PedestrianPool, VehicleFleet};
use super::types::{EntityId, MoveState};

/// System: advance every vehicle and pedestrian by one tick. Vehicles see a
/// pre-step snapshot of each other for the proximity check; pedestrians pass
/// each other freely and only stop for signals.
pub fn move_entities(
    grid: Res<WorldGrid>,
    network: Res<RoadNetwork>,
    clock: Res<SimClock>,
    mut pathfinder: ResMut<Pathfinder>,
    mut vehicles: ResMut<VehicleFleet>,
    mut pedestrians: ResMut<PedestrianPool>,
) {
    let blockers: Vec<(EntityId, Vec2, bool)> = vehicles
        .0
        .iter()
        .map(|e| (e.id, e.position, e.kind == EntityKind::Emergency))
        .collect();
    vehicles
        .0
        .step_all(&grid, &network, &mut pathfinder, &clock, &blockers, TICK_MS);
    pedestrians
        .0
        .step_all(&grid, &network, &mut pathfinder, &clock, &[], TICK_MS);
}

/// System: active emergency vehicles force non-emergency vehicles within a
/// 3-cell radius to yield. Runs after movement so the yield holds through the
/// congestion rebuild.
pub fn enforce_emergency_priority(mut vehicles: ResMut<VehicleFleet>) {
    let sirens: Vec<Vec2> = vehicles
        .0
        .iter()
        .filter(|e| e.kind == EntityKind::Emergency && e.state == MoveState::Moving)
        .map(|e| e.position)
        .collect();
    if sirens.is_empty() {
        return;
    }
    for entity in vehicles.0.iter_mut() {
        if entity.kind == EntityKind::Emergency {
            continue;
        }
        if sirens.iter().any(|s| s.distance(entity.position) <= 3.0) {
            entity.speed = 0.0;
            entity.state = MoveState::Waiting;
        }
    }
}

/// System: rebuild the congestion grid from entity positions and push it into
/// the shared grid. Waiting entities weigh 0.8, moving 0.3, clamped at 1.0.
pub fn rebuild_congestion(
    mut congestion: ResMut<CongestionGrid>,
    mut grid: ResMut<WorldGrid>,
    vehicles: Res<VehicleFleet>,
    pedestrians: Res<PedestrianPool>,
) {
    congestion.clear();
    for entity in vehicles.0.iter().chain(pedestrians.0.iter()) {
        let load = match entity.state {
            MoveState::Waiting => 0.8,
            MoveState::Moving => 0.3,
            MoveState::Parked | MoveState::Arrived => continue,
        };
        let (x, y) = entity.cell();
        congestion.add(x, y, load);
    }
    congestion.apply_to(&mut grid);
}
