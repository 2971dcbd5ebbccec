use std::collections::HashMap;

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::grid::WorldGrid;
use crate::pathfind::{EntityKind, PathRequest, Pathfinder};
use crate::roads::RoadNetwork;

use super::types::*;

/// Another entity closer than this (in cells) blocks forward movement.
const BLOCK_DISTANCE: f32 = 2.0;

/// What one tick did with an entity.
enum StepOutcome {
    Keep,
    NeedsPath,
    Arrived,
}

/// Owns a set of moving entities and steps them along their paths. Wrapped by
/// [`VehicleFleet`] and [`PedestrianPool`]; the two pools never share ids.
#[derive(Default)]
pub struct EntityPool {
    entities: HashMap<EntityId, MovingEntity>,
    next_id: u32,
}

impl EntityPool {
    /// Create an entity and request a path immediately. A pathless entity is
    /// still stored and retried on later ticks.
    pub fn spawn(
        &mut self,
        kind: EntityKind,
        origin: (usize, usize),
        destination: (usize, usize),
        grid: &WorldGrid,
        pathfinder: &mut Pathfinder,
        clock: &SimClock,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let mut entity = MovingEntity::new(id, kind, origin, destination);
        let result = pathfinder.find_path(grid, clock, &PathRequest::new(origin, destination, kind));
        if result.success {
            entity.path = result.path;
            entity.state = MoveState::Moving;
        }
        self.entities.insert(id, entity);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_none() {
            warn!("remove: unknown entity id {id:?}");
            return false;
        }
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&MovingEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut MovingEntity> {
        self.entities.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovingEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MovingEntity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Advance every entity by one tick. `blockers` is a position snapshot
    /// (taken before stepping, so all entities see the same world) used for
    /// the proximity check; pass an empty slice to disable it.
    pub fn step_all(
        &mut self,
        grid: &WorldGrid,
        network: &RoadNetwork,
        pathfinder: &mut Pathfinder,
        clock: &SimClock,
        blockers: &[(EntityId, Vec2, bool)],
        dt_ms: f32,
    ) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        let mut arrived = Vec::new();

        for id in ids {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            match step_entity(entity, grid, network, blockers, dt_ms) {
                StepOutcome::Keep => {}
                StepOutcome::Arrived => arrived.push(id),
                StepOutcome::NeedsPath => {
                    let request =
                        PathRequest::new(entity.cell(), entity.destination, entity.kind);
                    let result = pathfinder.find_path(grid, clock, &request);
                    if result.success {
                        entity.path = result.path;
                        entity.path_index = 0;
                        entity.state = MoveState::Moving;
                    } else {
                        entity.path.clear();
                        entity.path_index = 0;
                        entity.speed = 0.0;
                        entity.state = MoveState::Parked;
                    }
                }
            }
        }
        for id in arrived {
            self.entities.remove(&id);
        }
    }
}

/// One movement tick for one entity. Blocked entities decelerate and wait;
/// unblocked entities chase the road's congestion-scaled speed limit and snap
/// to the waypoint when within one step.
fn step_entity(
    entity: &mut MovingEntity,
    grid: &WorldGrid,
    network: &RoadNetwork,
    blockers: &[(EntityId, Vec2, bool)],
    dt_ms: f32,
) -> StepOutcome {
    debug_assert!(entity.path_index <= entity.path.len());

    if entity.path.is_empty() || entity.at_path_end() {
        if entity.cell() == entity.destination {
            entity.state = MoveState::Arrived;
            return StepOutcome::Arrived;
        }
        return StepOutcome::NeedsPath;
    }

    let dt = dt_ms / 1000.0;
    let (cx, cy) = entity.cell();
    let Some((nx, ny)) = entity.next_waypoint() else {
        return StepOutcome::NeedsPath;
    };

    let dx = (nx as i64 - cx as i64).signum() as i32;
    let dy = (ny as i64 - cy as i64).signum() as i32;
    let red_light = network.light_blocks(nx, ny, dx, dy);

    let is_emergency = entity.kind == EntityKind::Emergency;
    let crowded = blockers.iter().any(|&(other_id, pos, other_emergency)| {
        if other_id == entity.id {
            return false;
        }
        // Emergency vehicles drive through non-emergency blockers.
        if is_emergency && !other_emergency {
            return false;
        }
        pos.distance(entity.position) < BLOCK_DISTANCE
    });

    if red_light || crowded {
        entity.speed = (entity.speed - entity.acceleration * dt).max(0.0);
        entity.wait_time_ms += dt_ms;
        entity.state = MoveState::Waiting;
        return StepOutcome::Keep;
    }

    let next_cell = grid.get(nx, ny);
    let limit = next_cell
        .road_type
        .map(|rt| rt.speed_limit())
        .unwrap_or(entity.max_speed);
    let target = (limit * (1.0 - next_cell.traffic_density * 0.7)).min(entity.max_speed);

    if entity.speed < target {
        entity.speed = (entity.speed + entity.acceleration * dt).min(target);
    } else {
        entity.speed = (entity.speed - entity.acceleration * dt).max(target);
    }

    let waypoint = Vec2::new(nx as f32, ny as f32);
    let delta = waypoint - entity.position;
    let distance = delta.length();
    let step = entity.speed * dt;
    if step >= distance {
        entity.position = waypoint;
        entity.path_index += 1;
    } else {
        entity.position += delta / distance * step;
    }
    entity.state = MoveState::Moving;

    if entity.at_path_end() && entity.cell() == entity.destination {
        entity.state = MoveState::Arrived;
        return StepOutcome::Arrived;
    }
    StepOutcome::Keep
}

#[derive(Resource, Default)]
pub struct VehicleFleet(pub EntityPool);

#[derive(Resource, Default)]
pub struct PedestrianPool(pub EntityPool);

/// Per-cell traffic load derived from entity positions. Rebuilt every tick
/// and pushed into [`WorldGrid`] densities, which the pathfinder reads; that
/// closed loop routes new paths around self-created jams.
#[derive(Resource)]
pub struct CongestionGrid {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl Default for CongestionGrid {
    fn default() -> Self {
        Self {
            values: vec![0.0; GRID_WIDTH * GRID_HEIGHT],
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl CongestionGrid {
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    pub fn add(&mut self, x: usize, y: usize, load: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        self.values[idx] = (self.values[idx] + load).min(1.0);
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.values[y * self.width + x]
    }

    pub fn congested_cells(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0.7).count()
    }

    /// Copy the rebuilt loads into the shared grid densities.
    pub fn apply_to(&self, grid: &mut WorldGrid) {
        debug_assert_eq!(grid.width, self.width);
        debug_assert_eq!(grid.height, self.height);
        for (cell, &load) in grid.cells.iter_mut().zip(&self.values) {
            cell.traffic_density = load;
        }
    }
}

pub fn traffic_stats(
    vehicles: &EntityPool,
    pedestrians: &EntityPool,
    congestion: &CongestionGrid,
) -> TrafficStats {
    let mut stats = TrafficStats {
        vehicles: vehicles.len(),
        pedestrians: pedestrians.len(),
        congested_cells: congestion.congested_cells(),
        ..Default::default()
    };
    let total = stats.vehicles + stats.pedestrians;
    if total > 0 {
        let mut speed_sum = 0.0;
        let mut wait_sum = 0.0;
        for e in vehicles.iter().chain(pedestrians.iter()) {
            speed_sum += e.speed;
            wait_sum += e.wait_time_ms;
        }
        stats.average_speed = speed_sum / total as f32;
        stats.average_wait_ms = wait_sum / total as f32;
    }
    stats
}
