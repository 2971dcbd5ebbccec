use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pathfind::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveState {
    #[default]
    Parked,
    Moving,
    Waiting,
    Arrived,
}

/// How fast a kind changes speed, in cells per second squared.
pub fn acceleration_for(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Car => 1.5,
        EntityKind::Bus => 0.8,
        EntityKind::Truck => 1.0,
        EntityKind::Emergency => 2.5,
        EntityKind::Pedestrian => 0.6,
    }
}

/// A vehicle or pedestrian following a grid path with continuous position.
#[derive(Debug, Clone)]
pub struct MovingEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub destination: (usize, usize),
    pub path: Vec<(usize, usize)>,
    /// Next waypoint to reach. Invariant: `path_index <= path.len()`.
    pub path_index: usize,
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub state: MoveState,
    pub wait_time_ms: f32,
}

impl MovingEntity {
    pub fn new(id: EntityId, kind: EntityKind, origin: (usize, usize), destination: (usize, usize)) -> Self {
        Self {
            id,
            kind,
            position: Vec2::new(origin.0 as f32, origin.1 as f32),
            destination,
            path: Vec::new(),
            path_index: 0,
            speed: 0.0,
            max_speed: kind.base_speed(),
            acceleration: acceleration_for(kind),
            state: MoveState::Parked,
            wait_time_ms: 0.0,
        }
    }

    /// The grid cell the entity currently occupies.
    pub fn cell(&self) -> (usize, usize) {
        (
            self.position.x.round().max(0.0) as usize,
            self.position.y.round().max(0.0) as usize,
        )
    }

    pub fn next_waypoint(&self) -> Option<(usize, usize)> {
        self.path.get(self.path_index).copied()
    }

    pub fn at_path_end(&self) -> bool {
        self.path_index >= self.path.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficStats {
    pub vehicles: usize,
    pub pedestrians: usize,
    pub average_speed: f32,
    pub average_wait_ms: f32,
    /// Cells with congestion above 0.7.
    pub congested_cells: usize,
}
