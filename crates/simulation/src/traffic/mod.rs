//! Vehicle and pedestrian agents that consume pathfinding results, move
//! across the grid, and rebuild the congestion layer the pathfinder reads.
//!
//! The tick is a fixed chain: movement, then emergency yield enforcement,
//! then the congestion rebuild that writes densities back into the grid.

mod state;
mod systems;
mod types;


pub use state::{traffic_stats, CongestionGrid, EntityPool, PedestrianPool, VehicleFleet};
pub use systems::{enforce_emergency_priority, move_entities, rebuild_congestion};
pub use types::{acceleration_for, EntityId, MoveState, MovingEntity, TrafficStats};

use bevy::prelude::*;

use crate::simulation_sets::SimulationSet;

pub struct TrafficPlugin;

impl Plugin for TrafficPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VehicleFleet>()
            .init_resource::<PedestrianPool>()
            .init_resource::<CongestionGrid>()
            .add_systems(
                FixedUpdate,
                (move_entities, enforce_emergency_priority, rebuild_congestion)
                    .chain()
                    .in_set(SimulationSet::Simulation),
            );
    }
}
