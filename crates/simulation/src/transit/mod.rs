//! Public transport: stop graph, route planning over it, capacity-limited
//! vehicles, and passenger patience. The stop graph is its own network,
//! deliberately independent of roads.

mod state;
mod systems;
mod types;

#[cfg(test)]
mod tests;

pub use state::TransitNetwork;
pub use systems::update_transit;
pub use types::{
    Passenger, PassengerId, RouteId, StopId, TransitMode, TransitRoute, TransitStats, TransitStop,
    TransitVehicle, TransitVehicleId,
};

use bevy::prelude::*;

use crate::simulation_sets::SimulationSet;

pub struct TransitPlugin;

impl Plugin for TransitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitNetwork>()
            .add_systems(FixedUpdate, update_transit.in_set(SimulationSet::PostSim));
    }
}
