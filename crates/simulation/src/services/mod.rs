//! City services: coverage maps, the demand model, and the emergency
//! dispatcher. Incident resolution is scheduled against simulated time so
//! runs are reproducible under a fixed seed.

mod state;
mod systems;
mod types;


pub use state::{CityServices, CoverageMap};
pub use systems::{dispatch_emergencies, update_service_demand};
pub use types::{
    EmergencyEvent, EmergencyId, EmergencyKind, ServiceBuilding, ServiceBuildingId, ServiceStats,
    ServiceType,
};

use bevy::prelude::*;

use crate::simulation_sets::SimulationSet;

pub struct ServicesPlugin;

impl Plugin for ServicesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityServices>().add_systems(
            FixedUpdate,
            (update_service_demand, dispatch_emergencies)
                .chain()
                .in_set(SimulationSet::Simulation),
        );
    }
}
