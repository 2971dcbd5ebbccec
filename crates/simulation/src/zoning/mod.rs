//! Zoning and demand modeling: bulk zone placement, citywide demand curves,
//! per-cell happiness/pollution/development, and land-value diffusion.

mod state;
mod systems;
mod types;

#[cfg(test)]
mod tests;

pub use state::ZoneMap;
pub use systems::update_zones;
pub use types::{
    DemandLevels, GlobalFactors, ZoneAreaResult, ZoneCell, ZoneDemand, ZoneDensity, ZoneStats,
    ZoneType,
};

use bevy::prelude::*;

use crate::simulation_sets::SimulationSet;

pub struct ZoningPlugin;

impl Plugin for ZoningPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoneMap>().add_systems(
            FixedUpdate,
            // Demand must settle before traffic and services read it.
            update_zones.in_set(SimulationSet::PreSim),
        );
    }
}
