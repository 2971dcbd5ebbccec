//! Road network: segment storage, construction validation, the intersection
//! graph, and traffic-light phase cycling.
//!
//! Construction is a two-step `plan` (pure validation producing a blueprint)
//! then `construct` (mutates the grid, wires intersections, clears the path
//! cache). Removal reverses the grid marks and prunes intersections that drop
//! below two connected segments.

mod state;
mod systems;
mod types;

#[cfg(test)]
mod tests;

pub use state::RoadNetwork;
pub use systems::{cycle_traffic_lights, decay_road_condition};
pub use types::{
    bresenham_line, Intersection, IntersectionId, LightPhase, NetworkStats, RoadBlueprint, RoadId,
    RoadSegment,
};

use bevy::prelude::*;

use crate::simulation_sets::SimulationSet;

pub struct RoadsPlugin;

impl Plugin for RoadsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadNetwork>().add_systems(
            FixedUpdate,
            // Lights are purely time-driven; phases must settle before the
            // traffic simulation checks them this tick.
            (cycle_traffic_lights, decay_road_condition).in_set(SimulationSet::PreSim),
        );
    }
}
