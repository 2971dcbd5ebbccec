//! Grid city simulation engine: pathfinding, roads and traffic, zoning and
//! demand, city services with emergency dispatch, and public transit, all
//! advancing on a shared fixed tick.
//!
//! The engine is headless. Rendering, persistence, and the management layer
//! live elsewhere and talk to it through resources: [`grid::WorldGrid`],
//! [`pathfind::Pathfinder`], [`roads::RoadNetwork`], the traffic pools,
//! [`zoning::ZoneMap`], [`services::CityServices`], and
//! [`transit::TransitNetwork`].

use bevy::prelude::*;

pub mod buildings;
pub mod clock;
pub mod config;
pub mod grid;
pub mod params;
pub mod pathfind;
pub mod roads;
pub mod services;
pub mod sim_rng;
pub mod simulation_sets;
pub mod traffic;
pub mod transit;
pub mod zoning;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented each FixedUpdate.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

/// Shared throttle for grid-wide systems that don't need to run every tick
/// (zoning formulas, service demand, road wear).
#[derive(Resource, Default)]
pub struct SlowTickTimer {
    pub counter: u32,
}

impl SlowTickTimer {
    /// Slow systems run every 100 ticks (~10 simulated seconds at 10Hz).
    pub const INTERVAL: u32 = 100;

    pub fn tick(&mut self) {
        self.counter += 1;
    }

    pub fn should_run(&self) -> bool {
        self.counter.is_multiple_of(Self::INTERVAL)
    }
}

pub fn tick_slow_timer(mut timer: ResMut<SlowTickTimer>, mut tick: ResMut<TickCounter>) {
    timer.tick();
    tick.0 = tick.0.wrapping_add(1);
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Shared state every subsystem reads.
        app.init_resource::<TickCounter>()
            .init_resource::<SlowTickTimer>()
            .init_resource::<grid::WorldGrid>()
            .init_resource::<pathfind::Pathfinder>()
            .init_resource::<clock::SimClock>()
            .init_resource::<sim_rng::SimRng>()
            .init_resource::<params::SimParams>()
            .init_resource::<buildings::BuildingRegistry>();

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (tick_slow_timer, clock::tick_sim_clock).in_set(SimulationSet::PreSim),
        );

        app.add_plugins((
            roads::RoadsPlugin,
            traffic::TrafficPlugin,
            zoning::ZoningPlugin,
            services::ServicesPlugin,
            transit::TransitPlugin,
        ));
    }
}
