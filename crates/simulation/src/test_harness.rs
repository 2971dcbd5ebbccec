//! # TestCity — headless integration test harness
//!
//! A fluent builder wrapping `bevy::app::App` + [`SimulationPlugin`] for
//! driving the engine in tests and benches without a window or renderer.
//! The fixed-update schedule is stepped manually, one call per tick.

use bevy::app::App;
use bevy::prelude::*;

use crate::buildings::{Building, BuildingRegistry};
use crate::clock::SimClock;
use crate::grid::{RoadType, WorldGrid};
use crate::pathfind::{EntityKind, Pathfinder};
use crate::roads::{RoadId, RoadNetwork};
use crate::services::{CityServices, ServiceType};
use crate::traffic::{EntityId, PedestrianPool, VehicleFleet};
use crate::transit::TransitNetwork;
use crate::zoning::{ZoneDensity, ZoneMap, ZoneType};
use crate::SimulationPlugin;

pub struct TestCity {
    app: App,
}

impl TestCity {
    /// An empty headless city with every resource at its default.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        // One update so plugin setup completes before tests poke at state.
        app.update();
        Self { app }
    }

    /// Advance the simulation by `n` fixed ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Run until the slow-tick systems have fired at least once.
    pub fn tick_slow_cycle(&mut self) {
        self.tick(crate::SlowTickTimer::INTERVAL);
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    /// Plan and construct a road, panicking if the blueprint is invalid.
    pub fn with_road(
        mut self,
        road_type: RoadType,
        start: (usize, usize),
        end: (usize, usize),
    ) -> Self {
        self.build_road(road_type, start, end);
        self
    }

    /// Non-consuming variant for mid-test construction.
    pub fn build_road(
        &mut self,
        road_type: RoadType,
        start: (usize, usize),
        end: (usize, usize),
    ) -> RoadId {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut network: Mut<RoadNetwork>| {
            world.resource_scope(|world, mut grid: Mut<WorldGrid>| {
                world.resource_scope(|_world, mut pathfinder: Mut<Pathfinder>| {
                    let blueprint = network.plan_road(&grid, road_type, start, end);
                    assert!(
                        blueprint.valid,
                        "test road {start:?}->{end:?} invalid: {:?}",
                        blueprint.reason
                    );
                    network
                        .construct_road(&mut grid, &mut pathfinder, &blueprint)
                        .unwrap_or_else(|| panic!("construct failed for {start:?}->{end:?}"))
                })
            })
        })
    }

    pub fn remove_road(&mut self, id: RoadId) -> bool {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut network: Mut<RoadNetwork>| {
            world.resource_scope(|world, mut grid: Mut<WorldGrid>| {
                world.resource_scope(|_world, mut pathfinder: Mut<Pathfinder>| {
                    network.remove_road(&mut grid, &mut pathfinder, id)
                })
            })
        })
    }

    /// Zone a rectangle, panicking on rejection.
    pub fn with_zone(
        mut self,
        rect: crate::pathfind::GridRect,
        zone_type: ZoneType,
        density: ZoneDensity,
    ) -> Self {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut zones: Mut<ZoneMap>| {
            let grid = world.resource::<WorldGrid>();
            let result = zones.zone_area(grid, rect, zone_type, density);
            assert!(result.success, "test zoning rejected: {:?}", result.reason);
        });
        self
    }

    pub fn with_service(mut self, service: ServiceType, position: (usize, usize)) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CityServices>()
            .add_service_building(service, position);
        self
    }

    pub fn with_building(mut self, building: Building) -> Self {
        self.app
            .world_mut()
            .resource_mut::<BuildingRegistry>()
            .buildings
            .push(building);
        self
    }

    pub fn spawn_vehicle(
        &mut self,
        kind: EntityKind,
        origin: (usize, usize),
        destination: (usize, usize),
    ) -> EntityId {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut fleet: Mut<VehicleFleet>| {
            world.resource_scope(|world, mut pathfinder: Mut<Pathfinder>| {
                let grid = world.resource::<WorldGrid>();
                let clock = world.resource::<SimClock>();
                fleet.0.spawn(kind, origin, destination, grid, &mut pathfinder, clock)
            })
        })
    }

    pub fn spawn_pedestrian(
        &mut self,
        origin: (usize, usize),
        destination: (usize, usize),
    ) -> EntityId {
        let world = self.app.world_mut();
        world.resource_scope(|world, mut pool: Mut<PedestrianPool>| {
            world.resource_scope(|world, mut pathfinder: Mut<Pathfinder>| {
                let grid = world.resource::<WorldGrid>();
                let clock = world.resource::<SimClock>();
                pool.0
                    .spawn(EntityKind::Pedestrian, origin, destination, grid, &mut pathfinder, clock)
            })
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    pub fn grid(&self) -> &WorldGrid {
        self.resource::<WorldGrid>()
    }

    pub fn roads(&self) -> &RoadNetwork {
        self.resource::<RoadNetwork>()
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        self.resource::<Pathfinder>()
    }

    pub fn vehicles(&self) -> &VehicleFleet {
        self.resource::<VehicleFleet>()
    }

    pub fn pedestrians(&self) -> &PedestrianPool {
        self.resource::<PedestrianPool>()
    }

    pub fn zones(&self) -> &ZoneMap {
        self.resource::<ZoneMap>()
    }

    pub fn services(&self) -> &CityServices {
        self.resource::<CityServices>()
    }

    pub fn transit(&self) -> &TransitNetwork {
        self.resource::<TransitNetwork>()
    }

    pub fn clock(&self) -> &SimClock {
        self.resource::<SimClock>()
    }
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}
