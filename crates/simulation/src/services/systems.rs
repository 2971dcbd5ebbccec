use bevy::prelude::*;

use crate::buildings::BuildingRegistry;
use crate::clock::SimClock;
use crate::params::SimParams;
use crate::sim_rng::SimRng;
use crate::SlowTickTimer;

use super::state::CityServices;

/// System: recompute per-service demand from the current building set.
pub fn update_service_demand(
    slow_tick: Res<SlowTickTimer>,
    registry: Res<BuildingRegistry>,
    mut services: ResMut<CityServices>,
) {
    if !slow_tick.should_run() {
        return;
    }
    let population = registry.total_population();
    services.update_demand(&registry.buildings, population);
}

/// System: the per-tick dispatcher. Rolls for random incidents, then
/// retires every event whose simulated resolution time has passed. Runs
/// after the demand refresh so new incidents see this tick's coverage.
pub fn dispatch_emergencies(
    clock: Res<SimClock>,
    params: Res<SimParams>,
    mut rng: ResMut<SimRng>,
    mut services: ResMut<CityServices>,
) {
    let now = clock.now_ms();
    if let Some(id) = services.roll_random_incident(&params.services, &mut rng, now) {
        debug!("random incident spawned: {id:?}");
    }
    for event in services.resolve_due(now) {
        debug!(
            "emergency {:?} resolved at {:.0}ms ({:?} at {:?})",
            event.id, now, event.kind, event.position
        );
    }
}
