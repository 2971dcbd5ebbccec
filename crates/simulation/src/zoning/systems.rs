use bevy::prelude::*;

use crate::buildings::BuildingRegistry;
use crate::grid::WorldGrid;
use crate::params::SimParams;
use crate::SlowTickTimer;

use super::state::ZoneMap;

/// System: run the full zoning formula pipeline. Demand modeling is a slow
/// process, so it shares the slow-tick cadence with road wear.
pub fn update_zones(
    slow_tick: Res<SlowTickTimer>,
    params: Res<SimParams>,
    grid: Res<WorldGrid>,
    buildings: Res<BuildingRegistry>,
    mut zones: ResMut<ZoneMap>,
) {
    if !slow_tick.should_run() {
        return;
    }
    zones.update(&params.zoning, &grid, &buildings.buildings);
}
