use bevy::prelude::*;

use crate::config::TICK_MS;
use crate::SlowTickTimer;

use super::state::RoadNetwork;

/// System: purely time-driven signal phase cycling.
pub fn cycle_traffic_lights(mut network: ResMut<RoadNetwork>) {
    network.tick_lights(TICK_MS);
}

/// System: slow surface wear; feeds `network_stats().average_condition`.
pub fn decay_road_condition(slow_tick: Res<SlowTickTimer>, mut network: ResMut<RoadNetwork>) {
    if !slow_tick.should_run() {
        return;
    }
    network.decay_condition();
}
