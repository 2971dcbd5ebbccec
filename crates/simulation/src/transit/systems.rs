use bevy::prelude::*;

use crate::config::TICK_MS;

use super::state::TransitNetwork;

/// System: one transit tick. Runs in the post-simulation set so vehicles and
/// queues see the traffic state the main pass just produced.
pub fn update_transit(mut transit: ResMut<TransitNetwork>) {
    transit.update(TICK_MS);
}
