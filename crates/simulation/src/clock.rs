//! Simulated-time clock.
//!
//! Everything time-driven in the engine (path-cache expiry, traffic-light
//! phases, emergency resolution, passenger patience) reads this clock, never
//! the wall clock, so a run is reproducible tick for tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::TICK_MS;

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: f64,
}

impl SimClock {
    /// Current simulated time in milliseconds since engine start.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn advance(&mut self, dt_ms: f64) {
        debug_assert!(dt_ms >= 0.0, "clock cannot run backwards");
        self.now_ms += dt_ms;
    }
}

pub fn tick_sim_clock(mut clock: ResMut<SimClock>) {
    clock.advance(TICK_MS as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_by_tick() {
        let mut clock = SimClock::default();
        assert_eq!(clock.now_ms(), 0.0);
        clock.advance(100.0);
        clock.advance(100.0);
        assert_eq!(clock.now_ms(), 200.0);
    }
}
