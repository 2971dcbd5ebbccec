use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitMode {
    Bus,
    Tram,
    Metro,
    Train,
    Ferry,
}

impl TransitMode {
    /// Stops of the same mode auto-link within this distance (grid units).
    pub fn max_link_distance(self) -> f32 {
        match self {
            TransitMode::Bus => 8.0,
            TransitMode::Tram => 6.0,
            TransitMode::Metro => 15.0,
            TransitMode::Train => 25.0,
            TransitMode::Ferry => 20.0,
        }
    }

    pub fn vehicle_capacity(self) -> usize {
        match self {
            TransitMode::Bus => 30,
            TransitMode::Tram => 40,
            TransitMode::Metro => 100,
            TransitMode::Train => 150,
            TransitMode::Ferry => 60,
        }
    }

    /// Cruise speed in cells per second.
    pub fn speed(self) -> f32 {
        match self {
            TransitMode::Bus => 2.0,
            TransitMode::Tram => 2.5,
            TransitMode::Metro => 4.0,
            TransitMode::Train => 5.0,
            TransitMode::Ferry => 1.5,
        }
    }

    /// Operating cost per vehicle per simulated second.
    pub fn operating_cost_per_s(self) -> f32 {
        match self {
            TransitMode::Bus => 0.5,
            TransitMode::Tram => 0.7,
            TransitMode::Metro => 2.0,
            TransitMode::Train => 3.0,
            TransitMode::Ferry => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitVehicleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassengerId(pub u32);

#[derive(Debug, Clone)]
pub struct TransitStop {
    pub id: StopId,
    pub mode: TransitMode,
    pub position: (usize, usize),
    /// Same-mode stops in link range. Kept symmetric.
    pub connections: Vec<StopId>,
    /// FIFO boarding queue.
    pub waiting: Vec<PassengerId>,
}

#[derive(Debug, Clone)]
pub struct TransitRoute {
    pub id: RouteId,
    pub mode: TransitMode,
    pub stops: Vec<StopId>,
    /// Headway knob, 2..15. Lower means more service; self-tunes each tick.
    pub frequency: u32,
    pub vehicles: Vec<TransitVehicleId>,
}

impl TransitRoute {
    /// How many vehicles the current frequency calls for.
    pub fn target_vehicles(&self) -> usize {
        ((16 / self.frequency.max(1)) as usize).clamp(1, 6)
    }
}

#[derive(Debug, Clone)]
pub struct TransitVehicle {
    pub id: TransitVehicleId,
    pub route: RouteId,
    pub mode: TransitMode,
    /// Index into the route's stop list of the stop being approached.
    pub next_stop_index: usize,
    pub travel_remaining_ms: f32,
    pub passengers: Vec<PassengerId>,
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct Passenger {
    pub id: PassengerId,
    pub origin: StopId,
    pub destination: StopId,
    /// Remaining willingness to wait, ms. At zero the passenger leaves.
    pub patience_ms: f32,
    pub waited_ms: f32,
    pub aboard: Option<TransitVehicleId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitStats {
    pub stops: usize,
    pub routes: usize,
    pub vehicles: usize,
    /// Waiting plus riding.
    pub total_passengers: usize,
    pub average_wait_ms: f32,
    pub revenue: f32,
    pub operating_cost: f32,
    pub profit: f32,
    /// Share of grid cells within 5 cells of any stop, 0..100.
    pub coverage_pct: f32,
}
