use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use pathfinding::prelude::bfs;

use crate::config::{GRID_HEIGHT, GRID_WIDTH};

use super::types::*;

/// Flat fare collected at boarding.
const FARE: f32 = 2.0;
/// How long a fresh passenger will wait before giving up.
const DEFAULT_PATIENCE_MS: f32 = 300_000.0;
/// A cell counts as transit-covered within this distance of a stop.
const COVERAGE_RADIUS: f32 = 5.0;

fn stop_distance(a: (usize, usize), b: (usize, usize)) -> f32 {
    let dx = a.0 as f32 - b.0 as f32;
    let dy = a.1 as f32 - b.1 as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Stops, routes, vehicles, and passengers. The stop graph is independent of
/// the road network; links form automatically between same-mode stops in
/// range.
#[derive(Resource, Default)]
pub struct TransitNetwork {
    stops: HashMap<StopId, TransitStop>,
    routes: HashMap<RouteId, TransitRoute>,
    vehicles: HashMap<TransitVehicleId, TransitVehicle>,
    passengers: HashMap<PassengerId, Passenger>,
    revenue: f32,
    operating_cost: f32,
    next_stop_id: u32,
    next_route_id: u32,
    next_vehicle_id: u32,
    next_passenger_id: u32,
}

impl TransitNetwork {
    /// Place a stop and link it symmetrically to every same-mode stop within
    /// the mode's link distance.
    pub fn add_stop(&mut self, mode: TransitMode, position: (usize, usize)) -> StopId {
        let id = StopId(self.next_stop_id);
        self.next_stop_id += 1;

        let mut connections = Vec::new();
        for other in self.stops.values_mut() {
            if other.mode == mode
                && stop_distance(other.position, position) <= mode.max_link_distance()
            {
                connections.push(other.id);
                other.connections.push(id);
            }
        }
        self.stops.insert(
            id,
            TransitStop {
                id,
                mode,
                position,
                connections,
                waiting: Vec::new(),
            },
        );
        id
    }

    /// Remove a stop, its links, and its waiting queue. Routes that drop
    /// below two stops are dissolved along with their vehicles.
    pub fn remove_stop(&mut self, id: StopId) -> bool {
        let Some(stop) = self.stops.remove(&id) else {
            warn!("remove_stop: unknown stop id {id:?}");
            debug_assert!(false, "remove_stop called with unknown id");
            return false;
        };
        for other in self.stops.values_mut() {
            other.connections.retain(|&s| s != id);
        }
        for pid in &stop.waiting {
            self.passengers.remove(pid);
        }

        // Nobody can alight at a stop that no longer exists; passengers bound
        // for it leave the system, whether queued elsewhere or already aboard.
        let doomed: Vec<PassengerId> = self
            .passengers
            .values()
            .filter(|p| p.destination == id)
            .map(|p| p.id)
            .collect();
        for pid in doomed {
            let Some(passenger) = self.passengers.remove(&pid) else {
                continue;
            };
            match passenger.aboard {
                Some(vid) => {
                    if let Some(vehicle) = self.vehicles.get_mut(&vid) {
                        vehicle.passengers.retain(|&p| p != pid);
                    }
                }
                None => {
                    if let Some(origin) = self.stops.get_mut(&passenger.origin) {
                        origin.waiting.retain(|&p| p != pid);
                    }
                }
            }
        }

        let route_ids: Vec<RouteId> = self.routes.keys().copied().collect();
        for rid in route_ids {
            let Some(route) = self.routes.get_mut(&rid) else {
                continue;
            };
            if !route.stops.contains(&id) {
                continue;
            }
            route.stops.retain(|&s| s != id);
            if route.stops.len() < 2 {
                if let Some(route) = self.routes.remove(&rid) {
                    for vid in route.vehicles {
                        self.retire_vehicle(vid);
                    }
                }
            } else {
                let len = route.stops.len();
                for vid in route.vehicles.clone() {
                    if let Some(vehicle) = self.vehicles.get_mut(&vid) {
                        vehicle.next_stop_index %= len;
                    }
                }
            }
        }
        true
    }

    /// A route is an ordered loop of existing stops, all of the given mode.
    pub fn create_route(&mut self, mode: TransitMode, stops: Vec<StopId>) -> Option<RouteId> {
        if stops.len() < 2 {
            warn!("create_route: a route needs at least two stops");
            return None;
        }
        for sid in &stops {
            match self.stops.get(sid) {
                None => {
                    warn!("create_route: unknown stop {sid:?}");
                    return None;
                }
                Some(stop) if stop.mode != mode => {
                    warn!("create_route: stop {sid:?} is not a {mode:?} stop");
                    return None;
                }
                Some(_) => {}
            }
        }

        let id = RouteId(self.next_route_id);
        self.next_route_id += 1;
        let route = TransitRoute {
            id,
            mode,
            stops,
            frequency: 8,
            vehicles: Vec::new(),
        };
        let target = route.target_vehicles();
        let stop_count = route.stops.len();
        self.routes.insert(id, route);
        // Stagger the initial fleet around the loop.
        for i in 0..target {
            self.spawn_vehicle(id, i * stop_count / target);
        }
        Some(id)
    }

    pub fn add_passenger(&mut self, origin: StopId, destination: StopId) -> Option<PassengerId> {
        if !self.stops.contains_key(&destination) {
            warn!("add_passenger: unknown destination {destination:?}");
            return None;
        }
        let Some(stop) = self.stops.get_mut(&origin) else {
            warn!("add_passenger: unknown origin {origin:?}");
            return None;
        };
        let id = PassengerId(self.next_passenger_id);
        self.next_passenger_id += 1;
        stop.waiting.push(id);
        self.passengers.insert(
            id,
            Passenger {
                id,
                origin,
                destination,
                patience_ms: DEFAULT_PATIENCE_MS,
                waited_ms: 0.0,
                aboard: None,
            },
        );
        Some(id)
    }

    /// Breadth-first route over stop links plus same-route co-membership,
    /// so a transfer between routes sharing a stop costs one hop.
    pub fn find_route(&self, origin: StopId, destination: StopId) -> Option<Vec<StopId>> {
        if !self.stops.contains_key(&origin) || !self.stops.contains_key(&destination) {
            return None;
        }
        bfs(
            &origin,
            |&sid| self.adjacent_stops(sid),
            |&sid| sid == destination,
        )
    }

    fn adjacent_stops(&self, sid: StopId) -> Vec<StopId> {
        let mut out: Vec<StopId> = match self.stops.get(&sid) {
            Some(stop) => stop.connections.clone(),
            None => return Vec::new(),
        };
        for route in self.routes.values() {
            if route.stops.contains(&sid) {
                out.extend(route.stops.iter().copied().filter(|&s| s != sid));
            }
        }
        out.sort_by_key(|s| s.0);
        out.dedup();
        out
    }

    /// One simulation tick: vehicles shuttle and exchange passengers,
    /// waiting patience decays, and route frequencies self-tune.
    pub fn update(&mut self, dt_ms: f32) {
        self.step_vehicles(dt_ms);
        self.decay_patience(dt_ms);
        self.tune_frequencies();

        let dt_s = dt_ms / 1000.0;
        for vehicle in self.vehicles.values() {
            self.operating_cost += vehicle.mode.operating_cost_per_s() * dt_s;
        }
    }

    fn step_vehicles(&mut self, dt_ms: f32) {
        let ids: Vec<TransitVehicleId> = self.vehicles.keys().copied().collect();
        for vid in ids {
            let Some(mut vehicle) = self.vehicles.remove(&vid) else {
                continue;
            };
            vehicle.travel_remaining_ms -= dt_ms;
            if vehicle.travel_remaining_ms <= 0.0 {
                self.arrive_at_stop(&mut vehicle);
            }
            self.vehicles.insert(vid, vehicle);
        }
    }

    /// Alight by destination, board FIFO up to capacity, then depart for
    /// the next stop on the loop.
    fn arrive_at_stop(&mut self, vehicle: &mut TransitVehicle) {
        let Some(route) = self.routes.get(&vehicle.route) else {
            return;
        };
        let stops = route.stops.clone();
        if stops.len() < 2 {
            return;
        }
        let here = stops[vehicle.next_stop_index % stops.len()];

        // Alight: journey over for passengers whose destination this is.
        let mut riding = std::mem::take(&mut vehicle.passengers);
        riding.retain(|pid| {
            let arrived = self
                .passengers
                .get(pid)
                .is_some_and(|p| p.destination == here);
            if arrived {
                self.passengers.remove(pid);
            }
            !arrived
        });
        vehicle.passengers = riding;

        // Board: min(free space, waiting), strictly from the queue front.
        if let Some(stop) = self.stops.get_mut(&here) {
            let space = vehicle.capacity.saturating_sub(vehicle.passengers.len());
            let boarding = space.min(stop.waiting.len());
            for pid in stop.waiting.drain(..boarding) {
                if let Some(passenger) = self.passengers.get_mut(&pid) {
                    passenger.aboard = Some(vehicle.id);
                    vehicle.passengers.push(pid);
                    self.revenue += FARE;
                }
            }
        }

        let next_index = (vehicle.next_stop_index + 1) % stops.len();
        let next = stops[next_index];
        let here_pos = self.stops.get(&here).map(|s| s.position);
        let next_pos = self.stops.get(&next).map(|s| s.position);
        vehicle.next_stop_index = next_index;
        vehicle.travel_remaining_ms = match (here_pos, next_pos) {
            (Some(a), Some(b)) => stop_distance(a, b) / vehicle.mode.speed() * 1000.0,
            _ => 0.0,
        };
    }

    fn decay_patience(&mut self, dt_ms: f32) {
        let mut expired = Vec::new();
        for passenger in self.passengers.values_mut() {
            if passenger.aboard.is_some() {
                continue;
            }
            passenger.waited_ms += dt_ms;
            passenger.patience_ms -= dt_ms;
            if passenger.patience_ms <= 0.0 {
                expired.push((passenger.id, passenger.origin));
            }
        }
        for (pid, origin) in expired {
            self.passengers.remove(&pid);
            if let Some(stop) = self.stops.get_mut(&origin) {
                stop.waiting.retain(|&p| p != pid);
            }
        }
    }

    /// Crowded routes run more vehicles (lower frequency value), idle routes
    /// fewer. The fleet drifts one vehicle per tick toward the target.
    fn tune_frequencies(&mut self) {
        let route_ids: Vec<RouteId> = self.routes.keys().copied().collect();
        for rid in route_ids {
            let Some(route) = self.routes.get(&rid) else {
                continue;
            };
            let waiting: usize = route
                .stops
                .iter()
                .filter_map(|sid| self.stops.get(sid))
                .map(|s| s.waiting.len())
                .sum();
            let riding: usize = route
                .vehicles
                .iter()
                .filter_map(|vid| self.vehicles.get(vid))
                .map(|v| v.passengers.len())
                .sum();
            let capacity = (route.vehicles.len().max(1) * route.mode.vehicle_capacity()) as f32;
            let load = (waiting + riding) as f32 / capacity;

            let Some(route) = self.routes.get_mut(&rid) else {
                continue;
            };
            if load > 0.8 {
                route.frequency = route.frequency.saturating_sub(1).max(2);
            } else if load < 0.3 {
                route.frequency = (route.frequency + 1).min(15);
            }

            let target = route.target_vehicles();
            let current = route.vehicles.len();
            if current < target {
                self.spawn_vehicle(rid, 0);
            } else if current > target {
                if let Some(route) = self.routes.get(&rid) {
                    if let Some(&vid) = route.vehicles.last() {
                        self.retire_vehicle(vid);
                    }
                }
            }
        }
    }

    fn spawn_vehicle(&mut self, route_id: RouteId, start_index: usize) {
        let Some(route) = self.routes.get_mut(&route_id) else {
            return;
        };
        let id = TransitVehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;
        let vehicle = TransitVehicle {
            id,
            route: route_id,
            mode: route.mode,
            next_stop_index: start_index % route.stops.len(),
            travel_remaining_ms: 0.0,
            passengers: Vec::new(),
            capacity: route.mode.vehicle_capacity(),
        };
        route.vehicles.push(id);
        self.vehicles.insert(id, vehicle);
    }

    fn retire_vehicle(&mut self, vid: TransitVehicleId) {
        if let Some(vehicle) = self.vehicles.remove(&vid) {
            for pid in vehicle.passengers {
                self.passengers.remove(&pid);
            }
            if let Some(route) = self.routes.get_mut(&vehicle.route) {
                route.vehicles.retain(|&v| v != vid);
            }
        }
    }

    pub fn stop(&self, id: StopId) -> Option<&TransitStop> {
        self.stops.get(&id)
    }

    pub fn route(&self, id: RouteId) -> Option<&TransitRoute> {
        self.routes.get(&id)
    }

    pub fn vehicle(&self, id: TransitVehicleId) -> Option<&TransitVehicle> {
        self.vehicles.get(&id)
    }

    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.passengers.get(&id)
    }

    pub fn system_stats(&self) -> TransitStats {
        let mut stats = TransitStats {
            stops: self.stops.len(),
            routes: self.routes.len(),
            vehicles: self.vehicles.len(),
            total_passengers: self.passengers.len(),
            revenue: self.revenue,
            operating_cost: self.operating_cost,
            profit: self.revenue - self.operating_cost,
            ..Default::default()
        };

        let waiting: Vec<&Passenger> = self
            .passengers
            .values()
            .filter(|p| p.aboard.is_none())
            .collect();
        if !waiting.is_empty() {
            stats.average_wait_ms =
                waiting.iter().map(|p| p.waited_ms).sum::<f32>() / waiting.len() as f32;
        }

        let mut covered: HashSet<(usize, usize)> = HashSet::new();
        let r = COVERAGE_RADIUS.ceil() as i64;
        for stop in self.stops.values() {
            for dy in -r..=r {
                for dx in -r..=r {
                    let x = stop.position.0 as i64 + dx;
                    let y = stop.position.1 as i64 + dy;
                    if x < 0 || y < 0 || x >= GRID_WIDTH as i64 || y >= GRID_HEIGHT as i64 {
                        continue;
                    }
                    if ((dx * dx + dy * dy) as f32).sqrt() <= COVERAGE_RADIUS {
                        covered.insert((x as usize, y as usize));
                    }
                }
            }
        }
        stats.coverage_pct = covered.len() as f32 / (GRID_WIDTH * GRID_HEIGHT) as f32 * 100.0;
        stats
    }
}
