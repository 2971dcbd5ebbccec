use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::buildings::Building;
use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::params::ServiceParams;
use crate::sim_rng::SimRng;

use super::types::*;

/// Base incident duration before severity and response effectiveness.
const BASE_INCIDENT_MS: f64 = 30_000.0;
/// Additional duration at severity 1.0.
const SEVERITY_INCIDENT_MS: f64 = 90_000.0;

/// Per-service dense effectiveness grids. `paint_building` takes the max
/// with the existing value, so overlapping stations reinforce rather than
/// stack; that also means removal cannot be undone incrementally and a
/// full O(cells) rebuild runs instead.
pub struct CoverageMap {
    grids: [Vec<f32>; 6],
    width: usize,
    height: usize,
}

impl Default for CoverageMap {
    fn default() -> Self {
        Self {
            grids: std::array::from_fn(|_| vec![0.0; GRID_WIDTH * GRID_HEIGHT]),
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl CoverageMap {
    pub fn get(&self, service: ServiceType, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.grids[service.index()][y * self.width + x]
    }

    /// Paint a radial falloff `effectiveness * (1 - d/radius)` around the
    /// building, keeping the stronger value where stations overlap.
    pub fn paint_building(&mut self, building: &ServiceBuilding) {
        let (bx, by) = building.position;
        let radius = building.radius;
        let strength = building.effectiveness();
        let r = radius.ceil() as i64;
        let grid = &mut self.grids[building.service.index()];

        for dy in -r..=r {
            for dx in -r..=r {
                let x = bx as i64 + dx;
                let y = by as i64 + dy;
                if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                    continue;
                }
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if d > radius {
                    continue;
                }
                let value = strength * (1.0 - d / radius);
                let idx = y as usize * self.width + x as usize;
                grid[idx] = grid[idx].max(value);
            }
        }
    }

    pub fn rebuild<'a>(&mut self, buildings: impl Iterator<Item = &'a ServiceBuilding>) {
        for grid in &mut self.grids {
            grid.fill(0.0);
        }
        for building in buildings {
            self.paint_building(building);
        }
    }
}

/// Service buildings, their coverage grids, the demand model, and the
/// emergency dispatcher.
#[derive(Resource, Default)]
pub struct CityServices {
    buildings: HashMap<ServiceBuildingId, ServiceBuilding>,
    coverage: CoverageMap,
    demand: [f32; 6],
    emergencies: HashMap<EmergencyId, EmergencyEvent>,
    next_building_id: u32,
    next_emergency_id: u32,
}

impl CityServices {
    pub fn add_service_building(
        &mut self,
        service: ServiceType,
        position: (usize, usize),
    ) -> ServiceBuildingId {
        let id = ServiceBuildingId(self.next_building_id);
        self.next_building_id += 1;
        let building = ServiceBuilding {
            id,
            service,
            position,
            capacity: service.default_capacity(),
            load: 0.0,
            efficiency: 1.0,
            radius: service.default_radius(),
            maintenance: service.default_maintenance(),
            staff: 10,
            max_staff: 10,
        };
        self.coverage.paint_building(&building);
        self.buildings.insert(id, building);
        id
    }

    /// Removal forces a full coverage rebuild; max-painting is not
    /// incrementally invertible.
    pub fn remove_service_building(&mut self, id: ServiceBuildingId) -> bool {
        if self.buildings.remove(&id).is_none() {
            warn!("remove_service_building: unknown id {id:?}");
            debug_assert!(false, "remove_service_building called with unknown id");
            return false;
        }
        self.coverage.rebuild(self.buildings.values());
        true
    }

    pub fn get_building(&self, id: ServiceBuildingId) -> Option<&ServiceBuilding> {
        self.buildings.get(&id)
    }

    pub fn get_building_mut(&mut self, id: ServiceBuildingId) -> Option<&mut ServiceBuilding> {
        self.buildings.get_mut(&id)
    }

    /// Repaint after staffing or efficiency edits through `get_building_mut`.
    pub fn rebuild_coverage(&mut self) {
        self.coverage.rebuild(self.buildings.values());
    }

    pub fn coverage_at(&self, service: ServiceType, x: usize, y: usize) -> f32 {
        self.coverage.get(service, x, y)
    }

    /// `demand = population * base_per_capita + sum of building-type
    /// adjustments`, floored at zero.
    pub fn update_demand(&mut self, buildings: &[Building], population: u32) {
        for service in ServiceType::ALL {
            let mut demand = population as f32 * service.base_per_capita();
            for b in buildings {
                demand += service.demand_adjustment(b.kind);
            }
            self.demand[service.index()] = demand.max(0.0);
        }
    }

    pub fn demand_for(&self, service: ServiceType) -> f32 {
        self.demand[service.index()]
    }

    /// Schedule an incident. Response time and effectiveness derive from
    /// coverage at the position; the whole lifecycle is pinned to simulated
    /// time at spawn.
    pub fn spawn_emergency(
        &mut self,
        params: &ServiceParams,
        now_ms: f64,
        kind: EmergencyKind,
        position: (usize, usize),
        severity: f32,
    ) -> EmergencyId {
        let id = EmergencyId(self.next_emergency_id);
        self.next_emergency_id += 1;

        let coverage = self.coverage_at(kind.service(), position.0, position.1);
        let response_time_ms = (params.max_response_ms - coverage as f64 * params.response_range_ms)
            .max(params.min_response_ms);
        let effectiveness = (coverage * params.effectiveness_multiplier).min(1.0);
        let severity = severity.clamp(0.0, 1.0);
        let duration_ms =
            (BASE_INCIDENT_MS + severity as f64 * SEVERITY_INCIDENT_MS) * (1.0 - effectiveness as f64);

        let event = EmergencyEvent {
            id,
            kind,
            position,
            severity,
            spawned_at_ms: now_ms,
            response_time_ms,
            effectiveness,
            resolve_at_ms: now_ms + response_time_ms + duration_ms,
        };
        self.emergencies.insert(id, event);
        id
    }

    /// Drop and return every incident whose resolution time has passed.
    pub fn resolve_due(&mut self, now_ms: f64) -> Vec<EmergencyEvent> {
        let due: Vec<EmergencyId> = self
            .emergencies
            .values()
            .filter(|e| e.resolve_at_ms <= now_ms)
            .map(|e| e.id)
            .collect();
        due.into_iter()
            .filter_map(|id| self.emergencies.remove(&id))
            .collect()
    }

    /// Low-probability per-tick roll for an incident at a random cell.
    pub fn roll_random_incident(
        &mut self,
        params: &ServiceParams,
        rng: &mut SimRng,
        now_ms: f64,
    ) -> Option<EmergencyId> {
        if !rng.0.gen_bool(params.random_incident_chance) {
            return None;
        }
        let position = (rng.0.gen_range(0..GRID_WIDTH), rng.0.gen_range(0..GRID_HEIGHT));
        let kind = match rng.0.gen_range(0..3) {
            0 => EmergencyKind::Fire,
            1 => EmergencyKind::Crime,
            _ => EmergencyKind::Medical,
        };
        let severity = rng.0.gen_range(0.1..1.0);
        Some(self.spawn_emergency(params, now_ms, kind, position, severity))
    }

    pub fn active_emergencies(&self) -> impl Iterator<Item = &EmergencyEvent> {
        self.emergencies.values()
    }

    /// Always derived from the live building table, never cached.
    pub fn service_stats(&self, service: ServiceType) -> ServiceStats {
        let mut stats = ServiceStats {
            demand: self.demand_for(service),
            ..Default::default()
        };
        let mut efficiency_sum = 0.0;
        for b in self.buildings.values().filter(|b| b.service == service) {
            stats.buildings += 1;
            stats.capacity += b.capacity;
            efficiency_sum += b.efficiency;
        }
        stats.coverage = if stats.demand <= 0.0 {
            1.0
        } else {
            (stats.capacity / stats.demand).min(1.0)
        };
        let avg_efficiency = if stats.buildings == 0 {
            0.0
        } else {
            efficiency_sum / stats.buildings as f32
        };
        stats.satisfaction = stats.coverage * avg_efficiency;
        stats
    }

    pub fn all_service_stats(&self) -> Vec<(ServiceType, ServiceStats)> {
        ServiceType::ALL
            .into_iter()
            .map(|s| (s, self.service_stats(s)))
            .collect()
    }

    pub fn total_maintenance(&self) -> f32 {
        self.buildings.values().map(|b| b.maintenance).sum()
    }
}
