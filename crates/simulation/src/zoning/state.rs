use std::collections::HashMap;

use bevy::prelude::*;

use crate::buildings::Building;
use crate::grid::WorldGrid;
use crate::params::ZoningParams;
use crate::pathfind::GridRect;

use super::types::*;

/// Radius (Chebyshev) within which a road cell grants the road-access flag.
const ROAD_ACCESS_RADIUS: i32 = 3;
/// Radius within which building levels pull zone development upward.
const DEVELOPMENT_RADIUS: i32 = 3;

const LAND_VALUE_MIN: f32 = 10.0;
const LAND_VALUE_MAX: f32 = 1000.0;

fn chebyshev(a: (usize, usize), b: (usize, usize)) -> i32 {
    let dx = (a.0 as i64 - b.0 as i64).unsigned_abs();
    let dy = (a.1 as i64 - b.1 as i64).unsigned_abs();
    dx.max(dy) as i32
}

/// All zoned cells plus the citywide demand curves and global factors both
/// derive from. `update` is the whole formula pipeline, run in a strict
/// order because demand and land value read the happiness and pollution
/// written earlier in the same pass.
#[derive(Resource, Default)]
pub struct ZoneMap {
    cells: HashMap<(usize, usize), ZoneCell>,
    demand: ZoneDemand,
    factors: GlobalFactors,
}

impl ZoneMap {
    /// Bulk-zone a rectangle. Rejected whole when any corner is out of
    /// bounds or any target cell already holds an incompatible type.
    /// Already-zoned compatible cells are left untouched.
    ///
    /// Exclusivity is checked per cell, not per neighborhood: residential
    /// and industrial may never share a cell but may sit on adjacent cells,
    /// with the pollution model penalizing the proximity instead.
    pub fn zone_area(
        &mut self,
        grid: &WorldGrid,
        rect: GridRect,
        zone_type: ZoneType,
        density: ZoneDensity,
    ) -> ZoneAreaResult {
        if !grid.in_bounds(rect.x0, rect.y0) || !grid.in_bounds(rect.x1, rect.y1) {
            return ZoneAreaResult::rejected("out of bounds");
        }
        for y in rect.y0..=rect.y1 {
            for x in rect.x0..=rect.x1 {
                if let Some(existing) = self.cells.get(&(x, y)) {
                    if !existing.zone_type.compatible_with(zone_type) {
                        return ZoneAreaResult::rejected("incompatible zone type");
                    }
                }
            }
        }

        let mut created = 0;
        for y in rect.y0..=rect.y1 {
            for x in rect.x0..=rect.x1 {
                self.cells.entry((x, y)).or_insert_with(|| {
                    created += 1;
                    ZoneCell::new(zone_type, density)
                });
            }
        }
        ZoneAreaResult {
            success: true,
            cells_zoned: created,
            reason: None,
        }
    }

    /// Bulk-unzone a rectangle. Returns the number of cells removed.
    pub fn unzone_area(&mut self, rect: GridRect) -> usize {
        let mut removed = 0;
        for y in rect.y0..=rect.y1 {
            for x in rect.x0..=rect.x1 {
                if self.cells.remove(&(x, y)).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// The formula pipeline, in order: global factors, citywide demand
    /// curves, per-cell refresh, land-value smoothing. Later steps read
    /// values the earlier steps wrote this same pass.
    pub fn update(&mut self, params: &ZoningParams, grid: &WorldGrid, buildings: &[Building]) {
        self.update_global_factors(buildings);
        self.update_demand_curves();
        self.update_cells(params, grid, buildings);
        self.smooth_land_values(params);
    }

    fn update_global_factors(&mut self, buildings: &[Building]) {
        let population: u32 = buildings.iter().map(|b| b.population).sum();
        let jobs: u32 = buildings.iter().map(|b| b.jobs).sum();
        let employment_rate = if population == 0 {
            1.0
        } else {
            (jobs as f32 / population as f32).min(1.0)
        };

        let (mut pollution_sum, mut happiness_sum) = (0.0, 0.0);
        for cell in self.cells.values() {
            pollution_sum += cell.pollution;
            happiness_sum += cell.happiness;
        }
        let count = self.cells.len().max(1) as f32;
        let average_pollution = pollution_sum / count;
        let average_happiness = if self.cells.is_empty() {
            50.0
        } else {
            happiness_sum / count
        };

        self.factors = GlobalFactors {
            population,
            jobs,
            employment_rate,
            average_pollution,
            average_happiness,
            economy_index: (employment_rate * 0.6 + average_happiness / 100.0 * 0.4)
                .clamp(0.0, 1.0),
        };
    }

    fn update_demand_curves(&mut self) {
        let f = &self.factors;
        // Residential demand follows the economy and mood; commercial needs
        // people to sell to; industrial wants workers and shrugs at mood.
        let residential = 40.0 * f.economy_index + (f.average_happiness - 50.0) * 0.6
            - f.average_pollution * 0.2;
        let commercial =
            (f.population as f32 * 0.05).min(40.0) + 30.0 * f.economy_index - 10.0;
        let industrial = (f.population as f32 * 0.04).min(35.0) + 20.0 * f.employment_rate;

        let curve = |tier_bias: f32| DemandLevels {
            residential: (residential + tier_bias).clamp(-100.0, 100.0),
            commercial: (commercial + tier_bias).clamp(-100.0, 100.0),
            industrial: (industrial + tier_bias * 0.5).clamp(-100.0, 100.0),
        };
        // Denser tiers are harder to fill.
        self.demand = ZoneDemand {
            low: curve(10.0),
            medium: curve(0.0),
            high: curve(-10.0),
        };
    }

    fn update_cells(&mut self, params: &ZoningParams, grid: &WorldGrid, buildings: &[Building]) {
        let demand = self.demand.clone();
        for (&pos, cell) in self.cells.iter_mut() {
            // Service flags from buildings in range.
            cell.powered = false;
            cell.watered = false;
            cell.services_nearby = false;
            let mut pollution = 0.0f32;
            let mut nearby_level_sum = 0.0f32;
            let mut nearby_level_count = 0u32;

            for b in buildings {
                let d = chebyshev(pos, (b.x, b.y));
                if d <= params.service_radius {
                    cell.powered |= b.kind.provides_power();
                    cell.watered |= b.kind.provides_water();
                    cell.services_nearby |= b.kind.is_civic();
                }
                if d <= params.pollution_radius && b.kind.is_industrial() {
                    pollution +=
                        (params.pollution_base - params.pollution_falloff * d as f32).max(0.0);
                }
                if d <= DEVELOPMENT_RADIUS {
                    nearby_level_sum += b.level as f32;
                    nearby_level_count += 1;
                }
            }
            cell.pollution = pollution.clamp(0.0, 100.0);
            cell.road_access = has_road_within(grid, pos, ROAD_ACCESS_RADIUS);

            // Happiness reads the pollution just written.
            let land_value_bonus = ((cell.land_value - 100.0) / 100.0).clamp(-10.0, 10.0);
            cell.happiness = (50.0
                + cell.satisfied_flags() as f32 * params.service_happiness_bonus
                - cell.pollution * params.pollution_happiness_weight
                + land_value_bonus
                + cell.zone_type.happiness_modifier())
            .clamp(0.0, 100.0);

            // Cell demand scales the citywide curve by local satisfaction.
            let satisfaction = cell.satisfied_flags() as f32 / 4.0;
            let global = demand.for_density(cell.density).for_type(cell.zone_type);
            cell.demand = (global * (0.5 + 0.5 * satisfaction) + (cell.happiness - 50.0) * 0.2
                - cell.pollution * 0.1)
                .clamp(-100.0, 100.0);

            // Development drifts one step per update toward what conditions
            // and the neighborhood support.
            let condition = (cell.happiness + cell.demand.max(0.0)) / 2.0;
            let mut target = 1.0 + condition / 25.0;
            if nearby_level_count > 0 {
                target = target.max(nearby_level_sum / nearby_level_count as f32);
            }
            let target = (target.round() as u8).clamp(1, 5);
            match target.cmp(&cell.level) {
                std::cmp::Ordering::Greater => cell.level += 1,
                std::cmp::Ordering::Less => cell.level -= 1,
                std::cmp::Ordering::Equal => {}
            }

            // Happiness and pollution nudge the value before smoothing.
            cell.land_value = (cell.land_value + (cell.happiness - 50.0) * 0.1
                - cell.pollution * 0.05)
                .clamp(LAND_VALUE_MIN, LAND_VALUE_MAX);
        }
    }

    /// 80/20 blend of each cell's land value toward its neighborhood
    /// average, from a pre-pass snapshot so ordering cannot bias the result.
    fn smooth_land_values(&mut self, params: &ZoningParams) {
        let snapshot: HashMap<(usize, usize), f32> = self
            .cells
            .iter()
            .map(|(&pos, cell)| (pos, cell.land_value))
            .collect();

        for (&pos, cell) in self.cells.iter_mut() {
            let mut sum = 0.0;
            let mut count = 0u32;
            for (&other, &value) in &snapshot {
                if other != pos && chebyshev(pos, other) <= params.land_value_radius {
                    sum += value;
                    count += 1;
                }
            }
            if count > 0 {
                let neighborhood = sum / count as f32;
                cell.land_value = (cell.land_value * params.land_value_inertia
                    + neighborhood * (1.0 - params.land_value_inertia))
                    .clamp(LAND_VALUE_MIN, LAND_VALUE_MAX);
            }
        }
    }

    pub fn zone_at(&self, x: usize, y: usize) -> Option<&ZoneCell> {
        self.cells.get(&(x, y))
    }

    pub fn zones_of_type(&self, zone_type: ZoneType) -> impl Iterator<Item = ((usize, usize), &ZoneCell)> {
        self.cells
            .iter()
            .filter(move |(_, c)| c.zone_type == zone_type)
            .map(|(&pos, c)| (pos, c))
    }

    pub fn demand(&self) -> &ZoneDemand {
        &self.demand
    }

    pub fn global_factors(&self) -> &GlobalFactors {
        &self.factors
    }

    pub fn zone_stats(&self) -> ZoneStats {
        let mut stats = ZoneStats {
            total_cells: self.cells.len(),
            ..Default::default()
        };
        if self.cells.is_empty() {
            return stats;
        }
        let (mut happiness, mut land_value, mut level) = (0.0f32, 0.0f32, 0.0f32);
        for cell in self.cells.values() {
            match cell.zone_type {
                ZoneType::Residential => stats.residential += 1,
                ZoneType::Commercial => stats.commercial += 1,
                ZoneType::Industrial => stats.industrial += 1,
                ZoneType::Mixed => stats.mixed += 1,
            }
            happiness += cell.happiness;
            land_value += cell.land_value;
            level += cell.level as f32;
        }
        let count = self.cells.len() as f32;
        stats.average_happiness = happiness / count;
        stats.average_land_value = land_value / count;
        stats.average_level = level / count;
        stats
    }
}

fn has_road_within(grid: &WorldGrid, pos: (usize, usize), radius: i32) -> bool {
    let x0 = pos.0.saturating_sub(radius as usize);
    let y0 = pos.1.saturating_sub(radius as usize);
    let x1 = (pos.0 + radius as usize).min(grid.width - 1);
    let y1 = (pos.1 + radius as usize).min(grid.height - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            if grid.get(x, y).road_type.is_some() {
                return true;
            }
        }
    }
    false
}
