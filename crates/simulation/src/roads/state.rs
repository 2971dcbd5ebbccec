use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::LIGHT_CYCLE_MS;
use crate::grid::{RoadType, WorldGrid};
use crate::pathfind::Pathfinder;

use super::types::*;

/// Minimum rasterized length for a segment.
const MIN_ROAD_LENGTH: usize = 2;

/// Condition floor; roads never decay into impassability.
const MIN_CONDITION: f32 = 20.0;
const CONDITION_DECAY_PER_SLOW_TICK: f32 = 0.05;

#[derive(Resource, Default)]
pub struct RoadNetwork {
    segments: HashMap<RoadId, RoadSegment>,
    intersections: HashMap<IntersectionId, Intersection>,
    /// Segment ids occupying each cell. Two or more ids on one cell form an
    /// intersection.
    cell_index: HashMap<(usize, usize), Vec<RoadId>>,
    intersection_at: HashMap<(usize, usize), IntersectionId>,
    next_road_id: u32,
    next_intersection_id: u32,
}

impl RoadNetwork {
    // -----------------------------------------------------------------------
    // Planning and construction
    // -----------------------------------------------------------------------

    /// Validate a road plan without mutating anything. Overlap with an
    /// existing road is only allowed at the planned endpoints -- that is how
    /// two roads meet and form an intersection; mid-path crossings are
    /// rejected as conflicts.
    pub fn plan_road(
        &self,
        grid: &WorldGrid,
        road_type: RoadType,
        start: (usize, usize),
        end: (usize, usize),
    ) -> RoadBlueprint {
        if !grid.in_bounds(start.0, start.1) || !grid.in_bounds(end.0, end.1) {
            return RoadBlueprint::rejected(road_type, start, end, "out of bounds");
        }
        let path = bresenham_line(start, end);
        if path.len() < MIN_ROAD_LENGTH {
            return RoadBlueprint::rejected(road_type, start, end, "road too short");
        }
        if path.len() > road_type.max_length() {
            return RoadBlueprint::rejected(road_type, start, end, "exceeds maximum length");
        }
        for &cell in &path {
            let is_endpoint = cell == start || cell == end;
            if !is_endpoint && self.cell_index.contains_key(&cell) {
                return RoadBlueprint::rejected(road_type, start, end, "conflicts with existing road");
            }
        }
        RoadBlueprint {
            road_type,
            start,
            end,
            path,
            valid: true,
            reason: None,
        }
    }

    /// Build a planned road. No-op returning `None` when the blueprint is
    /// invalid. Marks every path cell walkable with the road's type, wires
    /// intersections where segments meet, links reachable neighbors within
    /// radius 1, and clears the path cache.
    pub fn construct_road(
        &mut self,
        grid: &mut WorldGrid,
        pathfinder: &mut Pathfinder,
        blueprint: &RoadBlueprint,
    ) -> Option<RoadId> {
        if !blueprint.valid {
            return None;
        }

        let id = RoadId(self.next_road_id);
        self.next_road_id += 1;

        for &(x, y) in &blueprint.path {
            grid.set_walkable(x, y, true);
            // Shared endpoint cells keep the newest type.
            grid.set_road_type(x, y, Some(blueprint.road_type));
            self.cell_index.entry((x, y)).or_default().push(id);
        }

        let segment = RoadSegment {
            id,
            road_type: blueprint.road_type,
            start: blueprint.start,
            end: blueprint.end,
            path: blueprint.path.clone(),
            lanes: blueprint.road_type.lanes(),
            speed_limit: blueprint.road_type.speed_limit(),
            condition: 100.0,
            connected: Vec::new(),
        };
        self.segments.insert(id, segment);

        for &cell in &blueprint.path {
            self.refresh_intersection(cell);
        }
        self.link_nearby_segments(id);
        pathfinder.clear_cache();
        Some(id)
    }

    /// Remove a segment: reverse its grid marks (except cells shared with
    /// another segment), prune links, drop intersections that fall below two
    /// connections, and clear the path cache. Returns false for an unknown
    /// id -- an orchestration bug, logged loudly.
    pub fn remove_road(
        &mut self,
        grid: &mut WorldGrid,
        pathfinder: &mut Pathfinder,
        id: RoadId,
    ) -> bool {
        let Some(segment) = self.segments.remove(&id) else {
            warn!("remove_road: unknown road id {id:?}");
            debug_assert!(false, "remove_road called with unknown id");
            return false;
        };

        for &cell in &segment.path {
            let remaining = match self.cell_index.get_mut(&cell) {
                Some(ids) => {
                    ids.retain(|&r| r != id);
                    ids.clone()
                }
                None => Vec::new(),
            };
            if remaining.is_empty() {
                self.cell_index.remove(&cell);
                grid.reset_cell(cell.0, cell.1);
            } else {
                // The cell still carries whichever segment remains.
                if let Some(seg) = self.segments.get(&remaining[0]) {
                    grid.set_road_type(cell.0, cell.1, Some(seg.road_type));
                }
            }
            self.refresh_intersection(cell);
        }

        for other in &segment.connected {
            if let Some(seg) = self.segments.get_mut(other) {
                seg.connected.retain(|&r| r != id);
            }
        }
        pathfinder.clear_cache();
        true
    }

    /// Create, update, or delete the intersection at `cell` based on how many
    /// segments currently occupy it. Three or more connections signalize it.
    fn refresh_intersection(&mut self, cell: (usize, usize)) {
        let ids = self.cell_index.get(&cell).cloned().unwrap_or_default();
        match self.intersection_at.get(&cell).copied() {
            Some(iid) if ids.len() < 2 => {
                self.intersections.remove(&iid);
                self.intersection_at.remove(&cell);
            }
            Some(iid) => {
                if let Some(intersection) = self.intersections.get_mut(&iid) {
                    intersection.connected_roads = ids.clone();
                    intersection.traffic_lights = ids.len() >= 3;
                }
            }
            None if ids.len() >= 2 => {
                let iid = IntersectionId(self.next_intersection_id);
                self.next_intersection_id += 1;
                self.intersections.insert(
                    iid,
                    Intersection {
                        id: iid,
                        position: cell,
                        traffic_lights: ids.len() >= 3,
                        connected_roads: ids,
                        phase: LightPhase::default(),
                        phase_timer_ms: 0.0,
                    },
                );
                self.intersection_at.insert(cell, iid);
            }
            None => {}
        }
    }

    /// Connect the new segment to any segment with a cell within Chebyshev
    /// radius 1 of its path (including shared cells). Links are mutual.
    fn link_nearby_segments(&mut self, id: RoadId) {
        let path = match self.segments.get(&id) {
            Some(s) => s.path.clone(),
            None => return,
        };
        let mut neighbors: Vec<RoadId> = Vec::new();
        for &(x, y) in &path {
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 {
                        continue;
                    }
                    if let Some(ids) = self.cell_index.get(&(nx as usize, ny as usize)) {
                        for &other in ids {
                            if other != id && !neighbors.contains(&other) {
                                neighbors.push(other);
                            }
                        }
                    }
                }
            }
        }
        for other in &neighbors {
            if let Some(seg) = self.segments.get_mut(other) {
                if !seg.connected.contains(&id) {
                    seg.connected.push(id);
                }
            }
        }
        if let Some(seg) = self.segments.get_mut(&id) {
            seg.connected = neighbors;
        }
    }

    // -----------------------------------------------------------------------
    // Traffic lights
    // -----------------------------------------------------------------------

    /// Advance every signalized intersection's phase timer by `dt_ms`.
    pub fn tick_lights(&mut self, dt_ms: f32) {
        for intersection in self.intersections.values_mut() {
            if !intersection.traffic_lights {
                continue;
            }
            intersection.phase_timer_ms += dt_ms;
            while intersection.phase_timer_ms >= LIGHT_CYCLE_MS {
                intersection.phase_timer_ms -= LIGHT_CYCLE_MS;
                intersection.phase = intersection.phase.next();
            }
        }
    }

    /// Whether a signalized intersection at `(x, y)` currently blocks
    /// movement entering with delta `(dx, dy)`.
    pub fn light_blocks(&self, x: usize, y: usize, dx: i32, dy: i32) -> bool {
        let Some(iid) = self.intersection_at.get(&(x, y)) else {
            return false;
        };
        match self.intersections.get(iid) {
            Some(i) if i.traffic_lights => !i.phase.allows(dx, dy),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn road_at(&self, x: usize, y: usize) -> Option<&RoadSegment> {
        self.cell_index
            .get(&(x, y))
            .and_then(|ids| ids.first())
            .and_then(|id| self.segments.get(id))
    }

    pub fn get(&self, id: RoadId) -> Option<&RoadSegment> {
        self.segments.get(&id)
    }

    pub fn all_roads(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.values()
    }

    pub fn all_intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    pub fn intersection_at(&self, x: usize, y: usize) -> Option<&Intersection> {
        self.intersection_at
            .get(&(x, y))
            .and_then(|iid| self.intersections.get(iid))
    }

    pub fn network_stats(&self) -> NetworkStats {
        let total_length_cells = self.segments.values().map(|s| s.path.len()).sum();
        let average_condition = if self.segments.is_empty() {
            100.0
        } else {
            self.segments.values().map(|s| s.condition).sum::<f32>() / self.segments.len() as f32
        };
        NetworkStats {
            segments: self.segments.len(),
            intersections: self.intersections.len(),
            signalized_intersections: self
                .intersections
                .values()
                .filter(|i| i.traffic_lights)
                .count(),
            total_length_cells,
            average_condition,
        }
    }

    pub(crate) fn decay_condition(&mut self) {
        for segment in self.segments.values_mut() {
            segment.condition = (segment.condition - CONDITION_DECAY_PER_SLOW_TICK).max(MIN_CONDITION);
        }
    }
}
