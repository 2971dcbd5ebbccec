//! Traffic- and road-type-aware A* over the world grid, with result caching.
//!
//! Costs use the classic 10/14 orthogonal/diagonal scale with a Euclidean
//! heuristic (x10). When a request avoids traffic, each cell adds a penalty
//! proportional to its current density -- this is the read half of the
//! congestion feedback loop (the traffic simulation writes densities back
//! every tick). Ties on total cost break toward the lower heuristic.
//!
//! A failed search is a normal negative result (`success = false`, empty
//! path), not an error; callers are expected to wait or re-route later.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;
use crate::config::PATH_CACHE_TTL_MS;
use crate::grid::{RoadType, WorldGrid};

pub const ORTHOGONAL_COST: u32 = 10;
pub const DIAGONAL_COST: u32 = 14;
/// Per-cell cost penalty at full traffic density.
pub const TRAFFIC_PENALTY: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Car,
    Bus,
    Truck,
    Emergency,
    Pedestrian,
}

impl EntityKind {
    pub fn is_pedestrian(self) -> bool {
        matches!(self, EntityKind::Pedestrian)
    }

    /// Road types this kind may travel when the request carries no explicit
    /// allow-list. Pedestrians never enter highways; vehicles never enter
    /// footpaths.
    pub fn default_road_types(self) -> &'static [RoadType] {
        if self.is_pedestrian() {
            &[RoadType::Street, RoadType::Avenue, RoadType::Footpath]
        } else {
            &[RoadType::Street, RoadType::Avenue, RoadType::Highway]
        }
    }

    /// Nominal free-flow speed in cells per second, for time estimates.
    pub fn base_speed(self) -> f32 {
        match self {
            EntityKind::Car => 3.0,
            EntityKind::Bus => 2.2,
            EntityKind::Truck => 2.5,
            EntityKind::Emergency => 4.5,
            EntityKind::Pedestrian => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathPriority {
    Low,
    #[default]
    Normal,
    /// Bypasses the cache read (always computes fresh), still refreshes it.
    High,
}

#[derive(Debug, Clone)]
pub struct PathRequest {
    pub start: (usize, usize),
    pub goal: (usize, usize),
    pub kind: EntityKind,
    pub priority: PathPriority,
    pub avoid_traffic: bool,
    /// Overrides the kind's default allow-list. Requests carrying an explicit
    /// list skip the cache (the cache key deliberately excludes it).
    pub allowed_road_types: Option<Vec<RoadType>>,
}

impl PathRequest {
    pub fn new(start: (usize, usize), goal: (usize, usize), kind: EntityKind) -> Self {
        Self {
            start,
            goal,
            kind,
            priority: PathPriority::Normal,
            avoid_traffic: true,
            allowed_road_types: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathResult {
    /// Ordered cells from start to goal inclusive; empty on failure.
    pub path: Vec<(usize, usize)>,
    /// Length in cell units (diagonals count sqrt(2)).
    pub distance: f32,
    pub estimated_time_ms: f32,
    /// Average traffic density along the path.
    pub traffic_level: f32,
    pub success: bool,
}

impl PathResult {
    fn failure() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridRect {
    pub x0: usize,
    pub y0: usize,
    /// Inclusive.
    pub x1: usize,
    pub y1: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaTrafficStats {
    pub average_density: f32,
    pub max_density: f32,
    /// Cells with density above 0.7.
    pub congested_cells: usize,
    pub cell_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    start: (usize, usize),
    goal: (usize, usize),
    kind: EntityKind,
    avoid_traffic: bool,
}

struct CacheEntry {
    result: PathResult,
    expires_at_ms: f64,
}

/// The pathfinding engine. Owns the result cache; the road network clears it
/// on every construct/remove so stale paths never outlive a network change.
#[derive(Resource, Default)]
pub struct Pathfinder {
    cache: HashMap<CacheKey, CacheEntry>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl Pathfinder {
    pub fn find_path(
        &mut self,
        grid: &WorldGrid,
        clock: &SimClock,
        request: &PathRequest,
    ) -> PathResult {
        let now = clock.now_ms();
        // Custom allow-lists are not part of the cache key, so those requests
        // go straight to the search.
        let cacheable = request.allowed_road_types.is_none();
        let key = CacheKey {
            start: request.start,
            goal: request.goal,
            kind: request.kind,
            avoid_traffic: request.avoid_traffic,
        };

        if cacheable && request.priority != PathPriority::High {
            if let Some(entry) = self.cache.get(&key) {
                if entry.expires_at_ms > now {
                    self.cache_hits += 1;
                    return entry.result.clone();
                }
            }
        }
        self.cache_misses += 1;

        let result = search(grid, request);
        if cacheable {
            self.cache.insert(
                key,
                CacheEntry {
                    result: result.clone(),
                    expires_at_ms: now + PATH_CACHE_TTL_MS,
                },
            );
        }
        result
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn area_traffic_stats(&self, grid: &WorldGrid, rect: GridRect) -> AreaTrafficStats {
        let mut stats = AreaTrafficStats::default();
        let x1 = rect.x1.min(grid.width.saturating_sub(1));
        let y1 = rect.y1.min(grid.height.saturating_sub(1));
        let mut sum = 0.0f32;
        for y in rect.y0..=y1 {
            for x in rect.x0..=x1 {
                let d = grid.get(x, y).traffic_density;
                sum += d;
                stats.max_density = stats.max_density.max(d);
                if d > 0.7 {
                    stats.congested_cells += 1;
                }
                stats.cell_count += 1;
            }
        }
        if stats.cell_count > 0 {
            stats.average_density = sum / stats.cell_count as f32;
        }
        stats
    }
}

fn heuristic(a: (usize, usize), b: (usize, usize)) -> u32 {
    let dx = a.0 as f32 - b.0 as f32;
    let dy = a.1 as f32 - b.1 as f32;
    ((dx * dx + dy * dy).sqrt() * 10.0) as u32
}

/// Cost of stepping onto `(x, y)`. `None` when the cell is impassable for
/// this request.
fn step_cost(
    grid: &WorldGrid,
    request: &PathRequest,
    allowed: &[RoadType],
    x: usize,
    y: usize,
    diagonal: bool,
) -> Option<u32> {
    let cell = grid.get(x, y);
    if !cell.walkable {
        return None;
    }
    let factor = match cell.road_type {
        Some(rt) => {
            if !allowed.contains(&rt) {
                return None;
            }
            rt.travel_cost_factor(request.kind.is_pedestrian())
        }
        None => 1.0,
    };
    let base = if diagonal { DIAGONAL_COST } else { ORTHOGONAL_COST };
    let mut cost = (base as f32 * factor) as u32;
    if request.avoid_traffic {
        cost += (cell.traffic_density * TRAFFIC_PENALTY) as u32;
    }
    Some(cost.max(1))
}

fn search(grid: &WorldGrid, request: &PathRequest) -> PathResult {
    let (start, goal) = (request.start, request.goal);
    if !grid.in_bounds(start.0, start.1) || !grid.in_bounds(goal.0, goal.1) {
        return PathResult::failure();
    }
    if !grid.get(goal.0, goal.1).walkable {
        return PathResult::failure();
    }
    if start == goal {
        return finish(grid, request, vec![start]);
    }

    let allowed: &[RoadType] = request
        .allowed_road_types
        .as_deref()
        .unwrap_or_else(|| request.kind.default_road_types());

    // Heap entries are (f, h, pos): equal f-costs pop the lower heuristic
    // first, which keeps paths hugging the straight line to the goal.
    let mut open: BinaryHeap<Reverse<(u32, u32, (usize, usize))>> = BinaryHeap::new();
    let mut g_score: HashMap<(usize, usize), u32> = HashMap::new();
    let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();

    g_score.insert(start, 0);
    let h0 = heuristic(start, goal);
    open.push(Reverse((h0, h0, start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == goal {
            let mut path = vec![current];
            let mut node = current;
            while let Some(&prev) = came_from.get(&node) {
                path.push(prev);
                node = prev;
            }
            path.reverse();
            return finish(grid, request, path);
        }

        let current_g = g_score[&current];
        let (neighbors, count) = grid.neighbors8(current.0, current.1);
        for &(nx, ny) in &neighbors[..count] {
            let diagonal = nx != current.0 && ny != current.1;
            let Some(cost) = step_cost(grid, request, allowed, nx, ny, diagonal) else {
                continue;
            };
            let tentative = current_g + cost;
            if g_score.get(&(nx, ny)).is_none_or(|&g| tentative < g) {
                g_score.insert((nx, ny), tentative);
                came_from.insert((nx, ny), current);
                let h = heuristic((nx, ny), goal);
                open.push(Reverse((tentative + h, h, (nx, ny))));
            }
        }
    }

    PathResult::failure()
}

fn finish(grid: &WorldGrid, request: &PathRequest, path: Vec<(usize, usize)>) -> PathResult {
    let mut distance = 0.0f32;
    let mut density_sum = 0.0f32;
    for pair in path.windows(2) {
        let diagonal = pair[0].0 != pair[1].0 && pair[0].1 != pair[1].1;
        distance += if diagonal { std::f32::consts::SQRT_2 } else { 1.0 };
    }
    for &(x, y) in &path {
        density_sum += grid.get(x, y).traffic_density;
    }
    let traffic_level = if path.is_empty() {
        0.0
    } else {
        density_sum / path.len() as f32
    };
    let estimated_time_ms =
        distance / request.kind.base_speed() * 1000.0 * (1.0 + traffic_level);
    PathResult {
        path,
        distance,
        estimated_time_ms,
        traffic_level,
        success: true,
    }
}
