use serde::{Deserialize, Serialize};

use crate::grid::RoadType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntersectionId(pub u32);

/// Signal phase for a lit intersection. Cycles time-driven, no priority
/// logic: `NorthSouth → EastWest → AllStop → NorthSouth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightPhase {
    #[default]
    NorthSouth,
    EastWest,
    AllStop,
}

impl LightPhase {
    pub fn next(self) -> Self {
        match self {
            LightPhase::NorthSouth => LightPhase::EastWest,
            LightPhase::EastWest => LightPhase::AllStop,
            LightPhase::AllStop => LightPhase::NorthSouth,
        }
    }

    /// Whether movement with the given cell delta may enter the intersection.
    /// The dominant axis decides; diagonals pass on either green.
    pub fn allows(self, dx: i32, dy: i32) -> bool {
        match self {
            LightPhase::AllStop => false,
            LightPhase::NorthSouth => dy.abs() >= dx.abs(),
            LightPhase::EastWest => dx.abs() >= dy.abs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: RoadId,
    pub road_type: RoadType,
    pub start: (usize, usize),
    pub end: (usize, usize),
    /// Bresenham-rasterized cells from start to end inclusive.
    pub path: Vec<(usize, usize)>,
    pub lanes: u8,
    pub speed_limit: f32,
    /// Surface condition 0-100; decays slowly, floors at 20.
    pub condition: f32,
    /// Segments reachable from this one (shared cells or radius-1 adjacency).
    pub connected: Vec<RoadId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intersection {
    pub id: IntersectionId,
    pub position: (usize, usize),
    pub connected_roads: Vec<RoadId>,
    /// Intersections with three or more connected segments are signalized.
    pub traffic_lights: bool,
    pub phase: LightPhase,
    pub phase_timer_ms: f32,
}

/// A validated construction plan. `construct_road` refuses invalid
/// blueprints; callers branch on `valid` rather than catching errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadBlueprint {
    pub road_type: RoadType,
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub path: Vec<(usize, usize)>,
    pub valid: bool,
    pub reason: Option<&'static str>,
}

impl RoadBlueprint {
    pub(crate) fn rejected(
        road_type: RoadType,
        start: (usize, usize),
        end: (usize, usize),
        reason: &'static str,
    ) -> Self {
        Self {
            road_type,
            start,
            end,
            path: Vec::new(),
            valid: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    pub segments: usize,
    pub intersections: usize,
    pub signalized_intersections: usize,
    pub total_length_cells: usize,
    pub average_condition: f32,
}

/// Integer Bresenham rasterization from `start` to `end` inclusive.
pub fn bresenham_line(start: (usize, usize), end: (usize, usize)) -> Vec<(usize, usize)> {
    let (mut x0, mut y0) = (start.0 as i64, start.1 as i64);
    let (x1, y1) = (end.0 as i64, end.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::new();
    loop {
        cells.push((x0 as usize, y0 as usize));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    cells
}
