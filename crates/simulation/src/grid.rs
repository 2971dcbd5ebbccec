use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{GRID_HEIGHT, GRID_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadType {
    Street,
    Avenue,
    Highway,
    /// Pedestrian-only path.
    Footpath,
}

impl RoadType {
    /// Speed limit in grid cells per second.
    pub fn speed_limit(self) -> f32 {
        match self {
            RoadType::Street => 2.0,
            RoadType::Avenue => 3.5,
            RoadType::Highway => 6.0,
            RoadType::Footpath => 1.2,
        }
    }

    pub fn lanes(self) -> u8 {
        match self {
            RoadType::Street => 2,
            RoadType::Avenue => 4,
            RoadType::Highway => 6,
            RoadType::Footpath => 1,
        }
    }

    /// Maximum construction length in cells for a single segment.
    pub fn max_length(self) -> usize {
        match self {
            RoadType::Street => 40,
            RoadType::Avenue => 60,
            RoadType::Highway => 120,
            RoadType::Footpath => 30,
        }
    }

    /// Pathfinding cost multiplier. Highways are cheap for vehicles and
    /// expensive for pedestrians; footpaths the reverse.
    pub fn travel_cost_factor(self, pedestrian: bool) -> f32 {
        if pedestrian {
            match self {
                RoadType::Street => 1.0,
                RoadType::Avenue => 1.3,
                RoadType::Highway => 5.0,
                RoadType::Footpath => 0.7,
            }
        } else {
            match self {
                RoadType::Street => 1.0,
                RoadType::Avenue => 0.8,
                RoadType::Highway => 0.5,
                RoadType::Footpath => 4.0,
            }
        }
    }
}

/// One grid cell. Owned by [`WorldGrid`] for the engine's lifetime; cells are
/// reset, never deleted. Road placement writes `walkable`/`road_type`; the
/// traffic simulation writes `traffic_density`; everyone else reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub walkable: bool,
    pub road_type: Option<RoadType>,
    /// Local congestion in [0, 1].
    pub traffic_density: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            walkable: false,
            road_type: None,
            traffic_density: 0.0,
        }
    }
}

#[derive(Resource, Serialize, Deserialize)]
pub struct WorldGrid {
    pub cells: Vec<Cell>,
    pub width: usize,
    pub height: usize,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl WorldGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) {
        if !self.in_bounds(x, y) {
            warn!("set_walkable out of bounds: ({x}, {y})");
            debug_assert!(false, "set_walkable out of bounds");
            return;
        }
        self.get_mut(x, y).walkable = walkable;
    }

    pub fn set_road_type(&mut self, x: usize, y: usize, road_type: Option<RoadType>) {
        if !self.in_bounds(x, y) {
            warn!("set_road_type out of bounds: ({x}, {y})");
            debug_assert!(false, "set_road_type out of bounds");
            return;
        }
        self.get_mut(x, y).road_type = road_type;
    }

    pub fn set_traffic_density(&mut self, x: usize, y: usize, density: f32) {
        if !self.in_bounds(x, y) {
            warn!("set_traffic_density out of bounds: ({x}, {y})");
            debug_assert!(false, "set_traffic_density out of bounds");
            return;
        }
        self.get_mut(x, y).traffic_density = density.clamp(0.0, 1.0);
    }

    /// Reset a cell to its pristine (unwalkable, roadless) state.
    pub fn reset_cell(&mut self, x: usize, y: usize) {
        if self.in_bounds(x, y) {
            *self.get_mut(x, y) = Cell::default();
        }
    }

    /// Returns up to 8 neighbors (orthogonal + diagonal) and the count of
    /// valid entries. Use `&result[..count]` to iterate.
    pub fn neighbors8(&self, x: usize, y: usize) -> ([(usize, usize); 8], usize) {
        let mut result = [(0usize, 0usize); 8];
        let mut count = 0;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                    result[count] = (nx as usize, ny as usize);
                    count += 1;
                }
            }
        }
        (result, count)
    }
}
