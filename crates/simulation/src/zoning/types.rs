use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    Residential,
    Commercial,
    Industrial,
    Mixed,
}

impl ZoneType {
    /// Residential next to heavy industry is the only hard incompatibility;
    /// `Mixed` tolerates everything.
    pub fn compatible_with(self, other: ZoneType) -> bool {
        !matches!(
            (self, other),
            (ZoneType::Residential, ZoneType::Industrial)
                | (ZoneType::Industrial, ZoneType::Residential)
        )
    }

    /// Flat happiness adjustment for living or working in this zone type.
    pub fn happiness_modifier(self) -> f32 {
        match self {
            ZoneType::Residential => 0.0,
            ZoneType::Commercial => 2.0,
            ZoneType::Industrial => -5.0,
            ZoneType::Mixed => 1.0,
        }
    }

    /// Demand a freshly zoned cell starts with.
    pub fn initial_demand(self) -> f32 {
        match self {
            ZoneType::Residential => 60.0,
            ZoneType::Commercial => 50.0,
            ZoneType::Industrial => 40.0,
            ZoneType::Mixed => 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoneDensity {
    #[default]
    Low,
    Medium,
    High,
}

/// One zoned grid cell. Created by `zone_area`, refreshed wholesale by
/// `ZoneMap::update` each slow tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCell {
    pub zone_type: ZoneType,
    pub density: ZoneDensity,
    /// Development level 1-5.
    pub level: u8,
    /// Demand -100..100; positive attracts development.
    pub demand: f32,
    /// Accumulated industrial pollution 0..100.
    pub pollution: f32,
    /// Land value 10..1000.
    pub land_value: f32,
    pub powered: bool,
    pub watered: bool,
    pub road_access: bool,
    pub services_nearby: bool,
    /// Happiness 0..100.
    pub happiness: f32,
}

impl ZoneCell {
    pub fn new(zone_type: ZoneType, density: ZoneDensity) -> Self {
        Self {
            zone_type,
            density,
            level: 1,
            demand: zone_type.initial_demand(),
            pollution: 0.0,
            land_value: 100.0,
            powered: false,
            watered: false,
            road_access: false,
            services_nearby: false,
            happiness: 50.0,
        }
    }

    pub fn satisfied_flags(&self) -> u32 {
        [self.powered, self.watered, self.road_access, self.services_nearby]
            .iter()
            .filter(|&&f| f)
            .count() as u32
    }
}

/// Outcome of a bulk zoning request. All-or-nothing: a single bad target
/// cell rejects the whole rectangle.
#[derive(Debug, Clone)]
pub struct ZoneAreaResult {
    pub success: bool,
    pub cells_zoned: usize,
    pub reason: Option<&'static str>,
}

impl ZoneAreaResult {
    pub fn rejected(reason: &'static str) -> Self {
        Self {
            success: false,
            cells_zoned: 0,
            reason: Some(reason),
        }
    }
}

/// Citywide aggregates recomputed at the start of every zoning update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalFactors {
    pub population: u32,
    pub jobs: u32,
    /// Filled jobs over workforce, 0..1.
    pub employment_rate: f32,
    pub average_pollution: f32,
    pub average_happiness: f32,
    /// Composite 0..1 health of the local economy.
    pub economy_index: f32,
}

/// Citywide demand for one zone type at each density tier, -100..100.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DemandLevels {
    pub residential: f32,
    pub commercial: f32,
    pub industrial: f32,
}

impl DemandLevels {
    pub fn for_type(&self, zone_type: ZoneType) -> f32 {
        match zone_type {
            ZoneType::Residential => self.residential,
            ZoneType::Commercial => self.commercial,
            ZoneType::Industrial => self.industrial,
            // Mixed zones track the blended center of the market.
            ZoneType::Mixed => (self.residential + self.commercial) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneDemand {
    pub low: DemandLevels,
    pub medium: DemandLevels,
    pub high: DemandLevels,
}

impl ZoneDemand {
    pub fn for_density(&self, density: ZoneDensity) -> &DemandLevels {
        match density {
            ZoneDensity::Low => &self.low,
            ZoneDensity::Medium => &self.medium,
            ZoneDensity::High => &self.high,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneStats {
    pub total_cells: usize,
    pub residential: usize,
    pub commercial: usize,
    pub industrial: usize,
    pub mixed: usize,
    pub average_happiness: f32,
    pub average_land_value: f32,
    pub average_level: f32,
}
