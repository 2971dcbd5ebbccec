//! Building descriptors supplied by the management layer.
//!
//! The engine never constructs buildings itself; the orchestrator feeds the
//! current building set into [`BuildingRegistry`] each tick. Zoning reads it
//! for service flags, pollution sources, and development pressure; city
//! services read it for demand adjustments.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Apartment,
    Shop,
    Office,
    Factory,
    Warehouse,
    PowerPlant,
    WaterTower,
    FireStation,
    PoliceStation,
    Hospital,
    School,
    Park,
}

impl BuildingKind {
    pub fn is_residential(self) -> bool {
        matches!(self, BuildingKind::House | BuildingKind::Apartment)
    }

    pub fn is_industrial(self) -> bool {
        matches!(self, BuildingKind::Factory | BuildingKind::Warehouse)
    }

    pub fn is_job_site(self) -> bool {
        matches!(
            self,
            BuildingKind::Shop | BuildingKind::Office | BuildingKind::Factory | BuildingKind::Warehouse
        )
    }

    pub fn provides_power(self) -> bool {
        matches!(self, BuildingKind::PowerPlant)
    }

    pub fn provides_water(self) -> bool {
        matches!(self, BuildingKind::WaterTower)
    }

    /// Civic buildings satisfy the generic "services nearby" zone flag.
    pub fn is_civic(self) -> bool {
        matches!(
            self,
            BuildingKind::FireStation
                | BuildingKind::PoliceStation
                | BuildingKind::Hospital
                | BuildingKind::School
                | BuildingKind::Park
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub x: usize,
    pub y: usize,
    /// Development level 1-5, mirrors the zone scale.
    pub level: u8,
    pub population: u32,
    pub jobs: u32,
}

impl Building {
    pub fn new(kind: BuildingKind, x: usize, y: usize) -> Self {
        Self {
            kind,
            x,
            y,
            level: 1,
            population: 0,
            jobs: 0,
        }
    }
}

/// The building set the orchestrator exposes to the engine. Replaced (not
/// mutated) by the caller whenever buildings change.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingRegistry {
    pub buildings: Vec<Building>,
}

impl BuildingRegistry {
    pub fn total_population(&self) -> u32 {
        self.buildings.iter().map(|b| b.population).sum()
    }

    pub fn total_jobs(&self) -> u32 {
        self.buildings.iter().map(|b| b.jobs).sum()
    }
}
