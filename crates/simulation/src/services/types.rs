use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;

/// Every municipal service the engine models. Closed set; matches are
/// exhaustive so a new service is a compile error at every site that cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Fire,
    Police,
    Health,
    Education,
    Parks,
    Utilities,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Fire,
        ServiceType::Police,
        ServiceType::Health,
        ServiceType::Education,
        ServiceType::Parks,
        ServiceType::Utilities,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            ServiceType::Fire => 0,
            ServiceType::Police => 1,
            ServiceType::Health => 2,
            ServiceType::Education => 3,
            ServiceType::Parks => 4,
            ServiceType::Utilities => 5,
        }
    }

    /// Baseline demand per resident.
    pub fn base_per_capita(self) -> f32 {
        match self {
            ServiceType::Fire => 0.05,
            ServiceType::Police => 0.08,
            ServiceType::Health => 0.10,
            ServiceType::Education => 0.12,
            ServiceType::Parks => 0.06,
            ServiceType::Utilities => 0.15,
        }
    }

    /// Extra demand a building of `kind` adds on top of the per-capita
    /// baseline. Industry strains fire and police; homes strain schools.
    pub fn demand_adjustment(self, kind: BuildingKind) -> f32 {
        match (self, kind) {
            (ServiceType::Fire, BuildingKind::Factory) => 20.0,
            (ServiceType::Fire, BuildingKind::Warehouse) => 10.0,
            (ServiceType::Fire, BuildingKind::PowerPlant) => 15.0,
            (ServiceType::Police, BuildingKind::Shop) => 5.0,
            (ServiceType::Police, BuildingKind::Factory) => 8.0,
            (ServiceType::Police, BuildingKind::Park) => -3.0,
            (ServiceType::Health, BuildingKind::Factory) => 10.0,
            (ServiceType::Education, BuildingKind::House) => 2.0,
            (ServiceType::Education, BuildingKind::Apartment) => 6.0,
            (ServiceType::Parks, BuildingKind::Apartment) => 4.0,
            (ServiceType::Utilities, BuildingKind::Factory) => 12.0,
            (ServiceType::Utilities, BuildingKind::Apartment) => 5.0,
            _ => 0.0,
        }
    }

    /// Default sizing for a new building of this service.
    pub fn default_capacity(self) -> f32 {
        match self {
            ServiceType::Fire => 80.0,
            ServiceType::Police => 100.0,
            ServiceType::Health => 120.0,
            ServiceType::Education => 150.0,
            ServiceType::Parks => 60.0,
            ServiceType::Utilities => 200.0,
        }
    }

    pub fn default_radius(self) -> f32 {
        match self {
            ServiceType::Fire => 12.0,
            ServiceType::Police => 14.0,
            ServiceType::Health => 16.0,
            ServiceType::Education => 10.0,
            ServiceType::Parks => 6.0,
            ServiceType::Utilities => 20.0,
        }
    }

    pub fn default_maintenance(self) -> f32 {
        match self {
            ServiceType::Fire => 400.0,
            ServiceType::Police => 350.0,
            ServiceType::Health => 600.0,
            ServiceType::Education => 450.0,
            ServiceType::Parks => 100.0,
            ServiceType::Utilities => 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceBuildingId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBuilding {
    pub id: ServiceBuildingId,
    pub service: ServiceType,
    pub position: (usize, usize),
    pub capacity: f32,
    pub load: f32,
    /// Operating efficiency 0.5..1.
    pub efficiency: f32,
    /// Coverage radius in cells.
    pub radius: f32,
    pub maintenance: f32,
    pub staff: u32,
    pub max_staff: u32,
}

impl ServiceBuilding {
    /// Painted coverage strength at the building itself. Understaffing
    /// scales it down.
    pub fn effectiveness(&self) -> f32 {
        let staffing = if self.max_staff == 0 {
            1.0
        } else {
            self.staff as f32 / self.max_staff as f32
        };
        self.efficiency * staffing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmergencyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyKind {
    Fire,
    Crime,
    Medical,
}

impl EmergencyKind {
    pub fn service(self) -> ServiceType {
        match self {
            EmergencyKind::Fire => ServiceType::Fire,
            EmergencyKind::Crime => ServiceType::Police,
            EmergencyKind::Medical => ServiceType::Health,
        }
    }
}

/// An in-flight incident. Resolution is scheduled against simulated time at
/// spawn; nothing here ever touches the wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub id: EmergencyId,
    pub kind: EmergencyKind,
    pub position: (usize, usize),
    /// Severity 0..1 scales the base incident duration.
    pub severity: f32,
    pub spawned_at_ms: f64,
    pub response_time_ms: f64,
    pub effectiveness: f32,
    pub resolve_at_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub buildings: usize,
    pub capacity: f32,
    pub demand: f32,
    /// `capacity / demand`, capped at 1 (full coverage when demand is zero).
    pub coverage: f32,
    /// Coverage scaled by average building efficiency.
    pub satisfaction: f32,
}
