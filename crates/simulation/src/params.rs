//! Data-driven simulation parameters.
//!
//! Extracts the zoning/demand formula coefficients into a single
//! [`SimParams`] resource so tests can pin them and callers can tune them
//! without recompilation. One canonical coefficient set -- no legacy variant.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Coefficients for the citywide demand curves and per-cell zone formulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoningParams {
    /// Radius (cells, Chebyshev) for service-flag scans around a zone cell.
    pub service_radius: i32,
    /// Radius (cells, Chebyshev) for industrial pollution accumulation.
    pub pollution_radius: i32,
    /// Pollution contribution at distance d is `max(0, base - falloff * d)`.
    pub pollution_base: f32,
    pub pollution_falloff: f32,
    /// Happiness penalty per pollution point.
    pub pollution_happiness_weight: f32,
    /// Happiness bonus per satisfied service flag.
    pub service_happiness_bonus: f32,
    /// Blend weight kept from the previous land value during smoothing
    /// (the remainder comes from the 3-cell neighborhood average).
    pub land_value_inertia: f32,
    /// Radius (cells, Chebyshev) of the land-value smoothing neighborhood.
    pub land_value_radius: i32,
}

impl Default for ZoningParams {
    fn default() -> Self {
        Self {
            service_radius: 10,
            pollution_radius: 15,
            pollution_base: 50.0,
            pollution_falloff: 3.0,
            pollution_happiness_weight: 0.3,
            service_happiness_bonus: 5.0,
            land_value_inertia: 0.8,
            land_value_radius: 3,
        }
    }
}

/// Coefficients for service demand and emergency response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceParams {
    /// Minimum and maximum emergency response times (simulated ms).
    pub min_response_ms: f64,
    pub max_response_ms: f64,
    /// Response time shrinks by `coverage * response_range_ms`.
    pub response_range_ms: f64,
    /// Effectiveness is `min(1, coverage * effectiveness_multiplier)`.
    pub effectiveness_multiplier: f32,
    /// Per-tick probability of a random incident somewhere in the city.
    pub random_incident_chance: f64,
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self {
            min_response_ms: 5_000.0,
            max_response_ms: 60_000.0,
            response_range_ms: 55_000.0,
            effectiveness_multiplier: 1.5,
            random_incident_chance: 0.002,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimParams {
    pub zoning: ZoningParams,
    pub services: ServiceParams,
}
