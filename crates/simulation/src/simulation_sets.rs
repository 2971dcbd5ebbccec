//! Deterministic simulation ordering via `SystemSet` phases.
//!
//! Within one tick, subsystems must run in dependency order because each
//! reads state the previous phase just wrote:
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – clock advance, traffic-light phase cycling, zoning update,
//!   service demand. Sets up the per-tick state the core simulation reads.
//! * **Simulation** – vehicle/pedestrian movement, congestion rebuild (which
//!   feeds pathfinding costs), emergency dispatch (reads the demand and
//!   coverage PreSim produced).
//! * **PostSim** – public transit (reads traffic output) and stat refreshes.
//!
//! Systems that write a shared grid (`WorldGrid` densities, `CongestionGrid`)
//! carry an explicit `.after()` on the system that produces their input.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain in [`crate::SimulationPlugin`]. Plugins use
/// `.in_set(SimulationSet::X)` when registering systems, adding fine-grained
/// `.after()` constraints within a phase where needed.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Clock, traffic lights, zoning, service demand.
    PreSim,
    /// Agent movement, congestion feedback, emergencies.
    Simulation,
    /// Transit and aggregate stats.
    PostSim,
}
