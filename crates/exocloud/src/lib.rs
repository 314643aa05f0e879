//! Tracer-particle population engine for exospheric clouds.
//!
//! A [`Session`] owns one run: it injects tracer particles from a source
//! body, decays their statistical weights, fans the population out over
//! worker copies of the gravitational system, merges the results back, and
//! persists the registry ledger and a simulation snapshot after every
//! advance.
//!
//! The gravitational side is abstracted behind [`PhysicsEngine`];
//! [`GravityEngine`] implements it on top of the `nbody` crate. Ejecta
//! sampling is delegated to an [`ejecta::EmissionModel`].

pub mod config;
pub mod coordinator;
pub mod decay;
pub mod engine;
pub mod error;
pub mod id;
pub mod injection;
pub mod merge;
pub mod persistence;
pub mod registry;
pub mod session;
pub mod species;

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod persistence_test;

pub use config::{
    CelestialBodyConfig, IntegrationConfig, OrbitConfig, OutputConfig, SimulationConfig, SystemConfig,
};
pub use engine::{ActiveBody, EngineSnapshot, GravityEngine, OrbitSummary, PhysicsEngine, TracerState};
pub use error::{ConfigError, EngineError, PersistenceError, RegistryError, SessionError};
pub use id::{ParticleId, SpeciesId};
pub use persistence::{RunManifest, RunStore};
pub use registry::{ParticleRegistry, RegistryRecord, RegistrySnapshot};
pub use session::{AdvancePhase, AdvanceReport, RunSummary, Session};
pub use species::{ReactionChannel, ReactionNetwork, Species, SpeciesCatalog};
