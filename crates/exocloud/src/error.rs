//! Error types for exocloud runs.
//!
//! Configuration problems surface at session start. Anything returned as a
//! [`SessionError`] from an advance is fatal and poisons the session.

use std::path::PathBuf;

use thiserror::Error;

use crate::id::{ParticleId, SpeciesId};

/// Invalid or incomplete run configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no celestial bodies configured")]
    NoBodies,

    #[error("celestial body '{0}' is defined more than once")]
    DuplicateBody(String),

    #[error("source body '{0}' is not among the configured bodies")]
    MissingSource(String),

    #[error("source body '{0}' has no orbit, so no boundary can be derived")]
    SourceWithoutOrbit(String),

    #[error("body '{body}' orbits unknown primary '{primary}'")]
    UnknownPrimary { body: String, primary: String },

    #[error("orbit of '{0}' is unbound, so it has no period")]
    UnboundSource(String),

    #[error("no species configured")]
    NoSpecies,

    #[error("species {0} is defined more than once")]
    DuplicateSpecies(SpeciesId),

    #[error("species name '{0}' is used more than once")]
    DuplicateSpeciesName(String),

    #[error("species '{species}': {message}")]
    InvalidSpecies { species: String, message: String },

    #[error("invalid {field}: {message}")]
    InvalidParameter { field: &'static str, message: String },
}

impl ConfigError {
    pub fn species(species: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidSpecies {
            species: species.into(),
            message: message.into(),
        }
    }

    pub fn parameter(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}

/// Failure reported by a physics engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown body '{0}'")]
    UnknownBody(String),

    #[error("particle {0} is already present in the engine")]
    DuplicateParticle(ParticleId),

    #[error("non-finite state for {0}")]
    NonFinite(String),

    #[error("snapshot is inconsistent: {0}")]
    InvalidSnapshot(String),
}

/// Bookkeeping violations in the particle registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("particle {0} is already registered")]
    Duplicate(ParticleId),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("atomic write failed: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("{0} was already persisted and is never overwritten")]
    AlreadyPersisted(PathBuf),

    #[error("iteration {iteration}: {message}")]
    Inconsistent { iteration: u64, message: String },

    #[error("no persisted iterations found in {0}")]
    Empty(PathBuf),

    #[error("iteration {iteration} is not the latest complete iteration {latest}")]
    NotLatest { iteration: u64, latest: u64 },
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Fatal errors ending a run
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    #[error("could not start worker thread: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("could not build sampling pool: {0}")]
    SamplingPool(String),

    #[error("session was poisoned by an earlier fatal error")]
    Poisoned,
}

impl SessionError {
    pub fn worker(worker: usize, reason: impl Into<String>) -> Self {
        SessionError::WorkerFailed {
            worker,
            reason: reason.into(),
        }
    }
}
