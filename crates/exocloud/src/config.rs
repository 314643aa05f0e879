//! Run configuration
//!
//! Everything a [`crate::Session`] needs is described by a
//! [`SimulationConfig`]. Fields with sensible defaults may be omitted when
//! deserializing.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use units::{Length, Mass};

use crate::error::ConfigError;
use crate::species::{Species, SpeciesCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub integration: IntegrationConfig,
    pub system: SystemConfig,
    pub species: Vec<Species>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

impl SimulationConfig {
    /// Checks the whole configuration and returns the species catalog it describes
    pub fn validate(&self) -> Result<SpeciesCatalog, ConfigError> {
        self.integration.validate()?;
        self.system.validate()?;
        SpeciesCatalog::new(self.species.clone())
    }
}

/// Advance loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Length of one advance as a fraction of the source body's orbital period
    pub advance_fraction: f64,
    /// Integrator steps per advance
    #[serde(default = "default_substeps")]
    pub substeps: usize,
    /// Boundary radius in units of the source semi-major axis
    pub r_max: f64,
    /// Species stop injecting once this many advances have run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_cutoff: Option<u64>,
    #[serde(default = "default_true")]
    pub stop_at_steady_state: bool,
    #[serde(default = "default_steady_state_epsilon")]
    pub steady_state_epsilon: f64,
    /// Tracers standing for fewer physical particles than this are dropped
    #[serde(default = "default_min_physical_particles")]
    pub min_physical_particles: f64,
    /// Worker copies; defaults to the available parallelism
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Threads in the emission sampling pool; defaults to the available parallelism
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_threads: Option<usize>,
    /// Samples per emission batch
    #[serde(default = "default_sampling_chunk")]
    pub sampling_chunk: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_substeps() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_steady_state_epsilon() -> f64 {
    1e-3
}

fn default_min_physical_particles() -> f64 {
    1e6
}

fn default_sampling_chunk() -> usize {
    256
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl IntegrationConfig {
    /// Configuration with every optional field at its default
    pub fn new(advance_fraction: f64, r_max: f64) -> Self {
        Self {
            advance_fraction,
            substeps: default_substeps(),
            r_max,
            generation_cutoff: None,
            stop_at_steady_state: default_true(),
            steady_state_epsilon: default_steady_state_epsilon(),
            min_physical_particles: default_min_physical_particles(),
            workers: None,
            sampling_threads: None,
            sampling_chunk: default_sampling_chunk(),
            seed: 0,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(available_parallelism)
    }

    pub fn sampling_thread_count(&self) -> usize {
        self.sampling_threads.unwrap_or_else(available_parallelism)
    }

    /// True while species still inject during the advance starting at `iteration`
    pub fn generates_at(&self, iteration: u64) -> bool {
        self.generation_cutoff.is_none_or(|cutoff| iteration < cutoff)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::parameter(field, format!("must be positive, got {value}")))
            }
        };

        positive("advance_fraction", self.advance_fraction)?;
        positive("r_max", self.r_max)?;
        positive("steady_state_epsilon", self.steady_state_epsilon)?;
        if !(self.min_physical_particles.is_finite() && self.min_physical_particles >= 0.0) {
            return Err(ConfigError::parameter(
                "min_physical_particles",
                format!("must be non-negative, got {}", self.min_physical_particles),
            ));
        }
        if self.substeps == 0 {
            return Err(ConfigError::parameter("substeps", "must be at least 1"));
        }
        if self.sampling_chunk == 0 {
            return Err(ConfigError::parameter("sampling_chunk", "must be at least 1"));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::parameter("workers", "must be at least 1"));
        }
        if self.sampling_threads == Some(0) {
            return Err(ConfigError::parameter("sampling_threads", "must be at least 1"));
        }
        Ok(())
    }
}

/// Keplerian orbit of a body around a named primary
///
/// Angles are in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub primary: String,
    pub semi_major_axis: Length,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub ascending_node: f64,
    #[serde(default)]
    pub periapsis: f64,
    #[serde(default)]
    pub true_anomaly: f64,
}

impl OrbitConfig {
    pub fn circular(primary: &str, semi_major_axis: Length) -> Self {
        Self {
            primary: primary.to_string(),
            semi_major_axis,
            eccentricity: 0.0,
            inclination: 0.0,
            ascending_node: 0.0,
            periapsis: 0.0,
            true_anomaly: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBodyConfig {
    pub name: String,
    pub mass: Mass,
    pub radius: Length,
    /// Absent for the central body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<OrbitConfig>,
}

/// Gravitating bodies in the order they are placed
///
/// A body's primary must appear before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub bodies: Vec<CelestialBodyConfig>,
    /// Name of the body emitting tracers
    pub source: String,
}

impl SystemConfig {
    pub fn body(&self, name: &str) -> Option<&CelestialBodyConfig> {
        self.bodies.iter().find(|b| b.name == name)
    }

    /// The body the source orbits, against which the boundary is measured
    pub fn primary(&self) -> Result<&str, ConfigError> {
        let source = self
            .body(&self.source)
            .ok_or_else(|| ConfigError::MissingSource(self.source.clone()))?;
        source
            .orbit
            .as_ref()
            .map(|o| o.primary.as_str())
            .ok_or_else(|| ConfigError::SourceWithoutOrbit(self.source.clone()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }

        let mut placed = BTreeSet::new();
        for body in &self.bodies {
            if placed.contains(body.name.as_str()) {
                return Err(ConfigError::DuplicateBody(body.name.clone()));
            }
            if !(body.mass.is_finite() && body.mass.to_kg() > 0.0) {
                return Err(ConfigError::parameter("mass", format!("body '{}' must have positive mass", body.name)));
            }
            if !(body.radius.is_finite() && body.radius.to_meters() > 0.0) {
                return Err(ConfigError::parameter(
                    "radius",
                    format!("body '{}' must have positive radius", body.name),
                ));
            }
            if let Some(orbit) = &body.orbit {
                if !placed.contains(orbit.primary.as_str()) {
                    return Err(ConfigError::UnknownPrimary {
                        body: body.name.clone(),
                        primary: orbit.primary.clone(),
                    });
                }
                if !(orbit.eccentricity >= 0.0 && orbit.eccentricity < 1.0) {
                    return Err(ConfigError::parameter(
                        "eccentricity",
                        format!("orbit of '{}' must be bound, got {}", body.name, orbit.eccentricity),
                    ));
                }
                if !(orbit.semi_major_axis.is_finite() && orbit.semi_major_axis.to_meters() > 0.0) {
                    return Err(ConfigError::parameter(
                        "semi_major_axis",
                        format!("orbit of '{}' must have positive semi-major axis", body.name),
                    ));
                }
            }
            placed.insert(body.name.as_str());
        }

        self.primary().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}
