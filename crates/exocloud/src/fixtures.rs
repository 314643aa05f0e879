//! Shared test systems, species and engines

use ejecta::sampling::sample_unit_sphere;
use ejecta::{EmissionError, EmissionModel, EmissionParameters, EmissionRequest, SputterParameters, ThermalParameters};
use nbody::StateVector;
use rand_chacha::ChaChaRng;
use units::{Length, Mass, MassRate, Time, Velocity};

use crate::config::{CelestialBodyConfig, IntegrationConfig, OrbitConfig, SimulationConfig, SystemConfig};
use crate::engine::{EngineSnapshot, GravityEngine, OrbitSummary, PhysicsEngine, TracerState};
use crate::error::EngineError;
use crate::id::{ParticleId, SpeciesId};
use crate::species::{ReactionChannel, ReactionNetwork, Species};

pub fn jovian_system() -> SystemConfig {
    SystemConfig {
        bodies: vec![
            CelestialBodyConfig {
                name: "sun".to_string(),
                mass: Mass::from_kg(1.988e30),
                radius: Length::from_meters(6.957e8),
                orbit: None,
            },
            CelestialBodyConfig {
                name: "jupiter".to_string(),
                mass: Mass::from_kg(1.898e27),
                radius: Length::from_meters(6.9911e7),
                orbit: Some(OrbitConfig::circular("sun", Length::from_meters(7.785e11))),
            },
            CelestialBodyConfig {
                name: "europa".to_string(),
                mass: Mass::from_kg(4.799e22),
                radius: Length::from_meters(1.5608e6),
                orbit: Some(OrbitConfig::circular("jupiter", Length::from_meters(6.709e8))),
            },
        ],
        source: "europa".to_string(),
    }
}

pub fn emission() -> EmissionParameters {
    EmissionParameters {
        thermal: Some(ThermalParameters { temperature: 130.0 }),
        sputtering: Some(SputterParameters {
            binding_velocity: Velocity::from_meters_per_sec(2_000.0),
            max_velocity: Velocity::from_km_per_sec(10.0),
        }),
    }
}

/// Sodium with a one hour lifetime
pub fn sodium(n_th: usize, n_sp: usize) -> Species {
    Species {
        id: SpeciesId(1),
        name: "Na".to_string(),
        n_th,
        n_sp,
        mass: Mass::from_amu(23.0),
        mass_rate: MassRate::from_kg_per_second(1.0),
        network: ReactionNetwork::SingleChannel {
            lifetime: Time::from_hours(1.0),
        },
        emission: emission(),
    }
}

/// Neutral sodium decaying into ions through two channels
pub fn sodium_with_ions(n_th: usize) -> Vec<Species> {
    let neutral = Species {
        network: ReactionNetwork::MultiChannel {
            channels: vec![
                ReactionChannel {
                    lifetime: Time::from_hours(2.0),
                    educts: vec!["Na".to_string(), "e".to_string()],
                    products: vec!["Na+".to_string()],
                },
                ReactionChannel {
                    lifetime: Time::from_hours(6.0),
                    educts: vec!["Na".to_string(), "hv".to_string()],
                    products: vec!["Na+".to_string(), "e".to_string()],
                },
            ],
        },
        ..sodium(n_th, 0)
    };
    let ion = Species {
        id: SpeciesId(2),
        name: "Na+".to_string(),
        n_th: 0,
        n_sp: 0,
        network: ReactionNetwork::SingleChannel {
            lifetime: Time::from_days(10.0),
        },
        ..sodium(0, 0)
    };
    vec![neutral, ion]
}

pub fn config(species: Vec<Species>) -> SimulationConfig {
    let mut integration = IntegrationConfig::new(0.01, 4.0);
    integration.workers = Some(2);
    integration.sampling_threads = Some(2);
    integration.seed = 7;
    SimulationConfig {
        integration,
        system: jovian_system(),
        species,
        output: None,
    }
}

pub fn engine(config: &SimulationConfig) -> GravityEngine {
    GravityEngine::from_system(&config.system, &config.integration).unwrap()
}

/// Launches every particle straight up from the surface at a fixed speed
#[derive(Debug, Clone, Copy)]
pub struct RadialBurst {
    pub speed: f64,
}

impl EmissionModel for RadialBurst {
    fn sample(&self, request: &EmissionRequest, rng: &mut ChaChaRng) -> Result<Vec<StateVector>, EmissionError> {
        let radius = request.source_radius.to_meters();
        Ok((0..request.count)
            .map(|_| {
                let n = sample_unit_sphere(rng).into_inner();
                StateVector::new(
                    request.source.position + n * radius,
                    request.source.velocity + n * self.speed,
                )
            })
            .collect())
    }
}

/// Emission model that always fails
#[derive(Debug, Clone, Copy)]
pub struct Broken;

impl EmissionModel for Broken {
    fn sample(&self, _request: &EmissionRequest, _rng: &mut ChaChaRng) -> Result<Vec<StateVector>, EmissionError> {
        Err(EmissionError::invalid("temperature", -1.0))
    }
}

/// Emission model that returns one state too few
#[derive(Debug, Clone, Copy)]
pub struct ShortBatch;

impl EmissionModel for ShortBatch {
    fn sample(&self, request: &EmissionRequest, rng: &mut ChaChaRng) -> Result<Vec<StateVector>, EmissionError> {
        let mut states = RadialBurst { speed: 5_000.0 }.sample(request, rng)?;
        states.pop();
        Ok(states)
    }
}

pub fn tracer(id: ParticleId, position: [f64; 3]) -> TracerState {
    TracerState {
        id,
        position,
        velocity: [0.0; 3],
    }
}

/// Gravity engine that panics during `advance` while `explode` is set
#[derive(Debug, Clone)]
pub struct Fragile {
    pub inner: GravityEngine,
    pub explode: bool,
}

impl PhysicsEngine for Fragile {
    fn add(&mut self, id: ParticleId, state: StateVector) -> Result<(), EngineError> {
        self.inner.add(id, state)
    }

    fn remove(&mut self, id: ParticleId) -> Option<TracerState> {
        self.inner.remove(id)
    }

    fn advance(&mut self, duration: Time) -> Result<Vec<ParticleId>, EngineError> {
        if self.explode {
            panic!("integrator blew up");
        }
        self.inner.advance(duration)
    }

    fn position_velocity(&self, id: ParticleId) -> Option<StateVector> {
        self.inner.position_velocity(id)
    }

    fn body_state(&self, name: &str) -> Result<StateVector, EngineError> {
        self.inner.body_state(name)
    }

    fn body_radius(&self, name: &str) -> Result<Length, EngineError> {
        self.inner.body_radius(name)
    }

    fn orbital_elements(&self, body: &str, primary: &str) -> Result<OrbitSummary, EngineError> {
        self.inner.orbital_elements(body, primary)
    }

    fn tracer_ids(&self) -> Vec<ParticleId> {
        self.inner.tracer_ids()
    }

    fn tracer_count(&self) -> usize {
        self.inner.tracer_count()
    }

    fn active_count(&self) -> usize {
        self.inner.active_count()
    }

    fn drain_tracers(&mut self) -> Vec<TracerState> {
        self.inner.drain_tracers()
    }

    fn sync_active(&mut self, reference: &Self) {
        self.inner.sync_active(&reference.inner)
    }

    fn time(&self) -> Time {
        self.inner.time()
    }

    fn snapshot(&self) -> EngineSnapshot {
        self.inner.snapshot()
    }

    fn restore(&mut self, snapshot: &EngineSnapshot) -> Result<(), EngineError> {
        self.inner.restore(snapshot)
    }
}
