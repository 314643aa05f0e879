//! Tracer injection from the source body
//!
//! Emission batches are sampled on a dedicated rayon pool. Every batch
//! draws from its own RNG seeded from `(seed, iteration, species, process,
//! chunk)` and batches are collected in submission order, so the injected
//! states and their identities do not depend on thread scheduling.

use std::collections::BTreeMap;

use ejecta::{EmissionError, EmissionModel, EmissionProcess, EmissionRequest};
use log::{debug, warn};
use nbody::StateVector;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use rayon::ThreadPool;
use rayon::prelude::*;
use units::Length;

use crate::engine::PhysicsEngine;
use crate::error::SessionError;
use crate::id::{ParticleId, SpeciesId};
use crate::registry::ParticleRegistry;
use crate::species::{Species, SpeciesCatalog};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one emission batch
pub fn batch_seed(seed: u64, iteration: u64, species: SpeciesId, process: EmissionProcess, chunk: u64) -> u64 {
    [iteration, u64::from(species.0), process.tag(), chunk]
        .into_iter()
        .fold(splitmix64(seed), |acc, part| splitmix64(acc ^ part))
}

/// Settings shared by every batch of one injection pass
#[derive(Debug, Clone, Copy)]
pub struct InjectionContext<'a> {
    pub seed: u64,
    pub iteration: u64,
    pub chunk_size: usize,
    pub source: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionOutcome {
    pub created: usize,
    pub per_species: BTreeMap<SpeciesId, usize>,
    /// Species whose sampling failed and that contributed nothing
    pub failed: Vec<SpeciesId>,
}

/// Samples one process for one species, chunk by chunk on `pool`
fn sample_process<M: EmissionModel>(
    model: &M,
    pool: &ThreadPool,
    ctx: &InjectionContext<'_>,
    species: &Species,
    process: EmissionProcess,
    source: StateVector,
    source_radius: Length,
) -> Result<Vec<StateVector>, EmissionError> {
    let count = species.count(process);
    let chunk_size = ctx.chunk_size.max(1);
    let n_chunks = count.div_ceil(chunk_size);

    let batches: Vec<Result<Vec<StateVector>, EmissionError>> = pool.install(|| {
        (0..n_chunks)
            .into_par_iter()
            .map(|chunk| {
                let request = EmissionRequest {
                    process,
                    parameters: species.emission,
                    particle_mass: species.mass,
                    source,
                    source_radius,
                    count: chunk_size.min(count - chunk * chunk_size),
                };
                let seed = batch_seed(ctx.seed, ctx.iteration, species.id, process, chunk as u64);
                let mut rng = ChaChaRng::seed_from_u64(seed);
                model.sample(&request, &mut rng)
            })
            .collect()
    });

    let mut states = Vec::with_capacity(count);
    for batch in batches {
        states.extend(batch?);
    }
    Ok(states)
}

/// Samples every process of `species`, or explains why the batch is unusable
fn sample_species<M: EmissionModel>(
    model: &M,
    pool: &ThreadPool,
    ctx: &InjectionContext<'_>,
    species: &Species,
    source: StateVector,
    source_radius: Length,
) -> Result<Vec<StateVector>, String> {
    let mut states = Vec::with_capacity(species.tracers_per_advance());
    for process in EmissionProcess::ALL {
        let expected = species.count(process);
        if expected == 0 {
            continue;
        }
        let batch = sample_process(model, pool, ctx, species, process, source, source_radius)
            .map_err(|e| format!("{process} sampling failed: {e}"))?;
        if batch.len() != expected {
            return Err(format!("{process} sampling returned {} of {expected} states", batch.len()));
        }
        if batch.iter().any(|s| !s.is_finite()) {
            return Err(format!("{process} sampling returned non-finite states"));
        }
        states.extend(batch);
    }
    Ok(states)
}

/// Adds this advance's tracers to `engine` and `registry`
///
/// Local indices run over thermal samples first, then sputtered ones. A
/// species whose sampling fails contributes no particles this advance.
pub fn inject<E: PhysicsEngine, M: EmissionModel>(
    engine: &mut E,
    registry: &mut ParticleRegistry,
    catalog: &SpeciesCatalog,
    model: &M,
    pool: &ThreadPool,
    ctx: &InjectionContext<'_>,
) -> Result<InjectionOutcome, SessionError> {
    let source = engine.body_state(ctx.source)?;
    let source_radius = engine.body_radius(ctx.source)?;
    let mut outcome = InjectionOutcome::default();

    for species in catalog.iter().filter(|s| s.tracers_per_advance() > 0) {
        let states = match sample_species(model, pool, ctx, species, source, source_radius) {
            Ok(states) => states,
            Err(reason) => {
                warn!(
                    "iteration {}: species '{}' creates no particles: {}",
                    ctx.iteration, species.name, reason
                );
                outcome.failed.push(species.id);
                continue;
            }
        };

        for (index, state) in states.into_iter().enumerate() {
            let id = ParticleId::new(species.id, ctx.iteration, index as u32);
            engine.add(id, state)?;
            registry.register(id, ctx.iteration, species.id)?;
        }

        let created = species.tracers_per_advance();
        debug!("iteration {}: injected {} '{}' tracers", ctx.iteration, created, species.name);
        outcome.per_species.insert(species.id, created);
        outcome.created += created;
    }

    Ok(outcome)
}
