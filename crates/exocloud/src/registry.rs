//! Provenance and weight bookkeeping for live tracers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use units::Time;

use crate::error::RegistryError;
use crate::id::{ParticleId, SpeciesId};
use crate::species::SpeciesCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub creation_iteration: u64,
    pub species: SpeciesId,
    /// Fraction of the injected population still represented, in (0, 1]
    pub weight: f64,
    /// Weight credited to product species through conversion channels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub product_weights: BTreeMap<SpeciesId, f64>,
}

/// Mapping from live tracer identity to its provenance
///
/// Mutated only by the coordinating thread between advances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleRegistry {
    records: BTreeMap<ParticleId, RegistryRecord>,
}

impl ParticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly injected tracer with weight 1
    pub fn register(
        &mut self,
        id: ParticleId,
        iteration: u64,
        species: SpeciesId,
    ) -> Result<&RegistryRecord, RegistryError> {
        if self.records.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        Ok(self.records.entry(id).or_insert(RegistryRecord {
            creation_iteration: iteration,
            species,
            weight: 1.0,
            product_weights: BTreeMap::new(),
        }))
    }

    /// Returns false if `id` has no record
    pub fn update_weight(&mut self, id: ParticleId, weight: f64) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Changes the species of a tracer in place; the identity is kept
    ///
    /// Returns false if `id` has no record.
    pub fn convert(&mut self, id: ParticleId, species: SpeciesId, iteration: u64) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.species = species;
                record.creation_iteration = iteration;
                true
            }
            None => false,
        }
    }

    /// Adds `weight` to the product weight recorded for `product`
    pub fn add_product_weight(&mut self, id: ParticleId, product: SpeciesId, weight: f64) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                *record.product_weights.entry(product).or_insert(0.0) += weight;
                true
            }
            None => false,
        }
    }

    /// Erases a record; removing an unknown id is a no-op
    pub fn remove(&mut self, id: ParticleId) -> Option<RegistryRecord> {
        self.records.remove(&id)
    }

    pub fn get(&self, id: ParticleId) -> Option<&RegistryRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live identities in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.records.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticleId, &RegistryRecord)> {
        self.records.iter()
    }

    /// Immutable copy of the registry tagged with `iteration`
    pub fn snapshot(&self, iteration: u64) -> RegistrySnapshot {
        RegistrySnapshot {
            iteration,
            records: self.records.clone(),
        }
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            records: snapshot.records,
        }
    }
}

/// One ledger entry: the registry as it stood after `iteration` advances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub iteration: u64,
    pub records: BTreeMap<ParticleId, RegistryRecord>,
}

impl RegistrySnapshot {
    /// Physical particles represented per species, with each advance's
    /// injected mass spread evenly over that advance's tracers
    pub fn physical_population(&self, catalog: &SpeciesCatalog, advance_duration: Time) -> BTreeMap<SpeciesId, f64> {
        let mut population = BTreeMap::new();
        for record in self.records.values() {
            if let Some(species) = catalog.get(record.species) {
                *population.entry(record.species).or_insert(0.0) +=
                    record.weight * species.particles_per_superparticle(advance_duration);
            }
        }
        population
    }

    /// Live tracer count per species
    pub fn species_counts(&self) -> BTreeMap<SpeciesId, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            *counts.entry(record.species).or_insert(0) += 1;
        }
        counts
    }
}
