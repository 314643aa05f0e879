//! Particle and species identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique tracer identity
///
/// Built from the species, the iteration that created the particle and a
/// per-species index within that iteration. Written as `species_iteration_index`.
///
/// # Examples
///
/// ```
/// use exocloud::{ParticleId, SpeciesId};
///
/// let id = ParticleId::new(SpeciesId(2), 14, 371);
/// assert_eq!(id.to_string(), "2_14_371");
/// assert_eq!("2_14_371".parse::<ParticleId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticleId {
    pub species: SpeciesId,
    pub iteration: u64,
    pub index: u32,
}

impl ParticleId {
    pub fn new(species: SpeciesId, iteration: u64, index: u32) -> Self {
        Self {
            species,
            iteration,
            index,
        }
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.species, self.iteration, self.index)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed particle id '{0}'")]
pub struct ParseParticleIdError(String);

impl FromStr for ParticleId {
    type Err = ParseParticleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseParticleIdError(s.to_string());
        let mut parts = s.split('_');
        let (Some(species), Some(iteration), Some(index), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        Ok(ParticleId {
            species: SpeciesId(species.parse().map_err(|_| malformed())?),
            iteration: iteration.parse().map_err(|_| malformed())?,
            index: index.parse().map_err(|_| malformed())?,
        })
    }
}

impl TryFrom<String> for ParticleId {
    type Error = ParseParticleIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParticleId> for String {
    fn from(id: ParticleId) -> Self {
        id.to_string()
    }
}
