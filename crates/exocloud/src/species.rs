//! Species catalog and reaction networks

use std::collections::{BTreeMap, BTreeSet};

use ejecta::{EmissionParameters, EmissionProcess};
use serde::{Deserialize, Serialize};
use units::{Mass, MassRate, Time};

use crate::error::ConfigError;
use crate::id::SpeciesId;

/// One loss channel of a multi-channel network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionChannel {
    pub lifetime: Time,
    #[serde(default)]
    pub educts: Vec<String>,
    /// Species names produced by this channel
    #[serde(default)]
    pub products: Vec<String>,
}

impl ReactionChannel {
    /// Loss rate 1/τ in s⁻¹
    pub fn rate(&self) -> f64 {
        1.0 / self.lifetime.to_seconds()
    }
}

/// Loss channels of a species
///
/// # Examples
///
/// ```
/// use exocloud::ReactionNetwork;
/// use units::Time;
///
/// let network = ReactionNetwork::SingleChannel { lifetime: Time::from_hours(1.0) };
/// let p = network.survival(Time::from_seconds(1800.0));
/// assert!((p - (-0.5f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReactionNetwork {
    SingleChannel { lifetime: Time },
    MultiChannel { channels: Vec<ReactionChannel> },
}

impl ReactionNetwork {
    /// Total loss rate Σ 1/τ_j in s⁻¹
    pub fn total_rate(&self) -> f64 {
        match self {
            ReactionNetwork::SingleChannel { lifetime } => 1.0 / lifetime.to_seconds(),
            ReactionNetwork::MultiChannel { channels } => channels.iter().map(ReactionChannel::rate).sum(),
        }
    }

    /// Probability of surviving every channel for `dt`, Π exp(-dt/τ_j)
    pub fn survival(&self, dt: Time) -> f64 {
        (-dt.to_seconds() * self.total_rate()).exp()
    }

    /// Channels with their share of the total loss rate, in declaration order
    pub fn channel_shares(&self) -> Vec<(&ReactionChannel, f64)> {
        match self {
            ReactionNetwork::SingleChannel { .. } => Vec::new(),
            ReactionNetwork::MultiChannel { channels } => {
                let total = self.total_rate();
                channels.iter().map(|c| (c, c.rate() / total)).collect()
            }
        }
    }

    fn lifetimes(&self) -> Vec<Time> {
        match self {
            ReactionNetwork::SingleChannel { lifetime } => vec![*lifetime],
            ReactionNetwork::MultiChannel { channels } => channels.iter().map(|c| c.lifetime).collect(),
        }
    }
}

/// Static description of an emitted species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    /// Thermally evaporated tracers per advance
    #[serde(default)]
    pub n_th: usize,
    /// Sputtered tracers per advance
    #[serde(default)]
    pub n_sp: usize,
    pub mass: Mass,
    pub mass_rate: MassRate,
    pub network: ReactionNetwork,
    #[serde(default)]
    pub emission: EmissionParameters,
}

impl Species {
    pub fn count(&self, process: EmissionProcess) -> usize {
        match process {
            EmissionProcess::Thermal => self.n_th,
            EmissionProcess::Sputtering => self.n_sp,
        }
    }

    pub fn tracers_per_advance(&self) -> usize {
        self.n_th + self.n_sp
    }

    /// Physical particles a tracer of `weight` stands for after one advance of `duration`
    ///
    /// `weight × mass_rate × duration / mass`, the quantity compared against
    /// the representativeness threshold.
    pub fn physical_particles(&self, weight: f64, duration: Time) -> f64 {
        weight * self.mass_rate.integrate(duration).to_kg() / self.mass.to_kg()
    }

    /// Physical particles carried by one fresh tracer when the advance's
    /// injected mass is shared evenly over all tracers of the species
    pub fn particles_per_superparticle(&self, duration: Time) -> f64 {
        match self.tracers_per_advance() {
            0 => 0.0,
            n => self.physical_particles(1.0, duration) / n as f64,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::species(&self.name, message);

        if self.name.is_empty() {
            return Err(ConfigError::species(self.id.to_string(), "name is empty"));
        }
        if !(self.mass.is_finite() && self.mass.to_kg() > 0.0) {
            return Err(invalid("mass must be positive"));
        }
        if !(self.mass_rate.is_finite() && self.mass_rate.to_kg_per_second() >= 0.0) {
            return Err(invalid("mass rate must be non-negative"));
        }

        let lifetimes = self.network.lifetimes();
        if lifetimes.is_empty() {
            return Err(invalid("reaction network has no channels"));
        }
        if lifetimes.iter().any(|t| !(t.is_finite() && t.to_seconds() > 0.0)) {
            return Err(invalid("lifetimes must be positive"));
        }

        for process in EmissionProcess::ALL {
            if self.count(process) > 0 && !self.emission.has(process) {
                return Err(invalid(&format!("emits {process} particles without {process} parameters")));
            }
        }
        self.emission
            .validate()
            .map_err(|e| invalid(&e.to_string()))
    }
}

/// Validated, read-only set of species
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCatalog {
    species: BTreeMap<SpeciesId, Species>,
}

impl SpeciesCatalog {
    /// Builds a catalog, rejecting duplicate ids or names and invalid entries
    pub fn new(species: Vec<Species>) -> Result<Self, ConfigError> {
        if species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }

        let mut names = BTreeSet::new();
        let mut by_id = BTreeMap::new();
        for s in species {
            s.validate()?;
            if !names.insert(s.name.clone()) {
                return Err(ConfigError::DuplicateSpeciesName(s.name));
            }
            if by_id.contains_key(&s.id) {
                return Err(ConfigError::DuplicateSpecies(s.id));
            }
            by_id.insert(s.id, s);
        }

        Ok(Self { species: by_id })
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Species> {
        self.species.values().find(|s| s.name == name)
    }

    /// Species in id order
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
