//! Emission processes and their per-species parameters

use std::fmt;

use serde::{Deserialize, Serialize};
use units::Velocity;

use crate::error::EmissionError;

/// Physical process releasing particles from the source surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionProcess {
    Thermal,
    Sputtering,
}

impl EmissionProcess {
    pub const ALL: [EmissionProcess; 2] = [EmissionProcess::Thermal, EmissionProcess::Sputtering];

    /// Small stable tag used when deriving per-batch seeds
    pub fn tag(self) -> u64 {
        match self {
            EmissionProcess::Thermal => 1,
            EmissionProcess::Sputtering => 2,
        }
    }
}

impl fmt::Display for EmissionProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionProcess::Thermal => write!(f, "thermal"),
            EmissionProcess::Sputtering => write!(f, "sputtering"),
        }
    }
}

/// Thermal evaporation at a fixed surface temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalParameters {
    /// Surface temperature in Kelvin
    pub temperature: f64,
}

/// Thompson-Sigmund sputtering with a cut-off speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SputterParameters {
    /// Speed corresponding to the surface binding energy
    pub binding_velocity: Velocity,
    /// Maximum ejection speed
    pub max_velocity: Velocity,
}

/// Emission parameters of one species
///
/// A species emitting by a process must carry that process's parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sputtering: Option<SputterParameters>,
}

impl EmissionParameters {
    pub fn has(&self, process: EmissionProcess) -> bool {
        match process {
            EmissionProcess::Thermal => self.thermal.is_some(),
            EmissionProcess::Sputtering => self.sputtering.is_some(),
        }
    }

    /// Checks that every configured process has physically meaningful values
    pub fn validate(&self) -> Result<(), EmissionError> {
        if let Some(thermal) = self.thermal {
            if !(thermal.temperature.is_finite() && thermal.temperature > 0.0) {
                return Err(EmissionError::invalid("temperature", thermal.temperature));
            }
        }
        if let Some(sputter) = self.sputtering {
            let vb = sputter.binding_velocity.to_meters_per_sec();
            let vmax = sputter.max_velocity.to_meters_per_sec();
            if !(vb.is_finite() && vb > 0.0) {
                return Err(EmissionError::invalid("binding_velocity", vb));
            }
            if !(vmax.is_finite() && vmax > 0.0) {
                return Err(EmissionError::invalid("max_velocity", vmax));
            }
        }
        Ok(())
    }
}
