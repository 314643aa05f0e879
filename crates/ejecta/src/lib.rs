//! Ejecta sampling for surface-bound exospheres.
//!
//! An [`EmissionModel`] turns a request ("N thermal particles of this mass
//! from this body") into Cartesian state vectors in the simulation frame.
//! [`SurfaceEmission`] launches particles from uniformly distributed surface
//! points along cosine-weighted directions, with speeds drawn from a
//! Maxwellian flux (thermal evaporation) or a Thompson-Sigmund
//! distribution (sputtering).

pub mod error;
pub mod model;
pub mod process;
pub mod sampling;

#[cfg(test)]
mod sampling_test;

pub use error::EmissionError;
pub use model::{EmissionModel, EmissionRequest, SurfaceEmission};
pub use process::{EmissionParameters, EmissionProcess, SputterParameters, ThermalParameters};
