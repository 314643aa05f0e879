//! Emission models producing tracer launch states

use nbody::StateVector;
use rand_chacha::ChaChaRng;
use units::{Length, Mass};

use crate::error::EmissionError;
use crate::process::{EmissionParameters, EmissionProcess};
use crate::sampling::{sample_cosine_hemisphere, sample_sputter_speed, sample_thermal_speed, sample_unit_sphere};

/// One batch of particles to launch from the source body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionRequest {
    pub process: EmissionProcess,
    pub parameters: EmissionParameters,
    pub particle_mass: Mass,
    /// Source body state in the simulation frame
    pub source: StateVector,
    pub source_radius: Length,
    pub count: usize,
}

/// Samples launch states for newly emitted particles
///
/// Implementations must be deterministic for a given RNG state; the caller
/// seeds one RNG per batch.
pub trait EmissionModel: Send + Sync {
    /// Returns `request.count` state vectors in the simulation frame
    fn sample(&self, request: &EmissionRequest, rng: &mut ChaChaRng) -> Result<Vec<StateVector>, EmissionError>;
}

/// Launches particles from a random point on the source surface
///
/// Each particle starts on the surface of the source body, moving with the
/// body plus an ejection velocity drawn along a cosine-weighted direction
/// about the local surface normal.
///
/// # Examples
///
/// ```
/// use ejecta::{EmissionModel, EmissionParameters, EmissionProcess, EmissionRequest, SurfaceEmission, ThermalParameters};
/// use nbody::StateVector;
/// use rand::SeedableRng;
/// use rand_chacha::ChaChaRng;
/// use units::{Length, Mass};
///
/// let request = EmissionRequest {
///     process: EmissionProcess::Thermal,
///     parameters: EmissionParameters {
///         thermal: Some(ThermalParameters { temperature: 130.0 }),
///         sputtering: None,
///     },
///     particle_mass: Mass::from_amu(23.0),
///     source: StateVector::from_components([0.0; 6]),
///     source_radius: Length::from_km(1560.8),
///     count: 10,
/// };
///
/// let mut rng = ChaChaRng::seed_from_u64(1);
/// let states = SurfaceEmission.sample(&request, &mut rng).unwrap();
/// assert_eq!(states.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceEmission;

impl SurfaceEmission {
    fn speed_sampler(
        request: &EmissionRequest,
    ) -> Result<Box<dyn Fn(&mut ChaChaRng) -> f64>, EmissionError> {
        let missing = EmissionError::MissingParameters { process: request.process };
        match request.process {
            EmissionProcess::Thermal => {
                let thermal = request.parameters.thermal.ok_or(missing)?;
                let mass = request.particle_mass.to_kg();
                Ok(Box::new(move |rng| sample_thermal_speed(rng, thermal.temperature, mass)))
            }
            EmissionProcess::Sputtering => {
                let sputter = request.parameters.sputtering.ok_or(missing)?;
                let vb = sputter.binding_velocity.to_meters_per_sec();
                let vmax = sputter.max_velocity.to_meters_per_sec();
                Ok(Box::new(move |rng| sample_sputter_speed(rng, vb, vmax)))
            }
        }
    }
}

impl EmissionModel for SurfaceEmission {
    fn sample(&self, request: &EmissionRequest, rng: &mut ChaChaRng) -> Result<Vec<StateVector>, EmissionError> {
        request.parameters.validate()?;
        let mass = request.particle_mass.to_kg();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(EmissionError::invalid("particle_mass", mass));
        }
        let radius = request.source_radius.to_meters();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(EmissionError::invalid("source_radius", radius));
        }

        let speed = Self::speed_sampler(request)?;

        Ok((0..request.count)
            .map(|_| {
                let normal = sample_unit_sphere(rng);
                let direction = sample_cosine_hemisphere(rng, &normal);
                let v = speed(rng);
                StateVector::new(
                    request.source.position + normal.into_inner() * radius,
                    request.source.velocity + direction.into_inner() * v,
                )
            })
            .collect())
    }
}
