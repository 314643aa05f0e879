use std::f64::consts::TAU;

use nalgebra::{Unit, Vector3};
use rand::Rng;
use rand_chacha::ChaChaRng;

/// Boltzmann constant in J/K
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Uniform sample in (0, 1], safe to take the logarithm of
fn open_unit(rng: &mut ChaChaRng) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Sample an ejection speed from a Maxwellian flux at temperature `temperature`
///
/// The flux through a surface weights the Maxwell-Boltzmann distribution by
/// v cos θ, so the reduced energy x = m v² / (2kT) follows a Gamma(2, 1)
/// distribution, sampled here as the sum of two exponential variates.
///
/// # Arguments
/// * `rng` - Random number generator
/// * `temperature` - Surface temperature in K
/// * `particle_mass` - Particle mass in kg
///
/// # Returns
/// Speed in m/s
pub fn sample_thermal_speed(rng: &mut ChaChaRng, temperature: f64, particle_mass: f64) -> f64 {
    let x = -(open_unit(rng) * open_unit(rng)).ln();
    (2.0 * BOLTZMANN * temperature * x / particle_mass).sqrt()
}

/// Cumulative Thompson-Sigmund flux in the reduced variable x = v² / v_b²
fn sputter_cdf(x: f64) -> f64 {
    x * x / (2.0 * (1.0 + x).powi(2))
}

/// Sample a sputtering speed from a Thompson-Sigmund distribution
///
/// The energy spectrum f(E) ∝ E / (E + U)³ truncated at `max_velocity` is
/// inverted analytically: with s = sqrt(2 u F(x_max)), x = s / (1 - s).
///
/// # Arguments
/// * `rng` - Random number generator
/// * `binding_velocity` - Speed corresponding to the surface binding energy (m/s)
/// * `max_velocity` - Cut-off speed (m/s)
///
/// # Returns
/// Speed in m/s, never above `max_velocity`
pub fn sample_sputter_speed(rng: &mut ChaChaRng, binding_velocity: f64, max_velocity: f64) -> f64 {
    let x_max = (max_velocity / binding_velocity).powi(2);
    let u: f64 = rng.random();
    let s = (2.0 * u * sputter_cdf(x_max)).sqrt();
    let x = s / (1.0 - s);
    (binding_velocity * x.sqrt()).min(max_velocity)
}

/// Sample a direction uniformly on the unit sphere
pub fn sample_unit_sphere(rng: &mut ChaChaRng) -> Unit<Vector3<f64>> {
    let z: f64 = 2.0 * rng.random::<f64>() - 1.0;
    let phi = TAU * rng.random::<f64>();
    let rho = (1.0 - z * z).max(0.0).sqrt();
    Unit::new_unchecked(Vector3::new(rho * phi.cos(), rho * phi.sin(), z))
}

/// Sample a cosine-weighted direction in the hemisphere around `normal`
///
/// Directions cluster around the normal with p(θ) ∝ cos θ sin θ, the
/// Lambertian profile of particles leaving a surface.
pub fn sample_cosine_hemisphere(rng: &mut ChaChaRng, normal: &Unit<Vector3<f64>>) -> Unit<Vector3<f64>> {
    let sin_theta = rng.random::<f64>().sqrt();
    let cos_theta = (1.0 - sin_theta * sin_theta).max(0.0).sqrt();
    let phi = TAU * rng.random::<f64>();

    // Orthonormal basis with `normal` as the local z axis
    let helper = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let t1 = normal.cross(&helper).normalize();
    let t2 = normal.cross(&t1);

    Unit::new_normalize(
        t1 * (sin_theta * phi.cos()) + t2 * (sin_theta * phi.sin()) + normal.into_inner() * cos_theta,
    )
}
