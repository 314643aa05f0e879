//! Keplerian orbital elements and conversion to and from Cartesian states
//!
//! Angles are in radians, distances in meters, and the gravitational
//! parameter `mu` in m³/s².

use std::f64::consts::TAU;

use nalgebra::{Point3, Rotation3, Vector3};

use crate::body::StateVector;

const EPSILON: f64 = 1e-10;

/// Classical orbital elements of a two-body orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis (m), negative for hyperbolic orbits
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    /// Longitude of the ascending node
    pub ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub true_anomaly: f64,
}

impl OrbitalElements {
    /// Circular, equatorial orbit of radius `semi_major_axis` starting on the +x axis
    pub fn circular(semi_major_axis: f64) -> Self {
        Self {
            semi_major_axis,
            eccentricity: 0.0,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            true_anomaly: 0.0,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0 && self.semi_major_axis > 0.0
    }

    /// Orbital period in seconds, None for unbound orbits
    pub fn period(&self, mu: f64) -> Option<f64> {
        self.is_bound()
            .then(|| TAU * (self.semi_major_axis.powi(3) / mu).sqrt())
    }

    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Apoapsis distance in meters, None for unbound orbits
    pub fn apoapsis(&self) -> Option<f64> {
        self.is_bound()
            .then(|| self.semi_major_axis * (1.0 + self.eccentricity))
    }
}

/// Orbital elements together with the gravitational parameter they were computed for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub elements: OrbitalElements,
    pub mu: f64,
}

impl Orbit {
    pub fn period(&self) -> Option<f64> {
        self.elements.period(self.mu)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.elements.semi_major_axis
    }
}

fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Signed angle from `from` to `to` measured about `axis`
fn angle_about(from: &Vector3<f64>, to: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    wrap_angle(axis.dot(&from.cross(to)).atan2(from.dot(to)))
}

/// Converts a relative state vector into orbital elements
///
/// Circular orbits get argument of periapsis 0 and measure the true anomaly
/// from the ascending node. Equatorial orbits get ascending node 0 and
/// measure from the +x axis.
///
/// # Examples
///
/// ```
/// use nbody::StateVector;
/// use nbody::orbit::cartesian_to_orbital_elements;
///
/// let mu: f64 = 3.986e14;
/// let r = 7.0e6;
/// let v = (mu / r).sqrt();
/// let state = StateVector::from_components([r, 0.0, 0.0, 0.0, v, 0.0]);
///
/// let elements = cartesian_to_orbital_elements(&state, mu);
/// assert!((elements.semi_major_axis - r).abs() < 1.0);
/// assert!(elements.eccentricity < 1e-9);
/// ```
pub fn cartesian_to_orbital_elements(state: &StateVector, mu: f64) -> OrbitalElements {
    let r = state.position.coords;
    let v = state.velocity;
    let r_mag = r.magnitude();

    let h = r.cross(&v);
    let h_hat = h.normalize();
    let node = Vector3::z().cross(&h);
    let e_vec = ((v.magnitude_squared() - mu / r_mag) * r - r.dot(&v) * v) / mu;
    let eccentricity = e_vec.magnitude();

    let energy = v.magnitude_squared() / 2.0 - mu / r_mag;
    let semi_major_axis = -mu / (2.0 * energy);

    let inclination = (h.z / h.magnitude()).clamp(-1.0, 1.0).acos();

    let (ascending_node, reference) = if node.magnitude() > EPSILON * h.magnitude() {
        (wrap_angle(node.y.atan2(node.x)), node.normalize())
    } else {
        (0.0, Vector3::x())
    };

    let (argument_of_periapsis, true_anomaly) = if eccentricity > EPSILON {
        (
            angle_about(&reference, &e_vec, &h_hat),
            angle_about(&e_vec, &r, &h_hat),
        )
    } else {
        (0.0, angle_about(&reference, &r, &h_hat))
    };

    OrbitalElements {
        semi_major_axis,
        eccentricity,
        inclination,
        ascending_node,
        argument_of_periapsis,
        true_anomaly,
    }
}

/// Converts orbital elements into a state vector relative to the primary
///
/// # Examples
///
/// ```
/// use nbody::OrbitalElements;
/// use nbody::orbit::orbital_elements_to_cartesian;
///
/// let mu = 3.986e14;
/// let state = orbital_elements_to_cartesian(&OrbitalElements::circular(7.0e6), mu);
///
/// assert!((state.position.x - 7.0e6).abs() < 1e-6);
/// assert!((state.velocity.y - (mu / 7.0e6).sqrt()).abs() < 1e-9);
/// ```
pub fn orbital_elements_to_cartesian(elements: &OrbitalElements, mu: f64) -> StateVector {
    let e = elements.eccentricity;
    let nu = elements.true_anomaly;
    let p = elements.semi_major_axis * (1.0 - e * e);
    let r = p / (1.0 + e * nu.cos());

    let position = Vector3::new(r * nu.cos(), r * nu.sin(), 0.0);
    let velocity = Vector3::new(-nu.sin(), e + nu.cos(), 0.0) * (mu / p).sqrt();

    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), elements.ascending_node)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), elements.argument_of_periapsis);

    StateVector::new(Point3::from(rotation * position), rotation * velocity)
}
