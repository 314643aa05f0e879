//! Force models for N-body simulations
//!
//! This module provides the `ForceModel` trait and the direct-summation
//! gravity used to propagate active bodies and test particles.

use crate::state::SystemState;
use nalgebra::Vector3;

pub mod gravity;


pub use gravity::DirectGravity;

/// Gravitational constant in m³ kg⁻¹ s⁻²
pub const G: f64 = 6.6743e-11;

/// A source of acceleration on bodies in an N-body system
///
/// # Examples
///
/// ```
/// use nbody::forces::{DirectGravity, ForceModel};
/// use nbody::{StateVector, SystemState};
/// use nalgebra::{Point3, Vector3};
///
/// let mut system = SystemState::new();
/// system.add_active("sun", 1.988e30, 6.96e8, StateVector::new(Point3::origin(), Vector3::zeros()));
/// system.add_test_particle(0.0, StateVector::new(Point3::new(1.496e11, 0.0, 0.0), Vector3::zeros()));
///
/// let gravity = DirectGravity::new();
/// let accel = gravity.acceleration(1, &system);
///
/// // ~5.9 mm/s² toward the Sun
/// assert!(accel.x < 0.0);
/// assert!((accel.x.abs() - 5.93e-3).abs() < 1e-4);
/// ```
pub trait ForceModel: Send + Sync {
    /// Acceleration in m/s² of the body stored at `idx`
    fn acceleration(&self, idx: usize, state: &SystemState) -> Vector3<f64>;

    /// Potential energy of the whole system in joules; zero for non-conservative models
    fn potential_energy(&self, _state: &SystemState) -> f64 {
        0.0
    }
}
