//! Direct N-body gravity (O(N·N_active) implementation)

use crate::forces::{ForceModel, G};
use crate::state::SystemState;
use nalgebra::Vector3;

/// Direct gravitational force computation
///
/// Sums the pull of every active body on the body at `idx`. Test particles
/// are skipped as sources, so adding tracers never changes the trajectories
/// of the active bodies.
#[derive(Debug, Clone, Copy)]
pub struct DirectGravity {
    /// Optional softening length to prevent singularities (m)
    pub softening: f64,
}

impl DirectGravity {
    /// Creates a new direct gravity force with no softening
    pub fn new() -> Self {
        Self { softening: 0.0 }
    }

    /// Creates a new direct gravity force with specified softening length in meters
    pub fn with_softening(softening: f64) -> Self {
        Self { softening }
    }
}

impl Default for DirectGravity {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceModel for DirectGravity {
    fn acceleration(&self, idx: usize, state: &SystemState) -> Vector3<f64> {
        let body = &state.bodies[idx];
        let eps2 = self.softening * self.softening;

        state
            .active_bodies()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, other)| {
                let dr = other.position - body.position;
                let r2 = dr.magnitude_squared() + eps2;
                let r = r2.sqrt();
                dr * (G * other.mass / (r2 * r))
            })
            .fold(Vector3::zeros(), |acc, a| acc + a)
    }

    fn potential_energy(&self, state: &SystemState) -> f64 {
        let eps2 = self.softening * self.softening;
        let active = state.active_bodies();

        // Each pair counted once
        active
            .iter()
            .enumerate()
            .flat_map(|(i, a)| active[i + 1..].iter().map(move |b| (a, b)))
            .map(|(a, b)| {
                let r = ((a.position - b.position).magnitude_squared() + eps2).sqrt();
                -G * a.mass * b.mass / r
            })
            .sum()
    }
}
