//! Fixed-step time integration

use crate::forces::ForceModel;
use crate::state::SystemState;
use nalgebra::Vector3;

pub trait Integrator: Send + Sync {
    /// Advance the system by one step of `dt` seconds
    fn step(&self, state: &mut SystemState, dt: f64, force: &dyn ForceModel);

    /// Takes `n_steps` steps of `dt` and returns the final time
    fn integrate(&self, state: &mut SystemState, dt: f64, n_steps: usize, force: &dyn ForceModel) -> f64 {
        (0..n_steps).for_each(|_| self.step(state, dt, force));
        state.time
    }
}

/// Kick-drift-kick leapfrog, second order and symplectic
///
/// Accelerations are evaluated body by body in storage order, so two copies
/// holding identical active bodies produce bit-identical active trajectories
/// regardless of how many test particles each carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leapfrog;

impl Leapfrog {
    pub fn new() -> Self {
        Self
    }
}

fn accelerations(state: &SystemState, force: &dyn ForceModel) -> Vec<Vector3<f64>> {
    (0..state.bodies.len()).map(|i| force.acceleration(i, state)).collect()
}

fn kick(state: &mut SystemState, accel: &[Vector3<f64>], dt: f64) {
    for (body, a) in state.bodies.iter_mut().zip(accel) {
        body.velocity += a * dt;
    }
}

impl Integrator for Leapfrog {
    fn step(&self, state: &mut SystemState, dt: f64, force: &dyn ForceModel) {
        let half = 0.5 * dt;

        kick(state, &accelerations(state, force), half);
        for body in &mut state.bodies {
            body.position += body.velocity * dt;
        }
        kick(state, &accelerations(state, force), half);

        state.time += dt;
    }
}
