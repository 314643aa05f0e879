//! Gravitational N-body propagation in SI units.
//!
//! The first `n_active` bodies of a [`state::SystemState`] gravitate; every
//! body after them is a massless test particle that feels the active bodies
//! but exerts no force. Test particles touching an active body are absorbed.

pub mod body;
pub mod collisions;
pub mod forces;
pub mod integrator;
pub mod orbit;
pub mod propagate;
pub mod state;

#[cfg(test)]
mod propagate_test;
#[cfg(test)]
mod state_test;

pub use body::{Body, BodyId, StateVector};
pub use orbit::{Orbit, OrbitalElements};
pub use state::SystemState;
