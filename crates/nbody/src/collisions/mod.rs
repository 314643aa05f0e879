//! Collision detection and resolution for N-body systems
//!
//! Active bodies in contact merge, conserving mass and momentum. A test
//! particle touching an active body is absorbed and leaves the absorber
//! untouched.

pub mod detection;
pub mod resolution;


pub use detection::{CollisionDetector, CollisionEvent, DirectDetector};
pub use resolution::{merge_bodies, resolve_collisions};
