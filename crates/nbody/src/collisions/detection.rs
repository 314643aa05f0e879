//! Contact detection between bodies

use crate::body::{Body, BodyId};
use crate::state::SystemState;

/// A detected contact between two bodies
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// First body ID (always an active body)
    pub body_a: BodyId,
    /// Second body ID
    pub body_b: BodyId,
    /// Current separation distance (m)
    pub separation: f64,
    /// Sum of the two radii (m)
    pub collision_radius: f64,
}

fn check_pair(a: &Body, b: &Body) -> Option<CollisionEvent> {
    let separation = a.distance_to(b);
    let collision_radius = a.radius + b.radius;

    (separation < collision_radius).then_some(CollisionEvent {
        body_a: a.id,
        body_b: b.id,
        separation,
        collision_radius,
    })
}

/// Collision detector trait
pub trait CollisionDetector: Send + Sync {
    /// Detect all contacts in the system
    fn detect(&self, state: &SystemState) -> Vec<CollisionEvent>;
}

/// Direct collision detector
///
/// Checks every pair of active bodies and every test particle against every
/// active body. Test particles never collide with each other.
///
/// # Examples
///
/// ```
/// use nbody::collisions::{CollisionDetector, DirectDetector};
/// use nbody::{StateVector, SystemState};
/// use nalgebra::{Point3, Vector3};
///
/// let mut system = SystemState::new();
/// system.add_active("moon", 4.8e22, 1.56e6, StateVector::new(Point3::origin(), Vector3::zeros()));
/// system.add_test_particle(0.0, StateVector::new(Point3::new(1.0e6, 0.0, 0.0), Vector3::zeros()));
/// system.add_test_particle(0.0, StateVector::new(Point3::new(1.0e7, 0.0, 0.0), Vector3::zeros()));
///
/// let collisions = DirectDetector.detect(&system);
/// assert_eq!(collisions.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDetector;

impl CollisionDetector for DirectDetector {
    fn detect(&self, state: &SystemState) -> Vec<CollisionEvent> {
        let active = state.active_bodies();
        let n = active.len();

        let mutual = (0..n).flat_map(|i| ((i + 1)..n).filter_map(move |j| check_pair(&active[i], &active[j])));

        let absorbed = state
            .test_particles()
            .iter()
            .flat_map(|tracer| active.iter().filter_map(move |body| check_pair(body, tracer)));

        mutual.chain(absorbed).collect()
    }
}
