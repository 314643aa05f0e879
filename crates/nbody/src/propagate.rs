//! Substepped propagation with collision handling

use crate::body::BodyId;
use crate::collisions::{CollisionDetector, resolve_collisions};
use crate::forces::ForceModel;
use crate::integrator::Integrator;
use crate::state::SystemState;

/// Advance `state` by `duration` seconds in `substeps` equal steps
///
/// Contacts are detected and resolved after every substep.
///
/// # Returns
///
/// IDs of all bodies removed by collisions, in the order they were removed
///
/// # Examples
///
/// ```
/// use nbody::collisions::DirectDetector;
/// use nbody::forces::DirectGravity;
/// use nbody::integrator::Leapfrog;
/// use nbody::propagate::propagate;
/// use nbody::{StateVector, SystemState};
/// use nalgebra::{Point3, Vector3};
///
/// let mut system = SystemState::new();
/// system.add_active("moon", 4.8e22, 1.56e6, StateVector::new(Point3::origin(), Vector3::zeros()));
/// let falling = system.add_test_particle(
///     0.0,
///     StateVector::new(Point3::new(2.0e6, 0.0, 0.0), Vector3::new(-1.0e3, 0.0, 0.0)),
/// );
///
/// let removed = propagate(&mut system, &Leapfrog, &DirectGravity::new(), &DirectDetector, 3_600.0, 60);
/// assert_eq!(removed, vec![falling]);
/// assert!((system.time - 3_600.0).abs() < 1e-9);
/// ```
pub fn propagate(
    state: &mut SystemState,
    integrator: &dyn Integrator,
    force: &dyn ForceModel,
    detector: &dyn CollisionDetector,
    duration: f64,
    substeps: usize,
) -> Vec<BodyId> {
    let substeps = substeps.max(1);
    let dt = duration / substeps as f64;
    let mut removed = Vec::new();

    for _ in 0..substeps {
        integrator.step(state, dt, force);
        let events = detector.detect(state);
        if !events.is_empty() {
            removed.extend(resolve_collisions(state, events));
        }
    }

    removed
}
