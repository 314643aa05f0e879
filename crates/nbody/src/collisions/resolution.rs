//! Collision resolution
//!
//! Two active bodies merge into one that conserves total mass, momentum
//! and volume. A test particle touching an active body is removed.

use crate::body::{Body, BodyId};
use crate::collisions::CollisionEvent;
use crate::state::SystemState;
use nalgebra::Point3;
use std::collections::BTreeSet;

/// Merge two bodies, conserving mass and momentum
///
/// Radii combine by volume assuming equal density: r = (r_a³ + r_b³)^(1/3).
/// If the combined mass is zero the first body is returned unchanged.
///
/// # Examples
///
/// ```
/// use nbody::collisions::merge_bodies;
/// use nbody::body::{Body, BodyId};
/// use nalgebra::{Point3, Vector3};
///
/// let a = Body {
///     id: BodyId(0),
///     mass: 1.0e20,
///     radius: 1.0e5,
///     position: Point3::new(0.0, 0.0, 0.0),
///     velocity: Vector3::new(0.0, 5.0, 0.0),
/// };
/// let b = Body {
///     id: BodyId(1),
///     mass: 1.0e20,
///     radius: 1.0e5,
///     position: Point3::new(1.0e5, 0.0, 0.0),
///     velocity: Vector3::new(0.0, 3.0, 0.0),
/// };
///
/// let merged = merge_bodies(&a, &b, BodyId(0));
/// assert_eq!(merged.mass, 2.0e20);
/// assert!((merged.velocity.y - 4.0).abs() < 1e-12);
/// ```
pub fn merge_bodies(a: &Body, b: &Body, new_id: BodyId) -> Body {
    let total_mass = a.mass + b.mass;
    if total_mass == 0.0 {
        return Body { id: new_id, ..*a };
    }

    let position = Point3::from((a.position.coords * a.mass + b.position.coords * b.mass) / total_mass);
    let velocity = (a.momentum() + b.momentum()) / total_mass;
    let radius = (a.radius.powi(3) + b.radius.powi(3)).cbrt();

    Body {
        id: new_id,
        mass: total_mass,
        radius,
        position,
        velocity,
    }
}

/// Process all collision events, closest first
///
/// Bodies consumed by an earlier event are skipped. A merged pair of active
/// bodies keeps the lower ID and inherits the other body's name.
///
/// # Returns
///
/// IDs of every body removed from the system, in resolution order
///
/// # Examples
///
/// ```
/// use nbody::collisions::{resolve_collisions, CollisionDetector, DirectDetector};
/// use nbody::{StateVector, SystemState};
/// use nalgebra::{Point3, Vector3};
///
/// let mut system = SystemState::new();
/// system.add_active("moon", 4.8e22, 1.56e6, StateVector::new(Point3::origin(), Vector3::zeros()));
/// let tracer = system.add_test_particle(0.0, StateVector::new(Point3::new(1.0e6, 0.0, 0.0), Vector3::zeros()));
///
/// let events = DirectDetector.detect(&system);
/// let removed = resolve_collisions(&mut system, events);
///
/// assert_eq!(removed, vec![tracer]);
/// assert_eq!(system.test_particle_count(), 0);
/// ```
pub fn resolve_collisions(state: &mut SystemState, mut events: Vec<CollisionEvent>) -> Vec<BodyId> {
    events.sort_by(|a, b| a.separation.total_cmp(&b.separation));

    let mut consumed: BTreeSet<BodyId> = BTreeSet::new();
    let mut removed = Vec::new();

    for event in events {
        if consumed.contains(&event.body_a) || consumed.contains(&event.body_b) {
            continue;
        }

        if !state.is_active(event.body_b) {
            if state.remove_body(event.body_b).is_some() {
                consumed.insert(event.body_b);
                removed.push(event.body_b);
            }
            continue;
        }

        let a = state.get_body(event.body_a).copied();
        let b = state.get_body(event.body_b).copied();
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };

        let (keep, gone) = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
        let merged = merge_bodies(&a, &b, keep);

        state.rename(gone, keep);
        state.remove_body(gone);
        if let Some(body) = state.get_body_mut(keep) {
            *body = merged;
        }

        consumed.insert(gone);
        removed.push(gone);
    }

    removed
}
