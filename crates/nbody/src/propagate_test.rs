use nalgebra::{Point3, Vector3};

use crate::body::StateVector;
use crate::collisions::DirectDetector;
use crate::forces::DirectGravity;
use crate::integrator::Leapfrog;
use crate::orbit::OrbitalElements;
use crate::propagate::propagate;
use crate::state::SystemState;

fn jupiter_europa() -> SystemState {
    let mut system = SystemState::new();
    let jupiter = system.add_active(
        "jupiter",
        1.898e27,
        6.9911e7,
        StateVector::new(Point3::origin(), Vector3::zeros()),
    );
    system
        .add_orbiting("europa", 4.799e22, 1.5608e6, jupiter, &OrbitalElements::circular(6.709e8))
        .unwrap();
    system.move_to_com();
    system
}

#[test]
fn test_propagation_is_deterministic() {
    let mut a = jupiter_europa();
    let europa = *a.body_by_name("europa").unwrap();
    for k in 0..5 {
        a.add_test_particle(
            0.0,
            StateVector::new(
                europa.position + Vector3::new(2.0e6 + k as f64 * 1.0e5, 0.0, 0.0),
                europa.velocity + Vector3::new(1.5e3, 0.0, 0.0),
            ),
        );
    }
    let mut b = a.clone();

    let ra = propagate(&mut a, &Leapfrog, &DirectGravity::new(), &DirectDetector, 7_200.0, 20);
    let rb = propagate(&mut b, &Leapfrog, &DirectGravity::new(), &DirectDetector, 7_200.0, 20);

    assert_eq!(ra, rb);
    assert_eq!(a.bodies, b.bodies);
}

#[test]
fn test_tracer_hitting_planet_is_removed() {
    let mut system = jupiter_europa();
    let jupiter = *system.body_by_name("jupiter").unwrap();
    let doomed = system.add_test_particle(
        0.0,
        StateVector::new(
            jupiter.position + Vector3::new(8.0e7, 0.0, 0.0),
            jupiter.velocity + Vector3::new(-2.0e4, 0.0, 0.0),
        ),
    );

    let removed = propagate(&mut system, &Leapfrog, &DirectGravity::new(), &DirectDetector, 3_600.0, 60);

    assert_eq!(removed, vec![doomed]);
    assert_eq!(system.n_active(), 2);
    assert_eq!(system.test_particle_count(), 0);
}

#[test]
fn test_zero_substeps_still_advances() {
    let mut system = jupiter_europa();
    propagate(&mut system, &Leapfrog, &DirectGravity::new(), &DirectDetector, 100.0, 0);
    assert!((system.time - 100.0).abs() < 1e-12);
}
