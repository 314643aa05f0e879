use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};

use crate::body::{BodyId, StateVector};
use crate::orbit::OrbitalElements;
use crate::state::SystemState;

fn rest(x: f64) -> StateVector {
    StateVector::new(Point3::new(x, 0.0, 0.0), Vector3::zeros())
}

fn jovian_system() -> SystemState {
    let mut system = SystemState::new();
    let sun = system.add_active("sun", 1.988e30, 6.957e8, rest(0.0));
    let jupiter = system
        .add_orbiting("jupiter", 1.898e27, 6.9911e7, sun, &OrbitalElements::circular(7.785e11))
        .unwrap();
    system
        .add_orbiting("europa", 4.799e22, 1.5608e6, jupiter, &OrbitalElements::circular(6.709e8))
        .unwrap();
    system
}

#[test]
fn test_active_bodies_precede_test_particles() {
    let mut system = SystemState::new();
    system.add_active("a", 1.0, 1.0, rest(0.0));
    let tracer = system.add_test_particle(0.0, rest(1.0));
    let b = system.add_active("b", 2.0, 1.0, rest(2.0));

    assert_eq!(system.n_active(), 2);
    assert_eq!(system.active_bodies()[1].id, b);
    assert_eq!(system.test_particles()[0].id, tracer);
    assert!(system.is_active(b));
    assert!(!system.is_active(tracer));
}

#[test]
fn test_add_orbiting_relative_to_primary() {
    let system = jovian_system();
    let jupiter = system.body_by_name("jupiter").unwrap();
    let europa = system.body_by_name("europa").unwrap();

    assert_relative_eq!(jupiter.distance_to(europa), 6.709e8, max_relative = 1e-12);
    let orbit = system.orbit(europa.id, jupiter.id).unwrap();
    assert_relative_eq!(orbit.semi_major_axis(), 6.709e8, max_relative = 1e-9);
}

#[test]
fn test_add_orbiting_unknown_primary() {
    let mut system = jovian_system();
    let missing = crate::body::BodyId(99);
    assert!(system
        .add_orbiting("ghost", 1.0, 1.0, missing, &OrbitalElements::circular(1.0e6))
        .is_none());
}

#[test]
fn test_move_to_com_zeroes_momentum() {
    let mut system = jovian_system();
    system.move_to_com();

    let com = system.center_of_mass();
    assert!(com.position.coords.magnitude() < 1.0);
    assert!(system.total_momentum().magnitude() / system.total_mass() < 1e-12);
}

#[test]
fn test_remove_active_body_forgets_name() {
    let mut system = jovian_system();
    let europa = system.body_id("europa").unwrap();

    let removed = system.remove_body(europa).unwrap();
    assert_eq!(removed.id, europa);
    assert_eq!(system.n_active(), 2);
    assert!(system.body_id("europa").is_none());
}

#[test]
fn test_retain_test_particles_keeps_active_bodies() {
    let mut system = jovian_system();
    for k in 0..4 {
        system.add_test_particle(0.0, rest(k as f64));
    }

    system.retain_test_particles(|b| b.position.x >= 2.0);

    assert_eq!(system.n_active(), 3);
    assert_eq!(system.test_particle_count(), 2);
    assert_eq!(system.body_count(), 5);
}

#[test]
fn test_names_in_order() {
    let system = jovian_system();
    let names: Vec<&str> = system.names().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["europa", "jupiter", "sun"]);
}

#[test]
fn test_sync_active_keeps_own_test_particles() {
    let mut reference = jovian_system();
    reference.time = 500.0;
    reference.bodies[1].position.x += 1.0e3;

    let mut copy = jovian_system();
    let tracer = copy.add_test_particle(0.0, rest(42.0));
    copy.sync_active_from(&reference);

    assert_eq!(copy.active_bodies(), reference.active_bodies());
    assert_eq!(copy.time, 500.0);
    assert_eq!(copy.test_particles()[0].id, tracer);
    assert_eq!(copy.body_id("europa"), reference.body_id("europa"));
}

#[test]
fn test_alias_only_for_active_bodies() {
    let mut system = jovian_system();
    let europa = system.body_id("europa").unwrap();
    let tracer = system.add_test_particle(0.0, rest(0.0));

    assert!(system.add_alias("jupiter ii", europa));
    assert!(!system.add_alias("ghost", tracer));
    assert_eq!(system.body_id("jupiter ii"), Some(europa));
}

#[test]
fn test_ids_stay_unique_under_tracer_churn() {
    let mut master = jovian_system();
    let mut worker = master.clone();
    let mut seen = std::collections::BTreeSet::new();

    for round in 0..50 {
        worker.retain_test_particles(|_| false);
        worker.sync_active_from(&master);
        for k in 0..20 {
            let id = worker.add_test_particle(0.0, rest(1.0e12 + (round * 20 + k) as f64));
            assert!(seen.insert(id), "{id:?} handed out twice");
        }
        master.time += 1.0;
    }
    assert_eq!(worker.test_particle_count(), 20);
}

#[test]
fn test_body_ids_extend_past_u32() {
    let last_u32 = BodyId(u64::from(u32::MAX));
    let next = BodyId(last_u32.0 + 1);
    assert!(next > last_u32);
    assert_eq!(next.0, 1 << 32);
}
