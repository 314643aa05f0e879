use std::fs;

use units::Time;

use crate::engine::PhysicsEngine;
use crate::error::PersistenceError;
use crate::fixtures::{config, engine, sodium, sodium_with_ions};
use crate::id::{ParticleId, SpeciesId};
use crate::persistence::{RunManifest, RunStore};
use crate::registry::ParticleRegistry;

fn ledger(iteration: u64, n: u32) -> crate::registry::RegistrySnapshot {
    let mut registry = ParticleRegistry::new();
    for i in 0..n {
        registry.register(ParticleId::new(SpeciesId(1), 0, i), 0, SpeciesId(1)).unwrap();
    }
    registry.update_weight(ParticleId::new(SpeciesId(1), 0, 0), 0.123_456_789_012_345_6);
    registry.add_product_weight(ParticleId::new(SpeciesId(1), 0, 0), SpeciesId(2), 0.75);
    registry.snapshot(iteration)
}

#[test]
fn test_create_lays_out_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path().join("run")).unwrap();

    assert!(store.root().join("snapshots").is_dir());
    assert!(store.root().join("ledger").is_dir());
    assert!(store.iterations().unwrap().is_empty());
    assert!(matches!(store.latest_iteration(), Err(PersistenceError::Empty(_))));
}

#[test]
fn test_open_requires_existing_run() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(RunStore::open(dir.path()), Err(PersistenceError::Empty(_))));

    RunStore::create(dir.path()).unwrap();
    assert!(RunStore::open(dir.path()).is_ok());
}

#[test]
fn test_manifest_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    let manifest = RunManifest {
        config: config(sodium_with_ions(3)),
        advance_duration: Time::from_seconds(3_067.7),
    };

    store.write_manifest(&manifest).unwrap();

    assert_eq!(store.load_manifest().unwrap(), manifest);
    assert!(dir.path().join("run_config.json").is_file());
}

#[test]
fn test_ledger_round_trip_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();

    for k in [0, 2, 1] {
        store.write_ledger(&ledger(k, k as u32 + 1)).unwrap();
    }

    assert_eq!(store.iterations().unwrap(), vec![0, 1, 2]);
    assert_eq!(store.latest_iteration().unwrap(), 2);
    assert_eq!(store.load_ledger(2).unwrap(), ledger(2, 3));
    assert!(dir.path().join("ledger/iteration_000002.json").is_file());

    let history = store.load_ledger_history().unwrap();
    assert_eq!(history.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(history[&1].records.len(), 2);
}

#[test]
fn test_persisted_iteration_is_never_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    store.write_ledger(&ledger(0, 1)).unwrap();

    let again = store.write_ledger(&ledger(0, 5));

    assert!(matches!(again, Err(PersistenceError::AlreadyPersisted(_))));
    assert_eq!(store.load_ledger(0).unwrap(), ledger(0, 1));
}

#[test]
fn test_mislabelled_ledger_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    store.write_ledger(&ledger(3, 1)).unwrap();
    fs::rename(
        dir.path().join("ledger/iteration_000003.json"),
        dir.path().join("ledger/iteration_000004.json"),
    )
    .unwrap();

    assert!(matches!(
        store.load_ledger(4),
        Err(PersistenceError::Inconsistent { iteration: 4, .. })
    ));
}

#[test]
fn test_stray_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    store.write_ledger(&ledger(0, 1)).unwrap();
    fs::write(dir.path().join("ledger/notes.txt"), "hello").unwrap();

    assert_eq!(store.iterations().unwrap(), vec![0]);
}

#[test]
fn test_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    let mut engine = engine(&config(vec![sodium(1, 0)]));
    engine.advance(Time::from_hours(1.0)).unwrap();
    let snapshot = engine.snapshot();

    store.write_snapshot(1, &snapshot).unwrap();

    assert_eq!(store.load_snapshot(1).unwrap(), snapshot);
    assert!(matches!(store.load_snapshot(2), Err(PersistenceError::Io { .. })));
}

#[test]
fn test_discard_incomplete_removes_unledgered_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::create(dir.path()).unwrap();
    let snapshot = engine(&config(vec![sodium(1, 0)])).snapshot();
    for k in 0..3 {
        store.write_snapshot(k, &snapshot).unwrap();
    }
    store.write_ledger(&ledger(0, 1)).unwrap();
    store.write_ledger(&ledger(1, 1)).unwrap();

    assert_eq!(store.discard_incomplete().unwrap(), vec![2]);
    assert!(store.discard_incomplete().unwrap().is_empty());
    assert_eq!(store.load_snapshot(1).unwrap(), snapshot);
    assert!(matches!(store.load_snapshot(2), Err(PersistenceError::Io { .. })));

    store.write_snapshot(2, &snapshot).unwrap();
}
