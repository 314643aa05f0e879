use ejecta::SurfaceEmission;
use exocloud::{GravityEngine, PhysicsEngine, RunStore, Session, SimulationConfig, SpeciesId};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const CONFIG: &str = r#"{
    "integration": {
        "advance_fraction": 0.02,
        "r_max": 4.0,
        "substeps": 20,
        "workers": 3,
        "sampling_threads": 2,
        "sampling_chunk": 16,
        "stop_at_steady_state": false,
        "seed": 2024
    },
    "system": {
        "bodies": [
            { "name": "sun", "mass": 1.988e30, "radius": 6.957e8 },
            {
                "name": "jupiter", "mass": 1.898e27, "radius": 6.9911e7,
                "orbit": { "primary": "sun", "semi_major_axis": 7.785e11 }
            },
            {
                "name": "europa", "mass": 4.799e22, "radius": 1.5608e6,
                "orbit": { "primary": "jupiter", "semi_major_axis": 6.709e8, "eccentricity": 0.009 }
            }
        ],
        "source": "europa"
    },
    "species": [
        {
            "id": 1,
            "name": "Na",
            "n_th": 40,
            "n_sp": 20,
            "mass": 3.817e-26,
            "mass_rate": 0.5,
            "network": {
                "kind": "multi_channel",
                "channels": [
                    { "lifetime": 7200.0, "educts": ["Na", "e"], "products": ["Na+"] },
                    { "lifetime": 21600.0, "educts": ["Na", "hv"], "products": ["Na+", "e"] }
                ]
            },
            "emission": {
                "thermal": { "temperature": 130.0 },
                "sputtering": { "binding_velocity": 2000.0, "max_velocity": 10000.0 }
            }
        },
        {
            "id": 2,
            "name": "Na+",
            "mass": 3.817e-26,
            "mass_rate": 0.0,
            "network": { "kind": "single_channel", "lifetime": 864000.0 }
        }
    ]
}"#;

fn load_config(directory: &std::path::Path) -> SimulationConfig {
    let mut config: SimulationConfig = serde_json::from_str(CONFIG).unwrap();
    config.output = Some(exocloud::OutputConfig {
        directory: directory.to_path_buf(),
    });
    config
}

#[test]
fn test_cloud_builds_up_and_is_persisted() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path());
    let engine = GravityEngine::from_system(&config.system, &config.integration).unwrap();
    let mut session = Session::new(config, engine, SurfaceEmission).unwrap();

    let summary = session.advance(4).unwrap();

    assert_eq!(summary.advances(), 4);
    assert_eq!(summary.created(), 240);
    assert_eq!(session.iteration(), 4);

    let registered: Vec<_> = session.registry().ids().collect();
    assert_eq!(registered, session.engine().tracer_ids());

    let jupiter = session.engine().body_state("jupiter").unwrap();
    for id in session.engine().tracer_ids() {
        let state = session.engine().position_velocity(id).unwrap();
        let distance = (state.position - jupiter.position).magnitude();
        assert!(distance <= session.boundary().to_meters(), "{id} outside the boundary");
    }

    let last = summary.reports.last().unwrap();
    let removed: usize = summary
        .reports
        .iter()
        .map(|r| r.removed_boundary + r.removed_threshold + r.absorbed + r.orphaned)
        .sum();
    assert_eq!(last.tracer_count + removed, 240);

    let store = RunStore::open(dir.path()).unwrap();
    let history = store.load_ledger_history().unwrap();
    assert_eq!(history.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

    // weights only decay between ledger entries
    for k in 1..4u64 {
        for (id, record) in &history[&(k + 1)].records {
            if let Some(before) = history[&k].records.get(id) {
                assert!(record.weight < before.weight, "{id} grew between {k} and {}", k + 1);
            }
        }
    }

    let population = history[&4].physical_population(session.catalog(), session.advance_duration());
    assert!(population[&SpeciesId(1)] > 0.0);
    assert!(!population.contains_key(&SpeciesId(2)));
}

#[test]
fn test_resumed_run_matches_uninterrupted_run() {
    init_logging();
    let full_dir = tempfile::tempdir().unwrap();
    let split_dir = tempfile::tempdir().unwrap();

    let start = |dir: &std::path::Path| {
        let config = load_config(dir);
        let engine = GravityEngine::from_system(&config.system, &config.integration).unwrap();
        Session::new(config, engine, SurfaceEmission).unwrap()
    };

    let mut full = start(full_dir.path());
    full.advance(3).unwrap();

    start(split_dir.path()).advance(1).unwrap();
    let config = load_config(split_dir.path());
    let blank = GravityEngine::from_system(&config.system, &config.integration).unwrap();
    let mut resumed = Session::resume(split_dir.path(), blank, SurfaceEmission, None).unwrap();
    resumed.advance(2).unwrap();

    assert_eq!(resumed.iteration(), 3);
    assert_eq!(resumed.registry(), full.registry());
    assert_eq!(resumed.engine().snapshot(), full.engine().snapshot());
}
