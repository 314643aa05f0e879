use units::Length;

use crate::config::{IntegrationConfig, OrbitConfig, SimulationConfig};
use crate::error::ConfigError;
use crate::fixtures::{config, sodium};

#[test]
fn test_integration_defaults() {
    let integration: IntegrationConfig = serde_json::from_str(r#"{"advance_fraction": 0.05, "r_max": 4.0}"#).unwrap();

    assert_eq!(integration.substeps, 10);
    assert!(integration.stop_at_steady_state);
    assert_eq!(integration.steady_state_epsilon, 1e-3);
    assert_eq!(integration.min_physical_particles, 1e6);
    assert_eq!(integration.sampling_chunk, 256);
    assert_eq!(integration.seed, 0);
    assert!(integration.generation_cutoff.is_none());
    assert!(integration.worker_count() >= 1);
    assert_eq!(integration, IntegrationConfig::new(0.05, 4.0));
}

#[test]
fn test_generation_cutoff() {
    let mut integration = IntegrationConfig::new(0.05, 4.0);
    assert!(integration.generates_at(1_000));

    integration.generation_cutoff = Some(2);
    assert!(integration.generates_at(0));
    assert!(integration.generates_at(1));
    assert!(!integration.generates_at(2));
}

#[test]
fn test_config_round_trips_through_json() {
    let original = config(vec![sodium(10, 5)]);
    let json = serde_json::to_string(&original).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_valid_config_yields_catalog() {
    let catalog = config(vec![sodium(10, 5)]).validate().unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_primary_is_the_source_orbit_primary() {
    assert_eq!(config(vec![sodium(1, 0)]).system.primary(), Ok("jupiter"));
}

#[test]
fn test_rejects_missing_source() {
    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.system.source = "io".to_string();
    assert_eq!(cfg.validate(), Err(ConfigError::MissingSource("io".to_string())));
}

#[test]
fn test_rejects_source_without_orbit() {
    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.system.source = "sun".to_string();
    assert_eq!(cfg.validate(), Err(ConfigError::SourceWithoutOrbit("sun".to_string())));
}

#[test]
fn test_rejects_primary_defined_later() {
    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.system.bodies[1].orbit = Some(OrbitConfig::circular("europa", Length::from_meters(1.0e9)));
    assert!(matches!(cfg.validate(), Err(ConfigError::UnknownPrimary { .. })));
}

#[test]
fn test_rejects_duplicate_body() {
    let mut cfg = config(vec![sodium(1, 0)]);
    let copy = cfg.system.bodies[2].clone();
    cfg.system.bodies.push(copy);
    assert_eq!(cfg.validate(), Err(ConfigError::DuplicateBody("europa".to_string())));
}

#[test]
fn test_rejects_bad_integration_parameters() {
    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.integration.substeps = 0;
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::InvalidParameter { field: "substeps", .. })
    ));

    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.integration.r_max = -1.0;
    assert!(matches!(cfg.validate(), Err(ConfigError::InvalidParameter { field: "r_max", .. })));

    let mut cfg = config(vec![sodium(1, 0)]);
    cfg.integration.workers = Some(0);
    assert!(matches!(cfg.validate(), Err(ConfigError::InvalidParameter { field: "workers", .. })));
}

#[test]
fn test_rejects_empty_species_list() {
    assert_eq!(config(Vec::new()).validate(), Err(ConfigError::NoSpecies));
}
