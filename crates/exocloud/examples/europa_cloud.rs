//! Builds a sodium cloud around Europa and prints the population per advance
//!
//! ```text
//! RUST_LOG=info cargo run -p exocloud --example europa_cloud -- /tmp/europa
//! ```

use std::error::Error;

use ejecta::{EmissionParameters, SputterParameters, SurfaceEmission, ThermalParameters};
use exocloud::{
    CelestialBodyConfig, GravityEngine, IntegrationConfig, OrbitConfig, OutputConfig, ReactionNetwork, Session,
    SimulationConfig, Species, SpeciesId, SystemConfig,
};
use units::{Length, Mass, MassRate, Time, Velocity};

fn europa_system() -> SystemConfig {
    let body = |name: &str, mass: f64, radius: f64, orbit: Option<OrbitConfig>| CelestialBodyConfig {
        name: name.to_string(),
        mass: Mass::from_kg(mass),
        radius: Length::from_meters(radius),
        orbit,
    };
    SystemConfig {
        bodies: vec![
            body("sun", 1.988e30, 6.957e8, None),
            body(
                "jupiter",
                1.898e27,
                6.9911e7,
                Some(OrbitConfig::circular("sun", Length::from_au(5.2))),
            ),
            body(
                "europa",
                4.799e22,
                1.5608e6,
                Some(OrbitConfig {
                    eccentricity: 0.009,
                    ..OrbitConfig::circular("jupiter", Length::from_meters(6.709e8))
                }),
            ),
        ],
        source: "europa".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let directory = std::env::args().nth(1).unwrap_or_else(|| "europa_cloud".to_string());

    let sodium = Species {
        id: SpeciesId(1),
        name: "Na".to_string(),
        n_th: 200,
        n_sp: 800,
        mass: Mass::from_amu(23.0),
        mass_rate: MassRate::from_kg_per_second(5.0),
        network: ReactionNetwork::SingleChannel {
            lifetime: Time::from_hours(4.0),
        },
        emission: EmissionParameters {
            thermal: Some(ThermalParameters { temperature: 130.0 }),
            sputtering: Some(SputterParameters {
                binding_velocity: Velocity::from_meters_per_sec(2_000.0),
                max_velocity: Velocity::from_km_per_sec(20.0),
            }),
        },
    };

    let mut integration = IntegrationConfig::new(0.02, 4.0);
    integration.substeps = 50;
    integration.seed = 42;

    let config = SimulationConfig {
        integration,
        system: europa_system(),
        species: vec![sodium],
        output: Some(OutputConfig {
            directory: directory.into(),
        }),
    };

    let engine = GravityEngine::from_system(&config.system, &config.integration)?;
    let mut session = Session::new(config, engine, SurfaceEmission)?;
    let summary = session.advance(200)?;

    for report in &summary.reports {
        println!(
            "{:>4}  {:>8.2} h  {:>6} live  {:>5} boundary  {:>5} threshold  {:>5} absorbed",
            report.iteration,
            report.simulated_time.to_hours(),
            report.tracer_count,
            report.removed_boundary,
            report.removed_threshold,
            report.absorbed
        );
    }
    if summary.stopped {
        println!("steady state after {} advances", summary.advances());
    }
    Ok(())
}
