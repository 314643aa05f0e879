//! Reassembly of worker results into the master engine
//!
//! Active bodies and the clock come from the first worker. Every returned
//! tracer is then checked against the boundary and the representativeness
//! threshold; survivors go back into the master, everything else leaves the
//! registry.

use log::warn;
use units::{Length, Time};

use crate::coordinator::WorkerReport;
use crate::engine::PhysicsEngine;
use crate::error::EngineError;
use crate::id::ParticleId;
use crate::registry::ParticleRegistry;
use crate::species::SpeciesCatalog;

/// Removal rules applied at merge time
#[derive(Debug, Clone, Copy)]
pub struct PruneCriteria<'a> {
    /// Body the boundary is measured from
    pub primary: &'a str,
    pub boundary: Length,
    pub min_physical_particles: f64,
    pub advance_duration: Time,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub removed_boundary: Vec<ParticleId>,
    pub removed_threshold: Vec<ParticleId>,
    pub absorbed: Vec<ParticleId>,
    /// Returned tracers without a registry record, dropped
    pub orphaned: Vec<ParticleId>,
    pub survivors: usize,
}

pub fn merge_reports<E: PhysicsEngine>(
    master: &mut E,
    reference: &E,
    reports: Vec<WorkerReport>,
    registry: &mut ParticleRegistry,
    catalog: &SpeciesCatalog,
    criteria: &PruneCriteria<'_>,
) -> Result<MergeOutcome, EngineError> {
    master.sync_active(reference);
    let primary = master.body_state(criteria.primary)?;
    let boundary = criteria.boundary.to_meters();
    let mut outcome = MergeOutcome::default();

    for report in reports {
        for id in report.absorbed {
            if registry.remove(id).is_none() {
                warn!("absorbed tracer {id} had no registry record");
            }
            outcome.absorbed.push(id);
        }

        for tracer in report.tracers {
            let id = tracer.id;
            let physical = match registry.get(id) {
                None => {
                    warn!("tracer {id} returned by worker {} has no registry record", report.worker);
                    outcome.orphaned.push(id);
                    continue;
                }
                Some(record) => catalog
                    .get(record.species)
                    .map_or(0.0, |s| s.physical_particles(record.weight, criteria.advance_duration)),
            };

            if tracer.distance_to(&primary) > boundary {
                registry.remove(id);
                outcome.removed_boundary.push(id);
            } else if physical < criteria.min_physical_particles {
                registry.remove(id);
                outcome.removed_threshold.push(id);
            } else {
                master.add(id, tracer.state())?;
                outcome.survivors += 1;
            }
        }
    }

    Ok(outcome)
}
