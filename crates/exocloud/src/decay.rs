//! Continuous weight decay
//!
//! Every live tracer loses weight as `w ← w · Π exp(-dt/τ_j)` over the
//! channels of its species. Tracers are never removed here; low weights are
//! pruned at merge time by the representativeness threshold. For
//! multi-channel networks the lost weight is credited to each channel's
//! products in proportion to the channel's share of the total rate.

use log::warn;
use units::Time;

use crate::engine::PhysicsEngine;
use crate::id::ParticleId;
use crate::registry::ParticleRegistry;
use crate::species::SpeciesCatalog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecayOutcome {
    pub decayed: usize,
    /// Engine tracers without a usable registry record, dropped from the engine
    pub orphaned: Vec<ParticleId>,
}

pub fn apply_decay<E: PhysicsEngine>(
    engine: &mut E,
    registry: &mut ParticleRegistry,
    catalog: &SpeciesCatalog,
    dt: Time,
) -> DecayOutcome {
    let mut outcome = DecayOutcome::default();

    for id in engine.tracer_ids() {
        let Some(record) = registry.get(id) else {
            warn!("tracer {id} has no registry record, treating it as removed");
            engine.remove(id);
            outcome.orphaned.push(id);
            continue;
        };
        let Some(species) = catalog.get(record.species) else {
            warn!("tracer {id} belongs to unknown species {}, removing it", record.species);
            engine.remove(id);
            registry.remove(id);
            outcome.orphaned.push(id);
            continue;
        };

        let old = record.weight;
        let new = old * species.network.survival(dt);
        let lost = old - new;

        for (channel, share) in species.network.channel_shares() {
            for product in channel.products.iter().filter_map(|name| catalog.by_name(name)) {
                registry.add_product_weight(id, product.id, lost * share);
            }
        }
        registry.update_weight(id, new);
        outcome.decayed += 1;
    }

    outcome
}
