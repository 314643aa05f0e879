//! The run session and its advance state machine
//!
//! One advance walks `Idle → Partition → Advancing → Join → Merge →
//! Persist → Idle`. Injection and decay happen in `Idle`, before the
//! population is partitioned. A fatal error leaves the session in `Failed`
//! and every later call returns [`SessionError::Poisoned`].

use std::fmt;
use std::path::Path;
use std::time::Instant;

use ejecta::EmissionModel;
use log::{debug, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use units::{Length, Time};

use crate::config::SimulationConfig;
use crate::coordinator::{advance_workers, partition};
use crate::decay::apply_decay;
use crate::engine::PhysicsEngine;
use crate::error::{ConfigError, PersistenceError, SessionError};
use crate::injection::{InjectionContext, inject};
use crate::merge::{PruneCriteria, merge_reports};
use crate::persistence::{RunManifest, RunStore};
use crate::registry::ParticleRegistry;
use crate::species::SpeciesCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePhase {
    Idle,
    Partition,
    Advancing,
    Join,
    Merge,
    Persist,
    /// Steady state reached or stopped by the caller
    Stopped,
    Failed,
}

impl fmt::Display for AdvancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvancePhase::Idle => "idle",
            AdvancePhase::Partition => "partition",
            AdvancePhase::Advancing => "advancing",
            AdvancePhase::Join => "join",
            AdvancePhase::Merge => "merge",
            AdvancePhase::Persist => "persist",
            AdvancePhase::Stopped => "stopped",
            AdvancePhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Bookkeeping for one completed advance
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceReport {
    /// Iteration reached by this advance
    pub iteration: u64,
    pub created: usize,
    pub removed_boundary: usize,
    pub removed_threshold: usize,
    /// Absorbed by collisions with active bodies
    pub absorbed: usize,
    /// Tracers without registry records, dropped as already removed
    pub orphaned: usize,
    pub tracer_count: usize,
    pub simulated_time: Time,
    pub steady_state: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub reports: Vec<AdvanceReport>,
    /// True if the run ended in steady state or was already stopped
    pub stopped: bool,
}

impl RunSummary {
    pub fn advances(&self) -> usize {
        self.reports.len()
    }

    pub fn created(&self) -> usize {
        self.reports.iter().map(|r| r.created).sum()
    }
}

/// One simulation run
///
/// Owns the configuration, the master engine, the worker copies, the
/// registry and the output store. Nothing is shared between sessions.
pub struct Session<E: PhysicsEngine, M: EmissionModel> {
    config: SimulationConfig,
    catalog: SpeciesCatalog,
    primary: String,
    master: E,
    workers: Vec<E>,
    emission: M,
    sampling_pool: ThreadPool,
    registry: ParticleRegistry,
    store: Option<RunStore>,
    iteration: u64,
    advance_duration: Time,
    boundary: Length,
    phase: AdvancePhase,
}

impl<E: PhysicsEngine, M: EmissionModel> Session<E, M> {
    /// Starts a new run from `engine`'s current state
    ///
    /// The advance duration is fixed here as `advance_fraction` times the
    /// source body's orbital period. With an output directory configured,
    /// the run manifest and iteration 0 are persisted immediately.
    pub fn new(config: SimulationConfig, engine: E, emission: M) -> Result<Self, SessionError> {
        let catalog = config.validate()?;
        let primary = config.system.primary()?.to_string();

        let orbit = engine.orbital_elements(&config.system.source, &primary)?;
        let period = orbit
            .period
            .ok_or_else(|| ConfigError::UnboundSource(config.system.source.clone()))?;
        let advance_duration = period * config.integration.advance_fraction;

        let store = config.output.as_ref().map(|o| RunStore::create(&o.directory)).transpose()?;
        if let Some(store) = &store {
            store.write_manifest(&RunManifest {
                config: config.clone(),
                advance_duration,
            })?;
        }

        let session = Self::assemble(
            config,
            catalog,
            primary,
            engine,
            emission,
            ParticleRegistry::new(),
            store,
            0,
            advance_duration,
        )?;
        session.persist()?;

        info!(
            "session started: source '{}', advance {:.1} s, boundary {:.3e} m, {} workers",
            session.config.system.source,
            advance_duration.to_seconds(),
            session.boundary.to_meters(),
            session.workers.len()
        );
        Ok(session)
    }

    /// Continues a persisted run
    ///
    /// `engine` only has to be of the right type; its state is replaced by
    /// the snapshot of the latest complete iteration. Passing `Some(k)` for
    /// any other iteration is an error, since later iterations are never
    /// rewritten. Snapshots written without a matching ledger entry are
    /// deleted first. The configuration and advance duration come from the
    /// run manifest.
    pub fn resume(
        directory: impl AsRef<Path>,
        mut engine: E,
        emission: M,
        iteration: Option<u64>,
    ) -> Result<Self, SessionError> {
        let store = RunStore::open(directory)?;
        let manifest = store.load_manifest()?;
        let config = manifest.config;
        let catalog = config.validate()?;
        let primary = config.system.primary()?.to_string();

        let latest = store.latest_iteration()?;
        let iteration = iteration.unwrap_or(latest);
        if iteration != latest {
            return Err(PersistenceError::NotLatest { iteration, latest }.into());
        }
        store.discard_incomplete()?;
        engine.restore(&store.load_snapshot(iteration)?)?;
        let registry = ParticleRegistry::from_snapshot(store.load_ledger(iteration)?);

        if !registry.ids().eq(engine.tracer_ids()) {
            return Err(PersistenceError::Inconsistent {
                iteration,
                message: "ledger and snapshot hold different tracers".to_string(),
            }
            .into());
        }

        let session = Self::assemble(
            config,
            catalog,
            primary,
            engine,
            emission,
            registry,
            Some(store),
            iteration,
            manifest.advance_duration,
        )?;
        info!("resumed at iteration {} with {} tracers", iteration, session.registry.len());
        Ok(session)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        config: SimulationConfig,
        catalog: SpeciesCatalog,
        primary: String,
        master: E,
        emission: M,
        registry: ParticleRegistry,
        store: Option<RunStore>,
        iteration: u64,
        advance_duration: Time,
    ) -> Result<Self, SessionError> {
        let sampling_pool = ThreadPoolBuilder::new()
            .num_threads(config.integration.sampling_thread_count())
            .thread_name(|i| format!("emission-sampler-{i}"))
            .build()
            .map_err(|e| SessionError::SamplingPool(e.to_string()))?;

        let mut template = master.clone();
        template.drain_tracers();
        let workers = vec![template; config.integration.worker_count()];

        let mut session = Self {
            config,
            catalog,
            primary,
            master,
            workers,
            emission,
            sampling_pool,
            registry,
            store,
            iteration,
            advance_duration,
            boundary: Length::zero(),
            phase: AdvancePhase::Idle,
        };
        session.refresh_boundary()?;
        Ok(session)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &E {
        &self.master
    }

    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    pub fn store(&self) -> Option<&RunStore> {
        self.store.as_ref()
    }

    /// Completed advances
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn phase(&self) -> AdvancePhase {
        self.phase
    }

    /// Physical time covered by one advance
    pub fn advance_duration(&self) -> Time {
        self.advance_duration
    }

    pub fn boundary(&self) -> Length {
        self.boundary
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Ends the run; later advances do nothing
    pub fn stop(&mut self) {
        if self.phase != AdvancePhase::Failed {
            self.enter(AdvancePhase::Stopped);
        }
    }

    fn enter(&mut self, phase: AdvancePhase) {
        debug!("iteration {}: {} -> {}", self.iteration, self.phase, phase);
        self.phase = phase;
    }

    /// Boundary radius from the source's current semi-major axis
    fn refresh_boundary(&mut self) -> Result<(), SessionError> {
        let orbit = self.master.orbital_elements(&self.config.system.source, &self.primary)?;
        let a = orbit.semi_major_axis.to_meters();
        if a.is_finite() && a > 0.0 {
            self.boundary = orbit.semi_major_axis * self.config.integration.r_max;
        } else {
            warn!(
                "source orbit is unbound (a = {:.3e} m), keeping boundary {:.3e} m",
                a,
                self.boundary.to_meters()
            );
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.write_snapshot(self.iteration, &self.master.snapshot())?;
            store.write_ledger(&self.registry.snapshot(self.iteration))?;
        }
        Ok(())
    }

    /// Runs up to `n` advances
    ///
    /// Stops early once steady state is reached. Returns the first fatal
    /// error, after which the session is poisoned.
    pub fn advance(&mut self, n: usize) -> Result<RunSummary, SessionError> {
        if self.phase == AdvancePhase::Failed {
            return Err(SessionError::Poisoned);
        }

        let mut summary = RunSummary::default();
        for _ in 0..n {
            if self.phase == AdvancePhase::Stopped {
                break;
            }
            match self.advance_once() {
                Ok(report) => {
                    if report.steady_state {
                        info!("steady state reached at iteration {}", self.iteration);
                        self.enter(AdvancePhase::Stopped);
                    }
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!("advance from iteration {} failed: {}", self.iteration, e);
                    self.enter(AdvancePhase::Failed);
                    return Err(e);
                }
            }
        }
        summary.stopped = self.phase == AdvancePhase::Stopped;
        Ok(summary)
    }

    fn advance_once(&mut self) -> Result<AdvanceReport, SessionError> {
        let started = Instant::now();
        let previous_count = self.master.tracer_count();
        self.refresh_boundary()?;

        let created = if self.config.integration.generates_at(self.iteration) {
            let ctx = InjectionContext {
                seed: self.config.integration.seed,
                iteration: self.iteration,
                chunk_size: self.config.integration.sampling_chunk,
                source: &self.config.system.source,
            };
            inject(
                &mut self.master,
                &mut self.registry,
                &self.catalog,
                &self.emission,
                &self.sampling_pool,
                &ctx,
            )?
            .created
        } else {
            0
        };

        let decay = apply_decay(&mut self.master, &mut self.registry, &self.catalog, self.advance_duration);

        self.enter(AdvancePhase::Partition);
        let sizes = partition(&mut self.master, &mut self.workers)?;
        debug!("partition sizes {:?}", sizes);

        self.enter(AdvancePhase::Advancing);
        let reports = advance_workers(&mut self.workers, self.advance_duration)?;
        self.enter(AdvancePhase::Join);

        self.enter(AdvancePhase::Merge);
        let criteria = PruneCriteria {
            primary: &self.primary,
            boundary: self.boundary,
            min_physical_particles: self.config.integration.min_physical_particles,
            advance_duration: self.advance_duration,
        };
        let merged = merge_reports(
            &mut self.master,
            &self.workers[0],
            reports,
            &mut self.registry,
            &self.catalog,
            &criteria,
        )?;

        self.enter(AdvancePhase::Persist);
        self.iteration += 1;
        self.persist()?;

        let tracer_count = self.master.tracer_count();
        let change = tracer_count.abs_diff(previous_count) as f64;
        let steady_state =
            self.config.integration.stop_at_steady_state && change < self.config.integration.steady_state_epsilon;

        let report = AdvanceReport {
            iteration: self.iteration,
            created,
            removed_boundary: merged.removed_boundary.len(),
            removed_threshold: merged.removed_threshold.len(),
            absorbed: merged.absorbed.len(),
            orphaned: decay.orphaned.len() + merged.orphaned.len(),
            tracer_count,
            simulated_time: self.master.time(),
            steady_state,
        };
        info!(
            "iteration {}: created {}, removed {} boundary / {} threshold / {} absorbed, {} live, t = {:.1} h ({:.2} s wall)",
            report.iteration,
            report.created,
            report.removed_boundary,
            report.removed_threshold,
            report.absorbed,
            report.tracer_count,
            report.simulated_time.to_hours(),
            started.elapsed().as_secs_f64()
        );

        self.enter(AdvancePhase::Idle);
        Ok(report)
    }
}
