//! Physics engine seam and its N-body implementation
//!
//! The coordinator only ever talks to a [`PhysicsEngine`]. Tracers are
//! addressed by [`ParticleId`]; gravitating bodies by name.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::{Point3, Vector3};
use nbody::collisions::DirectDetector;
use nbody::forces::DirectGravity;
use nbody::integrator::Leapfrog;
use nbody::propagate::propagate;
use nbody::{BodyId, OrbitalElements, StateVector, SystemState};
use serde::{Deserialize, Serialize};
use units::{Length, Mass, Time};

use crate::config::{IntegrationConfig, SystemConfig};
use crate::error::{ConfigError, EngineError};
use crate::id::ParticleId;

/// Kinematic state of one tracer, as handed between engine copies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracerState {
    pub id: ParticleId,
    pub position: [f64; 3], // m
    pub velocity: [f64; 3], // m/s
}

impl TracerState {
    pub fn new(id: ParticleId, state: &StateVector) -> Self {
        Self {
            id,
            position: state.position.coords.into(),
            velocity: state.velocity.into(),
        }
    }

    pub fn state(&self) -> StateVector {
        StateVector::new(Point3::from(self.position), Vector3::from(self.velocity))
    }

    /// Distance in meters to the position of `other`
    pub fn distance_to(&self, other: &StateVector) -> f64 {
        (Point3::from(self.position) - other.position).magnitude()
    }
}

/// A gravitating body in an [`EngineSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBody {
    /// Every name the body answers to; more than one after a merger
    pub names: Vec<String>,
    pub mass: Mass,
    pub radius: Length,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// Serializable picture of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Simulated time in seconds
    pub time: f64,
    pub active: Vec<ActiveBody>,
    pub tracers: Vec<TracerState>,
}

/// Two-body orbit of one engine body around another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSummary {
    pub semi_major_axis: Length,
    pub eccentricity: f64,
    pub inclination: f64,
    pub true_anomaly: f64,
    /// None for unbound orbits
    pub period: Option<Time>,
}

/// Gravitational propagation of active bodies and massless tracers
///
/// Worker copies are made with `Clone`. Two copies holding the same active
/// bodies must evolve those bodies identically, whatever tracers they carry.
pub trait PhysicsEngine: Clone + Send {
    /// Adds a massless point tracer
    fn add(&mut self, id: ParticleId, state: StateVector) -> Result<(), EngineError>;

    /// Removes a tracer; unknown ids are ignored
    fn remove(&mut self, id: ParticleId) -> Option<TracerState>;

    /// Propagates the whole system by `duration`
    ///
    /// # Returns
    ///
    /// Tracers absorbed by collisions with active bodies
    fn advance(&mut self, duration: Time) -> Result<Vec<ParticleId>, EngineError>;

    fn position_velocity(&self, id: ParticleId) -> Option<StateVector>;

    fn body_state(&self, name: &str) -> Result<StateVector, EngineError>;

    fn body_radius(&self, name: &str) -> Result<Length, EngineError>;

    fn orbital_elements(&self, body: &str, primary: &str) -> Result<OrbitSummary, EngineError>;

    /// Live tracer ids in ascending order
    fn tracer_ids(&self) -> Vec<ParticleId>;

    fn tracer_count(&self) -> usize;

    /// Number of gravitating bodies
    fn active_count(&self) -> usize;

    /// Removes and returns every tracer, in ascending id order
    fn drain_tracers(&mut self) -> Vec<TracerState>;

    fn insert_tracers(&mut self, tracers: Vec<TracerState>) -> Result<(), EngineError> {
        tracers.into_iter().try_for_each(|t| self.add(t.id, t.state()))
    }

    /// Copies active bodies and time from `reference`, keeping own tracers
    fn sync_active(&mut self, reference: &Self);

    fn time(&self) -> Time;

    fn snapshot(&self) -> EngineSnapshot;

    /// Replaces the entire state with `snapshot`
    fn restore(&mut self, snapshot: &EngineSnapshot) -> Result<(), EngineError>;
}

/// [`PhysicsEngine`] backed by the `nbody` crate
///
/// Direct-summation gravity over the active bodies, kick-drift-kick
/// leapfrog with `substeps` steps per advance, and merge-on-contact
/// collisions checked after every step.
#[derive(Debug, Clone)]
pub struct GravityEngine {
    system: SystemState,
    tracers: BTreeMap<ParticleId, BodyId>,
    particles: BTreeMap<BodyId, ParticleId>,
    substeps: usize,
    gravity: DirectGravity,
}

impl GravityEngine {
    pub fn new(system: SystemState, substeps: usize) -> Self {
        Self {
            system,
            tracers: BTreeMap::new(),
            particles: BTreeMap::new(),
            substeps,
            gravity: DirectGravity::new(),
        }
    }

    /// Places the configured bodies on their orbits and shifts to the
    /// centre-of-mass frame
    pub fn from_system(system: &SystemConfig, integration: &IntegrationConfig) -> Result<Self, ConfigError> {
        let mut state = SystemState::new();
        let at_rest = StateVector::new(Point3::origin(), Vector3::zeros());

        for body in &system.bodies {
            let mass = body.mass.to_kg();
            let radius = body.radius.to_meters();
            match &body.orbit {
                None => {
                    state.add_active(&body.name, mass, radius, at_rest);
                }
                Some(orbit) => {
                    let unknown = || ConfigError::UnknownPrimary {
                        body: body.name.clone(),
                        primary: orbit.primary.clone(),
                    };
                    let primary = state.body_id(&orbit.primary).ok_or_else(unknown)?;
                    let elements = OrbitalElements {
                        semi_major_axis: orbit.semi_major_axis.to_meters(),
                        eccentricity: orbit.eccentricity,
                        inclination: orbit.inclination,
                        ascending_node: orbit.ascending_node,
                        argument_of_periapsis: orbit.periapsis,
                        true_anomaly: orbit.true_anomaly,
                    };
                    state
                        .add_orbiting(&body.name, mass, radius, primary, &elements)
                        .ok_or_else(unknown)?;
                }
            }
        }
        state.move_to_com();

        Ok(Self::new(state, integration.substeps))
    }

    pub fn system(&self) -> &SystemState {
        &self.system
    }

    fn body(&self, name: &str) -> Result<&nbody::Body, EngineError> {
        self.system
            .body_by_name(name)
            .ok_or_else(|| EngineError::UnknownBody(name.to_string()))
    }

    fn forget(&mut self, body: BodyId) -> Option<ParticleId> {
        let id = self.particles.remove(&body)?;
        self.tracers.remove(&id);
        Some(id)
    }

    fn tracer_states(&self) -> Vec<TracerState> {
        let mut states: Vec<TracerState> = self
            .system
            .test_particles()
            .iter()
            .filter_map(|b| self.particles.get(&b.id).map(|id| TracerState::new(*id, &b.state())))
            .collect();
        states.sort_by_key(|t| t.id);
        states
    }
}

impl PhysicsEngine for GravityEngine {
    fn add(&mut self, id: ParticleId, state: StateVector) -> Result<(), EngineError> {
        if !state.is_finite() {
            return Err(EngineError::NonFinite(id.to_string()));
        }
        if self.tracers.contains_key(&id) {
            return Err(EngineError::DuplicateParticle(id));
        }
        let body = self.system.add_test_particle(0.0, state);
        self.tracers.insert(id, body);
        self.particles.insert(body, id);
        Ok(())
    }

    fn remove(&mut self, id: ParticleId) -> Option<TracerState> {
        let body = self.tracers.remove(&id)?;
        self.particles.remove(&body);
        self.system
            .remove_body(body)
            .map(|b| TracerState::new(id, &b.state()))
    }

    fn advance(&mut self, duration: Time) -> Result<Vec<ParticleId>, EngineError> {
        let removed = propagate(
            &mut self.system,
            &Leapfrog,
            &self.gravity,
            &DirectDetector,
            duration.to_seconds(),
            self.substeps,
        );

        let mut absorbed = Vec::new();
        for body in removed {
            match self.forget(body) {
                Some(id) => absorbed.push(id),
                None => debug!("active body {} merged away", body.0),
            }
        }

        if let Some(bad) = self.system.bodies.iter().find(|b| !b.state().is_finite()) {
            let label = self
                .particles
                .get(&bad.id)
                .map_or_else(|| format!("body {}", bad.id.0), ToString::to_string);
            return Err(EngineError::NonFinite(label));
        }

        Ok(absorbed)
    }

    fn position_velocity(&self, id: ParticleId) -> Option<StateVector> {
        let body = self.tracers.get(&id)?;
        self.system.get_body(*body).map(|b| b.state())
    }

    fn body_state(&self, name: &str) -> Result<StateVector, EngineError> {
        self.body(name).map(|b| b.state())
    }

    fn body_radius(&self, name: &str) -> Result<Length, EngineError> {
        self.body(name).map(|b| Length::from_meters(b.radius))
    }

    fn orbital_elements(&self, body: &str, primary: &str) -> Result<OrbitSummary, EngineError> {
        let b = self.body(body)?.id;
        let p = self.body(primary)?.id;
        let orbit = self
            .system
            .orbit(b, p)
            .ok_or_else(|| EngineError::UnknownBody(body.to_string()))?;

        Ok(OrbitSummary {
            semi_major_axis: Length::from_meters(orbit.elements.semi_major_axis),
            eccentricity: orbit.elements.eccentricity,
            inclination: orbit.elements.inclination,
            true_anomaly: orbit.elements.true_anomaly,
            period: orbit.period().map(Time::from_seconds),
        })
    }

    fn tracer_ids(&self) -> Vec<ParticleId> {
        self.tracers.keys().copied().collect()
    }

    fn tracer_count(&self) -> usize {
        self.tracers.len()
    }

    fn active_count(&self) -> usize {
        self.system.n_active()
    }

    fn drain_tracers(&mut self) -> Vec<TracerState> {
        let states = self.tracer_states();
        self.system.retain_test_particles(|_| false);
        self.tracers.clear();
        self.particles.clear();
        states
    }

    fn sync_active(&mut self, reference: &Self) {
        self.system.sync_active_from(&reference.system);
    }

    fn time(&self) -> Time {
        Time::from_seconds(self.system.time)
    }

    fn snapshot(&self) -> EngineSnapshot {
        let mut names: BTreeMap<BodyId, Vec<String>> = BTreeMap::new();
        for (name, id) in self.system.names() {
            names.entry(id).or_default().push(name.to_string());
        }

        let active = self
            .system
            .active_bodies()
            .iter()
            .map(|b| ActiveBody {
                names: names.remove(&b.id).unwrap_or_default(),
                mass: Mass::from_kg(b.mass),
                radius: Length::from_meters(b.radius),
                position: b.position.coords.into(),
                velocity: b.velocity.into(),
            })
            .collect();

        EngineSnapshot {
            time: self.system.time,
            active,
            tracers: self.tracer_states(),
        }
    }

    fn restore(&mut self, snapshot: &EngineSnapshot) -> Result<(), EngineError> {
        let mut system = SystemState::new();
        system.time = snapshot.time;

        for body in &snapshot.active {
            let Some((first, aliases)) = body.names.split_first() else {
                return Err(EngineError::InvalidSnapshot("active body without a name".to_string()));
            };
            let state = StateVector::new(Point3::from(body.position), Vector3::from(body.velocity));
            if !state.is_finite() {
                return Err(EngineError::NonFinite(first.clone()));
            }
            let id = system.add_active(first, body.mass.to_kg(), body.radius.to_meters(), state);
            for alias in aliases {
                system.add_alias(alias, id);
            }
        }

        let mut restored = GravityEngine::new(system, self.substeps);
        restored.insert_tracers(snapshot.tracers.clone())?;
        *self = restored;
        Ok(())
    }
}
