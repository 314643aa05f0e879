use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};

use crate::body::{Body, BodyId, StateVector};
use crate::forces::G;
use crate::orbit::{Orbit, OrbitalElements, cartesian_to_orbital_elements, orbital_elements_to_cartesian};

/// Complete state of an N-body system at a given time
///
/// Bodies are stored with all active (gravitating) bodies first, followed by
/// massless test particles. Active bodies can be looked up by name.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    /// Current simulation time in seconds
    pub time: f64,
    /// Active bodies in `bodies[..n_active]`, test particles after them
    pub bodies: Vec<Body>,
    n_active: usize,
    names: BTreeMap<String, BodyId>,
    /// Next available body ID
    next_id: u64,
}

impl SystemState {
    /// Creates an empty system at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a named gravitating body and returns its ID
    ///
    /// Active bodies always precede test particles, so the body is inserted
    /// at the end of the active block.
    ///
    /// # Examples
    ///
    /// ```
    /// use nbody::{StateVector, SystemState};
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let mut system = SystemState::new();
    /// let sun = system.add_active("sun", 1.988e30, 6.96e8, StateVector::new(Point3::origin(), Vector3::zeros()));
    ///
    /// assert_eq!(system.n_active(), 1);
    /// assert_eq!(system.body_id("sun"), Some(sun));
    /// ```
    pub fn add_active(&mut self, name: &str, mass: f64, radius: f64, state: StateVector) -> BodyId {
        let id = self.next_body_id();
        self.bodies.insert(
            self.n_active,
            Body {
                id,
                mass,
                radius,
                position: state.position,
                velocity: state.velocity,
            },
        );
        self.n_active += 1;
        self.names.insert(name.to_string(), id);
        id
    }

    /// Adds a named gravitating body on a Keplerian orbit around `primary`
    ///
    /// The orbit is taken relative to the primary's current state using the
    /// two-body gravitational parameter G(m + m_primary).
    ///
    /// # Returns
    ///
    /// The new BodyId, or None if `primary` does not exist
    pub fn add_orbiting(
        &mut self,
        name: &str,
        mass: f64,
        radius: f64,
        primary: BodyId,
        elements: &OrbitalElements,
    ) -> Option<BodyId> {
        let primary_body = *self.get_body(primary)?;
        let mu = G * (mass + primary_body.mass);
        let relative = orbital_elements_to_cartesian(elements, mu);
        let state = relative.offset_by(&primary_body.state());
        Some(self.add_active(name, mass, radius, state))
    }

    /// Adds a massless test particle and returns its ID
    pub fn add_test_particle(&mut self, radius: f64, state: StateVector) -> BodyId {
        let id = self.next_body_id();
        self.bodies.push(Body {
            id,
            mass: 0.0,
            radius,
            position: state.position,
            velocity: state.velocity,
        });
        id
    }

    /// Removes a body from the system
    ///
    /// # Returns
    ///
    /// The removed Body if found, None otherwise
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.bodies.iter().position(|b| b.id == id)?;
        if idx < self.n_active {
            self.n_active -= 1;
            self.names.retain(|_, named| *named != id);
        }
        Some(self.bodies.remove(idx))
    }

    /// Keeps only the test particles for which `keep` returns true
    pub fn retain_test_particles<F: FnMut(&Body) -> bool>(&mut self, mut keep: F) {
        let n_active = self.n_active;
        let mut idx = 0;
        self.bodies.retain(|b| {
            let retained = idx < n_active || keep(b);
            idx += 1;
            retained
        });
    }

    /// Registers an additional name for an existing active body
    ///
    /// Returns false if `id` is not an active body.
    pub fn add_alias(&mut self, name: &str, id: BodyId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        self.names.insert(name.to_string(), id);
        true
    }

    /// Replaces the active bodies, their names and the clock with those of
    /// `other`, keeping this system's test particles
    pub fn sync_active_from(&mut self, other: &SystemState) {
        let test_particles = self.bodies.split_off(self.n_active);
        self.bodies = other.active_bodies().to_vec();
        self.bodies.extend(test_particles);
        self.n_active = other.n_active;
        self.names = other.names.clone();
        self.time = other.time;
        self.next_id = self.next_id.max(other.next_id);
    }

    /// Points `name` at a different body (used when a named body is merged away)
    pub(crate) fn rename(&mut self, from: BodyId, to: BodyId) {
        for id in self.names.values_mut() {
            if *id == from {
                *id = to;
            }
        }
    }

    /// True if `id` names a gravitating body rather than a test particle
    pub fn is_active(&self, id: BodyId) -> bool {
        self.active_bodies().iter().any(|b| b.id == id)
    }

    /// Gets a reference to a body by ID
    pub fn get_body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Gets a mutable reference to a body by ID
    pub fn get_body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.names.get(name).copied()
    }

    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.body_id(name).and_then(|id| self.get_body(id))
    }

    /// Names of the active bodies with their IDs, in name order
    pub fn names(&self) -> impl Iterator<Item = (&str, BodyId)> {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of gravitating bodies
    pub fn n_active(&self) -> usize {
        self.n_active
    }

    pub fn active_bodies(&self) -> &[Body] {
        &self.bodies[..self.n_active]
    }

    pub fn test_particles(&self) -> &[Body] {
        &self.bodies[self.n_active..]
    }

    /// Returns the number of bodies in the system, test particles included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn test_particle_count(&self) -> usize {
        self.bodies.len() - self.n_active
    }

    /// Orbit of `body` around `primary` from their current relative state
    ///
    /// # Examples
    ///
    /// ```
    /// use nbody::{OrbitalElements, StateVector, SystemState};
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let mut system = SystemState::new();
    /// let sun = system.add_active("sun", 1.988e30, 6.96e8, StateVector::new(Point3::origin(), Vector3::zeros()));
    /// let earth = system
    ///     .add_orbiting("earth", 5.972e24, 6.371e6, sun, &OrbitalElements::circular(1.496e11))
    ///     .unwrap();
    ///
    /// let orbit = system.orbit(earth, sun).unwrap();
    /// let days = orbit.period().unwrap() / 86_400.0;
    /// assert!((days - 365.2).abs() < 1.0);
    /// ```
    pub fn orbit(&self, body: BodyId, primary: BodyId) -> Option<Orbit> {
        let b = self.get_body(body)?;
        let p = self.get_body(primary)?;
        let mu = G * (b.mass + p.mass);
        let elements = cartesian_to_orbital_elements(&b.state().relative_to(&p.state()), mu);
        Some(Orbit { elements, mu })
    }

    /// Mass-weighted centre of the active bodies
    pub fn center_of_mass(&self) -> StateVector {
        let total: f64 = self.active_bodies().iter().map(|b| b.mass).sum();
        if total == 0.0 {
            return StateVector::new(Point3::origin(), Vector3::zeros());
        }
        let (r, v) = self
            .active_bodies()
            .iter()
            .fold((Vector3::zeros(), Vector3::zeros()), |(r, v), b| {
                (r + b.position.coords * b.mass, v + b.momentum())
            });
        StateVector::new(Point3::from(r / total), v / total)
    }

    /// Shifts every body into the centre-of-mass frame of the active bodies
    pub fn move_to_com(&mut self) {
        let com = self.center_of_mass();
        for body in &mut self.bodies {
            body.set_state(body.state().relative_to(&com));
        }
    }

    /// Returns the total momentum of all bodies
    ///
    /// This should be approximately zero in the centre-of-mass frame
    /// (useful for checking numerical drift)
    pub fn total_momentum(&self) -> Vector3<f64> {
        self.bodies
            .iter()
            .map(|b| b.momentum())
            .fold(Vector3::zeros(), |acc, p| acc + p)
    }

    pub fn total_mass(&self) -> f64 {
        self.active_bodies().iter().map(|b| b.mass).sum()
    }
}
