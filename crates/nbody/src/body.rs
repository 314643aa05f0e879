use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Position and velocity of a body in the simulation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Point3<f64>,  // m
    pub velocity: Vector3<f64>, // m/s
}

impl StateVector {
    pub fn new(position: Point3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Builds a state from the flat `[x, y, z, vx, vy, vz]` layout emission samplers produce
    ///
    /// # Examples
    ///
    /// ```
    /// use nbody::StateVector;
    ///
    /// let state = StateVector::from_components([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// assert_eq!(state.position.z, 3.0);
    /// assert_eq!(state.velocity.x, 4.0);
    /// assert_eq!(state.components(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// ```
    pub fn from_components(c: [f64; 6]) -> Self {
        Self {
            position: Point3::new(c[0], c[1], c[2]),
            velocity: Vector3::new(c[3], c[4], c[5]),
        }
    }

    pub fn components(&self) -> [f64; 6] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }

    /// State of `self` relative to `origin` (position and velocity differences)
    pub fn relative_to(&self, origin: &StateVector) -> StateVector {
        StateVector {
            position: Point3::from(self.position - origin.position),
            velocity: self.velocity - origin.velocity,
        }
    }

    /// Translates a relative state back into the frame `origin` lives in
    pub fn offset_by(&self, origin: &StateVector) -> StateVector {
        StateVector {
            position: origin.position + self.position.coords,
            velocity: origin.velocity + self.velocity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub mass: f64,               // kg (zero for test particles)
    pub radius: f64,             // m (physical radius for collisions)
    pub position: Point3<f64>,   // m
    pub velocity: Vector3<f64>,  // m/s
}

impl Body {
    pub fn state(&self) -> StateVector {
        StateVector::new(self.position, self.velocity)
    }

    pub fn set_state(&mut self, state: StateVector) {
        self.position = state.position;
        self.velocity = state.velocity;
    }

    pub fn is_test_particle(&self) -> bool {
        self.mass == 0.0
    }

    pub fn momentum(&self) -> Vector3<f64> {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).magnitude()
    }
}
