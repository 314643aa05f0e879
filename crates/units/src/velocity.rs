use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::{Length, Mass};

/// Gravitational constant in m³ kg⁻¹ s⁻²
const G: f64 = 6.6743e-11;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Velocity(f64); // Base unit: m/s

impl Velocity {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_meters_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn from_km_per_sec(value: f64) -> Self {
        Self(value * 1.0e3)
    }

    pub fn to_meters_per_sec(&self) -> f64 {
        self.0
    }

    pub fn to_km_per_sec(&self) -> f64 {
        self.0 / 1.0e3
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 + rhs.0)
    }
}

impl Sub for Velocity {
    type Output = Velocity;

    fn sub(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 - rhs.0)
    }
}

impl Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Velocity {
        Velocity(self.0 * rhs)
    }
}

/// Escape velocity from the surface of a body: v = sqrt(2GM/R)
///
/// # Examples
/// ```
/// use units::velocity::escape_velocity;
/// use units::{Length, Mass};
///
/// // Europa: ~2.0 km/s
/// let v = escape_velocity(Mass::from_kg(4.799e22), Length::from_km(1560.8));
/// assert!((v.to_km_per_sec() - 2.02).abs() < 0.05);
/// ```
pub fn escape_velocity(mass: Mass, radius: Length) -> Velocity {
    Velocity((2.0 * G * mass.to_kg() / radius.to_meters()).sqrt())
}
