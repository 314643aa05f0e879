use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

use crate::mass::Mass;
use crate::time::Time;

/// A physical mass rate (mass per time) quantity using f64 precision.
///
/// The `MassRate` struct represents mass flow rates with kilograms per second
/// as the base unit. Source outgassing and sputtering yields are quoted this way.
///
/// # Examples
///
/// ```rust
/// use units::{MassRate, Time};
///
/// let outgassing = MassRate::from_kg_per_second(100.0);
/// let injected = outgassing.integrate(Time::from_seconds(1_800.0));
///
/// assert_eq!(injected.to_kg(), 180_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MassRate(f64); // Base unit: kg/s

impl MassRate {
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `MassRate` from a value in kilograms per second.
    pub fn from_kg_per_second(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `MassRate` from a value in grams per second.
    pub fn from_grams_per_second(value: f64) -> Self {
        Self(value * 1.0e-3)
    }

    /// Returns the mass rate in kilograms per second.
    pub fn to_kg_per_second(&self) -> f64 {
        self.0
    }

    /// Integrates the rate over a time span, giving the accumulated mass.
    pub fn integrate(&self, time: Time) -> Mass {
        Mass::from_kg(self.0 * time.to_seconds())
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for MassRate {
    type Output = MassRate;

    fn add(self, rhs: MassRate) -> MassRate {
        MassRate(self.0 + rhs.0)
    }
}

impl Mul<f64> for MassRate {
    type Output = MassRate;

    fn mul(self, rhs: f64) -> MassRate {
        MassRate(self.0 * rhs)
    }
}

impl Mul<Time> for MassRate {
    type Output = Mass;

    fn mul(self, rhs: Time) -> Mass {
        self.integrate(rhs)
    }
}
