use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Mass of the Sun in kilograms
pub const SOLAR_MASS_KG: f64 = 1.988e30;

/// Mass of Jupiter in kilograms
pub const JUPITER_MASS_KG: f64 = 1.898e27;

/// Mass of the Earth in kilograms
pub const EARTH_MASS_KG: f64 = 5.972e24;

/// Atomic mass unit in kilograms
pub const AMU_KG: f64 = 1.660_539_066_60e-27;

/// A physical mass quantity using f64 precision.
///
/// The `Mass` struct represents mass values with kilograms as the base unit.
/// The same type covers a single sodium atom and a host star, so constructors
/// exist for atomic mass units as well as for solar and planetary masses.
///
/// # Examples
///
/// ```rust
/// use units::Mass;
///
/// let sodium = Mass::from_amu(23.0);
/// let europa = Mass::from_kg(4.799e22);
/// let jupiter = Mass::from_jupiter_masses(1.0);
///
/// assert!(jupiter > europa);
/// assert!(sodium.to_kg() < 1e-25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Mass(f64); // Base unit: kilograms

impl Mass {
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Mass` from a value in kilograms.
    pub fn from_kg(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Mass` from a value in atomic mass units.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use units::{Mass, AMU_KG};
    ///
    /// let oxygen = Mass::from_amu(16.0);
    /// assert_eq!(oxygen.to_kg(), 16.0 * AMU_KG);
    /// ```
    pub fn from_amu(value: f64) -> Self {
        Self(value * AMU_KG)
    }

    /// Creates a new `Mass` from a value in solar masses.
    pub fn from_solar_masses(value: f64) -> Self {
        Self(value * SOLAR_MASS_KG)
    }

    /// Creates a new `Mass` from a value in Jupiter masses.
    pub fn from_jupiter_masses(value: f64) -> Self {
        Self(value * JUPITER_MASS_KG)
    }

    /// Creates a new `Mass` from a value in Earth masses.
    pub fn from_earth_masses(value: f64) -> Self {
        Self(value * EARTH_MASS_KG)
    }

    /// Returns the mass in kilograms.
    pub fn to_kg(&self) -> f64 {
        self.0
    }

    /// Converts the mass to atomic mass units.
    pub fn to_amu(&self) -> f64 {
        self.0 / AMU_KG
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Mass {
    type Output = Mass;

    fn add(self, rhs: Mass) -> Mass {
        Mass(self.0 + rhs.0)
    }
}

impl Sub for Mass {
    type Output = Mass;

    fn sub(self, rhs: Mass) -> Mass {
        Mass(self.0 - rhs.0)
    }
}

impl Mul<f64> for Mass {
    type Output = Mass;

    fn mul(self, rhs: f64) -> Mass {
        Mass(self.0 * rhs)
    }
}

impl Mul<Mass> for f64 {
    type Output = Mass;

    fn mul(self, rhs: Mass) -> Mass {
        rhs * self
    }
}

impl Div<f64> for Mass {
    type Output = Mass;

    fn div(self, rhs: f64) -> Mass {
        Mass(self.0 / rhs)
    }
}

/// Mass divided by mass is a count: total mass over per-particle mass
impl Div for Mass {
    type Output = f64;

    fn div(self, rhs: Mass) -> f64 {
        self.0 / rhs.0
    }
}
