use std::{fmt, ops};

/// A relative temperature change, in Kelvin (equivalent to Celsius for deltas).
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, serde::Serialize, serde::Deserialize)]
pub struct TempDelta(pub f64);

impl TempDelta {
    #[must_use]
    pub const fn from_kelvins(kelvins: f64) -> Self { Self(kelvins) }

    #[must_use]
    pub const fn into_kelvins(self) -> f64 { self.0 }

    #[must_use]
    pub fn abs(self) -> Self { Self(self.0.abs()) }
}

impl fmt::Debug for TempDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempDelta").field("kelvins", &self.0).finish()
    }
}

impl ops::Add for TempDelta {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Self(self.0 + rhs.0) }
}
impl ops::Sub for TempDelta {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Self(self.0 - rhs.0) }
}
impl ops::Neg for TempDelta {
    type Output = Self;
    fn neg(self) -> Self { Self(-self.0) }
}
impl ops::Mul<f64> for TempDelta {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self { Self(self.0 * rhs) }
}

/// An absolute temperature. §3 requires `temperature > 0 K`; enforced by
/// construction sites in `grape-store`, not by this type itself.
#[derive(Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Temp(TempDelta);

impl Temp {
    pub const ABSOLUTE_ZERO: Self = Self(TempDelta(0.0));
    pub const WATER_FREEZING: Self = Self(TempDelta(273.15));
    /// ISA sea-level reference temperature.
    pub const ISA_SEA_LEVEL: Self = Self(TempDelta(288.15));

    #[must_use]
    pub const fn from_kelvins(kelvins: f64) -> Self { Self(TempDelta(kelvins)) }

    #[must_use]
    pub const fn into_kelvins(self) -> f64 { (self.0).0 }

    #[must_use]
    pub fn from_celsius(celsius: f64) -> Self {
        Self::from_kelvins(celsius + Self::WATER_FREEZING.into_kelvins())
    }

    #[must_use]
    pub fn into_celsius(self) -> f64 { self.into_kelvins() - Self::WATER_FREEZING.into_kelvins() }
}

impl fmt::Debug for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Temp").field("celsius", &self.into_celsius()).finish()
    }
}

impl ops::Add<TempDelta> for Temp {
    type Output = Temp;
    fn add(self, rhs: TempDelta) -> Temp { Temp(TempDelta(self.into_kelvins() + rhs.into_kelvins())) }
}
impl ops::Sub<TempDelta> for Temp {
    type Output = Temp;
    fn sub(self, rhs: TempDelta) -> Temp { Temp(TempDelta(self.into_kelvins() - rhs.into_kelvins())) }
}
impl ops::Sub for Temp {
    type Output = TempDelta;
    fn sub(self, rhs: Self) -> TempDelta { TempDelta(self.into_kelvins() - rhs.into_kelvins()) }
}
