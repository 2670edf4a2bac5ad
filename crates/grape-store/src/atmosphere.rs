use grape_math::{Heading, Length, Temp, TempDelta};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// ISA with additive offsets and a constant wind, per §3/§4.1.
///
/// `density_ratio`, `pressure_ratio` and `temperature_ratio` are derived
/// from [`reference_temperature`](Self::reference_temperature) and
/// [`sea_level_pressure`](Self::sea_level_pressure); they are never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Atmosphere {
    temperature_offset:   TempDelta,
    sea_level_pressure_offset_pa: f64,
    wind_speed:  f64,
    wind_heading: Heading,
}

/// ISA sea-level reference pressure, in Pascals.
pub const ISA_SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;
/// ISA tropospheric temperature lapse rate, in K/m.
pub const ISA_LAPSE_RATE_K_PER_M: f64 = 0.006_5;
/// Dry-air specific gas constant, in J/(kg·K).
const GAS_CONSTANT: f64 = 287.052_87;
/// Standard gravitational acceleration, in m/s^2.
const GRAVITY: f64 = 9.806_65;

impl Atmosphere {
    /// Builds an atmosphere from ISA offsets and a constant wind.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if the resulting sea-level temperature or
    /// pressure would not be positive (§3 invariant).
    pub fn new(
        temperature_offset: TempDelta,
        sea_level_pressure_offset_pa: f64,
        wind_speed: f64,
        wind_heading: Heading,
    ) -> Result<Self, ValidationError> {
        let temperature = Temp::ISA_SEA_LEVEL + temperature_offset;
        if temperature.into_kelvins() <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "temperature",
                value: temperature.into_kelvins(),
            });
        }
        let pressure = ISA_SEA_LEVEL_PRESSURE_PA + sea_level_pressure_offset_pa;
        if pressure <= 0.0 {
            return Err(ValidationError::MustBePositive { field: "pressure", value: pressure });
        }
        if wind_speed < 0.0 {
            return Err(ValidationError::MustBeNonNegative { field: "wind_speed", value: wind_speed });
        }
        Ok(Self { temperature_offset, sea_level_pressure_offset_pa, wind_speed, wind_heading })
    }

    #[must_use]
    pub fn temperature_offset(self) -> TempDelta { self.temperature_offset }

    #[must_use]
    pub fn sea_level_pressure_offset_pa(self) -> f64 { self.sea_level_pressure_offset_pa }

    /// Temperature at `alt_msl`, following the ISA lapse rate shifted by
    /// this atmosphere's temperature offset.
    #[must_use]
    pub fn temperature(self, alt_msl: Length) -> Temp {
        Temp::ISA_SEA_LEVEL + self.temperature_offset - TempDelta::from_kelvins(ISA_LAPSE_RATE_K_PER_M * alt_msl.as_meters())
    }

    /// Pressure at `alt_msl`, via the barometric formula referenced to this
    /// atmosphere's sea-level pressure.
    #[must_use]
    pub fn pressure(self, alt_msl: Length) -> f64 {
        let isa_sea_level_temp = Temp::ISA_SEA_LEVEL.into_kelvins();
        let sea_level_pressure = ISA_SEA_LEVEL_PRESSURE_PA + self.sea_level_pressure_offset_pa;
        let temperature_ratio_isa = 1.0 - ISA_LAPSE_RATE_K_PER_M * alt_msl.as_meters() / isa_sea_level_temp;
        sea_level_pressure * temperature_ratio_isa.powf(GRAVITY / (GAS_CONSTANT * ISA_LAPSE_RATE_K_PER_M))
    }

    /// Pressure ratio `δ` relative to ISA sea level.
    #[must_use]
    pub fn pressure_ratio(self, alt_msl: Length) -> f64 { self.pressure(alt_msl) / ISA_SEA_LEVEL_PRESSURE_PA }

    /// Temperature ratio `θ` relative to ISA sea level.
    #[must_use]
    pub fn temperature_ratio(self, alt_msl: Length) -> f64 {
        self.temperature(alt_msl).into_kelvins() / Temp::ISA_SEA_LEVEL.into_kelvins()
    }

    /// Density ratio `σ = δ/θ` relative to ISA sea level.
    #[must_use]
    pub fn density_ratio(self, alt_msl: Length) -> f64 {
        self.pressure_ratio(alt_msl) / self.temperature_ratio(alt_msl)
    }

    /// The headwind component of this atmosphere's wind along `track_heading`.
    #[must_use]
    pub fn headwind(self, track_heading: Heading) -> f64 {
        self.wind_speed * (self.wind_heading - track_heading).cos()
    }
}
