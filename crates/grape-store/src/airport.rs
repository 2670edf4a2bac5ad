use std::collections::BTreeMap;

use grape_math::{GeoPoint, Length, Temp};
use serde::{Deserialize, Serialize};

use crate::{Runway, ValidationError};

/// An airport: a reference point, reference atmosphere defaults, and a
/// name-keyed set of runways (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Airport {
    name:                       String,
    reference_point:            GeoPoint,
    reference_elevation:        Length,
    reference_temperature:      Temp,
    reference_sea_level_pressure_pa: f64,

    runways: BTreeMap<String, Runway>,
}

impl Airport {
    /// Builds an airport with no runways yet attached.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if the reference temperature or
    /// sea-level pressure are not positive (§3 invariants).
    pub fn new(
        name: String,
        reference_point: GeoPoint,
        reference_elevation: Length,
        reference_temperature: Temp,
        reference_sea_level_pressure_pa: f64,
    ) -> Result<Self, ValidationError> {
        if reference_temperature.into_kelvins() <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "reference temperature",
                value: reference_temperature.into_kelvins(),
            });
        }
        if reference_sea_level_pressure_pa <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "reference sea level pressure",
                value: reference_sea_level_pressure_pa,
            });
        }
        Ok(Self {
            name,
            reference_point,
            reference_elevation,
            reference_temperature,
            reference_sea_level_pressure_pa,
            runways: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn reference_point(&self) -> GeoPoint { self.reference_point }

    #[must_use]
    pub fn reference_elevation(&self) -> Length { self.reference_elevation }

    #[must_use]
    pub fn reference_temperature(&self) -> Temp { self.reference_temperature }

    #[must_use]
    pub fn reference_sea_level_pressure_pa(&self) -> f64 { self.reference_sea_level_pressure_pa }

    pub fn add_runway(&mut self, runway: Runway) { self.runways.insert(runway.name().to_owned(), runway); }

    #[must_use]
    pub fn runway(&self, name: &str) -> Option<&Runway> { self.runways.get(name) }

    pub fn runways(&self) -> impl Iterator<Item = &Runway> { self.runways.values() }
}
