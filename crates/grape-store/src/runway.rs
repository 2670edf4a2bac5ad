use std::collections::BTreeMap;

use grape_math::{GeoPoint, Heading, Length};
use serde::{Deserialize, Serialize};

use crate::{Route, RouteDirection, ValidationError};

/// A runway, owned by one [`crate::Airport`] (§3).
///
/// Owns its arrival and departure routes keyed by name, name-ordered the
/// same way `omniatc-store`'s level collections are kept in insertion or
/// name order without pulling in `indexmap` for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Runway {
    name:      String,
    threshold: GeoPoint,
    elevation: Length,
    length:    Length,
    heading:   Heading,
    /// Longitudinal gradient, dimensionless, in `[-1, 1]`.
    gradient:  f64,

    arrivals:   BTreeMap<String, Route>,
    departures: BTreeMap<String, Route>,
}

impl Runway {
    /// Builds a runway with no routes yet attached.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `length` is not positive or
    /// `gradient` is outside `[-1, 1]`.
    pub fn new(
        name: String,
        threshold: GeoPoint,
        elevation: Length,
        length: Length,
        heading: Heading,
        gradient: f64,
    ) -> Result<Self, ValidationError> {
        if length.as_meters() <= 0.0 {
            return Err(ValidationError::MustBePositive { field: "runway length", value: length.as_meters() });
        }
        if !(-1.0..=1.0).contains(&gradient) {
            return Err(ValidationError::OutOfRange {
                field: "runway gradient",
                value: gradient,
                min: -1.0,
                max: 1.0,
            });
        }
        Ok(Self {
            name,
            threshold,
            elevation,
            length,
            heading,
            gradient,
            arrivals: BTreeMap::new(),
            departures: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn threshold(&self) -> GeoPoint { self.threshold }

    #[must_use]
    pub fn elevation(&self) -> Length { self.elevation }

    #[must_use]
    pub fn length(&self) -> Length { self.length }

    #[must_use]
    pub fn heading(&self) -> Heading { self.heading }

    #[must_use]
    pub fn gradient(&self) -> f64 { self.gradient }

    /// Elevation at `distance` along the runway from the threshold (§3).
    #[must_use]
    pub fn elevation_at(&self, distance: Length) -> Length {
        self.elevation + Length::meters(distance.as_meters() * self.gradient)
    }

    /// Elevation at the far end of the runway (supplemented from
    /// `Runway::elevationEnd()` in the original source).
    #[must_use]
    pub fn elevation_end(&self) -> Length { self.elevation_at(self.length) }

    pub fn add_route(&mut self, name: String, route: Route) {
        let map = match route.direction() {
            RouteDirection::Arrival => &mut self.arrivals,
            RouteDirection::Departure => &mut self.departures,
        };
        map.insert(name, route);
    }

    #[must_use]
    pub fn arrival(&self, name: &str) -> Option<&Route> { self.arrivals.get(name) }

    #[must_use]
    pub fn departure(&self, name: &str) -> Option<&Route> { self.departures.get(name) }

    pub fn arrivals(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.arrivals.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn departures(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.departures.iter().map(|(k, v)| (k.as_str(), v))
    }
}
