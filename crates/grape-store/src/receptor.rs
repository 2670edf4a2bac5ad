use grape_math::{GeoPoint, Length};
use serde::{Deserialize, Serialize};

/// A fixed noise-monitoring point: a name, a geographic position, and a
/// ground elevation (§3, §4.9). The noise generator measures slant distance
/// and elevation/depression angle against this position for every segment
/// within its configured maximum distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Receptor {
    name:      String,
    position:  GeoPoint,
    elevation: Length,
}

impl Receptor {
    #[must_use]
    pub fn new(name: String, position: GeoPoint, elevation: Length) -> Self {
        Self { name, position, elevation }
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn position(&self) -> GeoPoint { self.position }

    #[must_use]
    pub fn elevation(&self) -> Length { self.elevation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getters_round_trip_constructor_arguments() {
        let receptor = Receptor::new("MON-1".to_owned(), GeoPoint::new(1.0, 2.0), Length::meters(15.0));
        assert_eq!(receptor.name(), "MON-1");
        assert_eq!(receptor.position(), GeoPoint::new(1.0, 2.0));
        assert_eq!(receptor.elevation(), Length::meters(15.0));
    }
}
