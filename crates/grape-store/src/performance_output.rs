use std::collections::BTreeMap;

use grape_math::{Angle, GeoPoint, Length};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The flight phase a [`PerformancePoint`] belongs to (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum FlightPhase {
    Approach,
    LandingRoll,
    TakeoffRoll,
    InitialClimb,
    Climb,
}

/// Where a [`PerformancePoint`] came from, for diagnostics and testing (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum PointOrigin {
    FromRoute,
    FromProfile,
    FromBoth,
    SpeedSegmentation,
    TakeoffRollSegmentation,
    InitialClimbSegmentation,
    FinalApproachSegmentation,
}

/// A single point of a [`PerformanceOutput`] (§3). All scalars are SI per §6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PerformancePoint {
    pub time_tai_s:                i64,
    pub phase:                     FlightPhase,
    pub position:                  GeoPoint,
    pub altitude_msl:               Length,
    pub true_airspeed:              f64,
    pub groundspeed:                f64,
    pub corr_net_thrust_per_engine: f64,
    /// Signed bank angle; positive is left-wing-down (§3).
    pub bank_angle:                 Angle,
    pub fuel_flow_per_engine:       f64,
    pub origin:                     PointOrigin,
}

/// The fused four-dimensional trajectory of one operation (§3, component F
/// output), keyed by cumulative ground distance. Always has at least two
/// points, strictly increasing keys, non-decreasing time, and the runway
/// threshold present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PerformanceOutput {
    points: BTreeMap<NotNan<f64>, PerformancePoint>,
}

impl PerformanceOutput {
    /// Builds a performance output from its points, keyed by cumulative
    /// ground distance.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if fewer than two points are given, if
    /// any key is `NaN`, or if time is not non-decreasing in cumulative
    /// ground distance order (§3, §8 global invariants).
    pub fn new(points: Vec<(f64, PerformancePoint)>) -> Result<Self, ValidationError> {
        if points.len() < 2 {
            return Err(ValidationError::EmptyCollection { what: "performance output points (need >= 2)" });
        }
        let input_len = points.len();
        let mut map = BTreeMap::new();
        for (distance, point) in points {
            let key = NotNan::new(distance)
                .map_err(|_| ValidationError::MustBeNonNegative { field: "cumulative ground distance", value: f64::NAN })?;
            map.insert(key, point);
        }
        if map.len() != input_len {
            return Err(ValidationError::MustBeNonNegative {
                field: "cumulative ground distance must be strictly increasing (duplicate key)",
                value: 0.0,
            });
        }
        let mut prev_time: Option<i64> = None;
        for point in map.values() {
            if let Some(prev) = prev_time {
                if point.time_tai_s < prev {
                    return Err(ValidationError::MustBeNonNegative {
                        field: "performance output time must be non-decreasing",
                        value: (point.time_tai_s - prev) as f64,
                    });
                }
            }
            prev_time = Some(point.time_tai_s);
        }
        Ok(Self { points: map })
    }

    #[must_use]
    pub fn len(&self) -> usize { self.points.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &PerformancePoint)> {
        self.points.iter().map(|(k, v)| (k.into_inner(), v))
    }

    /// Adjacent (P1, P2) segment pairs in cumulative-ground-distance order,
    /// the unit the noise generator (component I) iterates over.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, &PerformancePoint), (f64, &PerformancePoint))> {
        self.iter().zip(self.iter().skip(1))
    }

    #[must_use]
    pub fn first(&self) -> (f64, &PerformancePoint) {
        let (k, v) = self.points.iter().next().expect("validated non-empty at construction");
        (k.into_inner(), v)
    }

    #[must_use]
    pub fn last(&self) -> (f64, &PerformancePoint) {
        let (k, v) = self.points.iter().next_back().expect("validated non-empty at construction");
        (k.into_inner(), v)
    }
}
