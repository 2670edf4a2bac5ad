use std::sync::Arc;

use grape_math::{Angle, GeoPoint, Length};
use serde::{Deserialize, Serialize};

use crate::{Doc29Aircraft, NoiseAircraft, ProfileId, Route, RouteDirection, Runway, ValidationError};

/// Percentage thrust derates applied to a departure's takeoff and climb
/// ratings, each in `[0.5, 1]` (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DepartureDerate {
    pub takeoff_fraction: f64,
    pub climb_fraction:   f64,
}

impl DepartureDerate {
    /// # Errors
    /// Returns [`ValidationError`] if either fraction is outside `[0.5, 1]`.
    pub fn new(takeoff_fraction: f64, climb_fraction: f64) -> Result<Self, ValidationError> {
        for (field, value) in [("takeoff derate", takeoff_fraction), ("climb derate", climb_fraction)] {
            if !(0.5..=1.0).contains(&value) {
                return Err(ValidationError::OutOfRange { field, value, min: 0.5, max: 1.0 });
            }
        }
        Ok(Self { takeoff_fraction, climb_fraction })
    }
}

/// A single operation of a scenario (§3): a symbolic [`Flight`] to be
/// expanded through the full pipeline, or a pre-recorded [`Track4D`] that
/// skips route and profile expansion entirely.
#[derive(Clone)]
pub enum Operation {
    Flight(Flight),
    Track4D(Track4D),
}

impl Operation {
    #[must_use]
    pub fn direction(&self) -> RouteDirection {
        match self {
            Operation::Flight(f) => f.route.direction(),
            Operation::Track4D(t) => t.direction,
        }
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        match self {
            Operation::Flight(f) => f.count,
            Operation::Track4D(t) => t.count,
        }
    }
}

/// A symbolic flight: an aircraft flown over a route with a Doc29 profile (§3).
#[derive(Clone)]
pub struct Flight {
    pub aircraft:       Arc<Doc29Aircraft>,
    pub noise_aircraft: Arc<NoiseAircraft>,
    pub runway:         Arc<Runway>,
    pub route:          Arc<Route>,
    pub profile:        ProfileId,
    weight_n:            f64,
    scheduled_time_tai_s: i64,
    count:                u32,
    derate:              Option<DepartureDerate>,
}

impl Flight {
    /// Builds a flight.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `weight_n` is not positive, or if
    /// `derate` is provided for an arrival route (derates only apply to
    /// departures, per §3).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aircraft: Arc<Doc29Aircraft>,
        noise_aircraft: Arc<NoiseAircraft>,
        runway: Arc<Runway>,
        route: Arc<Route>,
        profile: ProfileId,
        weight_n: f64,
        scheduled_time_tai_s: i64,
        count: u32,
        derate: Option<DepartureDerate>,
    ) -> Result<Self, ValidationError> {
        if weight_n <= 0.0 {
            return Err(ValidationError::MustBePositive { field: "weight", value: weight_n });
        }
        if derate.is_some() && route.direction() != RouteDirection::Departure {
            return Err(ValidationError::OutOfRange {
                field: "derate is only valid on a departure route",
                value: 1.0,
                min: 0.0,
                max: 0.0,
            });
        }
        Ok(Self {
            aircraft,
            noise_aircraft,
            runway,
            route,
            profile,
            weight_n,
            scheduled_time_tai_s,
            count,
            derate,
        })
    }

    #[must_use]
    pub fn weight_n(&self) -> f64 { self.weight_n }

    #[must_use]
    pub fn scheduled_time_tai_s(&self) -> i64 { self.scheduled_time_tai_s }

    #[must_use]
    pub fn count(&self) -> u32 { self.count }

    #[must_use]
    pub fn derate(&self) -> Option<DepartureDerate> { self.derate }
}

/// A single time-stamped sample of a pre-recorded 4-D track (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Track4DPoint {
    pub time_tai_s:                 i64,
    pub position:                   GeoPoint,
    pub altitude_msl:                Length,
    pub true_airspeed:               f64,
    pub bank_angle:                  Angle,
    pub corr_net_thrust_per_engine:  f64,
}

/// An operation whose 4-D trajectory is already known and supplied directly,
/// skipping profile expansion entirely (§3).
#[derive(Clone)]
pub struct Track4D {
    pub noise_aircraft: Arc<NoiseAircraft>,
    points:              Vec<Track4DPoint>,
    direction:           RouteDirection,
    count:               u32,
}

impl Track4D {
    /// Builds a track.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if fewer than 2 points are supplied, or
    /// if timestamps are not non-decreasing.
    pub fn new(
        noise_aircraft: Arc<NoiseAircraft>,
        points: Vec<Track4DPoint>,
        direction: RouteDirection,
        count: u32,
    ) -> Result<Self, ValidationError> {
        if points.len() < 2 {
            return Err(ValidationError::EmptyCollection { what: "Track4D points (need >= 2)" });
        }
        if points.windows(2).any(|w| w[1].time_tai_s < w[0].time_tai_s) {
            return Err(ValidationError::MustBeNonNegative {
                field: "Track4D timestamps must be non-decreasing",
                value: -1.0,
            });
        }
        Ok(Self { noise_aircraft, points, direction, count })
    }

    #[must_use]
    pub fn points(&self) -> &[Track4DPoint] { &self.points }

    #[must_use]
    pub fn direction(&self) -> RouteDirection { self.direction }
}
