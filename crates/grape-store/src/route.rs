use grape_math::{GeoPoint, Length, TurnDirection};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Whether a [`Route`] serves arriving or departing traffic (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum RouteDirection {
    Arrival,
    Departure,
}

/// A symbolic lateral route, owned by a runway (§3). The route expander
/// (component C) turns any of these three variants into a dense polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Route {
    direction: RouteDirection,
    kind:      RouteKind,
}

/// The three route-description variants the expander accepts (§3). Closed
/// per the "visitor double-dispatch" design note in §9 — new variants are
/// not added outside this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum RouteKind {
    /// An ordered sequence of (longitude, latitude) points.
    PointSequence(Vec<GeoPoint>),
    /// An ordered sequence of straight/turn vectors.
    VectorSequence(Vec<Vector>),
    /// An ordered sequence of RNAV track-to-fix / radius-to-fix steps.
    RnpSequence(Vec<RnpStep>),
}

/// A single element of a [`RouteKind::VectorSequence`] (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Vector {
    Straight { distance: Length },
    Turn { radius: Length, heading_change: grape_math::Angle, direction: TurnDirection },
}

/// A single element of a [`RouteKind::RnpSequence`] (§3). The first step of
/// a sequence cannot be [`RnpStep::RadiusToFix`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum RnpStep {
    TrackToFix { fix: GeoPoint },
    RadiusToFix { fix: GeoPoint, turn_center: GeoPoint },
}

impl Route {
    /// Builds a point-sequence route.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `points` is empty.
    pub fn point_sequence(direction: RouteDirection, points: Vec<GeoPoint>) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptyCollection { what: "route point sequence" });
        }
        Ok(Self { direction, kind: RouteKind::PointSequence(points) })
    }

    /// Builds a vector-sequence route.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `vectors` is empty, a straight distance
    /// is not positive, or a turn radius is not positive.
    pub fn vector_sequence(direction: RouteDirection, vectors: Vec<Vector>) -> Result<Self, ValidationError> {
        if vectors.is_empty() {
            return Err(ValidationError::EmptyCollection { what: "route vector sequence" });
        }
        for vector in &vectors {
            match *vector {
                Vector::Straight { distance } if distance.as_meters() <= 0.0 => {
                    return Err(ValidationError::MustBePositive {
                        field: "vector straight distance",
                        value: distance.as_meters(),
                    });
                }
                Vector::Turn { radius, heading_change, .. } => {
                    if radius.as_meters() <= 0.0 {
                        return Err(ValidationError::MustBePositive {
                            field: "vector turn radius",
                            value: radius.as_meters(),
                        });
                    }
                    if heading_change.radians() < 0.0 {
                        return Err(ValidationError::MustBeNonNegative {
                            field: "vector turn heading change",
                            value: heading_change.degrees(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(Self { direction, kind: RouteKind::VectorSequence(vectors) })
    }

    /// Builds an RNP step-sequence route.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `steps` is empty or its first element
    /// is [`RnpStep::RadiusToFix`] (§3).
    pub fn rnp_sequence(direction: RouteDirection, steps: Vec<RnpStep>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptyCollection { what: "RNP step sequence" });
        }
        if matches!(steps[0], RnpStep::RadiusToFix { .. }) {
            return Err(ValidationError::FirstRnpStepIsRadiusToFix);
        }
        Ok(Self { direction, kind: RouteKind::RnpSequence(steps) })
    }

    #[must_use]
    pub fn direction(&self) -> RouteDirection { self.direction }

    #[must_use]
    pub fn kind(&self) -> &RouteKind { &self.kind }
}
