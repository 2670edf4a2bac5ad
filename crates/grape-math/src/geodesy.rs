//! Coordinate systems (component B): the inverse and direct geodesic
//! problems, plus the "foot-of-perpendicular" intersection, over WGS84 or a
//! local-tangent-plane approximation (§4.2).

use crate::{Heading, Length, TurnDirection};

mod wgs84;
pub use wgs84::Wgs84Geodesic;

mod local_tangent;
pub use local_tangent::LocalTangentPlane;

#[cfg(test)]
mod tests;

/// The precision threshold (meters) at which the iterative
/// perpendicular-intersection search on [`Wgs84Geodesic`] terminates (§4.2).
pub const INTERSECTION_PRECISION: f64 = 1e-6;

/// The neighborhood (meters) around a segment's endpoints within which an
/// intersection point is still classified as `Between` rather than
/// `Behind`/`Ahead` (§4.2).
pub const ENDPOINT_TIE_BREAK: f64 = 0.05;

/// A point's position relative to a directed segment P1→P2, returned by
/// [`CoordinateSystem::perpendicular_intersection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Upstream of P1 (beyond the 5 cm tie-break neighborhood).
    Behind,
    /// Between P1 and P2, inclusive of the tie-break neighborhood around either endpoint.
    Between,
    /// Downstream of P2 (beyond the 5 cm tie-break neighborhood).
    Ahead,
}

/// A longitude/latitude pair in degrees. `longitude` is normalized to
/// `[-180, 180)`; `latitude` must be in `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude:  f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self { Self { longitude, latitude } }
}

/// The capability set shared by the WGS84 geodesic and local-tangent-plane
/// coordinate systems (§4.2). A run picks one implementation up front; both
/// must agree on the heading convention (`[0, 360)`) and on the
/// `Behind`/`Between`/`Ahead` tie-break rule.
pub trait CoordinateSystem: Send + Sync {
    /// Distance between `p1` and `p2` (inverse geodesic problem).
    fn distance(&self, p1: GeoPoint, p2: GeoPoint) -> Length;

    /// Heading at `p1` towards `p2`, in `[0, 360)`.
    fn heading_start(&self, p1: GeoPoint, p2: GeoPoint) -> Heading;

    /// Heading at `p2` when arriving from `p1`, in `[0, 360)`.
    fn heading_end(&self, p1: GeoPoint, p2: GeoPoint) -> Heading;

    /// Distance and start heading in one inverse-problem solve.
    fn distance_and_heading(&self, p1: GeoPoint, p2: GeoPoint) -> (Length, Heading) {
        (self.distance(p1, p2), self.heading_start(p1, p2))
    }

    /// Distance and end heading in one inverse-problem solve.
    fn distance_and_heading_end(&self, p1: GeoPoint, p2: GeoPoint) -> (Length, Heading) {
        (self.distance(p1, p2), self.heading_end(p1, p2))
    }

    /// The point at `distance` and `heading` from `p1` (direct problem).
    fn point(&self, p1: GeoPoint, distance: Length, heading: Heading) -> GeoPoint {
        self.point_and_end_heading(p1, distance, heading).0
    }

    /// The point, and the heading on arrival, at `distance` and start
    /// `heading` from `p1` (direct problem).
    fn point_and_end_heading(
        &self,
        p1: GeoPoint,
        distance: Length,
        heading: Heading,
    ) -> (GeoPoint, Heading);

    /// Finds the foot of the perpendicular from `r` onto the geodesic
    /// through `p1` and `p2`, and classifies it relative to the segment.
    fn perpendicular_intersection(&self, p1: GeoPoint, p2: GeoPoint, r: GeoPoint) -> (GeoPoint, Intersection);

    /// The turn direction of going from `p1` to `p2` to `p3`. `None` if collinear.
    fn turn_direction(&self, p1: GeoPoint, p2: GeoPoint, p3: GeoPoint) -> Option<TurnDirection> {
        let h12 = self.heading_start(p1, p2);
        let h23 = self.heading_start(p2, p3);
        let delta = h12.radians() - h23.radians();
        if delta.radians().abs() < 1e-12 {
            None
        } else if delta.is_positive() {
            Some(TurnDirection::Left)
        } else {
            Some(TurnDirection::Right)
        }
    }
}
