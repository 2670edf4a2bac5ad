use super::{GeoPoint, Intersection, ENDPOINT_TIE_BREAK};
use crate::{point_line_closest, Heading, Length, Vec2};

/// The WGS84 mean earth radius, used for the equirectangular projection (§4.2).
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A Cartesian approximation centered at a fixed anchor point (§4.2).
///
/// Longitude/latitude are projected equirectangularly onto an east/north
/// plane tangent to the sphere at the anchor; every subsequent operation is
/// then plain 2D algebra. Cheaper than [`super::Wgs84Geodesic`] and accurate
/// close to the anchor; error grows with distance and is worst near the poles.
#[derive(Debug, Clone, Copy)]
pub struct LocalTangentPlane {
    anchor: GeoPoint,
    anchor_lat_cos: f64,
}

impl LocalTangentPlane {
    #[must_use]
    pub fn new(anchor: GeoPoint) -> Self {
        Self { anchor, anchor_lat_cos: anchor.latitude.to_radians().cos() }
    }

    fn project(self, p: GeoPoint) -> Vec2 {
        let east = (p.longitude - self.anchor.longitude).to_radians() * self.anchor_lat_cos * EARTH_RADIUS_METERS;
        let north = (p.latitude - self.anchor.latitude).to_radians() * EARTH_RADIUS_METERS;
        Vec2::new(east, north)
    }

    fn unproject(self, v: Vec2) -> GeoPoint {
        let longitude = self.anchor.longitude + (v.x / EARTH_RADIUS_METERS / self.anchor_lat_cos).to_degrees();
        let latitude = self.anchor.latitude + (v.y / EARTH_RADIUS_METERS).to_degrees();
        GeoPoint::new(longitude, latitude)
    }
}

impl super::CoordinateSystem for LocalTangentPlane {
    fn distance(&self, p1: GeoPoint, p2: GeoPoint) -> Length {
        (self.project(p2) - self.project(p1)).length()
    }

    fn heading_start(&self, p1: GeoPoint, p2: GeoPoint) -> Heading {
        let delta = self.project(p2) - self.project(p1);
        Heading::from_radians(crate::Angle::from_radians(delta.x.atan2(delta.y)))
    }

    /// A straight line in the tangent plane has no curvature, so the arrival
    /// heading equals the departure heading.
    fn heading_end(&self, p1: GeoPoint, p2: GeoPoint) -> Heading { self.heading_start(p1, p2) }

    fn point_and_end_heading(
        &self,
        p1: GeoPoint,
        distance: Length,
        heading: Heading,
    ) -> (GeoPoint, Heading) {
        let heading_radians = heading.radians().radians();
        let delta = Vec2::new(heading_radians.sin(), heading_radians.cos()) * distance.as_meters();
        (self.unproject(self.project(p1) + delta), heading)
    }

    fn perpendicular_intersection(
        &self,
        p1: GeoPoint,
        p2: GeoPoint,
        r: GeoPoint,
    ) -> (GeoPoint, Intersection) {
        let (v1, v2, vr) = (self.project(p1), self.project(p2), self.project(r));
        let segment_length = (v2 - v1).length().as_meters();

        if segment_length < 1e-9 {
            return (p1, Intersection::Between);
        }

        let closest = point_line_closest(vr, v1, v2);
        let along_track = (closest - v1).dot(v2 - v1) / segment_length;

        let category = if along_track < -ENDPOINT_TIE_BREAK {
            Intersection::Behind
        } else if along_track > segment_length + ENDPOINT_TIE_BREAK {
            Intersection::Ahead
        } else {
            Intersection::Between
        };
        (self.unproject(closest), category)
    }
}
