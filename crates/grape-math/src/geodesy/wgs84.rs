use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};

use super::{GeoPoint, Intersection, ENDPOINT_TIE_BREAK, INTERSECTION_PRECISION};
use crate::{Heading, Length};

/// The WGS84 ellipsoid, solved via Karney's algorithm (§4.2).
///
/// Distances and headings come directly from `geographiclib_rs`'s direct and
/// inverse geodesic problems. `perpendicular_intersection` has no closed
/// form on the ellipsoid, so it walks along the P1→P2 geodesic with a
/// flat-earth Newton step at each iterate until the step drops below
/// [`INTERSECTION_PRECISION`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Wgs84Geodesic;

impl Wgs84Geodesic {
    #[must_use]
    pub const fn new() -> Self { Self }

    fn geodesic(self) -> Geodesic { Geodesic::wgs84() }
}

impl super::CoordinateSystem for Wgs84Geodesic {
    fn distance(&self, p1: GeoPoint, p2: GeoPoint) -> Length {
        let (s12, _azi1, _azi2): (f64, f64, f64) =
            self.geodesic().inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);
        Length::meters(s12)
    }

    fn heading_start(&self, p1: GeoPoint, p2: GeoPoint) -> Heading {
        let (_s12, azi1, _azi2): (f64, f64, f64) =
            self.geodesic().inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);
        Heading::from_degrees(azi1)
    }

    fn heading_end(&self, p1: GeoPoint, p2: GeoPoint) -> Heading {
        let (_s12, _azi1, azi2): (f64, f64, f64) =
            self.geodesic().inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);
        Heading::from_degrees(azi2)
    }

    fn distance_and_heading(&self, p1: GeoPoint, p2: GeoPoint) -> (Length, Heading) {
        let (s12, azi1, _azi2): (f64, f64, f64) =
            self.geodesic().inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);
        (Length::meters(s12), Heading::from_degrees(azi1))
    }

    fn distance_and_heading_end(&self, p1: GeoPoint, p2: GeoPoint) -> (Length, Heading) {
        let (s12, _azi1, azi2): (f64, f64, f64) =
            self.geodesic().inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);
        (Length::meters(s12), Heading::from_degrees(azi2))
    }

    fn point_and_end_heading(
        &self,
        p1: GeoPoint,
        distance: Length,
        heading: Heading,
    ) -> (GeoPoint, Heading) {
        let (lat2, lon2, azi2): (f64, f64, f64) =
            self.geodesic().direct(p1.latitude, p1.longitude, heading.degrees(), distance.as_meters());
        (GeoPoint::new(lon2, lat2), Heading::from_degrees(azi2))
    }

    fn perpendicular_intersection(
        &self,
        p1: GeoPoint,
        p2: GeoPoint,
        r: GeoPoint,
    ) -> (GeoPoint, Intersection) {
        let geodesic = self.geodesic();
        let (total, azi1, _): (f64, f64, f64) =
            geodesic.inverse(p1.latitude, p1.longitude, p2.latitude, p2.longitude);

        // Degenerate segment: every point on it is P1 itself.
        if total < INTERSECTION_PRECISION {
            return (p1, Intersection::Between);
        }

        let mut s = 0.0_f64;
        loop {
            let (lat_q, lon_q, azi_at_q): (f64, f64, f64) =
                geodesic.direct(p1.latitude, p1.longitude, azi1, s);
            let (dist_qr, azi_q_to_r, _): (f64, f64, f64) =
                geodesic.inverse(lat_q, lon_q, r.latitude, r.longitude);

            if dist_qr < INTERSECTION_PRECISION {
                break;
            }

            let bearing_delta = (azi_q_to_r - azi_at_q).to_radians();
            let step = dist_qr * bearing_delta.cos();
            s += step;

            if step.abs() < INTERSECTION_PRECISION {
                break;
            }
        }

        let (lat_i, lon_i, _): (f64, f64, f64) = geodesic.direct(p1.latitude, p1.longitude, azi1, s);
        let intersection = GeoPoint::new(lon_i, lat_i);

        let category = if s < -ENDPOINT_TIE_BREAK {
            Intersection::Behind
        } else if s > total + ENDPOINT_TIE_BREAK {
            Intersection::Ahead
        } else {
            Intersection::Between
        };
        (intersection, category)
    }
}
