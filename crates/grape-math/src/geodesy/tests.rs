use approx::assert_abs_diff_eq;

use super::{CoordinateSystem, GeoPoint, Intersection, LocalTangentPlane, Wgs84Geodesic};

#[test]
fn wgs84_antimeridian_crossing() {
    let geodesic = Wgs84Geodesic::new();
    let p1 = GeoPoint::new(179.999, 0.0);
    let p2 = GeoPoint::new(-179.999, 0.0);
    let (distance, heading) = geodesic.distance_and_heading(p1, p2);
    assert_abs_diff_eq!(distance.as_meters(), 222.639, epsilon = 0.01);
    assert_abs_diff_eq!(heading.degrees(), 90.0, epsilon = 0.01);
}

#[test]
fn wgs84_north_pole_crossing() {
    let geodesic = Wgs84Geodesic::new();
    let p1 = GeoPoint::new(0.0, 89.999);
    let p2 = GeoPoint::new(180.0, 89.999);
    let distance = geodesic.distance(p1, p2);
    assert_abs_diff_eq!(distance.as_meters(), 223.388, epsilon = 0.01);
}

#[test]
fn wgs84_perpendicular_intersection_degenerate_segment() {
    let geodesic = Wgs84Geodesic::new();
    let p1 = GeoPoint::new(4.0, 52.0);
    let (intersection, category) = geodesic.perpendicular_intersection(p1, p1, GeoPoint::new(4.1, 52.1));
    assert_eq!(category, Intersection::Between);
    assert_abs_diff_eq!(intersection.longitude, p1.longitude, epsilon = 1e-9);
    assert_abs_diff_eq!(intersection.latitude, p1.latitude, epsilon = 1e-9);
}

#[test]
fn wgs84_perpendicular_intersection_midpoint() {
    let geodesic = Wgs84Geodesic::new();
    let p1 = GeoPoint::new(4.0, 52.0);
    let p2 = GeoPoint::new(4.0, 52.1);
    let r = GeoPoint::new(4.1, 52.05);
    let (intersection, category) = geodesic.perpendicular_intersection(p1, p2, r);
    assert_eq!(category, Intersection::Between);
    assert_abs_diff_eq!(intersection.latitude, 52.05, epsilon = 1e-3);
}

#[test]
fn wgs84_perpendicular_intersection_behind_segment() {
    let geodesic = Wgs84Geodesic::new();
    let p1 = GeoPoint::new(4.0, 52.0);
    let p2 = GeoPoint::new(4.0, 52.1);
    let r = GeoPoint::new(4.1, 51.9);
    let (_, category) = geodesic.perpendicular_intersection(p1, p2, r);
    assert_eq!(category, Intersection::Behind);
}

#[test]
fn local_tangent_plane_round_trips_direct_and_inverse() {
    let anchor = GeoPoint::new(4.0, 52.0);
    let plane = LocalTangentPlane::new(anchor);
    let (far, heading) = plane.point_and_end_heading(anchor, crate::Length::meters(1000.0), crate::Heading::from_degrees(90.0));
    let (distance, start_heading) = plane.distance_and_heading(anchor, far);
    assert_abs_diff_eq!(distance.as_meters(), 1000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(start_heading.degrees(), 90.0, epsilon = 1e-6);
    assert_abs_diff_eq!(heading.degrees(), 90.0, epsilon = 1e-9);
}

#[test]
fn local_tangent_plane_perpendicular_intersection_between() {
    let anchor = GeoPoint::new(4.0, 52.0);
    let plane = LocalTangentPlane::new(anchor);
    let p1 = anchor;
    let p2 = plane.point(anchor, crate::Length::meters(2000.0), crate::Heading::from_degrees(0.0));
    let r = plane.point(anchor, crate::Length::meters(500.0), crate::Heading::from_degrees(45.0));
    let (_, category) = plane.perpendicular_intersection(p1, p2, r);
    assert_eq!(category, Intersection::Between);
}
