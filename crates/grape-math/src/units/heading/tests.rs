use approx::assert_abs_diff_eq;

use super::{Heading, TurnDirection};
use crate::Angle;

#[test]
fn degrees_normalized_nonnegative() {
    assert_abs_diff_eq!(Heading::from_degrees(-10.0).degrees(), 350.0, epsilon = 1e-9);
    assert_abs_diff_eq!(Heading::from_degrees(370.0).degrees(), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(Heading::from_degrees(0.0).degrees(), 0.0, epsilon = 1e-9);
}

#[test]
fn distance_right_is_nonnegative() {
    let a = Heading::from_degrees(350.0);
    let b = Heading::from_degrees(10.0);
    assert_abs_diff_eq!(a.distance(b, TurnDirection::Right).degrees(), 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(a.distance(b, TurnDirection::Left).degrees(), -340.0, epsilon = 1e-9);
}

#[test]
fn closer_direction_picks_shorter_arc() {
    let a = Heading::from_degrees(10.0);
    let b = Heading::from_degrees(350.0);
    assert_eq!(a.closer_direction_to(b), TurnDirection::Left);
    assert_abs_diff_eq!(a.closest_distance(b).degrees(), -20.0, epsilon = 1e-9);
}

#[test]
fn add_direction_wraps() {
    let h = Heading::from_degrees(350.0).add_direction(TurnDirection::Right, Angle::from_degrees(20.0));
    assert_abs_diff_eq!(h.degrees(), 10.0, epsilon = 1e-9);
}

#[test]
fn opposite_heading() {
    assert_abs_diff_eq!(Heading::from_degrees(30.0).opposite().degrees(), 210.0, epsilon = 1e-9);
    assert_abs_diff_eq!(Heading::from_degrees(196.633).opposite().degrees(), 16.633, epsilon = 1e-6);
}
