use approx::assert_abs_diff_eq;

use super::{find_circle_tangent_towards, line_circle_intersect, Vec2};
use crate::{Length, TurnDirection};

fn assert_line_circle(actual: Option<[f64; 2]>, expect: Option<[f64; 2]>) {
    assert_eq!(actual.is_none(), expect.is_none());
    if let (Some([al, ah]), Some([el, eh])) = (actual, expect) {
        assert_abs_diff_eq!(al, el, epsilon = 1e-5);
        assert_abs_diff_eq!(ah, eh, epsilon = 1e-5);
    }
}

#[test]
fn line_circle_intersect_middle() {
    let line_length: f64 = 200f64.sqrt();
    let radius_ratio = 2. / line_length;

    assert_line_circle(
        line_circle_intersect(
            Vec2::new(10., 0.),
            Length::meters(4.),
            Vec2::new(5., 5.),
            Vec2::new(15., -5.),
        ),
        Some([0.5 - radius_ratio, 0.5 + radius_ratio]),
    );
}

#[test]
fn line_circle_intersect_outside() {
    assert_line_circle(
        line_circle_intersect(
            Vec2::new(10., 0.),
            Length::meters(4.),
            Vec2::new(10., 10.),
            Vec2::new(0., 0.),
        ),
        None,
    );
}

fn assert_vec2_close(actual: Option<Vec2>, expect: Option<Vec2>) {
    assert_eq!(actual.is_some(), expect.is_some());
    if let (Some(a), Some(e)) = (actual, expect) {
        assert_abs_diff_eq!(a.x, e.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.y, e.y, epsilon = 1e-6);
    }
}

#[test]
fn find_circle_tangent_towards_right() {
    assert_vec2_close(
        find_circle_tangent_towards(Vec2::new(5.0, 6.0), Vec2::new(3.0, 4.0), Length::meters(2.0), TurnDirection::Right),
        Some(Vec2::new(3.0, 6.0)),
    );
}

#[test]
fn find_circle_tangent_towards_inside_is_none() {
    assert_vec2_close(
        find_circle_tangent_towards(Vec2::new(5.0, 6.0), Vec2::new(5.0, 6.0), Length::meters(2.0), TurnDirection::Left),
        None,
    );
}
