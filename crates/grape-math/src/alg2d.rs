//! Plane 2D coordinate geometry, used by the local-tangent-plane coordinate
//! system and by the route expander's turn-arc construction (§4.2, §4.3).

use std::ops;

use crate::{Length, TurnDirection};

#[cfg(test)]
mod tests;

/// A plain Cartesian vector in meters, local to whatever tangent plane is in use.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 { self.x * rhs.x + self.y * rhs.y }

    /// The z-component of the 3D cross product of `self` and `rhs`, treated as planar vectors.
    #[must_use]
    pub fn perp_dot(self, rhs: Self) -> f64 { self.x * rhs.y - self.y * rhs.x }

    #[must_use]
    pub fn length_squared(self) -> f64 { self.dot(self) }

    #[must_use]
    pub fn length(self) -> Length { Length(self.length_squared().sqrt()) }

    /// Rotate 90 degrees clockwise (x east, y north convention).
    #[must_use]
    pub fn rotate_right_angle_clockwise(self) -> Self { Self { x: self.y, y: -self.x } }

    #[must_use]
    pub fn rotate_right_angle_counter_clockwise(self) -> Self { Self { x: -self.y, y: self.x } }
}

impl ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Self { x: self.x + rhs.x, y: self.y + rhs.y } }
}
impl ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Self { x: self.x - rhs.x, y: self.y - rhs.y } }
}
impl ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self { Self { x: -self.x, y: -self.y } }
}
impl ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self { Self { x: self.x * rhs, y: self.y * rhs } }
}
impl ops::Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self { Self { x: self.x / rhs, y: self.y / rhs } }
}

/// Finds `k1 <= k2` in `0..=1` such that for every `k` in `[k1, k2]`,
/// `line_start.lerp(line_end, k)` lies within `radius` of `circle_center`.
///
/// Returns `None` if the circle does not intersect the segment.
#[must_use]
pub fn line_circle_intersect(
    circle_center: Vec2,
    radius: Length,
    line_start: Vec2,
    line_end: Vec2,
) -> Option<[f64; 2]> {
    let line_dir = line_end - line_start;
    let center_to_start = line_start - circle_center;

    let a = line_dir.length_squared();
    let b = 2.0 * line_dir.dot(center_to_start);
    let c = center_to_start.length_squared() - radius.squared();

    let discrim = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        None
    } else {
        let low = ((-b - discrim.sqrt()) / a / 2.0).max(0.0);
        let high = ((-b + discrim.sqrt()) / a / 2.0).min(1.0);
        Some([low, high]).filter(|_| low <= high)
    }
}

/// Solves `(t1, t2)` for `s1 + d1 * t1 == s2 + d2 * t2`.
#[must_use]
pub fn line_intersect(s1: Vec2, d1: Vec2, s2: Vec2, d2: Vec2) -> (f64, f64) {
    let det = d1.x * (-d2.y) - d1.y * (-d2.x);
    let rhs = s2 - s1;
    let t1 = (rhs.x * (-d2.y) - rhs.y * (-d2.x)) / det;
    let t2 = (d1.x * rhs.y - d1.y * rhs.x) / det;
    (t1, t2)
}

/// The closest point on the infinite line through `line_start` and `line_end` to `point`.
#[must_use]
pub fn point_line_closest(point: Vec2, line_start: Vec2, line_end: Vec2) -> Vec2 {
    let line_dir = line_end - line_start;
    let ortho_dir = line_dir.rotate_right_angle_clockwise();
    let (line_t, _) = line_intersect(line_start, line_dir, point, ortho_dir);
    line_start + line_dir * line_t
}

/// The two points on the circle at `center` with the given `radius` whose
/// tangent passes through `outside` (in the circle's local frame, i.e.
/// `outside` given relative to `center`).
///
/// Returns `None` if `outside` is inside the circle.
#[must_use]
pub fn find_circle_tangents_intersecting(outside: Vec2, radius: f64) -> Option<[Vec2; 2]> {
    let a = outside.length_squared();
    let b = -2.0 * outside.x * radius.powi(2);
    let c = radius.powi(4) - (outside.y * radius).powi(2);

    let discrim = b.powi(2) - 4.0 * a * c;
    if discrim <= 0.0 {
        None
    } else {
        let low = (-b - discrim.sqrt()) / a / 2.0;
        let high = (-b + discrim.sqrt()) / a / 2.0;
        Some([low, high].map(|x| {
            let y = (radius.powi(2) - outside.x * x) / outside.y;
            Vec2 { x, y }
        }))
    }
}

/// The point on the circle at `center` with the given `radius` at which the
/// tangent line towards `outside` departs in `direction`, used by the route
/// expander to locate a turn's center from its entry point and heading.
#[must_use]
pub fn find_circle_tangent_towards(
    outside: Vec2,
    center: Vec2,
    radius: Length,
    direction: TurnDirection,
) -> Option<Vec2> {
    let direct = outside - center;
    let radials = find_circle_tangents_intersecting(direct, radius.as_meters())?;
    if turn_direction_of(radials[0], direct) == Some(direction) {
        Some(center + radials[0])
    } else {
        Some(center + radials[1])
    }
}

/// The turn direction of going from the origin towards `p1` then `p2`.
/// Returns `None` if `p1` and `p2` are collinear with the origin.
#[must_use]
pub fn turn_direction_of(origin_to_p1: Vec2, origin_to_p2: Vec2) -> Option<TurnDirection> {
    let cross = origin_to_p1.perp_dot(origin_to_p2);
    if cross < 0.0 {
        Some(TurnDirection::Right)
    } else if cross > 0.0 {
        Some(TurnDirection::Left)
    } else {
        None
    }
}
