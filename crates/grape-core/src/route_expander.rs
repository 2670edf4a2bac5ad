//! The route expander (component C, §4.3): turns a symbolic [`grape_store::Route`]
//! into a dense ground polyline keyed by cumulative ground distance.

use grape_math::{Angle, CoordinateSystem, GeoPoint, Heading, Length, TurnDirection};
use grape_store::{RnpStep, Route, RouteDirection, RouteKind, Runway, Vector};
use itertools::Itertools;
use tracing::warn;

use crate::config::RunConfig;

/// The lateral direction tag of a [`RoutePoint`] (§3). `Straight` iff the
/// turn radius is infinite (§4.3 output invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutputDirection {
    Straight,
    LeftTurn,
    RightTurn,
}

/// A single point of a route polyline (§3).
#[derive(Debug, Clone, Copy)]
pub struct RoutePoint {
    pub cumulative_ground_distance: Length,
    pub position:                   GeoPoint,
    pub heading:                    Heading,
    pub turn_radius:                Length,
    pub direction:                  RouteOutputDirection,
}

/// A dense ground polyline (§3), always containing the runway threshold,
/// stored in strictly increasing cumulative-ground-distance order.
#[derive(Debug, Clone)]
pub struct RouteOutput {
    points: Vec<RoutePoint>,
}

impl RouteOutput {
    #[cfg(test)]
    pub(crate) fn from_points_for_test(points: Vec<RoutePoint>) -> Self { Self { points } }

    #[must_use]
    pub fn points(&self) -> &[RoutePoint] { &self.points }

    /// The cumulative ground distance beyond `a` (exclusive) and up to `b`
    /// (inclusive) at which turn radius changes, if any (§9 design note,
    /// consulted by the profile expander to interpolate turn points).
    #[must_use]
    pub fn next_radius_change_within(&self, a: Length, b: Length) -> Option<Length> {
        let (lo, hi) = if a.as_meters() <= b.as_meters() { (a, b) } else { (b, a) };
        self.points
            .iter()
            .tuple_windows()
            .filter(|(p0, _)| p0.cumulative_ground_distance.as_meters() > lo.as_meters() - 1e-9)
            .find(|(p0, p1)| {
                let d = p1.cumulative_ground_distance;
                d.as_meters() <= hi.as_meters() + 1e-9 && (p1.turn_radius.as_meters() - p0.turn_radius.as_meters()).abs() > 1e-9
            })
            .map(|(_, p1)| p1.cumulative_ground_distance)
    }

    /// Heading and turn radius at the point nearest `distance`, used by the
    /// profile expander to recompute bank angle from groundspeed (§4.5).
    #[must_use]
    pub fn nearest(&self, distance: Length) -> &RoutePoint {
        self.points
            .iter()
            .min_by(|a, b| {
                (a.cumulative_ground_distance.as_meters() - distance.as_meters())
                    .abs()
                    .total_cmp(&(b.cumulative_ground_distance.as_meters() - distance.as_meters()).abs())
            })
            .expect("route output always has at least the threshold point")
    }
}

struct Builder<'a> {
    cs:     &'a dyn CoordinateSystem,
    config: &'a RunConfig,
    /// Accumulated points, always in flight-direction build order (not
    /// necessarily ascending cumulative distance for arrivals — reversed at the end).
    points: Vec<RoutePoint>,
}

impl<'a> Builder<'a> {
    fn last(&self) -> RoutePoint { *self.points.last().expect("threshold point always seeded first") }

    fn push(&mut self, cumulative_ground_distance: Length, position: GeoPoint, heading: Heading, turn_radius: Length, direction: RouteOutputDirection) {
        self.points.push(RoutePoint { cumulative_ground_distance, position, heading, turn_radius, direction });
    }

    fn arc_interval(&self) -> Angle { Angle::from_degrees(self.config.arc_interval_degrees) }

    /// Appends the arc points of a turn of `radius`/`heading_change`/`direction`,
    /// starting from the current last point, mirroring the original
    /// `RouteCalculator`'s center-relative stepping (§4.3).
    fn append_turn(&mut self, radius: Length, heading_change: Angle, direction: TurnDirection, sign: f64) {
        let last = self.last();
        let turn_dir = if direction == TurnDirection::Left { -sign } else { sign };

        let center_offset_heading = Heading::from_degrees(Self::normalize_degrees(last.heading.degrees() + turn_dir * 90.0));
        let (center, center_heading_end) = self.cs.point_and_end_heading(last.position, radius, center_offset_heading);
        let center_heading_start = Heading::from_degrees(Self::normalize_degrees(center_heading_end.degrees() + 180.0));

        let arc_interval_deg = self.config.arc_interval_degrees;
        let heading_change_deg = heading_change.degrees();
        let point_count = (heading_change_deg / arc_interval_deg).trunc() as usize;

        let route_dir = if turn_dir > 0.0 { RouteOutputDirection::RightTurn } else { RouteOutputDirection::LeftTurn };

        for i in 1..point_count {
            let last = self.last();
            let hdg_delta = turn_dir * arc_interval_deg * i as f64;
            let point_heading = Heading::from_degrees(Self::normalize_degrees(center_heading_start.degrees() + hdg_delta));
            let point = self.cs.point(center, radius, point_heading);
            let (dist, hdg_end) = self.cs.distance_and_heading_end(last.position, point);
            self.push(last.cumulative_ground_distance + dist, point, hdg_end, radius, route_dir);
        }

        let residual = heading_change_deg - arc_interval_deg * point_count as f64;
        if residual > self.config.arc_angle_threshold_degrees {
            let last = self.last();
            let test_heading =
                Heading::from_degrees(Self::normalize_degrees(center_heading_start.degrees() + turn_dir * arc_interval_deg * point_count as f64));
            let test_point = self.cs.point(center, radius, test_heading);
            let test_dist = self.cs.distance(last.position, test_point);

            if test_dist.as_meters() > self.config.arc_distance_threshold_m {
                let (dist, hdg_end) = self.cs.distance_and_heading_end(last.position, test_point);
                self.push(last.cumulative_ground_distance + dist, test_point, hdg_end, radius, route_dir);
            }
        }

        let last = self.last();
        let end_heading = Heading::from_degrees(Self::normalize_degrees(center_heading_start.degrees() + turn_dir * heading_change_deg));
        let end_point = self.cs.point(center, radius, end_heading);
        let target_heading = Heading::from_degrees(Self::normalize_degrees(
            self.cs.heading_end(center, end_point).degrees() + 90.0 * turn_dir,
        ));
        let (dist, _) = self.cs.distance_and_heading_end(last.position, end_point);
        self.push(last.cumulative_ground_distance + dist, end_point, target_heading, Length::INFINITE, RouteOutputDirection::Straight);
    }

    fn normalize_degrees(deg: f64) -> f64 {
        let m = deg % 360.0;
        if m < 0.0 { m + 360.0 } else { m }
    }
}

/// Expands `route` against `runway` into a [`RouteOutput`] (component C).
///
/// Soft anomalies (§7, heading changes beyond the configured RNP threshold,
/// radius-to-fix dual-radius mismatches) are logged via `tracing::warn!` and
/// do not fail the expansion.
pub fn expand(route: &Route, runway: &Runway, cs: &dyn CoordinateSystem, config: &RunConfig) -> RouteOutput {
    let threshold = RoutePoint {
        cumulative_ground_distance: Length::ZERO,
        position:                   runway.threshold(),
        heading:                    runway.heading(),
        turn_radius:                Length::INFINITE,
        direction:                  RouteOutputDirection::Straight,
    };

    let mut builder = Builder { cs, config, points: vec![threshold] };

    match (route.direction(), route.kind()) {
        (RouteDirection::Departure, RouteKind::PointSequence(points)) => expand_simple_departure(&mut builder, points),
        (RouteDirection::Arrival, RouteKind::PointSequence(points)) => expand_simple_arrival(&mut builder, points),
        (RouteDirection::Departure, RouteKind::VectorSequence(vectors)) => expand_vector_departure(&mut builder, vectors),
        (RouteDirection::Arrival, RouteKind::VectorSequence(vectors)) => expand_vector_arrival(&mut builder, vectors),
        (RouteDirection::Departure, RouteKind::RnpSequence(steps)) => expand_rnp_departure(&mut builder, steps),
        (RouteDirection::Arrival, RouteKind::RnpSequence(steps)) => expand_rnp_arrival(&mut builder, steps),
    }

    finish(builder, route.direction())
}

fn expand_simple_departure(b: &mut Builder, points: &[GeoPoint]) {
    for &p in points {
        let last = b.last();
        let (dist, hdg_end) = b.cs.distance_and_heading_end(last.position, p);
        b.push(last.cumulative_ground_distance + dist, p, hdg_end, Length::INFINITE, RouteOutputDirection::Straight);
    }
}

fn expand_simple_arrival(b: &mut Builder, points: &[GeoPoint]) {
    // Iterate downstream-to-upstream; cumulative distance decreases. Heading
    // stored per-point is the heading *towards* the next downstream point
    // (§3 open question: the symmetric convention is implementation-defined).
    for &p in points.iter().rev() {
        let last = b.last();
        let (dist, hdg_start) = b.cs.distance_and_heading(p, last.position);
        b.push(last.cumulative_ground_distance - dist, p, hdg_start, Length::INFINITE, RouteOutputDirection::Straight);
    }
}

fn expand_vector_departure(b: &mut Builder, vectors: &[Vector]) {
    for vector in vectors {
        match *vector {
            Vector::Straight { distance } => {
                let last = b.last();
                let (point, hdg_end) = b.cs.point_and_end_heading(last.position, distance, last.heading);
                b.push(last.cumulative_ground_distance + distance, point, hdg_end, Length::INFINITE, RouteOutputDirection::Straight);
            }
            Vector::Turn { radius, heading_change, direction } => b.append_turn(radius, heading_change, direction, 1.0),
        }
    }
}

fn expand_vector_arrival(b: &mut Builder, vectors: &[Vector]) {
    // Built in reverse flight order (same rationale as §4.5's arrival
    // expansion): walk the vector list backwards, negating the effective
    // turn sense since we are tracing the route against the direction of flight.
    for vector in vectors.iter().rev() {
        match *vector {
            Vector::Straight { distance } => {
                let last = b.last();
                let reverse_heading = last.heading.opposite();
                let (point, hdg_end) = b.cs.point_and_end_heading(last.position, distance, reverse_heading);
                b.push(last.cumulative_ground_distance - distance, point, hdg_end.opposite(), Length::INFINITE, RouteOutputDirection::Straight);
            }
            Vector::Turn { radius, heading_change, direction } => b.append_turn(radius, heading_change, direction, -1.0),
        }
    }
}

fn expand_rnp_departure(b: &mut Builder, steps: &[RnpStep]) {
    for step in steps {
        let last = b.last();
        match *step {
            RnpStep::TrackToFix { fix } => {
                let (dist, hdg_end) = b.cs.distance_and_heading_end(last.position, fix);
                b.push(last.cumulative_ground_distance + dist, fix, hdg_end, Length::INFINITE, RouteOutputDirection::Straight);
            }
            RnpStep::RadiusToFix { fix, turn_center } => {
                expand_radius_to_fix(b, turn_center, fix, 1.0);
            }
        }
        check_heading_change_warning(b);
    }
}

fn expand_rnp_arrival(b: &mut Builder, steps: &[RnpStep]) {
    // "Begin at last element, i.e. the RWY": walk the RNP steps in reverse,
    // mirroring the original `visitArrivalRnp` (§4.3).
    for step in steps.iter().rev() {
        let last = b.last();
        match *step {
            RnpStep::TrackToFix { fix } => {
                let (dist, hdg_start) = b.cs.distance_and_heading(fix, last.position);
                b.push(last.cumulative_ground_distance - dist, fix, hdg_start, Length::INFINITE, RouteOutputDirection::Straight);
            }
            RnpStep::RadiusToFix { fix, turn_center } => {
                expand_radius_to_fix(b, turn_center, fix, -1.0);
            }
        }
        check_heading_change_warning(b);
    }
}

/// Shared radius-to-fix arc generation for both RNP directions (§4.3): the
/// *first* radius (center to the current last point) is used for arc
/// generation; the distance from center to `fix` is checked against it and
/// a soft anomaly is logged if they differ by more than the configured
/// tolerance.
fn expand_radius_to_fix(b: &mut Builder, center: GeoPoint, fix: GeoPoint, sign: f64) {
    let last = b.last();
    let radius1 = b.cs.distance(center, last.position);
    let radius2 = b.cs.distance(center, fix);
    if (radius1.as_meters() - radius2.as_meters()).abs() > b.config.rnp_radius_mismatch_warning_m {
        warn!(
            radius1 = radius1.as_meters(),
            radius2 = radius2.as_meters(),
            "RNP radius-to-fix dual radii differ by more than the configured tolerance"
        );
    }

    let heading_to_start = b.cs.heading_start(center, last.position);
    let heading_to_end = b.cs.heading_start(center, fix);
    let heading_change = heading_to_start.distance(heading_to_end, if sign > 0.0 { TurnDirection::Right } else { TurnDirection::Left }).abs();

    let direction = if sign > 0.0 { TurnDirection::Right } else { TurnDirection::Left };
    b.append_turn(radius1, heading_change, direction, sign);
}

fn check_heading_change_warning(b: &Builder) {
    if b.points.len() < 2 {
        return;
    }
    let prev = b.points[b.points.len() - 2];
    let last = b.points[b.points.len() - 1];
    let change = (prev.heading - last.heading).degrees().abs();
    if change > b.config.rnp_heading_change_warning_degrees {
        warn!(change_degrees = change, "RNP route point changes aircraft heading beyond the configured warning threshold");
    }
}

/// Departure routes recompute heading at each point after expansion so that
/// each point's heading equals the ground-track start-heading of the
/// outgoing segment; the final point inherits the previous heading (§4.3).
fn recompute_departure_headings(cs: &dyn CoordinateSystem, points: &mut [RoutePoint]) {
    if points.len() < 2 {
        return;
    }
    let len = points.len();
    for i in 0..len - 1 {
        let (p1, p2) = (points[i].position, points[i + 1].position);
        points[i].heading = cs.heading_start(p1, p2);
    }
    points[len - 1].heading = points[len - 2].heading;
}

fn finish(builder: Builder, direction: RouteDirection) -> RouteOutput {
    let Builder { cs, mut points, .. } = builder;

    match direction {
        RouteDirection::Departure => recompute_departure_headings(cs, &mut points),
        RouteDirection::Arrival => {
            // Built upstream-to-downstream (threshold first); reverse so the
            // stored order is ascending cumulative ground distance (§3).
            points.reverse();
        }
    }

    RouteOutput { points }
}
