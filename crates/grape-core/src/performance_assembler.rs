//! The performance assembler (component F, §4.6): fuses a route polyline
//! (component C) and a vertical profile (component E) onto one shared
//! cumulative-ground-distance axis, applies Doc29 default-height, speed and
//! minimum-ground-distance segmentation, and recomputes the time grid.

use grape_math::{lerp, Angle, Heading, Length};
use grape_store::{Atmosphere, FlightPhase, PerformanceOutput, PerformancePoint, PointOrigin, RouteDirection, Runway};

use crate::error::{RunError, RunResult};
use crate::fuel_flow::FuelFlowHook;
use crate::profile::ProfileOutput;
use crate::route_expander::{RouteOutput, RouteOutputDirection};

/// AFE heights (meters) at which the assembler injects default-height
/// segmentation points (§4.6, Doc29 Volume 2 Table 5).
pub const DEFAULT_HEIGHTS_M: [f64; 9] = [18.9, 41.5, 68.3, 102.1, 147.5, 214.9, 334.9, 609.6, 1_289.6];

/// Everything the assembler needs for one operation (§4.6).
pub struct AssemblyInput<'a> {
    pub route:            &'a RouteOutput,
    pub profile:          &'a ProfileOutput,
    pub runway:           &'a Runway,
    pub direction:        RouteDirection,
    pub atmosphere:       Atmosphere,
    pub anchor_time_tai_s: i64,
    pub engine_count:     u8,
    pub fuel_hook:        &'a dyn FuelFlowHook,
    pub aircraft:         &'a grape_store::Doc29Aircraft,
    pub speed_segmentation_delta_v_mps: f64,
    pub min_ground_distance_m:          f64,
}

/// A point mid-assembly, before it is frozen into a [`PerformancePoint`]
/// (carries AFE altitude rather than MSL, and no time yet).
#[derive(Debug, Clone, Copy)]
struct MergedPoint {
    distance_m:   f64,
    position:     grape_math::GeoPoint,
    heading:      Heading,
    turn_radius:  Length,
    direction:    RouteOutputDirection,
    altitude_afe: Length,
    true_airspeed: f64,
    thrust:       f64,
    origin:       PointOrigin,
}

/// Assembles a [`PerformanceOutput`] from a route polyline and a vertical
/// profile (§4.6).
///
/// # Errors
/// Returns [`RunError::TooFewPerformancePoints`] if fewer than 2 points
/// remain after segmentation and filtering.
pub fn assemble(input: &AssemblyInput) -> RunResult<PerformanceOutput> {
    let mut points = merge(input.route, input.profile);
    segment_default_heights(&mut points, input.direction);
    segment_speed(&mut points, input.speed_segmentation_delta_v_mps);
    filter_min_ground_distance(&mut points, input.min_ground_distance_m);

    if points.len() < 2 {
        return Err(RunError::TooFewPerformancePoints { found: points.len() });
    }

    let times = recompute_times(&points, input.anchor_time_tai_s);

    let mut perf_points: Vec<PerformancePoint> = points
        .iter()
        .zip(times.iter())
        .map(|(p, &time_tai_s)| {
            let altitude_msl = input.runway.elevation_at(Length::meters(p.distance_m)) + p.altitude_afe;
            let groundspeed = p.true_airspeed - input.atmosphere.headwind(p.heading);
            PerformancePoint {
                time_tai_s,
                phase: classify_phase(p, input.direction),
                position: p.position,
                altitude_msl,
                true_airspeed: p.true_airspeed,
                groundspeed,
                corr_net_thrust_per_engine: p.thrust,
                bank_angle: bank_angle(p.turn_radius, groundspeed, p.direction),
                fuel_flow_per_engine: 0.0,
                origin: p.origin,
            }
        })
        .collect();

    input.fuel_hook.apply(input.aircraft, input.atmosphere, &mut perf_points);

    let keyed: Vec<(f64, PerformancePoint)> =
        points.iter().map(|p| p.distance_m).zip(perf_points).collect();

    PerformanceOutput::new(keyed).map_err(|_| RunError::TooFewPerformancePoints { found: keyed_len(&points) })
}

fn keyed_len(points: &[MergedPoint]) -> usize { points.len() }

/// Bank angle from groundspeed and turn radius, signed per the left-wing-down
/// convention of §3: `atan(v^2 / (g * r))`, negated for left turns.
fn bank_angle(turn_radius: Length, groundspeed: f64, direction: RouteOutputDirection) -> Angle {
    if turn_radius.is_infinite() || direction == RouteOutputDirection::Straight {
        return Angle::ZERO;
    }
    const GRAVITY: f64 = 9.806_65;
    let magnitude = (groundspeed * groundspeed / (GRAVITY * turn_radius.as_meters())).atan();
    match direction {
        RouteOutputDirection::LeftTurn => Angle::from_radians(-magnitude),
        RouteOutputDirection::RightTurn => Angle::from_radians(magnitude),
        RouteOutputDirection::Straight => Angle::ZERO,
    }
}

fn classify_phase(p: &MergedPoint, direction: RouteDirection) -> FlightPhase {
    const INITIAL_CLIMB_TOP_M: f64 = 1_289.6;
    match direction {
        RouteDirection::Departure => {
            if p.altitude_afe.as_meters() <= 0.0 {
                FlightPhase::TakeoffRoll
            } else if p.altitude_afe.as_meters() <= INITIAL_CLIMB_TOP_M {
                FlightPhase::InitialClimb
            } else {
                FlightPhase::Climb
            }
        }
        RouteDirection::Arrival => {
            if p.distance_m >= 0.0 && p.altitude_afe.as_meters() <= 0.0 {
                FlightPhase::LandingRoll
            } else {
                FlightPhase::Approach
            }
        }
    }
}

/// Merges the route polyline and vertical profile onto the union of their
/// cumulative-ground-distance keys (§4.6): at each key, the missing side is
/// linearly interpolated from its own neighbors.
fn merge(route: &RouteOutput, profile: &ProfileOutput) -> Vec<MergedPoint> {
    const EPSILON_M: f64 = 1e-6;

    let mut keys: Vec<f64> =
        route.points().iter().map(|p| p.cumulative_ground_distance.as_meters()).collect();
    for p in profile.points() {
        keys.push(p.cumulative_ground_distance.as_meters());
    }
    keys.sort_by(f64::total_cmp);
    keys.dedup_by(|a, b| (*a - *b).abs() < EPSILON_M);

    keys.into_iter()
        .map(|distance_m| {
            let (route_point, from_route_exact) = interpolate_route(route, distance_m, EPSILON_M);
            let (profile_point, from_profile_exact) = interpolate_profile(profile, distance_m, EPSILON_M);
            let origin = match (from_route_exact, from_profile_exact) {
                (true, true) => PointOrigin::FromBoth,
                (true, false) => PointOrigin::FromRoute,
                (false, true) => PointOrigin::FromProfile,
                (false, false) => PointOrigin::FromBoth,
            };
            MergedPoint {
                distance_m,
                position: route_point.0,
                heading: route_point.1,
                turn_radius: route_point.2,
                direction: route_point.3,
                altitude_afe: profile_point.0,
                true_airspeed: profile_point.1,
                thrust: profile_point.2,
                origin,
            }
        })
        .collect()
}

type RoutePointFields = (grape_math::GeoPoint, Heading, Length, RouteOutputDirection);

fn interpolate_route(route: &RouteOutput, distance_m: f64, eps: f64) -> (RoutePointFields, bool) {
    let points = route.points();
    if let Some(exact) = points.iter().find(|p| (p.cumulative_ground_distance.as_meters() - distance_m).abs() < eps) {
        return ((exact.position, exact.heading, exact.turn_radius, exact.direction), true);
    }
    let idx = points.partition_point(|p| p.cumulative_ground_distance.as_meters() < distance_m);
    let (lo, hi) = bracket(points, idx);
    let t = grape_math::inverse_lerp(
        lo.cumulative_ground_distance.as_meters(),
        hi.cumulative_ground_distance.as_meters(),
        distance_m,
    );
    let position = grape_math::GeoPoint::new(
        lerp(lo.position.longitude, hi.position.longitude, t),
        lerp(lo.position.latitude, hi.position.latitude, t),
    );
    let radius = if lo.turn_radius.is_infinite() || hi.turn_radius.is_infinite() {
        Length::INFINITE
    } else {
        Length::meters(lerp(lo.turn_radius.as_meters(), hi.turn_radius.as_meters(), t))
    };
    ((position, lo.heading, radius, lo.direction), false)
}

fn bracket<T>(items: &[T], idx: usize) -> (&T, &T) {
    if idx == 0 {
        (&items[0], &items[1.min(items.len() - 1)])
    } else if idx >= items.len() {
        (&items[items.len() - 2], &items[items.len() - 1])
    } else {
        (&items[idx - 1], &items[idx])
    }
}

fn interpolate_profile(profile: &ProfileOutput, distance_m: f64, eps: f64) -> ((Length, f64, f64), bool) {
    let points = profile.points();
    if let Some(exact) = points.iter().find(|p| (p.cumulative_ground_distance.as_meters() - distance_m).abs() < eps) {
        return ((exact.altitude_afe, exact.true_airspeed, exact.corr_net_thrust_per_engine), true);
    }
    let idx = points.partition_point(|p| p.cumulative_ground_distance.as_meters() < distance_m);
    let (lo, hi) = bracket(points, idx);
    let t = grape_math::inverse_lerp(
        lo.cumulative_ground_distance.as_meters(),
        hi.cumulative_ground_distance.as_meters(),
        distance_m,
    );
    let altitude = Length::meters(lerp(lo.altitude_afe.as_meters(), hi.altitude_afe.as_meters(), t));
    let tas = lerp(lo.true_airspeed, hi.true_airspeed, t);
    let thrust = lerp(lo.corr_net_thrust_per_engine, hi.corr_net_thrust_per_engine, t);
    ((altitude, tas, thrust), false)
}

/// Doc29 default-height segmentation (§4.6): takeoff-roll, initial-climb and
/// final-approach injection at the default AFE heights.
fn segment_default_heights(points: &mut Vec<MergedPoint>, direction: RouteDirection) {
    match direction {
        RouteDirection::Departure => {
            segment_takeoff_roll(points);
            segment_initial_climb(points);
        }
        RouteDirection::Arrival => segment_final_approach(points),
    }
}

/// Partitions the ground roll (AFE 0 up to the first point with positive
/// AFE) into at most `1 + floor(|delta v| / 10)` equal-time segments,
/// linearly interpolating altitude, groundspeed and thrust (§4.6).
fn segment_takeoff_roll(points: &mut Vec<MergedPoint>) {
    let Some(end_idx) = points.iter().position(|p| p.altitude_afe.as_meters() > 0.0) else { return };
    if end_idx == 0 {
        return;
    }
    let start = points[0];
    let end = points[end_idx];
    if end.true_airspeed <= start.true_airspeed {
        return;
    }
    let delta_v = (end.true_airspeed - start.true_airspeed).abs();
    let segment_count = 1 + (delta_v / 10.0).floor() as usize;
    if segment_count <= 1 {
        return;
    }

    let mut inserted = Vec::with_capacity(segment_count - 1);
    for i in 1..segment_count {
        let t = i as f64 / segment_count as f64;
        inserted.push(MergedPoint {
            distance_m: lerp(start.distance_m, end.distance_m, t),
            position: grape_math::GeoPoint::new(
                lerp(start.position.longitude, end.position.longitude, t),
                lerp(start.position.latitude, end.position.latitude, t),
            ),
            heading: start.heading,
            turn_radius: Length::INFINITE,
            direction: RouteOutputDirection::Straight,
            altitude_afe: Length::meters(lerp(start.altitude_afe.as_meters(), end.altitude_afe.as_meters(), t)),
            true_airspeed: lerp(start.true_airspeed, end.true_airspeed, t),
            thrust: lerp(start.thrust, end.thrust, t),
            origin: PointOrigin::TakeoffRollSegmentation,
        });
    }
    points.splice(1..end_idx, inserted);
}

/// Inserts a point at each default AFE height straddled by two adjacent
/// climb points, after the takeoff roll (§4.6).
fn segment_initial_climb(points: &mut Vec<MergedPoint>) {
    let mut i = 0;
    while i + 1 < points.len() {
        let (lo, hi) = (points[i], points[i + 1]);
        let lo_afe = lo.altitude_afe.as_meters();
        let hi_afe = hi.altitude_afe.as_meters();
        if hi_afe > lo_afe {
            if let Some(height) = DEFAULT_HEIGHTS_M.iter().find(|&&h| lo_afe < h && h < hi_afe) {
                let t = grape_math::inverse_lerp(lo_afe, hi_afe, *height);
                let inserted = interpolate_merged(lo, hi, t, *height, PointOrigin::InitialClimbSegmentation);
                points.insert(i + 1, inserted);
                continue; // re-examine the (now shorter) lo..inserted gap for further heights
            }
        }
        i += 1;
    }
}

/// Same principle as [`segment_initial_climb`], applied upstream from the
/// landing point (§4.6).
fn segment_final_approach(points: &mut Vec<MergedPoint>) {
    let mut i = 0;
    while i + 1 < points.len() {
        let (lo, hi) = (points[i], points[i + 1]);
        let lo_afe = lo.altitude_afe.as_meters();
        let hi_afe = hi.altitude_afe.as_meters();
        if lo_afe > hi_afe {
            if let Some(height) = DEFAULT_HEIGHTS_M.iter().rev().find(|&&h| hi_afe < h && h < lo_afe) {
                let t = grape_math::inverse_lerp(lo_afe, hi_afe, *height);
                let inserted = interpolate_merged(lo, hi, t, *height, PointOrigin::FinalApproachSegmentation);
                points.insert(i + 1, inserted);
                continue;
            }
        }
        i += 1;
    }
}

fn interpolate_merged(lo: MergedPoint, hi: MergedPoint, t: f64, afe_m: f64, origin: PointOrigin) -> MergedPoint {
    MergedPoint {
        distance_m: lerp(lo.distance_m, hi.distance_m, t),
        position: grape_math::GeoPoint::new(
            lerp(lo.position.longitude, hi.position.longitude, t),
            lerp(lo.position.latitude, hi.position.latitude, t),
        ),
        heading: lo.heading,
        turn_radius: if lo.turn_radius.is_infinite() { Length::INFINITE } else { lo.turn_radius },
        direction: lo.direction,
        altitude_afe: Length::meters(afe_m),
        true_airspeed: lerp(lo.true_airspeed, hi.true_airspeed, t),
        thrust: lerp(lo.thrust, hi.thrust, t),
        origin,
    }
}

/// Inserts equal-`delta_v` intermediate points wherever adjacent groundspeeds
/// differ by more than `delta_v_mps` (§4.6). Speed and thrust are split by
/// equal TIME increments under a constant-acceleration assumption; position,
/// altitude and turn radius follow the distance fraction that acceleration
/// implies at each time step, not the time fraction itself.
fn segment_speed(points: &mut Vec<MergedPoint>, delta_v_mps: f64) {
    if delta_v_mps <= 0.0 {
        return;
    }
    let mut i = 0;
    while i + 1 < points.len() {
        let (lo, hi) = (points[i], points[i + 1]);
        let delta_v = (hi.true_airspeed - lo.true_airspeed).abs();
        if delta_v > delta_v_mps {
            let steps = ((delta_v / delta_v_mps).ceil() as usize).max(2);
            let t_time = 1.0 / steps as f64;
            let inserted = interpolate_merged_time_weighted(lo, hi, t_time, PointOrigin::SpeedSegmentation);
            points.insert(i + 1, inserted);
            continue; // re-examine the shortened gap; further splits happen on subsequent passes
        }
        i += 1;
    }
}

/// Splits `[lo, hi]` at time fraction `t_time` (§4.6): true airspeed and
/// thrust are interpolated linearly in time; the along-track distance that
/// constant acceleration covers by that time gives the distance fraction
/// used for position, altitude and turn radius.
fn interpolate_merged_time_weighted(lo: MergedPoint, hi: MergedPoint, t_time: f64, origin: PointOrigin) -> MergedPoint {
    let total_distance = hi.distance_m - lo.distance_m;
    let total_time = 2.0 * total_distance / (lo.true_airspeed + hi.true_airspeed).max(1e-6);
    let accel = (hi.true_airspeed - lo.true_airspeed) / total_time.max(1e-6);

    let time = t_time * total_time;
    let dist_at_time = lo.true_airspeed * time + 0.5 * accel * time * time;
    let frac_dist = (dist_at_time / total_distance.max(1e-6)).clamp(0.0, 1.0);

    let mut point = interpolate_merged(
        lo,
        hi,
        frac_dist,
        lerp(lo.altitude_afe.as_meters(), hi.altitude_afe.as_meters(), frac_dist),
        origin,
    );
    point.true_airspeed = lerp(lo.true_airspeed, hi.true_airspeed, t_time);
    point.thrust = lerp(lo.thrust, hi.thrust, t_time);
    point
}

/// Collapses adjacent points closer than `min_m`, deleting the downstream
/// member (§4.6).
fn filter_min_ground_distance(points: &mut Vec<MergedPoint>, min_m: f64) {
    if min_m <= 0.0 || points.len() < 2 {
        return;
    }
    let mut i = 0;
    while i + 1 < points.len() {
        if points[i + 1].distance_m - points[i].distance_m < min_m {
            points.remove(i + 1);
        } else {
            i += 1;
        }
    }
}

/// Replays Δt = Δs / midpoint(groundspeed) from `anchor_time_tai_s` at the
/// runway threshold (distance 0), accumulating forward and backward into
/// integer-second timestamps (§4.6, §9 "integer-second time grid").
fn recompute_times(points: &[MergedPoint], anchor_time_tai_s: i64) -> Vec<i64> {
    let anchor_idx = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_m.abs().total_cmp(&b.distance_m.abs()))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut times = vec![0_i64; points.len()];
    times[anchor_idx] = anchor_time_tai_s;

    let mut accumulated = 0.0_f64;
    for i in (anchor_idx + 1)..points.len() {
        let ds = points[i].distance_m - points[i - 1].distance_m;
        let mid_speed = midpoint_speed(points[i - 1].true_airspeed, points[i].true_airspeed);
        accumulated += ds / mid_speed;
        times[i] = anchor_time_tai_s + accumulated.round() as i64;
    }

    let mut accumulated_back = 0.0_f64;
    for i in (0..anchor_idx).rev() {
        let ds = points[i + 1].distance_m - points[i].distance_m;
        let mid_speed = midpoint_speed(points[i].true_airspeed, points[i + 1].true_airspeed);
        accumulated_back -= ds / mid_speed;
        times[i] = anchor_time_tai_s + accumulated_back.round() as i64;
    }

    times
}

fn midpoint_speed(a: f64, b: f64) -> f64 { ((a + b) / 2.0).max(1e-3) }

#[cfg(test)]
mod tests {
    use grape_math::{GeoPoint, Heading, Temp};

    use super::*;
    use crate::fuel_flow::NoFuelFlow;
    use crate::profile::ProfilePoint;
    use crate::route_expander::RoutePoint;

    fn route_two_points() -> RouteOutput {
        RouteOutput::from_points_for_test(vec![
            RoutePoint {
                cumulative_ground_distance: Length::ZERO,
                position: GeoPoint::new(0.0, 0.0),
                heading: Heading::NORTH,
                turn_radius: Length::INFINITE,
                direction: RouteOutputDirection::Straight,
            },
            RoutePoint {
                cumulative_ground_distance: Length::meters(10_000.0),
                position: GeoPoint::new(0.0, 0.1),
                heading: Heading::NORTH,
                turn_radius: Length::INFINITE,
                direction: RouteOutputDirection::Straight,
            },
        ])
    }

    fn profile_two_points() -> ProfileOutput {
        ProfileOutput::from_points_for_test(vec![
            ProfilePoint {
                cumulative_ground_distance: Length::ZERO,
                altitude_afe: Length::ZERO,
                true_airspeed: 70.0,
                corr_net_thrust_per_engine: 200_000.0,
            },
            ProfilePoint {
                cumulative_ground_distance: Length::meters(10_000.0),
                altitude_afe: Length::meters(2_000.0),
                true_airspeed: 120.0,
                corr_net_thrust_per_engine: 180_000.0,
            },
        ])
    }

    #[test]
    fn assembles_monotone_output() {
        let route = route_two_points();
        let profile = profile_two_points();
        let runway = Runway::new("09".into(), GeoPoint::new(0.0, 0.0), Length::ZERO, Length::meters(3000.0), Heading::NORTH, 0.0).unwrap();
        let aircraft = grape_store::Doc29Aircraft::new("x".into(), 2, 200_000.0, Temp::from_celsius(30.0)).unwrap();
        let atmosphere = Atmosphere::new(grape_math::TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap();
        let hook = NoFuelFlow;
        let input = AssemblyInput {
            route: &route,
            profile: &profile,
            runway: &runway,
            direction: RouteDirection::Departure,
            atmosphere,
            anchor_time_tai_s: 1_000,
            engine_count: 2,
            fuel_hook: &hook,
            aircraft: &aircraft,
            speed_segmentation_delta_v_mps: 10.0,
            min_ground_distance_m: 10.0,
        };
        let output = assemble(&input).unwrap();
        assert!(output.len() >= 2);
        let mut prev = f64::NEG_INFINITY;
        for (distance, _) in output.iter() {
            assert!(distance > prev);
            prev = distance;
        }
        let (first_distance, _) = output.first();
        assert_eq!(first_distance, 0.0);
    }
}
