//! The profile expander (component E, §4.5): walks a Doc29 procedural step
//! program (or an explicit points table) into a vertical profile keyed by
//! cumulative ground distance — altitude, true airspeed and corrected net
//! thrust per engine. The performance assembler (component F) merges this
//! against the route expander's lateral polyline.

use grape_math::{Heading, Length};
use grape_store::{
    AeroCoefficients, ArrivalProfile, ArrivalStep, Atmosphere, DepartureDerate, DepartureProfile, DepartureStep,
    Doc29Aircraft, Rating,
};

use crate::error::{RunError, RunResult};
use crate::route_expander::RouteOutput;
use crate::thrust::corrected_net_thrust;

const GRAVITY: f64 = 9.806_65;
/// Headwind reference offset used by the Doc29 wind-correction terms below
/// (§4.5): corrections are taken relative to an 8-knot headwind, not zero wind.
const WIND_CORRECTION_REFERENCE_MPS: f64 = 8.0 * grape_math::MPS_PER_KNOT;

/// One point of a vertical profile (§4.5), prior to lateral merging.
#[derive(Debug, Clone, Copy)]
pub struct ProfilePoint {
    pub cumulative_ground_distance: Length,
    pub altitude_afe:               Length,
    pub true_airspeed:              f64,
    pub corr_net_thrust_per_engine: f64,
}

/// The profile expander's output: a vertical profile in increasing
/// cumulative-ground-distance order (§4.5).
#[derive(Debug, Clone)]
pub struct ProfileOutput {
    points: Vec<ProfilePoint>,
}

impl ProfileOutput {
    #[cfg(test)]
    pub(crate) fn from_points_for_test(points: Vec<ProfilePoint>) -> Self { Self { points } }

    #[must_use]
    pub fn points(&self) -> &[ProfilePoint] { &self.points }
}

/// Flight-specific inputs threaded through profile expansion (§4.1, §4.5).
pub struct FlightContext<'a> {
    pub aircraft:         &'a Doc29Aircraft,
    pub weight_n:         f64,
    pub atmosphere:       Atmosphere,
    pub runway_elevation: Length,
    pub runway_heading:   Heading,
    /// The already-expanded lateral polyline (§4.3), consulted to interpolate
    /// extra profile points wherever turn radius changes within a segment
    /// (§4.5, §9 design note).
    pub route: &'a RouteOutput,
    /// Takeoff/climb thrust-percentage derate, departures only (§3). `None`
    /// for arrivals and for full-thrust departures.
    pub derate: Option<DepartureDerate>,
}

impl FlightContext<'_> {
    fn thrust(&self, rating: Rating, cas: f64, alt_afe: Length) -> RunResult<f64> {
        let thrust = corrected_net_thrust(self.aircraft, rating, cas, self.runway_elevation + alt_afe, self.atmosphere)?;
        let scale = match (rating, self.derate) {
            (Rating::MaxTakeoff | Rating::MaxTakeoffHighTemperature, Some(derate)) => derate.takeoff_fraction,
            (Rating::MaxClimb | Rating::MaxClimbHighTemperature, Some(derate)) => derate.climb_fraction,
            _ => 1.0,
        };
        Ok(thrust * scale)
    }

    fn takeoff_coefficients(&self, id: &grape_store::CoefficientSetId) -> RunResult<AeroCoefficients> {
        self.aircraft.aero_coefficients(id).copied().ok_or(RunError::MissingTakeoffCoefficients)
    }

    fn land_coefficients(&self, id: &grape_store::CoefficientSetId) -> RunResult<AeroCoefficients> {
        self.aircraft.aero_coefficients(id).copied().ok_or(RunError::MissingLandCoefficients)
    }

    fn headwind(&self) -> f64 { self.atmosphere.headwind(self.runway_heading) }
}

/// Drag force (N) implied by the Doc29 B/C or D aerodynamic coefficients at
/// `weight_n` (§4.5): `B*W + C` for a takeoff-kind set, `D*W` for a
/// land-kind set, zero for cruise.
fn drag_force(coeffs: AeroCoefficients, weight_n: f64) -> f64 {
    use grape_store::AeroCoefficientsKind as Kind;
    match coeffs.kind {
        Kind::Takeoff => coeffs.b * weight_n + coeffs.c,
        Kind::Land => coeffs.d * weight_n,
        Kind::Cruise => 0.0,
    }
}

/// The along-track climb or descent angle implied by a force balance between
/// thrust, drag and weight (§4.5). Positive for climb, negative for descent.
fn flight_path_angle(coeffs: AeroCoefficients, thrust_total: f64, weight_n: f64) -> f64 {
    ((thrust_total - drag_force(coeffs, weight_n)) / weight_n).asin()
}

/// `(x - lo) / (hi - lo)`, the length-valued counterpart of
/// [`grape_math::inverse_lerp`].
fn inverse_lerp_len(lo: Length, hi: Length, x: Length) -> f64 { (x - lo) / (hi - lo) }

#[allow(clippy::too_many_arguments)]
fn interpolated_point(
    distance: Length,
    start_distance: Length,
    end_distance: Length,
    start_altitude: Length,
    end_altitude: Length,
    start_speed: f64,
    end_speed: f64,
    start_thrust: f64,
    end_thrust: f64,
) -> ProfilePoint {
    let t = inverse_lerp_len(start_distance, end_distance, distance);
    ProfilePoint {
        cumulative_ground_distance: distance,
        altitude_afe:               Length::meters(grape_math::lerp(start_altitude.as_meters(), end_altitude.as_meters(), t)),
        true_airspeed:              grape_math::lerp(start_speed, end_speed, t),
        corr_net_thrust_per_engine: grape_math::lerp(start_thrust, end_thrust, t),
    }
}

/// Walks `[start_distance, end_distance]`, splitting at every route
/// turn-radius change within it and pushing an intermediate profile point for
/// each (§4.5, §9 design note on turn-radius interpolation). If
/// `cutback_pending`, also inserts a single thrust-cutback point — at 1,000 ft
/// into the first such sub-interval, or half of it if shorter than 2,000 ft —
/// the first time a sub-interval is available, mirroring the original
/// calculator's one-shot cutback insertion per climb segment (§4.5).
///
/// Does not push the point at `end_distance` itself; the caller does that
/// with its own exact end-of-segment values.
#[allow(clippy::too_many_arguments)]
fn emit_turn_split_segment(
    route: &RouteOutput,
    points: &mut Vec<ProfilePoint>,
    start_distance: Length,
    end_distance: Length,
    start_altitude: Length,
    end_altitude: Length,
    start_speed: f64,
    end_speed: f64,
    start_thrust: f64,
    end_thrust: f64,
    mut cutback_pending: bool,
) {
    let interp = |distance: Length| {
        interpolated_point(
            distance,
            start_distance,
            end_distance,
            start_altitude,
            end_altitude,
            start_speed,
            end_speed,
            start_thrust,
            end_thrust,
        )
    };
    let cutback_offset = |run: Length| {
        if run.as_feet() < 2_000.0 { run * 0.5 } else { Length::feet(1_000.0) }
    };

    let mut cursor = start_distance;
    while let Some(change_at) = route.next_radius_change_within(cursor, end_distance) {
        if change_at.as_meters() <= cursor.as_meters() {
            break;
        }
        if cutback_pending {
            cutback_pending = false;
            let cutback_at = cursor + cutback_offset(change_at - cursor);
            points.push(interp(cutback_at));
        }
        points.push(interp(change_at));
        cursor = change_at;
    }

    if cutback_pending {
        let cutback_at = cursor + cutback_offset(end_distance - cursor);
        points.push(interp(cutback_at));
    }
}

/// Expands a departure procedural or points profile into ground distance,
/// altitude, speed and thrust (§4.5).
///
/// # Errors
/// Returns [`RunError`] if a climb-accelerate step cannot reach its target
/// airspeed, or a referenced coefficient set or thrust rating is missing
/// (both already checked at profile-attach time in the common case; this
/// guards against a thrust model changed after attachment).
pub fn expand_departure(ctx: &FlightContext, profile: &DepartureProfile) -> RunResult<ProfileOutput> {
    match profile {
        DepartureProfile::Points(points) => Ok(ProfileOutput {
            points: points
                .iter()
                .map(|(distance, p)| ProfilePoint {
                    cumulative_ground_distance: Length::meters(distance.into_inner()),
                    altitude_afe:               p.altitude_afe,
                    true_airspeed:              p.true_airspeed,
                    corr_net_thrust_per_engine: p.corr_net_thrust_per_engine,
                })
                .collect(),
        }),
        DepartureProfile::Procedural { steps, thrust_cutback_index } => {
            expand_departure_procedural(ctx, steps, *thrust_cutback_index)
        }
    }
}

/// Which of the two Doc29 climb-accelerate step flavors is being solved: a
/// fixed vertical climb rate, or a fixed fraction of the available climb
/// gradient diverted to acceleration instead of climbing (§4.5).
enum ClimbAccelerateKind {
    ByRate(f64),
    ByPercentage(f64),
}

struct ClimbAccelerateSolution {
    end_altitude: Length,
    ground_run:   Length,
    end_thrust:   f64,
}

/// Iteratively solves a climb-accelerate segment's end altitude (§4.5):
/// midpoint thrust and true airspeed are recomputed against the current
/// altitude guess until the guess and the altitude it implies agree within
/// 1 ft.
///
/// # Errors
/// Returns [`RunError::ClimbAccelerateCasUnreachable`] if the available
/// climb gradient leaves no margin (`accel_factor - climb_gradient <= 0.01`);
/// clamps the climb gradient down when the margin is merely thin
/// (`(0.01, 0.02]`), per §4.5 / §8 scenario 4.
fn solve_climb_accelerate(
    ctx: &FlightContext,
    rating: Rating,
    coeffs: AeroCoefficients,
    start_altitude: Length,
    start_cas: f64,
    end_cas: f64,
    kind: &ClimbAccelerateKind,
) -> RunResult<ClimbAccelerateSolution> {
    const MAX_ITERATIONS: u32 = 50;
    const CONVERGED_FEET: f64 = 1.0;

    let engine_count = f64::from(ctx.aircraft.engine_count());
    let start_thrust = ctx.thrust(rating, start_cas, start_altitude)?;

    let mut end_altitude = start_altitude + Length::feet(250.0);
    let mut solution = None;

    for _ in 0..MAX_ITERATIONS {
        let end_thrust = ctx.thrust(rating, end_cas, end_altitude)?;
        let mid_altitude = Length::meters((start_altitude.as_meters() + end_altitude.as_meters()) / 2.0);
        let mid_tas = (start_cas + end_cas) / 2.0;
        let mid_thrust = (start_thrust + end_thrust) / 2.0;
        let mid_weight_force = ctx.weight_n / ctx.atmosphere.pressure_ratio(mid_altitude);

        let accel_factor = engine_count * mid_thrust / mid_weight_force - coeffs.r;
        let mut climb_gradient = match *kind {
            ClimbAccelerateKind::ByRate(climb_rate) => climb_rate / mid_tas.max(1e-6),
            ClimbAccelerateKind::ByPercentage(fraction) => accel_factor * (1.0 - fraction),
        };

        if accel_factor - climb_gradient <= 0.01 {
            return Err(RunError::ClimbAccelerateCasUnreachable { accel_factor, climb_gradient });
        }
        if accel_factor - climb_gradient <= 0.02 {
            climb_gradient = accel_factor - 0.02;
        }

        let ground_run = Length::meters((end_cas * end_cas - start_cas * start_cas) / (2.0 * GRAVITY * (accel_factor - climb_gradient)));
        let estimated_end_altitude = start_altitude + Length::meters(ground_run.as_meters() * climb_gradient);

        if (estimated_end_altitude.as_meters() - end_altitude.as_meters()).abs() < CONVERGED_FEET * grape_math::METERS_PER_FOOT {
            solution = Some(ClimbAccelerateSolution { end_altitude: estimated_end_altitude, ground_run, end_thrust });
            break;
        }
        end_altitude = estimated_end_altitude;
    }

    solution.ok_or_else(|| {
        let climb_gradient = match *kind {
            ClimbAccelerateKind::ByRate(climb_rate) => climb_rate / end_cas.max(1e-6),
            ClimbAccelerateKind::ByPercentage(fraction) => 1.0 - fraction,
        };
        RunError::ClimbAccelerateCasUnreachable { accel_factor: 0.0, climb_gradient }
    })
}

fn expand_departure_procedural(ctx: &FlightContext, steps: &[DepartureStep], cutback_index: usize) -> RunResult<ProfileOutput> {
    let mut points = Vec::with_capacity(steps.len() + 1);
    let mut distance = Length::ZERO;
    let mut altitude = Length::ZERO;
    let mut cas = 0.0_f64;

    for (index, step) in steps.iter().enumerate() {
        let rating = if index <= cutback_index { Rating::MaxTakeoff } else { Rating::MaxClimb };
        let cutback_pending = index == cutback_index + 1;

        match *step {
            DepartureStep::Takeoff { ref coefficients, initial_cas } => {
                cas = initial_cas;
                let thrust = ctx.thrust(rating, cas, altitude)?;
                ctx.takeoff_coefficients(coefficients)?;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            DepartureStep::Climb { ref coefficients, end_altitude_afe } => {
                let coeffs = ctx.takeoff_coefficients(coefficients)?;
                let start_thrust = ctx.thrust(rating, cas, altitude)?;
                let gamma = flight_path_angle(coeffs, start_thrust, ctx.weight_n);
                let rise = end_altitude_afe - altitude;
                let run = Length::meters(rise.as_meters() / gamma.tan().max(1e-6));
                let end_distance = distance + run;

                emit_turn_split_segment(
                    ctx.route,
                    &mut points,
                    distance,
                    end_distance,
                    altitude,
                    end_altitude_afe,
                    cas,
                    cas,
                    start_thrust,
                    start_thrust,
                    cutback_pending,
                );

                distance = end_distance;
                altitude = end_altitude_afe;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: start_thrust,
                });
            }
            DepartureStep::ClimbAccelerate { ref coefficients, end_cas, climb_rate } => {
                let coeffs = ctx.takeoff_coefficients(coefficients)?;
                let start_distance = distance;
                let start_altitude = altitude;
                let start_cas = cas;
                let solution =
                    solve_climb_accelerate(ctx, rating, coeffs, start_altitude, start_cas, end_cas, &ClimbAccelerateKind::ByRate(climb_rate))?;
                let end_distance = start_distance + solution.ground_run;

                emit_turn_split_segment(
                    ctx.route,
                    &mut points,
                    start_distance,
                    end_distance,
                    start_altitude,
                    solution.end_altitude,
                    start_cas,
                    end_cas,
                    ctx.thrust(rating, start_cas, start_altitude)?,
                    solution.end_thrust,
                    cutback_pending,
                );

                distance = end_distance;
                altitude = solution.end_altitude;
                cas = end_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: solution.end_thrust,
                });
            }
            DepartureStep::ClimbAcceleratePercentage { ref coefficients, end_cas, acceleration_fraction } => {
                let coeffs = ctx.takeoff_coefficients(coefficients)?;
                let start_distance = distance;
                let start_altitude = altitude;
                let start_cas = cas;
                let solution = solve_climb_accelerate(
                    ctx,
                    rating,
                    coeffs,
                    start_altitude,
                    start_cas,
                    end_cas,
                    &ClimbAccelerateKind::ByPercentage(acceleration_fraction),
                )?;
                let end_distance = start_distance + solution.ground_run;

                emit_turn_split_segment(
                    ctx.route,
                    &mut points,
                    start_distance,
                    end_distance,
                    start_altitude,
                    solution.end_altitude,
                    start_cas,
                    end_cas,
                    ctx.thrust(rating, start_cas, start_altitude)?,
                    solution.end_thrust,
                    cutback_pending,
                );

                distance = end_distance;
                altitude = solution.end_altitude;
                cas = end_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: solution.end_thrust,
                });
            }
        }
    }

    if points.len() < 2 {
        return Err(RunError::TooFewPerformancePoints { found: points.len() });
    }
    Ok(ProfileOutput { points })
}

/// Expands an arrival procedural or points profile. Procedural steps are
/// anchored at [`ArrivalStep::DescendLand`] (ground distance 0, the runway
/// threshold) and walked in reverse, mirroring the route expander's
/// upstream-to-downstream build order for arrivals (§4.5).
///
/// # Errors
/// Returns [`RunError`] if a referenced coefficient set is missing.
pub fn expand_arrival(ctx: &FlightContext, profile: &ArrivalProfile) -> RunResult<ProfileOutput> {
    match profile {
        ArrivalProfile::Points(points) => Ok(ProfileOutput {
            points: points
                .iter()
                .map(|(distance, p)| ProfilePoint {
                    cumulative_ground_distance: Length::meters(distance.into_inner()),
                    altitude_afe:               p.altitude_afe,
                    true_airspeed:              p.true_airspeed,
                    corr_net_thrust_per_engine: p.corr_net_thrust_per_engine,
                })
                .collect(),
        }),
        ArrivalProfile::Procedural(steps) => expand_arrival_procedural(ctx, steps),
    }
}

/// The Doc29 arrival threshold-point thrust formula (§4.5): corrected net
/// thrust per engine to hold the descent angle against drag (the `R` term)
/// and weight (`sin(angle)`), plus an additive wind-correction term scaled by
/// headwind relative to an 8-knot reference.
fn arrival_threshold_thrust(ctx: &FlightContext, coeffs: AeroCoefficients, altitude_afe: Length, descent_angle: grape_math::Angle, cas: f64) -> f64 {
    let engine_count = f64::from(ctx.aircraft.engine_count());
    let pressure_ratio = ctx.atmosphere.pressure_ratio(ctx.runway_elevation + altitude_afe);
    let weight_over_pressure = ctx.weight_n / pressure_ratio;

    let base = weight_over_pressure / engine_count * (coeffs.r + descent_angle.sin() / 1.03);
    let wind_correction = 1.03 * weight_over_pressure * (descent_angle.sin() * (ctx.headwind() - WIND_CORRECTION_REFERENCE_MPS))
        / (engine_count * cas.max(1e-6));
    base + wind_correction
}

/// The force-balance thrust needed to sustain `angle` and `accel` against
/// drag (the `R` term) and weight (§4.5), used by deceleration steps that
/// are not governed by a thrust rating.
fn force_balance_thrust(ctx: &FlightContext, coeffs: AeroCoefficients, altitude_afe: Length, angle: grape_math::Angle, accel: f64) -> f64 {
    let engine_count = f64::from(ctx.aircraft.engine_count());
    let pressure_ratio = ctx.atmosphere.pressure_ratio(ctx.runway_elevation + altitude_afe);
    ctx.weight_n / (engine_count * pressure_ratio) * (coeffs.r * angle.cos() + angle.sin() + accel / GRAVITY)
}

fn expand_arrival_procedural(ctx: &FlightContext, steps: &[ArrivalStep]) -> RunResult<ProfileOutput> {
    let mut points = Vec::with_capacity(steps.len() + 1);
    let mut distance = Length::ZERO;
    let mut altitude = Length::ZERO;
    let mut cas = 0.0_f64;

    points.push(ProfilePoint {
        cumulative_ground_distance: distance,
        altitude_afe:               altitude,
        true_airspeed:              0.0,
        corr_net_thrust_per_engine: 0.0,
    });

    for step in steps.iter().rev() {
        match *step {
            ArrivalStep::DescendLand { ref coefficients, descent_angle, threshold_crossing_altitude_afe, touchdown_roll } => {
                let coeffs = ctx.land_coefficients(coefficients)?;
                altitude = threshold_crossing_altitude_afe;
                cas = reference_approach_speed(coeffs, ctx.weight_n, ctx.atmosphere, altitude + ctx.runway_elevation);
                let thrust = arrival_threshold_thrust(ctx, coeffs, altitude, descent_angle, cas);
                let run = Length::meters(altitude.as_meters() / descent_angle.tan().max(1e-6));
                distance += run + touchdown_roll;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            ArrivalStep::GroundDecelerate { ground_distance, start_cas, .. } => {
                distance += ground_distance;
                cas = start_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               Length::ZERO,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: 0.0,
                });
            }
            ArrivalStep::DescendDecelerate { ref coefficients, start_altitude_afe, descent_angle, start_cas } => {
                let coeffs = ctx.land_coefficients(coefficients)?;
                let rise = start_altitude_afe - altitude;
                let run = Length::meters(rise.as_meters() / descent_angle.tan().max(1e-6));

                let slant_run = (run / descent_angle.cos().max(1e-6)).as_meters();
                let accel = (cas * cas - start_cas * start_cas) / (2.0 * slant_run.max(1e-6));
                let thrust = force_balance_thrust(ctx, coeffs, altitude, descent_angle, accel);

                distance += run;
                altitude = start_altitude_afe;
                cas = start_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            ArrivalStep::DescendIdle { start_altitude_afe, descent_angle, start_cas } => {
                let thrust = ctx.thrust(Rating::Idle, (cas + start_cas) / 2.0, altitude)?;
                let rise = start_altitude_afe - altitude;
                let run = Length::meters(rise.as_meters() / descent_angle.tan().max(1e-6));
                distance += run;
                altitude = start_altitude_afe;
                cas = start_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            ArrivalStep::Level { ref coefficients, ground_distance } => {
                ctx.land_coefficients(coefficients)?;
                let thrust = ctx.thrust(Rating::Idle, cas, altitude)?;
                distance += ground_distance;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            ArrivalStep::LevelDecelerate { ref coefficients, ground_distance, start_cas } => {
                ctx.land_coefficients(coefficients)?;
                let thrust = ctx.thrust(Rating::Idle, (cas + start_cas) / 2.0, altitude)?;
                distance += ground_distance;
                cas = start_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
            ArrivalStep::LevelIdle { ground_distance, start_cas } => {
                let thrust = ctx.thrust(Rating::Idle, (cas + start_cas) / 2.0, altitude)?;
                distance += ground_distance;
                cas = start_cas;
                points.push(ProfilePoint {
                    cumulative_ground_distance: distance,
                    altitude_afe:               altitude,
                    true_airspeed:              cas,
                    corr_net_thrust_per_engine: thrust,
                });
            }
        }
    }

    // Built anchored-at-threshold outward; reverse to increasing ground distance.
    points.reverse();
    for point in &mut points {
        point.cumulative_ground_distance = Length::meters(-point.cumulative_ground_distance.as_meters());
    }
    points.sort_by(|a, b| a.cumulative_ground_distance.as_meters().total_cmp(&b.cumulative_ground_distance.as_meters()));

    if points.len() < 2 {
        return Err(RunError::TooFewPerformancePoints { found: points.len() });
    }
    Ok(ProfileOutput { points })
}

/// Reference approach speed at touchdown configuration, from the Land-kind
/// `R` coefficient (§4.5): `Vref = R * sqrt(weight / density_ratio)`.
fn reference_approach_speed(coeffs: AeroCoefficients, weight_n: f64, atmosphere: Atmosphere, alt_msl: Length) -> f64 {
    coeffs.r * (weight_n / atmosphere.density_ratio(alt_msl)).sqrt()
}

#[cfg(test)]
mod tests {
    use grape_math::{Heading, Temp, TempDelta};
    use grape_store::{AeroCoefficientsKind, Doc29Aircraft, RatingCoefficients, ThrustModel};

    use super::*;
    use crate::route_expander::{RouteOutput, RouteOutputDirection, RoutePoint};

    fn straight_route(length: Length) -> RouteOutput {
        RouteOutput::from_points_for_test(vec![
            RoutePoint {
                cumulative_ground_distance: Length::ZERO,
                position: grape_math::GeoPoint::new(0.0, 0.0),
                heading: Heading::NORTH,
                turn_radius: Length::INFINITE,
                direction: RouteOutputDirection::Straight,
            },
            RoutePoint {
                cumulative_ground_distance: length,
                position: grape_math::GeoPoint::new(0.0, 1.0),
                heading: Heading::NORTH,
                turn_radius: Length::INFINITE,
                direction: RouteOutputDirection::Straight,
            },
        ])
    }

    fn flat_atmosphere() -> Atmosphere { Atmosphere::new(TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap() }

    fn climb_aircraft() -> Doc29Aircraft {
        let mut aircraft = Doc29Aircraft::new("test".into(), 2, 200_000.0, Temp::from_celsius(30.0)).unwrap();
        let mut ratings = std::collections::BTreeMap::new();
        ratings.insert(Rating::MaxClimb, RatingCoefficients { e: 150_000.0, f: 0.0, ga: 0.0, gb: 0.0, h: 0.0 });
        ratings.insert(Rating::MaxTakeoff, RatingCoefficients { e: 180_000.0, f: 0.0, ga: 0.0, gb: 0.0, h: 0.0 });
        aircraft.set_thrust(ThrustModel::Rating(ratings));
        aircraft
    }

    fn ctx<'a>(aircraft: &'a Doc29Aircraft, route: &'a RouteOutput) -> FlightContext<'a> {
        FlightContext {
            aircraft,
            weight_n: 400_000.0,
            atmosphere: flat_atmosphere(),
            runway_elevation: Length::ZERO,
            runway_heading: Heading::NORTH,
            route,
            derate: None,
        }
    }

    #[test]
    fn climb_accelerate_converges_to_higher_altitude() {
        let aircraft = climb_aircraft();
        let route = straight_route(Length::nautical_miles(50.0));
        let context = ctx(&aircraft, &route);
        let coeffs = AeroCoefficients::new(AeroCoefficientsKind::Takeoff, 0.1, 0.0001, 500.0, 0.0).unwrap();

        let solution =
            solve_climb_accelerate(&context, Rating::MaxClimb, coeffs, Length::ZERO, 80.0, 120.0, &ClimbAccelerateKind::ByRate(5.0)).unwrap();

        assert!(solution.end_altitude.as_meters() > 0.0);
        assert!(solution.ground_run.as_meters() > 0.0);
    }

    #[test]
    fn climb_accelerate_rejects_unreachable_cas() {
        let aircraft = climb_aircraft();
        let route = straight_route(Length::nautical_miles(50.0));
        let context = ctx(&aircraft, &route);
        let coeffs = AeroCoefficients::new(AeroCoefficientsKind::Takeoff, 0.3, 0.0001, 500.0, 0.0).unwrap();

        let result =
            solve_climb_accelerate(&context, Rating::MaxClimb, coeffs, Length::ZERO, 80.0, 300.0, &ClimbAccelerateKind::ByRate(100.0));

        assert!(matches!(result, Err(RunError::ClimbAccelerateCasUnreachable { .. })));
    }

    #[test]
    fn descend_land_threshold_thrust_is_positive() {
        let mut aircraft = Doc29Aircraft::new("test".into(), 2, 200_000.0, Temp::from_celsius(30.0)).unwrap();
        let mut ratings = std::collections::BTreeMap::new();
        ratings.insert(Rating::Idle, RatingCoefficients { e: 20_000.0, f: 0.0, ga: 0.0, gb: 0.0, h: 0.0 });
        aircraft.set_thrust(ThrustModel::Rating(ratings));
        let land_id = aircraft.add_aero_coefficients(
            "land".into(),
            AeroCoefficients::new(AeroCoefficientsKind::Land, 1.3, 0.0, 0.0, 0.08).unwrap(),
        );
        let route = straight_route(Length::nautical_miles(10.0));
        let context = ctx(&aircraft, &route);

        let profile = ArrivalProfile::Procedural(vec![ArrivalStep::DescendLand {
            coefficients: land_id,
            descent_angle: grape_math::Angle::from_degrees(3.0),
            threshold_crossing_altitude_afe: Length::feet(50.0),
            touchdown_roll: Length::meters(300.0),
        }]);

        let output = expand_arrival(&context, &profile).unwrap();
        let threshold = output.points().iter().find(|p| p.altitude_afe.as_meters() > 0.0).unwrap();
        assert!(threshold.true_airspeed > 0.0);
        assert!(threshold.corr_net_thrust_per_engine > 0.0);
    }
}
