//! The noise generator (component I, §4.9): the per-(segment, receptor)
//! geometric reduction, NPD lookup and correction stack that turns one
//! performance-output segment into a LAMAX/SEL contribution at a receptor.
//!
//! A [`NoiseGenerator`] is built once per operation from its
//! [`NoiseAircraft`] and holds the two NPD lookups (SEL, LAMAX) with their
//! atmospheric-absorption delta — mutable state owned by a single worker,
//! never shared across threads (§5, §9).

use grape_math::{Angle, CoordinateSystem, Intersection, MPS_PER_KNOT, TurnDirection};
use grape_store::{FlightPhase, LateralDirectivity, NoiseAircraft, PerformancePoint, Receptor, RouteDirection, StartOfRollMode};

use crate::npd::{NpdDelta, NpdLookup};

/// Below this, an altitude difference is treated as exactly zero (§4.9 step
/// 1, §9 "precision" tolerance discussion).
const PRECISION_M: f64 = 1e-6;

/// The duration-correction and finite-segment-correction reference speed:
/// 160 knots (§4.9 steps 3 and 6).
const REFERENCE_SPEED_MPS: f64 = 160.0 * MPS_PER_KNOT;

/// A finite-segment correction is never allowed to push a level down by more
/// than this (§4.9 step 6).
const FINITE_SEGMENT_FLOOR_DB: f64 = -150.0;

/// The start-of-roll correction is scaled down beyond this slant distance
/// (§4.9 step 7, §6).
const START_OF_ROLL_SCALE_DISTANCE_M: f64 = 762.0;

/// Linear interpolation by ground-distance fraction (§4.9): used for
/// quantities that vary linearly along a segment (bank angle).
fn distance_interpolation(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolation by equal-energy-rate fraction (§4.9): `sqrt(lerp(a^2, b^2,
/// t))`, used for true airspeed and thrust, which vary at a constant rate of
/// change per unit time rather than per unit distance.
fn time_interpolation(a: f64, b: f64, t: f64) -> f64 {
    (a * a + (b * b - a * a) * t).sqrt()
}

/// The per-(segment, receptor) geometry needed by the correction stack
/// (§4.9 step 1): the three slant distances (perpendicular foot, closest
/// endpoint, effective source), the depression angles at S and E, the
/// along-track offset of the perpendicular foot, and the speed/thrust
/// interpolated to the foot.
#[derive(Debug, Clone, Copy, Default)]
struct SegmentGeometry {
    too_far: bool,
    /// The receptor sits behind the start of a takeoff roll, or ahead of the
    /// end of a landing roll: the one-sided finite-segment and
    /// start-of-roll corrections apply (§4.9 steps 6-7).
    edge_of_roll: bool,
    /// Along-track distance from P1 to the perpendicular foot, signed
    /// negative when the foot falls behind P1 (§4.9 steps 1, 7).
    q: f64,
    /// Ground distance from the receptor to the perpendicular foot, the
    /// lateral offset used by lateral attenuation (§4.9 step 5).
    lateral_offset_m: f64,
    distance_p: f64,
    distance_s: f64,
    distance_e: f64,
    depression_angle_s: f64,
    depression_angle_e: f64,
    true_airspeed: f64,
    thrust: f64,
}

/// `Right` turns subtract the bank angle from elevation angle to get
/// depression angle, `Left` turns add it (§4.9 step 1: "receptor on the
/// inside of the turn subtracts, outside adds", resolved against the
/// negative-for-left bank-angle sign convention of the performance output).
fn bank_angle_multiplier(direction: TurnDirection) -> f64 {
    match direction {
        TurnDirection::Right => -1.0,
        TurnDirection::Left => 1.0,
    }
}

/// Computes the geometry of one segment against one receptor (§4.9 step 1).
/// Returns `too_far: true` without further work if both endpoints are beyond
/// `max_distance_m`.
#[allow(clippy::too_many_lines)]
fn segment_geometry(
    cs: &dyn CoordinateSystem,
    segment_length_m: f64,
    flight_path_angle: Angle,
    p1: &PerformancePoint,
    p2: &PerformancePoint,
    receptor: &Receptor,
    max_distance_m: f64,
) -> SegmentGeometry {
    let mut g = SegmentGeometry::default();

    let receptor_position = receptor.position();
    let distance_to_p1 = cs.distance(receptor_position, p1.position).as_meters();
    let distance_to_p2 = cs.distance(receptor_position, p2.position).as_meters();
    if distance_to_p1.min(distance_to_p2) > max_distance_m {
        g.too_far = true;
        return g;
    }

    let (foot, intersection) = cs.perpendicular_intersection(p1.position, p2.position, receptor_position);
    let ground_distance_to_foot = cs.distance(receptor_position, foot).as_meters();
    let along_track_to_foot = cs.distance(p1.position, foot).as_meters();

    let elevation_p1 = p1.altitude_msl.as_meters();
    let elevation_p2 = p2.altitude_msl.as_meters();
    let receptor_elevation = receptor.elevation().as_meters();

    let cos_angle = flight_path_angle.cos();
    let tan_angle = flight_path_angle.tan();

    let takeoff_roll_ahead = p2.phase == FlightPhase::TakeoffRoll;
    let landing_roll_behind = p1.phase == FlightPhase::LandingRoll;

    let mut elevation_angle_s;
    let mut elevation_angle_e;

    match intersection {
        Intersection::Behind => {
            g.q = -along_track_to_foot / cos_angle;
            let foot_altitude = elevation_p1 - along_track_to_foot * tan_angle;
            let altitude_above_foot = foot_altitude - receptor_elevation;
            let altitude_above_p1 = elevation_p1 - receptor_elevation;

            g.lateral_offset_m = distance_to_p1;
            g.distance_p = ground_distance_to_foot.hypot(altitude_above_foot);
            g.distance_s = distance_to_p1.hypot(altitude_above_p1);

            if altitude_above_p1 < PRECISION_M {
                elevation_angle_s = 0.0;
                elevation_angle_e = 0.0;
            } else {
                elevation_angle_s = (altitude_above_p1 / distance_to_p1).atan();
                elevation_angle_e = (altitude_above_p1 / cos_angle / ground_distance_to_foot).atan();
            }

            if takeoff_roll_ahead {
                g.distance_p = g.distance_s;
                g.distance_e = g.distance_s;
                elevation_angle_e = elevation_angle_s;
                g.edge_of_roll = true;
            } else {
                g.distance_e = g.distance_p;
            }
            g.true_airspeed = p1.true_airspeed;
            g.thrust = p1.corr_net_thrust_per_engine;
        }
        Intersection::Between => {
            g.q = along_track_to_foot / cos_angle;
            let foot_altitude = elevation_p1 + along_track_to_foot * tan_angle;
            let altitude_above_foot = foot_altitude - receptor_elevation;

            g.lateral_offset_m = ground_distance_to_foot;
            g.distance_p = ground_distance_to_foot.hypot(altitude_above_foot);
            g.distance_s = g.distance_p;
            g.distance_e = g.distance_p;

            let elevation_angle = if altitude_above_foot.abs() < PRECISION_M {
                0.0
            } else {
                (altitude_above_foot / ground_distance_to_foot).atan()
            };
            elevation_angle_s = elevation_angle;
            elevation_angle_e = elevation_angle;

            let i_factor = (g.q / segment_length_m).clamp(0.0, 1.0);
            let at_roll_edge = takeoff_roll_ahead || landing_roll_behind;
            g.true_airspeed = if at_roll_edge {
                (p1.true_airspeed + p2.true_airspeed) / 2.0
            } else {
                time_interpolation(p1.true_airspeed, p2.true_airspeed, i_factor)
            };
            g.thrust = time_interpolation(p1.corr_net_thrust_per_engine, p2.corr_net_thrust_per_engine, i_factor);
        }
        Intersection::Ahead => {
            g.q = along_track_to_foot / cos_angle;
            let foot_altitude = elevation_p1 + along_track_to_foot * tan_angle;
            let altitude_above_foot = foot_altitude - receptor_elevation;
            let altitude_above_p2 = elevation_p2 - receptor_elevation;

            g.lateral_offset_m = distance_to_p2;
            g.distance_p = ground_distance_to_foot.hypot(altitude_above_foot);
            g.distance_s = distance_to_p2.hypot(altitude_above_p2);

            if altitude_above_p2 < PRECISION_M {
                elevation_angle_s = 0.0;
                elevation_angle_e = 0.0;
            } else {
                elevation_angle_s = (altitude_above_p2 / distance_to_p2).atan();
                elevation_angle_e = (altitude_above_p2 / cos_angle / ground_distance_to_foot).atan();
            }

            if landing_roll_behind {
                g.distance_p = g.distance_s;
                g.distance_e = g.distance_s;
                elevation_angle_e = elevation_angle_s;
                g.edge_of_roll = true;
            } else {
                g.distance_e = g.distance_p;
            }
            g.true_airspeed = p2.true_airspeed;
            g.thrust = p2.corr_net_thrust_per_engine;
        }
    }

    let bank_angle_at_foot = match intersection {
        Intersection::Behind => p1.bank_angle,
        Intersection::Ahead => p2.bank_angle,
        Intersection::Between => {
            let i_factor = (g.q / segment_length_m).clamp(0.0, 1.0);
            Angle::from_radians(distance_interpolation(p1.bank_angle.radians(), p2.bank_angle.radians(), i_factor))
        }
    };

    let direction = cs
        .turn_direction(p1.position, p2.position, receptor_position)
        .unwrap_or(TurnDirection::Right);
    let multiplier = bank_angle_multiplier(direction);
    g.depression_angle_s = elevation_angle_s + multiplier * bank_angle_at_foot.radians();
    g.depression_angle_e = elevation_angle_e + multiplier * bank_angle_at_foot.radians();
    g
}

/// Engine-installation directivity correction, the shared `(a, b, c)`
/// parametrization of the wing-mounted and fuselage-mounted cases (§4.9 step 4).
fn engine_installation_correction(a: f64, b: f64, c: f64, depression_angle_rad: f64) -> f64 {
    let numerator = (a * depression_angle_rad.cos().powi(2) + depression_angle_rad.sin().powi(2)).powf(b);
    let denominator = c * (2.0 * depression_angle_rad).sin().powi(2) + (2.0 * depression_angle_rad).cos().powi(2);
    10.0 * (numerator / denominator).log10()
}

fn directivity_correction(directivity: LateralDirectivity, depression_angle_rad: f64) -> f64 {
    match directivity {
        LateralDirectivity::WingMounted => engine_installation_correction(0.0039, 0.062, 0.8786, depression_angle_rad),
        LateralDirectivity::FuselageMounted => engine_installation_correction(0.1225, 0.329, 1.0, depression_angle_rad),
        LateralDirectivity::Propeller => 0.0,
    }
}

/// SAE-AIR-1751 lateral attenuation (§4.9 step 5): negligible overhead
/// (elevation angle at or above 50 degrees), one curve below the aircraft's
/// ground track plane, a flatter curve above it.
fn lateral_attenuation(lateral_offset_m: f64, depression_angle_rad: f64) -> f64 {
    let elevation_deg = depression_angle_rad.to_degrees();
    if elevation_deg >= 50.0 {
        return 0.0;
    }
    let distance_factor = if lateral_offset_m > 914.0 {
        1.0
    } else {
        1.089 * (1.0 - (-0.00274 * lateral_offset_m).exp())
    };
    if depression_angle_rad >= 0.0 {
        (1.137 - 0.0229 * elevation_deg + 9.72 * (-0.142 * elevation_deg).exp()) * distance_factor
    } else {
        10.857 * distance_factor
    }
}

/// The finite-segment correction (§4.9 step 6): the general two-sided form
/// integrates the infinite-segment SEL down to the segment's actual extent;
/// the one-sided form (receptor behind the start of a takeoff roll, or ahead
/// of the end of a landing roll) integrates from the segment boundary out to
/// infinity on the open side, with the departure/arrival cases using
/// opposite signs of `alpha` since the open side lies on opposite ends of
/// the roll.
fn finite_segment_correction(
    g: &SegmentGeometry,
    direction: RouteDirection,
    segment_length_m: f64,
    sel_at_e: f64,
    lamax_at_p: f64,
) -> f64 {
    let scaled_distance =
        std::f64::consts::FRAC_2_PI * REFERENCE_SPEED_MPS * 10f64.powf((sel_at_e - lamax_at_p) / 10.0);
    if scaled_distance <= 0.0 {
        return FINITE_SEGMENT_FLOOR_DB;
    }

    let correction = if g.edge_of_roll {
        match direction {
            RouteDirection::Arrival => {
                let alpha = -segment_length_m / scaled_distance;
                10.0 * (std::f64::consts::FRAC_1_PI * (-alpha / (1.0 + alpha * alpha) - alpha.atan())).log10()
            }
            RouteDirection::Departure => {
                let alpha = segment_length_m / scaled_distance;
                10.0 * (std::f64::consts::FRAC_1_PI * (alpha / (1.0 + alpha * alpha) + alpha.atan())).log10()
            }
        }
    } else {
        let alpha1 = -g.q / scaled_distance;
        let alpha2 = -(g.q - segment_length_m) / scaled_distance;
        10.0 * (std::f64::consts::FRAC_1_PI
            * (alpha2 / (1.0 + alpha2 * alpha2) + alpha2.atan() - alpha1 / (1.0 + alpha1 * alpha1) - alpha1.atan()))
            .log10()
    };
    correction.max(FINITE_SEGMENT_FLOOR_DB)
}

/// Jet start-of-roll correction polynomial (§4.9 step 7, §6, Doc29 Volume 2
/// Appendix B), `phi_deg` the azimuth in degrees.
fn start_of_roll_jet(phi_deg: f64) -> f64 {
    let phi_rad = phi_deg.to_radians();
    2329.44 - 8.0573 * phi_deg + 11.51 * phi_rad.exp() - 3.4601 * phi_deg / phi_rad.ln()
        - 17_403_383.3 * phi_rad.ln() / (phi_deg * phi_deg)
}

/// Turboprop start-of-roll correction polynomial (§4.9 step 7, §6).
fn start_of_roll_turboprop(phi_deg: f64) -> f64 {
    -34_643.898 + 30_722_161.987 / phi_deg - 11_491_573_930.510 / phi_deg.powi(2)
        + 2_349_285_669_062.0 / phi_deg.powi(3) - 283_584_441_904_272.0 / phi_deg.powi(4)
        + 20_227_150_391_251_300.0 / phi_deg.powi(5) - 790_084_471_305_203_000.0 / phi_deg.powi(6)
        + 13_050_687_178_273_800_000.0 / phi_deg.powi(7)
}

/// Start-of-roll correction (§4.9 step 7): zero unless the receptor is
/// behind the start of a takeoff roll (departures only). Beyond 762 m slant
/// distance the correction is scaled down proportionally.
fn start_of_roll_correction(g: &SegmentGeometry, direction: RouteDirection, mode: StartOfRollMode) -> f64 {
    if direction != RouteDirection::Departure || !g.edge_of_roll || mode == StartOfRollMode::None {
        return 0.0;
    }
    if g.distance_s < PRECISION_M {
        return 0.0;
    }
    let ratio = (g.q / g.distance_s).clamp(-1.0, 1.0);
    let azimuth_deg = ratio.acos().to_degrees();
    if azimuth_deg < PRECISION_M {
        return 0.0;
    }

    let mut correction = match mode {
        StartOfRollMode::None => 0.0,
        StartOfRollMode::Jet => start_of_roll_jet(azimuth_deg),
        StartOfRollMode::Turboprop => start_of_roll_turboprop(azimuth_deg),
    };
    if g.distance_s > START_OF_ROLL_SCALE_DISTANCE_M {
        correction *= START_OF_ROLL_SCALE_DISTANCE_M / g.distance_s;
    }
    correction
}

/// Per-operation noise evaluator (§4.9): wraps one [`NoiseAircraft`]'s SEL
/// and LAMAX NPD lookups (direction-appropriate), and the correction
/// parameters shared by every segment of the operation.
pub struct NoiseGenerator<'a> {
    direction: RouteDirection,
    sel: NpdLookup<'a>,
    lamax: NpdLookup<'a>,
    lateral_directivity: LateralDirectivity,
    start_of_roll: StartOfRollMode,
    max_distance_m: f64,
}

impl<'a> NoiseGenerator<'a> {
    #[must_use]
    pub fn new(aircraft: &'a NoiseAircraft, direction: RouteDirection, max_distance_m: f64) -> Self {
        let (sel_table, lamax_table) = match direction {
            RouteDirection::Arrival => (aircraft.arrival_sel(), aircraft.arrival_lamax()),
            RouteDirection::Departure => (aircraft.departure_sel(), aircraft.departure_lamax()),
        };
        Self {
            direction,
            sel: NpdLookup::new(sel_table),
            lamax: NpdLookup::new(lamax_table),
            lateral_directivity: aircraft.lateral_directivity(),
            start_of_roll: aircraft.start_of_roll(),
            max_distance_m,
        }
    }

    /// Replaces both NPD lookups' atmospheric-absorption delta (§4.9 step 8,
    /// §4.8 round-trip law).
    pub fn set_atmospheric_absorption(&mut self, delta: NpdDelta) {
        self.sel.set_delta(delta);
        self.lamax.set_delta(delta);
    }

    /// Cancels whatever atmospheric-absorption delta is currently applied.
    pub fn reset_atmospheric_absorption(&mut self) {
        self.set_atmospheric_absorption(NpdDelta::ZERO);
    }

    /// Computes the `(LAMAX, SEL)` contribution of segment `p1`→`p2`
    /// (ground length `segment_length_m`) at `receptor`, or `None` if the
    /// segment is beyond this generator's configured maximum distance
    /// (§4.9 step 1).
    #[must_use]
    pub fn segment_noise(
        &self,
        cs: &dyn CoordinateSystem,
        p1: &PerformancePoint,
        p2: &PerformancePoint,
        segment_length_m: f64,
        receptor: &Receptor,
    ) -> Option<(f64, f64)> {
        let flight_path_angle =
            Angle::from_radians((p2.altitude_msl - p1.altitude_msl).as_meters().atan2(segment_length_m));
        let g = segment_geometry(cs, segment_length_m, flight_path_angle, p1, p2, receptor, self.max_distance_m);
        if g.too_far {
            return None;
        }

        let lamax_at_s = self.lamax.lookup(g.thrust, grape_math::Length::meters(g.distance_s));
        let lamax_at_p = self.lamax.lookup(g.thrust, grape_math::Length::meters(g.distance_p));
        let sel_at_e = self.sel.lookup(g.thrust, grape_math::Length::meters(g.distance_e));

        let duration = if g.true_airspeed < PRECISION_M { 0.0 } else { 10.0 * (REFERENCE_SPEED_MPS / g.true_airspeed).log10() };

        let engine_install_s = directivity_correction(self.lateral_directivity, g.depression_angle_s);
        let engine_install_e = directivity_correction(self.lateral_directivity, g.depression_angle_e);
        let lateral_atten_s = lateral_attenuation(g.lateral_offset_m, g.depression_angle_s);
        let lateral_atten_e = lateral_attenuation(g.lateral_offset_m, g.depression_angle_e);
        let finite_segment = finite_segment_correction(&g, self.direction, segment_length_m, sel_at_e, lamax_at_p);
        let start_of_roll = start_of_roll_correction(&g, self.direction, self.start_of_roll);

        let lamax = lamax_at_s + engine_install_s - lateral_atten_s + start_of_roll;
        let sel = sel_at_e + duration + engine_install_e - lateral_atten_e + finite_segment + start_of_roll;
        Some((lamax, sel))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use grape_math::{GeoPoint, Length, LocalTangentPlane};
    use grape_store::{NoiseSpectrum, NpdTable, PointOrigin};

    use super::*;

    fn flat_table(level: f64) -> NpdTable {
        let thrusts = [10_000.0, 20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0, 100_000.0];
        let levels = [[level; 10]; 10];
        NpdTable::new(thrusts, levels).unwrap()
    }

    fn aircraft() -> NoiseAircraft {
        NoiseAircraft::new(
            "test".to_owned(),
            flat_table(90.0),
            flat_table(95.0),
            flat_table(90.0),
            flat_table(95.0),
            NoiseSpectrum { levels_db: [80.0; 24] },
            NoiseSpectrum { levels_db: [80.0; 24] },
            LateralDirectivity::WingMounted,
            StartOfRollMode::Jet,
        )
    }

    fn point(distance_m: f64, altitude_m: f64, tas: f64, thrust: f64, phase: FlightPhase) -> PerformancePoint {
        PerformancePoint {
            time_tai_s: 0,
            phase,
            position: GeoPoint::new(distance_m / 111_320.0, 0.0),
            altitude_msl: Length::meters(altitude_m),
            true_airspeed: tas,
            groundspeed: tas,
            corr_net_thrust_per_engine: thrust,
            bank_angle: Angle::ZERO,
            fuel_flow_per_engine: 0.0,
            origin: PointOrigin::FromBoth,
        }
    }

    #[test]
    fn level_segment_with_flat_table_matches_manual_correction_stack() {
        let cs = LocalTangentPlane::new(GeoPoint::new(0.0, 0.0));
        let aircraft = aircraft();
        let generator = NoiseGenerator::new(&aircraft, RouteDirection::Departure, 25_000.0);

        let p1 = point(0.0, 500.0, REFERENCE_SPEED_MPS, 50_000.0, FlightPhase::Climb);
        let p2 = point(1000.0, 500.0, REFERENCE_SPEED_MPS, 50_000.0, FlightPhase::Climb);
        // Offset to the side of the ground track so the perpendicular-foot
        // geometry stays away from the depression-angle singularity directly
        // overhead.
        let receptor = Receptor::new("R".to_owned(), GeoPoint::new(500.0 / 111_320.0, 300.0 / 111_320.0), Length::ZERO);

        let (lamax, sel) = generator.segment_noise(&cs, &p1, &p2, 1000.0, &receptor).unwrap();
        assert!(lamax.is_finite());
        assert!(sel.is_finite());

        let flight_path_angle = Angle::ZERO;
        let g = segment_geometry(&cs, 1000.0, flight_path_angle, &p1, &p2, &receptor, 25_000.0);
        let lamax_at_d = flat_table(95.0).levels_db()[0][0];
        let sel_at_d = flat_table(90.0).levels_db()[0][0];
        let engine_install_s = directivity_correction(LateralDirectivity::WingMounted, g.depression_angle_s);
        let engine_install_e = directivity_correction(LateralDirectivity::WingMounted, g.depression_angle_e);
        let lateral_atten_s = lateral_attenuation(g.lateral_offset_m, g.depression_angle_s);
        let lateral_atten_e = lateral_attenuation(g.lateral_offset_m, g.depression_angle_e);
        let finite_segment = finite_segment_correction(&g, RouteDirection::Departure, 1000.0, sel_at_d, lamax_at_d);

        assert_relative_eq!(lamax, lamax_at_d + engine_install_s - lateral_atten_s, epsilon = 1e-6);
        assert_relative_eq!(
            sel,
            sel_at_d + engine_install_e - lateral_atten_e + finite_segment,
            epsilon = 1e-6
        );
    }

    #[test]
    fn propeller_directivity_is_always_zero() {
        assert_eq!(directivity_correction(LateralDirectivity::Propeller, 0.3), 0.0);
        assert_eq!(directivity_correction(LateralDirectivity::Propeller, -1.0), 0.0);
    }

    #[test]
    fn lateral_attenuation_vanishes_overhead() {
        assert_eq!(lateral_attenuation(500.0, 60.0_f64.to_radians()), 0.0);
    }

    #[test]
    fn lateral_attenuation_uses_flatter_curve_below_horizon() {
        let got = lateral_attenuation(500.0, -0.1);
        let factor = 1.089 * (1.0 - (-0.00274_f64 * 500.0).exp());
        assert_relative_eq!(got, 10.857 * factor, epsilon = 1e-9);
    }

    #[test]
    fn segment_beyond_max_distance_is_skipped() {
        let cs = LocalTangentPlane::new(GeoPoint::new(0.0, 0.0));
        let aircraft = aircraft();
        let generator = NoiseGenerator::new(&aircraft, RouteDirection::Arrival, 1_000.0);

        let p1 = point(0.0, 100.0, 70.0, 20_000.0, FlightPhase::Approach);
        let p2 = point(500.0, 80.0, 70.0, 20_000.0, FlightPhase::Approach);
        let receptor = Receptor::new("far".to_owned(), GeoPoint::new(0.0, 1.0), Length::ZERO);

        assert!(generator.segment_noise(&cs, &p1, &p2, 500.0, &receptor).is_none());
    }

    #[test]
    fn start_of_roll_correction_vanishes_away_from_roll_edge() {
        let g = SegmentGeometry { edge_of_roll: false, ..SegmentGeometry::default() };
        assert_eq!(start_of_roll_correction(&g, RouteDirection::Departure, StartOfRollMode::Jet), 0.0);
    }

    #[test]
    fn start_of_roll_correction_is_zero_for_arrivals() {
        let g = SegmentGeometry { edge_of_roll: true, q: 10.0, distance_s: 100.0, ..SegmentGeometry::default() };
        assert_eq!(start_of_roll_correction(&g, RouteDirection::Arrival, StartOfRollMode::Jet), 0.0);
    }

    #[test]
    fn distance_interpolation_is_plain_lerp() {
        assert_eq!(distance_interpolation(0.0, 10.0, 0.5), 5.0);
    }

    #[test]
    fn time_interpolation_is_rms_blend() {
        let got = time_interpolation(3.0, 5.0, 0.5);
        assert!((got - ((9.0 + 25.0) / 2.0_f64).sqrt()).abs() < 1e-9);
    }
}
