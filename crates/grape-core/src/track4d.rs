//! Track4D ingestion: a pre-recorded 4-D trajectory skips the route
//! expander and profile expander entirely (§3 "A Track4D skips profile
//! expansion and supplies its own time-stamped 4-D points") and is turned
//! directly into a [`PerformanceOutput`] by accumulating ground distance
//! between consecutive points.
//!
//! A [`grape_store::Track4D`] carries no [`grape_store::Doc29Aircraft`], so
//! unlike a [`grape_store::Flight`] it never invokes the fuel-flow hook
//! (component G) — there is no aircraft performance model for the hook to
//! key off. `fuel_flow_per_engine` stays zero for every point of a
//! Track4D-derived output (a design decision recorded in `DESIGN.md`).

use grape_math::{CoordinateSystem, Heading};
use grape_store::{Atmosphere, FlightPhase, PerformanceOutput, PerformancePoint, PointOrigin, RouteDirection, Track4D};

use crate::error::{RunError, RunResult};

fn default_phase(direction: RouteDirection) -> FlightPhase {
    match direction {
        RouteDirection::Arrival => FlightPhase::Approach,
        RouteDirection::Departure => FlightPhase::Climb,
    }
}

/// Builds a [`PerformanceOutput`] directly from a [`Track4D`]'s points.
///
/// # Errors
/// Returns [`RunError::TooFewPerformancePoints`] if the track has fewer
/// than two points (already guaranteed by [`Track4D::new`] but re-checked
/// here since a degenerate track is exactly the §7 infeasibility this
/// error exists for).
pub fn assemble(track: &Track4D, atmosphere: Atmosphere, cs: &dyn CoordinateSystem) -> RunResult<PerformanceOutput> {
    let points = track.points();
    if points.len() < 2 {
        return Err(RunError::TooFewPerformancePoints { found: points.len() });
    }

    let headings: Vec<Heading> = (0..points.len())
        .map(|i| {
            if i + 1 < points.len() {
                cs.heading_start(points[i].position, points[i + 1].position)
            } else {
                cs.heading_end(points[i - 1].position, points[i].position)
            }
        })
        .collect();

    let mut distance_m = 0.0_f64;
    let mut keyed: Vec<(f64, PerformancePoint)> = Vec::with_capacity(points.len());

    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            let step = cs.distance(points[i - 1].position, p.position).as_meters();
            // Guards strict monotonicity (§3 invariant) against two points at
            // the same position; real steps are always far larger than this floor.
            distance_m += step.max(1e-6);
        }

        let groundspeed = p.true_airspeed - atmosphere.headwind(headings[i]);
        keyed.push((
            distance_m,
            PerformancePoint {
                time_tai_s: p.time_tai_s,
                phase: default_phase(track.direction()),
                position: p.position,
                altitude_msl: p.altitude_msl,
                true_airspeed: p.true_airspeed,
                groundspeed,
                corr_net_thrust_per_engine: p.corr_net_thrust_per_engine,
                bank_angle: p.bank_angle,
                fuel_flow_per_engine: 0.0,
                origin: PointOrigin::FromBoth,
            },
        ));
    }

    PerformanceOutput::new(keyed).map_err(|_| RunError::TooFewPerformancePoints { found: points.len() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use grape_math::{Angle, GeoPoint, Length, TempDelta, Wgs84Geodesic};
    use grape_store::{
        LateralDirectivity, NoiseAircraft, NoiseSpectrum, NpdTable, StartOfRollMode, Track4DPoint,
    };

    use super::*;

    fn table() -> NpdTable {
        NpdTable::new([10_000.0; 10].into_iter().enumerate().map(|(i, v)| v + i as f64 * 1_000.0).collect::<Vec<_>>().try_into().unwrap(), [[80.0; 10]; 10]).unwrap()
    }

    fn noise_aircraft() -> Arc<NoiseAircraft> {
        Arc::new(NoiseAircraft::new(
            "track-test".into(),
            table(),
            table(),
            table(),
            table(),
            NoiseSpectrum { levels_db: [70.0; 24] },
            NoiseSpectrum { levels_db: [70.0; 24] },
            LateralDirectivity::WingMounted,
            StartOfRollMode::Jet,
        ))
    }

    #[test]
    fn track_becomes_strictly_increasing_performance_output() {
        let points = vec![
            Track4DPoint {
                time_tai_s: 0,
                position: GeoPoint::new(0.0, 0.0),
                altitude_msl: Length::meters(500.0),
                true_airspeed: 120.0,
                bank_angle: Angle::ZERO,
                corr_net_thrust_per_engine: 40_000.0,
            },
            Track4DPoint {
                time_tai_s: 10,
                position: GeoPoint::new(0.01, 0.0),
                altitude_msl: Length::meters(520.0),
                true_airspeed: 122.0,
                bank_angle: Angle::ZERO,
                corr_net_thrust_per_engine: 40_000.0,
            },
            Track4DPoint {
                time_tai_s: 20,
                position: GeoPoint::new(0.02, 0.0),
                altitude_msl: Length::meters(540.0),
                true_airspeed: 124.0,
                bank_angle: Angle::ZERO,
                corr_net_thrust_per_engine: 40_000.0,
            },
        ];
        let track = Track4D::new(noise_aircraft(), points, RouteDirection::Arrival, 1).unwrap();
        let atmosphere = Atmosphere::new(TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap();
        let cs = Wgs84Geodesic::new();

        let output = assemble(&track, atmosphere, &cs).unwrap();
        assert_eq!(output.len(), 3);
        let mut prev = -1.0;
        for (distance, point) in output.iter() {
            assert!(distance > prev);
            prev = distance;
            assert_relative_eq!(point.fuel_flow_per_engine, 0.0);
        }
    }
}
