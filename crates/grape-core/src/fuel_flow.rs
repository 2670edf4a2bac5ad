//! The fuel-flow hook (component G, §4.7): a strategy object invoked once
//! per operation by the performance assembler to fill each point's
//! per-engine fuel-flow field in place.
//!
//! LTO, LTO-Doc9889 and SFI implementations plug in from outside this crate
//! (§1 Deliberately out of scope); this module only specifies the contract
//! the assembler calls against.

use grape_store::{Atmosphere, Doc29Aircraft, PerformancePoint};

/// Fills the fuel-flow field of each performance-output point in place,
/// using the operation's aircraft and atmosphere (§4.7). Called exactly
/// once per operation, after all segmentation (§4.6).
pub trait FuelFlowHook: Send + Sync {
    fn apply(&self, aircraft: &Doc29Aircraft, atmosphere: Atmosphere, points: &mut [PerformancePoint]);
}

/// A hook that leaves fuel flow at zero, for callers that do not need it
/// (e.g. a noise-only run). Distinct from "no hook configured" — the
/// assembler always calls some hook (§4.6), this is just the inert one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFuelFlow;

impl FuelFlowHook for NoFuelFlow {
    fn apply(&self, _aircraft: &Doc29Aircraft, _atmosphere: Atmosphere, _points: &mut [PerformancePoint]) {}
}

#[cfg(test)]
mod tests {
    use grape_math::{Angle, GeoPoint, Length};
    use grape_store::{FlightPhase, PointOrigin};

    use super::*;

    fn sample_point() -> PerformancePoint {
        PerformancePoint {
            time_tai_s: 0,
            phase: FlightPhase::Climb,
            position: GeoPoint::new(0.0, 0.0),
            altitude_msl: Length::ZERO,
            true_airspeed: 100.0,
            groundspeed: 100.0,
            corr_net_thrust_per_engine: 50_000.0,
            bank_angle: Angle::ZERO,
            fuel_flow_per_engine: 0.0,
            origin: PointOrigin::FromBoth,
        }
    }

    #[test]
    fn no_fuel_flow_leaves_field_untouched() {
        let mut points = [sample_point()];
        points[0].fuel_flow_per_engine = 1.0;
        let atmosphere = Atmosphere::new(grape_math::TempDelta::from_kelvins(0.0), 0.0, 0.0, grape_math::Heading::NORTH).unwrap();
        let aircraft = Doc29Aircraft::new("test".into(), 2, 100_000.0, grape_math::Temp::from_celsius(30.0)).unwrap();
        NoFuelFlow.apply(&aircraft, atmosphere, &mut points);
        assert_eq!(points[0].fuel_flow_per_engine, 1.0);
    }
}
