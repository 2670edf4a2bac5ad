//! The noise-run driver (component K, §4.11): iterates the noise generator
//! (component I) over every (segment, receptor) pair of an operation's
//! [`PerformanceOutput`], accumulating LAMAX (max) and SEL (energy sum).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use grape_math::CoordinateSystem;
use grape_store::{NoiseAircraft, NoiseResult, NoiseRunOutput, PerformanceOutput, Receptor, RouteDirection};
use rayon::prelude::*;
use tracing::warn;

use crate::config::RunConfig;
use crate::npd::{self, NpdDelta};
use crate::noise_generator::NoiseGenerator;

/// A caller-supplied deviation from the Doc29 standard reference atmosphere
/// for one operation (§4.9 step 8): per-one-third-octave-band attenuation
/// rates, e.g. from SAE ARP 5534 at a specified temperature and humidity.
/// This core does not derive attenuation rates from temperature/humidity
/// itself (an Open Question resolution, recorded in `DESIGN.md`); it only
/// remaps an already-resolved rate vector onto the NPD distance ladder.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphericAbsorptionOverride {
    pub attenuation_db_per_m: [f64; 24],
}

/// Component K: evaluates the noise generator across every (operation,
/// receptor) pair. Each call owns its own [`NoiseGenerator`] instance — the
/// mutable NPD-delta state is never shared across threads (§5, §9).
pub struct NoiseRunDriver {
    config: RunConfig,
    cs:     Arc<dyn CoordinateSystem>,
}

impl NoiseRunDriver {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let cs = config.coordinate_system.build();
        Self { config, cs }
    }

    /// Runs the noise generator over one operation's performance output
    /// against every receptor, accumulating LAMAX/SEL per receptor (§4.11).
    ///
    /// Atmospheric-absorption precomputation (§4.9 step 8) happens once
    /// here, before the receptor loop, and its deltas are shared across
    /// every receptor of this operation via the single [`NoiseGenerator`]
    /// instance (§4.11 "performed once per operation").
    #[must_use]
    pub fn run_operation(
        &self,
        performance: &PerformanceOutput,
        noise_aircraft: &NoiseAircraft,
        direction: RouteDirection,
        receptors: &[Receptor],
        atmosphere_override: Option<AtmosphericAbsorptionOverride>,
    ) -> NoiseRunOutput {
        let mut generator = NoiseGenerator::new(noise_aircraft, direction, self.config.receptor_max_distance_m);

        if let Some(over) = atmosphere_override {
            let reference_spectrum = match direction {
                RouteDirection::Arrival => noise_aircraft.arrival_reference_spectrum(),
                RouteDirection::Departure => noise_aircraft.departure_reference_spectrum(),
            };
            let delta: NpdDelta = npd::atmospheric_absorption_delta(
                &reference_spectrum.levels_db,
                &grape_store::STANDARD_ATTENUATION_DB_PER_M,
                &over.attenuation_db_per_m,
                &grape_store::A_WEIGHTS_DB,
            );
            generator.set_atmospheric_absorption(delta);
        }

        let mut output = NoiseRunOutput::new();
        for receptor in receptors {
            if let Some(result) = self.receptor_noise(performance, &generator, receptor) {
                output.set(receptor.name().to_owned(), result);
            } else {
                warn!(
                    receptor = receptor.name(),
                    "no segment of this operation came within the configured receptor max distance"
                );
            }
        }
        output
    }

    fn receptor_noise(
        &self,
        performance: &PerformanceOutput,
        generator: &NoiseGenerator,
        receptor: &Receptor,
    ) -> Option<NoiseResult> {
        let mut lamax = f64::NEG_INFINITY;
        let mut sel_energy = 0.0_f64;
        let mut any_segment_in_range = false;

        for ((d1, p1), (d2, p2)) in performance.segments() {
            let segment_length_m = d2 - d1;
            if let Some((segment_lamax, segment_sel)) =
                generator.segment_noise(self.cs.as_ref(), p1, p2, segment_length_m, receptor)
            {
                any_segment_in_range = true;
                lamax = lamax.max(segment_lamax);
                sel_energy += 10.0_f64.powf(segment_sel / 10.0);
            }
        }

        if !any_segment_in_range {
            return None;
        }
        let sel = 10.0 * sel_energy.log10();
        Some(NoiseResult { lamax, sel })
    }

    /// Runs every `(operation performance output, receptor set)` pair in
    /// `runs`, embarrassingly parallel at operation granularity like the
    /// performance-run driver (§4.11, §5). `cancel` is polled between
    /// operations.
    pub fn run_all<'a>(
        &self,
        runs: &[(&'a PerformanceOutput, &'a NoiseAircraft, RouteDirection, Option<AtmosphericAbsorptionOverride>)],
        receptors: &[Receptor],
        cancel: &AtomicBool,
    ) -> Vec<Option<NoiseRunOutput>> {
        runs.par_iter()
            .map(|(performance, noise_aircraft, direction, atmosphere_override)| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                Some(self.run_operation(performance, noise_aircraft, *direction, receptors, *atmosphere_override))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use grape_math::{Angle, GeoPoint, Length};
    use grape_store::{FlightPhase, LateralDirectivity, NoiseSpectrum, NpdTable, PerformancePoint, PointOrigin, StartOfRollMode};

    use super::*;

    fn flat_table(level_db: f64) -> NpdTable {
        let thrusts = [10_000.0, 20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0, 100_000.0];
        NpdTable::new(thrusts, [[level_db; 10]; 10]).unwrap()
    }

    fn noise_aircraft() -> NoiseAircraft {
        NoiseAircraft::new(
            "test".into(),
            flat_table(90.0),
            flat_table(95.0),
            flat_table(90.0),
            flat_table(95.0),
            NoiseSpectrum { levels_db: [70.0; 24] },
            NoiseSpectrum { levels_db: [70.0; 24] },
            LateralDirectivity::WingMounted,
            StartOfRollMode::None,
        )
    }

    fn level_point(distance_m: f64, thrust_n: f64) -> (f64, PerformancePoint) {
        (
            distance_m,
            PerformancePoint {
                time_tai_s: (distance_m / 80.0) as i64,
                phase: FlightPhase::Climb,
                position: GeoPoint::new(0.0, distance_m / 111_320.0),
                altitude_msl: Length::meters(500.0),
                true_airspeed: 80.0,
                groundspeed: 80.0,
                corr_net_thrust_per_engine: thrust_n,
                bank_angle: Angle::ZERO,
                fuel_flow_per_engine: 0.0,
                origin: PointOrigin::FromBoth,
            },
        )
    }

    #[test]
    fn lamax_never_exceeds_operation_lamax_for_any_segment() {
        let points = vec![level_point(0.0, 40_000.0), level_point(500.0, 40_000.0), level_point(1_000.0, 40_000.0)];
        let performance = PerformanceOutput::new(points).unwrap();
        let aircraft = noise_aircraft();
        let receptor = Receptor::new("R1".into(), GeoPoint::new(0.0, 0.002), Length::ZERO);
        let driver = NoiseRunDriver::new(RunConfig::default());

        let generator = NoiseGenerator::new(&aircraft, RouteDirection::Departure, driver.config.receptor_max_distance_m);
        let mut per_segment_lamax = Vec::new();
        for ((d1, p1), (d2, p2)) in performance.segments() {
            if let Some((lamax, _sel)) = generator.segment_noise(driver.cs.as_ref(), p1, p2, d2 - d1, &receptor) {
                per_segment_lamax.push(lamax);
            }
        }

        let output = driver.run_operation(&performance, &aircraft, RouteDirection::Departure, std::slice::from_ref(&receptor), None);
        let result = output.get("R1").expect("receptor within range");
        for segment_lamax in per_segment_lamax {
            assert!(segment_lamax <= result.lamax + 1e-9);
        }
    }

    #[test]
    fn receptor_beyond_max_distance_is_skipped_not_panicked() {
        let points = vec![level_point(0.0, 40_000.0), level_point(1_000.0, 40_000.0)];
        let performance = PerformanceOutput::new(points).unwrap();
        let aircraft = noise_aircraft();
        let far_receptor = Receptor::new("FAR".into(), GeoPoint::new(10.0, 10.0), Length::ZERO);
        let mut config = RunConfig::default();
        config.receptor_max_distance_m = 25_000.0;
        let driver = NoiseRunDriver::new(config);

        let output = driver.run_operation(&performance, &aircraft, RouteDirection::Departure, std::slice::from_ref(&far_receptor), None);
        assert!(output.get("FAR").is_none());
    }

    #[test]
    fn cancellation_before_start_skips_remaining_operations() {
        let points = vec![level_point(0.0, 40_000.0), level_point(1_000.0, 40_000.0)];
        let performance = PerformanceOutput::new(points).unwrap();
        let aircraft = noise_aircraft();
        let receptor = Receptor::new("R1".into(), GeoPoint::new(0.0, 0.002), Length::ZERO);
        let driver = NoiseRunDriver::new(RunConfig::default());
        let cancel = AtomicBool::new(true);

        let runs = vec![(&performance, &aircraft, RouteDirection::Departure, None)];
        let results = driver.run_all(&runs, std::slice::from_ref(&receptor), &cancel);
        assert!(results[0].is_none());
    }
}
