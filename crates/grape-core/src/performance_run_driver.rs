//! The performance-run driver (component J, §4.10): orchestrates the route
//! expander, profile expander, performance assembler and fuel-flow hook
//! across every operation of a scenario, memoizing route expansions and
//! publishing results under the run's output store (§5, §6).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use grape_math::CoordinateSystem;
use grape_store::{Atmosphere, Flight, Operation, PerformanceOutput, Route, RouteDirection};
use rayon::prelude::*;

use crate::config::RunConfig;
use crate::error::{RunError, RunResult};
use crate::fuel_flow::FuelFlowHook;
use crate::profile::{self, FlightContext};
use crate::route_expander::{self, RouteOutput};
use crate::performance_assembler::{self, AssemblyInput};

/// Resolves the [`Atmosphere`] to use for one operation (§4.1, §4.6). A
/// scenario's weather is external to this core; callers supply it through
/// this hook the same way fuel flow is supplied through
/// [`FuelFlowHook`] — a strategy object invoked by the driver rather than a
/// field baked into [`Operation`].
pub trait AtmosphereSource: Send + Sync {
    fn atmosphere_for(&self, operation: &Operation) -> Atmosphere;
}

/// An [`AtmosphereSource`] that always returns the same atmosphere,
/// sufficient for a single-weather run.
#[derive(Debug, Clone, Copy)]
pub struct ConstantAtmosphere(pub Atmosphere);

impl AtmosphereSource for ConstantAtmosphere {
    fn atmosphere_for(&self, _operation: &Operation) -> Atmosphere { self.0 }
}

/// The driver's coarse-grained lifecycle state (§6 `progress()`/`status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Waiting,
    Running,
    Finished,
    Stopped,
}

/// A progress snapshot: `done / total` operations, plus [`RunStatus`] (§6).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub done:   usize,
    pub total:  usize,
    pub status: RunStatus,
}

/// Component J: iterates a scenario's operations, memoizing route
/// expansions and publishing a [`PerformanceOutput`] (or a [`RunError`])
/// per operation under its own output store (§4.10, §5).
///
/// Resources are acquired on construction and released on drop; there is
/// nothing to explicitly close (§5 "scoped acquisition with guaranteed
/// release").
pub struct PerformanceRunDriver {
    config: RunConfig,
    cs:     Arc<dyn CoordinateSystem>,

    /// Route expansions memoized by the identity of the symbolic [`Route`]
    /// (§4.10 step 1, §9 design note). Distinct operations sharing the same
    /// route (by `Arc` identity) expand it only once.
    route_memo: Mutex<HashMap<usize, Arc<RouteOutput>>>,

    /// The run's output store (§4.10 step 3), keyed by operation index in
    /// the slice passed to [`Self::run`].
    outputs: Mutex<HashMap<usize, RunResult<PerformanceOutput>>>,

    done:   AtomicUsize,
    total:  AtomicUsize,
    status: Mutex<RunStatus>,
}

impl PerformanceRunDriver {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let cs = config.coordinate_system.build();
        Self {
            config,
            cs,
            route_memo: Mutex::new(HashMap::new()),
            outputs: Mutex::new(HashMap::new()),
            done: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            status: Mutex::new(RunStatus::Ready),
        }
    }

    /// `(done_operations / total_operations)` and the current [`RunStatus`] (§6).
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            done: self.done.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            status: *self.status.lock().expect("status mutex poisoned"),
        }
    }

    /// Runs every operation in `operations`, embarrassingly parallel at
    /// operation granularity (§5). `cancel` is polled at operation
    /// boundaries: once set, a worker finishes whatever operation it
    /// started and then stops picking up new ones; operations already
    /// completed remain in the output store (§5, §6).
    ///
    /// Returns the per-operation results in `operations` order.
    pub fn run(
        &self,
        operations: &[Operation],
        atmosphere_source: &dyn AtmosphereSource,
        fuel_hook: &dyn FuelFlowHook,
        cancel: &AtomicBool,
    ) -> Vec<RunResult<PerformanceOutput>> {
        self.total.store(operations.len(), Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        *self.status.lock().expect("status mutex poisoned") = RunStatus::Running;

        operations.par_iter().enumerate().for_each(|(index, operation)| {
            if cancel.load(Ordering::Relaxed) {
                self.publish(index, Err(RunError::Cancelled));
                return;
            }
            let atmosphere = atmosphere_source.atmosphere_for(operation);
            let result = self.process_operation(operation, atmosphere, fuel_hook);
            self.publish(index, result);
            self.done.fetch_add(1, Ordering::Relaxed);
            if cancel.load(Ordering::Relaxed) {
                *self.status.lock().expect("status mutex poisoned") = RunStatus::Stopped;
            }
        });

        let mut status = self.status.lock().expect("status mutex poisoned");
        if *status == RunStatus::Running {
            *status = RunStatus::Finished;
        }
        drop(status);

        let outputs = self.outputs.lock().expect("output store mutex poisoned");
        (0..operations.len())
            .map(|index| {
                outputs.get(&index).cloned().unwrap_or_else(|| Err(RunError::EmptyRouteOutput))
            })
            .collect()
    }

    fn publish(&self, index: usize, result: RunResult<PerformanceOutput>) {
        self.outputs.lock().expect("output store mutex poisoned").insert(index, result);
    }

    fn process_operation(
        &self,
        operation: &Operation,
        atmosphere: Atmosphere,
        fuel_hook: &dyn FuelFlowHook,
    ) -> RunResult<PerformanceOutput> {
        match operation {
            Operation::Flight(flight) => self.process_flight(flight, atmosphere, fuel_hook),
            Operation::Track4D(track) => crate::track4d::assemble(track, atmosphere, self.cs.as_ref()),
        }
    }

    fn process_flight(
        &self,
        flight: &Flight,
        atmosphere: Atmosphere,
        fuel_hook: &dyn FuelFlowHook,
    ) -> RunResult<PerformanceOutput> {
        let direction = flight.route.direction();
        let route_output = self.route_output(&flight.route, &flight.runway);

        let ctx = FlightContext {
            aircraft: &flight.aircraft,
            weight_n: flight.weight_n(),
            atmosphere,
            runway_elevation: flight.runway.elevation(),
            runway_heading: flight.runway.heading(),
            route: &route_output,
            derate: flight.derate(),
        };

        let profile_output = match direction {
            RouteDirection::Departure => {
                let profile = flight
                    .aircraft
                    .departure_profile(&flight.profile)
                    .ok_or_else(|| RunError::UnknownProfile { id: flight.profile.clone() })?;
                profile::expand_departure(&ctx, profile)?
            }
            RouteDirection::Arrival => {
                let profile = flight
                    .aircraft
                    .arrival_profile(&flight.profile)
                    .ok_or_else(|| RunError::UnknownProfile { id: flight.profile.clone() })?;
                profile::expand_arrival(&ctx, profile)?
            }
        };

        let input = AssemblyInput {
            route: &route_output,
            profile: &profile_output,
            runway: &flight.runway,
            direction,
            atmosphere,
            anchor_time_tai_s: flight.scheduled_time_tai_s(),
            engine_count: flight.aircraft.engine_count(),
            fuel_hook,
            aircraft: &flight.aircraft,
            speed_segmentation_delta_v_mps: self.config.speed_segmentation_delta_v_mps,
            min_ground_distance_m: self.config.min_ground_distance_m,
        };
        performance_assembler::assemble(&input)
    }

    /// Expands `route` against `runway`, memoized by the route's `Arc`
    /// identity (§4.10 step 1). Coordinate systems, routes and runways are
    /// read-only during a run (§5); the memo is the only mutable state
    /// shared across operations besides the output store.
    fn route_output(&self, route: &Arc<Route>, runway: &grape_store::Runway) -> Arc<RouteOutput> {
        let key = Arc::as_ptr(route) as usize;
        if let Some(cached) = self.route_memo.lock().expect("route memo mutex poisoned").get(&key) {
            return cached.clone();
        }
        let expanded = Arc::new(route_expander::expand(route, runway, self.cs.as_ref(), &self.config));
        let mut memo = self.route_memo.lock().expect("route memo mutex poisoned");
        memo.entry(key).or_insert_with(|| expanded).clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use grape_math::{GeoPoint, Heading, Length, Temp, TempDelta};
    use grape_store::{
        Doc29Aircraft, DepartureProfile, LateralDirectivity, NoiseAircraft, NoiseSpectrum, NpdTable, PointsProfilePoint,
        Route, Runway, StartOfRollMode,
    };

    use super::*;
    use crate::fuel_flow::NoFuelFlow;

    fn flat_table() -> NpdTable {
        let thrusts = [10_000.0, 20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0, 100_000.0];
        NpdTable::new(thrusts, [[90.0; 10]; 10]).unwrap()
    }

    fn noise_aircraft() -> Arc<NoiseAircraft> {
        Arc::new(NoiseAircraft::new(
            "test-noise".into(),
            flat_table(),
            flat_table(),
            flat_table(),
            flat_table(),
            NoiseSpectrum { levels_db: [70.0; 24] },
            NoiseSpectrum { levels_db: [70.0; 24] },
            LateralDirectivity::WingMounted,
            StartOfRollMode::Jet,
        ))
    }

    fn simple_departure_flight() -> (Operation, Arc<Route>) {
        let runway = Arc::new(
            Runway::new("09".into(), GeoPoint::new(0.0, 0.0), Length::ZERO, Length::meters(3_000.0), Heading::NORTH, 0.0)
                .unwrap(),
        );
        let route = Arc::new(
            Route::point_sequence(grape_store::RouteDirection::Departure, vec![GeoPoint::new(0.0, 0.1), GeoPoint::new(0.0, 0.2)])
                .unwrap(),
        );
        let mut aircraft = Doc29Aircraft::new("A320".into(), 2, 200_000.0, Temp::from_celsius(30.0)).unwrap();
        let mut points = std::collections::BTreeMap::new();
        points.insert(
            ordered_float::NotNan::new(0.0).unwrap(),
            PointsProfilePoint { altitude_afe: Length::ZERO, true_airspeed: 70.0, corr_net_thrust_per_engine: 200_000.0 },
        );
        points.insert(
            ordered_float::NotNan::new(20_000.0).unwrap(),
            PointsProfilePoint { altitude_afe: Length::meters(3_000.0), true_airspeed: 140.0, corr_net_thrust_per_engine: 150_000.0 },
        );
        let profile_id = aircraft.add_departure_profile("climb".into(), DepartureProfile::Points(points)).unwrap();

        let flight = grape_store::Flight::new(
            Arc::new(aircraft),
            noise_aircraft(),
            runway,
            route.clone(),
            profile_id,
            700_000.0,
            1_000,
            1,
            None,
        )
        .unwrap();
        (Operation::Flight(flight), route)
    }

    #[test]
    fn run_produces_monotone_performance_output_and_finishes() {
        let driver = PerformanceRunDriver::new(RunConfig::default());
        let (operation, _route) = simple_departure_flight();
        let atmosphere = ConstantAtmosphere(Atmosphere::new(TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap());
        let hook = NoFuelFlow;
        let cancel = AtomicBool::new(false);

        let results = driver.run(std::slice::from_ref(&operation), &atmosphere, &hook, &cancel);
        assert_eq!(results.len(), 1);
        let output = results[0].as_ref().expect("expected a performance output");
        assert!(output.len() >= 2);

        let mut prev = f64::NEG_INFINITY;
        for (distance, _) in output.iter() {
            assert!(distance > prev);
            prev = distance;
        }
        assert_eq!(driver.progress().status, RunStatus::Finished);
        assert_eq!(driver.progress().done, 1);
    }

    #[test]
    fn route_expansion_is_memoized_across_operations_sharing_the_same_route() {
        let driver = PerformanceRunDriver::new(RunConfig::default());
        let (op_a, route) = simple_departure_flight();
        let Operation::Flight(flight_a) = &op_a else { unreachable!() };
        let flight_b = grape_store::Flight::new(
            flight_a.aircraft.clone(),
            flight_a.noise_aircraft.clone(),
            flight_a.runway.clone(),
            route,
            flight_a.profile.clone(),
            650_000.0,
            2_000,
            1,
            None,
        )
        .unwrap();
        let op_b = Operation::Flight(flight_b);

        let atmosphere = ConstantAtmosphere(Atmosphere::new(TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap());
        let hook = NoFuelFlow;
        let cancel = AtomicBool::new(false);

        let results = driver.run(&[op_a, op_b], &atmosphere, &hook, &cancel);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(driver.route_memo.lock().unwrap().len(), 1);
    }

    #[test]
    fn cancellation_before_start_produces_cancelled_error() {
        let driver = PerformanceRunDriver::new(RunConfig::default());
        let (operation, _route) = simple_departure_flight();
        let atmosphere = ConstantAtmosphere(Atmosphere::new(TempDelta::from_kelvins(0.0), 0.0, 0.0, Heading::NORTH).unwrap());
        let hook = NoFuelFlow;
        let cancel = AtomicBool::new(true);

        let results = driver.run(std::slice::from_ref(&operation), &atmosphere, &hook, &cancel);
        assert!(matches!(results[0], Err(RunError::Cancelled)));
    }
}
