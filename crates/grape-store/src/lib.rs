//! Value objects for the GRAPE computational core (§3 of the data model).
//!
//! Everything here is validated at construction time: an object that exists
//! is an object that satisfies its invariants. Construction failures surface
//! as [`ValidationError`]; there is no other way to build an invalid value.
//! `grape-core` consumes these types but never mutates them mid-run.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod error;
pub use error::ValidationError;

mod atmosphere;
pub use atmosphere::Atmosphere;

mod airport;
pub use airport::Airport;

mod runway;
pub use runway::Runway;

mod route;
pub use route::{RnpStep, Route, RouteDirection, Vector};

mod doc29_aircraft;
pub use doc29_aircraft::{
    AeroCoefficients, AeroCoefficientsKind, ArrivalProfile, ArrivalStep, CoefficientSetId,
    DepartureProfile, DepartureStep, Doc29Aircraft, PointsProfilePoint, ProfileId,
    PropellerCoefficients, Rating, RatingCoefficients, ThrustModel,
};

mod noise_aircraft;
pub use noise_aircraft::{
    LateralDirectivity, NoiseAircraft, NoiseSpectrum, NpdTable, StartOfRollMode,
    A_WEIGHTS_DB, STANDARDIZED_DISTANCES_M, STANDARD_ATTENUATION_DB_PER_M, THIRD_OCTAVE_BANDS_HZ,
};

mod operation;
pub use operation::{DepartureDerate, Flight, Operation, Track4D, Track4DPoint};

mod performance_output;
pub use performance_output::{
    FlightPhase, PerformanceOutput, PerformancePoint, PointOrigin,
};

mod noise_run_output;
pub use noise_run_output::{NoiseResult, NoiseRunOutput, ReceptorId};

mod receptor;
pub use receptor::Receptor;
