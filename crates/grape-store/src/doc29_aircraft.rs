use std::collections::{BTreeMap, HashMap, HashSet};

use grape_math::{Angle, Length, Temp};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Identifies one of a [`Doc29Aircraft`]'s aerodynamic coefficient sets by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CoefficientSetId(pub String);

/// Identifies one of a [`Doc29Aircraft`]'s arrival or departure profiles by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ProfileId(pub String);

/// The performance state an [`AeroCoefficients`] set applies to; determines
/// which of its coefficients are mandatory (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum AeroCoefficientsKind {
    /// Mandatory: R, B, C.
    Takeoff,
    /// Mandatory: R, D.
    Land,
    /// Mandatory: R.
    Cruise,
}

/// A single aerodynamic coefficient set (§3). Field names match the Doc29
/// R/B/C/D coefficients directly; which are load-bearing depends on `kind`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct AeroCoefficients {
    pub kind: AeroCoefficientsKind,
    pub r:    f64,
    pub b:    f64,
    pub c:    f64,
    pub d:    f64,
}

impl AeroCoefficients {
    /// Builds a coefficient set, checking the coefficients `kind` requires are positive.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if a mandatory coefficient for `kind` is not positive.
    pub fn new(kind: AeroCoefficientsKind, r: f64, b: f64, c: f64, d: f64) -> Result<Self, ValidationError> {
        let check = |field: &'static str, value: f64| -> Result<(), ValidationError> {
            if value > 0.0 { Ok(()) } else { Err(ValidationError::MustBePositive { field, value }) }
        };
        check("R", r)?;
        match kind {
            AeroCoefficientsKind::Takeoff => {
                check("B", b)?;
                check("C", c)?;
            }
            AeroCoefficientsKind::Land => check("D", d)?,
            AeroCoefficientsKind::Cruise => {}
        }
        Ok(Self { kind, r, b, c, d })
    }
}

/// The Doc29 thrust ratings (§3, §4.4). The three high-temperature variants
/// are optional overrides consulted above the engine breakpoint temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum Rating {
    MaxTakeoff,
    MaxClimb,
    Idle,
    MaxTakeoffHighTemperature,
    MaxClimbHighTemperature,
    IdleHighTemperature,
}

/// Coefficients for the Doc29 rating-form thrust formula (§4.4, Doc29 Vol 2 formula B-1/B-4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RatingCoefficients {
    pub e:  f64,
    pub f:  f64,
    pub ga: f64,
    pub gb: f64,
    pub h:  f64,
}

/// Coefficients for the Doc29 propeller-form thrust formula (§4.4, formula B-5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PropellerCoefficients {
    /// Propeller efficiency, in `(0, 1]`.
    pub efficiency: f64,
    /// Net propulsive power, in Watts, `> 0`.
    pub power:      f64,
}

/// How a [`Doc29Aircraft`] computes rated corrected net thrust (§3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ThrustModel {
    None,
    Rating(BTreeMap<Rating, RatingCoefficients>),
    /// Only [`Rating::MaxTakeoff`] and [`Rating::MaxClimb`] are accepted keys.
    Propeller(BTreeMap<Rating, PropellerCoefficients>),
}

impl ThrustModel {
    /// The ratings a departure operation requires populated (§4.5, supplemented
    /// from `Doc29Thrust::departureRatings()` in the original source).
    pub const DEPARTURE_RATINGS: [Rating; 2] = [Rating::MaxTakeoff, Rating::MaxClimb];

    /// Whether coefficients are defined for `rating` (supplemented from
    /// `Doc29Thrust::isRatingSet`).
    #[must_use]
    pub fn is_rating_set(&self, rating: Rating) -> bool {
        match self {
            ThrustModel::None => false,
            ThrustModel::Rating(map) => map.contains_key(&rating),
            ThrustModel::Propeller(map) => map.contains_key(&rating),
        }
    }

    pub fn add_propeller_rating(
        &mut self,
        rating: Rating,
        efficiency: f64,
        power: f64,
    ) -> Result<(), ValidationError> {
        if !(0.0 < efficiency && efficiency <= 1.0) {
            return Err(ValidationError::OutOfRangeExclusiveMin {
                field: "propeller efficiency",
                value: efficiency,
                min: 0.0,
                max: 1.0,
            });
        }
        if power <= 0.0 {
            return Err(ValidationError::MustBePositive { field: "propeller power", value: power });
        }
        if !matches!(rating, Rating::MaxTakeoff | Rating::MaxClimb) {
            return Err(ValidationError::MissingRating { rating });
        }
        match self {
            ThrustModel::Propeller(map) => {
                map.insert(rating, PropellerCoefficients { efficiency, power });
            }
            _ => {
                let mut map = BTreeMap::new();
                map.insert(rating, PropellerCoefficients { efficiency, power });
                *self = ThrustModel::Propeller(map);
            }
        }
        Ok(())
    }

    pub fn add_rating(&mut self, rating: Rating, coeffs: RatingCoefficients) {
        match self {
            ThrustModel::Rating(map) => {
                map.insert(rating, coeffs);
            }
            _ => {
                let mut map = BTreeMap::new();
                map.insert(rating, coeffs);
                *self = ThrustModel::Rating(map);
            }
        }
    }
}

/// A point of a [`ArrivalProfile::Points`] / [`DepartureProfile::Points`] profile
/// (supplemented from `Doc29ProfileArrivalPoints`/`Doc29ProfileDeparturePoints`
/// in the original source; the distilled spec only details the procedural form,
/// but the points form is not excluded by any Non-goal).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PointsProfilePoint {
    pub altitude_afe:              Length,
    pub true_airspeed:              f64,
    pub corr_net_thrust_per_engine: f64,
}

/// One step of an arrival procedural profile (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ArrivalStep {
    DescendDecelerate {
        coefficients:       CoefficientSetId,
        start_altitude_afe: Length,
        descent_angle:      Angle,
        start_cas:          f64,
    },
    DescendIdle { start_altitude_afe: Length, descent_angle: Angle, start_cas: f64 },
    Level { coefficients: CoefficientSetId, ground_distance: Length },
    LevelDecelerate { coefficients: CoefficientSetId, ground_distance: Length, start_cas: f64 },
    LevelIdle { ground_distance: Length, start_cas: f64 },
    DescendLand {
        coefficients:                      CoefficientSetId,
        descent_angle:                     Angle,
        threshold_crossing_altitude_afe:   Length,
        touchdown_roll:                    Length,
    },
    /// Only legal after the [`ArrivalStep::DescendLand`] step (§4.5).
    GroundDecelerate { ground_distance: Length, start_cas: f64, reverse_thrust_fraction: f64 },
}

/// One step of a departure procedural profile (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum DepartureStep {
    /// Must be the first and only `Takeoff` step of a profile.
    Takeoff { coefficients: CoefficientSetId, initial_cas: f64 },
    Climb { coefficients: CoefficientSetId, end_altitude_afe: Length },
    ClimbAccelerate { coefficients: CoefficientSetId, end_cas: f64, climb_rate: f64 },
    ClimbAcceleratePercentage { coefficients: CoefficientSetId, end_cas: f64, acceleration_fraction: f64 },
}

/// An arrival profile: either a procedural step program or an explicit
/// points table keyed by cumulative ground distance (§3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ArrivalProfile {
    Procedural(Vec<ArrivalStep>),
    Points(BTreeMap<ordered_float::NotNan<f64>, PointsProfilePoint>),
}

/// A departure profile. The thrust-cutback index (§4.5, §4.10) only applies
/// to the procedural form; segments at or before it use max-takeoff thrust,
/// later segments use max-climb.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum DepartureProfile {
    Procedural { steps: Vec<DepartureStep>, thrust_cutback_index: usize },
    Points(BTreeMap<ordered_float::NotNan<f64>, PointsProfilePoint>),
}

/// A Doc29 aircraft definition (§3): aerodynamic coefficient sets, profiles,
/// and a thrust model, with the coefficient-use back-reference table from §9.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Doc29Aircraft {
    name:                   String,
    engine_count:           u8,
    max_sea_level_static_thrust_n: f64,
    breakpoint_temperature: Temp,

    aero_coefficients: BTreeMap<CoefficientSetId, AeroCoefficients>,
    thrust:            ThrustModel,
    arrival_profiles:   BTreeMap<ProfileId, ArrivalProfile>,
    departure_profiles: BTreeMap<ProfileId, DepartureProfile>,

    /// Deletion-block table: which profiles reference which coefficient set
    /// (§9 "cyclic back-references" design note).
    coefficient_uses: HashMap<CoefficientSetId, HashSet<ProfileId>>,
}

impl Doc29Aircraft {
    /// Builds an aircraft with no coefficients, profiles, or thrust model yet attached.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `engine_count` is outside `1..=4`,
    /// `max_sea_level_static_thrust_n` is not positive, or
    /// `breakpoint_temperature` is below absolute zero.
    pub fn new(
        name: String,
        engine_count: u8,
        max_sea_level_static_thrust_n: f64,
        breakpoint_temperature: Temp,
    ) -> Result<Self, ValidationError> {
        if !(1..=4).contains(&engine_count) {
            return Err(ValidationError::EngineCountOutOfRange { value: engine_count });
        }
        if max_sea_level_static_thrust_n <= 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "max sea level static thrust",
                value: max_sea_level_static_thrust_n,
            });
        }
        if breakpoint_temperature.into_kelvins() < 0.0 {
            return Err(ValidationError::MustBeNonNegative {
                field: "engine breakpoint temperature",
                value: breakpoint_temperature.into_kelvins(),
            });
        }
        Ok(Self {
            name,
            engine_count,
            max_sea_level_static_thrust_n,
            breakpoint_temperature,
            aero_coefficients: BTreeMap::new(),
            thrust: ThrustModel::None,
            arrival_profiles: BTreeMap::new(),
            departure_profiles: BTreeMap::new(),
            coefficient_uses: HashMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn engine_count(&self) -> u8 { self.engine_count }

    #[must_use]
    pub fn max_sea_level_static_thrust_n(&self) -> f64 { self.max_sea_level_static_thrust_n }

    #[must_use]
    pub fn breakpoint_temperature(&self) -> Temp { self.breakpoint_temperature }

    #[must_use]
    pub fn thrust(&self) -> &ThrustModel { &self.thrust }

    pub fn set_thrust(&mut self, thrust: ThrustModel) { self.thrust = thrust; }

    pub fn add_aero_coefficients(&mut self, name: String, coeffs: AeroCoefficients) -> CoefficientSetId {
        let id = CoefficientSetId(name);
        self.aero_coefficients.insert(id.clone(), coeffs);
        id
    }

    #[must_use]
    pub fn aero_coefficients(&self, id: &CoefficientSetId) -> Option<&AeroCoefficients> {
        self.aero_coefficients.get(id)
    }

    /// Deletes a coefficient set, refusing if it is still referenced by any profile.
    ///
    /// # Errors
    /// Returns [`ValidationError::CoefficientSetInUse`] if the back-reference
    /// table (§9) still lists a referencing profile.
    pub fn remove_aero_coefficients(&mut self, id: &CoefficientSetId) -> Result<(), ValidationError> {
        if let Some(uses) = self.coefficient_uses.get(id) {
            if !uses.is_empty() {
                return Err(ValidationError::CoefficientSetInUse { name: id.0.clone(), count: uses.len() });
            }
        }
        self.aero_coefficients.remove(id);
        Ok(())
    }

    fn check_coefficients_exist(&self, id: &CoefficientSetId) -> Result<(), ValidationError> {
        self.aero_coefficients
            .get(id)
            .map(|_| ())
            .ok_or_else(|| ValidationError::UnknownCoefficientSet { name: id.0.clone() })
    }

    fn check_coefficients(&self, id: &CoefficientSetId, expected: AeroCoefficientsKind) -> Result<(), ValidationError> {
        let coeffs = self
            .aero_coefficients
            .get(id)
            .ok_or_else(|| ValidationError::UnknownCoefficientSet { name: id.0.clone() })?;
        if coeffs.kind != expected {
            return Err(ValidationError::CoefficientKindMismatch { name: id.0.clone(), expected, actual: coeffs.kind });
        }
        Ok(())
    }

    /// Attaches an arrival profile, validating referenced coefficient sets
    /// and (for procedural profiles) the step-ordering invariants of §4.5.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if a referenced coefficient set is
    /// missing or of the wrong kind, if a procedural profile does not have
    /// exactly one [`ArrivalStep::DescendLand`] step, or if a
    /// [`ArrivalStep::GroundDecelerate`] step appears before it.
    pub fn add_arrival_profile(&mut self, name: String, profile: ArrivalProfile) -> Result<ProfileId, ValidationError> {
        if let ArrivalProfile::Procedural(steps) = &profile {
            let landings = steps.iter().filter(|s| matches!(s, ArrivalStep::DescendLand { .. })).count();
            if landings != 1 {
                return Err(ValidationError::DescendLandStepCount { found: landings });
            }
            let mut past_landing = false;
            for step in steps {
                match step {
                    ArrivalStep::DescendLand { .. } => past_landing = true,
                    ArrivalStep::GroundDecelerate { .. } if !past_landing => {
                        return Err(ValidationError::GroundDecelerateBeforeLanding);
                    }
                    _ => {}
                }
            }
            for step in steps {
                match step {
                    ArrivalStep::DescendDecelerate { coefficients, .. }
                    | ArrivalStep::Level { coefficients, .. }
                    | ArrivalStep::LevelDecelerate { coefficients, .. } => {
                        self.check_coefficients_exist(coefficients)?;
                    }
                    ArrivalStep::DescendLand { coefficients, .. } => {
                        self.check_coefficients(coefficients, AeroCoefficientsKind::Land)?;
                    }
                    ArrivalStep::DescendIdle { .. }
                    | ArrivalStep::LevelIdle { .. }
                    | ArrivalStep::GroundDecelerate { .. } => {}
                }
            }
        }
        let id = ProfileId(name);
        self.register_coefficient_uses(&id, &profile);
        self.arrival_profiles.insert(id.clone(), profile);
        Ok(id)
    }

    /// Attaches a departure profile, validating that the first step is
    /// [`DepartureStep::Takeoff`], that referenced coefficient sets exist,
    /// and that the thrust model has both [`Rating::MaxTakeoff`] and
    /// [`Rating::MaxClimb`] populated (§4.5).
    ///
    /// # Errors
    /// Returns [`ValidationError`] on any of the above.
    pub fn add_departure_profile(
        &mut self,
        name: String,
        profile: DepartureProfile,
    ) -> Result<ProfileId, ValidationError> {
        let steps: &[DepartureStep] = match &profile {
            DepartureProfile::Procedural { steps, .. } => steps,
            DepartureProfile::Points(_) => &[],
        };
        if let DepartureProfile::Procedural { steps, .. } = &profile {
            if !matches!(steps.first(), Some(DepartureStep::Takeoff { .. })) {
                return Err(ValidationError::FirstDepartureStepNotTakeoff);
            }
            for rating in ThrustModel::DEPARTURE_RATINGS {
                if !self.thrust.is_rating_set(rating) {
                    return Err(ValidationError::MissingRating { rating });
                }
            }
        }
        for step in steps {
            match step {
                DepartureStep::Takeoff { coefficients, .. } => {
                    self.check_coefficients(coefficients, AeroCoefficientsKind::Takeoff)?;
                }
                DepartureStep::Climb { coefficients, .. }
                | DepartureStep::ClimbAccelerate { coefficients, .. }
                | DepartureStep::ClimbAcceleratePercentage { coefficients, .. } => {
                    self.check_coefficients_exist(coefficients)?;
                }
            }
        }
        let id = ProfileId(name);
        self.register_coefficient_uses(&id, &profile);
        self.departure_profiles.insert(id.clone(), profile);
        Ok(id)
    }

    fn register_coefficient_uses(&mut self, profile_id: &ProfileId, profile: &impl ReferencedCoefficients) {
        for coeff_id in profile.referenced_coefficients() {
            self.coefficient_uses.entry(coeff_id).or_default().insert(profile_id.clone());
        }
    }

    #[must_use]
    pub fn arrival_profile(&self, id: &ProfileId) -> Option<&ArrivalProfile> { self.arrival_profiles.get(id) }

    #[must_use]
    pub fn departure_profile(&self, id: &ProfileId) -> Option<&DepartureProfile> { self.departure_profiles.get(id) }
}

/// Internal helper trait so [`Doc29Aircraft::register_coefficient_uses`] can
/// walk either profile variant's referenced coefficient sets uniformly.
trait ReferencedCoefficients {
    fn referenced_coefficients(&self) -> Vec<CoefficientSetId>;
}

impl ReferencedCoefficients for ArrivalProfile {
    fn referenced_coefficients(&self) -> Vec<CoefficientSetId> {
        match self {
            ArrivalProfile::Procedural(steps) => steps
                .iter()
                .filter_map(|step| match step {
                    ArrivalStep::DescendDecelerate { coefficients, .. }
                    | ArrivalStep::Level { coefficients, .. }
                    | ArrivalStep::LevelDecelerate { coefficients, .. }
                    | ArrivalStep::DescendLand { coefficients, .. } => Some(coefficients.clone()),
                    ArrivalStep::DescendIdle { .. }
                    | ArrivalStep::LevelIdle { .. }
                    | ArrivalStep::GroundDecelerate { .. } => None,
                })
                .collect(),
            ArrivalProfile::Points(_) => Vec::new(),
        }
    }
}

impl ReferencedCoefficients for DepartureProfile {
    fn referenced_coefficients(&self) -> Vec<CoefficientSetId> {
        match self {
            DepartureProfile::Procedural { steps, .. } => steps
                .iter()
                .map(|step| match step {
                    DepartureStep::Takeoff { coefficients, .. }
                    | DepartureStep::Climb { coefficients, .. }
                    | DepartureStep::ClimbAccelerate { coefficients, .. }
                    | DepartureStep::ClimbAcceleratePercentage { coefficients, .. } => coefficients.clone(),
                })
                .collect(),
            DepartureProfile::Points(_) => Vec::new(),
        }
    }
}
