/// A caller-supplied value was out of range at construction time (§7
/// Validation). The caller should reject the edit and retain the previous
/// value; this error is never raised at compute time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    MustBeNonNegative { field: &'static str, value: f64 },

    #[error("{field} must be strictly negative, got {value}")]
    MustBeNegative { field: &'static str, value: f64 },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },

    #[error("longitude must be in [-180, 180], got {value}")]
    LongitudeOutOfRange { value: f64 },

    #[error("latitude must be in [-90, 90], got {value}")]
    LatitudeOutOfRange { value: f64 },

    #[error("heading must be in [0, 360), got {value}")]
    HeadingOutOfRange { value: f64 },

    #[error("{entity} requires at least one {kind} coefficient set")]
    MissingRequiredCoefficients { entity: &'static str, kind: &'static str },

    #[error("{what} must not be empty")]
    EmptyCollection { what: &'static str },

    #[error("engine count must be in 1..=4, got {value}")]
    EngineCountOutOfRange { value: u8 },

    #[error("the first RNP step cannot be radius-to-fix")]
    FirstRnpStepIsRadiusToFix,

    #[error("thrust model is missing the {rating:?} rating required for this operation")]
    MissingRating { rating: super::Rating },

    #[error("no aerodynamic coefficient set named {name:?}")]
    UnknownCoefficientSet { name: String },

    #[error("coefficient set {name:?} is of type {actual:?}, expected {expected:?}")]
    CoefficientKindMismatch { name: String, expected: super::AeroCoefficientsKind, actual: super::AeroCoefficientsKind },

    #[error("coefficient set {name:?} is still referenced by {count} profile(s)")]
    CoefficientSetInUse { name: String, count: usize },

    #[error("a departure profile's first step must be Takeoff")]
    FirstDepartureStepNotTakeoff,

    #[error("an arrival procedural profile must have exactly one DescendLand step")]
    DescendLandStepCount { found: usize },

    #[error("GroundDecelerate steps may only follow the DescendLand step")]
    GroundDecelerateBeforeLanding,

    #[error("{field} must be in ({min}, {max}], got {value}")]
    OutOfRangeExclusiveMin { field: &'static str, value: f64, min: f64, max: f64 },
}
