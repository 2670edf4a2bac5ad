/// An infeasibility (§7): inputs are self-consistent but the procedure
/// cannot satisfy them. Raised during expansion/assembly, never at
/// construction time (that's [`grape_store::ValidationError`]'s job).
/// Action on receipt: log at error level, return no output for the
/// affected operation, and continue the run (§7, §5).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunError {
    #[error("climb-accelerate cannot reach target CAS: acceleration factor {accel_factor:.4} leaves no margin over climb gradient {climb_gradient:.4}")]
    ClimbAccelerateCasUnreachable { accel_factor: f64, climb_gradient: f64 },

    #[error("performance output has fewer than 2 points after segmentation/filtering ({found} remain)")]
    TooFewPerformancePoints { found: usize },

    #[error("procedural arrival profile requires at least one land aerodynamic coefficient set")]
    MissingLandCoefficients,

    #[error("procedural departure profile requires at least one takeoff aerodynamic coefficient set")]
    MissingTakeoffCoefficients,

    #[error("thrust model has no rating set for {rating:?}")]
    MissingThrustRating { rating: grape_store::Rating },

    #[error("route expansion produced no points")]
    EmptyRouteOutput,

    #[error("flight references profile id {id:?} which is not attached to its aircraft")]
    UnknownProfile { id: grape_store::ProfileId },

    #[error("operation was cancelled before completion")]
    Cancelled,
}

pub type RunResult<T> = Result<T, RunError>;
