use std::sync::Arc;

use grape_math::{CoordinateSystem, GeoPoint, LocalTangentPlane, Wgs84Geodesic};
use serde::{Deserialize, Serialize};

/// Which [`CoordinateSystem`] implementation a run uses (§4.2). Chosen once
/// per run; every run operation shares the same choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CoordinateSystemChoice {
    /// The WGS84 ellipsoid via the Karney algorithm.
    Wgs84Geodesic,
    /// A Cartesian projection centered at `anchor`.
    LocalTangentPlane { anchor: GeoPoint },
}

impl Default for CoordinateSystemChoice {
    fn default() -> Self { Self::Wgs84Geodesic }
}

impl CoordinateSystemChoice {
    #[must_use]
    pub fn build(self) -> Arc<dyn CoordinateSystem> {
        match self {
            CoordinateSystemChoice::Wgs84Geodesic => Arc::new(Wgs84Geodesic::new()),
            CoordinateSystemChoice::LocalTangentPlane { anchor } => Arc::new(LocalTangentPlane::new(anchor)),
        }
    }
}

/// Tunables threaded through the route expander, profile expander, and
/// performance assembler (§4.2-§4.6). Defaults match the values §4 states
/// explicitly; load overrides from a study file with `toml`, the same
/// division of labor `jet1090` uses between its library and its config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub coordinate_system: CoordinateSystemChoice,

    /// Angular step used to discretize turns into polyline points, in degrees (§4.3).
    pub arc_interval_degrees: f64,
    /// Residual-angle threshold above which a final exact-heading arc point
    /// is appended, in degrees (§4.3).
    pub arc_angle_threshold_degrees: f64,
    /// Chord-distance threshold above which a final exact-heading arc point
    /// is appended, in meters (§4.3).
    pub arc_distance_threshold_m: f64,
    /// RNP heading-change warning threshold, in degrees (§4.3).
    pub rnp_heading_change_warning_degrees: f64,
    /// Tolerance for RNP radius-to-fix dual-radius mismatch warnings, in meters (§4.3).
    pub rnp_radius_mismatch_warning_m: f64,

    /// Perpendicular-intersection convergence threshold, in meters (§4.2).
    pub intersection_precision_m: f64,
    /// Tie-break neighborhood for Behind/Between/Ahead classification, in meters (§4.2).
    pub endpoint_tie_break_m: f64,

    /// Speed-segmentation threshold: adjacent groundspeeds differing by more
    /// than this trigger intermediate points, in m/s (§4.6).
    pub speed_segmentation_delta_v_mps: f64,
    /// Ground-distance filter minimum spacing, in meters (§4.6).
    pub min_ground_distance_m: f64,

    /// Maximum segment-to-receptor distance beyond which a segment is
    /// skipped entirely, in meters (§4.9).
    pub receptor_max_distance_m: f64,
}

impl RunConfig {
    /// Parses a study's config overrides from TOML (§6 "Persistence... used
    /// by the caller"), falling back to [`RunConfig::default`] for any field
    /// the document omits, the same `serde(default)` + `toml` division of
    /// labor `jet1090` uses between its library defaults and its config file.
    ///
    /// # Errors
    /// Returns the underlying `toml` parse error on malformed input.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            coordinate_system: CoordinateSystemChoice::default(),
            arc_interval_degrees: 10.0,
            arc_angle_threshold_degrees: 1.0,
            arc_distance_threshold_m: 1.0,
            rnp_heading_change_warning_degrees: 90.0,
            rnp_radius_mismatch_warning_m: 10.0,
            intersection_precision_m: 1e-6,
            endpoint_tie_break_m: 0.05,
            speed_segmentation_delta_v_mps: 10.0,
            min_ground_distance_m: 10.0,
            receptor_max_distance_m: 25_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_override_keeps_unset_fields_at_default() {
        let config = RunConfig::from_toml_str("min_ground_distance_m = 25.0\n").unwrap();
        assert_eq!(config.min_ground_distance_m, 25.0);
        assert_eq!(config.arc_interval_degrees, RunConfig::default().arc_interval_degrees);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(RunConfig::from_toml_str("arc_interval_degrees = \"not a number\"").is_err());
    }
}
