use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The standardized NPD distance ladder, in meters (§6, Doc29 Volume 2
/// Appendix D). Every [`NpdTable`] is defined at exactly these ten distances.
pub const STANDARDIZED_DISTANCES_M: [f64; 10] =
    [61.0, 122.0, 244.0, 488.0, 1_024.0, 2_048.0, 4_096.0, 8_192.0, 16_384.0, 25_000.0];

/// The 24 one-third-octave nominal center frequencies, in Hz (§6), 50 Hz to 10 kHz.
pub const THIRD_OCTAVE_BANDS_HZ: [f64; 24] = [
    50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1_000.0,
    1_250.0, 1_600.0, 2_000.0, 2_500.0, 3_150.0, 4_000.0, 5_000.0, 6_300.0, 8_000.0, 10_000.0,
];

/// A-weighting correction at each of the [`THIRD_OCTAVE_BANDS_HZ`], in dB (§6, §4.9 step 8).
pub const A_WEIGHTS_DB: [f64; 24] = [
    -30.2, -26.2, -22.5, -19.1, -16.1, -13.4, -10.9, -8.6, -6.6, -4.8, -3.2, -1.9, -0.8, 0.0, 0.6,
    1.0, 1.2, 1.3, 1.2, 1.0, 0.5, -0.1, -1.1, -2.5,
];

/// Standard average atmospheric attenuation rate at each of the
/// [`THIRD_OCTAVE_BANDS_HZ`], in dB/m (§6, SAE ARP 866A reference atmosphere).
pub const STANDARD_ATTENUATION_DB_PER_M: [f64; 24] = [
    0.0001, 0.0002, 0.0004, 0.0005, 0.0007, 0.0009, 0.0012, 0.0016, 0.0020, 0.0024, 0.0030, 0.0037,
    0.0048, 0.0064, 0.0089, 0.0120, 0.0160, 0.0200, 0.0290, 0.0400, 0.0570, 0.0830, 0.1430, 0.2710,
];

/// A noise-power-distance table (component H): 10 tabulated thrust values ×
/// the 10 [`STANDARDIZED_DISTANCES_M`] (§3, §4.8). Rows are thrust-ordered
/// ascending; each row holds one dB level per standardized distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NpdTable {
    thrust_values_n: [f64; 10],
    levels_db:       [[f64; 10]; 10],
}

impl NpdTable {
    /// Builds an NPD table.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if `thrust_values_n` is not strictly increasing.
    pub fn new(thrust_values_n: [f64; 10], levels_db: [[f64; 10]; 10]) -> Result<Self, ValidationError> {
        if thrust_values_n.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ValidationError::MustBePositive {
                field: "NPD thrust axis must be strictly increasing",
                value: 0.0,
            });
        }
        Ok(Self { thrust_values_n, levels_db })
    }

    #[must_use]
    pub fn thrust_values_n(&self) -> [f64; 10] { self.thrust_values_n }

    #[must_use]
    pub fn levels_db(&self) -> &[[f64; 10]; 10] { &self.levels_db }
}

/// Lateral engine-installation directivity (§3, §4.9 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum LateralDirectivity {
    WingMounted,
    FuselageMounted,
    Propeller,
}

/// Start-of-roll correction applicability for departures (§3, §4.9 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum StartOfRollMode {
    None,
    Jet,
    Turboprop,
}

/// A one-third-octave reference spectrum: 24 band levels, in dB, used by the
/// atmospheric-absorption remapping in §4.9 step 8 (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NoiseSpectrum {
    pub levels_db: [f64; 24],
}

/// A noise aircraft definition (§3): four NPD tables and the corrections
/// needed to use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NoiseAircraft {
    name: String,

    arrival_sel:   NpdTable,
    arrival_lamax: NpdTable,
    departure_sel:   NpdTable,
    departure_lamax: NpdTable,

    arrival_reference_spectrum:   NoiseSpectrum,
    departure_reference_spectrum: NoiseSpectrum,

    lateral_directivity: LateralDirectivity,
    start_of_roll:       StartOfRollMode,
}

impl NoiseAircraft {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        arrival_sel: NpdTable,
        arrival_lamax: NpdTable,
        departure_sel: NpdTable,
        departure_lamax: NpdTable,
        arrival_reference_spectrum: NoiseSpectrum,
        departure_reference_spectrum: NoiseSpectrum,
        lateral_directivity: LateralDirectivity,
        start_of_roll: StartOfRollMode,
    ) -> Self {
        Self {
            name,
            arrival_sel,
            arrival_lamax,
            departure_sel,
            departure_lamax,
            arrival_reference_spectrum,
            departure_reference_spectrum,
            lateral_directivity,
            start_of_roll,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn arrival_sel(&self) -> &NpdTable { &self.arrival_sel }

    #[must_use]
    pub fn arrival_lamax(&self) -> &NpdTable { &self.arrival_lamax }

    #[must_use]
    pub fn departure_sel(&self) -> &NpdTable { &self.departure_sel }

    #[must_use]
    pub fn departure_lamax(&self) -> &NpdTable { &self.departure_lamax }

    #[must_use]
    pub fn arrival_reference_spectrum(&self) -> NoiseSpectrum { self.arrival_reference_spectrum }

    #[must_use]
    pub fn departure_reference_spectrum(&self) -> NoiseSpectrum { self.departure_reference_spectrum }

    #[must_use]
    pub fn lateral_directivity(&self) -> LateralDirectivity { self.lateral_directivity }

    #[must_use]
    pub fn start_of_roll(&self) -> StartOfRollMode { self.start_of_roll }
}
