//! Noise NPD table lookup (component H, §4.8): 2-D interpolation over
//! thrust x distance, plus the mutable atmospheric-absorption delta hook.

use grape_math::{inverse_lerp, lerp, Length};
use grape_store::{NpdTable, STANDARDIZED_DISTANCES_M};

/// A per-standardized-distance additive correction (§4.8), owned by a single
/// noise generator instance per operation (§4.9 step 8, §9 design note:
/// "atmospheric-absorption delta as mutable state ... is a property of the
/// generator instance owned by a single worker", never shared across threads).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpdDelta(pub [f64; 10]);

impl NpdDelta {
    pub const ZERO: Self = Self([0.0; 10]);
}

impl Default for NpdDelta {
    fn default() -> Self { Self::ZERO }
}

/// An [`NpdTable`] paired with a replaceable atmospheric-absorption delta
/// (§4.8). Applying a new delta replaces the previous one outright — deltas
/// are absolute corrections against the table's stored levels, never stacked
/// (§8 round-trip law).
#[derive(Debug, Clone, Copy)]
pub struct NpdLookup<'a> {
    table: &'a NpdTable,
    delta: NpdDelta,
}

impl<'a> NpdLookup<'a> {
    #[must_use]
    pub fn new(table: &'a NpdTable) -> Self { Self { table, delta: NpdDelta::ZERO } }

    /// Replaces this lookup's delta with `delta`, canceling whatever was
    /// applied before (§4.8, §8 round-trip law: `apply(D); apply(D')` must
    /// equal `apply(D')` alone).
    pub fn set_delta(&mut self, delta: NpdDelta) { self.delta = delta; }

    #[must_use]
    pub fn delta(&self) -> NpdDelta { self.delta }

    /// Interpolates a sound level (dB) at `thrust` (N) and `distance`.
    ///
    /// Thrust axis: clamped below the smallest tabulated value, linearly
    /// extrapolated above the largest using the last two rows. Distance
    /// axis: logarithmic-in-distance interpolation within range, linear
    /// extrapolation in log-distance beyond either end (§4.8).
    #[must_use]
    pub fn lookup(&self, thrust_n: f64, distance: Length) -> f64 {
        let thrusts = self.table.thrust_values_n();
        let levels = self.table.levels_db();

        let mut per_distance = [0.0_f64; 10];
        for col in 0..10 {
            let column: [f64; 10] = std::array::from_fn(|row| levels[row][col] + self.delta.0[col]);
            per_distance[col] = interp_axis_clamped_low(&thrusts, &column, thrust_n);
        }

        interp_log_distance(&STANDARDIZED_DISTANCES_M, &per_distance, distance.as_meters().max(1e-6))
    }
}

/// Linear interpolation over a strictly increasing axis: clamped below the
/// first sample, linearly extrapolated above the last using the final two
/// samples (the thrust-axis rule of §4.8).
fn interp_axis_clamped_low(axis: &[f64; 10], values: &[f64; 10], query: f64) -> f64 {
    if query <= axis[0] {
        return values[0];
    }
    if query >= axis[9] {
        let t = inverse_lerp(axis[8], axis[9], query);
        return lerp(values[8], values[9], t);
    }
    for i in 0..9 {
        if query <= axis[i + 1] {
            let t = inverse_lerp(axis[i], axis[i + 1], query);
            return lerp(values[i], values[i + 1], t);
        }
    }
    values[9]
}

/// Log-distance interpolation: interior points interpolate linearly in
/// `ln(distance)`; outside the table's range the same linear-in-log-distance
/// relationship is extrapolated from the nearest two samples (the
/// distance-axis rule of §4.8).
fn interp_log_distance(axis_m: &[f64; 10], values: &[f64; 10], query_m: f64) -> f64 {
    let log_axis: [f64; 10] = std::array::from_fn(|i| axis_m[i].ln());
    let log_query = query_m.ln();

    if log_query <= log_axis[0] {
        let t = inverse_lerp(log_axis[0], log_axis[1], log_query);
        return lerp(values[0], values[1], t);
    }
    if log_query >= log_axis[9] {
        let t = inverse_lerp(log_axis[8], log_axis[9], log_query);
        return lerp(values[8], values[9], t);
    }
    for i in 0..9 {
        if log_query <= log_axis[i + 1] {
            let t = inverse_lerp(log_axis[i], log_axis[i + 1], log_query);
            return lerp(values[i], values[i + 1], t);
        }
    }
    values[9]
}

/// Per-distance atmospheric-absorption delta between a specified atmosphere
/// and the Doc29 standard reference atmosphere (§4.9 step 8).
///
/// `specified_attenuation_db_per_m` gives the caller's per-band absorption
/// rate (e.g. from SAE ARP 5534 at a given temperature/humidity); this is
/// the "atmosphere override" of §4.9, modeled as already-resolved per-band
/// rates rather than this crate re-deriving ARP 5534 from temperature and
/// humidity (an Open Question resolution, recorded in DESIGN.md).
#[must_use]
pub fn atmospheric_absorption_delta(
    reference_spectrum_db: &[f64; 24],
    standard_attenuation_db_per_m: &[f64; 24],
    specified_attenuation_db_per_m: &[f64; 24],
    a_weights_db: &[f64; 24],
) -> NpdDelta {
    let mut delta = [0.0_f64; 10];
    for (i, &distance_m) in STANDARDIZED_DISTANCES_M.iter().enumerate() {
        let geometric_spreading_db = 20.0 * (distance_m / 305.0).log10();

        let energy_sum = |attenuation: &[f64; 24]| -> f64 {
            (0..24)
                .map(|band| {
                    let level = reference_spectrum_db[band] + geometric_spreading_db
                        - attenuation[band] * distance_m
                        + a_weights_db[band];
                    10.0_f64.powf(level / 10.0)
                })
                .sum::<f64>()
        };

        let specified_db = 10.0 * energy_sum(specified_attenuation_db_per_m).log10();
        let standard_db = 10.0 * energy_sum(standard_attenuation_db_per_m).log10();
        delta[i] = specified_db - standard_db;
    }
    NpdDelta(delta)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use grape_store::{NoiseSpectrum, NpdTable, A_WEIGHTS_DB, STANDARD_ATTENUATION_DB_PER_M};

    use super::*;

    fn table() -> NpdTable {
        let thrusts = [10_000.0, 20_000.0, 30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0, 100_000.0];
        let mut levels = [[0.0; 10]; 10];
        for (row, level_row) in levels.iter_mut().enumerate() {
            for (col, level) in level_row.iter_mut().enumerate() {
                *level = 100.0 - col as f64 * 5.0 + row as f64 * 0.5;
            }
        }
        NpdTable::new(thrusts, levels).unwrap()
    }

    #[test]
    fn lookup_matches_table_at_exact_knots() {
        let t = table();
        let lookup = NpdLookup::new(&t);
        let got = lookup.lookup(30_000.0, Length::meters(244.0));
        assert_relative_eq!(got, t.levels_db()[2][2], epsilon = 1e-9);
    }

    #[test]
    fn thrust_clamps_below_first_row() {
        let t = table();
        let lookup = NpdLookup::new(&t);
        let below = lookup.lookup(1_000.0, Length::meters(61.0));
        assert_relative_eq!(below, t.levels_db()[0][0], epsilon = 1e-9);
    }

    #[test]
    fn delta_replaces_rather_than_stacks() {
        let t = table();
        let mut lookup = NpdLookup::new(&t);
        let baseline = lookup.lookup(30_000.0, Length::meters(244.0));

        let mut d = NpdDelta::ZERO;
        d.0[2] = 3.0;
        lookup.set_delta(d);
        let once = lookup.lookup(30_000.0, Length::meters(244.0));
        assert_relative_eq!(once, baseline + 3.0, epsilon = 1e-9);

        let mut d2 = NpdDelta::ZERO;
        d2.0[2] = -1.5;
        lookup.set_delta(d2);
        let twice = lookup.lookup(30_000.0, Length::meters(244.0));
        assert_relative_eq!(twice, baseline - 1.5, epsilon = 1e-9);
    }

    #[test]
    fn absorption_delta_zero_when_specified_equals_standard() {
        let spectrum = NoiseSpectrum { levels_db: [80.0; 24] };
        let delta = atmospheric_absorption_delta(
            &spectrum.levels_db,
            &STANDARD_ATTENUATION_DB_PER_M,
            &STANDARD_ATTENUATION_DB_PER_M,
            &A_WEIGHTS_DB,
        );
        for value in delta.0 {
            assert_relative_eq!(value, 0.0, epsilon = 1e-9);
        }
    }
}
