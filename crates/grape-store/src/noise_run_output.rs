use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifies a receptor location by name, for keying [`NoiseRunOutput`].
pub type ReceptorId = String;

/// The LAMAX/SEL result for one (operation, receptor) pair (§3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NoiseResult {
    /// The maximum A-weighted sound level across all segments, in dB.
    pub lamax: f64,
    /// The sound exposure level: `10*log10` of the energy sum across segments, in dB.
    pub sel:   f64,
}

/// The noise-run driver's (component K) accumulated output for one
/// operation: a LAMAX/SEL result per receptor (§3). Day-level aggregations
/// (LAMAX over a day, LEQ, count-above-threshold) are follow-on reductions
/// over many of these, out of scope for this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct NoiseRunOutput {
    results: HashMap<ReceptorId, NoiseResult>,
}

impl NoiseRunOutput {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn set(&mut self, receptor: ReceptorId, result: NoiseResult) { self.results.insert(receptor, result); }

    #[must_use]
    pub fn get(&self, receptor: &str) -> Option<NoiseResult> { self.results.get(receptor).copied() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NoiseResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
