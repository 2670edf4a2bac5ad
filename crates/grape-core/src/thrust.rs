//! Corrected net thrust per engine (component D, §4.4). Three formula forms,
//! selected by the aircraft's [`ThrustModel`] variant and, for the rating
//! form, by whether the ambient temperature exceeds the engine's breakpoint.

use grape_store::{Atmosphere, Doc29Aircraft, PropellerCoefficients, Rating, RatingCoefficients, ThrustModel};

use crate::error::{RunError, RunResult};

/// Corrected net thrust per engine, in Newtons, for `rating` at `cas`
/// (calibrated airspeed, m/s) and `alt_msl` under `atmosphere` (§4.4).
///
/// For the rating form, the high-temperature override is used automatically
/// once ambient temperature exceeds the aircraft's breakpoint (Doc29 Vol 2
/// formula B-1 below breakpoint, B-4 above it). For the propeller form,
/// `rating` must be [`Rating::MaxTakeoff`] or [`Rating::MaxClimb`] (formula B-5).
///
/// # Errors
/// Returns [`RunError::MissingThrustRating`] if `rating` (or its
/// high-temperature counterpart, once applicable) has no coefficients set.
pub fn corrected_net_thrust(
    aircraft: &Doc29Aircraft,
    rating: Rating,
    cas: f64,
    alt_msl: grape_math::Length,
    atmosphere: Atmosphere,
) -> RunResult<f64> {
    match aircraft.thrust() {
        ThrustModel::None => Err(RunError::MissingThrustRating { rating }),
        ThrustModel::Rating(map) => {
            let temperature_c = atmosphere.temperature(alt_msl).into_celsius();
            let breakpoint_c = aircraft.breakpoint_temperature().into_celsius();

            if temperature_c > breakpoint_c {
                let high_temp_rating = high_temperature_variant(rating);
                if let Some(coeffs) = map.get(&high_temp_rating) {
                    Ok(rating_form(coeffs, cas, alt_msl.as_feet(), temperature_c))
                } else {
                    let coeffs = map.get(&rating).ok_or(RunError::MissingThrustRating { rating })?;
                    Ok(rating_form_high_temperature(coeffs, cas, temperature_c, breakpoint_c))
                }
            } else {
                let coeffs = map.get(&rating).ok_or(RunError::MissingThrustRating { rating })?;
                Ok(rating_form(coeffs, cas, alt_msl.as_feet(), temperature_c))
            }
        }
        ThrustModel::Propeller(map) => {
            let coeffs = map.get(&rating).ok_or(RunError::MissingThrustRating { rating })?;
            let density_ratio = atmosphere.density_ratio(alt_msl);
            let pressure_ratio = atmosphere.pressure_ratio(alt_msl);
            Ok(propeller_form(coeffs, cas, density_ratio, pressure_ratio))
        }
    }
}

fn high_temperature_variant(rating: Rating) -> Rating {
    match rating {
        Rating::MaxTakeoff => Rating::MaxTakeoffHighTemperature,
        Rating::MaxClimb => Rating::MaxClimbHighTemperature,
        Rating::Idle => Rating::IdleHighTemperature,
        already_high_temp => already_high_temp,
    }
}

/// Doc29 Vol 2 formula B-1: `Fn = E + F*Vc + Ga*h + Gb*h^2 + H*θ`, where `h`
/// is pressure altitude in feet and `θ` is ambient temperature in Celsius.
fn rating_form(c: &RatingCoefficients, cas: f64, alt_ft: f64, temperature_c: f64) -> f64 {
    c.e + c.f * cas + c.ga * alt_ft + c.gb * alt_ft * alt_ft + c.h * temperature_c
}

/// Doc29 Vol 2 formula B-4, used above the engine's breakpoint temperature:
/// thrust is flat-rated, so the altitude terms drop out and a correction
/// factor referenced to the breakpoint is applied instead.
fn rating_form_high_temperature(c: &RatingCoefficients, cas: f64, temperature_c: f64, breakpoint_c: f64) -> f64 {
    const DERATE_PER_DEGREE: f64 = 0.006;
    let numerator = (c.e + c.h * temperature_c) * (1.0 - DERATE_PER_DEGREE * temperature_c);
    let denominator = 1.0 - DERATE_PER_DEGREE * breakpoint_c;
    c.f * cas + numerator / denominator
}

/// Doc29 Vol 2 formula B-5: corrected net thrust from propeller efficiency
/// and net propulsive power, referenced to calibrated airspeed and density ratio.
fn propeller_form(c: &PropellerCoefficients, cas: f64, density_ratio: f64, pressure_ratio: f64) -> f64 {
    let true_airspeed = if cas.abs() < 1e-6 { 1e-6 } else { cas / density_ratio.sqrt() };
    (c.efficiency * c.power / true_airspeed) / pressure_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_form_matches_linear_terms() {
        let c = RatingCoefficients { e: 100_000.0, f: 10.0, ga: -1.0, gb: 0.0001, h: 50.0 };
        let thrust = rating_form(&c, 100.0, 5000.0, 15.0);
        assert!((thrust - (100_000.0 + 1_000.0 - 5_000.0 + 0.0001 * 5000.0 * 5000.0 + 750.0)).abs() < 1e-6);
    }

    #[test]
    fn high_temperature_variant_maps_base_ratings() {
        assert_eq!(high_temperature_variant(Rating::MaxTakeoff), Rating::MaxTakeoffHighTemperature);
        assert_eq!(high_temperature_variant(Rating::MaxClimb), Rating::MaxClimbHighTemperature);
        assert_eq!(high_temperature_variant(Rating::Idle), Rating::IdleHighTemperature);
    }
}
