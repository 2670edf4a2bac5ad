use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::hash::Hash;
use std::{fmt, ops};

use ordered_float::{FloatIsNan, NotNan};

use super::Angle;

#[cfg(test)]
mod tests;

/// An absolute directional bearing, always normalized to `-STRAIGHT < value <= STRAIGHT`
/// internally and reported in `[0, 360)` degrees per §6's units convention.
#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Heading(Angle);

impl Heading {
    pub const NORTH: Self = Self(Angle::new(0.));
    pub const EAST: Self = Self(Angle::new(FRAC_PI_2));
    pub const SOUTH: Self = Self(Angle::new(PI));
    pub const WEST: Self = Self(Angle::new(FRAC_PI_2 * 3.));

    /// Creates a heading from an absolute bearing in degrees.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self { Self::from_radians(Angle::from_degrees(degrees)) }

    /// Returns the heading in degrees, normalized to `[0, 360)`.
    #[must_use]
    pub fn degrees(self) -> f64 {
        let degrees = self.0.degrees();
        if degrees < 0. { degrees + 360. } else { degrees }
    }

    /// Creates a heading from an absolute bearing in radians.
    #[must_use]
    pub fn from_radians(mut radians: Angle) -> Self {
        radians %= Angle::FULL;
        if radians > Angle::STRAIGHT {
            radians -= Angle::FULL;
        } else if radians <= -Angle::STRAIGHT {
            radians += Angle::FULL;
        }
        Self(radians)
    }

    /// Returns the heading in radians, in `-STRAIGHT < value <= STRAIGHT`.
    #[must_use]
    pub fn radians(self) -> Angle { self.0 }

    /// Returns the heading as an ordered value, for use as a `BTreeMap`/`HashMap` key.
    ///
    /// # Errors
    /// Returns an error if the heading is NaN.
    pub fn as_ordered(self) -> Result<impl Copy + Ord + Hash, FloatIsNan> { NotNan::new(self.0.0) }

    /// Returns the heading in radians in `[0, FULL)`.
    #[must_use]
    pub fn radians_nonnegative(self) -> Angle {
        if self.0.is_negative() { self.0 + Angle::FULL } else { self.0 }
    }

    /// Radians to turn from `self` to `other` in the given direction.
    /// The output is always in `[0, FULL)` for [`TurnDirection::Right`],
    /// or `(-FULL, 0]` for [`TurnDirection::Left`].
    #[must_use]
    pub fn distance(self, other: Heading, dir: TurnDirection) -> Angle {
        let mut output = (other.0 - self.0) % Angle::FULL;
        match dir {
            TurnDirection::Right => {
                if output.is_negative() {
                    output += Angle::FULL;
                }
            }
            TurnDirection::Left => {
                if output.is_positive() {
                    output -= Angle::FULL;
                }
            }
        }
        output
    }

    /// Returns the signed angle closest to zero such that adding it to `self`
    /// approximately returns `other`.
    #[must_use]
    pub fn closest_distance(self, other: Heading) -> Angle {
        self.distance(other, self.closer_direction_to(other))
    }

    /// Returns the closer direction to turn towards `other`, assuming zero
    /// current angular velocity. Unspecified if `self` and `other` are exactly opposite.
    #[must_use]
    pub fn closer_direction_to(self, other: Heading) -> TurnDirection {
        if self.distance(other, TurnDirection::Right) < Angle::STRAIGHT {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    /// Rotates by `delta` in the direction of `dir`. `delta` must be non-negative.
    #[must_use]
    pub fn add_direction(self, dir: TurnDirection, delta: Angle) -> Self {
        match dir {
            TurnDirection::Left => self - delta,
            TurnDirection::Right => self + delta,
        }
    }

    /// Returns the opposite heading.
    #[must_use]
    pub fn opposite(self) -> Self { self + Angle::STRAIGHT }
}

impl fmt::Debug for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heading").field("degrees", &self.degrees()).finish()
    }
}

/// Returns the shortest bearing change such that adding the return value to
/// `other` approximately yields `self`.
impl ops::Sub for Heading {
    type Output = Angle;
    fn sub(self, other: Self) -> Angle {
        if (self.0 - other.0).abs() <= Angle::STRAIGHT {
            self.0 - other.0
        } else if self.0 > other.0 {
            self.0 - (other.0 + Angle::FULL)
        } else {
            self.0 + Angle::FULL - other.0
        }
    }
}

impl ops::Add<Angle> for Heading {
    type Output = Self;
    /// Offsets `self` by `angle` clockwise.
    fn add(mut self, angle: Angle) -> Self {
        self.0 += angle;
        self.0 %= Angle::FULL;
        if self.0 > Angle::STRAIGHT {
            self.0 -= Angle::FULL;
        } else if self.0 <= -Angle::STRAIGHT {
            self.0 += Angle::FULL;
        }
        self
    }
}

impl ops::AddAssign<Angle> for Heading {
    fn add_assign(&mut self, angle: Angle) { *self = *self + angle; }
}

impl ops::Sub<Angle> for Heading {
    type Output = Self;
    /// Offsets `self` by `angle` counter-clockwise.
    fn sub(self, angle: Angle) -> Self { self + (-angle) }
}

impl ops::SubAssign<Angle> for Heading {
    fn sub_assign(&mut self, angle: Angle) { *self = *self - angle; }
}

/// The direction of a turn, as used by route vectors (§3) and bank angle (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TurnDirection {
    /// A left turn, generating negative (left-wing-down) bank per the
    /// convention in §3's performance-output bank angle.
    Left,
    /// A right turn, generating positive bank.
    Right,
}

impl ops::Neg for TurnDirection {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            TurnDirection::Left => TurnDirection::Right,
            TurnDirection::Right => TurnDirection::Left,
        }
    }
}

impl Angle {
    pub(crate) const fn new(radians: f64) -> Self { Self(radians) }
}
