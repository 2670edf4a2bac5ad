#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc, clippy::missing_errors_doc)]
#![allow(
    clippy::excessive_precision,
    clippy::unreadable_literal,
    reason = "geodetic and Doc29 constants are copied verbatim from their defining standards"
)]

//! Units, geodesy and 2D algebra shared by the GRAPE performance and noise core.
//!
//! This crate carries no knowledge of airports, aircraft or Doc29 — it is the
//! dimensional-analysis and coordinate-geometry substrate that `grape-core`
//! and `grape-store` build on, the same role `omniatc-math` plays for
//! `omniatc-core`.

use std::{cmp, fmt, iter, ops};

mod units;
pub use units::*;

mod alg2d;
pub use alg2d::*;

pub mod geodesy;
pub use geodesy::{CoordinateSystem, GeoPoint, Intersection, LocalTangentPlane, Wgs84Geodesic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

pub trait Between<U>: PartialOrd<U> {
    fn between_inclusive(&self, min: &U, max: &U) -> bool { self >= min && self <= max }
}

impl<T: PartialOrd<U>, U> Between<U> for T {}

/// Returns `start`, `start+interval`, `start+interval+interval`, ... until `end`.
/// The second last item is between `end - interval` and `end`, and is not equal to `end`.
///
/// # Panics
/// Panics if `interval` is not a finite positive or negative value.
pub fn range_steps<T, U>(mut start: T, end: T, interval: U) -> impl Iterator<Item = T> + Clone
where
    T: Copy + PartialOrd + ops::AddAssign<U>,
    U: fmt::Debug + Copy + Default + PartialOrd,
{
    let more_extreme = match interval.partial_cmp(&U::default()) {
        Some(cmp::Ordering::Less) => |a: T, b: T| a <= b,
        Some(cmp::Ordering::Greater) => |a, b| a >= b,
        _ => panic!("interval {interval:?} must be a finite positive or negative"),
    };

    let mut fuse = Some(end).filter(|_| more_extreme(end, start));

    iter::from_fn(move || {
        let output = start;
        if more_extreme(output, end) {
            fuse.take()
        } else {
            start += interval;
            Some(output)
        }
    })
}
