//! Scalar timing values with an explicit invalid state.
//!
//! A [`Time`] is a number of nanoseconds. The default value is *invalid*
//! (NaN): it marks a slot that no propagation has reached yet. Invalid values
//! compare neither less nor greater than anything, and the [`Time::max`] /
//! [`Time::min`] merges treat them as the identity, so merging into an empty
//! slot simply stores the incoming value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A timing quantity in nanoseconds, or invalid.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time(f64);

impl Time {
    /// Zero nanoseconds.
    pub const ZERO: Time = Time(0.0);

    /// The invalid (unset) time.
    pub const INVALID: Time = Time(f64::NAN);

    /// Creates a time from a value in nanoseconds.
    pub fn new(ns: f64) -> Self {
        Self(ns)
    }

    /// Returns the invalid time.
    pub fn invalid() -> Self {
        Self::INVALID
    }

    /// Returns `true` unless this is the invalid time.
    pub fn is_valid(self) -> bool {
        !self.0.is_nan()
    }

    /// The raw value in nanoseconds (NaN when invalid).
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the value if valid.
    pub fn valid(self) -> Option<f64> {
        self.is_valid().then_some(self.0)
    }

    /// The larger of two times; an invalid operand is ignored.
    pub fn max(self, other: Time) -> Time {
        match (self.is_valid(), other.is_valid()) {
            (false, _) => other,
            (_, false) => self,
            _ if other.0 > self.0 => other,
            _ => self,
        }
    }

    /// The smaller of two times; an invalid operand is ignored.
    pub fn min(self, other: Time) -> Time {
        match (self.is_valid(), other.is_valid()) {
            (false, _) => other,
            (_, false) => self,
            _ if other.0 < self.0 => other,
            _ => self,
        }
    }

    /// Bitwise identity, which (unlike `==`) holds between two invalid times.
    pub fn identical(self, other: Time) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl Neg for Time {
    type Output = Time;

    fn neg(self) -> Time {
        Time(-self.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{:.3} ns", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}
