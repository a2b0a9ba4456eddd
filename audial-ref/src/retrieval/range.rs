//! Numeric range arguments: `lo:hi`, `lo:`, `:hi` or a bare value

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Inclusive range; an open side is infinite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub const UNBOUNDED: Range = Range {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn has_lo(&self) -> bool {
        self.lo.is_finite()
    }

    pub fn has_hi(&self) -> bool {
        self.hi.is_finite()
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// Lower bounds take the max, upper bounds the min
    ///
    /// The result may be empty (`lo > hi`); it is kept as is.
    pub fn intersect(&self, other: &Range) -> Range {
        Range {
            lo: self.lo.max(other.lo),
            hi: self.hi.min(other.hi),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_lo() {
            write!(f, "{}", self.lo)?;
        }
        f.write_str(":")?;
        if self.has_hi() {
            write!(f, "{}", self.hi)?;
        }
        Ok(())
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_range(s)
    }
}

/// Parse a range argument
///
/// `"80:120"` is 80..=120, `":120"` has no lower bound, `"0.5:"` no upper
/// bound, and `"90"` is exactly 90.
pub fn parse_range(s: &str) -> Result<Range> {
    let text = s.trim();
    let malformed = || Error::MalformedRange(s.to_string());

    let bound = |part: &str, open: f64| -> Result<f64> {
        let part = part.trim();
        if part.is_empty() {
            return Ok(open);
        }
        match part.parse::<f64>() {
            Ok(v) if !v.is_nan() => Ok(v),
            _ => Err(malformed()),
        }
    };

    match text.split_once(':') {
        Some((lo, hi)) => {
            if hi.contains(':') {
                return Err(malformed());
            }
            Ok(Range::new(
                bound(lo, f64::NEG_INFINITY)?,
                bound(hi, f64::INFINITY)?,
            ))
        }
        None => {
            if text.is_empty() {
                return Err(malformed());
            }
            let v = bound(text, f64::NAN)?;
            Ok(Range::new(v, v))
        }
    }
}
