use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of available capital a decision commits, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(f64);

impl Allocation {
    pub const MAX: f64 = 5.0;

    /// Clamp collaborator output into range; NaN becomes zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Allocation(0.0);
        }
        Allocation(value.clamp(0.0, Self::MAX))
    }

    pub fn zero() -> Self {
        Allocation(0.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(Allocation::clamped(12.0).value(), 5.0);
        assert_eq!(Allocation::clamped(-3.0).value(), 0.0);
        assert_eq!(Allocation::clamped(f64::NAN).value(), 0.0);
        assert!(Allocation::clamped(0.0).is_zero());
    }
}
