// Copyright @yucwang 2026

use super::constants::{Float, NEG_INF};

/// A closed interval of field values.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Range1f {
    pub lower: Float,
    pub upper: Float,
}

/// Placeholder interval that can never match a real sample value. Used when
/// a transfer function currently maps every value to zero opacity, so that
/// ray traversal short-circuits instead of special-casing an absent range
/// set downstream.
pub const DEGENERATE_VALUE_RANGE: Range1f = Range1f {
    lower: NEG_INF,
    upper: NEG_INF,
};

impl Range1f {
    pub fn new(a: Float, b: Float) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn contains(&self, value: Float) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn overlaps(&self, other: &Range1f) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }

    pub fn is_degenerate(&self) -> bool {
        self.lower == NEG_INF && self.upper == NEG_INF
    }
}
