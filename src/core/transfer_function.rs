// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use crate::math::range::Range1f;
use std::sync::Arc;

/// Flat, kernel-readable snapshot of a transfer function: its value domain
/// plus the color/opacity sample arrays, linearly interpolated by kernels.
pub struct TransferFunctionMirror {
    pub value_range: Range1f,
    pub colors: Vec<Vector3f>,
    pub opacities: Vec<Float>,
}

impl TransferFunctionMirror {
    /// Opacity at `value`, linearly interpolated over the sample grid.
    /// Values outside the domain are clamped to the nearest sample.
    pub fn opacity(&self, value: Float) -> Float {
        if self.opacities.is_empty() {
            return 0.0;
        }
        if self.opacities.len() == 1 {
            return self.opacities[0];
        }

        let extent = self.value_range.upper - self.value_range.lower;
        if extent <= 0.0 {
            return self.opacities[0];
        }

        let u = ((value - self.value_range.lower) / extent).clamp(0.0, 1.0);
        let x = u * (self.opacities.len() as Float - 1.0);
        let i0 = (x.floor() as usize).min(self.opacities.len() - 2);
        let t = x - i0 as Float;
        self.opacities[i0] * (1.0 - t) + self.opacities[i0 + 1] * t
    }

    /// Color at `value`, same interpolation rule as `opacity`.
    pub fn color(&self, value: Float) -> Vector3f {
        if self.colors.is_empty() {
            return Vector3f::new(1.0, 1.0, 1.0);
        }
        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let extent = self.value_range.upper - self.value_range.lower;
        if extent <= 0.0 {
            return self.colors[0];
        }

        let u = ((value - self.value_range.lower) / extent).clamp(0.0, 1.0);
        let x = u * (self.colors.len() as Float - 1.0);
        let i0 = (x.floor() as usize).min(self.colors.len() - 2);
        let t = x - i0 as Float;
        self.colors[i0] * (1.0 - t) + self.colors[i0 + 1] * t
    }
}

pub trait TransferFunction: Send + Sync {
    /// Ordered, disjoint intervals of field values mapped to non-zero
    /// opacity. Callable any number of times, side-effect-free. An empty
    /// vector means the transfer function currently renders everything
    /// transparent.
    fn positive_opacity_value_ranges(&self) -> Vec<Range1f>;

    /// The transfer function's own kernel-readable snapshot.
    fn mirror(&self) -> Arc<TransferFunctionMirror>;
}
