// Copyright @yucwang 2026

use crate::core::transfer_function::{TransferFunction, TransferFunctionMirror};
use crate::math::constants::{Float, Vector3f};
use crate::math::range::Range1f;
use std::sync::Arc;

/// Transfer function defined by color and opacity samples linearly
/// interpolated over a value range.
pub struct PiecewiseLinearTransferFunction {
    value_range: Range1f,
    opacities: Vec<Float>,
    mirror: Arc<TransferFunctionMirror>,
}

impl PiecewiseLinearTransferFunction {
    pub fn new(value_range: Range1f, colors: Vec<Vector3f>, opacities: Vec<Float>) -> Self {
        let mirror = Arc::new(TransferFunctionMirror {
            value_range,
            colors,
            opacities: opacities.clone(),
        });
        Self {
            value_range,
            opacities,
            mirror,
        }
    }

    pub fn value_range(&self) -> Range1f {
        self.value_range
    }
}

impl TransferFunction for PiecewiseLinearTransferFunction {
    /// Interval `i` of the opacity sample grid contributes when either of
    /// its endpoint samples is positive (linear interpolation is positive
    /// somewhere inside it). Contiguous contributing intervals are merged
    /// and mapped into the value domain.
    fn positive_opacity_value_ranges(&self) -> Vec<Range1f> {
        let n = self.opacities.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return if self.opacities[0] > 0.0 {
                vec![self.value_range]
            } else {
                Vec::new()
            };
        }

        let lower = self.value_range.lower;
        let extent = self.value_range.upper - self.value_range.lower;
        let cell = extent / (n as Float - 1.0);

        let mut ranges = Vec::new();
        let mut run_start: Option<usize> = None;
        for i in 0..n - 1 {
            let interesting = self.opacities[i] > 0.0 || self.opacities[i + 1] > 0.0;
            match (interesting, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    ranges.push(Range1f::new(
                        lower + cell * start as Float,
                        lower + cell * i as Float,
                    ));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(Range1f::new(
                lower + cell * start as Float,
                self.value_range.upper,
            ));
        }

        ranges
    }

    fn mirror(&self) -> Arc<TransferFunctionMirror> {
        Arc::clone(&self.mirror)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(n: usize) -> Vec<Vector3f> {
        vec![Vector3f::new(1.0, 1.0, 1.0); n]
    }

    #[test]
    fn all_zero_opacity_yields_no_ranges() {
        let tf = PiecewiseLinearTransferFunction::new(
            Range1f::new(0.0, 1.0),
            white(4),
            vec![0.0, 0.0, 0.0, 0.0],
        );
        assert!(tf.positive_opacity_value_ranges().is_empty());
    }

    #[test]
    fn fully_positive_opacity_covers_the_domain() {
        let tf = PiecewiseLinearTransferFunction::new(
            Range1f::new(-1.0, 3.0),
            white(3),
            vec![0.5, 1.0, 0.25],
        );
        assert_eq!(
            tf.positive_opacity_value_ranges(),
            vec![Range1f::new(-1.0, 3.0)]
        );
    }

    #[test]
    fn isolated_peaks_produce_merged_disjoint_ranges() {
        // samples at 0.0, 0.25, 0.5, 0.75, 1.0
        let tf = PiecewiseLinearTransferFunction::new(
            Range1f::new(0.0, 1.0),
            white(5),
            vec![0.0, 1.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(
            tf.positive_opacity_value_ranges(),
            vec![Range1f::new(0.0, 0.5), Range1f::new(0.75, 1.0)]
        );
    }

    #[test]
    fn single_sample_behaves_as_constant() {
        let opaque = PiecewiseLinearTransferFunction::new(
            Range1f::new(0.0, 2.0),
            white(1),
            vec![0.5],
        );
        assert_eq!(
            opaque.positive_opacity_value_ranges(),
            vec![Range1f::new(0.0, 2.0)]
        );

        let clear =
            PiecewiseLinearTransferFunction::new(Range1f::new(0.0, 2.0), white(1), vec![0.0]);
        assert!(clear.positive_opacity_value_ranges().is_empty());
    }

    #[test]
    fn mirror_reflects_construction_inputs() {
        let tf = PiecewiseLinearTransferFunction::new(
            Range1f::new(0.0, 1.0),
            white(2),
            vec![0.0, 1.0],
        );
        let mirror = tf.mirror();
        assert_eq!(mirror.value_range, Range1f::new(0.0, 1.0));
        assert_eq!(mirror.opacities, vec![0.0, 1.0]);
        assert!((mirror.opacity(0.5) - 0.5).abs() < 1e-6);
    }
}
