// Copyright @yucwang 2026

use crate::core::error::CommitError;
use crate::core::params::ParameterStore;
use crate::core::volume::{GeometryHandle, Volume};
use crate::math::aabb::AABB;
use crate::math::constants::INVALID_USER_ID;
use crate::math::range::DEGENERATE_VALUE_RANGE;
use crate::model::interval::{IntervalContext, IntervalContextBuilder};
use crate::model::mirror::VolumetricModelMirror;
use std::sync::Arc;

/// Binds a volume to a transfer function plus shading parameters and keeps
/// the kernel-facing artifacts in sync: the packed mirror snapshot and the
/// interval acceleration context.
///
/// Single writer, many readers. `commit` runs to completion on the caller's
/// thread; the renderer quiesces in-flight kernels around it and launches
/// new ones against the `Arc` snapshot from `mirror()`. A failed commit
/// leaves every previously installed artifact untouched.
pub struct VolumetricAppearanceModel {
    builder: IntervalContextBuilder,
    fallback_volume: Option<Arc<dyn Volume>>,
    volume: Option<Arc<dyn Volume>>,
    bounds: AABB,
    interval_context: Option<Arc<IntervalContext>>,
    mirror: Option<Arc<VolumetricModelMirror>>,
}

impl VolumetricAppearanceModel {
    /// `fallback_volume` is used whenever no `volume` parameter overrides
    /// it at commit time.
    pub fn new(builder: IntervalContextBuilder, fallback_volume: Option<Arc<dyn Volume>>) -> Self {
        Self {
            builder,
            fallback_volume,
            volume: None,
            bounds: AABB::default(),
            interval_context: None,
            mirror: None,
        }
    }

    /// Rebuild every derived artifact from the parameter store.
    ///
    /// All fallible work happens on locals; the model is only touched by the
    /// install sequence at the end, so readers observe either the full old
    /// snapshot or the full new one, never a mix. Swapping in the new
    /// context releases the previous one.
    pub fn commit(&mut self, params: &ParameterStore) -> Result<(), CommitError> {
        let volume = params
            .get_volume("volume")
            .or_else(|| self.fallback_volume.clone())
            .ok_or(CommitError::Configuration("missing volume"))?;

        let transfer_function = params
            .get_transfer_function("transfer_function")
            .ok_or(CommitError::Configuration("missing transfer function"))?;

        let interval_context = match volume.sampler() {
            Some(sampler) => {
                let mut ranges = transfer_function.positive_opacity_value_ranges();
                if ranges.is_empty() {
                    // Fully transparent transfer function: keep the context
                    // valid with one unreachable range so traversal bails
                    // out immediately.
                    log::warn!("transfer function has no positive-opacity range");
                    ranges.push(DEGENERATE_VALUE_RANGE);
                }
                Some(Arc::new(self.builder.build(sampler, ranges)?))
            }
            None => None,
        };

        let bounds = volume.bounds();
        let mirror = VolumetricModelMirror {
            sampler: volume.sampler(),
            transfer_function: transfer_function.mirror(),
            bounding_box: bounds,
            density_scale: params.get_float("density_scale", 1.0),
            anisotropy: params.get_float("anisotropy", 0.0),
            gradient_shading_scale: params.get_float("gradient_shading_scale", 0.0),
            interval_context: interval_context.clone(),
            user_id: params.get_uint("id", INVALID_USER_ID),
        };

        log::debug!(
            "committing volumetric model: {} value range(s), id {}",
            interval_context.as_ref().map_or(0, |c| c.ranges().len()),
            mirror.user_id
        );

        // Install step: nothing above may fail past this point.
        self.interval_context = interval_context;
        self.bounds = bounds;
        self.volume = Some(volume);
        self.mirror = Some(Arc::new(mirror));

        Ok(())
    }

    /// Bounding box cached by the last successful commit. Holds the default
    /// (invalid) box before the first commit.
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Native geometry handle of the resolved volume.
    pub fn geometry_handle(&self) -> Result<GeometryHandle, CommitError> {
        self.volume
            .as_ref()
            .map(|v| v.geometry_handle())
            .ok_or(CommitError::Configuration("volume not resolved, commit first"))
    }

    /// The volume resolved by the most recent commit.
    pub fn volume(&self) -> Option<Arc<dyn Volume>> {
        self.volume.clone()
    }

    /// Snapshot for kernel launch; `None` before the first commit.
    pub fn mirror(&self) -> Option<Arc<VolumetricModelMirror>> {
        self.mirror.clone()
    }

    /// Current acceleration context, if the last commit built one.
    pub fn interval_context(&self) -> Option<Arc<IntervalContext>> {
        self.interval_context.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::FieldSampler;
    use crate::core::transfer_function::{TransferFunction, TransferFunctionMirror};
    use crate::math::constants::{Float, Vector3f};
    use crate::math::range::Range1f;

    struct UnitSampler;

    impl FieldSampler for UnitSampler {
        fn eval(&self, _p_world: Vector3f) -> Float {
            0.5
        }
    }

    struct TestVolume {
        bounds: AABB,
        geometry: GeometryHandle,
        interval_capable: bool,
    }

    impl TestVolume {
        fn unit_cube(interval_capable: bool) -> Self {
            Self {
                bounds: AABB::new(
                    Vector3f::new(0.0, 0.0, 0.0),
                    Vector3f::new(1.0, 1.0, 1.0),
                ),
                geometry: GeometryHandle::alloc(),
                interval_capable,
            }
        }
    }

    impl Volume for TestVolume {
        fn bounds(&self) -> AABB {
            self.bounds
        }

        fn sampler(&self) -> Option<Arc<dyn FieldSampler>> {
            if self.interval_capable {
                Some(Arc::new(UnitSampler))
            } else {
                None
            }
        }

        fn geometry_handle(&self) -> GeometryHandle {
            self.geometry
        }
    }

    struct TestTransferFunction {
        ranges: Vec<Range1f>,
    }

    impl TestTransferFunction {
        fn with_ranges(ranges: Vec<Range1f>) -> Arc<dyn TransferFunction> {
            Arc::new(Self { ranges })
        }
    }

    impl TransferFunction for TestTransferFunction {
        fn positive_opacity_value_ranges(&self) -> Vec<Range1f> {
            self.ranges.clone()
        }

        fn mirror(&self) -> Arc<TransferFunctionMirror> {
            Arc::new(TransferFunctionMirror {
                value_range: Range1f::new(0.0, 1.0),
                colors: vec![Vector3f::new(1.0, 1.0, 1.0)],
                opacities: vec![1.0],
            })
        }
    }

    fn params_with(
        volume: Option<Arc<dyn Volume>>,
        tf: Option<Arc<dyn TransferFunction>>,
    ) -> ParameterStore {
        let mut params = ParameterStore::new();
        if let Some(volume) = volume {
            params.set_volume("volume", volume);
        }
        if let Some(tf) = tf {
            params.set_transfer_function("transfer_function", tf);
        }
        params
    }

    #[test]
    fn commit_without_transfer_function_fails() {
        let mut model = VolumetricAppearanceModel::new(
            IntervalContextBuilder::new(),
            Some(Arc::new(TestVolume::unit_cube(true))),
        );
        let params = params_with(None, None);

        let err = model.commit(&params).unwrap_err();
        assert_eq!(err, CommitError::Configuration("missing transfer function"));
        assert!(model.mirror().is_none());
    }

    #[test]
    fn commit_without_any_volume_fails() {
        let mut model = VolumetricAppearanceModel::new(IntervalContextBuilder::new(), None);
        let params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)])),
        );

        let err = model.commit(&params).unwrap_err();
        assert_eq!(err, CommitError::Configuration("missing volume"));
        assert!(model.mirror().is_none());
        assert!(model.geometry_handle().is_err());
    }

    #[test]
    fn override_volume_wins_over_fallback() {
        let fallback = Arc::new(TestVolume::unit_cube(true));
        let override_volume = Arc::new(TestVolume {
            bounds: AABB::new(Vector3f::new(-2.0, -2.0, -2.0), Vector3f::new(2.0, 2.0, 2.0)),
            geometry: GeometryHandle::alloc(),
            interval_capable: true,
        });
        let override_handle = override_volume.geometry;

        let mut model =
            VolumetricAppearanceModel::new(IntervalContextBuilder::new(), Some(fallback));
        let params = params_with(
            Some(override_volume),
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)])),
        );

        model.commit(&params).unwrap();
        assert_eq!(model.geometry_handle().unwrap(), override_handle);
        assert_eq!(model.bounds().p_max, Vector3f::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn empty_ranges_substitute_degenerate_sentinel() {
        let mut model = VolumetricAppearanceModel::new(
            IntervalContextBuilder::new(),
            Some(Arc::new(TestVolume::unit_cube(true))),
        );
        let params = params_with(None, Some(TestTransferFunction::with_ranges(Vec::new())));

        model.commit(&params).unwrap();
        let context = model.interval_context().unwrap();
        assert_eq!(context.ranges(), &[DEGENERATE_VALUE_RANGE]);
    }

    #[test]
    fn repeated_commits_rebuild_without_leaking() {
        let builder = IntervalContextBuilder::new();
        let stats = builder.stats();
        let mut model = VolumetricAppearanceModel::new(
            builder,
            Some(Arc::new(TestVolume::unit_cube(true))),
        );

        let n = 5;
        for i in 0..n {
            let params = params_with(
                None,
                Some(TestTransferFunction::with_ranges(vec![Range1f::new(
                    0.1 * i as Float,
                    0.1 * i as Float + 0.05,
                )])),
            );
            model.commit(&params).unwrap();
        }

        assert_eq!(stats.builds(), n);
        assert_eq!(stats.releases(), n - 1);
        assert_eq!(stats.live(), 1);

        drop(model);
        assert_eq!(stats.releases(), n);
        assert_eq!(stats.live(), 0);
    }

    #[test]
    fn sampler_less_volume_skips_context_and_drop_is_safe() {
        let builder = IntervalContextBuilder::new();
        let stats = builder.stats();
        let mut model = VolumetricAppearanceModel::new(
            builder,
            Some(Arc::new(TestVolume::unit_cube(false))),
        );
        let params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)])),
        );

        model.commit(&params).unwrap();
        assert!(model.interval_context().is_none());
        let mirror = model.mirror().unwrap();
        assert!(mirror.sampler.is_none());
        assert!(mirror.interval_context.is_none());

        drop(model);
        assert_eq!(stats.builds(), 0);
        assert_eq!(stats.releases(), 0);
    }

    #[test]
    fn transition_to_sampler_less_volume_releases_old_context() {
        let builder = IntervalContextBuilder::new();
        let stats = builder.stats();
        let mut model = VolumetricAppearanceModel::new(builder, None);
        let tf = TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)]);

        let params = params_with(Some(Arc::new(TestVolume::unit_cube(true))), Some(tf.clone()));
        model.commit(&params).unwrap();
        assert_eq!(stats.live(), 1);

        let params = params_with(Some(Arc::new(TestVolume::unit_cube(false))), Some(tf));
        model.commit(&params).unwrap();
        assert!(model.interval_context().is_none());
        assert_eq!(stats.live(), 0);
    }

    #[test]
    fn mirror_defaults_follow_omitted_parameters() {
        let mut model = VolumetricAppearanceModel::new(
            IntervalContextBuilder::new(),
            Some(Arc::new(TestVolume::unit_cube(true))),
        );
        let params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)])),
        );

        model.commit(&params).unwrap();
        let mirror = model.mirror().unwrap();
        assert_eq!(mirror.density_scale, 1.0);
        assert_eq!(mirror.anisotropy, 0.0);
        assert_eq!(mirror.gradient_shading_scale, 0.0);
        assert_eq!(mirror.user_id, INVALID_USER_ID);
    }

    #[test]
    fn bounds_track_resolved_volume() {
        let mut model = VolumetricAppearanceModel::new(IntervalContextBuilder::new(), None);
        assert!(!model.bounds().is_valid());

        let volume = Arc::new(TestVolume::unit_cube(true));
        let params = params_with(
            Some(volume.clone()),
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.0, 1.0)])),
        );
        model.commit(&params).unwrap();
        assert_eq!(model.bounds(), volume.bounds());
    }

    #[test]
    fn recommit_scenario_two_ranges_then_transparent() {
        let mut model = VolumetricAppearanceModel::new(
            IntervalContextBuilder::new(),
            Some(Arc::new(TestVolume::unit_cube(true))),
        );

        let mut params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![
                Range1f::new(0.2, 0.4),
                Range1f::new(0.6, 0.8),
            ])),
        );
        model.commit(&params).unwrap();

        let mirror = model.mirror().unwrap();
        assert_eq!(mirror.density_scale, 1.0);
        let context = model.interval_context().unwrap();
        assert_eq!(
            context.ranges(),
            &[Range1f::new(0.2, 0.4), Range1f::new(0.6, 0.8)]
        );
        let bounds_before = model.bounds();

        params.set_transfer_function(
            "transfer_function",
            TestTransferFunction::with_ranges(Vec::new()),
        );
        model.commit(&params).unwrap();
        let context = model.interval_context().unwrap();
        assert_eq!(context.ranges(), &[DEGENERATE_VALUE_RANGE]);
        assert_eq!(model.bounds(), bounds_before);
    }

    #[test]
    fn failed_commit_preserves_previous_snapshot() {
        let builder = IntervalContextBuilder::new();
        let stats = builder.stats();
        let mut model = VolumetricAppearanceModel::new(
            builder,
            Some(Arc::new(TestVolume::unit_cube(true))),
        );

        let mut params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.2, 0.4)])),
        );
        params.set_float("density_scale", 3.0);
        model.commit(&params).unwrap();
        let old_mirror = model.mirror().unwrap();

        // drop the transfer function: the second commit must fail and leave
        // the first snapshot installed
        let bad_params = params_with(None, None);
        assert!(model.commit(&bad_params).is_err());

        let mirror = model.mirror().unwrap();
        assert!(Arc::ptr_eq(&mirror, &old_mirror));
        assert_eq!(mirror.density_scale, 3.0);
        assert_eq!(stats.live(), 1);
    }

    #[test]
    fn kernel_held_snapshot_survives_recommit() {
        let builder = IntervalContextBuilder::new();
        let stats = builder.stats();
        let mut model = VolumetricAppearanceModel::new(
            builder,
            Some(Arc::new(TestVolume::unit_cube(true))),
        );

        let params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.2, 0.4)])),
        );
        model.commit(&params).unwrap();
        let held = model.mirror().unwrap();

        let params = params_with(
            None,
            Some(TestTransferFunction::with_ranges(vec![Range1f::new(0.6, 0.8)])),
        );
        model.commit(&params).unwrap();

        // the held snapshot keeps its own context alive
        assert_eq!(stats.builds(), 2);
        assert_eq!(stats.releases(), 0);
        let held_context = held.interval_context.as_ref().unwrap();
        assert_eq!(held_context.ranges(), &[Range1f::new(0.2, 0.4)]);

        drop(held);
        assert_eq!(stats.releases(), 1);
    }
}
