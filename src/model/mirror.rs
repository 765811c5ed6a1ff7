// Copyright @yucwang 2026

use crate::core::sampler::FieldSampler;
use crate::core::transfer_function::TransferFunctionMirror;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, UInt};
use crate::model::interval::IntervalContext;
use std::sync::Arc;

/// Kernel-facing snapshot of a committed volumetric appearance model.
///
/// Rebuilt wholesale on every commit and handed out as an immutable `Arc`:
/// in-flight kernels read it without locks, and a kernel launched against
/// snapshot N keeps a fully consistent view even after commit N+1 installs
/// a replacement. Field order is part of the compatibility surface.
pub struct VolumetricModelMirror {
    /// Present only when the volume supports interval iteration.
    pub sampler: Option<Arc<dyn FieldSampler>>,
    pub transfer_function: Arc<TransferFunctionMirror>,
    pub bounding_box: AABB,
    pub density_scale: Float,
    pub anisotropy: Float,
    pub gradient_shading_scale: Float,
    /// Null when the volume exposes no interval-capable sampler.
    pub interval_context: Option<Arc<IntervalContext>>,
    pub user_id: UInt,
}
