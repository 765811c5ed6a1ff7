// Copyright @yucwang 2026

use crate::core::sampler::FieldSampler;
use crate::math::aabb::AABB;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_GEOMETRY_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a volume's native geometry resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeometryHandle(u64);

impl GeometryHandle {
    pub const INVALID: GeometryHandle = GeometryHandle(0);

    /// Allocate a fresh process-unique handle.
    pub fn alloc() -> Self {
        GeometryHandle(NEXT_GEOMETRY_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_valid(&self) -> bool {
        *self != GeometryHandle::INVALID
    }
}

pub trait Volume: Send + Sync {
    fn bounds(&self) -> AABB;

    /// Sampler handle, present only when the volume supports interval
    /// iteration over its field.
    fn sampler(&self) -> Option<Arc<dyn FieldSampler>> {
        None
    }

    fn geometry_handle(&self) -> GeometryHandle;
}
