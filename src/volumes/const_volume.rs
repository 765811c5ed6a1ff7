// Copyright @yucwang 2026

use crate::core::volume::{GeometryHandle, Volume};
use crate::math::aabb::AABB;
use crate::math::constants::Float;

/// Uniform scalar field over an explicit box. A constant field gains
/// nothing from interval iteration, so this volume exposes no sampler and
/// an appearance model bound to it commits without an acceleration context.
pub struct ConstantVolume {
    value: Float,
    bounds: AABB,
    geometry: GeometryHandle,
}

impl ConstantVolume {
    pub fn new(value: Float, bounds: AABB) -> Self {
        Self {
            value,
            bounds,
            geometry: GeometryHandle::alloc(),
        }
    }

    pub fn value(&self) -> Float {
        self.value
    }
}

impl Volume for ConstantVolume {
    fn bounds(&self) -> AABB {
        self.bounds
    }

    fn geometry_handle(&self) -> GeometryHandle {
        self.geometry
    }
}
