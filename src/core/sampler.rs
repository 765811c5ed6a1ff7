// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

/// A volume's native interface for evaluating its scalar field at a world
/// position. Evaluation is side-effect-free, so arbitrarily many parallel
/// kernels may call it on a shared handle.
pub trait FieldSampler: Send + Sync {
    fn eval(&self, p_world: Vector3f) -> Float;
}
