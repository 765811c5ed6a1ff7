/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;

pub const EPSILON: Float = 1e-4;
pub const FLOAT_MIN: Float = std::f32::MIN;
pub const FLOAT_MAX: Float = std::f32::MAX;
pub const NEG_INF: Float = std::f32::NEG_INFINITY;

/// Reserved identifier meaning "no user id assigned to this model".
pub const INVALID_USER_ID: UInt = UInt::MAX;
