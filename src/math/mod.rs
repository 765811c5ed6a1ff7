// Copyright 2020 @TwoCookingMice

pub mod aabb;
pub mod constants;
pub mod range;
pub mod ray;
