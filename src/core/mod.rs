// Copyright @yucwang 2026

pub mod error;
pub mod params;
pub mod sampler;
pub mod transfer_function;
pub mod volume;
