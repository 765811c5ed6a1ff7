// Copyright @yucwang 2026

pub mod interval;
pub mod mirror;
pub mod volumetric;
