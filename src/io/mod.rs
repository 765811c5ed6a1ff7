// Copyright @yucwang 2026

pub mod appearance_loader;
pub mod exr_utils;
