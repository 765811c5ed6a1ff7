// Copyright @yucwang 2026

pub mod piecewise_linear;
