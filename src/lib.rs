// Copyright @yucwang 2026

#![allow(dead_code)]

pub mod core;
pub mod io;
pub mod math;
pub mod model;
pub mod transfer;
pub mod volumes;
