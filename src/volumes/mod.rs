// Copyright @yucwang 2026

pub mod const_volume;
pub mod grid_volume;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeFilterMode {
    Nearest,
    Trilinear,
}
