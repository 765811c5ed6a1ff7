// Copyright @yucwang 2026

use crate::core::sampler::FieldSampler;
use crate::core::volume::{GeometryHandle, Volume};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::volumes::VolumeFilterMode;
use std::fs;
use std::sync::Arc;

struct GridData {
    data: Vec<Float>,
    xres: usize,
    yres: usize,
    zres: usize,
    bounds: AABB,
}

impl GridData {
    fn fetch(&self, x: usize, y: usize, z: usize) -> Float {
        self.data[(z * self.yres + y) * self.xres + x]
    }

    fn sample_nearest(&self, p: Vector3f) -> Float {
        let x = p.x * (self.xres as Float - 1.0);
        let y = p.y * (self.yres as Float - 1.0);
        let z = p.z * (self.zres as Float - 1.0);

        let x0 = ((x + 0.5).floor() as isize).clamp(0, self.xres as isize - 1) as usize;
        let y0 = ((y + 0.5).floor() as isize).clamp(0, self.yres as isize - 1) as usize;
        let z0 = ((z + 0.5).floor() as isize).clamp(0, self.zres as isize - 1) as usize;

        self.fetch(x0, y0, z0)
    }

    fn sample_trilinear(&self, p: Vector3f) -> Float {
        let x = p.x * (self.xres as Float - 1.0);
        let y = p.y * (self.yres as Float - 1.0);
        let z = p.z * (self.zres as Float - 1.0);

        let x0 = x.floor() as isize;
        let y0 = y.floor() as isize;
        let z0 = z.floor() as isize;

        let tx = x - x0 as Float;
        let ty = y - y0 as Float;
        let tz = z - z0 as Float;

        let x0u = x0.clamp(0, self.xres as isize - 1) as usize;
        let y0u = y0.clamp(0, self.yres as isize - 1) as usize;
        let z0u = z0.clamp(0, self.zres as isize - 1) as usize;
        let x1u = (x0 + 1).clamp(0, self.xres as isize - 1) as usize;
        let y1u = (y0 + 1).clamp(0, self.yres as isize - 1) as usize;
        let z1u = (z0 + 1).clamp(0, self.zres as isize - 1) as usize;

        let c000 = self.fetch(x0u, y0u, z0u);
        let c100 = self.fetch(x1u, y0u, z0u);
        let c010 = self.fetch(x0u, y1u, z0u);
        let c110 = self.fetch(x1u, y1u, z0u);
        let c001 = self.fetch(x0u, y0u, z1u);
        let c101 = self.fetch(x1u, y0u, z1u);
        let c011 = self.fetch(x0u, y1u, z1u);
        let c111 = self.fetch(x1u, y1u, z1u);

        let c00 = c000 * (1.0 - tx) + c100 * tx;
        let c10 = c010 * (1.0 - tx) + c110 * tx;
        let c01 = c001 * (1.0 - tx) + c101 * tx;
        let c11 = c011 * (1.0 - tx) + c111 * tx;

        let c0 = c00 * (1.0 - ty) + c10 * ty;
        let c1 = c01 * (1.0 - ty) + c11 * ty;

        c0 * (1.0 - tz) + c1 * tz
    }
}

/// Regular scalar grid with world-space bounds. The grid storage is shared
/// with the sampler handle, so a committed interval context stays valid for
/// as long as it is referenced.
pub struct GridVolume {
    data: Arc<GridData>,
    geometry: GeometryHandle,
    filter_mode: VolumeFilterMode,
}

impl GridVolume {
    pub fn from_data(
        data: Vec<Float>,
        xres: usize,
        yres: usize,
        zres: usize,
        bounds: AABB,
    ) -> Result<Self, String> {
        if xres == 0 || yres == 0 || zres == 0 {
            return Err("grid dimensions must be positive".to_string());
        }
        if data.len() != xres * yres * zres {
            return Err(format!(
                "grid data size {} does not match {}x{}x{}",
                data.len(),
                xres,
                yres,
                zres
            ));
        }

        Ok(Self {
            data: Arc::new(GridData { data, xres, yres, zres, bounds }),
            geometry: GeometryHandle::alloc(),
            filter_mode: VolumeFilterMode::Trilinear,
        })
    }

    /// Load a Mitsuba `.vol` file (version 3, float32 encoding, 1 channel).
    pub fn from_file(path: &str) -> Result<Self, String> {
        log::info!("Loading volume grid from: {}.", path);
        let bytes = fs::read(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
        let mut cursor = 4usize;

        if bytes.len() < 4 {
            return Err("vol file too small".to_string());
        }
        if &bytes[0..3] != b"VOL" {
            return Err("invalid vol header".to_string());
        }
        let version = bytes[3];
        if version != 3 {
            return Err(format!("unsupported vol version: {}", version));
        }

        let encoding = read_i32(&bytes, &mut cursor)?;
        let xres = read_i32(&bytes, &mut cursor)?;
        let yres = read_i32(&bytes, &mut cursor)?;
        let zres = read_i32(&bytes, &mut cursor)?;
        let channels = read_i32(&bytes, &mut cursor)?;

        if encoding != 1 {
            return Err(format!("unsupported vol encoding: {}", encoding));
        }
        if xres <= 0 || yres <= 0 || zres <= 0 {
            return Err("vol dimensions must be positive".to_string());
        }
        if channels != 1 {
            return Err(format!("expected scalar vol data, got {} channels", channels));
        }

        let min_x = read_f32(&bytes, &mut cursor)?;
        let min_y = read_f32(&bytes, &mut cursor)?;
        let min_z = read_f32(&bytes, &mut cursor)?;
        let max_x = read_f32(&bytes, &mut cursor)?;
        let max_y = read_f32(&bytes, &mut cursor)?;
        let max_z = read_f32(&bytes, &mut cursor)?;
        let bounds = AABB::new(
            Vector3f::new(min_x, min_y, min_z),
            Vector3f::new(max_x, max_y, max_z),
        );

        let xres = xres as usize;
        let yres = yres as usize;
        let zres = zres as usize;
        let expected = xres
            .checked_mul(yres)
            .and_then(|v| v.checked_mul(zres))
            .ok_or_else(|| "vol dimensions overflow".to_string())?;
        let mut data = Vec::with_capacity(expected);

        for _ in 0..expected {
            data.push(read_f32(&bytes, &mut cursor)?);
        }

        Self::from_data(data, xres, yres, zres, bounds)
    }

    pub fn set_filter_mode(&mut self, filter_mode: VolumeFilterMode) {
        self.filter_mode = filter_mode;
    }
}

impl Volume for GridVolume {
    fn bounds(&self) -> AABB {
        self.data.bounds
    }

    fn sampler(&self) -> Option<Arc<dyn FieldSampler>> {
        Some(Arc::new(GridSampler {
            data: Arc::clone(&self.data),
            filter_mode: self.filter_mode,
        }))
    }

    fn geometry_handle(&self) -> GeometryHandle {
        self.geometry
    }
}

pub struct GridSampler {
    data: Arc<GridData>,
    filter_mode: VolumeFilterMode,
}

impl FieldSampler for GridSampler {
    fn eval(&self, p_world: Vector3f) -> Float {
        let diag = self.data.bounds.diagonal();
        if diag.x.abs() < 1e-8 || diag.y.abs() < 1e-8 || diag.z.abs() < 1e-8 {
            return 0.0;
        }

        let p = Vector3f::new(
            ((p_world.x - self.data.bounds.p_min.x) / diag.x).clamp(0.0, 1.0),
            ((p_world.y - self.data.bounds.p_min.y) / diag.y).clamp(0.0, 1.0),
            ((p_world.z - self.data.bounds.p_min.z) / diag.z).clamp(0.0, 1.0),
        );

        match self.filter_mode {
            VolumeFilterMode::Nearest => self.data.sample_nearest(p),
            VolumeFilterMode::Trilinear => self.data.sample_trilinear(p),
        }
    }
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, String> {
    if *cursor + 4 > bytes.len() {
        return Err("unexpected eof while reading i32".to_string());
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*cursor..*cursor + 4]);
    *cursor += 4;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32(bytes: &[u8], cursor: &mut usize) -> Result<Float, String> {
    if *cursor + 4 > bytes.len() {
        return Err("unexpected eof while reading f32".to_string());
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*cursor..*cursor + 4]);
    *cursor += 4;
    Ok(Float::from_le_bytes(buf))
}
