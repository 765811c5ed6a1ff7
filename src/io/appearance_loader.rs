// Copyright @yucwang 2026

use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::params::ParameterStore;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, UInt, Vector3f};
use crate::math::range::Range1f;
use crate::transfer::piecewise_linear::PiecewiseLinearTransferFunction;
use crate::volumes::const_volume::ConstantVolume;
use crate::volumes::grid_volume::GridVolume;

#[derive(Debug)]
pub enum AppearanceLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for AppearanceLoadError {
    fn from(err: std::io::Error) -> Self {
        AppearanceLoadError::Io(err)
    }
}

/// Parse an XML appearance description into a populated parameter store.
///
/// The store carries the `volume` and `transfer_function` references plus
/// any scalar parameters found at the top level; committing a model against
/// it is the caller's job.
pub fn load_appearance<P: AsRef<Path>>(path: P) -> Result<ParameterStore, AppearanceLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_appearance(&xml, base_dir)
}

pub fn parse_appearance(xml: &str, base_dir: &Path) -> Result<ParameterStore, AppearanceLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut params = ParameterStore::new();

    let mut in_transfer_function = false;
    let mut tf_lower: Option<Float> = None;
    let mut tf_upper: Option<Float> = None;
    let mut tf_opacities: Option<Vec<Float>> = None;
    let mut tf_colors: Vec<Vector3f> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"volume" => {
                    let mut volume_type: Option<String> = None;
                    let mut filename: Option<String> = None;
                    let mut value: Option<Float> = None;
                    let mut bounds_min: Option<Vector3f> = None;
                    let mut bounds_max: Option<Vector3f> = None;
                    for attr in e.attributes().flatten() {
                        let raw = attr.unescape_value().unwrap_or_default();
                        match attr.key.as_ref() {
                            b"type" => volume_type = Some(raw.to_string()),
                            b"filename" => filename = Some(raw.to_string()),
                            b"value" => value = Some(parse_float(&raw)?),
                            b"bounds_min" => bounds_min = Some(parse_vec3(&raw)?),
                            b"bounds_max" => bounds_max = Some(parse_vec3(&raw)?),
                            _ => {}
                        }
                    }

                    match volume_type.as_deref() {
                        Some("grid") => {
                            let filename =
                                filename.ok_or(AppearanceLoadError::MissingField("volume.filename"))?;
                            let filename = if Path::new(&filename).is_absolute() {
                                filename
                            } else {
                                base_dir.join(filename).to_string_lossy().to_string()
                            };
                            let volume = GridVolume::from_file(&filename)
                                .map_err(AppearanceLoadError::Parse)?;
                            params.set_volume("volume", Arc::new(volume));
                        }
                        Some("constant") => {
                            let value =
                                value.ok_or(AppearanceLoadError::MissingField("volume.value"))?;
                            let min = bounds_min
                                .ok_or(AppearanceLoadError::MissingField("volume.bounds_min"))?;
                            let max = bounds_max
                                .ok_or(AppearanceLoadError::MissingField("volume.bounds_max"))?;
                            let volume = ConstantVolume::new(value, AABB::new(min, max));
                            params.set_volume("volume", Arc::new(volume));
                        }
                        Some(other) => {
                            return Err(AppearanceLoadError::Parse(format!(
                                "unsupported volume type: {}",
                                other
                            )));
                        }
                        None => {
                            return Err(AppearanceLoadError::MissingField("volume.type"));
                        }
                    }
                }
                b"transferfunction" => {
                    in_transfer_function = true;
                    tf_lower = None;
                    tf_upper = None;
                    tf_opacities = None;
                    tf_colors = Vec::new();
                }
                b"float" => {
                    let (name, value) = named_value(&e)?;
                    if let (Some(name), Some(value)) = (name, value) {
                        if in_transfer_function {
                            match name.as_str() {
                                "lower" => tf_lower = Some(parse_float(&value)?),
                                "upper" => tf_upper = Some(parse_float(&value)?),
                                _ => {}
                            }
                        } else {
                            params.set_float(&name, parse_float(&value)?);
                        }
                    }
                }
                b"integer" => {
                    let (name, value) = named_value(&e)?;
                    if let (Some(name), Some(value)) = (name, value) {
                        if !in_transfer_function {
                            params.set_uint(&name, parse_uint(&value)?);
                        }
                    }
                }
                b"string" => {
                    let (name, value) = named_value(&e)?;
                    if let (Some(name), Some(value)) = (name, value) {
                        if in_transfer_function && name == "opacities" {
                            tf_opacities = Some(parse_float_list(&value)?);
                        }
                    }
                }
                b"rgb" => {
                    let (name, value) = named_value(&e)?;
                    if let (Some(name), Some(value)) = (name, value) {
                        if in_transfer_function && name == "color" {
                            tf_colors.push(parse_vec3(&value)?);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"transferfunction" && in_transfer_function {
                    let lower =
                        tf_lower.ok_or(AppearanceLoadError::MissingField("transferfunction.lower"))?;
                    let upper =
                        tf_upper.ok_or(AppearanceLoadError::MissingField("transferfunction.upper"))?;
                    let opacities = tf_opacities
                        .take()
                        .ok_or(AppearanceLoadError::MissingField("transferfunction.opacities"))?;
                    let colors = if tf_colors.is_empty() {
                        vec![Vector3f::new(1.0, 1.0, 1.0)]
                    } else {
                        std::mem::take(&mut tf_colors)
                    };

                    let tf = PiecewiseLinearTransferFunction::new(
                        Range1f::new(lower, upper),
                        colors,
                        opacities,
                    );
                    params.set_transfer_function("transfer_function", Arc::new(tf));
                    in_transfer_function = false;
                }
            }
            Err(e) => {
                return Err(AppearanceLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    Ok(params)
}

fn named_value(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<(Option<String>, Option<String>), AppearanceLoadError> {
    let mut name_attr: Option<String> = None;
    let mut value_attr: Option<String> = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => name_attr = Some(attr.unescape_value().unwrap_or_default().to_string()),
            b"value" => value_attr = Some(attr.unescape_value().unwrap_or_default().to_string()),
            _ => {}
        }
    }
    Ok((name_attr, value_attr))
}

fn parse_float(value: &str) -> Result<Float, AppearanceLoadError> {
    value
        .parse::<Float>()
        .map_err(|_| AppearanceLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_uint(value: &str) -> Result<UInt, AppearanceLoadError> {
    value
        .parse::<UInt>()
        .map_err(|_| AppearanceLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_float_list(value: &str) -> Result<Vec<Float>, AppearanceLoadError> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(parse_float)
        .collect()
}

fn parse_vec3(value: &str) -> Result<Vector3f, AppearanceLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| AppearanceLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| AppearanceLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| AppearanceLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}
