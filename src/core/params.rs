// Copyright @yucwang 2026

use crate::core::transfer_function::TransferFunction;
use crate::core::volume::Volume;
use crate::math::constants::{Float, UInt};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub enum ParamValue {
    Float(Float),
    UInt(UInt),
    Volume(Arc<dyn Volume>),
    TransferFunction(Arc<dyn TransferFunction>),
}

impl std::fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            ParamValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            ParamValue::Volume(_) => f.write_str("Volume(..)"),
            ParamValue::TransferFunction(_) => f.write_str("TransferFunction(..)"),
        }
    }
}

/// Named, typed parameter bag driving an appearance model. The renderer
/// fills it in; commit only ever reads it. A getter whose stored value has
/// a different type behaves as if the parameter were absent.
#[derive(Default, Clone, Debug)]
pub struct ParameterStore {
    params: HashMap<String, ParamValue>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self { params: HashMap::new() }
    }

    pub fn set(&mut self, name: &str, value: ParamValue) {
        self.params.insert(name.to_string(), value);
    }

    pub fn set_float(&mut self, name: &str, value: Float) {
        self.set(name, ParamValue::Float(value));
    }

    pub fn set_uint(&mut self, name: &str, value: UInt) {
        self.set(name, ParamValue::UInt(value));
    }

    pub fn set_volume(&mut self, name: &str, volume: Arc<dyn Volume>) {
        self.set(name, ParamValue::Volume(volume));
    }

    pub fn set_transfer_function(&mut self, name: &str, tf: Arc<dyn TransferFunction>) {
        self.set(name, ParamValue::TransferFunction(tf));
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get_float(&self, name: &str, default: Float) -> Float {
        match self.params.get(name) {
            Some(ParamValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn get_uint(&self, name: &str, default: UInt) -> UInt {
        match self.params.get(name) {
            Some(ParamValue::UInt(v)) => *v,
            _ => default,
        }
    }

    pub fn get_volume(&self, name: &str) -> Option<Arc<dyn Volume>> {
        match self.params.get(name) {
            Some(ParamValue::Volume(v)) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    pub fn get_transfer_function(&self, name: &str) -> Option<Arc<dyn TransferFunction>> {
        match self.params.get(name) {
            Some(ParamValue::TransferFunction(tf)) => Some(Arc::clone(tf)),
            _ => None,
        }
    }
}
