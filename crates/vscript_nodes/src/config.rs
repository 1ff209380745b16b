//! Node configuration payloads.
//!
//! Configurations arrive from the host editor as JSON values (the same shape
//! the backend persists). Each node kind owns a typed struct and decodes it
//! on every socket resolution; a payload that fails to decode falls back to
//! the kind's defaults and surfaces as a degraded state, never as an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vscript_core::types::ValueType;

/// A configuration payload that did not decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed configuration: {0}")]
pub struct ConfigError(pub String);

/// Decode a kind's config, degrading to defaults on malformed payloads.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: &Value) -> (T, Option<ConfigError>) {
    match T::deserialize(value) {
        Ok(config) => (config, None),
        Err(err) => (T::default(), Some(ConfigError(err.to_string()))),
    }
}

/// Config for `variable/get` and `variable/set`: which variable to touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableConfig {
    pub name: String,
    /// Set nodes only: whether the write declares a constant.
    pub is_constant: bool,
}

/// One declared parameter on a function-definition node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamConfig {
    pub name: String,
    #[serde(rename = "type", default = "wildcard")]
    pub ty: ValueType,
}

fn wildcard() -> ValueType {
    ValueType::Any
}

fn nil() -> ValueType {
    ValueType::Nil
}

/// Config for `function/define`: the declared signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionDefineConfig {
    pub name: String,
    pub params: Vec<ParamConfig>,
    #[serde(rename = "returnType", default = "nil")]
    pub return_ty: ValueType,
}

impl Default for FunctionDefineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            params: Vec::new(),
            return_ty: ValueType::Nil,
        }
    }
}

/// Config for `function/call` and `function/return`: the referenced
/// function, by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionRefConfig {
    pub function: String,
}

/// How a conditional or loop gets its driving value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// The value is wired in through typed data sockets.
    #[default]
    Linear,
    /// The value is an embedded expression string; no data socket.
    Expression,
}

/// Config for `control/branch` and `control/loop`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlConfig {
    pub mode: ControlMode,
    /// Only read in expression mode.
    pub expression: String,
}

/// Config for `data/pack`: how many elements to collect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackConfig {
    pub count: u32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { count: 2 }
    }
}
