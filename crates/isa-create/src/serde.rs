use std::collections::BTreeMap;

use isa_core::errors::{ErrorInfo, IsaError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub(crate) fn serde_error(code: &str, err: impl ToString) -> IsaError {
    IsaError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, IsaError> {
    let value =
        serde_json::to_value(value).map_err(|err| serde_error("isa_create.json_encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical)
        .map_err(|err| serde_error("isa_create.json_write", err))?;
    Ok(bytes)
}

/// Restores a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, IsaError> {
    serde_json::from_slice(data).map_err(|err| serde_error("isa_create.json_read", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, IsaError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("isa_create.yaml_encode", err))
}

/// Restores a value from YAML bytes.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, IsaError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("isa_create.yaml_read", err))
}
