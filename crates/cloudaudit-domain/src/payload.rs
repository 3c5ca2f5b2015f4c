//! Guarded traversal of nested API payloads.
//!
//! Every step short-circuits on a missing or null field and reports a typed [`FieldError`]
//! instead of faulting, so predicates never run against data that is not there.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field `{path}` is missing")]
    Missing { path: String },

    #[error("field `{path}` is not {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("payload does not match the expected shape: {reason}")]
    Shape { reason: String },
}

/// Walk `path` through nested objects. Null counts as missing.
pub fn field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, FieldError> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        let Some(obj) = current.as_object() else {
            return Err(FieldError::WrongType {
                path: joined(&path[..depth]),
                expected: "an object",
            });
        };
        match obj.get(*key) {
            Some(Value::Null) | None => {
                return Err(FieldError::Missing {
                    path: joined(&path[..=depth]),
                });
            }
            Some(next) => current = next,
        }
    }
    Ok(current)
}

pub fn str_field<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str, FieldError> {
    field(value, path)?
        .as_str()
        .ok_or_else(|| FieldError::WrongType {
            path: joined(path),
            expected: "a string",
        })
}

pub fn bool_field(value: &Value, path: &[&str]) -> Result<bool, FieldError> {
    field(value, path)?
        .as_bool()
        .ok_or_else(|| FieldError::WrongType {
            path: joined(path),
            expected: "a boolean",
        })
}

/// Like [`bool_field`], but a missing field (at any depth) is `Ok(None)`.
///
/// A present field of the wrong type is still an error.
pub fn optional_bool(value: &Value, path: &[&str]) -> Result<Option<bool>, FieldError> {
    match bool_field(value, path) {
        Ok(v) => Ok(Some(v)),
        Err(FieldError::Missing { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Decode a payload into a typed view whose optional fields model the API's optional shape.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, FieldError> {
    T::deserialize(value).map_err(|err| FieldError::Shape {
        reason: err.to_string(),
    })
}

fn joined(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
