//! Typed lookups into a loosely-typed parameter object
//!
//! Share parameters arrive as a JSON object. A present key with the wrong
//! JSON type fails with `InvalidOptionType`; an absent key leaves the
//! builder's default in place.

use serde_json::{Map, Value};

use crate::error::NetAclError;

pub(crate) type Params = Map<String, Value>;

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn wrong_type(option: &str, value: &Value) -> NetAclError {
    NetAclError::InvalidOptionType {
        option: option.to_string(),
        value: render(value),
    }
}

/// A boolean flag. `null` is a type error.
pub(crate) fn flag(params: &Params, key: &str, option: &str) -> Result<Option<bool>, NetAclError> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(wrong_type(option, other)),
    }
}

/// A string-valued option. `null` is a type error.
pub(crate) fn text<'a>(
    params: &'a Params,
    key: &str,
    option: &str,
) -> Result<Option<&'a str>, NetAclError> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(wrong_type(option, other)),
    }
}

/// An access list given either as one colon-separated string or as an array
/// of tokens. `null` means the list was not supplied.
pub(crate) fn access_list(params: &Params, key: &str) -> Result<Option<String>, NetAclError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Array(items)) => {
            let mut tokens = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => tokens.push(s.as_str()),
                    other => return Err(wrong_type(key, other)),
                }
            }
            Ok(Some(tokens.join(":")))
        }
        Some(other) => Err(wrong_type(key, other)),
    }
}
