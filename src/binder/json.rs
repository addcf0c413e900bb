// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Structured-payload (JSON) binder,
//! grounded on `binder/json.go`.
//!
//! The original decodes into `interface{}` with `Decoder.UseNumber()`
//! toggling whether a JSON number becomes a `float64` or a `json.Number`
//! (itself `type Number string`, preserving the literal digits). Rust's
//! `serde_json::Value` always keeps integers and floats apart
//! internally, so [`JsonValue`] is built by converting a parsed `Value`
//! tree rather than a custom `Deserializer`; `use_number` only changes
//! whether a number leaf carries its original digit string
//! ([`JsonNumber`]) or a decoded `f64`.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};
use crate::options::Options;

/// A JSON number kept in its original textual form, mirroring Go's
/// `json.Number` (`type Number string`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonNumber(pub String);

impl JsonNumber {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A dynamically-typed JSON tree, the target of a binder call that has
/// no concrete Rust type to deserialize into (the `interface{}`
/// analogue).
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(JsonNumber),
    Float(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(IndexMap<String, JsonValue>),
}

pub struct JsonBinder;

impl JsonBinder {
    /// Binds `payload` into a concrete `T` via `serde`. When
    /// `opts.disallow_unknown_fields` is set, any top-level object key
    /// in `payload` absent from `T`'s own serialized field set is
    /// rejected first, mirroring `Decoder.DisallowUnknownFields`.
    pub fn bind<T>(&self, payload: &[u8], target: &mut T, opts: &Options) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        if opts.disallow_unknown_fields {
            Self::reject_unknown_fields::<T>(payload)?;
        }
        *target = serde_json::from_slice(payload)?;
        Ok(())
    }

    fn reject_unknown_fields<T: Serialize + Default>(payload: &[u8]) -> Result<()> {
        let given: serde_json::Value = serde_json::from_slice(payload)?;
        let Some(given) = given.as_object() else {
            return Ok(());
        };
        let shape = serde_json::to_value(T::default())
            .map_err(|err| Error::new(ErrorKind::BindError, format!("cannot derive field shape: {err}")))?;
        let Some(allowed) = shape.as_object() else {
            return Ok(());
        };
        for key in given.keys() {
            if !allowed.contains_key(key) {
                return Err(Error::new(
                    ErrorKind::BindError,
                    format!("json: unknown field {key:?}"),
                ));
            }
        }
        Ok(())
    }

    /// Decodes `payload` into a dynamic [`JsonValue`] tree, honoring
    /// `use_number`. This is the path a handler takes when it doesn't
    /// know the payload's shape ahead of time (the dynamic-binding side of
    /// `Context.JSON`).
    pub fn decode_value(&self, payload: &[u8], use_number: bool) -> Result<JsonValue> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        Ok(Self::convert(value, use_number))
    }

    fn convert(value: serde_json::Value, use_number: bool) -> JsonValue {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => {
                if use_number {
                    JsonValue::Number(JsonNumber(n.to_string()))
                } else {
                    JsonValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(|v| Self::convert(v, use_number)).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::convert(v, use_number)))
                    .collect(),
            ),
        }
    }
}

pub static JSON: JsonBinder = JsonBinder;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_derive::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: i64,
    }

    #[test]
    fn scenario_typed_binding() {
        let opts = Options::default();
        let mut person = Person::default();
        JSON.bind(br#"{"name":"john","age":50}"#, &mut person, &opts)
            .unwrap();
        assert_eq!(
            person,
            Person {
                name: "john".to_string(),
                age: 50
            }
        );
    }

    #[test]
    fn unknown_field_is_rejected_when_requested() {
        let opts = Options {
            disallow_unknown_fields: true,
            ..Options::default()
        };
        let mut person = Person::default();
        let err = JSON
            .bind(br#"{"name":"john","age":50,"extra":1}"#, &mut person, &opts)
            .unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::BindError);
    }

    #[test]
    fn unknown_field_is_allowed_by_default() {
        let opts = Options::default();
        let mut person = Person::default();
        JSON.bind(br#"{"name":"john","age":50,"extra":1}"#, &mut person, &opts)
            .unwrap();
        assert_eq!(person.name, "john");
    }

    #[test]
    fn use_number_preserves_digit_string() {
        let decoded = JSON.decode_value(br#"{"age":50}"#, true).unwrap();
        let JsonValue::Object(obj) = decoded else {
            panic!("expected object");
        };
        assert_eq!(obj["age"], JsonValue::Number(JsonNumber("50".to_string())));
    }

    #[test]
    fn without_use_number_yields_float() {
        let decoded = JSON.decode_value(br#"{"age":50}"#, false).unwrap();
        let JsonValue::Object(obj) = decoded else {
            panic!("expected object");
        };
        assert_eq!(obj["age"], JsonValue::Float(50.0));
    }
}
