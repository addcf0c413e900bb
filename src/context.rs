// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Request context, grounded on `context.go` and
//! `context_test.go`.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::binder::{JsonBinder, TextBindable, TextBinder, TopicBindable, TopicBinder};
use crate::error::{Error, ErrorKind, Result};
use crate::options::Options;

/// The inbound publish a handler is reacting to. Deliberately decoupled
/// from `rumqttc`'s own packet type (unlike the original, which holds a
/// `*paho.Publish` directly) so [`Context`] stays constructible in
/// tests without a live MQTT connection.
#[derive(Debug, Clone)]
pub struct Request {
    pub topic: String,
    pub payload: Vec<u8>,
    pub response_topic: Option<String>,
    pub correlation_data: Option<Vec<u8>>,
}

/// A data container passed to every route handler: it carries the
/// inbound request, the topic parameters extracted from it, and
/// accumulates the outbound response payload.
pub struct Context {
    pub request: Request,
    pub params: HashMap<String, Vec<String>>,
    options: Options,
    response: Option<Vec<u8>>,
}

impl Context {
    #[must_use]
    pub fn new(request: Request, params: HashMap<String, Vec<String>>, options: Options) -> Self {
        Context {
            request,
            params,
            options,
            response: None,
        }
    }

    /// Returns the topic parameter named `key`, joining multi-level
    /// captures with `/`, or an empty string if `key` wasn't captured.
    #[must_use]
    pub fn param(&self, key: &str) -> String {
        self.params
            .get(key)
            .map(|levels| levels.join("/"))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_raw_string(&self) -> String {
        String::from_utf8_lossy(&self.request.payload).into_owned()
    }

    #[must_use]
    pub fn get_raw_data(&self) -> &[u8] {
        &self.request.payload
    }

    /// Serializes `value` as JSON into the response payload.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        self.response = Some(
            serde_json::to_vec(value)
                .map_err(|err| Error::new(ErrorKind::EncodeError, format!("json: {err}")))?,
        );
        Ok(())
    }

    /// Writes `data` into the response payload verbatim.
    pub fn data(&mut self, data: impl Into<Vec<u8>>) {
        self.response = Some(data.into());
    }

    /// Writes `value` into the response payload verbatim. The original
    /// takes a `format` string and `values...` (`fmt.Sprintf`); callers
    /// here build the formatted string themselves with `format!`.
    pub fn string(&mut self, value: impl Into<String>) {
        self.response = Some(value.into().into_bytes());
    }

    pub fn bind_topic<T: TopicBindable>(&self, obj: &mut T) -> Result<()> {
        static BINDER: TopicBinder = TopicBinder;
        BINDER.bind(&self.params, obj)
    }

    pub fn should_bind_topic<T: TopicBindable + Validate>(&self, obj: &mut T) -> Result<()> {
        self.bind_topic(obj)?;
        obj.validate()?;
        Ok(())
    }

    pub fn bind_json<T: DeserializeOwned + Serialize + Default>(&self, obj: &mut T) -> Result<()> {
        static BINDER: JsonBinder = JsonBinder;
        BINDER.bind(&self.request.payload, obj, &self.options)
    }

    pub fn should_bind_json<T>(&self, obj: &mut T) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Default + Validate,
    {
        self.bind_json(obj)?;
        obj.validate()?;
        Ok(())
    }

    pub fn bind_text<T: TextBindable>(&self, obj: &mut T) -> Result<()> {
        static BINDER: TextBinder = TextBinder;
        BINDER.bind(&self.request.payload, obj)
    }

    pub fn should_bind_text<T: TextBindable + Validate>(&self, obj: &mut T) -> Result<()> {
        self.bind_text(obj)?;
        obj.validate()?;
        Ok(())
    }

    /// Takes the accumulated response payload, leaving `None` behind.
    /// Used by the engine after a handler returns to decide whether
    /// (and what) to publish back to `request.response_topic`.
    pub(crate) fn take_response(&mut self) -> Option<Vec<u8>> {
        self.response.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{FieldSlot, TopicSlot};
    use serde_derive::{Deserialize, Serialize};
    use validator::Validate;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
    struct Binding {
        #[validate(length(min = 1))]
        name: String,
        #[validate(range(min = 40))]
        age: i64,
    }

    impl TextBindable for Binding {
        fn text_fields(&mut self) -> Vec<FieldSlot<'_>> {
            vec![
                FieldSlot::new("0,-", |raw| {
                    self.name = raw.to_string();
                    Ok(())
                }),
                FieldSlot::new("1,-", |raw| {
                    crate::binder::Scalar::assign(raw, &mut self.age)
                }),
            ]
        }
    }

    impl TopicBindable for Binding {
        fn topic_fields(&mut self) -> Vec<TopicSlot<'_>> {
            vec![
                TopicSlot::scalar("name", |raw| {
                    self.name = raw.to_string();
                    Ok(())
                }),
                TopicSlot::scalar("age", |raw| {
                    crate::binder::Scalar::assign(raw, &mut self.age)
                }),
            ]
        }
    }

    fn request(payload: &str) -> Request {
        Request {
            topic: "test".to_string(),
            payload: payload.as_bytes().to_vec(),
            response_topic: None,
            correlation_data: None,
        }
    }

    #[test]
    fn should_bind_json_validates_after_binding() {
        let ctx = Context::new(request(r#"{"name":"john","age":50}"#), HashMap::new(), Options::default());
        let mut obj = Binding::default();
        ctx.should_bind_json(&mut obj).unwrap();
        assert_eq!(obj, Binding { name: "john".to_string(), age: 50 });

        let ctx = Context::new(request(r#"{"name":"","age":30}"#), HashMap::new(), Options::default());
        assert!(ctx.should_bind_json(&mut obj).is_err());
    }

    #[test]
    fn should_bind_text() {
        let ctx = Context::new(request("john-50-96-10"), HashMap::new(), Options::default());
        let mut obj = Binding::default();
        ctx.should_bind_text(&mut obj).unwrap();
        assert_eq!(obj, Binding { name: "john".to_string(), age: 50 });
    }

    #[test]
    fn should_bind_topic() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), vec!["john".to_string()]);
        params.insert("age".to_string(), vec!["50".to_string()]);
        params.insert(
            "last".to_string(),
            vec!["sex", "a", "b", "c"].into_iter().map(str::to_string).collect(),
        );
        let ctx = Context::new(request(""), params, Options::default());
        let mut obj = Binding::default();
        ctx.should_bind_topic(&mut obj).unwrap();
        assert_eq!(obj, Binding { name: "john".to_string(), age: 50 });
    }

    #[test]
    fn json_writes_response() {
        #[derive(Serialize)]
        struct Person {
            name: String,
            age: i64,
        }
        let mut ctx = Context::new(request(""), HashMap::new(), Options::default());
        ctx.json(&Person {
            name: "john".to_string(),
            age: 50,
        })
        .unwrap();
        assert_eq!(ctx.take_response().unwrap(), br#"{"name":"john","age":50}"#.to_vec());
    }

    #[test]
    fn string_and_data_write_response() {
        let mut ctx = Context::new(request(""), HashMap::new(), Options::default());
        ctx.string("hello");
        assert_eq!(ctx.take_response().unwrap(), b"hello".to_vec());

        let mut ctx = Context::new(request(""), HashMap::new(), Options::default());
        ctx.data(b"hello".to_vec());
        assert_eq!(ctx.take_response().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn param_joins_multi_level_capture() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), vec!["john".to_string()]);
        params.insert("age".to_string(), vec!["50".to_string()]);
        params.insert(
            "last".to_string(),
            vec!["a", "b", "c"].into_iter().map(str::to_string).collect(),
        );
        let ctx = Context::new(request(""), params, Options::default());
        assert_eq!(ctx.param("name"), "john");
        assert_eq!(ctx.param("age"), "50");
        assert_eq!(ctx.param("last"), "a/b/c");
        assert_eq!(ctx.param("missing"), "");
    }
}
