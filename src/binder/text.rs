// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Delimited-text binder,
//! grounded on `binder/text.go`.
//!
//! Rust has no `reflect.StructField` walk, so instead of a struct tag
//! interpreted via reflection, a target type implements [`TextBindable`]
//! to hand the binder a list of [`FieldSlot`]s: one per `text:"..."`-
//! tagged field in the original, each carrying the literal tag text and
//! a closure that performs the kind-specific coercion and assignment.
//! An embedded/anonymous struct in the original becomes the implementer
//! appending the embedded type's own `text_fields()` to its list.

use crate::error::{Error, ErrorKind, Result};

/// One `text:"<index>[,<separator>]"`-tagged field.
pub struct FieldSlot<'a> {
    /// The tag text exactly as it would have appeared in the original's
    /// struct tag, e.g. `"0,,"` or `"1"`.
    pub tag: &'a str,
    /// Coerces the selected slice into the field's declared kind and
    /// assigns it.
    pub set: Box<dyn FnMut(&str) -> Result<()> + 'a>,
}

impl<'a> FieldSlot<'a> {
    pub fn new(tag: &'a str, set: impl FnMut(&str) -> Result<()> + 'a) -> Self {
        FieldSlot {
            tag,
            set: Box::new(set),
        }
    }
}

/// Implemented by types that can be populated from a delimited-text
/// payload. See the module docs for why this replaces reflection.
pub trait TextBindable {
    fn text_fields(&mut self) -> Vec<FieldSlot<'_>>;
}

/// Slices a payload into substrings by the given separator, and binds
/// each tagged field from the slice at its tag's index.
pub struct TextBinder;

impl TextBinder {
    pub fn bind<T: TextBindable>(&self, payload: &[u8], target: &mut T) -> Result<()> {
        if payload.is_empty() {
            return Err(Error::new(ErrorKind::BindError, "invalid payload"));
        }
        let text = std::str::from_utf8(payload)
            .map_err(|err| Error::new(ErrorKind::BindError, format!("invalid utf-8 payload: {err}")))?;

        for mut slot in target.text_fields() {
            if slot.tag.is_empty() {
                continue;
            }
            let mut parts = slot.tag.splitn(2, ',');
            let idx_part = parts.next().unwrap_or_default();
            let sep = parts.next().unwrap_or_default();

            let idx: usize = idx_part
                .parse()
                .map_err(|_| Error::new(ErrorKind::TagError, format!("invalid text index: {idx_part:?}")))?;

            let splits: Vec<&str> = if sep.is_empty() {
                vec![text]
            } else {
                text.split(sep).collect()
            };

            let value = splits
                .get(idx)
                .ok_or_else(|| Error::new(ErrorKind::TagError, "invalid text index"))?;

            (slot.set)(value)?;
        }
        Ok(())
    }
}

pub static TEXT: TextBinder = TextBinder;

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner {
        salary: i64,
        x: Option<i64>,
    }

    impl TextBindable for Inner {
        fn text_fields(&mut self) -> Vec<FieldSlot<'_>> {
            vec![
                FieldSlot::new("3,,", |raw| {
                    crate::binder::scalar::Scalar::assign(raw, &mut self.salary)
                }),
                FieldSlot::new("1,,", |raw| crate::binder::scalar::Scalar::assign(raw, &mut self.x)),
            ]
        }
    }

    struct Binding {
        name: String,
        age: i64,
        text: String,
        inner: Inner,
    }

    impl TextBindable for Binding {
        fn text_fields(&mut self) -> Vec<FieldSlot<'_>> {
            let mut slots = vec![
                FieldSlot::new("0,,", |raw| {
                    self.name = raw.to_string();
                    Ok(())
                }),
                FieldSlot::new("1,,", |raw| crate::binder::scalar::Scalar::assign(raw, &mut self.age)),
                FieldSlot::new("0", |raw| {
                    self.text = raw.to_string();
                    Ok(())
                }),
            ];
            slots.extend(self.inner.text_fields());
            slots
        }
    }

    #[test]
    fn scenario_text_binding() {
        let payload = b"john,50,male,10000";
        let mut obj = Binding {
            name: String::new(),
            age: 0,
            text: String::new(),
            inner: Inner { salary: 0, x: None },
        };
        TEXT.bind(payload, &mut obj).unwrap();
        assert_eq!(obj.name, "john");
        assert_eq!(obj.age, 50);
        assert_eq!(obj.text, "john,50,male,10000");
        assert_eq!(obj.inner.salary, 10000);
        assert_eq!(obj.inner.x, Some(50));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        struct OutOfRange;
        impl TextBindable for OutOfRange {
            fn text_fields(&mut self) -> Vec<FieldSlot<'_>> {
                vec![FieldSlot::new("5,,", |_| Ok(()))]
            }
        }
        assert!(TEXT.bind(b"a,b", &mut OutOfRange).is_err());
    }

    #[test]
    fn empty_payload_is_an_error() {
        struct Empty;
        impl TextBindable for Empty {
            fn text_fields(&mut self) -> Vec<FieldSlot<'_>> {
                vec![]
            }
        }
        assert!(TEXT.bind(b"", &mut Empty).is_err());
    }
}
