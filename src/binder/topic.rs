// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Topic-parameter binder,
//! grounded on `binder/topic.go`.

use std::collections::HashMap;

use crate::error::Result;

/// One `topic:"<name>"`-tagged field. `Sequence` is the
/// ordered-sequence-of-strings case (a `Vec<String>` field assigned the
/// matched levels directly); `Scalar` is everything else, joined with
/// `/` and coerced.
pub enum TopicSlot<'a> {
    Scalar {
        tag: &'a str,
        set: Box<dyn FnMut(&str) -> Result<()> + 'a>,
    },
    Sequence {
        tag: &'a str,
        set: Box<dyn FnMut(Vec<String>) + 'a>,
    },
}

impl<'a> TopicSlot<'a> {
    pub fn scalar(tag: &'a str, set: impl FnMut(&str) -> Result<()> + 'a) -> Self {
        TopicSlot::Scalar {
            tag,
            set: Box::new(set),
        }
    }

    pub fn sequence(tag: &'a str, set: impl FnMut(Vec<String>) + 'a) -> Self {
        TopicSlot::Sequence {
            tag,
            set: Box::new(set),
        }
    }

    fn tag(&self) -> &'a str {
        match self {
            TopicSlot::Scalar { tag, .. } | TopicSlot::Sequence { tag, .. } => tag,
        }
    }
}

/// Implemented by types that can be populated from a topic-parameter
/// map (a [`crate::Context`]'s captured topic parameters).
pub trait TopicBindable {
    fn topic_fields(&mut self) -> Vec<TopicSlot<'_>>;
}

pub struct TopicBinder;

impl TopicBinder {
    /// Binds `target`'s tagged fields from `params`. A field whose tag
    /// is absent from `params` is left untouched, mirroring
    /// `binder/topic.go`'s `if levels, ok := m[key]; ok`.
    pub fn bind<T: TopicBindable>(&self, params: &HashMap<String, Vec<String>>, target: &mut T) -> Result<()> {
        for slot in target.topic_fields() {
            let Some(levels) = params.get(slot.tag()) else {
                continue;
            };
            match slot {
                TopicSlot::Sequence { mut set, .. } => (set)(levels.clone()),
                TopicSlot::Scalar { mut set, .. } => {
                    let joined = levels.join("/");
                    (set)(&joined)?;
                }
            }
        }
        Ok(())
    }
}

pub static TOPIC: TopicBinder = TopicBinder;

#[cfg(test)]
mod tests {
    use super::*;

    struct Binding {
        name: String,
        age: i64,
        last: String,
        slice: Vec<String>,
    }

    impl TopicBindable for Binding {
        fn topic_fields(&mut self) -> Vec<TopicSlot<'_>> {
            vec![
                TopicSlot::scalar("name", |raw| {
                    self.name = raw.to_string();
                    Ok(())
                }),
                TopicSlot::scalar("age", |raw| crate::binder::scalar::Scalar::assign(raw, &mut self.age)),
                TopicSlot::scalar("last", |raw| {
                    self.last = raw.to_string();
                    Ok(())
                }),
                TopicSlot::sequence("last", |levels| {
                    self.slice = levels;
                }),
            ]
        }
    }

    #[test]
    fn scenario_topic_binding() {
        let mut params = HashMap::new();
        params.insert("name".to_string(), vec!["john".to_string()]);
        params.insert("age".to_string(), vec!["50".to_string()]);
        params.insert(
            "last".to_string(),
            vec!["male".to_string(), "tester".to_string()],
        );

        let mut obj = Binding {
            name: String::new(),
            age: 0,
            last: String::new(),
            slice: Vec::new(),
        };
        TOPIC.bind(&params, &mut obj).unwrap();
        assert_eq!(obj.name, "john");
        assert_eq!(obj.age, 50);
        assert_eq!(obj.last, "male/tester");
        assert_eq!(obj.slice, vec!["male".to_string(), "tester".to_string()]);
    }

    #[test]
    fn missing_key_leaves_field_untouched() {
        let params = HashMap::new();
        let mut obj = Binding {
            name: "unchanged".to_string(),
            age: 7,
            last: String::new(),
            slice: Vec::new(),
        };
        TOPIC.bind(&params, &mut obj).unwrap();
        assert_eq!(obj.name, "unchanged");
        assert_eq!(obj.age, 7);
    }
}
