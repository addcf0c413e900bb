// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Payload and topic binders, grounded on the `binder/`
//! package of the original: `binder/binding.go`, `binder/text.go`,
//! `binder/topic.go`, `binder/json.go`.

pub mod json;
pub mod scalar;
pub mod text;
pub mod topic;

pub use json::{JsonBinder, JsonNumber, JsonValue, JSON};
pub use scalar::Scalar;
pub use text::{FieldSlot, TextBindable, TextBinder, TEXT};
pub use topic::{TopicBindable, TopicBinder, TopicSlot, TOPIC};
