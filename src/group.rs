// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Route grouping by topic prefix, grounded
//! on `group.go`.
//!
//! The original embeds `RouterGroup` in `Engine` and has every group
//! hold a `*Engine` back-pointer. Rust has no embedding and a
//! self-referential `Engine` holding a pointer to itself is awkward, so
//! [`Group`] instead borrows the [`crate::Engine`] it was carved out of
//! for as long as it's alive — the same "all routes ultimately register
//! on one engine" shape, expressed as a borrow rather than a raw
//! back-pointer.

use crate::context::Context;
use crate::engine::Engine;

/// A topic-prefix scope over an [`Engine`]. `Route` calls made through a
/// `Group` join `base` onto the given topic before registering it on the
/// underlying engine.
pub struct Group<'a> {
    pub(crate) engine: &'a mut Engine,
    pub(crate) base: String,
}

/// Joins topic segments with `/`, dropping empty segments so
/// `join_topic("a/", "/b")` and `join_topic("a", "b")` agree, mirroring
/// Go's `path.Join` as used by `buildTopic`/`RouterGroup.Route`.
pub(crate) fn join_topic(segments: &[&str]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|level| !level.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl<'a> Group<'a> {
    pub fn group(&mut self, base: &str) -> Group<'_> {
        Group {
            engine: &mut *self.engine,
            base: join_topic(&[&self.base, base]),
        }
    }

    pub fn route(&mut self, topic: &str, handler: impl Fn(&mut Context) + Send + Sync + 'static) {
        let full = join_topic(&[&self.base, topic]);
        self.engine.route(&full, handler);
    }
}
