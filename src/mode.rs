// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Debug/release mode, kept as a small process-wide knob for parity with
//! the original `SetMode`/`IsDebugging` call sites. Everything else that
//! used to be a process-wide toggle in the original is now carried
//! explicitly in [`crate::Options`].

use std::sync::atomic::{AtomicBool, Ordering};

pub const DEBUG_MODE: &str = "debug";
pub const RELEASE_MODE: &str = "release";

static DEBUGGING: AtomicBool = AtomicBool::new(true);

/// Sets the running mode. Accepts `"debug"` or `"release"`; an empty
/// string is treated as `"debug"`.
///
/// # Panics
///
/// Panics if `value` is neither mode name, matching the original's
/// fail-fast behavior for a programmer error.
pub fn set_mode(value: &str) {
    let value = if value.is_empty() { DEBUG_MODE } else { value };
    match value {
        DEBUG_MODE => DEBUGGING.store(true, Ordering::SeqCst),
        RELEASE_MODE => DEBUGGING.store(false, Ordering::SeqCst),
        other => panic!("mode unknown: {other}"),
    }
}

/// Returns `true` if the framework is running in debug mode, which
/// enables verbose route-registration printing in [`crate::Engine::run`].
#[must_use]
pub fn is_debugging() -> bool {
    DEBUGGING.load(Ordering::SeqCst)
}
