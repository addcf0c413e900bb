// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Explicit tunables threaded through [`crate::Engine`], [`crate::Client`]
//! and the JSON binder, instead of process-wide globals.

/// Switches that control binder and logging behavior.
///
/// Defaults leave every switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// When set, the structured-payload binder preserves numeric leaves
    /// of a generic container as exact literal text instead of
    /// converting them to a float.
    pub use_number: bool,

    /// When set, the structured-payload binder fails if the payload has
    /// keys absent from the target type.
    pub disallow_unknown_fields: bool,

    /// When set, ANSI color codes are stripped from the default log
    /// formatter's output.
    pub log_disable_colors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            use_number: false,
            disallow_unknown_fields: false,
            log_disable_colors: false,
        }
    }
}
