// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Default log formatter, grounded on the original's logrus
//! `textFormatter` and written against `env_logger` rather than a bespoke `log::Log`
//! implementation.

use std::io::Write;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Installs the default formatter: `YYYY-MM-DD HH:MM:SS.mmm [LEVEL]
/// [MQRR] message`, ANSI-colored per level unless `disable_colors` is
/// set. Safe to call more than once; only the first call wins.
pub fn init(disable_colors: bool, filter: LevelFilter) {
    let mut builder = Builder::from_default_env();
    builder.filter_level(filter);
    builder.format(move |buf, record| {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let level = record.level();
        if disable_colors {
            writeln!(buf, "{timestamp} [{level}] [MQRR] {}", record.args())
        } else {
            let mut style = buf.style();
            let colored = match level {
                log::Level::Error => style.set_color(env_logger::fmt::Color::Red),
                log::Level::Warn => style.set_color(env_logger::fmt::Color::Yellow),
                log::Level::Info => style.set_color(env_logger::fmt::Color::Cyan),
                log::Level::Debug | log::Level::Trace => style.set_color(env_logger::fmt::Color::Ansi256(8)),
            };
            writeln!(
                buf,
                "{timestamp} [{}] [MQRR] {}",
                colored.value(level),
                record.args()
            )
        }
    });
    let _ = builder.try_init();
}

/// Prints a route-registration line when running in debug mode, the
/// analogue of the original's `debugPrint`.
pub(crate) fn debug_print(args: std::fmt::Arguments<'_>) {
    if crate::mode::is_debugging() {
        log::info!(target: "mqrr", "{args}");
    }
}

macro_rules! debug_print {
    ($($arg:tt)*) => {
        $crate::logger::debug_print(format_args!($($arg)*))
    };
}

pub(crate) use debug_print;
