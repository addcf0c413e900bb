// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! `Engine`/`Client` run configuration, grounded on
//! `hebo/src/config/log.rs`'s pattern of one `#[serde(default = "...")]`
//! function per field.

use std::path::Path;
use std::time::Duration;

use serde_derive::Deserialize;

use crate::error::Result;
use crate::options::Options;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Broker URL, e.g. `mqtt://localhost:1883`.
    pub broker: String,

    /// Keep-alive interval in seconds. Defaults to 30.
    #[serde(default = "Config::default_keep_alive_secs")]
    keep_alive_secs: u16,

    /// Running mode: `"debug"` or `"release"`.
    #[serde(default = "Config::default_mode")]
    pub mode: String,

    #[serde(default)]
    pub use_number: bool,

    #[serde(default)]
    pub disallow_unknown_fields: bool,

    #[serde(default)]
    pub log_disable_colors: bool,
}

impl Config {
    pub const fn default_keep_alive_secs() -> u16 {
        30
    }

    pub fn default_mode() -> String {
        crate::mode::DEBUG_MODE.to_string()
    }

    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }

    #[must_use]
    pub fn options(&self) -> Options {
        Options {
            use_number: self.use_number,
            disallow_unknown_fields: self.disallow_unknown_fields,
            log_disable_colors: self.log_disable_colors,
        }
    }

    /// Loads a config from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| crate::error::Error::new(crate::error::ErrorKind::ConfigError, format!("{err}")))?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            broker: String::new(),
            keep_alive_secs: Self::default_keep_alive_secs(),
            mode: Self::default_mode(),
            use_number: false,
            disallow_unknown_fields: false,
            log_disable_colors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg: Config = toml::from_str(r#"broker = "mqtt://localhost:1883""#).unwrap();
        assert_eq!(cfg.keep_alive(), Duration::from_secs(30));
        assert_eq!(cfg.mode, "debug");
        assert!(!cfg.use_number);
        assert!(!cfg.disallow_unknown_fields);
    }
}
