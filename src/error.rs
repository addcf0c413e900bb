// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

use std::fmt::{self, Display};

/// Represent the types of errors a caller of this crate may observe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A topic pattern failed to compile (empty segment, empty param
    /// name, `*` not in the final position).
    PatternError,

    /// `Engine::run` was called with no routes registered.
    NoRouteError,

    /// The broker URL could not be parsed.
    UrlError,

    /// The underlying MQTT client failed to connect, subscribe, or
    /// publish.
    ConnectionError,

    /// A binder was handed a nil/empty payload or a payload whose
    /// shape does not match the target object.
    BindError,

    /// A binder tag names a field index outside of the split payload,
    /// or a tag itself could not be parsed.
    TagError,

    /// A scalar value failed to coerce into the field's declared kind.
    CoercionError,

    /// `ShouldBind*` ran the validator and it reported a problem.
    ValidationError,

    /// `Context::JSON` failed to serialize the given value.
    EncodeError,

    /// The caller's request was cancelled or its deadline elapsed.
    CancelledError,

    /// The config file could not be parsed.
    ConfigError,
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::new(ErrorKind::UrlError, format!("invalid broker url: {err}"))
    }
}

impl From<rumqttc::v5::ClientError> for Error {
    fn from(err: rumqttc::v5::ClientError) -> Self {
        Error::new(ErrorKind::ConnectionError, format!("{err}"))
    }
}

impl From<rumqttc::v5::ConnectionError> for Error {
    fn from(err: rumqttc::v5::ConnectionError) -> Self {
        Error::new(ErrorKind::ConnectionError, format!("{err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::BindError, format!("json: {err}"))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::new(ErrorKind::CoercionError, format!("{err}"))
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::new(ErrorKind::CoercionError, format!("{err}"))
    }
}

impl From<std::str::ParseBoolError> for Error {
    fn from(err: std::str::ParseBoolError) -> Self {
        Error::new(ErrorKind::CoercionError, format!("{err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Error::new(ErrorKind::ValidationError, format!("{err}"))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorKind::ConfigError, format!("config: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
