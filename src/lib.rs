// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! A request/response framework over MQTT v5.
//!
//! An [`Engine`] routes inbound publishes to handlers by topic pattern,
//! the way an HTTP router dispatches by path, using MQTT v5's
//! `ResponseTopic`/`CorrelationData` properties to reply to whichever
//! peer made the request. A [`Client`] is the other side of that
//! exchange: it makes a request and waits for the matching response.
//!
//! ```no_run
//! use rrmq::Engine;
//!
//! # async fn run() -> rrmq::Result<()> {
//! let mut engine = Engine::new();
//! engine.route("echo/:name", |c| {
//!     let name = c.param("name");
//!     c.string(format!("hello, {name}"));
//! });
//! let handle = engine.run("mqtt://localhost:1883").await?;
//! handle.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod client;
pub mod config;
pub mod context;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod gate;
pub mod group;
pub mod logger;
pub mod mode;
pub mod options;
pub mod topic;
mod transport;

pub use binder::{JsonBinder, JsonNumber, JsonValue, Scalar, TextBindable, TextBinder, TopicBindable, TopicBinder};
pub use client::{request_once, Client};
pub use config::Config;
pub use context::{Context, Request};
pub use correlation::Correlation;
pub use engine::{Engine, EngineHandle, Handler};
pub use error::{Error, ErrorKind, Result};
pub use gate::ConnectionGate;
pub use group::Group;
pub use options::Options;
pub use topic::{CompiledPattern, ParamIndex};
