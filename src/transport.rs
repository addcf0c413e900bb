// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! The MQTT v5 wire connection,
//! grounded on `engine.go`/`client/client.go`'s use of
//! `autopaho.ConnectionManager`.
//!
//! `rumqttc` has no `autopaho` equivalent bundling reconnect and an
//! `OnConnectionUp` hook, so this hand-rolls the minimal shape autopaho
//! gave the original for free: a background task that keeps calling
//! `EventLoop::poll` (which itself transparently reconnects) and runs a
//! caller-supplied callback every time a fresh `ConnAck` arrives.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::v5::mqttbytes::v5::Packet;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, MqttOptions};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use crate::context::Request;
use crate::error::{Error, ErrorKind, Result};

impl From<rumqttc::v5::mqttbytes::v5::Publish> for Request {
    fn from(publish: rumqttc::v5::mqttbytes::v5::Publish) -> Self {
        let (response_topic, correlation_data) = publish
            .properties
            .map(|props| (props.response_topic, props.correlation_data.map(|b| b.to_vec())))
            .unwrap_or((None, None));
        Request {
            topic: String::from_utf8_lossy(&publish.topic).into_owned(),
            payload: publish.payload.to_vec(),
            response_topic,
            correlation_data,
        }
    }
}

/// A live connection to a broker: a handle to publish/subscribe with, a
/// stream of inbound publishes the background poll task forwards as
/// they arrive, and the means to stop that task deliberately.
pub struct Connection {
    pub client: AsyncClient,
    pub requests: mpsc::UnboundedReceiver<Request>,
    /// Notifying this breaks the poll loop on its next iteration.
    pub shutdown: Arc<Notify>,
    /// Resolves once the poll loop has exited.
    pub task: JoinHandle<()>,
}

/// Builds the client options for `broker`, mirroring `engine.go`'s
/// `Run`/`RunUser` (`autopaho.ClientConfig{BrokerUrls, KeepAlive: 30}`).
pub fn broker_options(broker: &str, keep_alive: Duration) -> Result<MqttOptions> {
    let url = Url::parse(broker)?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::new(ErrorKind::UrlError, format!("broker url has no host: {broker}")))?
        .to_string();
    let port = url.port().unwrap_or(1883);
    let mut options = MqttOptions::new(Uuid::new_v4().to_string(), host, port);
    options.set_keep_alive(keep_alive);
    if !url.username().is_empty() {
        options.set_credentials(url.username().to_string(), url.password().unwrap_or_default().to_string());
    }
    Ok(options)
}

/// Adds username/password credentials, mirroring `RunUser`'s
/// `cc.SetUsernamePassword(user, []byte(password))`.
pub fn with_credentials(mut options: MqttOptions, username: &str, password: &str) -> MqttOptions {
    options.set_credentials(username.to_string(), password.to_string());
    options
}

/// Connects using `options`, running `on_connected` every time the
/// broker acknowledges a (re)connection. Spawns the poll loop and
/// returns immediately. The loop runs until `Connection::shutdown` is
/// notified, since a poll error alone never stops it (`rumqttc`
/// transparently reconnects, so a lone disconnect looks identical to a
/// transient error).
pub fn connect(options: MqttOptions, mut on_connected: impl FnMut(&AsyncClient) + Send + 'static) -> Connection {
    let (client, mut eventloop) = AsyncClient::new(options, 64);
    let (tx, rx) = mpsc::unbounded_channel();
    let poll_client = client.clone();
    let shutdown = Arc::new(Notify::new());
    let loop_shutdown = shutdown.clone();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = loop_shutdown.notified() => break,
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => on_connected(&poll_client),
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if tx.send(Request::from(publish)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        log::error!("{err}");
                    }
                },
            }
        }
    });

    Connection {
        client,
        requests: rx,
        shutdown,
        task,
    }
}

pub const DEFAULT_QOS: QoS = QoS::AtMostOnce;
