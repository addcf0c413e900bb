// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! The request/response server, grounded on
//! `engine.go`/`engine_test.go`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rumqttc::v5::mqttbytes::v5::PublishProperties;
use rumqttc::v5::mqttbytes::SubscribeFilter;
use rumqttc::v5::AsyncClient;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::context::{Context, Request};
use crate::error::{Error, ErrorKind, Result};
use crate::group::{join_topic, Group};
use crate::logger::debug_print;
use crate::options::Options;
use crate::topic::{self, CompiledPattern, ParamIndex};
use crate::transport::{self, DEFAULT_QOS};

/// A route handler. `Fn` rather than `FnMut` since concurrent requests
/// on the same route run as concurrent tasks, mirroring `engine.go`'s
/// `go engine.handleRequest(...)`.
pub type Handler = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

struct Route {
    /// The absolute MQTT subscription filter this route was compiled
    /// to, e.g. `"MQRR/+/+/#"`.
    subscription: String,
    params: ParamIndex,
    handler: Handler,
    /// The named topic exactly as registered, kept only for
    /// `print_routes`'s debug line.
    named_topic: String,
}

/// The server instance: owns the route table and, once [`Engine::run`]
/// is called, the live broker connection.
pub struct Engine {
    base_topic: String,
    routes: Vec<Route>,
    subscriptions: HashMap<String, ()>,
    options: Options,
}

/// A handle to a running [`Engine`], returned by [`Engine::run`] and its
/// variants. Dropping it leaves the server running in the background;
/// call [`EngineHandle::close`] to shut it down deliberately.
pub struct EngineHandle {
    client: AsyncClient,
    shutdown: Arc<Notify>,
    poll_task: JoinHandle<()>,
    serve_task: JoinHandle<()>,
}

impl EngineHandle {
    /// Disconnects from the broker and waits for the poll and serve
    /// loops to exit, mirroring `Engine.Close`.
    pub async fn close(self) -> Result<()> {
        self.client.disconnect().await?;
        self.shutdown.notify_waiters();
        let _ = self.poll_task.await;
        let _ = self.serve_task.await;
        Ok(())
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Engine {
            base_topic: String::new(),
            routes: Vec::new(),
            subscriptions: HashMap::new(),
            options: Options::default(),
        }
    }

    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Engine {
            options,
            ..Engine::new()
        }
    }

    /// Scopes subsequent routes under `base`, mirroring
    /// `RouterGroup.Group`.
    pub fn group(&mut self, base: &str) -> Group<'_> {
        Group {
            engine: self,
            base: base.to_string(),
        }
    }

    /// Registers `handler` for `topic`, a pattern possibly containing
    /// `:name` (single-level) or `*name` (multi-level, must be last)
    /// captures. Mirrors `Engine.Route`.
    pub fn route(&mut self, topic: &str, handler: impl Fn(&mut Context) + Send + Sync + 'static) {
        let named_topic = join_topic(&[&self.base_topic, topic]);
        let compiled = CompiledPattern::compile(&named_topic).expect("invalid topic pattern");
        self.subscriptions.insert(compiled.subscription.clone(), ());
        self.routes.push(Route {
            subscription: compiled.subscription,
            params: compiled.params,
            handler: Arc::new(handler),
            named_topic,
        });
    }

    /// Connects to `broker` with a 30-second keep-alive, mirroring
    /// `Engine.Run`. Returns once the connection and subscriptions are
    /// established; the handle keeps the server alive until
    /// [`EngineHandle::close`] is called or it is dropped.
    pub async fn run(self, broker: &str) -> Result<EngineHandle> {
        self.run_with_options(broker, Duration::from_secs(30), None).await
    }

    /// Connects to `broker` using the given username/password, mirroring
    /// `Engine.RunUser`.
    pub async fn run_with_auth(self, broker: &str, username: &str, password: &str) -> Result<EngineHandle> {
        self.run_with_options(
            broker,
            Duration::from_secs(30),
            Some((username.to_string(), password.to_string())),
        )
        .await
    }

    /// Connects to `broker` using the given keep-alive and optional
    /// credentials, mirroring `Engine.RunCfg`.
    pub async fn run_with_options(
        mut self,
        broker: &str,
        keep_alive: Duration,
        credentials: Option<(String, String)>,
    ) -> Result<EngineHandle> {
        if self.routes.is_empty() {
            return Err(Error::new(ErrorKind::NoRouteError, "no route found"));
        }
        self.print_routes(broker);

        let minimized: HashMap<String, ()> = topic::minimize_set(&self.subscriptions);
        let mut options = transport::broker_options(broker, keep_alive)?;
        if let Some((user, password)) = credentials {
            options = transport::with_credentials(options, &user, &password);
        }

        let subscribe_to = minimized.keys().cloned().collect::<Vec<_>>();
        let connection = transport::connect(options, move |client| {
            let client = client.clone();
            let filters: Vec<SubscribeFilter> = subscribe_to
                .iter()
                .map(|topic| SubscribeFilter::new(topic.clone(), DEFAULT_QOS))
                .collect();
            tokio::spawn(async move {
                if let Err(err) = client.subscribe_many(filters).await {
                    log::error!("{err}");
                }
            });
        });

        let client = connection.client;
        let mut requests = connection.requests;
        let routes = Arc::new(std::mem::take(&mut self.routes));
        let options = self.options;

        let serve_client = client.clone();
        let serve_task = tokio::spawn(async move {
            while let Some(request) = requests.recv().await {
                for route in routes.iter() {
                    if topic::is_match(&route.subscription, &request.topic) {
                        let client = serve_client.clone();
                        let handler = route.handler.clone();
                        let params = topic::extract(&route.params, &request.topic);
                        let request = request.clone();
                        tokio::spawn(async move {
                            handle_request(client, request, params, handler, options).await;
                        });
                    }
                }
            }
        });

        Ok(EngineHandle {
            client,
            shutdown: connection.shutdown,
            poll_task: connection.task,
            serve_task,
        })
    }

    fn print_routes(&self, broker: &str) {
        for route in &self.routes {
            debug_print(format_args!("{:<25} --> {}", route.named_topic, route.subscription));
        }
        debug_print(format_args!("Listening requests on {broker}"));
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

async fn handle_request(
    client: rumqttc::v5::AsyncClient,
    request: Request,
    params: HashMap<String, Vec<String>>,
    handler: Handler,
    options: Options,
) {
    let topic = request.topic.clone();
    let response_topic = request.response_topic.clone();
    let correlation_data = request.correlation_data.clone();
    let mut ctx = Context::new(request, params, options);

    let start = Instant::now();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        (*handler)(&mut ctx);
    }));
    if let Err(panic) = outcome {
        log::error!("handler panicked: {}", describe_panic(&panic));
        return;
    }
    let elapsed = start.elapsed();
    log::info!("{elapsed:>13?} | {topic:?}");

    let Some(response_topic) = response_topic else {
        return;
    };
    let Some(payload) = ctx.take_response() else {
        return;
    };
    let properties = PublishProperties {
        correlation_data: correlation_data.map(Into::into),
        ..Default::default()
    };
    if let Err(err) = client
        .publish_with_properties(response_topic, DEFAULT_QOS, false, payload, properties)
        .await
    {
        log::error!("{err}");
    }
}

fn describe_panic(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
