// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Request/response correlation,
//! grounded on `client/handler.go`.
//!
//! The original keyed a `map[string]chan *paho.Publish` (buffered to 1)
//! under a mutex. A `tokio::sync::oneshot::Sender` is the same "at most
//! one delivery" guarantee lifted into the type system, so the pending
//! map here holds senders rather than bounded channels.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::context::Request;
use crate::error::{Error, ErrorKind, Result};

/// Tracks in-flight requests by correlation id and delivers each
/// matching response exactly once.
pub struct Correlation {
    response_topic: String,
    pending: Mutex<HashMap<String, tokio::sync::oneshot::Sender<Request>>>,
}

impl Correlation {
    /// Creates a handler owning a fresh, process-unique response topic,
    /// mirroring `NewHandler`'s `fmt.Sprintf("%s/responses", uuid.NewString())`.
    #[must_use]
    pub fn new() -> Self {
        Correlation {
            response_topic: format!("{}/responses", Uuid::new_v4()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn response_topic(&self) -> &str {
        &self.response_topic
    }

    /// Registers a new pending request, returning the correlation id to
    /// stamp on the outbound publish and the receiver that resolves when
    /// a response with that id arrives.
    pub fn register(&self) -> (String, tokio::sync::oneshot::Receiver<Request>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pending
            .lock()
            .expect("correlation mutex poisoned")
            .insert(id.clone(), tx);
        (id, rx)
    }

    /// Cancels a pending request, e.g. after its deadline elapsed.
    /// Mirrors `Handler.Request`'s `ctx.Done()` branch calling
    /// `getCorrelIDChan` purely to evict the entry.
    pub fn cancel(&self, id: &str) {
        self.pending.lock().expect("correlation mutex poisoned").remove(id);
    }

    /// Routes an inbound response publish to its waiting requester, if
    /// any. Mirrors `responseHandler`: a publish with no correlation
    /// data, or one whose id has no pending entry (already delivered or
    /// timed out), is silently dropped.
    pub fn deliver(&self, response: Request) {
        let Some(correlation_id) = response.correlation_data.as_ref() else {
            return;
        };
        let correlation_id = String::from_utf8_lossy(correlation_id).into_owned();
        let sender = self
            .pending
            .lock()
            .expect("correlation mutex poisoned")
            .remove(&correlation_id);
        if let Some(sender) = sender {
            let _ = sender.send(response);
        }
    }

    /// Rejects every pending request, e.g. on disconnect. There is no
    /// direct original counterpart (the Go client never drains
    /// in-flight requests on `Close`); this closes a gap a long-lived
    /// client would otherwise leave open.
    pub fn fail_all(&self) {
        self.pending.lock().expect("correlation mutex poisoned").clear();
    }
}

impl Default for Correlation {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn correlation_id_error() -> Error {
    Error::new(ErrorKind::CancelledError, "request cancelled before a response arrived")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(correlation_data: Option<Vec<u8>>) -> Request {
        Request {
            topic: "resp".to_string(),
            payload: b"hello".to_vec(),
            response_topic: None,
            correlation_data,
        }
    }

    #[tokio::test]
    async fn deliver_resolves_matching_receiver() {
        let correlation = Correlation::new();
        let (id, rx) = correlation.register();
        correlation.deliver(request(Some(id.into_bytes())));
        let response = rx.await.unwrap();
        assert_eq!(response.payload, b"hello".to_vec());
    }

    #[tokio::test]
    async fn deliver_without_correlation_data_is_dropped() {
        let correlation = Correlation::new();
        let (_id, rx) = correlation.register();
        correlation.deliver(request(None));
        correlation.fail_all();
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn cancel_evicts_pending_entry() {
        let correlation = Correlation::new();
        let (id, rx) = correlation.register();
        correlation.cancel(&id);
        correlation.deliver(request(Some(id.into_bytes())));
        assert!(rx.await.is_err());
    }

    #[test]
    fn response_topic_is_unique_per_instance() {
        let a = Correlation::new();
        let b = Correlation::new();
        assert_ne!(a.response_topic(), b.response_topic());
    }
}
