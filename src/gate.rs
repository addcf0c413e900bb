// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Connection-readiness gate, grounded
//! on `client/client.go`'s `connUp` channel and generalized to a safe,
//! reusable abstraction for reconnect-tolerant readiness.
//!
//! The original closes a `chan struct{}` exactly once, the first time
//! `onConnectionUp` fires (`client.Do(func() { close(client.connUp) })`);
//! every later reconnect skips the `sync.Once` and the channel stays
//! closed. A [`tokio::sync::watch`] channel gives the same "set once,
//! observed forever after by new and old waiters alike" behavior: a
//! `watch::Receiver` created after the value flips to `true` still
//! reads `true` immediately, so the gate is never reset across
//! reconnects.

use tokio::sync::watch;

/// A latch that opens once a client's first successful connection
/// completes, and never closes again.
pub struct ConnectionGate {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl ConnectionGate {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        ConnectionGate { tx, rx }
    }

    /// Opens the gate. Idempotent: later calls (on reconnect) are
    /// no-ops, matching the original's `sync.Once`.
    pub fn open(&self) {
        self.tx.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        });
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the gate is open, or `cancelled` resolves first.
    /// Mirrors `Client.Request`'s `select { case <-connUp: ... case
    /// <-ctx.Done(): ... }`.
    pub async fn wait(&self, cancelled: impl std::future::Future<Output = ()>) -> bool {
        if self.is_open() {
            return true;
        }
        let mut rx = self.rx.clone();
        tokio::select! {
            result = rx.wait_for(|open| *open) => result.is_ok(),
            () = cancelled => false,
        }
    }
}

impl Default for ConnectionGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[tokio::test]
    async fn opens_once_and_stays_open() {
        let gate = ConnectionGate::new();
        assert!(!gate.is_open());
        gate.open();
        assert!(gate.is_open());
        gate.open();
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn late_waiter_observes_already_open_gate() {
        let gate = ConnectionGate::new();
        gate.open();
        assert!(gate.wait(pending()).await);
    }

    #[tokio::test]
    async fn waiter_sees_open_transition() {
        let gate = std::sync::Arc::new(ConnectionGate::new());
        let waiter_gate = gate.clone();
        let waiter = tokio::spawn(async move { waiter_gate.wait(pending()).await });
        gate.open();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn cancellation_wins_if_gate_never_opens() {
        let gate = ConnectionGate::new();
        let cancelled = async {};
        assert!(!gate.wait(cancelled).await);
    }
}
