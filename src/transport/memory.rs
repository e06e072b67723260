// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport.
//!
//! [`MemoryTransport`] never touches the network. It records every call made
//! on it and leaves completion to its owner, which plays the device side:
//!
//! ```text
//! session.connect()  ──►  MemoryTransport::connect()   state = Connecting
//!                                   │
//! owner ─────────────►  complete_connect()             state = Connected
//!                                   │
//!                        on_connection_changed(true) ──►  session
//! ```

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{ConnectionHandler, MessageHandler, Transport};
use crate::types::{ChannelKind, ChannelState, Message};

/// Default request queue depth.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;

/// Default number of values per read request.
pub const DEFAULT_MAX_PARAM_BLOCK: u16 = 120;

/// A call made on a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `connect(host, port)`.
    Connect {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },
    /// `close()`.
    Close,
    /// `get_param(address, count, merge)`.
    GetParam {
        /// Start address.
        address: u16,
        /// Number of values.
        count: u16,
        /// Merge with cached values.
        merge: bool,
    },
    /// `set_param(address, value)`.
    SetParam {
        /// Target address.
        address: u16,
        /// Written value.
        value: i32,
    },
}

struct Inner {
    kind: ChannelKind,
    state: ChannelState,
    max_queue_size: usize,
    max_param_block: u16,
    queue: VecDeque<TransportCall>,
    calls: Vec<TransportCall>,
    on_message: Option<MessageHandler>,
    on_connection_changed: Option<ConnectionHandler>,
}

/// Transport that runs entirely in memory.
///
/// Parameter requests are accepted only while the channel is
/// [`ChannelState::Connected`], the queue has room, and reads stay within
/// the max block size. Accepted requests wait in the queue until
/// [`drain_queue`](Self::drain_queue) is called.
///
/// # Examples
///
/// ```
/// use toolink::transport::{MemoryTransport, Transport, TransportCall};
/// use toolink::types::{ChannelKind, ChannelState};
///
/// let channel = MemoryTransport::with_kind(ChannelKind::Network);
/// channel.connect("10.0.0.7", 5000);
/// assert_eq!(channel.state(), ChannelState::Connecting);
///
/// channel.complete_connect();
/// assert!(channel.set_param(100, 7));
/// assert_eq!(channel.queue_count(), 1);
/// assert_eq!(
///     channel.drain_queue(),
///     vec![TransportCall::SetParam { address: 100, value: 7 }]
/// );
/// ```
pub struct MemoryTransport {
    inner: Mutex<Inner>,
}

impl MemoryTransport {
    /// Creates a disconnected transport of kind [`ChannelKind::None`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(ChannelKind::None)
    }

    /// Creates a disconnected transport of the given kind.
    #[must_use]
    pub fn with_kind(kind: ChannelKind) -> Self {
        Self {
            inner: Mutex::new(Inner {
                kind,
                state: ChannelState::Disconnected,
                max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
                max_param_block: DEFAULT_MAX_PARAM_BLOCK,
                queue: VecDeque::new(),
                calls: Vec::new(),
                on_message: None,
                on_connection_changed: None,
            }),
        }
    }

    /// Marks the channel open and fires the connection handler with `true`.
    pub fn complete_connect(&self) {
        self.signal(ChannelState::Connected, true);
    }

    /// Marks the channel closed and fires the connection handler with `false`.
    pub fn complete_close(&self) {
        self.signal(ChannelState::Disconnected, false);
    }

    /// Simulates the device dropping the link.
    ///
    /// Pending requests are discarded.
    pub fn drop_connection(&self) {
        self.inner.lock().queue.clear();
        self.complete_close();
    }

    /// Sets the raw state without firing any handler.
    pub fn set_state(&self, state: ChannelState) {
        self.inner.lock().state = state;
    }

    /// Fires the connection handler without touching the raw state.
    pub fn fire_connection_changed(&self, connected: bool) {
        let handler = self.inner.lock().on_connection_changed.clone();
        if let Some(handler) = handler {
            handler(connected);
        }
    }

    /// Delivers `message` to the message handler.
    pub fn inject_message(&self, message: Message) {
        let handler = self.inner.lock().on_message.clone();
        if let Some(handler) = handler {
            handler(message);
        }
    }

    /// Returns every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Removes and returns every queued parameter request.
    pub fn drain_queue(&self) -> Vec<TransportCall> {
        self.inner.lock().queue.drain(..).collect()
    }

    /// Returns `true` once both handlers are registered.
    #[must_use]
    pub fn has_handlers(&self) -> bool {
        let inner = self.inner.lock();
        inner.on_message.is_some() && inner.on_connection_changed.is_some()
    }

    fn signal(&self, state: ChannelState, connected: bool) {
        let handler = {
            let mut inner = self.inner.lock();
            inner.state = state;
            inner.on_connection_changed.clone()
        };
        // Handlers run unlocked so they can query this transport.
        if let Some(handler) = handler {
            handler(connected);
        }
    }

    fn enqueue(&self, call: TransportCall) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(call.clone());

        if !inner.state.is_connected() || inner.queue.len() >= inner.max_queue_size {
            return false;
        }
        if let TransportCall::GetParam { count, .. } = call {
            if count == 0 || count > inner.max_param_block {
                return false;
            }
        }
        inner.queue.push_back(call);
        true
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryTransport")
            .field("kind", &inner.kind)
            .field("state", &inner.state)
            .field("queue_count", &inner.queue.len())
            .finish_non_exhaustive()
    }
}

impl Transport for MemoryTransport {
    fn connect(&self, host: &str, port: u16) {
        let mut inner = self.inner.lock();
        // Nothing to dial without a transport kind.
        if inner.kind == ChannelKind::None {
            return;
        }
        inner.calls.push(TransportCall::Connect {
            host: host.to_string(),
            port,
        });
        inner.state = ChannelState::Connecting;
    }

    fn close(&self) {
        let mut inner = self.inner.lock();
        inner.calls.push(TransportCall::Close);
        inner.state = ChannelState::Disconnecting;
    }

    fn get_param(&self, address: u16, count: u16, merge: bool) -> bool {
        self.enqueue(TransportCall::GetParam {
            address,
            count,
            merge,
        })
    }

    fn set_param(&self, address: u16, value: i32) -> bool {
        self.enqueue(TransportCall::SetParam { address, value })
    }

    fn state(&self) -> ChannelState {
        self.inner.lock().state
    }

    fn kind(&self) -> ChannelKind {
        self.inner.lock().kind
    }

    fn set_kind(&self, kind: ChannelKind) {
        self.inner.lock().kind = kind;
    }

    fn max_queue_size(&self) -> usize {
        self.inner.lock().max_queue_size
    }

    fn set_max_queue_size(&self, size: usize) {
        self.inner.lock().max_queue_size = size;
    }

    fn max_param_block(&self) -> u16 {
        self.inner.lock().max_param_block
    }

    fn set_max_param_block(&self, size: u16) {
        self.inner.lock().max_param_block = size;
    }

    fn queue_count(&self) -> usize {
        self.inner.lock().queue.len()
    }

    fn on_message(&self, handler: MessageHandler) {
        self.inner.lock().on_message = Some(handler);
    }

    fn on_connection_changed(&self, handler: ConnectionHandler) {
        self.inner.lock().on_connection_changed = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::types::Command;

    fn connected() -> MemoryTransport {
        let transport = MemoryTransport::with_kind(ChannelKind::Network);
        transport.connect("h", 1);
        transport.complete_connect();
        transport.clear_calls();
        transport
    }

    #[test]
    fn new_transport_is_idle() {
        let transport = MemoryTransport::new();
        assert_eq!(transport.kind(), ChannelKind::None);
        assert_eq!(transport.state(), ChannelState::Disconnected);
        assert_eq!(transport.queue_count(), 0);
        assert!(transport.calls().is_empty());
        assert!(!transport.has_handlers());
    }

    #[test]
    fn connect_and_close_record_calls() {
        let transport = MemoryTransport::with_kind(ChannelKind::Serial);
        transport.connect("10.1.1.1", 8000);
        assert_eq!(transport.state(), ChannelState::Connecting);
        transport.close();
        assert_eq!(transport.state(), ChannelState::Disconnecting);

        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Connect {
                    host: "10.1.1.1".to_string(),
                    port: 8000
                },
                TransportCall::Close,
            ]
        );
    }

    #[test]
    fn connect_without_kind_is_ignored() {
        let transport = MemoryTransport::new();
        transport.connect("10.1.1.1", 8000);
        assert_eq!(transport.state(), ChannelState::Disconnected);
        assert!(transport.calls().is_empty());

        transport.set_kind(ChannelKind::Network);
        transport.connect("10.1.1.1", 8000);
        assert_eq!(transport.state(), ChannelState::Connecting);
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn requests_rejected_while_disconnected() {
        let transport = MemoryTransport::new();
        assert!(!transport.set_param(1, 1));
        assert!(!transport.get_param(1, 1, false));
        assert_eq!(transport.queue_count(), 0);
        assert_eq!(transport.calls().len(), 2);
    }

    #[test]
    fn queue_limit_rejects_overflow() {
        let transport = connected();
        transport.set_max_queue_size(2);

        assert!(transport.set_param(1, 1));
        assert!(transport.set_param(2, 2));
        assert!(!transport.set_param(3, 3));
        assert_eq!(transport.queue_count(), 2);

        transport.drain_queue();
        assert!(transport.set_param(3, 3));
    }

    #[test]
    fn read_block_limit() {
        let transport = connected();
        transport.set_max_param_block(10);

        assert!(transport.get_param(3300, 10, true));
        assert!(!transport.get_param(3300, 11, false));
        assert!(!transport.get_param(3300, 0, false));
        assert_eq!(
            transport.drain_queue(),
            vec![TransportCall::GetParam {
                address: 3300,
                count: 10,
                merge: true
            }]
        );
    }

    #[test]
    fn completion_fires_connection_handler() {
        let transport = MemoryTransport::new();
        let ups = Arc::new(AtomicU32::new(0));
        let downs = Arc::new(AtomicU32::new(0));
        let (u, d) = (ups.clone(), downs.clone());
        transport.on_connection_changed(Arc::new(move |connected: bool| {
            if connected {
                u.fetch_add(1, Ordering::SeqCst);
            } else {
                d.fetch_add(1, Ordering::SeqCst);
            }
        }));

        transport.complete_connect();
        assert_eq!(transport.state(), ChannelState::Connected);
        transport.drop_connection();
        assert_eq!(transport.state(), ChannelState::Disconnected);

        assert_eq!(ups.load(Ordering::SeqCst), 1);
        assert_eq!(downs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_can_read_state_during_signal() {
        let transport = Arc::new(MemoryTransport::new());
        let seen = Arc::new(Mutex::new(None));
        let (t, s) = (Arc::downgrade(&transport), seen.clone());
        transport.on_connection_changed(Arc::new(move |_: bool| {
            if let Some(t) = t.upgrade() {
                *s.lock() = Some(t.state());
            }
        }));

        transport.complete_connect();
        assert_eq!(*seen.lock(), Some(ChannelState::Connected));
    }

    #[test]
    fn inject_message_reaches_handler() {
        let transport = MemoryTransport::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let r = received.clone();
        transport.on_message(Arc::new(move |msg: Message| r.lock().push(msg)));

        transport.inject_message(Message::new(Command::Other(9), 10, vec![1, 2]));
        assert_eq!(received.lock().len(), 1);
        assert_eq!(received.lock()[0].values, vec![1, 2]);
    }

    #[test]
    fn signals_without_handlers_are_noops() {
        let transport = MemoryTransport::new();
        transport.complete_connect();
        transport.fire_connection_changed(false);
        transport.inject_message(Message::new(Command::Read, 0, vec![]));
        assert_eq!(transport.state(), ChannelState::Connected);
    }
}
