// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport channel contract.
//!
//! A device session drives two [`Transport`] instances: a command channel
//! for parameter requests and an event channel for pushed notifications.
//! Framing, socket/serial I/O and message parsing live behind this trait.
//!
//! # Threading
//!
//! Every method must return without waiting on the device: `connect`,
//! `close` and parameter requests only enqueue work. Completion surfaces
//! later through the registered handlers, which a transport may call from
//! its own reader thread or task, concurrently with the other channel.
//!
//! Handlers must be invoked without holding any lock that [`state`] or
//! [`kind`] acquire. The connection handler reads both channels' state
//! while the session holds its own lock, so a transport that signals under
//! its state lock deadlocks against the other channel's signal.
//!
//! [`state`]: Transport::state
//! [`kind`]: Transport::kind
//!
//! # Implementations
//!
//! - [`MemoryTransport`]: in-process transport that records calls and lets
//!   its owner complete connects and inject messages

mod memory;

pub use memory::{DEFAULT_MAX_PARAM_BLOCK, DEFAULT_MAX_QUEUE_SIZE, MemoryTransport, TransportCall};

use std::sync::Arc;

use crate::types::{ChannelKind, ChannelState, Message};

/// Handler invoked for every message a channel receives.
pub type MessageHandler = Arc<dyn Fn(Message) + Send + Sync>;

/// Handler invoked when a channel opens (`true`) or closes (`false`).
pub type ConnectionHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// A single transport channel to a device.
pub trait Transport: Send + Sync {
    /// Starts connecting to `host:port`.
    fn connect(&self, host: &str, port: u16);

    /// Starts closing the channel.
    fn close(&self);

    /// Queues a read of `count` values starting at `address`.
    ///
    /// `merge` asks the transport to merge the reply with previously cached
    /// values instead of replacing them. Returns `false` if the request was
    /// not accepted.
    fn get_param(&self, address: u16, count: u16, merge: bool) -> bool;

    /// Queues a write of `value` to `address`.
    ///
    /// Returns `false` if the request was not accepted.
    fn set_param(&self, address: u16, value: i32) -> bool;

    /// Returns the raw state of this channel.
    fn state(&self) -> ChannelState;

    /// Returns the configured transport kind.
    fn kind(&self) -> ChannelKind;

    /// Configures the transport kind.
    fn set_kind(&self, kind: ChannelKind);

    /// Returns the maximum number of queued requests.
    fn max_queue_size(&self) -> usize;

    /// Sets the maximum number of queued requests.
    fn set_max_queue_size(&self, size: usize);

    /// Returns the maximum number of values read in one request.
    fn max_param_block(&self) -> u16;

    /// Sets the maximum number of values read in one request.
    fn set_max_param_block(&self, size: u16);

    /// Returns the number of requests waiting in the queue.
    fn queue_count(&self) -> usize;

    /// Registers the message handler, replacing any previous one.
    fn on_message(&self, handler: MessageHandler);

    /// Registers the connection handler, replacing any previous one.
    ///
    /// The handler calls back into [`state`](Self::state) and
    /// [`kind`](Self::kind) of this and the other channel, so it must be
    /// invoked with no transport lock held.
    fn on_connection_changed(&self, handler: ConnectionHandler);
}
