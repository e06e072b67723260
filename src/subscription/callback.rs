// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for session notifications.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::types::{ConnectionState, Message, ToolInfo};

/// Unique identifier for a subscription.
///
/// Returned when subscribing and used to unsubscribe later. IDs are unique
/// within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type ConnectionCallback = Arc<dyn Fn(&ToolInfo, ConnectionState) + Send + Sync>;

type MessageCallback = Arc<dyn Fn(&ToolInfo, &Message) + Send + Sync>;

/// Registry of session notification callbacks.
///
/// Thread-safe via `parking_lot::RwLock`. Dispatch copies the callback list
/// out of the lock before calling, so a callback may subscribe or
/// unsubscribe without deadlocking. Callbacks of one kind run in no
/// particular order.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    connection_callbacks: RwLock<HashMap<SubscriptionId, ConnectionCallback>>,
    command_message_callbacks: RwLock<HashMap<SubscriptionId, MessageCallback>>,
    event_message_callbacks: RwLock<HashMap<SubscriptionId, MessageCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connection_callbacks: RwLock::new(HashMap::new()),
            command_message_callbacks: RwLock::new(HashMap::new()),
            event_message_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for settled connection state changes.
    pub fn on_connection_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, ConnectionState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connection_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for command channel messages.
    pub fn on_command_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.command_message_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for event channel messages.
    pub fn on_event_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.event_message_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.connection_callbacks.write().remove(&id).is_some()
            || self.command_message_callbacks.write().remove(&id).is_some()
            || self.event_message_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.connection_callbacks.write().clear();
        self.command_message_callbacks.write().clear();
        self.event_message_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a connection state change.
    pub fn dispatch_connection_changed(&self, tool: &ToolInfo, state: ConnectionState) {
        let callbacks: Vec<_> = self.connection_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(tool, state);
        }
    }

    /// Dispatches a command channel message.
    pub fn dispatch_command_message(&self, tool: &ToolInfo, message: &Message) {
        let callbacks: Vec<_> = self
            .command_message_callbacks
            .read()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(tool, message);
        }
    }

    /// Dispatches an event channel message.
    pub fn dispatch_event_message(&self, tool: &ToolInfo, message: &Message) {
        let callbacks: Vec<_> = self
            .event_message_callbacks
            .read()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(tool, message);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.connection_callbacks.read().len()
            + self.command_message_callbacks.read().len()
            + self.event_message_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
