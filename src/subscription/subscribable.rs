// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that emit session notifications.

use crate::subscription::SubscriptionId;
use crate::types::{ConnectionState, Message, ToolInfo};

/// Trait for types that support notification subscriptions.
///
/// Every callback receives the [`ToolInfo`] of the emitting device first.
/// Callbacks run on whatever thread the underlying channel delivers on;
/// keep them short and never block in them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use toolink::{DeviceSession, Subscribable};
/// use toolink::transport::MemoryTransport;
/// use toolink::types::ToolInfo;
///
/// let session = DeviceSession::new(
///     ToolInfo::new("192.168.1.20", 5000)?,
///     Arc::new(MemoryTransport::new()),
///     Arc::new(MemoryTransport::new()),
/// );
///
/// let id = session.on_connection_changed(|tool, state| {
///     println!("{} is now {state}", tool.display_name());
/// });
/// assert!(session.unsubscribe(id));
/// # Ok::<(), toolink::Error>(())
/// ```
pub trait Subscribable {
    /// Subscribes to settled connection state changes.
    fn on_connection_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, ConnectionState) + Send + Sync + 'static;

    /// Subscribes to messages received on the command channel.
    fn on_command_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static;

    /// Subscribes to messages received on the event channel.
    fn on_event_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
