// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session event types.

use std::sync::Arc;

use crate::types::{ConnectionState, Message, ToolInfo};

/// Notifications emitted by a device session.
///
/// These mirror the callback notifications one to one, for consumers that
/// prefer an async stream over callbacks.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The combined connection state settled.
    ConnectionChanged {
        /// The device the session belongs to.
        tool: Arc<ToolInfo>,
        /// The new state.
        state: ConnectionState,
    },

    /// A message arrived on the command channel.
    CommandMessage {
        /// The device the session belongs to.
        tool: Arc<ToolInfo>,
        /// The received message.
        message: Message,
    },

    /// A message arrived on the event channel.
    EventMessage {
        /// The device the session belongs to.
        tool: Arc<ToolInfo>,
        /// The received message.
        message: Message,
    },
}

impl SessionEvent {
    /// Returns the device this event belongs to.
    #[must_use]
    pub fn tool(&self) -> &ToolInfo {
        match self {
            Self::ConnectionChanged { tool, .. }
            | Self::CommandMessage { tool, .. }
            | Self::EventMessage { tool, .. } => tool,
        }
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionChanged { .. })
    }

    /// Returns the carried message for message events.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::CommandMessage { message, .. } | Self::EventMessage { message, .. } => {
                Some(message)
            }
            Self::ConnectionChanged { .. } => None,
        }
    }
}
