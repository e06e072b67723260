// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel callback handling: state recomputation and message relay.
//!
//! ```text
//! event channel message ─► callbacks ─► event bus ─► Monitor? ─► ack write
//!                                                                (command channel)
//! ```

use crate::event::SessionEvent;
use crate::state::ChannelSnapshot;
use crate::transport::Transport;
use crate::types::{ConnectionState, Message};

use super::SessionInner;

impl<T: Transport> SessionInner<T> {
    /// Recomputes the combined state after either channel signalled.
    pub(super) fn handle_connection_changed(&self, connected: bool) {
        let changed = self.machine.on_signal(connected, || {
            ChannelSnapshot::new(self.command.state(), self.event.kind(), self.event.state())
        });

        match changed {
            Some(state) => {
                tracing::debug!(tool = %self.tool.id(), state = ?state, "Connection state settled");
                self.notify_connection_changed(state);
            }
            None => {
                tracing::trace!(
                    tool = %self.tool.id(),
                    connected,
                    "Channel signal did not settle connection state"
                );
            }
        }
    }

    fn notify_connection_changed(&self, state: ConnectionState) {
        self.callbacks.dispatch_connection_changed(&self.tool, state);
        self.events.publish(SessionEvent::ConnectionChanged {
            tool: self.tool.clone(),
            state,
        });
    }

    /// Relays a command channel message.
    pub(super) fn handle_command_message(&self, message: Message) {
        tracing::trace!(
            tool = %self.tool.id(),
            command = ?message.command,
            address = message.address,
            "Command channel message"
        );
        self.callbacks.dispatch_command_message(&self.tool, &message);
        self.events.publish(SessionEvent::CommandMessage {
            tool: self.tool.clone(),
            message,
        });
    }

    /// Relays an event channel message, then acknowledges monitor heartbeats.
    ///
    /// The acknowledgment goes out on the command channel. A refused write
    /// is logged and dropped.
    pub(super) fn handle_event_message(&self, message: Message) {
        tracing::trace!(
            tool = %self.tool.id(),
            command = ?message.command,
            address = message.address,
            "Event channel message"
        );
        let is_monitor = message.command.is_monitor();

        self.callbacks.dispatch_event_message(&self.tool, &message);
        self.events.publish(SessionEvent::EventMessage {
            tool: self.tool.clone(),
            message,
        });

        if is_monitor && !self.gateway.acknowledge_monitor() {
            tracing::debug!(tool = %self.tool.id(), "Monitor acknowledgment was not sent");
        }
    }
}
