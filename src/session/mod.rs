// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dual-channel device session.
//!
//! A [`DeviceSession`] drives two transport channels to one device: the
//! command channel at the tool's base port and, for network devices, the
//! event channel one port above it. It folds both channels' connection
//! signals into a single [`ConnectionState`] and only forwards parameter
//! requests while that state is `Connected`.
//!
//! Nothing here blocks. `connect()`, `disconnect()` and parameter requests
//! hand work to the transports and return; results arrive through the
//! notifications.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use toolink::{DeviceSession, Subscribable};
//! use toolink::transport::MemoryTransport;
//! use toolink::types::{ChannelKind, ConnectionState, ToolInfo};
//!
//! let command = Arc::new(MemoryTransport::new());
//! let event = Arc::new(MemoryTransport::new());
//! let session = DeviceSession::new(
//!     ToolInfo::new("192.168.1.20", 5000)?,
//!     Arc::clone(&command),
//!     Arc::clone(&event),
//! );
//!
//! session.set_up(ChannelKind::Network);
//! session.connect();
//! assert_eq!(session.state(), ConnectionState::Connecting);
//!
//! command.complete_connect();
//! assert_eq!(session.state(), ConnectionState::Connecting);
//! event.complete_connect();
//! assert_eq!(session.state(), ConnectionState::Connected);
//!
//! assert!(session.get_device_state());
//! # Ok::<(), toolink::Error>(())
//! ```

mod gateway;
mod relay;

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{ProtocolConfig, SessionConfig};
use crate::event::{EventBus, SessionEvent};
use crate::state::ConnectionStateMachine;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::transport::Transport;
use crate::types::{ChannelKind, ConnectionState, Message, ToolInfo};

use gateway::ParameterGateway;

/// A logical connection to one device over a command and an event channel.
///
/// `DeviceSession` is cheaply cloneable; clones share the same channels,
/// state and subscribers. The channels only hold weak references back to
/// the session, so dropping the last clone stops all notifications.
pub struct DeviceSession<T: Transport> {
    inner: Arc<SessionInner<T>>,
}

pub(crate) struct SessionInner<T> {
    tool: Arc<ToolInfo>,
    command: Arc<T>,
    event: Arc<T>,
    machine: Arc<ConnectionStateMachine>,
    gateway: ParameterGateway<T>,
    callbacks: CallbackRegistry,
    events: EventBus,
}

impl<T: Transport + 'static> DeviceSession<T> {
    /// Creates a session with the default configuration.
    ///
    /// Registers the session's handlers on both channels, replacing any
    /// handlers registered before.
    #[must_use]
    pub fn new(tool: ToolInfo, command: Arc<T>, event: Arc<T>) -> Self {
        Self::with_config(tool, command, event, SessionConfig::default())
    }

    /// Creates a session with a custom configuration.
    #[must_use]
    pub fn with_config(tool: ToolInfo, command: Arc<T>, event: Arc<T>, config: SessionConfig) -> Self {
        if let Some(size) = config.max_queue_size {
            command.set_max_queue_size(size);
        }
        if let Some(size) = config.max_block_size {
            command.set_max_param_block(size);
        }

        let machine = Arc::new(ConnectionStateMachine::new());
        let gateway = ParameterGateway::new(Arc::clone(&command), Arc::clone(&machine), config.protocol);

        let inner = Arc::new(SessionInner {
            tool: Arc::new(tool),
            command,
            event,
            machine,
            gateway,
            callbacks: CallbackRegistry::new(),
            events: EventBus::with_capacity(config.event_capacity),
        });
        Self::wire(&inner);

        tracing::debug!(
            tool = %inner.tool.id(),
            host = %inner.tool.host(),
            port = inner.tool.base_port(),
            "Created device session"
        );
        Self { inner }
    }

    fn wire(inner: &Arc<SessionInner<T>>) {
        let weak = Arc::downgrade(inner);
        inner.command.on_connection_changed(Arc::new(move |connected: bool| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_connection_changed(connected);
            }
        }));

        let weak = Arc::downgrade(inner);
        inner.event.on_connection_changed(Arc::new(move |connected: bool| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_connection_changed(connected);
            }
        }));

        let weak = Arc::downgrade(inner);
        inner.command.on_message(Arc::new(move |message: Message| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_command_message(message);
            }
        }));

        let weak = Arc::downgrade(inner);
        inner.event.on_message(Arc::new(move |message: Message| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event_message(message);
            }
        }));
    }
}

impl<T: Transport> DeviceSession<T> {
    // ========== Connection ==========

    /// Configures both channels for transport kind `kind`.
    ///
    /// Only [`ChannelKind::Network`] needs two channels. `None` and `Serial`
    /// are ignored: serial devices run a single link the transport manages
    /// itself. Call before [`connect`](Self::connect).
    pub fn set_up(&self, kind: ChannelKind) {
        if !kind.is_network() {
            tracing::debug!(tool = %self.inner.tool.id(), kind = %kind, "Ignoring set-up for single-link kind");
            return;
        }
        self.inner.command.set_kind(kind);
        self.inner.event.set_kind(kind);
        tracing::debug!(tool = %self.inner.tool.id(), kind = %kind, "Configured channels");
    }

    /// Starts connecting both channels.
    ///
    /// Returns without doing anything if the command channel, or a network
    /// event channel, is already connected. Otherwise sets the state to
    /// `Connecting`, dials the command channel at the base port and, for a
    /// network event channel, the event channel at the event port.
    ///
    /// The command channel is always asked to connect, even without a
    /// transport kind; a transport with no kind ignores the request. The
    /// state is still set to `Connecting`, and such a session stays
    /// `Connecting` until `disconnect()`.
    ///
    /// If the event port (base port plus the configured offset) would
    /// exceed `u16::MAX`, the event channel is not dialled.
    pub fn connect(&self) {
        let inner = &self.inner;
        let event_is_network = inner.event.kind().is_network();

        if inner.command.state().is_connected()
            || (event_is_network && inner.event.state().is_connected())
        {
            tracing::trace!(tool = %inner.tool.id(), "Connect skipped, already connected");
            return;
        }

        // Must precede dialing: a transport may complete the connect inline.
        inner.machine.force(ConnectionState::Connecting);

        let host = inner.tool.host();
        if inner.command.kind() == ChannelKind::None {
            tracing::warn!(
                tool = %inner.tool.id(),
                "Command channel has no transport kind, call set_up() first"
            );
        }
        inner.command.connect(host, inner.tool.base_port());

        if event_is_network {
            let offset = inner.gateway.protocol().event_port_offset;
            match inner.tool.event_port_with_offset(offset) {
                Some(port) => inner.event.connect(host, port),
                None => tracing::warn!(
                    tool = %inner.tool.id(),
                    base_port = inner.tool.base_port(),
                    offset,
                    "Event port out of range, event channel not dialled"
                ),
            }
        }
        tracing::debug!(tool = %inner.tool.id(), host = %host, "Connecting");
    }

    /// Starts closing both channels.
    ///
    /// Closes each channel that is currently connected and sets the state
    /// to `Disconnecting`.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let close_command = inner.command.state().is_connected();
        let close_event = inner.event.state().is_connected();

        inner.machine.force(ConnectionState::Disconnecting);
        if close_command {
            inner.command.close();
        }
        if close_event {
            inner.event.close();
        }
        tracing::debug!(tool = %inner.tool.id(), "Disconnecting");
    }

    /// Returns the combined connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.machine.current()
    }

    /// Returns `true` if the session is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the device identity.
    #[must_use]
    pub fn tool_info(&self) -> &ToolInfo {
        &self.inner.tool
    }

    /// Returns the protocol constants used by this session.
    #[must_use]
    pub fn protocol(&self) -> &ProtocolConfig {
        self.inner.gateway.protocol()
    }

    // ========== Transport limits ==========

    /// Returns the command channel's maximum queue depth.
    #[must_use]
    pub fn max_queue_size(&self) -> usize {
        self.inner.command.max_queue_size()
    }

    /// Sets the command channel's maximum queue depth.
    pub fn set_max_queue_size(&self, size: usize) {
        self.inner.command.set_max_queue_size(size);
    }

    /// Returns the command channel's maximum read block size.
    #[must_use]
    pub fn max_block_size(&self) -> u16 {
        self.inner.command.max_param_block()
    }

    /// Sets the command channel's maximum read block size.
    pub fn set_max_block_size(&self, size: u16) {
        self.inner.command.set_max_param_block(size);
    }

    /// Returns the number of requests queued on the command channel.
    #[must_use]
    pub fn queue_count(&self) -> usize {
        self.inner.command.queue_count()
    }

    // ========== Parameters ==========

    /// Requests `count` values starting at `address`.
    ///
    /// With `merge` the reply is merged into values the transport already
    /// cached. Returns `false` if not connected or the channel refused.
    pub fn get_param(&self, address: u16, count: u16, merge: bool) -> bool {
        self.inner.gateway.get_param(address, count, merge)
    }

    /// Writes `value` to `address`.
    ///
    /// Returns `false` if not connected or the channel refused.
    pub fn set_param(&self, address: u16, value: i32) -> bool {
        self.inner.gateway.set_param(address, value)
    }

    /// Enables the real-time monitor at its default register.
    pub fn set_real_time_monitor(&self) -> bool {
        let protocol = self.protocol();
        self.set_real_time_monitor_with(protocol.real_time_monitor_address, protocol.enable_state)
    }

    /// Writes `state` to the real-time monitor register at `address`.
    pub fn set_real_time_monitor_with(&self, address: u16, state: i32) -> bool {
        self.inner.gateway.set_real_time_monitor(address, state)
    }

    /// Enables the graph monitor at its default register.
    pub fn set_graph_monitor(&self) -> bool {
        let protocol = self.protocol();
        self.set_graph_monitor_with(protocol.graph_monitor_address, protocol.enable_state)
    }

    /// Writes `state` to the graph monitor register at `address`.
    pub fn set_graph_monitor_with(&self, address: u16, state: i32) -> bool {
        self.inner.gateway.set_graph_monitor(address, state)
    }

    /// Enables the event monitor at its default register.
    pub fn set_event_monitor(&self) -> bool {
        let protocol = self.protocol();
        self.set_event_monitor_with(protocol.event_monitor_address, protocol.enable_state)
    }

    /// Writes `state` to the event monitor register at `address`.
    pub fn set_event_monitor_with(&self, address: u16, state: i32) -> bool {
        self.inner.gateway.set_event_monitor(address, state)
    }

    /// Reads the default device state window.
    pub fn get_device_state(&self) -> bool {
        let protocol = self.protocol();
        self.get_device_state_with(protocol.device_state_address, protocol.device_state_count)
    }

    /// Reads `count` device state registers starting at `address`.
    pub fn get_device_state_with(&self, address: u16, count: u16) -> bool {
        self.inner.gateway.get_device_state(address, count)
    }

    // ========== Events ==========

    /// Subscribes to the session's notifications as an async stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }
}

impl<T: Transport> Subscribable for DeviceSession<T> {
    fn on_connection_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, ConnectionState) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_connection_changed(callback)
    }

    fn on_command_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_command_message(callback)
    }

    fn on_event_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ToolInfo, &Message) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_event_message(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}

impl<T: Transport> Clone for DeviceSession<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for DeviceSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("tool", &self.inner.tool)
            .field("state", &self.state())
            .field("callbacks", &self.inner.callbacks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::transport::{MemoryTransport, TransportCall};
    use crate::types::{ChannelState, Command};

    struct Fixture {
        session: DeviceSession<MemoryTransport>,
        command: Arc<MemoryTransport>,
        event: Arc<MemoryTransport>,
    }

    fn fixture() -> Fixture {
        let command = Arc::new(MemoryTransport::new());
        let event = Arc::new(MemoryTransport::new());
        let session = DeviceSession::new(
            ToolInfo::new("10.0.0.7", 5000).unwrap(),
            Arc::clone(&command),
            Arc::clone(&event),
        );
        Fixture {
            session,
            command,
            event,
        }
    }

    fn connected_fixture() -> Fixture {
        let f = fixture();
        f.session.set_up(ChannelKind::Network);
        f.session.connect();
        f.command.complete_connect();
        f.event.complete_connect();
        f.command.clear_calls();
        f.event.clear_calls();
        f
    }

    #[test]
    fn construction_registers_handlers() {
        let f = fixture();
        assert!(f.command.has_handlers());
        assert!(f.event.has_handlers());
        assert_eq!(f.session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn set_up_ignores_single_link_kinds() {
        let f = fixture();
        f.session.set_up(ChannelKind::Serial);
        f.session.set_up(ChannelKind::None);
        assert_eq!(f.command.kind(), ChannelKind::None);
        assert_eq!(f.event.kind(), ChannelKind::None);

        f.session.set_up(ChannelKind::Network);
        assert_eq!(f.command.kind(), ChannelKind::Network);
        assert_eq!(f.event.kind(), ChannelKind::Network);
    }

    #[test]
    fn connect_dials_both_ports() {
        let f = fixture();
        f.session.set_up(ChannelKind::Network);
        f.session.connect();

        assert_eq!(
            f.command.calls(),
            vec![TransportCall::Connect { host: "10.0.0.7".to_string(), port: 5000 }]
        );
        assert_eq!(
            f.event.calls(),
            vec![TransportCall::Connect { host: "10.0.0.7".to_string(), port: 5001 }]
        );
        assert_eq!(f.session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn connect_honours_port_offset() {
        let command = Arc::new(MemoryTransport::new());
        let event = Arc::new(MemoryTransport::new());
        let config = SessionConfig::default().with_protocol(ProtocolConfig {
            event_port_offset: 10,
            ..ProtocolConfig::default()
        });
        let session = DeviceSession::with_config(
            ToolInfo::new("h", 6000).unwrap(),
            Arc::clone(&command),
            Arc::clone(&event),
            config,
        );
        session.set_up(ChannelKind::Network);
        session.connect();

        assert_eq!(
            event.calls(),
            vec![TransportCall::Connect { host: "h".to_string(), port: 6010 }]
        );
    }

    #[test]
    fn event_port_overflow_skips_event_dial() {
        let command = Arc::new(MemoryTransport::new());
        let event = Arc::new(MemoryTransport::new());
        let config = SessionConfig::default().with_protocol(ProtocolConfig {
            event_port_offset: 10,
            ..ProtocolConfig::default()
        });
        let session = DeviceSession::with_config(
            ToolInfo::new("h", 65530).unwrap(),
            Arc::clone(&command),
            Arc::clone(&event),
            config,
        );
        session.set_up(ChannelKind::Network);
        session.connect();

        assert_eq!(
            command.calls(),
            vec![TransportCall::Connect { host: "h".to_string(), port: 65530 }]
        );
        assert!(event.calls().is_empty());
        assert_eq!(event.state(), ChannelState::Disconnected);
        assert_eq!(session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn serial_command_channel_connects_alone() {
        let command = Arc::new(MemoryTransport::with_kind(ChannelKind::Serial));
        let event = Arc::new(MemoryTransport::with_kind(ChannelKind::Serial));
        let session = DeviceSession::new(
            ToolInfo::new("COM3", 1).unwrap(),
            Arc::clone(&command),
            Arc::clone(&event),
        );

        session.connect();
        assert_eq!(command.calls().len(), 1);
        assert!(event.calls().is_empty());

        command.complete_connect();
        assert_eq!(session.state(), ConnectionState::Connected);
    }

    #[test]
    fn disconnect_closes_only_connected_channels() {
        let f = connected_fixture();
        f.event.set_state(ChannelState::Disconnected);

        f.session.disconnect();
        assert_eq!(f.command.calls(), vec![TransportCall::Close]);
        assert!(f.event.calls().is_empty());
        assert_eq!(f.session.state(), ConnectionState::Disconnecting);
    }

    #[test]
    fn config_limits_applied_to_command_channel() {
        let command = Arc::new(MemoryTransport::new());
        let event = Arc::new(MemoryTransport::new());
        let config = SessionConfig::default()
            .with_max_queue_size(12)
            .with_max_block_size(40);
        let session = DeviceSession::with_config(
            ToolInfo::new("h", 6000).unwrap(),
            Arc::clone(&command),
            Arc::clone(&event),
            config,
        );

        assert_eq!(session.max_queue_size(), 12);
        assert_eq!(session.max_block_size(), 40);
        assert_eq!(event.max_queue_size(), crate::transport::DEFAULT_MAX_QUEUE_SIZE);

        session.set_max_queue_size(3);
        session.set_max_block_size(7);
        assert_eq!(command.max_queue_size(), 3);
        assert_eq!(command.max_param_block(), 7);
    }

    #[test]
    fn queue_count_reads_command_channel() {
        let f = connected_fixture();
        assert_eq!(f.session.queue_count(), 0);
        assert!(f.session.set_param(1, 2));
        assert!(f.session.get_param(1, 2, false));
        assert_eq!(f.session.queue_count(), 2);
        f.command.drain_queue();
        assert_eq!(f.session.queue_count(), 0);
    }

    #[test]
    fn default_monitor_registers() {
        let f = connected_fixture();
        assert!(f.session.set_real_time_monitor());
        assert!(f.session.set_graph_monitor());
        assert!(f.session.set_event_monitor());
        assert!(f.session.get_device_state());
        assert!(f.session.set_event_monitor_with(4015, 0));

        assert_eq!(
            f.command.calls(),
            vec![
                TransportCall::SetParam { address: 4002, value: 1 },
                TransportCall::SetParam { address: 4100, value: 1 },
                TransportCall::SetParam { address: 4015, value: 1 },
                TransportCall::GetParam { address: 3300, count: 14, merge: false },
                TransportCall::SetParam { address: 4015, value: 0 },
            ]
        );
        assert!(f.event.calls().is_empty());
    }

    #[test]
    fn command_messages_are_relayed_without_ack() {
        let f = connected_fixture();
        let relayed = Arc::new(AtomicU32::new(0));
        let r = relayed.clone();
        f.session.on_command_message(move |_, _| {
            r.fetch_add(1, Ordering::SeqCst);
        });

        f.command
            .inject_message(Message::new(Command::Monitor, 4015, vec![1]));
        assert_eq!(relayed.load(Ordering::SeqCst), 1);
        assert!(f.command.calls().is_empty());
    }

    #[test]
    fn dropped_session_ignores_signals() {
        let f = fixture();
        let Fixture {
            session,
            command,
            event,
        } = f;
        drop(session);

        command.complete_connect();
        event.inject_message(Message::new(Command::Monitor, 4015, vec![]));
        assert!(command.calls().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let f = connected_fixture();
        let clone = f.session.clone();
        assert!(clone.is_connected());
        clone.disconnect();
        assert_eq!(f.session.state(), ConnectionState::Disconnecting);
    }

    #[test]
    fn debug_shows_tool_and_state() {
        let f = fixture();
        let debug = format!("{:?}", f.session);
        assert!(debug.contains("DeviceSession"));
        assert!(debug.contains("Disconnected"));
    }
}
