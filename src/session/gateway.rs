// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter operations gated on the combined connection state.

use std::sync::Arc;

use crate::config::ProtocolConfig;
use crate::state::ConnectionStateMachine;
use crate::transport::Transport;

/// Forwards parameter requests to the command channel.
///
/// Every request is refused with `false`, without touching the channel,
/// unless the session is [`Connected`](crate::types::ConnectionState::Connected).
pub(crate) struct ParameterGateway<T> {
    channel: Arc<T>,
    machine: Arc<ConnectionStateMachine>,
    protocol: ProtocolConfig,
}

impl<T: Transport> ParameterGateway<T> {
    pub(crate) fn new(
        channel: Arc<T>,
        machine: Arc<ConnectionStateMachine>,
        protocol: ProtocolConfig,
    ) -> Self {
        Self {
            channel,
            machine,
            protocol,
        }
    }

    pub(crate) fn protocol(&self) -> &ProtocolConfig {
        &self.protocol
    }

    fn is_open(&self) -> bool {
        let state = self.machine.current();
        if !state.is_connected() {
            tracing::trace!(state = ?state, "Refusing parameter request while not connected");
            return false;
        }
        true
    }

    pub(crate) fn get_param(&self, address: u16, count: u16, merge: bool) -> bool {
        self.is_open() && self.channel.get_param(address, count, merge)
    }

    pub(crate) fn set_param(&self, address: u16, value: i32) -> bool {
        self.is_open() && self.channel.set_param(address, value)
    }

    pub(crate) fn set_real_time_monitor(&self, address: u16, state: i32) -> bool {
        self.set_param(address, state)
    }

    pub(crate) fn set_graph_monitor(&self, address: u16, state: i32) -> bool {
        self.set_param(address, state)
    }

    pub(crate) fn set_event_monitor(&self, address: u16, state: i32) -> bool {
        self.set_param(address, state)
    }

    pub(crate) fn get_device_state(&self, address: u16, count: u16) -> bool {
        self.get_param(address, count, false)
    }

    /// Writes the monitor heartbeat acknowledgment.
    pub(crate) fn acknowledge_monitor(&self) -> bool {
        self.set_param(self.protocol.event_ack_address, self.protocol.event_ack_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryTransport, TransportCall};
    use crate::types::{ChannelKind, ConnectionState};

    fn gateway() -> (ParameterGateway<MemoryTransport>, Arc<MemoryTransport>, Arc<ConnectionStateMachine>) {
        let channel = Arc::new(MemoryTransport::with_kind(ChannelKind::Network));
        channel.connect("h", 1);
        channel.complete_connect();
        channel.clear_calls();
        let machine = Arc::new(ConnectionStateMachine::new());
        let gateway =
            ParameterGateway::new(Arc::clone(&channel), Arc::clone(&machine), ProtocolConfig::default());
        (gateway, channel, machine)
    }

    #[test]
    fn refuses_without_channel_call_unless_connected() {
        let (gateway, channel, machine) = gateway();

        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Disconnecting,
        ] {
            machine.force(state);
            assert!(!gateway.get_param(1, 1, false));
            assert!(!gateway.set_param(1, 1));
            assert!(!gateway.set_real_time_monitor(4002, 1));
            assert!(!gateway.set_graph_monitor(4100, 1));
            assert!(!gateway.set_event_monitor(4015, 1));
            assert!(!gateway.get_device_state(3300, 14));
            assert!(!gateway.acknowledge_monitor());
        }
        assert!(channel.calls().is_empty());
    }

    #[test]
    fn forwards_when_connected() {
        let (gateway, channel, machine) = gateway();
        machine.force(ConnectionState::Connected);

        assert!(gateway.get_param(10, 4, true));
        assert!(gateway.set_param(11, -5));
        assert!(gateway.get_device_state(3300, 14));
        assert!(gateway.acknowledge_monitor());

        assert_eq!(
            channel.calls(),
            vec![
                TransportCall::GetParam { address: 10, count: 4, merge: true },
                TransportCall::SetParam { address: 11, value: -5 },
                TransportCall::GetParam { address: 3300, count: 14, merge: false },
                TransportCall::SetParam { address: 4016, value: 1 },
            ]
        );
    }

    #[test]
    fn channel_refusal_is_reported() {
        let (gateway, channel, machine) = gateway();
        machine.force(ConnectionState::Connected);
        channel.set_max_queue_size(0);

        assert!(!gateway.set_param(1, 1));
        assert_eq!(channel.calls().len(), 1);
    }

    #[test]
    fn acknowledgment_uses_configured_register() {
        let channel = Arc::new(MemoryTransport::new());
        channel.complete_connect();
        let machine = Arc::new(ConnectionStateMachine::new());
        machine.force(ConnectionState::Connected);
        let protocol = ProtocolConfig {
            event_ack_address: 5016,
            event_ack_value: 3,
            ..ProtocolConfig::default()
        };
        let gateway = ParameterGateway::new(Arc::clone(&channel), machine, protocol);

        assert!(gateway.acknowledge_monitor());
        assert_eq!(
            channel.drain_queue(),
            vec![TransportCall::SetParam { address: 5016, value: 3 }]
        );
    }
}
