// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration.
//!
//! [`ProtocolConfig`] holds the register map constants of the device class.
//! The defaults match the devices in the field and should only be changed
//! for firmware that moved its registers.
//!
//! # Examples
//!
//! ```
//! use toolink::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{
//!     "protocol": { "event_ack_address": 4116 },
//!     "max_queue_size": 32
//! }"#)?;
//!
//! assert_eq!(config.protocol.event_ack_address, 4116);
//! assert_eq!(config.protocol.event_monitor_address, 4015);
//! assert_eq!(config.max_queue_size, Some(32));
//! # Ok::<(), toolink::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// Register addresses and values used by the parameter operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Register toggling the real-time monitor stream.
    pub real_time_monitor_address: u16,
    /// Register toggling the graph monitor stream.
    pub graph_monitor_address: u16,
    /// Register toggling the event monitor stream.
    pub event_monitor_address: u16,
    /// Register acknowledging a monitor heartbeat.
    pub event_ack_address: u16,
    /// Value written to acknowledge a monitor heartbeat.
    pub event_ack_value: i32,
    /// First register of the device state window.
    pub device_state_address: u16,
    /// Number of registers in the device state window.
    pub device_state_count: u16,
    /// Value written to enable a monitor stream.
    pub enable_state: i32,
    /// Distance between the command port and the event port.
    pub event_port_offset: u16,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            real_time_monitor_address: 4002,
            graph_monitor_address: 4100,
            event_monitor_address: 4015,
            event_ack_address: 4016,
            event_ack_value: 1,
            device_state_address: 3300,
            device_state_count: 14,
            enable_state: 1,
            event_port_offset: 1,
        }
    }
}

/// Configuration for a [`DeviceSession`](crate::DeviceSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Register map constants.
    pub protocol: ProtocolConfig,
    /// Capacity of the session's event bus.
    pub event_capacity: usize,
    /// Queue depth applied to the command channel at construction.
    pub max_queue_size: Option<usize>,
    /// Read block size applied to the command channel at construction.
    pub max_block_size: Option<u16>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_queue_size: None,
            max_block_size: None,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the JSON is malformed or has wrong types.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the protocol constants.
    #[must_use]
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the command channel queue depth.
    #[must_use]
    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = Some(size);
        self
    }

    /// Sets the command channel read block size.
    #[must_use]
    pub fn with_max_block_size(mut self, size: u16) -> Self {
        self.max_block_size = Some(size);
        self
    }
}
