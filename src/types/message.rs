// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Messages delivered by transport channels.

/// Command identifier of a received message.
///
/// The transport parses frames into one of these; sessions treat every
/// command as opaque except [`Command::Monitor`], the heartbeat that must be
/// acknowledged for the device to keep streaming events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Command {
    /// Reply to a parameter read.
    Read,
    /// Reply to a parameter write.
    Write,
    /// Monitor heartbeat pushed on the event channel.
    Monitor,
    /// Any other command code.
    Other(u16),
}

impl Command {
    /// Returns `true` for the monitor heartbeat.
    #[must_use]
    pub const fn is_monitor(&self) -> bool {
        matches!(self, Self::Monitor)
    }
}

/// A command/address/values triple received on a channel.
///
/// # Examples
///
/// ```
/// use toolink::types::{Command, Message};
///
/// let msg = Message::new(Command::Read, 3300, vec![1, 0, 42]);
/// assert_eq!(msg.address, 3300);
/// assert_eq!(msg.values.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Command identifier.
    pub command: Command,
    /// Start address the values belong to.
    pub address: u16,
    /// Values in address order.
    pub values: Vec<i32>,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(command: Command, address: u16, values: Vec<i32>) -> Self {
        Self {
            command,
            address,
            values,
        }
    }
}
