// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by sessions, transports and subscribers.
//!
//! # Types
//!
//! - [`ChannelKind`] - Transport kind of a channel (none/serial/network)
//! - [`ChannelState`] - Raw state reported by a single transport channel
//! - [`ConnectionState`] - Combined logical state of a device session
//! - [`ToolInfo`] - Identity and address of a device
//! - [`Command`] and [`Message`] - Messages delivered by a channel

mod channel;
mod connection;
mod message;
mod tool_info;

pub use channel::{ChannelKind, ChannelState};
pub use connection::ConnectionState;
pub use message::{Command, Message};
pub use tool_info::ToolInfo;
