// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `toolink` - coordinate devices reached over a command channel and an
//! event channel.
//!
//! Network devices of this class expose two independent links: a
//! request/response command channel on a base port and a push-only event
//! channel one port above it. Each link connects and drops on its own.
//! A [`DeviceSession`] merges both into one [`ConnectionState`], gates
//! parameter requests on it and keeps the event stream alive by
//! acknowledging monitor heartbeats.
//!
//! # Components
//!
//! - [`transport`]: the [`Transport`] contract both channels implement,
//!   plus an in-memory [`MemoryTransport`]
//! - [`state`]: the rule combining both channels' signals
//! - [`DeviceSession`]: connect/disconnect, parameter operations, relay
//! - [`subscription`] and [`event`]: callback and broadcast notifications
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use toolink::{DeviceSession, Subscribable};
//! use toolink::transport::MemoryTransport;
//! use toolink::types::{ChannelKind, Command, Message, ToolInfo};
//!
//! let command = Arc::new(MemoryTransport::new());
//! let event = Arc::new(MemoryTransport::new());
//! let session = DeviceSession::new(
//!     ToolInfo::new("192.168.1.20", 5000)?.with_name("press-3"),
//!     Arc::clone(&command),
//!     Arc::clone(&event),
//! );
//!
//! session.on_connection_changed(|tool, state| {
//!     println!("{}: {state}", tool.display_name());
//! });
//! session.on_event_message(|tool, message| {
//!     println!("{}: {:?} @ {}", tool.display_name(), message.command, message.address);
//! });
//!
//! session.set_up(ChannelKind::Network);
//! session.connect();
//! command.complete_connect();
//! event.complete_connect();
//!
//! assert!(session.set_event_monitor());
//!
//! // Heartbeats on the event channel are acknowledged on the command channel.
//! event.inject_message(Message::new(Command::Monitor, 4015, vec![1]));
//! assert_eq!(session.queue_count(), 2);
//! # Ok::<(), toolink::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod event;
mod session;
pub mod state;
pub mod subscription;
pub mod transport;
pub mod types;

pub use config::{ProtocolConfig, SessionConfig};
pub use error::{Error, Result};
pub use session::DeviceSession;
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use transport::{MemoryTransport, Transport};
pub use types::{ChannelKind, ChannelState, Command, ConnectionState, Message, ToolInfo};
