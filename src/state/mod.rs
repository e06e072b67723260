// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Combined connection state of a dual-channel session.
//!
//! Each channel reports its own `connected: bool` signal. [`resolve`] maps a
//! signal plus a [`ChannelSnapshot`] of both raw states to the settled state,
//! if any, and [`ConnectionStateMachine`] applies it under a single lock.
//!
//! ```text
//!   command channel ──┐                      ┌─► Connected
//!                     ├─► snapshot ─► resolve├─► Disconnected
//!   event channel ────┘                      └─► (no change)
//! ```
//!
//! # Examples
//!
//! ```
//! use toolink::state::{ChannelSnapshot, resolve};
//! use toolink::types::{ChannelKind, ChannelState, ConnectionState};
//!
//! // Command channel up, network event channel still down: not settled.
//! let partial = ChannelSnapshot::new(
//!     ChannelState::Connected,
//!     ChannelKind::Network,
//!     ChannelState::Connecting,
//! );
//! assert_eq!(resolve(true, partial), None);
//!
//! // A serial event channel is ignored.
//! let serial = ChannelSnapshot::new(
//!     ChannelState::Connected,
//!     ChannelKind::Serial,
//!     ChannelState::Disconnected,
//! );
//! assert_eq!(resolve(true, serial), Some(ConnectionState::Connected));
//! ```

mod machine;

pub use machine::{ChannelSnapshot, ConnectionStateMachine, resolve};
