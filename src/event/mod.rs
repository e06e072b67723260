// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast stream of session notifications.
//!
//! Every notification a [`DeviceSession`](crate::DeviceSession) hands to its
//! callbacks is also published on an [`EventBus`] as a [`SessionEvent`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use toolink::event::{EventBus, SessionEvent};
//! use toolink::types::{ConnectionState, ToolInfo};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let tool = Arc::new(ToolInfo::new("192.168.1.20", 5000).unwrap());
//! bus.publish(SessionEvent::ConnectionChanged { tool, state: ConnectionState::Connected });
//! assert!(rx.try_recv().unwrap().is_connection());
//! ```

mod device_id;
mod event_bus;
mod session_event;

pub use device_id::DeviceId;
pub(crate) use event_bus::DEFAULT_CHANNEL_CAPACITY;
pub use event_bus::EventBus;
pub use session_event::SessionEvent;
