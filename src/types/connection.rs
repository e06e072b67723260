// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Combined connection state of a device session.

use std::fmt;

/// Logical connection state of a device session.
///
/// Exactly one value is held at any time. `connect()` and `disconnect()`
/// force the transitional states; only the combined evaluation of both
/// channels settles a session into [`Connected`](Self::Connected) or
/// [`Disconnected`](Self::Disconnected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    /// Both required channels are closed.
    #[default]
    Disconnected,
    /// A connect was issued and has not settled yet.
    Connecting,
    /// Both required channels are open.
    Connected,
    /// A disconnect was issued and has not settled yet.
    Disconnecting,
}

impl ConnectionState {
    /// Returns true if the session is connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true for `Connected` and `Disconnected`.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
        };
        f.write_str(name)
    }
}
