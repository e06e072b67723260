// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-channel transport types.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Transport kind a channel is configured for.
///
/// Only [`ChannelKind::Network`] event channels take part in the combined
/// connection state of a session. Serial devices run over a single physical
/// link that the transport manages on its own.
///
/// # Examples
///
/// ```
/// use toolink::types::ChannelKind;
///
/// let kind: ChannelKind = "network".parse().unwrap();
/// assert_eq!(kind, ChannelKind::Network);
/// assert!(kind.is_network());
/// assert_eq!(ChannelKind::default(), ChannelKind::None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// No transport configured.
    #[default]
    None,
    /// Local serial/USB link.
    Serial,
    /// TCP/IP network link.
    Network,
}

impl ChannelKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Serial => "serial",
            Self::Network => "network",
        }
    }

    /// Returns `true` for network channels.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "serial" | "usb" | "local" => Ok(Self::Serial),
            "network" | "tcp" | "ethernet" => Ok(Self::Network),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Raw state of one transport channel.
///
/// Each channel tracks this on its own; sessions combine the raw states of
/// both channels into a [`ConnectionState`](super::ConnectionState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    /// Channel is closed.
    #[default]
    Disconnected,
    /// A connect is in flight.
    Connecting,
    /// Channel is open.
    Connected,
    /// A close is in flight.
    Disconnecting,
}

impl ChannelState {
    /// Returns `true` if the channel is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the channel is closed.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}
