// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity.

use crate::error::{Error, Result};
use crate::event::DeviceId;

/// Identity and network address of a device.
///
/// Every notification a session emits carries its `ToolInfo` so that
/// subscribers watching several devices can tell them apart.
///
/// # Examples
///
/// ```
/// use toolink::types::ToolInfo;
///
/// let info = ToolInfo::new("192.168.1.20", 5000)?
///     .with_name("press-3")
///     .with_serial("SN-0042");
///
/// assert_eq!(info.event_port(), Some(5001));
/// assert_eq!(info.display_name(), "press-3");
/// # Ok::<(), toolink::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolInfo {
    #[serde(default)]
    id: DeviceId,
    host: String,
    base_port: u16,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    serial: Option<String>,
}

impl ToolInfo {
    /// Creates a new tool identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPort` if `base_port` is 0 or leaves no room for
    /// the event port right above it.
    pub fn new(host: impl Into<String>, base_port: u16) -> Result<Self> {
        if base_port == 0 || base_port == u16::MAX {
            return Err(Error::InvalidPort { port: base_port });
        }
        Ok(Self {
            id: DeviceId::new(),
            host: host.into(),
            base_port,
            name: None,
            serial: None,
        })
    }

    /// Sets a friendly name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the serial number.
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Returns the unique device identifier.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the host address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the command channel port.
    #[must_use]
    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    /// Returns the event channel port (one above the base port).
    #[must_use]
    pub fn event_port(&self) -> Option<u16> {
        self.event_port_with_offset(1)
    }

    /// Returns the event channel port for a custom offset.
    ///
    /// Returns `None` if the port would exceed `u16::MAX`.
    #[must_use]
    pub fn event_port_with_offset(&self, offset: u16) -> Option<u16> {
        self.base_port.checked_add(offset)
    }

    /// Returns the friendly name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the serial number, if set.
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Returns the friendly name if set, otherwise the host.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_ports() {
        assert!(matches!(
            ToolInfo::new("host", 0),
            Err(Error::InvalidPort { port: 0 })
        ));
        assert!(matches!(
            ToolInfo::new("host", u16::MAX),
            Err(Error::InvalidPort { port: u16::MAX })
        ));
    }

    #[test]
    fn event_port_is_base_plus_one() {
        let info = ToolInfo::new("10.0.0.5", 502).unwrap();
        assert_eq!(info.base_port(), 502);
        assert_eq!(info.event_port(), Some(503));
        assert_eq!(info.event_port_with_offset(10), Some(512));
    }

    #[test]
    fn event_port_overflow_is_none() {
        let info = ToolInfo::new("10.0.0.5", 65530).unwrap();
        assert_eq!(info.event_port_with_offset(5), Some(65535));
        assert_eq!(info.event_port_with_offset(6), None);
        assert_eq!(info.event_port_with_offset(10), None);
    }

    #[test]
    fn display_name_falls_back_to_host() {
        let info = ToolInfo::new("10.0.0.5", 502).unwrap();
        assert_eq!(info.display_name(), "10.0.0.5");
        assert_eq!(info.name(), None);
    }

    #[test]
    fn ids_are_unique() {
        let a = ToolInfo::new("h", 1000).unwrap();
        let b = ToolInfo::new("h", 1000).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn deserialize_without_id_generates_one() {
        let info: ToolInfo =
            serde_json::from_str(r#"{"host":"10.0.0.9","base_port":7000,"serial":"X1"}"#).unwrap();
        assert_eq!(info.host(), "10.0.0.9");
        assert_eq!(info.serial(), Some("X1"));
        assert_eq!(info.event_port(), Some(7001));
    }
}
