// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `toolink` library.
//!
//! Runtime session operations never fail with an error: connection problems
//! and declined requests surface as `false` returns and connection-changed
//! notifications. The errors here cover construction and configuration only.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The base port cannot carry a companion event port.
    #[error("invalid base port {port}: event port would be out of range")]
    InvalidPort {
        /// The rejected base port.
        port: u16,
    },

    /// A channel kind string could not be recognised.
    #[error("invalid channel kind: {0}")]
    InvalidKind(String),

    /// Session configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
