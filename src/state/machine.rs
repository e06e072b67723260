// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection state machine.

use parking_lot::Mutex;

use crate::types::{ChannelKind, ChannelState, ConnectionState};

/// Raw states of both channels, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSnapshot {
    /// Raw state of the command channel.
    pub command: ChannelState,
    /// Configured kind of the event channel.
    pub event_kind: ChannelKind,
    /// Raw state of the event channel.
    pub event: ChannelState,
}

impl ChannelSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(command: ChannelState, event_kind: ChannelKind, event: ChannelState) -> Self {
        Self {
            command,
            event_kind,
            event,
        }
    }
}

/// Settles the combined state for one channel signal.
///
/// A `true` signal settles to `Connected` when the command channel is
/// connected and the event channel either is not a network channel or is
/// connected too. A `false` signal settles to `Disconnected` under the
/// mirrored condition. Anything else returns `None`.
#[must_use]
pub fn resolve(connected: bool, snapshot: ChannelSnapshot) -> Option<ConnectionState> {
    let event_counts = snapshot.event_kind.is_network();

    if connected {
        let settled = snapshot.command.is_connected()
            && (!event_counts || snapshot.event.is_connected());
        settled.then_some(ConnectionState::Connected)
    } else {
        let settled = snapshot.command.is_disconnected()
            && (!event_counts || snapshot.event.is_disconnected());
        settled.then_some(ConnectionState::Disconnected)
    }
}

/// Holds the combined connection state of a session.
///
/// All reads and writes go through one mutex. [`on_signal`] takes the
/// channel snapshot while holding it, so two channels signalling at the
/// same time are evaluated one after the other and at most one of them
/// reports the transition.
///
/// A settled state is reported again when a channel left and re-entered it
/// in between (for example the command channel reconnecting while the
/// event channel stayed up), since the channels behind it were replaced.
///
/// [`on_signal`]: Self::on_signal
#[derive(Debug, Default)]
pub struct ConnectionStateMachine {
    inner: Mutex<Tracked>,
}

#[derive(Debug, Default)]
struct Tracked {
    state: ConnectionState,
    // Raw channel states stopped backing `state` since it was settled.
    diverged: bool,
}

impl ConnectionStateMachine {
    /// Creates a machine in the `Disconnected` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn current(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Overwrites the state, returning the previous one.
    ///
    /// Used by `connect()` and `disconnect()` for the transitional states.
    pub fn force(&self, state: ConnectionState) -> ConnectionState {
        let mut inner = self.inner.lock();
        inner.diverged = false;
        std::mem::replace(&mut inner.state, state)
    }

    /// Applies a channel signal.
    ///
    /// `snapshot` is called with the lock held. Returns the new state when
    /// the signal settled the session into a state it was not already in,
    /// or back into the held state after the channels diverged from it.
    pub fn on_signal<F>(&self, connected: bool, snapshot: F) -> Option<ConnectionState>
    where
        F: FnOnce() -> ChannelSnapshot,
    {
        let mut inner = self.inner.lock();
        let snapshot = snapshot();

        let Some(settled) = resolve(connected, snapshot) else {
            if inner.state.is_settled()
                && resolve(inner.state.is_connected(), snapshot) != Some(inner.state)
            {
                inner.diverged = true;
            }
            return None;
        };

        if inner.state == settled && !inner.diverged {
            return None;
        }
        inner.state = settled;
        inner.diverged = false;
        Some(settled)
    }
}
