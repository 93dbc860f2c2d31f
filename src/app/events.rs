//! Outbound application events.
//!
//! The [`PropService`](super::service::PropService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They mirror what went out
//! on the outbox (or would have, while offline) so the serial log tells
//! the same story as the control room.

use crate::dispatch::Rejection;
use crate::error::{CommsError, DecodeError, RegistryError};
use crate::reporter::{Pass, Report};

/// Structured events emitted by the prop core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropEvent {
    /// Service constructed; carries the configured client id.
    Started { client_id: String },

    /// A pin was bound (or rebound).
    PinAdded {
        pin: u8,
        name: String,
        replaced: bool,
    },

    /// A pin was released back to input.
    PinRemoved { pin: u8, name: String },

    /// Every binding was cleared.
    AllCleared { count: usize },

    /// Settings payload or pin removal could not be applied.
    SettingsRejected(SettingsFault),

    /// A command was applied.
    CommandDone { command: String, matched: usize },

    /// A command was rejected.
    CommandOmitted { command: String, reason: Rejection },

    /// Broker session established.
    LinkUp,

    /// Broker session established but not fully subscribed.
    LinkDegraded(CommsError),

    /// Broker session lost.
    LinkDown,

    /// Reconnect attempt failed.
    LinkRetry(CommsError),

    /// A report pass ran.
    DataReported { pass: Pass, report: Report },
}

/// Why a settings request could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsFault {
    Decode(DecodeError),
    Registry(RegistryError),
}
