//! Inbound requests to the prop service.
//!
//! Everything the control room publishes on the inbox topic is one of
//! these.  Classification is purely textual; resolving a command against
//! the registry is the dispatcher's job.

use crate::registry::CLEAR_PREFIX;

/// Clears every binding.
pub const CLEAR_ALL: &str = "clear:all";
/// Control room (re)started and wants the full state.
pub const APP_STARTUP: &str = "app:startup";
/// Control room asks for the full state.
pub const APP_DATA: &str = "app:data";

/// Requests that arrive on the inbox topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxRequest<'a> {
    /// Remove every binding.
    ClearAll,

    /// Remove one binding (`clear:D<n>`, the full text).
    ClearPin(&'a str),

    /// Publish every variable, then acknowledge.
    SendAllData,

    /// `<predicate>:<level>` for the dispatcher.
    Command(&'a str),
}

impl<'a> InboxRequest<'a> {
    pub fn classify(payload: &'a str) -> Self {
        match payload {
            CLEAR_ALL => Self::ClearAll,
            APP_STARTUP | APP_DATA => Self::SendAllData,
            p if p.starts_with(CLEAR_PREFIX) => Self::ClearPin(p),
            p => Self::Command(p),
        }
    }
}
