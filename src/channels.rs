//! Inter-task channel for inbound broker messages.
//!
//! The ESP-IDF MQTT client delivers publications on its own event task.
//! They cross into the synchronous control loop through a bounded
//! `embassy-sync` channel; no lock is held across a loop iteration.
//!
//! ```text
//! ┌──────────────┐  InboundMsg  ┌──────────────┐
//! │  MQTT event  │─────────────▶│ Control loop │
//! │  task        │              │ (sync)       │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use crate::config::TOPIC_CAP;

/// Largest payload accepted from the broker.  A full settings array for
/// every binding slot fits comfortably.
pub const PAYLOAD_CAP: usize = 4096;

/// Channel depth for inbound messages.
pub const INBOUND_DEPTH: usize = 8;

/// One publication received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMsg {
    pub topic: String<TOPIC_CAP>,
    pub payload: String<PAYLOAD_CAP>,
}

impl InboundMsg {
    /// Copy a raw publication.  `None` if either part does not fit or the
    /// payload is not UTF-8.
    pub fn from_parts(topic: &str, payload: &[u8]) -> Option<Self> {
        let payload = core::str::from_utf8(payload).ok()?;
        Some(Self {
            topic: String::try_from(topic).ok()?,
            payload: String::try_from(payload).ok()?,
        })
    }
}

pub type InboundChannel = Channel<CriticalSectionRawMutex, InboundMsg, INBOUND_DEPTH>;

/// Inbound channel: MQTT event task → control loop.
pub static INBOUND_CHANNEL: InboundChannel = Channel::new();
