//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured prop events to the
//! ESP-IDF logger (UART / USB-CDC in production).  Each line starts with a
//! short tag so the serial console can be grepped by concern.

use log::{info, warn};

use crate::app::events::{PropEvent, SettingsFault};
use crate::app::ports::EventSink;

/// Adapter that logs every [`PropEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PropEvent) {
        match event {
            PropEvent::Started { client_id } => {
                info!("START | client_id={}", client_id);
            }
            PropEvent::PinAdded {
                pin,
                name,
                replaced,
            } => {
                info!(
                    "PIN   | bound D{} as '{}'{}",
                    pin,
                    name,
                    if *replaced { " (replaced)" } else { "" }
                );
            }
            PropEvent::PinRemoved { pin, name } => {
                info!("PIN   | released D{} ('{}')", pin, name);
            }
            PropEvent::AllCleared { count } => {
                info!("PIN   | cleared {} binding(s)", count);
            }
            PropEvent::SettingsRejected(SettingsFault::Decode(e)) => {
                warn!("PIN   | settings rejected: {}", e);
            }
            PropEvent::SettingsRejected(SettingsFault::Registry(e)) => {
                warn!("PIN   | registry refused: {}", e);
            }
            PropEvent::CommandDone { command, matched } => {
                info!("CMD   | done '{}' ({} pin(s))", command, matched);
            }
            PropEvent::CommandOmitted { command, reason } => {
                info!("CMD   | omit '{}' ({:?})", command, reason);
            }
            PropEvent::LinkUp => info!("LINK  | connected"),
            PropEvent::LinkDegraded(e) => warn!("LINK  | connected, {}", e),
            PropEvent::LinkDown => warn!("LINK  | lost"),
            PropEvent::LinkRetry(e) => warn!("LINK  | retry failed: {}", e),
            PropEvent::DataReported { pass, report } => {
                info!("DATA  | {:?} pass: {:?}", pass, report);
            }
        }
    }
}
