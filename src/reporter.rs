//! Outbox publication: variable state reports and command echoes.
//!
//! Outbox vocabulary (all on the one outbox topic):
//!
//! ```text
//!   CONNECTED / DISCONNECTED   retained connection state
//!   DATA v1=label v2=label     variable states
//!   MESG <text>                operator diagnostics
//!   DONE <command>             command accepted, echoed verbatim
//!   OMIT <command>             command rejected, echoed verbatim
//! ```
//!
//! Change tracking lives in each binding's published entry; the reporter
//! only decides when to look and marks entries reported once a publish is
//! actually accepted by the transport.

use crate::app::ports::Transport;
use crate::registry::PinRegistry;
use crate::timer::{IntervalTimer, Millis};

pub const CONNECTED: &str = "CONNECTED";
pub const DISCONNECTED: &str = "DISCONNECTED";
pub const DATA_PREFIX: &str = "DATA";
pub const MESG_PREFIX: &str = "MESG";
pub const DONE_PREFIX: &str = "DONE";
pub const OMIT_PREFIX: &str = "OMIT";

/// What a report pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Transport down; nothing attempted, entries stay pending.
    Offline,
    /// Nothing to send.
    Empty,
    /// Published `entries` variables.
    Sent { entries: usize },
    /// Transport refused the publish; entries stay pending.
    Refused,
}

/// Which scheduled pass fired on a [`ChangeReporter::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Changes,
    All,
}

pub struct ChangeReporter {
    outbox: String,
    changes: IntervalTimer,
    all_data: IntervalTimer,
}

impl ChangeReporter {
    pub fn new(outbox: &str, changes_ms: u32, all_data_ms: u32, now: Millis) -> Self {
        Self {
            outbox: outbox.into(),
            changes: IntervalTimer::new(changes_ms, now),
            all_data: IntervalTimer::new(all_data_ms, now),
        }
    }

    /// Run whichever scheduled pass is due.  A full pass supersedes a
    /// change pass falling due in the same tick.
    pub fn tick(
        &mut self,
        registry: &mut PinRegistry,
        link: &mut impl Transport,
        now: Millis,
    ) -> Option<(Pass, Report)> {
        if self.all_data.poll(now) {
            self.changes.rearm(now);
            return Some((Pass::All, self.send_all(registry, link)));
        }
        if self.changes.poll(now) {
            return Some((Pass::Changes, self.send_changes(registry, link)));
        }
        None
    }

    /// Make the next tick publish every variable (used after a reconnect).
    pub fn schedule_full(&mut self, now: Millis) {
        self.all_data.expire(now);
    }

    /// Publish the variables whose value changed since their last report.
    pub fn send_changes(&mut self, registry: &mut PinRegistry, link: &mut impl Transport) -> Report {
        self.publish_data(registry, link, true)
    }

    /// Publish every variable regardless of change state.
    pub fn send_all(&mut self, registry: &mut PinRegistry, link: &mut impl Transport) -> Report {
        self.publish_data(registry, link, false)
    }

    pub fn send_done(&self, link: &mut impl Transport, command: &str) -> bool {
        self.send_tagged(link, DONE_PREFIX, command)
    }

    pub fn send_omit(&self, link: &mut impl Transport, command: &str) -> bool {
        self.send_tagged(link, OMIT_PREFIX, command)
    }

    pub fn send_mesg(&self, link: &mut impl Transport, text: &str) -> bool {
        self.send_tagged(link, MESG_PREFIX, text)
    }

    fn send_tagged(&self, link: &mut impl Transport, tag: &str, body: &str) -> bool {
        if !link.connected() {
            return false;
        }
        let payload = format!("{tag} {body}");
        link.publish(&self.outbox, &payload, false)
    }

    fn publish_data(
        &mut self,
        registry: &mut PinRegistry,
        link: &mut impl Transport,
        only_changed: bool,
    ) -> Report {
        if !link.connected() {
            return Report::Offline;
        }

        let mut payload = String::from(DATA_PREFIX);
        let mut entries = 0;
        for binding in registry.iter() {
            let data = binding.data();
            if only_changed && !data.is_changed() {
                continue;
            }
            payload.push(' ');
            data.write_entry(&mut payload);
            entries += 1;
        }

        if entries == 0 {
            return Report::Empty;
        }
        if !link.publish(&self.outbox, &payload, false) {
            return Report::Refused;
        }

        // Everything just published is now the last reported value,
        // including unchanged entries carried by a full pass.
        for binding in registry.iter_mut() {
            let data = binding.data_mut();
            if !only_changed || data.is_changed() {
                data.mark_reported();
            }
        }
        Report::Sent { entries }
    }
}
