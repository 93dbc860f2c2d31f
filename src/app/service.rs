//! Application service — the hexagonal core.
//!
//! [`PropService`] owns the pin registry, the change reporter and the
//! connection supervisor.  All I/O flows through port traits passed in at
//! call sites, so the whole service runs against mock adapters in tests.
//!
//! ```text
//!  Transport ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │         PropService          │
//! OutputPort ◀── │ Registry · Dispatch · Report │
//!                └─────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::PropConfig;
use crate::decoder::{PinSettings, decode_settings, pin_from_settings_topic};
use crate::dispatch::{self, Outcome};
use crate::registry::{CLEAR_PREFIX, PinRegistry, PinSpec};
use crate::reporter::{ChangeReporter, Report};
use crate::supervisor::{ConnectionSupervisor, LinkEvent, Topics};
use crate::timer::Millis;

use super::commands::InboxRequest;
use super::events::{PropEvent, SettingsFault};
use super::ports::{EventSink, OutputPort, Transport};

// ───────────────────────────────────────────────────────────────
// PropService
// ───────────────────────────────────────────────────────────────

/// Which handler an inbound topic belongs to.
enum Route {
    Inbox,
    Settings,
    PinSettings(u8),
    Ignored,
}

/// The prop service orchestrates all domain logic.
pub struct PropService {
    registry: PinRegistry,
    reporter: ChangeReporter,
    supervisor: ConnectionSupervisor,
    client_id: String,
}

impl PropService {
    /// Construct the service.  Nothing is published until the first
    /// [`poll`](Self::poll) brings the session up.
    pub fn new(config: &PropConfig, client_id: &str, now: Millis) -> Self {
        let topics = Topics {
            inbox: config.inbox_topic.as_str().into(),
            outbox: config.outbox_topic.as_str().into(),
            settings: config.settings_topic.as_str().into(),
        };
        let reporter = ChangeReporter::new(
            &topics.outbox,
            config.data_change_interval_ms,
            config.all_data_interval_ms,
            now,
        );
        let supervisor =
            ConnectionSupervisor::new(client_id, topics, config.reconnect_interval_ms, now);

        Self {
            registry: PinRegistry::new(),
            reporter,
            supervisor,
            client_id: client_id.into(),
        }
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&PropEvent::Started {
            client_id: self.client_id.clone(),
        });
        info!("PropService started as {}", self.client_id);
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One pass of the control loop: session upkeep, inbound messages,
    /// scheduled reports.
    pub fn poll(
        &mut self,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
        now: Millis,
    ) {
        if let Some(event) = self.supervisor.poll(link, now) {
            self.on_link_event(event, sink, now);
        }

        while let Some(msg) = link.poll() {
            self.handle_message(&msg.topic, &msg.payload, link, io, sink);
        }

        if let Some((pass, report)) = self.reporter.tick(&mut self.registry, link, now) {
            if matches!(report, Report::Sent { .. } | Report::Refused) {
                sink.emit(&PropEvent::DataReported { pass, report });
            }
        }
    }

    fn on_link_event(&mut self, event: LinkEvent, sink: &mut impl EventSink, now: Millis) {
        match event {
            LinkEvent::Established => {
                // Broker may have lost our state; repaint everything.
                self.reporter.schedule_full(now);
                sink.emit(&PropEvent::LinkUp);
            }
            LinkEvent::Degraded(e) => {
                self.reporter.schedule_full(now);
                sink.emit(&PropEvent::LinkDegraded(e));
            }
            LinkEvent::Connecting => debug!("broker connect pending"),
            LinkEvent::AttemptFailed(e) => sink.emit(&PropEvent::LinkRetry(e)),
            LinkEvent::Lost => sink.emit(&PropEvent::LinkDown),
        }
    }

    /// Route one inbound publication by topic.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &str,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        let topics = self.supervisor.topics();
        let route = if topic == topics.inbox {
            Route::Inbox
        } else if topic == topics.settings {
            Route::Settings
        } else if let Some(pin) = pin_from_settings_topic(&topics.settings, topic) {
            Route::PinSettings(pin)
        } else {
            Route::Ignored
        };

        match route {
            Route::Inbox => self.handle_inbox(payload, link, io, sink),
            Route::Settings => self.handle_settings(payload, link, io, sink),
            Route::PinSettings(pin) if payload.is_empty() => {
                // Retained per-pin settings were cleared.
                let text = format!("{CLEAR_PREFIX}{pin}");
                self.clear_pin(&text, link, io, sink);
            }
            Route::PinSettings(_) => self.handle_settings(payload, link, io, sink),
            Route::Ignored => debug!("ignoring message on {topic}"),
        }
    }

    /// Act on an inbox payload.
    pub fn handle_inbox(
        &mut self,
        payload: &str,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match InboxRequest::classify(payload) {
            InboxRequest::ClearAll => {
                let count = self.registry.remove_all(io);
                sink.emit(&PropEvent::AllCleared { count });
                self.reporter.send_done(link, payload);
            }
            InboxRequest::ClearPin(text) => {
                if self.clear_pin(text, link, io, sink) {
                    self.reporter.send_done(link, payload);
                }
            }
            InboxRequest::SendAllData => {
                self.reporter.send_all(&mut self.registry, link);
                self.reporter.send_done(link, payload);
            }
            InboxRequest::Command(text) => self.run_command(text, link, io, sink),
        }
    }

    fn run_command(
        &mut self,
        text: &str,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match dispatch::dispatch(&mut self.registry, io, text) {
            Outcome::Done { matched } => {
                self.reporter.send_changes(&mut self.registry, link);
                self.reporter.send_done(link, text);
                sink.emit(&PropEvent::CommandDone {
                    command: text.into(),
                    matched,
                });
            }
            Outcome::Omitted(reason) => {
                self.reporter.send_omit(link, text);
                sink.emit(&PropEvent::CommandOmitted {
                    command: text.into(),
                    reason,
                });
            }
        }
    }

    /// Apply a settings payload: one object adds a pin, an array replaces
    /// the whole set.
    pub fn handle_settings(
        &mut self,
        payload: &str,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match decode_settings(payload) {
            Ok(PinSettings::Add(spec)) => self.add_pin(spec, link, io, sink),
            Ok(PinSettings::Replace(items)) => {
                let count = self.registry.remove_all(io);
                sink.emit(&PropEvent::AllCleared { count });
                for item in items {
                    match item {
                        Ok(spec) => self.add_pin(spec, link, io, sink),
                        Err(e) => {
                            self.reporter
                                .send_mesg(link, &format!("Warning: pin ignored from settings ({e})"));
                            sink.emit(&PropEvent::SettingsRejected(SettingsFault::Decode(e)));
                        }
                    }
                }
            }
            Err(e) => {
                self.reporter
                    .send_mesg(link, &format!("Warning: invalid pin settings ({e})"));
                sink.emit(&PropEvent::SettingsRejected(SettingsFault::Decode(e)));
            }
        }
    }

    fn add_pin(
        &mut self,
        spec: PinSpec,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        let pin = spec.pin;
        let description = format!(
            "D{} {} ({}/{}) initial={}",
            pin,
            spec.name,
            spec.high,
            spec.low,
            u8::from(spec.initial)
        );
        let name: String = spec.name.as_str().into();

        match self.registry.add_binding(spec, io) {
            Ok(added) => {
                self.reporter
                    .send_mesg(link, &format!("Add pin: {description}"));
                sink.emit(&PropEvent::PinAdded {
                    pin,
                    name,
                    replaced: added.replaced,
                });
            }
            Err(e) => {
                warn!("cannot bind D{pin}: {e}");
                self.reporter
                    .send_mesg(link, &format!("Warning: cannot add pin D{pin} ({e})"));
                sink.emit(&PropEvent::SettingsRejected(SettingsFault::Registry(e)));
            }
        }
    }

    /// Remove the pin named by `clear:D<n>`.  Returns whether a binding
    /// was removed.
    fn clear_pin(
        &mut self,
        text: &str,
        link: &mut impl Transport,
        io: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match self.registry.remove_by_predicate_string(text, io) {
            Ok(binding) => {
                sink.emit(&PropEvent::PinRemoved {
                    pin: binding.pin(),
                    name: binding.name().into(),
                });
                true
            }
            Err(e) => {
                self.reporter
                    .send_mesg(link, &format!("Warning: pin not found in settings for {text}"));
                sink.emit(&PropEvent::SettingsRejected(SettingsFault::Registry(e)));
                false
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
