//! Mock adapters for integration tests.
//!
//! Records every GPIO call and every publication so tests can assert on
//! the full history without real pins or a broker.

use std::collections::VecDeque;

use relayprop::app::events::PropEvent;
use relayprop::app::ports::{
    EventSink, Inbound, LastWill, OutputPort, PinMode, PinState, QoS, Transport,
};
use relayprop::app::service::PropService;
use relayprop::config::PropConfig;
use relayprop::error::CommsError;

pub const INBOX: &str = "Room/Test/Props/Relay/inbox";
pub const OUTBOX: &str = "Room/Test/Props/Relay/outbox";
pub const SETTINGS: &str = "Room/Test/Props/Relay/settings";

// ── GPIO call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCall {
    Configure(u8, PinMode),
    Write(u8, PinState),
}

#[derive(Default)]
pub struct MockOutput {
    pub calls: Vec<PinCall>,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn writes(&self) -> Vec<(u8, PinState)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PinCall::Write(p, l) => Some((*p, *l)),
                PinCall::Configure(..) => None,
            })
            .collect()
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Configure(p, m) if *p == pin => Some(*m),
            _ => None,
        })
    }

    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.calls.iter().rev().find_map(|c| match c {
            PinCall::Write(p, l) if *p == pin => Some(*l),
            _ => None,
        })
    }
}

impl OutputPort for MockOutput {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) {
        self.calls.push(PinCall::Configure(pin, mode));
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        self.calls.push(PinCall::Write(pin, level));
    }
}

// ── Transport ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

#[derive(Default)]
pub struct MockTransport {
    pub up: bool,
    pub fail_connect: bool,
    pub connects: usize,
    pub published: Vec<Publication>,
    pub subscriptions: Vec<(String, QoS)>,
    pub inbound: VecDeque<Inbound>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn payloads(&self) -> Vec<&str> {
        self.published.iter().map(|p| p.payload.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.published.clear();
    }

    pub fn deliver(&mut self, topic: &str, payload: &str) {
        self.inbound.push_back(Inbound {
            topic: topic.into(),
            payload: payload.into(),
        });
    }
}

impl Transport for MockTransport {
    fn connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self, _client_id: &str, _will: LastWill<'_>) -> Result<(), CommsError> {
        self.connects += 1;
        if self.fail_connect {
            return Err(CommsError::ConnectFailed);
        }
        self.up = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str, retained: bool) -> bool {
        if !self.up {
            return false;
        }
        self.published.push(Publication {
            topic: topic.into(),
            payload: payload.into(),
            retained,
        });
        true
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), CommsError> {
        self.subscriptions.push((topic.into(), qos));
        Ok(())
    }

    fn poll(&mut self) -> Option<Inbound> {
        self.inbound.pop_front()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<PropEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &PropEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub fn test_config() -> PropConfig {
    let mut cfg = PropConfig::default();
    cfg.inbox_topic = INBOX.try_into().unwrap();
    cfg.outbox_topic = OUTBOX.try_into().unwrap();
    cfg.settings_topic = SETTINGS.try_into().unwrap();
    cfg
}

pub struct Rig {
    pub svc: PropService,
    pub link: MockTransport,
    pub io: MockOutput,
    pub sink: RecordingSink,
    pub now: u32,
}

#[allow(dead_code)]
impl Rig {
    /// Service that has completed its first poll (connected, subscribed)
    /// with the outbox history cleared.
    pub fn connected() -> Self {
        let mut rig = Self::offline();
        rig.tick(0);
        rig.link.clear();
        rig
    }

    /// Service that has not been polled yet.
    pub fn offline() -> Self {
        Self {
            svc: PropService::new(&test_config(), "relayprop-test", 0),
            link: MockTransport::default(),
            io: MockOutput::default(),
            sink: RecordingSink::default(),
            now: 0,
        }
    }

    /// Advance the clock by `ms` and poll once.
    pub fn tick(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
        self.svc
            .poll(&mut self.link, &mut self.io, &mut self.sink, self.now);
    }

    /// Deliver one message and poll without advancing the clock.
    pub fn deliver(&mut self, topic: &str, payload: &str) {
        self.link.deliver(topic, payload);
        self.tick(0);
    }

    pub fn add(&mut self, json: &str) {
        self.deliver(SETTINGS, json);
    }

    pub fn inbox(&mut self, payload: &str) {
        self.deliver(INBOX, payload);
    }

    pub fn value(&self, name: &str) -> Option<bool> {
        let reg = self.svc.registry();
        reg.find_by_name(name)
            .and_then(|h| reg.get(h))
            .map(|b| b.value())
    }
}
