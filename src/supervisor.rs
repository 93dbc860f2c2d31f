//! Broker session supervision.
//!
//! ```text
//!   Down ──retry timer──▶ connect() ─ok, link up──▶ Up ──link lost──▶ Down
//!                              │
//!                              └─ok, link pending──▶ Connecting ──link up──▶ Up
//! ```
//!
//! Reconnect attempts are spaced by a fixed period.  The first attempt and
//! the first attempt after losing an established session happen at once.
//! On every (re)establishment the retained `CONNECTED` state is published
//! and the inbox and `<settings>/#` are subscribed at QoS 1.  The
//! multi-level wildcard also matches `<settings>` itself, so one
//! subscription covers both the whole-set and the per-pin topics.

use crate::app::ports::{LastWill, QoS, Transport};
use crate::error::CommsError;
use crate::reporter::{CONNECTED, DISCONNECTED};
use crate::timer::{IntervalTimer, Millis};

/// Topic set for one prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub inbox: String,
    pub outbox: String,
    pub settings: String,
}

impl Topics {
    /// Wildcard covering `<settings>` and per-pin `<settings>/D5`, ...
    pub fn settings_wildcard(&self) -> String {
        format!("{}/#", self.settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Down,
    Connecting,
    Up,
}

/// Notable things that happened during a [`ConnectionSupervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Session established, announced and subscribed.
    Established,
    /// Session established but a subscription was refused.
    Degraded(CommsError),
    /// Connect accepted; waiting for the broker to acknowledge.
    Connecting,
    /// Connect attempt failed; retried after the backoff period.
    AttemptFailed(CommsError),
    /// An established session dropped.
    Lost,
}

pub struct ConnectionSupervisor {
    client_id: String,
    topics: Topics,
    retry: IntervalTimer,
    state: LinkState,
}

impl ConnectionSupervisor {
    pub fn new(client_id: &str, topics: Topics, reconnect_ms: u32, now: Millis) -> Self {
        Self {
            client_id: client_id.into(),
            topics,
            retry: IntervalTimer::immediate(reconnect_ms, now),
            state: LinkState::Down,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Up
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Drive the session one step.  Never blocks beyond the transport's
    /// own bounded calls.
    pub fn poll(&mut self, link: &mut impl Transport, now: Millis) -> Option<LinkEvent> {
        if link.connected() {
            if self.state == LinkState::Up {
                return None;
            }
            return Some(self.establish(link));
        }

        if self.state == LinkState::Up {
            self.state = LinkState::Down;
            self.retry.expire(now);
            return Some(LinkEvent::Lost);
        }

        if !self.retry.poll(now) {
            return None;
        }

        let will = LastWill {
            topic: &self.topics.outbox,
            payload: DISCONNECTED,
            retained: true,
        };
        match link.connect(&self.client_id, will) {
            Ok(()) if link.connected() => Some(self.establish(link)),
            Ok(()) => {
                self.state = LinkState::Connecting;
                Some(LinkEvent::Connecting)
            }
            Err(e) => {
                self.state = LinkState::Down;
                Some(LinkEvent::AttemptFailed(e))
            }
        }
    }

    fn establish(&mut self, link: &mut impl Transport) -> LinkEvent {
        self.state = LinkState::Up;
        link.publish(&self.topics.outbox, CONNECTED, true);

        let wildcard = self.topics.settings_wildcard();
        let subscriptions = [self.topics.inbox.as_str(), wildcard.as_str()];
        let mut failure = None;
        for topic in subscriptions {
            if let Err(e) = link.subscribe(topic, QoS::AtLeastOnce) {
                failure = Some(e);
            }
        }
        failure.map_or(LinkEvent::Established, LinkEvent::Degraded)
    }
}
