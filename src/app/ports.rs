//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PropService (domain)
//! ```
//!
//! Driven adapters (GPIO bank, MQTT client, clock, event sinks, storage)
//! implement these traits.  The [`PropService`](super::service::PropService)
//! consumes them via generics, so the domain core never touches hardware or
//! the network directly.

pub use embedded_hal::digital::PinState;

use crate::config::PropConfig;
use crate::error::{CommsError, ConfigError};
use crate::timer::Millis;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Direction a physical pin is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input; the power-safe default for unbound pins.
    Input,
    /// Push-pull output driving a relay coil.
    Output,
}

/// Physical pin I/O.
///
/// Writes are synchronous and assumed infallible: a relay board has no way
/// to report a failed level change back to us.
pub trait OutputPort {
    fn configure_pin(&mut self, pin: u8, mode: PinMode);

    fn write_pin(&mut self, pin: u8, level: PinState);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ pub/sub broker)
// ───────────────────────────────────────────────────────────────

/// Delivery guarantee requested for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
}

/// Retained last-will message registered with the broker at connect time.
#[derive(Debug, Clone, Copy)]
pub struct LastWill<'a> {
    pub topic: &'a str,
    pub payload: &'a str,
    pub retained: bool,
}

/// One inbound publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub topic: String,
    pub payload: String,
}

/// Publish/subscribe session with the broker.
///
/// Every call is non-blocking or bounded in time; the control loop never
/// waits on the network.
pub trait Transport {
    /// Whether the session is currently established.
    fn connected(&self) -> bool;

    /// Open a session as `client_id`, registering `will` with the broker.
    fn connect(&mut self, client_id: &str, will: LastWill<'_>) -> Result<(), CommsError>;

    /// Publish `payload` on `topic`.  Returns `false` if it was not handed
    /// to the broker (disconnected, buffer full).
    fn publish(&mut self, topic: &str, payload: &str, retained: bool) -> bool;

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), CommsError>;

    /// Take the next inbound message, if any.
    fn poll(&mut self) -> Option<Inbound>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; compare readings
/// with [`crate::timer::reached`], never with raw subtraction.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`PropEvent`](super::events::PropEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::PropEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the prop configuration.
///
/// Implementations MUST call [`PropConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<PropConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &PropConfig) -> Result<(), ConfigError>;
}
