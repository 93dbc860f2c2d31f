//! Prop configuration parameters
//!
//! Broker location, topic names, Wi-Fi credentials and loop timing.
//! Defaults are compiled in.  Wi-Fi credentials and the broker host can
//! be baked into a build with the `RELAYPROP_WIFI_SSID`,
//! `RELAYPROP_WIFI_PASSWORD` and `RELAYPROP_BROKER_HOST` environment
//! variables; the first boot with credentials writes the result to NVS.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity of a topic string.
pub const TOPIC_CAP: usize = 96;

pub type Topic = String<TOPIC_CAP>;

/// Core prop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropConfig {
    // --- Identity ---
    /// MQTT client id.  Empty means "derive from the MAC at boot".
    pub client_id: String<32>,

    // --- Broker ---
    pub broker_host: String<64>,
    pub broker_port: u16,

    // --- Topics ---
    pub inbox_topic: Topic,
    pub outbox_topic: Topic,
    pub settings_topic: Topic,

    // --- Wi-Fi ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,

    // --- Timing ---
    /// Fixed delay between broker reconnect attempts (milliseconds)
    pub reconnect_interval_ms: u32,
    /// Change-report cadence (milliseconds)
    pub data_change_interval_ms: u32,
    /// Full state report cadence (milliseconds)
    pub all_data_interval_ms: u32,
    /// Control loop sleep between polls (milliseconds)
    pub loop_interval_ms: u32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),

            broker_host: fixed(option_env!("RELAYPROP_BROKER_HOST").unwrap_or("192.168.1.42")),
            broker_port: 1883,

            inbox_topic: fixed("Room/My room/Props/Relay Prop/inbox"),
            outbox_topic: fixed("Room/My room/Props/Relay Prop/outbox"),
            settings_topic: fixed("Room/My room/Props/Relay Prop/settings"),

            wifi_ssid: fixed(option_env!("RELAYPROP_WIFI_SSID").unwrap_or("")),
            wifi_password: fixed(option_env!("RELAYPROP_WIFI_PASSWORD").unwrap_or("")),

            reconnect_interval_ms: 5_000,
            data_change_interval_ms: 1_000,
            all_data_interval_ms: 30_000,
            loop_interval_ms: 50,
        }
    }
}

impl PropConfig {
    /// Reject configurations the firmware cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host is empty"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port is zero"));
        }
        for topic in [&self.inbox_topic, &self.outbox_topic, &self.settings_topic] {
            if topic.is_empty() {
                return Err(ConfigError::ValidationFailed("topic is empty"));
            }
            if topic.contains(['#', '+']) {
                return Err(ConfigError::ValidationFailed("topic contains a wildcard"));
            }
        }
        if self.inbox_topic == self.outbox_topic {
            return Err(ConfigError::ValidationFailed("inbox and outbox are the same topic"));
        }
        if self.reconnect_interval_ms == 0
            || self.data_change_interval_ms == 0
            || self.all_data_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("interval is zero"));
        }
        if self.data_change_interval_ms > self.all_data_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "data_change_interval_ms exceeds all_data_interval_ms",
            ));
        }
        Ok(())
    }
}

/// Compile-time text into a bounded string, truncated to the field.
fn fixed<const N: usize>(s: &str) -> String<N> {
    crate::text::truncate(s)
}
