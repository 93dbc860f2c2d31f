//! MQTT transport adapter.
//!
//! Implements [`Transport`] on top of the ESP-IDF MQTT client.  The client
//! runs its own event task; its callback only flips the link flag and
//! pushes received publications into an [`InboundChannel`], which
//! [`Transport::poll`] drains from the control loop.
//!
//! ```text
//!  esp-mqtt task ──callback──▶ InboundChannel ──poll()──▶ PropService
//!  PropService ──publish()/subscribe()──▶ enqueue (non-blocking)
//! ```
//!
//! The simulation backend keeps everything in memory: `inject` plays the
//! broker side, `published` and `subscriptions` record what went out.

use log::{debug, info};

use crate::app::ports::{Inbound, LastWill, QoS, Transport};
use crate::channels::{InboundChannel, InboundMsg};
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use std::sync::Arc;
#[cfg(target_os = "espidf")]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration,
    QoS as EspQoS,
};

#[cfg(target_os = "espidf")]
fn esp_qos(qos: QoS) -> EspQoS {
    match qos {
        QoS::AtMostOnce => EspQoS::AtMostOnce,
        QoS::AtLeastOnce => EspQoS::AtLeastOnce,
    }
}

/// One recorded publication (simulation only).
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

pub struct MqttAdapter {
    broker_url: String,
    inbound: &'static InboundChannel,

    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(target_os = "espidf")]
    link_up: Arc<AtomicBool>,

    #[cfg(not(target_os = "espidf"))]
    up: bool,
    #[cfg(not(target_os = "espidf"))]
    refuse_connect: bool,
    #[cfg(not(target_os = "espidf"))]
    will: Option<Published>,
    #[cfg(not(target_os = "espidf"))]
    pub published: Vec<Published>,
    #[cfg(not(target_os = "espidf"))]
    pub subscriptions: Vec<(String, QoS)>,
}

impl MqttAdapter {
    /// Adapter for `mqtt://host:port`, delivering into `inbound`.
    pub fn new(host: &str, port: u16, inbound: &'static InboundChannel) -> Self {
        Self {
            broker_url: format!("mqtt://{host}:{port}"),
            inbound,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(target_os = "espidf")]
            link_up: Arc::new(AtomicBool::new(false)),
            #[cfg(not(target_os = "espidf"))]
            up: false,
            #[cfg(not(target_os = "espidf"))]
            refuse_connect: false,
            #[cfg(not(target_os = "espidf"))]
            will: None,
            #[cfg(not(target_os = "espidf"))]
            published: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            subscriptions: Vec::new(),
        }
    }

    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl Transport for MqttAdapter {
    fn connected(&self) -> bool {
        self.link_up.load(Ordering::Acquire)
    }

    fn connect(&mut self, client_id: &str, will: LastWill<'_>) -> Result<(), CommsError> {
        // The IDF client reconnects on its own once created; later calls
        // only wait for it.
        if self.client.is_some() {
            return Ok(());
        }

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            lwt: Some(LwtConfiguration {
                topic: will.topic,
                payload: will.payload.as_bytes(),
                qos: EspQoS::AtLeastOnce,
                retain: will.retained,
            }),
            ..Default::default()
        };

        let link_up = Arc::clone(&self.link_up);
        let inbound = self.inbound;
        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => link_up.store(true, Ordering::Release),
                EventPayload::Disconnected => link_up.store(false, Ordering::Release),
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    details: Details::Complete,
                    ..
                } => match InboundMsg::from_parts(topic, data) {
                    Some(msg) => {
                        if inbound.try_send(msg).is_err() {
                            log::warn!("mqtt: inbound queue full, dropped message on {topic}");
                        }
                    }
                    None => log::warn!("mqtt: oversized or non-UTF-8 message on {topic}"),
                },
                EventPayload::Received { .. } => log::warn!("mqtt: chunked message ignored"),
                _ => {}
            }
        })
        .map_err(|e| {
            log::warn!("mqtt: client init failed: {e}");
            CommsError::ConnectFailed
        })?;

        info!("mqtt: client started for {}", self.broker_url);
        self.client = Some(client);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str, retained: bool) -> bool {
        if !self.connected() {
            return false;
        }
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        match client.enqueue(topic, EspQoS::AtMostOnce, retained, payload.as_bytes()) {
            Ok(_) => true,
            Err(e) => {
                debug!("mqtt: publish on {topic} failed: {e}");
                false
            }
        }
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
        client
            .subscribe(topic, esp_qos(qos))
            .map(|_| ())
            .map_err(|_| CommsError::SubscribeFailed)
    }

    fn poll(&mut self) -> Option<Inbound> {
        let msg = self.inbound.try_receive().ok()?;
        Some(Inbound {
            topic: msg.topic.as_str().into(),
            payload: msg.payload.as_str().into(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    /// Deliver a publication as if the broker sent it.
    pub fn inject(&self, topic: &str, payload: &str) -> bool {
        match InboundMsg::from_parts(topic, payload.as_bytes()) {
            Some(msg) => self.inbound.try_send(msg).is_ok(),
            None => false,
        }
    }

    /// Drop the session; the broker publishes the last will.
    pub fn drop_link(&mut self) {
        if self.up {
            self.up = false;
            if let Some(will) = self.will.clone() {
                self.published.push(will);
            }
        }
    }

    /// Make subsequent connect attempts fail.
    pub fn refuse_connections(&mut self, refuse: bool) {
        self.refuse_connect = refuse;
    }

    pub fn payloads(&self) -> Vec<&str> {
        self.published.iter().map(|p| p.payload.as_str()).collect()
    }
}

#[cfg(not(target_os = "espidf"))]
impl Transport for MqttAdapter {
    fn connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self, client_id: &str, will: LastWill<'_>) -> Result<(), CommsError> {
        if self.refuse_connect {
            debug!("mqtt(sim): refusing {client_id}");
            return Err(CommsError::ConnectFailed);
        }
        self.will = Some(Published {
            topic: will.topic.into(),
            payload: will.payload.into(),
            retained: will.retained,
        });
        self.up = true;
        info!("mqtt(sim): {client_id} connected to {}", self.broker_url);
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str, retained: bool) -> bool {
        if !self.up {
            return false;
        }
        self.published.push(Published {
            topic: topic.into(),
            payload: payload.into(),
            retained,
        });
        true
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), CommsError> {
        if !self.up {
            return Err(CommsError::NotConnected);
        }
        self.subscriptions.push((topic.into(), qos));
        Ok(())
    }

    fn poll(&mut self) -> Option<Inbound> {
        let msg = self.inbound.try_receive().ok()?;
        Some(Inbound {
            topic: msg.topic.as_str().into(),
            payload: msg.payload.as_str().into(),
        })
    }
}
