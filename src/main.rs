//! Relay prop firmware — main entry point.
//!
//! Hexagonal architecture around a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioBank        MqttAdapter     LogEventSink    NvsAdapter    │
//! │  (OutputPort)    (Transport)     (EventSink)     (ConfigPort)  │
//! │  MonotonicClock  WifiAdapter                                   │
//! │  (Clock)         (station upkeep)                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              PropService (pure logic)                  │    │
//! │  │  Registry · Dispatch · Reporter · Supervisor           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use relayprop::adapters::device_id;
use relayprop::adapters::gpio::GpioBank;
use relayprop::adapters::log_sink::LogEventSink;
use relayprop::adapters::mqtt::MqttAdapter;
use relayprop::adapters::nvs::NvsAdapter;
use relayprop::adapters::time::MonotonicClock;
use relayprop::adapters::wifi::WifiAdapter;
use relayprop::app::ports::Clock;
use relayprop::app::service::PropService;
use relayprop::channels::INBOUND_CHANNEL;
use relayprop::config::PropConfig;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayProp v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(mut nvs) => nvs.load_or_commission(),
        Err(e) => {
            warn!("NVS unavailable ({}), using defaults", e);
            PropConfig::default()
        }
    };

    // ── 3. Network bring-up ───────────────────────────────────
    let clock = MonotonicClock::new();
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        nvs_partition,
        config.reconnect_interval_ms,
        clock.now_ms(),
    )?;
    if let Err(e) = wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        warn!("WiFi not started ({}), running offline", e);
    }

    let client_id = device_id::resolve_client_id(&config.client_id, &device_id::read_mac());
    let mut link = MqttAdapter::new(&config.broker_host, config.broker_port, &INBOUND_CHANNEL);

    // ── 4. Construct service ──────────────────────────────────
    let mut io = GpioBank::new();
    let mut sink = LogEventSink::new();
    let mut service = PropService::new(&config, &client_id, clock.now_ms());
    service.start(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now_ms();
        wifi.poll(now);
        service.poll(&mut link, &mut io, &mut sink, now);
        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}
