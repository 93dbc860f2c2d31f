//! Wi-Fi station-mode adapter.
//!
//! The radio comes up without credentials.  Once
//! [`WifiAdapter::set_credentials`] accepts an SSID the station connects,
//! and [`WifiAdapter::poll`] re-issues a connect on a fixed period while
//! the association is down.  Missing credentials never stop the firmware;
//! the control loop runs offline.  The MQTT session rides on top
//! and is supervised separately.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` (non-blocking).
//! - **all other targets**: simulation flag for host-side tests.

use core::fmt;
use log::info;

use crate::timer::{IntervalTimer, Millis};

#[cfg(target_os = "espidf")]
use esp_idf_hal::modem::Modem;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    DriverFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverFailed => write!(f, "Wi-Fi driver error"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    retry: IntervalTimer,
    provisioned: bool,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    associated: bool,
    #[cfg(not(target_os = "espidf"))]
    attempts: u32,
}

impl WifiAdapter {
    /// Take the radio without credentials.  Nothing is attempted until
    /// [`set_credentials`](Self::set_credentials) succeeds.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        retry_ms: u32,
        now: Millis,
    ) -> Result<Self, ConnectivityError> {
        let wifi =
            EspWifi::new(modem, sysloop, Some(nvs)).map_err(|_| ConnectivityError::DriverFailed)?;
        Ok(Self {
            retry: IntervalTimer::new(retry_ms, now),
            provisioned: false,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(retry_ms: u32, now: Millis) -> Self {
        Self {
            retry: IntervalTimer::new(retry_ms, now),
            provisioned: false,
            associated: false,
            attempts: 0,
        }
    }

    /// Validate and apply station credentials, then issue the first
    /// connect.  Invalid credentials leave the adapter idle.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.configure(ssid, password)?;
        self.provisioned = true;
        info!("WiFi: credentials set (SSID='{ssid}')");
        self.reconnect();
        Ok(())
    }

    pub fn is_provisioned(&self) -> bool {
        self.provisioned
    }

    #[cfg(target_os = "espidf")]
    fn configure(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        let client = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::Client(client))
            .map_err(|_| ConnectivityError::DriverFailed)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|_| ConnectivityError::DriverFailed)?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_connected(&self) -> bool {
        self.associated
    }

    /// Re-issue a connect if the association is down and the retry
    /// period has elapsed.  Returns `true` if an attempt was made.
    pub fn poll(&mut self, now: Millis) -> bool {
        if !self.provisioned {
            return false;
        }
        if self.is_connected() {
            self.retry.rearm(now);
            return false;
        }
        if !self.retry.poll(now) {
            return false;
        }
        self.reconnect();
        true
    }

    #[cfg(target_os = "espidf")]
    fn reconnect(&mut self) {
        info!("WiFi: connecting");
        if let Err(e) = self.wifi.connect() {
            log::warn!("WiFi: connect failed: {e}");
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn reconnect(&mut self) {
        self.attempts += 1;
    }

    /// Simulation: force the association state.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_associated(&mut self, up: bool) {
        self.associated = up;
    }

    /// Simulation: connect attempts made so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
