//! Device identity derived from the ESP32 factory MAC address.
//!
//! The default MQTT client id is `relayprop-xxyyzz` (last 3 bytes of the
//! 6-byte MAC, lowercase hex).  It is stable across reboots, so the
//! broker's retained last will always belongs to the same session name.

/// Fixed-size client id string.
pub type ClientIdString = heapless::String<32>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly 6 bytes into `mac`.
    unsafe {
        esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Default client id for `mac`.
pub fn client_id(mac: &MacAddress) -> ClientIdString {
    use core::fmt::Write;
    let mut id = ClientIdString::new();
    let _ = write!(id, "relayprop-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

/// Configured id if set, otherwise the MAC-derived default.
pub fn resolve_client_id(configured: &str, mac: &MacAddress) -> ClientIdString {
    if configured.is_empty() {
        client_id(mac)
    } else {
        crate::text::truncate(configured)
    }
}
