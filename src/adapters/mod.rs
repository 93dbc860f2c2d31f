//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                |
//! |-------------|---------------|----------------------------|
//! | `gpio`      | OutputPort    | ESP32 GPIO (relay outputs) |
//! | `mqtt`      | Transport     | ESP-IDF MQTT client        |
//! | `time`      | Clock         | esp_timer                  |
//! | `log_sink`  | EventSink     | Serial log output          |
//! | `nvs`       | ConfigPort    | NVS / in-memory store      |
//! | `wifi`      | —             | ESP-IDF Wi-Fi STA          |
//! | `device_id` | —             | eFuse MAC                  |

pub mod device_id;
pub mod gpio;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
