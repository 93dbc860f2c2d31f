//! GPIO availability on the ESP32-S3 relay board.
//!
//! Single source of truth for which pins the control room may bind.  Any
//! pin number that does not exist on the chip, or that is wired to flash,
//! the USB PHY or the serial console, is reserved.

// ---------------------------------------------------------------------------
// Chip limits
// ---------------------------------------------------------------------------

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: u8 = 48;

/// GPIO 22–25 are not bonded out on the S3.
const ABSENT: core::ops::RangeInclusive<u8> = 22..=25;

// ---------------------------------------------------------------------------
// Board reservations
// ---------------------------------------------------------------------------

/// SPI flash / PSRAM bus.
const FLASH: core::ops::RangeInclusive<u8> = 26..=32;

/// Native USB D- / D+.
pub const USB_DM_GPIO: u8 = 19;
pub const USB_DP_GPIO: u8 = 20;

/// UART0 console (log output).
pub const UART_TX_GPIO: u8 = 43;
pub const UART_RX_GPIO: u8 = 44;

/// `true` if `pin` may be driven as a relay output.
pub fn is_bindable(pin: u8) -> bool {
    pin <= MAX_GPIO
        && !ABSENT.contains(&pin)
        && !FLASH.contains(&pin)
        && !matches!(
            pin,
            USB_DM_GPIO | USB_DP_GPIO | UART_TX_GPIO | UART_RX_GPIO
        )
}
