//! Relay output bank.
//!
//! Implements [`OutputPort`] over raw ESP-IDF GPIO calls.  Pins are
//! configured lazily as the control room binds them; there is no fixed
//! pin map on a relay prop.
//!
//! The simulation backend records the last mode and level per pin so host
//! tests can assert on the physical side of a command.

use crate::app::ports::{OutputPort, PinMode, PinState};
use crate::pins::MAX_GPIO;

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

const PIN_COUNT: usize = MAX_GPIO as usize + 1;

pub struct GpioBank {
    #[cfg(not(target_os = "espidf"))]
    modes: [Option<PinMode>; PIN_COUNT],
    #[cfg(not(target_os = "espidf"))]
    levels: [Option<PinState>; PIN_COUNT],
}

impl Default for GpioBank {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBank {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            modes: [None; PIN_COUNT],
            #[cfg(not(target_os = "espidf"))]
            levels: [None; PIN_COUNT],
        }
    }

    /// Last mode configured on `pin` (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.modes.get(pin as usize).copied().flatten()
    }

    /// Last level written to `pin` (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.levels.get(pin as usize).copied().flatten()
    }
}

#[cfg(target_os = "espidf")]
impl OutputPort for GpioBank {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) {
        if pin > MAX_GPIO {
            return;
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: match mode {
                PinMode::Input => gpio_mode_t_GPIO_MODE_INPUT,
                PinMode::Output => gpio_mode_t_GPIO_MODE_OUTPUT,
            },
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: plain register configuration from the main task.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            log::warn!("gpio: config D{pin} failed (rc={ret})");
        }
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        if pin > MAX_GPIO {
            return;
        }
        // SAFETY: gpio_set_level on a configured output; main task only.
        unsafe {
            gpio_set_level(pin as i32, u32::from(level == PinState::High));
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl OutputPort for GpioBank {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) {
        if let Some(slot) = self.modes.get_mut(pin as usize) {
            *slot = Some(mode);
        }
        log::debug!("gpio(sim): D{pin} -> {mode:?}");
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        if let Some(slot) = self.levels.get_mut(pin as usize) {
            *slot = Some(level);
        }
    }
}
