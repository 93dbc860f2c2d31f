//! Pin registry — the in-memory model of every controllable output.
//!
//! Each [`PinBinding`] pairs a physical pin with the [`LogicalData`] entry
//! published to the control room.  The entry lives inside the binding, so
//! removing a binding removes its published state in the same step and no
//! report can ever reference a pin that is gone.
//!
//! Storage is a fixed-capacity vector scanned linearly; relay boards bind
//! a few dozen pins at most.

use core::fmt::Write;

use heapless::Vec;

use crate::app::ports::{OutputPort, PinMode, PinState};
use crate::error::RegistryError;
use crate::text::{Label, Name};

/// Maximum number of simultaneously bound pins.
pub const MAX_BINDINGS: usize = 32;

/// Wire prefix of a remove-by-pin request (`clear:D<n>`).
pub const CLEAR_PREFIX: &str = "clear:D";

// ───────────────────────────────────────────────────────────────
// Published entry
// ───────────────────────────────────────────────────────────────

/// Change-tracked boolean variable with human-readable state labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalData {
    name: Name,
    high: Label,
    low: Label,
    value: bool,
    /// Value carried by the last successful report, `None` before the first.
    reported: Option<bool>,
}

impl LogicalData {
    pub fn new(name: Name, high: Label, low: Label, value: bool) -> Self {
        Self {
            name,
            high,
            low,
            value,
            reported: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> bool {
        self.value
    }

    /// Label for the current value.
    pub fn label(&self) -> &str {
        if self.value { &self.high } else { &self.low }
    }

    pub fn set(&mut self, value: bool) {
        self.value = value;
    }

    /// `true` if the value differs from what was last reported.
    pub fn is_changed(&self) -> bool {
        self.reported != Some(self.value)
    }

    pub fn mark_reported(&mut self) {
        self.reported = Some(self.value);
    }

    /// Append `name=label` to `out`.
    pub fn write_entry(&self, out: &mut String) {
        let _ = write!(out, "{}={}", self.name, self.label());
    }
}

// ───────────────────────────────────────────────────────────────
// Binding
// ───────────────────────────────────────────────────────────────

/// Everything needed to create a binding, already bounded and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    pub pin: u8,
    pub name: Name,
    pub high: Label,
    pub low: Label,
    pub initial: bool,
}

/// One physical pin bound to a published variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinBinding {
    pin: u8,
    data: LogicalData,
}

impl PinBinding {
    fn from_spec(spec: PinSpec) -> Self {
        Self {
            pin: spec.pin,
            data: LogicalData::new(spec.name, spec.high, spec.low, spec.initial),
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn name(&self) -> &str {
        self.data.name()
    }

    pub fn value(&self) -> bool {
        self.data.value()
    }

    pub fn data(&self) -> &LogicalData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut LogicalData {
        &mut self.data
    }
}

/// Index of a binding inside the registry.
///
/// Valid until the next add or remove; the dispatcher only holds one for
/// the duration of a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingHandle(usize);

/// Result of [`PinRegistry::add_binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    pub handle: BindingHandle,
    /// An older binding on the same pin was torn down first.
    pub replaced: bool,
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PinRegistry {
    bindings: Vec<PinBinding, MAX_BINDINGS>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `spec.pin`, replacing any binding it already has.
    ///
    /// The pin is configured as an output and driven to the initial level
    /// so the published value matches the hardware from the start.
    pub fn add_binding(
        &mut self,
        spec: PinSpec,
        io: &mut impl OutputPort,
    ) -> Result<Added, RegistryError> {
        let replaced = match self.position_of_pin(spec.pin) {
            Some(i) => {
                self.bindings.remove(i);
                true
            }
            None => false,
        };

        if self.bindings.is_full() {
            return Err(RegistryError::Full);
        }

        let pin = spec.pin;
        let level = PinState::from(spec.initial);
        io.configure_pin(pin, PinMode::Output);
        io.write_pin(pin, level);

        let handle = BindingHandle(self.bindings.len());
        // Capacity checked above.
        let _ = self.bindings.push(PinBinding::from_spec(spec));
        Ok(Added { handle, replaced })
    }

    /// Unbind `pin` and return it to input mode.
    pub fn remove_by_pin(
        &mut self,
        pin: u8,
        io: &mut impl OutputPort,
    ) -> Result<PinBinding, RegistryError> {
        let i = self
            .position_of_pin(pin)
            .ok_or(RegistryError::NotFound(pin))?;
        let binding = self.bindings.remove(i);
        io.configure_pin(pin, PinMode::Input);
        Ok(binding)
    }

    /// Unbind the pin named by a `clear:D<n>` request.
    ///
    /// Leading digits after the prefix are the pin number.  Zero is only
    /// accepted when the text literally ends in `D0`, so `clear:Dx` cannot
    /// silently clear pin 0.
    pub fn remove_by_predicate_string(
        &mut self,
        text: &str,
        io: &mut impl OutputPort,
    ) -> Result<PinBinding, RegistryError> {
        let pin = parse_clear_pin(text).ok_or(RegistryError::BadPredicate)?;
        self.remove_by_pin(pin, io)
    }

    /// Unbind every pin.  Returns how many bindings were removed.
    ///
    /// The whole set is detached before any pin is released, so nothing
    /// observing the registry sees a half-torn-down state.
    pub fn remove_all(&mut self, io: &mut impl OutputPort) -> usize {
        let detached = core::mem::take(&mut self.bindings);
        for binding in &detached {
            io.configure_pin(binding.pin, PinMode::Input);
        }
        detached.len()
    }

    pub fn count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// First binding whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<BindingHandle> {
        self.bindings
            .iter()
            .position(|b| b.name() == name)
            .map(BindingHandle)
    }

    /// Every binding whose name starts with `prefix`, in bound order.
    pub fn find_by_wildcard_prefix(&self, prefix: &str) -> Vec<BindingHandle, MAX_BINDINGS> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.name().starts_with(prefix))
            .map(|(i, _)| BindingHandle(i))
            .collect()
    }

    pub fn find_by_pin(&self, pin: u8) -> Option<BindingHandle> {
        self.position_of_pin(pin).map(BindingHandle)
    }

    pub fn get(&self, handle: BindingHandle) -> Option<&PinBinding> {
        self.bindings.get(handle.0)
    }

    /// Drive the bound pin to `level` and record it as the logical value.
    pub fn apply_level(
        &mut self,
        handle: BindingHandle,
        level: PinState,
        io: &mut impl OutputPort,
    ) -> bool {
        let Some(binding) = self.bindings.get_mut(handle.0) else {
            return false;
        };
        io.write_pin(binding.pin, level);
        binding.data.set(level == PinState::High);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinBinding> {
        self.bindings.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PinBinding> {
        self.bindings.iter_mut()
    }

    fn position_of_pin(&self, pin: u8) -> Option<usize> {
        self.bindings.iter().position(|b| b.pin == pin)
    }
}

/// Pin number of a `clear:D<n>` request.
fn parse_clear_pin(text: &str) -> Option<u8> {
    let digits_and_rest = text.strip_prefix(CLEAR_PREFIX)?;
    let digits: &str = {
        let end = digits_and_rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits_and_rest.len());
        &digits_and_rest[..end]
    };
    // No digits reads as zero; an overflowing run is no number at all.
    let number: u32 = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };
    if number != 0 || text.ends_with("D0") {
        u8::try_from(number).ok()
    } else {
        None
    }
}
