//! Fuzz target: settings payload decoding
//!
//! Arbitrary bytes on the settings topic must either decode to specs that
//! respect the board's reserved pins and the bounded name capacity, or be
//! rejected with a typed error.
//!
//! cargo fuzz run fuzz_pin_settings

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayprop::decoder::{PinSettings, decode_settings};
use relayprop::pins::is_bindable;
use relayprop::registry::PinSpec;
use relayprop::text::NAME_CAP;

fn check(spec: &PinSpec) {
    assert!(is_bindable(spec.pin), "reserved pin {} accepted", spec.pin);
    assert!(!spec.name.is_empty());
    assert!(spec.name.len() <= NAME_CAP);
}

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = core::str::from_utf8(data) else {
        return;
    };

    match decode_settings(payload) {
        Ok(PinSettings::Add(spec)) => check(&spec),
        Ok(PinSettings::Replace(items)) => items.iter().flatten().for_each(check),
        Err(_) => {}
    }
});
