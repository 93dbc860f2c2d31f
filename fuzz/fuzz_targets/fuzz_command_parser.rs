//! Fuzz target: inbox command dispatch
//!
//! Feeds arbitrary text through `dispatch` against a small fixed registry
//! and checks that a rejected command never drives a pin.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayprop::app::ports::{OutputPort, PinMode, PinState};
use relayprop::dispatch::{self, Outcome};
use relayprop::registry::{PinRegistry, PinSpec};
use relayprop::text::truncate;

struct CountWrites(usize);

impl OutputPort for CountWrites {
    fn configure_pin(&mut self, _pin: u8, _mode: PinMode) {}

    fn write_pin(&mut self, _pin: u8, _level: PinState) {
        self.0 += 1;
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut io = CountWrites(0);
    let mut reg = PinRegistry::new();
    for (pin, name) in [(2, "zoneA/light1"), (3, "zoneA/light2"), (4, "fan")] {
        let spec = PinSpec {
            pin,
            name: truncate(name),
            high: truncate("on"),
            low: truncate("off"),
            initial: false,
        };
        let _ = reg.add_binding(spec, &mut io);
    }
    io.0 = 0;

    match dispatch::dispatch(&mut reg, &mut io, text) {
        Outcome::Done { matched } => assert_eq!(matched, io.0),
        Outcome::Omitted(_) => assert_eq!(io.0, 0, "omitted command drove a pin"),
    }
    assert_eq!(reg.count(), 3);
});
