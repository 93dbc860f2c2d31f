//! Integration tests: settings topics → registry → GPIO + outbox.

use relayprop::app::events::{PropEvent, SettingsFault};
use relayprop::app::ports::{PinMode, PinState};
use relayprop::error::DecodeError;

use super::mock_hw::{PinCall, Rig, SETTINGS};

fn pin_topic(suffix: &str) -> String {
    format!("{SETTINGS}/{suffix}")
}

#[test]
fn object_adds_pin_and_announces_it() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"light1","a":["on","off"]}"#);

    assert_eq!(
        rig.io.calls,
        [
            PinCall::Configure(5, PinMode::Output),
            PinCall::Write(5, PinState::Low)
        ]
    );
    assert_eq!(
        rig.link.payloads(),
        ["MESG Add pin: D5 light1 (on/off) initial=0"]
    );
    assert!(!rig.link.published[0].retained);
    assert!(rig.sink.events.contains(&PropEvent::PinAdded {
        pin: 5,
        name: "light1".into(),
        replaced: false,
    }));
}

#[test]
fn long_field_names_and_initial_high() {
    let mut rig = Rig::connected();
    rig.add(r#"{"pin":"GPIO7","variable":"relay","initial":1}"#);

    assert_eq!(rig.value("relay"), Some(true));
    assert_eq!(rig.io.level(7), Some(PinState::High));
    assert_eq!(
        rig.link.payloads(),
        ["MESG Add pin: D7 relay (1/0) initial=1"]
    );
}

#[test]
fn same_pin_replaces_previous_binding() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"light1"}"#);
    rig.add(r#"{"p":5,"v":"lamp","i":true}"#);

    assert_eq!(rig.svc.registry().count(), 1);
    assert_eq!(rig.value("light1"), None);
    assert_eq!(rig.value("lamp"), Some(true));
    assert!(rig.sink.events.contains(&PropEvent::PinAdded {
        pin: 5,
        name: "lamp".into(),
        replaced: true,
    }));
}

#[test]
fn rebinding_a_pin_reports_with_new_labels() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"door","a":["on","off"],"i":true}"#);
    rig.tick(1000);
    rig.add(r#"{"p":5,"v":"door","a":["open","shut"],"i":true}"#);
    rig.link.clear();

    // Fresh binding counts as changed even though the level is the same.
    rig.tick(1000);
    assert_eq!(rig.link.payloads(), ["DATA door=open"]);

    rig.link.clear();
    rig.inbox("door:0");
    assert_eq!(rig.link.payloads(), ["DATA door=shut", "DONE door:0"]);
}

#[test]
fn array_replaces_whole_set() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":2,"v":"old"}"#);
    rig.add(r#"{"p":3,"v":"kept"}"#);
    rig.io.calls.clear();
    rig.link.clear();

    rig.add(r#"[{"p":3,"v":"kept"},{"p":4,"v":"new","i":1}]"#);

    let names: Vec<&str> = rig.svc.registry().iter().map(|b| b.name()).collect();
    assert_eq!(names, ["kept", "new"]);
    assert_eq!(rig.io.mode(2), Some(PinMode::Input));
    assert_eq!(rig.io.mode(3), Some(PinMode::Output));
    assert_eq!(rig.io.level(4), Some(PinState::High));
    assert_eq!(
        rig.link.payloads(),
        [
            "MESG Add pin: D3 kept (1/0) initial=0",
            "MESG Add pin: D4 new (1/0) initial=1"
        ]
    );
}

#[test]
fn array_skips_bad_entries_with_warning() {
    let mut rig = Rig::connected();
    rig.add(r#"[{"p":5,"v":"a"},{"p":"x","v":"b"}]"#);

    assert_eq!(rig.svc.registry().count(), 1);
    assert_eq!(
        rig.link.payloads(),
        [
            "MESG Add pin: D5 a (1/0) initial=0",
            "MESG Warning: pin ignored from settings (unrecognised pin identifier)"
        ]
    );
}

#[test]
fn empty_array_clears_everything() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"a"}"#);
    rig.add("[]");
    assert!(rig.svc.registry().is_empty());
    assert!(rig
        .sink
        .events
        .contains(&PropEvent::AllCleared { count: 1 }));
}

#[test]
fn per_pin_topic_adds_and_empty_payload_removes() {
    let mut rig = Rig::connected();
    rig.deliver(&pin_topic("D5"), r#"{"p":5,"v":"light1"}"#);
    assert_eq!(rig.value("light1"), Some(false));

    rig.link.clear();
    rig.deliver(&pin_topic("D5"), "");
    assert!(rig.svc.registry().is_empty());
    assert_eq!(rig.io.mode(5), Some(PinMode::Input));
    assert!(rig.link.published.is_empty());
    assert!(rig.sink.events.contains(&PropEvent::PinRemoved {
        pin: 5,
        name: "light1".into(),
    }));
}

#[test]
fn empty_payload_for_unbound_pin_warns() {
    let mut rig = Rig::connected();
    rig.deliver(&pin_topic("D9"), "");
    assert_eq!(
        rig.link.payloads(),
        ["MESG Warning: pin not found in settings for clear:D9"]
    );
}

#[test]
fn unrelated_topic_is_ignored() {
    let mut rig = Rig::connected();
    rig.deliver("Room/Other/settings", r#"{"p":5,"v":"light1"}"#);
    rig.deliver(&pin_topic("lights"), r#"{"p":5,"v":"light1"}"#);
    assert!(rig.svc.registry().is_empty());
    assert!(rig.link.published.is_empty());
}

#[test]
fn malformed_json_warns_and_binds_nothing() {
    let mut rig = Rig::connected();
    rig.add("{not json");

    assert!(rig.svc.registry().is_empty());
    assert!(rig.io.calls.is_empty());
    let payloads = rig.link.payloads();
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].starts_with("MESG Warning: invalid pin settings (malformed"));
}

#[test]
fn reserved_pin_is_rejected() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":27,"v":"flash"}"#);

    assert!(rig.svc.registry().is_empty());
    assert!(rig.io.calls.is_empty());
    assert_eq!(
        rig.link.payloads(),
        ["MESG Warning: invalid pin settings (pin 27 is reserved on this board)"]
    );
    assert!(rig.sink.events.contains(&PropEvent::SettingsRejected(
        SettingsFault::Decode(DecodeError::ReservedPin(27))
    )));
}

#[test]
fn empty_name_is_rejected() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":""}"#);
    assert!(rig.svc.registry().is_empty());
    assert_eq!(
        rig.link.payloads(),
        ["MESG Warning: invalid pin settings (empty variable name)"]
    );
}

#[test]
fn oversized_name_is_truncated() {
    let mut rig = Rig::connected();
    let long = "n".repeat(40);
    rig.add(&format!(r#"{{"p":5,"v":"{long}"}}"#));

    let binding = rig.svc.registry().iter().next().unwrap();
    assert_eq!(binding.name().len(), relayprop::text::NAME_CAP);
}

#[test]
fn full_registry_refuses_new_pin() {
    let mut rig = Rig::connected();
    let pins: Vec<u8> = (0..=48)
        .filter(|p| relayprop::pins::is_bindable(*p))
        .collect();
    for (i, pin) in pins.iter().take(32).enumerate() {
        rig.add(&format!(r#"{{"p":{pin},"v":"v{i}"}}"#));
    }
    assert_eq!(rig.svc.registry().count(), 32);

    let spare = pins[32];
    rig.link.clear();
    rig.add(&format!(r#"{{"p":{spare},"v":"extra"}}"#));
    assert_eq!(rig.svc.registry().count(), 32);
    assert_eq!(
        rig.link.payloads(),
        [format!("MESG Warning: cannot add pin D{spare} (no free binding slot)")]
    );
}
