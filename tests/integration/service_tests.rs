//! Integration tests: inbox → PropService → GPIO + outbox.

use relayprop::app::events::PropEvent;
use relayprop::app::ports::{PinMode, PinState};
use relayprop::dispatch::Rejection;

use super::mock_hw::{INBOX, Rig};

/// Rig with three bound pins whose initial state has already been reported.
fn zoned() -> Rig {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":2,"v":"zoneA/light1"}"#);
    rig.add(r#"{"p":3,"v":"zoneA/light2"}"#);
    rig.add(r#"{"p":4,"v":"zoneB/fan","a":["spin","stop"]}"#);
    rig.tick(1000);
    rig.link.clear();
    rig.io.calls.clear();
    rig
}

#[test]
fn group_command_drives_zone_and_reports_once() {
    let mut rig = zoned();
    rig.inbox("zoneA/*:1");

    assert_eq!(
        rig.io.writes(),
        [(2, PinState::High), (3, PinState::High)]
    );
    assert_eq!(rig.value("zoneA/light1"), Some(true));
    assert_eq!(rig.value("zoneA/light2"), Some(true));
    assert_eq!(rig.value("zoneB/fan"), Some(false));
    assert_eq!(
        rig.link.payloads(),
        ["DATA zoneA/light1=1 zoneA/light2=1", "DONE zoneA/*:1"]
    );
    assert!(rig.sink.events.contains(&PropEvent::CommandDone {
        command: "zoneA/*:1".into(),
        matched: 2,
    }));
}

#[test]
fn group_command_without_members_is_done() {
    let mut rig = zoned();
    rig.inbox("zoneC/*:1");
    assert!(rig.io.writes().is_empty());
    assert_eq!(rig.link.payloads(), ["DONE zoneC/*:1"]);
}

#[test]
fn exact_command_uses_labels() {
    let mut rig = zoned();
    rig.inbox("zoneB/fan:1");
    assert_eq!(rig.io.writes(), [(4, PinState::High)]);
    assert_eq!(
        rig.link.payloads(),
        ["DATA zoneB/fan=spin", "DONE zoneB/fan:1"]
    );
}

#[test]
fn malformed_commands_are_omitted_verbatim() {
    let mut rig = zoned();
    for cmd in ["zoneB/fan:5", "zoneB/fan:", "zoneB/fan", ":1"] {
        rig.inbox(cmd);
    }
    assert!(rig.io.writes().is_empty());
    assert_eq!(
        rig.link.payloads(),
        [
            "OMIT zoneB/fan:5",
            "OMIT zoneB/fan:",
            "OMIT zoneB/fan",
            "OMIT :1"
        ]
    );
}

#[test]
fn unknown_name_is_omitted_without_write() {
    let mut rig = zoned();
    rig.inbox("ghost:1");
    assert!(rig.io.writes().is_empty());
    assert_eq!(rig.link.payloads(), ["OMIT ghost:1"]);
    assert!(rig.sink.events.contains(&PropEvent::CommandOmitted {
        command: "ghost:1".into(),
        reason: Rejection::UnknownName,
    }));
}

#[test]
fn redelivered_command_is_idempotent() {
    let mut rig = zoned();
    rig.inbox("zoneA/light1:1");
    let after_once: Vec<bool> = rig.svc.registry().iter().map(|b| b.value()).collect();
    rig.inbox("zoneA/light1:1");
    let after_twice: Vec<bool> = rig.svc.registry().iter().map(|b| b.value()).collect();

    assert_eq!(after_once, after_twice);
    assert_eq!(
        rig.link.payloads(),
        [
            "DATA zoneA/light1=1",
            "DONE zoneA/light1:1",
            "DONE zoneA/light1:1"
        ]
    );
}

#[test]
fn app_data_sends_everything_then_done() {
    let mut rig = zoned();
    rig.inbox("app:startup");
    assert_eq!(
        rig.link.payloads(),
        [
            "DATA zoneA/light1=0 zoneA/light2=0 zoneB/fan=stop",
            "DONE app:startup"
        ]
    );
}

#[test]
fn clear_all_releases_every_pin() {
    let mut rig = zoned();
    rig.inbox("clear:all");
    assert_eq!(rig.svc.registry().count(), 0);
    for pin in [2, 3, 4] {
        assert_eq!(rig.io.mode(pin), Some(PinMode::Input));
    }
    assert_eq!(rig.link.payloads(), ["DONE clear:all"]);

    // Nothing left to report.
    rig.tick(1000);
    rig.inbox("app:data");
    assert_eq!(rig.link.payloads(), ["DONE clear:all", "DONE app:data"]);
}

#[test]
fn clear_d0_removes_only_pin_zero() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":0,"v":"zero"}"#);
    rig.add(r#"{"p":10,"v":"ten"}"#);
    rig.link.clear();

    rig.inbox("clear:D0");
    assert_eq!(rig.svc.registry().count(), 1);
    assert_eq!(rig.value("ten"), Some(false));
    assert_eq!(rig.io.mode(0), Some(PinMode::Input));
    assert_eq!(rig.link.payloads(), ["DONE clear:D0"]);
}

#[test]
fn clear_unknown_pin_warns_and_changes_nothing() {
    let mut rig = zoned();
    rig.inbox("clear:D9");
    assert_eq!(rig.svc.registry().count(), 3);
    assert!(rig.io.calls.is_empty());
    assert_eq!(
        rig.link.payloads(),
        ["MESG Warning: pin not found in settings for clear:D9"]
    );
}

#[test]
fn offline_command_applies_and_is_reported_after_reconnect() {
    let mut rig = zoned();
    rig.link.up = false;
    rig.tick(10);
    assert!(!rig.svc.is_connected());

    // Arrives through a path that bypasses the (down) broker.
    rig.svc
        .handle_message(INBOX, "zoneA/light2:1", &mut rig.link, &mut rig.io, &mut rig.sink);
    assert_eq!(rig.io.level(3), Some(PinState::High));
    assert!(rig.link.published.is_empty());

    rig.tick(10);
    assert!(rig.svc.is_connected());
    let payloads = rig.link.payloads();
    assert_eq!(payloads[0], "CONNECTED");
    assert_eq!(
        payloads[1],
        "DATA zoneA/light1=0 zoneA/light2=1 zoneB/fan=stop"
    );
}

#[test]
fn periodic_change_report_picks_up_new_bindings() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"door","a":["open","shut"],"i":true}"#);
    rig.link.clear();

    rig.tick(999);
    assert!(rig.link.published.is_empty());
    rig.tick(1);
    assert_eq!(rig.link.payloads(), ["DATA door=open"]);
    rig.tick(1000);
    assert_eq!(rig.link.payloads(), ["DATA door=open"]);
}
