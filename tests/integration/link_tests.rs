//! Integration tests: broker session lifecycle through PropService.

use relayprop::app::events::PropEvent;
use relayprop::app::service::PropService;
use relayprop::app::ports::QoS;
use relayprop::error::CommsError;
use relayprop::supervisor::LinkState;

use super::mock_hw::{INBOX, OUTBOX, Publication, Rig, SETTINGS, test_config};

#[test]
fn first_poll_connects_announces_and_subscribes() {
    let mut rig = Rig::offline();
    rig.tick(0);

    assert_eq!(rig.link.connects, 1);
    assert_eq!(rig.svc.supervisor().state(), LinkState::Up);
    assert_eq!(
        rig.link.published,
        [Publication {
            topic: OUTBOX.into(),
            payload: "CONNECTED".into(),
            retained: true,
        }]
    );
    assert_eq!(
        rig.link.subscriptions,
        [
            (String::from(INBOX), QoS::AtLeastOnce),
            (format!("{SETTINGS}/#"), QoS::AtLeastOnce),
        ]
    );
    assert!(rig.sink.events.contains(&PropEvent::LinkUp));
}

#[test]
fn outbox_messages_are_not_retained() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"light1"}"#);
    rig.inbox("light1:1");
    assert!(!rig.link.published.is_empty());
    assert!(rig
        .link
        .published
        .iter()
        .all(|p| p.topic == OUTBOX && !p.retained));
}

#[test]
fn offline_publishes_nothing_and_retries_on_fixed_period() {
    let mut rig = Rig::offline();
    rig.link.fail_connect = true;

    rig.tick(0);
    assert_eq!(rig.link.connects, 1);
    rig.tick(4_999);
    assert_eq!(rig.link.connects, 1);
    rig.tick(1);
    assert_eq!(rig.link.connects, 2);
    rig.tick(5_000);
    assert_eq!(rig.link.connects, 3);

    assert!(rig.link.published.is_empty());
    assert!(rig
        .sink
        .events
        .contains(&PropEvent::LinkRetry(CommsError::ConnectFailed)));
}

#[test]
fn changes_made_offline_are_reported_after_reconnect() {
    let mut rig = Rig::offline();
    rig.link.fail_connect = true;
    rig.tick(0);

    // Settings retained on the broker can still be applied from a local
    // replay while the session is down.
    rig.svc.handle_message(
        SETTINGS,
        r#"{"p":5,"v":"light1","a":["on","off"],"i":true}"#,
        &mut rig.link,
        &mut rig.io,
        &mut rig.sink,
    );
    rig.tick(1_000);
    assert!(rig.link.published.is_empty());

    rig.link.fail_connect = false;
    rig.tick(4_000);
    assert!(rig.svc.is_connected());
    assert_eq!(rig.link.payloads(), ["CONNECTED", "DATA light1=on"]);
}

#[test]
fn dropped_session_reconnects_immediately_then_backs_off() {
    let mut rig = Rig::connected();
    rig.tick(2_000);

    rig.link.up = false;
    rig.link.fail_connect = true;
    rig.tick(10);
    assert!(rig.sink.events.contains(&PropEvent::LinkDown));
    assert_eq!(rig.svc.supervisor().state(), LinkState::Down);

    let before = rig.link.connects;
    rig.tick(0);
    assert_eq!(rig.link.connects, before + 1);
    rig.tick(4_000);
    assert_eq!(rig.link.connects, before + 1);
    rig.tick(1_000);
    assert_eq!(rig.link.connects, before + 2);
}

#[test]
fn reconnect_repaints_full_state() {
    let mut rig = Rig::connected();
    rig.add(r#"{"p":5,"v":"light1"}"#);
    rig.add(r#"{"p":6,"v":"light2"}"#);
    rig.tick(1_000);
    rig.link.clear();

    rig.link.up = false;
    rig.tick(10);
    rig.tick(10);
    assert_eq!(
        rig.link.payloads(),
        ["CONNECTED", "DATA light1=0 light2=0"]
    );
}

/// Rig whose clock starts 500 ms before the `u32` wrap.
fn near_wrap() -> Rig {
    let mut rig = Rig::offline();
    rig.now = u32::MAX - 499;
    rig.svc = PropService::new(&test_config(), "relayprop-test", rig.now);
    rig
}

#[test]
fn change_cadence_survives_clock_wrap() {
    let mut rig = near_wrap();
    rig.tick(0);
    rig.add(r#"{"p":5,"v":"light1"}"#);
    rig.link.clear();

    rig.tick(999);
    assert_eq!(rig.now, 499);
    assert!(rig.link.published.is_empty());
    rig.tick(1);
    assert_eq!(rig.link.payloads(), ["DATA light1=0"]);
}

#[test]
fn retry_cadence_survives_clock_wrap() {
    let mut rig = near_wrap();
    rig.link.fail_connect = true;
    rig.tick(0);
    assert_eq!(rig.link.connects, 1);

    rig.tick(4_999);
    assert_eq!(rig.link.connects, 1);
    rig.tick(1);
    assert_eq!(rig.link.connects, 2);
}
