//! Host and observers talking over encoded frames.
//!
//! Client commands travel as JSON text, snapshots as binary frames; the
//! observers only ever see decoded frames.

use seelines_core::host::{Host, Observer};
use seelines_core::id::UnitId;
use seelines_core::order::{Order, OrderType};
use seelines_core::protocol::{
    decode_binary, decode_json, encode_binary, encode_json, ClientMessage, CommandEntry,
    ServerMessage,
};
use seelines_data::load_skirmish;

fn host() -> Host {
    load_skirmish().unwrap().build_host().unwrap()
}

/// Encode on the client side, decode on the host side.
fn send(host: &mut Host, text: &str) {
    let message: ClientMessage = decode_json(text).unwrap();
    host.receive(message);
}

/// Encode on the host side, decode on the observer side.
fn frame(message: &ServerMessage) -> ServerMessage {
    decode_binary(&encode_binary(message)).unwrap()
}

#[test]
fn json_command_reaches_the_units() {
    let mut host = host();
    send(
        &mut host,
        r#"{"type":"command","payload":[
            {"unitIds":[1,2],"order":{"id":"sweep","type":"patrol","target":{"kind":"point","x":10,"y":14}}},
            {"unitIds":[3],"order":{"id":"guard","type":"escort","target":{"kind":"unit","unitId":1}},"append":false}
        ]}"#,
    );

    let snapshot = frame(&host.tick()).snapshot().clone();
    let find = |id: u32| snapshot.units.iter().find(|u| u.id == UnitId(id)).unwrap();
    assert_eq!(find(1).orders[0].order_type, OrderType::Patrol);
    assert_eq!(find(2).orders[0].id.0, "sweep");
    assert_eq!(find(3).orders[0].order_type, OrderType::Escort);
    assert!(find(1).orders[0].metadata.is_some());
    assert!(find(4).orders.is_empty());
}

#[test]
fn client_message_survives_both_codecs() {
    let message = ClientMessage::Command {
        payload: vec![CommandEntry {
            unit_ids: vec![UnitId(4), UnitId(5)],
            order: Order::move_to("raid", 6.0, 13.0),
            append: true,
        }],
    };
    let text = encode_json(&message).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["type"], "command");
    assert_eq!(value["payload"][0]["unitIds"], serde_json::json!([4, 5]));

    assert_eq!(decode_json::<ClientMessage>(&text).unwrap(), message);
    assert_eq!(
        decode_binary::<ClientMessage>(&encode_binary(&message)).unwrap(),
        message
    );
}

#[test]
fn observers_follow_the_host_and_ignore_late_frames() {
    let mut host = host();
    let mut early = Observer::new();
    let mut late = Observer::new();
    assert!(early.apply(&frame(&host.welcome(1))));

    send(
        &mut host,
        r#"{"type":"command","payload":[{"unitIds":[1],"order":{"id":"m","type":"move","target":{"kind":"point","x":6,"y":14}}}]}"#,
    );
    let frames: Vec<ServerMessage> = (0..20).map(|_| frame(&host.tick())).collect();

    for message in &frames {
        assert!(early.apply(message));
    }
    assert!(late.apply(&frame(&host.welcome(2))));
    assert_eq!(late.client_id(), Some(2));

    // A delayed frame from before the late observer joined.
    assert!(!late.apply(&frames[3]));
    assert!(!early.apply(&frames[10]));

    assert_eq!(early.tick(), late.tick());
    for unit in early.units() {
        assert_eq!(late.unit(unit.id), Some(unit));
    }
    let moved = early.unit(UnitId(1)).unwrap();
    assert!(moved.position.x > 3.5);
}

#[test]
fn despawned_units_vanish_from_the_projection() {
    let mut host = host();
    let mut observer = Observer::new();
    observer.apply(&frame(&host.welcome(1)));
    assert_eq!(observer.units().count(), 5);

    host.engine_mut().despawn_unit(UnitId(4));
    observer.apply(&frame(&host.tick()));
    assert_eq!(observer.units().count(), 4);
    assert!(observer.unit(UnitId(4)).is_none());
}
