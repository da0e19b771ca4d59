//! End-to-end trap listener tests over loopback UDP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use snmp2c_client::{TrapListenerConfig, TrapListener, TrapMessage};
use snmp2c_core::{Message, Pdu, SmiValue, Varbind};
use tokio::net::UdpSocket;

#[tokio::test]
async fn trap_listener_decodes_and_delivers_traps() {
    let received: Arc<Mutex<Vec<TrapMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let received_handler = received.clone();

    let listener = TrapListener::bind(
        TrapListenerConfig::new().host("127.0.0.1").port(0),
        move |trap: TrapMessage| {
            let received_handler = received_handler.clone();
            async move {
                received_handler.lock().unwrap().push(trap);
            }
        },
    )
    .await
    .unwrap();
    let addr = listener.local_addr();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let trap = Message::new(
        "public",
        Pdu::Trap {
            request_id: 0,
            varbinds: vec![Varbind::new(
                "1.3.6.1.6.3.1.1.4.1.0".parse().unwrap(),
                SmiValue::ObjectIdentifier("1.3.6.1.4.1.8072.2.3.0.1".parse().unwrap()),
            )],
        },
    );
    sender.send_to(&trap.encode(), addr).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let traps = received.lock().unwrap();
    assert_eq!(traps.len(), 1);
    assert_eq!(traps[0].community, b"public");
    assert_eq!(traps[0].varbinds.len(), 1);
}

#[tokio::test]
async fn trap_listener_drops_disallowed_communities() {
    let received: Arc<Mutex<Vec<TrapMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let received_handler = received.clone();

    let listener = TrapListener::bind(
        TrapListenerConfig::new()
            .host("127.0.0.1")
            .port(0)
            .communities(["public".to_string()]),
        move |trap: TrapMessage| {
            let received_handler = received_handler.clone();
            async move {
                received_handler.lock().unwrap().push(trap);
            }
        },
    )
    .await
    .unwrap();
    let addr = listener.local_addr();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let trap = Message::new("rogue-community", Pdu::Trap { request_id: 0, varbinds: vec![] });
    sender.send_to(&trap.encode(), addr).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(received.lock().unwrap().len(), 0);
    assert_eq!(listener.dropped_count(), 1);
}

#[tokio::test]
async fn trap_listener_drops_non_trap_pdus() {
    let listener = TrapListener::bind(TrapListenerConfig::new().host("127.0.0.1").port(0), |_: TrapMessage| async {})
        .await
        .unwrap();
    let addr = listener.local_addr();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let not_a_trap = Message::new("public", Pdu::GetRequest { request_id: 1, varbinds: vec![] });
    sender.send_to(&not_a_trap.encode(), addr).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(listener.dropped_count(), 1);
}
