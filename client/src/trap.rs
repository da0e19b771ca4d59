//! Passive SNMPv2 trap reception: a standalone bound UDP receiver handing
//! decoded `SNMPv2-Trap` PDUs to a user callback.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use snmp2c_core::{Message, Pdu, Varbind};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use crate::config::TrapListenerConfig;
use crate::error::Result;
use crate::transport::MAX_DATAGRAM_SIZE;

/// A decoded, accepted SNMPv2-Trap notification.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapMessage {
    pub version: i64,
    pub community: Vec<u8>,
    pub varbinds: Vec<Varbind>,
}

/// A bound UDP receiver for unsolicited `SNMPv2-Trap` PDUs. Malformed
/// datagrams, datagrams carrying any other PDU type, and (if a community
/// allow-list is configured) datagrams with an unrecognized community are
/// dropped silently; `dropped_count()` exposes how many.
pub struct TrapListener {
    local_addr: SocketAddr,
    recv_task: JoinHandle<()>,
    dropped: Arc<AtomicU64>,
}

impl TrapListener {
    pub async fn bind<F, Fut>(config: TrapListenerConfig, handler: F) -> Result<TrapListener>
    where
        F: Fn(TrapMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let socket = UdpSocket::bind(&bind_addr).await?;
        let local_addr = socket.local_addr()?;
        let socket = Arc::new(socket);
        let communities: Option<HashSet<Vec<u8>>> = config
            .communities
            .map(|set| set.into_iter().map(String::into_bytes).collect());
        let dropped = Arc::new(AtomicU64::new(0));
        let handler = Arc::new(handler);

        let recv_socket = socket.clone();
        let recv_dropped = dropped.clone();
        let recv_task = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            loop {
                let (n, from) = match recv_socket.recv_from(&mut buf).await {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(%err, "trap listener recv error, stopping receive loop");
                        break;
                    }
                };
                match decode_trap(&buf[..n], &communities) {
                    Ok(trap) => {
                        tracing::debug!(%from, community = %String::from_utf8_lossy(&trap.community), "accepted trap");
                        let handler = handler.clone();
                        tokio::spawn(async move { handler(trap).await });
                    }
                    Err(reason) => {
                        recv_dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(%from, %reason, "dropping trap datagram");
                    }
                }
            }
        });

        tracing::info!(%local_addr, "trap listener bound");
        Ok(TrapListener {
            local_addr,
            recv_task,
            dropped,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Count of datagrams dropped (malformed, wrong PDU type, or filtered
    /// by community) since this listener was bound.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop the receive loop. Idempotent; also runs on `Drop`.
    pub async fn close(self) {
        self.recv_task.abort();
    }
}

impl Drop for TrapListener {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

fn decode_trap(buf: &[u8], communities: &Option<HashSet<Vec<u8>>>) -> std::result::Result<TrapMessage, String> {
    let msg = Message::decode(buf).map_err(|e| e.to_string())?;
    let varbinds = match msg.pdu {
        Pdu::Trap { varbinds, .. } => varbinds,
        other => return Err(format!("expected an SNMPv2-Trap PDU, got {other:?}")),
    };
    if let Some(allowed) = communities {
        if !allowed.contains(&msg.community) {
            return Err("community not in allow-list".to_string());
        }
    }
    Ok(TrapMessage {
        version: msg.version,
        community: msg.community,
        varbinds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use snmp2c_core::SmiValue;

    #[test]
    fn decode_trap_accepts_well_formed_trap_pdu() {
        let msg = Message::new(
            "public",
            Pdu::Trap {
                request_id: 0,
                varbinds: vec![Varbind::new(
                    "1.3.6.1.6.3.1.1.4.1.0".parse().unwrap(),
                    SmiValue::ObjectIdentifier("1.3.6.1.4.1.8072.2.3.0.1".parse().unwrap()),
                )],
            },
        );
        let encoded = msg.encode();
        let trap = decode_trap(&encoded, &None).unwrap();
        assert_eq!(trap.community, b"public");
        assert_eq!(trap.varbinds.len(), 1);
    }

    #[test]
    fn decode_trap_rejects_non_trap_pdu() {
        let msg = Message::new("public", Pdu::GetRequest { request_id: 1, varbinds: vec![] });
        let encoded = msg.encode();
        assert!(decode_trap(&encoded, &None).is_err());
    }

    #[test]
    fn decode_trap_filters_by_community() {
        let msg = Message::new("private", Pdu::Trap { request_id: 0, varbinds: vec![] });
        let encoded = msg.encode();
        let mut allowed = HashSet::new();
        allowed.insert(b"public".to_vec());
        assert!(decode_trap(&encoded, &Some(allowed)).is_err());
    }
}
