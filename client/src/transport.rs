//! A bound UDP endpoint multiplexing many in-flight SNMP PDUs by
//! `request-id`, with source-address validation and RAII-adjacent shutdown.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use snmp2c_core::ber;
use tokio::net::UdpSocket;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// RFC 1905's implicit ceiling: the largest UDP payload this library will
/// send or attempt to receive.
pub const MAX_DATAGRAM_SIZE: usize = 65507;

struct Pending {
    sender: oneshot::Sender<Vec<u8>>,
}

/// Owns one UDP socket on behalf of a single `Snmp` session (or trap
/// listener). A background task drives the receive loop and dispatches
/// inbound datagrams to whichever waiter registered the matching
/// `request-id`; datagrams with no match, or from an unexpected source
/// address, are dropped.
pub(crate) struct Transport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    pending: Arc<Mutex<HashMap<i32, Pending>>>,
    recv_task: JoinHandle<()>,
}

impl Transport {
    pub async fn bind(peer: SocketAddr, validate_source_addr: bool) -> Result<Transport> {
        let local_addr = if peer.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(local_addr).await?;
        let socket = Arc::new(socket);
        let pending: Arc<Mutex<HashMap<i32, Pending>>> = Arc::new(Mutex::new(HashMap::new()));

        let recv_socket = socket.clone();
        let recv_pending = pending.clone();
        let recv_task = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            loop {
                let (n, from) = match recv_socket.recv_from(&mut buf).await {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(%err, "udp transport recv error, stopping receive loop");
                        break;
                    }
                };
                if validate_source_addr && from != peer {
                    tracing::warn!(%from, expected = %peer, "dropping datagram from unexpected source address");
                    continue;
                }
                let datagram = buf[..n].to_vec();
                let request_id = match peek_request_id(&datagram) {
                    Some(id) => id,
                    None => {
                        tracing::warn!(%from, "dropping malformed datagram: could not read request-id");
                        continue;
                    }
                };
                let sender = {
                    let mut pending = recv_pending.lock().await;
                    pending.remove(&request_id)
                };
                match sender {
                    Some(entry) => {
                        let _ = entry.sender.send(datagram);
                    }
                    None => tracing::debug!(request_id, "dropping datagram with no matching pending request"),
                }
            }
        });

        tracing::info!(%peer, "udp transport bound");
        Ok(Transport {
            socket,
            peer,
            pending,
            recv_task,
        })
    }

    /// Register a waiter for `request_id`. Returns a one-shot receiver that
    /// resolves with the raw reply datagram when the receive loop matches
    /// it, or with a `RecvError` if `close()` drops it first.
    pub async fn register(&self, request_id: i32) -> oneshot::Receiver<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().await;
        pending.insert(request_id, Pending { sender: tx });
        rx
    }

    /// Remove a waiter without a reply (timeout/cancellation path).
    pub async fn deregister(&self, request_id: i32) {
        let mut pending = self.pending.lock().await;
        pending.remove(&request_id);
    }

    pub async fn send(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(Error::MessageTooLarge {
                size: bytes.len(),
                limit: MAX_DATAGRAM_SIZE,
            });
        }
        self.socket.send_to(bytes, self.peer).await?;
        Ok(())
    }

    /// Cancel all outstanding waiters and stop the receive loop. Idempotent.
    pub async fn close(&self) {
        self.recv_task.abort();
        let mut pending = self.pending.lock().await;
        pending.clear();
        tracing::info!(peer = %self.peer, "udp transport closed");
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

/// Parse only as far as the `request-id` field of a PDU: outer SEQUENCE,
/// skip version, skip community, enter the PDU, read its first INTEGER.
/// Deliberately does not touch the variable-bindings list, so an unknown
/// value tag deep in the varbinds can never prevent dispatch.
fn peek_request_id(buf: &[u8]) -> Option<i32> {
    let outer = ber::parse_tlv(buf, 0).ok()?;
    let version_tlv = ber::parse_tlv(outer.content, 0).ok()?;
    let community_tlv = ber::parse_tlv(outer.content, version_tlv.next_offset).ok()?;
    let pdu_tlv = ber::parse_tlv(outer.content, community_tlv.next_offset).ok()?;
    let id_tlv = ber::parse_tlv(pdu_tlv.content, 0).ok()?;
    let id = ber::decode_integer(id_tlv.content, id_tlv.offset).ok()?;
    i32::try_from(id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snmp2c_core::{Message, Pdu, Varbind};

    #[test]
    fn peek_request_id_finds_the_right_field() {
        let msg = Message::new(
            "public",
            Pdu::GetRequest {
                request_id: 4242,
                varbinds: vec![Varbind::placeholder("1.3.6.1.2.1.1.1.0".parse().unwrap())],
            },
        );
        let encoded = msg.encode();
        assert_eq!(peek_request_id(&encoded), Some(4242));
    }

    #[test]
    fn peek_request_id_does_not_require_a_well_formed_varbind_list() {
        // A full Message::decode would reject the trailing garbage below;
        // peek_request_id never walks that far and must still succeed.
        let msg = Message::new(
            "public",
            Pdu::GetResponse {
                request_id: 77,
                error_status: 0,
                error_index: 0,
                varbinds: vec![],
            },
        );
        let mut encoded = msg.encode();
        encoded.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(peek_request_id(&encoded), Some(77));
    }
}
