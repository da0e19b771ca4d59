//! `Snmp`: the per-agent session, retry/timeout loop, and error-status
//! mapping.

use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use snmp2c_core::{Message, Oid, Pdu, Varbind};
use tokio::sync::Mutex;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::reqid;
use crate::transport::Transport;
use crate::walk::{BulkWalk, Walk};

enum State {
    Idle,
    Open(Arc<Transport>),
    Closed,
}

/// A logical session against one SNMPv2c agent. Holds the peer address,
/// community, and retry/timeout defaults; the UDP transport is bound
/// lazily on first use (or via `open()`), and torn down by `close()`.
pub struct Snmp {
    config: SessionConfig,
    peer: SocketAddr,
    state: Mutex<State>,
}

impl Snmp {
    pub fn new(config: SessionConfig) -> Result<Snmp> {
        let peer = resolve_peer(&config.host, config.port)?;
        Ok(Snmp {
            config,
            peer,
            state: Mutex::new(State::Idle),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Bind the transport now. Idempotent: a no-op if already open, an
    /// error if the session was already closed.
    pub async fn open(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match &*state {
            State::Open(_) => Ok(()),
            State::Closed => Err(Error::Closed),
            State::Idle => {
                let transport = Transport::bind(self.peer, self.config.validate_source_addr).await?;
                *state = State::Open(Arc::new(transport));
                Ok(())
            }
        }
    }

    /// Close the session: cancels all outstanding waiters with `Closed`
    /// and stops the receive loop. Idempotent.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if let State::Open(transport) = std::mem::replace(&mut *state, State::Closed) {
            transport.close().await;
        }
    }

    /// Run `f` against a freshly opened session, guaranteeing `close()`
    /// runs on every exit path including an error returned by `f`.
    pub async fn scoped<F, Fut, T>(config: SessionConfig, f: F) -> Result<T>
    where
        F: FnOnce(Arc<Snmp>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = Arc::new(Snmp::new(config)?);
        session.open().await?;
        let result = f(session.clone()).await;
        session.close().await;
        result
    }

    async fn transport(&self) -> Result<Arc<Transport>> {
        {
            let state = self.state.lock().await;
            match &*state {
                State::Open(t) => return Ok(t.clone()),
                State::Closed => return Err(Error::Closed),
                State::Idle => {}
            }
        }
        self.open().await?;
        let state = self.state.lock().await;
        match &*state {
            State::Open(t) => Ok(t.clone()),
            State::Closed => Err(Error::Closed),
            State::Idle => unreachable!("open() always leaves Idle for Open or an error"),
        }
    }

    /// Encode `pdu` once, then send/await/retry it up to `retries + 1`
    /// times against the same request-id and encoded bytes.
    async fn dispatch(&self, pdu: Pdu) -> Result<Pdu> {
        let transport = self.transport().await?;
        let request_id = pdu.request_id();
        let message = Message::new(self.config.community.clone(), pdu);
        let encoded = message.encode();
        if encoded.len() > crate::transport::MAX_DATAGRAM_SIZE {
            return Err(Error::MessageTooLarge {
                size: encoded.len(),
                limit: crate::transport::MAX_DATAGRAM_SIZE,
            });
        }

        let mut attempt: u32 = 0;
        loop {
            let rx = transport.register(request_id).await;
            transport.send(&encoded).await?;
            tracing::debug!(request_id, attempt, peer = %self.peer, "sent request, awaiting reply");

            match tokio::time::timeout(self.config.timeout, rx).await {
                Ok(Ok(bytes)) => {
                    let reply = Message::decode(&bytes)?;
                    return Ok(reply.pdu);
                }
                Ok(Err(_)) => {
                    // The waiter's sender was dropped without a value: the
                    // session was closed while we were awaiting.
                    return Err(Error::Closed);
                }
                Err(_elapsed) => {
                    transport.deregister(request_id).await;
                    attempt += 1;
                    if attempt > self.config.retries {
                        tracing::debug!(request_id, attempt, "request timed out, retries exhausted");
                        return Err(Error::Timeout { attempts: attempt });
                    }
                    tracing::debug!(request_id, attempt, "request timed out, retrying");
                }
            }
        }
    }

    fn finish(pdu: Pdu) -> Result<Vec<Varbind>> {
        if let Pdu::GetResponse {
            error_status,
            error_index,
            varbinds,
            ..
        } = &pdu
        {
            if let Some(err) = snmp2c_core::Error::agent_error(*error_status, *error_index) {
                return Err(err.into());
            }
            return Ok(varbinds.clone());
        }
        Ok(pdu.varbinds().to_vec())
    }

    pub async fn get(&self, oids: &[Oid]) -> Result<Vec<Varbind>> {
        let varbinds: Vec<Varbind> = oids.iter().cloned().map(Varbind::placeholder).collect();
        let pdu = Pdu::GetRequest {
            request_id: reqid::next_request_id(),
            varbinds,
        };
        let reply = self.dispatch(pdu).await?;
        Self::finish(reply)
    }

    pub async fn get_next(&self, oids: &[Oid]) -> Result<Vec<Varbind>> {
        let varbinds: Vec<Varbind> = oids.iter().cloned().map(Varbind::placeholder).collect();
        let pdu = Pdu::GetNextRequest {
            request_id: reqid::next_request_id(),
            varbinds,
        };
        let reply = self.dispatch(pdu).await?;
        Self::finish(reply)
    }

    pub async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: u32,
        max_repetitions: u32,
    ) -> Result<Vec<Varbind>> {
        let varbinds: Vec<Varbind> = oids.iter().cloned().map(Varbind::placeholder).collect();
        let pdu = Pdu::GetBulkRequest {
            request_id: reqid::next_request_id(),
            non_repeaters: non_repeaters as i32,
            max_repetitions: max_repetitions as i32,
            varbinds,
        };
        let reply = self.dispatch(pdu).await?;
        Self::finish(reply)
    }

    pub async fn set(&self, varbinds: &[Varbind]) -> Result<Vec<Varbind>> {
        let pdu = Pdu::SetRequest {
            request_id: reqid::next_request_id(),
            varbinds: varbinds.to_vec(),
        };
        let reply = self.dispatch(pdu).await?;
        Self::finish(reply)
    }

    /// `GetNext`-based traversal of the subtree rooted at `root`. See
    /// [`Walk`] for the termination rules.
    pub fn walk(&self, root: Oid) -> Walk<'_> {
        Walk::new(self, root)
    }

    /// `GetBulk`-based traversal of the subtree rooted at `root`, using
    /// this session's configured `max_repetitions`. See [`BulkWalk`].
    pub fn bulk_walk(&self, root: Oid) -> BulkWalk<'_> {
        BulkWalk::new(self, root, self.config.max_repetitions)
    }

    pub(crate) fn strict_walk(&self) -> bool {
        self.config.strict
    }
}

fn resolve_peer(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::ResolveFailed {
            host: host.to_string(),
            port,
        })?
        .next()
        .ok_or_else(|| Error::ResolveFailed {
            host: host.to_string(),
            port,
        })
}
