//! SNMP client session.
//!
//! A `Session` is bound to one agent and issues strictly sequential
//! request/response exchanges over its transport: GET, SET, WALK and
//! BULK-WALK. One outstanding request at a time; the request-id counter is
//! not designed for concurrent multiplexing, so a session must not be shared
//! across tasks without external synchronization. Independent sessions are
//! fully independent.

mod walk;

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::transport::{Transport, UdpTransport};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Standard SNMP agent port.
pub const SNMP_PORT: u16 = 161;

/// Session configuration.
///
/// Constructed once by the caller and passed to session creation; the engine
/// keeps no process-global state.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// SNMP version (default: V2c)
    pub version: Version,
    /// Community string (default: "public")
    pub community: Bytes,
    /// Per-request timeout (default: 3 seconds)
    pub timeout: Duration,
    /// Retransmission bound per request, and max-repetitions for GETBULK
    /// (default: 5)
    pub repeats: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(3),
            repeats: 5,
        }
    }
}

/// SNMP client session bound to one agent.
pub struct Session<T: Transport = UdpTransport> {
    transport: T,
    config: SessionConfig,
    request_id: AtomicI32,
}

impl Session<UdpTransport> {
    /// Create a session for the given agent.
    ///
    /// `agent` is a host or `host:port` string; the standard port 161 is
    /// assumed when none is given. Resolving the address and binding the
    /// socket exchanges no datagrams - the first request opens the wire
    /// exchange.
    pub async fn connect(agent: &str, config: SessionConfig) -> Result<Self> {
        let addr = resolve_agent_addr(agent)?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Session<T> {
    /// Create a session over a pre-built transport.
    pub fn with_transport(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            request_id: AtomicI32::new(1),
        }
    }

    /// The agent address this session talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.transport.peer_addr()
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn next_request_id(&self) -> i32 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// GET a single OID.
    ///
    /// A response with non-zero error-status surfaces as [`Error::Agent`]
    /// identifying the rejected varbind index.
    pub async fn get(&self, oid: &Oid) -> Result<VarBind> {
        let pdu = Pdu::get_request(self.next_request_id(), oid.clone());
        let response = self.request(pdu).await?;
        first_varbind(response)
    }

    /// GETNEXT for a single OID: the first varbind lexicographically after
    /// it in the agent's tree.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        let pdu = Pdu::get_next_request(self.next_request_id(), oid.clone());
        let response = self.request(pdu).await?;
        first_varbind(response)
    }

    /// GETBULK seeded at a single OID (SNMPv2c only).
    ///
    /// Returns up to `max_repetitions` varbinds following the seed.
    pub async fn get_bulk(
        &self,
        oid: &Oid,
        non_repeaters: i32,
        max_repetitions: i32,
    ) -> Result<Vec<VarBind>> {
        if self.config.version == Version::V1 {
            return Err(Error::config("GETBULK requires SNMPv2c"));
        }
        let pdu = Pdu::get_bulk(
            self.next_request_id(),
            non_repeaters,
            max_repetitions,
            oid.clone(),
        );
        let response = self.request(pdu).await?;
        Ok(response.varbinds)
    }

    /// SET a single OID.
    ///
    /// `type_tag` selects how `value` is interpreted: `"Integer"` (decimal
    /// string) or `"OctetString"` (raw bytes of the string). Any other tag
    /// fails with [`Error::UnsupportedSetType`] before anything is encoded
    /// or sent.
    pub async fn set(&self, oid: &Oid, type_tag: &str, value: &str) -> Result<VarBind> {
        let value = match type_tag {
            "Integer" => {
                let v: i64 = value.parse().map_err(|_| {
                    Error::config(format!("set value {:?} is not an integer", value))
                })?;
                Value::Integer(v)
            }
            "OctetString" => Value::OctetString(Bytes::copy_from_slice(value.as_bytes())),
            other => {
                return Err(Error::UnsupportedSetType {
                    type_tag: other.into(),
                });
            }
        };

        let pdu = Pdu::set_request(self.next_request_id(), oid.clone(), value);
        let response = self.request(pdu).await?;
        first_varbind(response)
    }

    /// One full request/response exchange with retransmission.
    ///
    /// Encodes the message once, then for each attempt sends the identical
    /// datagram and waits out the timeout window. Datagrams that arrive but
    /// fail correlation (request-id, version or community mismatch) are
    /// discarded without disturbing the window; only its expiry triggers a
    /// retransmission. After `repeats` retransmissions the exchange fails
    /// with [`Error::Timeout`].
    async fn request(&self, pdu: Pdu) -> Result<Pdu> {
        let request_id = pdu.request_id;
        tracing::debug!(
            target: "snmpt::session",
            agent = %self.peer_addr(),
            pdu_type = %pdu.pdu_type,
            request_id,
            "sending request"
        );

        let message = CommunityMessage::new(
            self.config.version,
            self.config.community.clone(),
            pdu,
        );
        let data = message.encode();

        let retries = self.config.repeats;
        let start = Instant::now();

        for attempt in 0..=retries {
            if attempt > 0 {
                tracing::debug!(
                    target: "snmpt::session",
                    agent = %self.peer_addr(),
                    request_id,
                    attempt,
                    "retransmitting request"
                );
            }

            self.transport.send(&data).await?;

            let deadline = Instant::now() + self.config.timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }

                match self.transport.recv(request_id, remaining).await {
                    Ok(datagram) => {
                        if let Some(pdu) = self.correlate(request_id, datagram)? {
                            return self.check_agent_error(pdu);
                        }
                        // Stray datagram; keep waiting within this window
                    }
                    Err(e) if e.is_timeout() => break,
                    Err(e) => return Err(e),
                }
            }
        }

        let elapsed = start.elapsed();
        tracing::debug!(
            target: "snmpt::session",
            agent = %self.peer_addr(),
            request_id,
            ?elapsed,
            retries,
            "request timed out"
        );
        Err(Error::Timeout {
            target: self.peer_addr(),
            elapsed,
            request_id,
            retries,
        })
    }

    /// Decode a received datagram and match it against the outstanding
    /// request.
    ///
    /// Returns `Ok(None)` for a decodable message that fails the request-id/
    /// version/community check or is not a Response - UDP may deliver stray
    /// or duplicate datagrams and they must not end the wait. A datagram
    /// that does not decode is a hard [`Error::Decode`].
    fn correlate(&self, request_id: i32, datagram: Bytes) -> Result<Option<Pdu>> {
        let msg = CommunityMessage::decode(datagram)?;

        if msg.version != self.config.version
            || msg.community != self.config.community
            || msg.pdu.request_id != request_id
            || msg.pdu.pdu_type != PduType::Response
        {
            tracing::debug!(
                target: "snmpt::session",
                agent = %self.peer_addr(),
                expected_request_id = request_id,
                actual_request_id = msg.pdu.request_id,
                version = %msg.version,
                pdu_type = %msg.pdu.pdu_type,
                "mismatched response ignored"
            );
            return Ok(None);
        }

        Ok(Some(msg.pdu))
    }

    /// Turn an agent-reported error status into a failure.
    fn check_agent_error(&self, pdu: Pdu) -> Result<Pdu> {
        if pdu.is_error() {
            let status = pdu.error_status_enum();
            tracing::debug!(
                target: "snmpt::session",
                agent = %self.peer_addr(),
                %status,
                index = pdu.error_index,
                "agent rejected request"
            );
            return Err(Error::Agent {
                target: self.peer_addr(),
                status,
                index: pdu.error_index.max(0) as u32,
            });
        }
        Ok(pdu)
    }
}

/// Extract the single varbind a GET/GETNEXT/SET response must carry.
fn first_varbind(pdu: Pdu) -> Result<VarBind> {
    pdu.varbinds.into_iter().next().ok_or_else(|| {
        Error::decode(0, crate::error::DecodeErrorKind::EmptyVarBindList)
    })
}

/// Resolve an agent address, defaulting to the standard SNMP port.
fn resolve_agent_addr(agent: &str) -> Result<SocketAddr> {
    if let Ok(addr) = agent.parse::<SocketAddr>() {
        return Ok(addr);
    }
    // Bare IP (including unbracketed IPv6) gets the standard port
    if let Ok(ip) = agent.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, SNMP_PORT));
    }

    let resolved = if agent.contains(':') {
        agent.to_socket_addrs()
    } else {
        (agent, SNMP_PORT).to_socket_addrs()
    };

    resolved
        .map_err(|e| Error::Io {
            target: None,
            source: e,
        })?
        .next()
        .ok_or_else(|| Error::config(format!("could not resolve agent address {:?}", agent)))
}
