//! UDP transport implementation.

use super::Transport;
use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// UDP transport owning one connected socket to one agent.
///
/// Creating the transport binds and connects the socket but exchanges no
/// datagrams; the first request opens the wire exchange.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral socket and connect it to the target address.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        tracing::debug!(target: "snmpt::transport", agent = %target, "connecting UDP transport");

        let socket = bind_ephemeral_udp_socket(target).map_err(|e| Error::Io {
            target: Some(target),
            source: e,
        })?;

        socket.connect(target).await.map_err(|e| Error::Io {
            target: Some(target),
            source: e,
        })?;

        Ok(Self {
            inner: Arc::new(UdpTransportInner { socket, target }),
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "snmpt::transport",
            agent = %self.inner.target,
            bytes = data.len(),
            "UDP send"
        );
        self.inner.socket.send(data).await.map_err(|e| Error::Io {
            target: Some(self.inner.target),
            source: e,
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, wait: Duration) -> Result<Bytes> {
        let mut buf = vec![0u8; 65535];

        match timeout(wait, self.inner.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "snmpt::transport",
                    agent = %self.inner.target,
                    bytes = len,
                    "UDP recv"
                );
                Ok(Bytes::from(buf))
            }
            Ok(Err(e)) => Err(Error::Io {
                target: Some(self.inner.target),
                source: e,
            }),
            Err(_) => {
                tracing::trace!(
                    target: "snmpt::transport",
                    agent = %self.inner.target,
                    request_id,
                    wait_ms = wait.as_millis() as u64,
                    "UDP recv window expired"
                );
                Err(Error::Timeout {
                    target: self.inner.target,
                    elapsed: wait,
                    request_id,
                    retries: 0,
                })
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }
}
