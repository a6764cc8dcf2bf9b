//! Transport layer abstraction.
//!
//! A transport owns one association to one remote agent and moves raw
//! datagrams. Correlation (request-id/version/community matching) and the
//! retransmit policy live in the session, so a stray datagram can be ignored
//! without disturbing the timeout window.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::UdpTransport;

#[cfg(any(test, feature = "testing"))]
pub use mock::{MockResponse, MockTransport, RecordedRequest, ResponseBuilder};

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side transport abstraction.
///
/// # Clone Requirement
///
/// Implementations are `Arc`-backed, making clone a reference-count bump.
pub trait Transport: Send + Sync + Clone {
    /// Send one request datagram to the agent.
    ///
    /// I/O failures surface immediately; they never consume a retry.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait up to `wait` for one datagram from the agent.
    ///
    /// `request_id` is the id of the outstanding request, used for error
    /// context only - the returned datagram is NOT guaranteed to correlate
    /// with it; the caller decodes and matches.
    fn recv(
        &self,
        request_id: i32,
        wait: Duration,
    ) -> impl Future<Output = Result<Bytes>> + Send;

    /// The agent address this transport is bound to.
    fn peer_addr(&self) -> SocketAddr;
}
