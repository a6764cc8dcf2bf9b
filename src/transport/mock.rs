//! Mock transport for testing.
//!
//! A programmable transport that simulates agent behavior without a network
//! connection: queued responses, timeouts, I/O errors, request recording.

use super::Transport;
use crate::error::{Error, Result};
use crate::message::CommunityMessage;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A scripted reaction to a recv call.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this datagram (request_id is patched to match the last send)
    Data(Bytes),
    /// Return this datagram exactly as queued, no patching
    RawData(Bytes),
    /// Simulate an expired receive window
    Timeout,
    /// Simulate an I/O error
    IoError(String),
}

/// A recorded request sent through the mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// The raw request datagram
    pub data: Bytes,
    /// The request ID extracted from the message (if decodable)
    pub request_id: Option<i32>,
}

struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    last_request_id: Option<i32>,
}

/// Mock transport for exercising session behavior in tests.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
                last_request_id: None,
            })),
        }
    }

    /// Queue a datagram whose request_id will be patched to match the actual
    /// request. Use [`queue_raw_response`](Self::queue_raw_response) to
    /// bypass patching when testing correlation.
    pub fn queue_response(&self, data: impl Into<Bytes>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::Data(data.into()));
    }

    /// Queue a datagram returned exactly as provided.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    /// Queue an expired receive window.
    pub fn queue_timeout(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::Timeout);
    }

    /// Queue an I/O error.
    pub fn queue_io_error(&self, msg: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(MockResponse::IoError(msg.into()));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Number of datagrams sent through this transport.
    pub fn sent_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requests.len()
    }

    /// Extract the request ID from SNMP message bytes (best effort).
    fn extract_request_id(data: &[u8]) -> Option<i32> {
        CommunityMessage::decode(Bytes::copy_from_slice(data))
            .ok()
            .map(|msg| msg.pdu.request_id)
    }

    /// Rewrite the request_id in a queued response to match the request.
    fn patch_response_request_id(data: Bytes, new_id: i32) -> Bytes {
        match CommunityMessage::decode(data.clone()) {
            Ok(mut msg) => {
                msg.pdu.request_id = new_id;
                msg.encode()
            }
            Err(_) => data, // Not decodable, return as queued
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, data: &[u8]) -> impl std::future::Future<Output = Result<()>> + Send {
        let data = Bytes::copy_from_slice(data);
        let request_id = Self::extract_request_id(&data);

        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(RecordedRequest { data, request_id });
        inner.last_request_id = request_id;

        async { Ok(()) }
    }

    fn recv(
        &self,
        request_id: i32,
        wait: Duration,
    ) -> impl std::future::Future<Output = Result<Bytes>> + Send {
        let inner = self.inner.clone();

        async move {
            let (response, target, last_req_id) = {
                let mut guard = inner.lock().unwrap();
                (
                    guard.responses.pop_front(),
                    guard.target,
                    guard.last_request_id,
                )
            };

            match response {
                Some(MockResponse::Data(data)) => {
                    let patched = match last_req_id {
                        Some(req_id) => Self::patch_response_request_id(data, req_id),
                        None => data,
                    };
                    Ok(patched)
                }
                Some(MockResponse::RawData(data)) => Ok(data),
                Some(MockResponse::IoError(msg)) => Err(Error::Io {
                    target: Some(target),
                    source: std::io::Error::other(msg),
                }),
                // An empty queue behaves like an agent that never answers
                Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                    target,
                    elapsed: wait,
                    request_id,
                    retries: 0,
                }),
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        let inner = self.inner.lock().unwrap();
        inner.target
    }
}

/// Builder for response datagrams, so tests don't hand-craft BER.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<(crate::oid::Oid, crate::value::Value)>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    /// Create a new response builder with the given request ID.
    ///
    /// The id is a placeholder when the response is queued with
    /// [`MockTransport::queue_response`], which patches it to match the
    /// request actually sent.
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    /// Add a varbind to the response.
    pub fn varbind(mut self, oid: crate::oid::Oid, value: crate::value::Value) -> Self {
        self.varbinds.push((oid, value));
        self
    }

    /// Set the error status.
    pub fn error_status(mut self, status: i32) -> Self {
        self.error_status = status;
        self
    }

    /// Set the error index.
    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    /// Build the response message for a version and community.
    pub fn build(self, version: crate::version::Version, community: &[u8]) -> Bytes {
        use crate::pdu::Pdu;
        use crate::varbind::VarBind;

        let varbinds: Vec<VarBind> = self
            .varbinds
            .into_iter()
            .map(|(oid, value)| VarBind::new(oid, value))
            .collect();

        let mut pdu = Pdu::response(self.request_id, varbinds);
        pdu.error_status = self.error_status;
        pdu.error_index = self.error_index;

        CommunityMessage::new(version, Bytes::copy_from_slice(community), pdu).encode()
    }

    /// Build a v2c response message.
    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        self.build(crate::version::Version::V2c, community)
    }

    /// Build a v1 response message.
    pub fn build_v1(self, community: &[u8]) -> Bytes {
        self.build(crate::version::Version::V1, community)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use crate::{Version, oid};

    #[tokio::test]
    async fn test_mock_queue_and_recv() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        let response = ResponseBuilder::new(1)
            .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("test"))
            .build_v2c(b"public");

        mock.queue_raw_response(response.clone());

        mock.send(b"dummy request").await.unwrap();
        let data = mock.recv(1, Duration::from_secs(1)).await.unwrap();
        assert_eq!(data, response);
    }

    #[tokio::test]
    async fn test_mock_patches_request_id() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        // A real request with id 77, a queued response with placeholder id 1
        let request =
            CommunityMessage::new(Version::V2c, b"public".as_slice(), crate::pdu::Pdu::get_request(77, oid!(1, 3, 6, 1)))
                .encode();
        mock.queue_response(ResponseBuilder::new(1).build_v2c(b"public"));

        mock.send(&request).await.unwrap();
        let data = mock.recv(77, Duration::from_secs(1)).await.unwrap();

        let msg = CommunityMessage::decode(data).unwrap();
        assert_eq!(msg.pdu.request_id, 77);
    }

    #[tokio::test]
    async fn test_mock_empty_queue_times_out() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.send(b"request").await.unwrap();
        let result = mock.recv(1, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());

        mock.send(b"request 1").await.unwrap();
        mock.send(b"request 2").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].data.as_ref(), b"request 1");
        assert_eq!(requests[1].data.as_ref(), b"request 2");
    }
}
