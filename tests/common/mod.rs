//! Shared test infrastructure: an in-process loopback SNMP agent.
//!
//! The agent binds an ephemeral UDP port on localhost and answers
//! GET/GETNEXT/GETBULK/SET from a sorted OID map, using the crate's own
//! codec. It shuts down when dropped.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use snmpt::message::CommunityMessage;
use snmpt::pdu::{Pdu, PduType};
use snmpt::version::Version;
use snmpt::{Oid, Value, VarBind, oid};

type Mib = Arc<Mutex<BTreeMap<Oid, Value>>>;

/// In-process SNMP agent for integration tests.
pub struct TestAgent {
    addr: SocketAddr,
    mib: Mib,
    task: JoinHandle<()>,
}

impl TestAgent {
    /// Start an agent with the default system MIB data.
    pub async fn new() -> Self {
        Self::with_data(system_mib()).await
    }

    /// Start an agent with custom MIB data.
    pub async fn with_data(data: BTreeMap<Oid, Value>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind test agent socket");
        let addr = socket.local_addr().expect("test agent local addr");
        let mib: Mib = Arc::new(Mutex::new(data));

        let task = tokio::spawn(serve(socket, mib.clone()));

        Self { addr, mib, task }
    }

    /// The agent's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Insert or update a value in the MIB.
    pub fn set(&self, oid: Oid, value: Value) {
        self.mib.lock().unwrap().insert(oid, value);
    }

    /// Get a value from the MIB (cloned).
    pub fn get(&self, oid: &Oid) -> Option<Value> {
        self.mib.lock().unwrap().get(oid).cloned()
    }

    /// Stop answering; datagrams are silently dropped afterwards.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: UdpSocket, mib: Mib) {
    let mut buf = vec![0u8; 65535];
    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            return;
        };
        let Ok(request) = CommunityMessage::decode(Bytes::copy_from_slice(&buf[..len])) else {
            continue;
        };

        let response = handle(&request, &mib);
        let _ = socket.send_to(&response.encode(), peer).await;
    }
}

fn handle(request: &CommunityMessage, mib: &Mib) -> CommunityMessage {
    let mut mib = mib.lock().unwrap();
    let pdu = &request.pdu;

    let response = match pdu.pdu_type {
        PduType::GetRequest => handle_get(request.version, pdu, &mib),
        PduType::GetNextRequest => {
            let varbinds = pdu
                .varbinds
                .iter()
                .map(|vb| next_binding(&mib, &vb.oid))
                .collect();
            Pdu::response(pdu.request_id, varbinds)
        }
        PduType::GetBulkRequest => handle_bulk(pdu, &mib),
        PduType::SetRequest => {
            // Accept everything; a real agent would check writability
            for vb in &pdu.varbinds {
                mib.insert(vb.oid.clone(), vb.value.clone());
            }
            Pdu::response(pdu.request_id, pdu.varbinds.clone())
        }
        PduType::Response => Pdu::response(pdu.request_id, Vec::new()),
    };

    CommunityMessage::new(request.version, request.community.clone(), response)
}

fn handle_get(
    version: Version,
    pdu: &Pdu,
    mib: &BTreeMap<Oid, Value>,
) -> Pdu {
    // v1 agents answer a missing object with a noSuchName error; v2c agents
    // return the noSuchObject exception value in the binding.
    for (i, vb) in pdu.varbinds.iter().enumerate() {
        if version == Version::V1 && !mib.contains_key(&vb.oid) {
            let mut response = Pdu::response(pdu.request_id, pdu.varbinds.clone());
            response.error_status = 2; // noSuchName
            response.error_index = (i + 1) as i32;
            return response;
        }
    }

    let varbinds = pdu
        .varbinds
        .iter()
        .map(|vb| match mib.get(&vb.oid) {
            Some(value) => VarBind::new(vb.oid.clone(), value.clone()),
            None => VarBind::new(vb.oid.clone(), Value::NoSuchObject),
        })
        .collect();
    Pdu::response(pdu.request_id, varbinds)
}

fn handle_bulk(pdu: &Pdu, mib: &BTreeMap<Oid, Value>) -> Pdu {
    // error-status/error-index carry non-repeaters/max-repetitions
    let non_repeaters = pdu.error_status.max(0) as usize;
    let max_repetitions = pdu.error_index.max(0) as usize;

    let mut varbinds = Vec::new();
    for (i, vb) in pdu.varbinds.iter().enumerate() {
        if i < non_repeaters {
            varbinds.push(next_binding(mib, &vb.oid));
            continue;
        }

        let mut cursor = vb.oid.clone();
        for _ in 0..max_repetitions {
            let next = next_binding(mib, &cursor);
            cursor = next.oid.clone();
            let ended = matches!(next.value, Value::EndOfMibView);
            varbinds.push(next);
            if ended {
                break;
            }
        }
    }

    Pdu::response(pdu.request_id, varbinds)
}

/// The binding lexicographically after `oid`, or endOfMibView.
fn next_binding(mib: &BTreeMap<Oid, Value>, oid: &Oid) -> VarBind {
    match mib
        .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
        .next()
    {
        Some((next_oid, value)) => VarBind::new(next_oid.clone(), value.clone()),
        None => VarBind::new(oid.clone(), Value::EndOfMibView),
    }
}

/// Default MIB data: a small system subtree plus one interfaces scalar.
pub fn system_mib() -> BTreeMap<Oid, Value> {
    let mut mib = BTreeMap::new();
    mib.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Test agent"));
    mib.insert(
        oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
        Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 1)),
    );
    mib.insert(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(123456));
    mib.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("agent1"));
    mib.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2));
    mib
}

/// Root of the system subtree.
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}
