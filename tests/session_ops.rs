//! GET/SET round-trips against the loopback agent.

mod common;

use common::TestAgent;
use snmpt::error::ErrorStatus;
use snmpt::{Error, Session, SessionConfig, Value, Version, oid};
use std::time::Duration;

fn test_config() -> SessionConfig {
    SessionConfig {
        timeout: Duration::from_millis(500),
        repeats: 1,
        ..Default::default()
    }
}

async fn connect(agent: &TestAgent, config: SessionConfig) -> Session {
    Session::connect(&agent.addr().to_string(), config)
        .await
        .expect("connect session")
}

#[tokio::test]
async fn get_returns_value() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();

    assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
    assert_eq!(vb.value.as_str(), Some("Test agent"));
}

#[tokio::test]
async fn get_missing_oid_yields_no_such_object_on_v2c() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 1, 99, 0)).await.unwrap();

    assert_eq!(vb.value, Value::NoSuchObject);
    assert!(vb.value.is_exception());
}

#[tokio::test]
async fn get_missing_oid_is_agent_error_on_v1() {
    let agent = TestAgent::new().await;
    let config = SessionConfig {
        version: Version::V1,
        ..test_config()
    };
    let session = connect(&agent, config).await;

    let result = session.get(&oid!(1, 3, 6, 1, 2, 1, 1, 99, 0)).await;

    assert!(matches!(
        result,
        Err(Error::Agent {
            status: ErrorStatus::NoSuchName,
            index: 1,
            ..
        })
    ));
}

#[tokio::test]
async fn get_next_advances_lexicographically() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let vb = session.get_next(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
    assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));

    let vb = session.get_next(&vb.oid).await.unwrap();
    assert_eq!(vb.oid, oid!(1, 3, 6, 1, 2, 1, 1, 2, 0));
}

#[tokio::test]
async fn set_octet_string_round_trips() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let target = oid!(1, 3, 6, 1, 2, 1, 1, 5, 0);
    let vb = session.set(&target, "OctetString", "renamed").await.unwrap();
    assert_eq!(vb.value.as_str(), Some("renamed"));

    // The agent stored the new value
    assert_eq!(agent.get(&target), Some(Value::from("renamed")));

    let vb = session.get(&target).await.unwrap();
    assert_eq!(vb.value.as_str(), Some("renamed"));
}

#[tokio::test]
async fn set_integer_round_trips() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let target = oid!(1, 3, 6, 1, 2, 1, 2, 1, 0);
    let vb = session.set(&target, "Integer", "42").await.unwrap();
    assert_eq!(vb.value, Value::Integer(42));

    let vb = session.get(&target).await.unwrap();
    assert_eq!(vb.value, Value::Integer(42));
}

#[tokio::test]
async fn set_rejects_unsupported_type_without_io() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    let result = session.set(&oid!(1, 3, 6, 1), "Gauge", "5").await;

    assert!(matches!(result, Err(Error::UnsupportedSetType { .. })));
}

#[tokio::test]
async fn values_survive_the_wire() {
    let mut data = common::system_mib();
    data.insert(oid!(1, 3, 6, 1, 2, 1, 3, 1, 0), Value::Counter64(u64::MAX));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 3, 2, 0), Value::IpAddress([10, 0, 0, 1]));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 3, 3, 0), Value::Gauge32(4_000_000_000));
    data.insert(oid!(1, 3, 6, 1, 2, 1, 3, 4, 0), Value::Integer(-1));
    let agent = TestAgent::with_data(data).await;
    let session = connect(&agent, test_config()).await;

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 3, 1, 0)).await.unwrap();
    assert_eq!(vb.value, Value::Counter64(u64::MAX));

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 3, 2, 0)).await.unwrap();
    assert_eq!(vb.value, Value::IpAddress([10, 0, 0, 1]));

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 3, 3, 0)).await.unwrap();
    assert_eq!(vb.value, Value::Gauge32(4_000_000_000));

    let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 3, 4, 0)).await.unwrap();
    assert_eq!(vb.value, Value::Integer(-1));
}

#[tokio::test]
async fn sequential_requests_reuse_one_session() {
    let agent = TestAgent::new().await;
    let session = connect(&agent, test_config()).await;

    for _ in 0..5 {
        let vb = session.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();
        assert_eq!(vb.value.as_str(), Some("Test agent"));
    }
}

#[tokio::test]
async fn version_string_validation() {
    assert!("2c".parse::<Version>().is_ok());
    assert!(matches!(
        "v3".parse::<Version>(),
        Err(Error::Config { .. })
    ));
}
