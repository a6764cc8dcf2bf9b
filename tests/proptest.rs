//! Property-based round-trip tests for the BER codec.

use bytes::Bytes;
use proptest::prelude::*;
use snmpt::ber::{Decoder, EncodeBuf, decode_length, encode_length};
use snmpt::oid::Oid;
use snmpt::value::Value;
use snmpt::varbind::VarBind;

/// OIDs that can round-trip through BER.
///
/// X.690 packs the first two arcs as `40*arc1 + arc2`, so round-trip needs
/// arc1 in 0..=2 and arc2 <= 39 when arc1 < 2 (single-arc OIDs decode to
/// their 2-arc form and are excluded here).
fn arb_oid() -> impl Strategy<Value = Oid> {
    (0u32..=2, proptest::collection::vec(any::<u32>(), 1..=19)).prop_map(
        |(arc1, mut remaining)| {
            if arc1 < 2 {
                remaining[0] %= 40;
            } else {
                remaining[0] = remaining[0].min(u32::MAX - 80);
            }
            let mut arcs = vec![arc1];
            arcs.extend(remaining);
            Oid::new(arcs)
        },
    )
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        proptest::collection::vec(any::<u8>(), 0..256)
            .prop_map(|v| Value::OctetString(Bytes::from(v))),
        Just(Value::Null),
        arb_oid().prop_map(Value::ObjectIdentifier),
        any::<[u8; 4]>().prop_map(Value::IpAddress),
        any::<u32>().prop_map(Value::Counter32),
        any::<u32>().prop_map(Value::Gauge32),
        any::<u32>().prop_map(Value::TimeTicks),
        any::<u64>().prop_map(Value::Counter64),
        Just(Value::NoSuchObject),
        Just(Value::NoSuchInstance),
        Just(Value::EndOfMibView),
    ]
}

proptest! {
    #[test]
    fn oid_ber_roundtrip(oid in arb_oid()) {
        let ber = oid.to_ber();
        let decoded = Oid::from_ber(&ber).unwrap();
        prop_assert_eq!(decoded, oid);
    }

    #[test]
    fn value_ber_roundtrip(value in arb_value()) {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        let bytes = buf.finish();

        let mut decoder = Decoder::new(bytes);
        let decoded = Value::decode(&mut decoder).unwrap();
        prop_assert!(decoder.is_empty());
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn varbind_ber_roundtrip(oid in arb_oid(), value in arb_value()) {
        let vb = VarBind::new(oid, value);

        let mut buf = EncodeBuf::new();
        vb.encode(&mut buf);
        let bytes = buf.finish();

        let mut decoder = Decoder::new(bytes);
        let decoded = VarBind::decode(&mut decoder).unwrap();
        prop_assert_eq!(decoded, vb);
    }

    #[test]
    fn length_roundtrip(len in 0usize..=0x1FFFFF) {
        let (buf, count) = encode_length(len);
        let mut forward: Vec<u8> = buf[..count].to_vec();
        forward.reverse();
        let (decoded, consumed) = decode_length(&forward, 0).unwrap();
        prop_assert_eq!(decoded, len);
        prop_assert_eq!(consumed, count);
    }

    #[test]
    fn decoder_never_panics_on_garbage(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder = Decoder::from_slice(&data);
        let _ = Value::decode(&mut decoder);

        let mut decoder = Decoder::from_slice(&data);
        let _ = VarBind::decode(&mut decoder);

        let _ = snmpt::message::CommunityMessage::decode(Bytes::from(data));
    }
}
