#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmpt::message::CommunityMessage;
use snmpt::pdu::Pdu;
use snmpt::ber::Decoder;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Full message framing
    if let Ok(msg) = CommunityMessage::decode(bytes.clone()) {
        // A decoded message must re-encode and decode to the same PDU
        let reencoded = msg.encode();
        let redecoded = CommunityMessage::decode(reencoded).unwrap();
        assert_eq!(redecoded.pdu.request_id, msg.pdu.request_id);
        assert_eq!(redecoded.pdu.varbinds, msg.pdu.varbinds);
    }

    // Bare PDU decoding
    let mut decoder = Decoder::new(bytes);
    let _ = Pdu::decode(&mut decoder);
});
