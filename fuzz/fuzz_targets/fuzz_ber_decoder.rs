#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmpt::ber::Decoder;
use snmpt::value::Value;
use snmpt::varbind::VarBind;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Fuzz the BER decoder primitives
    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_integer();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_octet_string();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_null();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_oid();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_sequence();

    // Fuzz Value decoding (covers all SNMP value types)
    let mut decoder = Decoder::new(bytes.clone());
    let _ = Value::decode(&mut decoder);

    // Fuzz VarBind decoding
    let mut decoder = Decoder::new(bytes);
    let _ = VarBind::decode(&mut decoder);
});
