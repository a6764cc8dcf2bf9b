#![no_main]

use libfuzzer_sys::fuzz_target;

use snmpt::oid::Oid;

fuzz_target!(|data: &[u8]| {
    // Dotted-string parsing
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            // A parsed OID must survive display/re-parse
            let redisplayed = oid.to_string();
            let reparsed = Oid::parse(&redisplayed).unwrap();
            assert_eq!(oid, reparsed);
        }
    }

    // BER content decoding; decode must survive re-encode/re-decode
    if let Ok(oid) = Oid::from_ber(data) {
        let ber = oid.to_ber();
        let redecoded = Oid::from_ber(&ber).unwrap();
        assert_eq!(oid, redecoded);
    }
});
