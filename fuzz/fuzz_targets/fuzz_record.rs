#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for record in hforge_tls::record::RecordIter::new(data) {
        match record {
            Ok(r) => {
                let _ = hforge_tls::handshake::parse_handshake(r.payload());
            }
            Err(_) => break,
        }
    }
});
