#![no_main]
use hforge_tls::extensions::ExtensionPolicy;
use hforge_tls::handshake::{decode_client_hello, decode_server_hello_with};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_server_hello_with(data, ExtensionPolicy::Permissive);
    if let Ok(ch) = decode_client_hello(data) {
        // Anything accepted must survive a re-encode.
        if let Ok(body) = ch.marshal() {
            assert_eq!(decode_client_hello(&body).ok(), Some(ch));
        }
    }
});
