//! Dissect captured records (`parse`).

use crate::dump;
use hforge_tls::extensions::ExtensionPolicy;
use hforge_tls::handshake::{
    decode_client_hello_with, decode_server_hello_with, parse_handshake, HandshakeType,
};
use hforge_tls::record::{ContentType, RecordIter};
use std::io::Read;
use tracing::debug;

pub fn run(input: &str, permissive: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = if input == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("cannot read '{input}': {e}"))?
    };
    let bytes = decode_hex(&text)?;
    debug!(len = bytes.len(), permissive, "dissecting input");
    let policy = if permissive {
        ExtensionPolicy::Permissive
    } else {
        ExtensionPolicy::Strict
    };
    dissect(&bytes, policy)
}

/// Hex with whitespace and an optional `0x` prefix tolerated.
fn decode_hex(text: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let cleaned: String = text.split_whitespace().collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    Ok(hex::decode(cleaned).map_err(|e| format!("invalid hex input: {e}"))?)
}

fn dissect(bytes: &[u8], policy: ExtensionPolicy) -> Result<(), Box<dyn std::error::Error>> {
    let mut iter = RecordIter::new(bytes);
    let mut handshake = Vec::new();
    let mut count = 0;
    for record in iter.by_ref() {
        let record = record?;
        count += 1;
        println!(
            "Record {count}: {} version=0x{:04x} length={}",
            record.content_type(),
            record.version(),
            record.length()
        );
        match record.content_type() {
            ContentType::Handshake => handshake.extend_from_slice(record.payload()),
            ContentType::Alert if record.payload().len() >= 2 => println!(
                "  alert level={} description={}",
                record.payload()[0],
                record.payload()[1]
            ),
            _ => {}
        }
    }

    let mut rest = handshake.as_slice();
    while !rest.is_empty() {
        let (msg, consumed) = parse_handshake(rest)?;
        rest = &rest[consumed..];
        match msg.msg_type() {
            HandshakeType::ClientHello => {
                dump::print_client_hello(&decode_client_hello_with(msg.body(), policy)?, policy)
            }
            HandshakeType::ServerHello => {
                dump::print_server_hello(&decode_server_hello_with(msg.body(), policy)?, policy)
            }
            other => println!("{other:?}: {} bytes", msg.length()),
        }
    }
    Ok(())
}
