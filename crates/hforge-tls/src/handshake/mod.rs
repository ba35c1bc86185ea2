//! TLS handshake message framing (RFC 8446 §4).

pub mod client_hello;
pub mod server_hello;

pub use client_hello::{decode_client_hello, decode_client_hello_with, ClientHello};
pub use server_hello::{decode_server_hello, decode_server_hello_with, ServerHello};

use crate::codec::{encode_u24, Reader, MAX_U24};
use hforge_types::{CodecError, CodecResult};

/// Size of the handshake header: msg_type(1) || length(3).
pub const HANDSHAKE_HEADER_LEN: usize = 4;

/// Handshake message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeType {
    ClientHello,
    ServerHello,
    NewSessionTicket,
    EndOfEarlyData,
    EncryptedExtensions,
    Certificate,
    CertificateRequest,
    CertificateVerify,
    Finished,
    KeyUpdate,
    MessageHash,
    Unknown(u8),
}

impl HandshakeType {
    pub fn as_u8(self) -> u8 {
        match self {
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::NewSessionTicket => 4,
            HandshakeType::EndOfEarlyData => 5,
            HandshakeType::EncryptedExtensions => 8,
            HandshakeType::Certificate => 11,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::Finished => 20,
            HandshakeType::KeyUpdate => 24,
            HandshakeType::MessageHash => 254,
            HandshakeType::Unknown(v) => v,
        }
    }
}

impl From<u8> for HandshakeType {
    fn from(v: u8) -> Self {
        match v {
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            4 => HandshakeType::NewSessionTicket,
            5 => HandshakeType::EndOfEarlyData,
            8 => HandshakeType::EncryptedExtensions,
            11 => HandshakeType::Certificate,
            13 => HandshakeType::CertificateRequest,
            15 => HandshakeType::CertificateVerify,
            20 => HandshakeType::Finished,
            24 => HandshakeType::KeyUpdate,
            254 => HandshakeType::MessageHash,
            other => HandshakeType::Unknown(other),
        }
    }
}

/// A framed handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    msg_type: HandshakeType,
    body: Vec<u8>,
}

impl HandshakeMessage {
    /// Fails with `BodyTooLarge` if the body does not fit a 24-bit length.
    pub fn new(msg_type: HandshakeType, body: impl Into<Vec<u8>>) -> CodecResult<Self> {
        let body = body.into();
        if body.len() > MAX_U24 {
            return Err(CodecError::BodyTooLarge { len: body.len() });
        }
        Ok(Self { msg_type, body })
    }

    pub fn msg_type(&self) -> HandshakeType {
        self.msg_type
    }

    pub fn length(&self) -> u32 {
        self.body.len() as u32
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Serialize: msg_type(1) || length(3) || body.
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HANDSHAKE_HEADER_LEN + self.body.len());
        out.push(self.msg_type.as_u8());
        out.extend_from_slice(&encode_u24(self.length()));
        out.extend_from_slice(&self.body);
        out
    }
}

/// Parse one handshake message from the front of `data`.
/// Returns the message and the number of bytes consumed.
pub fn parse_handshake(data: &[u8]) -> CodecResult<(HandshakeMessage, usize)> {
    let mut r = Reader::new(data, "handshake header");
    let msg_type = HandshakeType::from(r.read_u8()?);
    let length = r.read_u24()? as usize;
    let mut body = Reader::new(r.rest(), "handshake body");
    let body = body.read_bytes(length)?.to_vec();
    Ok((
        HandshakeMessage { msg_type, body },
        HANDSHAKE_HEADER_LEN + length,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_header_roundtrip() {
        let body = vec![1, 2, 3, 4, 5];
        let msg = HandshakeMessage::new(HandshakeType::Finished, body.clone()).unwrap();
        let wire = msg.marshal();
        assert_eq!(&wire[..4], &[20, 0x00, 0x00, 0x05]);
        let (parsed, consumed) = parse_handshake(&wire).unwrap();
        assert_eq!(parsed.msg_type(), HandshakeType::Finished);
        assert_eq!(parsed.body(), body.as_slice());
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn test_handshake_body_limits() {
        let max = HandshakeMessage::new(HandshakeType::Certificate, vec![0u8; MAX_U24]).unwrap();
        assert_eq!(&max.marshal()[1..4], &[0xff, 0xff, 0xff]);

        match HandshakeMessage::new(HandshakeType::Certificate, vec![0u8; MAX_U24 + 1]) {
            Err(CodecError::BodyTooLarge { len }) => assert_eq!(len, 1 << 24),
            other => panic!("expected BodyTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_handshake_truncated() {
        assert!(matches!(
            parse_handshake(&[0x02, 0x00, 0x00]),
            Err(CodecError::TruncatedInput { .. })
        ));
        assert!(matches!(
            parse_handshake(&[0x02, 0x00, 0x00, 0x03, 0xaa]),
            Err(CodecError::TruncatedInput { need: 3, got: 1, .. })
        ));
    }

    #[test]
    fn test_parse_handshake_trailing_and_unknown_type() {
        let data = [0x63, 0x00, 0x00, 0x01, 0xee, 0x02, 0x00];
        let (msg, consumed) = parse_handshake(&data).unwrap();
        assert_eq!(msg.msg_type(), HandshakeType::Unknown(0x63));
        assert_eq!(consumed, 5);
        assert_eq!(msg.marshal(), data[..5].to_vec());
    }
}
