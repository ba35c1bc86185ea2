//! ClientHello assembly and parsing (RFC 8446 §4.1.2).

use super::{HandshakeMessage, HandshakeType};
use crate::codec::{encode_u16, put_vec16, put_vec8, read_u16_list, Reader};
use crate::extensions::{
    marshal_extension_block, unmarshal_extension_block_with, Extension, ExtensionPolicy,
};
use crate::random::{random_32, RandomSource};
use crate::record::{fragment, marshal_records, ContentType, Record};
use hforge_types::{CipherSuite, CodecResult, ProtocolVersion};
use tracing::debug;

/// ClientHello message.
///
/// Fields are encoded exactly as set, valid or not; length prefixes are
/// always computed from the serialized bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    pub legacy_version: ProtocolVersion,
    pub random: [u8; 32],
    pub legacy_session_id: Vec<u8>,
    pub cipher_suites: Vec<CipherSuite>,
    pub legacy_compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,
}

impl ClientHello {
    /// A ClientHello with a fresh random drawn from `rng`, an empty session
    /// id, TLS_AES_128_GCM_SHA256 and the null compression method.
    pub fn new(rng: &mut dyn RandomSource, extensions: Vec<Extension>) -> CodecResult<Self> {
        Ok(Self {
            legacy_version: ProtocolVersion::TLS12,
            random: random_32(rng)?,
            legacy_session_id: Vec::new(),
            cipher_suites: vec![CipherSuite::TLS_AES_128_GCM_SHA256],
            legacy_compression_methods: vec![0x00],
            extensions,
        })
    }

    /// Replace the random, e.g. to replay a captured hello.
    pub fn set_random(&mut self, random: [u8; 32]) {
        self.random = random;
    }

    /// Encode the ClientHello body (without handshake header).
    pub fn marshal(&self) -> CodecResult<Vec<u8>> {
        let mut body = Vec::with_capacity(256);

        body.extend_from_slice(&encode_u16(self.legacy_version.0));
        body.extend_from_slice(&self.random);
        put_vec8(&mut body, "legacy_session_id", &self.legacy_session_id)?;

        let suites: Vec<u8> = self
            .cipher_suites
            .iter()
            .flat_map(|s| encode_u16(s.0))
            .collect();
        put_vec16(&mut body, "cipher_suites", &suites)?;

        put_vec8(
            &mut body,
            "legacy_compression_methods",
            &self.legacy_compression_methods,
        )?;

        let ext_data = marshal_extension_block(&self.extensions)?;
        put_vec16(&mut body, "extensions", &ext_data)?;

        Ok(body)
    }

    /// Wrap the body in a handshake header.
    pub fn to_handshake(&self) -> CodecResult<HandshakeMessage> {
        HandshakeMessage::new(HandshakeType::ClientHello, self.marshal()?)
    }

    /// Frame the ClientHello as one or more handshake records, ready for the wire.
    pub fn to_record_bytes(&self) -> CodecResult<Vec<u8>> {
        self.to_record_bytes_with_version(crate::record::LEGACY_RECORD_VERSION)
    }

    /// As [`ClientHello::to_record_bytes`], stamping `version` on each record.
    pub fn to_record_bytes_with_version(&self, version: u16) -> CodecResult<Vec<u8>> {
        let handshake = self.to_handshake()?.marshal();
        let records: Vec<Record> = fragment(ContentType::Handshake, &handshake)?
            .into_iter()
            .map(|r| r.with_version(version))
            .collect();
        debug!(
            handshake_len = handshake.len(),
            records = records.len(),
            extensions = self.extensions.len(),
            "framed ClientHello"
        );
        Ok(marshal_records(&records))
    }
}

/// Decode a ClientHello body (after the handshake header), strict policy.
pub fn decode_client_hello(data: &[u8]) -> CodecResult<ClientHello> {
    decode_client_hello_with(data, ExtensionPolicy::Strict)
}

/// Decode a ClientHello body under the given extension policy.
pub fn decode_client_hello_with(
    data: &[u8],
    policy: ExtensionPolicy,
) -> CodecResult<ClientHello> {
    let mut r = Reader::new(data, "ClientHello");

    let legacy_version = ProtocolVersion(r.read_u16()?);
    let random = r.read_array::<32>()?;
    let legacy_session_id = r.read_vec8()?.to_vec();
    let cipher_suites = read_u16_list(r.read_vec16()?, "ClientHello cipher_suites")?
        .into_iter()
        .map(CipherSuite)
        .collect();
    let legacy_compression_methods = r.read_vec8()?.to_vec();

    // Pre-TLS 1.2 hellos may omit the extension block entirely.
    let extensions = if r.is_empty() {
        Vec::new()
    } else {
        let block = r.read_vec16()?;
        r.finish()?;
        unmarshal_extension_block_with(block, policy)?
    };

    Ok(ClientHello {
        legacy_version,
        random,
        legacy_session_id,
        cipher_suites,
        legacy_compression_methods,
        extensions,
    })
}
