//! ServerHello parsing (RFC 8446 §4.1.3).

use crate::codec::Reader;
use crate::extensions::{
    find_extension, unmarshal_extension_block_with, Extension, ExtensionContext, ExtensionPolicy,
    ExtensionType, KeyShareEntry, TypedExtension,
};
use hforge_types::{CipherSuite, CodecError, CodecResult, NamedGroup, ProtocolVersion};
use tracing::debug;

/// Smallest possible ServerHello body: version(2) + random(32) +
/// session_id length(1) + cipher_suite(2) + compression_method(1).
pub const SERVER_HELLO_MIN_LEN: usize = 38;

/// Random value that marks a ServerHello as a HelloRetryRequest.
pub const HELLO_RETRY_REQUEST_RANDOM: [u8; 32] = [
    0xCF, 0x21, 0xAD, 0x74, 0xE5, 0x9A, 0x61, 0x11, 0xBE, 0x1D, 0x8C, 0x02, 0x1E, 0x65, 0xB8, 0x91,
    0xC2, 0xA2, 0x11, 0x16, 0x7A, 0xBB, 0x8C, 0x5E, 0x07, 0x9E, 0x09, 0xE2, 0xC8, 0xA8, 0x33, 0x9C,
];

/// ServerHello message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    pub legacy_version: ProtocolVersion,
    pub random: [u8; 32],
    pub legacy_session_id: Vec<u8>,
    pub cipher_suite: CipherSuite,
    pub compression_method: u8,
    pub extensions: Vec<Extension>,
}

impl ServerHello {
    pub fn is_hello_retry_request(&self) -> bool {
        self.random == HELLO_RETRY_REQUEST_RANDOM
    }

    fn context(&self) -> ExtensionContext {
        if self.is_hello_retry_request() {
            ExtensionContext::HelloRetryRequest
        } else {
            ExtensionContext::ServerHello
        }
    }

    /// Version from `supported_versions` if present, else `legacy_version`.
    pub fn selected_version(&self) -> CodecResult<ProtocolVersion> {
        match find_extension(&self.extensions, ExtensionType::SUPPORTED_VERSIONS) {
            Some(ext) => crate::extensions::parse_supported_versions_sh(&ext.data),
            None => Ok(self.legacy_version),
        }
    }

    /// The server's key share entry, if it sent one.
    pub fn key_share(&self) -> CodecResult<Option<KeyShareEntry>> {
        if self.is_hello_retry_request() {
            return Ok(None);
        }
        find_extension(&self.extensions, ExtensionType::KEY_SHARE)
            .map(|ext| crate::extensions::parse_key_share_sh(&ext.data))
            .transpose()
    }

    /// The group a HelloRetryRequest asks the client to retry with.
    pub fn retry_group(&self) -> CodecResult<Option<NamedGroup>> {
        if !self.is_hello_retry_request() {
            return Ok(None);
        }
        find_extension(&self.extensions, ExtensionType::KEY_SHARE)
            .map(|ext| crate::extensions::parse_key_share_hrr(&ext.data))
            .transpose()
    }

    /// Decode every extension payload in message order.
    pub fn typed_extensions(&self, policy: ExtensionPolicy) -> CodecResult<Vec<TypedExtension>> {
        let ctx = self.context();
        self.extensions
            .iter()
            .map(|ext| ext.decode(ctx, policy))
            .collect()
    }
}

/// Decode a ServerHello body (after the handshake header), strict policy.
pub fn decode_server_hello(data: &[u8]) -> CodecResult<ServerHello> {
    decode_server_hello_with(data, ExtensionPolicy::Strict)
}

/// Decode a ServerHello body under the given extension policy.
pub fn decode_server_hello_with(
    data: &[u8],
    policy: ExtensionPolicy,
) -> CodecResult<ServerHello> {
    if data.len() < SERVER_HELLO_MIN_LEN {
        return Err(CodecError::truncated(
            "ServerHello",
            SERVER_HELLO_MIN_LEN,
            data.len(),
        ));
    }
    let mut r = Reader::new(data, "ServerHello");

    let legacy_version = ProtocolVersion(r.read_u16()?);
    let random = r.read_array::<32>()?;
    let legacy_session_id = r.read_vec8()?.to_vec();
    let cipher_suite = CipherSuite(r.read_u16()?);
    let compression_method = r.read_u8()?;

    let extensions = if r.is_empty() {
        Vec::new()
    } else {
        let block = r.read_vec16()?;
        r.finish()?;
        unmarshal_extension_block_with(block, policy)?
    };

    debug!(
        version = %legacy_version,
        cipher_suite = %cipher_suite,
        extensions = extensions.len(),
        "decoded ServerHello"
    );

    Ok(ServerHello {
        legacy_version,
        random,
        legacy_session_id,
        cipher_suite,
        compression_method,
        extensions,
    })
}
