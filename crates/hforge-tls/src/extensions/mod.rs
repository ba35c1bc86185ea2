//! TLS extensions: generic framing, block parsing and typed decoding.

pub mod codec;

pub use codec::*;

use crate::codec::{encode_u16, put_vec16, Reader};
use hforge_types::{
    CodecError, CodecResult, NamedGroup, ProtocolVersion, PskKeyExchangeMode, SignatureScheme,
};
use tracing::{debug, trace};

/// Largest payload a single extension can carry (2-byte length field).
pub const MAX_EXTENSION_DATA_LENGTH: usize = u16::MAX as usize;

/// TLS extension type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionType(pub u16);

impl ExtensionType {
    pub const SERVER_NAME: Self = Self(0);
    pub const MAX_FRAGMENT_LENGTH: Self = Self(1);
    pub const STATUS_REQUEST: Self = Self(5);
    pub const SUPPORTED_GROUPS: Self = Self(10);
    pub const EC_POINT_FORMATS: Self = Self(11);
    pub const SIGNATURE_ALGORITHMS: Self = Self(13);
    pub const USE_SRTP: Self = Self(14);
    pub const HEARTBEAT: Self = Self(15);
    pub const APPLICATION_LAYER_PROTOCOL_NEGOTIATION: Self = Self(16);
    pub const SIGNED_CERTIFICATE_TIMESTAMP: Self = Self(18);
    pub const PADDING: Self = Self(21);
    pub const ENCRYPT_THEN_MAC: Self = Self(22);
    pub const EXTENDED_MASTER_SECRET: Self = Self(23);
    pub const COMPRESS_CERTIFICATE: Self = Self(27);
    pub const RECORD_SIZE_LIMIT: Self = Self(28);
    pub const SESSION_TICKET: Self = Self(35);
    pub const PRE_SHARED_KEY: Self = Self(41);
    pub const EARLY_DATA: Self = Self(42);
    pub const SUPPORTED_VERSIONS: Self = Self(43);
    pub const COOKIE: Self = Self(44);
    pub const PSK_KEY_EXCHANGE_MODES: Self = Self(45);
    pub const CERTIFICATE_AUTHORITIES: Self = Self(47);
    pub const OID_FILTERS: Self = Self(48);
    pub const POST_HANDSHAKE_AUTH: Self = Self(49);
    pub const SIGNATURE_ALGORITHMS_CERT: Self = Self(50);
    pub const KEY_SHARE: Self = Self(51);
    pub const RENEGOTIATION_INFO: Self = Self(0xFF01);

    /// Registered name, or `None` for codes outside the recognized set.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::SERVER_NAME => "server_name",
            Self::MAX_FRAGMENT_LENGTH => "max_fragment_length",
            Self::STATUS_REQUEST => "status_request",
            Self::SUPPORTED_GROUPS => "supported_groups",
            Self::EC_POINT_FORMATS => "ec_point_formats",
            Self::SIGNATURE_ALGORITHMS => "signature_algorithms",
            Self::USE_SRTP => "use_srtp",
            Self::HEARTBEAT => "heartbeat",
            Self::APPLICATION_LAYER_PROTOCOL_NEGOTIATION => "application_layer_protocol_negotiation",
            Self::SIGNED_CERTIFICATE_TIMESTAMP => "signed_certificate_timestamp",
            Self::PADDING => "padding",
            Self::ENCRYPT_THEN_MAC => "encrypt_then_mac",
            Self::EXTENDED_MASTER_SECRET => "extended_master_secret",
            Self::COMPRESS_CERTIFICATE => "compress_certificate",
            Self::RECORD_SIZE_LIMIT => "record_size_limit",
            Self::SESSION_TICKET => "session_ticket",
            Self::PRE_SHARED_KEY => "pre_shared_key",
            Self::EARLY_DATA => "early_data",
            Self::SUPPORTED_VERSIONS => "supported_versions",
            Self::COOKIE => "cookie",
            Self::PSK_KEY_EXCHANGE_MODES => "psk_key_exchange_modes",
            Self::CERTIFICATE_AUTHORITIES => "certificate_authorities",
            Self::OID_FILTERS => "oid_filters",
            Self::POST_HANDSHAKE_AUTH => "post_handshake_auth",
            Self::SIGNATURE_ALGORITHMS_CERT => "signature_algorithms_cert",
            Self::KEY_SHARE => "key_share",
            Self::RENEGOTIATION_INFO => "renegotiation_info",
            t if is_grease_value(t.0) => "GREASE",
            _ => return None,
        };
        Some(name)
    }

    /// Returns true if strict decoding accepts this code.
    ///
    /// GREASE codes (RFC 8701) are reserved and count as recognized.
    pub fn is_recognized(&self) -> bool {
        self.name().is_some()
    }
}

impl std::fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}(0x{:04x})", self.0),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

/// How to treat extension types outside the recognized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionPolicy {
    /// Fail with `UnknownExtensionType`.
    #[default]
    Strict,
    /// Keep the extension and surface it as `TypedExtension::Unrecognized`.
    Permissive,
}

/// Which message an extension block belongs to; some payloads differ in
/// shape between ClientHello and ServerHello.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionContext {
    ClientHello,
    ServerHello,
    HelloRetryRequest,
}

/// A raw TLS extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub extension_type: ExtensionType,
    pub data: Vec<u8>,
}

impl Extension {
    pub fn new(extension_type: ExtensionType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            extension_type,
            data: data.into(),
        }
    }

    /// Serialize: type(2) || length(2) || data.
    ///
    /// Precondition: `data.len() <= 65535`. Longer payloads cannot be
    /// represented; use [`Extension::try_marshal`] when the payload size is
    /// not already bounded by the caller.
    pub fn marshal(&self) -> Vec<u8> {
        debug_assert!(self.data.len() <= MAX_EXTENSION_DATA_LENGTH);
        let mut buf = Vec::with_capacity(4 + self.data.len());
        buf.extend_from_slice(&encode_u16(self.extension_type.0));
        buf.extend_from_slice(&encode_u16(self.data.len() as u16));
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Checked [`Extension::marshal`]: fails with `FieldTooLarge` instead of
    /// producing a corrupt length field.
    pub fn try_marshal(&self) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(4 + self.data.len());
        buf.extend_from_slice(&encode_u16(self.extension_type.0));
        put_vec16(&mut buf, "extension data", &self.data)?;
        Ok(buf)
    }

    /// Interpret the payload according to the extension type.
    pub fn decode(
        &self,
        ctx: ExtensionContext,
        policy: ExtensionPolicy,
    ) -> CodecResult<TypedExtension> {
        let data = self.data.as_slice();
        let typed = match self.extension_type {
            ExtensionType::SERVER_NAME => {
                // Servers acknowledge SNI with an empty payload.
                if data.is_empty() && ctx != ExtensionContext::ClientHello {
                    TypedExtension::ServerName(String::new())
                } else {
                    TypedExtension::ServerName(parse_server_name(data)?)
                }
            }
            ExtensionType::SUPPORTED_GROUPS => {
                TypedExtension::SupportedGroups(parse_supported_groups(data)?)
            }
            ExtensionType::SIGNATURE_ALGORITHMS => {
                TypedExtension::SignatureAlgorithms(parse_signature_algorithms(data)?)
            }
            ExtensionType::SUPPORTED_VERSIONS => match ctx {
                ExtensionContext::ClientHello => {
                    TypedExtension::SupportedVersions(parse_supported_versions(data)?)
                }
                _ => TypedExtension::SupportedVersions(vec![parse_supported_versions_sh(data)?]),
            },
            ExtensionType::PSK_KEY_EXCHANGE_MODES => {
                TypedExtension::PskKeyExchangeModes(parse_psk_key_exchange_modes(data)?)
            }
            ExtensionType::KEY_SHARE => match ctx {
                ExtensionContext::ClientHello => TypedExtension::KeyShare(parse_key_share(data)?),
                ExtensionContext::ServerHello => {
                    TypedExtension::KeyShare(vec![parse_key_share_sh(data)?])
                }
                ExtensionContext::HelloRetryRequest => {
                    TypedExtension::KeyShareSelectedGroup(parse_key_share_hrr(data)?)
                }
            },
            t if t.is_recognized() => TypedExtension::Opaque(self.clone()),
            t => match policy {
                ExtensionPolicy::Strict => return Err(CodecError::UnknownExtensionType(t.0)),
                ExtensionPolicy::Permissive => TypedExtension::Unrecognized {
                    extension_type: t.0,
                    data: self.data.clone(),
                },
            },
        };
        Ok(typed)
    }
}

/// An extension with its payload interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedExtension {
    ServerName(String),
    SupportedGroups(Vec<NamedGroup>),
    SignatureAlgorithms(Vec<SignatureScheme>),
    SupportedVersions(Vec<ProtocolVersion>),
    PskKeyExchangeModes(Vec<PskKeyExchangeMode>),
    KeyShare(Vec<KeyShareEntry>),
    /// HelloRetryRequest key_share: the group the server wants.
    KeyShareSelectedGroup(NamedGroup),
    /// A recognized type without a typed decoder; payload left opaque.
    Opaque(Extension),
    /// A type outside the recognized set, kept under `Permissive`.
    Unrecognized { extension_type: u16, data: Vec<u8> },
}

/// Parse one extension from the front of `data` (strict policy).
///
/// Returns the extension and the number of bytes consumed.
pub fn unmarshal_extension(data: &[u8]) -> CodecResult<(Extension, usize)> {
    unmarshal_extension_with(data, ExtensionPolicy::Strict)
}

/// Parse one extension from the front of `data` under `policy`.
pub fn unmarshal_extension_with(
    data: &[u8],
    policy: ExtensionPolicy,
) -> CodecResult<(Extension, usize)> {
    let mut r = Reader::new(data, "extension");
    let extension_type = ExtensionType(r.read_u16()?);
    let len = r.read_u16()? as usize;
    let payload = r.read_bytes(len)?;

    if policy == ExtensionPolicy::Strict && !extension_type.is_recognized() {
        debug!(extension_type = extension_type.0, "rejecting unknown extension");
        return Err(CodecError::UnknownExtensionType(extension_type.0));
    }

    Ok((
        Extension {
            extension_type,
            data: payload.to_vec(),
        },
        r.position(),
    ))
}

/// Parse a raw extension list (no outer length prefix), strict policy.
pub fn unmarshal_extension_block(data: &[u8]) -> CodecResult<Vec<Extension>> {
    unmarshal_extension_block_with(data, ExtensionPolicy::Strict)
}

/// Parse a raw extension list under `policy`, preserving input order.
pub fn unmarshal_extension_block_with(
    data: &[u8],
    policy: ExtensionPolicy,
) -> CodecResult<Vec<Extension>> {
    let mut exts = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let residual = &data[pos..];
        if residual.len() < 4 {
            return Err(CodecError::truncated("extension header", 4, residual.len()));
        }
        let (ext, consumed) = unmarshal_extension_with(residual, policy)?;
        trace!(extension = %ext.extension_type, len = ext.data.len(), "extension");
        exts.push(ext);
        pos += consumed;
    }
    Ok(exts)
}

/// Serialize an extension list (no outer length prefix).
pub fn marshal_extension_block(exts: &[Extension]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    for ext in exts {
        buf.extend_from_slice(&ext.try_marshal()?);
    }
    Ok(buf)
}

/// Find the first extension of the given type.
pub fn find_extension(exts: &[Extension], extension_type: ExtensionType) -> Option<&Extension> {
    exts.iter().find(|e| e.extension_type == extension_type)
}
