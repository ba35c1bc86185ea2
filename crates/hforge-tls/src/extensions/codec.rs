//! Typed extension payload builders and parsers for ClientHello/ServerHello.

use super::{Extension, ExtensionType};
use crate::codec::{encode_u16, put_vec16, put_vec8, read_u16_list, Reader};
use crate::random::RandomSource;
use hforge_types::{
    CodecError, CodecResult, NamedGroup, ProtocolVersion, PskKeyExchangeMode, SignatureScheme,
};

/// SNI name_type for a DNS host name.
pub const NAME_TYPE_HOST_NAME: u8 = 0;

// ---------------------------------------------------------------------------
// Key share entries
// ---------------------------------------------------------------------------

/// One `KeyShareEntry`: group(2) || key_exchange_length(2) || key_exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShareEntry {
    pub group: NamedGroup,
    pub key_exchange: Vec<u8>,
}

impl KeyShareEntry {
    pub fn new(group: NamedGroup, key_exchange: impl Into<Vec<u8>>) -> Self {
        Self {
            group,
            key_exchange: key_exchange.into(),
        }
    }

    /// Append the wire encoding to `buf`.
    pub fn marshal_into(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.extend_from_slice(&encode_u16(self.group.0));
        put_vec16(buf, "key_exchange", &self.key_exchange)
    }

    pub fn marshal(&self) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(4 + self.key_exchange.len());
        self.marshal_into(&mut buf)?;
        Ok(buf)
    }

    fn read(r: &mut Reader<'_>) -> CodecResult<Self> {
        let group = NamedGroup(r.read_u16()?);
        let key_exchange = r.read_vec16()?.to_vec();
        Ok(Self {
            group,
            key_exchange,
        })
    }
}

// ---------------------------------------------------------------------------
// Build extensions for ClientHello
// ---------------------------------------------------------------------------

/// Build a `server_name` (SNI) extension.
pub fn build_server_name(hostname: &str) -> CodecResult<Extension> {
    // Format: server_name_list_length(2) || name_type(1)=0 || host_name_length(2) || hostname
    let mut entry = Vec::with_capacity(3 + hostname.len());
    entry.push(NAME_TYPE_HOST_NAME);
    put_vec16(&mut entry, "host_name", hostname.as_bytes())?;
    let mut data = Vec::with_capacity(2 + entry.len());
    put_vec16(&mut data, "server_name_list", &entry)?;
    Ok(Extension::new(ExtensionType::SERVER_NAME, data))
}

fn build_code_list16(
    extension_type: ExtensionType,
    field: &'static str,
    codes: impl Iterator<Item = u16>,
) -> CodecResult<Extension> {
    let list: Vec<u8> = codes.flat_map(encode_u16).collect();
    let mut data = Vec::with_capacity(2 + list.len());
    put_vec16(&mut data, field, &list)?;
    Ok(Extension::new(extension_type, data))
}

/// Build the `supported_groups` extension.
pub fn build_supported_groups(groups: &[NamedGroup]) -> CodecResult<Extension> {
    build_code_list16(
        ExtensionType::SUPPORTED_GROUPS,
        "named_group_list",
        groups.iter().map(|g| g.0),
    )
}

/// Build the `signature_algorithms` extension.
pub fn build_signature_algorithms(schemes: &[SignatureScheme]) -> CodecResult<Extension> {
    build_code_list16(
        ExtensionType::SIGNATURE_ALGORITHMS,
        "supported_signature_algorithms",
        schemes.iter().map(|s| s.0),
    )
}

/// Build the ClientHello `supported_versions` extension.
/// Format: list_length(1) || version(2)*
pub fn build_supported_versions(versions: &[ProtocolVersion]) -> CodecResult<Extension> {
    let list: Vec<u8> = versions.iter().flat_map(|v| encode_u16(v.0)).collect();
    let mut data = Vec::with_capacity(1 + list.len());
    put_vec8(&mut data, "versions", &list)?;
    Ok(Extension::new(ExtensionType::SUPPORTED_VERSIONS, data))
}

/// Build the `psk_key_exchange_modes` extension (RFC 8446 §4.2.9).
/// Format: list_length(1) || mode(1)*
pub fn build_psk_key_exchange_modes(modes: &[PskKeyExchangeMode]) -> CodecResult<Extension> {
    let list: Vec<u8> = modes.iter().map(|m| m.0).collect();
    let mut data = Vec::with_capacity(1 + list.len());
    put_vec8(&mut data, "ke_modes", &list)?;
    Ok(Extension::new(ExtensionType::PSK_KEY_EXCHANGE_MODES, data))
}

/// Build the ClientHello `key_share` extension.
/// Format: client_shares_length(2) || KeyShareEntry*
pub fn build_key_share(entries: &[KeyShareEntry]) -> CodecResult<Extension> {
    let mut shares = Vec::new();
    for entry in entries {
        entry.marshal_into(&mut shares)?;
    }
    let mut data = Vec::with_capacity(2 + shares.len());
    put_vec16(&mut data, "client_shares", &shares)?;
    Ok(Extension::new(ExtensionType::KEY_SHARE, data))
}

// ---------------------------------------------------------------------------
// Build extensions for ServerHello
// ---------------------------------------------------------------------------

/// Build the ServerHello `supported_versions` extension (selected version, no list prefix).
pub fn build_supported_versions_sh(version: ProtocolVersion) -> Extension {
    Extension::new(
        ExtensionType::SUPPORTED_VERSIONS,
        encode_u16(version.0).to_vec(),
    )
}

/// Build the ServerHello `key_share` extension (single entry, no list prefix).
pub fn build_key_share_sh(entry: &KeyShareEntry) -> CodecResult<Extension> {
    Ok(Extension::new(ExtensionType::KEY_SHARE, entry.marshal()?))
}

// ---------------------------------------------------------------------------
// Parse extension payloads
// ---------------------------------------------------------------------------

/// Parse a `server_name` payload and return the first host_name entry.
pub fn parse_server_name(data: &[u8]) -> CodecResult<String> {
    let mut outer = Reader::new(data, "server_name");
    let list = outer.read_vec16()?;
    outer.finish()?;

    let mut r = Reader::new(list, "server_name list");
    while !r.is_empty() {
        let name_type = r.read_u8()?;
        let name = r.read_vec16()?;
        if name_type == NAME_TYPE_HOST_NAME {
            return String::from_utf8(name.to_vec())
                .map_err(|_| CodecError::malformed("server_name", "host_name is not UTF-8"));
        }
    }
    Err(CodecError::malformed("server_name", "no host_name entry"))
}

fn parse_code_list16(data: &[u8], context: &'static str) -> CodecResult<Vec<u16>> {
    let mut r = Reader::new(data, context);
    let list = r.read_vec16()?;
    r.finish()?;
    read_u16_list(list, context)
}

/// Parse a `supported_groups` payload.
pub fn parse_supported_groups(data: &[u8]) -> CodecResult<Vec<NamedGroup>> {
    Ok(parse_code_list16(data, "supported_groups")?
        .into_iter()
        .map(NamedGroup)
        .collect())
}

/// Parse a `signature_algorithms` payload.
pub fn parse_signature_algorithms(data: &[u8]) -> CodecResult<Vec<SignatureScheme>> {
    Ok(parse_code_list16(data, "signature_algorithms")?
        .into_iter()
        .map(SignatureScheme)
        .collect())
}

/// Parse the ClientHello `supported_versions` payload.
pub fn parse_supported_versions(data: &[u8]) -> CodecResult<Vec<ProtocolVersion>> {
    let mut r = Reader::new(data, "supported_versions");
    let list = r.read_vec8()?;
    r.finish()?;
    Ok(read_u16_list(list, "supported_versions")?
        .into_iter()
        .map(ProtocolVersion)
        .collect())
}

/// Parse the ServerHello `supported_versions` payload (selected version).
pub fn parse_supported_versions_sh(data: &[u8]) -> CodecResult<ProtocolVersion> {
    let mut r = Reader::new(data, "supported_versions");
    let v = r.read_u16()?;
    r.finish()?;
    Ok(ProtocolVersion(v))
}

/// Parse a `psk_key_exchange_modes` payload.
pub fn parse_psk_key_exchange_modes(data: &[u8]) -> CodecResult<Vec<PskKeyExchangeMode>> {
    let mut r = Reader::new(data, "psk_key_exchange_modes");
    let list = r.read_vec8()?;
    r.finish()?;
    Ok(list.iter().copied().map(PskKeyExchangeMode).collect())
}

/// Parse the ClientHello `key_share` payload.
pub fn parse_key_share(data: &[u8]) -> CodecResult<Vec<KeyShareEntry>> {
    let mut outer = Reader::new(data, "key_share");
    let shares = outer.read_vec16()?;
    outer.finish()?;

    let mut r = Reader::new(shares, "key_share entry");
    let mut entries = Vec::new();
    while !r.is_empty() {
        entries.push(KeyShareEntry::read(&mut r)?);
    }
    Ok(entries)
}

/// Parse the ServerHello `key_share` payload (single entry).
pub fn parse_key_share_sh(data: &[u8]) -> CodecResult<KeyShareEntry> {
    let mut r = Reader::new(data, "key_share");
    let entry = KeyShareEntry::read(&mut r)?;
    r.finish()?;
    Ok(entry)
}

/// Parse the HelloRetryRequest `key_share` payload (selected group only).
pub fn parse_key_share_hrr(data: &[u8]) -> CodecResult<NamedGroup> {
    let mut r = Reader::new(data, "key_share HRR");
    let group = r.read_u16()?;
    r.finish()?;
    Ok(NamedGroup(group))
}

// ---------------------------------------------------------------------------
// GREASE (RFC 8701)
// ---------------------------------------------------------------------------

/// The 16 GREASE values defined in RFC 8701.
pub const GREASE_VALUES: [u16; 16] = [
    0x0A0A, 0x1A1A, 0x2A2A, 0x3A3A, 0x4A4A, 0x5A5A, 0x6A6A, 0x7A7A, 0x8A8A, 0x9A9A, 0xAAAA, 0xBABA,
    0xCACA, 0xDADA, 0xEAEA, 0xFAFA,
];

/// Returns true if a u16 value matches the GREASE pattern (0x?A?A where both nibbles match).
pub fn is_grease_value(v: u16) -> bool {
    (v & 0x0F0F) == 0x0A0A && (v >> 8) == (v & 0xFF)
}

/// Pick a GREASE value from the 16 defined values.
pub fn grease_value(rng: &mut dyn RandomSource) -> CodecResult<u16> {
    let mut buf = [0u8; 1];
    rng.fill(&mut buf)?;
    Ok(GREASE_VALUES[(buf[0] & 0x0F) as usize])
}

/// Build a GREASE extension with the given type code and empty data.
pub fn build_grease_extension(value: u16) -> Extension {
    Extension::new(ExtensionType(value), Vec::new())
}
