//! TLS record layer: framing, parsing and fragmentation of plaintext records.

use crate::codec::{decode_u16, encode_u16, Reader};
use hforge_types::{CodecError, CodecResult};
use tracing::trace;

/// Maximum plaintext fragment length (2^14).
pub const MAX_PLAINTEXT_LENGTH: usize = 16384;

/// Size of the record header: content_type(1) || version(2) || length(2).
pub const RECORD_HEADER_LEN: usize = 5;

/// Legacy record version written on every record (TLS 1.2 wire value).
pub const LEGACY_RECORD_VERSION: u16 = 0x0303;

/// TLS record content types.
///
/// Values outside the registered set survive parsing as `Unknown` so that
/// captured traffic can be inspected without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Invalid,
    ChangeCipherSpec,
    Alert,
    Handshake,
    ApplicationData,
    Unknown(u8),
}

impl ContentType {
    pub fn as_u8(self) -> u8 {
        match self {
            ContentType::Invalid => 0,
            ContentType::ChangeCipherSpec => 20,
            ContentType::Alert => 21,
            ContentType::Handshake => 22,
            ContentType::ApplicationData => 23,
            ContentType::Unknown(v) => v,
        }
    }
}

impl From<u8> for ContentType {
    fn from(v: u8) -> Self {
        match v {
            0 => ContentType::Invalid,
            20 => ContentType::ChangeCipherSpec,
            21 => ContentType::Alert,
            22 => ContentType::Handshake,
            23 => ContentType::ApplicationData,
            other => ContentType::Unknown(other),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Invalid => f.write_str("invalid"),
            ContentType::ChangeCipherSpec => f.write_str("change_cipher_spec"),
            ContentType::Alert => f.write_str("alert"),
            ContentType::Handshake => f.write_str("handshake"),
            ContentType::ApplicationData => f.write_str("application_data"),
            ContentType::Unknown(v) => write!(f, "unknown(0x{v:02x})"),
        }
    }
}

/// A single plaintext TLS record.
///
/// The length field is never stored: it is derived from the payload when
/// marshaling, so the declared and actual lengths cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    content_type: ContentType,
    version: u16,
    payload: Vec<u8>,
}

impl Record {
    /// Build an outbound record with the legacy 0x0303 version.
    ///
    /// Fails with `PayloadTooLarge` if the payload exceeds 16384 bytes.
    pub fn new(content_type: ContentType, payload: impl Into<Vec<u8>>) -> CodecResult<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PLAINTEXT_LENGTH {
            return Err(CodecError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PLAINTEXT_LENGTH,
            });
        }
        Ok(Self {
            content_type,
            version: LEGACY_RECORD_VERSION,
            payload,
        })
    }

    /// Override the record-layer version (e.g. 0x0301 on an initial
    /// ClientHello record, as many stacks send).
    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn length(&self) -> u16 {
        // Built records hold at most 16384 bytes; parsed ones at most u16::MAX.
        self.payload.len() as u16
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Serialize: content_type(1) || version(2) || length(2) || payload.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_HEADER_LEN + self.payload.len());
        buf.push(self.content_type.as_u8());
        buf.extend_from_slice(&encode_u16(self.version));
        buf.extend_from_slice(&encode_u16(self.length()));
        buf.extend_from_slice(&self.payload);
        buf
    }
}

/// Parse one record from the front of `data`.
///
/// Returns the record and the unconsumed tail, which may hold further
/// concatenated records. Any declared length is accepted as long as that
/// many payload bytes follow the header.
pub fn parse_record(data: &[u8]) -> CodecResult<(Record, &[u8])> {
    if data.len() < RECORD_HEADER_LEN {
        return Err(CodecError::truncated(
            "record header",
            RECORD_HEADER_LEN,
            data.len(),
        ));
    }
    let content_type = ContentType::from(data[0]);
    let version = decode_u16([data[1], data[2]]);
    let length = decode_u16([data[3], data[4]]) as usize;

    let mut body = Reader::new(&data[RECORD_HEADER_LEN..], "record body");
    let payload = body.read_bytes(length)?.to_vec();
    trace!(%content_type, version, length, "parsed record");

    Ok((
        Record {
            content_type,
            version,
            payload,
        },
        body.rest(),
    ))
}

/// Iterator over a buffer of concatenated records.
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    rest: &'a [u8],
    failed: bool,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            rest: data,
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remainder(&self) -> &'a [u8] {
        self.rest
    }
}

impl Iterator for RecordIter<'_> {
    type Item = CodecResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.rest.is_empty() {
            return None;
        }
        match parse_record(self.rest) {
            Ok((record, rest)) => {
                self.rest = rest;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Split `data` into records of at most 16384 bytes each.
///
/// Empty input produces no records.
pub fn fragment(content_type: ContentType, data: &[u8]) -> CodecResult<Vec<Record>> {
    data.chunks(MAX_PLAINTEXT_LENGTH)
        .map(|chunk| Record::new(content_type, chunk))
        .collect()
}

/// Marshal a sequence of records back to back.
pub fn marshal_records(records: &[Record]) -> Vec<u8> {
    let mut out = Vec::new();
    for r in records {
        out.extend_from_slice(&r.marshal());
    }
    out
}
