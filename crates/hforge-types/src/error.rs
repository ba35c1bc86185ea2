//! Codec error type and the parameter fields it can name.

use std::fmt;

/// The externally supplied field a textual parameter was destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    CipherSuite,
    SupportedGroup,
    SignatureAlgorithm,
    ProtocolVersion,
    KeyShareGroup,
    ClientRandom,
    SessionId,
    ServerName,
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamField::CipherSuite => "cipher suite",
            ParamField::SupportedGroup => "supported group",
            ParamField::SignatureAlgorithm => "signature algorithm",
            ParamField::ProtocolVersion => "protocol version",
            ParamField::KeyShareGroup => "key share group",
            ParamField::ClientRandom => "client random",
            ParamField::SessionId => "session id",
            ParamField::ServerName => "server name",
        };
        f.write_str(name)
    }
}

/// Handshake codec errors.
///
/// Every parse failure voids the whole message being parsed; construction
/// failures are raised before any bytes are produced.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("record payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("handshake body too large: {len} bytes (max 16777215)")]
    BodyTooLarge { len: usize },
    #[error("{context}: truncated input: need {need} bytes, got {got}")]
    TruncatedInput {
        context: &'static str,
        need: usize,
        got: usize,
    },
    #[error("unknown extension type: 0x{0:04x}")]
    UnknownExtensionType(u16),
    #[error("invalid {field}: {value:?}")]
    InvalidParameter { field: ParamField, value: String },
    #[error("{field} too large: {len} bytes (max {max})")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{context}: {detail}")]
    Malformed {
        context: &'static str,
        detail: String,
    },
    #[error("random source failure: {0}")]
    RandomSource(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn truncated(context: &'static str, need: usize, got: usize) -> Self {
        CodecError::TruncatedInput { context, need, got }
    }

    pub fn invalid_parameter(field: ParamField, value: impl Into<String>) -> Self {
        CodecError::InvalidParameter {
            field,
            value: value.into(),
        }
    }

    pub fn malformed(context: &'static str, detail: impl Into<String>) -> Self {
        CodecError::Malformed {
            context,
            detail: detail.into(),
        }
    }

    /// Returns true for transport conditions worth a fresh attempt.
    ///
    /// Codec failures are never recoverable: the input bytes will fail the
    /// same way every time.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CodecError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// Result alias used throughout the codec.
pub type CodecResult<T> = Result<T, CodecError>;
