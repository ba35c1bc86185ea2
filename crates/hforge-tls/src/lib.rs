#![forbid(unsafe_code)]
#![doc = "Wire-level TLS 1.3 handshake codec: records, handshake framing, hello messages and extensions."]

pub mod codec;
pub mod config;
pub mod extensions;
pub mod handshake;
pub mod keyshare;
pub mod params;
pub mod random;
pub mod record;
pub mod transport;

pub use hforge_types::{
    CipherSuite, CodecError, CodecResult, NamedGroup, ParamField, ProtocolVersion,
    PskKeyExchangeMode, SignatureScheme,
};
