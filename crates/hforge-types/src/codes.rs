//! 16-bit protocol code points carried in hello messages.
//!
//! Each code is a transparent newtype so arbitrary values (GREASE, private
//! use, deliberately invalid codes) can be encoded as-is.

use std::fmt;

macro_rules! impl_code_display {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "0x{:04x}", self.0),
                }
            }
        }

        impl From<u16> for $ty {
            fn from(v: u16) -> Self {
                Self(v)
            }
        }
    };
}

/// Protocol version code (legacy_version, supported_versions entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion(pub u16);

impl ProtocolVersion {
    pub const TLS10: Self = Self(0x0301);
    pub const TLS11: Self = Self(0x0302);
    pub const TLS12: Self = Self(0x0303);
    pub const TLS13: Self = Self(0x0304);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::TLS10 => Some("TLS 1.0"),
            Self::TLS11 => Some("TLS 1.1"),
            Self::TLS12 => Some("TLS 1.2"),
            Self::TLS13 => Some("TLS 1.3"),
            _ => None,
        }
    }
}

impl_code_display!(ProtocolVersion);

/// TLS cipher suite identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSuite(pub u16);

impl CipherSuite {
    // TLS 1.3 cipher suites
    pub const TLS_AES_128_GCM_SHA256: Self = Self(0x1301);
    pub const TLS_AES_256_GCM_SHA384: Self = Self(0x1302);
    pub const TLS_CHACHA20_POLY1305_SHA256: Self = Self(0x1303);
    pub const TLS_AES_128_CCM_SHA256: Self = Self(0x1304);
    pub const TLS_AES_128_CCM_8_SHA256: Self = Self(0x1305);

    // TLS 1.2 cipher suites (representative)
    pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: Self = Self(0xC02B);
    pub const TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: Self = Self(0xC02C);
    pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: Self = Self(0xC02F);
    pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: Self = Self(0xC030);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::TLS_AES_128_GCM_SHA256 => Some("TLS_AES_128_GCM_SHA256"),
            Self::TLS_AES_256_GCM_SHA384 => Some("TLS_AES_256_GCM_SHA384"),
            Self::TLS_CHACHA20_POLY1305_SHA256 => Some("TLS_CHACHA20_POLY1305_SHA256"),
            Self::TLS_AES_128_CCM_SHA256 => Some("TLS_AES_128_CCM_SHA256"),
            Self::TLS_AES_128_CCM_8_SHA256 => Some("TLS_AES_128_CCM_8_SHA256"),
            Self::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => {
                Some("TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256")
            }
            Self::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 => {
                Some("TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384")
            }
            Self::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 => {
                Some("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256")
            }
            Self::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 => {
                Some("TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384")
            }
            _ => None,
        }
    }
}

impl_code_display!(CipherSuite);

/// Named group for key exchange (supported_groups, key_share).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedGroup(pub u16);

impl NamedGroup {
    // Elliptic curves
    pub const SECP256R1: Self = Self(0x0017);
    pub const SECP384R1: Self = Self(0x0018);
    pub const SECP521R1: Self = Self(0x0019);
    pub const X25519: Self = Self(0x001D);
    pub const X448: Self = Self(0x001E);
    // Finite field DH
    pub const FFDHE2048: Self = Self(0x0100);
    pub const FFDHE3072: Self = Self(0x0101);
    pub const FFDHE4096: Self = Self(0x0102);
    // Hybrid post-quantum
    pub const X25519_MLKEM768: Self = Self(0x11EC);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::SECP256R1 => Some("secp256r1"),
            Self::SECP384R1 => Some("secp384r1"),
            Self::SECP521R1 => Some("secp521r1"),
            Self::X25519 => Some("x25519"),
            Self::X448 => Some("x448"),
            Self::FFDHE2048 => Some("ffdhe2048"),
            Self::FFDHE3072 => Some("ffdhe3072"),
            Self::FFDHE4096 => Some("ffdhe4096"),
            Self::X25519_MLKEM768 => Some("X25519MLKEM768"),
            _ => None,
        }
    }

    /// Size of a client key_exchange value for this group, if known.
    pub fn key_exchange_len(&self) -> Option<usize> {
        match *self {
            Self::SECP256R1 => Some(65),
            Self::SECP384R1 => Some(97),
            Self::SECP521R1 => Some(133),
            Self::X25519 => Some(32),
            Self::X448 => Some(56),
            Self::FFDHE2048 => Some(256),
            Self::FFDHE3072 => Some(384),
            Self::FFDHE4096 => Some(512),
            Self::X25519_MLKEM768 => Some(1216),
            _ => None,
        }
    }

    /// Returns true for the uncompressed-point NIST curves.
    pub fn is_nist_curve(&self) -> bool {
        matches!(*self, Self::SECP256R1 | Self::SECP384R1 | Self::SECP521R1)
    }
}

impl_code_display!(NamedGroup);

/// TLS signature scheme identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureScheme(pub u16);

impl SignatureScheme {
    pub const RSA_PKCS1_SHA256: Self = Self(0x0401);
    pub const RSA_PKCS1_SHA384: Self = Self(0x0501);
    pub const RSA_PKCS1_SHA512: Self = Self(0x0601);
    pub const ECDSA_SECP256R1_SHA256: Self = Self(0x0403);
    pub const ECDSA_SECP384R1_SHA384: Self = Self(0x0503);
    pub const ECDSA_SECP521R1_SHA512: Self = Self(0x0603);
    pub const RSA_PSS_RSAE_SHA256: Self = Self(0x0804);
    pub const RSA_PSS_RSAE_SHA384: Self = Self(0x0805);
    pub const RSA_PSS_RSAE_SHA512: Self = Self(0x0806);
    pub const ED25519: Self = Self(0x0807);
    pub const ED448: Self = Self(0x0808);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::RSA_PKCS1_SHA256 => Some("rsa_pkcs1_sha256"),
            Self::RSA_PKCS1_SHA384 => Some("rsa_pkcs1_sha384"),
            Self::RSA_PKCS1_SHA512 => Some("rsa_pkcs1_sha512"),
            Self::ECDSA_SECP256R1_SHA256 => Some("ecdsa_secp256r1_sha256"),
            Self::ECDSA_SECP384R1_SHA384 => Some("ecdsa_secp384r1_sha384"),
            Self::ECDSA_SECP521R1_SHA512 => Some("ecdsa_secp521r1_sha512"),
            Self::RSA_PSS_RSAE_SHA256 => Some("rsa_pss_rsae_sha256"),
            Self::RSA_PSS_RSAE_SHA384 => Some("rsa_pss_rsae_sha384"),
            Self::RSA_PSS_RSAE_SHA512 => Some("rsa_pss_rsae_sha512"),
            Self::ED25519 => Some("ed25519"),
            Self::ED448 => Some("ed448"),
            _ => None,
        }
    }
}

impl_code_display!(SignatureScheme);

/// PSK key exchange mode (RFC 8446 §4.2.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PskKeyExchangeMode(pub u8);

impl PskKeyExchangeMode {
    pub const PSK_KE: Self = Self(0);
    pub const PSK_DHE_KE: Self = Self(1);
}

impl fmt::Display for PskKeyExchangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PSK_KE => f.write_str("psk_ke"),
            Self::PSK_DHE_KE => f.write_str("psk_dhe_ke"),
            Self(v) => write!(f, "0x{v:02x}"),
        }
    }
}
