//! Textual hello parameters: `"0xHHHH"` protocol codes, hex byte fields and
//! the JSON request shape accepted by the CLI.

use crate::config::{ClientHelloSpec, KeySharePolicy};
use hforge_types::{
    CipherSuite, CodecError, CodecResult, NamedGroup, ParamField, ProtocolVersion,
    SignatureScheme,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default port when a request names none.
pub const DEFAULT_PORT: u16 = 443;

/// Translate one `"0xHHHH"` token. The prefix is a lowercase `0x` followed by
/// exactly four hex digits; anything else names `field` and the raw token.
pub fn parse_code(field: ParamField, s: &str) -> CodecResult<u16> {
    let digits = s
        .strip_prefix("0x")
        .filter(|d| d.len() == 4 && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| CodecError::invalid_parameter(field, s))?;
    u16::from_str_radix(digits, 16).map_err(|_| CodecError::invalid_parameter(field, s))
}

/// Translate a list of tokens; the first bad token fails the whole list.
pub fn parse_codes<S: AsRef<str>>(field: ParamField, tokens: &[S]) -> CodecResult<Vec<u16>> {
    tokens
        .iter()
        .map(|t| parse_code(field, t.as_ref()))
        .collect()
}

/// Render a code in the same `"0xHHHH"` convention.
pub fn format_code(code: u16) -> String {
    format!("0x{code:04x}")
}

/// Decode a hex-encoded 32-byte client random.
pub fn parse_client_random(s: &str) -> CodecResult<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out)
        .map_err(|_| CodecError::invalid_parameter(ParamField::ClientRandom, s))?;
    Ok(out)
}

/// Decode a hex-encoded legacy session id (at most 32 bytes).
pub fn parse_session_id(s: &str) -> CodecResult<Vec<u8>> {
    match hex::decode(s) {
        Ok(id) if id.len() <= 32 => Ok(id),
        _ => Err(CodecError::invalid_parameter(ParamField::SessionId, s)),
    }
}

/// A requested key share: a bare group code, or a group with hex-encoded
/// exchange material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyShareParam {
    Group(String),
    Entry {
        group: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },
}

impl KeyShareParam {
    fn group(&self) -> &str {
        match self {
            KeyShareParam::Group(g) => g,
            KeyShareParam::Entry { group, .. } => group,
        }
    }

    fn data(&self) -> Option<&str> {
        match self {
            KeyShareParam::Group(_) => None,
            KeyShareParam::Entry { data, .. } => data.as_deref().filter(|d| !d.is_empty()),
        }
    }
}

/// A hello request as supplied from outside: JSON with camelCase keys,
/// codes in `"0xHHHH"` form and byte fields in hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelloParameters {
    /// Host to connect to; falls back to `server_name`.
    pub server: Option<String>,
    pub port: Option<u16>,
    pub server_name: Option<String>,
    pub cipher_suites: Vec<String>,
    pub supported_groups: Vec<String>,
    pub signature_algorithms: Vec<String>,
    pub tls_versions: Vec<String>,
    /// Single-version form, used when `tls_versions` is empty.
    pub protocol_version: Option<String>,
    pub key_shares: Vec<KeyShareParam>,
    pub key_share_policy: Option<KeySharePolicy>,
    pub client_random: Option<String>,
    pub session_id: Option<String>,
    pub grease: bool,
}

impl HelloParameters {
    pub fn from_json(s: &str) -> CodecResult<Self> {
        serde_json::from_str(s).map_err(|e| CodecError::malformed("hello parameters", e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> CodecResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// `(host, port)` the request targets, if it names one.
    pub fn target(&self) -> Option<(String, u16)> {
        let host = self
            .server
            .as_deref()
            .or(self.server_name.as_deref())
            .filter(|h| !h.is_empty())?;
        Some((host.to_string(), self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Translate into a validated [`ClientHelloSpec`], starting from the
    /// builder defaults for any list left empty.
    pub fn to_spec(&self) -> CodecResult<ClientHelloSpec> {
        let mut builder = ClientHelloSpec::builder().grease(self.grease);

        if let Some(name) = self.server_name.as_deref() {
            builder = builder.server_name(name);
        }
        if !self.cipher_suites.is_empty() {
            let suites: Vec<_> = parse_codes(ParamField::CipherSuite, &self.cipher_suites)?
                .into_iter()
                .map(CipherSuite)
                .collect();
            builder = builder.cipher_suites(&suites);
        }
        if !self.supported_groups.is_empty() {
            let groups: Vec<_> = parse_codes(ParamField::SupportedGroup, &self.supported_groups)?
                .into_iter()
                .map(NamedGroup)
                .collect();
            builder = builder.supported_groups(&groups);
        }
        if !self.signature_algorithms.is_empty() {
            let schemes: Vec<_> =
                parse_codes(ParamField::SignatureAlgorithm, &self.signature_algorithms)?
                    .into_iter()
                    .map(SignatureScheme)
                    .collect();
            builder = builder.signature_algorithms(&schemes);
        }

        let mut version_tokens = self.tls_versions.clone();
        if version_tokens.is_empty() {
            version_tokens.extend(self.protocol_version.iter().cloned());
        }
        if !version_tokens.is_empty() {
            let versions: Vec<_> = parse_codes(ParamField::ProtocolVersion, &version_tokens)?
                .into_iter()
                .map(ProtocolVersion)
                .collect();
            builder = builder.supported_versions(&versions);
        }

        if !self.key_shares.is_empty() {
            let groups = self
                .key_shares
                .iter()
                .map(|ks| parse_code(ParamField::KeyShareGroup, ks.group()).map(NamedGroup))
                .collect::<CodecResult<Vec<_>>>()?;
            builder = builder.key_share_groups(&groups);

            let supplied: Vec<&str> = self.key_shares.iter().filter_map(|ks| ks.data()).collect();
            // Reuse is inferred only when the single value sits on the first
            // entry; a value elsewhere must not move onto another group.
            let first_only = self.key_shares[0].data().is_some() && supplied.len() == 1;
            let policy = match self.key_share_policy {
                Some(p) => p,
                None if supplied.is_empty() => KeySharePolicy::Independent,
                None if first_only && groups.len() > 1 => KeySharePolicy::ReuseFirst,
                None => KeySharePolicy::OneToOne,
            };
            builder = builder.key_share_policy(policy);
            for data in supplied {
                let bytes = hex::decode(data)
                    .map_err(|_| CodecError::invalid_parameter(ParamField::KeyShareGroup, data))?;
                builder = builder.key_share_material(bytes);
            }
        } else if let Some(policy) = self.key_share_policy {
            builder = builder.key_share_policy(policy);
        }

        if let Some(random) = self.client_random.as_deref().filter(|r| !r.is_empty()) {
            builder = builder.client_random(parse_client_random(random)?);
        }
        if let Some(id) = self.session_id.as_deref().filter(|s| !s.is_empty()) {
            builder = builder.session_id(&parse_session_id(id)?);
        }

        let spec = builder.build();
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code(ParamField::CipherSuite, "0x1301").unwrap(), 4865);
        assert_eq!(parse_code(ParamField::SupportedGroup, "0x001d").unwrap(), 0x001d);
        assert_eq!(parse_code(ParamField::SupportedGroup, "0x001D").unwrap(), 0x001d);
        assert_eq!(parse_code(ParamField::ProtocolVersion, "0xffff").unwrap(), 0xffff);
    }

    #[test]
    fn test_parse_code_rejects_malformed() {
        for bad in ["0xzz01", "1301", "0x130", "0x13011", "0X1301", "", "0x", " 0x1301", "0x+301"] {
            match parse_code(ParamField::CipherSuite, bad) {
                Err(CodecError::InvalidParameter { field, value }) => {
                    assert_eq!(field, ParamField::CipherSuite);
                    assert_eq!(value, bad);
                }
                other => panic!("{bad:?}: expected InvalidParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_codes_names_offending_token() {
        let err = parse_codes(ParamField::SignatureAlgorithm, &["0x0403", "0x08g4"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid signature algorithm: \"0x08g4\"");
        assert_eq!(
            parse_codes(ParamField::SupportedGroup, &["0x001d", "0x0017"]).unwrap(),
            vec![0x001d, 0x0017]
        );
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(0x1301), "0x1301");
        assert_eq!(format_code(0x001d), "0x001d");
    }

    #[test]
    fn test_client_random() {
        let hex_random = "ab".repeat(32);
        assert_eq!(parse_client_random(&hex_random).unwrap(), [0xab; 32]);
        assert!(matches!(
            parse_client_random("abcd"),
            Err(CodecError::InvalidParameter {
                field: ParamField::ClientRandom,
                ..
            })
        ));
        assert!(parse_client_random(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_session_id() {
        assert_eq!(parse_session_id("0102").unwrap(), vec![1, 2]);
        assert!(parse_session_id(&"00".repeat(33)).is_err());
        assert!(parse_session_id("0").is_err());
    }

    #[test]
    fn test_from_json_full_request() {
        let json = r#"{
            "server": "127.0.0.1",
            "port": 8443,
            "serverName": "example.com",
            "cipherSuites": ["0x1301", "0x1302"],
            "supportedGroups": ["0x001d"],
            "signatureAlgorithms": ["0x0403", "0x0807"],
            "tlsVersions": ["0x0304"],
            "keyShares": [{"group": "0x001d"}],
            "clientRandom": ""
        }"#;
        let params = HelloParameters::from_json(json).unwrap();
        assert_eq!(params.target(), Some(("127.0.0.1".to_string(), 8443)));

        let spec = params.to_spec().unwrap();
        assert_eq!(spec.server_name.as_deref(), Some("example.com"));
        assert_eq!(
            spec.cipher_suites,
            vec![
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_AES_256_GCM_SHA384
            ]
        );
        assert_eq!(spec.signature_algorithms[1], SignatureScheme::ED25519);
        assert_eq!(spec.key_share_groups, vec![NamedGroup::X25519]);
        assert_eq!(spec.key_share_policy, KeySharePolicy::Independent);
        assert!(spec.client_random.is_none());
    }

    #[test]
    fn test_bare_group_strings_and_protocol_version() {
        let json = r#"{
            "serverName": "example.org",
            "keyShares": ["0x001d", "0x0017"],
            "protocolVersion": "0x0304"
        }"#;
        let params = HelloParameters::from_json(json).unwrap();
        assert_eq!(params.target(), Some(("example.org".to_string(), DEFAULT_PORT)));
        let spec = params.to_spec().unwrap();
        assert_eq!(spec.supported_versions, vec![ProtocolVersion::TLS13]);
        assert_eq!(spec.key_share_groups.len(), 2);
    }

    #[test]
    fn test_single_supplied_share_reused() {
        let json = format!(
            r#"{{"keyShares": [{{"group": "0x001d", "data": "{}"}}, {{"group": "0x0017"}}]}}"#,
            "11".repeat(32)
        );
        let spec = HelloParameters::from_json(&json).unwrap().to_spec().unwrap();
        assert_eq!(spec.key_share_policy, KeySharePolicy::ReuseFirst);
        assert_eq!(spec.key_share_material, vec![vec![0x11; 32]]);
    }

    #[test]
    fn test_lone_share_on_later_entry_not_reused() {
        let json = format!(
            r#"{{"keyShares": [{{"group": "0x001d"}}, {{"group": "0x0017", "data": "{}"}}]}}"#,
            "04".repeat(65)
        );
        let params = HelloParameters::from_json(&json).unwrap();
        assert!(matches!(
            params.to_spec(),
            Err(CodecError::InvalidParameter {
                field: ParamField::KeyShareGroup,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_server_name_passed_through() {
        let spec = HelloParameters::from_json(r#"{"serverName": ""}"#)
            .unwrap()
            .to_spec()
            .unwrap();
        assert_eq!(spec.server_name.as_deref(), Some(""));
    }

    #[test]
    fn test_explicit_policy_enforced() {
        let json = format!(
            r#"{{"keySharePolicy": "one-to-one",
                "keyShares": [{{"group": "0x001d", "data": "{}"}}, {{"group": "0x0017"}}]}}"#,
            "11".repeat(32)
        );
        let err = HelloParameters::from_json(&json).unwrap().to_spec().unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidParameter {
                field: ParamField::KeyShareGroup,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_code_in_request() {
        let params = HelloParameters {
            cipher_suites: vec!["0x1301".into(), "0xzz01".into()],
            ..Default::default()
        };
        match params.to_spec() {
            Err(CodecError::InvalidParameter { field, value }) => {
                assert_eq!(field, ParamField::CipherSuite);
                assert_eq!(value, "0xzz01");
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }

        let params = HelloParameters {
            client_random: Some("00".repeat(31)),
            ..Default::default()
        };
        assert!(matches!(
            params.to_spec(),
            Err(CodecError::InvalidParameter {
                field: ParamField::ClientRandom,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            HelloParameters::from_json("{\"port\": \"x\"}"),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        let spec = HelloParameters::from_json("{}").unwrap().to_spec().unwrap();
        assert_eq!(spec, ClientHelloSpec::builder().build());
    }
}
