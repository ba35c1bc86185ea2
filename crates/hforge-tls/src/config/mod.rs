//! ClientHello specification: the validated input to hello assembly.

use crate::extensions::{
    build_grease_extension, build_key_share, build_psk_key_exchange_modes,
    build_server_name, build_signature_algorithms, build_supported_groups,
    build_supported_versions, grease_value, Extension, MAX_EXTENSION_DATA_LENGTH,
};
use crate::handshake::ClientHello;
use crate::keyshare::{assign_key_shares, KeyShareMaterial, KeyShareSource};
use crate::params::HelloParameters;
use crate::random::RandomSource;
use crate::record::LEGACY_RECORD_VERSION;
use hforge_types::{
    CipherSuite, CodecError, CodecResult, NamedGroup, ParamField, ProtocolVersion,
    PskKeyExchangeMode, SignatureScheme,
};
use tracing::debug;

pub use crate::keyshare::KeySharePolicy;

/// Everything needed to assemble one ClientHello.
///
/// Extensions are emitted in a fixed order: server_name, supported_versions,
/// psk_key_exchange_modes, signature_algorithms, supported_groups,
/// key_share, then `extra_extensions`. An empty list omits its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHelloSpec {
    pub server_name: Option<String>,
    pub legacy_version: ProtocolVersion,
    pub cipher_suites: Vec<CipherSuite>,
    pub supported_groups: Vec<NamedGroup>,
    pub signature_algorithms: Vec<SignatureScheme>,
    pub supported_versions: Vec<ProtocolVersion>,
    pub psk_modes: Vec<PskKeyExchangeMode>,
    pub key_share_groups: Vec<NamedGroup>,
    /// Caller-supplied key_exchange values, interpreted per `key_share_policy`.
    pub key_share_material: Vec<Vec<u8>>,
    pub key_share_policy: KeySharePolicy,
    pub client_random: Option<[u8; 32]>,
    pub session_id: Vec<u8>,
    pub compression_methods: Vec<u8>,
    pub grease: bool,
    pub extra_extensions: Vec<Extension>,
    /// Version stamped on the outer handshake record(s).
    pub record_version: u16,
}

impl ClientHelloSpec {
    /// Create a new spec builder with defaults.
    pub fn builder() -> ClientHelloSpecBuilder {
        ClientHelloSpecBuilder::default()
    }

    /// Translate a textual request; see [`HelloParameters::to_spec`].
    pub fn from_parameters(params: &HelloParameters) -> CodecResult<Self> {
        params.to_spec()
    }

    /// Check every field against its wire limit.
    pub fn validate(&self) -> CodecResult<()> {
        if let Some(name) = &self.server_name {
            // list_length(2) + name_type(1) + host_name_length(2)
            if name.len() > MAX_EXTENSION_DATA_LENGTH - 5 {
                return Err(CodecError::invalid_parameter(
                    ParamField::ServerName,
                    name.clone(),
                ));
            }
        }
        if self.session_id.len() > u8::MAX as usize {
            return Err(CodecError::invalid_parameter(
                ParamField::SessionId,
                hex::encode(&self.session_id),
            ));
        }
        if self.supported_versions.len() > 127 {
            return Err(CodecError::invalid_parameter(
                ParamField::ProtocolVersion,
                format!("{} versions", self.supported_versions.len()),
            ));
        }
        let too_many = |n: usize| n * 2 > MAX_EXTENSION_DATA_LENGTH - 2;
        if too_many(self.cipher_suites.len()) {
            return Err(CodecError::invalid_parameter(
                ParamField::CipherSuite,
                format!("{} cipher suites", self.cipher_suites.len()),
            ));
        }
        if too_many(self.supported_groups.len()) {
            return Err(CodecError::invalid_parameter(
                ParamField::SupportedGroup,
                format!("{} groups", self.supported_groups.len()),
            ));
        }
        if too_many(self.signature_algorithms.len()) {
            return Err(CodecError::invalid_parameter(
                ParamField::SignatureAlgorithm,
                format!("{} signature algorithms", self.signature_algorithms.len()),
            ));
        }
        let supplied_ok = match self.key_share_policy {
            KeySharePolicy::Independent => self.key_share_material.is_empty(),
            KeySharePolicy::ReuseFirst => self.key_share_material.len() <= 1,
            KeySharePolicy::OneToOne => {
                self.key_share_material.len() == self.key_share_groups.len()
            }
        };
        if !supplied_ok {
            return Err(CodecError::invalid_parameter(
                ParamField::KeyShareGroup,
                format!(
                    "{:?} policy with {} groups and {} supplied key shares",
                    self.key_share_policy,
                    self.key_share_groups.len(),
                    self.key_share_material.len()
                ),
            ));
        }
        Ok(())
    }

    /// Assemble the ClientHello described by this spec.
    ///
    /// `rng` supplies the hello random (unless overridden) and GREASE picks;
    /// `key_shares` supplies exchange material under the configured policy.
    pub fn build_client_hello(
        &self,
        rng: &mut dyn RandomSource,
        key_shares: &mut dyn KeyShareSource,
    ) -> CodecResult<BuiltClientHello> {
        self.validate()?;

        let materials = assign_key_shares(
            self.key_share_policy,
            &self.key_share_groups,
            &self.key_share_material,
            key_shares,
        )?;

        let grease = if self.grease {
            Some(GreaseValues {
                cipher_suite: grease_value(rng)?,
                extension: grease_value(rng)?,
                group: grease_value(rng)?,
                version: grease_value(rng)?,
            })
        } else {
            None
        };

        let extensions = self.extensions(&materials, grease.as_ref())?;
        let mut hello = ClientHello::new(rng, extensions)?;
        hello.legacy_version = self.legacy_version;
        hello.legacy_session_id = self.session_id.clone();
        hello.legacy_compression_methods = self.compression_methods.clone();
        hello.cipher_suites = match &grease {
            Some(g) => std::iter::once(CipherSuite(g.cipher_suite))
                .chain(self.cipher_suites.iter().copied())
                .collect(),
            None => self.cipher_suites.clone(),
        };
        if let Some(random) = self.client_random {
            hello.set_random(random);
        }

        debug!(
            server_name = self.server_name.as_deref().unwrap_or(""),
            cipher_suites = hello.cipher_suites.len(),
            extensions = hello.extensions.len(),
            key_shares = materials.len(),
            "built ClientHello"
        );

        Ok(BuiltClientHello {
            hello,
            key_shares: materials,
            record_version: self.record_version,
        })
    }

    fn extensions(
        &self,
        materials: &[KeyShareMaterial],
        grease: Option<&GreaseValues>,
    ) -> CodecResult<Vec<Extension>> {
        let mut exts = Vec::new();
        if let Some(g) = grease {
            exts.push(build_grease_extension(g.extension));
        }
        if let Some(name) = &self.server_name {
            exts.push(build_server_name(name)?);
        }
        if !self.supported_versions.is_empty() {
            let mut versions = Vec::with_capacity(self.supported_versions.len() + 1);
            if let Some(g) = grease {
                versions.push(ProtocolVersion(g.version));
            }
            versions.extend_from_slice(&self.supported_versions);
            exts.push(build_supported_versions(&versions)?);
        }
        if !self.psk_modes.is_empty() {
            exts.push(build_psk_key_exchange_modes(&self.psk_modes)?);
        }
        if !self.signature_algorithms.is_empty() {
            exts.push(build_signature_algorithms(&self.signature_algorithms)?);
        }
        if !self.supported_groups.is_empty() {
            let mut groups = Vec::with_capacity(self.supported_groups.len() + 1);
            if let Some(g) = grease {
                groups.push(NamedGroup(g.group));
            }
            groups.extend_from_slice(&self.supported_groups);
            exts.push(build_supported_groups(&groups)?);
        }
        if !materials.is_empty() {
            let entries: Vec<_> = materials.iter().map(KeyShareMaterial::entry).collect();
            exts.push(build_key_share(&entries)?);
        }
        exts.extend(self.extra_extensions.iter().cloned());
        Ok(exts)
    }
}

struct GreaseValues {
    cipher_suite: u16,
    extension: u16,
    group: u16,
    version: u16,
}

/// An assembled ClientHello together with the key material behind its key shares.
#[derive(Debug, Clone)]
pub struct BuiltClientHello {
    pub hello: ClientHello,
    pub key_shares: Vec<KeyShareMaterial>,
    pub record_version: u16,
}

impl BuiltClientHello {
    /// `record(handshake(client_hello))`, ready for the transport.
    pub fn to_record_bytes(&self) -> CodecResult<Vec<u8>> {
        self.hello.to_record_bytes_with_version(self.record_version)
    }
}

/// Builder for `ClientHelloSpec`.
#[derive(Debug, Clone)]
pub struct ClientHelloSpecBuilder {
    spec: ClientHelloSpec,
}

impl Default for ClientHelloSpecBuilder {
    fn default() -> Self {
        Self {
            spec: ClientHelloSpec {
                server_name: None,
                legacy_version: ProtocolVersion::TLS12,
                cipher_suites: vec![CipherSuite::TLS_AES_128_GCM_SHA256],
                supported_groups: vec![NamedGroup::X25519],
                signature_algorithms: vec![
                    SignatureScheme::ECDSA_SECP256R1_SHA256,
                    SignatureScheme::RSA_PSS_RSAE_SHA256,
                    SignatureScheme::RSA_PKCS1_SHA256,
                    SignatureScheme::ED25519,
                ],
                supported_versions: vec![ProtocolVersion::TLS13],
                psk_modes: vec![PskKeyExchangeMode::PSK_DHE_KE],
                key_share_groups: vec![NamedGroup::X25519],
                key_share_material: Vec::new(),
                key_share_policy: KeySharePolicy::Independent,
                client_random: None,
                session_id: Vec::new(),
                compression_methods: vec![0x00],
                grease: false,
                extra_extensions: Vec::new(),
                record_version: LEGACY_RECORD_VERSION,
            },
        }
    }
}

impl ClientHelloSpecBuilder {
    pub fn server_name(mut self, name: &str) -> Self {
        self.spec.server_name = Some(name.to_string());
        self
    }

    pub fn no_server_name(mut self) -> Self {
        self.spec.server_name = None;
        self
    }

    pub fn legacy_version(mut self, version: ProtocolVersion) -> Self {
        self.spec.legacy_version = version;
        self
    }

    pub fn cipher_suites(mut self, suites: &[CipherSuite]) -> Self {
        self.spec.cipher_suites = suites.to_vec();
        self
    }

    pub fn supported_groups(mut self, groups: &[NamedGroup]) -> Self {
        self.spec.supported_groups = groups.to_vec();
        self
    }

    pub fn signature_algorithms(mut self, schemes: &[SignatureScheme]) -> Self {
        self.spec.signature_algorithms = schemes.to_vec();
        self
    }

    pub fn supported_versions(mut self, versions: &[ProtocolVersion]) -> Self {
        self.spec.supported_versions = versions.to_vec();
        self
    }

    pub fn psk_modes(mut self, modes: &[PskKeyExchangeMode]) -> Self {
        self.spec.psk_modes = modes.to_vec();
        self
    }

    pub fn key_share_groups(mut self, groups: &[NamedGroup]) -> Self {
        self.spec.key_share_groups = groups.to_vec();
        self
    }

    /// Add one caller-supplied key_exchange value.
    pub fn key_share_material(mut self, public: Vec<u8>) -> Self {
        self.spec.key_share_material.push(public);
        self
    }

    pub fn key_share_policy(mut self, policy: KeySharePolicy) -> Self {
        self.spec.key_share_policy = policy;
        self
    }

    pub fn client_random(mut self, random: [u8; 32]) -> Self {
        self.spec.client_random = Some(random);
        self
    }

    pub fn session_id(mut self, id: &[u8]) -> Self {
        self.spec.session_id = id.to_vec();
        self
    }

    pub fn compression_methods(mut self, methods: &[u8]) -> Self {
        self.spec.compression_methods = methods.to_vec();
        self
    }

    pub fn grease(mut self, enabled: bool) -> Self {
        self.spec.grease = enabled;
        self
    }

    pub fn extension(mut self, ext: Extension) -> Self {
        self.spec.extra_extensions.push(ext);
        self
    }

    pub fn record_version(mut self, version: u16) -> Self {
        self.spec.record_version = version;
        self
    }

    pub fn build(self) -> ClientHelloSpec {
        self.spec
    }
}
