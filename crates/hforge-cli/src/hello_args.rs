//! ClientHello options shared by `build` and `send`.

use clap::{Args, ValueEnum};
use hforge_tls::config::{ClientHelloSpec, KeySharePolicy};
use hforge_tls::params::{parse_code, HelloParameters, KeyShareParam};
use hforge_tls::ParamField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Independent,
    ReuseFirst,
    OneToOne,
}

impl From<PolicyArg> for KeySharePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Independent => KeySharePolicy::Independent,
            PolicyArg::ReuseFirst => KeySharePolicy::ReuseFirst,
            PolicyArg::OneToOne => KeySharePolicy::OneToOne,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct HelloArgs {
    /// JSON request file; flags below override its fields.
    #[arg(short, long)]
    pub params: Option<String>,
    /// SNI host name.
    #[arg(long = "sni")]
    pub server_name: Option<String>,
    /// Cipher suites, comma separated (0x1301,0x1302).
    #[arg(long, value_delimiter = ',')]
    pub ciphers: Vec<String>,
    /// Supported groups, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,
    /// Signature algorithms, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub sigalgs: Vec<String>,
    /// supported_versions entries, comma separated.
    #[arg(long = "tls-versions", value_delimiter = ',')]
    pub versions: Vec<String>,
    /// Key share groups, comma separated.
    #[arg(long = "key-shares", value_delimiter = ',')]
    pub key_shares: Vec<String>,
    /// Pairing of key share groups with exchange material.
    #[arg(long = "key-share-policy", value_enum)]
    pub key_share_policy: Option<PolicyArg>,
    /// Client random as 64 hex characters.
    #[arg(long = "client-random")]
    pub client_random: Option<String>,
    /// Legacy session id as hex.
    #[arg(long = "session-id")]
    pub session_id: Option<String>,
    /// Insert GREASE values.
    #[arg(long)]
    pub grease: bool,
    /// Record-layer version for the outer record (e.g. 0x0301).
    #[arg(long = "record-version")]
    pub record_version: Option<String>,
}

impl HelloArgs {
    /// Merge the request file (if any) with flag overrides.
    pub fn parameters(&self) -> Result<HelloParameters, Box<dyn std::error::Error>> {
        let mut params = match &self.params {
            Some(path) => HelloParameters::from_file(path)
                .map_err(|e| format!("cannot load parameters from '{path}': {e}"))?,
            None => HelloParameters::default(),
        };
        if let Some(name) = &self.server_name {
            params.server_name = Some(name.clone());
        }
        if !self.ciphers.is_empty() {
            params.cipher_suites = self.ciphers.clone();
        }
        if !self.groups.is_empty() {
            params.supported_groups = self.groups.clone();
        }
        if !self.sigalgs.is_empty() {
            params.signature_algorithms = self.sigalgs.clone();
        }
        if !self.versions.is_empty() {
            params.tls_versions = self.versions.clone();
        }
        if !self.key_shares.is_empty() {
            params.key_shares = self
                .key_shares
                .iter()
                .cloned()
                .map(KeyShareParam::Group)
                .collect();
        }
        if let Some(policy) = self.key_share_policy {
            params.key_share_policy = Some(policy.into());
        }
        if let Some(random) = &self.client_random {
            params.client_random = Some(random.clone());
        }
        if let Some(id) = &self.session_id {
            params.session_id = Some(id.clone());
        }
        params.grease |= self.grease;
        Ok(params)
    }

    pub fn spec(&self) -> Result<(HelloParameters, ClientHelloSpec), Box<dyn std::error::Error>> {
        let params = self.parameters()?;
        let mut spec = ClientHelloSpec::from_parameters(&params)?;
        if let Some(v) = &self.record_version {
            spec.record_version = parse_code(ParamField::ProtocolVersion, v)?;
        }
        Ok((params, spec))
    }
}
