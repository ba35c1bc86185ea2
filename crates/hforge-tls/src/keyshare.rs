//! Key share exchange material and the policy pairing it with requested groups.
//!
//! Only X25519 produces a usable key pair. Other groups get correctly sized
//! random placeholders (an uncompressed-point prefix for the NIST curves):
//! enough for fingerprinting and parser testing, not for completing a
//! handshake.

use crate::extensions::KeyShareEntry;
use crate::random::RandomSource;
use hforge_types::{CodecError, CodecResult, NamedGroup, ParamField};
use serde::{Deserialize, Serialize};
use tracing::debug;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Length used for groups without a known key_exchange size.
pub const DEFAULT_PLACEHOLDER_LEN: usize = 32;

/// Exchange material for one key share entry.
#[derive(Clone)]
pub struct KeyShareMaterial {
    pub group: NamedGroup,
    pub public: Vec<u8>,
    private: Option<Zeroizing<Vec<u8>>>,
}

impl KeyShareMaterial {
    /// Material supplied by the caller; no private half is held.
    pub fn from_public(group: NamedGroup, public: impl Into<Vec<u8>>) -> Self {
        Self {
            group,
            public: public.into(),
            private: None,
        }
    }

    /// The private key, when this material was generated locally.
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private.as_deref().map(|v| v.as_slice())
    }

    pub fn entry(&self) -> KeyShareEntry {
        KeyShareEntry::new(self.group, self.public.clone())
    }

    fn regroup(&self, group: NamedGroup) -> Self {
        Self {
            group,
            public: self.public.clone(),
            private: self.private.clone(),
        }
    }
}

impl std::fmt::Debug for KeyShareMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyShareMaterial")
            .field("group", &self.group)
            .field("public", &hex::encode(&self.public))
            .field("has_private", &self.private.is_some())
            .finish()
    }
}

/// Produces exchange material for a group.
pub trait KeyShareSource {
    fn generate(&mut self, group: NamedGroup) -> CodecResult<KeyShareMaterial>;
}

/// Fresh material per call, drawn from a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct EphemeralKeyShares<R> {
    rng: R,
}

impl<R: RandomSource> EphemeralKeyShares<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RandomSource> KeyShareSource for EphemeralKeyShares<R> {
    fn generate(&mut self, group: NamedGroup) -> CodecResult<KeyShareMaterial> {
        if group == NamedGroup::X25519 {
            let mut seed = Zeroizing::new([0u8; 32]);
            self.rng.fill(&mut seed[..])?;
            let secret = StaticSecret::from(*seed);
            let public = PublicKey::from(&secret);
            debug!(%group, "generated x25519 key share");
            return Ok(KeyShareMaterial {
                group,
                public: public.as_bytes().to_vec(),
                private: Some(Zeroizing::new(secret.to_bytes().to_vec())),
            });
        }

        let len = group.key_exchange_len().unwrap_or(DEFAULT_PLACEHOLDER_LEN);
        let mut public = vec![0u8; len];
        self.rng.fill(&mut public)?;
        if group.is_nist_curve() {
            public[0] = 0x04;
        }
        debug!(%group, len, "generated placeholder key share");
        Ok(KeyShareMaterial::from_public(group, public))
    }
}

/// How requested key share groups are paired with exchange material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeySharePolicy {
    /// Generate independent material for every group. Caller-supplied
    /// material is rejected.
    #[default]
    Independent,
    /// Use one material (the single supplied value, or one generated for the
    /// first group) for every group.
    ReuseFirst,
    /// Exactly one supplied material per group, in order.
    OneToOne,
}

fn mismatch(groups: usize, supplied: usize) -> CodecError {
    CodecError::invalid_parameter(
        ParamField::KeyShareGroup,
        format!("{groups} groups with {supplied} supplied key shares"),
    )
}

/// Pair each group with exchange material according to `policy`.
pub fn assign_key_shares(
    policy: KeySharePolicy,
    groups: &[NamedGroup],
    supplied: &[Vec<u8>],
    source: &mut dyn KeyShareSource,
) -> CodecResult<Vec<KeyShareMaterial>> {
    match policy {
        KeySharePolicy::Independent => {
            if !supplied.is_empty() {
                return Err(mismatch(groups.len(), supplied.len()));
            }
            groups.iter().map(|&g| source.generate(g)).collect()
        }
        KeySharePolicy::ReuseFirst => {
            let Some(&first) = groups.first() else {
                return if supplied.is_empty() {
                    Ok(Vec::new())
                } else {
                    Err(mismatch(0, supplied.len()))
                };
            };
            let shared = match supplied {
                [] => source.generate(first)?,
                [one] => KeyShareMaterial::from_public(first, one.clone()),
                _ => return Err(mismatch(groups.len(), supplied.len())),
            };
            if groups.len() > 1 {
                debug!(groups = groups.len(), "reusing one key share for all groups");
            }
            Ok(groups.iter().map(|&g| shared.regroup(g)).collect())
        }
        KeySharePolicy::OneToOne => {
            if supplied.len() != groups.len() {
                return Err(mismatch(groups.len(), supplied.len()));
            }
            Ok(groups
                .iter()
                .zip(supplied)
                .map(|(&g, public)| KeyShareMaterial::from_public(g, public.clone()))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, OsRandom};

    #[test]
    fn test_x25519_material() {
        let mut source = EphemeralKeyShares::new(FixedRandom::new(vec![0x11]));
        let m = source.generate(NamedGroup::X25519).unwrap();
        assert_eq!(m.public.len(), 32);
        let private = m.private_key().unwrap();
        assert_eq!(private.len(), 32);

        let secret = StaticSecret::from(<[u8; 32]>::try_from(private).unwrap());
        assert_eq!(PublicKey::from(&secret).as_bytes().to_vec(), m.public);
    }

    #[test]
    fn test_placeholder_sizes() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let p256 = source.generate(NamedGroup::SECP256R1).unwrap();
        assert_eq!(p256.public.len(), 65);
        assert_eq!(p256.public[0], 0x04);
        assert!(p256.private_key().is_none());

        let ffdhe = source.generate(NamedGroup::FFDHE2048).unwrap();
        assert_eq!(ffdhe.public.len(), 256);

        let unknown = source.generate(NamedGroup(0x7777)).unwrap();
        assert_eq!(unknown.public.len(), DEFAULT_PLACEHOLDER_LEN);
    }

    #[test]
    fn test_independent_material_per_group() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let groups = [NamedGroup::X25519, NamedGroup::X25519, NamedGroup::SECP256R1];
        let shares =
            assign_key_shares(KeySharePolicy::Independent, &groups, &[], &mut source).unwrap();
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].group, NamedGroup::X25519);
        assert_ne!(shares[0].public, shares[1].public);
        assert_eq!(shares[2].group, NamedGroup::SECP256R1);
    }

    #[test]
    fn test_independent_rejects_supplied() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let err = assign_key_shares(
            KeySharePolicy::Independent,
            &[NamedGroup::X25519],
            &[vec![1; 32]],
            &mut source,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidParameter {
                field: ParamField::KeyShareGroup,
                ..
            }
        ));
    }

    #[test]
    fn test_reuse_first_generated() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let groups = [NamedGroup::X25519, NamedGroup::SECP256R1];
        let shares =
            assign_key_shares(KeySharePolicy::ReuseFirst, &groups, &[], &mut source).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].public, shares[1].public);
        assert_eq!(shares[1].group, NamedGroup::SECP256R1);
        assert_eq!(shares[0].public.len(), 32);
    }

    #[test]
    fn test_reuse_first_supplied() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let groups = [NamedGroup::X25519, NamedGroup::X448];
        let shares = assign_key_shares(
            KeySharePolicy::ReuseFirst,
            &groups,
            &[vec![0xab; 32]],
            &mut source,
        )
        .unwrap();
        assert!(shares.iter().all(|s| s.public == vec![0xab; 32]));

        assert!(assign_key_shares(
            KeySharePolicy::ReuseFirst,
            &groups,
            &[vec![1], vec![2], vec![3]],
            &mut source,
        )
        .is_err());
    }

    #[test]
    fn test_one_to_one() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        let groups = [NamedGroup::X25519, NamedGroup::SECP256R1];
        let shares = assign_key_shares(
            KeySharePolicy::OneToOne,
            &groups,
            &[vec![1; 32], vec![2; 65]],
            &mut source,
        )
        .unwrap();
        assert_eq!(shares[0].entry(), KeyShareEntry::new(NamedGroup::X25519, vec![1; 32]));
        assert_eq!(shares[1].public, vec![2; 65]);

        assert!(assign_key_shares(
            KeySharePolicy::OneToOne,
            &groups,
            &[vec![1; 32]],
            &mut source,
        )
        .is_err());
    }

    #[test]
    fn test_no_groups() {
        let mut source = EphemeralKeyShares::new(OsRandom);
        for policy in [
            KeySharePolicy::Independent,
            KeySharePolicy::ReuseFirst,
            KeySharePolicy::OneToOne,
        ] {
            assert!(assign_key_shares(policy, &[], &[], &mut source)
                .unwrap()
                .is_empty());
        }
    }
}
