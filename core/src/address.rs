// Address Prefix Table
// ====================
//
// Every text address starts with a network- and kind-specific byte prefix. The Base58Check
// alphabet and checksum are an external primitive; this module only decides which bytes go
// in front of the payload, and which kind a set of leading bytes belongs to.

use bitcoin::base58;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::ConfigurationError, params::NetworkId};

/// The closed set of address kinds a network assigns a prefix to
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    PubkeyAddress,
    ScriptAddress,
    SecretKey,
    StealthAddress,
    ExtPublicKey,
    ExtSecretKey,
    ExtKeyHash,
    ExtAccHash,
    /// BIP32 public key prefix shared with Bitcoin wallets, for import/export only
    ExtPublicKeyBtc,
    /// BIP32 secret key prefix shared with Bitcoin wallets, for import/export only
    ExtSecretKeyBtc,
}

impl AddressKind {
    pub const COUNT: usize = 10;

    pub const ALL: [AddressKind; AddressKind::COUNT] = [
        AddressKind::PubkeyAddress,
        AddressKind::ScriptAddress,
        AddressKind::SecretKey,
        AddressKind::StealthAddress,
        AddressKind::ExtPublicKey,
        AddressKind::ExtSecretKey,
        AddressKind::ExtKeyHash,
        AddressKind::ExtAccHash,
        AddressKind::ExtPublicKeyBtc,
        AddressKind::ExtSecretKeyBtc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AddressKind::PubkeyAddress => "pubkey-address",
            AddressKind::ScriptAddress => "script-address",
            AddressKind::SecretKey => "secret-key",
            AddressKind::StealthAddress => "stealth-address",
            AddressKind::ExtPublicKey => "ext-public-key",
            AddressKind::ExtSecretKey => "ext-secret-key",
            AddressKind::ExtKeyHash => "ext-key-hash",
            AddressKind::ExtAccHash => "ext-acc-hash",
            AddressKind::ExtPublicKeyBtc => "ext-public-key-btc",
            AddressKind::ExtSecretKeyBtc => "ext-secret-key-btc",
        }
    }

    /// True for the Bitcoin-compatible extended key kinds, which never affect consensus
    pub fn is_legacy_compat(self) -> bool {
        matches!(
            self,
            AddressKind::ExtPublicKeyBtc | AddressKind::ExtSecretKeyBtc
        )
    }
}

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("invalid base58check string: {0}")]
    Base58(#[from] base58::Error),

    #[error("no address kind matches prefix of {0}")]
    UnknownPrefix(String),
}

/// Base58 prefixes for one network
///
/// The struct has one field per [`AddressKind`], so the table is total by construction.
/// [`AddressPrefixes::validate`] additionally checks that no prefix is empty and that no prefix
/// is a leading slice of another, which is what makes decoding unambiguous.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddressPrefixes {
    pub pubkey_address: Vec<u8>,
    pub script_address: Vec<u8>,
    pub secret_key: Vec<u8>,
    pub stealth_address: Vec<u8>,
    pub ext_public_key: Vec<u8>,
    pub ext_secret_key: Vec<u8>,
    pub ext_key_hash: Vec<u8>,
    pub ext_acc_hash: Vec<u8>,
    pub ext_public_key_btc: Vec<u8>,
    pub ext_secret_key_btc: Vec<u8>,
}

impl AddressPrefixes {
    pub fn prefix(&self, kind: AddressKind) -> &[u8] {
        match kind {
            AddressKind::PubkeyAddress => &self.pubkey_address,
            AddressKind::ScriptAddress => &self.script_address,
            AddressKind::SecretKey => &self.secret_key,
            AddressKind::StealthAddress => &self.stealth_address,
            AddressKind::ExtPublicKey => &self.ext_public_key,
            AddressKind::ExtSecretKey => &self.ext_secret_key,
            AddressKind::ExtKeyHash => &self.ext_key_hash,
            AddressKind::ExtAccHash => &self.ext_acc_hash,
            AddressKind::ExtPublicKeyBtc => &self.ext_public_key_btc,
            AddressKind::ExtSecretKeyBtc => &self.ext_secret_key_btc,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressKind, &[u8])> + '_ {
        AddressKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.prefix(kind)))
    }

    pub fn validate(&self, network: NetworkId) -> Result<(), ConfigurationError> {
        for (kind, prefix) in self.iter() {
            if prefix.is_empty() {
                return Err(ConfigurationError::EmptyAddressPrefix {
                    network,
                    kind: kind.name(),
                });
            }
        }

        for (i, (first, a)) in self.iter().enumerate() {
            for (second, b) in self.iter().skip(i + 1) {
                if a.starts_with(b) || b.starts_with(a) {
                    let shorter = if a.len() <= b.len() { a } else { b };
                    return Err(ConfigurationError::AmbiguousAddressPrefix {
                        network,
                        prefix: hex::encode(shorter),
                        first: first.name(),
                        second: second.name(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Returns the kind whose prefix leads `bytes`, if any
    pub fn match_prefix(&self, bytes: &[u8]) -> Option<AddressKind> {
        // The table is prefix-free after validation, so at most one kind can match.
        self.iter()
            .find(|(_, prefix)| bytes.starts_with(prefix))
            .map(|(kind, _)| kind)
    }

    pub fn encode(&self, kind: AddressKind, payload: &[u8]) -> String {
        let prefix = self.prefix(kind);
        let mut data = Vec::with_capacity(prefix.len() + payload.len());
        data.extend_from_slice(prefix);
        data.extend_from_slice(payload);
        base58::encode_check(&data)
    }

    pub fn decode(&self, text: &str) -> Result<(AddressKind, Vec<u8>), AddressError> {
        let data = base58::decode_check(text)?;
        let kind = self
            .match_prefix(&data)
            .ok_or_else(|| AddressError::UnknownPrefix(text.to_string()))?;
        Ok((kind, data[self.prefix(kind).len()..].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_table() -> AddressPrefixes {
        AddressPrefixes {
            pubkey_address: vec![63],
            script_address: vec![136],
            secret_key: vec![191],
            stealth_address: vec![40],
            ext_public_key: vec![0x8E, 0x8E, 0xA8, 0xEA],
            ext_secret_key: vec![0x8E, 0x8F, 0xC4, 0x70],
            ext_key_hash: vec![75],
            ext_acc_hash: vec![23],
            ext_public_key_btc: vec![0x04, 0x88, 0xB2, 0x1E],
            ext_secret_key_btc: vec![0x04, 0x88, 0xAD, 0xE4],
        }
    }

    #[test]
    fn test_all_kinds_are_distinct() {
        let names: HashSet<_> = AddressKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), AddressKind::COUNT);
    }

    #[test]
    fn test_legacy_compat_kinds() {
        let legacy: Vec<_> = AddressKind::ALL
            .into_iter()
            .filter(|k| k.is_legacy_compat())
            .collect();
        assert_eq!(
            legacy,
            vec![AddressKind::ExtPublicKeyBtc, AddressKind::ExtSecretKeyBtc]
        );
    }

    #[test]
    fn test_valid_table_passes() {
        assert_eq!(sample_table().validate(NetworkId::Main), Ok(()));
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let mut table = sample_table();
        table.script_address = vec![63];
        let err = table.validate(NetworkId::Testnet).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::AmbiguousAddressPrefix {
                network: NetworkId::Testnet,
                prefix: "3f".to_string(),
                first: "pubkey-address",
                second: "script-address",
            }
        );
    }

    #[test]
    fn test_prefix_of_longer_prefix_rejected() {
        let mut table = sample_table();
        // 0x04 leads both Bitcoin extended key prefixes
        table.stealth_address = vec![0x04];
        assert!(matches!(
            table.validate(NetworkId::Main),
            Err(ConfigurationError::AmbiguousAddressPrefix { .. })
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let mut table = sample_table();
        table.ext_acc_hash = Vec::new();
        assert_eq!(
            table.validate(NetworkId::Regtest),
            Err(ConfigurationError::EmptyAddressPrefix {
                network: NetworkId::Regtest,
                kind: "ext-acc-hash",
            })
        );
    }

    #[test]
    fn test_match_prefix_recovers_every_kind() {
        let table = sample_table();
        for (kind, prefix) in table.iter() {
            let mut bytes = prefix.to_vec();
            bytes.extend_from_slice(&[0xAB; 20]);
            assert_eq!(table.match_prefix(&bytes), Some(kind));
        }
        assert_eq!(table.match_prefix(&[0xFF, 0x00]), None);
    }

    #[test]
    fn test_decode_encoded_address() -> Result<(), Box<dyn std::error::Error>> {
        let table = sample_table();
        let payload = [0x11u8; 20];
        let text = table.encode(AddressKind::ScriptAddress, &payload);

        let (kind, decoded) = table.decode(&text)?;
        assert_eq!(kind, AddressKind::ScriptAddress);
        assert_eq!(decoded, payload.to_vec());
        Ok(())
    }

    #[test]
    fn test_decode_rejects_foreign_prefix() {
        let table = sample_table();
        let foreign = base58::encode_check(&[0xFF, 1, 2, 3]);
        assert!(matches!(
            table.decode(&foreign),
            Err(AddressError::UnknownPrefix(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let table = sample_table();
        let mut text = table.encode(AddressKind::PubkeyAddress, &[0x22; 20]);
        let last = text.pop().unwrap();
        text.push(if last == '2' { '3' } else { '2' });
        assert!(matches!(table.decode(&text), Err(AddressError::Base58(_))));
    }
}
