//! Content-derived item identifier.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::errors::ItemError;

/// SHA-256 digest of an item's raw signature bytes.
///
/// Displays as URL-safe base64 without padding (43 characters).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId([u8; 32]);

impl ItemId {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Derive the identifier from raw signature bytes.
    pub fn from_signature(signature: &[u8]) -> Self {
        Self(Sha256::digest(signature).into())
    }

    /// Wrap an already computed digest.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({self})")
    }
}

impl FromStr for ItemId {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded =
            URL_SAFE_NO_PAD.decode(s).map_err(|e| ItemError::InvalidIdentifier(e.to_string()))?;
        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
            ItemError::InvalidIdentifier(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn digest_of_signature() {
        // SHA-256 of the empty string
        let id = ItemId::from_signature(&[]);
        assert_eq!(
            id.as_bytes(),
            &hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn text_round_trip() {
        let id = ItemId::from_signature(&[7; 512]);
        let text = id.to_string();
        assert_eq!(text.len(), 43);
        assert!(!text.contains('=') && !text.contains('+') && !text.contains('/'));
        assert_eq!(text.parse::<ItemId>(), Ok(id));
    }

    #[test]
    fn rejects_wrong_length_and_alphabet() {
        assert!(matches!("AAAA".parse::<ItemId>(), Err(ItemError::InvalidIdentifier(_))));
        assert!(matches!("not base64!".parse::<ItemId>(), Err(ItemError::InvalidIdentifier(_))));
    }
}
