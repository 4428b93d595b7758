//! Ed25519 signer and verifier capabilities.
//!
//! Serves both signature types that use Ed25519 keys: [`SignatureType::ED25519`]
//! and [`SignatureType::SOLANA`].

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};
use parcel_proto::{SignError, SignatureRegistry, SignatureType, Signer, Verifier};
use tracing::debug;

use crate::error::CryptoError;

/// Signs items with an Ed25519 key.
#[derive(Clone)]
pub struct Ed25519Signer {
    key: SigningKey,
    public_key: [u8; 32],
    signature_type: SignatureType,
}

impl Ed25519Signer {
    /// Signer for [`SignatureType::ED25519`] from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let public_key = key.verifying_key().to_bytes();
        Self { key, public_key, signature_type: SignatureType::ED25519 }
    }

    /// Signer from a seed of unchecked length.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: &[u8; 32] =
            seed.try_into().map_err(|_| CryptoError::InvalidSeedLength { len: seed.len() })?;
        Ok(Self::from_seed(seed))
    }

    /// Produce signatures for another Ed25519-based signature type.
    pub fn with_signature_type(mut self, signature_type: SignatureType) -> Result<Self, CryptoError> {
        if !is_ed25519(signature_type) {
            return Err(CryptoError::UnsupportedSignatureType { code: signature_type.code });
        }
        self.signature_type = signature_type;
        Ok(self)
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.public_key)
            .field("signature_type", &self.signature_type.code)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Verifies Ed25519 signatures with strict (non-malleable) checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

#[async_trait]
impl Verifier for Ed25519Verifier {
    async fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(owner) = <&[u8; 32]>::try_from(owner) else {
            debug!(len = owner.len(), "ed25519 owner has wrong length");
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(owner) else {
            debug!("ed25519 owner is not a valid point");
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            debug!(len = signature.len(), "ed25519 signature is malformed");
            return false;
        };
        key.verify_strict(message, &signature).is_ok()
    }
}

fn is_ed25519(signature_type: SignatureType) -> bool {
    signature_type == SignatureType::ED25519 || signature_type == SignatureType::SOLANA
}

/// Every built-in signature type, with Ed25519 verifiers attached to the
/// Ed25519-based types.
pub fn ed25519_registry() -> SignatureRegistry {
    let verifier = Arc::new(Ed25519Verifier);
    let mut registry = SignatureRegistry::extended();
    registry
        .register_with_verifier(SignatureType::ED25519, verifier.clone())
        .register_with_verifier(SignatureType::SOLANA, verifier);
    registry
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const SEED: [u8; 32] = [7; 32];

    #[tokio::test]
    async fn sign_then_verify() {
        let signer = Ed25519Signer::from_seed(&SEED);
        let signature = signer.sign(b"message").await.unwrap();
        assert_eq!(signature.len(), 64);

        let verifier = Ed25519Verifier;
        assert!(verifier.verify(signer.public_key(), b"message", &signature).await);
        assert!(!verifier.verify(signer.public_key(), b"messagf", &signature).await);
    }

    // RFC 8032, section 7.1, test 1
    #[tokio::test]
    async fn rfc8032_empty_message() {
        let seed = hex!("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
        let signer = Ed25519Signer::from_seed(&seed);
        assert_eq!(
            signer.public_key(),
            hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
        );

        let signature = signer.sign(b"").await.unwrap();
        assert_eq!(
            signature,
            hex!(
                "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
            )
        );
        assert!(Ed25519Verifier.verify(signer.public_key(), b"", &signature).await);
    }

    #[tokio::test]
    async fn malformed_inputs_are_rejected() {
        let signer = Ed25519Signer::from_seed(&SEED);
        let signature = signer.sign(b"m").await.unwrap();
        let verifier = Ed25519Verifier;

        assert!(!verifier.verify(&[0; 31], b"m", &signature).await);
        assert!(!verifier.verify(signer.public_key(), b"m", &signature[..63]).await);
        assert!(!verifier.verify(signer.public_key(), b"m", &[0; 64]).await);
    }

    #[test]
    fn signature_type_selection() {
        let signer = Ed25519Signer::from_seed(&SEED);
        assert_eq!(signer.signature_type(), SignatureType::ED25519);

        let solana = signer.clone().with_signature_type(SignatureType::SOLANA).unwrap();
        assert_eq!(solana.signature_type(), SignatureType::SOLANA);

        assert!(matches!(
            signer.with_signature_type(SignatureType::ARWEAVE),
            Err(CryptoError::UnsupportedSignatureType { code: 1 })
        ));
    }

    #[test]
    fn seed_length_is_checked() {
        assert!(Ed25519Signer::from_seed_slice(&[1; 32]).is_ok());
        assert!(matches!(
            Ed25519Signer::from_seed_slice(&[1; 16]),
            Err(CryptoError::InvalidSeedLength { len: 16 })
        ));
    }

    #[test]
    fn registry_has_verifiers_for_ed25519_types() {
        let registry = ed25519_registry();
        assert!(registry.verifier(2).is_ok());
        assert!(registry.verifier(4).is_ok());
        assert!(registry.verifier(1).is_err());
    }
}
