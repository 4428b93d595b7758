//! Signature-type registry.
//!
//! A signature-type code fixes the length of the signature and owner fields
//! and selects the verifier used for the item. The registry is a lookup table
//! keyed by code; unknown codes are an error, never a default.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    capability::Verifier,
    errors::{ItemError, Result},
};

/// Lengths fixed by a signature type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureType {
    /// Code stored in the first two bytes of an item
    pub code: u16,
    /// Signature field length in bytes
    pub signature_len: usize,
    /// Owner (public key) field length in bytes
    pub owner_len: usize,
}

impl SignatureType {
    /// Arweave RSA-PSS with a 4096-bit modulus.
    pub const ARWEAVE: Self = Self { code: 1, signature_len: 512, owner_len: 512 };

    /// Ed25519.
    pub const ED25519: Self = Self { code: 2, signature_len: 64, owner_len: 32 };

    /// Ethereum secp256k1 with an uncompressed public key.
    pub const ETHEREUM: Self = Self { code: 3, signature_len: 65, owner_len: 65 };

    /// Solana (Ed25519 keys and signatures).
    pub const SOLANA: Self = Self { code: 4, signature_len: 64, owner_len: 32 };
}

struct Entry {
    descriptor: SignatureType,
    verifier: Option<Arc<dyn Verifier>>,
}

/// Maps signature-type codes to descriptors and verifier capabilities.
///
/// [`SignatureRegistry::default`] holds only [`SignatureType::ARWEAVE`];
/// other types are opt-in via [`SignatureRegistry::register`] or
/// [`SignatureRegistry::extended`].
#[derive(Clone)]
pub struct SignatureRegistry {
    entries: HashMap<u16, Arc<Entry>>,
}

impl SignatureRegistry {
    /// Registry with no signature types.
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Registry with every built-in signature type.
    pub fn extended() -> Self {
        let mut registry = Self::empty();
        for descriptor in [
            SignatureType::ARWEAVE,
            SignatureType::ED25519,
            SignatureType::ETHEREUM,
            SignatureType::SOLANA,
        ] {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a signature type without a verifier.
    ///
    /// Replaces any existing entry for the same code.
    pub fn register(&mut self, descriptor: SignatureType) -> &mut Self {
        self.entries.insert(descriptor.code, Arc::new(Entry { descriptor, verifier: None }));
        self
    }

    /// Register a signature type together with its verifier.
    pub fn register_with_verifier(
        &mut self,
        descriptor: SignatureType,
        verifier: Arc<dyn Verifier>,
    ) -> &mut Self {
        self.entries
            .insert(descriptor.code, Arc::new(Entry { descriptor, verifier: Some(verifier) }));
        self
    }

    /// Look up the descriptor for `code`.
    pub fn resolve(&self, code: u16) -> Result<SignatureType> {
        self.entries
            .get(&code)
            .map(|entry| entry.descriptor)
            .ok_or(ItemError::UnknownSignatureType { code })
    }

    /// Look up the verifier for `code`.
    pub fn verifier(&self, code: u16) -> Result<Arc<dyn Verifier>> {
        let entry = self.entries.get(&code).ok_or(ItemError::UnknownSignatureType { code })?;
        entry.verifier.clone().ok_or(ItemError::VerifierUnavailable { code })
    }

    /// Whether `code` is registered.
    pub fn contains(&self, code: u16) -> bool {
        self.entries.contains_key(&code)
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SignatureType::ARWEAVE);
        registry
    }
}

impl fmt::Debug for SignatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.entries.keys().copied().collect();
        codes.sort_unstable();
        f.debug_struct("SignatureRegistry").field("codes", &codes).finish()
    }
}
