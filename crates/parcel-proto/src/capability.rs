//! Capabilities the wire format delegates to.
//!
//! Cryptography and canonical message construction live outside this crate.
//! The item view hands them borrowed field slices and awaits their results;
//! no structural check ever depends on them.

use async_trait::async_trait;

use crate::{errors::SignError, signature::SignatureType};

/// Logical fields of an item, borrowed from its buffer.
///
/// Absent target or anchor fields are empty slices. `tags` is the raw tag
/// block exactly as stored, not a re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFields<'a> {
    /// Signature-type code
    pub signature_type: u16,
    /// Owner public key
    pub owner: &'a [u8],
    /// Target bytes (empty when absent)
    pub target: &'a [u8],
    /// Anchor bytes (empty when absent)
    pub anchor: &'a [u8],
    /// Raw tag block
    pub tags: &'a [u8],
    /// Payload
    pub data: &'a [u8],
}

/// Derives the canonical bytes a signature is computed over.
///
/// Implementations must be deterministic: the same fields always produce the
/// same message.
pub trait MessageBuilder: Send + Sync {
    /// Build the signing message for `fields`.
    fn signing_message(&self, fields: &ItemFields<'_>) -> Vec<u8>;
}

/// Verifies signatures for one signature type.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Returns `true` if `signature` over `message` was made by `owner`.
    ///
    /// Malformed keys or signatures are a `false` result, not an error.
    async fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

/// Produces signatures for one signature type.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signature type this signer produces.
    fn signature_type(&self) -> SignatureType;

    /// Public key written into the item's owner field.
    fn public_key(&self) -> &[u8];

    /// Sign `message`.
    ///
    /// The returned signature is checked against the item's signature
    /// length before anything is written.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError>;
}
