//! Cryptographic capabilities for parcel items.
//!
//! `parcel-proto` only knows about capability traits. This crate provides
//! concrete ones: the deep hash signing message and Ed25519 signing and
//! verification.

#![forbid(unsafe_code)]

pub mod deep_hash;
pub mod ed25519;
pub mod error;

pub use deep_hash::{Chunk, DEEP_HASH_LEN, DeepHashMessage, deep_hash};
pub use ed25519::{Ed25519Signer, Ed25519Verifier, ed25519_registry};
pub use error::CryptoError;
