//! Key handling errors.

use thiserror::Error;

/// Errors constructing signing capabilities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Seed is not 32 bytes.
    #[error("invalid seed length: expected 32 bytes, got {len}")]
    InvalidSeedLength {
        /// Supplied seed length
        len: usize,
    },

    /// Key type cannot produce signatures of this type.
    #[error("signature type {code} is not supported by this key")]
    UnsupportedSignatureType {
        /// Requested signature-type code
        code: u16,
    },
}
