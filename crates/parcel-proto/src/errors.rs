//! Error types for bundle item parsing, validation, and mutation.
//!
//! Structural errors describe a malformed buffer and are always reported
//! before any cryptographic work happens. [`ItemError::SignatureInvalid`] is
//! the only outcome that means "well formed, but not signed by the claimed
//! owner".

use thiserror::Error;

use crate::tags::TagError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ItemError>;

/// Failures reported by a [`crate::Signer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The key behind the signer cannot be reached.
    #[error("signing key unavailable: {reason}")]
    KeyUnavailable {
        /// Why the key is unavailable
        reason: String,
    },

    /// The signer declined to sign this message.
    #[error("signer refused the message")]
    Refused,
}

/// Errors produced while reading, validating, or writing a bundle item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Buffer is shorter than the minimum item size.
    #[error("item too small: {len} bytes (minimum {min})")]
    TooSmall {
        /// Actual buffer length
        len: usize,
        /// Minimum accepted length
        min: usize,
    },

    /// Signature-type code is not present in the registry.
    #[error("unknown signature type: {code}")]
    UnknownSignatureType {
        /// The unregistered code
        code: u16,
    },

    /// A presence flag byte was neither 0 nor 1.
    #[error("invalid presence flag {value:#04x} at offset {offset}")]
    InvalidPresenceFlag {
        /// Offset of the flag byte
        offset: usize,
        /// Byte found at that offset
        value: u8,
    },

    /// A field extends past the end of the buffer.
    #[error("truncated buffer: need {needed} bytes, have {len}")]
    TruncatedBuffer {
        /// Bytes required to read the field
        needed: usize,
        /// Actual buffer length
        len: usize,
    },

    /// Declared tag block is larger than the configured ceiling.
    #[error("tag block too large: {size} bytes (maximum {max})")]
    TagBlockTooLarge {
        /// Declared tag block size
        size: u64,
        /// Configured ceiling
        max: u64,
    },

    /// Tag block bytes do not follow the tag sub-format.
    #[error("invalid tag encoding: {0}")]
    InvalidTagEncoding(#[from] TagError),

    /// Declared tag count differs from the number of decoded tags.
    #[error("tag count mismatch: declared {declared}, decoded {decoded}")]
    TagCountMismatch {
        /// Count stored in the item header
        declared: u64,
        /// Number of tags actually decoded
        decoded: usize,
    },

    /// Signature does not verify against the owner and signing message.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// Fixed-width field was given a value of the wrong length.
    #[error("{field} length mismatch: expected {expected} bytes, got {actual}")]
    FieldLengthMismatch {
        /// Field being written
        field: &'static str,
        /// Length fixed by the signature type
        expected: usize,
        /// Length of the supplied value
        actual: usize,
    },

    /// No verifier capability is registered for the signature type.
    #[error("no verifier registered for signature type {code}")]
    VerifierUnavailable {
        /// Signature-type code
        code: u16,
    },

    /// Signer produces signatures for a different signature type.
    #[error("signer type {actual} does not match item type {expected}")]
    SignerMismatch {
        /// Signature type of the item
        expected: u16,
        /// Signature type of the signer
        actual: u16,
    },

    /// The external signing capability failed.
    #[error("signing failed: {0}")]
    Signing(#[from] SignError),

    /// Textual identifier is not a 32-byte URL-safe base64 value.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Too many tags for the write path limits.
    #[error("too many tags: {count} (maximum {max})")]
    TooManyTags {
        /// Number of tags supplied
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// A tag name or value violates the write path limits.
    #[error("invalid tag at index {index}: {reason}")]
    InvalidTagField {
        /// Position of the offending tag
        index: usize,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Integer does not fit in the requested field width.
    #[error("value {value} does not fit in {width} bytes")]
    LengthOverflow {
        /// Value being encoded
        value: u64,
        /// Field width in bytes
        width: usize,
    },
}

impl ItemError {
    /// Whether this error indicates a malformed buffer rather than a
    /// rejected signature or a caller mistake.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::TooSmall { .. }
                | Self::UnknownSignatureType { .. }
                | Self::InvalidPresenceFlag { .. }
                | Self::TruncatedBuffer { .. }
                | Self::TagBlockTooLarge { .. }
                | Self::InvalidTagEncoding(_)
                | Self::TagCountMismatch { .. }
        )
    }
}
