//! Textual projection of an item for storage and transport layers.

use serde::{Deserialize, Serialize};

/// Item fields with every byte string in URL-safe unpadded base64.
///
/// Absent target and anchor fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemJson {
    /// Identifier
    pub id: String,
    /// Signature-type code
    pub signature_type: u16,
    /// Signature
    pub signature: String,
    /// Owner public key
    pub owner: String,
    /// Target
    pub target: String,
    /// Anchor
    pub anchor: String,
    /// Decoded tags in order
    pub tags: Vec<TagJson>,
    /// Payload
    pub data: String,
}

/// A tag with base64 name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagJson {
    /// Tag name
    pub name: String,
    /// Tag value
    pub value: String,
}
