//! Write path: assemble an unsigned item skeleton.
//!
//! The builder writes every section in order and leaves the signature (and,
//! unless supplied, the owner) zero-filled. Signing later overwrites those
//! bytes in place, so the buffer never changes length after `build`.

use crate::{
    errors::{ItemError, Result},
    item::BundleItem,
    layout::{Layout, OPTIONAL_FIELD_SIZE, SIGNATURE_START, TAG_HEADER_SIZE},
    length::{LENGTH_FIELD_SIZE, encode_length},
    signature::SignatureType,
    tags::{Tag, TagLimits, encode_tags},
    validate::MAX_TAG_BLOCK_SIZE,
};

/// Builder for new bundle items.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    signature_type: SignatureType,
    owner: Option<Vec<u8>>,
    target: Option<[u8; OPTIONAL_FIELD_SIZE]>,
    anchor: Option<[u8; OPTIONAL_FIELD_SIZE]>,
    tags: Vec<Tag>,
    tag_limits: TagLimits,
    max_tag_block_size: u64,
}

impl ItemBuilder {
    /// Start an item of the given signature type.
    pub fn new(signature_type: SignatureType) -> Self {
        Self {
            signature_type,
            owner: None,
            target: None,
            anchor: None,
            tags: Vec::new(),
            tag_limits: TagLimits::default(),
            max_tag_block_size: MAX_TAG_BLOCK_SIZE,
        }
    }

    /// Set the owner public key. Its length is checked by `build`.
    #[must_use]
    pub fn owner(mut self, owner: impl Into<Vec<u8>>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the target.
    #[must_use]
    pub fn target(mut self, target: [u8; OPTIONAL_FIELD_SIZE]) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the anchor.
    #[must_use]
    pub fn anchor(mut self, anchor: [u8; OPTIONAL_FIELD_SIZE]) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn tag(mut self, name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    /// Append several tags in order.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Override the tag limits.
    #[must_use]
    pub fn tag_limits(mut self, limits: TagLimits) -> Self {
        self.tag_limits = limits;
        self
    }

    /// Override the tag block size ceiling.
    #[must_use]
    pub fn max_tag_block_size(mut self, max: u64) -> Self {
        self.max_tag_block_size = max;
        self
    }

    /// Assemble the item around `data`.
    pub fn build(self, data: &[u8]) -> Result<BundleItem> {
        let ty = self.signature_type;
        self.tag_limits.check(&self.tags)?;

        if let Some(owner) = &self.owner {
            if owner.len() != ty.owner_len {
                return Err(ItemError::FieldLengthMismatch {
                    field: "owner",
                    expected: ty.owner_len,
                    actual: owner.len(),
                });
            }
        }

        let tag_block = if self.tags.is_empty() { Vec::new() } else { encode_tags(&self.tags) };
        let tag_block_size = tag_block.len() as u64;
        if tag_block_size > self.max_tag_block_size {
            return Err(ItemError::TagBlockTooLarge {
                size: tag_block_size,
                max: self.max_tag_block_size,
            });
        }

        let optional_len = |field: &Option<[u8; OPTIONAL_FIELD_SIZE]>| {
            if field.is_some() { 1 + OPTIONAL_FIELD_SIZE } else { 1 }
        };
        let capacity = SIGNATURE_START
            + ty.signature_len
            + ty.owner_len
            + optional_len(&self.target)
            + optional_len(&self.anchor)
            + TAG_HEADER_SIZE
            + tag_block.len()
            + data.len();

        let mut buf = Vec::with_capacity(capacity);
        buf.extend_from_slice(&ty.code.to_le_bytes());
        buf.resize(buf.len() + ty.signature_len, 0);
        match &self.owner {
            Some(owner) => buf.extend_from_slice(owner),
            None => buf.resize(buf.len() + ty.owner_len, 0),
        }
        for field in [&self.target, &self.anchor] {
            match field {
                Some(bytes) => {
                    buf.push(1);
                    buf.extend_from_slice(bytes);
                },
                None => buf.push(0),
            }
        }
        buf.extend_from_slice(&encode_length(self.tags.len() as u64, LENGTH_FIELD_SIZE)?);
        buf.extend_from_slice(&encode_length(tag_block_size, LENGTH_FIELD_SIZE)?);
        buf.extend_from_slice(&tag_block);
        buf.extend_from_slice(data);

        let layout = Layout::compute(&buf, &ty)?;
        Ok(BundleItem::from_parts(buf, ty, layout))
    }
}
