//! Section offsets of a bundle item.
//!
//! ```text
//! [0, 2)                 signature-type code (u16 LE)
//! [2, 2+S)               signature
//! [2+S, 2+S+O)           owner
//! 1 | 1+32               target presence flag [+ target]
//! 1 | 1+32               anchor presence flag [+ anchor]
//! 8                      tag count (u64 LE)
//! 8                      tag block size N (u64 LE)
//! N                      tag block
//! ..                     payload
//! ```
//!
//! Each offset depends on the presence flags before it, so the layout is
//! computed strictly left to right. Every bound is checked against the buffer
//! length before the bytes behind it are read.

use std::ops::Range;

use crate::{
    errors::{ItemError, Result},
    length::{LENGTH_FIELD_SIZE, decode_length},
    signature::SignatureType,
};

/// Offset of the signature field.
pub const SIGNATURE_START: usize = 2;

/// Size of a present target or anchor, excluding its flag byte.
pub const OPTIONAL_FIELD_SIZE: usize = 32;

/// Size of the tag count and tag block size fields together.
pub const TAG_HEADER_SIZE: usize = 2 * LENGTH_FIELD_SIZE;

/// Read the signature-type code from the first two bytes.
pub fn read_signature_type(buf: &[u8]) -> Result<u16> {
    match buf {
        [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
        _ => Err(ItemError::TruncatedBuffer { needed: SIGNATURE_START, len: buf.len() }),
    }
}

/// Byte offsets of every section in an item buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    owner_start: usize,
    target_start: usize,
    anchor_start: usize,
    tags_count_start: usize,
    tags_size_start: usize,
    tags_start: usize,
    data_start: usize,
    target_present: bool,
    anchor_present: bool,
    tag_count: u64,
    tag_block_size: u64,
}

impl Layout {
    /// Compute the layout of `buf` for signature type `ty`.
    ///
    /// Fails with [`ItemError::InvalidPresenceFlag`] for a flag byte other
    /// than 0 or 1, and [`ItemError::TruncatedBuffer`] when any section would
    /// extend past the end of the buffer.
    pub fn compute(buf: &[u8], ty: &SignatureType) -> Result<Self> {
        let layout = Self::scan(buf, ty)?;
        layout.ensure_within(buf.len())?;
        Ok(layout)
    }

    /// Locate every section header without checking that the tag block and
    /// payload fit in the buffer.
    ///
    /// Lets the validator report an oversized tag block before reporting the
    /// truncation it implies.
    pub(crate) fn scan(buf: &[u8], ty: &SignatureType) -> Result<Self> {
        let len = buf.len();

        let owner_start = advance(SIGNATURE_START, ty.signature_len, len)?;
        let target_start = advance(owner_start, ty.owner_len, len)?;
        let (target_present, anchor_start) = read_optional(buf, target_start)?;
        let (anchor_present, tags_count_start) = read_optional(buf, anchor_start)?;
        let tags_size_start = advance(tags_count_start, LENGTH_FIELD_SIZE, len)?;
        let tags_start = advance(tags_size_start, LENGTH_FIELD_SIZE, len)?;

        let tag_count = decode_length(&buf[tags_count_start..tags_size_start]);
        let tag_block_size = decode_length(&buf[tags_size_start..tags_start]);

        let data_start = usize::try_from(tag_block_size)
            .ok()
            .and_then(|size| tags_start.checked_add(size))
            .unwrap_or(usize::MAX);

        Ok(Self {
            owner_start,
            target_start,
            anchor_start,
            tags_count_start,
            tags_size_start,
            tags_start,
            data_start,
            target_present,
            anchor_present,
            tag_count,
            tag_block_size,
        })
    }

    pub(crate) fn ensure_within(&self, len: usize) -> Result<()> {
        if self.data_start > len {
            return Err(ItemError::TruncatedBuffer { needed: self.data_start, len });
        }
        Ok(())
    }

    /// Start of the signature field.
    pub fn signature_start(&self) -> usize {
        SIGNATURE_START
    }

    /// Start of the owner field.
    pub fn owner_start(&self) -> usize {
        self.owner_start
    }

    /// Offset of the target presence flag.
    pub fn target_start(&self) -> usize {
        self.target_start
    }

    /// Offset of the anchor presence flag.
    pub fn anchor_start(&self) -> usize {
        self.anchor_start
    }

    /// Offset of the tag count field.
    pub fn tags_count_start(&self) -> usize {
        self.tags_count_start
    }

    /// Offset of the tag block size field.
    pub fn tags_size_start(&self) -> usize {
        self.tags_size_start
    }

    /// Start of the tag block.
    pub fn tags_start(&self) -> usize {
        self.tags_start
    }

    /// Start of the payload.
    pub fn data_start(&self) -> usize {
        self.data_start
    }

    /// Whether the target field is present.
    pub fn has_target(&self) -> bool {
        self.target_present
    }

    /// Whether the anchor field is present.
    pub fn has_anchor(&self) -> bool {
        self.anchor_present
    }

    /// Tag count declared in the header.
    pub fn tag_count(&self) -> u64 {
        self.tag_count
    }

    /// Tag block size declared in the header.
    pub fn tag_block_size(&self) -> u64 {
        self.tag_block_size
    }

    /// Byte range of the signature.
    pub fn signature_range(&self) -> Range<usize> {
        SIGNATURE_START..self.owner_start
    }

    /// Byte range of the owner.
    pub fn owner_range(&self) -> Range<usize> {
        self.owner_start..self.target_start
    }

    /// Byte range of the target, if present.
    pub fn target_range(&self) -> Option<Range<usize>> {
        self.target_present.then(|| optional_range(self.target_start))
    }

    /// Byte range of the anchor, if present.
    pub fn anchor_range(&self) -> Option<Range<usize>> {
        self.anchor_present.then(|| optional_range(self.anchor_start))
    }

    /// Byte range of the tag block.
    pub fn tags_range(&self) -> Range<usize> {
        self.tags_start..self.data_start
    }
}

fn optional_range(flag_offset: usize) -> Range<usize> {
    let start = flag_offset + 1;
    start..start + OPTIONAL_FIELD_SIZE
}

fn advance(start: usize, size: usize, len: usize) -> Result<usize> {
    match start.checked_add(size) {
        Some(end) if end <= len => Ok(end),
        end => Err(ItemError::TruncatedBuffer { needed: end.unwrap_or(usize::MAX), len }),
    }
}

/// Read a presence flag at `offset` and return whether the field is present
/// and where the next section starts.
fn read_optional(buf: &[u8], offset: usize) -> Result<(bool, usize)> {
    let flag = *buf
        .get(offset)
        .ok_or(ItemError::TruncatedBuffer { needed: offset + 1, len: buf.len() })?;

    match flag {
        0 => Ok((false, offset + 1)),
        1 => Ok((true, advance(offset + 1, OPTIONAL_FIELD_SIZE, buf.len())?)),
        value => Err(ItemError::InvalidPresenceFlag { offset, value }),
    }
}
