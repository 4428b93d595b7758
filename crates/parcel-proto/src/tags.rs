//! Tag block sub-codec.
//!
//! The tag block is an ordered list of `{name, value}` byte-string pairs in
//! an Avro-style array encoding:
//!
//! ```text
//! block*   := count:zigzag [size:zigzag if count < 0] item{|count|}
//! item     := name_len:zigzag name value_len:zigzag value
//! terminal := 0x00
//! ```
//!
//! Every integer is a zig-zag encoded varint (at most 10 bytes). Encoding
//! always emits one positive-count block followed by the terminator, so a
//! canonical block survives decode followed by encode byte for byte. Decoding
//! is strict: truncation, bad lengths, and trailing bytes are errors, never a
//! partial list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{ItemError, Result};

/// Longest valid varint encoding of a 64-bit value.
const MAX_VARINT_LEN: usize = 10;

/// Errors decoding a tag block.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
    /// Input ended before the terminator.
    #[error("tag block truncated")]
    Truncated,

    /// Varint longer than ten bytes.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,

    /// A name or value length was negative.
    #[error("negative length {0}")]
    NegativeLength(i64),

    /// A negative-count block declared a byte size its items did not match.
    #[error("block size mismatch: declared {declared}, consumed {consumed}")]
    BlockSizeMismatch {
        /// Size written after the block count
        declared: i64,
        /// Bytes the block's items actually used
        consumed: usize,
    },

    /// Bytes remain after the terminating zero count.
    #[error("{0} trailing bytes after tag block")]
    TrailingBytes(usize),
}

/// A single name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: Vec<u8>,
    /// Tag value
    pub value: Vec<u8>,
}

impl Tag {
    /// Create a tag from anything byte-like.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Name as UTF-8, if it is valid UTF-8.
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    /// Value as UTF-8, if it is valid UTF-8.
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

/// Write path limits on tags.
///
/// The read path only enforces the tag block size ceiling; these limits keep
/// newly built items within what the wider ecosystem accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLimits {
    /// Maximum number of tags
    pub max_tags: usize,
    /// Maximum tag name length in bytes
    pub max_name_len: usize,
    /// Maximum tag value length in bytes
    pub max_value_len: usize,
}

impl Default for TagLimits {
    fn default() -> Self {
        Self { max_tags: 128, max_name_len: 1024, max_value_len: 3072 }
    }
}

impl TagLimits {
    /// Check `tags` against these limits.
    ///
    /// Names and values must be non-empty.
    pub fn check(&self, tags: &[Tag]) -> Result<()> {
        if tags.len() > self.max_tags {
            return Err(ItemError::TooManyTags { count: tags.len(), max: self.max_tags });
        }

        for (index, tag) in tags.iter().enumerate() {
            let reason = if tag.name.is_empty() {
                "empty name"
            } else if tag.name.len() > self.max_name_len {
                "name too long"
            } else if tag.value.is_empty() {
                "empty value"
            } else if tag.value.len() > self.max_value_len {
                "value too long"
            } else {
                continue;
            };
            return Err(ItemError::InvalidTagField { index, reason });
        }

        Ok(())
    }
}

/// Encode `tags` into a tag block.
pub fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    let body: usize = tags.iter().map(|t| t.name.len() + t.value.len() + 2 * MAX_VARINT_LEN).sum();
    let mut out = Vec::with_capacity(body + 2 * MAX_VARINT_LEN);

    if !tags.is_empty() {
        write_long(&mut out, tags.len() as i64);
        for tag in tags {
            write_bytes(&mut out, &tag.name);
            write_bytes(&mut out, &tag.value);
        }
    }
    write_long(&mut out, 0);
    out
}

/// Decode a tag block, preserving order and duplicate names.
pub fn decode_tags(bytes: &[u8]) -> std::result::Result<Vec<Tag>, TagError> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut tags = Vec::new();

    loop {
        let count = reader.read_long()?;
        if count == 0 {
            break;
        }

        let declared_size = if count < 0 { Some(reader.read_long()?) } else { None };
        let block_start = reader.pos;
        let count = count.unsigned_abs();

        // Every item needs at least two bytes, so a count larger than the
        // remaining input cannot be honest.
        let remaining = reader.remaining() as u64;
        if count > remaining / 2 {
            return Err(TagError::Truncated);
        }
        tags.reserve(count as usize);

        for _ in 0..count {
            let name = reader.read_bytes()?.to_vec();
            let value = reader.read_bytes()?.to_vec();
            tags.push(Tag { name, value });
        }

        if let Some(declared) = declared_size {
            let consumed = reader.pos - block_start;
            if u64::try_from(declared).ok() != Some(consumed as u64) {
                return Err(TagError::BlockSizeMismatch { declared, consumed });
            }
        }
    }

    match reader.remaining() {
        0 => Ok(tags),
        n => Err(TagError::TrailingBytes(n)),
    }
}

fn write_long(out: &mut Vec<u8>, value: i64) {
    let mut zz = ((value << 1) ^ (value >> 63)) as u64;
    while zz >= 0x80 {
        out.push((zz as u8 & 0x7f) | 0x80);
        zz >>= 7;
    }
    out.push(zz as u8);
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_long(out, bytes.len() as i64);
    out.extend_from_slice(bytes);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_long(&mut self) -> std::result::Result<i64, TagError> {
        let mut zz: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = *self.bytes.get(self.pos).ok_or(TagError::Truncated)?;
            self.pos += 1;

            let bits = u64::from(byte & 0x7f);
            // The tenth byte may only carry the final bit.
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(TagError::VarintOverflow);
            }
            zz |= bits << (7 * i);

            if byte & 0x80 == 0 {
                return Ok((zz >> 1) as i64 ^ -((zz & 1) as i64));
            }
        }
        Err(TagError::VarintOverflow)
    }

    fn read_bytes(&mut self) -> std::result::Result<&'a [u8], TagError> {
        let len = self.read_long()?;
        let len = usize::try_from(len).map_err(|_| TagError::NegativeLength(len))?;
        if len > self.remaining() {
            return Err(TagError::Truncated);
        }
        let bytes = self.bytes;
        let slice = &bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}
