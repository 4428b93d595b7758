//! Deep hash signing messages.
//!
//! A deep hash commits to a tree of byte strings, including each node's
//! kind and length, so two different field lists can never produce the same
//! message by shifting bytes across field boundaries.
//!
//! ```text
//! blob(data)  = H( H("blob" || len(data)) || H(data) )
//! list(items) = fold(H("list" || count), |acc, item| H(acc || deep(item)))
//! ```
//!
//! `H` is SHA-384 and lengths are ASCII decimal.

use parcel_proto::{ItemFields, MessageBuilder};
use sha2::{Digest, Sha384};

/// Length of a deep hash in bytes.
pub const DEEP_HASH_LEN: usize = 48;

/// Node in a deep hash tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Leaf byte string
    Blob(&'a [u8]),
    /// Ordered children
    List(Vec<Chunk<'a>>),
}

/// Hash a chunk tree.
pub fn deep_hash(chunk: &Chunk<'_>) -> [u8; DEEP_HASH_LEN] {
    match chunk {
        Chunk::Blob(data) => {
            let tag = Sha384::digest(format!("blob{}", data.len()));
            let body = Sha384::digest(data);
            let mut hasher = Sha384::new();
            hasher.update(tag);
            hasher.update(body);
            finish(hasher)
        },
        Chunk::List(children) => {
            let mut hasher = Sha384::new();
            hasher.update(format!("list{}", children.len()));
            let mut acc = finish(hasher);

            for child in children {
                let mut hasher = Sha384::new();
                hasher.update(acc);
                hasher.update(deep_hash(child));
                acc = finish(hasher);
            }
            acc
        },
    }
}

fn finish(hasher: Sha384) -> [u8; DEEP_HASH_LEN] {
    let mut out = [0u8; DEEP_HASH_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Signing message: the deep hash of an item's logical fields.
///
/// The hashed list is `["dataitem", "1", <type code>, owner, target, anchor,
/// tags, data]`, with absent target and anchor as empty blobs and the tag
/// block exactly as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepHashMessage;

impl MessageBuilder for DeepHashMessage {
    fn signing_message(&self, fields: &ItemFields<'_>) -> Vec<u8> {
        let code = fields.signature_type.to_string();
        let tree = Chunk::List(vec![
            Chunk::Blob(b"dataitem"),
            Chunk::Blob(b"1"),
            Chunk::Blob(code.as_bytes()),
            Chunk::Blob(fields.owner),
            Chunk::Blob(fields.target),
            Chunk::Blob(fields.anchor),
            Chunk::Blob(fields.tags),
            Chunk::Blob(fields.data),
        ]);
        deep_hash(&tree).to_vec()
    }
}
