//! Wire format for signed bundle items.
//!
//! A bundle item is a self-describing binary envelope: a signature-type code,
//! a signature, an owner public key, optional target and anchor fields, a
//! nested tag block, and an opaque payload. Items can carry megabytes of data,
//! so nothing here copies the payload; every accessor borrows from the
//! buffer.
//!
//! Section boundaries are found purely by offset arithmetic driven by the
//! signature type and the presence flags, which makes untrusted buffers the
//! main hazard. Every bound is checked before it is read, and
//! [`Validator`] rejects malformed buffers with a typed reason before any
//! cryptographic work is attempted.
//!
//! # Components
//!
//! - [`length`]: fixed-width little-endian length fields
//! - [`signature`]: signature-type registry
//! - [`layout`]: section offsets
//! - [`tags`]: tag block sub-codec
//! - [`validate`]: structural and signature validation
//! - [`item`]: zero-copy item view, in-place mutation, signing
//! - [`builder`]: write path for new items
//! - [`capability`]: signer, verifier, and signing-message traits
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod capability;
pub mod errors;
pub mod id;
pub mod item;
pub mod json;
pub mod layout;
pub mod length;
pub mod signature;
pub mod tags;
pub mod validate;

pub use builder::ItemBuilder;
pub use capability::{ItemFields, MessageBuilder, Signer, Verifier};
pub use errors::{ItemError, Result, SignError};
pub use id::ItemId;
pub use item::BundleItem;
pub use json::{ItemJson, TagJson};
pub use layout::Layout;
pub use length::{decode_length, encode_length};
pub use signature::{SignatureRegistry, SignatureType};
pub use tags::{Tag, TagError, TagLimits, decode_tags, encode_tags};
pub use validate::{MAX_TAG_BLOCK_SIZE, MIN_ITEM_SIZE, ValidationLimits, Validator};
