//! Structural and cryptographic validation of untrusted item buffers.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. minimum size
//! 2. known signature type
//! 3. layout (presence flags, section bounds)
//! 4. tag block size ceiling
//! 5. tag count matches the decoded tag block
//! 6. signature, via the registered verifier
//!
//! Steps 1-5 are pure. Step 6 is the only suspension point and never runs
//! unless every structural check passed. Validation never mutates the buffer
//! and keeps no state between calls.

use tracing::{debug, warn};

use crate::{
    capability::MessageBuilder,
    errors::{ItemError, Result},
    item::BundleItem,
    layout::{Layout, read_signature_type},
    signature::{SignatureRegistry, SignatureType},
    tags::decode_tags,
};

/// Smallest buffer accepted as an item.
pub const MIN_ITEM_SIZE: usize = 80;

/// Largest accepted tag block.
pub const MAX_TAG_BLOCK_SIZE: u64 = 4096;

/// Read path limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Minimum item size in bytes
    pub min_item_size: usize,
    /// Maximum tag block size in bytes
    pub max_tag_block_size: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self { min_item_size: MIN_ITEM_SIZE, max_tag_block_size: MAX_TAG_BLOCK_SIZE }
    }
}

/// Validates item buffers against a signature registry.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    registry: SignatureRegistry,
    limits: ValidationLimits,
}

impl Validator {
    /// Validator with default limits.
    pub fn new(registry: SignatureRegistry) -> Self {
        Self { registry, limits: ValidationLimits::default() }
    }

    /// Replace the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current limits.
    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Signature registry in use.
    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    /// Run the structural checks and return the item's layout.
    pub fn check_structure(&self, buf: &[u8]) -> Result<Layout> {
        self.checked(buf).map(|(_, layout)| layout)
    }

    fn checked(&self, buf: &[u8]) -> Result<(SignatureType, Layout)> {
        match self.structure(buf) {
            Ok((ty, layout)) => {
                debug!(
                    code = ty.code,
                    len = buf.len(),
                    tags = layout.tag_count(),
                    data_start = layout.data_start(),
                    "item structure valid"
                );
                Ok((ty, layout))
            },
            Err(err) => {
                warn!(len = buf.len(), reason = %err, "item structure rejected");
                Err(err)
            },
        }
    }

    fn structure(&self, buf: &[u8]) -> Result<(SignatureType, Layout)> {
        if buf.len() < self.limits.min_item_size {
            return Err(ItemError::TooSmall { len: buf.len(), min: self.limits.min_item_size });
        }

        let ty = self.registry.resolve(read_signature_type(buf)?)?;
        let layout = Layout::scan(buf, &ty)?;

        let size = layout.tag_block_size();
        if size > self.limits.max_tag_block_size {
            return Err(ItemError::TagBlockTooLarge { size, max: self.limits.max_tag_block_size });
        }
        layout.ensure_within(buf.len())?;

        let declared = layout.tag_count();
        if declared > 0 {
            let decoded = decode_tags(&buf[layout.tags_range()])?;
            if decoded.len() as u64 != declared {
                return Err(ItemError::TagCountMismatch { declared, decoded: decoded.len() });
            }
        }

        Ok((ty, layout))
    }

    /// Run every check, including signature verification.
    ///
    /// Structural failures are returned before the verifier is consulted.
    /// A signature the verifier rejects is [`ItemError::SignatureInvalid`].
    pub async fn validate<M>(&self, buf: &[u8], messages: &M) -> Result<()>
    where
        M: MessageBuilder + ?Sized,
    {
        let (ty, layout) = self.checked(buf)?;
        let code = ty.code;
        let verifier = self.registry.verifier(code)?;

        let item = BundleItem::from_parts(buf, ty, layout);
        let message = messages.signing_message(&item.fields());

        debug!(code, message_len = message.len(), "verifying item signature");
        if verifier.verify(item.raw_owner(), &message, item.raw_signature()).await {
            Ok(())
        } else {
            warn!(code, id = %item.id(), "item signature rejected");
            Err(ItemError::SignatureInvalid)
        }
    }

    /// Like [`Validator::validate`], but reports a rejected signature as
    /// `Ok(false)`. Structural defects are still errors.
    pub async fn is_valid<M>(&self, buf: &[u8], messages: &M) -> Result<bool>
    where
        M: MessageBuilder + ?Sized,
    {
        match self.validate(buf, messages).await {
            Ok(()) => Ok(true),
            Err(ItemError::SignatureInvalid) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
