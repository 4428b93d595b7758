//! Zero-copy view over a bundle item buffer.
//!
//! A [`BundleItem`] owns its backing buffer and borrows every field out of
//! it. The layout is computed once at construction; it cannot change
//! afterwards because mutation only overwrites the fixed-width signature and
//! owner fields in place.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use bytes::Bytes;
use tracing::debug;

use crate::{
    capability::{ItemFields, MessageBuilder, Signer},
    errors::{ItemError, Result},
    id::ItemId,
    json::{ItemJson, TagJson},
    layout::{Layout, read_signature_type},
    signature::{SignatureRegistry, SignatureType},
    tags::{Tag, decode_tags},
};

/// A bundle item backed by a contiguous buffer.
///
/// `B` is any byte container: `Vec<u8>` for items being built or signed,
/// [`Bytes`] for shared read-only items, or `&[u8]` for a borrowed view.
#[derive(Debug, Clone)]
pub struct BundleItem<B = Vec<u8>> {
    buffer: B,
    signature_type: SignatureType,
    layout: Layout,
    id: Option<ItemId>,
}

impl<B: AsRef<[u8]>> BundleItem<B> {
    /// Lay out `buffer`, resolving its signature type through `registry`.
    ///
    /// Only the layout is checked here; use [`crate::Validator`] for the
    /// full structural check of untrusted input.
    pub fn new(buffer: B, registry: &SignatureRegistry) -> Result<Self> {
        let buf = buffer.as_ref();
        let code = read_signature_type(buf)?;
        let signature_type = registry.resolve(code)?;
        let layout = Layout::compute(buf, &signature_type)?;
        Ok(Self::from_parts(buffer, signature_type, layout))
    }

    /// Lay out `buffer` using the default signature registry.
    pub fn parse(buffer: B) -> Result<Self> {
        Self::new(buffer, &SignatureRegistry::default())
    }

    pub(crate) fn from_parts(buffer: B, signature_type: SignatureType, layout: Layout) -> Self {
        Self { buffer, signature_type, layout, id: None }
    }

    /// The whole item.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Release the backing buffer.
    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Total item length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Always false: a laid-out item has at least its fixed header.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Section offsets.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Signature type descriptor.
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Raw signature bytes.
    pub fn raw_signature(&self) -> &[u8] {
        &self.as_bytes()[self.layout.signature_range()]
    }

    /// Signature as URL-safe base64.
    pub fn signature(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.raw_signature())
    }

    /// Whether any signature byte is non-zero.
    pub fn is_signed(&self) -> bool {
        self.raw_signature().iter().any(|&b| b != 0)
    }

    /// Raw owner (public key) bytes.
    pub fn raw_owner(&self) -> &[u8] {
        &self.as_bytes()[self.layout.owner_range()]
    }

    /// Owner as URL-safe base64.
    pub fn owner(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.raw_owner())
    }

    /// Raw target bytes, empty when absent.
    pub fn raw_target(&self) -> &[u8] {
        match self.layout.target_range() {
            Some(range) => &self.as_bytes()[range],
            None => &[],
        }
    }

    /// Target as URL-safe base64, empty when absent.
    pub fn target(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.raw_target())
    }

    /// Raw anchor bytes, empty when absent.
    pub fn raw_anchor(&self) -> &[u8] {
        match self.layout.anchor_range() {
            Some(range) => &self.as_bytes()[range],
            None => &[],
        }
    }

    /// Anchor as URL-safe base64, empty when absent.
    pub fn anchor(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.raw_anchor())
    }

    /// Tag count declared in the header.
    pub fn tag_count(&self) -> u64 {
        self.layout.tag_count()
    }

    /// Raw tag block.
    pub fn raw_tags(&self) -> &[u8] {
        &self.as_bytes()[self.layout.tags_range()]
    }

    /// Decode the tag block.
    ///
    /// An item declaring zero tags has an empty list regardless of its tag
    /// block contents.
    pub fn tags(&self) -> Result<Vec<Tag>> {
        if self.tag_count() == 0 {
            return Ok(Vec::new());
        }
        Ok(decode_tags(self.raw_tags())?)
    }

    /// Raw payload.
    pub fn raw_data(&self) -> &[u8] {
        &self.as_bytes()[self.layout.data_start()..]
    }

    /// Payload as URL-safe base64.
    pub fn data(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.raw_data())
    }

    /// Item identifier.
    ///
    /// Derived from the current signature bytes unless an identifier has
    /// been assigned with [`BundleItem::set_id`].
    pub fn id(&self) -> ItemId {
        self.id.unwrap_or_else(|| ItemId::from_signature(self.raw_signature()))
    }

    /// Whether an identifier has been explicitly assigned.
    pub fn has_assigned_id(&self) -> bool {
        self.id.is_some()
    }

    /// Assign the identifier, overriding the derived value.
    pub fn set_id(&mut self, id: ItemId) {
        self.id = Some(id);
    }

    /// Assign the identifier from its textual encoding.
    pub fn set_id_str(&mut self, id: &str) -> Result<()> {
        self.id = Some(id.parse()?);
        Ok(())
    }

    /// Drop any assigned identifier so it is derived again.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Fields handed to signing-message builders.
    pub fn fields(&self) -> ItemFields<'_> {
        ItemFields {
            signature_type: self.signature_type.code,
            owner: self.raw_owner(),
            target: self.raw_target(),
            anchor: self.raw_anchor(),
            tags: self.raw_tags(),
            data: self.raw_data(),
        }
    }

    /// Structured projection with byte fields in URL-safe base64.
    pub fn to_json(&self) -> Result<ItemJson> {
        let tags = self
            .tags()?
            .iter()
            .map(|tag| TagJson {
                name: URL_SAFE_NO_PAD.encode(&tag.name),
                value: URL_SAFE_NO_PAD.encode(&tag.value),
            })
            .collect();

        Ok(ItemJson {
            id: self.id().to_string(),
            signature_type: self.signature_type.code,
            signature: self.signature(),
            owner: self.owner(),
            target: self.target(),
            anchor: self.anchor(),
            tags,
            data: self.data(),
        })
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BundleItem<B> {
    /// Overwrite the signature in place.
    ///
    /// `signature` must be exactly the signature length of the item's type;
    /// on mismatch the buffer is left untouched.
    pub fn set_signature(&mut self, signature: &[u8]) -> Result<()> {
        let range = self.layout.signature_range();
        write_fixed(self.buffer.as_mut(), range, signature, "signature")
    }

    /// Overwrite the owner in place.
    ///
    /// `owner` must be exactly the owner length of the item's type.
    pub fn set_owner(&mut self, owner: &[u8]) -> Result<()> {
        let range = self.layout.owner_range();
        write_fixed(self.buffer.as_mut(), range, owner, "owner")
    }

    /// Sign the item.
    ///
    /// Builds the signing message with the signer's public key as owner,
    /// awaits the signer, then writes the owner and signature in place and
    /// assigns the resulting identifier. The buffer is only written once the
    /// key and signature lengths are known to fit, so a failed call leaves it
    /// unchanged.
    pub async fn sign<S, M>(&mut self, signer: &S, messages: &M) -> Result<ItemId>
    where
        S: Signer + ?Sized,
        M: MessageBuilder + ?Sized,
    {
        let signer_type = signer.signature_type();
        if signer_type.code != self.signature_type.code {
            return Err(ItemError::SignerMismatch {
                expected: self.signature_type.code,
                actual: signer_type.code,
            });
        }

        let owner = signer.public_key();
        check_len("owner", self.layout.owner_range().len(), owner.len())?;
        let message = messages.signing_message(&ItemFields { owner, ..self.fields() });

        debug!(code = signer_type.code, message_len = message.len(), "signing item");
        let signature = signer.sign(&message).await?;
        check_len("signature", self.layout.signature_range().len(), signature.len())?;

        self.set_owner(owner)?;
        self.set_signature(&signature)?;

        let id = ItemId::from_signature(&signature);
        self.id = Some(id);
        debug!(%id, "item signed");
        Ok(id)
    }
}

impl BundleItem<Bytes> {
    /// Payload sharing the item's allocation.
    pub fn data_bytes(&self) -> Bytes {
        self.buffer.slice(self.layout.data_start()..)
    }
}

fn write_fixed(
    buf: &mut [u8],
    range: std::ops::Range<usize>,
    value: &[u8],
    field: &'static str,
) -> Result<()> {
    check_len(field, range.len(), value.len())?;
    buf[range].copy_from_slice(value);
    Ok(())
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(ItemError::FieldLengthMismatch { field, expected, actual });
    }
    Ok(())
}
