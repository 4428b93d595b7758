//! Validator tests
//!
//! Structural checks run in order and always before the verifier; the
//! verifier's answer only matters for structurally valid buffers.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parcel_proto::{
    ItemBuilder, ItemError, ItemFields, MessageBuilder, SignatureRegistry, SignatureType, Tag,
    TagError, ValidationLimits, Validator, Verifier, encode_tags,
};

/// Signing message that simply concatenates the fields.
struct Concat;

impl MessageBuilder for Concat {
    fn signing_message(&self, fields: &ItemFields<'_>) -> Vec<u8> {
        [fields.owner, fields.target, fields.anchor, fields.tags, fields.data].concat()
    }
}

/// Verifier with a fixed answer that counts how often it is consulted.
struct Fixed {
    answer: bool,
    calls: AtomicUsize,
}

impl Fixed {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self { answer, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl Verifier for Fixed {
    async fn verify(&self, _owner: &[u8], _message: &[u8], _signature: &[u8]) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn validator(verifier: Arc<Fixed>) -> Validator {
    let mut registry = SignatureRegistry::empty();
    registry.register_with_verifier(SignatureType::ARWEAVE, verifier);
    Validator::new(registry)
}

fn item(target: bool, anchor: bool, tags: &[Tag]) -> Vec<u8> {
    let mut builder = ItemBuilder::new(SignatureType::ARWEAVE).tags(tags.iter().cloned());
    if target {
        builder = builder.target([0x11; 32]);
    }
    if anchor {
        builder = builder.anchor([0x22; 32]);
    }
    builder.build(b"payload").unwrap().into_inner()
}

/// Offset of the tag count field for a type-1 item.
fn tags_count_start(target: bool, anchor: bool) -> usize {
    let optional = |present: bool| if present { 33 } else { 1 };
    2 + 512 + 512 + optional(target) + optional(anchor)
}

#[test]
fn presence_flag_combinations() {
    let validator = Validator::default();
    for (target, anchor) in [(false, false), (true, false), (false, true), (true, true)] {
        let buf = item(target, anchor, &[]);
        let layout = validator.check_structure(&buf).unwrap();

        let anchor_start = 1026 + if target { 33 } else { 1 };
        assert_eq!(layout.target_start(), 1026);
        assert_eq!(layout.anchor_start(), anchor_start);
        assert_eq!(layout.tags_count_start(), tags_count_start(target, anchor));
        assert_eq!(layout.has_target(), target);
        assert_eq!(layout.has_anchor(), anchor);
        assert_eq!(&buf[layout.data_start()..], b"payload");
    }
}

#[test]
fn tag_block_size_ceiling() {
    let mut buf = item(false, false, &[]);
    let size_at = tags_count_start(false, false) + 8;
    buf[size_at..size_at + 8].copy_from_slice(&4097u64.to_le_bytes());
    // Enough trailing bytes that the block would fit if it were allowed.
    buf.resize(buf.len() + 5000, 0);

    assert_eq!(
        Validator::default().check_structure(&buf),
        Err(ItemError::TagBlockTooLarge { size: 4097, max: 4096 })
    );
}

#[test]
fn tag_block_at_ceiling_is_accepted() {
    // count(1) + 2 * (name(1 + 1) + value(2 + n)) + terminator(1)
    let tags = vec![Tag::new("n", vec![b'v'; 3000]), Tag::new("m", vec![b'w'; 1086])];
    assert_eq!(encode_tags(&tags).len(), 4096);

    let buf = item(true, true, &tags);
    let layout = Validator::default().check_structure(&buf).unwrap();
    assert_eq!(layout.tag_block_size(), 4096);
    assert_eq!(&buf[layout.data_start()..], b"payload");

    let tighter = Validator::default()
        .with_limits(ValidationLimits { max_tag_block_size: 4095, ..ValidationLimits::default() });
    assert_eq!(
        tighter.check_structure(&buf),
        Err(ItemError::TagBlockTooLarge { size: 4096, max: 4095 })
    );
}

#[test]
fn declared_count_must_match() {
    let tags = vec![Tag::new("a", "1"), Tag::new("b", "2")];
    let mut buf = item(false, true, &tags);
    let count_at = tags_count_start(false, true);
    buf[count_at..count_at + 8].copy_from_slice(&3u64.to_le_bytes());

    assert_eq!(
        Validator::default().check_structure(&buf),
        Err(ItemError::TagCountMismatch { declared: 3, decoded: 2 })
    );
}

#[test]
fn malformed_tag_block() {
    let tags = vec![Tag::new("a", "1")];
    let mut buf = item(false, false, &tags);
    let block_at = tags_count_start(false, false) + 16;
    // Name length -1
    buf[block_at + 1] = 0x01;

    assert_eq!(
        Validator::default().check_structure(&buf),
        Err(ItemError::InvalidTagEncoding(TagError::NegativeLength(-1)))
    );
}

#[test]
fn invalid_presence_flag() {
    let mut buf = item(false, false, &[]);
    buf[1026] = 7;
    assert_eq!(
        Validator::default().check_structure(&buf),
        Err(ItemError::InvalidPresenceFlag { offset: 1026, value: 7 })
    );
}

#[test]
fn truncated_payload_region() {
    let buf = item(true, false, &[Tag::new("a", "b")]);
    let cut = &buf[..tags_count_start(true, false) + 17];
    assert!(matches!(
        Validator::default().check_structure(cut),
        Err(ItemError::TruncatedBuffer { .. })
    ));
}

#[test]
fn validation_is_repeatable_and_read_only() {
    let buf = item(true, true, &[Tag::new("x", "y")]);
    let copy = buf.clone();
    let validator = Validator::default();
    let first = validator.check_structure(&buf);
    let second = validator.check_structure(&buf);
    assert_eq!(first, second);
    assert_eq!(buf, copy);
}

#[tokio::test]
async fn signature_checked_after_structure() {
    let verifier = Fixed::new(true);
    let validator = validator(verifier.clone());

    let buf = item(false, false, &[]);
    assert_eq!(validator.validate(&buf, &Concat).await, Ok(()));
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);

    let mut broken = buf.clone();
    broken[1026] = 9;
    let result = validator.validate(&broken, &Concat).await;
    assert!(result.unwrap_err().is_structural());
    assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_signature_is_distinct() {
    let validator = validator(Fixed::new(false));
    let buf = item(true, false, &[Tag::new("a", "b")]);

    assert_eq!(validator.validate(&buf, &Concat).await, Err(ItemError::SignatureInvalid));
    assert_eq!(validator.is_valid(&buf, &Concat).await, Ok(false));

    let short = [0u8; 10];
    assert_eq!(
        validator.is_valid(&short, &Concat).await,
        Err(ItemError::TooSmall { len: 10, min: 80 })
    );
}

#[tokio::test]
async fn missing_verifier() {
    let validator = Validator::default();
    let buf = item(false, false, &[]);
    assert_eq!(
        validator.validate(&buf, &Concat).await,
        Err(ItemError::VerifierUnavailable { code: 1 })
    );
}

#[tokio::test]
async fn verifier_sees_item_fields() {
    struct Expect(Vec<u8>);

    #[async_trait]
    impl Verifier for Expect {
        async fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
            owner == [0xee; 512].as_slice()
                && signature == [0x5c; 512].as_slice()
                && message == self.0
        }
    }

    let mut built = ItemBuilder::new(SignatureType::ARWEAVE)
        .owner(vec![0xee; 512])
        .anchor([0x44; 32])
        .build(b"body")
        .unwrap();
    built.set_signature(&[0x5c; 512]).unwrap();
    let expected = Concat.signing_message(&built.fields());

    let mut registry = SignatureRegistry::empty();
    registry.register_with_verifier(SignatureType::ARWEAVE, Arc::new(Expect(expected)));
    let validator = Validator::new(registry);

    assert_eq!(validator.validate(built.as_bytes(), &Concat).await, Ok(()));
}
