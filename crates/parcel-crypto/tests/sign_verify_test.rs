//! Sign and verify items end to end with Ed25519 keys and the deep hash.

use parcel_crypto::{DeepHashMessage, Ed25519Signer, ed25519_registry};
use parcel_proto::{BundleItem, ItemBuilder, ItemError, SignatureType, Tag, Validator};

const SEED: [u8; 32] = [0x42; 32];

fn unsigned(signature_type: SignatureType) -> BundleItem {
    ItemBuilder::new(signature_type)
        .target([0x10; 32])
        .anchor([0x20; 32])
        .tag("Content-Type", "text/plain")
        .tag("App-Name", "parcel")
        .build(b"signed payload")
        .unwrap()
}

#[tokio::test]
async fn signed_item_validates() {
    let signer = Ed25519Signer::from_seed(&SEED);
    let mut item = unsigned(SignatureType::ED25519);

    let id = item.sign(&signer, &DeepHashMessage).await.unwrap();
    assert!(item.is_signed());
    assert_eq!(item.raw_owner(), parcel_proto::Signer::public_key(&signer));
    assert_eq!(id, item.id());

    let validator = Validator::new(ed25519_registry());
    assert_eq!(validator.validate(item.as_bytes(), &DeepHashMessage).await, Ok(()));

    // A fresh view of the same bytes derives the same identifier.
    let reparsed = BundleItem::new(item.as_bytes(), &ed25519_registry()).unwrap();
    assert_eq!(reparsed.id(), id);
}

#[tokio::test]
async fn tampered_payload_fails_signature_check() {
    let signer = Ed25519Signer::from_seed(&SEED);
    let mut item = unsigned(SignatureType::ED25519);
    item.sign(&signer, &DeepHashMessage).await.unwrap();

    let mut bytes = item.into_inner();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let validator = Validator::new(ed25519_registry());
    assert_eq!(
        validator.validate(&bytes, &DeepHashMessage).await,
        Err(ItemError::SignatureInvalid)
    );
    assert_eq!(validator.is_valid(&bytes, &DeepHashMessage).await, Ok(false));
}

#[tokio::test]
async fn tampered_tags_fail_signature_check() {
    let signer = Ed25519Signer::from_seed(&SEED);
    let mut item = unsigned(SignatureType::ED25519);
    item.sign(&signer, &DeepHashMessage).await.unwrap();

    // Same length tag value, different content.
    let tags_start = item.layout().tags_start();
    let block_len = item.raw_tags().len();
    let mut bytes = item.into_inner();
    let value_byte = tags_start + block_len - 2;
    bytes[value_byte] = bytes[value_byte].wrapping_add(1);

    let validator = Validator::new(ed25519_registry());
    assert_eq!(
        validator.validate(&bytes, &DeepHashMessage).await,
        Err(ItemError::SignatureInvalid)
    );
}

#[tokio::test]
async fn solana_typed_items_use_the_same_key() {
    let signer = Ed25519Signer::from_seed(&SEED).with_signature_type(SignatureType::SOLANA).unwrap();
    let mut item = ItemBuilder::new(SignatureType::SOLANA)
        .tags(vec![Tag::new("chain", "solana")])
        .build(b"")
        .unwrap();
    item.sign(&signer, &DeepHashMessage).await.unwrap();

    let validator = Validator::new(ed25519_registry());
    assert!(validator.is_valid(item.as_bytes(), &DeepHashMessage).await.unwrap());
}

#[tokio::test]
async fn signer_type_must_match_item() {
    let signer = Ed25519Signer::from_seed(&SEED);
    let mut item = unsigned(SignatureType::SOLANA);
    let before = item.as_bytes().to_vec();

    assert_eq!(
        item.sign(&signer, &DeepHashMessage).await,
        Err(ItemError::SignerMismatch { expected: 4, actual: 2 })
    );
    assert_eq!(item.as_bytes(), before.as_slice());
}

#[tokio::test]
async fn different_seeds_do_not_cross_verify() {
    let mut item = unsigned(SignatureType::ED25519);
    item.sign(&Ed25519Signer::from_seed(&SEED), &DeepHashMessage).await.unwrap();

    let other = Ed25519Signer::from_seed(&[0x43; 32]);
    item.set_owner(parcel_proto::Signer::public_key(&other)).unwrap();

    let validator = Validator::new(ed25519_registry());
    assert_eq!(
        validator.validate(item.as_bytes(), &DeepHashMessage).await,
        Err(ItemError::SignatureInvalid)
    );
}
