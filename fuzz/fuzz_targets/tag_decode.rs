//! Tag block decoding of arbitrary bytes.
//!
//! Decoded tags must re-encode to a block that decodes to the same tags.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parcel_proto::{decode_tags, encode_tags};

fuzz_target!(|data: &[u8]| {
    let Ok(tags) = decode_tags(data) else {
        return;
    };
    let reencoded = encode_tags(&tags);
    assert_eq!(decode_tags(&reencoded).ok(), Some(tags));
});
