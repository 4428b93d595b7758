//! Structural validation of arbitrary buffers.
//!
//! Must never panic. Anything accepted must also lay out as a `BundleItem`
//! whose accessors stay inside the buffer.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parcel_proto::{BundleItem, SignatureRegistry, Validator};

fuzz_target!(|data: &[u8]| {
    let validator = Validator::new(SignatureRegistry::extended());
    let Ok(layout) = validator.check_structure(data) else {
        return;
    };

    let item = BundleItem::new(data, validator.registry())
        .unwrap_or_else(|err| panic!("validated buffer failed to lay out: {err}"));
    assert_eq!(item.layout(), &layout);
    assert!(layout.data_start() <= data.len());

    let _ = item.raw_signature();
    let _ = item.raw_owner();
    let _ = item.raw_target();
    let _ = item.raw_anchor();
    let _ = item.raw_data();
    let _ = item.id();
    assert!(item.tags().is_ok());
});
