//! Fuzz target for data package descriptor parsing.
//!
//! Feeds arbitrary bytes to the JSON descriptor parser and then reads every
//! field of whatever parsed, checking for panics.
//!
//! Run with:
//!   cargo +nightly fuzz run datapackage_json_parse

#![no_main]

use datakitten::format::datapackage::Datapackage;
use datakitten::format::MetadataAdapter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Descriptors are small; larger inputs only slow the fuzzer down.
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(package) = Datapackage::from_json_slice(data) {
        let _ = package.licenses();
        let _ = package.maintainers();
        let _ = package.publishers();
        let _ = package.distributions();
        let _ = package.temporal();
        let _ = package.release_type();
    }
});
