//! Fuzz target for YAML data package descriptors.
//!
//! Run with:
//!   cargo +nightly fuzz run datapackage_yaml_parse

#![no_main]

use datakitten::format::datapackage::fuzz_parse_yaml_descriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let _ = fuzz_parse_yaml_descriptor(input);
});
