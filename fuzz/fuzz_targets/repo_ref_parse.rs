//! Fuzz target for repository address parsing and origin classification.
//!
//! Run with:
//!   cargo +nightly fuzz run repo_ref_parse

#![no_main]

use datakitten::host::parse_repo_ref;
use datakitten::origin::is_git_address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(address) = std::str::from_utf8(data) else {
        return;
    };
    let _ = is_git_address(address);
    let _ = parse_repo_ref(address);
});
