//! Fuzz target for `cloudaudit.toml` parsing and resolution.
//!
//! Goal: Parsing and resolving should **never panic** on any input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(cfg) = cloudaudit_settings::parse_config_toml(text) {
            let _ = cloudaudit_settings::resolve_config(cfg, Default::default());
        }
    }
});
