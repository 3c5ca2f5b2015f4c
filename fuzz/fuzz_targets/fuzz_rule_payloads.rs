//! Fuzz target for the built-in rules over arbitrary `describeDomain` payloads.
//!
//! Goal: Rules should **never fault** on malformed payloads. Bad shapes must surface as
//! UNKNOWN findings, not as rule errors or panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_payloads
//! ```

#![no_main]

use arbitrary::Arbitrary;
use cloudaudit_domain::cache::{CacheEntry, ResultCache};
use cloudaudit_domain::registry::RuleRegistry;
use cloudaudit_domain::rule::RegionScope;
use cloudaudit_domain::sink::RegionRecorder;
use cloudaudit_types::CachePath;
use libfuzzer_sys::fuzz_target;

const REGION: &str = "us-east-1";

#[derive(Arbitrary, Debug)]
struct PayloadInput {
    /// Domain names returned by the listing (e.g., "logs", "search")
    names: Vec<String>,
    /// Raw JSON text used as the matching domain's detail payload
    details: Vec<String>,
}

fuzz_target!(|input: PayloadInput| {
    // Limit input size to keep fuzzing fast
    if input.names.len() > 8 || input.details.iter().any(|d| d.len() > 4096) {
        return;
    }

    let mut cache = ResultCache::new();
    let listing: Vec<serde_json::Value> = input
        .names
        .iter()
        .map(|name| serde_json::json!({ "DomainName": name }))
        .collect();
    cache.insert(
        CachePath::region("opensearch", "listDomainNames", REGION),
        CacheEntry::data(serde_json::Value::Array(listing)),
    );
    for (name, detail) in input.names.iter().zip(&input.details) {
        if let Ok(value) = serde_json::from_str(detail) {
            cache.insert(
                CachePath::resource("opensearch", "describeDomain", REGION, name.as_str()),
                CacheEntry::data(value),
            );
        }
    }

    let Ok(registry) = RuleRegistry::with_builtin_rules() else {
        return;
    };
    let settings = serde_json::Value::Null;
    let scope = RegionScope::new(REGION, None, &settings);
    for rule in registry.rules() {
        let meta = rule.meta();
        let mut out = RegionRecorder::new(meta.id, meta.severity, REGION);
        assert!(rule.evaluate(&scope, &cache, &mut out).is_ok());
    }
});
