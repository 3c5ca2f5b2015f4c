use cloudaudit_domain::policy::{EffectiveConfig, FailOn, RegionConfig};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_PROFILE: &str = "standard";
pub const PROFILES: &[&str] = &["standard", "strict"];

const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_MAX_FINDINGS: usize = 500;
const GLOBAL_REGION: &str = "us-east-1";

/// Commercial partition regions scanned when the config names none.
const COMMERCIAL_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "sa-east-1",
];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into the config file.
pub fn preset(profile: &str) -> EffectiveConfig {
    match profile {
        "strict" => strict_profile(),
        // default
        _ => standard_profile(),
    }
}

fn standard_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "standard".to_string(),
        fail_on: FailOn::Fail,
        concurrency: DEFAULT_CONCURRENCY,
        max_findings: DEFAULT_MAX_FINDINGS,
        regions: default_regions(),
        rules: BTreeMap::new(),
        suppress: Vec::new(),
        settings: Value::Object(Default::default()),
    }
}

fn strict_profile() -> EffectiveConfig {
    // Strict treats anything that could not be verified as a failure.
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Warn,
        ..standard_profile()
    }
}

fn default_regions() -> RegionConfig {
    RegionConfig {
        default: COMMERCIAL_REGIONS.iter().map(|r| r.to_string()).collect(),
        global: GLOBAL_REGION.to_string(),
        services: BTreeMap::new(),
    }
}
