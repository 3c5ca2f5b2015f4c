use cloudaudit_types::Severity;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    /// Only FAIL findings fail the run.
    Fail,
    /// WARN and UNKNOWN findings fail the run too.
    Warn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulePolicy {
    pub enabled: bool,
    /// Overrides the rule's declared severity.
    pub severity: Option<Severity>,
}

impl RulePolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Region lists supplied by configuration; the engine never discovers regions itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionConfig {
    pub default: Vec<String>,
    /// Region global resources (and the caller identity) are collected in.
    pub global: String,
    /// Service-specific lists keyed by service name (e.g. `opensearch`).
    pub services: BTreeMap<String, Vec<String>>,
}

impl RegionConfig {
    pub fn single(region: &str) -> Self {
        Self {
            default: vec![region.to_string()],
            global: region.to_string(),
            services: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: FailOn,
    /// Engine-wide bound on concurrently evaluated regions.
    pub concurrency: usize,
    pub max_findings: usize,
    pub regions: RegionConfig,
    /// Rules not listed here run with their declared severity.
    pub rules: BTreeMap<String, RulePolicy>,
    /// Glob patterns over `rule_id:region:resource`.
    pub suppress: Vec<String>,
    /// Opaque settings forwarded to every rule.
    pub settings: Value,
}

impl EffectiveConfig {
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rules.get(rule_id).is_none_or(|p| p.enabled)
    }

    pub fn severity_for(&self, rule_id: &str, declared: Severity) -> Severity {
        self.rules
            .get(rule_id)
            .and_then(|p| p.severity)
            .unwrap_or(declared)
    }
}
