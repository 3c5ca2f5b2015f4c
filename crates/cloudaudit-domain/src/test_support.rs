use crate::cache::{CacheEntry, CacheReader, ResultCache};
use crate::policy::{EffectiveConfig, FailOn, RegionConfig};
use crate::rule::{ApiCall, RegionArea, RegionScope, Rule, RuleError, RuleMeta};
use crate::sink::FindingRecorder;
use cloudaudit_types::{CachePath, Severity};
use serde_json::{Value, json};
use std::collections::BTreeMap;

const TEST_APIS: &[ApiCall] = &[ApiCall::new("Test", "listThings")];

pub fn meta(id: &'static str) -> RuleMeta {
    RuleMeta {
        id,
        title: "Test rule",
        category: "Test",
        domain: "Testing",
        severity: Severity::Medium,
        description: "Rule used by tests.",
        more_info: "",
        link: None,
        recommended_action: "Nothing to do.",
        apis: TEST_APIS,
        realtime_triggers: &[],
        regions: RegionArea::All,
    }
}

/// Rule that never records anything.
pub struct StaticRule {
    meta: RuleMeta,
}

impl StaticRule {
    pub fn new(meta: RuleMeta) -> Self {
        Self { meta }
    }
}

impl Rule for StaticRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn evaluate(
        &self,
        _scope: &RegionScope<'_>,
        _cache: &dyn CacheReader,
        _out: &mut dyn FindingRecorder,
    ) -> Result<(), RuleError> {
        Ok(())
    }
}

type EvalFn = dyn Fn(&RegionScope<'_>, &dyn CacheReader, &mut dyn FindingRecorder) -> Result<(), RuleError>
    + Send
    + Sync;

/// Rule whose evaluation is a closure.
pub struct FnRule {
    meta: RuleMeta,
    eval: Box<EvalFn>,
}

impl FnRule {
    pub fn new<F>(meta: RuleMeta, eval: F) -> Self
    where
        F: Fn(&RegionScope<'_>, &dyn CacheReader, &mut dyn FindingRecorder) -> Result<(), RuleError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            meta,
            eval: Box::new(eval),
        }
    }
}

impl Rule for FnRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn evaluate(
        &self,
        scope: &RegionScope<'_>,
        cache: &dyn CacheReader,
        out: &mut dyn FindingRecorder,
    ) -> Result<(), RuleError> {
        (self.eval)(scope, cache, out)
    }
}

pub fn regions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn config(names: &[&str]) -> EffectiveConfig {
    let default = regions(names);
    EffectiveConfig {
        profile: "test".to_string(),
        fail_on: FailOn::Fail,
        concurrency: 4,
        max_findings: 200,
        regions: RegionConfig {
            global: default.first().cloned().unwrap_or_default(),
            default,
            services: BTreeMap::new(),
        },
        rules: BTreeMap::new(),
        suppress: Vec::new(),
        settings: Value::Null,
    }
}

/// `listDomainNames` payload.
pub fn domain_listing(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|name| json!({"DomainName": name, "EngineType": "OpenSearch"}))
            .collect(),
    )
}

/// `describeDomain` payload with audit logs and encryption at rest both set to `enabled`.
pub fn domain_detail(enabled: bool) -> Value {
    json!({
        "DomainStatus": {
            "DomainName": "ignored",
            "LogPublishingOptions": {
                "AUDIT_LOGS": {
                    "CloudWatchLogsLogGroupArn": "arn:aws:logs:us-east-1:123456789012:log-group:audit",
                    "Enabled": enabled
                }
            },
            "EncryptionAtRestOptions": {
                "Enabled": enabled
            }
        }
    })
}

pub fn opensearch_cache(region: &str, listing: Value, details: Vec<(&str, Value)>) -> ResultCache {
    let mut cache = ResultCache::new();
    cache.insert(
        CachePath::region("opensearch", "listDomainNames", region),
        CacheEntry::data(listing),
    );
    for (name, detail) in details {
        cache.insert(
            CachePath::resource("opensearch", "describeDomain", region, name),
            CacheEntry::data(detail),
        );
    }
    cache
}
