use crate::arn;
use crate::cache::CacheReader;
use crate::payload::FieldError;
use crate::sink::FindingRecorder;
use cloudaudit_types::{CachePath, Severity};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// One provider API call a rule reads from the cache, e.g. `OpenSearch:describeDomain`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiCall {
    pub service: &'static str,
    pub operation: &'static str,
}

impl ApiCall {
    pub const fn new(service: &'static str, operation: &'static str) -> Self {
        Self { service, operation }
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.operation)
    }
}

/// Which configured region list a rule is dispatched over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionArea {
    /// The default region list.
    All,
    /// A service-specific region list, falling back to the default list.
    Service(&'static str),
    /// Global resources, evaluated once in the configured global region.
    Global,
}

/// Declared metadata of a rule. Immutable after registration.
#[derive(Clone, Debug)]
pub struct RuleMeta {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub domain: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub more_info: &'static str,
    pub link: Option<&'static str>,
    pub recommended_action: &'static str,
    pub apis: &'static [ApiCall],
    /// Provider events (`service:Action`) after which the rule should be re-run.
    pub realtime_triggers: &'static [&'static str],
    pub regions: RegionArea,
}

impl RuleMeta {
    /// Whether `path` is a call listed in `apis`.
    pub fn declares_api(&self, path: &CachePath) -> bool {
        self.apis
            .iter()
            .any(|api| path.matches_api(api.service, api.operation))
    }
}

/// Per-region inputs handed to [`Rule::evaluate`].
#[derive(Clone, Copy, Debug)]
pub struct RegionScope<'a> {
    pub region: &'a str,
    pub partition: &'a str,
    pub account_id: Option<&'a str>,
    /// Opaque run settings, forwarded unmodified.
    pub settings: &'a Value,
}

impl<'a> RegionScope<'a> {
    pub fn new(region: &'a str, account_id: Option<&'a str>, settings: &'a Value) -> Self {
        Self {
            region,
            partition: arn::partition_for_region(region),
            account_id,
            settings,
        }
    }

    /// Fully qualified identifier for a resource in this region.
    pub fn arn(&self, service: &str, resource: &str) -> String {
        arn::resource_arn(self.partition, service, self.region, self.account_id, resource)
    }

    pub fn setting_bool(&self, key: &str) -> Option<bool> {
        self.settings.get(key).and_then(Value::as_bool)
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{0}")]
    Internal(String),
}

/// A self-describing unit of compliance logic.
///
/// `evaluate` runs once per region, possibly on several threads at once. It must read only
/// through `cache` and report only through `out`.
pub trait Rule: Send + Sync {
    fn meta(&self) -> &RuleMeta;

    fn evaluate(
        &self,
        scope: &RegionScope<'_>,
        cache: &dyn CacheReader,
        out: &mut dyn FindingRecorder,
    ) -> Result<(), RuleError>;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("id", &self.meta().id).finish()
    }
}
