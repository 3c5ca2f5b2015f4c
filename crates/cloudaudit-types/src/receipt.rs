use crate::CachePath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// Stable schema identifier for cloudaudit scan reports.
pub const SCHEMA_SCAN_REPORT_V1: &str = "cloudaudit.report.v1";

/// Outcome of one evaluation. The numeric codes are part of the wire contract.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warn,
    Fail,
    Unknown,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warn => 1,
            Status::Fail => 2,
            Status::Unknown => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::Warn),
            2 => Some(Status::Fail),
            3 => Some(Status::Unknown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

/// Declared impact of a rule. Carried on findings for downstream triage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub rule_id: String,
    pub status: Status,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub region: String,

    /// Present whenever the finding concerns one resource rather than the whole region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Stable identifier intended for dedup and trending: a hash of
    /// `rule_id + code + region + resource`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusCounts {
    pub ok: u32,
    pub warn: u32,
    pub fail: u32,
    pub unknown: u32,
}

impl StatusCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = StatusCounts::default();
        for f in findings {
            match f.status {
                Status::Ok => counts.ok = counts.ok.saturating_add(1),
                Status::Warn => counts.warn = counts.warn.saturating_add(1),
                Status::Fail => counts.fail = counts.fail.saturating_add(1),
                Status::Unknown => counts.unknown = counts.unknown.saturating_add(1),
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.ok
            .saturating_add(self.warn)
            .saturating_add(self.fail)
            .saturating_add(self.unknown)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Per-rule execution summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleRunSummary {
    pub rule_id: String,
    pub title: String,
    pub severity: Severity,
    pub regions: Vec<String>,
    pub findings: u32,

    /// Regions whose evaluation faulted and were reported as a single UNKNOWN.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faulted_regions: Vec<String>,
}

/// A cache entry a rule read while evaluating, echoed for cross-referencing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceEntry {
    pub path: CachePath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cloudaudit-specific summary payload for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ScanData {
    pub profile: String,

    pub rules_evaluated: u32,
    pub regions_evaluated: u32,

    pub findings_total: u32,
    pub findings_emitted: u32,
    pub findings_suppressed: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,
}

/// A generic report envelope.
///
/// Keeping this generic allows tool-specific data while still enforcing a stable outer shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = ScanData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,
    pub counts: StatusCounts,
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub rules: Vec<RuleRunSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<SourceEntry>,
    pub data: TData,
}

pub type ScanReport = ReportEnvelope<ScanData>;
