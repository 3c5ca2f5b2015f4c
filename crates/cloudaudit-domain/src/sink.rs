//! Finding construction and accumulation.

use cloudaudit_types::{Finding, Severity, Status};
use std::sync::{Mutex, PoisonError};

/// Where a rule reports outcomes for the region it is evaluating.
///
/// The rule id, severity and region are bound by the caller; a rule only supplies the status,
/// a code, a message and (for resource-level outcomes) the resource identifier.
pub trait FindingRecorder {
    fn record(&mut self, status: Status, code: &str, message: String, resource: Option<String>);

    fn ok(&mut self, code: &str, message: String, resource: Option<String>) {
        self.record(Status::Ok, code, message, resource);
    }

    fn warn(&mut self, code: &str, message: String, resource: Option<String>) {
        self.record(Status::Warn, code, message, resource);
    }

    fn fail(&mut self, code: &str, message: String, resource: Option<String>) {
        self.record(Status::Fail, code, message, resource);
    }

    fn unknown(&mut self, code: &str, message: String, resource: Option<String>) {
        self.record(Status::Unknown, code, message, resource);
    }
}

/// Recorder for one (rule, region) task.
#[derive(Debug)]
pub struct RegionRecorder<'a> {
    rule_id: &'a str,
    severity: Severity,
    region: &'a str,
    findings: Vec<Finding>,
}

impl<'a> RegionRecorder<'a> {
    pub fn new(rule_id: &'a str, severity: Severity, region: &'a str) -> Self {
        Self {
            rule_id,
            severity,
            region,
            findings: Vec::new(),
        }
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl FindingRecorder for RegionRecorder<'_> {
    fn record(&mut self, status: Status, code: &str, message: String, resource: Option<String>) {
        self.findings.push(Finding {
            rule_id: self.rule_id.to_string(),
            status,
            severity: self.severity,
            code: code.to_string(),
            message,
            region: self.region.to_string(),
            resource,
            fingerprint: None,
        });
    }
}

/// Append-only collector shared by the region tasks of one rule run.
///
/// Batches land in completion order. No dedup, no sorting.
#[derive(Debug, Default)]
pub struct ResultSink {
    findings: Mutex<Vec<Finding>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, batch: Vec<Finding>) {
        // Only whole batches are ever pushed, so a poisoned guard is still consistent.
        let mut guard = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        guard.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.findings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_binds_rule_region_and_severity() {
        let mut rec = RegionRecorder::new("opensearch.enable_audit_logs", Severity::Medium, "eu-west-1");
        rec.fail(
            "audit_logs_disabled",
            "Audit Logs feature is not enabled for OpenSearch domain".to_string(),
            Some("arn:aws:es:eu-west-1:123456789012:domain/logs".to_string()),
        );
        rec.unknown("listing_unavailable", "boom".to_string(), None);

        let findings = rec.into_findings();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].status, Status::Fail);
        assert_eq!(findings[0].region, "eu-west-1");
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[1].status, Status::Unknown);
        assert!(findings[1].resource.is_none());
    }

    #[test]
    fn sink_keeps_batches_in_append_order() {
        let sink = ResultSink::new();
        let mut a = RegionRecorder::new("r", Severity::Low, "a");
        a.ok("c", "first".to_string(), None);
        let mut b = RegionRecorder::new("r", Severity::Low, "b");
        b.ok("c", "second".to_string(), None);
        b.ok("c", "third".to_string(), None);

        sink.append(b.into_findings());
        sink.append(a.into_findings());
        assert_eq!(sink.len(), 3);

        let messages: Vec<String> = sink.into_findings().into_iter().map(|f| f.message).collect();
        assert_eq!(messages, vec!["second", "third", "first"]);
    }
}
