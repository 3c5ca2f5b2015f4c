use cloudaudit_types::{Finding, RuleRunSummary, ScanData, SourceEntry, StatusCounts, Verdict};

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub counts: StatusCounts,
    pub rules: Vec<RuleRunSummary>,
    /// Cache entries read by the evaluated rules, in path order.
    pub source: Vec<SourceEntry>,
    pub data: ScanData,
}
