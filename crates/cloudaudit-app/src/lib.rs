//! Use case orchestration for cloudaudit.
//!
//! This crate provides the application layer: use cases that coordinate the domain, settings,
//! and snapshot layers. It is intentionally thin and delegates heavy lifting to those layers.
//!
//! A front end depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod report;
mod scan;

pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use report::{parse_report_json, serialize_report, write_report};
pub use scan::{
    RuleSelection, ScanInput, ScanOutput, run_scan, run_scan_with_cache, run_triggered,
    verdict_exit_code,
};
