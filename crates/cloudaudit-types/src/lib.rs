//! Stable DTOs and IDs used across the cloudaudit workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted scan report
//! - stable string IDs for rules and finding codes
//! - the canonical cache path key used to address collected API responses

#![forbid(unsafe_code)]

pub mod cache_path;
pub mod ids;
pub mod receipt;

pub use cache_path::CachePath;
pub use receipt::{
    Finding, ReportEnvelope, RuleRunSummary, SCHEMA_SCAN_REPORT_V1, ScanData, ScanReport,
    Severity, SourceEntry, Status, StatusCounts, ToolMeta, Verdict,
};
