//! Stable identifiers for rules and finding codes.
//!
//! `rule_id` is a dotted namespace (`<service>.<check>`). `code` is a short snake_case discriminator.

// Rules
pub const RULE_OPENSEARCH_ENABLE_AUDIT_LOGS: &str = "opensearch.enable_audit_logs";
pub const RULE_OPENSEARCH_ENCRYPTED_DOMAIN: &str = "opensearch.encrypted_domain";

// Codes shared by every list/detail rule
pub const CODE_LISTING_UNAVAILABLE: &str = "listing_unavailable";
pub const CODE_NO_RESOURCES: &str = "no_resources";
pub const CODE_DETAIL_UNAVAILABLE: &str = "detail_unavailable";

// Codes: opensearch.enable_audit_logs
pub const CODE_AUDIT_LOGS_ENABLED: &str = "audit_logs_enabled";
pub const CODE_AUDIT_LOGS_DISABLED: &str = "audit_logs_disabled";

// Codes: opensearch.encrypted_domain
pub const CODE_ENCRYPTION_AT_REST_ENABLED: &str = "encryption_at_rest_enabled";
pub const CODE_ENCRYPTION_AT_REST_DISABLED: &str = "encryption_at_rest_disabled";
pub const CODE_ENCRYPTION_DEFAULT_KEY: &str = "encryption_default_key";

// Engine-level
pub const CODE_RULE_FAULT: &str = "rule_fault";
