use crate::rule::Rule;
use std::sync::Arc;

mod opensearch;
mod opensearch_enable_audit_logs;
mod opensearch_encrypted_domain;
mod utils;


pub use opensearch_enable_audit_logs::EnableAuditLogs;
pub use opensearch_encrypted_domain::EncryptedDomain;

/// Every rule shipped with the engine.
pub fn builtin() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(EnableAuditLogs), Arc::new(EncryptedDomain)]
}
