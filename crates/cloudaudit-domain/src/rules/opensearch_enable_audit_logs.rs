use super::opensearch::evaluate_domains;
use crate::cache::CacheReader;
use crate::payload;
use crate::rule::{ApiCall, RegionArea, RegionScope, Rule, RuleError, RuleMeta};
use crate::sink::FindingRecorder;
use cloudaudit_types::{Severity, ids};

static META: RuleMeta = RuleMeta {
    id: ids::RULE_OPENSEARCH_ENABLE_AUDIT_LOGS,
    title: "OpenSearch Enable Audit Logs",
    category: "OpenSearch",
    domain: "Databases",
    severity: Severity::Medium,
    description: "Ensures the Audit Logs feature is enabled for all the Amazon OpenSearch domains.",
    more_info: "The Audit Logs feature allows you to log all user activity on your Amazon \
                OpenSearch domains (clusters), including failed login attempts, and which users \
                accessed certain indices, documents, or fields.",
    link: Some("https://docs.aws.amazon.com/opensearch-service/latest/developerguide/audit-logs.html"),
    recommended_action: "Modify Opensearch domain and enable audit logs.",
    apis: &[
        ApiCall::new("OpenSearch", "listDomainNames"),
        ApiCall::new("OpenSearch", "describeDomain"),
    ],
    realtime_triggers: &[
        "opensearch:CreateDomain",
        "opensearch:UpdateDomainConfig",
        "opensearch:DeleteDomain",
    ],
    regions: RegionArea::Service("opensearch"),
};

#[derive(Clone, Copy, Debug, Default)]
pub struct EnableAuditLogs;

impl Rule for EnableAuditLogs {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn evaluate(
        &self,
        scope: &RegionScope<'_>,
        cache: &dyn CacheReader,
        out: &mut dyn FindingRecorder,
    ) -> Result<(), RuleError> {
        evaluate_domains(scope, cache, out, |_, status, resource, out| {
            let enabled =
                payload::optional_bool(status, &["LogPublishingOptions", "AUDIT_LOGS", "Enabled"])?;
            if enabled == Some(true) {
                out.ok(
                    ids::CODE_AUDIT_LOGS_ENABLED,
                    "Audit Logs feature is enabled for OpenSearch domain".to_string(),
                    Some(resource.to_string()),
                );
            } else {
                out.fail(
                    ids::CODE_AUDIT_LOGS_DISABLED,
                    "Audit Logs feature is not enabled for OpenSearch domain".to_string(),
                    Some(resource.to_string()),
                );
            }
            Ok(())
        })
    }
}
