use super::opensearch::evaluate_domains;
use crate::cache::CacheReader;
use crate::payload;
use crate::rule::{ApiCall, RegionArea, RegionScope, Rule, RuleError, RuleMeta};
use crate::sink::FindingRecorder;
use cloudaudit_types::{Severity, ids};
use serde::Deserialize;

/// Setting that turns a domain encrypted with the service-owned key into a WARN.
pub const REQUIRE_KMS_KEY_SETTING: &str = "opensearch_encryption_require_kms_key";

static META: RuleMeta = RuleMeta {
    id: ids::RULE_OPENSEARCH_ENCRYPTED_DOMAIN,
    title: "OpenSearch Encrypted Domain",
    category: "OpenSearch",
    domain: "Databases",
    severity: Severity::High,
    description: "Ensures OpenSearch domains are encrypted at rest.",
    more_info: "OpenSearch domains should be encrypted at rest so that indices, logs, swap files \
                and automated snapshots are protected with a KMS key.",
    link: Some(
        "https://docs.aws.amazon.com/opensearch-service/latest/developerguide/encryption-at-rest.html",
    ),
    recommended_action: "Create a new OpenSearch domain with encryption at rest enabled.",
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

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainStatusView {
    #[serde(default)]
    encryption_at_rest_options: Option<EncryptionAtRestView>,
}

#[derive(Debug, Default, Deserialize)]
struct EncryptionAtRestView {
    #[serde(rename = "Enabled", default)]
    enabled: Option<bool>,
    #[serde(rename = "KmsKeyId", default)]
    kms_key_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EncryptedDomain;

impl Rule for EncryptedDomain {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn evaluate(
        &self,
        scope: &RegionScope<'_>,
        cache: &dyn CacheReader,
        out: &mut dyn FindingRecorder,
    ) -> Result<(), RuleError> {
        evaluate_domains(scope, cache, out, |scope, status, resource, out| {
            let view: DomainStatusView = payload::decode(status)?;
            let encryption = view.encryption_at_rest_options.unwrap_or_default();

            if encryption.enabled != Some(true) {
                out.fail(
                    ids::CODE_ENCRYPTION_AT_REST_DISABLED,
                    "Encryption at rest is not enabled for OpenSearch domain".to_string(),
                    Some(resource.to_string()),
                );
                return Ok(());
            }

            let require_kms_key = scope.setting_bool(REQUIRE_KMS_KEY_SETTING).unwrap_or(false);
            let has_key = encryption
                .kms_key_id
                .as_deref()
                .is_some_and(|key| !key.is_empty() && !key.ends_with("alias/aws/es"));
            if require_kms_key && !has_key {
                out.warn(
                    ids::CODE_ENCRYPTION_DEFAULT_KEY,
                    "Encryption at rest is enabled for OpenSearch domain but does not use a \
                     customer managed KMS key"
                        .to_string(),
                    Some(resource.to_string()),
                );
            } else {
                out.ok(
                    ids::CODE_ENCRYPTION_AT_REST_ENABLED,
                    "Encryption at rest is enabled for OpenSearch domain".to_string(),
                    Some(resource.to_string()),
                );
            }
            Ok(())
        })
    }
}
