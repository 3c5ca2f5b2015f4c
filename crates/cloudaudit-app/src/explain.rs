//! The `explain` use case: look up rule documentation.

use cloudaudit_domain::registry::RuleRegistry;
use cloudaudit_domain::rule::{RegionArea, RuleMeta};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    /// Found the rule's declared metadata.
    Found(RuleMeta),
    /// Unknown identifier; includes the registered rule ids.
    NotFound {
        identifier: String,
        available_rule_ids: Vec<&'static str>,
    },
}

/// Look up a rule by id.
pub fn run_explain(registry: &RuleRegistry, identifier: &str) -> ExplainOutput {
    match registry.get(identifier) {
        Some(rule) => ExplainOutput::Found(rule.meta().clone()),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_rule_ids: registry.ids(),
        },
    }
}

/// Format a rule's metadata for terminal display.
pub fn format_explanation(meta: &RuleMeta) -> String {
    let mut out = String::new();

    out.push_str(meta.title);
    out.push('\n');
    out.push_str(&"=".repeat(meta.title.len()));
    out.push_str("\n\n");
    out.push_str(&format!(
        "{} | {} / {} | severity: {}\n\n",
        meta.id,
        meta.category,
        meta.domain,
        meta.severity.as_str()
    ));
    out.push_str(meta.description);
    out.push_str("\n\n");
    if !meta.more_info.trim().is_empty() {
        out.push_str(meta.more_info.trim());
        out.push_str("\n\n");
    }
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(meta.recommended_action);
    out.push('\n');
    if let Some(link) = meta.link {
        out.push_str(&format!("See: {link}\n"));
    }
    out.push('\n');

    out.push_str("Required APIs\n");
    out.push_str("-------------\n");
    for api in meta.apis {
        out.push_str(&format!("  - {api}\n"));
    }

    if !meta.realtime_triggers.is_empty() {
        out.push_str("\nChange triggers\n");
        out.push_str("---------------\n");
        for trigger in meta.realtime_triggers {
            out.push_str(&format!("  - {trigger}\n"));
        }
    }

    out.push_str("\nRegions: ");
    out.push_str(&match meta.regions {
        RegionArea::All => "all configured regions".to_string(),
        RegionArea::Service(service) => format!("configured `{service}` regions"),
        RegionArea::Global => "global region only".to_string(),
    });
    out.push('\n');

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, rule_ids: &[&str]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown rule_id: {}\n\n", identifier));
    out.push_str("Available rule_ids:\n");
    for id in rule_ids {
        out.push_str(&format!("  - {}\n", id));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RuleRegistry {
        RuleRegistry::with_builtin_rules().expect("builtin rules")
    }

    #[test]
    fn explain_known_rule_id() {
        let output = run_explain(&registry(), "opensearch.enable_audit_logs");
        assert!(matches!(output, ExplainOutput::Found(_)));
    }

    #[test]
    fn explain_unknown() {
        let output = run_explain(&registry(), "not_a_real_thing");
        let (identifier, available) = unwrap_not_found(output);
        assert_eq!(identifier, "not_a_real_thing");
        assert!(available.contains(&"opensearch.encrypted_domain"));
    }

    #[test]
    fn format_explanation_output() {
        let meta = unwrap_found(run_explain(&registry(), "opensearch.enable_audit_logs"));
        let formatted = format_explanation(&meta);
        assert!(formatted.starts_with("OpenSearch Enable Audit Logs\n"));
        assert!(formatted.contains("Remediation"));
        assert!(formatted.contains("Modify Opensearch domain and enable audit logs."));
        assert!(formatted.contains("  - OpenSearch:describeDomain"));
        assert!(formatted.contains("  - opensearch:UpdateDomainConfig"));
        assert!(formatted.contains("severity: medium"));
    }

    #[test]
    fn format_not_found_output() {
        let formatted = format_not_found("missing", &["rule.one", "rule.two"]);
        assert!(formatted.contains("Unknown rule_id: missing"));
        assert!(formatted.contains("rule.one"));
        assert!(formatted.contains("rule.two"));
    }

    fn unwrap_found(output: ExplainOutput) -> RuleMeta {
        match output {
            ExplainOutput::Found(meta) => meta,
            _ => panic!("expected Found"),
        }
    }

    fn unwrap_not_found(output: ExplainOutput) -> (String, Vec<&'static str>) {
        match output {
            ExplainOutput::NotFound {
                identifier,
                available_rule_ids,
            } => (identifier, available_rule_ids),
            _ => panic!("expected NotFound"),
        }
    }
}
