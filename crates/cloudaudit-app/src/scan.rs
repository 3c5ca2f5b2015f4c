//! The `scan` use case: evaluate rules over a snapshot and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use cloudaudit_domain::cache::ResultCache;
use cloudaudit_domain::registry::RuleRegistry;
use cloudaudit_domain::report::DomainReport;
use cloudaudit_domain::Selection;
use cloudaudit_settings::{CloudauditConfigV1, Overrides, ResolvedConfig};
use cloudaudit_types::{ReportEnvelope, SCHEMA_SCAN_REPORT_V1, ScanReport, ToolMeta, Verdict};
use time::OffsetDateTime;
use tracing::info;

/// Which rules a scan evaluates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RuleSelection {
    #[default]
    All,
    Rules(Vec<String>),
    /// Rules subscribed to a provider change event, e.g. `opensearch:UpdateDomainConfig`.
    Trigger(String),
}

/// Input for the scan use case.
#[derive(Clone, Debug)]
pub struct ScanInput<'a> {
    /// Snapshot file or directory of snapshot shards.
    pub snapshot: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Caller overrides.
    pub overrides: Overrides,
    pub selection: RuleSelection,
}

/// Output from the scan use case.
#[derive(Clone, Debug)]
pub struct ScanOutput {
    /// The generated report.
    pub report: ScanReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the scan use case: parse config, load the snapshot, evaluate rules, produce a report.
pub fn run_scan(input: ScanInput<'_>) -> anyhow::Result<ScanOutput> {
    let snapshot = cloudaudit_snapshot::load_snapshot(input.snapshot)
        .with_context(|| format!("load snapshot {}", input.snapshot))?;
    run_scan_with_cache(
        &snapshot.cache,
        input.config_text,
        input.overrides,
        &input.selection,
    )
}

/// Re-evaluate only the rules that declare `event` as a change trigger.
pub fn run_triggered(
    snapshot: &Utf8Path,
    config_text: &str,
    overrides: Overrides,
    event: &str,
) -> anyhow::Result<ScanOutput> {
    run_scan(ScanInput {
        snapshot,
        config_text,
        overrides,
        selection: RuleSelection::Trigger(event.to_string()),
    })
}

/// Scan an already populated cache.
pub fn run_scan_with_cache(
    cache: &ResultCache,
    config_text: &str,
    overrides: Overrides,
    selection: &RuleSelection,
) -> anyhow::Result<ScanOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if config_text.trim().is_empty() {
        CloudauditConfigV1::default()
    } else {
        cloudaudit_settings::parse_config_toml(config_text).context("parse config")?
    };

    let registry = RuleRegistry::with_builtin_rules().context("register built-in rules")?;
    for rule_id in cfg.rules.keys() {
        anyhow::ensure!(
            registry.get(rule_id).is_some(),
            "config references unknown rule `{rule_id}`"
        );
    }

    let resolved = cloudaudit_settings::resolve_config(cfg, overrides).context("resolve config")?;

    let domain_selection = match selection {
        RuleSelection::All => Selection::All,
        RuleSelection::Rules(ids) => Selection::Rules(ids),
        RuleSelection::Trigger(event) => Selection::Trigger(event),
    };
    let domain_report = cloudaudit_domain::evaluate(
        &registry,
        cache,
        &resolved.effective,
        domain_selection,
    )
    .context("evaluate rules")?;

    let DomainReport {
        verdict,
        findings,
        counts,
        rules,
        source,
        data,
    } = domain_report;

    info!(
        verdict = ?verdict,
        rules = data.rules_evaluated,
        findings = data.findings_emitted,
        suppressed = data.findings_suppressed,
        "scan finished"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_SCAN_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "cloudaudit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        counts,
        findings,
        rules,
        source,
        data,
    };

    Ok(ScanOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
