use crate::arn;
use crate::cache::{CacheReader, ResultCache};
use crate::driver::{DriverError, RegionDriver, RuleRun, RunContext};
use crate::fingerprint::fingerprint_for_finding;
use crate::policy::{EffectiveConfig, FailOn};
use crate::registry::{RuleRegistry, resolve_regions};
use crate::report::DomainReport;
use crate::rule::Rule;
use cloudaudit_types::{
    CachePath, Finding, RuleRunSummary, ScanData, SourceEntry, Status, StatusCounts, Verdict,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("unknown rule: {0}")]
    UnknownRule(String),

    #[error("invalid suppression pattern `{pattern}`")]
    Suppression {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Which registered rules a run evaluates. Disabled rules never run.
#[derive(Clone, Copy, Debug)]
pub enum Selection<'a> {
    All,
    Rules(&'a [String]),
    /// Rules that declare this provider event as a change trigger.
    Trigger(&'a str),
}

/// Dispatch the selected rules over their regions and aggregate the findings.
pub fn evaluate(
    registry: &RuleRegistry,
    cache: &ResultCache,
    cfg: &EffectiveConfig,
    selection: Selection<'_>,
) -> Result<DomainReport, EngineError> {
    let rules = select_rules(registry, cfg, selection)?;
    let suppressions = build_suppressions(&cfg.suppress)?;
    let driver = RegionDriver::new(cfg.concurrency)?;
    let ctx = RunContext {
        account_id: arn::account_id(cache, &cfg.regions.global),
        settings: cfg.settings.clone(),
    };

    let mut findings: Vec<Finding> = Vec::new();
    let mut summaries = Vec::with_capacity(rules.len());
    let mut sources: BTreeSet<CachePath> = BTreeSet::new();
    let mut regions_seen: BTreeSet<String> = BTreeSet::new();
    let mut suppressed = 0u32;

    for rule in &rules {
        let meta = rule.meta();
        let regions = resolve_regions(meta.regions, &cfg.regions);
        let severity = cfg.severity_for(meta.id, meta.severity);

        let RuleRun {
            findings: rule_findings,
            sources: rule_sources,
            faulted_regions,
            ..
        } = driver.run_across_regions(rule.as_ref(), &regions, cache, &ctx);

        info!(
            rule = meta.id,
            regions = regions.len(),
            findings = rule_findings.len(),
            faulted = faulted_regions.len(),
            "rule evaluated"
        );

        summaries.push(RuleRunSummary {
            rule_id: meta.id.to_string(),
            title: meta.title.to_string(),
            severity,
            regions: regions.clone(),
            findings: count(rule_findings.len()),
            faulted_regions,
        });
        regions_seen.extend(regions);
        sources.extend(rule_sources);

        for mut finding in rule_findings {
            finding.severity = severity;
            finding.fingerprint = Some(fingerprint_for_finding(
                &finding.rule_id,
                &finding.code,
                &finding.region,
                finding.resource.as_deref(),
            ));
            if is_suppressed(suppressions.as_ref(), &finding) {
                suppressed = suppressed.saturating_add(1);
                continue;
            }
            findings.push(finding);
        }
    }

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    let total = count(findings.len());
    let mut truncated_reason: Option<String> = None;
    if findings.len() > cfg.max_findings {
        findings.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let verdict = compute_verdict(&findings, cfg.fail_on);
    let counts = StatusCounts::from_findings(&findings);

    let source = sources
        .into_iter()
        .filter_map(|path| {
            let entry = cache.lookup(&path)?;
            Some(SourceEntry {
                data: entry.data.clone(),
                error: entry.err.as_ref().map(ToString::to_string),
                path,
            })
        })
        .collect();

    let data = ScanData {
        profile: cfg.profile.clone(),
        rules_evaluated: count(summaries.len()),
        regions_evaluated: count(regions_seen.len()),
        findings_total: total,
        findings_emitted: count(findings.len()),
        findings_suppressed: suppressed,
        truncated_reason,
    };

    Ok(DomainReport {
        verdict,
        findings,
        counts,
        rules: summaries,
        source,
        data,
    })
}

fn select_rules<'r>(
    registry: &'r RuleRegistry,
    cfg: &EffectiveConfig,
    selection: Selection<'_>,
) -> Result<Vec<&'r Arc<dyn Rule>>, EngineError> {
    let selected: Vec<&Arc<dyn Rule>> = match selection {
        Selection::All => registry.rules().collect(),
        Selection::Rules(ids) => {
            let wanted: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
            for id in &wanted {
                if registry.get(id).is_none() {
                    return Err(EngineError::UnknownRule((*id).to_string()));
                }
            }
            registry
                .rules()
                .filter(|r| wanted.contains(r.meta().id))
                .collect()
        }
        Selection::Trigger(event) => registry
            .rules_for_trigger(event)
            .into_iter()
            .filter_map(|id| registry.get(id))
            .collect(),
    };

    Ok(selected
        .into_iter()
        .filter(|r| cfg.is_enabled(r.meta().id))
        .collect())
}

fn build_suppressions(patterns: &[String]) -> Result<Option<GlobSet>, EngineError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| EngineError::Suppression {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| EngineError::Suppression {
            pattern: patterns.join(", "),
            source,
        })
}

/// Suppressions match `rule_id:region:resource` (empty resource for region-level findings).
fn is_suppressed(suppressions: Option<&GlobSet>, finding: &Finding) -> bool {
    suppressions.is_some_and(|set| {
        let key = format!(
            "{}:{}:{}",
            finding.rule_id,
            finding.region,
            finding.resource.as_deref().unwrap_or_default()
        );
        set.is_match(key)
    })
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    if findings.iter().any(|f| f.status == Status::Fail) {
        return Verdict::Fail;
    }

    let has_warn = findings
        .iter()
        .any(|f| matches!(f.status, Status::Warn | Status::Unknown));
    if has_warn {
        return match fail_on {
            FailOn::Warn => Verdict::Fail,
            FailOn::Fail => Verdict::Warn,
        };
    }

    Verdict::Pass
}

/// Report counters saturate instead of wrapping.
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) status (fail -> unknown -> warn -> ok)
    // 2) rule_id
    // 3) region
    // 4) resource (missing last)
    // 5) code
    // 6) message
    let status_rank = |status: Status| match status {
        Status::Fail => 0,
        Status::Unknown => 1,
        Status::Warn => 2,
        Status::Ok => 3,
    };
    let resource = |f: &Finding| (f.resource.is_none(), f.resource.clone().unwrap_or_default());

    status_rank(a.status)
        .cmp(&status_rank(b.status))
        .then_with(|| a.rule_id.cmp(&b.rule_id))
        .then_with(|| a.region.cmp(&b.region))
        .then_with(|| resource(a).cmp(&resource(b)))
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| a.message.cmp(&b.message))
}
