use crate::{model::CloudauditConfigV1, presets};
use anyhow::Context;
use cloudaudit_domain::policy::{EffectiveConfig, FailOn, RulePolicy};
use cloudaudit_types::Severity;
use globset::Glob;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub concurrency: Option<usize>,
    pub max_findings: Option<u32>,
    /// Restrict the run to these regions.
    pub regions: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: CloudauditConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| presets::DEFAULT_PROFILE.to_string());

    let mut effective = presets::preset(&profile);

    // fail_on
    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }

    // concurrency
    if let Some(c) = overrides
        .concurrency
        .or(cfg.concurrency.map(|c| c as usize))
    {
        anyhow::ensure!(c > 0, "concurrency must be at least 1");
        effective.concurrency = c;
    }

    // max findings
    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    // regions
    if let Some(regions) = cfg.regions {
        if let Some(default) = regions.default {
            effective.regions.default = default;
        }
        if let Some(global) = regions.global {
            effective.regions.global = global;
        }
        for (service, list) in regions.services {
            anyhow::ensure!(
                !list.is_empty(),
                "region list for service `{service}` is empty"
            );
            effective.regions.services.insert(service, list);
        }
    }
    if let Some(only) = overrides.regions {
        effective.regions.default = only.clone();
        for list in effective.regions.services.values_mut() {
            list.retain(|r| only.contains(r));
        }
    }
    anyhow::ensure!(
        !effective.regions.default.is_empty(),
        "default region list is empty"
    );
    anyhow::ensure!(
        !effective.regions.global.trim().is_empty(),
        "global region is empty"
    );

    // per-rule overrides
    for (rule_id, rc) in cfg.rules.iter() {
        let entry = effective
            .rules
            .entry(rule_id.clone())
            .or_insert_with(RulePolicy::enabled);

        if let Some(enabled) = rc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = rc.severity.as_deref() {
            entry.severity = Some(
                parse_severity(sev).with_context(|| format!("invalid severity for {rule_id}"))?,
            );
        }
    }

    // suppressions
    validate_suppressions(&cfg.suppress)?;
    effective.suppress = cfg.suppress;

    // rule settings
    if let Some(settings) = cfg.settings {
        anyhow::ensure!(settings.is_object(), "[settings] must be a table");
        effective.settings = settings;
    }

    Ok(ResolvedConfig { effective })
}

fn validate_suppressions(patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid suppress glob: {pattern}"))?;
    }
    Ok(())
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => anyhow::bail!("unknown severity: {other} (expected low|medium|high|critical)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "fail" => Ok(FailOn::Fail),
        "warning" | "warn" => Ok(FailOn::Warn),
        other => anyhow::bail!("unknown fail_on: {other} (expected fail|warn)"),
    }
}
