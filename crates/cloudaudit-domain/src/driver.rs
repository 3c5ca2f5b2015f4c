//! Per-region fan-out of one rule over a bounded worker pool.

use crate::cache::{ResultCache, SourceTracker};
use crate::rule::{RegionScope, Rule};
use crate::sink::{FindingRecorder, RegionRecorder, ResultSink};
use cloudaudit_types::{CachePath, Finding, Status, ids};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("failed to build region worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Run-wide inputs shared by every region task.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    pub account_id: Option<String>,
    pub settings: Value,
}

/// Everything one rule produced across its regions.
#[derive(Clone, Debug, Default)]
pub struct RuleRun {
    pub rule_id: String,
    pub regions: Vec<String>,
    /// Completion order of the region tasks.
    pub findings: Vec<Finding>,
    pub sources: BTreeSet<CachePath>,
    pub faulted_regions: Vec<String>,
}

struct RegionOutcome {
    findings: Vec<Finding>,
    sources: BTreeSet<CachePath>,
    fault: Option<String>,
}

pub struct RegionDriver {
    pool: rayon::ThreadPool,
    limit: usize,
}

impl RegionDriver {
    pub fn new(limit: usize) -> Result<Self, DriverError> {
        if limit == 0 {
            return Err(DriverError::ZeroConcurrency);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(limit)
            .thread_name(|i| format!("cloudaudit-region-{i}"))
            .build()?;
        Ok(Self { pool, limit })
    }

    pub fn concurrency(&self) -> usize {
        self.limit
    }

    /// Evaluate `rule` once per region and wait for every task.
    ///
    /// A task that returns an error or panics contributes exactly one UNKNOWN finding for its
    /// region; its partial findings are dropped and the other regions are unaffected.
    pub fn run_across_regions(
        &self,
        rule: &dyn Rule,
        regions: &[String],
        cache: &ResultCache,
        ctx: &RunContext,
    ) -> RuleRun {
        let sink = ResultSink::new();
        let sources = Mutex::new(BTreeSet::new());
        let faults = Mutex::new(Vec::new());

        self.pool.scope(|s| {
            for region in regions {
                let (sink, sources, faults) = (&sink, &sources, &faults);
                s.spawn(move |_| {
                    let outcome = evaluate_region(rule, region, cache, ctx);
                    if outcome.fault.is_some() {
                        faults
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(region.clone());
                    }
                    sources
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend(outcome.sources);
                    sink.append(outcome.findings);
                });
            }
        });

        let mut faulted_regions = faults.into_inner().unwrap_or_else(PoisonError::into_inner);
        faulted_regions.sort();

        RuleRun {
            rule_id: rule.meta().id.to_string(),
            regions: regions.to_vec(),
            findings: sink.into_findings(),
            sources: sources.into_inner().unwrap_or_else(PoisonError::into_inner),
            faulted_regions,
        }
    }
}

fn evaluate_region(
    rule: &dyn Rule,
    region: &str,
    cache: &ResultCache,
    ctx: &RunContext,
) -> RegionOutcome {
    let meta = rule.meta();
    debug!(rule = meta.id, region, "evaluating region");

    let tracker = SourceTracker::new(cache);
    let scope = RegionScope::new(region, ctx.account_id.as_deref(), &ctx.settings);
    let mut recorder = RegionRecorder::new(meta.id, meta.severity, region);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        rule.evaluate(&scope, &tracker, &mut recorder)
    }));
    let fault = match result {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };

    let findings = match &fault {
        None => recorder.into_findings(),
        Some(reason) => {
            warn!(rule = meta.id, region, %reason, "rule faulted; reporting region as unknown");
            let mut fallback = RegionRecorder::new(meta.id, meta.severity, region);
            fallback.record(
                Status::Unknown,
                ids::CODE_RULE_FAULT,
                format!("Rule evaluation failed unexpectedly: {reason}"),
                None,
            );
            fallback.into_findings()
        }
    };

    let sources = tracker.into_sources();
    for path in sources.iter().filter(|path| !meta.declares_api(path)) {
        warn!(rule = meta.id, region, path = %path, "rule read a call missing from its declared apis");
    }

    debug!(rule = meta.id, region, findings = findings.len(), "region done");
    RegionOutcome {
        findings,
        sources,
        fault,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
