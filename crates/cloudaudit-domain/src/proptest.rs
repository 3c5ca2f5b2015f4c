//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Region scoping of absent data
//! - Determinism of rule outcomes over an unchanged cache
//! - The region driver neither losing nor duplicating findings

use crate::cache::{CacheEntry, ResultCache, UpstreamError};
use crate::driver::{RegionDriver, RunContext};
use crate::engine::{Selection, evaluate};
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::rules::{EnableAuditLogs, EncryptedDomain};
use crate::test_support::{FnRule, config, domain_detail, domain_listing, meta};
use cloudaudit_types::{CachePath, Finding, Status};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Strategies
// ============================================================================

fn arb_region() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-east-1".to_string()),
        Just("us-west-2".to_string()),
        Just("eu-west-1".to_string()),
        Just("ap-southeast-2".to_string()),
        Just("us-gov-west-1".to_string()),
        Just("cn-north-1".to_string()),
    ]
}

fn arb_regions() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(arb_region(), 1..6).prop_map(|set| set.into_iter().collect())
}

/// What the collection layer recorded for one domain's detail call.
#[derive(Clone, Debug)]
enum DetailState {
    Enabled,
    Disabled,
    NoLogOptions,
    Absent,
    Errored,
    NullStatus,
}

fn arb_detail_state() -> impl Strategy<Value = DetailState> {
    prop_oneof![
        Just(DetailState::Enabled),
        Just(DetailState::Disabled),
        Just(DetailState::NoLogOptions),
        Just(DetailState::Absent),
        Just(DetailState::Errored),
        Just(DetailState::NullStatus),
    ]
}

/// What was recorded for a region's listing call.
#[derive(Clone, Debug)]
enum ListingState {
    Absent,
    Errored,
    Domains(Vec<DetailState>),
}

fn arb_listing_state() -> impl Strategy<Value = ListingState> {
    prop_oneof![
        1 => Just(ListingState::Absent),
        1 => Just(ListingState::Errored),
        4 => prop::collection::vec(arb_detail_state(), 0..5).prop_map(ListingState::Domains),
    ]
}

fn arb_world() -> impl Strategy<Value = Vec<(String, ListingState)>> {
    arb_regions().prop_flat_map(|regions| {
        let n = regions.len();
        (
            Just(regions),
            prop::collection::vec(arb_listing_state(), n..=n),
        )
            .prop_map(|(regions, states)| regions.into_iter().zip(states).collect())
    })
}

fn build_cache(world: &[(String, ListingState)]) -> ResultCache {
    let mut cache = ResultCache::new();
    for (region, state) in world {
        let listing = CachePath::region("opensearch", "listDomainNames", region.as_str());
        match state {
            ListingState::Absent => {}
            ListingState::Errored => {
                cache.insert(listing, CacheEntry::error(UpstreamError::new("throttled")));
            }
            ListingState::Domains(details) => {
                let names: Vec<String> = (0..details.len()).map(|i| format!("domain-{i}")).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                cache.insert(listing, CacheEntry::data(domain_listing(&refs)));

                for (name, detail) in names.iter().zip(details) {
                    let path = CachePath::resource(
                        "opensearch",
                        "describeDomain",
                        region.as_str(),
                        name.as_str(),
                    );
                    let entry = match detail {
                        DetailState::Enabled => CacheEntry::data(domain_detail(true)),
                        DetailState::Disabled => CacheEntry::data(domain_detail(false)),
                        DetailState::NoLogOptions => {
                            CacheEntry::data(json!({"DomainStatus": {"DomainName": name}}))
                        }
                        DetailState::Absent => continue,
                        DetailState::Errored => {
                            CacheEntry::error(UpstreamError::new("AccessDenied"))
                        }
                        DetailState::NullStatus => CacheEntry::data(json!({"DomainStatus": null})),
                    };
                    cache.insert(path, entry);
                }
            }
        }
    }
    cache
}

fn sorted(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        (&a.region, &a.resource, &a.code, &a.message).cmp(&(&b.region, &b.resource, &b.code, &b.message))
    });
    findings
}

fn run_rule(rule: &dyn Rule, regions: &[String], cache: &ResultCache) -> Vec<Finding> {
    let driver = RegionDriver::new(3).expect("driver");
    driver
        .run_across_regions(rule, regions, cache, &RunContext::default())
        .findings
}

// ============================================================================
// Region scoping
// ============================================================================

proptest! {
    #[test]
    fn absent_listing_regions_get_no_findings(world in arb_world()) {
        let cache = build_cache(&world);
        let regions: Vec<String> = world.iter().map(|(r, _)| r.clone()).collect();

        for rule in [&EnableAuditLogs as &dyn Rule, &EncryptedDomain as &dyn Rule] {
            let findings = run_rule(rule, &regions, &cache);
            for (region, state) in &world {
                let in_region = findings.iter().filter(|f| &f.region == region).count();
                match state {
                    ListingState::Absent => prop_assert_eq!(in_region, 0),
                    ListingState::Errored => prop_assert_eq!(in_region, 1),
                    ListingState::Domains(details) if details.is_empty() => {
                        prop_assert_eq!(in_region, 1)
                    }
                    ListingState::Domains(details) => prop_assert_eq!(in_region, details.len()),
                }
            }
        }
    }

    #[test]
    fn well_formed_details_never_map_to_unknown(world in arb_world()) {
        let cache = build_cache(&world);
        let regions: Vec<String> = world.iter().map(|(r, _)| r.clone()).collect();
        let findings = run_rule(&EnableAuditLogs, &regions, &cache);

        for (region, state) in &world {
            let ListingState::Domains(details) = state else { continue };
            for (i, detail) in details.iter().enumerate() {
                let suffix = format!("domain/domain-{i}");
                let status = findings
                    .iter()
                    .find(|f| {
                        &f.region == region
                            && f.resource.as_deref().is_some_and(|r| r.ends_with(&suffix))
                    })
                    .map(|f| f.status);
                let expected = match detail {
                    DetailState::Enabled => Status::Ok,
                    DetailState::Disabled | DetailState::NoLogOptions => Status::Fail,
                    DetailState::Absent | DetailState::Errored | DetailState::NullStatus => {
                        Status::Unknown
                    }
                };
                prop_assert_eq!(status, Some(expected));
            }
        }
    }
}

// ============================================================================
// Determinism
// ============================================================================

proptest! {
    #[test]
    fn rerunning_over_same_cache_yields_same_multiset(world in arb_world()) {
        let cache = build_cache(&world);
        let regions: Vec<String> = world.iter().map(|(r, _)| r.clone()).collect();

        let first = sorted(run_rule(&EnableAuditLogs, &regions, &cache));
        let second = sorted(run_rule(&EnableAuditLogs, &regions, &cache));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn engine_report_is_fully_deterministic(world in arb_world()) {
        let cache = build_cache(&world);
        let region_refs: Vec<&str> = world.iter().map(|(r, _)| r.as_str()).collect();
        let cfg = config(&region_refs);
        let registry = RuleRegistry::with_builtin_rules().expect("registry");

        let a = evaluate(&registry, &cache, &cfg, Selection::All).expect("evaluate");
        let b = evaluate(&registry, &cache, &cfg, Selection::All).expect("evaluate");
        prop_assert_eq!(a.findings, b.findings);
        prop_assert_eq!(a.verdict, b.verdict);
        prop_assert_eq!(a.counts, b.counts);
    }
}

// ============================================================================
// Driver accounting
// ============================================================================

proptest! {
    #[test]
    fn driver_neither_loses_nor_duplicates(
        regions in arb_regions(),
        per_region in 0usize..8,
        limit in 1usize..6,
    ) {
        let rule = FnRule::new(meta("test.fanout"), move |scope, _, out| {
            for i in 0..per_region {
                out.ok("n", format!("{}#{i}", scope.region), None);
            }
            Ok(())
        });
        let driver = RegionDriver::new(limit).expect("driver");
        let run = driver.run_across_regions(&rule, &regions, &ResultCache::new(), &RunContext::default());

        prop_assert_eq!(run.findings.len(), regions.len() * per_region);
        let mut messages: Vec<String> = run.findings.into_iter().map(|f| f.message).collect();
        messages.sort();
        let before = messages.len();
        messages.dedup();
        prop_assert_eq!(messages.len(), before);
    }

    #[test]
    fn faults_stay_in_their_region(regions in arb_regions(), victim in 0usize..6) {
        let victim = regions[victim % regions.len()].clone();
        let target = victim.clone();
        let rule = FnRule::new(meta("test.fault"), move |scope, _, out| {
            out.ok("seen", "seen".to_string(), None);
            if scope.region == target {
                panic!("boom");
            }
            Ok(())
        });
        let driver = RegionDriver::new(2).expect("driver");
        let run = driver.run_across_regions(&rule, &regions, &ResultCache::new(), &RunContext::default());

        prop_assert_eq!(run.findings.len(), regions.len());
        for f in &run.findings {
            let expected = if f.region == victim { Status::Unknown } else { Status::Ok };
            prop_assert_eq!(f.status, expected);
        }
        prop_assert_eq!(run.faulted_regions, vec![victim]);
    }
}
