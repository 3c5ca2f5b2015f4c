//! Shared list/detail walk for OpenSearch domain rules.

use super::utils::{Listing, resolve_detail, resolve_listing};
use crate::cache::CacheReader;
use crate::payload::{self, FieldError};
use crate::rule::{RegionScope, RuleError};
use crate::sink::FindingRecorder;
use cloudaudit_types::{CachePath, ids};
use serde_json::Value;

const SERVICE: &str = "opensearch";
const ARN_SERVICE: &str = "es";
const DOMAINS: &str = "OpenSearch domains";
const DOMAIN_CONFIG: &str = "OpenSearch domain config";

/// Resolve every listed domain's `DomainStatus` and hand it to `check`.
///
/// `check` only ever sees a present status object. A field error it returns becomes an
/// UNKNOWN finding for that domain.
pub fn evaluate_domains<F>(
    scope: &RegionScope<'_>,
    cache: &dyn CacheReader,
    out: &mut dyn FindingRecorder,
    check: F,
) -> Result<(), RuleError>
where
    F: Fn(&RegionScope<'_>, &Value, &str, &mut dyn FindingRecorder) -> Result<(), FieldError>,
{
    let listing = CachePath::region(SERVICE, "listDomainNames", scope.region);
    let domains = match resolve_listing(cache, &listing, DOMAINS, out) {
        Listing::Skip | Listing::Done => return Ok(()),
        Listing::Items(items) => items,
    };

    for domain in domains {
        let name = match payload::str_field(domain, &["DomainName"]) {
            Ok(name) => name,
            Err(err) => {
                out.unknown(
                    ids::CODE_LISTING_UNAVAILABLE,
                    format!("Unable to read OpenSearch domain name: {err}"),
                    None,
                );
                continue;
            }
        };
        let fallback = scope.arn(ARN_SERVICE, &format!("domain/{name}"));

        let detail = CachePath::resource(SERVICE, "describeDomain", scope.region, name);
        let Some(data) = resolve_detail(cache, &detail, DOMAIN_CONFIG, &fallback, out) else {
            continue;
        };
        let status = match payload::field(data, &["DomainStatus"]) {
            Ok(status) => status,
            Err(err) => {
                out.unknown(
                    ids::CODE_DETAIL_UNAVAILABLE,
                    format!("Unable to query for {DOMAIN_CONFIG}: {err}"),
                    Some(fallback),
                );
                continue;
            }
        };

        let resource = payload::str_field(status, &["ARN"])
            .map(str::to_string)
            .unwrap_or(fallback);
        if let Err(err) = check(scope, status, &resource, &mut *out) {
            out.unknown(
                ids::CODE_DETAIL_UNAVAILABLE,
                format!("Unable to evaluate {DOMAIN_CONFIG}: {err}"),
                Some(resource),
            );
        }
    }

    Ok(())
}
