use crate::cache::{CacheReader, Lookup};
use crate::sink::FindingRecorder;
use cloudaudit_types::{CachePath, ids};
use serde_json::Value;

/// Outcome of resolving a region's top-level listing call.
#[derive(Debug)]
pub enum Listing<'a> {
    /// Never collected; the region is out of scope and gets no findings.
    Skip,
    /// A region-level finding was already recorded.
    Done,
    Items(&'a [Value]),
}

pub fn resolve_listing<'a>(
    cache: &'a dyn CacheReader,
    path: &CachePath,
    what: &str,
    out: &mut dyn FindingRecorder,
) -> Listing<'a> {
    match cache.get(path) {
        Lookup::Absent => Listing::Skip,
        Lookup::Failed(err) => {
            out.unknown(
                ids::CODE_LISTING_UNAVAILABLE,
                format!("Unable to query for {what}: {err}"),
                None,
            );
            Listing::Done
        }
        Lookup::Ready(data) => match data.as_array() {
            None => {
                out.unknown(
                    ids::CODE_LISTING_UNAVAILABLE,
                    format!("Unable to query for {what}: response is not a list"),
                    None,
                );
                Listing::Done
            }
            Some(items) if items.is_empty() => {
                out.ok(ids::CODE_NO_RESOURCES, format!("No {what} found"), None);
                Listing::Done
            }
            Some(items) => Listing::Items(items),
        },
    }
}

/// Detail payload for one listed resource, or an UNKNOWN finding naming it.
pub fn resolve_detail<'a>(
    cache: &'a dyn CacheReader,
    path: &CachePath,
    what: &str,
    resource: &str,
    out: &mut dyn FindingRecorder,
) -> Option<&'a Value> {
    let reason = match cache.get(path) {
        Lookup::Ready(data) => return Some(data),
        Lookup::Failed(err) => err.to_string(),
        Lookup::Absent => "no data was collected".to_string(),
    };
    out.unknown(
        ids::CODE_DETAIL_UNAVAILABLE,
        format!("Unable to query for {what}: {reason}"),
        Some(resource.to_string()),
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, ResultCache, UpstreamError};
    use crate::sink::RegionRecorder;
    use cloudaudit_types::{Severity, Status};
    use serde_json::json;

    fn path() -> CachePath {
        CachePath::region("opensearch", "listDomainNames", "us-east-1")
    }

    fn recorder() -> RegionRecorder<'static> {
        RegionRecorder::new("test.rule", Severity::Low, "us-east-1")
    }

    #[test]
    fn absent_listing_is_skipped_silently() {
        let cache = ResultCache::new();
        let mut out = recorder();
        assert!(matches!(
            resolve_listing(&cache, &path(), "things", &mut out),
            Listing::Skip
        ));
        assert!(out.into_findings().is_empty());
    }

    #[test]
    fn non_list_listing_is_unknown() {
        let mut cache = ResultCache::new();
        cache.insert(path(), CacheEntry::data(json!({"DomainNames": []})));
        let mut out = recorder();
        assert!(matches!(
            resolve_listing(&cache, &path(), "things", &mut out),
            Listing::Done
        ));
        let findings = out.into_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, Status::Unknown);
        assert!(findings[0].resource.is_none());
    }

    #[test]
    fn detail_error_carries_upstream_text() {
        let mut cache = ResultCache::new();
        let detail = CachePath::resource("opensearch", "describeDomain", "us-east-1", "logs");
        cache.insert(
            detail.clone(),
            CacheEntry::error(UpstreamError::new("Rate exceeded").with_code("Throttling")),
        );
        let mut out = recorder();
        assert!(resolve_detail(&cache, &detail, "thing config", "arn:x", &mut out).is_none());
        let findings = out.into_findings();
        assert_eq!(
            findings[0].message,
            "Unable to query for thing config: Throttling: Rate exceeded"
        );
        assert_eq!(findings[0].resource.as_deref(), Some("arn:x"));
    }
}
