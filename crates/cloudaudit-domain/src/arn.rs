//! Qualified resource identifiers.

use crate::cache::{CacheReader, Lookup};
use crate::payload;
use cloudaudit_types::CachePath;

pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("cn-") {
        "aws-cn"
    } else {
        "aws"
    }
}

/// `arn:{partition}:{service}:{region}:{account}:{resource}`; an unknown account leaves its
/// segment empty.
pub fn resource_arn(
    partition: &str,
    service: &str,
    region: &str,
    account_id: Option<&str>,
    resource: &str,
) -> String {
    format!(
        "arn:{partition}:{service}:{region}:{}:{resource}",
        account_id.unwrap_or_default()
    )
}

/// Account id from the collected `sts:getCallerIdentity` response in the global region.
pub fn account_id(cache: &dyn CacheReader, global_region: &str) -> Option<String> {
    let path = CachePath::region("sts", "getCallerIdentity", global_region);
    match cache.get(&path) {
        Lookup::Ready(data) => payload::str_field(data, &["Account"])
            .ok()
            .map(str::to_string),
        Lookup::Absent | Lookup::Failed(_) => None,
    }
}
