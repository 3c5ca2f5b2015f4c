use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of one collected API call: `(service, operation, region[, resource_key])`.
///
/// Normalization rules are intentionally simple and deterministic:
/// - service names are lowercased (`OpenSearch` and `opensearch` address the same call)
/// - operation, region and resource key are kept verbatim
///
/// Deserialization goes through the same constructors, so a serialized path read back from a
/// report compares equal to the one built in code.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(from = "RawCachePath")]
pub struct CachePath {
    service: String,
    operation: String,
    region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_key: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct RawCachePath {
    service: String,
    operation: String,
    region: String,
    #[serde(default)]
    resource_key: Option<String>,
}

impl From<RawCachePath> for CachePath {
    fn from(raw: RawCachePath) -> Self {
        let path = CachePath::region(raw.service, raw.operation, raw.region);
        match raw.resource_key {
            Some(key) => CachePath {
                resource_key: Some(key),
                ..path
            },
            None => path,
        }
    }
}

impl CachePath {
    /// Region-scoped call, e.g. a listing.
    pub fn region<S, O, R>(service: S, operation: O, region: R) -> Self
    where
        S: AsRef<str>,
        O: Into<String>,
        R: Into<String>,
    {
        Self {
            service: service.as_ref().to_ascii_lowercase(),
            operation: operation.into(),
            region: region.into(),
            resource_key: None,
        }
    }

    /// Resource-scoped call, e.g. a describe on one listed item.
    pub fn resource<S, O, R, K>(service: S, operation: O, region: R, key: K) -> Self
    where
        S: AsRef<str>,
        O: Into<String>,
        R: Into<String>,
        K: Into<String>,
    {
        let mut path = Self::region(service, operation, region);
        path.resource_key = Some(key.into());
        path
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn region_name(&self) -> &str {
        &self.region
    }

    pub fn resource_key(&self) -> Option<&str> {
        self.resource_key.as_deref()
    }

    /// Whether this path belongs to the API call `service:operation` (any region or key).
    pub fn matches_api(&self, service: &str, operation: &str) -> bool {
        self.service.eq_ignore_ascii_case(service) && self.operation == operation
    }
}

impl fmt::Display for CachePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.service, self.operation, self.region)?;
        if let Some(key) = &self.resource_key {
            write!(f, ":{key}")?;
        }
        Ok(())
    }
}
