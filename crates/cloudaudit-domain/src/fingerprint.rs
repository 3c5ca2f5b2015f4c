use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - rule_id
/// - code
/// - region
/// - resource (if present)
pub fn fingerprint_for_finding(
    rule_id: &str,
    code: &str,
    region: &str,
    resource: Option<&str>,
) -> String {
    let mut parts = vec![rule_id, code, region];
    if let Some(r) = resource {
        parts.push(r);
    }
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_resource_sensitive() {
        let a = fingerprint_for_finding("r", "c", "us-east-1", Some("arn:x"));
        let b = fingerprint_for_finding("r", "c", "us-east-1", Some("arn:x"));
        let c = fingerprint_for_finding("r", "c", "us-east-1", None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
