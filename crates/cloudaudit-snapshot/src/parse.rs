//! Snapshot JSON layout:
//!
//! ```json
//! { "<service>": { "<operation>": { "<region>": { "data": ..., "err": ... } } } }
//! ```
//!
//! Per-resource calls nest their entries under `resources`, keyed by resource key:
//! `"<region>": { "resources": { "<key>": { "data": ..., "err": ... } } }`.
//! A region node may only carry `data`, `err` and `resources`. An empty entry object records
//! a call that was never made.

use anyhow::Context;
use cloudaudit_domain::cache::{CacheEntry, UpstreamError};
use cloudaudit_types::CachePath;
use serde_json::{Map, Value};
use tracing::warn;

pub const MALFORMED_CODE: &str = "MalformedSnapshot";

#[derive(Clone, Debug, Default)]
pub struct ParsedSnapshot {
    pub entries: Vec<(CachePath, CacheEntry)>,
    /// Leaves that were not entries; each became an errored entry.
    pub malformed: usize,
}

impl ParsedSnapshot {
    fn push_malformed(&mut self, path: CachePath, reason: String) {
        warn!(path = %path, %reason, "malformed snapshot entry");
        self.malformed += 1;
        self.entries.push((path, malformed_entry(&reason)));
    }
}

pub fn parse_snapshot(text: &str) -> anyhow::Result<ParsedSnapshot> {
    let root: Value = serde_json::from_str(text).context("parse snapshot JSON")?;
    let Value::Object(services) = root else {
        anyhow::bail!("snapshot root must be a JSON object keyed by service");
    };

    let mut out = ParsedSnapshot::default();
    for (service, operations) in &services {
        let Value::Object(operations) = operations else {
            warn!(service, "skipping service whose value is not an object");
            out.malformed += 1;
            continue;
        };
        for (operation, regions) in operations {
            let Value::Object(regions) = regions else {
                warn!(service, operation, "skipping operation whose value is not an object");
                out.malformed += 1;
                continue;
            };
            for (region, node) in regions {
                parse_region(&mut out, service, operation, region, node);
            }
        }
    }

    Ok(out)
}

const RESOURCES_KEY: &str = "resources";

fn parse_region(
    out: &mut ParsedSnapshot,
    service: &str,
    operation: &str,
    region: &str,
    node: &Value,
) {
    let region_path = || CachePath::region(service, operation, region);

    let Value::Object(map) = node else {
        out.push_malformed(region_path(), format!("expected an object, found {}", kind(node)));
        return;
    };

    let mut entry = map.clone();
    let resources = entry.remove(RESOURCES_KEY);
    if resources.is_none() || !entry.is_empty() {
        match entry_from(&entry) {
            Ok(entry) => out.entries.push((region_path(), entry)),
            Err(reason) => out.push_malformed(region_path(), reason),
        }
    }

    match resources {
        None => {}
        Some(Value::Object(resources)) => {
            for (key, leaf) in &resources {
                let path = CachePath::resource(service, operation, region, key.as_str());
                match leaf {
                    Value::Object(leaf) => match entry_from(leaf) {
                        Ok(entry) => out.entries.push((path, entry)),
                        Err(reason) => out.push_malformed(path, reason),
                    },
                    other => {
                        out.push_malformed(path, format!("expected an object, found {}", kind(other)))
                    }
                }
            }
        }
        Some(other) => out.push_malformed(
            region_path(),
            format!("expected `resources` to be an object, found {}", kind(&other)),
        ),
    }
}

fn entry_from(map: &Map<String, Value>) -> Result<CacheEntry, String> {
    if let Some(extra) = map.keys().find(|k| *k != "data" && *k != "err") {
        return Err(format!("unexpected key `{extra}`; expected `data` and/or `err`"));
    }

    let data = map.get("data").filter(|v| !v.is_null()).cloned();
    let err = map
        .get("err")
        .filter(|v| !is_falsy(v))
        .map(upstream_error);
    Ok(CacheEntry { data, err })
}

fn is_falsy(v: &Value) -> bool {
    matches!(v, Value::Null | Value::Bool(false))
}

fn upstream_error(v: &Value) -> UpstreamError {
    match v {
        Value::String(s) => UpstreamError::new(s.clone()),
        Value::Object(obj) => {
            let text = |keys: [&str; 2]| {
                keys.iter()
                    .find_map(|k| obj.get(*k).and_then(Value::as_str))
                    .map(str::to_string)
            };
            let message = text(["message", "Message"]).unwrap_or_else(|| v.to_string());
            match text(["code", "Code"]) {
                Some(code) => UpstreamError::new(message).with_code(code),
                None => UpstreamError::new(message),
            }
        }
        other => UpstreamError::new(other.to_string()),
    }
}

fn malformed_entry(reason: &str) -> CacheEntry {
    CacheEntry::error(
        UpstreamError::new(format!("malformed snapshot entry: {reason}")).with_code(MALFORMED_CODE),
    )
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
