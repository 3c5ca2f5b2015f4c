//! Read-only store of collected API responses.
//!
//! The collection layer fills a [`ResultCache`] once per run; rules only read it through
//! [`CacheReader`], so concurrent region tasks share it without locking.

use cloudaudit_types::CachePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Error the collection layer recorded for one call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One collected call. Both fields empty means the call was never made.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheEntry {
    pub data: Option<Value>,
    pub err: Option<UpstreamError>,
}

impl CacheEntry {
    pub fn data(data: Value) -> Self {
        Self {
            data: (!data.is_null()).then_some(data),
            err: None,
        }
    }

    pub fn error(err: UpstreamError) -> Self {
        Self {
            data: None,
            err: Some(err),
        }
    }

    pub fn not_collected() -> Self {
        Self::default()
    }

    /// An error wins over data: a call that reported an error is never trusted.
    pub fn classify(&self) -> Lookup<'_> {
        if let Some(err) = &self.err {
            return Lookup::Failed(err);
        }
        match &self.data {
            Some(Value::Null) | None => Lookup::Absent,
            Some(data) => Lookup::Ready(data),
        }
    }
}

/// Outcome of reading one path, borrowed from the cache.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup<'a> {
    /// Never collected: out of scope, not an error.
    Absent,
    Failed(&'a UpstreamError),
    Ready(&'a Value),
}

/// Read access to collected responses. Lookups never fail; absence is a value.
pub trait CacheReader {
    fn lookup(&self, path: &CachePath) -> Option<&CacheEntry>;

    fn get(&self, path: &CachePath) -> Lookup<'_> {
        self.lookup(path)
            .map(CacheEntry::classify)
            .unwrap_or(Lookup::Absent)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    entries: BTreeMap<CachePath, CacheEntry>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate one path. Only the collection layer calls this, before evaluation starts.
    pub fn insert(&mut self, path: CachePath, entry: CacheEntry) {
        self.entries.insert(path, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CachePath, &CacheEntry)> {
        self.entries.iter()
    }
}

impl CacheReader for ResultCache {
    fn lookup(&self, path: &CachePath) -> Option<&CacheEntry> {
        self.entries.get(path)
    }
}

impl FromIterator<(CachePath, CacheEntry)> for ResultCache {
    fn from_iter<I: IntoIterator<Item = (CachePath, CacheEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Task-local reader that remembers which collected paths a rule touched.
pub struct SourceTracker<'a> {
    cache: &'a ResultCache,
    seen: RefCell<BTreeSet<CachePath>>,
}

impl<'a> SourceTracker<'a> {
    pub fn new(cache: &'a ResultCache) -> Self {
        Self {
            cache,
            seen: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn into_sources(self) -> BTreeSet<CachePath> {
        self.seen.into_inner()
    }
}

impl CacheReader for SourceTracker<'_> {
    fn lookup(&self, path: &CachePath) -> Option<&CacheEntry> {
        let entry = self.cache.lookup(path)?;
        self.seen.borrow_mut().insert(path.clone());
        Some(entry)
    }
}
