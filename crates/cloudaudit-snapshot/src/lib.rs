//! Snapshot adapters: discover and parse collected API responses into a result cache.
//!
//! This crate is allowed to do filesystem IO. It never talks to a cloud provider; the
//! snapshot is produced by a separate collection step.

#![forbid(unsafe_code)]

mod discover;
mod parse;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use cloudaudit_domain::cache::ResultCache;
use rayon::prelude::*;
use tracing::{debug, info};

pub use discover::discover_snapshot_files;
pub use parse::MALFORMED_CODE;

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    /// Parse arbitrary text as a snapshot.
    ///
    /// Returns `Ok(entry_count)` when the text is a JSON object, `Err(...)` otherwise.
    /// **Never panics** on any input.
    pub fn parse_snapshot(text: &str) -> anyhow::Result<usize> {
        Ok(super::parse::parse_snapshot(text)?.entries.len())
    }
}

/// A loaded snapshot and where it came from.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub cache: ResultCache,
    pub files: Vec<Utf8PathBuf>,
    /// Leaves that could not be read as entries (recorded as errored entries).
    pub malformed: usize,
}

/// Parse one snapshot document held in memory.
pub fn parse_snapshot_json(text: &str) -> anyhow::Result<Snapshot> {
    let parsed = parse::parse_snapshot(text)?;
    Ok(Snapshot {
        cache: parsed.entries.into_iter().collect(),
        files: Vec::new(),
        malformed: parsed.malformed,
    })
}

/// Load a snapshot from a single JSON file or a directory of JSON shards.
///
/// Shards are merged in path order; a path present in several shards keeps the last one.
pub fn load_snapshot(path: &Utf8Path) -> anyhow::Result<Snapshot> {
    let files = if path.is_dir() {
        let files = discover_snapshot_files(path)?;
        anyhow::ensure!(!files.is_empty(), "no *.json snapshot files under {path}");
        files
    } else {
        vec![path.to_path_buf()]
    };

    let parsed: Vec<_> = files
        .par_iter()
        .map(|file| {
            let text =
                std::fs::read_to_string(file).with_context(|| format!("read {file}"))?;
            let parsed = parse::parse_snapshot(&text).with_context(|| format!("parse {file}"))?;
            debug!(file = %file, entries = parsed.entries.len(), "parsed snapshot shard");
            anyhow::Ok(parsed)
        })
        .collect::<anyhow::Result<_>>()?;

    let mut cache = ResultCache::new();
    let mut malformed = 0;
    for shard in parsed {
        malformed += shard.malformed;
        for (path, entry) in shard.entries {
            cache.insert(path, entry);
        }
    }

    info!(
        files = files.len(),
        entries = cache.len(),
        malformed,
        "snapshot loaded"
    );
    Ok(Snapshot {
        cache,
        files,
        malformed,
    })
}
