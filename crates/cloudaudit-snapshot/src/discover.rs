use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Snapshot shards (`*.json`) under `dir`, in lexicographic order.
///
/// Hidden files and directories are skipped. An entry that cannot be walked, or a path that is
/// not UTF-8, fails discovery instead of being skipped.
pub fn discover_snapshot_files(dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    let walker = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry.with_context(|| format!("walk snapshot directory {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = pathbuf_to_utf8(entry.path().to_path_buf())?;
        if path.extension() == Some("json") {
            out.push(path);
        }
    }

    // Stable order.
    out.sort();
    Ok(out)
}

fn pathbuf_to_utf8(path: PathBuf) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| anyhow::anyhow!("snapshot path is not valid UTF-8: {}", path.display()))
}
