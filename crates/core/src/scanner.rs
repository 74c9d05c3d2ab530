use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::Node;

/// Pseudo-filesystem and recycle-bin names never worth descending into.
const IGNORED_NAMES: &[&str] = &[
    "$Recycle.Bin",
    "System Volume Information",
    "proc",
    "sys",
    "dev",
];

/// Counters and problem paths collected during one scan. Owned exclusively
/// by the in-flight scan, read-only once it is handed back.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    pub permission_denied: Vec<PathBuf>,
    pub errors: Vec<PathBuf>,
}

/// Only the scan root can fail a scan; everything below it degrades into
/// [`ScanStats`] entries instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access scan root {}: {source}", .path.display())]
    RootInaccessible { path: PathBuf, source: io::Error },
    #[error("scan root is not a directory: {}", .0.display())]
    RootNotADirectory(PathBuf),
}

/// Size and modification time for a path, with failures flattened to
/// `(0, now)`. One unreadable entry must never abort a scan.
pub fn stat_probe(path: &Path) -> (u64, DateTime<Utc>) {
    match fs::metadata(path) {
        Ok(md) => {
            let modified = md
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            (md.len(), modified)
        }
        Err(_) => (0, Utc::now()),
    }
}

/// Build a [`Node`] tree rooted at `root`, descending at most `max_depth`
/// levels, together with the statistics gathered along the way.
///
/// The root is resolved to an absolute, symlink-free path first; failing
/// that is the only reportable error. Directories at the depth bound are
/// summarized by their own stat size only, without aggregating contents.
pub fn scan(
    root: &Path,
    max_depth: usize,
    follow_symlinks: bool,
) -> Result<(Node, ScanStats), ScanError> {
    let root = root
        .canonicalize()
        .map_err(|source| ScanError::RootInaccessible {
            path: root.to_path_buf(),
            source,
        })?;
    let meta = fs::metadata(&root).map_err(|source| ScanError::RootInaccessible {
        path: root.clone(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::RootNotADirectory(root));
    }

    let mut stats = ScanStats::default();
    let tree = scan_node(&root, 0, max_depth, follow_symlinks, &mut stats);
    info!(
        root = %root.display(),
        files = stats.files_scanned,
        dirs = stats.dirs_scanned,
        denied = stats.permission_denied.len(),
        errors = stats.errors.len(),
        "scan finished"
    );
    Ok((tree, stats))
}

fn scan_node(
    path: &Path,
    depth: usize,
    max_depth: usize,
    follow_symlinks: bool,
    stats: &mut ScanStats,
) -> Node {
    if !follow_symlinks && path.is_symlink() {
        // Terminal leaf sized by the resolved target; never recursed into,
        // which keeps symlink loops out of the tree.
        let (size, modified) = stat_probe(path);
        stats.files_scanned += 1;
        return Node {
            path: path.to_path_buf(),
            size,
            is_dir: false,
            modified,
            children: Vec::new(),
        };
    }

    if path.is_dir() {
        let mut size: u64 = 0;
        let mut modified = DateTime::<Utc>::MIN_UTC;
        let mut children = Vec::new();
        if depth < max_depth {
            match fs::read_dir(path) {
                Ok(iter) => {
                    let mut entries: Vec<fs::DirEntry> = iter.filter_map(|e| e.ok()).collect();
                    // Directories first, then case-insensitive by name, so
                    // equal-size ties get a deterministic scan order.
                    entries.sort_by_key(|e| {
                        let is_file = e.file_type().map(|t| t.is_file()).unwrap_or(false);
                        (is_file, e.file_name().to_ascii_lowercase())
                    });
                    for entry in entries {
                        let name = entry.file_name();
                        if name
                            .to_str()
                            .map_or(false, |n| IGNORED_NAMES.contains(&n))
                        {
                            continue;
                        }
                        let child =
                            scan_node(&entry.path(), depth + 1, max_depth, follow_symlinks, stats);
                        size = size.saturating_add(child.size);
                        modified = modified.max(child.modified);
                        children.push(child);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                    debug!(path = %path.display(), "directory listing denied");
                    stats.permission_denied.push(path.to_path_buf());
                }
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "directory listing failed");
                    stats.errors.push(path.to_path_buf());
                }
            }
        }

        let (own_size, own_modified) = stat_probe(path);
        children.sort_by(|a, b| b.size.cmp(&a.size));
        stats.dirs_scanned += 1;
        return Node {
            path: path.to_path_buf(),
            size: size.max(own_size),
            is_dir: true,
            modified: modified.max(own_modified),
            children,
        };
    }

    let (size, modified) = stat_probe(path);
    stats.files_scanned += 1;
    Node {
        path: path.to_path_buf(),
        size,
        is_dir: false,
        modified,
        children: Vec::new(),
    }
}
