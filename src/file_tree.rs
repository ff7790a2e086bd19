// ── File tree scanning ────────────────────────────────────────────────────────
//
// Lists one directory level on a worker thread.  The worker owns nothing but
// the directory path, a stop flag and the sending half of a channel; the
// dispatch thread polls the receiving half.  Setting the stop flag makes the
// worker give up at the next entry and send nothing.

use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use ignore::WalkBuilder;

use crate::commands::sort::natural_cmp;

/// One row of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// The `..` row leading to the parent directory.
    pub is_parent: bool,
}

impl TreeEntry {
    /// Text shown for the row.
    pub fn label(&self) -> String {
        if self.is_parent {
            return "..".to_owned();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// The finished contents of one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub root: PathBuf,
    pub entries: Vec<TreeEntry>,
}

/// Parent row first, then directories, then files; names compare
/// case-insensitively with digit runs ordered by value.
fn compare(a: &TreeEntry, b: &TreeEntry) -> CmpOrdering {
    b.is_parent
        .cmp(&a.is_parent)
        .then_with(|| b.is_dir.cmp(&a.is_dir))
        .then_with(|| natural_cmp(&a.label(), &b.label(), true))
}

/// List the direct children of `dir`, skipping hidden entries.
///
/// Returns `None` once `stop` is set.
pub fn scan(dir: &Path, stop: &AtomicBool) -> Option<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    if let Some(parent) = dir.parent() {
        entries.push(TreeEntry {
            path: parent.to_path_buf(),
            is_dir: true,
            is_parent: true,
        });
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .max_depth(Some(1))
        .build();
    for result in walker {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        let entry = match result {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        entries.push(TreeEntry {
            path: entry.into_path(),
            is_dir,
            is_parent: false,
        });
    }

    if stop.load(Ordering::Relaxed) {
        return None;
    }
    entries.sort_by(compare);
    Some(entries)
}

// ── Scanner ───────────────────────────────────────────────────────────────────

/// At most one running scan plus the channel its result arrives on.
#[derive(Default)]
pub struct Scanner {
    stop: Arc<AtomicBool>,
    pending: Option<Receiver<Listing>>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listing `dir`, cancelling any scan still running.
    pub fn start(&mut self, dir: PathBuf) {
        self.stop();
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let flag = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name("file-tree-scan".into())
            .spawn(move || {
                let Some(entries) = scan(&dir, &flag) else {
                    tracing::debug!(dir = %dir.display(), "file tree scan cancelled");
                    return;
                };
                // The receiver is gone when the scan was superseded.
                let _ = tx.send(Listing { root: dir, entries });
            });
        match spawned {
            Ok(_) => {
                self.stop = stop;
                self.pending = Some(rx);
            }
            Err(e) => tracing::warn!(error = %e, "failed to start file tree scan"),
        }
    }

    /// Cancel the running scan, if any.  Its result is never delivered.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.pending = None;
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The finished listing, without blocking.
    pub fn try_recv(&mut self) -> Option<Listing> {
        let rx = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(listing) => {
                self.pending = None;
                Some(listing)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                None
            }
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{Duration, Instant};

    use super::*;

    fn labels(entries: &[TreeEntry]) -> Vec<String> {
        entries.iter().map(TreeEntry::label).collect()
    }

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();
        fs::write(dir.path().join("src").join("deep.rs"), "").unwrap();
        for name in ["file10.txt", "file2.txt", "README.md", ".hidden"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        dir
    }

    #[test]
    fn scan_lists_one_level_sorted() {
        let dir = sample_dir();
        let entries = scan(dir.path(), &AtomicBool::new(false)).unwrap();
        assert_eq!(
            labels(&entries),
            ["..", "Docs", "src", "file2.txt", "file10.txt", "README.md"]
        );
        assert!(entries[1].is_dir);
        assert!(!entries[3].is_dir);
    }

    #[test]
    fn stopped_scan_yields_nothing() {
        let dir = sample_dir();
        assert!(scan(dir.path(), &AtomicBool::new(true)).is_none());
    }

    #[test]
    fn scanner_delivers_on_the_channel() {
        let dir = sample_dir();
        let mut scanner = Scanner::new();
        scanner.start(dir.path().to_path_buf());
        assert!(scanner.is_busy());
        let deadline = Instant::now() + Duration::from_secs(10);
        let listing = loop {
            if let Some(l) = scanner.try_recv() {
                break l;
            }
            assert!(Instant::now() < deadline, "scan did not finish");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(listing.root, dir.path());
        assert_eq!(listing.entries.len(), 6);
        assert!(!scanner.is_busy());
    }

    #[test]
    fn stopped_scanner_never_delivers() {
        let dir = sample_dir();
        let mut scanner = Scanner::new();
        scanner.start(dir.path().to_path_buf());
        scanner.stop();
        assert!(!scanner.is_busy());
        assert!(scanner.try_recv().is_none());
    }
}
