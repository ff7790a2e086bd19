// ── Session persistence ───────────────────────────────────────────────────────
//
// Reads and writes `session.json` in the settings directory: the named tabs
// that were open at shutdown, with selection and scroll position.
// No `unsafe`; pure safe Rust + serde_json.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::app::{EditorContext, Position};
use crate::config;
use crate::error::Result;

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    /// Index into `tabs` of the tab to activate after restoring.
    pub active_tab: usize,
    pub tabs: Vec<TabEntry>,
}

/// One entry per named tab.  Untitled buffers are not saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub path: String,
    pub anchor: usize,
    pub caret: usize,
    pub first_visible_line: usize,
}

impl TabEntry {
    pub fn position(&self) -> Position {
        Position {
            anchor: self.anchor,
            caret: self.caret,
            first_visible_line: self.first_visible_line,
        }
    }
}

// ── Format version ────────────────────────────────────────────────────────────

pub const SESSION_VERSION: u32 = 1;

const SESSION_FILE: &str = "session.json";

impl SessionFile {
    /// Snapshot every named tab of `ctx`, in tab order.
    pub fn capture(ctx: &EditorContext) -> Self {
        let mut tabs = Vec::new();
        let mut active_tab = 0;
        for index in 0..ctx.tab_count() {
            let Some(path) = ctx.document_at(index).and_then(|d| d.path.as_deref()) else {
                continue;
            };
            let pos = ctx.position_at(index).unwrap_or_default();
            if index == ctx.active_tab() {
                active_tab = tabs.len();
            }
            tabs.push(TabEntry {
                path: path.to_string_lossy().into_owned(),
                anchor: pos.anchor,
                caret: pos.caret,
                first_visible_line: pos.first_visible_line,
            });
        }
        Self {
            version: SESSION_VERSION,
            active_tab,
            tabs,
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Default location of the session file, next to `settings.json`.
pub fn session_path() -> Option<PathBuf> {
    config::settings_dir().map(|d| d.join(SESSION_FILE))
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `session` to `path`, creating the parent directory if needed.
pub fn save(path: &Path, session: &SessionFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, session)?;
    Ok(())
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse the session file.
///
/// Returns `None` on any error: file missing, JSON parse failure, or an
/// unrecognised version number.
pub fn load(path: &Path) -> Option<SessionFile> {
    let data = fs::read(path).ok()?;
    let sf: SessionFile = match serde_json::from_slice(&data) {
        Ok(sf) => sf,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "session file unreadable");
            return None;
        }
    };
    if sf.version != SESSION_VERSION {
        tracing::warn!(version = sf.version, "unsupported session version");
        return None;
    }
    Some(sf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn make_tab(path: &str) -> TabEntry {
        TabEntry {
            path: path.to_owned(),
            anchor: 4,
            caret: 10,
            first_visible_line: 2,
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let sf = SessionFile {
            version: SESSION_VERSION,
            active_tab: 1,
            tabs: vec![make_tab("C:\\foo.txt"), make_tab("/tmp/bar.rs")],
        };
        save(&path, &sf).unwrap();
        assert_eq!(load(&path), Some(sf));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"version":99,"active_tab":0,"tabs":[]}"#).unwrap();
        assert_eq!(load(&path), None);
    }

    #[test]
    fn garbage_and_missing_files_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert_eq!(load(&path), None);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load(&path), None);
    }

    #[test]
    fn capture_skips_untitled_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "hello\nworld\n").unwrap();

        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.open_now(&file, None).unwrap();
        ctx.view_mut().set_selection(6, 8);

        let sf = SessionFile::capture(&ctx);
        assert_eq!(sf.tabs.len(), 1);
        assert_eq!(sf.active_tab, 0);
        assert_eq!(sf.tabs[0].path, file.to_string_lossy());
        assert_eq!((sf.tabs[0].anchor, sf.tabs[0].caret), (6, 8));
    }
}
