// ── User settings ─────────────────────────────────────────────────────────────
//
// Persisted as `settings.json` in the per-user settings directory.
// Every section is `#[serde(default)]` so files written by older builds (or
// hand-edited ones missing keys) still load.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const APP_DIR: &str = "ribbonpad";
const SETTINGS_FILE: &str = "settings.json";

// ── Sections ──────────────────────────────────────────────────────────────────

/// View options toggled from the View tab and re-applied at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub whitespace: bool,
    pub word_wrap: bool,
    pub tab_width: usize,
    pub edge_visible: bool,
    pub edge_column: usize,
    /// Show the fold margin.
    pub folding: bool,
    /// Show the file tree pane.
    pub file_tree: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            whitespace: false,
            word_wrap: false,
            tab_width: 4,
            edge_visible: false,
            edge_column: 80,
            folding: true,
            file_tree: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Restore the previous session when the editor starts.
    pub autoload: bool,
}

/// Bookmarked lines remembered for one closed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub path: String,
    pub lines: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkSettings {
    /// Upper bound on remembered files.  0 disables persistence.
    pub max_files: usize,
    /// Most recently closed file first.
    pub files: Vec<BookmarkEntry>,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            max_files: 30,
            files: Vec::new(),
        }
    }
}

impl BookmarkSettings {
    /// Remembered lines for `path`, if any.
    pub fn lines_for(&self, path: &str) -> Option<&[usize]> {
        self.files
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.lines.as_slice())
    }

    /// Replace the entry for `path`.  An empty `lines` forgets the file.
    ///
    /// Returns `true` if the stored list changed.
    pub fn remember(&mut self, path: &str, lines: Vec<usize>) -> bool {
        let before = self.files.len();
        let previous = self
            .files
            .iter()
            .position(|e| e.path == path)
            .map(|i| self.files.remove(i));
        if lines.is_empty() {
            return previous.is_some();
        }
        let unchanged = previous.as_ref().is_some_and(|p| p.lines == lines);
        self.files.insert(
            0,
            BookmarkEntry {
                path: path.to_owned(),
                lines,
            },
        );
        self.files.truncate(self.max_files);
        !unchanged || self.files.len() != before
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub view: ViewSettings,
    pub session: SessionSettings,
    pub bookmarks: BookmarkSettings,
}

impl Settings {
    /// Read settings from `path`.
    ///
    /// A missing or malformed file yields the defaults; the editor must
    /// always be able to start.
    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no settings file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "settings file unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

// ── Locations ─────────────────────────────────────────────────────────────────

/// Per-user directory holding settings, session and log files.
///
/// `%APPDATA%\ribbonpad` on Windows; `$XDG_CONFIG_HOME/ribbonpad` or
/// `$HOME/.config/ribbonpad` elsewhere.  `None` if no base variable is set.
pub fn settings_dir() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        PathBuf::from(std::env::var_os("APPDATA")?)
    } else if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else {
        PathBuf::from(std::env::var_os("HOME")?).join(".config")
    };
    Some(base.join(APP_DIR))
}

/// Full path of `settings.json`.
pub fn settings_path() -> Option<PathBuf> {
    settings_dir().map(|d| d.join(SETTINGS_FILE))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"session":{"autoload":true}}"#).expect("parse");
        assert!(s.session.autoload);
        assert_eq!(s.view, ViewSettings::default());
        assert_eq!(s.bookmarks.max_files, 30);
    }

    #[test]
    fn missing_keys_inside_a_section_fall_back() {
        let s: Settings = serde_json::from_str(r#"{"view":{"tab_width":8}}"#).expect("parse");
        assert_eq!(s.view.tab_width, 8);
        assert!(s.view.folding);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::default();
        s.view.whitespace = true;
        s.bookmarks.remember("/tmp/a.txt", vec![3, 7]);
        s.save_to(&path).expect("save");
        assert_eq!(Settings::load_from(&path), s);
    }

    #[test]
    fn malformed_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").expect("write");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn remember_moves_entry_to_front_and_caps() {
        let mut b = BookmarkSettings {
            max_files: 2,
            files: Vec::new(),
        };
        b.remember("a", vec![1]);
        b.remember("b", vec![2]);
        b.remember("c", vec![3]);
        let paths: Vec<_> = b.files.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["c", "b"]);

        b.remember("b", vec![5]);
        assert_eq!(b.files[0].path, "b");
        assert_eq!(b.lines_for("b"), Some(&[5][..]));
    }

    #[test]
    fn remember_empty_forgets() {
        let mut b = BookmarkSettings::default();
        b.remember("a", vec![1]);
        assert!(b.remember("a", Vec::new()));
        assert!(b.lines_for("a").is_none());
        assert!(!b.remember("a", Vec::new()));
    }

    #[test]
    fn remember_same_lines_is_not_a_change() {
        let mut b = BookmarkSettings::default();
        assert!(b.remember("a", vec![1, 2]));
        assert!(!b.remember("a", vec![1, 2]));
    }
}
