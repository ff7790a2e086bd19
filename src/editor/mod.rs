// ── Editor component abstraction ──────────────────────────────────────────────
//
// `EditorView` is the raw editor control as the commands see it: a
// Scintilla-shaped surface addressed in UTF-8 byte positions.  Two
// implementations exist:
//   • `memory::MemoryView`     – pure Rust; headless use and tests
//   • `scintilla::ScintillaView` – Windows only; a hosted Scintilla child window
//
// Commands never touch Win32 handles; they only talk to this trait.

pub mod memory;

#[cfg(windows)]
pub mod scintilla;

use std::fmt;

// ── Document identity ─────────────────────────────────────────────────────────

/// Stable identity of an open document.  Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(pub u32);

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

// ── EOL mode ──────────────────────────────────────────────────────────────────

/// The end-of-line convention used by the document.
///
/// Matches Scintilla's `SC_EOL_*` constants (set via `SCI_SETEOLMODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolMode {
    /// Windows-style `\r\n` (Scintilla: `SC_EOL_CRLF = 0`).
    #[default]
    Crlf,
    /// Unix-style `\n` (Scintilla: `SC_EOL_LF = 2`).
    Lf,
    /// Old Mac-style `\r` (Scintilla: `SC_EOL_CR = 1`).
    Cr,
}

impl EolMode {
    /// Short display string shown in the status bar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "CRLF",
            Self::Lf => "LF",
            Self::Cr => "CR",
        }
    }

    /// The line break this mode inserts.
    pub fn sequence(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
            Self::Cr => "\r",
        }
    }
}

// ── Zoom ──────────────────────────────────────────────────────────────────────

/// Scintilla clamps `SCI_SETZOOM` to this range (points added to font size).
pub const ZOOM_MIN: i32 = -10;
pub const ZOOM_MAX: i32 = 20;

// ── Markers ───────────────────────────────────────────────────────────────────

/// Marker number used for bookmarks.
pub const MARK_BOOKMARK: u32 = 24;

/// Margin index of the symbol (bookmark) margin.
pub const MARGIN_SYMBOLS: u32 = 1;

/// Bit mask covering a single marker number.
pub const fn marker_mask(marker: u32) -> u32 {
    1 << marker
}

// ── Folding ───────────────────────────────────────────────────────────────────

/// Fold information for one line, with Scintilla's `SC_FOLDLEVELBASE`
/// already subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FoldLevel {
    pub level: u32,
    /// The line starts a foldable block.
    pub header: bool,
    /// The line contains only whitespace.
    pub blank: bool,
}

// ── Control notifications ─────────────────────────────────────────────────────

/// An event raised by the editor control itself (Scintilla `SCN_*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorNotification {
    /// Caret moved, selection changed, or content changed.
    UpdateUi,
    /// Text was inserted or deleted.
    Modified { position: usize, lines_added: isize },
    /// Document first edited after a save point.
    SavePointLeft,
    /// Document returned to a save point (e.g. undo).
    SavePointReached,
    /// A margin was clicked.
    MarginClick { line: usize, margin: u32, modifiers: u32 },
    /// The zoom level changed.
    Zoom,
}

// ── EditorView ────────────────────────────────────────────────────────────────

/// The editing surface that commands operate on.
///
/// All positions are byte offsets into the UTF-8 text of the *active*
/// document; lines are 0-based.  Out-of-range positions and lines are
/// clamped rather than rejected, as Scintilla does.
pub trait EditorView {
    // ── Documents ─────────────────────────────────────────────────────────────

    /// Allocate an empty buffer for `id`.  Does not activate it.
    fn create_document(&mut self, id: DocId);
    /// Show `id` in the view.  Selection and scroll reset to the start.
    fn activate_document(&mut self, id: DocId);
    /// Free the buffer of `id`.  Releasing the active document is a no-op.
    fn release_document(&mut self, id: DocId);

    // ── Content ───────────────────────────────────────────────────────────────

    fn text(&self) -> String;
    /// Replace all text; clears undo history and sets the save point.
    fn set_text(&mut self, text: &str);
    /// Total byte length.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn text_range(&self, start: usize, end: usize) -> String;
    fn replace_range(&mut self, start: usize, end: usize, text: &str);
    fn append_text(&mut self, text: &str) {
        let end = self.len();
        self.replace_range(end, end, text);
    }

    // ── Lines ─────────────────────────────────────────────────────────────────

    /// Number of lines (always ≥ 1).
    fn line_count(&self) -> usize;
    fn line_from_position(&self, pos: usize) -> usize;
    fn position_from_line(&self, line: usize) -> usize;
    /// Position just before the line's EOL sequence.
    fn line_end_position(&self, line: usize) -> usize;
    /// Text of `line` without its EOL sequence.
    fn line_text(&self, line: usize) -> String {
        self.text_range(self.position_from_line(line), self.line_end_position(line))
    }
    /// Visual column of `pos` (tabs expand to the tab width).
    fn column(&self, pos: usize) -> usize;
    /// Position on `line` at visual `column`, clamped to the line end.
    fn find_column(&self, line: usize, column: usize) -> usize;

    // ── Selection & scrolling ─────────────────────────────────────────────────

    fn anchor(&self) -> usize;
    fn caret(&self) -> usize;
    fn set_selection(&mut self, anchor: usize, caret: usize);
    fn selection_start(&self) -> usize {
        self.anchor().min(self.caret())
    }
    fn selection_end(&self) -> usize {
        self.anchor().max(self.caret())
    }
    fn selection_empty(&self) -> bool {
        self.anchor() == self.caret()
    }
    /// Column (box) selection mode.
    fn is_rectangular_selection(&self) -> bool {
        false
    }
    fn first_visible_line(&self) -> usize;
    fn set_first_visible_line(&mut self, line: usize);
    fn scroll_caret(&mut self);
    /// Move the caret to the start of `line` and scroll it into view.
    fn goto_line(&mut self, line: usize) {
        let pos = self.position_from_line(line);
        self.set_selection(pos, pos);
        self.scroll_caret();
    }

    // ── Undo ──────────────────────────────────────────────────────────────────

    fn begin_undo_action(&mut self);
    fn end_undo_action(&mut self);
    fn undo(&mut self);
    fn redo(&mut self);
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    fn empty_undo_buffer(&mut self);
    fn set_save_point(&mut self);
    /// `true` when the text differs from the save point.
    fn is_modified(&self) -> bool;

    // ── Clipboard & selection editing ─────────────────────────────────────────

    fn cut(&mut self);
    fn copy(&mut self);
    fn paste(&mut self);
    /// Delete the selection, or the character after the caret.
    fn clear(&mut self);
    fn select_all(&mut self);

    // ── View options ──────────────────────────────────────────────────────────

    fn zoom(&self) -> i32;
    /// Clamped to `ZOOM_MIN..=ZOOM_MAX`.
    fn set_zoom(&mut self, zoom: i32);
    fn word_wrap(&self) -> bool;
    fn set_word_wrap(&mut self, enabled: bool);
    fn view_whitespace(&self) -> bool;
    fn set_view_whitespace(&mut self, visible: bool);
    fn view_eol(&self) -> bool;
    fn set_view_eol(&mut self, visible: bool);
    fn tab_width(&self) -> usize;
    fn set_tab_width(&mut self, width: usize);
    /// Long-line edge column, `None` when the edge is hidden.
    fn edge_column(&self) -> Option<usize>;
    fn set_edge_column(&mut self, column: Option<usize>);
    fn eol_mode(&self) -> EolMode;
    fn set_eol_mode(&mut self, eol: EolMode);
    /// Rewrite every existing line break to `eol`.
    fn convert_eols(&mut self, eol: EolMode);
    fn read_only(&self) -> bool;
    fn set_read_only(&mut self, read_only: bool);

    // ── Folding ───────────────────────────────────────────────────────────────

    fn fold_margin(&self) -> bool;
    fn set_fold_margin(&mut self, visible: bool);
    fn fold_level(&self, line: usize) -> FoldLevel;
    fn fold_expanded(&self, line: usize) -> bool;
    fn toggle_fold(&mut self, line: usize);
    /// Header line of the fold block containing `line`.
    fn fold_parent(&self, line: usize) -> Option<usize>;

    // ── Markers ───────────────────────────────────────────────────────────────

    fn marker_add(&mut self, line: usize, marker: u32);
    fn marker_delete(&mut self, line: usize, marker: u32);
    fn marker_delete_all(&mut self, marker: u32);
    /// Bit set of markers on `line`.
    fn marker_get(&self, line: usize) -> u32;
    /// First line ≥ `from` carrying any marker in `mask`.
    fn marker_next(&self, from: usize, mask: u32) -> Option<usize>;
    /// Last line ≤ `from` carrying any marker in `mask`.
    fn marker_previous(&self, from: usize, mask: u32) -> Option<usize>;

    // ── Notifications ─────────────────────────────────────────────────────────

    /// Drain events the control raised since the last call.
    fn take_notifications(&mut self) -> Vec<EditorNotification>;
}

/// Collect the lines carrying `marker`, in ascending order.
pub fn marked_lines(view: &dyn EditorView, marker: u32) -> Vec<usize> {
    let mask = marker_mask(marker);
    let mut lines = Vec::new();
    let mut from = 0;
    while let Some(line) = view.marker_next(from, mask) {
        lines.push(line);
        from = line + 1;
    }
    lines
}
