// ── In-memory editor view ─────────────────────────────────────────────────────
//
// A pure-Rust `EditorView` that behaves like a Scintilla control closely
// enough for the command layer: multiple document buffers, CR/LF/CRLF line
// indexing, grouped undo with a save point, indentation-based folding and
// per-line marker sets.  Used for headless runs and throughout the tests.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use rustc_hash::FxHashMap;

use super::{
    DocId, EditorNotification, EditorView, EolMode, FoldLevel, ZOOM_MAX, ZOOM_MIN,
};

// ── Buffer ────────────────────────────────────────────────────────────────────

/// State restored by one undo step.
#[derive(Debug, Clone)]
struct Snapshot {
    text: String,
    anchor: usize,
    caret: usize,
    revision: u64,
}

/// Per-document storage; selection and view options live on the view.
#[derive(Debug)]
struct Buffer {
    text: String,
    line_starts: Vec<usize>,
    levels: Vec<FoldLevel>,
    eol: EolMode,
    read_only: bool,
    markers: BTreeMap<usize, u32>,
    collapsed: BTreeSet<usize>,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    /// Identifies the current text; compared against `saved` for dirtiness.
    revision: u64,
    next_revision: u64,
    saved: u64,
    group_depth: u32,
    group_recorded: bool,
}

impl Buffer {
    fn new(tab_width: usize) -> Self {
        let mut buf = Self {
            text: String::new(),
            line_starts: Vec::new(),
            levels: Vec::new(),
            eol: EolMode::default(),
            read_only: false,
            markers: BTreeMap::new(),
            collapsed: BTreeSet::new(),
            undo: Vec::new(),
            redo: Vec::new(),
            revision: 0,
            next_revision: 1,
            saved: 0,
            group_depth: 0,
            group_recorded: false,
        };
        buf.reindex(tab_width);
        buf
    }

    fn reindex(&mut self, tab_width: usize) {
        self.line_starts = line_starts(&self.text);
        self.levels = fold_levels(&self.text, &self.line_starts, tab_width);
        let levels = &self.levels;
        self.collapsed
            .retain(|&l| levels.get(l).is_some_and(|lv| lv.header));
        let count = self.line_starts.len();
        self.markers.retain(|&l, _| l < count);
    }

    fn is_modified(&self) -> bool {
        self.revision != self.saved
    }

    fn bump_revision(&mut self) {
        self.revision = self.next_revision;
        self.next_revision += 1;
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn floor_char(&self, pos: usize) -> usize {
        let mut p = pos.min(self.text.len());
        while !self.text.is_char_boundary(p) {
            p -= 1;
        }
        p
    }

    fn line_from_position(&self, pos: usize) -> usize {
        let pos = pos.min(self.text.len());
        self.line_starts.partition_point(|&s| s <= pos).saturating_sub(1)
    }

    fn position_from_line(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    fn line_end_position(&self, line: usize) -> usize {
        let Some(&next) = self.line_starts.get(line + 1) else {
            return self.text.len();
        };
        let bytes = self.text.as_bytes();
        if next >= 2 && bytes[next - 1] == b'\n' && bytes[next - 2] == b'\r' {
            next - 2
        } else {
            next - 1
        }
    }
}

/// Byte offsets where each line begins.  `\r\n`, `\n` and `\r` all end a line.
pub(super) fn line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                starts.push(i + 1);
            }
            b'\n' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}

/// Indentation width of `line` in columns, `None` for whitespace-only lines.
fn indent_width(line: &str, tab_width: usize) -> Option<usize> {
    let mut col = 0;
    for ch in line.chars() {
        match ch {
            ' ' => col += 1,
            '\t' => col = (col / tab_width + 1) * tab_width,
            '\r' | '\n' => return None,
            _ => return Some(col),
        }
    }
    None
}

/// Indentation-based fold levels.  Each distinct indent depth on the way in
/// is one level, and a line is a header when the next non-blank line is
/// indented further.  Blank lines take the level of the next non-blank line.
pub(super) fn fold_levels(text: &str, starts: &[usize], tab_width: usize) -> Vec<FoldLevel> {
    let tab_width = tab_width.max(1);
    let widths: Vec<Option<usize>> = (0..starts.len())
        .map(|line| {
            let end = starts.get(line + 1).copied().unwrap_or(text.len());
            indent_width(&text[starts[line]..end], tab_width)
        })
        .collect();

    // Open indent widths, innermost last.
    let mut depths: Vec<usize> = vec![0];
    let mut levels: Vec<Option<u32>> = Vec::with_capacity(widths.len());
    for width in &widths {
        levels.push(width.map(|w| {
            while depths.last().is_some_and(|&d| d > w) {
                depths.pop();
            }
            if depths.last().map_or(true, |&d| d < w) {
                depths.push(w);
            }
            depths.len().saturating_sub(1) as u32
        }));
    }

    let mut out = vec![FoldLevel::default(); widths.len()];
    let mut next: Option<(usize, u32)> = None;
    for line in (0..widths.len()).rev() {
        out[line] = match (widths[line], levels[line]) {
            (Some(width), Some(level)) => {
                let header = next.is_some_and(|(w, _)| w > width);
                next = Some((width, level));
                FoldLevel {
                    level,
                    header,
                    blank: false,
                }
            }
            _ => FoldLevel {
                level: next.map_or(0, |(_, l)| l),
                header: false,
                blank: true,
            },
        };
    }
    out
}

// ── MemoryView ────────────────────────────────────────────────────────────────

/// Headless editor control.
#[derive(Debug)]
pub struct MemoryView {
    active: DocId,
    current: Buffer,
    parked: FxHashMap<DocId, Buffer>,
    anchor: usize,
    caret: usize,
    first_visible_line: usize,
    zoom: i32,
    word_wrap: bool,
    whitespace: bool,
    view_eol: bool,
    tab_width: usize,
    edge_column: Option<usize>,
    fold_margin: bool,
    clipboard: String,
    notifications: Vec<EditorNotification>,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryView {
    /// Document shown before any other has been created.
    pub const SCRATCH: DocId = DocId(0);

    pub fn new() -> Self {
        let tab_width = 4;
        Self {
            active: Self::SCRATCH,
            current: Buffer::new(tab_width),
            parked: FxHashMap::default(),
            anchor: 0,
            caret: 0,
            first_visible_line: 0,
            zoom: 0,
            word_wrap: false,
            whitespace: false,
            view_eol: false,
            tab_width,
            edge_column: None,
            fold_margin: false,
            clipboard: String::new(),
            notifications: Vec::new(),
        }
    }

    /// The document currently shown.
    pub fn active_document(&self) -> DocId {
        self.active
    }

    /// Number of allocated buffers, including the active one.
    pub fn document_count(&self) -> usize {
        self.parked.len() + 1
    }

    /// Contents of the clipboard.
    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    pub fn set_clipboard(&mut self, text: &str) {
        text.clone_into(&mut self.clipboard);
    }

    fn notify(&mut self, n: EditorNotification) {
        self.notifications.push(n);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.current.text.clone(),
            anchor: self.anchor,
            caret: self.caret,
            revision: self.current.revision,
        }
    }

    /// Record an undo step unless the open group already has one.
    fn record_undo(&mut self) {
        let grouped = self.current.group_depth > 0;
        if !grouped || !self.current.group_recorded {
            let snap = self.snapshot();
            self.current.undo.push(snap);
            self.current.group_recorded = grouped;
        }
        self.current.redo.clear();
    }

    /// Install `snap` as the buffer content, emitting the matching events.
    fn restore(&mut self, snap: Snapshot) {
        let was_modified = self.current.is_modified();
        let old_lines = self.current.line_count() as isize;
        self.current.text = snap.text;
        self.current.revision = snap.revision;
        self.current.reindex(self.tab_width);
        let len = self.current.text.len();
        self.anchor = self.current.floor_char(snap.anchor.min(len));
        self.caret = self.current.floor_char(snap.caret.min(len));
        self.notify(EditorNotification::Modified {
            position: 0,
            lines_added: self.current.line_count() as isize - old_lines,
        });
        self.notify_save_point(was_modified);
        self.notify(EditorNotification::UpdateUi);
    }

    fn notify_save_point(&mut self, was_modified: bool) {
        match (was_modified, self.current.is_modified()) {
            (false, true) => self.notify(EditorNotification::SavePointLeft),
            (true, false) => self.notify(EditorNotification::SavePointReached),
            _ => {}
        }
    }

    fn map_position(pos: usize, start: usize, end: usize, inserted: usize) -> usize {
        if pos <= start {
            pos
        } else if pos >= end {
            pos - (end - start) + inserted
        } else {
            start
        }
    }
}

impl EditorView for MemoryView {
    // ── Documents ─────────────────────────────────────────────────────────────

    fn create_document(&mut self, id: DocId) {
        if id == self.active || self.parked.contains_key(&id) {
            return;
        }
        self.parked.insert(id, Buffer::new(self.tab_width));
    }

    fn activate_document(&mut self, id: DocId) {
        if id == self.active {
            return;
        }
        let Some(mut next) = self.parked.remove(&id) else {
            tracing::debug!(%id, "activate_document: unknown document");
            return;
        };
        next.reindex(self.tab_width);
        let prev = mem::replace(&mut self.current, next);
        self.parked.insert(self.active, prev);
        self.active = id;
        self.anchor = 0;
        self.caret = 0;
        self.first_visible_line = 0;
        self.notify(EditorNotification::UpdateUi);
    }

    fn release_document(&mut self, id: DocId) {
        if id != self.active {
            self.parked.remove(&id);
        }
    }

    // ── Content ───────────────────────────────────────────────────────────────

    fn text(&self) -> String {
        self.current.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        if self.current.read_only {
            return;
        }
        let old_lines = self.current.line_count() as isize;
        text.clone_into(&mut self.current.text);
        self.current.markers.clear();
        self.current.collapsed.clear();
        self.current.undo.clear();
        self.current.redo.clear();
        self.current.bump_revision();
        self.current.saved = self.current.revision;
        self.current.reindex(self.tab_width);
        self.anchor = 0;
        self.caret = 0;
        self.first_visible_line = 0;
        self.notify(EditorNotification::Modified {
            position: 0,
            lines_added: self.current.line_count() as isize - old_lines,
        });
        self.notify(EditorNotification::UpdateUi);
    }

    fn len(&self) -> usize {
        self.current.text.len()
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        let s = self.current.floor_char(start.min(end));
        let e = self.current.floor_char(start.max(end));
        self.current.text[s..e].to_owned()
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        if self.current.read_only {
            return;
        }
        let s = self.current.floor_char(start.min(end));
        let e = self.current.floor_char(start.max(end));
        if s == e && text.is_empty() {
            return;
        }
        let was_modified = self.current.is_modified();
        self.record_undo();

        let first_line = self.current.line_from_position(s);
        let last_line = self.current.line_from_position(e);
        let old_lines = self.current.line_count() as isize;

        self.current.text.replace_range(s..e, text);
        self.current.bump_revision();

        let delta = line_starts(&self.current.text).len() as isize - old_lines;
        let shift = |line: usize| -> usize {
            if line <= first_line {
                line
            } else if line <= last_line {
                first_line
            } else {
                (line as isize + delta).max(first_line as isize) as usize
            }
        };
        let markers = mem::take(&mut self.current.markers);
        for (line, mask) in markers {
            *self.current.markers.entry(shift(line)).or_insert(0) |= mask;
        }
        let collapsed = mem::take(&mut self.current.collapsed);
        self.current.collapsed = collapsed
            .into_iter()
            .filter(|&l| l <= first_line || l > last_line)
            .map(shift)
            .collect();
        self.current.reindex(self.tab_width);

        self.anchor = Self::map_position(self.anchor, s, e, text.len());
        self.caret = Self::map_position(self.caret, s, e, text.len());

        self.notify(EditorNotification::Modified {
            position: s,
            lines_added: delta,
        });
        self.notify_save_point(was_modified);
        self.notify(EditorNotification::UpdateUi);
    }

    // ── Lines ─────────────────────────────────────────────────────────────────

    fn line_count(&self) -> usize {
        self.current.line_count()
    }

    fn line_from_position(&self, pos: usize) -> usize {
        self.current.line_from_position(pos)
    }

    fn position_from_line(&self, line: usize) -> usize {
        self.current.position_from_line(line)
    }

    fn line_end_position(&self, line: usize) -> usize {
        self.current.line_end_position(line)
    }

    fn column(&self, pos: usize) -> usize {
        let pos = self.current.floor_char(pos);
        let start = self.current.position_from_line(self.current.line_from_position(pos));
        let tab_width = self.tab_width.max(1);
        self.current.text[start..pos].chars().fold(0, |col, ch| {
            if ch == '\t' {
                (col / tab_width + 1) * tab_width
            } else {
                col + 1
            }
        })
    }

    fn find_column(&self, line: usize, column: usize) -> usize {
        let start = self.current.position_from_line(line);
        let end = self.current.line_end_position(line);
        let tab_width = self.tab_width.max(1);
        let mut col = 0;
        for (i, ch) in self.current.text[start..end].char_indices() {
            if col >= column {
                return start + i;
            }
            let next = if ch == '\t' {
                (col / tab_width + 1) * tab_width
            } else {
                col + 1
            };
            if next > column {
                return start + i;
            }
            col = next;
        }
        end
    }

    // ── Selection & scrolling ─────────────────────────────────────────────────

    fn anchor(&self) -> usize {
        self.anchor
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_selection(&mut self, anchor: usize, caret: usize) {
        let anchor = self.current.floor_char(anchor);
        let caret = self.current.floor_char(caret);
        if (anchor, caret) != (self.anchor, self.caret) {
            self.anchor = anchor;
            self.caret = caret;
            self.notify(EditorNotification::UpdateUi);
        }
    }

    fn first_visible_line(&self) -> usize {
        self.first_visible_line
    }

    fn set_first_visible_line(&mut self, line: usize) {
        self.first_visible_line = line.min(self.current.line_count().saturating_sub(1));
    }

    fn scroll_caret(&mut self) {
        let line = self.current.line_from_position(self.caret);
        if line < self.first_visible_line {
            self.first_visible_line = line;
        }
    }

    // ── Undo ──────────────────────────────────────────────────────────────────

    fn begin_undo_action(&mut self) {
        if self.current.group_depth == 0 {
            self.current.group_recorded = false;
        }
        self.current.group_depth += 1;
    }

    fn end_undo_action(&mut self) {
        self.current.group_depth = self.current.group_depth.saturating_sub(1);
        if self.current.group_depth == 0 {
            self.current.group_recorded = false;
        }
    }

    fn undo(&mut self) {
        let Some(snap) = self.current.undo.pop() else {
            return;
        };
        let current = self.snapshot();
        self.current.redo.push(current);
        self.restore(snap);
    }

    fn redo(&mut self) {
        let Some(snap) = self.current.redo.pop() else {
            return;
        };
        let current = self.snapshot();
        self.current.undo.push(current);
        self.restore(snap);
    }

    fn can_undo(&self) -> bool {
        !self.current.undo.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.current.redo.is_empty()
    }

    fn empty_undo_buffer(&mut self) {
        self.current.undo.clear();
        self.current.redo.clear();
    }

    fn set_save_point(&mut self) {
        let was_modified = self.current.is_modified();
        self.current.saved = self.current.revision;
        self.notify_save_point(was_modified);
    }

    fn is_modified(&self) -> bool {
        self.current.is_modified()
    }

    // ── Clipboard & selection editing ─────────────────────────────────────────

    fn cut(&mut self) {
        if self.selection_empty() || self.current.read_only {
            return;
        }
        self.copy();
        let (s, e) = (self.selection_start(), self.selection_end());
        self.replace_range(s, e, "");
    }

    fn copy(&mut self) {
        if !self.selection_empty() {
            self.clipboard = self.text_range(self.selection_start(), self.selection_end());
        }
    }

    fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let (s, e) = (self.selection_start(), self.selection_end());
        let clip = self.clipboard.clone();
        self.replace_range(s, e, &clip);
        let pos = s + clip.len();
        self.set_selection(pos, pos);
    }

    fn clear(&mut self) {
        let (s, e) = (self.selection_start(), self.selection_end());
        if s != e {
            self.replace_range(s, e, "");
            return;
        }
        let rest = &self.current.text[s..];
        let width = if rest.starts_with("\r\n") {
            2
        } else {
            rest.chars().next().map_or(0, char::len_utf8)
        };
        if width > 0 {
            self.replace_range(s, s + width, "");
        }
    }

    fn select_all(&mut self) {
        let len = self.len();
        self.set_selection(0, len);
    }

    // ── View options ──────────────────────────────────────────────────────────

    fn zoom(&self) -> i32 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: i32) {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.notify(EditorNotification::Zoom);
        }
    }

    fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    fn set_word_wrap(&mut self, enabled: bool) {
        self.word_wrap = enabled;
    }

    fn view_whitespace(&self) -> bool {
        self.whitespace
    }

    fn set_view_whitespace(&mut self, visible: bool) {
        self.whitespace = visible;
    }

    fn view_eol(&self) -> bool {
        self.view_eol
    }

    fn set_view_eol(&mut self, visible: bool) {
        self.view_eol = visible;
    }

    fn tab_width(&self) -> usize {
        self.tab_width
    }

    fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
        self.current.reindex(self.tab_width);
    }

    fn edge_column(&self) -> Option<usize> {
        self.edge_column
    }

    fn set_edge_column(&mut self, column: Option<usize>) {
        self.edge_column = column;
    }

    fn eol_mode(&self) -> EolMode {
        self.current.eol
    }

    fn set_eol_mode(&mut self, eol: EolMode) {
        self.current.eol = eol;
    }

    fn convert_eols(&mut self, eol: EolMode) {
        let text = &self.current.text;
        let mut out = String::with_capacity(text.len());
        let mut start = 0;
        for (i, line_start) in self.current.line_starts.iter().enumerate().skip(1) {
            let end = self.current.line_end_position(i - 1);
            out.push_str(&text[start..end]);
            out.push_str(eol.sequence());
            start = *line_start;
        }
        out.push_str(&text[start..]);
        if out != self.current.text {
            let len = self.len();
            let (anchor, caret) = (self.anchor, self.caret);
            let (anchor_line, caret_line) = (
                self.current.line_from_position(anchor),
                self.current.line_from_position(caret),
            );
            let (anchor_col, caret_col) = (
                anchor - self.current.position_from_line(anchor_line),
                caret - self.current.position_from_line(caret_line),
            );
            self.replace_range(0, len, &out);
            let a = self.current.position_from_line(anchor_line) + anchor_col;
            let c = self.current.position_from_line(caret_line) + caret_col;
            self.set_selection(a, c);
        }
    }

    fn read_only(&self) -> bool {
        self.current.read_only
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.current.read_only = read_only;
    }

    // ── Folding ───────────────────────────────────────────────────────────────

    fn fold_margin(&self) -> bool {
        self.fold_margin
    }

    fn set_fold_margin(&mut self, visible: bool) {
        self.fold_margin = visible;
    }

    fn fold_level(&self, line: usize) -> FoldLevel {
        self.current.levels.get(line).copied().unwrap_or_default()
    }

    fn fold_expanded(&self, line: usize) -> bool {
        !self.current.collapsed.contains(&line)
    }

    fn toggle_fold(&mut self, line: usize) {
        if !self.fold_level(line).header {
            return;
        }
        if !self.current.collapsed.remove(&line) {
            self.current.collapsed.insert(line);
        }
    }

    fn fold_parent(&self, line: usize) -> Option<usize> {
        let level = self.current.levels.get(line)?.level;
        (0..line)
            .rev()
            .find(|&l| self.current.levels[l].header && self.current.levels[l].level < level)
    }

    // ── Markers ───────────────────────────────────────────────────────────────

    fn marker_add(&mut self, line: usize, marker: u32) {
        if line < self.current.line_count() {
            *self.current.markers.entry(line).or_insert(0) |= super::marker_mask(marker);
        }
    }

    fn marker_delete(&mut self, line: usize, marker: u32) {
        if let Some(mask) = self.current.markers.get_mut(&line) {
            *mask &= !super::marker_mask(marker);
            if *mask == 0 {
                self.current.markers.remove(&line);
            }
        }
    }

    fn marker_delete_all(&mut self, marker: u32) {
        let bit = super::marker_mask(marker);
        self.current.markers.retain(|_, mask| {
            *mask &= !bit;
            *mask != 0
        });
    }

    fn marker_get(&self, line: usize) -> u32 {
        self.current.markers.get(&line).copied().unwrap_or(0)
    }

    fn marker_next(&self, from: usize, mask: u32) -> Option<usize> {
        self.current
            .markers
            .range(from..)
            .find(|(_, m)| **m & mask != 0)
            .map(|(l, _)| *l)
    }

    fn marker_previous(&self, from: usize, mask: u32) -> Option<usize> {
        self.current
            .markers
            .range(..=from)
            .rev()
            .find(|(_, m)| **m & mask != 0)
            .map(|(l, _)| *l)
    }

    // ── Notifications ─────────────────────────────────────────────────────────

    fn take_notifications(&mut self) -> Vec<EditorNotification> {
        mem::take(&mut self.notifications)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{marked_lines, MARK_BOOKMARK};

    fn view_with(text: &str) -> MemoryView {
        let mut v = MemoryView::new();
        v.set_text(text);
        v.take_notifications();
        v
    }

    #[test]
    fn mixed_line_endings_are_indexed() {
        let v = view_with("a\r\nbb\ncc\rd");
        assert_eq!(v.line_count(), 4);
        assert_eq!(v.line_text(0), "a");
        assert_eq!(v.line_text(1), "bb");
        assert_eq!(v.line_text(2), "cc");
        assert_eq!(v.line_text(3), "d");
        assert_eq!(v.line_end_position(0), 1);
        assert_eq!(v.position_from_line(1), 3);
        assert_eq!(v.line_from_position(4), 1);
    }

    #[test]
    fn trailing_newline_adds_empty_last_line() {
        let v = view_with("x\n");
        assert_eq!(v.line_count(), 2);
        assert_eq!(v.line_text(1), "");
        assert_eq!(v.position_from_line(9), 2);
    }

    #[test]
    fn replace_moves_caret_after_the_edit() {
        let mut v = view_with("hello world");
        v.set_selection(11, 11);
        v.replace_range(0, 5, "goodbye");
        assert_eq!(v.text(), "goodbye world");
        assert_eq!(v.caret(), 13);
    }

    #[test]
    fn grouped_edits_undo_as_one_step() {
        let mut v = view_with("abc");
        v.begin_undo_action();
        v.replace_range(0, 1, "A");
        v.replace_range(1, 2, "B");
        v.end_undo_action();
        v.replace_range(2, 3, "C");
        assert_eq!(v.text(), "ABC");
        v.undo();
        assert_eq!(v.text(), "ABc");
        v.undo();
        assert_eq!(v.text(), "abc");
        assert!(!v.can_undo());
        v.redo();
        assert_eq!(v.text(), "ABc");
    }

    #[test]
    fn undo_back_to_save_point_reports_clean() {
        let mut v = view_with("abc");
        assert!(!v.is_modified());
        v.replace_range(3, 3, "d");
        assert!(v.is_modified());
        v.undo();
        assert!(!v.is_modified());
        let events = v.take_notifications();
        assert!(events.contains(&EditorNotification::SavePointLeft));
        assert!(events.contains(&EditorNotification::SavePointReached));
    }

    #[test]
    fn read_only_blocks_edits() {
        let mut v = view_with("abc");
        v.set_read_only(true);
        v.replace_range(0, 3, "xyz");
        assert_eq!(v.text(), "abc");
    }

    #[test]
    fn markers_follow_inserted_lines() {
        let mut v = view_with("a\nb\nc");
        v.marker_add(2, MARK_BOOKMARK);
        v.replace_range(0, 0, "new\n");
        assert_eq!(marked_lines(&v, MARK_BOOKMARK), vec![3]);
        let last = v.position_from_line(3);
        v.replace_range(0, v.position_from_line(1), "");
        assert_eq!(marked_lines(&v, MARK_BOOKMARK), vec![2]);
        assert_eq!(v.line_from_position(last - 4), 2);
    }

    #[test]
    fn marker_next_and_previous_respect_mask() {
        let mut v = view_with("0\n1\n2\n3\n4");
        v.marker_add(1, MARK_BOOKMARK);
        v.marker_add(3, 5);
        let mask = crate::editor::marker_mask(MARK_BOOKMARK);
        assert_eq!(v.marker_next(2, mask), None);
        assert_eq!(v.marker_next(0, mask), Some(1));
        assert_eq!(v.marker_previous(4, mask), Some(1));
        assert_eq!(v.marker_get(3), 1 << 5);
    }

    #[test]
    fn indentation_drives_fold_levels() {
        let v = view_with("fn a\n    body\n\n    more\nfn b");
        assert!(v.fold_level(0).header);
        assert_eq!(v.fold_level(1).level, 1);
        assert!(v.fold_level(2).blank);
        assert_eq!(v.fold_level(2).level, 1);
        assert!(!v.fold_level(4).header);
        assert_eq!(v.fold_parent(3), Some(0));
    }

    #[test]
    fn narrow_indents_still_nest() {
        let v = view_with("fn a\n  if x\n    y\n  z\n w\nfn b\n");
        let levels: Vec<u32> = (0..6).map(|l| v.fold_level(l).level).collect();
        assert_eq!(levels, [0, 1, 2, 1, 1, 0]);
        let headers: Vec<usize> = (0..6).filter(|&l| v.fold_level(l).header).collect();
        assert_eq!(headers, [0, 1]);
        assert_eq!(v.fold_parent(2), Some(1));
    }

    #[test]
    fn toggle_fold_only_affects_headers() {
        let mut v = view_with("a\n  b\nc");
        v.toggle_fold(0);
        assert!(!v.fold_expanded(0));
        v.toggle_fold(2);
        assert!(v.fold_expanded(2));
        v.toggle_fold(0);
        assert!(v.fold_expanded(0));
    }

    #[test]
    fn columns_expand_tabs() {
        let mut v = view_with("\tx\ty");
        v.set_tab_width(4);
        assert_eq!(v.column(1), 4);
        assert_eq!(v.column(3), 8);
        assert_eq!(v.find_column(0, 5), 2);
        assert_eq!(v.find_column(0, 100), 4);
    }

    #[test]
    fn convert_eols_rewrites_every_break() {
        let mut v = view_with("a\r\nb\rc\nd");
        v.convert_eols(EolMode::Lf);
        assert_eq!(v.text(), "a\nb\nc\nd");
    }

    #[test]
    fn documents_keep_separate_text() {
        let mut v = view_with("scratch");
        v.create_document(DocId(1));
        v.activate_document(DocId(1));
        assert_eq!(v.text(), "");
        v.set_text("one");
        v.activate_document(MemoryView::SCRATCH);
        assert_eq!(v.text(), "scratch");
        v.release_document(DocId(1));
        assert_eq!(v.document_count(), 1);
    }

    #[test]
    fn cut_and_paste_through_clipboard() {
        let mut v = view_with("hello world");
        v.set_selection(0, 6);
        v.cut();
        assert_eq!(v.text(), "world");
        assert_eq!(v.clipboard(), "hello ");
        v.set_selection(5, 5);
        v.paste();
        assert_eq!(v.text(), "worldhello ");
        assert_eq!(v.caret(), 11);
    }

    #[test]
    fn zoom_is_clamped_and_notifies_once() {
        let mut v = view_with("");
        v.set_zoom(99);
        v.set_zoom(99);
        assert_eq!(v.zoom(), ZOOM_MAX);
        assert_eq!(v.take_notifications(), vec![EditorNotification::Zoom]);
    }
}
