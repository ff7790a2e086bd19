// ── Editor context ────────────────────────────────────────────────────────────
//
// `EditorContext` is the editor-state accessor handed to every command call:
// the open documents, the tab order, the editor control, user settings, and
// the outgoing queues (deferred events for other commands, fire-and-forget
// requests for the UI host).  It is owned by whoever drives the registry (the
// Win32 host, or a test) and is only touched on the dispatch thread.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::commands::{CommandId, Notification, TabNotification};
use crate::config::Settings;
use crate::editor::{DocId, EditorNotification, EditorView, EolMode};
use crate::error::Result;
use crate::file_tree::Listing;
use crate::ui::tabs;

// ── Timers ────────────────────────────────────────────────────────────────────

/// Identifies a host timer started on behalf of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub usize);

/// Timer ids below this value are reserved for the host itself.
const FIRST_TIMER_ID: usize = 100;

// ── Documents ─────────────────────────────────────────────────────────────────

/// Selection and scroll state of a document that is not in the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub anchor: usize,
    pub caret: usize,
    pub first_visible_line: usize,
}

/// Per-document state kept alongside the editor control's buffer.
#[derive(Debug)]
pub struct Document {
    pub id: DocId,
    /// Absolute path to the file on disk, or `None` for an untitled buffer.
    pub path: Option<PathBuf>,
    /// `true` when the buffer contains changes not yet saved to disk.
    /// Only meaningful while the document is not active; the view is
    /// authoritative for the active one.
    pub dirty: bool,
    /// Follow mode: the file is re-read and appended on a timer.
    pub tailing: bool,
    /// Bytes of the file already loaded into the buffer.
    pub loaded_len: u64,
    pub position: Position,
}

impl Document {
    fn new(id: DocId) -> Self {
        Self {
            id,
            path: None,
            dirty: false,
            tailing: false,
            loaded_len: 0,
            position: Position::default(),
        }
    }

    /// The bare filename component, or `"Untitled"` if no path is set.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_owned())
    }
}

// ── Host requests ─────────────────────────────────────────────────────────────

/// Which cached property of a command's UI element is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// Enabled / disabled.
    State,
    /// Checked / unchecked.
    Value,
    All,
}

/// Fire-and-forget request from a command to the UI host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Re-query `Command::state`; `None` means every command.
    Invalidate {
        command: Option<CommandId>,
        kind: Invalidation,
    },
    StatusText(String),
    StartTimer { id: TimerId, interval_ms: u32 },
    StopTimer(TimerId),
    /// Replace the contents of the file tree pane.
    FileTree(Listing),
}

// ── Deferred operations ───────────────────────────────────────────────────────

/// Document-level work whose notifications must reach every command before
/// the next operation runs.  Executed by the registry's event pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    Open {
        path: PathBuf,
        position: Option<Position>,
    },
    Close(DocId),
    /// Activate the tab showing `path`, if any.
    Focus(PathBuf),
}

// ── EOL detection ─────────────────────────────────────────────────────────────

/// Detect the dominant EOL style in UTF-8 text.
///
/// Scans for `\r\n`, `\r`, and `\n` and returns whichever appears most.
/// Falls back to `EolMode::Crlf` when no line endings are present.
pub fn detect_eol(utf8: &[u8]) -> EolMode {
    let mut crlf = 0usize;
    let mut lf = 0usize;
    let mut cr = 0usize;
    let mut i = 0;
    while i < utf8.len() {
        match utf8[i] {
            b'\r' if utf8.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 2;
            }
            b'\r' => {
                cr += 1;
                i += 1;
            }
            b'\n' => {
                lf += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if crlf >= lf && crlf >= cr {
        EolMode::Crlf
    } else if lf >= cr {
        EolMode::Lf
    } else {
        EolMode::Cr
    }
}

// ── EditorContext ─────────────────────────────────────────────────────────────

/// Everything a command may read or change.
pub struct EditorContext {
    view: Box<dyn EditorView>,
    docs: FxHashMap<DocId, Document>,
    /// Tab order; every entry is a key of `docs`.
    tabs: Vec<DocId>,
    active: usize,
    next_doc: u32,
    next_timer: usize,
    settings: Settings,
    settings_path: Option<PathBuf>,
    session_path: Option<PathBuf>,
    requests: Vec<HostRequest>,
    events: VecDeque<Notification>,
    operations: VecDeque<Operation>,
}

impl EditorContext {
    /// Create a context showing one empty untitled document.
    pub fn new(view: Box<dyn EditorView>, settings: Settings) -> Self {
        let mut ctx = Self {
            view,
            docs: FxHashMap::default(),
            tabs: Vec::new(),
            active: 0,
            next_doc: 1,
            next_timer: FIRST_TIMER_ID,
            settings,
            settings_path: None,
            session_path: None,
            requests: Vec::new(),
            events: VecDeque::new(),
            operations: VecDeque::new(),
        };
        ctx.view.set_tab_width(ctx.settings.view.tab_width);
        let id = ctx.insert_document();
        ctx.tabs.push(id);
        ctx.view.activate_document(id);
        ctx.view.take_notifications();
        ctx
    }

    /// Persist settings changes to `path`.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Read and write the tab session at `path`.
    pub fn with_session_path(mut self, path: PathBuf) -> Self {
        self.session_path = Some(path);
        self
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Write settings to disk if a settings path is configured.
    ///
    /// Failures are logged; a read-only profile must not break editing.
    pub fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save settings");
        }
    }

    pub fn session_path(&self) -> Option<&Path> {
        self.session_path.as_deref()
    }

    // ── Editor control ────────────────────────────────────────────────────────

    pub fn view(&self) -> &dyn EditorView {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> &mut dyn EditorView {
        self.view.as_mut()
    }

    // ── Tabs & documents ──────────────────────────────────────────────────────

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn active_tab(&self) -> usize {
        self.active
    }

    pub fn active_doc_id(&self) -> DocId {
        self.tabs[self.active]
    }

    pub fn doc_id_at(&self, index: usize) -> Option<DocId> {
        self.tabs.get(index).copied()
    }

    pub fn tab_index_of(&self, id: DocId) -> Option<usize> {
        self.tabs.iter().position(|&d| d == id)
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.docs.get(&id)
    }

    pub fn document_mut(&mut self, id: DocId) -> Option<&mut Document> {
        self.docs.get_mut(&id)
    }

    pub fn document_at(&self, index: usize) -> Option<&Document> {
        self.doc_id_at(index).and_then(|id| self.docs.get(&id))
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.document_at(self.active)
    }

    pub fn active_document_mut(&mut self) -> Option<&mut Document> {
        let id = self.active_doc_id();
        self.docs.get_mut(&id)
    }

    /// Index of the tab showing `path`.
    pub fn tab_index_of_path(&self, path: &Path) -> Option<usize> {
        self.tabs
            .iter()
            .position(|id| self.docs.get(id).and_then(|d| d.path.as_deref()) == Some(path))
    }

    /// Unsaved changes in the document at `index`.
    pub fn is_dirty(&self, index: usize) -> bool {
        if index == self.active {
            return self.view.is_modified();
        }
        self.document_at(index).is_some_and(|d| d.dirty)
    }

    /// Selection and scroll state of the document at `index`.
    pub fn position_at(&self, index: usize) -> Option<Position> {
        if index == self.active {
            return Some(self.view_position());
        }
        self.document_at(index).map(|d| d.position)
    }

    /// Tab strip label for the document at `index`.
    pub fn tab_title(&self, index: usize) -> Option<String> {
        self.document_at(index)
            .map(|d| tabs::tab_label(d, self.is_dirty(index)))
    }

    /// Show the tab at `index`.
    ///
    /// Returns `false` if there is no such tab.  Selecting the active tab
    /// is a no-op that still succeeds.
    pub fn activate_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        if index != self.active {
            self.stash_active();
            self.show(index);
        }
        true
    }

    /// Open a fresh untitled document in a new tab and activate it.
    pub fn new_document(&mut self) -> usize {
        let id = self.insert_document();
        self.stash_active();
        self.tabs.push(id);
        let index = self.tabs.len() - 1;
        self.show(index);
        self.post(Notification::DocumentOpen(index));
        index
    }

    /// Open `path` once the current command returns.  An already open file
    /// is activated instead.  `position` restores selection and scroll.
    pub fn request_open(&mut self, path: impl Into<PathBuf>, position: Option<Position>) {
        self.operations.push_back(Operation::Open {
            path: path.into(),
            position,
        });
    }

    /// Close document `id` once the current command returns.
    pub fn request_close(&mut self, id: DocId) {
        self.operations.push_back(Operation::Close(id));
    }

    /// Activate the tab showing `path` once pending operations have run.
    pub fn request_focus(&mut self, path: impl Into<PathBuf>) {
        self.operations.push_back(Operation::Focus(path.into()));
    }

    /// Write the active document to its path.
    ///
    /// Returns `Ok(false)` for an untitled document.
    pub fn save_active(&mut self) -> Result<bool> {
        let Some(path) = self.active_document().and_then(|d| d.path.clone()) else {
            return Ok(false);
        };
        let text = self.view.text();
        fs::write(&path, text.as_bytes())?;
        self.view.set_save_point();
        if let Some(doc) = self.active_document_mut() {
            doc.dirty = false;
            doc.loaded_len = text.len() as u64;
        }
        tracing::info!(path = %path.display(), "document saved");
        self.post(Notification::DocumentSave {
            index: self.active,
            save_as: false,
        });
        Ok(true)
    }

    // ── Host requests ─────────────────────────────────────────────────────────

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.requests.push(HostRequest::StatusText(text.into()));
    }

    pub fn invalidate(&mut self, command: CommandId, kind: Invalidation) {
        self.requests.push(HostRequest::Invalidate {
            command: Some(command),
            kind,
        });
    }

    pub fn invalidate_all(&mut self) {
        self.requests.push(HostRequest::Invalidate {
            command: None,
            kind: Invalidation::All,
        });
    }

    /// Reserve a timer id unique for the lifetime of this context.
    pub fn allocate_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        id
    }

    pub fn start_timer(&mut self, id: TimerId, interval_ms: u32) {
        self.requests.push(HostRequest::StartTimer { id, interval_ms });
    }

    pub fn stop_timer(&mut self, id: TimerId) {
        self.requests.push(HostRequest::StopTimer(id));
    }

    pub fn show_file_tree(&mut self, listing: Listing) {
        self.requests.push(HostRequest::FileTree(listing));
    }

    /// Drain pending host requests in the order they were made.
    pub fn take_host_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    // ── Event queue (driven by the registry) ──────────────────────────────────

    /// Queue `event` for broadcast after the current call returns.
    pub fn post(&mut self, event: Notification) {
        self.events.push_back(event);
    }

    /// Next queued event, pulling control notifications when the queue is
    /// empty.  Save-point changes update the active document's dirty flag.
    pub(crate) fn next_event(&mut self) -> Option<Notification> {
        if self.events.is_empty() {
            for n in self.view.take_notifications() {
                match n {
                    EditorNotification::SavePointLeft => self.set_active_dirty(true),
                    EditorNotification::SavePointReached => self.set_active_dirty(false),
                    _ => {}
                }
                self.events.push_back(Notification::Editor(n));
            }
        }
        self.events.pop_front()
    }

    pub(crate) fn next_operation(&mut self) -> Option<Operation> {
        self.operations.pop_front()
    }

    /// Drop every queued event and operation.
    pub(crate) fn clear_pending(&mut self) {
        self.events.clear();
        self.operations.clear();
        self.view.take_notifications();
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        !self.events.is_empty() || !self.operations.is_empty()
    }

    // ── Document operations (driven by the registry) ──────────────────────────

    /// Load `path` into a new tab and activate it.
    pub(crate) fn open_now(&mut self, path: &Path, position: Option<Position>) -> Result<usize> {
        if let Some(index) = self.tab_index_of_path(path) {
            self.activate_tab(index);
            return Ok(index);
        }
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);

        let id = self.insert_document();
        self.stash_active();
        self.tabs.push(id);
        let index = self.tabs.len() - 1;
        self.show(index);

        self.view.set_text(&text);
        self.view.set_eol_mode(detect_eol(text.as_bytes()));
        if let Some(pos) = position {
            self.view.set_selection(pos.anchor, pos.caret);
            self.view.set_first_visible_line(pos.first_visible_line);
        }
        if let Some(doc) = self.docs.get_mut(&id) {
            doc.path = Some(path.to_path_buf());
            doc.loaded_len = bytes.len() as u64;
        }
        tracing::info!(path = %path.display(), %id, "document opened");
        self.post(Notification::DocumentOpen(index));
        Ok(index)
    }

    /// Remove document `id` after its close notification went out.
    ///
    /// Keeps at least one tab open and activates a neighbour when the
    /// active document goes away.
    pub(crate) fn remove_document(&mut self, id: DocId) {
        let Some(index) = self.tab_index_of(id) else {
            return;
        };
        let was_active = index == self.active;
        self.tabs.remove(index);
        if self.tabs.is_empty() {
            let fresh = self.insert_document();
            self.tabs.push(fresh);
            self.show(0);
            self.post(Notification::DocumentOpen(0));
        } else if was_active {
            self.show(index.min(self.tabs.len() - 1));
        } else if index < self.active {
            self.active -= 1;
        }
        self.view.release_document(id);
        self.docs.remove(&id);
        tracing::debug!(%id, "document closed");
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn insert_document(&mut self) -> DocId {
        let id = DocId(self.next_doc);
        self.next_doc += 1;
        self.view.create_document(id);
        self.docs.insert(id, Document::new(id));
        id
    }

    fn view_position(&self) -> Position {
        Position {
            anchor: self.view.anchor(),
            caret: self.view.caret(),
            first_visible_line: self.view.first_visible_line(),
        }
    }

    /// Save the active document's view state before switching away.
    fn stash_active(&mut self) {
        let position = self.view_position();
        let dirty = self.view.is_modified();
        if let Some(doc) = self.active_document_mut() {
            doc.position = position;
            doc.dirty = dirty;
        }
    }

    /// Put the document at `index` into the view and announce the switch.
    fn show(&mut self, index: usize) {
        let id = self.tabs[index];
        self.view.activate_document(id);
        if let Some(pos) = self.docs.get(&id).map(|d| d.position) {
            self.view.set_selection(pos.anchor, pos.caret);
            self.view.set_first_visible_line(pos.first_visible_line);
        }
        self.active = index;
        self.invalidate_all();
        self.post(Notification::Tab(TabNotification::SelChange { index, doc: id }));
    }

    fn set_active_dirty(&mut self, dirty: bool) {
        if let Some(doc) = self.active_document_mut() {
            doc.dirty = dirty;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::memory::MemoryView;

    fn ctx() -> EditorContext {
        EditorContext::new(Box::new(MemoryView::new()), Settings::default())
    }

    fn drain(ctx: &mut EditorContext) -> Vec<Notification> {
        std::iter::from_fn(|| ctx.next_event()).collect()
    }

    #[test]
    fn starts_with_one_untitled_tab() {
        let c = ctx();
        assert_eq!(c.tab_count(), 1);
        assert_eq!(c.active_tab(), 0);
        assert_eq!(c.tab_title(0).as_deref(), Some("Untitled"));
        assert!(!c.has_pending());
    }

    #[test]
    fn new_document_activates_and_announces() {
        let mut c = ctx();
        let index = c.new_document();
        assert_eq!(index, 1);
        assert_eq!(c.active_tab(), 1);
        let events = drain(&mut c);
        assert!(events.contains(&Notification::DocumentOpen(1)));
        assert!(events.iter().any(|e| matches!(
            e,
            Notification::Tab(TabNotification::SelChange { index: 1, .. })
        )));
    }

    #[test]
    fn switching_tabs_keeps_each_position() {
        let mut c = ctx();
        c.view_mut().set_text("first line\nsecond line");
        c.view_mut().set_selection(3, 5);
        c.new_document();
        c.view_mut().set_text("other");
        c.view_mut().set_selection(2, 2);

        assert!(c.activate_tab(0));
        assert_eq!((c.view().anchor(), c.view().caret()), (3, 5));
        assert!(c.activate_tab(1));
        assert_eq!(c.view().caret(), 2);
        assert!(!c.activate_tab(7));
    }

    #[test]
    fn dirty_flag_follows_the_view() {
        let mut c = ctx();
        c.view_mut().append_text("x");
        drain(&mut c);
        assert!(c.is_dirty(0));
        c.new_document();
        assert!(c.is_dirty(0));
        assert_eq!(c.tab_title(0).as_deref(), Some("*Untitled"));
        assert!(!c.is_dirty(1));
    }

    #[test]
    fn open_reads_file_and_detects_eol() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "a\nb\n").expect("write");

        let mut c = ctx();
        let index = c.open_now(&path, None).expect("open");
        assert_eq!(index, 1);
        assert_eq!(c.view().text(), "a\nb\n");
        assert_eq!(c.view().eol_mode(), EolMode::Lf);
        assert_eq!(c.tab_title(1).as_deref(), Some("notes.txt"));
        assert!(!c.is_dirty(1));

        c.activate_tab(0);
        assert_eq!(c.open_now(&path, None).expect("reopen"), 1);
        assert_eq!(c.tab_count(), 2);
    }

    #[test]
    fn open_missing_file_is_an_error() {
        let mut c = ctx();
        assert!(c.open_now(Path::new("/definitely/not/here.txt"), None).is_err());
        assert_eq!(c.tab_count(), 1);
    }

    #[test]
    fn removing_last_tab_leaves_a_fresh_document() {
        let mut c = ctx();
        let only = c.active_doc_id();
        c.remove_document(only);
        assert_eq!(c.tab_count(), 1);
        assert_ne!(c.active_doc_id(), only);
        assert!(c.document(only).is_none());
    }

    #[test]
    fn removing_tab_before_active_keeps_active_document() {
        let mut c = ctx();
        let first = c.active_doc_id();
        c.new_document();
        let second = c.active_doc_id();
        c.remove_document(first);
        assert_eq!(c.active_tab(), 0);
        assert_eq!(c.active_doc_id(), second);
    }

    #[test]
    fn save_writes_file_and_clears_dirty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").expect("write");

        let mut c = ctx();
        c.open_now(&path, None).expect("open");
        c.view_mut().append_text(" new");
        assert!(c.save_active().expect("save"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "old new");
        assert!(!c.is_dirty(1));
        let events = drain(&mut c);
        assert!(events.contains(&Notification::DocumentSave {
            index: 1,
            save_as: false
        }));
    }

    #[test]
    fn saving_untitled_document_is_not_handled() {
        let mut c = ctx();
        assert!(!c.save_active().expect("save"));
    }

    #[test]
    fn timers_are_unique() {
        let mut c = ctx();
        let a = c.allocate_timer();
        let b = c.allocate_timer();
        assert_ne!(a, b);
        c.start_timer(a, 500);
        c.stop_timer(a);
        assert_eq!(
            c.take_host_requests(),
            vec![
                HostRequest::StartTimer { id: a, interval_ms: 500 },
                HostRequest::StopTimer(a)
            ]
        );
        assert!(c.take_host_requests().is_empty());
    }

    #[test]
    fn detect_eol_crlf_dominant() {
        assert_eq!(detect_eol(b"a\r\nb\r\nc\n"), EolMode::Crlf);
    }

    #[test]
    fn detect_eol_lf_dominant() {
        assert_eq!(detect_eol(b"a\nb\nc\n"), EolMode::Lf);
    }

    #[test]
    fn detect_eol_no_newlines_defaults_crlf() {
        assert_eq!(detect_eol(b"no newlines here"), EolMode::Crlf);
    }
}
