// ── Scintilla child-window hosting ────────────────────────────────────────────
//
// This is one of exactly two modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// ── Document model ────────────────────────────────────────────────────────────
//
// One Scintilla window shows every tab.  Each `DocId` maps to a Scintilla
// document pointer from `SCI_CREATEDOCUMENT`; switching tabs swaps the pointer
// with `SCI_SETDOCPOINTER`.  Text, undo history, markers, fold state, EOL mode
// and read-only state travel with the document; zoom, wrap and whitespace
// display belong to the window.
//
// ── Notifications ─────────────────────────────────────────────────────────────
//
// Scintilla reports through `WM_NOTIFY` on the parent window, possibly while
// the host is inside a command.  The host decodes the message with
// `decode_notification` and pushes it into the shared `Inbox`; the view hands
// the queued events out from `take_notifications`.
//
// ── Ownership ─────────────────────────────────────────────────────────────────
//
// `SciDll` owns the single `LoadLibraryW` call for `SciLexer.dll` and must be
// dropped after the view's window is gone.

#![allow(unsafe_code)]

pub mod messages;

use std::cell::RefCell;
use std::rc::Rc;

use messages::*;

use rustc_hash::FxHashMap;
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HINSTANCE, HMODULE, HWND, LPARAM, WPARAM},
        System::LibraryLoader::{FreeLibrary, LoadLibraryW},
        UI::{
            Controls::NMHDR,
            WindowsAndMessaging::{
                CreateWindowExW, SendMessageW, HMENU, WINDOW_EX_STYLE, WS_CHILD,
                WS_CLIPSIBLINGS, WS_VISIBLE,
            },
        },
    },
};

use super::memory::{fold_levels, line_starts};
use super::{
    DocId, EditorNotification, EditorView, EolMode, FoldLevel, MARGIN_SYMBOLS, MARK_BOOKMARK,
    ZOOM_MAX, ZOOM_MIN,
};
use crate::error::Result;

// ── DLL identity ──────────────────────────────────────────────────────────────

const DLL_NAME: &str = "SciLexer.dll";
const CLASS_NAME: &str = "Scintilla";

/// Margin index of the fold margin.
const MARGIN_FOLDS: usize = 2;
const MARGIN_WIDTH: isize = 16;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

// ── SciDll ────────────────────────────────────────────────────────────────────

/// RAII handle to the loaded `SciLexer.dll`.
///
/// Loading the DLL registers the `"Scintilla"` window class.  `FreeLibrary`
/// runs on `Drop`, which must come after the Scintilla window is destroyed.
pub(crate) struct SciDll(HMODULE);

impl SciDll {
    /// Load `SciLexer.dll` from the application directory.
    pub(crate) fn load() -> Result<Self> {
        let path = wide(DLL_NAME);
        // SAFETY: path is a valid null-terminated UTF-16 string.
        // LoadLibraryW searches the application directory first on Win10/11.
        let dll = unsafe { LoadLibraryW(PCWSTR(path.as_ptr())) }?;
        Ok(Self(dll))
    }
}

impl Drop for SciDll {
    fn drop(&mut self) {
        // SAFETY: self.0 came from a successful LoadLibraryW and has not been
        // freed since.  The host drops this after its windows are destroyed.
        unsafe {
            let _ = FreeLibrary(self.0);
        }
    }
}

// ── Notification decoding ─────────────────────────────────────────────────────

/// Events queued by the host's `WM_NOTIFY` handler for the view to hand out.
pub(crate) type Inbox = Rc<RefCell<Vec<EditorNotification>>>;

/// Leading fields of Scintilla's `SCNotification`, in declaration order.
/// Only the prefix up to `margin` is read.
#[repr(C)]
struct ScNotification {
    nmhdr: NMHDR,
    position: isize,
    ch: i32,
    modifiers: i32,
    modification_type: i32,
    text: *const u8,
    length: isize,
    lines_added: isize,
    message: i32,
    wparam: usize,
    lparam: isize,
    line: isize,
    fold_level_now: i32,
    fold_level_prev: i32,
    margin: i32,
}

/// Translate a `WM_NOTIFY` from the Scintilla window `sci` into an event.
///
/// Returns `None` for notifications from other controls and for codes the
/// commands have no use for.
pub(crate) fn decode_notification(sci: HWND, lparam: LPARAM) -> Option<EditorNotification> {
    if lparam.0 == 0 {
        return None;
    }
    // SAFETY: WM_NOTIFY guarantees lparam points to an NMHDR that lives for
    // the duration of the message.
    let header = unsafe { &*(lparam.0 as *const NMHDR) };
    if header.hwndFrom != sci {
        return None;
    }
    // SAFETY: the sender is the Scintilla window, whose notifications are
    // always full SCNotification structs beginning with the prefix above.
    let scn = unsafe { &*(lparam.0 as *const ScNotification) };
    match header.code {
        SCN_UPDATEUI => Some(EditorNotification::UpdateUi),
        SCN_SAVEPOINTLEFT => Some(EditorNotification::SavePointLeft),
        SCN_SAVEPOINTREACHED => Some(EditorNotification::SavePointReached),
        SCN_ZOOM => Some(EditorNotification::Zoom),
        SCN_MODIFIED if scn.modification_type & (SC_MOD_INSERTTEXT | SC_MOD_DELETETEXT) != 0 => {
            Some(EditorNotification::Modified {
                position: scn.position.max(0) as usize,
                lines_added: scn.lines_added,
            })
        }
        SCN_MARGINCLICK => {
            // SAFETY: sci is the live Scintilla window that sent this message.
            let line = unsafe {
                SendMessageW(sci, SCI_LINEFROMPOSITION, WPARAM(scn.position.max(0) as usize), LPARAM(0))
            };
            Some(EditorNotification::MarginClick {
                line: line.0.max(0) as usize,
                margin: scn.margin.max(0) as u32,
                modifiers: scn.modifiers.max(0) as u32,
            })
        }
        _ => None,
    }
}

// ── ScintillaView ─────────────────────────────────────────────────────────────

/// The Scintilla child window plus the documents it can show.
///
/// The child `HWND` is destroyed by Windows together with its parent.
pub(crate) struct ScintillaView {
    hwnd: HWND,
    /// Document pointers we hold a reference on.
    docs: FxHashMap<DocId, isize>,
    active: Option<DocId>,
    tab_width: usize,
    inbox: Inbox,
}

impl ScintillaView {
    /// Create a visible Scintilla child window inside `hwnd_parent`.
    ///
    /// `_dll` proves that `SciLexer.dll` is loaded and the `"Scintilla"` class
    /// is registered.  The window starts with zero size; the host lays it out.
    pub(crate) fn create(hwnd_parent: HWND, hinstance: HINSTANCE, _dll: &SciDll) -> Result<Self> {
        let class = wide(CLASS_NAME);
        // SAFETY: class is null-terminated UTF-16 naming the class registered
        // by SciLexer.dll.  hwnd_parent and hinstance are valid handles owned
        // by the caller.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class.as_ptr()),
                PCWSTR::null(),
                WS_CHILD | WS_VISIBLE | WS_CLIPSIBLINGS,
                0,
                0,
                0,
                0,
                hwnd_parent,
                HMENU::default(),
                hinstance,
                None,
            )
        }?;

        let view = Self {
            hwnd,
            docs: FxHashMap::default(),
            active: None,
            tab_width: 4,
            inbox: Inbox::default(),
        };
        view.configure();
        tracing::debug!("scintilla view created");
        Ok(view)
    }

    /// The Scintilla child window handle.  Valid until the parent is destroyed.
    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// The queue the host's `WM_NOTIFY` handler feeds.
    pub(crate) fn inbox(&self) -> Inbox {
        Rc::clone(&self.inbox)
    }

    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        // SAFETY: hwnd is a valid Scintilla window for the lifetime of self.
        // Callers pass pointer arguments only for buffers that outlive the call.
        unsafe { SendMessageW(self.hwnd, msg, WPARAM(wparam), LPARAM(lparam)) }.0
    }

    fn send_bool(&self, msg: u32, wparam: usize) -> bool {
        self.send(msg, wparam, 0) != 0
    }

    /// Window-wide setup: margins, fold markers and the change mask.
    fn configure(&self) {
        self.send(SCI_SETCODEPAGE, SC_CP_UTF8, 0);
        self.send(SCI_SETMODEVENTMASK, (SC_MOD_INSERTTEXT | SC_MOD_DELETETEXT) as usize, 0);

        let symbols = MARGIN_SYMBOLS as usize;
        self.send(SCI_SETMARGINTYPEN, symbols, SC_MARGIN_SYMBOL as isize);
        self.send(SCI_SETMARGINMASKN, symbols, super::marker_mask(MARK_BOOKMARK) as isize);
        self.send(SCI_SETMARGINWIDTHN, symbols, MARGIN_WIDTH);
        self.send(SCI_SETMARGINSENSITIVEN, symbols, 1);
        self.send(SCI_MARKERDEFINE, MARK_BOOKMARK as usize, SC_MARK_BOOKMARK);

        self.send(SCI_SETMARGINTYPEN, MARGIN_FOLDS, SC_MARGIN_SYMBOL as isize);
        self.send(SCI_SETMARGINMASKN, MARGIN_FOLDS, SC_MASK_FOLDERS);
        self.send(SCI_SETMARGINWIDTHN, MARGIN_FOLDS, 0);
        self.send(SCI_SETMARGINSENSITIVEN, MARGIN_FOLDS, 1);
        self.send(SCI_MARKERDEFINE, SC_MARKNUM_FOLDER, SC_MARK_BOXPLUS);
        self.send(SCI_MARKERDEFINE, SC_MARKNUM_FOLDEROPEN, SC_MARK_BOXMINUS);
        self.send(SCI_SETAUTOMATICFOLD, SC_AUTOMATICFOLD_CLICK, 0);
    }

    /// Settings Scintilla keeps per document, re-applied after a switch.
    fn apply_document_defaults(&self) {
        self.send(SCI_SETCODEPAGE, SC_CP_UTF8, 0);
        self.send(SCI_SETTABWIDTH, self.tab_width, 0);
    }

    /// Recompute indentation fold levels and write the ones that changed.
    fn apply_fold_levels(&self) {
        let text = self.text();
        let starts = line_starts(&text);
        let levels = fold_levels(&text, &starts, self.tab_width);
        for (line, level) in levels.iter().enumerate() {
            let mut raw = SC_FOLDLEVELBASE + level.level as isize;
            if level.header {
                raw |= SC_FOLDLEVELHEADERFLAG;
            }
            if level.blank {
                raw |= SC_FOLDLEVELWHITEFLAG;
            }
            if self.send(SCI_GETFOLDLEVEL, line, 0) != raw {
                self.send(SCI_SETFOLDLEVEL, line, raw);
            }
        }
    }

    /// Read `len` bytes through a message that fills a caller buffer.
    fn read_buffer(&self, msg: u32, wparam: usize, len: usize) -> String {
        let mut buf = vec![0u8; len + 1];
        self.send(msg, wparam, buf.as_mut_ptr() as isize);
        buf.truncate(len);
        match String::from_utf8(buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl EditorView for ScintillaView {
    // ── Documents ─────────────────────────────────────────────────────────────

    fn create_document(&mut self, id: DocId) {
        let ptr = self.send(SCI_CREATEDOCUMENT, 0, 0);
        if ptr == 0 {
            tracing::warn!(%id, "SCI_CREATEDOCUMENT failed");
            return;
        }
        self.docs.insert(id, ptr);
    }

    fn activate_document(&mut self, id: DocId) {
        let Some(&ptr) = self.docs.get(&id) else {
            tracing::warn!(%id, "activating unknown document");
            return;
        };
        if self.active != Some(id) {
            self.send(SCI_SETDOCPOINTER, 0, ptr);
            self.active = Some(id);
            self.apply_document_defaults();
        }
        self.send(SCI_SETSEL, 0, 0);
        self.send(SCI_SETFIRSTVISIBLELINE, 0, 0);
    }

    fn release_document(&mut self, id: DocId) {
        if self.active == Some(id) {
            return;
        }
        if let Some(ptr) = self.docs.remove(&id) {
            self.send(SCI_RELEASEDOCUMENT, 0, ptr);
        }
    }

    // ── Content ───────────────────────────────────────────────────────────────

    fn text(&self) -> String {
        let len = self.len();
        self.read_buffer(SCI_GETTEXT, len + 1, len)
    }

    fn set_text(&mut self, text: &str) {
        if self.read_only() {
            return;
        }
        let mut buf = Vec::with_capacity(text.len() + 1);
        buf.extend_from_slice(text.as_bytes());
        buf.push(0);
        self.send(SCI_SETTEXT, 0, buf.as_ptr() as isize);
        self.send(SCI_EMPTYUNDOBUFFER, 0, 0);
        self.send(SCI_SETSAVEPOINT, 0, 0);
    }

    fn len(&self) -> usize {
        self.send(SCI_GETLENGTH, 0, 0).max(0) as usize
    }

    fn text_range(&self, start: usize, end: usize) -> String {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        self.send(SCI_SETTARGETRANGE, start, end as isize);
        self.read_buffer(SCI_GETTARGETTEXT, 0, end - start)
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        self.send(SCI_SETTARGETRANGE, start, end as isize);
        self.send(SCI_REPLACETARGET, text.len(), text.as_ptr() as isize);
    }

    fn append_text(&mut self, text: &str) {
        self.send(SCI_APPENDTEXT, text.len(), text.as_ptr() as isize);
    }

    // ── Lines ─────────────────────────────────────────────────────────────────

    fn line_count(&self) -> usize {
        self.send(SCI_GETLINECOUNT, 0, 0).max(1) as usize
    }

    fn line_from_position(&self, pos: usize) -> usize {
        self.send(SCI_LINEFROMPOSITION, pos, 0).max(0) as usize
    }

    fn position_from_line(&self, line: usize) -> usize {
        let line = line.min(self.line_count() - 1);
        self.send(SCI_POSITIONFROMLINE, line, 0).max(0) as usize
    }

    fn line_end_position(&self, line: usize) -> usize {
        let line = line.min(self.line_count() - 1);
        self.send(SCI_GETLINEENDPOSITION, line, 0).max(0) as usize
    }

    fn column(&self, pos: usize) -> usize {
        self.send(SCI_GETCOLUMN, pos, 0).max(0) as usize
    }

    fn find_column(&self, line: usize, column: usize) -> usize {
        self.send(SCI_FINDCOLUMN, line, column as isize).max(0) as usize
    }

    // ── Selection & scrolling ─────────────────────────────────────────────────

    fn anchor(&self) -> usize {
        self.send(SCI_GETANCHOR, 0, 0).max(0) as usize
    }

    fn caret(&self) -> usize {
        self.send(SCI_GETCURRENTPOS, 0, 0).max(0) as usize
    }

    fn set_selection(&mut self, anchor: usize, caret: usize) {
        let len = self.len();
        self.send(SCI_SETSEL, anchor.min(len), caret.min(len) as isize);
    }

    fn is_rectangular_selection(&self) -> bool {
        self.send_bool(SCI_SELECTIONISRECTANGLE, 0)
    }

    fn first_visible_line(&self) -> usize {
        self.send(SCI_GETFIRSTVISIBLELINE, 0, 0).max(0) as usize
    }

    fn set_first_visible_line(&mut self, line: usize) {
        self.send(SCI_SETFIRSTVISIBLELINE, line, 0);
    }

    fn scroll_caret(&mut self) {
        self.send(SCI_SCROLLCARET, 0, 0);
    }

    // ── Undo ──────────────────────────────────────────────────────────────────

    fn begin_undo_action(&mut self) {
        self.send(SCI_BEGINUNDOACTION, 0, 0);
    }

    fn end_undo_action(&mut self) {
        self.send(SCI_ENDUNDOACTION, 0, 0);
    }

    fn undo(&mut self) {
        self.send(SCI_UNDO, 0, 0);
    }

    fn redo(&mut self) {
        self.send(SCI_REDO, 0, 0);
    }

    fn can_undo(&self) -> bool {
        self.send_bool(SCI_CANUNDO, 0)
    }

    fn can_redo(&self) -> bool {
        self.send_bool(SCI_CANREDO, 0)
    }

    fn empty_undo_buffer(&mut self) {
        self.send(SCI_EMPTYUNDOBUFFER, 0, 0);
    }

    fn set_save_point(&mut self) {
        self.send(SCI_SETSAVEPOINT, 0, 0);
    }

    fn is_modified(&self) -> bool {
        self.send_bool(SCI_GETMODIFY, 0)
    }

    // ── Clipboard & selection editing ─────────────────────────────────────────

    fn cut(&mut self) {
        self.send(SCI_CUT, 0, 0);
    }

    fn copy(&mut self) {
        self.send(SCI_COPY, 0, 0);
    }

    fn paste(&mut self) {
        self.send(SCI_PASTE, 0, 0);
    }

    fn clear(&mut self) {
        self.send(SCI_CLEAR, 0, 0);
    }

    fn select_all(&mut self) {
        self.send(SCI_SELECTALL, 0, 0);
    }

    // ── View options ──────────────────────────────────────────────────────────

    fn zoom(&self) -> i32 {
        self.send(SCI_GETZOOM, 0, 0) as i32
    }

    fn set_zoom(&mut self, zoom: i32) {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.send(SCI_SETZOOM, zoom as isize as usize, 0);
    }

    fn word_wrap(&self) -> bool {
        self.send(SCI_GETWRAPMODE, 0, 0) as usize != SC_WRAP_NONE
    }

    fn set_word_wrap(&mut self, enabled: bool) {
        let mode = if enabled { SC_WRAP_WORD } else { SC_WRAP_NONE };
        self.send(SCI_SETWRAPMODE, mode, 0);
    }

    fn view_whitespace(&self) -> bool {
        self.send(SCI_GETVIEWWS, 0, 0) as usize != SCWS_INVISIBLE
    }

    fn set_view_whitespace(&mut self, visible: bool) {
        let mode = if visible { SCWS_VISIBLEALWAYS } else { SCWS_INVISIBLE };
        self.send(SCI_SETVIEWWS, mode, 0);
    }

    fn view_eol(&self) -> bool {
        self.send_bool(SCI_GETVIEWEOL, 0)
    }

    fn set_view_eol(&mut self, visible: bool) {
        self.send(SCI_SETVIEWEOL, usize::from(visible), 0);
    }

    fn tab_width(&self) -> usize {
        self.send(SCI_GETTABWIDTH, 0, 0).max(1) as usize
    }

    fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
        self.send(SCI_SETTABWIDTH, self.tab_width, 0);
        self.apply_fold_levels();
    }

    fn edge_column(&self) -> Option<usize> {
        if self.send(SCI_GETEDGEMODE, 0, 0) as usize == EDGE_NONE {
            return None;
        }
        Some(self.send(SCI_GETEDGECOLUMN, 0, 0).max(0) as usize)
    }

    fn set_edge_column(&mut self, column: Option<usize>) {
        match column {
            Some(col) => {
                self.send(SCI_SETEDGECOLUMN, col, 0);
                self.send(SCI_SETEDGEMODE, EDGE_LINE, 0);
            }
            None => {
                self.send(SCI_SETEDGEMODE, EDGE_NONE, 0);
            }
        }
    }

    fn eol_mode(&self) -> EolMode {
        match self.send(SCI_GETEOLMODE, 0, 0) {
            SC_EOL_LF => EolMode::Lf,
            SC_EOL_CR => EolMode::Cr,
            _ => EolMode::Crlf,
        }
    }

    fn set_eol_mode(&mut self, eol: EolMode) {
        self.send(SCI_SETEOLMODE, eol_value(eol), 0);
    }

    fn convert_eols(&mut self, eol: EolMode) {
        self.send(SCI_CONVERTEOLS, eol_value(eol), 0);
    }

    fn read_only(&self) -> bool {
        self.send_bool(SCI_GETREADONLY, 0)
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.send(SCI_SETREADONLY, usize::from(read_only), 0);
    }

    // ── Folding ───────────────────────────────────────────────────────────────

    fn fold_margin(&self) -> bool {
        self.send(SCI_GETMARGINWIDTHN, MARGIN_FOLDS, 0) > 0
    }

    fn set_fold_margin(&mut self, visible: bool) {
        let width = if visible { MARGIN_WIDTH } else { 0 };
        self.send(SCI_SETMARGINWIDTHN, MARGIN_FOLDS, width);
    }

    fn fold_level(&self, line: usize) -> FoldLevel {
        let raw = self.send(SCI_GETFOLDLEVEL, line, 0);
        FoldLevel {
            level: ((raw & SC_FOLDLEVELNUMBERMASK) - SC_FOLDLEVELBASE).max(0) as u32,
            header: raw & SC_FOLDLEVELHEADERFLAG != 0,
            blank: raw & SC_FOLDLEVELWHITEFLAG != 0,
        }
    }

    fn fold_expanded(&self, line: usize) -> bool {
        self.send_bool(SCI_GETFOLDEXPANDED, line)
    }

    fn toggle_fold(&mut self, line: usize) {
        self.send(SCI_TOGGLEFOLD, line, 0);
    }

    fn fold_parent(&self, line: usize) -> Option<usize> {
        let parent = self.send(SCI_GETFOLDPARENT, line, 0);
        (parent >= 0).then_some(parent as usize)
    }

    // ── Markers ───────────────────────────────────────────────────────────────

    fn marker_add(&mut self, line: usize, marker: u32) {
        self.send(SCI_MARKERADD, line, marker as isize);
    }

    fn marker_delete(&mut self, line: usize, marker: u32) {
        self.send(SCI_MARKERDELETE, line, marker as isize);
    }

    fn marker_delete_all(&mut self, marker: u32) {
        self.send(SCI_MARKERDELETEALL, marker as usize, 0);
    }

    fn marker_get(&self, line: usize) -> u32 {
        self.send(SCI_MARKERGET, line, 0) as u32
    }

    fn marker_next(&self, from: usize, mask: u32) -> Option<usize> {
        let line = self.send(SCI_MARKERNEXT, from, mask as isize);
        (line >= 0).then_some(line as usize)
    }

    fn marker_previous(&self, from: usize, mask: u32) -> Option<usize> {
        let line = self.send(SCI_MARKERPREVIOUS, from, mask as isize);
        (line >= 0).then_some(line as usize)
    }

    // ── Notifications ─────────────────────────────────────────────────────────

    fn take_notifications(&mut self) -> Vec<EditorNotification> {
        let events = std::mem::take(&mut *self.inbox.borrow_mut());
        if events
            .iter()
            .any(|e| matches!(e, EditorNotification::Modified { .. }))
        {
            self.apply_fold_levels();
        }
        events
    }
}

fn eol_value(eol: EolMode) -> usize {
    let value = match eol {
        EolMode::Crlf => SC_EOL_CRLF,
        EolMode::Cr => SC_EOL_CR,
        EolMode::Lf => SC_EOL_LF,
    };
    value as usize
}
