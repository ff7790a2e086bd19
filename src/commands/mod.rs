// ── Commands ──────────────────────────────────────────────────────────────────
//
// One `Command` per user-invokable editor action.  The registry owns every
// instance; the host reaches them only through `CommandRegistry::dispatch`,
// `broadcast` and `lookup`/`state`.  Each call receives the editor-state
// accessor (`EditorContext`) explicitly, so a command can never call back
// into the registry while it runs.

pub mod ids;
pub mod registry;

pub mod blanks;
pub mod bookmarks;
pub mod case;
pub mod edit;
pub mod eol;
pub mod file_tree;
pub mod folding;
pub mod history;
pub mod lines;
pub mod session;
pub mod sort;
pub mod tabs;
pub mod tail;
pub mod view;
pub mod zoom;

pub use registry::CommandRegistry;

use std::fmt;

use crate::app::{EditorContext, TimerId};
use crate::editor::{DocId, EditorNotification};

// ── Identity ──────────────────────────────────────────────────────────────────

/// Numeric identity of a command; the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u32);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Notifications ─────────────────────────────────────────────────────────────

/// Tab strip events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabNotification {
    /// The tab at `index` (showing `doc`) became active.
    SelChange { index: usize, doc: DocId },
}

/// Payload broadcast to every registered command.  Each command decides
/// relevance by matching on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Editor(EditorNotification),
    Tab(TabNotification),
    DocumentOpen(usize),
    DocumentClose(usize),
    DocumentSave { index: usize, save_as: bool },
    Timer(TimerId),
    /// The application is shutting down.
    Close,
    /// Every command is registered and the main window exists.
    AfterInit,
}

// ── State ─────────────────────────────────────────────────────────────────────

/// UI state of a command's control, queried by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandState {
    pub enabled: bool,
    /// `Some` for toggle controls.
    pub checked: Option<bool>,
}

impl Default for CommandState {
    fn default() -> Self {
        Self {
            enabled: true,
            checked: None,
        }
    }
}

impl CommandState {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled,
            checked: None,
        }
    }

    pub fn toggle(checked: bool) -> Self {
        Self {
            enabled: true,
            checked: Some(checked),
        }
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// A user action plus its reactions to editor events.
///
/// Only `id` and `execute` are required; every hook defaults to a no-op.
pub trait Command {
    /// Stable registry key.  Must not change over the command's lifetime.
    fn id(&self) -> CommandId;

    /// Perform the action.  `false` means "not handled"; the host may show
    /// feedback but must not treat it as fatal.
    fn execute(&mut self, ctx: &mut EditorContext) -> bool;

    fn state(&self, _ctx: &EditorContext) -> CommandState {
        CommandState::default()
    }

    fn on_editor_notify(&mut self, _ctx: &mut EditorContext, _event: &EditorNotification) {}
    fn on_tab_notify(&mut self, _ctx: &mut EditorContext, _event: &TabNotification) {}
    fn on_document_open(&mut self, _ctx: &mut EditorContext, _index: usize) {}
    /// Called while the document at `index` is still open and active.
    fn on_document_close(&mut self, _ctx: &mut EditorContext, _index: usize) {}
    fn on_document_save(&mut self, _ctx: &mut EditorContext, _index: usize, _save_as: bool) {}
    fn on_close(&mut self, _ctx: &mut EditorContext) {}
    fn on_timer(&mut self, _ctx: &mut EditorContext, _id: TimerId) {}
    fn after_init(&mut self, _ctx: &mut EditorContext) {}

    /// Route `event` to the matching hook.
    fn notify(&mut self, ctx: &mut EditorContext, event: &Notification) {
        match event {
            Notification::Editor(e) => self.on_editor_notify(ctx, e),
            Notification::Tab(t) => self.on_tab_notify(ctx, t),
            Notification::DocumentOpen(i) => self.on_document_open(ctx, *i),
            Notification::DocumentClose(i) => self.on_document_close(ctx, *i),
            Notification::DocumentSave { index, save_as } => {
                self.on_document_save(ctx, *index, *save_as)
            }
            Notification::Timer(id) => self.on_timer(ctx, *id),
            Notification::Close => self.on_close(ctx),
            Notification::AfterInit => self.after_init(ctx),
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Line range `first..=last` covered by the selection.  A selection ending
/// at column 0 of a later line does not include that line.
pub(crate) fn selected_lines(ctx: &EditorContext) -> (usize, usize) {
    let view = ctx.view();
    let start = view.selection_start();
    let end = view.selection_end();
    let first = view.line_from_position(start);
    let mut last = view.line_from_position(end);
    if last > first && view.position_from_line(last) == end {
        last -= 1;
    }
    (first, last)
}

/// Run `f` as a single undo step.
pub(crate) fn undo_group<R>(ctx: &mut EditorContext, f: impl FnOnce(&mut EditorContext) -> R) -> R {
    ctx.view_mut().begin_undo_action();
    let result = f(ctx);
    ctx.view_mut().end_undo_action();
    result
}
