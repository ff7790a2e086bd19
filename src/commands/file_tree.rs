// ── File tree commands ────────────────────────────────────────────────────────
//
// The tree pane lists the directory of the active document.  Scans run on a
// worker thread (`crate::file_tree::Scanner`); a host timer polls for the
// result while one is outstanding and hands the listing to the host.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{ids, Command, CommandId, CommandState, TabNotification};
use crate::app::{EditorContext, Invalidation, TimerId};
use crate::file_tree::{Listing, Scanner};

/// Poll interval while a scan is running.
pub const POLL_INTERVAL_MS: u32 = 50;

/// State shared by the tree commands.
#[derive(Default)]
pub struct FileTreeState {
    pub visible: bool,
    pub root: Option<PathBuf>,
    /// Last delivered listing.
    pub listing: Option<Listing>,
    scanner: Scanner,
}

pub type SharedTree = Rc<RefCell<FileTreeState>>;

fn active_dir(ctx: &EditorContext) -> Option<PathBuf> {
    ctx.active_document()
        .and_then(|d| d.path.as_deref())
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}

/// Start scanning `dir` and poll for the result.
fn refresh(state: &mut FileTreeState, ctx: &mut EditorContext, timer: TimerId, dir: PathBuf) {
    tracing::debug!(dir = %dir.display(), "file tree refresh");
    state.scanner.start(dir.clone());
    state.root = Some(dir);
    if state.scanner.is_busy() {
        ctx.start_timer(timer, POLL_INTERVAL_MS);
    }
}

fn show(state: &mut FileTreeState, ctx: &mut EditorContext, timer: TimerId) {
    state.visible = true;
    if let Some(dir) = active_dir(ctx).or_else(|| state.root.clone()) {
        refresh(state, ctx, timer, dir);
    }
}

fn hide(state: &mut FileTreeState, ctx: &mut EditorContext, timer: TimerId) {
    state.visible = false;
    state.scanner.stop();
    ctx.stop_timer(timer);
}

// ── Toggle ────────────────────────────────────────────────────────────────────

/// Show or hide the tree pane.  Owns the poll timer.
pub struct FileTree {
    state: SharedTree,
    timer: TimerId,
}

impl FileTree {
    pub fn new(state: SharedTree, timer: TimerId) -> Self {
        Self { state, timer }
    }
}

impl Command for FileTree {
    fn id(&self) -> CommandId {
        ids::FILE_TREE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let mut state = self.state.borrow_mut();
        if state.visible {
            hide(&mut state, ctx, self.timer);
        } else {
            show(&mut state, ctx, self.timer);
        }
        let visible = state.visible;
        drop(state);
        ctx.settings_mut().view.file_tree = visible;
        ctx.save_settings();
        ctx.invalidate(ids::FILE_TREE, Invalidation::Value);
        ctx.invalidate(ids::FILE_TREE_REFRESH, Invalidation::State);
        true
    }

    fn state(&self, _ctx: &EditorContext) -> CommandState {
        CommandState::toggle(self.state.borrow().visible)
    }

    fn after_init(&mut self, ctx: &mut EditorContext) {
        if ctx.settings().view.file_tree {
            show(&mut self.state.borrow_mut(), ctx, self.timer);
        }
        ctx.invalidate(ids::FILE_TREE, Invalidation::Value);
    }

    fn on_tab_notify(&mut self, ctx: &mut EditorContext, event: &TabNotification) {
        let TabNotification::SelChange { .. } = event;
        let mut state = self.state.borrow_mut();
        if !state.visible {
            return;
        }
        let Some(dir) = active_dir(ctx) else {
            return;
        };
        let inside = state.root.as_deref().is_some_and(|root| dir.starts_with(root));
        if !inside {
            refresh(&mut state, ctx, self.timer, dir);
        }
    }

    fn on_document_save(&mut self, ctx: &mut EditorContext, index: usize, _save_as: bool) {
        let mut state = self.state.borrow_mut();
        if !state.visible {
            return;
        }
        let Some(root) = state.root.clone() else {
            return;
        };
        let saved_dir = ctx
            .document_at(index)
            .and_then(|d| d.path.as_deref())
            .and_then(Path::parent);
        if saved_dir == Some(root.as_path()) {
            refresh(&mut state, ctx, self.timer, root);
        }
    }

    fn on_timer(&mut self, ctx: &mut EditorContext, id: TimerId) {
        if id != self.timer {
            return;
        }
        let mut state = self.state.borrow_mut();
        if let Some(listing) = state.scanner.try_recv() {
            tracing::debug!(root = %listing.root.display(), entries = listing.entries.len(), "file tree listing ready");
            ctx.show_file_tree(listing.clone());
            state.listing = Some(listing);
        }
        if !state.scanner.is_busy() {
            ctx.stop_timer(self.timer);
        }
    }

    fn on_close(&mut self, ctx: &mut EditorContext) {
        let mut state = self.state.borrow_mut();
        state.scanner.stop();
        ctx.stop_timer(self.timer);
    }
}

// ── Refresh ───────────────────────────────────────────────────────────────────

/// Re-list the tree root, or the active document's directory when no root
/// is set yet.
pub struct FileTreeRefresh {
    state: SharedTree,
    timer: TimerId,
}

impl FileTreeRefresh {
    pub fn new(state: SharedTree, timer: TimerId) -> Self {
        Self { state, timer }
    }
}

impl Command for FileTreeRefresh {
    fn id(&self) -> CommandId {
        ids::FILE_TREE_REFRESH
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.visible {
            return false;
        }
        let Some(dir) = state.root.clone().or_else(|| active_dir(ctx)) else {
            return false;
        };
        refresh(&mut state, ctx, self.timer, dir);
        true
    }

    fn state(&self, _ctx: &EditorContext) -> CommandState {
        CommandState::enabled(self.state.borrow().visible)
    }
}

/// Both tree commands, sharing state and one timer reserved from `ctx`.
pub fn commands(ctx: &mut EditorContext) -> Vec<Box<dyn Command>> {
    let state = SharedTree::default();
    let timer = ctx.allocate_timer();
    vec![
        Box::new(FileTree::new(Rc::clone(&state), timer)),
        Box::new(FileTreeRefresh::new(state, timer)),
    ]
}
