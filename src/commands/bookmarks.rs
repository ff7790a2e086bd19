// ── Bookmarks ─────────────────────────────────────────────────────────────────
//
// Bookmarks are `MARK_BOOKMARK` markers in the editor control.  When a named
// file is closed its bookmarked lines go into `Settings::bookmarks` and are
// put back the next time that file is opened.

use super::{ids, Command, CommandId, CommandState};
use crate::app::{EditorContext, Invalidation};
use crate::editor::{marked_lines, marker_mask, EditorNotification, MARGIN_SYMBOLS, MARK_BOOKMARK};

const MASK: u32 = marker_mask(MARK_BOOKMARK);

fn has_bookmarks(ctx: &EditorContext) -> bool {
    ctx.view().marker_next(0, MASK).is_some()
}

fn invalidate_navigation(ctx: &mut EditorContext) {
    for id in [ids::BOOKMARK_NEXT, ids::BOOKMARK_PREVIOUS, ids::BOOKMARK_CLEAR_ALL] {
        ctx.invalidate(id, Invalidation::State);
    }
}

fn caret_line(ctx: &EditorContext) -> usize {
    let view = ctx.view();
    view.line_from_position(view.caret())
}

// ── Persistence ───────────────────────────────────────────────────────────────

/// Saves bookmarks of closing files and restores them on open.
pub struct BookmarkStore;

impl Command for BookmarkStore {
    fn id(&self) -> CommandId {
        ids::BOOKMARK_STORE
    }

    fn execute(&mut self, _ctx: &mut EditorContext) -> bool {
        false
    }

    fn on_document_open(&mut self, ctx: &mut EditorContext, index: usize) {
        if index != ctx.active_tab() {
            return;
        }
        let Some(path) = ctx.document_at(index).and_then(|d| d.path.clone()) else {
            return;
        };
        let key = path.to_string_lossy();
        let Some(lines) = ctx.settings().bookmarks.lines_for(&key).map(<[usize]>::to_vec) else {
            return;
        };
        let view = ctx.view_mut();
        for line in &lines {
            view.marker_add(*line, MARK_BOOKMARK);
        }
        tracing::debug!(path = %path.display(), count = lines.len(), "bookmarks restored");
        invalidate_navigation(ctx);
    }

    fn on_document_close(&mut self, ctx: &mut EditorContext, index: usize) {
        if ctx.settings().bookmarks.max_files == 0 {
            return;
        }
        let Some(path) = ctx.document_at(index).and_then(|d| d.path.clone()) else {
            return;
        };
        let lines = marked_lines(ctx.view(), MARK_BOOKMARK);
        let key = path.to_string_lossy();
        if ctx.settings_mut().bookmarks.remember(&key, lines) {
            ctx.save_settings();
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Set or remove the bookmark on the caret line.  A plain click in the
/// symbol margin does the same for the clicked line.
pub struct ToggleBookmark;

fn toggle(ctx: &mut EditorContext, line: usize) {
    let view = ctx.view_mut();
    if view.marker_get(line) & MASK != 0 {
        view.marker_delete(line, MARK_BOOKMARK);
    } else {
        view.marker_add(line, MARK_BOOKMARK);
    }
    invalidate_navigation(ctx);
}

impl Command for ToggleBookmark {
    fn id(&self) -> CommandId {
        ids::BOOKMARK_TOGGLE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let line = caret_line(ctx);
        toggle(ctx, line);
        true
    }

    fn on_editor_notify(&mut self, ctx: &mut EditorContext, event: &EditorNotification) {
        if let EditorNotification::MarginClick {
            line,
            margin: MARGIN_SYMBOLS,
            modifiers: 0,
        } = *event
        {
            toggle(ctx, line);
        }
    }
}

/// Jump to the next or previous bookmark, wrapping at either end.
pub struct GotoBookmark {
    forward: bool,
}

impl GotoBookmark {
    pub fn next() -> Self {
        Self { forward: true }
    }

    pub fn previous() -> Self {
        Self { forward: false }
    }
}

impl Command for GotoBookmark {
    fn id(&self) -> CommandId {
        if self.forward {
            ids::BOOKMARK_NEXT
        } else {
            ids::BOOKMARK_PREVIOUS
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let line = caret_line(ctx);
        let view = ctx.view_mut();
        let target = if self.forward {
            view.marker_next(line + 1, MASK)
                .or_else(|| view.marker_next(0, MASK))
        } else {
            line.checked_sub(1)
                .and_then(|l| view.marker_previous(l, MASK))
                .or_else(|| view.marker_previous(view.line_count(), MASK))
        };
        match target {
            Some(target) => {
                view.goto_line(target);
                true
            }
            None => false,
        }
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(has_bookmarks(ctx))
    }

    fn on_editor_notify(&mut self, ctx: &mut EditorContext, event: &EditorNotification) {
        if matches!(event, EditorNotification::Modified { .. }) {
            ctx.invalidate(self.id(), Invalidation::State);
        }
    }
}

pub struct ClearBookmarks;

impl Command for ClearBookmarks {
    fn id(&self) -> CommandId {
        ids::BOOKMARK_CLEAR_ALL
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        ctx.view_mut().marker_delete_all(MARK_BOOKMARK);
        invalidate_navigation(ctx);
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(has_bookmarks(ctx))
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(BookmarkStore),
        Box::new(ToggleBookmark),
        Box::new(GotoBookmark::next()),
        Box::new(GotoBookmark::previous()),
        Box::new(ClearBookmarks),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandRegistry, Notification};
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn setup(settings: Settings) -> (CommandRegistry, EditorContext) {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), settings);
        let text: String = (0..20).map(|i| format!("{i}\n")).collect();
        ctx.view_mut().set_text(&text);
        let mut reg = CommandRegistry::new();
        for cmd in commands() {
            reg.register(cmd).unwrap();
        }
        reg.pump(&mut ctx);
        (reg, ctx)
    }

    fn line(ctx: &EditorContext) -> usize {
        caret_line(ctx)
    }

    #[test]
    fn toggle_sets_and_clears() {
        let (mut reg, mut ctx) = setup(Settings::default());
        ctx.view_mut().goto_line(3);
        assert_eq!(reg.state(ids::BOOKMARK_NEXT, &ctx), Some(CommandState::enabled(false)));
        assert!(reg.dispatch(ids::BOOKMARK_TOGGLE, &mut ctx));
        assert_eq!(marked_lines(ctx.view(), MARK_BOOKMARK), [3]);
        assert_eq!(reg.state(ids::BOOKMARK_NEXT, &ctx), Some(CommandState::enabled(true)));
        assert!(reg.dispatch(ids::BOOKMARK_TOGGLE, &mut ctx));
        assert!(marked_lines(ctx.view(), MARK_BOOKMARK).is_empty());
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let (mut reg, mut ctx) = setup(Settings::default());
        for l in [2, 9, 15] {
            ctx.view_mut().marker_add(l, MARK_BOOKMARK);
        }
        ctx.view_mut().goto_line(9);
        assert!(reg.dispatch(ids::BOOKMARK_NEXT, &mut ctx));
        assert_eq!(line(&ctx), 15);
        assert!(reg.dispatch(ids::BOOKMARK_NEXT, &mut ctx));
        assert_eq!(line(&ctx), 2);
        assert!(reg.dispatch(ids::BOOKMARK_PREVIOUS, &mut ctx));
        assert_eq!(line(&ctx), 15);
        assert!(reg.dispatch(ids::BOOKMARK_PREVIOUS, &mut ctx));
        assert_eq!(line(&ctx), 9);
    }

    #[test]
    fn navigation_without_bookmarks_is_not_handled() {
        let (mut reg, mut ctx) = setup(Settings::default());
        assert!(!reg.dispatch(ids::BOOKMARK_NEXT, &mut ctx));
        assert!(!reg.dispatch(ids::BOOKMARK_PREVIOUS, &mut ctx));
    }

    #[test]
    fn symbol_margin_click_toggles() {
        let (mut reg, mut ctx) = setup(Settings::default());
        let click = |line, modifiers| {
            Notification::Editor(EditorNotification::MarginClick {
                line,
                margin: MARGIN_SYMBOLS,
                modifiers,
            })
        };
        reg.broadcast(&click(4, 0), &mut ctx);
        reg.broadcast(&click(6, 2), &mut ctx);
        assert_eq!(marked_lines(ctx.view(), MARK_BOOKMARK), [4]);
    }

    #[test]
    fn clear_all_removes_every_bookmark() {
        let (mut reg, mut ctx) = setup(Settings::default());
        ctx.view_mut().marker_add(1, MARK_BOOKMARK);
        ctx.view_mut().marker_add(5, MARK_BOOKMARK);
        assert!(reg.dispatch(ids::BOOKMARK_CLEAR_ALL, &mut ctx));
        assert_eq!(reg.state(ids::BOOKMARK_CLEAR_ALL, &ctx), Some(CommandState::enabled(false)));
    }

    #[test]
    fn bookmarks_survive_close_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        let settings_path = dir.path().join("settings.json");
        std::fs::write(&file, "a\nb\nc\nd\n").unwrap();

        let (mut reg, ctx) = setup(Settings::default());
        let mut ctx = ctx.with_settings_path(settings_path.clone());
        ctx.request_open(&file, None);
        reg.pump(&mut ctx);
        ctx.view_mut().marker_add(1, MARK_BOOKMARK);
        ctx.view_mut().marker_add(3, MARK_BOOKMARK);
        let id = ctx.active_doc_id();
        ctx.request_close(id);
        reg.pump(&mut ctx);

        let key = file.to_string_lossy();
        let saved = Settings::load_from(&settings_path);
        assert_eq!(saved.bookmarks.lines_for(&key), Some(&[1, 3][..]));

        ctx.request_open(&file, None);
        reg.pump(&mut ctx);
        assert_eq!(marked_lines(ctx.view(), MARK_BOOKMARK), [1, 3]);
    }

    #[test]
    fn untitled_documents_are_not_remembered() {
        let (mut reg, mut ctx) = setup(Settings::default());
        ctx.view_mut().marker_add(1, MARK_BOOKMARK);
        let id = ctx.active_doc_id();
        ctx.request_close(id);
        reg.pump(&mut ctx);
        assert!(ctx.settings().bookmarks.files.is_empty());
    }
}
