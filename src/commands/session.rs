// ── Session commands ──────────────────────────────────────────────────────────
//
// Saving the open tabs at shutdown, restoring them on demand or at start-up,
// and reopening the most recently closed file.

use std::path::PathBuf;

use super::{ids, Command, CommandId, CommandState};
use crate::app::{EditorContext, Invalidation, Position};
use crate::session::{self, SessionFile};

/// Queue every tab of the saved session for opening, then focus the tab
/// that was active.  Returns `false` when there is nothing to restore.
fn restore(ctx: &mut EditorContext) -> bool {
    let Some(path) = ctx.session_path().map(ToOwned::to_owned) else {
        return false;
    };
    let Some(sf) = session::load(&path) else {
        return false;
    };
    if sf.tabs.is_empty() {
        return false;
    }
    for tab in &sf.tabs {
        ctx.request_open(&tab.path, Some(tab.position()));
    }
    if let Some(active) = sf.tabs.get(sf.active_tab) {
        ctx.request_focus(&active.path);
    }
    tracing::info!(tabs = sf.tabs.len(), "session restored");
    true
}

// ── Load / save ───────────────────────────────────────────────────────────────

/// Reopen the tabs of the last session.  The session is written when the
/// application closes.
pub struct SessionLoad;

impl Command for SessionLoad {
    fn id(&self) -> CommandId {
        ids::SESSION_LOAD
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let restored = restore(ctx);
        if !restored {
            ctx.set_status("No saved session");
        }
        restored
    }

    fn on_close(&mut self, ctx: &mut EditorContext) {
        let Some(path) = ctx.session_path().map(ToOwned::to_owned) else {
            return;
        };
        let sf = SessionFile::capture(ctx);
        match session::save(&path, &sf) {
            Ok(()) => tracing::info!(path = %path.display(), tabs = sf.tabs.len(), "session saved"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save session"),
        }
    }
}

/// Toggle restoring the last session at start-up.
pub struct SessionAutoload;

impl Command for SessionAutoload {
    fn id(&self) -> CommandId {
        ids::SESSION_AUTOLOAD
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let autoload = !ctx.settings().session.autoload;
        ctx.settings_mut().session.autoload = autoload;
        ctx.save_settings();
        ctx.invalidate(self.id(), Invalidation::Value);
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::toggle(ctx.settings().session.autoload)
    }

    fn after_init(&mut self, ctx: &mut EditorContext) {
        if ctx.settings().session.autoload {
            restore(ctx);
        }
        ctx.invalidate(self.id(), Invalidation::Value);
    }
}

// ── Reopen closed ─────────────────────────────────────────────────────────────

/// Reopen the file closed most recently, at its old position.
#[derive(Default)]
pub struct SessionRestoreLast {
    closed: Vec<(PathBuf, Position)>,
}

impl SessionRestoreLast {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for SessionRestoreLast {
    fn id(&self) -> CommandId {
        ids::SESSION_RESTORE_LAST
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let Some((path, position)) = self.closed.pop() else {
            return false;
        };
        ctx.request_open(path, Some(position));
        ctx.invalidate(self.id(), Invalidation::State);
        true
    }

    fn state(&self, _ctx: &EditorContext) -> CommandState {
        CommandState::enabled(!self.closed.is_empty())
    }

    fn on_document_close(&mut self, ctx: &mut EditorContext, index: usize) {
        let Some(path) = ctx.document_at(index).and_then(|d| d.path.clone()) else {
            return;
        };
        let position = ctx.position_at(index).unwrap_or_default();
        self.closed.push((path, position));
        ctx.invalidate(self.id(), Invalidation::State);
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(SessionLoad),
        Box::new(SessionAutoload),
        Box::new(SessionRestoreLast::new()),
    ]
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::commands::CommandRegistry;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn setup(dir: &Path, settings: Settings) -> (CommandRegistry, EditorContext) {
        let ctx = EditorContext::new(Box::new(MemoryView::new()), settings)
            .with_settings_path(dir.join("settings.json"))
            .with_session_path(dir.join("session.json"));
        let mut reg = CommandRegistry::new();
        for cmd in commands() {
            reg.register(cmd).unwrap();
        }
        (reg, ctx)
    }

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn caret(ctx: &EditorContext) -> usize {
        ctx.view().caret()
    }

    #[test]
    fn close_saves_and_load_restores_positions() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "alpha\nbeta\ngamma\n");
        let b = write(dir.path(), "b.txt", "one\ntwo\n");

        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        ctx.request_open(&a, None);
        ctx.request_open(&b, None);
        reg.pump(&mut ctx);
        ctx.view_mut().set_selection(4, 4);
        ctx.activate_tab(1);
        ctx.view_mut().set_selection(6, 8);
        reg.shutdown(&mut ctx);

        let saved = session::load(&dir.path().join("session.json")).unwrap();
        assert_eq!(saved.tabs.len(), 2);
        assert_eq!(saved.active_tab, 0);

        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        assert!(reg.dispatch(ids::SESSION_LOAD, &mut ctx));
        assert_eq!(ctx.tab_count(), 3);
        assert_eq!(ctx.tab_index_of_path(&a), Some(1));
        assert_eq!(ctx.active_tab(), 1);
        assert_eq!((ctx.view().anchor(), caret(&ctx)), (6, 8));
        assert_eq!(ctx.position_at(2).map(|p| p.caret), Some(4));
    }

    #[test]
    fn load_without_session_is_not_handled() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        assert!(!reg.dispatch(ids::SESSION_LOAD, &mut ctx));
        assert_eq!(ctx.tab_count(), 1);
    }

    #[test]
    fn untitled_tabs_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        ctx.new_document();
        reg.shutdown(&mut ctx);
        let saved = session::load(&dir.path().join("session.json")).unwrap();
        assert!(saved.tabs.is_empty());
    }

    #[test]
    fn autoload_toggles_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        assert_eq!(
            reg.state(ids::SESSION_AUTOLOAD, &ctx),
            Some(CommandState::toggle(false))
        );
        assert!(reg.dispatch(ids::SESSION_AUTOLOAD, &mut ctx));
        assert!(ctx.settings().session.autoload);
        let stored = Settings::load_from(&dir.path().join("settings.json"));
        assert!(stored.session.autoload);
    }

    #[test]
    fn autoload_restores_after_init() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "alpha\n");
        let sf = SessionFile {
            version: session::SESSION_VERSION,
            active_tab: 0,
            tabs: vec![session::TabEntry {
                path: a.to_string_lossy().into_owned(),
                anchor: 2,
                caret: 3,
                first_visible_line: 0,
            }],
        };
        session::save(&dir.path().join("session.json"), &sf).unwrap();

        let mut settings = Settings::default();
        settings.session.autoload = true;
        let (mut reg, mut ctx) = setup(dir.path(), settings);
        reg.after_init(&mut ctx);
        assert_eq!(ctx.tab_index_of_path(&a), Some(1));
        assert_eq!(ctx.active_tab(), 1);
        assert_eq!(caret(&ctx), 3);
    }

    #[test]
    fn restore_last_reopens_closed_files_in_reverse_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "alpha\nbeta\n");
        let b = write(dir.path(), "b.txt", "one\n");

        let (mut reg, mut ctx) = setup(dir.path(), Settings::default());
        assert!(!reg.dispatch(ids::SESSION_RESTORE_LAST, &mut ctx));
        ctx.request_open(&a, None);
        ctx.request_open(&b, None);
        reg.pump(&mut ctx);
        ctx.activate_tab(1);
        ctx.view_mut().set_selection(7, 7);

        for path in [&a, &b] {
            let index = ctx.tab_index_of_path(path).unwrap();
            let id = ctx.doc_id_at(index).unwrap();
            ctx.request_close(id);
        }
        reg.pump(&mut ctx);
        assert_eq!(ctx.tab_count(), 1);
        assert_eq!(
            reg.state(ids::SESSION_RESTORE_LAST, &ctx),
            Some(CommandState::enabled(true))
        );

        assert!(reg.dispatch(ids::SESSION_RESTORE_LAST, &mut ctx));
        assert!(ctx.tab_index_of_path(&b).is_some());
        assert!(reg.dispatch(ids::SESSION_RESTORE_LAST, &mut ctx));
        assert_eq!(ctx.tab_index_of_path(&a), Some(ctx.active_tab()));
        assert_eq!(caret(&ctx), 7);
        assert!(!reg.dispatch(ids::SESSION_RESTORE_LAST, &mut ctx));
    }
}
