// End-to-end flows through the default command set, driven the way the host
// drives it: dispatch by id, pump, broadcast lifecycle events.

use std::fs;
use std::path::{Path, PathBuf};

use ribbonpad::app::EditorContext;
use ribbonpad::commands::{ids, CommandRegistry};
use ribbonpad::config::Settings;
use ribbonpad::editor::memory::MemoryView;
use ribbonpad::editor::{marker_mask, MARK_BOOKMARK};

struct Editor {
    dir: tempfile::TempDir,
    root: PathBuf,
    ctx: EditorContext,
    reg: CommandRegistry,
}

impl Editor {
    fn start(dir: tempfile::TempDir, settings: Settings) -> Self {
        let root = dir.path().to_path_buf();
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), settings)
            .with_settings_path(root.join("settings.json"))
            .with_session_path(root.join("session.json"));
        let mut reg = CommandRegistry::with_defaults(&mut ctx).unwrap();
        reg.after_init(&mut ctx);
        Self {
            dir,
            root,
            ctx,
            reg,
        }
    }

    fn new() -> Self {
        Self::start(tempfile::tempdir().unwrap(), Settings::default())
    }

    /// Shut down and start again on the same directory with the stored settings.
    fn restart(mut self) -> Self {
        self.reg.shutdown(&mut self.ctx);
        let settings = Settings::load_from(&self.root.join("settings.json"));
        Self::start(self.dir, settings)
    }

    fn file(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn open(&mut self, path: &Path) {
        self.ctx.request_open(path, None);
        self.reg.pump(&mut self.ctx);
    }

    fn run(&mut self, id: ribbonpad::commands::CommandId) -> bool {
        self.reg.dispatch(id, &mut self.ctx)
    }

    fn text(&self) -> String {
        self.ctx.view().text()
    }

    fn dirty(&self) -> bool {
        self.ctx.is_dirty(self.ctx.active_tab())
    }
}

#[test]
fn sort_undo_redo_and_save() {
    let mut ed = Editor::new();
    let path = ed.file("fruit.txt", "pear\napple\nfig\n");
    ed.open(&path);
    assert_eq!(ed.ctx.tab_count(), 2);
    assert_eq!(ed.ctx.active_tab(), 1);

    let end = ed.ctx.view().line_end_position(2);
    ed.ctx.view_mut().set_selection(0, end);
    assert!(ed.run(ids::SORT_ASCENDING));
    assert_eq!(ed.text(), "apple\nfig\npear\n");
    assert!(ed.dirty());

    assert!(ed.run(ids::UNDO));
    assert_eq!(ed.text(), "pear\napple\nfig\n");
    assert!(!ed.dirty());

    assert!(ed.run(ids::REDO));
    assert!(ed.run(ids::SAVE));
    assert_eq!(fs::read_to_string(&path).unwrap(), "apple\nfig\npear\n");
    assert!(!ed.dirty());
}

#[test]
fn bookmarks_survive_closing_and_reopening() {
    let mut ed = Editor::new();
    let path = ed.file("notes.txt", "a\nb\nc\nd\n");
    ed.open(&path);
    ed.ctx.view_mut().goto_line(2);
    assert!(ed.run(ids::BOOKMARK_TOGGLE));
    let mask = marker_mask(MARK_BOOKMARK);
    assert_ne!(ed.ctx.view().marker_get(2) & mask, 0);

    assert!(ed.run(ids::TAB_CLOSE));
    assert_eq!(ed.ctx.tab_count(), 1);
    let stored = Settings::load_from(&ed.root.join("settings.json"));
    assert_eq!(
        stored.bookmarks.lines_for(&path.to_string_lossy()),
        Some(&[2usize][..])
    );

    assert!(ed.run(ids::SESSION_RESTORE_LAST));
    assert_eq!(ed.ctx.tab_index_of_path(&path), Some(ed.ctx.active_tab()));
    assert_ne!(ed.ctx.view().marker_get(2) & mask, 0);
    assert_eq!(ed.ctx.view().caret(), 4);
}

#[test]
fn session_is_restored_at_startup_when_autoload_is_on() {
    let mut ed = Editor::new();
    let a = ed.file("a.txt", "alpha\nbeta\n");
    let b = ed.file("b.txt", "one\ntwo\nthree\n");
    ed.open(&a);
    ed.open(&b);
    ed.ctx.activate_tab(1);
    ed.ctx.view_mut().set_selection(6, 6);
    assert!(ed.run(ids::SESSION_AUTOLOAD));

    let ed = ed.restart();
    assert_eq!(ed.ctx.tab_count(), 3);
    assert_eq!(ed.ctx.tab_index_of_path(&a), Some(ed.ctx.active_tab()));
    assert_eq!(ed.ctx.view().caret(), 6);
    assert!(ed.ctx.tab_index_of_path(&b).is_some());
}

#[test]
fn closing_a_modified_tab_is_refused() {
    let mut ed = Editor::new();
    let path = ed.file("draft.txt", "draft\n");
    ed.open(&path);
    ed.ctx.view_mut().append_text("more\n");
    ed.reg.pump(&mut ed.ctx);
    assert!(!ed.run(ids::TAB_CLOSE));
    assert_eq!(ed.ctx.tab_count(), 2);
}

#[test]
fn every_command_tolerates_an_empty_untitled_document() {
    let mut ed = Editor::new();
    for &id in ids::ALL {
        ed.run(id);
        assert!(ed.ctx.tab_count() >= 1, "command {id} left no tab open");
    }
}
