// ── Basic editing ─────────────────────────────────────────────────────────────
//
// Undo/redo, clipboard, delete, select all, and save.  The enabled state of
// undo/redo and the selection-dependent clipboard commands is re-announced
// to the host whenever it actually flips.

use super::{ids, Command, CommandId, CommandState};
use crate::app::{EditorContext, Invalidation};
use crate::editor::EditorNotification;

/// The editing primitive an `Edit` command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    Delete,
    SelectAll,
}

impl EditOp {
    fn id(self) -> CommandId {
        match self {
            Self::Undo => ids::UNDO,
            Self::Redo => ids::REDO,
            Self::Cut => ids::CUT,
            Self::Copy => ids::COPY,
            Self::Paste => ids::PASTE,
            Self::Delete => ids::DELETE,
            Self::SelectAll => ids::SELECT_ALL,
        }
    }

    /// Whether the operation may change the text.
    fn mutates(self) -> bool {
        matches!(self, Self::Undo | Self::Redo | Self::Cut | Self::Paste | Self::Delete)
    }
}

pub struct Edit {
    op: EditOp,
    last_enabled: Option<bool>,
}

impl Edit {
    pub fn new(op: EditOp) -> Self {
        Self {
            op,
            last_enabled: None,
        }
    }

    fn enabled(&self, ctx: &EditorContext) -> bool {
        let view = ctx.view();
        if self.op.mutates() && view.read_only() {
            return false;
        }
        match self.op {
            EditOp::Undo => view.can_undo(),
            EditOp::Redo => view.can_redo(),
            EditOp::Cut | EditOp::Copy => !view.selection_empty(),
            EditOp::Paste | EditOp::Delete | EditOp::SelectAll => true,
        }
    }
}

impl Command for Edit {
    fn id(&self) -> CommandId {
        self.op.id()
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        if !self.enabled(ctx) {
            return false;
        }
        let view = ctx.view_mut();
        match self.op {
            EditOp::Undo => view.undo(),
            EditOp::Redo => view.redo(),
            EditOp::Cut => view.cut(),
            EditOp::Copy => view.copy(),
            EditOp::Paste => view.paste(),
            EditOp::Delete => view.clear(),
            EditOp::SelectAll => view.select_all(),
        }
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(self.enabled(ctx))
    }

    fn on_editor_notify(&mut self, ctx: &mut EditorContext, event: &EditorNotification) {
        let relevant = match self.op {
            EditOp::Undo | EditOp::Redo => matches!(
                event,
                EditorNotification::Modified { .. }
                    | EditorNotification::SavePointLeft
                    | EditorNotification::SavePointReached
            ),
            EditOp::Cut | EditOp::Copy => matches!(event, EditorNotification::UpdateUi),
            _ => false,
        };
        if !relevant {
            return;
        }
        let enabled = self.enabled(ctx);
        if self.last_enabled != Some(enabled) {
            self.last_enabled = Some(enabled);
            ctx.invalidate(self.op.id(), Invalidation::State);
        }
    }
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write the active document back to its file.
pub struct Save;

impl Command for Save {
    fn id(&self) -> CommandId {
        ids::SAVE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        match ctx.save_active() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                ctx.set_status(format!("Save failed: {e}"));
                false
            }
        }
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(ctx.active_document().is_some_and(|d| d.path.is_some()))
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    let mut cmds: Vec<Box<dyn Command>> = [
        EditOp::Undo,
        EditOp::Redo,
        EditOp::Cut,
        EditOp::Copy,
        EditOp::Paste,
        EditOp::Delete,
        EditOp::SelectAll,
    ]
    .into_iter()
    .map(|op| Box::new(Edit::new(op)) as Box<dyn Command>)
    .collect();
    cmds.push(Box::new(Save));
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::HostRequest;
    use crate::commands::CommandRegistry;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn setup(text: &str) -> (CommandRegistry, EditorContext) {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text(text);
        let mut reg = CommandRegistry::new();
        for cmd in commands() {
            reg.register(cmd).expect("register");
        }
        reg.pump(&mut ctx);
        ctx.take_host_requests();
        (reg, ctx)
    }

    #[test]
    fn undo_is_disabled_until_something_changes() {
        let (mut reg, mut ctx) = setup("abc");
        assert!(!reg.dispatch(ids::UNDO, &mut ctx));
        ctx.view_mut().append_text("d");
        reg.pump(&mut ctx);
        assert!(ctx.take_host_requests().contains(&HostRequest::Invalidate {
            command: Some(ids::UNDO),
            kind: Invalidation::State,
        }));
        assert!(reg.dispatch(ids::UNDO, &mut ctx));
        assert_eq!(ctx.view().text(), "abc");
        assert!(reg.dispatch(ids::REDO, &mut ctx));
        assert_eq!(ctx.view().text(), "abcd");
    }

    #[test]
    fn copy_needs_a_selection() {
        let (mut reg, mut ctx) = setup("hello");
        assert!(!reg.dispatch(ids::COPY, &mut ctx));
        assert!(reg.dispatch(ids::SELECT_ALL, &mut ctx));
        assert!(reg.dispatch(ids::CUT, &mut ctx));
        assert_eq!(ctx.view().text(), "");
        assert!(reg.dispatch(ids::PASTE, &mut ctx));
        assert_eq!(ctx.view().text(), "hello");
    }

    #[test]
    fn delete_removes_next_character() {
        let (mut reg, mut ctx) = setup("ab");
        assert!(reg.dispatch(ids::DELETE, &mut ctx));
        assert_eq!(ctx.view().text(), "b");
    }

    #[test]
    fn read_only_document_refuses_edits() {
        let (mut reg, mut ctx) = setup("ab");
        ctx.view_mut().set_read_only(true);
        assert!(!reg.dispatch(ids::DELETE, &mut ctx));
        assert!(reg.dispatch(ids::SELECT_ALL, &mut ctx));
        assert_eq!(reg.state(ids::CUT, &ctx), Some(CommandState::enabled(false)));
    }

    #[test]
    fn save_untitled_is_not_handled() {
        let (mut reg, mut ctx) = setup("ab");
        assert_eq!(reg.state(ids::SAVE, &ctx), Some(CommandState::enabled(false)));
        assert!(!reg.dispatch(ids::SAVE, &mut ctx));
    }
}
