// ── View toggles ──────────────────────────────────────────────────────────────
//
// Whitespace, word wrap and the long-line edge.  Each toggle is stored in
// `Settings::view` and re-applied to the control once the window is up.

use super::{ids, Command, CommandId, CommandState};
use crate::app::{EditorContext, Invalidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOption {
    Whitespace,
    WordWrap,
    /// Vertical line at `Settings::view.edge_column`.
    Edge,
}

pub struct ViewToggle {
    option: ViewOption,
}

impl ViewToggle {
    pub fn new(option: ViewOption) -> Self {
        Self { option }
    }

    fn is_on(&self, ctx: &EditorContext) -> bool {
        let view = ctx.view();
        match self.option {
            ViewOption::Whitespace => view.view_whitespace(),
            ViewOption::WordWrap => view.word_wrap(),
            ViewOption::Edge => view.edge_column().is_some(),
        }
    }

    fn apply(&self, ctx: &mut EditorContext, on: bool) {
        let column = ctx.settings().view.edge_column;
        let view = ctx.view_mut();
        match self.option {
            ViewOption::Whitespace => view.set_view_whitespace(on),
            ViewOption::WordWrap => view.set_word_wrap(on),
            ViewOption::Edge => view.set_edge_column(on.then_some(column)),
        }
    }

    fn stored(&self, ctx: &EditorContext) -> bool {
        let view = &ctx.settings().view;
        match self.option {
            ViewOption::Whitespace => view.whitespace,
            ViewOption::WordWrap => view.word_wrap,
            ViewOption::Edge => view.edge_visible,
        }
    }

    fn store(&self, ctx: &mut EditorContext, on: bool) {
        let view = &mut ctx.settings_mut().view;
        match self.option {
            ViewOption::Whitespace => view.whitespace = on,
            ViewOption::WordWrap => view.word_wrap = on,
            ViewOption::Edge => view.edge_visible = on,
        }
        ctx.save_settings();
    }
}

impl Command for ViewToggle {
    fn id(&self) -> CommandId {
        match self.option {
            ViewOption::Whitespace => ids::VIEW_WHITESPACE,
            ViewOption::WordWrap => ids::VIEW_WORD_WRAP,
            ViewOption::Edge => ids::VIEW_EDGE,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let on = !self.is_on(ctx);
        self.apply(ctx, on);
        self.store(ctx, on);
        ctx.invalidate(self.id(), Invalidation::Value);
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::toggle(self.is_on(ctx))
    }

    fn after_init(&mut self, ctx: &mut EditorContext) {
        let on = self.stored(ctx);
        self.apply(ctx, on);
        ctx.invalidate(self.id(), Invalidation::Value);
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(ViewToggle::new(ViewOption::Whitespace)),
        Box::new(ViewToggle::new(ViewOption::WordWrap)),
        Box::new(ViewToggle::new(ViewOption::Edge)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    #[test]
    fn toggle_flips_view_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default())
            .with_settings_path(path.clone());
        let mut wrap = ViewToggle::new(ViewOption::WordWrap);

        assert_eq!(wrap.state(&ctx), CommandState::toggle(false));
        assert!(wrap.execute(&mut ctx));
        assert!(ctx.view().word_wrap());
        assert_eq!(wrap.state(&ctx), CommandState::toggle(true));
        assert!(Settings::load_from(&path).view.word_wrap);

        assert!(wrap.execute(&mut ctx));
        assert!(!Settings::load_from(&path).view.word_wrap);
    }

    #[test]
    fn after_init_applies_stored_settings() {
        let mut settings = Settings::default();
        settings.view.whitespace = true;
        settings.view.edge_visible = true;
        settings.view.edge_column = 100;
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), settings);
        for mut cmd in commands() {
            cmd.after_init(&mut ctx);
        }
        assert!(ctx.view().view_whitespace());
        assert!(!ctx.view().word_wrap());
        assert_eq!(ctx.view().edge_column(), Some(100));
    }

    #[test]
    fn edge_toggle_uses_configured_column() {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        let mut edge = ViewToggle::new(ViewOption::Edge);
        assert!(edge.execute(&mut ctx));
        assert_eq!(ctx.view().edge_column(), Some(80));
        assert!(ctx.settings().view.edge_visible);
        assert!(edge.execute(&mut ctx));
        assert_eq!(ctx.view().edge_column(), None);
    }
}
