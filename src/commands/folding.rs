// ── Folding ───────────────────────────────────────────────────────────────────

use super::{ids, Command, CommandId, CommandState};
use crate::app::{EditorContext, Invalidation};
use crate::editor::EditorView;

/// Expand or collapse every fold header, or only those at `level`.
///
/// Returns the number of headers that changed state.
fn set_folds(view: &mut dyn EditorView, level: Option<u32>, expand: bool) -> usize {
    let mut changed = 0;
    for line in 0..view.line_count() {
        let info = view.fold_level(line);
        if !info.header || level.is_some_and(|l| l != info.level) {
            continue;
        }
        if view.fold_expanded(line) != expand {
            view.toggle_fold(line);
            changed += 1;
        }
    }
    changed
}

/// Fold or unfold every block in the document.
pub struct FoldAll {
    expand: bool,
}

impl FoldAll {
    pub fn fold() -> Self {
        Self { expand: false }
    }

    pub fn unfold() -> Self {
        Self { expand: true }
    }
}

impl Command for FoldAll {
    fn id(&self) -> CommandId {
        if self.expand {
            ids::UNFOLD_ALL
        } else {
            ids::FOLD_ALL
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let changed = set_folds(ctx.view_mut(), None, self.expand);
        tracing::debug!(changed, expand = self.expand, "fold all");
        true
    }
}

/// Toggle every block at one nesting level.  The first header at that level
/// decides the direction: if it is expanded, all of them collapse.
pub struct FoldLevel {
    level: u32,
}

impl FoldLevel {
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(ids::FOLD_LEVEL_MAX),
        }
    }
}

impl Command for FoldLevel {
    fn id(&self) -> CommandId {
        ids::fold_level(self.level)
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let view = ctx.view_mut();
        let first = (0..view.line_count()).find(|&l| {
            let info = view.fold_level(l);
            info.header && info.level == self.level
        });
        let Some(first) = first else {
            return false;
        };
        let expand = !view.fold_expanded(first);
        set_folds(view, Some(self.level), expand);
        true
    }
}

/// Show or hide the fold margin.  Hiding it expands every fold so no text
/// stays out of reach.
pub struct Folding {
    on: bool,
}

impl Folding {
    pub fn on() -> Self {
        Self { on: true }
    }

    pub fn off() -> Self {
        Self { on: false }
    }
}

fn apply_margin(ctx: &mut EditorContext, visible: bool) {
    let view = ctx.view_mut();
    view.set_fold_margin(visible);
    if !visible {
        set_folds(view, None, true);
    }
}

impl Command for Folding {
    fn id(&self) -> CommandId {
        if self.on {
            ids::FOLDING_ON
        } else {
            ids::FOLDING_OFF
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        apply_margin(ctx, self.on);
        ctx.settings_mut().view.folding = self.on;
        ctx.save_settings();
        ctx.invalidate(ids::FOLDING_ON, Invalidation::Value);
        ctx.invalidate(ids::FOLDING_OFF, Invalidation::Value);
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::toggle(ctx.view().fold_margin() == self.on)
    }

    fn after_init(&mut self, ctx: &mut EditorContext) {
        if self.on {
            let visible = ctx.settings().view.folding;
            apply_margin(ctx, visible);
        }
        ctx.invalidate(self.id(), Invalidation::Value);
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    let mut cmds: Vec<Box<dyn Command>> = vec![
        Box::new(FoldAll::fold()),
        Box::new(FoldAll::unfold()),
        Box::new(Folding::on()),
        Box::new(Folding::off()),
    ];
    for level in 0..=ids::FOLD_LEVEL_MAX {
        cmds.push(Box::new(FoldLevel::new(level)));
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    const NESTED: &str = "a\n    b\n        c\n    d\n        e\nf\n    g\n";

    fn ctx() -> EditorContext {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text(NESTED);
        ctx
    }

    fn collapsed(ctx: &EditorContext) -> Vec<usize> {
        let view = ctx.view();
        (0..view.line_count())
            .filter(|&l| !view.fold_expanded(l))
            .collect()
    }

    #[test]
    fn fold_and_unfold_everything() {
        let mut ctx = ctx();
        assert!(FoldAll::fold().execute(&mut ctx));
        assert_eq!(collapsed(&ctx), [0, 1, 3, 5]);
        assert!(FoldAll::unfold().execute(&mut ctx));
        assert!(collapsed(&ctx).is_empty());
    }

    #[test]
    fn fold_all_handles_two_space_indents() {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text("fn a\n  body\n    inner\nfn b\n");
        assert!(FoldAll::fold().execute(&mut ctx));
        assert_eq!(collapsed(&ctx), [0, 1]);
        assert!(FoldLevel::new(1).execute(&mut ctx));
        assert_eq!(collapsed(&ctx), [0]);
    }

    #[test]
    fn fold_level_toggles_one_depth() {
        let mut ctx = ctx();
        let mut level1 = FoldLevel::new(1);
        assert_eq!(level1.id(), ids::fold_level(1));
        assert!(level1.execute(&mut ctx));
        assert_eq!(collapsed(&ctx), [1, 3]);
        assert!(level1.execute(&mut ctx));
        assert!(collapsed(&ctx).is_empty());
    }

    #[test]
    fn fold_level_without_headers_is_not_handled() {
        let mut ctx = ctx();
        assert!(!FoldLevel::new(5).execute(&mut ctx));
    }

    #[test]
    fn folding_off_hides_margin_and_expands() {
        let mut ctx = ctx();
        FoldAll::fold().execute(&mut ctx);
        let mut off = Folding::off();
        assert!(off.execute(&mut ctx));
        assert!(!ctx.view().fold_margin());
        assert!(collapsed(&ctx).is_empty());
        assert!(!ctx.settings().view.folding);
        assert_eq!(off.state(&ctx), CommandState::toggle(true));
        assert_eq!(Folding::on().state(&ctx), CommandState::toggle(false));
    }

    #[test]
    fn after_init_applies_stored_margin() {
        let mut settings = Settings::default();
        settings.view.folding = false;
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), settings);
        ctx.view_mut().set_fold_margin(true);
        Folding::on().after_init(&mut ctx);
        assert!(!ctx.view().fold_margin());
    }
}
