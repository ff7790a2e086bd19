// ── Tab switching ─────────────────────────────────────────────────────────────
//
// Ctrl+1..Ctrl+9 style direct selection, Ctrl+Tab most-recently-used
// switching, next/previous, close and new.

use std::collections::VecDeque;

use super::{ids, Command, CommandId, CommandState, TabNotification};
use crate::app::EditorContext;
use crate::editor::DocId;

/// Activate the tab in a fixed 1-based slot, or the last tab.
pub struct SelectTab {
    /// `None` selects the last tab.
    slot: Option<u32>,
}

impl SelectTab {
    /// `slot` is 1-based; anything past `SELECT_TAB_SLOTS` means "last".
    pub fn new(slot: u32) -> Self {
        let slot = (1..=ids::SELECT_TAB_SLOTS).contains(&slot).then_some(slot);
        Self { slot }
    }

    pub fn last() -> Self {
        Self { slot: None }
    }

    fn target(&self, ctx: &EditorContext) -> Option<usize> {
        let count = ctx.tab_count();
        match self.slot {
            Some(slot) => {
                let index = slot as usize - 1;
                (index < count).then_some(index)
            }
            None => count.checked_sub(1),
        }
    }
}

impl Command for SelectTab {
    fn id(&self) -> CommandId {
        match self.slot {
            Some(slot) => ids::select_tab(slot),
            None => ids::SELECT_LAST_TAB,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        match self.target(ctx) {
            Some(index) => ctx.activate_tab(index),
            None => false,
        }
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(self.target(ctx).is_some())
    }
}

/// Switch to the previously active document.
///
/// Keeps every open document ordered by last activation, most recent first.
#[derive(Default)]
pub struct TabMru {
    order: VecDeque<DocId>,
}

impl TabMru {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents by last activation, after dropping closed ones and adding
    /// open ones never activated.
    pub fn order(&mut self, ctx: &EditorContext) -> Vec<DocId> {
        self.order.retain(|&id| ctx.tab_index_of(id).is_some());
        for index in 0..ctx.tab_count() {
            if let Some(id) = ctx.doc_id_at(index) {
                if !self.order.contains(&id) {
                    self.order.push_back(id);
                }
            }
        }
        self.order.iter().copied().collect()
    }
}

impl Command for TabMru {
    fn id(&self) -> CommandId {
        ids::TAB_MRU
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let active = ctx.active_doc_id();
        let target = self.order(ctx).into_iter().find(|&id| id != active);
        match target.and_then(|id| ctx.tab_index_of(id)) {
            Some(index) => ctx.activate_tab(index),
            None => false,
        }
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(ctx.tab_count() > 1)
    }

    fn on_tab_notify(&mut self, _ctx: &mut EditorContext, event: &TabNotification) {
        let TabNotification::SelChange { doc, .. } = *event;
        self.order.retain(|&id| id != doc);
        self.order.push_front(doc);
    }
}

/// Activate the next or previous tab, wrapping around.
pub struct CycleTab {
    forward: bool,
}

impl CycleTab {
    pub fn next() -> Self {
        Self { forward: true }
    }

    pub fn previous() -> Self {
        Self { forward: false }
    }
}

impl Command for CycleTab {
    fn id(&self) -> CommandId {
        if self.forward {
            ids::TAB_NEXT
        } else {
            ids::TAB_PREVIOUS
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let count = ctx.tab_count();
        if count < 2 {
            return false;
        }
        let active = ctx.active_tab();
        let index = if self.forward {
            (active + 1) % count
        } else {
            (active + count - 1) % count
        };
        ctx.activate_tab(index)
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(ctx.tab_count() > 1)
    }
}

/// Close the active tab.  A document with unsaved changes is kept.
pub struct CloseTab;

impl Command for CloseTab {
    fn id(&self) -> CommandId {
        ids::TAB_CLOSE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let index = ctx.active_tab();
        if ctx.is_dirty(index) {
            let name = ctx
                .active_document()
                .map(|d| d.display_name())
                .unwrap_or_default();
            ctx.set_status(format!("{name} has unsaved changes"));
            return false;
        }
        ctx.request_close(ctx.active_doc_id());
        true
    }
}

pub struct NewDocument;

impl Command for NewDocument {
    fn id(&self) -> CommandId {
        ids::NEW_DOCUMENT
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        ctx.new_document();
        true
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    let mut cmds: Vec<Box<dyn Command>> = (1..=ids::SELECT_TAB_SLOTS)
        .map(|slot| Box::new(SelectTab::new(slot)) as Box<dyn Command>)
        .collect();
    cmds.push(Box::new(SelectTab::last()));
    cmds.push(Box::new(TabMru::new()));
    cmds.push(Box::new(CycleTab::next()));
    cmds.push(Box::new(CycleTab::previous()));
    cmds.push(Box::new(CloseTab));
    cmds.push(Box::new(NewDocument));
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandRegistry;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    /// Registry with the tab commands and a context holding `n` tabs, the
    /// first one active.
    fn setup(n: usize) -> (CommandRegistry, EditorContext) {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        let mut reg = CommandRegistry::new();
        for cmd in commands() {
            reg.register(cmd).unwrap();
        }
        for _ in 1..n {
            ctx.new_document();
        }
        ctx.activate_tab(0);
        reg.pump(&mut ctx);
        (reg, ctx)
    }

    #[test]
    fn slot_selects_existing_tab_only() {
        let (mut reg, mut ctx) = setup(3);
        assert!(reg.dispatch(ids::select_tab(3), &mut ctx));
        assert_eq!(ctx.active_tab(), 2);
        assert!(!reg.dispatch(ids::select_tab(4), &mut ctx));
        assert_eq!(ctx.active_tab(), 2);
        assert!(reg.dispatch(ids::select_tab(1), &mut ctx));
        assert!(reg.dispatch(ids::SELECT_LAST_TAB, &mut ctx));
        assert_eq!(ctx.active_tab(), 2);
    }

    #[test]
    fn slot_past_range_means_last() {
        assert_eq!(SelectTab::new(9).id(), ids::SELECT_LAST_TAB);
    }

    #[test]
    fn mru_returns_to_previous_document() {
        let (mut reg, mut ctx) = setup(4);
        reg.dispatch(ids::select_tab(3), &mut ctx);
        reg.dispatch(ids::select_tab(2), &mut ctx);
        assert!(reg.dispatch(ids::TAB_MRU, &mut ctx));
        assert_eq!(ctx.active_tab(), 2);
        assert!(reg.dispatch(ids::TAB_MRU, &mut ctx));
        assert_eq!(ctx.active_tab(), 1);
    }

    #[test]
    fn mru_forgets_closed_documents() {
        let (mut reg, mut ctx) = setup(3);
        reg.dispatch(ids::select_tab(2), &mut ctx);
        reg.dispatch(ids::select_tab(3), &mut ctx);
        let middle = ctx.doc_id_at(1).unwrap();
        ctx.request_close(middle);
        reg.pump(&mut ctx);
        assert_eq!(ctx.tab_count(), 2);
        reg.dispatch(ids::select_tab(2), &mut ctx);
        assert!(reg.dispatch(ids::TAB_MRU, &mut ctx));
        assert_eq!(ctx.active_tab(), 0);
    }

    #[test]
    fn next_and_previous_wrap() {
        let (mut reg, mut ctx) = setup(3);
        assert!(reg.dispatch(ids::TAB_PREVIOUS, &mut ctx));
        assert_eq!(ctx.active_tab(), 2);
        assert!(reg.dispatch(ids::TAB_NEXT, &mut ctx));
        assert_eq!(ctx.active_tab(), 0);
    }

    #[test]
    fn single_tab_cannot_cycle() {
        let (mut reg, mut ctx) = setup(1);
        assert!(!reg.dispatch(ids::TAB_NEXT, &mut ctx));
        assert_eq!(reg.state(ids::TAB_MRU, &ctx), Some(CommandState::enabled(false)));
    }

    #[test]
    fn close_keeps_dirty_document() {
        let (mut reg, mut ctx) = setup(2);
        ctx.view_mut().append_text("x");
        reg.pump(&mut ctx);
        assert!(!reg.dispatch(ids::TAB_CLOSE, &mut ctx));
        assert_eq!(ctx.tab_count(), 2);
        ctx.view_mut().undo();
        reg.pump(&mut ctx);
        assert!(reg.dispatch(ids::TAB_CLOSE, &mut ctx));
        assert_eq!(ctx.tab_count(), 1);
    }

    #[test]
    fn new_document_adds_a_tab() {
        let (mut reg, mut ctx) = setup(1);
        assert!(reg.dispatch(ids::NEW_DOCUMENT, &mut ctx));
        assert_eq!(ctx.tab_count(), 2);
        assert_eq!(ctx.active_tab(), 1);
    }
}
