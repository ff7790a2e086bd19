// ── Position history ──────────────────────────────────────────────────────────
//
// Browser-style back/forward over caret positions.  The tracker records a
// position whenever the caret lands more than `JUMP_THRESHOLD` lines away
// from the last recorded line; previous/next walk the log, switching tabs
// when an entry belongs to another document.  The three commands share one
// log.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{ids, Command, CommandId, CommandState, TabNotification};
use crate::app::{EditorContext, Invalidation};
use crate::editor::{DocId, EditorNotification};

/// Minimum line distance that counts as a jump.
pub const JUMP_THRESHOLD: usize = 10;
/// Oldest entries are dropped beyond this.
pub const MAX_POSITIONS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub doc: DocId,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Default)]
pub struct PositionLog {
    entries: VecDeque<Entry>,
    /// How many steps back from the newest entry the user has walked.
    back: usize,
    /// Document and line the next caret move is measured against.
    current: Option<(DocId, usize)>,
}

impl PositionLog {
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > self.back + 1
    }

    pub fn can_go_forward(&self) -> bool {
        self.back > 0
    }

    /// Record `entry`, discarding anything ahead of the current position.
    fn record(&mut self, entry: Entry) {
        if self.back > 0 {
            let keep = self.entries.len() - self.back;
            self.entries.truncate(keep);
            self.back = 0;
        }
        if self.entries.back() != Some(&entry) {
            self.entries.push_back(entry);
        }
        while self.entries.len() > MAX_POSITIONS {
            self.entries.pop_front();
        }
        self.current = Some((entry.doc, entry.line));
    }

    /// Observe the caret at `line`/`column` in `doc`.  Returns `true` if a
    /// position was recorded.
    fn observe(&mut self, doc: DocId, line: usize, column: usize) -> bool {
        match self.current {
            Some((d, last)) if d == doc && last.abs_diff(line) <= JUMP_THRESHOLD => false,
            _ => {
                self.record(Entry { doc, line, column });
                true
            }
        }
    }

    fn forget(&mut self, doc: DocId) {
        self.entries.retain(|e| e.doc != doc);
        self.back = 0;
        if self.current.is_some_and(|(d, _)| d == doc) {
            self.current = None;
        }
    }

    /// The entry `steps` back from the newest one.
    fn from_end(&self, steps: usize) -> Option<Entry> {
        let index = self.entries.len().checked_sub(steps + 1)?;
        self.entries.get(index).copied()
    }
}

pub type SharedLog = Rc<RefCell<PositionLog>>;

fn invalidate_steps(ctx: &mut EditorContext) {
    ctx.invalidate(ids::HISTORY_PREVIOUS, Invalidation::State);
    ctx.invalidate(ids::HISTORY_NEXT, Invalidation::State);
}

/// Records caret jumps.  Never executed by the user.
pub struct HistoryTracker {
    log: SharedLog,
}

impl HistoryTracker {
    pub fn new(log: SharedLog) -> Self {
        Self { log }
    }
}

impl Command for HistoryTracker {
    fn id(&self) -> CommandId {
        ids::HISTORY_TRACKER
    }

    fn execute(&mut self, _ctx: &mut EditorContext) -> bool {
        false
    }

    fn on_editor_notify(&mut self, ctx: &mut EditorContext, event: &EditorNotification) {
        if *event != EditorNotification::UpdateUi {
            return;
        }
        let view = ctx.view();
        let caret = view.caret();
        let line = view.line_from_position(caret);
        let column = view.column(caret);
        let doc = ctx.active_doc_id();
        if self.log.borrow_mut().observe(doc, line, column) {
            tracing::trace!(%doc, line, "position recorded");
            invalidate_steps(ctx);
        }
    }

    fn on_tab_notify(&mut self, _ctx: &mut EditorContext, event: &TabNotification) {
        let TabNotification::SelChange { doc, .. } = *event;
        let mut log = self.log.borrow_mut();
        if log.current.is_some_and(|(d, _)| d != doc) {
            log.current = None;
        }
    }

    fn on_document_close(&mut self, ctx: &mut EditorContext, _index: usize) {
        let doc = ctx.active_doc_id();
        self.log.borrow_mut().forget(doc);
        invalidate_steps(ctx);
    }
}

/// Walk one step back or forward through the log.
pub struct HistoryStep {
    log: SharedLog,
    back: bool,
}

impl HistoryStep {
    pub fn previous(log: SharedLog) -> Self {
        Self { log, back: true }
    }

    pub fn next(log: SharedLog) -> Self {
        Self { log, back: false }
    }
}

impl Command for HistoryStep {
    fn id(&self) -> CommandId {
        if self.back {
            ids::HISTORY_PREVIOUS
        } else {
            ids::HISTORY_NEXT
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let mut log = self.log.borrow_mut();
        let target = if self.back {
            log.from_end(log.back + 1)
        } else {
            log.back.checked_sub(1).and_then(|steps| log.from_end(steps))
        };
        let Some(entry) = target else {
            return false;
        };
        let Some(index) = ctx.tab_index_of(entry.doc) else {
            return false;
        };
        ctx.activate_tab(index);
        let view = ctx.view_mut();
        let pos = view.find_column(entry.line, entry.column);
        view.set_selection(pos, pos);
        view.scroll_caret();

        if self.back {
            log.back += 1;
        } else {
            log.back -= 1;
        }
        log.current = Some((entry.doc, entry.line));
        drop(log);
        invalidate_steps(ctx);
        true
    }

    fn state(&self, _ctx: &EditorContext) -> CommandState {
        let log = self.log.borrow();
        CommandState::enabled(if self.back {
            log.can_go_back()
        } else {
            log.can_go_forward()
        })
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    let log = SharedLog::default();
    vec![
        Box::new(HistoryTracker::new(Rc::clone(&log))),
        Box::new(HistoryStep::previous(Rc::clone(&log))),
        Box::new(HistoryStep::next(log)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandRegistry;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn setup_with_log() -> (CommandRegistry, EditorContext, SharedLog) {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        let text: String = (0..100).map(|i| format!("line {i}\n")).collect();
        ctx.view_mut().set_text(&text);
        let log = SharedLog::default();
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(HistoryTracker::new(Rc::clone(&log)))).unwrap();
        reg.register(Box::new(HistoryStep::previous(Rc::clone(&log)))).unwrap();
        reg.register(Box::new(HistoryStep::next(Rc::clone(&log)))).unwrap();
        // records the caret at line 0
        reg.pump(&mut ctx);
        (reg, ctx, log)
    }

    fn setup() -> (CommandRegistry, EditorContext) {
        let (reg, ctx, _) = setup_with_log();
        (reg, ctx)
    }

    fn go_to(reg: &mut CommandRegistry, ctx: &mut EditorContext, line: usize) {
        ctx.view_mut().goto_line(line);
        reg.pump(ctx);
    }

    fn caret_line(ctx: &EditorContext) -> usize {
        ctx.view().line_from_position(ctx.view().caret())
    }

    #[test]
    fn small_moves_are_not_recorded() {
        let (mut reg, mut ctx) = setup();
        go_to(&mut reg, &mut ctx, 5);
        go_to(&mut reg, &mut ctx, 8);
        go_to(&mut reg, &mut ctx, 10);
        // only the first observation
        assert_eq!(reg.state(ids::HISTORY_PREVIOUS, &ctx), Some(CommandState::enabled(false)));
        go_to(&mut reg, &mut ctx, 30);
        assert_eq!(reg.state(ids::HISTORY_PREVIOUS, &ctx), Some(CommandState::enabled(true)));
    }

    #[test]
    fn back_and_forward_walk_the_log() {
        let (mut reg, mut ctx) = setup();
        go_to(&mut reg, &mut ctx, 20);
        go_to(&mut reg, &mut ctx, 40);

        assert!(reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx));
        assert_eq!(caret_line(&ctx), 20);
        assert!(reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx));
        assert_eq!(caret_line(&ctx), 0);
        assert!(!reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx));

        assert!(reg.dispatch(ids::HISTORY_NEXT, &mut ctx));
        assert_eq!(caret_line(&ctx), 20);
        assert!(reg.dispatch(ids::HISTORY_NEXT, &mut ctx));
        assert_eq!(caret_line(&ctx), 40);
        assert!(!reg.dispatch(ids::HISTORY_NEXT, &mut ctx));
    }

    #[test]
    fn new_jump_discards_forward_entries() {
        let (mut reg, mut ctx) = setup();
        go_to(&mut reg, &mut ctx, 20);
        go_to(&mut reg, &mut ctx, 40);
        reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx);
        go_to(&mut reg, &mut ctx, 70);
        assert_eq!(reg.state(ids::HISTORY_NEXT, &ctx), Some(CommandState::enabled(false)));
        assert!(reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx));
        assert_eq!(caret_line(&ctx), 20);
    }

    #[test]
    fn navigation_switches_documents_and_close_purges() {
        let (mut reg, mut ctx, log) = setup_with_log();
        go_to(&mut reg, &mut ctx, 50);
        let first = ctx.active_doc_id();
        ctx.new_document();
        ctx.view_mut().set_text("x\ny\n");
        reg.pump(&mut ctx);
        go_to(&mut reg, &mut ctx, 1);

        assert!(reg.dispatch(ids::HISTORY_PREVIOUS, &mut ctx));
        assert_eq!(ctx.active_doc_id(), first);
        assert_eq!(caret_line(&ctx), 50);

        ctx.request_close(first);
        reg.pump(&mut ctx);
        assert!(log.borrow().entries().all(|e| e.doc != first));
        assert_eq!(reg.state(ids::HISTORY_NEXT, &ctx), Some(CommandState::enabled(false)));
    }

    #[test]
    fn log_is_capped() {
        let mut log = PositionLog::default();
        for i in 0..MAX_POSITIONS + 20 {
            log.observe(DocId(1), i * 20, 0);
        }
        assert_eq!(log.entries().count(), MAX_POSITIONS);
        assert_eq!(log.entries().next().map(|e| e.line), Some(20 * 20));
    }
}
