// ── Line operations ───────────────────────────────────────────────────────────
//
// Duplicate, join, move up/down and delete whole lines.  Every command works
// on the lines touched by the selection and is a single undo step.

use super::{ids, selected_lines, undo_group, Command, CommandId};
use crate::app::EditorContext;
use crate::editor::EditorView;

/// Duplicate the selection, or the caret line when nothing is selected.
pub struct DuplicateLine;

impl Command for DuplicateLine {
    fn id(&self) -> CommandId {
        ids::LINE_DUPLICATE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let view = ctx.view_mut();
        if view.read_only() {
            return false;
        }
        if view.selection_empty() {
            let line = view.line_from_position(view.caret());
            let end = view.line_end_position(line);
            let copy = format!("{}{}", view.eol_mode().sequence(), view.line_text(line));
            view.replace_range(end, end, &copy);
        } else {
            let (start, end) = (view.selection_start(), view.selection_end());
            let (anchor, caret) = (view.anchor(), view.caret());
            let copy = view.text_range(start, end);
            view.replace_range(end, end, &copy);
            view.set_selection(anchor, caret);
        }
        true
    }
}

/// Join the selected lines into one, inserting a space between words.
pub struct JoinLines;

impl Command for JoinLines {
    fn id(&self) -> CommandId {
        ids::LINES_JOIN
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let (first, last) = selected_lines(ctx);
        let view = ctx.view_mut();
        if first == last || view.read_only() {
            return false;
        }
        let mut joined = view.line_text(first);
        for line in first + 1..=last {
            let next = view.line_text(line);
            let gap = !joined.is_empty()
                && !joined.ends_with([' ', '\t'])
                && !next.is_empty()
                && !next.starts_with([' ', '\t']);
            if gap {
                joined.push(' ');
            }
            joined.push_str(&next);
        }
        let start = view.position_from_line(first);
        let end = view.line_end_position(last);
        view.replace_range(start, end, &joined);
        view.set_selection(start, start + joined.len());
        true
    }
}

/// Direction for `MoveLines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Move the selected lines one line up or down, keeping them selected.
pub struct MoveLines {
    direction: Direction,
}

impl MoveLines {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

/// Swap the line block `first..=last` with `other`, the line just above or
/// below it.  Returns the signed shift applied to the block's positions.
fn swap_block(view: &mut dyn EditorView, first: usize, last: usize, other: usize) -> isize {
    let block = view.text_range(view.position_from_line(first), view.line_end_position(last));
    let other_text = view.line_text(other);
    if other < first {
        let sep = view.text_range(view.line_end_position(other), view.position_from_line(first));
        let start = view.position_from_line(other);
        let end = view.line_end_position(last);
        view.replace_range(start, end, &format!("{block}{sep}{other_text}"));
        -((other_text.len() + sep.len()) as isize)
    } else {
        let sep = view.text_range(view.line_end_position(last), view.position_from_line(other));
        let start = view.position_from_line(first);
        let end = view.line_end_position(other);
        view.replace_range(start, end, &format!("{other_text}{sep}{block}"));
        (other_text.len() + sep.len()) as isize
    }
}

impl Command for MoveLines {
    fn id(&self) -> CommandId {
        match self.direction {
            Direction::Up => ids::LINES_UP,
            Direction::Down => ids::LINES_DOWN,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let (first, last) = selected_lines(ctx);
        let view = ctx.view();
        if view.read_only() {
            return false;
        }
        let other = match self.direction {
            Direction::Up if first > 0 => first - 1,
            Direction::Down if last + 1 < view.line_count() => last + 1,
            _ => return false,
        };
        let (anchor, caret) = (view.anchor(), view.caret());
        undo_group(ctx, |ctx| {
            let view = ctx.view_mut();
            let shift = swap_block(view, first, last, other);
            let moved = |pos: usize| pos.saturating_add_signed(shift);
            view.set_selection(moved(anchor), moved(caret));
        });
        true
    }
}

/// Delete every line touched by the selection, including its line break.
pub struct DeleteLines;

impl Command for DeleteLines {
    fn id(&self) -> CommandId {
        ids::LINE_DELETE
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let (first, last) = selected_lines(ctx);
        let view = ctx.view_mut();
        if view.read_only() {
            return false;
        }
        let (start, end) = if last + 1 < view.line_count() {
            (view.position_from_line(first), view.position_from_line(last + 1))
        } else if first > 0 {
            (view.line_end_position(first - 1), view.len())
        } else {
            (0, view.len())
        };
        view.replace_range(start, end, "");
        let caret = view.position_from_line(first.min(view.line_count() - 1));
        view.set_selection(caret, caret);
        true
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(DuplicateLine),
        Box::new(JoinLines),
        Box::new(MoveLines::new(Direction::Up)),
        Box::new(MoveLines::new(Direction::Down)),
        Box::new(DeleteLines),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;
    use crate::editor::EolMode;

    fn ctx_with(text: &str) -> EditorContext {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text(text);
        ctx.view_mut().set_eol_mode(EolMode::Lf);
        ctx
    }

    #[test]
    fn duplicate_caret_line() {
        let mut ctx = ctx_with("one\ntwo\nthree");
        ctx.view_mut().set_selection(5, 5);
        assert!(DuplicateLine.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "one\ntwo\ntwo\nthree");
        assert_eq!(ctx.view().caret(), 5);
    }

    #[test]
    fn duplicate_selection_keeps_it_selected() {
        let mut ctx = ctx_with("abc");
        ctx.view_mut().set_selection(0, 2);
        assert!(DuplicateLine.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "ababc");
        assert_eq!((ctx.view().anchor(), ctx.view().caret()), (0, 2));
    }

    #[test]
    fn join_inserts_single_spaces() {
        let mut ctx = ctx_with("alpha\nbeta \ngamma\n\ndelta");
        let end = ctx.view().position_from_line(4) + 2;
        ctx.view_mut().set_selection(0, end);
        assert!(JoinLines.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "alpha beta gamma delta");
    }

    #[test]
    fn join_needs_two_lines() {
        let mut ctx = ctx_with("alpha\nbeta");
        assert!(!JoinLines.execute(&mut ctx));
    }

    #[test]
    fn move_block_up_and_back_down() {
        let mut ctx = ctx_with("a\nb\nc\nd");
        // select "b\nc"
        ctx.view_mut().set_selection(2, 5);
        let mut up = MoveLines::new(Direction::Up);
        let mut down = MoveLines::new(Direction::Down);
        assert!(up.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "b\nc\na\nd");
        assert_eq!((ctx.view().anchor(), ctx.view().caret()), (0, 3));
        assert!(!up.execute(&mut ctx));
        assert!(down.execute(&mut ctx));
        assert!(down.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "a\nd\nb\nc");
        assert!(!down.execute(&mut ctx));
    }

    #[test]
    fn move_is_one_undo_step() {
        let mut ctx = ctx_with("a\nb");
        ctx.view_mut().set_selection(2, 2);
        assert!(MoveLines::new(Direction::Up).execute(&mut ctx));
        ctx.view_mut().undo();
        assert_eq!(ctx.view().text(), "a\nb");
    }

    #[test]
    fn delete_middle_and_last_line() {
        let mut ctx = ctx_with("a\nb\nc");
        ctx.view_mut().set_selection(2, 2);
        assert!(DeleteLines.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "a\nc");
        let end = ctx.view().len();
        ctx.view_mut().set_selection(end, end);
        assert!(DeleteLines.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "a");
    }
}
