// ── Case conversion ───────────────────────────────────────────────────────────

use super::{ids, undo_group, Command, CommandId};
use crate::app::EditorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
    /// First letter of every word upper-cased; the rest left alone.
    Title,
}

impl Case {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Title => {
                let mut out = String::with_capacity(text.len());
                let mut prev_alpha = false;
                for ch in text.chars() {
                    if !prev_alpha && ch.is_lowercase() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    prev_alpha = ch.is_alphabetic();
                }
                out
            }
        }
    }
}

/// Convert the selection, or the caret line when the selection is empty.
pub struct ConvertCase {
    case: Case,
}

impl ConvertCase {
    pub fn new(case: Case) -> Self {
        Self { case }
    }
}

impl Command for ConvertCase {
    fn id(&self) -> CommandId {
        match self.case {
            Case::Upper => ids::CASE_UPPER,
            Case::Lower => ids::CASE_LOWER,
            Case::Title => ids::CASE_TITLE,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        if ctx.view().read_only() {
            return false;
        }
        let case = self.case;
        undo_group(ctx, |ctx| {
            let view = ctx.view_mut();
            let (anchor, caret) = (view.anchor(), view.caret());
            let (start, end) = if anchor == caret {
                let line = view.line_from_position(caret);
                (view.position_from_line(line), view.line_end_position(line))
            } else {
                (view.selection_start(), view.selection_end())
            };
            let converted = case.apply(&view.text_range(start, end));
            view.replace_range(start, end, &converted);
            if anchor != caret {
                // Case mapping can change the byte length (e.g. 'ß' → "SS").
                let new_end = start + converted.len();
                if anchor < caret {
                    view.set_selection(start, new_end);
                } else {
                    view.set_selection(new_end, start);
                }
            } else {
                view.set_selection(anchor, caret);
            }
        });
        true
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(ConvertCase::new(Case::Upper)),
        Box::new(ConvertCase::new(Case::Lower)),
        Box::new(ConvertCase::new(Case::Title)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn ctx_with(text: &str) -> EditorContext {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text(text);
        ctx
    }

    #[test]
    fn title_case_capitalises_word_starts() {
        assert_eq!(Case::Title.apply("hello wide-world 2nd"), "Hello Wide-World 2Nd");
        assert_eq!(Case::Title.apply("mIxed"), "MIxed");
    }

    #[test]
    fn empty_selection_converts_caret_line() {
        let mut ctx = ctx_with("first\nsecond\nthird");
        ctx.view_mut().set_selection(8, 8);
        assert!(ConvertCase::new(Case::Upper).execute(&mut ctx));
        assert_eq!(ctx.view().text(), "first\nSECOND\nthird");
        assert_eq!(ctx.view().caret(), 8);
    }

    #[test]
    fn selection_is_converted_and_kept() {
        let mut ctx = ctx_with("Hello World");
        ctx.view_mut().set_selection(11, 6);
        assert!(ConvertCase::new(Case::Lower).execute(&mut ctx));
        assert_eq!(ctx.view().text(), "Hello world");
        assert_eq!((ctx.view().anchor(), ctx.view().caret()), (11, 6));
    }

    #[test]
    fn conversion_is_one_undo_step() {
        let mut ctx = ctx_with("abc");
        ctx.view_mut().select_all();
        ConvertCase::new(Case::Upper).execute(&mut ctx);
        ctx.view_mut().undo();
        assert_eq!(ctx.view().text(), "abc");
        assert!(!ctx.view().can_undo());
    }
}
