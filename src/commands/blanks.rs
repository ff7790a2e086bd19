// ── Whitespace cleanup ────────────────────────────────────────────────────────

use std::sync::OnceLock;

use regex::Regex;

use super::{ids, selected_lines, undo_group, Command, CommandId};
use crate::app::EditorContext;

/// Spaces and tabs right before a line break or the end of the text.
fn trailing_blanks() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    // `R` makes `$` stop before `\r` as well as `\n`.
    RE.get_or_init(|| match Regex::new(r"(?mR)[ \t]+$") {
        Ok(re) => Some(re),
        Err(error) => {
            tracing::error!(%error, "trailing blank pattern failed to compile");
            None
        }
    })
    .as_ref()
}

/// Strip trailing blanks from `text`, or `None` if there are none.
pub fn trim_trailing(text: &str) -> Option<String> {
    let re = trailing_blanks()?;
    if !re.is_match(text) {
        return None;
    }
    Some(re.replace_all(text, "").into_owned())
}

/// Expand tabs to spaces up to the next multiple of `tab_width`.
///
/// Tabs inside `'…'` and `"…"` literals are kept; a backslash escapes the
/// character after it.  Returns `None` when nothing was expanded.
pub fn expand_tabs(text: &str, tab_width: usize) -> Option<String> {
    let width = tab_width.max(1);
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    let mut in_char = false;
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;

    for ch in text.chars() {
        if escaped {
            escaped = false;
            out.push(ch);
            column += 1;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '\'' if !in_string => in_char = !in_char,
            '"' if !in_char => in_string = !in_string,
            _ => {}
        }
        if in_char || in_string {
            out.push(ch);
            column += 1;
            continue;
        }
        match ch {
            '\r' | '\n' => {
                column = 0;
                out.push(ch);
            }
            '\t' => {
                let pad = width - column % width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
                changed = true;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    changed.then_some(out)
}

/// Remove trailing spaces and tabs from the selected lines, or from the
/// whole document when nothing is selected.
pub struct TrimTrailing;

impl Command for TrimTrailing {
    fn id(&self) -> CommandId {
        ids::TRIM_TRAILING
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        if ctx.view().read_only() {
            return false;
        }
        let (start, end) = if ctx.view().selection_empty() {
            (0, ctx.view().len())
        } else {
            let (first, last) = selected_lines(ctx);
            let view = ctx.view();
            (view.position_from_line(first), view.line_end_position(last))
        };
        let Some(trimmed) = trim_trailing(&ctx.view().text_range(start, end)) else {
            return false;
        };
        undo_group(ctx, |ctx| {
            let view = ctx.view_mut();
            let caret_line = view.line_from_position(view.caret());
            let had_selection = !view.selection_empty();
            view.replace_range(start, end, &trimmed);
            if had_selection {
                view.set_selection(start, start + trimmed.len());
            } else {
                let caret = view.line_end_position(caret_line.min(view.line_count() - 1));
                let caret = caret.min(view.caret());
                view.set_selection(caret, caret);
            }
        });
        tracing::debug!(start, end, "trailing blanks removed");
        true
    }
}

/// Convert every tab in the document to spaces.
pub struct TabsToSpaces;

impl Command for TabsToSpaces {
    fn id(&self) -> CommandId {
        ids::TABS_TO_SPACES
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let view = ctx.view();
        if view.read_only() {
            return false;
        }
        let Some(expanded) = expand_tabs(&view.text(), view.tab_width()) else {
            return false;
        };
        let line = view.line_from_position(view.caret());
        let column = view.column(view.caret());
        let first_visible = view.first_visible_line();
        undo_group(ctx, |ctx| {
            let view = ctx.view_mut();
            let len = view.len();
            view.replace_range(0, len, &expanded);
            let caret = view.find_column(line, column);
            view.set_selection(caret, caret);
            view.set_first_visible_line(first_visible);
        });
        true
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![Box::new(TrimTrailing), Box::new(TabsToSpaces)]
}
