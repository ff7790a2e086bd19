// ── Line sorting ──────────────────────────────────────────────────────────────
//
// Sorts the lines touched by the selection and writes them back joined with
// the document's EOL.  A selection ending at column 0 does not pull in that
// last, unselected line.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use super::{ids, selected_lines, undo_group, Command, CommandId, CommandState};
use crate::app::EditorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub descending: bool,
    pub case_insensitive: bool,
    /// Compare runs of digits by numeric value ("item2" < "item10").
    pub numeric: bool,
}

impl SortOptions {
    pub fn ascending() -> Self {
        Self {
            descending: false,
            case_insensitive: false,
            numeric: true,
        }
    }

    pub fn descending() -> Self {
        Self {
            descending: true,
            ..Self::ascending()
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let ord = if self.numeric {
            natural_cmp(a, b, self.case_insensitive)
        } else if self.case_insensitive {
            fold_chars(a.chars()).cmp(fold_chars(b.chars()))
        } else {
            a.cmp(b)
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Sort `lines` in place.  Equal lines keep their relative order.
    pub fn sort(&self, lines: &mut [String]) {
        lines.sort_by(|a, b| self.compare(a, b));
    }
}

fn fold_chars(chars: Chars<'_>) -> impl Iterator<Item = char> + '_ {
    chars.flat_map(char::to_lowercase)
}

/// Take a run of ASCII digits, without leading zeros.
fn digit_run(it: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = it.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        if !(run.is_empty() && c == '0') {
            run.push(c);
        }
        it.next();
    }
    run
}

pub(crate) fn natural_cmp(a: &str, b: &str, case_insensitive: bool) -> Ordering {
    let mut x = a.chars().peekable();
    let mut y = b.chars().peekable();
    loop {
        let (cx, cy) = match (x.peek(), y.peek()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&cx), Some(&cy)) => (cx, cy),
        };
        if cx.is_ascii_digit() && cy.is_ascii_digit() {
            let nx = digit_run(&mut x);
            let ny = digit_run(&mut y);
            let ord = nx.len().cmp(&ny.len()).then_with(|| nx.cmp(&ny));
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }
        let ord = if case_insensitive {
            cx.to_lowercase().cmp(cy.to_lowercase())
        } else {
            cx.cmp(&cy)
        };
        if ord != Ordering::Equal {
            return ord;
        }
        x.next();
        y.next();
    }
}

pub struct Sort {
    options: SortOptions,
}

impl Sort {
    pub fn new(options: SortOptions) -> Self {
        Self { options }
    }
}

impl Command for Sort {
    fn id(&self) -> CommandId {
        if self.options.descending {
            ids::SORT_DESCENDING
        } else {
            ids::SORT_ASCENDING
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let view = ctx.view();
        if view.selection_empty() || view.read_only() {
            return false;
        }
        let (first, last) = selected_lines(ctx);
        if first == last {
            return false;
        }
        let view = ctx.view();
        let mut lines: Vec<String> = (first..=last).map(|l| view.line_text(l)).collect();
        self.options.sort(&mut lines);
        let sorted = lines.join(view.eol_mode().sequence());
        let start = view.position_from_line(first);
        let end = view.line_end_position(last);
        undo_group(ctx, |ctx| {
            let view = ctx.view_mut();
            view.replace_range(start, end, &sorted);
            view.set_selection(start, start + sorted.len());
        });
        tracing::debug!(first, last, options = ?self.options, "lines sorted");
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::enabled(!ctx.view().selection_empty())
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(Sort::new(SortOptions::ascending())),
        Box::new(Sort::new(SortOptions::descending())),
    ]
}
