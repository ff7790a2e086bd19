// ── Tab bar labels ────────────────────────────────────────────────────────────
//
// Pure Rust state that mirrors the tab strip content.
// No Win32 calls here; the host pushes these labels into its tab control.

use crate::app::{Document, EditorContext};

/// Compute the display label for a tab.
///
/// Format:
/// - Untitled, clean  → `"Untitled"`
/// - Untitled, dirty  → `"*Untitled"`
/// - Named, clean     → `"filename.txt"`
/// - Named, dirty     → `"*filename.txt"`
/// - Following a file → `"filename.txt (tail)"`
pub fn tab_label(doc: &Document, dirty: bool) -> String {
    let name = doc.display_name();
    let name = if doc.tailing {
        format!("{name} (tail)")
    } else {
        name
    };
    if dirty {
        format!("*{name}")
    } else {
        name
    }
}

/// Labels for every tab, in tab order.
pub fn labels(ctx: &EditorContext) -> Vec<String> {
    (0..ctx.tab_count())
        .filter_map(|i| ctx.tab_title(i))
        .collect()
}

/// Main window title for the active tab.
pub fn window_title(ctx: &EditorContext, app_name: &str) -> String {
    let index = ctx.active_tab();
    match ctx.active_document() {
        Some(doc) if doc.path.is_some() || ctx.is_dirty(index) => {
            format!("{} - {app_name}", tab_label(doc, ctx.is_dirty(index)))
        }
        _ => app_name.to_owned(),
    }
}
