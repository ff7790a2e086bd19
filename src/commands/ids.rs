// ── Command ids ───────────────────────────────────────────────────────────────
//
// Every built-in command id lives here.  `ALL` is checked for duplicates at
// compile time; adding a colliding constant to it fails the build.

use super::CommandId;

// ── Edit ──────────────────────────────────────────────────────────────────────
pub const UNDO: CommandId = CommandId(1001);
pub const REDO: CommandId = CommandId(1002);
pub const CUT: CommandId = CommandId(1003);
pub const COPY: CommandId = CommandId(1004);
pub const PASTE: CommandId = CommandId(1005);
pub const DELETE: CommandId = CommandId(1006);
pub const SELECT_ALL: CommandId = CommandId(1007);
pub const SAVE: CommandId = CommandId(1010);

// ── Lines ─────────────────────────────────────────────────────────────────────
pub const LINE_DUPLICATE: CommandId = CommandId(1101);
pub const LINES_JOIN: CommandId = CommandId(1102);
pub const LINES_UP: CommandId = CommandId(1103);
pub const LINES_DOWN: CommandId = CommandId(1104);
pub const LINE_DELETE: CommandId = CommandId(1105);

// ── Case ──────────────────────────────────────────────────────────────────────
pub const CASE_UPPER: CommandId = CommandId(1201);
pub const CASE_LOWER: CommandId = CommandId(1202);
pub const CASE_TITLE: CommandId = CommandId(1203);

// ── Blanks ────────────────────────────────────────────────────────────────────
pub const TRIM_TRAILING: CommandId = CommandId(1301);
pub const TABS_TO_SPACES: CommandId = CommandId(1302);

// ── Sort ──────────────────────────────────────────────────────────────────────
pub const SORT_ASCENDING: CommandId = CommandId(1401);
pub const SORT_DESCENDING: CommandId = CommandId(1402);

// ── Zoom ──────────────────────────────────────────────────────────────────────
pub const ZOOM_IN: CommandId = CommandId(1501);
pub const ZOOM_OUT: CommandId = CommandId(1502);
pub const ZOOM_100: CommandId = CommandId(1503);

// ── View ──────────────────────────────────────────────────────────────────────
pub const VIEW_WHITESPACE: CommandId = CommandId(1601);
pub const VIEW_WORD_WRAP: CommandId = CommandId(1602);
pub const VIEW_EDGE: CommandId = CommandId(1603);
pub const EOL_CRLF: CommandId = CommandId(1611);
pub const EOL_LF: CommandId = CommandId(1612);
pub const EOL_CR: CommandId = CommandId(1613);

// ── Folding ───────────────────────────────────────────────────────────────────
pub const FOLD_ALL: CommandId = CommandId(1701);
pub const UNFOLD_ALL: CommandId = CommandId(1702);
pub const FOLDING_ON: CommandId = CommandId(1703);
pub const FOLDING_OFF: CommandId = CommandId(1704);
/// `FOLD_LEVEL_BASE + n` folds every block at level `n` (0..=8).
pub const FOLD_LEVEL_BASE: u32 = 1710;
pub const FOLD_LEVEL_MAX: u32 = 8;

pub const fn fold_level(n: u32) -> CommandId {
    CommandId(FOLD_LEVEL_BASE + n)
}

// ── Tabs ──────────────────────────────────────────────────────────────────────
/// `SELECT_TAB_BASE + n` activates tab `n` (1-based, 1..=8).
pub const SELECT_TAB_BASE: u32 = 1800;
pub const SELECT_TAB_SLOTS: u32 = 8;
pub const SELECT_LAST_TAB: CommandId = CommandId(1809);
pub const TAB_MRU: CommandId = CommandId(1810);
pub const TAB_NEXT: CommandId = CommandId(1811);
pub const TAB_PREVIOUS: CommandId = CommandId(1812);
pub const TAB_CLOSE: CommandId = CommandId(1813);
pub const NEW_DOCUMENT: CommandId = CommandId(1814);

pub const fn select_tab(slot: u32) -> CommandId {
    CommandId(SELECT_TAB_BASE + slot)
}

// ── Position history ──────────────────────────────────────────────────────────
pub const HISTORY_TRACKER: CommandId = CommandId(1900);
pub const HISTORY_PREVIOUS: CommandId = CommandId(1901);
pub const HISTORY_NEXT: CommandId = CommandId(1902);

// ── Bookmarks ─────────────────────────────────────────────────────────────────
pub const BOOKMARK_STORE: CommandId = CommandId(2000);
pub const BOOKMARK_TOGGLE: CommandId = CommandId(2001);
pub const BOOKMARK_NEXT: CommandId = CommandId(2002);
pub const BOOKMARK_PREVIOUS: CommandId = CommandId(2003);
pub const BOOKMARK_CLEAR_ALL: CommandId = CommandId(2004);

// ── Session ───────────────────────────────────────────────────────────────────
pub const SESSION_LOAD: CommandId = CommandId(2101);
pub const SESSION_AUTOLOAD: CommandId = CommandId(2102);
pub const SESSION_RESTORE_LAST: CommandId = CommandId(2103);

// ── Tail / file tree ──────────────────────────────────────────────────────────
pub const TAIL: CommandId = CommandId(2201);
pub const FILE_TREE: CommandId = CommandId(2301);
pub const FILE_TREE_REFRESH: CommandId = CommandId(2302);

// ── Registry of all ids ───────────────────────────────────────────────────────

pub const ALL: &[CommandId] = &[
    UNDO,
    REDO,
    CUT,
    COPY,
    PASTE,
    DELETE,
    SELECT_ALL,
    SAVE,
    LINE_DUPLICATE,
    LINES_JOIN,
    LINES_UP,
    LINES_DOWN,
    LINE_DELETE,
    CASE_UPPER,
    CASE_LOWER,
    CASE_TITLE,
    TRIM_TRAILING,
    TABS_TO_SPACES,
    SORT_ASCENDING,
    SORT_DESCENDING,
    ZOOM_IN,
    ZOOM_OUT,
    ZOOM_100,
    VIEW_WHITESPACE,
    VIEW_WORD_WRAP,
    VIEW_EDGE,
    EOL_CRLF,
    EOL_LF,
    EOL_CR,
    FOLD_ALL,
    UNFOLD_ALL,
    FOLDING_ON,
    FOLDING_OFF,
    fold_level(0),
    fold_level(1),
    fold_level(2),
    fold_level(3),
    fold_level(4),
    fold_level(5),
    fold_level(6),
    fold_level(7),
    fold_level(8),
    select_tab(1),
    select_tab(2),
    select_tab(3),
    select_tab(4),
    select_tab(5),
    select_tab(6),
    select_tab(7),
    select_tab(8),
    SELECT_LAST_TAB,
    TAB_MRU,
    TAB_NEXT,
    TAB_PREVIOUS,
    TAB_CLOSE,
    NEW_DOCUMENT,
    HISTORY_TRACKER,
    HISTORY_PREVIOUS,
    HISTORY_NEXT,
    BOOKMARK_STORE,
    BOOKMARK_TOGGLE,
    BOOKMARK_NEXT,
    BOOKMARK_PREVIOUS,
    BOOKMARK_CLEAR_ALL,
    SESSION_LOAD,
    SESSION_AUTOLOAD,
    SESSION_RESTORE_LAST,
    TAIL,
    FILE_TREE,
    FILE_TREE_REFRESH,
];

const fn all_distinct(ids: &[CommandId]) -> bool {
    let mut i = 0;
    while i < ids.len() {
        let mut j = i + 1;
        while j < ids.len() {
            if ids[i].0 == ids[j].0 {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(all_distinct(ALL), "duplicate command id in commands::ids::ALL");
