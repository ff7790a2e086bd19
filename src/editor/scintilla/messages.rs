// ── Scintilla message constants ───────────────────────────────────────────────
//
// Source of truth: Scintilla.h (https://www.scintilla.org/ScintillaDoc.html)
// Only the subset `ScintillaView` sends is listed here.
// All SCI_* values are sent via SendMessageW(hwnd_sci, SCI_*, wparam, lparam).

// ── Code page ─────────────────────────────────────────────────────────────────

pub(super) const SCI_SETCODEPAGE: u32 = 2037;
pub(super) const SC_CP_UTF8: usize = 65001;

// ── Documents ─────────────────────────────────────────────────────────────────

pub(super) const SCI_SETDOCPOINTER: u32 = 2358;
/// Returns a new document with reference count 1.
pub(super) const SCI_CREATEDOCUMENT: u32 = 2375;
pub(super) const SCI_RELEASEDOCUMENT: u32 = 2377;

// ── Content ───────────────────────────────────────────────────────────────────

pub(super) const SCI_GETLENGTH: u32 = 2006;
pub(super) const SCI_SETTEXT: u32 = 2181;
/// WPARAM=buffer len (incl. null); LPARAM=buffer ptr.
pub(super) const SCI_GETTEXT: u32 = 2182;
pub(super) const SCI_REPLACETARGET: u32 = 2194;
pub(super) const SCI_APPENDTEXT: u32 = 2282;
pub(super) const SCI_SETTARGETRANGE: u32 = 2686;
/// LPARAM=buffer of target length + 1; returns the target length.
pub(super) const SCI_GETTARGETTEXT: u32 = 2687;

// ── Lines & columns ───────────────────────────────────────────────────────────

pub(super) const SCI_GETCOLUMN: u32 = 2129;
pub(super) const SCI_GETLINEENDPOSITION: u32 = 2136;
pub(super) const SCI_GETLINECOUNT: u32 = 2154;
pub(super) const SCI_LINEFROMPOSITION: u32 = 2166;
pub(super) const SCI_POSITIONFROMLINE: u32 = 2167;
pub(super) const SCI_FINDCOLUMN: u32 = 2456;

// ── Selection & scrolling ─────────────────────────────────────────────────────

pub(super) const SCI_GETCURRENTPOS: u32 = 2008;
pub(super) const SCI_GETANCHOR: u32 = 2009;
pub(super) const SCI_GETFIRSTVISIBLELINE: u32 = 2152;
pub(super) const SCI_SETSEL: u32 = 2160;
pub(super) const SCI_SCROLLCARET: u32 = 2169;
pub(super) const SCI_SELECTIONISRECTANGLE: u32 = 2372;
pub(super) const SCI_SETFIRSTVISIBLELINE: u32 = 2613;

// ── Undo & save point ─────────────────────────────────────────────────────────

pub(super) const SCI_REDO: u32 = 2011;
pub(super) const SCI_SETSAVEPOINT: u32 = 2014;
pub(super) const SCI_CANREDO: u32 = 2016;
pub(super) const SCI_BEGINUNDOACTION: u32 = 2078;
pub(super) const SCI_ENDUNDOACTION: u32 = 2079;
pub(super) const SCI_GETMODIFY: u32 = 2159;
pub(super) const SCI_CANUNDO: u32 = 2174;
pub(super) const SCI_EMPTYUNDOBUFFER: u32 = 2175;
pub(super) const SCI_UNDO: u32 = 2176;

// ── Clipboard ─────────────────────────────────────────────────────────────────

pub(super) const SCI_SELECTALL: u32 = 2013;
pub(super) const SCI_CUT: u32 = 2177;
pub(super) const SCI_COPY: u32 = 2178;
pub(super) const SCI_PASTE: u32 = 2179;
pub(super) const SCI_CLEAR: u32 = 2180;

// ── View options ──────────────────────────────────────────────────────────────

pub(super) const SCI_GETVIEWWS: u32 = 2020;
pub(super) const SCI_SETVIEWWS: u32 = 2021;
pub(super) const SCWS_INVISIBLE: usize = 0;
pub(super) const SCWS_VISIBLEALWAYS: usize = 1;

pub(super) const SCI_SETTABWIDTH: u32 = 2036;
pub(super) const SCI_GETTABWIDTH: u32 = 2121;

pub(super) const SCI_SETWRAPMODE: u32 = 2268;
pub(super) const SCI_GETWRAPMODE: u32 = 2269;
pub(super) const SC_WRAP_NONE: usize = 0;
pub(super) const SC_WRAP_WORD: usize = 1;

pub(super) const SCI_GETVIEWEOL: u32 = 2355;
pub(super) const SCI_SETVIEWEOL: u32 = 2356;

pub(super) const SCI_GETEDGECOLUMN: u32 = 2360;
pub(super) const SCI_SETEDGECOLUMN: u32 = 2361;
pub(super) const SCI_GETEDGEMODE: u32 = 2362;
pub(super) const SCI_SETEDGEMODE: u32 = 2363;
pub(super) const EDGE_NONE: usize = 0;
pub(super) const EDGE_LINE: usize = 1;

pub(super) const SCI_SETZOOM: u32 = 2373;
pub(super) const SCI_GETZOOM: u32 = 2374;

pub(super) const SCI_GETREADONLY: u32 = 2140;
pub(super) const SCI_SETREADONLY: u32 = 2171;

// ── EOL ───────────────────────────────────────────────────────────────────────

pub(super) const SCI_CONVERTEOLS: u32 = 2029;
pub(super) const SCI_GETEOLMODE: u32 = 2030;
pub(super) const SCI_SETEOLMODE: u32 = 2031;
pub(super) const SC_EOL_CRLF: isize = 0;
pub(super) const SC_EOL_CR: isize = 1;
pub(super) const SC_EOL_LF: isize = 2;

// ── Margins ───────────────────────────────────────────────────────────────────

pub(super) const SCI_SETMARGINTYPEN: u32 = 2240;
pub(super) const SCI_SETMARGINWIDTHN: u32 = 2242;
pub(super) const SCI_GETMARGINWIDTHN: u32 = 2243;
pub(super) const SCI_SETMARGINMASKN: u32 = 2244;
pub(super) const SCI_SETMARGINSENSITIVEN: u32 = 2246;
pub(super) const SC_MARGIN_SYMBOL: usize = 0;
pub(super) const SC_MASK_FOLDERS: isize = 0xFE00_0000_u32 as i32 as isize;

// ── Folding ───────────────────────────────────────────────────────────────────

pub(super) const SCI_SETFOLDLEVEL: u32 = 2222;
pub(super) const SCI_GETFOLDLEVEL: u32 = 2223;
pub(super) const SCI_GETFOLDPARENT: u32 = 2225;
pub(super) const SCI_GETFOLDEXPANDED: u32 = 2230;
pub(super) const SCI_TOGGLEFOLD: u32 = 2231;
pub(super) const SCI_SETAUTOMATICFOLD: u32 = 2663;
pub(super) const SC_AUTOMATICFOLD_CLICK: usize = 4;
pub(super) const SC_FOLDLEVELBASE: isize = 0x400;
pub(super) const SC_FOLDLEVELWHITEFLAG: isize = 0x1000;
pub(super) const SC_FOLDLEVELHEADERFLAG: isize = 0x2000;
pub(super) const SC_FOLDLEVELNUMBERMASK: isize = 0x0FFF;

// ── Markers ───────────────────────────────────────────────────────────────────

pub(super) const SCI_MARKERDEFINE: u32 = 2040;
pub(super) const SCI_MARKERADD: u32 = 2043;
pub(super) const SCI_MARKERDELETE: u32 = 2044;
pub(super) const SCI_MARKERDELETEALL: u32 = 2045;
pub(super) const SCI_MARKERGET: u32 = 2046;
pub(super) const SCI_MARKERNEXT: u32 = 2047;
pub(super) const SCI_MARKERPREVIOUS: u32 = 2048;
pub(super) const SC_MARK_BOXPLUS: isize = 12;
pub(super) const SC_MARK_BOXMINUS: isize = 14;
pub(super) const SC_MARK_BOOKMARK: isize = 31;
pub(super) const SC_MARKNUM_FOLDER: usize = 30;
pub(super) const SC_MARKNUM_FOLDEROPEN: usize = 31;

// ── Notifications ─────────────────────────────────────────────────────────────

pub(super) const SCI_SETMODEVENTMASK: u32 = 2359;
pub(super) const SC_MOD_INSERTTEXT: i32 = 0x1;
pub(super) const SC_MOD_DELETETEXT: i32 = 0x2;

pub(super) const SCN_SAVEPOINTREACHED: u32 = 2002;
pub(super) const SCN_SAVEPOINTLEFT: u32 = 2003;
pub(super) const SCN_UPDATEUI: u32 = 2007;
pub(super) const SCN_MODIFIED: u32 = 2008;
pub(super) const SCN_MARGINCLICK: u32 = 2010;
pub(super) const SCN_ZOOM: u32 = 2018;
