// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class and create the top-level window with its
//     Scintilla child and status bar.
//   • Build the menu bar from the command table; every item id is a
//     `CommandId` and WM_COMMAND goes straight to `CommandRegistry::dispatch`.
//   • Query `Command::state` on WM_INITMENUPOPUP to enable and check items.
//   • Feed Scintilla notifications and timers into the registry.
//   • Carry out the `HostRequest`s commands queue.
//
// ── Re-entrancy ───────────────────────────────────────────────────────────────
//
// The host lives in a thread-local `RefCell`.  A command that sends a message
// to Scintilla can cause a nested WM_NOTIFY while the host is borrowed; the
// notification is only pushed into the view's inbox then, and the pump of the
// outer call delivers it.

#![allow(unsafe_code)]

use std::cell::RefCell;
use std::path::PathBuf;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{GetStockObject, HBRUSH, WHITE_BRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Controls::{InitCommonControlsEx, ICC_BAR_CLASSES, INITCOMMONCONTROLSEX},
            WindowsAndMessaging::{
                AppendMenuW, CheckMenuItem, CreateMenu, CreateWindowExW, DefWindowProcW,
                DestroyWindow, DispatchMessageW, EnableMenuItem, GetClientRect,
                GetMenuItemCount, GetMenuItemID, GetMessageW, GetWindowRect, KillTimer,
                LoadCursorW, LoadIconW, MessageBoxW, MoveWindow, PostMessageW, PostQuitMessage,
                RegisterClassExW, SendMessageW, SetMenu, SetTimer, SetWindowTextW, ShowWindow,
                TranslateMessage, UpdateWindow, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, HMENU,
                IDC_ARROW, IDI_APPLICATION, MB_ICONERROR, MB_OK, MF_BYCOMMAND, MF_CHECKED,
                MF_ENABLED, MF_GRAYED, MF_POPUP, MF_SEPARATOR, MF_STRING, MF_UNCHECKED, MSG,
                SW_SHOW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_DESTROY,
                WM_INITMENUPOPUP, WM_NOTIFY, WM_SIZE, WM_TIMER, WM_USER, WNDCLASSEXW, WS_CHILD,
                WS_OVERLAPPEDWINDOW, WS_VISIBLE,
            },
        },
    },
};

use crate::app::{EditorContext, HostRequest, TimerId};
use crate::commands::{ids, CommandId, CommandRegistry, Notification};
use crate::config::Settings;
use crate::editor::scintilla::{decode_notification, Inbox, SciDll, ScintillaView};
use crate::error::{Error, Result};
use crate::session;
use crate::ui::tabs::window_title;

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("RibbonPadMainWindow");

/// Application name shown in the title bar.
pub(crate) const APP_NAME: &str = "RibbonPad";

const DEFAULT_WIDTH: i32 = 960;
const DEFAULT_HEIGHT: i32 = 640;

/// Menu id for Exit.  Command ids start at 1001, so it never collides.
const IDM_EXIT: u32 = 1;

const SB_SETTEXTW: u32 = WM_USER + 11;
/// `SBARS_SIZEGRIP`
const STATUS_SIZEGRIP: WINDOW_STYLE = WINDOW_STYLE(0x0100);

// ── Menu table ────────────────────────────────────────────────────────────────

enum MenuEntry {
    Item(&'static str, CommandId),
    Separator,
}

use MenuEntry::{Item, Separator};

const FILE_MENU: &[MenuEntry] = &[
    Item("&New\tCtrl+N", ids::NEW_DOCUMENT),
    Item("&Save\tCtrl+S", ids::SAVE),
    Item("&Close Tab\tCtrl+W", ids::TAB_CLOSE),
    Separator,
    Item("Reopen Closed &Tab", ids::SESSION_RESTORE_LAST),
    Item("&Load Last Session", ids::SESSION_LOAD),
    Item("Load Session at &Startup", ids::SESSION_AUTOLOAD),
    Separator,
    Item("&Follow File", ids::TAIL),
];

const EDIT_MENU: &[MenuEntry] = &[
    Item("&Undo\tCtrl+Z", ids::UNDO),
    Item("&Redo\tCtrl+Y", ids::REDO),
    Separator,
    Item("Cu&t\tCtrl+X", ids::CUT),
    Item("&Copy\tCtrl+C", ids::COPY),
    Item("&Paste\tCtrl+V", ids::PASTE),
    Item("&Delete\tDel", ids::DELETE),
    Item("Select &All\tCtrl+A", ids::SELECT_ALL),
    Separator,
    Item("D&uplicate Line", ids::LINE_DUPLICATE),
    Item("&Join Lines", ids::LINES_JOIN),
    Item("Move Lines U&p", ids::LINES_UP),
    Item("Move Lines Do&wn", ids::LINES_DOWN),
    Item("Delete &Line", ids::LINE_DELETE),
    Separator,
    Item("UPPER CASE", ids::CASE_UPPER),
    Item("lower case", ids::CASE_LOWER),
    Item("Title Case", ids::CASE_TITLE),
    Separator,
    Item("Trim Trailing Blanks", ids::TRIM_TRAILING),
    Item("Tabs to Spaces", ids::TABS_TO_SPACES),
    Separator,
    Item("Sort Ascending", ids::SORT_ASCENDING),
    Item("Sort Descending", ids::SORT_DESCENDING),
];

const VIEW_MENU: &[MenuEntry] = &[
    Item("Zoom &In", ids::ZOOM_IN),
    Item("Zoom &Out", ids::ZOOM_OUT),
    Item("Zoom &100%", ids::ZOOM_100),
    Separator,
    Item("Show &Whitespace", ids::VIEW_WHITESPACE),
    Item("Word W&rap", ids::VIEW_WORD_WRAP),
    Item("Long Line &Edge", ids::VIEW_EDGE),
    Separator,
    Item("Windows (CRLF)", ids::EOL_CRLF),
    Item("Unix (LF)", ids::EOL_LF),
    Item("Mac (CR)", ids::EOL_CR),
    Separator,
    Item("Folding On", ids::FOLDING_ON),
    Item("Folding Off", ids::FOLDING_OFF),
    Item("Fold All", ids::FOLD_ALL),
    Item("Unfold All", ids::UNFOLD_ALL),
    Separator,
    Item("File &Tree", ids::FILE_TREE),
    Item("Refresh File Tree", ids::FILE_TREE_REFRESH),
];

const GO_MENU: &[MenuEntry] = &[
    Item("&Back", ids::HISTORY_PREVIOUS),
    Item("&Forward", ids::HISTORY_NEXT),
    Separator,
    Item("Toggle &Bookmark", ids::BOOKMARK_TOGGLE),
    Item("&Next Bookmark", ids::BOOKMARK_NEXT),
    Item("&Previous Bookmark", ids::BOOKMARK_PREVIOUS),
    Item("&Clear Bookmarks", ids::BOOKMARK_CLEAR_ALL),
    Separator,
    Item("Next &Tab", ids::TAB_NEXT),
    Item("Previous T&ab", ids::TAB_PREVIOUS),
    Item("&Recent Tab", ids::TAB_MRU),
    Item("&Last Tab", ids::SELECT_LAST_TAB),
];

// ── Host state ────────────────────────────────────────────────────────────────

/// Everything the window procedure needs between messages.
struct Host {
    ctx: EditorContext,
    registry: CommandRegistry,
    main: HWND,
    sci: HWND,
    status: HWND,
    title: String,
}

/// The Scintilla window and its inbox, reachable even while `HOST` is borrowed.
struct NotifyTarget {
    sci: HWND,
    inbox: Inbox,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
    static NOTIFY: RefCell<Option<NotifyTarget>> = const { RefCell::new(None) };
}

/// Run `f` on the host unless it is missing or already borrowed.
fn with_host<R>(f: impl FnOnce(&mut Host) -> R) -> Option<R> {
    HOST.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

impl Host {
    /// Carry out queued host requests and refresh the title.
    fn flush(&mut self) {
        for request in self.ctx.take_host_requests() {
            match request {
                HostRequest::StatusText(text) => self.set_status(&text),
                HostRequest::StartTimer { id, interval_ms } => {
                    // SAFETY: main is the live top-level window owned by this host.
                    let started = unsafe { SetTimer(self.main, id.0, interval_ms, None) };
                    if started == 0 {
                        tracing::warn!(timer = id.0, "SetTimer failed");
                    }
                }
                HostRequest::StopTimer(id) => {
                    // SAFETY: main is live; killing a timer that is not running
                    // only returns an error, which is ignored.
                    let _ = unsafe { KillTimer(self.main, id.0) };
                }
                HostRequest::FileTree(listing) => {
                    let text = format!(
                        "{} entries in {}",
                        listing.entries.len(),
                        listing.root.display()
                    );
                    self.set_status(&text);
                }
                HostRequest::Invalidate { command, kind } => {
                    // Menu state is queried when a menu opens.
                    tracing::trace!(?command, ?kind, "invalidate");
                }
            }
        }

        let title = window_title(&self.ctx, APP_NAME);
        if title != self.title {
            let text = wide(&title);
            // SAFETY: main is live; text is null-terminated UTF-16 that outlives the call.
            let _ = unsafe { SetWindowTextW(self.main, PCWSTR(text.as_ptr())) };
            self.title = title;
        }
    }

    fn set_status(&self, text: &str) {
        let text = wide(text);
        // SAFETY: status is a live status bar; text outlives the synchronous send.
        unsafe {
            let _ = SendMessageW(self.status, SB_SETTEXTW, WPARAM(0), LPARAM(text.as_ptr() as isize));
        }
    }

    /// Status bar along the bottom, Scintilla filling the rest.
    fn layout(&self) {
        let mut client = RECT::default();
        let mut bar = RECT::default();
        // SAFETY: all three windows are live; the RECT pointers are valid locals.
        unsafe {
            let _ = SendMessageW(self.status, WM_SIZE, WPARAM(0), LPARAM(0));
            if GetClientRect(self.main, &mut client).is_err() {
                return;
            }
            let _ = GetWindowRect(self.status, &mut bar);
            let height = (client.bottom - (bar.bottom - bar.top)).max(0);
            let _ = MoveWindow(self.sci, 0, 0, client.right, height, true);
        }
    }

    /// Enable, disable, check and uncheck the items of a menu about to open.
    fn update_menu(&self, menu: HMENU) {
        // SAFETY: menu comes from WM_INITMENUPOPUP and is valid for this message.
        let count = unsafe { GetMenuItemCount(menu) };
        for pos in 0..count.max(0) {
            // SAFETY: pos is within the item count just queried.
            let item = unsafe { GetMenuItemID(menu, pos) };
            let Some(state) = self.registry.state(CommandId(item), &self.ctx) else {
                continue;
            };
            let enable = if state.enabled { MF_ENABLED } else { MF_GRAYED };
            let check = if state.checked == Some(true) { MF_CHECKED } else { MF_UNCHECKED };
            // SAFETY: item is a command id present in menu.
            unsafe {
                let _ = EnableMenuItem(menu, item, MF_BYCOMMAND | enable);
                let _ = CheckMenuItem(menu, item, (MF_BYCOMMAND | check).0);
            }
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Create the main window, wire the command registry to it and drive the
/// message loop until the user closes the application.
///
/// `files` are opened after start-up, on top of any restored session.
pub fn run(settings: Settings, settings_path: Option<PathBuf>, files: Vec<PathBuf>) -> Result<()> {
    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // valid for the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(None) }?;
    let hinstance = HINSTANCE(hmodule.0);

    let controls = INITCOMMONCONTROLSEX {
        dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
        dwICC: ICC_BAR_CLASSES,
    };
    // SAFETY: controls is fully initialised.
    let _ = unsafe { InitCommonControlsEx(&controls) };

    register_class(hinstance)?;
    let main = create_window(hinstance)?;

    let dll = SciDll::load()?;
    let view = ScintillaView::create(main, hinstance, &dll)?;
    let sci = view.hwnd();
    NOTIFY.with(|n| {
        *n.borrow_mut() = Some(NotifyTarget {
            sci,
            inbox: view.inbox(),
        })
    });
    let status = create_status_bar(main, hinstance)?;

    let mut ctx = EditorContext::new(Box::new(view), settings);
    if let Some(path) = settings_path {
        ctx = ctx.with_settings_path(path);
    }
    if let Some(path) = session::session_path() {
        ctx = ctx.with_session_path(path);
    }
    let registry = CommandRegistry::with_defaults(&mut ctx)?;
    tracing::info!(commands = registry.len(), "command registry ready");

    HOST.with(|h| {
        *h.borrow_mut() = Some(Host {
            ctx,
            registry,
            main,
            sci,
            status,
            title: String::new(),
        })
    });

    with_host(|host| {
        host.layout();
        host.registry.after_init(&mut host.ctx);
        let last = files.last().cloned();
        for file in files {
            host.ctx.request_open(file, None);
        }
        if let Some(path) = last {
            host.ctx.request_focus(path);
        }
        host.registry.pump(&mut host.ctx);
        host.flush();
    });

    // SAFETY: main was just created and is valid.
    unsafe {
        let _ = ShowWindow(main, SW_SHOW);
        let _ = UpdateWindow(main);
    }

    let result = message_loop();

    // Drop the context (and with it the view) before unloading Scintilla.
    HOST.with(|h| h.borrow_mut().take());
    NOTIFY.with(|n| n.borrow_mut().take());
    drop(dll);
    result
}

/// Show a modal error dialog with the given message.
///
/// Used by `main()` when `run()` returns an error.
pub fn show_error_dialog(message: &str) {
    let msg_wide = wide(message);
    let title_wide = wide(&format!("{APP_NAME} - Fatal Error"));

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: IDI_APPLICATION and IDC_ARROW are built-in resources present on
    // every Windows version.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    // Stock brush objects are compatible with HBRUSH.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }
    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(hinstance: HINSTANCE) -> Result<HWND> {
    let title = wide(APP_NAME);
    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module.
    // A null parent creates a top-level window.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )
    }?;

    let menu = build_menu()?;
    // SAFETY: hwnd and menu are valid handles.
    unsafe { SetMenu(hwnd, menu) }?;
    Ok(hwnd)
}

fn create_status_bar(parent: HWND, hinstance: HINSTANCE) -> Result<HWND> {
    // SAFETY: the status bar class is registered by InitCommonControlsEx;
    // parent and hinstance are valid.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("msctls_statusbar32"),
            PCWSTR::null(),
            WS_CHILD | WS_VISIBLE | STATUS_SIZEGRIP,
            0,
            0,
            0,
            0,
            parent,
            HMENU::default(),
            hinstance,
            None,
        )
    }?;
    Ok(hwnd)
}

// ── Menu construction ─────────────────────────────────────────────────────────

fn append_items(menu: HMENU, entries: &[MenuEntry]) -> Result<()> {
    for entry in entries {
        match entry {
            Item(label, id) => {
                let text = wide(label);
                // SAFETY: menu is valid; text outlives the call.
                unsafe { AppendMenuW(menu, MF_STRING, id.0 as usize, PCWSTR(text.as_ptr())) }?;
            }
            Separator => {
                // SAFETY: menu is valid; separators carry no text.
                unsafe { AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null()) }?;
            }
        }
    }
    Ok(())
}

fn build_menu() -> Result<HMENU> {
    // SAFETY: CreateMenu has no preconditions; failures propagate through `?`.
    let bar = unsafe { CreateMenu() }?;

    let file = unsafe { CreateMenu() }?;
    append_items(file, FILE_MENU)?;
    append_items(file, &[Separator])?;
    // SAFETY: file is valid; the literal is a static null-terminated string.
    unsafe { AppendMenuW(file, MF_STRING, IDM_EXIT as usize, w!("E&xit\tAlt+F4")) }?;

    let edit = unsafe { CreateMenu() }?;
    append_items(edit, EDIT_MENU)?;
    let view = unsafe { CreateMenu() }?;
    append_items(view, VIEW_MENU)?;
    let go = unsafe { CreateMenu() }?;
    append_items(go, GO_MENU)?;

    // The uIDNewItem parameter for MF_POPUP is the child HMENU cast to usize.
    // SAFETY: bar and the drop-downs are valid menus created above.
    unsafe {
        AppendMenuW(bar, MF_POPUP, file.0 as usize, w!("&File"))?;
        AppendMenuW(bar, MF_POPUP, edit.0 as usize, w!("&Edit"))?;
        AppendMenuW(bar, MF_POPUP, view.0 as usize, w!("&View"))?;
        AppendMenuW(bar, MF_POPUP, go.0 as usize, w!("&Go"))?;
    }
    Ok(bar)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<()> {
    let mut msg = MSG::default();
    loop {
        // SAFETY: &mut msg is a valid MSG pointer; a null HWND retrieves
        // messages for every window on this thread.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }
    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

/// Push a Scintilla notification into the view's inbox and, unless a command
/// is already running, deliver it.
fn on_notify(lparam: LPARAM) -> bool {
    let queued = NOTIFY.with(|cell| {
        let target = cell.borrow();
        let target = target.as_ref()?;
        let event = decode_notification(target.sci, lparam)?;
        target.inbox.borrow_mut().push(event);
        Some(())
    });
    if queued.is_none() {
        return false;
    }
    with_host(|host| {
        host.registry.pump(&mut host.ctx);
        host.flush();
    });
    true
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call.
unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CLOSE => {
            with_host(|host| {
                host.registry.shutdown(&mut host.ctx);
                host.flush();
            });
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        WM_SIZE => {
            with_host(|host| host.layout());
            LRESULT(0)
        }

        WM_COMMAND => {
            // Control notifications carry the control's HWND in lparam.
            if lparam.0 != 0 {
                return DefWindowProcW(hwnd, msg, wparam, lparam);
            }
            let id = (wparam.0 & 0xFFFF) as u32;
            if id == IDM_EXIT {
                let _ = PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0));
                return LRESULT(0);
            }
            let handled = with_host(|host| {
                let handled = host.registry.dispatch(CommandId(id), &mut host.ctx);
                host.flush();
                handled
            });
            if handled.is_none() {
                tracing::debug!(id, "command ignored while another is running");
            }
            LRESULT(0)
        }

        WM_INITMENUPOPUP => {
            let menu = HMENU(wparam.0 as *mut core::ffi::c_void);
            with_host(|host| host.update_menu(menu));
            LRESULT(0)
        }

        WM_NOTIFY => {
            if on_notify(lparam) {
                LRESULT(0)
            } else {
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
        }

        WM_TIMER => {
            with_host(|host| {
                host.registry
                    .broadcast(&Notification::Timer(TimerId(wparam.0)), &mut host.ctx);
                host.flush();
            });
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in an `Error`.
///
/// Call immediately after a Win32 function that signals failure; any later
/// API call can overwrite the thread-local value.
fn last_error(function: &'static str) -> Error {
    // SAFETY: GetLastError reads thread-local state and never fails.
    let code = unsafe { GetLastError() };
    Error::Win32 {
        function,
        code: code.0,
    }
}
