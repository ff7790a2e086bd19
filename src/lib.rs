// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32`   – Win32 / WinAPI FFI
//   • `editor::scintilla` – Scintilla child-window hosting
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Command core of a Scintilla-based text editor.
//!
//! Every user-invokable action is a [`commands::Command`] registered in a
//! [`commands::CommandRegistry`].  The host forwards menu picks, editor
//! notifications, tab changes and timers to the registry; commands act on the
//! active document through [`app::EditorContext`].  Everything except the
//! Win32 host runs headless against [`editor::memory::MemoryView`].

pub mod app;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod file_tree;
pub mod logging;
pub mod session;
pub mod ui;

#[cfg(windows)]
mod platform;

#[cfg(windows)]
pub use platform::win32::window::{run, show_error_dialog};
