// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is one of exactly two modules in the codebase where `unsafe` code is
// permitted (the other is `editor::scintilla`).  Every `unsafe` block MUST
// carry a `// SAFETY:` comment that states which invariant makes the
// operation sound.
//
// Nothing in this module is `pub` beyond what `main` genuinely needs.

#![allow(unsafe_code)]

pub(crate) mod window; // main window, WndProc, message loop
