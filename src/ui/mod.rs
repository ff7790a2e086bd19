// ── Host-independent UI helpers ───────────────────────────────────────────────
//
// Pure Rust presentation logic shared by the Win32 host and the tests.

pub mod tabs;
