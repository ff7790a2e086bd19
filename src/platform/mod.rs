// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The GUI host.  The command layer never reaches in here; all Win32 FFI is
// confined to the `win32` sub-module.

pub(crate) mod win32;
