// ── Central error type ────────────────────────────────────────────────────────
//
// Fallible plumbing (registration, settings, session files, the Win32 host)
// returns `error::Result<T>`.  Command bodies never return errors: they log
// and report "not handled" through their boolean result.

use crate::commands::CommandId;

/// Every error that ribbonpad can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second command tried to register under an id that is already taken.
    #[error("command id {id} is already registered")]
    DuplicateCommand {
        /// The contested id.
        id: CommandId,
    },

    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (file open, read, write, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or session JSON could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Convert a windows-crate error (HRESULT) directly into an `Error` so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for Error {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
