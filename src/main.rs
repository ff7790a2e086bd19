// Release builds run as a GUI application (no console window).
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use ribbonpad::config::{self, Settings};
use ribbonpad::logging;

fn main() {
    let log_dir = config::settings_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("ribbonpad").join("logs"));
    let guard = logging::init(&log_dir);

    let settings_path = config::settings_path();
    let settings = settings_path
        .as_deref()
        .map(Settings::load_from)
        .unwrap_or_default();
    let files: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let code = run(settings, settings_path, files);
    // Flush buffered log lines; `exit` skips destructors.
    drop(guard);
    std::process::exit(code);
}

#[cfg(windows)]
fn run(settings: Settings, settings_path: Option<PathBuf>, files: Vec<PathBuf>) -> i32 {
    match ribbonpad::run(settings, settings_path, files) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            // A modal dialog is the only visible output path in a GUI app.
            ribbonpad::show_error_dialog(&e.to_string());
            1
        }
    }
}

#[cfg(not(windows))]
fn run(_settings: Settings, _settings_path: Option<PathBuf>, _files: Vec<PathBuf>) -> i32 {
    tracing::error!("no GUI host available on this platform");
    eprintln!("ribbonpad: no GUI host available on this platform");
    1
}
