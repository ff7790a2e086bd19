// ── Tail (follow mode) ────────────────────────────────────────────────────────
//
// While a document is tailed it is read-only and a host timer polls its file;
// bytes appended on disk since the last poll are appended to the buffer.
// The document stays clean and keeps no undo history for the appended text.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use super::{ids, Command, CommandId, CommandState, TabNotification};
use crate::app::{EditorContext, Invalidation, TimerId};

/// Poll interval while tailing.
pub const TAIL_INTERVAL_MS: u32 = 1000;

/// What happened to a tailed file since the last poll.
#[derive(Debug, PartialEq, Eq)]
enum Growth {
    Unchanged,
    Appended(String),
    /// The file is shorter than what was loaded; it was rewritten.
    Truncated,
}

/// Read whatever follows the first `loaded` bytes of `path`.
///
/// A multi-byte character cut off at the end of the file is left for the
/// next poll.  Returns the new text and how many bytes it consumed.
fn read_growth(path: &Path, loaded: u64) -> io::Result<(Growth, u64)> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < loaded {
        return Ok((Growth::Truncated, 0));
    }
    if len == loaded {
        return Ok((Growth::Unchanged, 0));
    }
    file.seek(SeekFrom::Start(loaded))?;
    let mut buf = Vec::new();
    file.take(len - loaded).read_to_end(&mut buf)?;

    let complete = match std::str::from_utf8(&buf) {
        Ok(s) => s.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => buf.len(),
    };
    if complete == 0 {
        return Ok((Growth::Unchanged, 0));
    }
    let text = String::from_utf8_lossy(&buf[..complete]).into_owned();
    Ok((Growth::Appended(text), complete as u64))
}

/// Toggle follow mode on the active document.
pub struct Tail {
    timer: TimerId,
}

impl Tail {
    /// Reserves the poll timer from `ctx`.
    pub fn new(ctx: &mut EditorContext) -> Self {
        Self {
            timer: ctx.allocate_timer(),
        }
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    fn tailing(ctx: &EditorContext) -> bool {
        ctx.active_document().is_some_and(|d| d.tailing)
    }

    /// Only a named file without unsaved changes can be followed.
    fn can_tail(ctx: &EditorContext) -> bool {
        ctx.active_document().is_some_and(|d| d.path.is_some()) && !ctx.is_dirty(ctx.active_tab())
    }

    fn invalidate(&self, ctx: &mut EditorContext) {
        ctx.invalidate(self.id(), Invalidation::All);
    }

    fn poll(&self, ctx: &mut EditorContext) {
        let Some((path, loaded)) = ctx
            .active_document()
            .and_then(|d| d.path.clone().map(|p| (p, d.loaded_len)))
        else {
            return;
        };
        let (growth, consumed) = match read_growth(&path, loaded) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "tail poll failed");
                return;
            }
        };
        match growth {
            Growth::Unchanged => return,
            Growth::Appended(text) => {
                let view = ctx.view_mut();
                view.set_read_only(false);
                view.append_text(&text);
                view.set_read_only(true);
                if let Some(doc) = ctx.active_document_mut() {
                    doc.loaded_len += consumed;
                }
                tracing::trace!(path = %path.display(), bytes = consumed, "tail appended");
            }
            Growth::Truncated => {
                let bytes = match std::fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "tail reload failed");
                        return;
                    }
                };
                let view = ctx.view_mut();
                view.set_read_only(false);
                view.set_text(&String::from_utf8_lossy(&bytes));
                view.set_read_only(true);
                if let Some(doc) = ctx.active_document_mut() {
                    doc.loaded_len = bytes.len() as u64;
                }
                tracing::debug!(path = %path.display(), "tailed file was truncated, reloaded");
            }
        }
        let view = ctx.view_mut();
        view.empty_undo_buffer();
        view.set_save_point();
        let end = view.len();
        view.set_selection(end, end);
        view.scroll_caret();
    }
}

impl Command for Tail {
    fn id(&self) -> CommandId {
        ids::TAIL
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let tailing = Self::tailing(ctx);
        if !tailing && !Self::can_tail(ctx) {
            ctx.set_status("Only saved files can be followed");
            return false;
        }
        if let Some(doc) = ctx.active_document_mut() {
            doc.tailing = !tailing;
        }
        ctx.view_mut().set_read_only(!tailing);
        if tailing {
            ctx.stop_timer(self.timer);
        } else {
            ctx.start_timer(self.timer, TAIL_INTERVAL_MS);
        }
        tracing::debug!(tailing = !tailing, "tail toggled");
        self.invalidate(ctx);
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        let tailing = Self::tailing(ctx);
        CommandState {
            enabled: tailing || Self::can_tail(ctx),
            checked: Some(tailing),
        }
    }

    fn on_tab_notify(&mut self, ctx: &mut EditorContext, event: &TabNotification) {
        let TabNotification::SelChange { .. } = event;
        if Self::tailing(ctx) {
            ctx.view_mut().set_read_only(true);
            ctx.start_timer(self.timer, TAIL_INTERVAL_MS);
        } else {
            ctx.stop_timer(self.timer);
        }
        self.invalidate(ctx);
    }

    fn on_timer(&mut self, ctx: &mut EditorContext, id: TimerId) {
        if id != self.timer {
            return;
        }
        if Self::tailing(ctx) {
            self.poll(ctx);
        } else {
            ctx.stop_timer(self.timer);
            self.invalidate(ctx);
        }
    }

    fn on_document_close(&mut self, ctx: &mut EditorContext, _index: usize) {
        if Self::tailing(ctx) {
            ctx.stop_timer(self.timer);
        }
    }
}
