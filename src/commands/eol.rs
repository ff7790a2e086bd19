// ── Line endings ──────────────────────────────────────────────────────────────

use super::{ids, Command, CommandId, CommandState, TabNotification};
use crate::app::{EditorContext, Invalidation};
use crate::editor::EolMode;

const EOL_COMMANDS: [CommandId; 3] = [ids::EOL_CRLF, ids::EOL_LF, ids::EOL_CR];

/// Convert every line break of the active document to `mode` and make it
/// the mode for new lines.  Checked while it is the document's mode.
pub struct ConvertEol {
    mode: EolMode,
}

impl ConvertEol {
    pub fn new(mode: EolMode) -> Self {
        Self { mode }
    }
}

impl Command for ConvertEol {
    fn id(&self) -> CommandId {
        match self.mode {
            EolMode::Crlf => ids::EOL_CRLF,
            EolMode::Lf => ids::EOL_LF,
            EolMode::Cr => ids::EOL_CR,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let view = ctx.view_mut();
        if view.read_only() {
            return false;
        }
        view.set_eol_mode(self.mode);
        view.convert_eols(self.mode);
        for id in EOL_COMMANDS {
            ctx.invalidate(id, Invalidation::Value);
        }
        ctx.set_status(format!("Line endings: {}", self.mode.as_str()));
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        CommandState::toggle(ctx.view().eol_mode() == self.mode)
    }

    fn on_tab_notify(&mut self, ctx: &mut EditorContext, event: &TabNotification) {
        let TabNotification::SelChange { .. } = event;
        ctx.invalidate(self.id(), Invalidation::Value);
    }

    fn after_init(&mut self, ctx: &mut EditorContext) {
        ctx.invalidate(self.id(), Invalidation::Value);
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(ConvertEol::new(EolMode::Crlf)),
        Box::new(ConvertEol::new(EolMode::Lf)),
        Box::new(ConvertEol::new(EolMode::Cr)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::HostRequest;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    #[test]
    fn convert_rewrites_breaks_and_checks_mode() {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text("a\r\nb\rc\n");
        let mut lf = ConvertEol::new(EolMode::Lf);
        let crlf = ConvertEol::new(EolMode::Crlf);

        assert_eq!(crlf.state(&ctx), CommandState::toggle(true));
        assert!(lf.execute(&mut ctx));
        assert_eq!(ctx.view().text(), "a\nb\nc\n");
        assert_eq!(lf.state(&ctx), CommandState::toggle(true));
        assert_eq!(crlf.state(&ctx), CommandState::toggle(false));

        let requests = ctx.take_host_requests();
        for id in EOL_COMMANDS {
            assert!(requests.contains(&HostRequest::Invalidate {
                command: Some(id),
                kind: Invalidation::Value,
            }));
        }
    }

    #[test]
    fn read_only_document_is_left_alone() {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        ctx.view_mut().set_text("a\r\nb");
        ctx.view_mut().set_read_only(true);
        assert!(!ConvertEol::new(EolMode::Cr).execute(&mut ctx));
        assert_eq!(ctx.view().eol_mode(), EolMode::Crlf);
    }

    #[test]
    fn tab_switch_refreshes_checked_mode() {
        let mut ctx = EditorContext::new(Box::new(MemoryView::new()), Settings::default());
        let mut cr = ConvertEol::new(EolMode::Cr);
        let doc = ctx.active_doc_id();
        ctx.take_host_requests();
        cr.on_tab_notify(&mut ctx, &TabNotification::SelChange { index: 0, doc });
        assert_eq!(
            ctx.take_host_requests(),
            [HostRequest::Invalidate {
                command: Some(ids::EOL_CR),
                kind: Invalidation::Value,
            }]
        );
    }
}
