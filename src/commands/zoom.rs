// ── Zoom ──────────────────────────────────────────────────────────────────────

use super::{ids, Command, CommandId, CommandState};
use crate::app::EditorContext;
use crate::editor::{ZOOM_MAX, ZOOM_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStep {
    In,
    Out,
    /// Back to 100%.
    Reset,
}

pub struct Zoom {
    step: ZoomStep,
}

impl Zoom {
    pub fn new(step: ZoomStep) -> Self {
        Self { step }
    }

    fn target(&self, current: i32) -> i32 {
        match self.step {
            ZoomStep::In => (current + 1).min(ZOOM_MAX),
            ZoomStep::Out => (current - 1).max(ZOOM_MIN),
            ZoomStep::Reset => 0,
        }
    }
}

impl Command for Zoom {
    fn id(&self) -> CommandId {
        match self.step {
            ZoomStep::In => ids::ZOOM_IN,
            ZoomStep::Out => ids::ZOOM_OUT,
            ZoomStep::Reset => ids::ZOOM_100,
        }
    }

    fn execute(&mut self, ctx: &mut EditorContext) -> bool {
        let current = ctx.view().zoom();
        let target = self.target(current);
        if target == current {
            return false;
        }
        ctx.view_mut().set_zoom(target);
        ctx.set_status(format!("Zoom: {}%", 100 + target * 10));
        true
    }

    fn state(&self, ctx: &EditorContext) -> CommandState {
        let current = ctx.view().zoom();
        CommandState::enabled(self.target(current) != current)
    }
}

pub fn commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(Zoom::new(ZoomStep::In)),
        Box::new(Zoom::new(ZoomStep::Out)),
        Box::new(Zoom::new(ZoomStep::Reset)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::HostRequest;
    use crate::config::Settings;
    use crate::editor::memory::MemoryView;

    fn ctx() -> EditorContext {
        EditorContext::new(Box::new(MemoryView::new()), Settings::default())
    }

    #[test]
    fn zoom_in_out_and_reset() {
        let mut ctx = ctx();
        assert!(Zoom::new(ZoomStep::In).execute(&mut ctx));
        assert!(Zoom::new(ZoomStep::In).execute(&mut ctx));
        assert_eq!(ctx.view().zoom(), 2);
        assert!(ctx
            .take_host_requests()
            .contains(&HostRequest::StatusText("Zoom: 120%".into())));
        assert!(Zoom::new(ZoomStep::Out).execute(&mut ctx));
        assert!(Zoom::new(ZoomStep::Reset).execute(&mut ctx));
        assert_eq!(ctx.view().zoom(), 0);
        assert!(!Zoom::new(ZoomStep::Reset).execute(&mut ctx));
    }

    #[test]
    fn zoom_stops_at_limits() {
        let mut ctx = ctx();
        ctx.view_mut().set_zoom(ZOOM_MAX);
        let zoom_in = Zoom::new(ZoomStep::In);
        assert_eq!(zoom_in.state(&ctx), CommandState::enabled(false));
        ctx.view_mut().set_zoom(ZOOM_MIN);
        let mut zoom_out = Zoom::new(ZoomStep::Out);
        assert!(!zoom_out.execute(&mut ctx));
        assert_eq!(ctx.view().zoom(), ZOOM_MIN);
    }
}
