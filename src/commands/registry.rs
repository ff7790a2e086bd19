// ── Command registry ──────────────────────────────────────────────────────────
//
// Sole owner of every command instance.  The host talks to it through three
// entry points: `dispatch` (button / menu / accelerator), `broadcast`
// (control, tab, timer and lifecycle events) and `lookup` / `state`
// (enabling and labeling controls).
//
// Everything runs on the dispatch thread.  Events that commands raise while
// running are queued in the `EditorContext` and delivered by `pump` after
// the current call returns, so no command is ever re-entered.

use rustc_hash::FxHashMap;

use super::{
    blanks, bookmarks, case, edit, eol, file_tree, folding, history, lines, session, sort,
    tabs, tail, view, zoom, Command, CommandId, CommandState, Notification,
};
use crate::app::{EditorContext, Operation};
use crate::error::{Error, Result};

/// Upper bound on events and operations handled by one pump.  Reaching it
/// means commands keep triggering each other; the rest is dropped.
const MAX_PUMP_STEPS: usize = 10_000;

/// Id-keyed collection of commands, kept in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    index: FxHashMap<CommandId, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command.
    ///
    /// Commands that need host timers allocate them from `ctx` here.
    pub fn with_defaults(ctx: &mut EditorContext) -> Result<Self> {
        let mut reg = Self::new();

        for cmd in edit::commands() {
            reg.register(cmd)?;
        }
        for cmd in lines::commands() {
            reg.register(cmd)?;
        }
        for cmd in case::commands() {
            reg.register(cmd)?;
        }
        for cmd in blanks::commands() {
            reg.register(cmd)?;
        }
        for cmd in sort::commands() {
            reg.register(cmd)?;
        }
        for cmd in zoom::commands() {
            reg.register(cmd)?;
        }
        for cmd in view::commands() {
            reg.register(cmd)?;
        }
        for cmd in eol::commands() {
            reg.register(cmd)?;
        }
        for cmd in folding::commands() {
            reg.register(cmd)?;
        }
        for cmd in tabs::commands() {
            reg.register(cmd)?;
        }
        for cmd in history::commands() {
            reg.register(cmd)?;
        }
        for cmd in bookmarks::commands() {
            reg.register(cmd)?;
        }
        for cmd in session::commands() {
            reg.register(cmd)?;
        }
        reg.register(Box::new(tail::Tail::new(ctx)))?;
        for cmd in file_tree::commands(ctx) {
            reg.register(cmd)?;
        }

        tracing::debug!(count = reg.len(), "default commands registered");
        Ok(reg)
    }

    // ── Registration & lookup ─────────────────────────────────────────────────

    /// Take ownership of `command`.
    ///
    /// A second command with an id that is already present is rejected and
    /// the registry is left unchanged.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<()> {
        let id = command.id();
        if self.index.contains_key(&id) {
            tracing::warn!(%id, "rejected duplicate command registration");
            return Err(Error::DuplicateCommand { id });
        }
        self.index.insert(id, self.commands.len());
        self.commands.push(command);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = CommandId> + '_ {
        self.commands.iter().map(|c| c.id())
    }

    pub fn contains(&self, id: CommandId) -> bool {
        self.index.contains_key(&id)
    }

    /// The command registered under `id`, if any.
    pub fn lookup(&self, id: CommandId) -> Option<&dyn Command> {
        let i = *self.index.get(&id)?;
        Some(self.commands[i].as_ref())
    }

    pub fn lookup_mut(&mut self, id: CommandId) -> Option<&mut dyn Command> {
        let i = *self.index.get(&id)?;
        Some(self.commands[i].as_mut())
    }

    /// Control state for `id`; `None` when nothing is registered under it.
    pub fn state(&self, id: CommandId, ctx: &EditorContext) -> Option<CommandState> {
        self.lookup(id).map(|c| c.state(ctx))
    }

    // ── Entry points ──────────────────────────────────────────────────────────

    /// Execute the command registered under `id`.
    ///
    /// Returns `false` without touching anything if no command has that id.
    pub fn dispatch(&mut self, id: CommandId, ctx: &mut EditorContext) -> bool {
        let Some(&i) = self.index.get(&id) else {
            tracing::debug!(%id, "dispatch: no command registered");
            return false;
        };
        let handled = self.commands[i].execute(ctx);
        tracing::debug!(%id, handled, "dispatch");
        self.pump(ctx);
        handled
    }

    /// Deliver `event` to every command, in registration order, then drain
    /// whatever the commands queued in response.
    pub fn broadcast(&mut self, event: &Notification, ctx: &mut EditorContext) {
        self.deliver(event, ctx);
        self.pump(ctx);
    }

    /// Announce that the main window is up.
    pub fn after_init(&mut self, ctx: &mut EditorContext) {
        self.broadcast(&Notification::AfterInit, ctx);
    }

    /// Broadcast `Close`, then close every document so per-document state
    /// (bookmarks, history) is flushed.
    pub fn shutdown(&mut self, ctx: &mut EditorContext) {
        self.broadcast(&Notification::Close, ctx);
        let docs: Vec<_> = (0..ctx.tab_count())
            .filter_map(|i| ctx.doc_id_at(i))
            .collect();
        for id in docs {
            ctx.request_close(id);
        }
        self.pump(ctx);
        tracing::info!("command registry shut down");
    }

    // ── Event pump ────────────────────────────────────────────────────────────

    /// Deliver queued events and run queued document operations until both
    /// queues are empty.  Events raised by an operation are delivered before
    /// the next operation starts.
    pub fn pump(&mut self, ctx: &mut EditorContext) {
        let mut steps = 0;
        loop {
            if !self.drain_events(ctx, &mut steps) {
                return;
            }
            let Some(op) = ctx.next_operation() else {
                break;
            };
            if !Self::step(ctx, &mut steps) {
                return;
            }
            self.run(op, ctx, &mut steps);
        }
    }

    fn drain_events(&mut self, ctx: &mut EditorContext, steps: &mut usize) -> bool {
        while let Some(event) = ctx.next_event() {
            if !Self::step(ctx, steps) {
                return false;
            }
            self.deliver(&event, ctx);
        }
        true
    }

    fn step(ctx: &mut EditorContext, steps: &mut usize) -> bool {
        *steps += 1;
        if *steps <= MAX_PUMP_STEPS {
            return true;
        }
        tracing::warn!(limit = MAX_PUMP_STEPS, "event pump limit reached, dropping queued events");
        ctx.clear_pending();
        false
    }

    fn deliver(&mut self, event: &Notification, ctx: &mut EditorContext) {
        tracing::trace!(?event, "broadcast");
        for cmd in &mut self.commands {
            cmd.notify(ctx, event);
        }
    }

    fn run(&mut self, op: Operation, ctx: &mut EditorContext, steps: &mut usize) {
        match op {
            Operation::Open { path, position } => {
                if let Err(e) = ctx.open_now(&path, position) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to open file");
                    ctx.set_status(format!("Cannot open {}: {e}", path.display()));
                }
            }
            Operation::Close(id) => {
                let Some(index) = ctx.tab_index_of(id) else {
                    return;
                };
                // Hooks read the closing document through the view.
                ctx.activate_tab(index);
                if !self.drain_events(ctx, steps) {
                    return;
                }
                self.deliver(&Notification::DocumentClose(index), ctx);
                ctx.remove_document(id);
            }
            Operation::Focus(path) => {
                if let Some(index) = ctx.tab_index_of_path(&path) {
                    ctx.activate_tab(index);
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
