//! Shell core module

pub mod builtin;
pub mod completer;
pub mod input;
pub mod markup;
pub mod output;
pub mod privilege;
pub mod registry;
pub mod session;

use std::time::Instant;

use crate::config::Config;
use crate::content::{ContentSource, Portfolio};
use crate::desktop::Size;
use crate::theme::ThemeStore;

use input::{InputOutcome, InputState, KeyInput};
use markup::{Action, Line, Span, Tone};
use privilege::Challenge;
use registry::CommandRegistry;
use session::{Deferred, Effect, LinkProbe, Session, CLICK_DELAY};

/// Main shell state
pub struct Shell {
    registry: CommandRegistry<Session>,
    /// Everything handlers can touch
    pub session: Session,
    /// Prompt line editor
    pub input: InputState,
    /// Should exit
    pub should_exit: bool,
}

impl Shell {
    pub fn new(config: Config, viewport: Size, themes: ThemeStore, now: Instant) -> Self {
        let content = Box::new(Portfolio::new(&config));
        Self::with_content(config, content, viewport, themes, now)
    }

    pub fn with_content(
        config: Config,
        content: Box<dyn ContentSource>,
        viewport: Size,
        themes: ThemeStore,
        now: Instant,
    ) -> Self {
        let session = Session::new(config, content, viewport, themes, now);
        let mut registry = CommandRegistry::new();
        builtin::register_all(&mut registry);
        let input = InputState::new(registry.names().map(str::to_string).collect());
        Self { registry, session, input, should_exit: false }
    }

    /// Swap the resume availability check (tests use a canned answer).
    pub fn with_link_probe(mut self, probe: LinkProbe) -> Self {
        self.session.set_link_probe(probe);
        self
    }

    /// Add or replace a command. Completion picks up the new name.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Session, &[String]) + 'static,
    {
        self.registry.register(name, handler);
        self.input.set_commands(self.command_names());
    }

    pub fn command_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    /// Print the greeting banner.
    pub fn start(&mut self, now: Instant) {
        self.session.set_now(now);
        self.registry.dispatch(&mut self.session, "banner");
    }

    /// Feed one key. A sudo challenge, when open, takes the keys instead of the prompt.
    pub fn handle_key(&mut self, key: KeyInput, now: Instant) -> InputOutcome {
        self.session.set_now(now);
        if self.session.challenge().is_some() {
            return self.handle_challenge_key(key, now);
        }

        let outcome = self.input.handle_key(key);
        match &outcome {
            InputOutcome::Submit(line) => self.submit(line, now),
            InputOutcome::Interrupt(line) => self.interrupt(line),
            InputOutcome::Clear => self.session.output.clear(),
            InputOutcome::CloseWindow => {
                if let Some(id) = self.session.windows.front().map(|w| w.id.clone()) {
                    self.session.windows.close(&id);
                }
            }
            InputOutcome::Quit => self.should_exit = true,
            InputOutcome::Edited | InputOutcome::Ignored => {}
        }
        outcome
    }

    fn handle_challenge_key(&mut self, key: KeyInput, now: Instant) -> InputOutcome {
        match key {
            KeyInput::Enter => {
                let typed = self.session.challenge().map(|b| b.as_str().to_string()).unwrap_or_default();
                self.submit_password(&typed, now);
                InputOutcome::Edited
            }
            KeyInput::Esc | KeyInput::CtrlC => {
                self.session.end_challenge();
                InputOutcome::Edited
            }
            KeyInput::Char(c) => {
                if let Some(field) = self.session.challenge_mut() {
                    field.insert(c);
                }
                InputOutcome::Edited
            }
            KeyInput::Backspace => match self.session.challenge_mut() {
                Some(field) => {
                    if field.backspace() {
                        InputOutcome::Edited
                    } else {
                        InputOutcome::Ignored
                    }
                }
                None => InputOutcome::Ignored,
            },
            _ => InputOutcome::Ignored,
        }
    }

    /// Echo `line`, then run it. Unknown commands get a hint.
    pub fn submit(&mut self, line: &str, now: Instant) {
        self.session.set_now(now);
        let echo = Line::from_spans(self.session.prompt_spans())
            .push(Span::plain(" "))
            .push(Span::tone(line, Tone::Echo));
        self.session.output.echo(echo);

        if line.trim().is_empty() {
            return;
        }
        if self.registry.dispatch(&mut self.session, line) {
            return;
        }
        tracing::debug!(input = line, "command not found");
        let reply = if self.session.is_degraded() {
            vec![Line::plain("type 'help'"), Line::blank()]
        } else {
            vec![
                Line::error(format!("Command not found: {}", line)),
                Line::blank(),
                Line::plain("Type ").push(Span::clickable("'help'", "help")).push(Span::plain(" for a list of commands.")),
                Line::blank(),
            ]
        };
        self.session.write(reply);
    }

    /// Answer an open sudo challenge.
    pub fn submit_password(&mut self, password: &str, now: Instant) {
        self.session.set_now(now);
        if self.session.challenge().is_none() {
            return;
        }
        let expected = self.session.config().password.clone();
        match self.session.privilege.check_password(password, &expected) {
            Challenge::Granted => {
                self.session.end_challenge();
                self.session.write(vec![
                    Line::blank(),
                    Line::plain("PERMISSION GRANTED."),
                    Line::plain("Try ").push(Span::command("'rm -rf'")),
                    Line::blank(),
                ]);
            }
            Challenge::Retry => {
                if let Some(field) = self.session.challenge_mut() {
                    field.clear();
                }
            }
            Challenge::Locked => {
                self.session.end_challenge();
                self.session.write(vec![
                    Line::blank(),
                    Line::error("INCORRECT PASSWORD."),
                    Line::error("PERMISSION NOT GRANTED."),
                    Line::blank(),
                ]);
            }
        }
    }

    /// Whether the prompt is currently a masked password field.
    pub fn in_challenge(&self) -> bool {
        self.session.challenge().is_some()
    }

    fn interrupt(&mut self, line: &str) {
        let echo = Line::from_spans(self.session.prompt_spans())
            .push(Span::plain(" "))
            .push(Span::tone(format!("{}^C", line), Tone::Echo));
        self.session.output.echo(echo);
    }

    /// A clicked command: announce it now, run it shortly after.
    pub fn run_clicked(&mut self, command: &str, now: Instant) {
        self.session.set_now(now);
        self.session
            .output
            .echo(Line::from_spans(vec![Span::keys("Executing:"), Span::plain(format!(" {}...", command))]));
        self.input.set_value("");
        self.session.defer(CLICK_DELAY, Deferred::Run(command.to_string()));
    }

    /// Follow a clicked span's action.
    pub fn activate(&mut self, action: &Action, now: Instant) {
        match action {
            Action::Run(command) => self.run_clicked(command, now),
            Action::Open(url) => self.session.push_effect(Effect::OpenLink(url.clone())),
            Action::Project(name) => {
                self.session.set_now(now);
                self.session.open_project(name);
            }
        }
    }

    /// Fire everything due by `now`: probe results, deferred work, then
    /// staggered output. Returns whether anything visible may have changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.session.set_now(now);
        let mut changed = false;

        for (id, target, status) in self.session.probes.check_completed() {
            tracing::debug!(id, %status, "applying probe result");
            self.session.on_probe(&target, status);
            changed = true;
        }

        for item in self.session.take_due(now) {
            changed = true;
            if let Some(command) = self.session.apply(item) {
                self.registry.dispatch(&mut self.session, &command);
            }
        }

        changed |= self.session.output.advance(now) > 0;
        changed
    }

    /// Earliest pending timer, output or deferred.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.session.output.next_deadline(), self.session.next_deferred()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_pending_probes(&self) -> bool {
        !self.session.probes.is_empty()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.session.take_effects()
    }
}
