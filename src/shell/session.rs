//! Session context handed to every command handler
//!
//! All mutable shell state lives here: the output log, the desktop, the
//! privilege flags, pending timers and background probes. Handlers take
//! `&mut Session`; nothing is global.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::content::projects::{self, ProjectOpen};
use crate::content::ContentSource;
use crate::desktop::{Chrome, OpenResult, Size, WindowManager};
use crate::task::{self, ProbeError, ProbeManager, ProbeStatus};
use crate::theme::{self, Palette, ThemeError, ThemeStore};

use super::input::LineBuffer;
use super::markup::{Line, Span, Tone};
use super::output::{OutputLog, Scheduler};
use super::privilege::Privilege;

/// Delay before links and windows open after their announcement.
pub const OPEN_DELAY: Duration = Duration::from_millis(500);
/// Delay between a clicked command's announcement and its dispatch.
pub const CLICK_DELAY: Duration = Duration::from_millis(200);

pub const RESUME_WINDOW_ID: &str = "resume";

/// Answers whether a link can be fetched. Runs on a probe thread.
pub type LinkProbe = Arc<dyn Fn(&str) -> Result<bool, ProbeError> + Send + Sync>;

/// Work that fires later on the event thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Dispatch a command line without echo.
    Run(String),
    OpenLink(String),
    OpenWindow { id: String, title: String, content: Vec<Line>, size: Option<Size> },
}

/// Requests for the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenLink(String),
}

pub struct Session {
    config: Config,
    pub output: OutputLog,
    pub windows: WindowManager,
    pub privilege: Privilege,
    pub probes: ProbeManager,
    content: Box<dyn ContentSource>,
    deferred: Scheduler<Deferred>,
    effects: Vec<Effect>,
    themes: ThemeStore,
    theme: String,
    /// Masked password field while a sudo challenge is open.
    challenge: Option<LineBuffer>,
    link_probe: LinkProbe,
    now: Instant,
}

impl Session {
    pub fn new(
        config: Config,
        content: Box<dyn ContentSource>,
        viewport: Size,
        themes: ThemeStore,
        now: Instant,
    ) -> Self {
        let chrome = Chrome::for_cell(config.cell_width, config.cell_height);
        let theme = themes.load().unwrap_or_else(|| "default".to_string());
        Self {
            output: OutputLog::new(Duration::from_millis(config.stagger_ms)),
            windows: WindowManager::new(viewport, chrome),
            privilege: Privilege::new(),
            probes: ProbeManager::new(),
            content,
            deferred: Scheduler::new(),
            effects: Vec::new(),
            themes,
            theme,
            challenge: None,
            link_probe: Arc::new(task::probe_link),
            now,
            config,
        }
    }

    /// Replace the resume availability check.
    pub fn set_link_probe(&mut self, probe: LinkProbe) {
        self.link_probe = probe;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn content(&self) -> &dyn ContentSource {
        self.content.as_ref()
    }

    /// The instant of the event being handled.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    /// Staggered write starting now.
    pub fn write(&mut self, lines: Vec<Line>) {
        self.output.write_lines(self.now, lines);
    }

    pub fn write_after(&mut self, delay: Duration, lines: Vec<Line>) {
        self.output.write_lines_after(self.now, delay, lines);
    }

    pub fn defer(&mut self, delay: Duration, item: Deferred) {
        self.deferred.schedule(self.now + delay, item);
    }

    pub fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        self.deferred.take_due(now)
    }

    pub fn next_deferred(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_narrow(&self) -> bool {
        self.windows.is_narrow()
    }

    pub fn is_degraded(&self) -> bool {
        self.privilege.is_degraded()
    }

    /// Fire a deferred item. A `Run` needs the dispatcher, so its command
    /// line is handed back instead.
    pub fn apply(&mut self, item: Deferred) -> Option<String> {
        match item {
            Deferred::Run(command) => return Some(command),
            Deferred::OpenLink(url) => self.push_effect(Effect::OpenLink(url)),
            Deferred::OpenWindow { id, title, content, size } => {
                self.windows.open(&id, &title, content, size);
            }
        }
        None
    }

    pub fn open_explorer(&mut self) -> OpenResult {
        projects::open_explorer(self.content.as_ref(), &mut self.windows)
    }

    /// Open the viewer for `name`. Narrow viewports get the link opened instead.
    pub fn open_project(&mut self, name: &str) {
        let Some(project) = self.content.project(name) else {
            tracing::warn!(project = name, "no such project");
            return;
        };
        match projects::open_project(&project, &mut self.windows) {
            ProjectOpen::Link(url) => self.push_effect(Effect::OpenLink(url)),
            ProjectOpen::NoLink => {
                self.write(vec![Line::plain(format!("No link available for {}.", project.name))]);
            }
            ProjectOpen::Window(_) | ProjectOpen::Refused => {}
        }
    }

    // Themes

    pub fn theme_name(&self) -> &str {
        &self.theme
    }

    /// Colors in effect. Bare mode overrides any theme.
    pub fn palette(&self) -> Palette {
        if self.is_degraded() {
            return theme::bare();
        }
        theme::builtin(&self.theme, &self.config.colors).unwrap_or_else(|| self.config.colors.clone())
    }

    /// Switch and persist. Returns `false` for an unknown name.
    pub fn set_theme(&mut self, name: &str) -> bool {
        if theme::builtin(name, &self.config.colors).is_none() {
            return false;
        }
        self.theme = name.to_string();
        if let Err(e) = self.themes.save(name) {
            log_theme_error(&e);
        }
        true
    }

    // Password challenge

    pub fn begin_challenge(&mut self) {
        self.challenge = Some(LineBuffer::new());
    }

    pub fn end_challenge(&mut self) {
        self.challenge = None;
    }

    pub fn challenge(&self) -> Option<&LineBuffer> {
        self.challenge.as_ref()
    }

    pub fn challenge_mut(&mut self) -> Option<&mut LineBuffer> {
        self.challenge.as_mut()
    }

    // Probes

    /// Check the resume link in the background; the answer lands via [`on_probe`](Self::on_probe).
    pub fn spawn_resume_probe(&mut self) {
        let target = self.config.resume.clone();
        let probe = self.link_probe.clone();
        let arg = target.clone();
        self.probes.spawn(&target, move || probe(&arg));
    }

    /// Apply a finished probe.
    pub fn on_probe(&mut self, target: &str, status: ProbeStatus) {
        match status {
            ProbeStatus::Available => {
                self.write(vec![
                    Line::plain("Launching Resume Viewer... ").push(Span::link("[Download PDF]", target)),
                    Line::blank(),
                ]);
                let content = resume_window(target);
                self.defer(
                    OPEN_DELAY,
                    Deferred::OpenWindow {
                        id: RESUME_WINDOW_ID.to_string(),
                        title: "Resume.pdf".to_string(),
                        content,
                        size: Some(Size::new(600, 800)),
                    },
                );
            }
            ProbeStatus::Failed(reason) => {
                tracing::warn!(link = %target, %reason, "resume probe failed");
                self.write(vec![Line::plain("Resume: Coming Soon..."), Line::blank()]);
            }
            ProbeStatus::Unavailable | ProbeStatus::Running => {
                self.write(vec![Line::plain("Resume: Coming Soon..."), Line::blank()]);
            }
        }
    }

    /// `user@host:~$` as styled spans.
    pub fn prompt_spans(&self) -> Vec<Span> {
        vec![
            Span::tone(self.config.username.clone(), Tone::User),
            Span::tone("@", Tone::Prompt),
            Span::tone(self.config.hostname.clone(), Tone::Host),
            Span::tone(":~$", Tone::Prompt),
        ]
    }

    pub fn prompt_text(&self) -> String {
        self.prompt_spans().iter().map(|s| s.text.as_str()).collect()
    }
}

fn log_theme_error(e: &ThemeError) {
    tracing::warn!(error = %e, "failed to persist theme");
}

fn resume_window(target: &str) -> Vec<Line> {
    vec![
        Line::blank(),
        Line::plain("  Document: ").push(Span::link(target, target)),
        Line::blank(),
        Line::from_spans(vec![Span::tone("  Click the link to open it in your viewer.", Tone::Muted)]),
    ]
}
