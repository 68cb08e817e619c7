//! Full-screen frontend
//!
//! Event loop that drives terminal I/O and the shell. `tokio::select!`
//! waits on terminal events, the next output or deferred deadline, a probe
//! poll while probes run, and an animation frame while a window is being
//! dragged or resized.

pub mod ui;

use std::future;
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::desktop::{HitRegion, Point, Size};
use crate::launch;
use crate::shell::input::KeyInput;
use crate::shell::Shell;

const PROBE_POLL: Duration = Duration::from_millis(100);
const FRAME: Duration = Duration::from_millis(16);
/// Lines per mouse wheel notch.
const WHEEL_STEP: i32 = 3;

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Owns the terminal for the lifetime of the UI; dropping it restores the screen.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    shell: Shell,
    /// Lines scrolled back from the bottom of the log.
    log_scroll: usize,
    rendered: ui::Rendered,
}

impl Runtime {
    pub fn new(shell: Shell) -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        let mut runtime = Self { terminal, shell, log_scroll: 0, rendered: ui::Rendered::default() };
        let (cols, rows) = terminal::size()?;
        runtime.resize(cols, rows);
        Ok(runtime)
    }

    /// Run the main event loop until the shell asks to exit.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.shell.start(Instant::now());

        let mut events = EventStream::new();
        let mut probe_tick = tokio::time::interval(PROBE_POLL);
        probe_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame_tick = tokio::time::interval(FRAME);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            self.pump(Instant::now());
            self.render()?;
            if self.shell.should_exit {
                break;
            }

            let deadline = self.shell.next_deadline();
            let probing = self.shell.has_pending_probes();
            let animating = self.shell.session.windows.is_gesture_active();

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(RuntimeError::Io(e)),
                        None => break,
                    }
                }

                _ = sleep_until(deadline) => {}

                _ = probe_tick.tick(), if probing => {}

                _ = frame_tick.tick(), if animating => {
                    self.shell.session.windows.on_frame();
                }
            }
        }

        tracing::info!("webterm exiting");
        Ok(())
    }

    /// Fire due timers and hand any requested effects to the desktop.
    fn pump(&mut self, now: Instant) {
        self.shell.advance(now);
        launch::perform(self.shell.take_effects());
    }

    fn render(&mut self) -> Result<(), RuntimeError> {
        let shell = &self.shell;
        let scroll = self.log_scroll;
        let mut rendered = ui::Rendered::default();
        self.terminal.draw(|frame| {
            rendered = ui::render(frame, shell, scroll);
        })?;
        self.log_scroll = self.log_scroll.min(rendered.max_scroll);
        self.rendered = rendered;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(input) = convert_key(key) {
                    self.log_scroll = 0;
                    self.shell.handle_key(input, Instant::now());
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let config = self.shell.session.config();
        let viewport = Size::new(i32::from(cols) * config.cell_width, i32::from(rows) * config.cell_height);
        tracing::debug!(cols, rows, width = viewport.width, height = viewport.height, "viewport resized");
        self.shell.session.windows.set_viewport(viewport);
    }

    /// Center of a cell in pixels.
    fn to_point(&self, col: u16, row: u16) -> Point {
        let config = self.shell.session.config();
        let (cw, ch) = (config.cell_width, config.cell_height);
        Point::new(i32::from(col) * cw + cw / 2, i32::from(row) * ch + ch / 2)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let p = self.to_point(mouse.column, mouse.row);
        let now = Instant::now();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let owner = match self.shell.session.windows.pointer_down(p) {
                    Some((id, HitRegion::Content)) => Some(id),
                    Some(_) => return,
                    None => None,
                };
                let action = self.rendered.action_at(mouse.column, mouse.row, owner.as_deref()).cloned();
                if let Some(action) = action {
                    tracing::debug!(?action, "span clicked");
                    self.shell.activate(&action, now);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.shell.session.windows.pointer_move(p),
            MouseEventKind::Up(MouseButton::Left) => self.shell.session.windows.pointer_up(),
            MouseEventKind::ScrollUp => self.scroll(p, -WHEEL_STEP),
            MouseEventKind::ScrollDown => self.scroll(p, WHEEL_STEP),
            _ => {}
        }
    }

    /// Wheel over a window scrolls it; anywhere else scrolls the log.
    fn scroll(&mut self, p: Point, delta: i32) {
        let windows = &mut self.shell.session.windows;
        if let Some(id) = windows.window_at(p).map(|w| w.id.clone()) {
            windows.scroll(&id, delta);
            return;
        }
        // Log scroll counts up from the bottom, so the wheel runs the other way.
        self.log_scroll = if delta < 0 {
            self.log_scroll.saturating_add(delta.unsigned_abs() as usize)
        } else {
            self.log_scroll.saturating_sub(delta as usize)
        };
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(DisableMouseCapture);
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => future::pending().await,
    }
}

/// Map a crossterm key to a prompt key.
pub fn convert_key(key: KeyEvent) -> Option<KeyInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyInput::CtrlC),
            KeyCode::Char('l') => Some(KeyInput::CtrlL),
            KeyCode::Char('d') => Some(KeyInput::CtrlD),
            KeyCode::Char('w') => Some(KeyInput::CtrlW),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}
