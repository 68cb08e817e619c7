//! Line-mode REPL for dumb terminals and pipes
//!
//! Same shell, no windows: the viewport is reported as narrow, so commands
//! that would open a window print or open links instead. Staggered output
//! is drained by sleeping until each deadline.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::desktop::{Size, NARROW_WIDTH};
use crate::launch;
use crate::shell::completer::WebtermHelper;
use crate::shell::input::KeyInput;
use crate::shell::output::{AnchorId, EntryKind};
use crate::shell::session::Effect;
use crate::shell::Shell;

/// Viewport handed to the shell in line mode.
pub const PLAIN_VIEWPORT: Size = Size::new(NARROW_WIDTH, 800);

const PROBE_POLL: Duration = Duration::from_millis(100);

/// Prints log entries as they land. Echoes are skipped; the editor already
/// shows what was typed.
#[derive(Debug, Default)]
pub struct Printer {
    anchor: AnchorId,
    printed: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush(&mut self, shell: &Shell, out: &mut dyn Write) -> io::Result<()> {
        let log = &shell.session.output;
        if log.anchor() != self.anchor {
            self.anchor = log.anchor();
            self.printed = 0;
            write!(out, "\x1B[2J\x1B[1;1H")?;
        }
        for entry in log.entries().iter().skip(self.printed) {
            if entry.kind == EntryKind::Output {
                writeln!(out, "{}", entry.line.to_ansi())?;
            }
        }
        self.printed = log.entries().len();
        out.flush()
    }
}

/// Run timers until nothing is pending, printing as lines land.
fn drain(shell: &mut Shell, printer: &mut Printer) -> Result<()> {
    let stdout = io::stdout();
    loop {
        shell.advance(Instant::now());
        {
            let mut out = stdout.lock();
            printer.flush(shell, &mut out).context("writing output")?;
            for effect in shell.take_effects() {
                let Effect::OpenLink(url) = &effect;
                writeln!(out, "-> {}", url).context("writing output")?;
                launch::perform(vec![effect]);
            }
        }

        let wait = match shell.next_deadline() {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None if shell.has_pending_probes() => PROBE_POLL,
            None => return Ok(()),
        };
        thread::sleep(wait);
    }
}

pub fn run(mut shell: Shell) -> Result<()> {
    let mut editor: Editor<WebtermHelper, DefaultHistory> = Editor::new().context("starting line editor")?;
    editor.set_helper(Some(WebtermHelper::new(shell.command_names())));

    let mut printer = Printer::new();
    shell.start(Instant::now());
    drain(&mut shell, &mut printer)?;

    loop {
        let masking = shell.in_challenge();
        if let Some(helper) = editor.helper_mut() {
            helper.masking = masking;
        }
        let prompt = if masking { "Password: ".to_string() } else { format!("{} ", shell.session.prompt_text()) };

        match editor.readline(&prompt) {
            Ok(line) if masking => shell.submit_password(&line, Instant::now()),
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                shell.input.set_value(line);
                shell.handle_key(KeyInput::Enter, Instant::now());
            }
            Err(ReadlineError::Interrupted) => {
                shell.input.set_value("");
                shell.handle_key(KeyInput::CtrlC, Instant::now());
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading input"),
        }

        drain(&mut shell, &mut printer)?;
        if shell.should_exit {
            break;
        }
    }

    tracing::info!("plain session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::theme::ThemeStore;

    fn shell(now: Instant) -> Shell {
        Shell::new(Config::default(), PLAIN_VIEWPORT, ThemeStore::in_memory(), now)
    }

    #[test]
    fn test_printer_skips_echoes_and_reprints_nothing() {
        colored::control::set_override(false);
        let t0 = Instant::now();
        let mut shell = shell(t0);
        let mut printer = Printer::new();
        let mut out = Vec::new();

        shell.submit("ls", t0);
        shell.advance(t0 + Duration::from_secs(1));
        printer.flush(&shell, &mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("Permission not granted."));
        assert!(!text.contains(":~$ ls"));

        out.clear();
        printer.flush(&shell, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_printer_clears_screen_on_new_anchor() {
        let t0 = Instant::now();
        let mut shell = shell(t0);
        let mut printer = Printer::new();
        let mut out = Vec::new();

        shell.submit("clear", t0);
        printer.flush(&shell, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("\x1B[2J"));
    }

    #[test]
    fn test_plain_viewport_is_narrow() {
        let shell = shell(Instant::now());
        assert!(shell.session.is_narrow());
    }
}
