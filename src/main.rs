//! webterm - portfolio shell in your terminal
//!
//! Usage:
//!   webterm                    Full-screen UI with windows
//!   webterm --plain            Line-mode REPL
//!   webterm --config PATH      Use a specific config file

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use webterm::config::Config;
use webterm::plain::{self, PLAIN_VIEWPORT};
use webterm::theme::ThemeStore;
use webterm::tui::Runtime;
use webterm::{logging, Shell};

/// Portfolio shell with a floating-window desktop
#[derive(Parser, Debug)]
#[command(name = "webterm")]
#[command(about = "Portfolio shell with a floating-window desktop, right in your terminal")]
#[command(version)]
struct Args {
    /// Line-mode REPL instead of the full-screen UI
    #[arg(long)]
    plain: bool,

    /// Config file (default: ~/.webterm/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file (default: ~/.webterm/webterm.log)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args
        .log
        .clone()
        .or_else(logging::default_log_path)
        .unwrap_or_else(|| PathBuf::from("webterm.log"));
    // Held until exit so buffered log lines get flushed.
    let log_guard = match logging::init(&log_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}: logging disabled: {:#}", "warning".yellow(), e);
            None
        }
    };

    // Config problems are reported before the terminal is taken over.
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "bad config");
            eprintln!("{}: {}", "error".red(), e);
            drop(log_guard);
            std::process::exit(1);
        }
    };
    let themes = ThemeStore::from_home();

    if args.plain {
        let shell = Shell::new(config, PLAIN_VIEWPORT, themes, Instant::now());
        return plain::run(shell);
    }

    // The runtime reports the real viewport as soon as it owns the terminal.
    let shell = Shell::new(config, PLAIN_VIEWPORT, themes, Instant::now());
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let runtime = Runtime::new(shell).context("setting up the terminal")?;
    rt.block_on(runtime.run())?;
    Ok(())
}
