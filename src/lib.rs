//! webterm - a portfolio shell with a floating-window desktop
//!
//! The engine (command registry, prompt state machine, staggered output
//! log, window manager, privilege flags) is pure and driven by injected
//! instants. Two frontends sit on top:
//! - `tui`: full-screen ratatui UI with mouse-driven windows
//! - `plain`: rustyline REPL for dumb terminals and pipes

pub mod config;
pub mod content;
pub mod desktop;
pub mod launch;
pub mod logging;
pub mod plain;
pub mod shell;
pub mod task;
pub mod theme;
pub mod tui;

pub use shell::Shell;
