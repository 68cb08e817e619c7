//! Hand links to the desktop's opener

use std::io;
use std::process::{Command, Stdio};

use crate::shell::session::Effect;

pub fn open_url(url: &str) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    };

    command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null()).spawn()?;
    Ok(())
}

/// Carry out effects the shell asked for. Failures are logged, never fatal.
pub fn perform(effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::OpenLink(url) => {
                tracing::debug!(%url, "opening link");
                if let Err(e) = open_url(&url) {
                    tracing::warn!(%url, error = %e, "could not open link");
                }
            }
        }
    }
}
