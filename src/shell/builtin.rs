//! Built-in commands
//!
//! Registration order is the completion order: Tab and the ghost text both
//! pick the first command that matches.

use std::time::Duration;

use crate::theme;

use super::markup::{lines, Line, Span};
use super::registry::CommandRegistry;
use super::session::{Deferred, Session, OPEN_DELAY};

/// Bare-mode messages appear this long after `rm -rf src`.
const RUIN_FIRST: Duration = Duration::from_millis(200);
const RUIN_SECOND: Duration = Duration::from_millis(1200);

/// Register every built-in command.
pub fn register_all(registry: &mut CommandRegistry<Session>) {
    registry.register("help", help);
    registry.register("about", about);
    registry.register("projects", projects_cmd);
    registry.register("whoami", whoami);
    registry.register("education", education);
    registry.register("skills", skills);
    registry.register("banner", banner);
    registry.register("clear", clear);
    registry.register("resume", resume);
    registry.register("linkedin", linkedin);
    registry.register("github", github);
    registry.register("email", email);
    registry.register("ls", ls);
    registry.register("sudo", sudo);
    registry.register("rm", rm);
    registry.register("repo", repo);
    registry.register("theme", theme_cmd);
}

/// A one-line answer followed by a spacer.
fn say(s: &mut Session, text: impl Into<String>) {
    s.write(vec![Line::plain(text), Line::blank()]);
}

fn help(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "maybe restarting your browser will fix this.");
    }
    let out = s.content().help();
    s.write(out);
}

fn banner(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, format!("Welcome to Webterm v{}", env!("CARGO_PKG_VERSION")));
    }
    let out = s.content().banner(s.is_narrow());
    s.write(out);
}

fn clear(s: &mut Session, _args: &[String]) {
    s.output.clear();
}

fn whoami(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        let name = s.config().username.clone();
        return say(s, name);
    }
    let out = s.content().whoami();
    s.write(out);
}

fn about(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "Nothing to see here.");
    }
    let out = s.content().about();
    s.write(out);
}

fn education(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "Stay in school.");
    }
    let out = s.content().education();
    s.write(out);
}

fn skills(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "Skill issue.");
    }
    let out = s.content().skills();
    s.write(out);
}

fn repo(s: &mut Session, _args: &[String]) {
    say(s, "Redirecting to github.com...");
    let link = s.config().repo_link.clone();
    s.defer(OPEN_DELAY, Deferred::OpenLink(link));
}

fn github(s: &mut Session, _args: &[String]) {
    say(s, "Opening GitHub...");
    let link = s.config().social.github.clone();
    s.defer(OPEN_DELAY, Deferred::OpenLink(link));
}

fn linkedin(s: &mut Session, _args: &[String]) {
    let link = s.config().social.linkedin.clone();
    s.write(vec![Line::plain("LinkedIn: ").push(Span::link(link.clone(), link)), Line::blank()]);
}

fn email(s: &mut Session, _args: &[String]) {
    let address = s.config().social.email.clone();
    let target = format!("mailto:{}", address);
    s.write(vec![Line::plain("Email: ").push(Span::link(address, target)), Line::blank()]);
}

fn projects_cmd(s: &mut Session, args: &[String]) {
    if s.is_degraded() {
        return say(s, "I don't want you to break the other projects.");
    }
    let gui = args.iter().any(|a| a == "--gui");
    if !s.is_narrow() && !gui {
        s.open_explorer();
        return say(s, "Opening Project Explorer...");
    }
    let out = s.content().projects();
    s.write(out);
}

fn resume(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "resume not found.");
    }
    if s.is_narrow() {
        say(s, "Opening resume...");
        let link = s.config().resume.clone();
        s.defer(OPEN_DELAY, Deferred::OpenLink(link));
        return;
    }
    s.spawn_resume_probe();
}

fn sudo(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return say(s, "no.");
    }
    s.begin_challenge();
}

fn ls(s: &mut Session, _args: &[String]) {
    if s.is_degraded() {
        return s.write(vec![Line::blank(), Line::blank()]);
    }
    if s.privilege.is_privileged() {
        say(s, "src");
    } else {
        s.write(vec![Line::error("Permission not granted."), Line::blank()]);
    }
}

fn rm(s: &mut Session, args: &[String]) {
    let rf = args.iter().any(|a| a == "-rf");
    let src = args.iter().any(|a| a == "src");
    if s.is_degraded() {
        if rf && src {
            return say(s, "there's no more src folder.");
        }
        return say(s, "don't try again.");
    }
    if !s.privilege.is_privileged() {
        return s.write(vec![Line::error("Permission not granted."), Line::blank()]);
    }
    if !rf {
        let usage = Line::plain("Usage: ").push(Span::command("'rm -rf <dir>'"));
        return s.write(vec![usage, Line::blank()]);
    }
    if !src {
        return s.write(vec![
            Line::blank(),
            Line::error("Directory not found."),
            Line::plain("type ").push(Span::clickable("'ls'", "ls")).push(Span::plain(" for a list of directories.")),
            Line::blank(),
        ]);
    }
    s.privilege.enter_degraded();
    s.output.clear();
    s.write_after(RUIN_FIRST, lines(&["What made you think that was a good idea?", ""]));
    s.write_after(RUIN_SECOND, lines(&["Now everything is ruined.", ""]));
}

fn theme_cmd(s: &mut Session, args: &[String]) {
    let Some(name) = args.first() else {
        return s.write(theme::theme_help());
    };
    if s.set_theme(name) {
        say(s, format!("Theme switched to {}", name));
    } else {
        let mut out = vec![Line::plain(format!("Theme '{}' not found.", name)), Line::blank()];
        out.extend(theme::theme_help());
        s.write(out);
    }
}
