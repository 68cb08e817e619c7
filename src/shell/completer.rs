//! Command-name completion
//!
//! Two flavors share the same command list: the inline suggestion (ghost
//! text), which matches case-insensitively, and Tab completion, which
//! matches the literal buffer. Both take the first match in registration
//! order. [`WebtermHelper`] exposes the same behavior to rustyline for
//! plain mode.

use std::borrow::Cow;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;
use unicode_width::UnicodeWidthStr;

/// Inline suggestion for `buffer` with the caret at char index `cursor`.
///
/// Only offered when the buffer is non-empty and the caret is at its end.
pub fn suggest<'a, I>(commands: I, buffer: &str, cursor: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    if buffer.is_empty() || cursor != buffer.chars().count() {
        return None;
    }
    let typed = buffer.to_lowercase();
    commands.into_iter().find(|name| name.to_lowercase().starts_with(&typed))
}

/// The part of `suggestion` past what has been typed.
pub fn ghost_suffix(suggestion: &str, buffer: &str) -> String {
    suggestion.chars().skip(buffer.chars().count()).collect()
}

/// Tab completion: first command starting with the raw buffer.
pub fn tab_complete<'a, I>(commands: I, buffer: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    commands.into_iter().find(|name| name.starts_with(buffer))
}

/// rustyline helper for plain mode.
pub struct WebtermHelper {
    commands: Vec<String>,
    /// When set, the line is drawn as `*` (password entry) and hints are off.
    pub masking: bool,
}

impl WebtermHelper {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands, masking: false }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}

impl Completer for WebtermHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        if self.masking {
            return Ok((pos, Vec::new()));
        }
        let candidates = tab_complete(self.names(), line)
            .map(|name| vec![Pair { display: name.to_string(), replacement: name.to_string() }])
            .unwrap_or_default();
        // Tab replaces the whole line, not just the word under the caret.
        Ok((0, candidates))
    }
}

impl Hinter for WebtermHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if self.masking || pos != line.len() {
            return None;
        }
        let cursor = line.chars().count();
        suggest(self.names(), line, cursor)
            .map(|name| ghost_suffix(name, line))
            .filter(|suffix| !suffix.is_empty())
    }
}

impl Highlighter for WebtermHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned("*".repeat(line.width()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint)) // Gray color
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

impl Validator for WebtermHelper {}

impl Helper for WebtermHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMANDS: &[&str] = &["help", "about", "projects", "resume", "repo", "rm"];

    fn names() -> impl Iterator<Item = &'static str> {
        COMMANDS.iter().copied()
    }

    #[test]
    fn test_suggest_first_match_case_insensitive() {
        assert_eq!(suggest(names(), "PR", 2), Some("projects"));
        assert_eq!(suggest(names(), "r", 1), Some("resume"));
        assert_eq!(suggest(names(), "rep", 3), Some("repo"));
    }

    #[test]
    fn test_suggest_requires_caret_at_end() {
        assert_eq!(suggest(names(), "pro", 1), None);
        assert_eq!(suggest(names(), "", 0), None);
        assert_eq!(suggest(names(), "xyz", 3), None);
    }

    #[test]
    fn test_ghost_suffix() {
        assert_eq!(ghost_suffix("projects", "PRo"), "jects");
        assert_eq!(ghost_suffix("help", "help"), "");
    }

    #[test]
    fn test_tab_complete_is_case_sensitive() {
        assert_eq!(tab_complete(names(), "pr"), Some("projects"));
        assert_eq!(tab_complete(names(), "PR"), None);
        assert_eq!(tab_complete(names(), "rm"), Some("rm"));
    }

    #[test]
    fn test_helper_hint_and_complete() {
        let helper = WebtermHelper::new(COMMANDS.iter().map(|s| s.to_string()).collect());
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(helper.hint("ab", 2, &ctx), Some("out".to_string()));
        assert_eq!(helper.hint("ab", 1, &ctx), None);
        let (start, candidates) = helper.complete("pro", 3, &ctx).unwrap();
        assert_eq!(start, 0);
        assert_eq!(candidates[0].replacement, "projects");
    }

    #[test]
    fn test_helper_masking_hides_input() {
        let mut helper = WebtermHelper::new(vec!["help".to_string()]);
        helper.masking = true;
        assert_eq!(helper.highlight("secret", 6), "******");
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(helper.hint("he", 2, &ctx), None);
    }
}
