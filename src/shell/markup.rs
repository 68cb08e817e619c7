//! Markup lines
//!
//! Everything the shell prints, and everything a window displays, is a
//! sequence of [`Line`]s. A line is a run of styled [`Span`]s; spans can
//! carry an [`Action`] so that clicking them runs a command or opens a link.

use colored::Colorize;

/// Visual role of a span. Frontends map tones to palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Plain,
    /// Command names and other highlighted tokens.
    Command,
    /// Key hints such as `[Tab]`.
    Keys,
    Link,
    Banner,
    /// Denials and failures.
    Error,
    Muted,
    /// Prompt punctuation (`:~$`).
    Prompt,
    /// Prompt user name.
    User,
    /// Prompt host name.
    Host,
    /// Echoed user input.
    Echo,
    /// The caret cell of the live prompt.
    Cursor,
}

/// What happens when a span is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a shell command as if it had been typed.
    Run(String),
    /// Open an external link.
    Open(String),
    /// Open the viewer window for the named project.
    Project(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
    pub action: Option<Action>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::tone(text, Tone::Plain)
    }

    pub fn tone(text: impl Into<String>, tone: Tone) -> Self {
        Self { text: text.into(), tone, action: None }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self::tone(text, Tone::Command)
    }

    pub fn keys(text: impl Into<String>) -> Self {
        Self::tone(text, Tone::Keys)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::tone(text, Tone::Error)
    }

    /// A command token that runs `command` when clicked.
    pub fn clickable(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self { text: label.into(), tone: Tone::Command, action: Some(Action::Run(command.into())) }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { text: label.into(), tone: Tone::Link, action: Some(Action::Open(url.into())) }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }
}

/// One row of output. An empty line is a blank spacer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self { spans: vec![Span::plain(text)] }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { spans: vec![Span::error(text)] }
    }

    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Builder-style append.
    pub fn push(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Concatenated text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Render with ANSI colors for line-mode output.
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let text = span.text.as_str();
            let styled = match span.tone {
                Tone::Plain | Tone::Echo => text.normal(),
                Tone::Command => text.green(),
                Tone::Keys => text.yellow(),
                Tone::Link => text.cyan().underline(),
                Tone::Banner => text.bright_cyan(),
                Tone::Error => text.red(),
                Tone::Muted => text.bright_black(),
                Tone::Prompt => text.white(),
                Tone::User => text.bright_magenta(),
                Tone::Host => text.bright_blue(),
                Tone::Cursor => text.reversed(),
            };
            out.push_str(&styled.to_string());
        }
        out
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::plain(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::plain(text)
    }
}

/// Shorthand for a plain-text line list; `""` entries become spacers.
pub fn lines(texts: &[&str]) -> Vec<Line> {
    texts.iter().map(|t| if t.is_empty() { Line::blank() } else { Line::plain(*t) }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_concatenates_spans() {
        let line = Line::plain("Type ").push(Span::clickable("'help'", "help")).push(Span::plain("."));
        assert_eq!(line.text(), "Type 'help'.");
        assert_eq!(line.spans[1].action, Some(Action::Run("help".to_string())));
    }

    #[test]
    fn test_blank_lines() {
        assert!(Line::blank().is_blank());
        assert!(Line::plain("").is_blank());
        assert!(!Line::plain("x").is_blank());
        let out = lines(&["", "a", ""]);
        assert!(out[0].is_blank());
        assert_eq!(out[1].text(), "a");
    }

    #[test]
    fn test_to_ansi_keeps_text() {
        colored::control::set_override(false);
        let line = Line::from_spans(vec![Span::command("ls"), Span::plain(" done")]);
        assert_eq!(line.to_ansi(), "ls done");
    }
}
