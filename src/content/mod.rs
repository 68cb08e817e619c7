//! Text content behind the informational commands
//!
//! The shell only needs "a list of lines" from each generator; where the
//! lines come from is behind [`ContentSource`]. [`Portfolio`] builds them
//! from the configuration.

pub mod projects;

use crate::config::{Config, Project};
use crate::shell::markup::{Action, Line, Span, Tone};

/// Column where help descriptions and about links start.
const PAD_COLUMN: usize = 17;

/// Commands `help` documents, with their one-line descriptions.
const DOCUMENTED: &[(&str, &str)] = &[
    ("about", "Who am I?"),
    ("education", "Academic background."),
    ("skills", "Technical proficiency."),
    ("projects", "View my work."),
    ("resume", "View my resume."),
    ("whoami", "Current user."),
    ("sudo", "???"),
    ("repo", "View the Github Repository."),
    ("banner", "Display the banner."),
    ("clear", "Clear the terminal."),
    ("theme", "Change the color theme."),
];

pub trait ContentSource {
    fn help(&self) -> Vec<Line>;
    /// Greeting art; `narrow` selects the small variant when one exists.
    fn banner(&self, narrow: bool) -> Vec<Line>;
    fn about(&self) -> Vec<Line>;
    fn education(&self) -> Vec<Line>;
    fn skills(&self) -> Vec<Line>;
    fn whoami(&self) -> Vec<Line>;
    /// Plain listing of every project.
    fn projects(&self) -> Vec<Line>;
    /// Body of the project explorer window.
    fn explorer(&self) -> Vec<Line>;
    fn project(&self, name: &str) -> Option<Project>;
}

fn pad(label: &str) -> String {
    " ".repeat(PAD_COLUMN.saturating_sub(label.chars().count()))
}

pub struct Portfolio {
    config: Config,
}

impl Portfolio {
    pub fn new(config: &Config) -> Self {
        Self { config: config.clone() }
    }
}

impl ContentSource for Portfolio {
    fn help(&self) -> Vec<Line> {
        let mut out = vec![Line::blank()];
        for (name, desc) in DOCUMENTED {
            let label = format!("'{}'", name);
            out.push(
                Line::plain("  ")
                    .push(Span::clickable(label.clone(), *name))
                    .push(Span::plain(pad(&label)))
                    .push(Span::plain(*desc)),
            );
        }
        out.push(Line::blank());
        out.push(Line::plain("Press ").push(Span::keys("[Tab]")).push(Span::plain(" for auto completion.")));
        out.push(Line::plain("Press ").push(Span::keys("[Esc]")).push(Span::plain(" to clear the input line.")));
        out.push(
            Line::plain("Press ")
                .push(Span::keys("[↑][↓]"))
                .push(Span::plain(" to scroll through your history of commands.")),
        );
        out.push(Line::blank());
        out
    }

    fn banner(&self, narrow: bool) -> Vec<Line> {
        let art = if narrow && !self.config.ascii_mobile.is_empty() {
            &self.config.ascii_mobile
        } else {
            &self.config.ascii
        };
        let mut out = vec![Line::blank()];
        out.extend(art.iter().map(|row| Line::from_spans(vec![Span::tone(row.clone(), Tone::Banner)])));
        out.push(Line::blank());
        out.push(Line::plain(format!("Welcome to Webterm v{}", env!("CARGO_PKG_VERSION"))));
        out.push(
            Line::plain("Type ")
                .push(Span::clickable("'help'", "help"))
                .push(Span::plain(" for a list of all available commands.")),
        );
        out.push(
            Line::plain("Type ")
                .push(Span::clickable("'repo'", "repo"))
                .push(Span::plain(" to view the GitHub repository or click "))
                .push(Span::link("here", self.config.repo_link.clone()))
                .push(Span::plain(".")),
        );
        out.push(Line::blank());
        out
    }

    fn about(&self) -> Vec<Line> {
        let social = &self.config.social;
        let mut out = vec![Line::blank(), Line::plain(self.config.about_greeting.clone()), Line::blank()];
        for row in &self.config.about_summary {
            out.push(if row.is_empty() { Line::blank() } else { Line::plain(row.clone()) });
        }
        out.push(Line::blank());
        let rows = [
            ("Email", social.email.clone(), format!("mailto:{}", social.email)),
            ("Github", social.github.clone(), social.github.clone()),
            ("Linkedin", social.linkedin.clone(), social.linkedin.clone()),
        ];
        for (label, text, target) in rows {
            out.push(
                Line::plain("  ")
                    .push(Span::keys(label))
                    .push(Span::plain(pad(label)))
                    .push(Span::link(text, target)),
            );
        }
        out.push(Line::blank());
        out
    }

    fn education(&self) -> Vec<Line> {
        let mut out = vec![Line::blank()];
        for edu in &self.config.education {
            out.push(Line::plain("  ").push(Span::command(edu.degree.clone())));
            out.push(Line::plain(format!("    {}", edu.institution)));
            out.push(Line::plain(format!("    {}", edu.period)));
            out.push(Line::blank());
        }
        out
    }

    fn skills(&self) -> Vec<Line> {
        let skills = &self.config.skills;
        let categories = [
            ("Languages", &skills.languages),
            ("Web Technologies", &skills.web),
            ("AI/ML", &skills.ai_ml),
            ("Tools", &skills.tools),
        ];
        let mut out = vec![Line::blank()];
        for (label, items) in categories {
            if items.is_empty() {
                continue;
            }
            out.push(Line::plain("  ").push(Span::command(label)));
            out.extend(items.iter().map(|s| Line::plain(format!("    - {}", s))));
            out.push(Line::blank());
        }
        out
    }

    fn whoami(&self) -> Vec<Line> {
        vec![
            Line::blank(),
            Line::from_spans(vec![
                Span::tone(self.config.username.clone(), Tone::User),
                Span::tone("@", Tone::Prompt),
                Span::tone(self.config.hostname.clone(), Tone::Host),
            ]),
            Line::blank(),
        ]
    }

    fn projects(&self) -> Vec<Line> {
        let projects = &self.config.projects;
        let width = projects.iter().map(|p| p.name.chars().count()).max().unwrap_or(0) + 2;
        let mut out = vec![Line::blank()];
        for p in projects {
            let gap = width.saturating_sub(p.name.chars().count());
            out.push(
                Line::plain("  ")
                    .push(Span::link(p.name.clone(), p.link.clone()))
                    .push(Span::plain(" ".repeat(gap)))
                    .push(Span::plain(p.description.clone())),
            );
        }
        out.push(Line::blank());
        out.push(Line::plain(format!("{} File(s)", projects.len())));
        out.push(Line::blank());
        out
    }

    fn explorer(&self) -> Vec<Line> {
        let mut out = vec![Line::blank()];
        for p in &self.config.projects {
            out.push(
                Line::plain("  ▸ ")
                    .push(Span::command(p.name.clone()).with_action(Action::Project(p.name.clone()))),
            );
            if !p.description.is_empty() {
                out.push(Line::from_spans(vec![Span::tone(format!("    {}", p.description), Tone::Muted)]));
            }
        }
        out.push(Line::blank());
        out.push(Line::from_spans(vec![Span::tone("Click a project to open it.", Tone::Muted)]));
        out
    }

    fn project(&self, name: &str) -> Option<Project> {
        self.config.projects.iter().find(|p| p.name == name).cloned()
    }
}
