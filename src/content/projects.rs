//! Project explorer and project viewer windows

use crate::config::Project;
use crate::desktop::{OpenResult, Size, WindowOpener};
use crate::shell::markup::{Line, Span, Tone};

use super::ContentSource;

pub const EXPLORER_ID: &str = "project-explorer";
const EXPLORER_TITLE: &str = "Project Explorer";

/// What opening a project led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOpen {
    Window(OpenResult),
    /// Narrow viewport: the caller should open this link instead.
    Link(String),
    /// Narrow viewport and nothing to open.
    NoLink,
    /// The link is not `https://`.
    Refused,
}

pub fn open_explorer(content: &dyn ContentSource, opener: &mut dyn WindowOpener) -> OpenResult {
    opener.open_window(EXPLORER_ID, EXPLORER_TITLE, content.explorer(), None)
}

pub fn window_id(project: &Project) -> String {
    format!("proj-{}", project.name)
}

pub fn open_project(project: &Project, opener: &mut dyn WindowOpener) -> ProjectOpen {
    if !project.link.is_empty() && !project.link.starts_with("https://") {
        tracing::warn!(link = %project.link, "blocked insecure or invalid project link");
        return ProjectOpen::Refused;
    }
    if opener.is_narrow() {
        if project.link.is_empty() {
            return ProjectOpen::NoLink;
        }
        return ProjectOpen::Link(project.link.clone());
    }
    let size = Some(Size::new(700, 500));
    ProjectOpen::Window(opener.open_window(&window_id(project), &project.name, viewer(project), size))
}

fn is_video(src: &str) -> bool {
    let lower = src.to_lowercase();
    lower.ends_with(".mp4") || lower.ends_with(".webm")
}

/// Body of a project window: description, link, then the media list.
pub fn viewer(project: &Project) -> Vec<Line> {
    let mut out = vec![Line::blank()];
    if !project.description.is_empty() {
        out.push(Line::plain(project.description.clone()));
        out.push(Line::blank());
    }
    if !project.link.is_empty() {
        out.push(Line::plain("Link: ").push(Span::link(project.link.clone(), project.link.clone())));
        out.push(Line::blank());
    }

    let media = project.video.iter().map(|v| ("video", v)).chain(
        project.screenshots.iter().map(|s| (if is_video(s) { "video" } else { "image" }, s)),
    );
    let mut media = media.peekable();
    if media.peek().is_none() {
        out.push(Line::from_spans(vec![Span::tone("No media. Open the link to view the project.", Tone::Muted)]));
        return out;
    }
    out.push(Line::plain("Media:"));
    for (idx, (kind, src)) in media.enumerate() {
        out.push(
            Line::plain(format!("  {}. ", idx + 1))
                .push(Span::keys(format!("[{}]", kind)))
                .push(Span::plain(" "))
                .push(Span::link(src.clone(), src.clone())),
        );
    }
    out
}
