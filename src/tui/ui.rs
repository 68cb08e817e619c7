//! UI rendering
//!
//! Draws the shell log with the prompt as its last row, then the windows
//! back to front. Rendering records where every clickable span landed so
//! the runtime can map mouse presses back to actions.

use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span as TextSpan},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::desktop::Window;
use crate::shell::markup::{Action, Line, Span, Tone};
use crate::shell::Shell;
use crate::theme::{self, Palette};

const CLOSE_GLYPH: &str = "[x]";
const HANDLE_GLYPH: &str = "◢";

/// A clickable span on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub area: Rect,
    /// Window the span belongs to; `None` for the log.
    pub owner: Option<String>,
    pub action: Action,
}

/// What one frame produced besides pixels.
#[derive(Debug, Default)]
pub struct Rendered {
    pub hits: Vec<Hit>,
    /// How far the log can scroll back.
    pub max_scroll: usize,
}

impl Rendered {
    /// Top-most action at a cell, limited to `owner`.
    pub fn action_at(&self, col: u16, row: u16, owner: Option<&str>) -> Option<&Action> {
        self.hits
            .iter()
            .rev()
            .filter(|h| h.owner.as_deref() == owner)
            .find(|h| h.area.contains(Position { x: col, y: row }))
            .map(|h| &h.action)
    }
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, shell: &Shell, log_scroll: usize) -> Rendered {
    let palette = shell.session.palette();
    let area = frame.area();
    let mut out = Rendered::default();

    frame.render_widget(Block::default().style(Style::default().bg(color(&palette.background))), area);
    render_log(frame, shell, &palette, area, log_scroll, &mut out);

    let config = shell.session.config();
    let (cw, ch) = (config.cell_width.max(1), config.cell_height.max(1));
    for window in shell.session.windows.windows_by_z() {
        render_window(frame, window, &palette, area, (cw, ch), &mut out);
    }
    out
}

fn render_log(frame: &mut Frame, shell: &Shell, palette: &Palette, area: Rect, scroll: usize, out: &mut Rendered) {
    let mut rows: Vec<Line> = shell.session.output.entries().iter().map(|e| e.line.clone()).collect();
    rows.push(prompt_row(shell));

    let height = area.height as usize;
    out.max_scroll = rows.len().saturating_sub(height);
    let scroll = scroll.min(out.max_scroll);
    let start = rows.len().saturating_sub(height + scroll);

    let mut text = Vec::with_capacity(height);
    for (i, line) in rows.iter().skip(start).take(height).enumerate() {
        record_hits(line, area, area.y + i as u16, None, out);
        text.push(to_text_line(line, palette));
    }
    frame.render_widget(Paragraph::new(text), area);
}

/// The live prompt. While a password is asked for, the typed text is masked.
fn prompt_row(shell: &Shell) -> Line {
    if let Some(field) = shell.session.challenge() {
        return Line::plain("Password: ")
            .push(Span::tone("*".repeat(field.len()), Tone::Echo))
            .push(Span::tone(" ", Tone::Cursor));
    }
    let view = shell.input.view();
    let mut line = Line::from_spans(shell.session.prompt_spans())
        .push(Span::plain(" "))
        .push(Span::tone(view.before, Tone::Echo))
        .push(Span::tone(view.at.to_string(), Tone::Cursor))
        .push(Span::tone(view.after, Tone::Echo));
    if let Some(ghost) = view.ghost {
        line = line.push(Span::tone(ghost, Tone::Muted));
    }
    line
}

fn render_window(
    frame: &mut Frame,
    window: &Window,
    palette: &Palette,
    screen: Rect,
    (cw, ch): (i32, i32),
    out: &mut Rendered,
) {
    let g = window.geometry;
    let (col, cols) = cell_span(g.x, g.width, cw);
    let (row, rows) = cell_span(g.y, g.height, ch);
    let rect = Rect::new(to_u16(col), to_u16(row), to_u16(cols), to_u16(rows)).intersection(screen);
    if rect.width < 2 || rect.height < 2 {
        return;
    }

    let border = if palette.border.visible { color(&palette.border.color) } else { color(&palette.background) };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", window.title))
        .style(Style::default().bg(color(&palette.background)).fg(color(&palette.foreground)));
    let inner = block.inner(rect);

    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    let text: Vec<TextLine> = window
        .content
        .iter()
        .skip(window.scroll)
        .take(inner.height as usize)
        .enumerate()
        .map(|(i, line)| {
            record_hits(line, inner, inner.y + i as u16, Some(window.id.as_str()), out);
            to_text_line(line, palette)
        })
        .collect();
    frame.render_widget(Paragraph::new(text), inner);

    let close_x = rect.x + rect.width.saturating_sub(CLOSE_GLYPH.len() as u16);
    frame.render_widget(
        Paragraph::new(CLOSE_GLYPH).style(Style::default().fg(color(&palette.link.text))),
        Rect::new(close_x, rect.y, CLOSE_GLYPH.len() as u16, 1).intersection(rect),
    );
    frame.render_widget(
        Paragraph::new(HANDLE_GLYPH).style(Style::default().fg(border)),
        Rect::new(rect.x + rect.width - 1, rect.y + rect.height - 1, 1, 1),
    );
}

/// Cells whose centers fall inside `[start, start + len)` pixels.
///
/// Returns the first cell and the count. Pointer events are mapped to cell
/// centers, so the drawn window and the hit test agree.
pub fn cell_span(start: i32, len: i32, cell: i32) -> (i32, i32) {
    let first = first_cell(start, cell);
    let end = first_cell(start + len, cell);
    (first, (end - first).max(0))
}

fn first_cell(px: i32, cell: i32) -> i32 {
    (px - cell / 2 + cell - 1).div_euclid(cell)
}

fn to_u16(v: i32) -> u16 {
    u16::try_from(v.max(0)).unwrap_or(u16::MAX)
}

fn record_hits(line: &Line, area: Rect, y: u16, owner: Option<&str>, out: &mut Rendered) {
    let mut x = area.x;
    let right = area.x.saturating_add(area.width);
    for span in &line.spans {
        let width = span.text.width() as u16;
        if let Some(action) = &span.action {
            let visible = width.min(right.saturating_sub(x));
            if visible > 0 {
                out.hits.push(Hit {
                    area: Rect::new(x, y, visible, 1),
                    owner: owner.map(str::to_string),
                    action: action.clone(),
                });
            }
        }
        x = x.saturating_add(width);
        if x >= right {
            break;
        }
    }
}

fn to_text_line(line: &Line, palette: &Palette) -> TextLine<'static> {
    TextLine::from(
        line.spans
            .iter()
            .map(|s| TextSpan::styled(s.text.clone(), tone_style(s.tone, palette)))
            .collect::<Vec<_>>(),
    )
}

fn tone_style(tone: Tone, p: &Palette) -> Style {
    let fg = |hex: &str| Style::default().fg(color(hex));
    match tone {
        Tone::Plain => fg(&p.foreground),
        Tone::Echo => fg(&p.prompt.input),
        Tone::Command => fg(&p.commands.text_color),
        Tone::Keys => fg(&p.prompt.user).add_modifier(Modifier::BOLD),
        Tone::Cursor => Style::default().fg(color(&p.background)).bg(color(&p.prompt.input)),
        Tone::Link => fg(&p.link.text).add_modifier(Modifier::UNDERLINED),
        Tone::Banner => fg(&p.banner).add_modifier(Modifier::BOLD),
        Tone::Error => Style::default().fg(Color::Red),
        Tone::Muted => fg(&p.border.color),
        Tone::Prompt => fg(&p.prompt.default),
        Tone::User => fg(&p.prompt.user),
        Tone::Host => fg(&p.prompt.host),
    }
}

/// Palette hex to a terminal color. Bad values fall back to the terminal default.
pub fn color(hex: &str) -> Color {
    match theme::parse_hex(hex) {
        Ok((r, g, b)) => Color::Rgb(r, g, b),
        Err(_) => Color::Reset,
    }
}
