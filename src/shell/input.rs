//! Line-input state machine
//!
//! Owns the edit buffer, the caret, the history ring and the inline
//! suggestion. Frontends translate their key events into [`KeyInput`] and
//! act on the returned [`InputOutcome`]; nothing here touches the terminal.

use super::completer;

/// Keys the prompt understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    CtrlC,
    CtrlL,
    CtrlD,
    CtrlW,
}

/// What the frontend should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Buffer or caret changed; re-render the prompt.
    Edited,
    /// Enter pressed; the raw line is handed over and the buffer is empty.
    Submit(String),
    /// Ctrl+C with the abandoned line.
    Interrupt(String),
    Clear,
    Quit,
    CloseWindow,
    Ignored,
}

/// Edit buffer with a char-indexed caret.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_pos(&self, char_idx: usize) -> usize {
        self.text.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.text.len())
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let pos = self.byte_pos(self.cursor);
        self.text.insert(pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let pos = self.byte_pos(self.cursor);
        self.text.remove(pos);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let pos = self.byte_pos(self.cursor);
        self.text.remove(pos);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor < self.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Replace the text; the caret goes to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.len();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the caret, clamped into `0..=len`.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.len());
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.len()
    }
}

/// Chronological, append-only record of submitted lines.
///
/// `index == len()` means the buffer is live; anything lower means the user
/// is browsing and `draft` holds what they were typing.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
    draft: String,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission (blank ones included) and return to live editing.
    pub fn push(&mut self, line: String) {
        self.entries.push(line);
        self.index = self.entries.len();
    }

    /// Step back. Returns the text to load, or `None` at the oldest entry.
    pub fn up(&mut self, current: &str) -> Option<&str> {
        if self.index == self.entries.len() {
            self.draft = current.to_string();
        }
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].as_str())
    }

    /// Step forward. Past the newest entry the draft comes back.
    pub fn down(&mut self) -> Option<&str> {
        if self.index == self.entries.len() {
            return None;
        }
        self.index += 1;
        if self.index == self.entries.len() {
            Some(self.draft.as_str())
        } else {
            Some(self.entries[self.index].as_str())
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Render model of the prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub before: String,
    /// Glyph under the caret; a space when the caret is past the end.
    pub at: char,
    pub after: String,
    pub ghost: Option<String>,
}

pub struct InputState {
    buffer: LineBuffer,
    history: History,
    commands: Vec<String>,
}

impl InputState {
    /// `commands` in registration order; both completion flavors walk it.
    pub fn new(commands: Vec<String>) -> Self {
        Self { buffer: LineBuffer::new(), history: History::new(), commands }
    }

    pub fn set_commands(&mut self, commands: Vec<String>) {
        self.commands = commands;
    }

    pub fn handle_key(&mut self, key: KeyInput) -> InputOutcome {
        match key {
            KeyInput::Char(c) => {
                self.buffer.insert(c);
                InputOutcome::Edited
            }
            KeyInput::Enter => {
                let line = self.buffer.as_str().to_string();
                self.history.push(line.clone());
                self.buffer.clear();
                InputOutcome::Submit(line)
            }
            KeyInput::Backspace => edited(self.buffer.backspace()),
            KeyInput::Delete => edited(self.buffer.delete()),
            KeyInput::Tab => {
                let current = self.buffer.as_str();
                let found = completer::tab_complete(self.commands.iter().map(String::as_str), current)
                    .map(str::to_string);
                match found {
                    Some(name) => {
                        self.buffer.set_text(name);
                        InputOutcome::Edited
                    }
                    None => InputOutcome::Ignored,
                }
            }
            KeyInput::Esc => {
                self.buffer.clear();
                InputOutcome::Edited
            }
            KeyInput::Left => edited(self.buffer.move_left()),
            KeyInput::Right => {
                if let Some(name) = self.suggestion().map(str::to_string) {
                    self.buffer.set_text(name);
                    return InputOutcome::Edited;
                }
                edited(self.buffer.move_right())
            }
            KeyInput::Up => {
                let current = self.buffer.as_str().to_string();
                match self.history.up(&current).map(str::to_string) {
                    Some(line) => {
                        self.buffer.set_text(line);
                        InputOutcome::Edited
                    }
                    None => InputOutcome::Ignored,
                }
            }
            KeyInput::Down => match self.history.down().map(str::to_string) {
                Some(line) => {
                    self.buffer.set_text(line);
                    InputOutcome::Edited
                }
                None => InputOutcome::Ignored,
            },
            KeyInput::Home => {
                self.buffer.move_home();
                InputOutcome::Edited
            }
            KeyInput::End => {
                self.buffer.move_end();
                InputOutcome::Edited
            }
            KeyInput::CtrlC => {
                let line = self.buffer.as_str().to_string();
                self.buffer.clear();
                InputOutcome::Interrupt(line)
            }
            KeyInput::CtrlL => InputOutcome::Clear,
            KeyInput::CtrlD if self.buffer.is_empty() => InputOutcome::Quit,
            KeyInput::CtrlD => edited(self.buffer.delete()),
            KeyInput::CtrlW => InputOutcome::CloseWindow,
        }
    }

    /// The full command name the ghost text would complete to.
    pub fn suggestion(&self) -> Option<&str> {
        completer::suggest(
            self.commands.iter().map(String::as_str),
            self.buffer.as_str(),
            self.buffer.cursor(),
        )
    }

    pub fn view(&self) -> LineView {
        let chars: Vec<char> = self.buffer.as_str().chars().collect();
        let cursor = self.buffer.cursor();
        let before: String = chars[..cursor].iter().collect();
        let (at, after) = match chars.get(cursor) {
            Some(&c) => (c, chars[cursor + 1..].iter().collect()),
            None => (' ', String::new()),
        };
        let ghost = self
            .suggestion()
            .map(|s| completer::ghost_suffix(s, self.buffer.as_str()))
            .filter(|g| !g.is_empty());
        LineView { before, at, after, ghost }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.buffer.set_text(value);
    }

    pub fn value(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.buffer.set_cursor(cursor);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

fn edited(changed: bool) -> InputOutcome {
    if changed {
        InputOutcome::Edited
    } else {
        InputOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> InputState {
        InputState::new(
            ["help", "about", "projects", "whoami", "resume", "repo"].iter().map(|s| s.to_string()).collect(),
        )
    }

    fn type_str(input: &mut InputState, s: &str) {
        for c in s.chars() {
            input.handle_key(KeyInput::Char(c));
        }
    }

    fn submit(input: &mut InputState, s: &str) {
        input.set_value(s);
        input.handle_key(KeyInput::Enter);
    }

    #[test]
    fn test_line_buffer_unicode_editing() {
        let mut buf = LineBuffer::new();
        for c in "héllo".chars() {
            buf.insert(c);
        }
        buf.move_left();
        buf.move_left();
        buf.insert('X');
        assert_eq!(buf.as_str(), "hélXlo");
        assert!(buf.backspace());
        assert!(buf.delete());
        assert_eq!(buf.as_str(), "hélo");
        buf.move_home();
        assert!(!buf.backspace());
        buf.set_cursor(99);
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn test_submit_pushes_history_and_clears() {
        let mut input = state();
        type_str(&mut input, "help");
        assert_eq!(input.handle_key(KeyInput::Enter), InputOutcome::Submit("help".to_string()));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.history_len(), 1);
        assert_eq!(input.history_index(), 1);

        // Blank submissions are recorded too.
        assert_eq!(input.handle_key(KeyInput::Enter), InputOutcome::Submit(String::new()));
        assert_eq!(input.history_len(), 2);
        assert_eq!(input.history_index(), 2);
    }

    #[test]
    fn test_history_up_down_restores_draft() {
        let mut input = state();
        submit(&mut input, "one");
        submit(&mut input, "two");
        type_str(&mut input, "dra");

        input.handle_key(KeyInput::Up);
        assert_eq!(input.value(), "two");
        input.handle_key(KeyInput::Up);
        assert_eq!(input.value(), "one");
        assert_eq!(input.handle_key(KeyInput::Up), InputOutcome::Ignored);
        assert_eq!(input.value(), "one");

        input.handle_key(KeyInput::Down);
        assert_eq!(input.value(), "two");
        input.handle_key(KeyInput::Down);
        assert_eq!(input.value(), "dra");
        assert_eq!(input.history_index(), 2);
        assert_eq!(input.handle_key(KeyInput::Down), InputOutcome::Ignored);
    }

    #[test]
    fn test_history_up_on_empty_history() {
        let mut input = state();
        type_str(&mut input, "x");
        assert_eq!(input.handle_key(KeyInput::Up), InputOutcome::Ignored);
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn test_tab_completion() {
        let mut input = state();
        type_str(&mut input, "pr");
        input.handle_key(KeyInput::Tab);
        assert_eq!(input.value(), "projects");

        input.set_value("PR");
        assert_eq!(input.handle_key(KeyInput::Tab), InputOutcome::Ignored);
        assert_eq!(input.value(), "PR");

        // Empty buffer matches the first command.
        input.set_value("");
        input.handle_key(KeyInput::Tab);
        assert_eq!(input.value(), "help");
    }

    #[test]
    fn test_right_accepts_suggestion_at_end_only() {
        let mut input = state();
        type_str(&mut input, "Wh");
        assert_eq!(input.suggestion(), Some("whoami"));
        input.handle_key(KeyInput::Right);
        assert_eq!(input.value(), "whoami");
        assert_eq!(input.cursor(), 6);

        input.set_value("abo");
        input.handle_key(KeyInput::Left);
        assert_eq!(input.suggestion(), None);
        input.handle_key(KeyInput::Right);
        assert_eq!(input.value(), "abo");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_view_cursor_and_ghost() {
        let mut input = state();
        type_str(&mut input, "re");
        assert_eq!(
            input.view(),
            LineView { before: "re".into(), at: ' ', after: String::new(), ghost: Some("sume".into()) }
        );

        input.handle_key(KeyInput::Home);
        assert_eq!(
            input.view(),
            LineView { before: String::new(), at: 'r', after: "e".into(), ghost: None }
        );

        input.set_value("");
        assert_eq!(input.view().ghost, None);
        assert_eq!(input.view().at, ' ');
    }

    #[test]
    fn test_ctrl_keys() {
        let mut input = state();
        type_str(&mut input, "abc");
        assert_eq!(input.handle_key(KeyInput::CtrlC), InputOutcome::Interrupt("abc".into()));
        assert_eq!(input.value(), "");
        assert_eq!(input.history_len(), 0);
        assert_eq!(input.handle_key(KeyInput::CtrlL), InputOutcome::Clear);
        assert_eq!(input.handle_key(KeyInput::CtrlW), InputOutcome::CloseWindow);
        assert_eq!(input.handle_key(KeyInput::CtrlD), InputOutcome::Quit);
        type_str(&mut input, "x");
        assert_ne!(input.handle_key(KeyInput::CtrlD), InputOutcome::Quit);
        type_str(&mut input, "yz");
        input.handle_key(KeyInput::Esc);
        assert_eq!(input.value(), "");
    }
}
