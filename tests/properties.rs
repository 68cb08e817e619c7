//! Property-based tests for the prompt history and the window manager.
//!
//! Invariants must hold for arbitrary submissions and pointer gestures.

use proptest::prelude::*;
use webterm::desktop::{Chrome, Point, Size, WindowManager, MAX_SIZE, MIN_SIZE};
use webterm::shell::input::{InputOutcome, InputState, KeyInput};

const COMMANDS: &[&str] = &["help", "about", "projects", "resume", "repo", "rm"];

/// Generate random printable characters for input.
fn printable_char() -> impl Strategy<Value = char> {
    prop::char::range(' ', '~')
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(printable_char(), 0..12).prop_map(|cs| cs.into_iter().collect())
}

fn input() -> InputState {
    InputState::new(COMMANDS.iter().map(|s| s.to_string()).collect())
}

fn type_line(state: &mut InputState, line: &str) {
    for c in line.chars() {
        state.handle_key(KeyInput::Char(c));
    }
}

fn submit(state: &mut InputState, line: &str) -> InputOutcome {
    type_line(state, line);
    state.handle_key(KeyInput::Enter)
}

const VIEWPORT: Size = Size::new(1600, 1000);

fn desktop_with_window() -> WindowManager {
    let mut wm = WindowManager::new(VIEWPORT, Chrome::default());
    wm.open("w1", "One", Vec::new(), None);
    wm
}

proptest! {
    /// Every submission grows history by one and returns to live editing.
    #[test]
    fn prop_submissions_extend_history(lines in prop::collection::vec(line_strategy(), 1..20)) {
        let mut state = input();
        for (n, line) in lines.iter().enumerate() {
            let outcome = submit(&mut state, line);
            prop_assert_eq!(outcome, InputOutcome::Submit(line.clone()));
            prop_assert_eq!(state.history_len(), n + 1);
            prop_assert_eq!(state.history_index(), state.history_len());
            prop_assert_eq!(state.value(), "");
        }
    }

    /// `k` Up presses load `history[L - k]`, bottoming out at the oldest entry.
    #[test]
    fn prop_up_walks_back_to_oldest(lines in prop::collection::vec(line_strategy(), 1..10), k in 1usize..15) {
        let mut state = input();
        for line in &lines {
            submit(&mut state, line);
        }
        for _ in 0..k {
            state.handle_key(KeyInput::Up);
        }
        let expected = &lines[lines.len().saturating_sub(k)];
        prop_assert_eq!(state.value(), expected.as_str());
    }

    /// Up then Down gives back exactly what was being typed.
    #[test]
    fn prop_up_down_restores_draft(lines in prop::collection::vec(line_strategy(), 0..6), draft in line_strategy()) {
        let mut state = input();
        for line in &lines {
            submit(&mut state, line);
        }
        type_line(&mut state, &draft);
        state.handle_key(KeyInput::Up);
        state.handle_key(KeyInput::Down);
        prop_assert_eq!(state.value(), draft.as_str());
        prop_assert_eq!(state.history_index(), state.history_len());
    }

    /// The caret never leaves the buffer.
    #[test]
    fn prop_cursor_stays_in_buffer(keys in prop::collection::vec(prop_oneof![
        4 => printable_char().prop_map(KeyInput::Char),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
    ], 0..60)) {
        let mut state = input();
        for key in keys {
            state.handle_key(key);
            prop_assert!(state.cursor() <= state.value().chars().count());
        }
    }

    /// Re-opening an id never duplicates it and always puts it on top.
    #[test]
    fn prop_reopen_raises_without_duplicating(extra in 1usize..6, pick in 0usize..6) {
        let mut wm = WindowManager::new(VIEWPORT, Chrome::default());
        for i in 0..=extra {
            wm.open(&format!("w{}", i), "w", Vec::new(), None);
        }
        let id = format!("w{}", pick % (extra + 1));
        let before = wm.len();
        wm.open(&id, "again", Vec::new(), None);
        prop_assert_eq!(wm.len(), before);
        let z = wm.get(&id).map(|w| w.z_index).unwrap_or_default();
        for w in wm.windows_by_z() {
            if w.id != id {
                prop_assert!(z > w.z_index);
            }
        }
    }

    /// Dragging keeps the window fully inside the viewport.
    #[test]
    fn prop_drag_stays_in_viewport(dx in -3000i32..3000, dy in -3000i32..3000) {
        let mut wm = desktop_with_window();
        let start = Point::new(110, 55);
        wm.pointer_down(start);
        wm.pointer_move(Point::new(start.x + dx, start.y + dy));
        wm.pointer_up();

        let g = wm.get("w1").map(|w| w.geometry).unwrap_or_default();
        prop_assert!(g.x >= 0 && g.x <= VIEWPORT.width - g.width);
        prop_assert!(g.y >= 0 && g.y <= VIEWPORT.height - g.height);
        if dx > VIEWPORT.width {
            prop_assert_eq!(g.x, VIEWPORT.width - g.width);
        }
        prop_assert_eq!((g.width, g.height), (600, 400));
    }

    /// Resizing stays between the floor and the ceiling and never moves the window.
    #[test]
    fn prop_resize_is_clamped(dx in -2000i32..2000, dy in -2000i32..2000) {
        let mut wm = desktop_with_window();
        let handle = Point::new(100 + 600 - 4, 50 + 400 - 4);
        wm.pointer_down(handle);
        wm.pointer_move(Point::new(handle.x + dx, handle.y + dy));
        wm.pointer_up();

        let g = wm.get("w1").map(|w| w.geometry).unwrap_or_default();
        prop_assert_eq!(g.width, (600 + dx).clamp(MIN_SIZE.width, MAX_SIZE.width));
        prop_assert_eq!(g.height, (400 + dy).clamp(MIN_SIZE.height, MAX_SIZE.height));
        prop_assert_eq!((g.x, g.y), (100, 50));
    }
}
