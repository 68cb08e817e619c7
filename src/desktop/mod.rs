//! Floating-window desktop
//!
//! Geometry is in pixels. The frontend converts its own units (terminal
//! cells) before calling in, so the size limits below hold exactly.

pub mod pointer;

pub use pointer::{Point, PointerSession, Size};

use crate::shell::markup::Line;

/// Smallest size a resize can produce.
pub const MIN_SIZE: Size = Size::new(350, 300);
/// Largest size a resize can produce.
pub const MAX_SIZE: Size = Size::new(1000, 800);
/// Size used when `open` is not given one.
pub const DEFAULT_SIZE: Size = Size::new(600, 400);
/// Viewports this wide or narrower get no windows.
pub const NARROW_WIDTH: i32 = 600;

const Z_BASE: i64 = 100;
const CASCADE_ORIGIN: Point = Point::new(100, 50);
const CASCADE_STEP: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    pub id: String,
    pub title: String,
    pub content: Vec<Line>,
    pub geometry: Geometry,
    pub z_index: i64,
    /// First content line shown.
    pub scroll: usize,
}

/// Pixel extents of the window decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub title_height: i32,
    pub close_width: i32,
    pub handle_width: i32,
    pub handle_height: i32,
}

impl Chrome {
    /// Chrome for a cell grid: one title row, a three-cell `[x]`, a one-cell handle.
    pub fn for_cell(cell_width: i32, cell_height: i32) -> Self {
        Self {
            title_height: cell_height,
            close_width: cell_width * 3,
            handle_width: cell_width,
            handle_height: cell_height,
        }
    }
}

impl Default for Chrome {
    fn default() -> Self {
        Self::for_cell(8, 16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    TitleBar,
    CloseButton,
    ResizeHandle,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenResult {
    Opened,
    /// The id was already open and got raised instead.
    Focused,
    /// Narrow viewport.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

struct Gesture {
    id: String,
    kind: GestureKind,
    session: PointerSession<Geometry>,
}

fn drag_step(g: Geometry, dx: i32, dy: i32) -> Geometry {
    Geometry { x: g.x + dx, y: g.y + dy, ..g }
}

fn drag_clamp(g: Geometry, viewport: Size) -> Geometry {
    let max_x = viewport.width - g.width;
    let max_y = viewport.height - g.height;
    Geometry { x: g.x.min(max_x).max(0), y: g.y.min(max_y).max(0), ..g }
}

fn resize_step(g: Geometry, dx: i32, dy: i32) -> Geometry {
    Geometry { width: g.width + dx, height: g.height + dy, ..g }
}

fn resize_clamp(g: Geometry, _viewport: Size) -> Geometry {
    Geometry {
        width: g.width.max(MIN_SIZE.width).min(MAX_SIZE.width),
        height: g.height.max(MIN_SIZE.height).min(MAX_SIZE.height),
        ..g
    }
}

/// The slice of the window manager content handlers are allowed to use.
pub trait WindowOpener {
    fn open_window(&mut self, id: &str, title: &str, content: Vec<Line>, size: Option<Size>) -> OpenResult;
    fn is_narrow(&self) -> bool;
}

pub struct WindowManager {
    windows: Vec<Window>,
    z_counter: i64,
    viewport: Size,
    chrome: Chrome,
    gesture: Option<Gesture>,
}

impl WindowManager {
    pub fn new(viewport: Size, chrome: Chrome) -> Self {
        Self { windows: Vec::new(), z_counter: Z_BASE, viewport, chrome, gesture: None }
    }

    /// Open a window, or raise it if `id` is already open.
    pub fn open(&mut self, id: &str, title: &str, content: Vec<Line>, size: Option<Size>) -> OpenResult {
        if self.is_narrow() {
            tracing::debug!(id, "narrow viewport, window skipped");
            return OpenResult::Skipped;
        }
        if self.get(id).is_some() {
            self.bring_to_front(id);
            return OpenResult::Focused;
        }
        let size = size.unwrap_or(DEFAULT_SIZE);
        let offset = self.windows.len() as i32 * CASCADE_STEP;
        self.windows.push(Window {
            id: id.to_string(),
            title: title.to_string(),
            content,
            geometry: Geometry {
                x: CASCADE_ORIGIN.x + offset,
                y: CASCADE_ORIGIN.y + offset,
                width: size.width,
                height: size.height,
            },
            z_index: 0,
            scroll: 0,
        });
        self.bring_to_front(id);
        tracing::debug!(id, title, "window opened");
        OpenResult::Opened
    }

    /// Remove a window. Unknown ids are ignored.
    pub fn close(&mut self, id: &str) -> bool {
        let Some(pos) = self.windows.iter().position(|w| w.id == id) else {
            return false;
        };
        self.windows.remove(pos);
        if self.gesture.as_ref().is_some_and(|g| g.id == id) {
            self.gesture = None;
        }
        tracing::debug!(id, "window closed");
        true
    }

    /// Give `id` a z-index above everything handed out so far.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let next = self.z_counter + 1;
        match self.windows.iter_mut().find(|w| w.id == id) {
            Some(win) => {
                self.z_counter = next;
                win.z_index = next;
                true
            }
            None => false,
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_chrome(&mut self, chrome: Chrome) {
        self.chrome = chrome;
    }

    pub fn chrome(&self) -> Chrome {
        self.chrome
    }

    pub fn is_narrow(&self) -> bool {
        self.viewport.width <= NARROW_WIDTH
    }

    pub fn get(&self, id: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows from back to front.
    pub fn windows_by_z(&self) -> Vec<&Window> {
        let mut ordered: Vec<&Window> = self.windows.iter().collect();
        ordered.sort_by_key(|w| w.z_index);
        ordered
    }

    /// The top-most window.
    pub fn front(&self) -> Option<&Window> {
        self.windows.iter().max_by_key(|w| w.z_index)
    }

    /// Top-most window under `p`.
    pub fn window_at(&self, p: Point) -> Option<&Window> {
        self.windows.iter().filter(|w| w.geometry.contains(p)).max_by_key(|w| w.z_index)
    }

    /// Which window, and which part of it, is under `p`.
    pub fn hit_test(&self, p: Point) -> Option<(String, HitRegion)> {
        let win = self.window_at(p)?;
        let g = win.geometry;
        let c = self.chrome;
        // The handle wins over everything so a resize never turns into a drag.
        let region = if p.x >= g.x + g.width - c.handle_width && p.y >= g.y + g.height - c.handle_height {
            HitRegion::ResizeHandle
        } else if p.y < g.y + c.title_height {
            if p.x >= g.x + g.width - c.close_width {
                HitRegion::CloseButton
            } else {
                HitRegion::TitleBar
            }
        } else {
            HitRegion::Content
        };
        Some((win.id.clone(), region))
    }

    /// Pointer pressed. Raises the window under `p` and starts a drag or
    /// resize when the press landed on the title bar or the handle.
    pub fn pointer_down(&mut self, p: Point) -> Option<(String, HitRegion)> {
        let (id, region) = self.hit_test(p)?;
        self.bring_to_front(&id);
        let origin = self.get(&id).map(|w| w.geometry)?;
        let session = match region {
            HitRegion::TitleBar => Some((GestureKind::Drag, PointerSession::begin(p, origin, drag_step, drag_clamp))),
            HitRegion::ResizeHandle => {
                Some((GestureKind::Resize, PointerSession::begin(p, origin, resize_step, resize_clamp)))
            }
            HitRegion::CloseButton => {
                self.close(&id);
                None
            }
            HitRegion::Content => None,
        };
        if let Some((kind, session)) = session {
            tracing::debug!(id = %id, ?kind, "gesture started");
            self.gesture = Some(Gesture { id: id.clone(), kind, session });
        }
        Some((id, region))
    }

    /// Pointer moved. Only recorded; geometry changes on the next frame.
    pub fn pointer_move(&mut self, p: Point) {
        if let Some(g) = self.gesture.as_mut() {
            g.session.track(p);
        }
    }

    /// Pointer released. Applies any move the last frame missed, then ends the gesture.
    pub fn pointer_up(&mut self) {
        self.on_frame();
        self.gesture = None;
    }

    /// Animation frame. Returns whether any geometry changed.
    pub fn on_frame(&mut self) -> bool {
        let viewport = self.viewport;
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        let Some(next) = gesture.session.frame(viewport) else {
            return false;
        };
        match self.windows.iter_mut().find(|w| w.id == gesture.id) {
            Some(win) if win.geometry != next => {
                win.geometry = next;
                true
            }
            _ => false,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture_kind(&self) -> Option<GestureKind> {
        self.gesture.as_ref().map(|g| g.kind)
    }

    /// Scroll a window's content by `delta` lines, within its content length.
    pub fn scroll(&mut self, id: &str, delta: i32) {
        if let Some(win) = self.windows.iter_mut().find(|w| w.id == id) {
            let max = win.content.len().saturating_sub(1);
            let next = (win.scroll as i64 + delta as i64).clamp(0, max as i64);
            win.scroll = next as usize;
        }
    }
}

impl WindowOpener for WindowManager {
    fn open_window(&mut self, id: &str, title: &str, content: Vec<Line>, size: Option<Size>) -> OpenResult {
        self.open(id, title, content, size)
    }

    fn is_narrow(&self) -> bool {
        WindowManager::is_narrow(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wm() -> WindowManager {
        WindowManager::new(Size::new(1600, 1000), Chrome::default())
    }

    fn title_point(wm: &WindowManager, id: &str) -> Point {
        let g = wm.get(id).unwrap().geometry;
        Point::new(g.x + 10, g.y + 5)
    }

    fn handle_point(wm: &WindowManager, id: &str) -> Point {
        let g = wm.get(id).unwrap().geometry;
        Point::new(g.x + g.width - 1, g.y + g.height - 1)
    }

    #[test]
    fn test_open_cascades_and_stacks() {
        let mut wm = wm();
        assert_eq!(wm.open("a", "A", vec![], None), OpenResult::Opened);
        assert_eq!(wm.open("b", "B", vec![], Some(Size::new(400, 350))), OpenResult::Opened);
        let a = wm.get("a").unwrap();
        let b = wm.get("b").unwrap();
        assert_eq!((a.geometry.x, a.geometry.y), (100, 50));
        assert_eq!((b.geometry.x, b.geometry.y), (120, 70));
        assert_eq!(b.geometry.size(), Size::new(400, 350));
        assert_eq!(a.z_index, 101);
        assert_eq!(b.z_index, 102);
    }

    #[test]
    fn test_reopen_focuses_instead_of_duplicating() {
        let mut wm = wm();
        wm.open("w1", "One", vec![], None);
        wm.open("w2", "Two", vec![], None);
        assert_eq!(wm.open("w1", "One", vec![], None), OpenResult::Focused);
        assert_eq!(wm.len(), 2);
        assert_eq!(wm.front().unwrap().id, "w1");
        assert!(wm.get("w1").unwrap().z_index > wm.get("w2").unwrap().z_index);
    }

    #[test]
    fn test_narrow_viewport_skips_open() {
        let mut wm = WindowManager::new(Size::new(600, 800), Chrome::default());
        assert_eq!(wm.open("a", "A", vec![], None), OpenResult::Skipped);
        assert!(wm.is_empty());
    }

    #[test]
    fn test_close_unknown_is_noop() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        assert!(!wm.close("nope"));
        assert!(wm.close("a"));
        assert!(wm.get("a").is_none());
        assert!(!wm.close("a"));
    }

    #[test]
    fn test_z_counter_never_decreases() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        wm.open("b", "B", vec![], None);
        wm.close("b");
        wm.open("c", "C", vec![], None);
        assert_eq!(wm.get("c").unwrap().z_index, 103);
    }

    #[test]
    fn test_drag_clamps_to_viewport() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        let start = title_point(&wm, "a");
        assert_eq!(wm.pointer_down(start), Some(("a".to_string(), HitRegion::TitleBar)));
        assert_eq!(wm.gesture_kind(), Some(GestureKind::Drag));

        wm.pointer_move(Point::new(start.x + 5000, start.y + 5000));
        assert_eq!(wm.get("a").unwrap().geometry.x, 100);
        assert!(wm.on_frame());
        let g = wm.get("a").unwrap().geometry;
        assert_eq!(g.x, 1600 - 600);
        assert_eq!(g.y, 1000 - 400);

        wm.pointer_move(Point::new(start.x - 5000, start.y - 5000));
        wm.on_frame();
        let g = wm.get("a").unwrap().geometry;
        assert_eq!((g.x, g.y), (0, 0));
        wm.pointer_up();
        assert!(!wm.is_gesture_active());
    }

    #[test]
    fn test_resize_clamps_to_floor_and_ceiling() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        let start = handle_point(&wm, "a");
        assert_eq!(wm.pointer_down(start), Some(("a".to_string(), HitRegion::ResizeHandle)));
        assert_eq!(wm.gesture_kind(), Some(GestureKind::Resize));

        wm.pointer_move(Point::new(start.x - 1000, start.y - 1000));
        wm.on_frame();
        assert_eq!(wm.get("a").unwrap().geometry.size(), MIN_SIZE);

        wm.pointer_move(Point::new(start.x + 3000, start.y + 3000));
        wm.on_frame();
        let g = wm.get("a").unwrap().geometry;
        assert_eq!(g.size(), MAX_SIZE);
        assert_eq!((g.x, g.y), (100, 50));
    }

    #[test]
    fn test_pointer_up_flushes_last_move() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        let start = title_point(&wm, "a");
        wm.pointer_down(start);
        wm.pointer_move(Point::new(start.x + 30, start.y + 10));
        wm.pointer_up();
        let g = wm.get("a").unwrap().geometry;
        assert_eq!((g.x, g.y), (130, 60));
        wm.pointer_move(Point::new(start.x + 300, start.y));
        assert!(!wm.on_frame());
    }

    #[test]
    fn test_hit_regions_and_close_button() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        let g = wm.get("a").unwrap().geometry;
        let content = Point::new(g.x + 50, g.y + 100);
        assert_eq!(wm.hit_test(content), Some(("a".to_string(), HitRegion::Content)));
        assert_eq!(wm.hit_test(Point::new(0, 0)), None);

        let close = Point::new(g.x + g.width - 2, g.y + 2);
        assert_eq!(wm.pointer_down(close), Some(("a".to_string(), HitRegion::CloseButton)));
        assert!(wm.is_empty());
    }

    #[test]
    fn test_pointer_down_raises_top_most_under_point() {
        let mut wm = wm();
        wm.open("a", "A", vec![], None);
        wm.open("b", "B", vec![], None);
        // (150, 200) lies inside both; b is on top.
        let (id, _) = wm.pointer_down(Point::new(150, 200)).unwrap();
        assert_eq!(id, "b");
        wm.bring_to_front("a");
        let (id, _) = wm.pointer_down(Point::new(150, 200)).unwrap();
        assert_eq!(id, "a");
        assert_eq!(wm.front().unwrap().id, "a");
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut wm = wm();
        wm.open("a", "A", vec![Line::plain("1"), Line::plain("2"), Line::plain("3")], None);
        wm.scroll("a", 10);
        assert_eq!(wm.get("a").unwrap().scroll, 2);
        wm.scroll("a", -10);
        assert_eq!(wm.get("a").unwrap().scroll, 0);
    }
}
