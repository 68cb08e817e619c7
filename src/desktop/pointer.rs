//! Frame-decoupled pointer gestures
//!
//! Pointer moves only record the latest coordinates. Once per animation
//! frame the gesture recomputes its target from the origin and the total
//! delta, then clamps it. Drag and resize are the same session with a
//! different step and clamp.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Applies the pointer delta `(dx, dy)` to the gesture origin.
pub type Step<G> = fn(G, i32, i32) -> G;

/// Keeps a stepped value inside its limits for the given viewport.
pub type Clamp<G> = fn(G, Size) -> G;

#[derive(Debug, Clone)]
pub struct PointerSession<G> {
    start: Point,
    latest: Point,
    origin: G,
    step: Step<G>,
    clamp: Clamp<G>,
    dirty: bool,
}

impl<G: Copy> PointerSession<G> {
    /// Start at `start` with the target's geometry `origin`.
    pub fn begin(start: Point, origin: G, step: Step<G>, clamp: Clamp<G>) -> Self {
        Self { start, latest: start, origin, step, clamp, dirty: false }
    }

    /// Record a move. Later moves overwrite earlier ones.
    pub fn track(&mut self, at: Point) {
        self.latest = at;
        self.dirty = true;
    }

    /// Sample the latest pointer. `None` when nothing moved since the last frame.
    pub fn frame(&mut self, viewport: Size) -> Option<G> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.target(viewport))
    }

    /// Where the target would be for the latest pointer position.
    pub fn target(&self, viewport: Size) -> G {
        let dx = self.latest.x - self.start.x;
        let dy = self.latest.y - self.start.y;
        (self.clamp)((self.step)(self.origin, dx, dy), viewport)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn origin(&self) -> G {
        self.origin
    }
}
