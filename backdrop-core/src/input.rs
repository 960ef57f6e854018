/// Pointer tracking shared between input handlers and the frame update
use crate::viewport::ViewportSize;

/// Cursor displacement from the viewport center, in pixels.
///
/// Written by the pointer-move handler, read once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerOffset {
    pub dx: f32,
    pub dy: f32,
}

impl PointerOffset {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn from_position(x: f32, y: f32, viewport: ViewportSize) -> Self {
        let (half_w, half_h) = viewport.half_extents();
        Self {
            dx: x - half_w,
            dy: y - half_h,
        }
    }
}

/// Per-frame easing factor of the trailing cursor
pub const FOLLOWER_EASING: f32 = 0.12;

/// A custom cursor: a dot pinned to the pointer and a ring that trails it
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorFollower {
    pub cursor: (f32, f32),
    pub follower: (f32, f32),
    /// Pointer is over an interactive element; the ring takes its hover style
    pub hover: bool,
}

impl CursorFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.cursor = (x, y);
    }

    pub fn set_hover(&mut self, hover: bool) {
        self.hover = hover;
    }

    /// Close a fixed fraction of the gap between the ring and the pointer
    pub fn step(&mut self) {
        self.follower.0 += (self.cursor.0 - self.follower.0) * FOLLOWER_EASING;
        self.follower.1 += (self.cursor.1 - self.follower.1) * FOLLOWER_EASING;
    }
}
