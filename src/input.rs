//! Pointer input snapshot
//!
//! Written by input handlers between frames, read once at the start of each
//! frame. Coordinates are arena-local.

use glam::Vec2;

use crate::sim::{Arena, Body};

/// Primary mouse button bit in `MouseEvent.buttons`
pub const PRIMARY_BUTTON: u16 = 1;

/// Live pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Pointer is over the arena
    pub inside: bool,
    /// Last known position
    pub pos: Vec2,
    /// Movement accumulated since the last frame sample
    pub delta: Vec2,
    /// Primary button held without a modifier
    pub drag: bool,
}

impl PointerState {
    /// Record a pointer move (or button change) event
    pub fn update(&mut self, pos: Vec2, movement: Vec2, buttons: u16, ctrl: bool) {
        self.pos = pos;
        self.delta += movement;
        self.drag = buttons == PRIMARY_BUTTON && !ctrl;
    }

    pub fn enter(&mut self) {
        self.inside = true;
    }

    pub fn leave(&mut self) {
        self.inside = false;
        self.drag = false;
    }

    /// Whether a button press selects a body instead of dragging
    pub fn is_pick_click(buttons: u16, ctrl: bool) -> bool {
        buttons == PRIMARY_BUTTON && ctrl
    }

    /// Build this frame's cursor body, if the pointer is dragging inside the arena
    ///
    /// The cursor must sit strictly more than one radius away from every wall.
    /// Its velocity is the pointer movement since the previous sample.
    pub fn cursor_body(&self, arena: &Arena, radius: f32) -> Option<Body> {
        if !self.inside || !self.drag {
            return None;
        }

        let Vec2 { x, y } = self.pos;
        let clear_x = x > radius && x < arena.width - radius;
        let clear_y = y > radius && y < arena.height - radius;

        (clear_x && clear_y).then(|| Body::cursor(self.pos, self.delta, radius))
    }

    /// Sample the cursor for a frame and restart movement accumulation
    pub fn sample_cursor(&mut self, arena: &Arena, radius: f32) -> Option<Body> {
        let cursor = self.cursor_body(arena, radius);
        self.delta = Vec2::ZERO;
        cursor
    }
}
