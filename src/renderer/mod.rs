//! Render sinks
//!
//! The simulation draws through `RenderSink` only: one clear per frame, then
//! one filled disk per visible body. The browser build paints onto a 2D
//! canvas; the native build just counts what it would draw.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod stats;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSink;
pub use stats::StatsSink;

use glam::Vec2;

use crate::sim::Color;

/// Output surface for filled disks
pub trait RenderSink {
    /// Reset the surface before a frame's draws
    fn clear(&mut self);

    /// Paint a filled circle
    fn draw_disk(&mut self, center: Vec2, radius: f32, color: &Color);
}
