//! Headless render sink that tallies draw calls

use glam::Vec2;

use super::RenderSink;
use crate::sim::Color;

/// Counts frames and disks instead of painting them
#[derive(Debug, Clone, Default)]
pub struct StatsSink {
    /// Number of `clear` calls (one per rendered frame)
    pub frames: u64,
    /// Disks drawn since the last clear
    pub disks_this_frame: usize,
    /// Disks drawn over the sink's lifetime
    pub disks_total: u64,
}

impl RenderSink for StatsSink {
    fn clear(&mut self) {
        self.frames += 1;
        self.disks_this_frame = 0;
    }

    fn draw_disk(&mut self, center: Vec2, radius: f32, color: &Color) {
        log::trace!(
            "disk at ({:.1}, {:.1}) r={} {}",
            center.x,
            center.y,
            radius,
            color.as_str()
        );
        self.disks_this_frame += 1;
        self.disks_total += 1;
    }
}
