//! Minutes-of-day to vertical pixel mapping.

use crate::context::ViewConfig;
use crate::event::{Event, Segment};

/// Vertical placement of one rendered piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub top: f32,
    pub height: f32,
}

/// Map a minutes-of-day range onto the view's pixel scale.
///
/// The top edge clamps at 0 for events starting before the view's first
/// visible minute; the bottom edge clamps at `time_to`. Height never
/// drops below the configured minimum so zero-duration or rounding
/// degenerate events stay visible.
pub fn map_to_geometry(start_minutes: u32, end_minutes: u32, config: &ViewConfig) -> Geometry {
    let scale = config.time_cell_height / config.time_step as f32;

    let top = ((start_minutes as f32 - config.time_from as f32) * scale).max(0.0);
    let bottom = (end_minutes.min(config.time_to) as f32 - config.time_from as f32) * scale;
    let height = (bottom - top).max(config.min_event_height);

    Geometry { top, height }
}

impl Event {
    /// Compute and store this event's vertical placement.
    pub fn apply_geometry(&mut self, config: &ViewConfig) {
        let geometry = map_to_geometry(self.start_minutes, self.end_minutes, config);
        self.top = geometry.top;
        self.height = geometry.height;
    }
}

impl Segment {
    /// Compute and store this segment's vertical placement; segments
    /// are laid out independently of their event.
    pub fn apply_geometry(&mut self, config: &ViewConfig) {
        let geometry = map_to_geometry(self.start_minutes, self.end_minutes, config);
        self.top = geometry.top;
        self.height = geometry.height;
    }
}
