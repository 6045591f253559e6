//! Scheduling and layout core for calendar views.
//!
//! Given time-bound events inside a visible window, this crate decides
//! how a multi-day event splits into per-day segments, which events
//! need side-by-side columns, and the pixel geometry of each rendered
//! piece. Rendering, input handling, and styling live in the hosting
//! view; it interacts with the core through [`ViewContext`] and the
//! pure functions re-exported here.

pub mod context;
pub mod error;
pub mod event;
pub mod geometry;
pub mod locale;
pub mod overlap;
pub mod segment;
pub mod temporal;

pub use context::{CreationHook, EventSignal, SignalSink, ViewConfig, ViewContext};
pub use error::{GridError, GridResult};
pub use event::{Event, EventDraft, Repeat, RepeatRule, Segment};
pub use geometry::{map_to_geometry, Geometry};
pub use locale::Locale;
pub use overlap::{compute_overlaps, event_in_range, OverlapRecord};
pub use segment::{add_day_segment, build_segments, remove_day_segment};
