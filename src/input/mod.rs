//! Host input: event types and the touch motion tracker.

pub mod event;
pub mod tracker;

pub use event::{InputEvent, KeyCode, KeyEvent, PointerEvent};
pub use tracker::TouchMotionTracker;
