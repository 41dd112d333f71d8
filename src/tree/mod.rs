//! Widget tree: slotmap arena, widget ids, per-widget state.

pub mod arena;
pub mod node;

pub use arena::WidgetTree;
pub use node::{WidgetId, WidgetState};
