//! Built-in container widgets.

pub mod list_box;

pub use list_box::{
    AnimationType, ItemSelectedListener, ListBox, Orientation, ScrollPhase, WidgetListener,
};
