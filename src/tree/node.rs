//! Node types: WidgetId, WidgetState.

use slotmap::new_key_type;

use crate::geometry::{Region, Size, Spacing};
use crate::layout::SizePolicy;

new_key_type! {
    /// Unique identifier for a widget in the tree. Copy, lightweight (u64).
    ///
    /// Ids are the crate's non-owning handles: parent back-references and the
    /// list box's focused-widget reference are `WidgetId`s, invalidated
    /// explicitly when the widget is removed.
    pub struct WidgetId;
}

/// Data associated with a single widget in the tree.
///
/// Bounds are relative to the parent widget; width and height are never
/// negative. The sizing policies feed the layout resolver, which rewrites
/// `bounds` during a container's rebuild pass.
#[derive(Debug, Clone)]
pub struct WidgetState {
    /// Parent-relative bounds in pixels.
    pub bounds: Region,
    /// Whether this widget (and its subtree) is drawn and hit-testable.
    pub visible: bool,
    /// Whether this widget accepts input.
    pub enabled: bool,
    /// Whether this widget currently holds focus.
    pub focused: bool,
    /// Inner padding between this widget's bounds and its content.
    pub padding: Spacing,
    /// Horizontal sizing policy consumed by the owning container's layout.
    pub width_policy: SizePolicy,
    /// Vertical sizing policy consumed by the owning container's layout.
    pub height_policy: SizePolicy,
    /// Measured natural size, consumed by the wrap-to-content policy.
    pub content_size: Size,
}

impl WidgetState {
    /// Create a new `WidgetState` with sensible defaults: empty bounds,
    /// visible, enabled, unfocused, no padding, wrap-to-content sizing.
    pub fn new() -> Self {
        Self {
            bounds: Region::EMPTY,
            visible: true,
            enabled: true,
            focused: false,
            padding: Spacing::ZERO,
            width_policy: SizePolicy::WrapContent,
            height_policy: SizePolicy::WrapContent,
            content_size: Size::ZERO,
        }
    }

    /// Set the parent-relative bounds (builder).
    pub fn with_bounds(mut self, bounds: Region) -> Self {
        self.bounds = bounds;
        self
    }

    /// Fix both axes to the given extents (builder).
    ///
    /// Sets the sizing policies to [`SizePolicy::Fixed`] and the bounds size
    /// to match, so the widget keeps this size outside any layout pass too.
    pub fn with_fixed_size(mut self, width: i32, height: i32) -> Self {
        self.width_policy = SizePolicy::Fixed(width);
        self.height_policy = SizePolicy::Fixed(height);
        self.bounds.width = width.max(0);
        self.bounds.height = height.max(0);
        self
    }

    /// Set the horizontal sizing policy (builder).
    pub fn with_width_policy(mut self, policy: SizePolicy) -> Self {
        self.width_policy = policy;
        self
    }

    /// Set the vertical sizing policy (builder).
    pub fn with_height_policy(mut self, policy: SizePolicy) -> Self {
        self.height_policy = policy;
        self
    }

    /// Set the measured content size (builder).
    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = size;
        self
    }

    /// Set the inner padding (builder).
    pub fn with_padding(mut self, padding: Spacing) -> Self {
        self.padding = padding;
        self
    }

    /// Set visibility (builder).
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the widget accepts input (builder).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}
