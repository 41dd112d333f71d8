//! ListBox: a scrollable, navigable, animatable list container.
//!
//! The list box composes the widget tree, the touch motion tracker, and the
//! host timer contract into one engine that reconciles three concurrently
//! evolving inputs — user touch, programmatic navigation, and time-based
//! animation — into a single consistent scroll position.
//!
//! The scroll position lives in one of three phases:
//!
//! ```text
//!            pointer_pressed                  pointer_released
//!   Idle ──────────────────────▶ Touching ──────────────────────▶ Animating
//!    ▲                              ▲            (or Idle)            │
//!    │        run_timer_event       │      pointer_pressed            │
//!    └──────────────────────────────┴──────────────────────────◀──────┘
//! ```
//!
//! Navigation (`select_next_item` / `select_previous_item`) works in any
//! phase and does not require touch at all.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{lerp, Offset, Region};
use crate::input::event::{KeyCode, KeyEvent, PointerEvent};
use crate::input::tracker::TouchMotionTracker;
use crate::layout::{resolve_cross_extent, resolve_extents, SizePolicy};
use crate::listener::ListenerSet;
use crate::timer::{TimerService, TICK_PERIOD_MS};
use crate::tree::{WidgetId, WidgetState, WidgetTree};

/// Velocity magnitude (px/ms along the orientation axis) below which a touch
/// release settles to the nearest item boundary instead of flinging.
pub const RELEASE_VELOCITY_THRESHOLD: f64 = 0.1;

/// Duration of the settle-to-boundary animation after a slow release.
pub const SETTLE_ANIMATION_MS: u64 = 200;

/// Duration of the scroll-into-view animation after a selection change.
pub const SELECT_ANIMATION_MS: u64 = 250;

/// Duration of a fling: the release velocity decays linearly to zero over
/// this window, so the fling distance is `v * FLING_ANIMATION_MS / 2`.
pub const FLING_ANIMATION_MS: u64 = 450;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Axis along which a list box arranges and scrolls its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// How scroll position changes are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationType {
    /// Scroll changes apply instantly.
    None,
    /// Scroll changes interpolate linearly over a timer-driven animation.
    Linear,
}

/// The scroll engine's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// At rest; no touch in progress, no animation in flight.
    Idle,
    /// A pointer is down and dragging the content.
    Touching,
    /// A timer-driven animation is moving the scroll offset.
    Animating,
}

/// What started the in-flight animation; decides what happens on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimKind {
    /// Touch settle or fling: the resting index is derived from the final
    /// offset, and `item_selected` fires if it changed.
    Touch,
    /// Scroll-into-view for a navigation call: the selection was already
    /// committed when the animation started.
    Select,
}

// ---------------------------------------------------------------------------
// Listener interfaces
// ---------------------------------------------------------------------------

/// Receives notifications when the selected item of a [`ListBox`] changes.
pub trait ItemSelectedListener {
    /// The selected item changed. `unselected` is `None` when the list had no
    /// prior selection.
    fn item_selected(
        &mut self,
        sender: WidgetId,
        selected: WidgetId,
        unselected: Option<WidgetId>,
    );

    /// Navigation was blocked by a non-wrapping edge. `direction` is `-1`
    /// for `select_previous_item` and `+1` for `select_next_item`.
    fn blocked(&mut self, sender: WidgetId, direction: i32);
}

/// Observes a widget's externally visible state changes.
pub trait WidgetListener {
    /// The widget's bounds were changed.
    fn bounds_changed(&mut self, widget: WidgetId, bounds: Region);

    /// The widget gained or lost focus.
    fn focus_changed(&mut self, widget: WidgetId, focused: bool);
}

// ---------------------------------------------------------------------------
// ListBox
// ---------------------------------------------------------------------------

/// A container widget presenting a scrollable, navigable sequence of child
/// widgets, laid out along one axis.
///
/// The list box owns a node in a [`WidgetTree`] and operates on the tree
/// passed into each call; it holds no tree reference itself, which keeps
/// behavior and ownership cleanly separated. Item widgets are the node's
/// children. Any widget type can be an item — the navigation API is
/// decoupled from input, so hosts decide what "next" means (a key, a wheel
/// detent, a voice command).
pub struct ListBox {
    id: WidgetId,
    orientation: Orientation,
    animation_type: AnimationType,
    wrapping: bool,
    auto_size: bool,

    selected_index: Option<usize>,
    focused_widget: Option<WidgetId>,

    scroll_offset: i32,
    phase: ScrollPhase,

    // Animation state; meaningful only while `phase == Animating`.
    offset_from: i32,
    offset_to: i32,
    anim_start_ms: u64,
    anim_duration_ms: u64,
    anim_kind: AnimKind,
    timer_registered: bool,

    // Touch state; meaningful only while `phase == Touching`.
    press_pos: Offset,
    touched_offset_at_press: i32,
    active_pointer_id: u32,
    tracker: TouchMotionTracker,

    item_selected_listeners: ListenerSet<dyn ItemSelectedListener>,
    widget_listeners: ListenerSet<dyn WidgetListener>,
}

impl ListBox {
    /// Create a list box as a root widget of `tree`.
    ///
    /// Defaults: vertical orientation, no animation, wrapping navigation,
    /// no autosizing.
    pub fn new(tree: &mut WidgetTree, state: WidgetState) -> Self {
        let id = tree.insert(state);
        Self::with_id(id)
    }

    /// Create a list box as a child of `parent`.
    pub fn new_child(tree: &mut WidgetTree, parent: WidgetId, state: WidgetState) -> Self {
        let id = tree.insert_child(parent, state);
        Self::with_id(id)
    }

    fn with_id(id: WidgetId) -> Self {
        Self {
            id,
            orientation: Orientation::Vertical,
            animation_type: AnimationType::None,
            wrapping: true,
            auto_size: false,
            selected_index: None,
            focused_widget: None,
            scroll_offset: 0,
            phase: ScrollPhase::Idle,
            offset_from: 0,
            offset_to: 0,
            anim_start_ms: 0,
            anim_duration_ms: 0,
            anim_kind: AnimKind::Touch,
            timer_registered: false,
            press_pos: Offset::ZERO,
            touched_offset_at_press: 0,
            active_pointer_id: 0,
            tracker: TouchMotionTracker::new(),
            item_selected_listeners: ListenerSet::new(),
            widget_listeners: ListenerSet::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The list box's widget id in the tree.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The layout/scroll axis.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The animation type used for scroll changes.
    pub fn animation_type(&self) -> AnimationType {
        self.animation_type
    }

    /// Whether navigation wraps around at the ends.
    pub fn is_wrapping(&self) -> bool {
        self.wrapping
    }

    /// Whether children are forced to the box's padded cross-axis extent.
    pub fn auto_size(&self) -> bool {
        self.auto_size
    }

    /// Index of the currently selected item, or `None` if the list is empty.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// The current scroll offset in pixels along the orientation axis.
    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// The scroll engine's current phase.
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// The child widget currently holding focus, if any.
    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.focused_widget
    }

    /// Number of items in the list.
    pub fn item_count(&self, tree: &WidgetTree) -> usize {
        tree.children(self.id).len()
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Set the layout/scroll axis and rebuild.
    pub fn set_orientation(&mut self, tree: &mut WidgetTree, orientation: Orientation) {
        self.orientation = orientation;
        self.rebuild(tree);
    }

    /// Set the animation type used for scroll changes.
    pub fn set_animation_type(&mut self, animation_type: AnimationType) {
        self.animation_type = animation_type;
    }

    /// Set whether navigation wraps around at the ends.
    pub fn set_wrapping(&mut self, wrapping: bool) {
        self.wrapping = wrapping;
    }

    /// Set cross-axis autosizing and rebuild.
    pub fn set_auto_size(&mut self, tree: &mut WidgetTree, auto_size: bool) {
        self.auto_size = auto_size;
        self.rebuild(tree);
    }

    // ── Item management ──────────────────────────────────────────────

    /// Append an item widget and rebuild.
    ///
    /// The first item added to an empty list becomes the selection.
    pub fn add_item(&mut self, tree: &mut WidgetTree, state: WidgetState) -> WidgetId {
        let child = tree.insert_child(self.id, state);
        if self.selected_index.is_none() {
            self.selected_index = Some(0);
        }
        self.rebuild(tree);
        child
    }

    /// Remove an item widget (and its subtree) and rebuild.
    ///
    /// No-op if `child` is not an item of this list. If the removed widget
    /// was the focused widget, the focused reference is cleared in the same
    /// operation; the selected index is clamped to the remaining items.
    pub fn remove_item(&mut self, tree: &mut WidgetTree, child: WidgetId) {
        if tree.parent(child) != Some(self.id) {
            return;
        }
        tree.remove(child);
        if self.focused_widget == Some(child) {
            self.focused_widget = None;
        }
        let count = tree.children(self.id).len();
        self.selected_index = if count == 0 {
            None
        } else {
            Some(self.selected_index.unwrap_or(0).min(count - 1))
        };
        self.rebuild(tree);
    }

    /// Remove every item in one operation and reset scroll and selection.
    ///
    /// Cancels any in-flight animation first (unregistering the timer).
    pub fn clear_items(&mut self, tree: &mut WidgetTree, timer: &mut dyn TimerService) {
        self.cancel_animation(timer);
        self.phase = ScrollPhase::Idle;
        tree.clear_children(self.id);
        self.selected_index = None;
        self.focused_widget = None;
        self.scroll_offset = 0;
    }

    // ── Listener registration ────────────────────────────────────────

    /// Register an item-selection listener.
    pub fn add_item_selected_listener(&self, listener: &Rc<RefCell<dyn ItemSelectedListener>>) {
        self.item_selected_listeners.add(listener);
    }

    /// Unregister an item-selection listener. No-op if absent.
    pub fn remove_item_selected_listener(&self, listener: &Rc<RefCell<dyn ItemSelectedListener>>) {
        self.item_selected_listeners.remove(listener);
    }

    /// Register an observer of this list box's bounds/focus changes.
    pub fn add_widget_listener(&self, listener: &Rc<RefCell<dyn WidgetListener>>) {
        self.widget_listeners.add(listener);
    }

    /// Unregister a bounds/focus observer. No-op if absent.
    pub fn remove_widget_listener(&self, listener: &Rc<RefCell<dyn WidgetListener>>) {
        self.widget_listeners.remove(listener);
    }

    // ── Selection & navigation ───────────────────────────────────────

    /// Select the item `index`. Out-of-range indices are clamped; an empty
    /// list ignores the call. Direct set: no scroll, no callbacks.
    pub fn set_selected_index(&mut self, tree: &mut WidgetTree, index: usize) {
        let children: Vec<WidgetId> = tree.children(self.id).to_vec();
        if children.is_empty() {
            return;
        }
        let clamped = index.min(children.len() - 1);
        self.selected_index = Some(clamped);
        self.move_focus_to(tree, children[clamped]);
    }

    /// Navigate to the next item — down for vertical lists, right for
    /// horizontal ones.
    ///
    /// At the last item: wraps to the first if wrapping is on, otherwise
    /// notifies `blocked(sender, 1)` and leaves the selection unchanged.
    /// `fire_listeners` gates every callback of this call.
    pub fn select_next_item(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        fire_listeners: bool,
        now_ms: u64,
    ) {
        self.step_selection(tree, timer, 1, fire_listeners, now_ms);
    }

    /// Navigate to the previous item — up for vertical lists, left for
    /// horizontal ones.
    ///
    /// At the first item: wraps to the last if wrapping is on, otherwise
    /// notifies `blocked(sender, -1)` and leaves the selection unchanged.
    pub fn select_previous_item(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        fire_listeners: bool,
        now_ms: u64,
    ) {
        self.step_selection(tree, timer, -1, fire_listeners, now_ms);
    }

    fn step_selection(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        direction: i32,
        fire_listeners: bool,
        now_ms: u64,
    ) {
        let count = tree.children(self.id).len();
        if count == 0 {
            return;
        }
        let current = self.selected_index.unwrap_or(0) as i32;
        let stepped = current + direction;
        let new_index = if stepped < 0 || stepped >= count as i32 {
            if !self.wrapping {
                log::trace!("navigation blocked at edge, direction {direction}");
                if fire_listeners {
                    let sender = self.id;
                    self.item_selected_listeners
                        .notify_all(|l| l.blocked(sender, direction));
                }
                return;
            }
            if direction > 0 {
                0
            } else {
                count - 1
            }
        } else {
            stepped as usize
        };
        self.apply_selection(tree, timer, new_index, fire_listeners, now_ms);
    }

    /// Commit a selection change: update the index and focus, bring the new
    /// selection into view, then notify listeners in registration order.
    fn apply_selection(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        new_index: usize,
        fire_listeners: bool,
        now_ms: u64,
    ) {
        let children: Vec<WidgetId> = tree.children(self.id).to_vec();
        let unselected = self.selected_index.and_then(|i| children.get(i).copied());
        let selected = children[new_index];

        self.selected_index = Some(new_index);
        self.move_focus_to(tree, selected);

        let target = self.scroll_target_for(tree, new_index);
        if target != self.scroll_offset {
            match self.animation_type {
                AnimationType::None => {
                    self.scroll_offset = target;
                    self.apply_scroll(tree);
                }
                AnimationType::Linear => {
                    self.start_animation(
                        timer,
                        target,
                        SELECT_ANIMATION_MS,
                        AnimKind::Select,
                        now_ms,
                    );
                }
            }
        }

        if fire_listeners {
            let sender = self.id;
            self.item_selected_listeners
                .notify_all(|l| l.item_selected(sender, selected, unselected));
        }
    }

    fn move_focus_to(&mut self, tree: &mut WidgetTree, widget: WidgetId) {
        if self.focused_widget == Some(widget) {
            return;
        }
        if let Some(old) = self.focused_widget {
            if tree.contains(old) {
                tree.set_focused(old, false);
            }
        }
        tree.set_focused(widget, true);
        self.focused_widget = Some(widget);
    }

    /// Explicitly move the focused-widget reference to `widget`, which must
    /// be an item of this list (`None` clears it).
    pub fn set_focused_widget(&mut self, tree: &mut WidgetTree, widget: Option<WidgetId>) {
        match widget {
            Some(w) if tree.parent(w) == Some(self.id) => self.move_focus_to(tree, w),
            Some(_) => {}
            None => {
                if let Some(old) = self.focused_widget.take() {
                    if tree.contains(old) {
                        tree.set_focused(old, false);
                    }
                }
            }
        }
    }

    // ── Widget state ─────────────────────────────────────────────────

    /// Set the list box's own bounds, rebuild, and notify bounds observers.
    pub fn set_bounds(&mut self, tree: &mut WidgetTree, bounds: Region) {
        if let Some(state) = tree.get_mut(self.id) {
            state.bounds = bounds;
        }
        self.rebuild(tree);
        let sender = self.id;
        self.widget_listeners
            .notify_all(|l| l.bounds_changed(sender, bounds));
    }

    /// React to an externally changed child: re-run the layout pass.
    ///
    /// No-op for widgets that are not items of this list.
    pub fn child_bounds_changed(&mut self, tree: &mut WidgetTree, child: WidgetId) {
        if tree.parent(child) == Some(self.id) {
            self.rebuild(tree);
        }
    }

    /// Set the focus flag on the list box and its subtree, and notify focus
    /// observers.
    pub fn set_focused(&mut self, tree: &mut WidgetTree, focused: bool) {
        tree.set_focused(self.id, focused);
        let sender = self.id;
        self.widget_listeners
            .notify_all(|l| l.focus_changed(sender, focused));
    }

    /// Set the enabled flag on the list box and its subtree.
    pub fn set_enabled(&mut self, tree: &mut WidgetTree, enabled: bool) {
        tree.set_enabled(self.id, enabled);
    }

    // ── Scrolling ────────────────────────────────────────────────────

    /// Set the scroll offset directly and reposition children.
    pub fn set_scroll_offset(&mut self, tree: &mut WidgetTree, offset: i32) {
        self.scroll_offset = offset;
        self.apply_scroll(tree);
    }

    /// Whether the first item lies fully outside the padded viewport.
    pub fn list_front_outside_bounds(&self, tree: &WidgetTree) -> bool {
        self.item_outside_bounds(tree, tree.children(self.id).first().copied())
    }

    /// Whether the last item lies fully outside the padded viewport.
    pub fn list_back_outside_bounds(&self, tree: &WidgetTree) -> bool {
        self.item_outside_bounds(tree, tree.children(self.id).last().copied())
    }

    fn item_outside_bounds(&self, tree: &WidgetTree, item: Option<WidgetId>) -> bool {
        let Some(item) = item else {
            return false;
        };
        let (Some(state), Some(item_state)) = (tree.get(self.id), tree.get(item)) else {
            return false;
        };
        let viewport =
            Region::new(0, 0, state.bounds.width, state.bounds.height).shrink(state.padding);
        !item_state.bounds.overlaps(viewport)
    }

    // ── Input dispatch ───────────────────────────────────────────────

    /// Handle a pointer press. Consumes the event (returns `true`) when the
    /// point is inside an enabled, visible, non-empty list.
    ///
    /// Cancels any in-flight animation — no animation callbacks fire after
    /// the cancellation — and begins a touch sequence.
    pub fn pointer_pressed(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        event: PointerEvent,
        now_ms: u64,
    ) -> bool {
        let Some(state) = tree.get(self.id) else {
            return false;
        };
        if !state.enabled || !state.visible {
            return false;
        }
        let Some(absolute) = tree.absolute_region(self.id) else {
            return false;
        };
        if !absolute.contains(event.pos.x, event.pos.y) {
            return false;
        }
        if tree.children(self.id).is_empty() {
            return false;
        }

        if self.phase == ScrollPhase::Animating {
            self.cancel_animation(timer);
        }
        self.phase = ScrollPhase::Touching;
        self.touched_offset_at_press = self.scroll_offset;
        self.press_pos = event.pos;
        self.active_pointer_id = event.pointer_id;
        self.tracker.reset();
        self.tracker.add_sample(now_ms, event.pos);
        log::trace!("touch begin at offset {}", self.scroll_offset);
        true
    }

    /// Handle a pointer move. Consumed only during a touch sequence from the
    /// same pointer.
    ///
    /// The content follows the finger: offset = offset-at-press plus the
    /// press-to-current delta along the orientation axis. No clamping —
    /// overscroll is permitted while the finger is down.
    pub fn pointer_moved(
        &mut self,
        tree: &mut WidgetTree,
        event: PointerEvent,
        now_ms: u64,
    ) -> bool {
        if self.phase != ScrollPhase::Touching || event.pointer_id != self.active_pointer_id {
            return false;
        }
        self.tracker.add_sample(now_ms, event.pos);
        let delta = self.axis(self.press_pos) - self.axis(event.pos);
        self.scroll_offset = self.touched_offset_at_press + delta;
        self.apply_scroll(tree);
        true
    }

    /// Handle a pointer release, ending the touch sequence.
    ///
    /// A slow release settles to the nearest item boundary; a fast one
    /// flings, decelerating linearly to a target clamped to the scroll range
    /// unless wrapping. With [`AnimationType::None`] the end position applies
    /// instantly; with [`AnimationType::Linear`] an animation starts.
    pub fn pointer_released(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        event: PointerEvent,
        now_ms: u64,
    ) -> bool {
        if self.phase != ScrollPhase::Touching || event.pointer_id != self.active_pointer_id {
            return false;
        }
        self.tracker.add_sample(now_ms, event.pos);
        let (vx, vy) = self.tracker.velocity();
        let velocity = match self.orientation {
            Orientation::Horizontal => vx,
            Orientation::Vertical => vy,
        };
        log::trace!(
            "touch release, velocity {velocity:.3} px/ms, direction {:?}",
            self.tracker.direction()
        );

        let (target, duration) = if velocity.abs() < RELEASE_VELOCITY_THRESHOLD {
            (self.nearest_item_boundary(tree), SETTLE_ANIMATION_MS)
        } else {
            // The finger moved by `velocity`; the content moves against it.
            let distance = (velocity * FLING_ANIMATION_MS as f64 / 2.0).round() as i32;
            let mut target = self.scroll_offset - distance;
            if !self.wrapping {
                target = target.clamp(0, self.max_scroll(tree));
            }
            (target, FLING_ANIMATION_MS)
        };

        match self.animation_type {
            AnimationType::None => {
                self.scroll_offset = target;
                self.apply_scroll(tree);
                self.phase = ScrollPhase::Idle;
                self.commit_touch_settle(tree);
            }
            AnimationType::Linear => {
                if target == self.scroll_offset {
                    self.phase = ScrollPhase::Idle;
                    self.commit_touch_settle(tree);
                } else {
                    self.start_animation(timer, target, duration, AnimKind::Touch, now_ms);
                }
            }
        }
        true
    }

    /// Handle a key press: arrow keys along the orientation axis navigate.
    ///
    /// Consumed when the key maps to this list's axis and the list is
    /// non-empty and enabled; blocked navigation still consumes the key.
    pub fn key_pressed(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        event: KeyEvent,
        now_ms: u64,
    ) -> bool {
        let Some(state) = tree.get(self.id) else {
            return false;
        };
        if !state.enabled || tree.children(self.id).is_empty() {
            return false;
        }
        match (self.orientation, event.code) {
            (Orientation::Vertical, KeyCode::Up) | (Orientation::Horizontal, KeyCode::Left) => {
                self.select_previous_item(tree, timer, true, now_ms);
                true
            }
            (Orientation::Vertical, KeyCode::Down) | (Orientation::Horizontal, KeyCode::Right) => {
                self.select_next_item(tree, timer, true, now_ms);
                true
            }
            _ => false,
        }
    }

    // ── Animation ────────────────────────────────────────────────────

    /// Advance the in-flight animation. Invoked by the host on every timer
    /// tick; a tick in any phase other than `Animating` is a safe no-op.
    ///
    /// When the animation completes the offset snaps to its target, the
    /// timer is unregistered exactly once, and — for touch-driven
    /// animations — the resting index is committed, firing `item_selected`
    /// if it differs from the index before the gesture.
    pub fn run_timer_event(
        &mut self,
        tree: &mut WidgetTree,
        timer: &mut dyn TimerService,
        now_ms: u64,
    ) {
        if self.phase != ScrollPhase::Animating {
            return;
        }
        let elapsed = now_ms.saturating_sub(self.anim_start_ms);
        let t = if elapsed >= self.anim_duration_ms {
            1.0
        } else {
            elapsed as f64 / self.anim_duration_ms as f64
        };
        self.scroll_offset = lerp(self.offset_from, self.offset_to, t);
        self.apply_scroll(tree);

        if elapsed >= self.anim_duration_ms {
            debug_assert!(self.timer_registered, "animating without a timer registration");
            if self.timer_registered {
                timer.unregister();
                self.timer_registered = false;
            }
            self.phase = ScrollPhase::Idle;
            log::debug!("animation finished at offset {}", self.scroll_offset);
            if self.anim_kind == AnimKind::Touch {
                self.commit_touch_settle(tree);
            }
        }
    }

    /// Cancel any in-flight animation, leaving the scroll offset where the
    /// last tick put it. Unregisters the timer if registered; safe to call
    /// in any phase. Must be called before dropping an animating list box.
    pub fn cancel_animation(&mut self, timer: &mut dyn TimerService) {
        if self.timer_registered {
            timer.unregister();
            self.timer_registered = false;
        }
        if self.phase == ScrollPhase::Animating {
            self.phase = ScrollPhase::Idle;
            log::debug!("animation cancelled at offset {}", self.scroll_offset);
        }
    }

    /// Begin a new animation toward `to`, cancelling any prior one first so
    /// at most one animation is in flight and timer registrations never
    /// duplicate.
    fn start_animation(
        &mut self,
        timer: &mut dyn TimerService,
        to: i32,
        duration_ms: u64,
        kind: AnimKind,
        now_ms: u64,
    ) {
        if self.phase == ScrollPhase::Animating {
            self.cancel_animation(timer);
        }
        self.offset_from = self.scroll_offset;
        self.offset_to = to;
        self.anim_start_ms = now_ms;
        self.anim_duration_ms = duration_ms.max(1);
        self.anim_kind = kind;
        self.phase = ScrollPhase::Animating;
        debug_assert!(!self.timer_registered, "duplicate timer registration");
        timer.register(TICK_PERIOD_MS);
        self.timer_registered = true;
        log::debug!(
            "animation start {} -> {to} over {}ms",
            self.offset_from,
            self.anim_duration_ms
        );
    }

    /// After a touch gesture comes to rest, derive the item at the resting
    /// position and fire `item_selected` if the selection changed.
    fn commit_touch_settle(&mut self, tree: &mut WidgetTree) {
        let Some(new_index) = self.index_at_offset(tree, self.scroll_offset) else {
            return;
        };
        if self.selected_index == Some(new_index) {
            return;
        }
        let children: Vec<WidgetId> = tree.children(self.id).to_vec();
        let unselected = self.selected_index.and_then(|i| children.get(i).copied());
        let selected = children[new_index];
        self.selected_index = Some(new_index);
        self.move_focus_to(tree, selected);
        let sender = self.id;
        self.item_selected_listeners
            .notify_all(|l| l.item_selected(sender, selected, unselected));
    }

    // ── Layout ───────────────────────────────────────────────────────

    /// Recompute every item's bounds from scratch.
    ///
    /// Main-axis extents come from the layout resolver (fixed as-is, wrap to
    /// measured content, fill-remaining sharing the leftover padded extent).
    /// Each item is placed at the cumulative sum of its predecessors'
    /// extents, shifted by the scroll offset; with autosizing the cross-axis
    /// extent is forced to the box's padded cross extent. Deterministic:
    /// same tree and offset, same bounds.
    pub fn rebuild(&mut self, tree: &mut WidgetTree) {
        let Some(state) = tree.get(self.id) else {
            return;
        };
        let padding = state.padding;
        let size = state.bounds.size();
        let (inner_main, inner_cross) = match self.orientation {
            Orientation::Vertical => (
                (size.height - padding.height()).max(0),
                (size.width - padding.width()).max(0),
            ),
            Orientation::Horizontal => (
                (size.width - padding.width()).max(0),
                (size.height - padding.height()).max(0),
            ),
        };

        let children: Vec<WidgetId> = tree.children(self.id).to_vec();
        if children.is_empty() {
            return;
        }

        let mut policies = Vec::with_capacity(children.len());
        let mut contents = Vec::with_capacity(children.len());
        for &child in &children {
            let Some(child_state) = tree.get(child) else {
                policies.push(SizePolicy::Fixed(0));
                contents.push(0);
                continue;
            };
            match self.orientation {
                Orientation::Vertical => {
                    policies.push(child_state.height_policy);
                    contents.push(child_state.content_size.height);
                }
                Orientation::Horizontal => {
                    policies.push(child_state.width_policy);
                    contents.push(child_state.content_size.width);
                }
            }
        }
        let extents = resolve_extents(&policies, &contents, inner_main);

        for (i, &child) in children.iter().enumerate() {
            let Some(child_state) = tree.get_mut(child) else {
                continue;
            };
            let cross = if self.auto_size {
                inner_cross
            } else {
                match self.orientation {
                    Orientation::Vertical => resolve_cross_extent(
                        child_state.width_policy,
                        child_state.content_size.width,
                        inner_cross,
                    ),
                    Orientation::Horizontal => resolve_cross_extent(
                        child_state.height_policy,
                        child_state.content_size.height,
                        inner_cross,
                    ),
                }
            };
            match self.orientation {
                Orientation::Vertical => {
                    child_state.bounds.height = extents[i];
                    child_state.bounds.width = cross;
                }
                Orientation::Horizontal => {
                    child_state.bounds.width = extents[i];
                    child_state.bounds.height = cross;
                }
            }
        }

        self.apply_scroll(tree);
    }

    /// Reposition children along the main axis for the current scroll
    /// offset, without re-resolving sizes.
    fn apply_scroll(&self, tree: &mut WidgetTree) {
        let Some(state) = tree.get(self.id) else {
            return;
        };
        let padding = state.padding;
        let children: Vec<WidgetId> = tree.children(self.id).to_vec();
        let mut cursor = 0;
        for &child in &children {
            let Some(child_state) = tree.get_mut(child) else {
                continue;
            };
            match self.orientation {
                Orientation::Vertical => {
                    child_state.bounds.x = padding.left;
                    child_state.bounds.y = padding.top + cursor - self.scroll_offset;
                    cursor += child_state.bounds.height;
                }
                Orientation::Horizontal => {
                    child_state.bounds.y = padding.top;
                    child_state.bounds.x = padding.left + cursor - self.scroll_offset;
                    cursor += child_state.bounds.width;
                }
            }
        }
    }

    // ── Scroll math ──────────────────────────────────────────────────

    fn axis(&self, offset: Offset) -> i32 {
        match self.orientation {
            Orientation::Horizontal => offset.x,
            Orientation::Vertical => offset.y,
        }
    }

    fn main_extent(&self, region: Region) -> i32 {
        match self.orientation {
            Orientation::Horizontal => region.width,
            Orientation::Vertical => region.height,
        }
    }

    /// Main-axis extents of all items, in order.
    fn item_extents(&self, tree: &WidgetTree) -> Vec<i32> {
        tree.children(self.id)
            .iter()
            .filter_map(|&child| tree.get(child))
            .map(|child_state| self.main_extent(child_state.bounds))
            .collect()
    }

    /// The box's padded extent along the main axis.
    fn viewport_extent(&self, tree: &WidgetTree) -> i32 {
        let Some(state) = tree.get(self.id) else {
            return 0;
        };
        match self.orientation {
            Orientation::Vertical => (state.bounds.height - state.padding.height()).max(0),
            Orientation::Horizontal => (state.bounds.width - state.padding.width()).max(0),
        }
    }

    /// Largest meaningful scroll offset: content extent minus viewport,
    /// clamped at zero.
    fn max_scroll(&self, tree: &WidgetTree) -> i32 {
        let content: i32 = self.item_extents(tree).iter().sum();
        (content - self.viewport_extent(tree)).max(0)
    }

    /// The item start offset nearest to the current scroll position.
    /// Ties resolve to the earlier boundary. Zero for an empty list.
    fn nearest_item_boundary(&self, tree: &WidgetTree) -> i32 {
        let extents = self.item_extents(tree);
        let mut best = 0;
        let mut best_distance = i32::MAX;
        let mut start = 0;
        for extent in extents {
            let distance = (start - self.scroll_offset).abs();
            if distance < best_distance {
                best = start;
                best_distance = distance;
            }
            start += extent;
        }
        best
    }

    /// Index of the item whose span contains `offset`; clamped to the first/
    /// last item for offsets outside the content. `None` for an empty list.
    fn index_at_offset(&self, tree: &WidgetTree, offset: i32) -> Option<usize> {
        let extents = self.item_extents(tree);
        if extents.is_empty() {
            return None;
        }
        if offset < 0 {
            return Some(0);
        }
        let mut end = 0;
        for (i, extent) in extents.iter().enumerate() {
            end += extent;
            if offset < end {
                return Some(i);
            }
        }
        Some(extents.len() - 1)
    }

    /// The smallest scroll movement that brings item `index` fully into the
    /// padded viewport, clamped to the valid scroll range.
    fn scroll_target_for(&self, tree: &WidgetTree, index: usize) -> i32 {
        let extents = self.item_extents(tree);
        let viewport = self.viewport_extent(tree);
        let start: i32 = extents.iter().take(index).sum();
        let end = start + extents.get(index).copied().unwrap_or(0);
        let target = if start < self.scroll_offset {
            start
        } else if end > self.scroll_offset + viewport {
            end - viewport
        } else {
            self.scroll_offset
        };
        target.clamp(0, self.max_scroll(tree))
    }
}

impl Drop for ListBox {
    fn drop(&mut self) {
        // Every timer registration must have been paired with a
        // deregistration (cancel_animation or animation completion).
        debug_assert!(
            !self.timer_registered,
            "list box dropped while registered with the host timer"
        );
    }
}

// ===========================================================================
// Tests
// ===========================================================================
