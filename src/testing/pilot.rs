//! Pilot: programmatic interaction with a headless widget tree.
//!
//! The `Pilot` owns a [`WidgetTree`] with a single [`ListBox`] root and plays
//! every host role the core needs: it delivers pointer and key events through
//! the tree's hit path, advances a manual millisecond clock, and stands in
//! for the host timer with a [`FakeTimer`] that records registration pairing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::Region;
use crate::input::event::{InputEvent, KeyCode, KeyEvent, PointerEvent};
use crate::layout::SizePolicy;
use crate::timer::{TimerService, TICK_PERIOD_MS};
use crate::tree::{WidgetId, WidgetState, WidgetTree};
use crate::widgets::{ItemSelectedListener, ListBox, Orientation, ScrollPhase};

// ---------------------------------------------------------------------------
// FakeTimer
// ---------------------------------------------------------------------------

/// A recording stand-in for the host timer service.
///
/// Tracks whether a registration is live and counts register/unregister
/// calls, so tests can assert the pairing contract: counts equal once the
/// animation ends, and never drift apart by more than one.
#[derive(Debug, Default)]
pub struct FakeTimer {
    /// Whether a registration is currently live.
    pub registered: bool,
    /// Total number of `register` calls.
    pub registers: u32,
    /// Total number of `unregister` calls.
    pub unregisters: u32,
    /// Period of the most recent registration, if any.
    pub period_ms: Option<u32>,
}

impl TimerService for FakeTimer {
    fn register(&mut self, period_ms: u32) {
        self.registered = true;
        self.registers += 1;
        self.period_ms = Some(period_ms);
    }

    fn unregister(&mut self) {
        self.registered = false;
        self.unregisters += 1;
    }
}

// ---------------------------------------------------------------------------
// RecordingListener
// ---------------------------------------------------------------------------

/// A selection event captured by [`RecordingListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// `item_selected` fired.
    Selected {
        selected: WidgetId,
        unselected: Option<WidgetId>,
    },
    /// `blocked` fired with the given direction.
    Blocked { direction: i32 },
}

/// An [`ItemSelectedListener`] that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingListener {
    /// Captured events, oldest first.
    pub events: Vec<SelectionEvent>,
}

impl RecordingListener {
    /// Create a listener handle ready to register with a list box.
    pub fn new() -> Rc<RefCell<RecordingListener>> {
        Rc::new(RefCell::new(RecordingListener::default()))
    }

    /// Count of `item_selected` events captured.
    pub fn selected_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SelectionEvent::Selected { .. }))
            .count()
    }

    /// Count of `blocked` events captured.
    pub fn blocked_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SelectionEvent::Blocked { .. }))
            .count()
    }
}

impl ItemSelectedListener for RecordingListener {
    fn item_selected(
        &mut self,
        _sender: WidgetId,
        selected: WidgetId,
        unselected: Option<WidgetId>,
    ) {
        self.events.push(SelectionEvent::Selected { selected, unselected });
    }

    fn blocked(&mut self, _sender: WidgetId, direction: i32) {
        self.events.push(SelectionEvent::Blocked { direction });
    }
}

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless host driving one list box.
///
/// # Examples
///
/// ```
/// use kinetic_ui::geometry::Region;
/// use kinetic_ui::testing::Pilot;
/// use kinetic_ui::widgets::Orientation;
///
/// let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
/// pilot.add_item(20);
/// pilot.add_item(20);
/// assert_eq!(pilot.list.selected_index(), Some(0));
/// ```
pub struct Pilot {
    /// The widget tree under test.
    pub tree: WidgetTree,
    /// The list box rooted in `tree`.
    pub list: ListBox,
    /// The fake host timer.
    pub timer: FakeTimer,
    now_ms: u64,
}

impl Pilot {
    /// Create a tree with a single list box root of the given bounds and
    /// orientation.
    pub fn new(bounds: Region, orientation: Orientation) -> Self {
        let mut tree = WidgetTree::new();
        let mut list = ListBox::new(&mut tree, WidgetState::new().with_bounds(bounds));
        list.set_orientation(&mut tree, orientation);
        Self {
            tree,
            list,
            timer: FakeTimer::default(),
            now_ms: 0,
        }
    }

    /// Append an item with a fixed extent along the orientation axis,
    /// filling the box on the cross axis.
    pub fn add_item(&mut self, extent: i32) -> WidgetId {
        let state = match self.list.orientation() {
            Orientation::Vertical => WidgetState::new()
                .with_height_policy(SizePolicy::Fixed(extent))
                .with_width_policy(SizePolicy::FillRemaining),
            Orientation::Horizontal => WidgetState::new()
                .with_width_policy(SizePolicy::Fixed(extent))
                .with_height_policy(SizePolicy::FillRemaining),
        };
        self.list.add_item(&mut self.tree, state)
    }

    /// Append an item with an explicit [`WidgetState`].
    pub fn add_item_state(&mut self, state: WidgetState) -> WidgetId {
        self.list.add_item(&mut self.tree, state)
    }

    /// Register a fresh recording listener on the list box.
    pub fn record_selections(&mut self) -> Rc<RefCell<RecordingListener>> {
        let listener = RecordingListener::new();
        let handle: Rc<RefCell<dyn ItemSelectedListener>> = listener.clone();
        self.list.add_item_selected_listener(&handle);
        listener
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// The pilot's current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Advance the clock without delivering anything.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Press pointer 0 at `(x, y)`. Returns whether the event was consumed.
    pub fn press(&mut self, x: i32, y: i32) -> bool {
        self.dispatch(InputEvent::PointerPressed {
            event: PointerEvent::new(x, y, 0),
            now_ms: self.now_ms,
        })
    }

    /// Move pointer 0 to `(x, y)`.
    pub fn drag_to(&mut self, x: i32, y: i32) -> bool {
        self.dispatch(InputEvent::PointerMoved {
            event: PointerEvent::new(x, y, 0),
            now_ms: self.now_ms,
        })
    }

    /// Release pointer 0 at `(x, y)`.
    pub fn release(&mut self, x: i32, y: i32) -> bool {
        self.dispatch(InputEvent::PointerReleased {
            event: PointerEvent::new(x, y, 0),
            now_ms: self.now_ms,
        })
    }

    /// Press a key.
    pub fn press_key(&mut self, code: KeyCode) -> bool {
        self.dispatch(InputEvent::KeyPressed {
            event: KeyEvent::new(code, 0),
            now_ms: self.now_ms,
        })
    }

    /// Dispatch a raw input event the way a host would: pointer presses walk
    /// the hit path from the root toward the topmost widget and stop at the
    /// first consumer; later touch phases go straight to the touching widget
    /// (pointer grab); keys go to the focused widget.
    pub fn dispatch(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerPressed { event, now_ms } => {
                let path = self.tree.hit_path(event.pos);
                if !path.contains(&self.list.id()) {
                    return false;
                }
                self.list
                    .pointer_pressed(&mut self.tree, &mut self.timer, event, now_ms)
            }
            InputEvent::PointerMoved { event, now_ms } => {
                self.list.pointer_moved(&mut self.tree, event, now_ms)
            }
            InputEvent::PointerReleased { event, now_ms } => {
                self.list
                    .pointer_released(&mut self.tree, &mut self.timer, event, now_ms)
            }
            InputEvent::KeyPressed { event, now_ms } => {
                self.list
                    .key_pressed(&mut self.tree, &mut self.timer, event, now_ms)
            }
        }
    }

    // ── Timer simulation ─────────────────────────────────────────────

    /// Advance the clock by one tick period and deliver a timer tick.
    pub fn tick(&mut self) {
        self.advance(u64::from(TICK_PERIOD_MS));
        self.list
            .run_timer_event(&mut self.tree, &mut self.timer, self.now_ms);
    }

    /// Tick until the list box leaves `Animating`, up to `max_ticks`.
    ///
    /// Returns the number of ticks delivered. Panics if the animation is
    /// still running after `max_ticks` — that means a runaway animation.
    pub fn run_until_idle(&mut self, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while self.list.phase() == ScrollPhase::Animating {
            assert!(ticks < max_ticks, "animation did not settle in {max_ticks} ticks");
            self.tick();
            ticks += 1;
        }
        ticks
    }
}

// ---------------------------------------------------------------------------
// Tree snapshots
// ---------------------------------------------------------------------------

/// Render the tree's bounds and flags as indented text, one widget per line.
///
/// Children are indented two spaces below their parent. Flags are appended
/// only when off-default, e.g. `[0,20 80x30] focused`.
pub fn tree_to_string(tree: &WidgetTree) -> String {
    let mut lines = Vec::new();
    if let Some(root) = tree.root() {
        append_widget(tree, root, 0, &mut lines);
    }
    lines.join("\n")
}

fn append_widget(tree: &WidgetTree, id: WidgetId, depth: usize, lines: &mut Vec<String>) {
    let Some(state) = tree.get(id) else {
        return;
    };
    let b = state.bounds;
    let mut line = format!(
        "{}[{},{} {}x{}]",
        "  ".repeat(depth),
        b.x,
        b.y,
        b.width,
        b.height
    );
    if !state.visible {
        line.push_str(" hidden");
    }
    if !state.enabled {
        line.push_str(" disabled");
    }
    if state.focused {
        line.push_str(" focused");
    }
    lines.push(line);
    for &child in tree.children(id) {
        append_widget(tree, child, depth + 1, lines);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pilot_builds_a_list() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
        pilot.add_item(20);
        pilot.add_item(20);
        assert_eq!(pilot.list.item_count(&pilot.tree), 2);
        assert_eq!(pilot.list.selected_index(), Some(0));
    }

    #[test]
    fn press_routes_through_hit_path() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
        pilot.add_item(20);
        assert!(pilot.press(10, 10));
        assert!(!pilot.press(200, 200)); // outside: nothing on the hit path
    }

    #[test]
    fn clock_advances() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
        assert_eq!(pilot.now(), 0);
        pilot.advance(100);
        assert_eq!(pilot.now(), 100);
        pilot.tick();
        assert_eq!(pilot.now(), 100 + u64::from(TICK_PERIOD_MS));
    }

    #[test]
    fn fake_timer_counts_pairing() {
        let mut timer = FakeTimer::default();
        timer.register(16);
        assert!(timer.registered);
        assert_eq!(timer.period_ms, Some(16));
        timer.unregister();
        assert!(!timer.registered);
        assert_eq!(timer.registers, 1);
        assert_eq!(timer.unregisters, 1);
    }

    #[test]
    fn recording_listener_counts() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 100), Orientation::Vertical);
        pilot.add_item(20);
        pilot.add_item(20);
        let listener = pilot.record_selections();

        assert!(pilot.press_key(KeyCode::Down));
        assert_eq!(listener.borrow().selected_count(), 1);
        assert_eq!(listener.borrow().blocked_count(), 0);
    }

    #[test]
    fn tree_to_string_renders_indented_bounds() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
        pilot.add_item(20);
        pilot.add_item(30);
        let dump = tree_to_string(&pilot.tree);
        assert_eq!(dump, "[0,0 80x60]\n  [0,0 80x20]\n  [0,20 80x30]");
    }

    #[test]
    fn tree_to_string_marks_flags() {
        let mut pilot = Pilot::new(Region::new(0, 0, 80, 60), Orientation::Vertical);
        let item = pilot.add_item(20);
        pilot.tree.get_mut(item).unwrap().visible = false;
        let dump = tree_to_string(&pilot.tree);
        assert!(dump.contains("hidden"));
    }

    #[test]
    fn tree_to_string_empty_tree() {
        let tree = WidgetTree::new();
        assert_eq!(tree_to_string(&tree), "");
    }
}
