//! Input event types decoupled from the host platform.
//!
//! Defines [`PointerEvent`], [`KeyEvent`], [`KeyCode`] and the top-level
//! [`InputEvent`]. The embedding host translates its native input into these
//! types so the rest of the toolkit never depends on a platform input API.
//! Pointer events carry no timestamp themselves — the host passes the event
//! time explicitly to each dispatch call, keeping the core deterministic.

use crate::geometry::Offset;

// ---------------------------------------------------------------------------
// PointerEvent
// ---------------------------------------------------------------------------

/// A pointer (touch or mouse) sample in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    /// Position in root coordinates.
    pub pos: Offset,
    /// Which pointer this sample belongs to (multi-touch id, 0 for mice).
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Create a new pointer event.
    pub fn new(x: i32, y: i32, pointer_id: u32) -> Self {
        Self { pos: Offset::new(x, y), pointer_id }
    }
}

// ---------------------------------------------------------------------------
// KeyCode / KeyEvent
// ---------------------------------------------------------------------------

/// Keyboard/keypad key, decoupled from the host's native codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    /// Any key this toolkit does not interpret itself.
    Other(i32),
}

/// A key press with the host's raw code preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Translated key code.
    pub code: KeyCode,
    /// The host's untranslated native key code.
    pub native_code: i32,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: KeyCode, native_code: i32) -> Self {
        Self { code, native_code }
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Top-level input event as delivered by the host, with the event time in
/// milliseconds for pointer phases (velocity tracking needs it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    PointerPressed { event: PointerEvent, now_ms: u64 },
    PointerMoved { event: PointerEvent, now_ms: u64 },
    PointerReleased { event: PointerEvent, now_ms: u64 },
    KeyPressed { event: KeyEvent, now_ms: u64 },
}

// ===========================================================================
// Tests
// ===========================================================================
