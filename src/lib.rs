//! # kinetic-ui
//!
//! A host-driven widget toolkit core with kinetic touch scrolling.
//!
//! kinetic-ui provides the engine behind a native-looking UI tree without an
//! OS-level UI framework: a composable widget tree, a layout-negotiation
//! protocol, velocity-based touch scrolling, and a timer-driven animation
//! state machine. The crate never renders, never reads input devices, and
//! never owns a thread — the embedding host delivers pointer/key events and
//! periodic timer ticks (with explicit millisecond timestamps) and consumes a
//! read-only paint list in return, which keeps the core deterministic.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** — Offset, Size, Region, Spacing pixel primitives
//! - **[`tree`]** — Slotmap-backed widget arena: ownership, flags, hit testing
//! - **[`listener`]** — Ordered, idempotent, mutation-safe broadcast registries
//! - **[`layout`]** — Sizing sentinels and the extent resolver
//! - **[`input`]** — Host-decoupled input events and the touch motion tracker
//! - **[`timer`]** — Paired register/unregister contract to the host scheduler
//! - **[`widgets`]** — ListBox: scrollable, navigable, animatable list container
//! - **[`testing`]** — Headless Pilot harness with a fake clock and timer

// Foundation
pub mod geometry;

// Core systems
pub mod layout;
pub mod listener;
pub mod tree;

// Host interfaces
pub mod input;
pub mod timer;

// Widget system
pub mod widgets;

// Test harness
pub mod testing;
