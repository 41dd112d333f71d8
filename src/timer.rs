//! The host timer contract.
//!
//! kinetic-ui never owns a thread or a clock: periodic ticks come from a
//! host-owned scheduler, borrowed through [`TimerService`]. A component
//! registers when it starts animating and unregisters exactly once when the
//! animation ends or is cancelled — every registration is paired with one
//! deregistration before the component is dropped.

/// Tick period a list box requests while animating, in milliseconds.
pub const TICK_PERIOD_MS: u32 = 16;

/// A host-owned periodic timer the core can subscribe to.
///
/// The host delivers ticks by calling the subscriber's tick entry point
/// (e.g. [`ListBox::run_timer_event`](crate::widgets::ListBox::run_timer_event))
/// on its event loop; ticks delivered outside an animation are safe no-ops.
pub trait TimerService {
    /// Start delivering ticks every `period_ms` milliseconds.
    fn register(&mut self, period_ms: u32);

    /// Stop delivering ticks.
    fn unregister(&mut self);
}

/// A timer service that discards registrations.
///
/// Useful when driving a list box whose animation type is
/// [`AnimationType::None`](crate::widgets::AnimationType::None), where no
/// animation can start.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTimer;

impl TimerService for NullTimer {
    fn register(&mut self, _period_ms: u32) {}

    fn unregister(&mut self) {}
}
