//! ListenerSet: ordered, idempotent, mutation-safe broadcast registry.
//!
//! Observer callbacks in kinetic-ui are registered into a [`ListenerSet`].
//! The set never owns its listeners — entries are weak references, so a
//! listener dropped by its owner simply stops receiving broadcasts. The
//! registry is safe to mutate while a broadcast over it is in progress: a
//! listener removed mid-broadcast is not invoked again in the same broadcast,
//! and one added mid-broadcast waits for the next.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An ordered registry of weakly-held listeners.
///
/// Iteration order is registration order. `add` and `remove` are idempotent:
/// adding a listener twice keeps one entry, removing an absent one is a
/// no-op. Interior mutability (single-threaded `RefCell`) lets a listener
/// mutate the set it is being notified from.
pub struct ListenerSet<L: ?Sized> {
    entries: RefCell<Vec<Weak<RefCell<L>>>>,
}

impl<L: ?Sized> ListenerSet<L> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { entries: RefCell::new(Vec::new()) }
    }

    /// Register a listener at the end of the broadcast order.
    ///
    /// No-op if the same listener (by pointer identity) is already registered.
    pub fn add(&self, listener: &Rc<RefCell<L>>) {
        let target = Rc::as_ptr(listener);
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|entry| std::ptr::addr_eq(entry.as_ptr(), target)) {
            return;
        }
        entries.push(Rc::downgrade(listener));
    }

    /// Unregister a listener. No-op if it was not registered.
    pub fn remove(&self, listener: &Rc<RefCell<L>>) {
        let target = Rc::as_ptr(listener);
        self.entries
            .borrow_mut()
            .retain(|entry| !std::ptr::addr_eq(entry.as_ptr(), target));
    }

    /// Number of live registered listeners.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Whether no live listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister every listener.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Invoke `f` once per live registered listener, in registration order.
    ///
    /// The broadcast runs over a snapshot of the registration list taken at
    /// entry, and each entry is re-validated against the live list just
    /// before its invocation. So: a listener removed from within the
    /// broadcast is not invoked afterwards, a listener added from within the
    /// broadcast is not invoked until the next one, and a listener dropped by
    /// its owner is skipped. Dead entries are pruned at the end.
    pub fn notify_all(&self, mut f: impl FnMut(&mut L)) {
        let snapshot: Vec<Weak<RefCell<L>>> = self.entries.borrow().clone();
        for weak in &snapshot {
            let still_registered = self
                .entries
                .borrow()
                .iter()
                .any(|entry| std::ptr::addr_eq(entry.as_ptr(), weak.as_ptr()));
            if !still_registered {
                continue;
            }
            if let Some(listener) = weak.upgrade() {
                f(&mut *listener.borrow_mut());
            }
        }
        self.entries
            .borrow_mut()
            .retain(|entry| entry.strong_count() > 0);
    }
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerSet<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet").field("len", &self.len()).finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    trait Counter {
        fn bump(&mut self);
        fn count(&self) -> u32;
    }

    struct TestCounter(u32);

    impl Counter for TestCounter {
        fn bump(&mut self) {
            self.0 += 1;
        }
        fn count(&self) -> u32 {
            self.0
        }
    }

    fn counter() -> Rc<RefCell<dyn Counter>> {
        Rc::new(RefCell::new(TestCounter(0)))
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    #[test]
    fn new_set_is_empty() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn add_registers() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        set.add(&a);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn add_twice_keeps_one_entry() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        set.add(&a);
        set.add(&a);
        assert_eq!(set.len(), 1);

        set.notify_all(|l| l.bump());
        assert_eq!(a.borrow().count(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        set.remove(&a); // never added
        assert!(set.is_empty());
    }

    #[test]
    fn remove_unregisters() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        set.add(&a);
        set.remove(&a);
        assert!(set.is_empty());

        set.notify_all(|l| l.bump());
        assert_eq!(a.borrow().count(), 0);
    }

    #[test]
    fn clear_unregisters_all() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let b = counter();
        set.add(&a);
        set.add(&b);
        set.clear();
        assert!(set.is_empty());
    }

    // -----------------------------------------------------------------------
    // Broadcast
    // -----------------------------------------------------------------------

    #[test]
    fn notify_all_invokes_each_once() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let b = counter();
        set.add(&a);
        set.add(&b);

        set.notify_all(|l| l.bump());
        assert_eq!(a.borrow().count(), 1);
        assert_eq!(b.borrow().count(), 1);
    }

    #[test]
    fn notify_all_registration_order() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        struct Tagged {
            tag: u32,
            order: Rc<RefCell<Vec<u32>>>,
        }
        impl Counter for Tagged {
            fn bump(&mut self) {
                self.order.borrow_mut().push(self.tag);
            }
            fn count(&self) -> u32 {
                0
            }
        }

        let first: Rc<RefCell<dyn Counter>> =
            Rc::new(RefCell::new(Tagged { tag: 1, order: Rc::clone(&order) }));
        let second: Rc<RefCell<dyn Counter>> =
            Rc::new(RefCell::new(Tagged { tag: 2, order: Rc::clone(&order) }));
        set.add(&first);
        set.add(&second);

        set.notify_all(|l| l.bump());
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn dropped_listener_is_skipped() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let b = counter();
        set.add(&a);
        set.add(&b);
        drop(a);

        let mut invoked = 0;
        set.notify_all(|_| invoked += 1);
        assert_eq!(invoked, 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn removal_during_broadcast_suppresses_pending_call() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let b = counter();
        set.add(&a);
        set.add(&b);

        // While notifying `a` (the first listener), remove `b`: `b` must not
        // be invoked in the same broadcast.
        let mut first = true;
        set.notify_all(|l| {
            if first {
                first = false;
                set.remove(&b);
            }
            l.bump();
        });
        assert_eq!(a.borrow().count(), 1);
        assert_eq!(b.borrow().count(), 0);
    }

    #[test]
    fn addition_during_broadcast_waits_for_next() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let late = counter();
        set.add(&a);

        set.notify_all(|l| {
            set.add(&late);
            l.bump();
        });
        assert_eq!(a.borrow().count(), 1);
        assert_eq!(late.borrow().count(), 0);

        set.notify_all(|l| l.bump());
        assert_eq!(a.borrow().count(), 2);
        assert_eq!(late.borrow().count(), 1);
    }

    #[test]
    fn self_removal_during_broadcast() {
        let set: ListenerSet<dyn Counter> = ListenerSet::new();
        let a = counter();
        let b = counter();
        set.add(&a);
        set.add(&b);

        // The first listener removes itself; the second still runs.
        let mut first = true;
        set.notify_all(|l| {
            if first {
                first = false;
                set.remove(&a);
            }
            l.bump();
        });
        assert_eq!(a.borrow().count(), 1);
        assert_eq!(b.borrow().count(), 1);
        assert_eq!(set.len(), 1);
    }
}
