//! Headless testing harness: Pilot, fake services, tree snapshots.
//!
//! Use the [`Pilot`] to drive a widget tree and list box without a real host:
//! it plays the host's roles (input source, timer service, clock) with fully
//! controlled fakes. Use [`tree_to_string`] to capture the laid-out tree as
//! plain text for snapshot-style assertions.

pub mod pilot;

pub use pilot::{tree_to_string, FakeTimer, Pilot, RecordingListener, SelectionEvent};
