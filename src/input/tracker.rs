//! TouchMotionTracker: pointer sample history and velocity derivation.
//!
//! The tracker records a short, bounded history of `(timestamp, position)`
//! pointer samples and derives the gesture's instantaneous direction and
//! velocity from the retained window. It is reset at the start of each touch
//! sequence. Timestamps are host-supplied milliseconds; the tracker never
//! reads a clock itself.

use std::collections::VecDeque;

use crate::geometry::Offset;

/// How long a sample stays relevant, in milliseconds. Samples older than
/// this relative to the newest sample are evicted on append.
pub const RETENTION_MS: u64 = 200;

/// Hard cap on retained samples, bounding memory for pathological hosts that
/// deliver moves faster than the retention window can evict.
const MAX_SAMPLES: usize = 32;

/// Records recent pointer samples and derives direction and velocity.
#[derive(Debug, Clone, Default)]
pub struct TouchMotionTracker {
    samples: VecDeque<(u64, Offset)>,
}

impl TouchMotionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self { samples: VecDeque::new() }
    }

    /// Forget all samples. Called when a new touch sequence begins.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Append a pointer sample and evict everything outside the retention
    /// window ending at `now_ms`.
    pub fn add_sample(&mut self, now_ms: u64, pos: Offset) {
        let cutoff = now_ms.saturating_sub(RETENTION_MS);
        while let Some(&(t, _)) = self.samples.front() {
            if t < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((now_ms, pos));
    }

    /// Number of currently retained samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Pointer velocity in pixels per millisecond, per axis, over the
    /// retained window.
    ///
    /// Zero if fewer than two samples exist or if time has not advanced
    /// between the oldest and newest sample.
    pub fn velocity(&self) -> (f64, f64) {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back())
        else {
            return (0.0, 0.0);
        };
        if t1 <= t0 {
            return (0.0, 0.0);
        }
        let dt = (t1 - t0) as f64;
        let delta = p1 - p0;
        (delta.x as f64 / dt, delta.y as f64 / dt)
    }

    /// Per-axis direction sign of the gesture over the retained window:
    /// −1, 0, or +1 in each component. Zero with fewer than two samples.
    pub fn direction(&self) -> Offset {
        let (Some(&(_, p0)), Some(&(_, p1))) = (self.samples.front(), self.samples.back())
        else {
            return Offset::ZERO;
        };
        if self.samples.len() < 2 {
            return Offset::ZERO;
        }
        let delta = p1 - p0;
        Offset::new(delta.x.signum(), delta.y.signum())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tracker_has_no_samples() {
        let tracker = TouchMotionTracker::new();
        assert_eq!(tracker.sample_count(), 0);
        assert_eq!(tracker.velocity(), (0.0, 0.0));
        assert_eq!(tracker.direction(), Offset::ZERO);
    }

    #[test]
    fn single_sample_has_zero_velocity() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(100, Offset::new(10, 10));
        assert_eq!(tracker.velocity(), (0.0, 0.0));
        assert_eq!(tracker.direction(), Offset::ZERO);
    }

    #[test]
    fn velocity_from_two_samples() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(0, 100));
        tracker.add_sample(50, Offset::new(25, 0));
        let (vx, vy) = tracker.velocity();
        assert!((vx - 0.5).abs() < f64::EPSILON);
        assert!((vy + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn velocity_spans_retained_window() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(0, 0));
        tracker.add_sample(40, Offset::new(10, 0));
        tracker.add_sample(80, Offset::new(40, 0));
        // (40 - 0) px over (80 - 0) ms.
        let (vx, _) = tracker.velocity();
        assert!((vx - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_timestamps_do_not_divide_by_zero() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(100, Offset::new(0, 0));
        tracker.add_sample(100, Offset::new(50, 0));
        assert_eq!(tracker.velocity(), (0.0, 0.0));
    }

    #[test]
    fn direction_signs() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(10, 10));
        tracker.add_sample(20, Offset::new(30, 4));
        assert_eq!(tracker.direction(), Offset::new(1, -1));
    }

    #[test]
    fn eviction_honors_retention_window() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(0, 0));
        tracker.add_sample(50, Offset::new(5, 0));
        // 300 - RETENTION_MS = 100: both earlier samples are evicted.
        tracker.add_sample(300, Offset::new(10, 0));
        assert_eq!(tracker.sample_count(), 1);
        assert_eq!(tracker.velocity(), (0.0, 0.0));
    }

    #[test]
    fn eviction_keeps_samples_inside_window() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(0, 0));
        tracker.add_sample(150, Offset::new(10, 0));
        tracker.add_sample(200, Offset::new(20, 0));
        // Cutoff is 0; everything stays.
        assert_eq!(tracker.sample_count(), 3);
    }

    #[test]
    fn sample_cap_bounds_history() {
        let mut tracker = TouchMotionTracker::new();
        for i in 0..100u64 {
            // Same timestamp: the retention window never evicts.
            tracker.add_sample(10, Offset::new(i as i32, 0));
        }
        assert!(tracker.sample_count() <= 32);
    }

    #[test]
    fn reset_clears_history() {
        let mut tracker = TouchMotionTracker::new();
        tracker.add_sample(0, Offset::new(0, 0));
        tracker.add_sample(10, Offset::new(5, 5));
        tracker.reset();
        assert_eq!(tracker.sample_count(), 0);
        assert_eq!(tracker.velocity(), (0.0, 0.0));
    }
}
