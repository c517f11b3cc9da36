//! Frame-rate throttling and timebase reconciliation.
//!
//! The frame source delivers timestamps on its own monotonic clock (seconds
//! since device boot). Published stamps must be wall-clock epoch. The
//! offset between the two is measured once, on the first accepted frame,
//! and never changes afterwards so that stamp deltas exactly equal source
//! timestamp deltas.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// ROS timestamp split into whole seconds and fractional nanoseconds.
///
/// Both components are produced by truncation, not rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosStamp {
    pub sec: i32,
    pub nanosec: u32,
}

impl RosStamp {
    /// Split an epoch timestamp (seconds) into sec/nanosec by truncation.
    pub fn from_epoch_secs(t: f64) -> Self {
        let sec = t.floor();
        let frac = t - sec;
        Self {
            sec: sec as i32,
            nanosec: (frac * 1_000_000_000.0) as u32,
        }
    }
}

/// Rate limiter plus one-time clock-offset capture.
#[derive(Debug)]
pub struct FrameThrottler {
    /// Minimum interval between accepted frames, seconds
    interval: f64,
    /// Source timestamp of the last accepted frame
    last_publish: f64,
    /// Wall-clock epoch minus first-seen source timestamp; set exactly once
    clock_offset: Option<f64>,
}

impl FrameThrottler {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: 1.0 / f64::from(target_fps.max(1)),
            last_publish: f64::NEG_INFINITY,
            clock_offset: None,
        }
    }

    /// Decide whether the frame at source time `t` should be processed.
    ///
    /// Rejected frames leave all state untouched. The first accepted frame
    /// fixes the clock offset permanently.
    pub fn should_publish(&mut self, t: f64) -> bool {
        if (t - self.last_publish) < self.interval {
            return false;
        }
        self.last_publish = t;
        if self.clock_offset.is_none() {
            let now = wall_clock_epoch_secs();
            let offset = now - t;
            log::info!(
                "Clock offset fixed: {:.6}s (wall {:.6} - source {:.6})",
                offset,
                now,
                t
            );
            self.clock_offset = Some(offset);
        }
        true
    }

    /// Epoch stamp for source time `t`.
    ///
    /// Only meaningful after the first accepted frame; before that the
    /// source timestamp passes through unshifted.
    pub fn stamp(&self, t: f64) -> RosStamp {
        RosStamp::from_epoch_secs(self.clock_offset.unwrap_or(0.0) + t)
    }

    /// Whether the clock offset has been captured yet.
    pub fn offset_fixed(&self) -> bool {
        self.clock_offset.is_some()
    }
}

fn wall_clock_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_frame_always_accepted() {
        let mut throttler = FrameThrottler::new(10);
        assert!(throttler.should_publish(0.0));
    }

    #[test]
    fn test_sub_interval_frames_rejected() {
        let mut throttler = FrameThrottler::new(10);
        assert!(throttler.should_publish(1.0));
        assert!(!throttler.should_publish(1.05));
        assert!(!throttler.should_publish(1.099));
        assert!(throttler.should_publish(1.11));
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let mut throttler = FrameThrottler::new(10);
        assert!(throttler.should_publish(1.0));
        let stamp_before = throttler.stamp(2.0);
        assert!(!throttler.should_publish(1.05));
        // Rejected frame must not move last_publish: 1.101 is still > 1.0 + 0.1
        assert!(throttler.should_publish(1.101));
        assert_eq!(throttler.stamp(2.0), stamp_before);
    }

    #[test]
    fn test_offset_fixed_exactly_once() {
        let mut throttler = FrameThrottler::new(10);
        assert!(!throttler.offset_fixed());
        assert!(throttler.should_publish(100.0));
        assert!(throttler.offset_fixed());

        let s1 = throttler.stamp(100.0);
        assert!(throttler.should_publish(101.0));
        // A later accepted frame must not re-measure the offset
        assert_eq!(throttler.stamp(100.0), s1);
    }

    #[test]
    fn test_stamp_deltas_match_source_deltas() {
        let mut throttler = FrameThrottler::new(10);
        assert!(throttler.should_publish(500.0));

        let t1 = 500.0;
        let t2 = 507.25;
        let s1 = throttler.stamp(t1);
        let s2 = throttler.stamp(t2);

        let d1 = f64::from(s1.sec) + f64::from(s1.nanosec) * 1e-9;
        let d2 = f64::from(s2.sec) + f64::from(s2.nanosec) * 1e-9;
        assert_relative_eq!(d2 - d1, t2 - t1, epsilon = 1e-6);
    }

    #[test]
    fn test_stamp_split_truncates() {
        let stamp = RosStamp::from_epoch_secs(1700000000.75);
        assert_eq!(stamp.sec, 1700000000);
        assert_eq!(stamp.nanosec, 750_000_000);

        // Fraction close to 1 truncates, never rounds into the next second
        let stamp = RosStamp::from_epoch_secs(12.999_999_9);
        assert_eq!(stamp.sec, 12);
        assert!(stamp.nanosec < 1_000_000_000);
    }

    #[test]
    fn test_non_monotonic_timestamp_rejected() {
        let mut throttler = FrameThrottler::new(10);
        assert!(throttler.should_publish(50.0));
        // Clock discontinuity: time went backwards, frame is simply rejected
        assert!(!throttler.should_publish(10.0));
        assert!(throttler.should_publish(50.2));
    }
}
