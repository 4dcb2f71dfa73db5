//! Host time source and the device's zero-timestamp clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic host time in the host's native tick unit.
pub trait HostClock: Send + Sync {
    /// Current host time in ticks.
    fn now(&self) -> u64;

    /// Ticks per second of [`now`](Self::now).
    fn ticks_per_second(&self) -> f64;
}

/// A clock that only moves when told to. Used to make timestamp tests exact.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
    ticks_per_second: f64,
}

impl ManualClock {
    /// Creates a clock at tick `start` running at `ticks_per_second`.
    pub fn new(start: u64, ticks_per_second: f64) -> Self {
        Self {
            now: AtomicU64::new(start),
            ticks_per_second,
        }
    }

    /// Moves the clock forward by `ticks`.
    pub fn advance(&self, ticks: u64) {
        self.now.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Moves the clock forward by `frames` at `sample_rate`.
    pub fn advance_frames(&self, frames: u64, sample_rate: f64) {
        let ticks = (frames as f64 * self.ticks_per_second / sample_rate).ceil() as u64;
        self.advance(ticks);
    }
}

impl HostClock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }
}

/// One zero-timestamp as handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZeroTimestamp {
    /// Sample time of the boundary, a multiple of the period.
    pub sample_time: f64,
    /// Host time of the boundary.
    pub host_time: u64,
    /// Changes whenever the timeline is discontinuous.
    pub seed: u64,
}

/// Derives period-aligned zero-timestamps from the host clock.
///
/// The clock is anchored when I/O starts. Every later timestamp is the last
/// period boundary at or before "now": `floor(elapsed / ticks_per_period)`
/// periods past the anchor. The seed starts at 1 and is bumped whenever the
/// anchor or the frame duration changes.
pub struct ZeroTimestampClock {
    host: Arc<dyn HostClock>,
    period_frames: u32,
    anchor_host_time: AtomicU64,
    /// `f64` bits of host ticks per frame at the current rate.
    ticks_per_frame: AtomicU64,
    seed: AtomicU64,
}

impl ZeroTimestampClock {
    /// Creates a clock for `period_frames`-frame periods at `sample_rate`.
    pub fn new(host: Arc<dyn HostClock>, period_frames: u32, sample_rate: f64) -> Self {
        let ticks_per_frame = host.ticks_per_second() / sample_rate;
        Self {
            host,
            period_frames: period_frames.max(1),
            anchor_host_time: AtomicU64::new(0),
            ticks_per_frame: AtomicU64::new(ticks_per_frame.to_bits()),
            seed: AtomicU64::new(1),
        }
    }

    /// Period length in frames.
    pub fn period_frames(&self) -> u32 {
        self.period_frames
    }

    /// Host ticks per frame at the current rate.
    pub fn ticks_per_frame(&self) -> f64 {
        f64::from_bits(self.ticks_per_frame.load(Ordering::Acquire))
    }

    /// Current seed.
    pub fn seed(&self) -> u64 {
        self.seed.load(Ordering::Acquire)
    }

    /// Current host time.
    pub fn host_now(&self) -> u64 {
        self.host.now()
    }

    /// Starts a new timeline at the current host time (sample time 0).
    pub fn anchor(&self) {
        self.anchor_host_time
            .store(self.host.now(), Ordering::Release);
        self.seed.fetch_add(1, Ordering::AcqRel);
    }

    /// Recomputes the frame duration for `sample_rate`.
    ///
    /// The caller re-anchors if I/O is running.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        let ticks_per_frame = self.host.ticks_per_second() / sample_rate;
        self.ticks_per_frame
            .store(ticks_per_frame.to_bits(), Ordering::Release);
        self.seed.fetch_add(1, Ordering::AcqRel);
    }

    /// The latest period boundary. `running == false` yields zero times.
    pub fn zero_timestamp(&self, running: bool) -> ZeroTimestamp {
        let seed = self.seed();
        if !running {
            return ZeroTimestamp {
                sample_time: 0.0,
                host_time: 0,
                seed,
            };
        }

        let anchor = self.anchor_host_time.load(Ordering::Acquire);
        let elapsed = self.host.now().saturating_sub(anchor);
        let period = f64::from(self.period_frames);
        let ticks_per_period = self.ticks_per_frame() * period;
        let periods = if ticks_per_period > 0.0 {
            (elapsed as f64 / ticks_per_period).floor()
        } else {
            0.0
        };

        ZeroTimestamp {
            sample_time: periods * period,
            host_time: anchor + (periods * ticks_per_period) as u64,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NANOS: f64 = 1_000_000_000.0;

    fn clock_at(rate: f64) -> (Arc<ManualClock>, ZeroTimestampClock) {
        let host = Arc::new(ManualClock::new(1_000, NANOS));
        let clock = ZeroTimestampClock::new(host.clone(), 512, rate);
        (host, clock)
    }

    #[test]
    fn test_stopped_clock_reports_zero() {
        let (_host, clock) = clock_at(48_000.0);
        let ts = clock.zero_timestamp(false);
        assert_eq!(ts.sample_time, 0.0);
        assert_eq!(ts.host_time, 0);
        assert_eq!(ts.seed, 1);
    }

    #[test]
    fn test_timestamps_are_period_aligned() {
        let (host, clock) = clock_at(48_000.0);
        clock.anchor();

        let first = clock.zero_timestamp(true);
        assert_eq!(first.sample_time, 0.0);
        assert_eq!(first.host_time, 1_000);

        host.advance_frames(1_300, 48_000.0);
        let second = clock.zero_timestamp(true);
        assert_eq!(second.sample_time, 1_024.0);
        assert_eq!(second.sample_time % 512.0, 0.0);
        assert!(second.host_time > first.host_time);
        assert_eq!(second.seed, first.seed);
    }

    #[test]
    fn test_timestamps_monotonic() {
        let (host, clock) = clock_at(44_100.0);
        clock.anchor();
        let mut last = clock.zero_timestamp(true);
        for step in [1u64, 100, 511, 512, 3, 4_000, 77] {
            host.advance_frames(step, 44_100.0);
            let ts = clock.zero_timestamp(true);
            assert!(ts.sample_time >= last.sample_time);
            assert!(ts.host_time >= last.host_time);
            assert_eq!((ts.sample_time - last.sample_time) % 512.0, 0.0);
            last = ts;
        }
    }

    #[test]
    fn test_strictly_increases_after_a_period() {
        let (host, clock) = clock_at(48_000.0);
        clock.anchor();
        host.advance_frames(100, 48_000.0);
        let first = clock.zero_timestamp(true);
        host.advance_frames(600, 48_000.0);
        let second = clock.zero_timestamp(true);
        assert!(second.sample_time > first.sample_time);
        assert!(second.host_time > first.host_time);
    }

    #[test]
    fn test_rate_change_updates_ticks_and_seed() {
        let (_host, clock) = clock_at(48_000.0);
        let seed = clock.seed();
        assert!((clock.ticks_per_frame() - NANOS / 48_000.0).abs() < 1e-9);

        clock.set_sample_rate(96_000.0);
        assert!((clock.ticks_per_frame() - NANOS / 96_000.0).abs() < 1e-9);
        assert_eq!(clock.seed(), seed + 1);
    }

    #[test]
    fn test_anchor_bumps_seed() {
        let (_host, clock) = clock_at(48_000.0);
        clock.anchor();
        clock.anchor();
        assert_eq!(clock.seed(), 3);
    }
}
