//! Real-time I/O engine.
//!
//! The engine owns the loopback ring, the zero-timestamp clock and the
//! optional shared tap. Nothing on the I/O path allocates, logs, or waits on
//! anything but the ring's mutex.

mod clock;
mod ring_buffer;

pub use clock::{HostClock, ManualClock, ZeroTimestamp, ZeroTimestampClock};
pub use ring_buffer::{LoopbackRing, RingPositions};

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::abi::{
    kAudioServerPlugInIOOperationReadInput, kAudioServerPlugInIOOperationWriteMix,
};
use crate::error::{HalError, HalResult};
use crate::format::apply_gain;
use crate::shm::SharedRegionWriter;

/// I/O operations the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    /// Device input → host.
    ReadInput,
    /// Host output mix → device.
    WriteMix,
    /// Anything else the host may ask about.
    Other(u32),
}

impl IoOperation {
    /// Parses a host operation id.
    #[must_use]
    pub fn from_id(id: u32) -> Self {
        match id {
            kAudioServerPlugInIOOperationReadInput => Self::ReadInput,
            kAudioServerPlugInIOOperationWriteMix => Self::WriteMix,
            other => Self::Other(other),
        }
    }
}

/// Answer to `WillDoIOOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoCapability {
    pub will_do: bool,
    pub in_place: bool,
}

/// Client count, running flag, loopback ring, clock and tap.
pub struct IoEngine {
    ring: LoopbackRing,
    clock: ZeroTimestampClock,
    clients: AtomicU32,
    running: AtomicBool,
    tap: Option<SharedRegionWriter>,
}

impl IoEngine {
    /// Creates a stopped engine.
    pub fn new(
        ring: LoopbackRing,
        clock: ZeroTimestampClock,
        tap: Option<SharedRegionWriter>,
    ) -> Self {
        Self {
            ring,
            clock,
            clients: AtomicU32::new(0),
            running: AtomicBool::new(false),
            tap,
        }
    }

    /// Convenience constructor from raw parameters.
    pub fn with_host_clock(
        host: Arc<dyn HostClock>,
        ring_frames: u32,
        channels: u32,
        period_frames: u32,
        sample_rate: f64,
        tap: Option<SharedRegionWriter>,
    ) -> Self {
        Self::new(
            LoopbackRing::new(ring_frames, channels),
            ZeroTimestampClock::new(host, period_frames, sample_rate),
            tap,
        )
    }

    /// Adds an I/O client. The first client anchors the clock, clears the
    /// ring and starts the device. Returns the client count afterwards.
    pub fn start(&self) -> u32 {
        let previous = self.clients.fetch_add(1, Ordering::SeqCst);
        if previous == 0 {
            self.clock.anchor();
            self.ring.reset();
            self.running.store(true, Ordering::SeqCst);
            if let Some(tap) = &self.tap {
                tap.set_active(true);
            }
        }
        previous + 1
    }

    /// Removes an I/O client. The last client stops the device and clears
    /// the ring. Returns the client count afterwards.
    pub fn stop(&self) -> HalResult<u32> {
        let previous = self
            .clients
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            })
            .map_err(|_| HalError::illegal("StopIO without a matching StartIO"))?;
        if previous == 1 {
            self.running.store(false, Ordering::SeqCst);
            self.ring.reset();
            if let Some(tap) = &self.tap {
                tap.set_active(false);
            }
        }
        Ok(previous - 1)
    }

    /// Whether at least one client is doing I/O.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clients currently doing I/O.
    pub fn clients(&self) -> u32 {
        self.clients.load(Ordering::SeqCst)
    }

    /// Applies a new nominal rate to the clock and the tap header.
    ///
    /// A running timeline is re-anchored, since its frame duration changed.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        self.clock.set_sample_rate(sample_rate);
        if self.is_running() {
            self.clock.anchor();
        }
        if let Some(tap) = &self.tap {
            tap.set_sample_rate(sample_rate);
        }
    }

    /// Current zero-timestamp.
    pub fn zero_timestamp(&self) -> ZeroTimestamp {
        self.clock.zero_timestamp(self.is_running())
    }

    /// The zero-timestamp period in frames.
    pub fn period_frames(&self) -> u32 {
        self.clock.period_frames()
    }

    /// Which operations the engine performs, all of them in place.
    #[must_use]
    pub fn will_do(operation: IoOperation) -> IoCapability {
        match operation {
            IoOperation::ReadInput | IoOperation::WriteMix => IoCapability {
                will_do: true,
                in_place: true,
            },
            IoOperation::Other(_) => IoCapability {
                will_do: false,
                in_place: true,
            },
        }
    }

    /// Pushes interleaved output frames into the ring (and the tap).
    ///
    /// Dropped when the device is not running.
    pub fn write_mix(&self, samples: &[f32], gain: f32) {
        if !self.is_running() {
            return;
        }
        self.ring.write_scaled(samples, gain);
        if let Some(tap) = &self.tap {
            if (gain - 1.0).abs() < f32::EPSILON {
                tap.publish_stereo(samples);
            } else {
                self.publish_scaled(tap, samples, gain);
            }
        }
    }

    fn publish_scaled(&self, tap: &SharedRegionWriter, samples: &[f32], gain: f32) {
        let mut scratch = [0.0f32; 512];
        let step = scratch.len() - scratch.len() % self.ring.channels();
        for block in samples.chunks(step) {
            let out = &mut scratch[..block.len()];
            out.copy_from_slice(block);
            apply_gain(out, gain);
            tap.publish_stereo(out);
        }
    }

    /// Fills interleaved input frames from the ring.
    ///
    /// Silence when the device is not running.
    pub fn read_input(&self, samples: &mut [f32], gain: f32) {
        if !self.is_running() {
            samples.fill(0.0);
            return;
        }
        self.ring.read_scaled(samples, gain);
    }

    /// The loopback ring.
    pub fn ring(&self) -> &LoopbackRing {
        &self.ring
    }

    /// The shared tap, when configured.
    pub fn tap(&self) -> Option<&SharedRegionWriter> {
        self.tap.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (Arc<ManualClock>, IoEngine) {
        let host = Arc::new(ManualClock::new(10, 1_000_000_000.0));
        let engine = IoEngine::with_host_clock(host.clone(), 16_384, 2, 512, 48_000.0, None);
        (host, engine)
    }

    #[test]
    fn test_operation_ids() {
        assert_eq!(
            IoOperation::from_id(kAudioServerPlugInIOOperationReadInput),
            IoOperation::ReadInput
        );
        assert_eq!(
            IoOperation::from_id(kAudioServerPlugInIOOperationWriteMix),
            IoOperation::WriteMix
        );
        assert_eq!(IoOperation::from_id(7), IoOperation::Other(7));
    }

    #[test]
    fn test_will_do() {
        let yes = IoCapability {
            will_do: true,
            in_place: true,
        };
        assert_eq!(IoEngine::will_do(IoOperation::ReadInput), yes);
        assert_eq!(IoEngine::will_do(IoOperation::WriteMix), yes);
        assert!(!IoEngine::will_do(IoOperation::Other(1)).will_do);
    }

    #[test]
    fn test_start_stop_counts_clients() {
        let (_host, engine) = engine();
        assert!(!engine.is_running());
        assert_eq!(engine.start(), 1);
        assert_eq!(engine.start(), 2);
        assert!(engine.is_running());

        assert_eq!(engine.stop(), Ok(1));
        assert!(engine.is_running());
        assert_eq!(engine.stop(), Ok(0));
        assert!(!engine.is_running());

        assert!(engine.stop().is_err());
        assert_eq!(engine.clients(), 0);
    }

    #[test]
    fn test_loopback_while_running() {
        let (_host, engine) = engine();
        engine.start();
        engine.write_mix(&[0.5; 1024], 1.0);
        let mut out = [0.0f32; 1024];
        engine.read_input(&mut out, 1.0);
        assert!(out.iter().all(|&s| s == 0.5));

        engine.write_mix(&[0.5; 1024], 1.0);
        engine.read_input(&mut out, 0.5);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_stopped_engine_is_silent() {
        let (_host, engine) = engine();
        assert!(engine.tap().is_none());
        assert_eq!(engine.ring().capacity_frames(), 16_384);
        engine.write_mix(&[0.9; 64], 1.0);
        assert_eq!(engine.ring().available(), 0);

        let mut out = [1.0f32; 64];
        engine.read_input(&mut out, 1.0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_last_stop_clears_ring() {
        let (_host, engine) = engine();
        engine.start();
        engine.write_mix(&[0.5; 64], 1.0);
        engine.stop().unwrap();
        assert_eq!(engine.ring().positions(), RingPositions::default());
        assert_eq!(engine.ring().available(), 0);
    }

    #[test]
    fn test_zero_timestamp_tracks_host_clock() {
        let (host, engine) = engine();
        assert_eq!(engine.zero_timestamp().host_time, 0);

        engine.start();
        let first = engine.zero_timestamp();
        host.advance_frames(1_100, 48_000.0);
        let second = engine.zero_timestamp();
        assert_eq!(second.sample_time - first.sample_time, 1_024.0);
        assert!(second.host_time > first.host_time);
    }

    #[test]
    fn test_rate_change_reanchors_running_clock() {
        let (host, engine) = engine();
        engine.start();
        host.advance_frames(2_048, 48_000.0);
        let before = engine.zero_timestamp();
        assert_eq!(before.sample_time, 2_048.0);

        engine.set_sample_rate(96_000.0);
        let after = engine.zero_timestamp();
        assert_eq!(after.sample_time, 0.0);
        assert!(after.seed > before.seed);
    }
}
