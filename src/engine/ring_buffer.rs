//! Loopback ring between the output mix and the input stream.

use parking_lot::Mutex;

/// Read and write positions, in frames, reduced modulo the ring capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingPositions {
    /// Next frame the output path writes.
    pub write: u32,
    /// Next frame the input path reads.
    pub read: u32,
}

struct RingState {
    samples: Box<[f32]>,
    /// Total frames ever written since the last reset.
    written: u64,
    /// Total frames ever read since the last reset.
    read: u64,
}

/// Fixed-capacity ring of interleaved `f32` frames.
///
/// Writers never block: when the writer laps the reader, the oldest unread
/// frames are overwritten and the reader skips ahead to the oldest frame still
/// held. The reader never passes the writer; a read that asks for more than
/// is buffered gets silence for the missing tail.
///
/// One mutex guards both positions and the block copy. The host drives each
/// direction from a single real-time thread, so the lock is uncontended in
/// practice.
pub struct LoopbackRing {
    state: Mutex<RingState>,
    capacity_frames: u32,
    channels: usize,
}

impl LoopbackRing {
    /// Creates a zeroed ring holding `capacity_frames` frames of `channels` samples.
    pub fn new(capacity_frames: u32, channels: u32) -> Self {
        let capacity_frames = capacity_frames.max(1);
        let channels = channels.max(1) as usize;
        Self {
            state: Mutex::new(RingState {
                samples: vec![0.0; capacity_frames as usize * channels].into_boxed_slice(),
                written: 0,
                read: 0,
            }),
            capacity_frames,
            channels,
        }
    }

    /// Capacity in frames.
    pub fn capacity_frames(&self) -> u32 {
        self.capacity_frames
    }

    /// Samples per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Writes whole frames from `src`, each sample multiplied by `gain`.
    ///
    /// A trailing partial frame is ignored. Returns the frames written.
    pub fn write_scaled(&self, src: &[f32], gain: f32) -> usize {
        let capacity = u64::from(self.capacity_frames);
        let mut state = self.state.lock();
        let mut frames = 0;
        for frame in src.chunks_exact(self.channels) {
            let base = (state.written % capacity) as usize * self.channels;
            for (dst, sample) in state.samples[base..base + self.channels]
                .iter_mut()
                .zip(frame)
            {
                *dst = sample * gain;
            }
            state.written += 1;
            frames += 1;
        }
        // Overrun: drop the frames the writer just overwrote.
        if state.written - state.read > capacity {
            state.read = state.written - capacity;
        }
        frames
    }

    /// Fills whole frames of `dst` from the ring, each sample multiplied by `gain`.
    ///
    /// Frames not yet written are filled with silence and do not advance the
    /// read position. Returns the frames taken from the ring.
    pub fn read_scaled(&self, dst: &mut [f32], gain: f32) -> usize {
        let capacity = u64::from(self.capacity_frames);
        let mut state = self.state.lock();
        let mut frames = 0;
        for frame in dst.chunks_exact_mut(self.channels) {
            if state.read == state.written {
                frame.fill(0.0);
                continue;
            }
            let base = (state.read % capacity) as usize * self.channels;
            for (out, sample) in frame
                .iter_mut()
                .zip(&state.samples[base..base + self.channels])
            {
                *out = sample * gain;
            }
            state.read += 1;
            frames += 1;
        }
        frames
    }

    /// Zeroes the contents and rewinds both positions.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.samples.fill(0.0);
        state.written = 0;
        state.read = 0;
    }

    /// Current positions modulo capacity.
    pub fn positions(&self) -> RingPositions {
        let capacity = u64::from(self.capacity_frames);
        let state = self.state.lock();
        RingPositions {
            write: (state.written % capacity) as u32,
            read: (state.read % capacity) as u32,
        }
    }

    /// Frames written but not yet read.
    pub fn available(&self) -> usize {
        let state = self.state.lock();
        (state.written - state.read) as usize
    }
}
