//! Device state shared between property calls and the I/O threads.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::object::Direction;

/// Mutable device state, all atomics so the I/O path never locks for it.
#[derive(Debug)]
pub struct DeviceState {
    /// `f64` bits of the nominal sample rate.
    sample_rate: AtomicU64,
    published: AtomicBool,
    stream_active: [AtomicBool; 2],
    /// `f32` bits of the volume scalar per direction.
    volume: [AtomicU32; 2],
    muted: [AtomicBool; 2],
    registered_clients: AtomicU32,
}

fn slot(direction: Direction) -> usize {
    match direction {
        Direction::Input => 0,
        Direction::Output => 1,
    }
}

impl DeviceState {
    /// Published device, both streams active, unity volume, unmuted.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate: AtomicU64::new(sample_rate.to_bits()),
            published: AtomicBool::new(true),
            stream_active: [AtomicBool::new(true), AtomicBool::new(true)],
            volume: [AtomicU32::new(1.0f32.to_bits()), AtomicU32::new(1.0f32.to_bits())],
            muted: [AtomicBool::new(false), AtomicBool::new(false)],
            registered_clients: AtomicU32::new(0),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate.load(Ordering::Acquire))
    }

    pub(crate) fn set_sample_rate(&self, rate: f64) {
        self.sample_rate.store(rate.to_bits(), Ordering::Release);
    }

    /// Whether the device (and its streams and controls) is visible to the host.
    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::Acquire)
    }

    pub(crate) fn set_published(&self, published: bool) {
        self.published.store(published, Ordering::Release);
    }

    pub fn is_stream_active(&self, direction: Direction) -> bool {
        self.stream_active[slot(direction)].load(Ordering::Acquire)
    }

    pub(crate) fn set_stream_active(&self, direction: Direction, active: bool) {
        self.stream_active[slot(direction)].store(active, Ordering::Release);
    }

    /// Volume scalar in [0, 1].
    pub fn volume(&self, direction: Direction) -> f32 {
        f32::from_bits(self.volume[slot(direction)].load(Ordering::Acquire))
    }

    pub(crate) fn set_volume(&self, direction: Direction, scalar: f32) {
        self.volume[slot(direction)].store(scalar.to_bits(), Ordering::Release);
    }

    pub fn is_muted(&self, direction: Direction) -> bool {
        self.muted[slot(direction)].load(Ordering::Acquire)
    }

    pub(crate) fn set_muted(&self, direction: Direction, muted: bool) {
        self.muted[slot(direction)].store(muted, Ordering::Release);
    }

    /// Gain applied on the I/O path: the volume, or 0 when muted.
    pub fn gain(&self, direction: Direction) -> f32 {
        if self.is_muted(direction) {
            0.0
        } else {
            self.volume(direction)
        }
    }

    /// Clients registered with `AddDeviceClient`.
    pub fn registered_clients(&self) -> u32 {
        self.registered_clients.load(Ordering::Acquire)
    }

    pub(crate) fn add_client(&self) -> u32 {
        self.registered_clients.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns `None` if no client was registered.
    pub(crate) fn remove_client(&self) -> Option<u32> {
        self.registered_clients
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|previous| previous - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = DeviceState::new(48_000.0);
        assert_eq!(state.sample_rate(), 48_000.0);
        assert!(state.is_published());
        for direction in [Direction::Input, Direction::Output] {
            assert!(state.is_stream_active(direction));
            assert_eq!(state.volume(direction), 1.0);
            assert!(!state.is_muted(direction));
            assert_eq!(state.gain(direction), 1.0);
        }
    }

    #[test]
    fn test_directions_are_independent() {
        let state = DeviceState::new(48_000.0);
        state.set_volume(Direction::Input, 0.25);
        state.set_muted(Direction::Output, true);
        assert_eq!(state.gain(Direction::Input), 0.25);
        assert_eq!(state.gain(Direction::Output), 0.0);
        assert_eq!(state.volume(Direction::Output), 1.0);
    }

    #[test]
    fn test_client_registry() {
        let state = DeviceState::new(48_000.0);
        assert_eq!(state.remove_client(), None);
        assert_eq!(state.add_client(), 1);
        assert_eq!(state.add_client(), 2);
        assert_eq!(state.remove_client(), Some(1));
        assert_eq!(state.registered_clients(), 1);
    }
}
