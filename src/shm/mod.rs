//! Shared-memory tap for out-of-process consumers.
//!
//! The output mix is downmixed to mono and published into a named POSIX
//! shared-memory region. The region is the wire format: [`SharedRegion`] is
//! `#[repr(C)]` with fixed-size fields so a reader built with any toolchain
//! maps it identically.
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | `writePos` (atomic u64, mono frames ever written) |
//! | 8 | `readPos` (atomic u64, advanced by the reader) |
//! | 16 | `active` (atomic bool) + 3 bytes padding |
//! | 20 | `sampleRate` (u32) |
//! | 24 | `channels` (u32, always 1) |
//! | 28 | `frameSize` (u32, bytes per frame, always 4) |
//! | 32 | `buffer` (`f32` × [`SHARED_REGION_FRAMES`]) |
//!
//! Positions are monotonic; the slot for a position is `pos % capacity`.
//! Neither side ever blocks: a reader that falls more than one capacity behind
//! skips ahead to the oldest frame still held.

// FFI requires unsafe
#![allow(unsafe_code)]

mod reader;
mod writer;

pub use reader::SharedRegionReader;
pub use writer::SharedRegionWriter;

use std::ffi::CString;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::config::SHARED_REGION_FRAMES;
use crate::error::DriverError;

/// Bytes per published mono frame.
pub const FRAME_SIZE: u32 = 4;

/// Channels in the published stream.
pub const TAP_CHANNELS: u32 = 1;

/// Fixed header at the start of the region.
#[repr(C)]
pub struct RegionHeader {
    pub write_pos: AtomicU64,
    pub read_pos: AtomicU64,
    pub active: AtomicBool,
    _pad: [u8; 3],
    pub sample_rate: AtomicU32,
    pub channels: AtomicU32,
    pub frame_size: AtomicU32,
}

/// The whole mapped region. Samples are stored as `f32` bit patterns.
#[repr(C)]
pub struct SharedRegion {
    pub header: RegionHeader,
    pub buffer: [AtomicU32; SHARED_REGION_FRAMES],
}

const _: () = {
    assert!(std::mem::offset_of!(RegionHeader, write_pos) == 0);
    assert!(std::mem::offset_of!(RegionHeader, read_pos) == 8);
    assert!(std::mem::offset_of!(RegionHeader, active) == 16);
    assert!(std::mem::offset_of!(RegionHeader, sample_rate) == 20);
    assert!(std::mem::offset_of!(RegionHeader, channels) == 24);
    assert!(std::mem::offset_of!(RegionHeader, frame_size) == 28);
    assert!(std::mem::offset_of!(SharedRegion, buffer) == 32);
    assert!(std::mem::size_of::<SharedRegion>() == 32 + 4 * SHARED_REGION_FRAMES);
};

impl SharedRegion {
    /// Mapped size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Capacity in mono frames.
    pub const CAPACITY: u64 = SHARED_REGION_FRAMES as u64;

    fn slot(&self, position: u64) -> &AtomicU32 {
        &self.buffer[(position % Self::CAPACITY) as usize]
    }

    fn store_sample(&self, position: u64, sample: f32) {
        self.slot(position).store(sample.to_bits(), Ordering::Relaxed);
    }

    fn load_sample(&self, position: u64) -> f32 {
        f32::from_bits(self.slot(position).load(Ordering::Relaxed))
    }
}

/// Checks a POSIX shm name: leading '/', no other '/', at most 31 bytes.
pub(crate) fn region_name(name: &str) -> Result<CString, DriverError> {
    let invalid = |reason| DriverError::InvalidRegionName {
        name: name.to_string(),
        reason,
    };
    if !name.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if name[1..].contains('/') {
        return Err(invalid("must not contain '/' after the first byte"));
    }
    if name.len() < 2 || name.len() > 31 {
        return Err(invalid("must be 2 to 31 bytes long"));
    }
    CString::new(name).map_err(|_| invalid("must not contain NUL"))
}

/// A `MAP_SHARED` mapping of one region, unmapped on drop.
struct Mapping {
    region: NonNull<SharedRegion>,
}

// SAFETY: the mapping is only accessed through `&SharedRegion`, whose fields
// are all atomics.
unsafe impl Send for Mapping {}
unsafe impl Sync for Mapping {}

impl Mapping {
    /// Maps `SharedRegion::SIZE` bytes of `fd` read/write.
    fn map(fd: libc::c_int, name: &str) -> Result<Self, DriverError> {
        // SAFETY: a fresh shared mapping of an fd we own; the result is checked
        // against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                SharedRegion::SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(DriverError::last_os_error(name, "mmap"));
        }
        let region = NonNull::new(ptr.cast::<SharedRegion>())
            .ok_or_else(|| DriverError::last_os_error(name, "mmap"))?;
        Ok(Self { region })
    }

    fn region(&self) -> &SharedRegion {
        // SAFETY: the pointer comes from a successful mmap of SIZE bytes, is
        // page aligned, and stays mapped until `self` is dropped.
        unsafe { self.region.as_ref() }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: unmapping exactly what `map` mapped.
        unsafe {
            libc::munmap(self.region.as_ptr().cast(), SharedRegion::SIZE);
        }
    }
}
