//! Driver side of the tap: creates the region and publishes into it.

use std::ffi::CString;
use std::sync::atomic::Ordering;

use super::{region_name, Mapping, SharedRegion, FRAME_SIZE, TAP_CHANNELS};
use crate::error::DriverError;
use crate::format::stereo_to_mono;

/// Owns the named region. Dropping it unmaps and unlinks the name.
pub struct SharedRegionWriter {
    mapping: Mapping,
    name: CString,
    display_name: String,
}

impl SharedRegionWriter {
    /// Creates `name` from scratch, replacing any stale region left by a
    /// previous process, and initialises the header.
    pub fn create(name: &str, sample_rate: f64) -> Result<Self, DriverError> {
        let c_name = region_name(name)?;

        // SAFETY: c_name is a valid NUL-terminated string. A missing name is
        // not an error here.
        unsafe {
            libc::shm_unlink(c_name.as_ptr());
        }

        // SAFETY: as above; the returned fd is checked and closed below.
        let fd = unsafe {
            libc::shm_open(
                c_name.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                0o666 as libc::c_uint,
            )
        };
        if fd < 0 {
            return Err(DriverError::last_os_error(name, "shm_open"));
        }

        let mapped = Self::size_and_map(fd, name);
        // SAFETY: fd is open; the mapping (if any) keeps its own reference.
        unsafe {
            libc::close(fd);
        }
        let mapping = match mapped {
            Ok(mapping) => mapping,
            Err(err) => {
                // SAFETY: removing the half-created name.
                unsafe {
                    libc::shm_unlink(c_name.as_ptr());
                }
                return Err(err);
            }
        };

        let header = &mapping.region().header;
        header.write_pos.store(0, Ordering::SeqCst);
        header.read_pos.store(0, Ordering::SeqCst);
        header.active.store(false, Ordering::SeqCst);
        header
            .sample_rate
            .store(sample_rate as u32, Ordering::SeqCst);
        header.channels.store(TAP_CHANNELS, Ordering::SeqCst);
        header.frame_size.store(FRAME_SIZE, Ordering::SeqCst);

        tracing::info!(
            region = name,
            bytes = SharedRegion::SIZE,
            sample_rate,
            "shared tap region created"
        );

        Ok(Self {
            mapping,
            name: c_name,
            display_name: name.to_string(),
        })
    }

    fn size_and_map(fd: libc::c_int, name: &str) -> Result<Mapping, DriverError> {
        // SAFETY: fd is a freshly opened shm object.
        let rc = unsafe { libc::ftruncate(fd, SharedRegion::SIZE as libc::off_t) };
        if rc != 0 {
            return Err(DriverError::last_os_error(name, "ftruncate"));
        }
        Mapping::map(fd, name)
    }

    /// Region name.
    pub fn name(&self) -> &str {
        &self.display_name
    }

    /// Marks the stream as flowing (or not) for readers.
    pub fn set_active(&self, active: bool) {
        self.mapping
            .region()
            .header
            .active
            .store(active, Ordering::SeqCst);
    }

    /// Updates the advertised sample rate.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        self.mapping
            .region()
            .header
            .sample_rate
            .store(sample_rate as u32, Ordering::SeqCst);
    }

    /// Downmixes interleaved stereo to mono and appends it. Never blocks.
    ///
    /// Returns the mono frames published.
    pub fn publish_stereo(&self, stereo: &[f32]) -> usize {
        let region = self.mapping.region();
        let start = region.header.write_pos.load(Ordering::SeqCst);
        let mut position = start;
        for sample in stereo_to_mono(stereo) {
            region.store_sample(position, sample);
            position += 1;
        }
        region.header.write_pos.store(position, Ordering::SeqCst);
        (position - start) as usize
    }

    /// Mono frames published so far.
    pub fn write_position(&self) -> u64 {
        self.mapping
            .region()
            .header
            .write_pos
            .load(Ordering::SeqCst)
    }
}

impl Drop for SharedRegionWriter {
    fn drop(&mut self) {
        self.set_active(false);
        // SAFETY: name is a valid C string; a name already removed is fine.
        unsafe {
            libc::shm_unlink(self.name.as_ptr());
        }
        tracing::info!(region = %self.display_name, "shared tap region unlinked");
    }
}
