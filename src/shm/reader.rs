//! Consumer side of the tap.

use std::sync::atomic::Ordering;

use super::{region_name, Mapping, SharedRegion};
use crate::error::DriverError;

/// Attaches to an existing region and drains mono frames from it.
pub struct SharedRegionReader {
    mapping: Mapping,
}

impl SharedRegionReader {
    /// Opens `name` read/write (the reader owns `readPos`).
    pub fn open(name: &str) -> Result<Self, DriverError> {
        let c_name = region_name(name)?;
        // SAFETY: c_name is a valid C string; the fd is checked and closed.
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0 as libc::c_uint) };
        if fd < 0 {
            return Err(DriverError::last_os_error(name, "shm_open"));
        }

        let mapped = check_size(fd, name).and_then(|()| Mapping::map(fd, name));
        // SAFETY: fd is open; the mapping keeps its own reference.
        unsafe {
            libc::close(fd);
        }
        Ok(Self { mapping: mapped? })
    }

    fn header(&self) -> &super::RegionHeader {
        &self.mapping.region().header
    }

    /// Sample rate advertised by the writer.
    pub fn sample_rate(&self) -> u32 {
        self.header().sample_rate.load(Ordering::SeqCst)
    }

    /// Channels per frame (1).
    pub fn channels(&self) -> u32 {
        self.header().channels.load(Ordering::SeqCst)
    }

    /// Bytes per frame (4).
    pub fn frame_size(&self) -> u32 {
        self.header().frame_size.load(Ordering::SeqCst)
    }

    /// Whether the device is currently doing I/O.
    pub fn is_active(&self) -> bool {
        self.header().active.load(Ordering::SeqCst)
    }

    /// Mono frames the writer has published.
    pub fn write_position(&self) -> u64 {
        self.header().write_pos.load(Ordering::SeqCst)
    }

    /// Mono frames consumed.
    pub fn read_position(&self) -> u64 {
        self.header().read_pos.load(Ordering::SeqCst)
    }

    /// Copies up to `out.len()` unread frames into `out` and advances `readPos`.
    ///
    /// If the writer has lapped the reader, reading resumes at the oldest
    /// frame still in the region. Returns the frames copied.
    pub fn read(&mut self, out: &mut [f32]) -> usize {
        let region = self.mapping.region();
        let write = region.header.write_pos.load(Ordering::SeqCst);
        let mut read = region.header.read_pos.load(Ordering::SeqCst).min(write);
        if write - read > SharedRegion::CAPACITY {
            read = write - SharedRegion::CAPACITY;
        }

        let count = (write - read).min(out.len() as u64) as usize;
        for (offset, sample) in out[..count].iter_mut().enumerate() {
            *sample = region.load_sample(read + offset as u64);
        }
        region
            .header
            .read_pos
            .store(read + count as u64, Ordering::SeqCst);
        count
    }
}

fn check_size(fd: libc::c_int, name: &str) -> Result<(), DriverError> {
    // SAFETY: stat is plain data; fstat fills it on success.
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    // SAFETY: fd is open and stat is writable.
    if unsafe { libc::fstat(fd, &mut stat) } != 0 {
        return Err(DriverError::last_os_error(name, "fstat"));
    }
    if (stat.st_size as u64) < SharedRegion::SIZE as u64 {
        return Err(DriverError::SharedMemory {
            name: name.to_string(),
            op: "fstat",
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "region is smaller than the tap layout",
            ),
        });
    }
    Ok(())
}
