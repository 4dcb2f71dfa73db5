//! # surge-audio
//!
//! A virtual loopback audio device for the macOS audio server.
//!
//! The crate builds a user-space HAL plug-in (`cdylib`) that publishes one
//! device, "Surge Audio", with a stereo input and output stream. Whatever
//! applications play into the output comes back out of the input, and the same
//! mix is optionally published as mono frames in a named shared-memory region
//! for out-of-process readers (see the `surge-tap` binary).
//!
//! ## Layers
//!
//! - [`abi`]: the host's types and constants. On macOS they come from
//!   `coreaudio-sys`; other hosts get a stand-in with the same names.
//! - [`plugin`]: the exported factory, the host's interface table and raw
//!   pointer marshalling. The only place status codes exist.
//! - [`driver`]: the [`Driver`] aggregate with one typed method per host
//!   operation, returning [`HalError`] on refusal.
//! - [`property`]: the object model (plug-in, device, streams, controls) and
//!   the per-object property tables.
//! - [`engine`]: the real-time side: loopback ring, zero-timestamp clock and
//!   client counting.
//! - [`shm`]: the shared-memory tap writer and its reader.
//!
//! ## Using the driver in-process
//!
//! ```rust
//! use std::sync::Arc;
//! use surge_audio::abi::kAudioServerPlugInIOOperationWriteMix as WRITE_MIX;
//! use surge_audio::engine::ManualClock;
//! use surge_audio::object::{DEVICE_ID, OUTPUT_STREAM_ID};
//! use surge_audio::{Driver, DriverConfig};
//!
//! let config = DriverConfig { shared_region: None, ..Default::default() };
//! let driver = Driver::new(config, Arc::new(ManualClock::new(1, 1e9)))?;
//!
//! driver.start_io(DEVICE_ID, 1)?;
//! let mut mix = vec![0.25f32; 512 * 2];
//! driver.do_io_operation(DEVICE_ID, OUTPUT_STREAM_ID, WRITE_MIX, Some(&mut mix))?;
//! assert_eq!(driver.engine().ring().available(), 512);
//! driver.stop_io(DEVICE_ID, 1)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// unsafe_code is denied in Cargo.toml; FFI modules opt back in
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::float_cmp))]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

pub mod abi;
pub mod config;
pub mod driver;
pub mod engine;
mod error;
pub mod format;
pub mod object;
pub mod platform;
pub mod plugin;
pub mod property;
pub mod shm;

pub use config::DriverConfig;
pub use driver::{ClientRecord, DeviceState, Driver};
pub use engine::{HostClock, IoEngine, ZeroTimestamp};
pub use error::{fourcc_str, DriverError, HalError, HalResult};
pub use property::{PropertyValue, Qualifier, SetValue};
pub use shm::{SharedRegionReader, SharedRegionWriter};
