//! The driver: device state, I/O engine and the host-facing operations.
//!
//! [`Driver`] is the typed core behind the plug-in's interface table. Each
//! method corresponds to one table slot and reports failures as [`HalError`];
//! the [`plugin`](crate::plugin) module only marshals raw pointers in and out.

mod state;

pub use state::DeviceState;

use std::ffi::c_void;
use std::sync::atomic::{AtomicPtr, AtomicU32, Ordering};
use std::sync::Arc;

use crate::abi::{
    pid_t, AudioObjectID, AudioObjectPropertyAddress, AudioServerPlugInHostRef,
};
use crate::config::DriverConfig;
use crate::engine::{HostClock, IoCapability, IoEngine, IoOperation, ZeroTimestamp};
use crate::error::{DriverError, HalError, HalResult};
use crate::format::validate_sample_rate;
use crate::object::{AudioObject, Direction, DEVICE_ID};
use crate::property::{self, PropertyValue, Qualifier, SetValue, ValueKind};
use crate::shm::SharedRegionWriter;

/// A client as identified by `AddDeviceClient`/`RemoveDeviceClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRecord {
    pub client_id: u32,
    pub process_id: pid_t,
}

/// The loaded driver.
pub struct Driver {
    config: DriverConfig,
    state: DeviceState,
    engine: IoEngine,
    ref_count: AtomicU32,
    host: AtomicPtr<c_void>,
}

impl Driver {
    /// Builds the driver and, if configured, creates the shared tap region.
    ///
    /// The reference count starts at 1 (the factory's reference).
    pub fn new(config: DriverConfig, clock: Arc<dyn HostClock>) -> Result<Self, DriverError> {
        let sample_rate = crate::config::DEFAULT_SAMPLE_RATE;
        let tap = config
            .shared_region
            .map(|name| SharedRegionWriter::create(name, sample_rate))
            .transpose()?;
        let engine = IoEngine::with_host_clock(
            clock,
            config.ring_buffer_frames,
            crate::config::CHANNELS,
            config.zero_timestamp_period,
            sample_rate,
            tap,
        );
        tracing::info!(
            device = config.device_name,
            sample_rate,
            ring_frames = config.ring_buffer_frames,
            tap = config.shared_region.unwrap_or("none"),
            "driver created"
        );
        Ok(Self {
            config,
            state: DeviceState::new(sample_rate),
            engine,
            ref_count: AtomicU32::new(1),
            host: AtomicPtr::new(std::ptr::null_mut()),
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn engine(&self) -> &IoEngine {
        &self.engine
    }

    // -- reference counting --------------------------------------------------

    /// Increments the reference count and returns the new value.
    pub fn add_ref(&self) -> u32 {
        self.ref_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Decrements the reference count (never below zero) and returns the new value.
    pub fn release(&self) -> u32 {
        match self
            .ref_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count.load(Ordering::SeqCst)
    }

    // -- plug-in operations --------------------------------------------------

    /// Stores the host interface for later notifications.
    pub fn initialize(&self, host: AudioServerPlugInHostRef) -> HalResult<()> {
        self.host.store(host.cast_mut().cast(), Ordering::Release);
        tracing::info!(host_attached = !host.is_null(), "driver initialized");
        Ok(())
    }

    /// Host interface passed to [`initialize`](Self::initialize), if any.
    pub fn host(&self) -> AudioServerPlugInHostRef {
        self.host.load(Ordering::Acquire).cast_const().cast()
    }

    /// Publishes the device (idempotent) and returns its id.
    pub fn create_device(&self) -> HalResult<AudioObjectID> {
        self.state.set_published(true);
        tracing::info!(device_id = DEVICE_ID, "device published");
        Ok(DEVICE_ID)
    }

    /// Withdraws the device. Refused while I/O is running.
    pub fn destroy_device(&self, device: AudioObjectID) -> HalResult<()> {
        self.check_device(device)?;
        if self.engine.is_running() {
            return Err(HalError::illegal("device is running"));
        }
        self.state.set_published(false);
        tracing::info!(device_id = device, "device withdrawn");
        Ok(())
    }

    pub fn add_device_client(&self, device: AudioObjectID, client: ClientRecord) -> HalResult<()> {
        self.check_device(device)?;
        let clients = self.state.add_client();
        tracing::info!(
            client_id = client.client_id,
            pid = client.process_id,
            clients,
            "client added"
        );
        Ok(())
    }

    pub fn remove_device_client(
        &self,
        device: AudioObjectID,
        client: ClientRecord,
    ) -> HalResult<()> {
        self.check_device(device)?;
        let clients = self
            .state
            .remove_client()
            .ok_or(HalError::illegal("no registered clients"))?;
        tracing::info!(
            client_id = client.client_id,
            pid = client.process_id,
            clients,
            "client removed"
        );
        Ok(())
    }

    /// Applies a configuration change. The action is the new nominal rate in Hz;
    /// zero and values beyond 32 bits are not actions this device issues.
    pub fn perform_configuration_change(
        &self,
        device: AudioObjectID,
        action: u64,
    ) -> HalResult<()> {
        self.check_device(device)?;
        let hz = u32::try_from(action)
            .ok()
            .filter(|&hz| hz != 0)
            .ok_or(HalError::UnsupportedOperation)?;
        let rate = validate_sample_rate(f64::from(hz))?;
        tracing::info!(
            previous = self.state.sample_rate(),
            rate,
            "configuration change performed"
        );
        self.apply_sample_rate(rate);
        Ok(())
    }

    pub fn abort_configuration_change(&self, device: AudioObjectID, action: u64) -> HalResult<()> {
        self.check_device(device)?;
        tracing::info!(action, "configuration change aborted");
        Ok(())
    }

    /// Reached from property sets, so it neither logs nor allocates.
    pub(crate) fn apply_sample_rate(&self, rate: f64) {
        if (self.state.sample_rate() - rate).abs() < f64::EPSILON {
            return;
        }
        self.state.set_sample_rate(rate);
        self.engine.set_sample_rate(rate);
    }

    // -- property protocol ---------------------------------------------------

    /// Resolves an object id, treating device objects as absent while the
    /// device is withdrawn.
    pub fn resolve(&self, id: AudioObjectID) -> HalResult<AudioObject> {
        match AudioObject::from_id(id) {
            Some(object) if !object.belongs_to_device() || self.state.is_published() => {
                Ok(object)
            }
            _ => Err(HalError::BadObject { id }),
        }
    }

    fn check_device(&self, id: AudioObjectID) -> HalResult<()> {
        match self.resolve(id)? {
            AudioObject::Device => Ok(()),
            _ => Err(HalError::BadObject { id }),
        }
    }

    pub fn has_property(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
    ) -> bool {
        self.resolve(object)
            .and_then(|object| property::find(object, address))
            .is_ok()
    }

    pub fn is_property_settable(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
    ) -> HalResult<bool> {
        let object = self.resolve(object)?;
        Ok(property::find(object, address)?.settable.is_some())
    }

    /// The data kind a set of `address` expects.
    pub fn settable_kind(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
    ) -> HalResult<ValueKind> {
        let object = self.resolve(object)?;
        property::find(object, address)?
            .settable
            .ok_or(HalError::illegal("property is read-only"))
    }

    pub fn property_data_size(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
        qualifier: &Qualifier,
    ) -> HalResult<u32> {
        Ok(self.property_data(object, address, qualifier)?.size())
    }

    pub fn property_data(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
        qualifier: &Qualifier,
    ) -> HalResult<PropertyValue> {
        let object = self.resolve(object)?;
        property::get(self, object, address, qualifier)
    }

    pub fn set_property_data(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
        value: SetValue,
    ) -> HalResult<()> {
        let object = self.resolve(object)?;
        property::set(self, object, address, value)
    }

    // -- I/O -----------------------------------------------------------------

    // Start and stop run on the host's I/O thread and stay silent. Client ids
    // are not tracked; the engine counts starts.
    pub fn start_io(&self, device: AudioObjectID, _client_id: u32) -> HalResult<()> {
        self.check_device(device)?;
        self.engine.start();
        Ok(())
    }

    pub fn stop_io(&self, device: AudioObjectID, _client_id: u32) -> HalResult<()> {
        self.check_device(device)?;
        self.engine.stop()?;
        Ok(())
    }

    pub fn zero_timestamp(&self, device: AudioObjectID) -> HalResult<ZeroTimestamp> {
        self.check_device(device)?;
        Ok(self.engine.zero_timestamp())
    }

    pub fn will_do_io_operation(
        &self,
        device: AudioObjectID,
        operation: u32,
    ) -> HalResult<IoCapability> {
        self.check_device(device)?;
        Ok(IoEngine::will_do(IoOperation::from_id(operation)))
    }

    /// Begin and end of an I/O operation need no work.
    pub fn io_operation_boundary(&self, device: AudioObjectID) -> HalResult<()> {
        self.check_device(device)
    }

    /// Runs one I/O operation on an interleaved stereo buffer.
    ///
    /// A missing buffer is a no-op. Inactive streams drop output and read
    /// silence; muted directions run at gain 0.
    pub fn do_io_operation(
        &self,
        device: AudioObjectID,
        stream: AudioObjectID,
        operation: u32,
        buffer: Option<&mut [f32]>,
    ) -> HalResult<()> {
        self.check_device(device)?;
        if !matches!(self.resolve(stream)?, AudioObject::Stream(_)) {
            return Err(HalError::BadObject { id: stream });
        }
        let Some(buffer) = buffer else {
            return Ok(());
        };
        match IoOperation::from_id(operation) {
            IoOperation::WriteMix => {
                if self.state.is_stream_active(Direction::Output) {
                    self.engine
                        .write_mix(buffer, self.state.gain(Direction::Output));
                }
            }
            IoOperation::ReadInput => {
                if self.state.is_stream_active(Direction::Input) {
                    self.engine
                        .read_input(buffer, self.state.gain(Direction::Input));
                } else {
                    buffer.fill(0.0);
                }
            }
            IoOperation::Other(_) => {}
        }
        Ok(())
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        tracing::info!(device = self.config.device_name, "driver torn down");
    }
}
