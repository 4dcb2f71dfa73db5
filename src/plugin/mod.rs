//! The loadable plug-in: exported factory, interface table and the
//! `extern "C"` entry points the audio server calls.
//!
//! A single [`Driver`] lives in a process-wide slot. Entry points take the
//! slot's read lock; only the factory and the final `Release` take the write
//! lock. Every entry point converts its [`HalResult`] into a status code here,
//! so nothing below this module deals in raw pointers or status integers.

// FFI requires unsafe
#![allow(unsafe_code)]

mod marshal;

use std::ffi::c_void;
use std::sync::{Arc, Once};

use parking_lot::RwLock;

use crate::abi::{
    kAudioHardwareNoError, kAudioObjectPlugInObject, pid_t, uuid_bytes, AudioObjectID,
    AudioObjectPropertyAddress, AudioServerPlugInClientInfo, AudioServerPlugInDriverInterface,
    AudioServerPlugInDriverRef, AudioServerPlugInHostRef, AudioServerPlugInIOCycleInfo, Boolean,
    CFDictionaryRef, CFUUIDBytes, DRIVER_INTERFACE_UUID, E_NOINTERFACE, HRESULT, IUNKNOWN_UUID,
    OSStatus, PLUGIN_TYPE_UUID, S_OK, ULONG,
};
use crate::config::{DriverConfig, CHANNELS};
use crate::driver::{ClientRecord, Driver};
use crate::error::{HalError, HalResult};
use crate::platform::{uuid_from_host, SystemClock};

static DRIVER: RwLock<Option<Driver>> = parking_lot::const_rwlock(None);

#[repr(transparent)]
struct InterfaceTable(AudioServerPlugInDriverInterface);

// SAFETY: the table is immutable; its only pointer field is null.
unsafe impl Sync for InterfaceTable {}

#[repr(transparent)]
struct InterfaceRef(*const AudioServerPlugInDriverInterface);

// SAFETY: points at the immutable static table.
unsafe impl Sync for InterfaceRef {}

static INTERFACE: InterfaceTable = InterfaceTable(AudioServerPlugInDriverInterface {
    _reserved: std::ptr::null_mut(),
    QueryInterface: Some(query_interface),
    AddRef: Some(add_ref),
    Release: Some(release),
    Initialize: Some(initialize),
    CreateDevice: Some(create_device),
    DestroyDevice: Some(destroy_device),
    AddDeviceClient: Some(add_device_client),
    RemoveDeviceClient: Some(remove_device_client),
    PerformDeviceConfigurationChange: Some(perform_device_configuration_change),
    AbortDeviceConfigurationChange: Some(abort_device_configuration_change),
    HasProperty: Some(has_property),
    IsPropertySettable: Some(is_property_settable),
    GetPropertyDataSize: Some(get_property_data_size),
    GetPropertyData: Some(get_property_data),
    SetPropertyData: Some(set_property_data),
    StartIO: Some(start_io),
    StopIO: Some(stop_io),
    GetZeroTimeStamp: Some(get_zero_timestamp),
    WillDoIOOperation: Some(will_do_io_operation),
    BeginIOOperation: Some(begin_io_operation),
    DoIOOperation: Some(do_io_operation),
    EndIOOperation: Some(end_io_operation),
});

static INTERFACE_REF: InterfaceRef = InterfaceRef(&INTERFACE.0);

/// The driver reference handed to the host: a pointer to the table pointer.
pub fn driver_ref() -> AudioServerPlugInDriverRef {
    std::ptr::addr_of!(INTERFACE_REF.0)
        .cast::<*mut AudioServerPlugInDriverInterface>()
        .cast_mut()
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Another subscriber may already be installed by the host process.
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

/// Entry point named in the bundle's `CFPlugInFactories`.
///
/// Returns the driver reference when `requested_type` is the audio server
/// plug-in type, creating the driver on first use. Any later call hands out
/// another reference to the same driver.
///
/// # Safety
///
/// `requested_type` must be null or a valid host UUID reference.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn SurgeAudioDriverPlugInFactory(
    _allocator: *const c_void,
    requested_type: *const c_void,
) -> *mut c_void {
    init_tracing();
    if uuid_from_host(requested_type) != Some(PLUGIN_TYPE_UUID) {
        tracing::warn!("factory called for an unknown plug-in type");
        return std::ptr::null_mut();
    }

    let mut slot = DRIVER.write();
    match slot.as_ref() {
        Some(driver) => {
            let refs = driver.add_ref();
            tracing::info!(refs, "factory returned existing driver");
        }
        None => match Driver::new(DriverConfig::default(), Arc::new(SystemClock::new())) {
            Ok(driver) => *slot = Some(driver),
            Err(err) => {
                tracing::error!(%err, "driver initialization failed");
                return std::ptr::null_mut();
            }
        },
    }
    driver_ref().cast()
}

#[allow(clippy::unnecessary_cast)]
fn status(result: HalResult<()>) -> OSStatus {
    match result {
        Ok(()) => kAudioHardwareNoError as OSStatus,
        Err(err) => err.status(),
    }
}

/// Runs `f` against the loaded driver after checking the reference.
fn with_driver<T>(
    driver: AudioServerPlugInDriverRef,
    f: impl FnOnce(&Driver) -> HalResult<T>,
) -> HalResult<T> {
    if driver != driver_ref() {
        return Err(HalError::BadObject {
            id: kAudioObjectPlugInObject,
        });
    }
    let slot = DRIVER.read();
    let loaded = slot
        .as_ref()
        .ok_or(HalError::Unspecified {
            reason: "driver is not loaded",
        })?;
    f(loaded)
}

unsafe fn client_record(client: *const AudioServerPlugInClientInfo) -> HalResult<ClientRecord> {
    let info = client
        .as_ref()
        .ok_or(HalError::illegal("null client info"))?;
    Ok(ClientRecord {
        client_id: info.mClientID,
        process_id: info.mProcessID,
    })
}

unsafe fn write_out<T>(out: *mut T, value: T) -> HalResult<()> {
    if out.is_null() {
        return Err(HalError::illegal("null output pointer"));
    }
    out.write_unaligned(value);
    Ok(())
}

// -- IUnknown ------------------------------------------------------------------

unsafe extern "C" fn query_interface(
    driver: *mut c_void,
    uuid: CFUUIDBytes,
    out: *mut *mut c_void,
) -> HRESULT {
    if out.is_null() {
        return E_NOINTERFACE;
    }
    let uuid = uuid_bytes(&uuid);
    if uuid != DRIVER_INTERFACE_UUID && uuid != IUNKNOWN_UUID {
        out.write(std::ptr::null_mut());
        return E_NOINTERFACE;
    }
    match with_driver(driver.cast(), |d| Ok(d.add_ref())) {
        Ok(_) => {
            out.write(driver);
            S_OK
        }
        Err(_) => {
            out.write(std::ptr::null_mut());
            E_NOINTERFACE
        }
    }
}

unsafe extern "C" fn add_ref(driver: *mut c_void) -> ULONG {
    with_driver(driver.cast(), |d| Ok(d.add_ref())).unwrap_or(0)
}

unsafe extern "C" fn release(driver: *mut c_void) -> ULONG {
    let Ok(refs) = with_driver(driver.cast(), |d| Ok(d.release())) else {
        return 0;
    };
    if refs == 0 {
        let mut slot = DRIVER.write();
        if slot.as_ref().is_some_and(|d| d.ref_count() == 0) {
            tracing::info!("last reference released");
            drop(slot.take());
        }
    }
    refs
}

// -- plug-in operations ----------------------------------------------------------

unsafe extern "C" fn initialize(
    driver: AudioServerPlugInDriverRef,
    host: AudioServerPlugInHostRef,
) -> OSStatus {
    status(with_driver(driver, |d| d.initialize(host)))
}

unsafe extern "C" fn create_device(
    driver: AudioServerPlugInDriverRef,
    _description: CFDictionaryRef,
    _client: *const AudioServerPlugInClientInfo,
    out_device: *mut AudioObjectID,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let device = d.create_device()?;
        write_out(out_device, device)
    }))
}

unsafe extern "C" fn destroy_device(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
) -> OSStatus {
    status(with_driver(driver, |d| d.destroy_device(device)))
}

unsafe extern "C" fn add_device_client(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client: *const AudioServerPlugInClientInfo,
) -> OSStatus {
    status(with_driver(driver, |d| {
        d.add_device_client(device, client_record(client)?)
    }))
}

unsafe extern "C" fn remove_device_client(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client: *const AudioServerPlugInClientInfo,
) -> OSStatus {
    status(with_driver(driver, |d| {
        d.remove_device_client(device, client_record(client)?)
    }))
}

unsafe extern "C" fn perform_device_configuration_change(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    action: u64,
    _info: *mut c_void,
) -> OSStatus {
    status(with_driver(driver, |d| {
        d.perform_configuration_change(device, action)
    }))
}

unsafe extern "C" fn abort_device_configuration_change(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    action: u64,
    _info: *mut c_void,
) -> OSStatus {
    status(with_driver(driver, |d| {
        d.abort_configuration_change(device, action)
    }))
}

// -- property protocol -----------------------------------------------------------

unsafe extern "C" fn has_property(
    driver: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _pid: pid_t,
    address: *const AudioObjectPropertyAddress,
) -> Boolean {
    let found = with_driver(driver, |d| {
        let address = marshal::read_address(address)?;
        Ok(d.has_property(object, &address))
    });
    Boolean::from(found.unwrap_or(false))
}

unsafe extern "C" fn is_property_settable(
    driver: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    out_settable: *mut Boolean,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let address = marshal::read_address(address)?;
        let settable = d.is_property_settable(object, &address)?;
        write_out(out_settable, Boolean::from(settable))
    }))
}

unsafe extern "C" fn get_property_data_size(
    driver: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    qualifier_size: u32,
    qualifier: *const c_void,
    out_size: *mut u32,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let address = marshal::read_address(address)?;
        let qualifier =
            marshal::read_qualifier(&address, qualifier_size, qualifier, 0, std::ptr::null());
        let size = d.property_data_size(object, &address, &qualifier)?;
        write_out(out_size, size)
    }))
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn get_property_data(
    driver: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    qualifier_size: u32,
    qualifier: *const c_void,
    in_size: u32,
    out_size: *mut u32,
    out_data: *mut c_void,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let address = marshal::read_address(address)?;
        let qualifier =
            marshal::read_qualifier(&address, qualifier_size, qualifier, in_size, out_data);
        let value = d.property_data(object, &address, &qualifier)?;
        marshal::write_value(&value, in_size, out_size, out_data)
    }))
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn set_property_data(
    driver: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    _qualifier_size: u32,
    _qualifier: *const c_void,
    in_size: u32,
    in_data: *const c_void,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let address = marshal::read_address(address)?;
        let kind = d.settable_kind(object, &address)?;
        let value = marshal::read_set_value(kind, in_size, in_data)?;
        d.set_property_data(object, &address, value)
    }))
}

// -- I/O -------------------------------------------------------------------------

unsafe extern "C" fn start_io(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client: u32,
) -> OSStatus {
    status(with_driver(driver, |d| d.start_io(device, client)))
}

unsafe extern "C" fn stop_io(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client: u32,
) -> OSStatus {
    status(with_driver(driver, |d| d.stop_io(device, client)))
}

unsafe extern "C" fn get_zero_timestamp(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    _client: u32,
    out_sample_time: *mut f64,
    out_host_time: *mut u64,
    out_seed: *mut u64,
) -> OSStatus {
    status(with_driver(driver, |d| {
        if out_sample_time.is_null() || out_host_time.is_null() || out_seed.is_null() {
            return Err(HalError::illegal("null timestamp output"));
        }
        let stamp = d.zero_timestamp(device)?;
        out_sample_time.write_unaligned(stamp.sample_time);
        out_host_time.write_unaligned(stamp.host_time);
        out_seed.write_unaligned(stamp.seed);
        Ok(())
    }))
}

unsafe extern "C" fn will_do_io_operation(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    _client: u32,
    operation: u32,
    out_will_do: *mut Boolean,
    out_in_place: *mut Boolean,
) -> OSStatus {
    status(with_driver(driver, |d| {
        if out_will_do.is_null() || out_in_place.is_null() {
            return Err(HalError::illegal("null capability output"));
        }
        let capability = d.will_do_io_operation(device, operation)?;
        out_will_do.write_unaligned(Boolean::from(capability.will_do));
        out_in_place.write_unaligned(Boolean::from(capability.in_place));
        Ok(())
    }))
}

unsafe extern "C" fn begin_io_operation(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    _client: u32,
    _operation: u32,
    _frames: u32,
    _cycle: *const AudioServerPlugInIOCycleInfo,
) -> OSStatus {
    status(with_driver(driver, |d| d.io_operation_boundary(device)))
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn do_io_operation(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    stream: AudioObjectID,
    _client: u32,
    operation: u32,
    frames: u32,
    _cycle: *const AudioServerPlugInIOCycleInfo,
    main_buffer: *mut c_void,
    _secondary_buffer: *mut c_void,
) -> OSStatus {
    status(with_driver(driver, |d| {
        let buffer = (!main_buffer.is_null()).then(|| {
            let len = frames as usize * CHANNELS as usize;
            // SAFETY: the host passes `frames` interleaved stereo f32 frames.
            std::slice::from_raw_parts_mut(main_buffer.cast::<f32>(), len)
        });
        d.do_io_operation(device, stream, operation, buffer)
    }))
}

unsafe extern "C" fn end_io_operation(
    driver: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    _client: u32,
    _operation: u32,
    _frames: u32,
    _cycle: *const AudioServerPlugInIOCycleInfo,
) -> OSStatus {
    status(with_driver(driver, |d| d.io_operation_boundary(device)))
}
