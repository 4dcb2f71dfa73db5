//! Drives the exported plug-in ABI the way the audio server does.
//!
//! The driver lives in a process-wide slot, so every test takes `SERIAL` and
//! releases all of its references before finishing. Host strings on this
//! platform are C strings owned by the caller.

#![cfg(not(target_os = "macos"))]
#![allow(unsafe_code, clippy::unwrap_used, clippy::float_cmp)]

use std::ffi::c_void;
use std::mem::size_of;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use surge_audio::abi::*;
use surge_audio::config::SHARED_REGION_NAME;
use surge_audio::object::{
    DEVICE_ID, INPUT_MUTE_ID, INPUT_STREAM_ID, INPUT_VOLUME_ID, OUTPUT_STREAM_ID,
};
use surge_audio::platform::{release_host_string, string_from_host, string_to_host};
use surge_audio::plugin::SurgeAudioDriverPlugInFactory;
use surge_audio::SharedRegionReader;

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

/// The plug-in type as the host passes it: a reference to 16 bytes.
static PLUGIN_TYPE: [u8; 16] = PLUGIN_TYPE_UUID;

const NO_ERROR: OSStatus = kAudioHardwareNoError;
const WRITE_MIX: u32 = kAudioServerPlugInIOOperationWriteMix;
const READ_INPUT: u32 = kAudioServerPlugInIOOperationReadInput;

/// A loaded plug-in. Dropping it releases every outstanding reference.
struct Host {
    driver: AudioServerPlugInDriverRef,
    _serial: MutexGuard<'static, ()>,
}

impl Host {
    fn load() -> Self {
        let serial = SERIAL.lock();
        let driver = unsafe {
            SurgeAudioDriverPlugInFactory(
                std::ptr::null(),
                std::ptr::addr_of!(PLUGIN_TYPE).cast(),
            )
        };
        assert!(!driver.is_null(), "factory returned null");
        let host = Self {
            driver: driver.cast(),
            _serial: serial,
        };
        assert_eq!(host.call_initialize(), NO_ERROR);
        host
    }

    fn table(&self) -> &AudioServerPlugInDriverInterface {
        unsafe { &**self.driver }
    }

    fn call_initialize(&self) -> OSStatus {
        unsafe { (self.table().Initialize.unwrap())(self.driver, std::ptr::null()) }
    }

    fn add_ref(&self) -> u32 {
        unsafe { (self.table().AddRef.unwrap())(self.driver.cast()) }
    }

    fn release(&self) -> u32 {
        unsafe { (self.table().Release.unwrap())(self.driver.cast()) }
    }

    fn query_interface(&self, uuid: [u8; 16]) -> (HRESULT, *mut c_void) {
        let mut out = std::ptr::null_mut();
        let uuid = uuid_from_bytes(uuid);
        let query = self.table().QueryInterface.unwrap();
        let result = unsafe { query(self.driver.cast(), uuid, &mut out) };
        (result, out)
    }

    fn has(&self, object: AudioObjectID, address: AudioObjectPropertyAddress) -> bool {
        unsafe { (self.table().HasProperty.unwrap())(self.driver, object, 0, &address) != 0 }
    }

    fn size(
        &self,
        object: AudioObjectID,
        address: AudioObjectPropertyAddress,
    ) -> Result<u32, OSStatus> {
        let mut size = 0;
        let status = unsafe {
            (self.table().GetPropertyDataSize.unwrap())(
                self.driver,
                object,
                0,
                &address,
                0,
                std::ptr::null(),
                &mut size,
            )
        };
        if status == NO_ERROR {
            Ok(size)
        } else {
            Err(status)
        }
    }

    fn get_raw(
        &self,
        object: AudioObjectID,
        address: &AudioObjectPropertyAddress,
        qualifier: Option<*const c_void>,
        in_size: u32,
        data: *mut c_void,
    ) -> (OSStatus, u32) {
        let mut out_size = 0;
        let (qualifier_size, qualifier) = match qualifier {
            Some(q) => (size_of::<*const c_void>() as u32, q),
            None => (0, std::ptr::null()),
        };
        let status = unsafe {
            (self.table().GetPropertyData.unwrap())(
                self.driver,
                object,
                0,
                address,
                qualifier_size,
                qualifier,
                in_size,
                &mut out_size,
                data,
            )
        };
        (status, out_size)
    }

    fn get<T: Copy + Default>(
        &self,
        object: AudioObjectID,
        address: AudioObjectPropertyAddress,
    ) -> Result<T, OSStatus> {
        let mut value = T::default();
        let (status, written) = self.get_raw(
            object,
            &address,
            None,
            size_of::<T>() as u32,
            std::ptr::addr_of_mut!(value).cast(),
        );
        if status != NO_ERROR {
            return Err(status);
        }
        assert_eq!(written as usize, size_of::<T>());
        Ok(value)
    }

    fn get_list<T: Copy + Default>(
        &self,
        object: AudioObjectID,
        address: AudioObjectPropertyAddress,
    ) -> Vec<T> {
        let size = self.size(object, address).unwrap();
        let mut values = vec![T::default(); size as usize / size_of::<T>()];
        let (status, written) =
            self.get_raw(object, &address, None, size, values.as_mut_ptr().cast());
        assert_eq!(status, NO_ERROR);
        assert_eq!(written, size);
        values
    }

    fn get_string(&self, object: AudioObjectID, address: AudioObjectPropertyAddress) -> String {
        let mut string: *const c_void = std::ptr::null();
        let (status, written) = self.get_raw(
            object,
            &address,
            None,
            size_of::<*const c_void>() as u32,
            std::ptr::addr_of_mut!(string).cast(),
        );
        assert_eq!(status, NO_ERROR);
        assert_eq!(written as usize, size_of::<*const c_void>());
        unsafe {
            let value = string_from_host(string).unwrap();
            release_host_string(string);
            value.as_str().to_string()
        }
    }

    fn set<T: Copy>(
        &self,
        object: AudioObjectID,
        address: AudioObjectPropertyAddress,
        value: T,
    ) -> OSStatus {
        unsafe {
            (self.table().SetPropertyData.unwrap())(
                self.driver,
                object,
                0,
                &address,
                0,
                std::ptr::null(),
                size_of::<T>() as u32,
                std::ptr::addr_of!(value).cast(),
            )
        }
    }

    fn start_io(&self) -> OSStatus {
        unsafe { (self.table().StartIO.unwrap())(self.driver, DEVICE_ID, 1) }
    }

    fn stop_io(&self) -> OSStatus {
        unsafe { (self.table().StopIO.unwrap())(self.driver, DEVICE_ID, 1) }
    }

    fn zero_timestamp(&self) -> (f64, u64, u64) {
        let (mut sample, mut host, mut seed) = (0.0, 0, 0);
        let status = unsafe {
            (self.table().GetZeroTimeStamp.unwrap())(
                self.driver,
                DEVICE_ID,
                1,
                &mut sample,
                &mut host,
                &mut seed,
            )
        };
        assert_eq!(status, NO_ERROR);
        (sample, host, seed)
    }

    fn do_io(&self, stream: AudioObjectID, operation: u32, buffer: &mut [f32]) -> OSStatus {
        let frames = (buffer.len() / 2) as u32;
        unsafe {
            (self.table().DoIOOperation.unwrap())(
                self.driver,
                DEVICE_ID,
                stream,
                1,
                operation,
                frames,
                std::ptr::null(),
                buffer.as_mut_ptr().cast(),
                std::ptr::null_mut(),
            )
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        while self.release() > 0 {}
    }
}

#[test]
fn test_factory_rejects_other_types() {
    let _serial = SERIAL.lock();
    let other = [0x11u8; 16];
    let driver = unsafe {
        SurgeAudioDriverPlugInFactory(std::ptr::null(), std::ptr::addr_of!(other).cast())
    };
    assert!(driver.is_null());
    let driver = unsafe { SurgeAudioDriverPlugInFactory(std::ptr::null(), std::ptr::null()) };
    assert!(driver.is_null());
}

#[test]
fn test_discovery() {
    let host = Host::load();

    let (result, interface) = host.query_interface(DRIVER_INTERFACE_UUID);
    assert_eq!(result, S_OK);
    assert_eq!(interface, host.driver.cast());
    // Factory reference plus the one QueryInterface took.
    assert_eq!(host.add_ref(), 3);
    assert_eq!(host.release(), 2);

    let (result, _) = host.query_interface(IUNKNOWN_UUID);
    assert_eq!(result, S_OK);
    assert_eq!(host.release(), 2);

    let (result, interface) = host.query_interface([0xAB; 16]);
    assert_eq!(result, E_NOINTERFACE);
    assert!(interface.is_null());

    let devices: Vec<AudioObjectID> =
        host.get_list(kAudioObjectPlugInObject, global_address(kAudioPlugInPropertyDeviceList));
    assert_eq!(devices, vec![DEVICE_ID]);
    assert_eq!(
        host.get_string(DEVICE_ID, global_address(kAudioObjectPropertyName)),
        "Surge Audio"
    );
    assert_eq!(
        host.get_string(DEVICE_ID, global_address(kAudioDevicePropertyDeviceUID)),
        "SurgeAudioDevice_UID"
    );
}

#[test]
fn test_translate_uid() {
    let host = Host::load();
    let address = global_address(kAudioPlugInPropertyTranslateUIDToDevice);
    let translate = |uid: &str| {
        let string = string_to_host(uid);
        let mut device: AudioObjectID = 99;
        let (status, _) = host.get_raw(
            kAudioObjectPlugInObject,
            &address,
            Some(std::ptr::addr_of!(string).cast()),
            4,
            std::ptr::addr_of_mut!(device).cast(),
        );
        unsafe { release_host_string(string) };
        assert_eq!(status, NO_ERROR);
        device
    };
    assert_eq!(translate("SurgeAudioDevice_UID"), DEVICE_ID);
    assert_eq!(translate("SomeOtherDevice"), 0);
}

#[test]
fn test_loopback() {
    let host = Host::load();
    assert_eq!(host.start_io(), NO_ERROR);
    assert_eq!(
        host.get::<u32>(DEVICE_ID, global_address(kAudioDevicePropertyDeviceIsRunning)),
        Ok(1)
    );

    let mut mix = vec![0.5f32; 512 * 2];
    let mut input = vec![0.0f32; 512 * 2];
    assert_eq!(host.do_io(OUTPUT_STREAM_ID, WRITE_MIX, &mut mix), NO_ERROR);
    assert_eq!(host.do_io(INPUT_STREAM_ID, READ_INPUT, &mut input), NO_ERROR);
    assert!(input.iter().all(|&s| s == 0.5));

    assert_eq!(
        host.set(
            INPUT_VOLUME_ID,
            global_address(kAudioLevelControlPropertyScalarValue),
            0.5f32
        ),
        NO_ERROR
    );
    assert_eq!(host.do_io(OUTPUT_STREAM_ID, WRITE_MIX, &mut mix), NO_ERROR);
    assert_eq!(host.do_io(INPUT_STREAM_ID, READ_INPUT, &mut input), NO_ERROR);
    assert!(input.iter().all(|&s| s == 0.25));

    assert_eq!(host.stop_io(), NO_ERROR);
    assert_eq!(host.stop_io(), kAudioHardwareIllegalOperationError);
}

#[test]
fn test_sample_rate_policy() {
    let host = Host::load();
    let nominal = global_address(kAudioDevicePropertyNominalSampleRate);

    let rates: Vec<AudioValueRange> = host.get_list(
        DEVICE_ID,
        global_address(kAudioDevicePropertyAvailableNominalSampleRates),
    );
    let rates: Vec<(f64, f64)> = rates.iter().map(|r| (r.mMinimum, r.mMaximum)).collect();
    assert_eq!(
        rates,
        [44_100.0, 48_000.0, 96_000.0, 192_000.0].map(|hz| (hz, hz))
    );

    assert_eq!(host.get::<f64>(DEVICE_ID, nominal), Ok(48_000.0));
    assert_eq!(host.set(DEVICE_ID, nominal, 96_000.0f64), NO_ERROR);
    assert_eq!(host.get::<f64>(DEVICE_ID, nominal), Ok(96_000.0));

    assert_eq!(host.set(DEVICE_ID, nominal, 22_050.0f64), kAudioHardwareIllegalOperationError);
    assert_eq!(host.get::<f64>(DEVICE_ID, nominal), Ok(96_000.0));

    // Too few bytes for a Float64.
    assert_eq!(host.set(DEVICE_ID, nominal, 1u32), kAudioHardwareBadPropertySizeError);
    assert_eq!(
        host.set(DEVICE_ID, global_address(kAudioObjectPropertyName), 1u32),
        kAudioHardwareIllegalOperationError
    );
}

#[test]
fn test_error_paths() {
    let host = Host::load();

    assert_eq!(
        host.get::<f32>(INPUT_MUTE_ID, global_address(kAudioLevelControlPropertyScalarValue)),
        Err(kAudioHardwareUnknownPropertyError)
    );
    assert!(!host.has(INPUT_MUTE_ID, global_address(kAudioLevelControlPropertyScalarValue)));
    assert_eq!(
        host.get::<u32>(99, global_address(kAudioObjectPropertyClass)),
        Err(kAudioHardwareBadObjectError)
    );

    let mut small = [0xEEu8; 4];
    let (status, _) = host.get_raw(
        DEVICE_ID,
        &global_address(kAudioDevicePropertyStreams),
        None,
        4,
        small.as_mut_ptr().cast(),
    );
    assert_eq!(status, kAudioHardwareBadPropertySizeError);
    assert_eq!(small, [0xEE; 4]);

    let (mut out_size, mut data) = (0u32, 0u32);
    let status = unsafe {
        (host.table().GetPropertyData.unwrap())(
            host.driver,
            DEVICE_ID,
            0,
            std::ptr::null(),
            0,
            std::ptr::null(),
            4,
            &mut out_size,
            std::ptr::addr_of_mut!(data).cast(),
        )
    };
    assert_eq!(status, kAudioHardwareIllegalOperationError);
}

#[test]
fn test_scoped_streams() {
    let host = Host::load();
    let streams = |scope| {
        let address = scoped_address(kAudioDevicePropertyStreams, scope);
        host.get_list::<AudioObjectID>(DEVICE_ID, address)
    };
    assert_eq!(streams(kAudioObjectPropertyScopeInput), vec![INPUT_STREAM_ID]);
    assert_eq!(streams(kAudioObjectPropertyScopeOutput), vec![OUTPUT_STREAM_ID]);
    assert_eq!(streams(kAudioObjectPropertyScopeGlobal), vec![INPUT_STREAM_ID, OUTPUT_STREAM_ID]);
}

#[test]
fn test_device_lifecycle() {
    let host = Host::load();
    let client = AudioServerPlugInClientInfo {
        mClientID: 42,
        mProcessID: 4242,
        mIsNativeEndian: 1,
        mBundleID: std::ptr::null(),
    };
    let table = host.table();
    unsafe {
        assert_eq!(
            (table.AddDeviceClient.unwrap())(host.driver, DEVICE_ID, &client),
            NO_ERROR
        );
        assert_eq!(
            (table.RemoveDeviceClient.unwrap())(host.driver, DEVICE_ID, &client),
            NO_ERROR
        );
        assert_eq!(
            (table.PerformDeviceConfigurationChange.unwrap())(
                host.driver,
                DEVICE_ID,
                44_100,
                std::ptr::null_mut()
            ),
            NO_ERROR
        );
        assert_eq!(
            (table.DestroyDevice.unwrap())(host.driver, DEVICE_ID),
            NO_ERROR
        );
    }
    let devices = global_address(kAudioPlugInPropertyDeviceList);
    assert!(host
        .get_list::<AudioObjectID>(kAudioObjectPlugInObject, devices)
        .is_empty());
    assert_eq!(
        host.get::<u32>(DEVICE_ID, global_address(kAudioObjectPropertyClass)),
        Err(kAudioHardwareBadObjectError)
    );

    let mut device = 0;
    let status = unsafe {
        (table.CreateDevice.unwrap())(host.driver, std::ptr::null(), &client, &mut device)
    };
    assert_eq!(status, NO_ERROR);
    assert_eq!(device, DEVICE_ID);
    assert_eq!(
        host.get::<f64>(DEVICE_ID, global_address(kAudioDevicePropertyNominalSampleRate)),
        Ok(44_100.0)
    );
}

#[test]
fn test_zero_timestamps() {
    let host = Host::load();
    assert_eq!(host.zero_timestamp(), (0.0, 0, 1));

    assert_eq!(host.start_io(), NO_ERROR);
    let (first_sample, first_host, seed) = host.zero_timestamp();
    // Comfortably more than one 512-frame period at 48 kHz.
    std::thread::sleep(Duration::from_millis(25));
    let (second_sample, second_host, second_seed) = host.zero_timestamp();

    assert!(second_sample > first_sample);
    assert!(second_host > first_host);
    assert_eq!(second_sample % 512.0, 0.0);
    assert_eq!(second_seed, seed);

    let (mut will_do, mut in_place) = (0u8, 0u8);
    let status = unsafe {
        (host.table().WillDoIOOperation.unwrap())(
            host.driver,
            DEVICE_ID,
            1,
            READ_INPUT,
            &mut will_do,
            &mut in_place,
        )
    };
    assert_eq!(status, NO_ERROR);
    assert_eq!((will_do, in_place), (1, 1));

    assert_eq!(host.stop_io(), NO_ERROR);
}

#[test]
fn test_shared_region() {
    let host = Host::load();
    let reader = SharedRegionReader::open(SHARED_REGION_NAME).unwrap();
    assert_eq!(reader.sample_rate(), 48_000);
    assert_eq!(reader.channels(), 1);
    assert_eq!(reader.frame_size(), 4);
    assert!(!reader.is_active());

    assert_eq!(host.start_io(), NO_ERROR);
    assert!(reader.is_active());

    let before = reader.write_position();
    let mut mix = vec![0.25f32; 512 * 2];
    assert_eq!(host.do_io(OUTPUT_STREAM_ID, WRITE_MIX, &mut mix), NO_ERROR);
    assert_eq!(reader.write_position() - before, 512);

    assert_eq!(
        host.set(
            DEVICE_ID,
            global_address(kAudioDevicePropertyNominalSampleRate),
            96_000.0f64
        ),
        NO_ERROR
    );
    assert_eq!(reader.sample_rate(), 96_000);

    assert_eq!(host.stop_io(), NO_ERROR);
    assert!(!reader.is_active());
}

#[test]
fn test_last_release_unloads_driver() {
    let host = Host::load();
    assert!(SharedRegionReader::open(SHARED_REGION_NAME).is_ok());
    assert_eq!(host.start_io(), NO_ERROR);

    while host.release() > 0 {}

    assert!(SharedRegionReader::open(SHARED_REGION_NAME).is_err());
    // The table outlives the driver; calls through it find nothing loaded.
    assert_eq!(host.start_io(), kAudioHardwareUnspecifiedError);
    assert_eq!(host.add_ref(), 0);
    assert!(!host.has(DEVICE_ID, global_address(kAudioObjectPropertyName)));
}
