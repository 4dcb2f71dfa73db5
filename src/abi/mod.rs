//! Host ABI for audio server plug-ins.
//!
//! On macOS every type, constant and CoreFoundation call comes from
//! `coreaudio-sys`. Other hosts get a stand-in with the same names and
//! layouts (see `portable`) so the exported interface can be driven by tests
//! anywhere. Only what the headers express as macros is spelled out here:
//! the COM result codes and the interface UUIDs.

#![allow(non_upper_case_globals)]

#[cfg(not(target_os = "macos"))]
mod portable;

#[cfg(target_os = "macos")]
pub use coreaudio_sys::{
    kAudioBooleanControlClassID, kAudioBooleanControlPropertyValue, kAudioControlPropertyElement,
    kAudioControlPropertyScope, kAudioDeviceClassID,
    kAudioDevicePropertyAvailableNominalSampleRates, kAudioDevicePropertyClockDomain,
    kAudioDevicePropertyDeviceCanBeDefaultDevice,
    kAudioDevicePropertyDeviceCanBeDefaultSystemDevice, kAudioDevicePropertyDeviceIsAlive,
    kAudioDevicePropertyDeviceIsRunning, kAudioDevicePropertyDeviceUID,
    kAudioDevicePropertyIsHidden, kAudioDevicePropertyLatency, kAudioDevicePropertyModelUID,
    kAudioDevicePropertyNominalSampleRate, kAudioDevicePropertyPreferredChannelsForStereo,
    kAudioDevicePropertyRelatedDevices, kAudioDevicePropertySafetyOffset,
    kAudioDevicePropertyStreams, kAudioDevicePropertyTransportType,
    kAudioDevicePropertyZeroTimeStampPeriod, kAudioDeviceTransportTypeVirtual,
    kAudioFormatFlagIsBigEndian, kAudioFormatFlagIsFloat, kAudioFormatFlagIsNonInterleaved,
    kAudioFormatFlagIsPacked, kAudioFormatFlagsNativeEndian, kAudioFormatLinearPCM,
    kAudioHardwareBadObjectError, kAudioHardwareBadPropertySizeError,
    kAudioHardwareIllegalOperationError, kAudioHardwareNoError, kAudioHardwareUnknownPropertyError,
    kAudioHardwareUnspecifiedError, kAudioHardwareUnsupportedOperationError,
    kAudioLevelControlClassID, kAudioLevelControlPropertyConvertDecibelsToScalar,
    kAudioLevelControlPropertyConvertScalarToDecibels, kAudioLevelControlPropertyDecibelRange,
    kAudioLevelControlPropertyDecibelValue, kAudioLevelControlPropertyScalarValue,
    kAudioMuteControlClassID, kAudioObjectClassID, kAudioObjectPlugInObject,
    kAudioObjectPropertyBaseClass, kAudioObjectPropertyClass, kAudioObjectPropertyControlList,
    kAudioObjectPropertyElementMain, kAudioObjectPropertyManufacturer, kAudioObjectPropertyName,
    kAudioObjectPropertyOwnedObjects, kAudioObjectPropertyOwner, kAudioObjectPropertyScopeGlobal,
    kAudioObjectPropertyScopeInput, kAudioObjectPropertyScopeOutput, kAudioObjectUnknown,
    kAudioPlugInClassID, kAudioPlugInPropertyDeviceList, kAudioPlugInPropertyResourceBundle,
    kAudioPlugInPropertyTranslateUIDToDevice, kAudioServerPlugInIOOperationReadInput,
    kAudioServerPlugInIOOperationWriteMix, kAudioStreamClassID,
    kAudioStreamPropertyAvailablePhysicalFormats, kAudioStreamPropertyAvailableVirtualFormats,
    kAudioStreamPropertyDirection, kAudioStreamPropertyIsActive, kAudioStreamPropertyLatency,
    kAudioStreamPropertyPhysicalFormat, kAudioStreamPropertyStartingChannel,
    kAudioStreamPropertyTerminalType, kAudioStreamPropertyVirtualFormat,
    kAudioStreamTerminalTypeMicrophone, kAudioStreamTerminalTypeSpeaker,
    kAudioVolumeControlClassID, pid_t, AudioObjectID, AudioObjectPropertyAddress,
    AudioObjectPropertyScope, AudioObjectPropertySelector, AudioServerPlugInClientInfo,
    AudioServerPlugInDriverInterface, AudioServerPlugInDriverRef, AudioServerPlugInHostRef,
    AudioServerPlugInIOCycleInfo, AudioStreamBasicDescription, AudioStreamRangedDescription,
    AudioValueRange, Boolean, CFDictionaryRef, CFUUIDBytes, HRESULT, OSStatus, ULONG,
};

#[cfg(not(target_os = "macos"))]
pub use portable::*;

/// Builds a four-character code the way the host headers do (`'abcd'`).
#[must_use]
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

pub const S_OK: HRESULT = 0;
#[allow(clippy::cast_possible_wrap)]
pub const E_NOINTERFACE: HRESULT = 0x8000_0004_u32 as HRESULT;

/// `kAudioServerPlugInTypeUUID`: 443ABAB8-E7B3-491A-B985-BEB9187030DB.
pub const PLUGIN_TYPE_UUID: [u8; 16] = [
    0x44, 0x3A, 0xBA, 0xB8, 0xE7, 0xB3, 0x49, 0x1A, 0xB9, 0x85, 0xBE, 0xB9, 0x18, 0x70, 0x30, 0xDB,
];

/// `kAudioServerPlugInDriverInterfaceUUID`: EEA5773D-CC43-49F1-8E00-8F96E7D23B17.
pub const DRIVER_INTERFACE_UUID: [u8; 16] = [
    0xEE, 0xA5, 0x77, 0x3D, 0xCC, 0x43, 0x49, 0xF1, 0x8E, 0x00, 0x8F, 0x96, 0xE7, 0xD2, 0x3B, 0x17,
];

/// `IUnknownUUID`: 00000000-0000-0000-C000-000000000046.
pub const IUNKNOWN_UUID: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

/// The 16 bytes of a `CFUUIDBytes`, in order.
#[must_use]
pub fn uuid_bytes(uuid: &CFUUIDBytes) -> [u8; 16] {
    [
        uuid.byte0, uuid.byte1, uuid.byte2, uuid.byte3, uuid.byte4, uuid.byte5, uuid.byte6,
        uuid.byte7, uuid.byte8, uuid.byte9, uuid.byte10, uuid.byte11, uuid.byte12, uuid.byte13,
        uuid.byte14, uuid.byte15,
    ]
}

/// Packs 16 bytes into a `CFUUIDBytes`.
#[must_use]
pub fn uuid_from_bytes(b: [u8; 16]) -> CFUUIDBytes {
    CFUUIDBytes {
        byte0: b[0],
        byte1: b[1],
        byte2: b[2],
        byte3: b[3],
        byte4: b[4],
        byte5: b[5],
        byte6: b[6],
        byte7: b[7],
        byte8: b[8],
        byte9: b[9],
        byte10: b[10],
        byte11: b[11],
        byte12: b[12],
        byte13: b[13],
        byte14: b[14],
        byte15: b[15],
    }
}

/// Address in the global scope, main element.
#[must_use]
pub const fn global_address(selector: AudioObjectPropertySelector) -> AudioObjectPropertyAddress {
    scoped_address(selector, kAudioObjectPropertyScopeGlobal)
}

/// Address in an explicit scope, main element.
#[must_use]
pub const fn scoped_address(
    selector: AudioObjectPropertySelector,
    scope: AudioObjectPropertyScope,
) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: kAudioObjectPropertyElementMain,
    }
}
