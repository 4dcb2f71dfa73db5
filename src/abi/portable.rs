//! Stand-in for the `coreaudio-sys` items the plug-in uses, for hosts without
//! the macOS SDK. Names, field names and layouts follow the system headers.

#![allow(non_camel_case_types, non_snake_case, clippy::upper_case_acronyms)]

use std::ffi::c_void;

use super::fourcc;

pub type AudioObjectID = u32;
pub type AudioClassID = u32;
pub type AudioObjectPropertySelector = u32;
pub type AudioObjectPropertyScope = u32;
pub type AudioObjectPropertyElement = u32;
pub type OSStatus = i32;
pub type HRESULT = i32;
pub type ULONG = u32;
pub type Boolean = u8;
pub type pid_t = libc::pid_t;
pub type CFDictionaryRef = *const c_void;
pub type CFStringRef = *const c_void;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CFUUIDBytes {
    pub byte0: u8,
    pub byte1: u8,
    pub byte2: u8,
    pub byte3: u8,
    pub byte4: u8,
    pub byte5: u8,
    pub byte6: u8,
    pub byte7: u8,
    pub byte8: u8,
    pub byte9: u8,
    pub byte10: u8,
    pub byte11: u8,
    pub byte12: u8,
    pub byte13: u8,
    pub byte14: u8,
    pub byte15: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioObjectPropertyAddress {
    pub mSelector: AudioObjectPropertySelector,
    pub mScope: AudioObjectPropertyScope,
    pub mElement: AudioObjectPropertyElement,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioValueRange {
    pub mMinimum: f64,
    pub mMaximum: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioStreamBasicDescription {
    pub mSampleRate: f64,
    pub mFormatID: u32,
    pub mFormatFlags: u32,
    pub mBytesPerPacket: u32,
    pub mFramesPerPacket: u32,
    pub mBytesPerFrame: u32,
    pub mChannelsPerFrame: u32,
    pub mBitsPerChannel: u32,
    pub mReserved: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioStreamRangedDescription {
    pub mFormat: AudioStreamBasicDescription,
    pub mSampleRateRange: AudioValueRange,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AudioServerPlugInClientInfo {
    pub mClientID: u32,
    pub mProcessID: pid_t,
    pub mIsNativeEndian: Boolean,
    pub mBundleID: CFStringRef,
}

#[repr(C)]
pub struct AudioServerPlugInIOCycleInfo {
    _opaque: [u8; 0],
}

#[repr(C)]
pub struct AudioServerPlugInHostInterface {
    _opaque: [u8; 0],
}

pub type AudioServerPlugInHostRef = *const AudioServerPlugInHostInterface;
pub type AudioServerPlugInDriverRef = *mut *mut AudioServerPlugInDriverInterface;

#[repr(C)]
pub struct AudioServerPlugInDriverInterface {
    pub _reserved: *mut c_void,
    pub QueryInterface: Option<
        unsafe extern "C" fn(
            inDriver: *mut c_void,
            inUUID: CFUUIDBytes,
            outInterface: *mut *mut c_void,
        ) -> HRESULT,
    >,
    pub AddRef: Option<unsafe extern "C" fn(inDriver: *mut c_void) -> ULONG>,
    pub Release: Option<unsafe extern "C" fn(inDriver: *mut c_void) -> ULONG>,
    pub Initialize: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inHost: AudioServerPlugInHostRef,
        ) -> OSStatus,
    >,
    pub CreateDevice: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDescription: CFDictionaryRef,
            inClientInfo: *const AudioServerPlugInClientInfo,
            outDeviceObjectID: *mut AudioObjectID,
        ) -> OSStatus,
    >,
    pub DestroyDevice: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
        ) -> OSStatus,
    >,
    pub AddDeviceClient: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientInfo: *const AudioServerPlugInClientInfo,
        ) -> OSStatus,
    >,
    pub RemoveDeviceClient: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientInfo: *const AudioServerPlugInClientInfo,
        ) -> OSStatus,
    >,
    pub PerformDeviceConfigurationChange: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inChangeAction: u64,
            inChangeInfo: *mut c_void,
        ) -> OSStatus,
    >,
    pub AbortDeviceConfigurationChange: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inChangeAction: u64,
            inChangeInfo: *mut c_void,
        ) -> OSStatus,
    >,
    pub HasProperty: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inObjectID: AudioObjectID,
            inClientProcessID: pid_t,
            inAddress: *const AudioObjectPropertyAddress,
        ) -> Boolean,
    >,
    pub IsPropertySettable: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inObjectID: AudioObjectID,
            inClientProcessID: pid_t,
            inAddress: *const AudioObjectPropertyAddress,
            outIsSettable: *mut Boolean,
        ) -> OSStatus,
    >,
    pub GetPropertyDataSize: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inObjectID: AudioObjectID,
            inClientProcessID: pid_t,
            inAddress: *const AudioObjectPropertyAddress,
            inQualifierDataSize: u32,
            inQualifierData: *const c_void,
            outDataSize: *mut u32,
        ) -> OSStatus,
    >,
    pub GetPropertyData: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inObjectID: AudioObjectID,
            inClientProcessID: pid_t,
            inAddress: *const AudioObjectPropertyAddress,
            inQualifierDataSize: u32,
            inQualifierData: *const c_void,
            inDataSize: u32,
            outDataSize: *mut u32,
            outData: *mut c_void,
        ) -> OSStatus,
    >,
    pub SetPropertyData: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inObjectID: AudioObjectID,
            inClientProcessID: pid_t,
            inAddress: *const AudioObjectPropertyAddress,
            inQualifierDataSize: u32,
            inQualifierData: *const c_void,
            inDataSize: u32,
            inData: *const c_void,
        ) -> OSStatus,
    >,
    pub StartIO: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
        ) -> OSStatus,
    >,
    pub StopIO: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
        ) -> OSStatus,
    >,
    pub GetZeroTimeStamp: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
            outSampleTime: *mut f64,
            outHostTime: *mut u64,
            outSeed: *mut u64,
        ) -> OSStatus,
    >,
    pub WillDoIOOperation: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
            inOperationID: u32,
            outWillDo: *mut Boolean,
            outWillDoInPlace: *mut Boolean,
        ) -> OSStatus,
    >,
    pub BeginIOOperation: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
            inOperationID: u32,
            inIOBufferFrameSize: u32,
            inIOCycleInfo: *const AudioServerPlugInIOCycleInfo,
        ) -> OSStatus,
    >,
    pub DoIOOperation: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inStreamObjectID: AudioObjectID,
            inClientID: u32,
            inOperationID: u32,
            inIOBufferFrameSize: u32,
            inIOCycleInfo: *const AudioServerPlugInIOCycleInfo,
            ioMainBuffer: *mut c_void,
            ioSecondaryBuffer: *mut c_void,
        ) -> OSStatus,
    >,
    pub EndIOOperation: Option<
        unsafe extern "C" fn(
            inDriver: AudioServerPlugInDriverRef,
            inDeviceObjectID: AudioObjectID,
            inClientID: u32,
            inOperationID: u32,
            inIOBufferFrameSize: u32,
            inIOCycleInfo: *const AudioServerPlugInIOCycleInfo,
        ) -> OSStatus,
    >,
}

pub const kAudioObjectUnknown: AudioObjectID = 0;
pub const kAudioObjectPlugInObject: AudioObjectID = 1;

pub const kAudioHardwareNoError: OSStatus = 0;
pub const kAudioHardwareUnspecifiedError: OSStatus = fourcc(b"what") as OSStatus;
pub const kAudioHardwareUnknownPropertyError: OSStatus = fourcc(b"who?") as OSStatus;
pub const kAudioHardwareBadPropertySizeError: OSStatus = fourcc(b"!siz") as OSStatus;
pub const kAudioHardwareIllegalOperationError: OSStatus = fourcc(b"nope") as OSStatus;
pub const kAudioHardwareBadObjectError: OSStatus = fourcc(b"!obj") as OSStatus;
pub const kAudioHardwareUnsupportedOperationError: OSStatus = fourcc(b"unop") as OSStatus;

pub const kAudioObjectPropertyScopeGlobal: AudioObjectPropertyScope = fourcc(b"glob");
pub const kAudioObjectPropertyScopeInput: AudioObjectPropertyScope = fourcc(b"inpt");
pub const kAudioObjectPropertyScopeOutput: AudioObjectPropertyScope = fourcc(b"outp");
pub const kAudioObjectPropertyElementMain: AudioObjectPropertyElement = 0;

pub const kAudioObjectClassID: AudioClassID = fourcc(b"aobj");
pub const kAudioPlugInClassID: AudioClassID = fourcc(b"aplg");
pub const kAudioDeviceClassID: AudioClassID = fourcc(b"adev");
pub const kAudioStreamClassID: AudioClassID = fourcc(b"astr");
pub const kAudioLevelControlClassID: AudioClassID = fourcc(b"levl");
pub const kAudioVolumeControlClassID: AudioClassID = fourcc(b"vlme");
pub const kAudioBooleanControlClassID: AudioClassID = fourcc(b"togl");
pub const kAudioMuteControlClassID: AudioClassID = fourcc(b"mute");

pub const kAudioObjectPropertyBaseClass: AudioObjectPropertySelector = fourcc(b"bcls");
pub const kAudioObjectPropertyClass: AudioObjectPropertySelector = fourcc(b"clas");
pub const kAudioObjectPropertyOwner: AudioObjectPropertySelector = fourcc(b"stdv");
pub const kAudioObjectPropertyName: AudioObjectPropertySelector = fourcc(b"lnam");
pub const kAudioObjectPropertyManufacturer: AudioObjectPropertySelector = fourcc(b"lmak");
pub const kAudioObjectPropertyOwnedObjects: AudioObjectPropertySelector = fourcc(b"ownd");
pub const kAudioObjectPropertyControlList: AudioObjectPropertySelector = fourcc(b"ctrl");

pub const kAudioPlugInPropertyDeviceList: AudioObjectPropertySelector = fourcc(b"dev#");
pub const kAudioPlugInPropertyTranslateUIDToDevice: AudioObjectPropertySelector = fourcc(b"uidd");
pub const kAudioPlugInPropertyResourceBundle: AudioObjectPropertySelector = fourcc(b"rsrc");

pub const kAudioDevicePropertyDeviceUID: AudioObjectPropertySelector = fourcc(b"uid ");
pub const kAudioDevicePropertyModelUID: AudioObjectPropertySelector = fourcc(b"muid");
pub const kAudioDevicePropertyTransportType: AudioObjectPropertySelector = fourcc(b"tran");
pub const kAudioDevicePropertyRelatedDevices: AudioObjectPropertySelector = fourcc(b"akin");
pub const kAudioDevicePropertyClockDomain: AudioObjectPropertySelector = fourcc(b"clkd");
pub const kAudioDevicePropertyDeviceIsAlive: AudioObjectPropertySelector = fourcc(b"livn");
pub const kAudioDevicePropertyDeviceIsRunning: AudioObjectPropertySelector = fourcc(b"goin");
pub const kAudioDevicePropertyDeviceCanBeDefaultDevice: AudioObjectPropertySelector =
    fourcc(b"dflt");
pub const kAudioDevicePropertyDeviceCanBeDefaultSystemDevice: AudioObjectPropertySelector =
    fourcc(b"sflt");
pub const kAudioDevicePropertyIsHidden: AudioObjectPropertySelector = fourcc(b"hidn");
pub const kAudioDevicePropertyLatency: AudioObjectPropertySelector = fourcc(b"ltnc");
pub const kAudioDevicePropertySafetyOffset: AudioObjectPropertySelector = fourcc(b"saft");
pub const kAudioDevicePropertyStreams: AudioObjectPropertySelector = fourcc(b"stm#");
pub const kAudioDevicePropertyNominalSampleRate: AudioObjectPropertySelector = fourcc(b"nsrt");
pub const kAudioDevicePropertyAvailableNominalSampleRates: AudioObjectPropertySelector =
    fourcc(b"nsr#");
pub const kAudioDevicePropertyZeroTimeStampPeriod: AudioObjectPropertySelector = fourcc(b"ring");
pub const kAudioDevicePropertyPreferredChannelsForStereo: AudioObjectPropertySelector =
    fourcc(b"dch2");
pub const kAudioDeviceTransportTypeVirtual: u32 = fourcc(b"virt");

pub const kAudioStreamPropertyIsActive: AudioObjectPropertySelector = fourcc(b"sact");
pub const kAudioStreamPropertyDirection: AudioObjectPropertySelector = fourcc(b"sdir");
pub const kAudioStreamPropertyTerminalType: AudioObjectPropertySelector = fourcc(b"term");
pub const kAudioStreamPropertyStartingChannel: AudioObjectPropertySelector = fourcc(b"schn");
pub const kAudioStreamPropertyLatency: AudioObjectPropertySelector = kAudioDevicePropertyLatency;
pub const kAudioStreamPropertyVirtualFormat: AudioObjectPropertySelector = fourcc(b"sfmt");
pub const kAudioStreamPropertyAvailableVirtualFormats: AudioObjectPropertySelector =
    fourcc(b"sfma");
pub const kAudioStreamPropertyPhysicalFormat: AudioObjectPropertySelector = fourcc(b"pft ");
pub const kAudioStreamPropertyAvailablePhysicalFormats: AudioObjectPropertySelector =
    fourcc(b"pfta");
pub const kAudioStreamTerminalTypeMicrophone: u32 = fourcc(b"micr");
pub const kAudioStreamTerminalTypeSpeaker: u32 = fourcc(b"spkr");

pub const kAudioControlPropertyScope: AudioObjectPropertySelector = fourcc(b"cscp");
pub const kAudioControlPropertyElement: AudioObjectPropertySelector = fourcc(b"celm");
pub const kAudioLevelControlPropertyScalarValue: AudioObjectPropertySelector = fourcc(b"lcsv");
pub const kAudioLevelControlPropertyDecibelValue: AudioObjectPropertySelector = fourcc(b"lcdv");
pub const kAudioLevelControlPropertyDecibelRange: AudioObjectPropertySelector = fourcc(b"lcdr");
pub const kAudioLevelControlPropertyConvertScalarToDecibels: AudioObjectPropertySelector =
    fourcc(b"lcsd");
pub const kAudioLevelControlPropertyConvertDecibelsToScalar: AudioObjectPropertySelector =
    fourcc(b"lcds");
pub const kAudioBooleanControlPropertyValue: AudioObjectPropertySelector = fourcc(b"bcvl");

pub const kAudioFormatLinearPCM: u32 = fourcc(b"lpcm");
pub const kAudioFormatFlagIsFloat: u32 = 1 << 0;
pub const kAudioFormatFlagIsBigEndian: u32 = 1 << 1;
pub const kAudioFormatFlagIsPacked: u32 = 1 << 3;
pub const kAudioFormatFlagIsNonInterleaved: u32 = 1 << 5;
#[cfg(target_endian = "big")]
pub const kAudioFormatFlagsNativeEndian: u32 = kAudioFormatFlagIsBigEndian;
#[cfg(target_endian = "little")]
pub const kAudioFormatFlagsNativeEndian: u32 = 0;

pub const kAudioServerPlugInIOOperationReadInput: u32 = fourcc(b"read");
pub const kAudioServerPlugInIOOperationWriteMix: u32 = fourcc(b"rite");
