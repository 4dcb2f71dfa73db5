//! Device object properties.

use super::{class_value, PropertyEntry, PropertyValue, SetValue, ValueKind};
use crate::abi::{
    kAudioDeviceClassID, kAudioDevicePropertyAvailableNominalSampleRates,
    kAudioDevicePropertyClockDomain, kAudioDevicePropertyDeviceCanBeDefaultDevice,
    kAudioDevicePropertyDeviceCanBeDefaultSystemDevice, kAudioDevicePropertyDeviceIsAlive,
    kAudioDevicePropertyDeviceIsRunning, kAudioDevicePropertyDeviceUID,
    kAudioDevicePropertyIsHidden, kAudioDevicePropertyLatency, kAudioDevicePropertyModelUID,
    kAudioDevicePropertyNominalSampleRate, kAudioDevicePropertyPreferredChannelsForStereo,
    kAudioDevicePropertyRelatedDevices, kAudioDevicePropertySafetyOffset,
    kAudioDevicePropertyStreams, kAudioDevicePropertyTransportType,
    kAudioDevicePropertyZeroTimeStampPeriod, kAudioDeviceTransportTypeVirtual, kAudioObjectClassID,
    kAudioObjectPlugInObject, kAudioObjectPropertyBaseClass, kAudioObjectPropertyClass,
    kAudioObjectPropertyControlList, kAudioObjectPropertyManufacturer, kAudioObjectPropertyName,
    kAudioObjectPropertyOwnedObjects, kAudioObjectPropertyOwner, AudioObjectPropertyAddress,
};
use crate::driver::Driver;
use crate::error::{HalError, HalResult};
use crate::format::{available_sample_rates, validate_sample_rate};
use crate::object::{filter_by_scope, AudioObject, Direction, ObjectList, DEVICE_ID};

pub(super) const PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry::read_only(kAudioObjectPropertyBaseClass),
    PropertyEntry::read_only(kAudioObjectPropertyClass),
    PropertyEntry::read_only(kAudioObjectPropertyOwner),
    PropertyEntry::read_only(kAudioObjectPropertyName),
    PropertyEntry::read_only(kAudioObjectPropertyManufacturer),
    PropertyEntry::read_only(kAudioObjectPropertyOwnedObjects),
    PropertyEntry::read_only(kAudioObjectPropertyControlList),
    PropertyEntry::read_only(kAudioDevicePropertyDeviceUID),
    PropertyEntry::read_only(kAudioDevicePropertyModelUID),
    PropertyEntry::read_only(kAudioDevicePropertyTransportType),
    PropertyEntry::read_only(kAudioDevicePropertyRelatedDevices),
    PropertyEntry::read_only(kAudioDevicePropertyClockDomain),
    PropertyEntry::read_only(kAudioDevicePropertyDeviceIsAlive),
    PropertyEntry::read_only(kAudioDevicePropertyDeviceIsRunning),
    PropertyEntry::read_only(kAudioDevicePropertyDeviceCanBeDefaultDevice),
    PropertyEntry::read_only(kAudioDevicePropertyDeviceCanBeDefaultSystemDevice),
    PropertyEntry::read_only(kAudioDevicePropertyIsHidden),
    PropertyEntry::read_only(kAudioDevicePropertyLatency),
    PropertyEntry::read_only(kAudioDevicePropertySafetyOffset),
    PropertyEntry::read_only(kAudioDevicePropertyStreams),
    PropertyEntry::settable(kAudioDevicePropertyNominalSampleRate, ValueKind::F64),
    PropertyEntry::read_only(kAudioDevicePropertyAvailableNominalSampleRates),
    PropertyEntry::read_only(kAudioDevicePropertyZeroTimeStampPeriod),
    PropertyEntry::read_only(kAudioDevicePropertyPreferredChannelsForStereo),
];

const STREAMS: [AudioObject; 2] = [
    AudioObject::Stream(Direction::Input),
    AudioObject::Stream(Direction::Output),
];

const CONTROLS: [AudioObject; 4] = [
    AudioObject::Volume(Direction::Input),
    AudioObject::Volume(Direction::Output),
    AudioObject::Mute(Direction::Input),
    AudioObject::Mute(Direction::Output),
];

pub(super) fn get(
    driver: &Driver,
    address: &AudioObjectPropertyAddress,
) -> HalResult<PropertyValue> {
    if let Some(value) = class_value(address.mSelector, kAudioObjectClassID, kAudioDeviceClassID) {
        return Ok(value);
    }
    let config = driver.config();
    let value = match address.mSelector {
        kAudioObjectPropertyOwner => PropertyValue::U32(kAudioObjectPlugInObject),
        kAudioObjectPropertyName => PropertyValue::Str(config.device_name),
        kAudioObjectPropertyManufacturer => PropertyValue::Str(config.manufacturer),
        kAudioObjectPropertyOwnedObjects => PropertyValue::Objects(filter_by_scope(
            STREAMS.iter().chain(&CONTROLS),
            address.mScope,
        )),
        kAudioObjectPropertyControlList => {
            PropertyValue::Objects(filter_by_scope(&CONTROLS, address.mScope))
        }
        kAudioDevicePropertyDeviceUID => PropertyValue::Str(config.device_uid),
        kAudioDevicePropertyModelUID => PropertyValue::Str(config.model_uid),
        kAudioDevicePropertyTransportType => PropertyValue::U32(kAudioDeviceTransportTypeVirtual),
        kAudioDevicePropertyRelatedDevices => PropertyValue::Objects(ObjectList::one(DEVICE_ID)),
        kAudioDevicePropertyClockDomain | kAudioDevicePropertyIsHidden => PropertyValue::U32(0),
        kAudioDevicePropertyDeviceIsAlive
        | kAudioDevicePropertyDeviceCanBeDefaultDevice
        | kAudioDevicePropertyDeviceCanBeDefaultSystemDevice => PropertyValue::U32(1),
        kAudioDevicePropertyDeviceIsRunning => {
            PropertyValue::U32(u32::from(driver.engine().is_running()))
        }
        kAudioDevicePropertyLatency => PropertyValue::U32(config.latency_frames),
        kAudioDevicePropertySafetyOffset => PropertyValue::U32(config.safety_offset_frames),
        kAudioDevicePropertyStreams => {
            PropertyValue::Objects(filter_by_scope(&STREAMS, address.mScope))
        }
        kAudioDevicePropertyNominalSampleRate => PropertyValue::F64(driver.state().sample_rate()),
        kAudioDevicePropertyAvailableNominalSampleRates => {
            PropertyValue::Ranges(available_sample_rates())
        }
        kAudioDevicePropertyZeroTimeStampPeriod => {
            PropertyValue::U32(driver.engine().period_frames())
        }
        kAudioDevicePropertyPreferredChannelsForStereo => PropertyValue::Channels([1, 2]),
        selector => return Err(HalError::unknown_property(DEVICE_ID, selector)),
    };
    Ok(value)
}

pub(super) fn set(
    driver: &Driver,
    address: &AudioObjectPropertyAddress,
    value: SetValue,
) -> HalResult<()> {
    match address.mSelector {
        kAudioDevicePropertyNominalSampleRate => {
            let rate = validate_sample_rate(value.as_f64()?)?;
            driver.apply_sample_rate(rate);
            Ok(())
        }
        selector => Err(HalError::unknown_property(DEVICE_ID, selector)),
    }
}
