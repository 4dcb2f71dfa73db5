//! Stream object properties.

use super::{class_value, PropertyEntry, PropertyValue, SetValue, ValueKind};
use crate::abi::{
    kAudioObjectClassID, kAudioObjectPropertyBaseClass, kAudioObjectPropertyClass,
    kAudioObjectPropertyOwnedObjects, kAudioObjectPropertyOwner, kAudioStreamClassID,
    kAudioStreamPropertyAvailablePhysicalFormats, kAudioStreamPropertyAvailableVirtualFormats,
    kAudioStreamPropertyDirection, kAudioStreamPropertyIsActive, kAudioStreamPropertyLatency,
    kAudioStreamPropertyPhysicalFormat, kAudioStreamPropertyStartingChannel,
    kAudioStreamPropertyTerminalType, kAudioStreamPropertyVirtualFormat,
    kAudioStreamTerminalTypeMicrophone, kAudioStreamTerminalTypeSpeaker,
    AudioObjectPropertyAddress,
};
use crate::driver::Driver;
use crate::error::{HalError, HalResult};
use crate::format::{available_formats, canonical_format, validate_format};
use crate::object::{AudioObject, Direction, ObjectList, DEVICE_ID};

pub(super) const PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry::read_only(kAudioObjectPropertyBaseClass),
    PropertyEntry::read_only(kAudioObjectPropertyClass),
    PropertyEntry::read_only(kAudioObjectPropertyOwner),
    PropertyEntry::read_only(kAudioObjectPropertyOwnedObjects),
    PropertyEntry::settable(kAudioStreamPropertyIsActive, ValueKind::U32),
    PropertyEntry::read_only(kAudioStreamPropertyDirection),
    PropertyEntry::read_only(kAudioStreamPropertyTerminalType),
    PropertyEntry::read_only(kAudioStreamPropertyStartingChannel),
    PropertyEntry::read_only(kAudioStreamPropertyLatency),
    PropertyEntry::settable(kAudioStreamPropertyVirtualFormat, ValueKind::Format),
    PropertyEntry::settable(kAudioStreamPropertyPhysicalFormat, ValueKind::Format),
    PropertyEntry::read_only(kAudioStreamPropertyAvailableVirtualFormats),
    PropertyEntry::read_only(kAudioStreamPropertyAvailablePhysicalFormats),
];

pub(super) fn get(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
) -> HalResult<PropertyValue> {
    if let Some(value) = class_value(address.mSelector, kAudioObjectClassID, kAudioStreamClassID) {
        return Ok(value);
    }
    let value = match address.mSelector {
        kAudioObjectPropertyOwner => PropertyValue::U32(DEVICE_ID),
        kAudioObjectPropertyOwnedObjects => PropertyValue::Objects(ObjectList::new()),
        kAudioStreamPropertyIsActive => {
            PropertyValue::U32(u32::from(driver.state().is_stream_active(direction)))
        }
        kAudioStreamPropertyDirection => PropertyValue::U32(direction.stream_direction()),
        kAudioStreamPropertyTerminalType => PropertyValue::U32(match direction {
            Direction::Input => kAudioStreamTerminalTypeMicrophone,
            Direction::Output => kAudioStreamTerminalTypeSpeaker,
        }),
        kAudioStreamPropertyStartingChannel => PropertyValue::U32(1),
        kAudioStreamPropertyLatency => PropertyValue::U32(driver.config().latency_frames),
        kAudioStreamPropertyVirtualFormat | kAudioStreamPropertyPhysicalFormat => {
            PropertyValue::Format(canonical_format(driver.state().sample_rate()))
        }
        kAudioStreamPropertyAvailableVirtualFormats
        | kAudioStreamPropertyAvailablePhysicalFormats => {
            PropertyValue::Formats(available_formats())
        }
        selector => {
            return Err(HalError::unknown_property(
                AudioObject::Stream(direction).id(),
                selector,
            ))
        }
    };
    Ok(value)
}

pub(super) fn set(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
    value: SetValue,
) -> HalResult<()> {
    match address.mSelector {
        kAudioStreamPropertyIsActive => {
            let active = value.as_u32()? != 0;
            driver.state().set_stream_active(direction, active);
            Ok(())
        }
        kAudioStreamPropertyVirtualFormat | kAudioStreamPropertyPhysicalFormat => {
            let rate = validate_format(&value.as_format()?)?;
            driver.apply_sample_rate(rate);
            Ok(())
        }
        selector => Err(HalError::unknown_property(
            AudioObject::Stream(direction).id(),
            selector,
        )),
    }
}
