//! Volume and mute control properties.

use super::{class_value, PropertyEntry, PropertyValue, Qualifier, SetValue, ValueKind};
use crate::abi::{
    kAudioBooleanControlClassID, kAudioBooleanControlPropertyValue, kAudioControlPropertyElement,
    kAudioControlPropertyScope, kAudioLevelControlClassID,
    kAudioLevelControlPropertyConvertDecibelsToScalar,
    kAudioLevelControlPropertyConvertScalarToDecibels, kAudioLevelControlPropertyDecibelRange,
    kAudioLevelControlPropertyDecibelValue, kAudioLevelControlPropertyScalarValue,
    kAudioMuteControlClassID, kAudioObjectPropertyBaseClass, kAudioObjectPropertyClass,
    kAudioObjectPropertyElementMain, kAudioObjectPropertyOwnedObjects, kAudioObjectPropertyOwner,
    kAudioVolumeControlClassID, AudioObjectPropertyAddress, AudioObjectPropertySelector,
};
use crate::config::{MAX_DECIBELS, MIN_DECIBELS};
use crate::driver::Driver;
use crate::error::{HalError, HalResult};
use crate::format::{clamp_scalar, db_to_scalar, scalar_to_db, ValueRange};
use crate::object::{AudioObject, Direction, ObjectList, DEVICE_ID};

pub(super) const VOLUME_PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry::read_only(kAudioObjectPropertyBaseClass),
    PropertyEntry::read_only(kAudioObjectPropertyClass),
    PropertyEntry::read_only(kAudioObjectPropertyOwner),
    PropertyEntry::read_only(kAudioObjectPropertyOwnedObjects),
    PropertyEntry::read_only(kAudioControlPropertyScope),
    PropertyEntry::read_only(kAudioControlPropertyElement),
    PropertyEntry::settable(kAudioLevelControlPropertyScalarValue, ValueKind::F32),
    PropertyEntry::settable(kAudioLevelControlPropertyDecibelValue, ValueKind::F32),
    PropertyEntry::read_only(kAudioLevelControlPropertyDecibelRange),
    PropertyEntry::read_only(kAudioLevelControlPropertyConvertScalarToDecibels),
    PropertyEntry::read_only(kAudioLevelControlPropertyConvertDecibelsToScalar),
];

pub(super) const MUTE_PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry::read_only(kAudioObjectPropertyBaseClass),
    PropertyEntry::read_only(kAudioObjectPropertyClass),
    PropertyEntry::read_only(kAudioObjectPropertyOwner),
    PropertyEntry::read_only(kAudioObjectPropertyOwnedObjects),
    PropertyEntry::read_only(kAudioControlPropertyScope),
    PropertyEntry::read_only(kAudioControlPropertyElement),
    PropertyEntry::settable(kAudioBooleanControlPropertyValue, ValueKind::U32),
];

/// Properties every control answers the same way.
fn common(direction: Direction, selector: AudioObjectPropertySelector) -> Option<PropertyValue> {
    match selector {
        kAudioObjectPropertyOwner => Some(PropertyValue::U32(DEVICE_ID)),
        kAudioObjectPropertyOwnedObjects => Some(PropertyValue::Objects(ObjectList::new())),
        kAudioControlPropertyScope => Some(PropertyValue::U32(direction.scope())),
        kAudioControlPropertyElement => Some(PropertyValue::U32(kAudioObjectPropertyElementMain)),
        _ => None,
    }
}

pub(super) fn get_volume(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
    qualifier: &Qualifier,
) -> HalResult<PropertyValue> {
    let selector = address.mSelector;
    let class = class_value(selector, kAudioLevelControlClassID, kAudioVolumeControlClassID);
    if let Some(value) = class.or_else(|| common(direction, selector)) {
        return Ok(value);
    }
    let scalar = driver.state().volume(direction);
    let value = match selector {
        kAudioLevelControlPropertyScalarValue => PropertyValue::F32(scalar),
        kAudioLevelControlPropertyDecibelValue => PropertyValue::F32(scalar_to_db(scalar)),
        kAudioLevelControlPropertyDecibelRange => PropertyValue::Range(ValueRange {
            minimum: f64::from(MIN_DECIBELS),
            maximum: f64::from(MAX_DECIBELS),
        }),
        kAudioLevelControlPropertyConvertScalarToDecibels => {
            let input = match qualifier {
                Qualifier::Value(value) => *value,
                _ => scalar,
            };
            PropertyValue::F32(scalar_to_db(input))
        }
        kAudioLevelControlPropertyConvertDecibelsToScalar => {
            let input = match qualifier {
                Qualifier::Value(value) => *value,
                _ => scalar_to_db(scalar),
            };
            PropertyValue::F32(db_to_scalar(input))
        }
        selector => {
            return Err(HalError::unknown_property(
                AudioObject::Volume(direction).id(),
                selector,
            ))
        }
    };
    Ok(value)
}

pub(super) fn set_volume(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
    value: SetValue,
) -> HalResult<()> {
    let scalar = match address.mSelector {
        kAudioLevelControlPropertyScalarValue => clamp_scalar(value.as_f32()?),
        kAudioLevelControlPropertyDecibelValue => db_to_scalar(value.as_f32()?),
        selector => {
            return Err(HalError::unknown_property(
                AudioObject::Volume(direction).id(),
                selector,
            ))
        }
    };
    driver.state().set_volume(direction, scalar);
    Ok(())
}

pub(super) fn get_mute(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
) -> HalResult<PropertyValue> {
    let selector = address.mSelector;
    let class = class_value(selector, kAudioBooleanControlClassID, kAudioMuteControlClassID);
    if let Some(value) = class.or_else(|| common(direction, selector)) {
        return Ok(value);
    }
    match selector {
        kAudioBooleanControlPropertyValue => Ok(PropertyValue::U32(u32::from(
            driver.state().is_muted(direction),
        ))),
        selector => Err(HalError::unknown_property(
            AudioObject::Mute(direction).id(),
            selector,
        )),
    }
}

pub(super) fn set_mute(
    driver: &Driver,
    direction: Direction,
    address: &AudioObjectPropertyAddress,
    value: SetValue,
) -> HalResult<()> {
    match address.mSelector {
        kAudioBooleanControlPropertyValue => {
            let muted = value.as_u32()? != 0;
            driver.state().set_muted(direction, muted);
            Ok(())
        }
        selector => Err(HalError::unknown_property(
            AudioObject::Mute(direction).id(),
            selector,
        )),
    }
}
