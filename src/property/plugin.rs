//! Plug-in object properties.

use super::{class_value, PropertyEntry, PropertyValue, Qualifier};
use crate::abi::{
    kAudioObjectClassID, kAudioObjectPlugInObject, kAudioObjectPropertyBaseClass,
    kAudioObjectPropertyClass, kAudioObjectPropertyManufacturer, kAudioObjectPropertyOwnedObjects,
    kAudioObjectPropertyOwner, kAudioObjectUnknown, kAudioPlugInClassID,
    kAudioPlugInPropertyDeviceList, kAudioPlugInPropertyResourceBundle,
    kAudioPlugInPropertyTranslateUIDToDevice, AudioObjectPropertyAddress,
};
use crate::driver::Driver;
use crate::error::{HalError, HalResult};
use crate::object::{ObjectList, DEVICE_ID};

pub(super) const PROPERTIES: &[PropertyEntry] = &[
    PropertyEntry::read_only(kAudioObjectPropertyBaseClass),
    PropertyEntry::read_only(kAudioObjectPropertyClass),
    PropertyEntry::read_only(kAudioObjectPropertyOwner),
    PropertyEntry::read_only(kAudioObjectPropertyManufacturer),
    PropertyEntry::read_only(kAudioObjectPropertyOwnedObjects),
    PropertyEntry::read_only(kAudioPlugInPropertyDeviceList),
    PropertyEntry::read_only(kAudioPlugInPropertyTranslateUIDToDevice),
    PropertyEntry::read_only(kAudioPlugInPropertyResourceBundle),
];

pub(super) fn get(
    driver: &Driver,
    address: &AudioObjectPropertyAddress,
    qualifier: &Qualifier,
) -> HalResult<PropertyValue> {
    if let Some(value) = class_value(address.mSelector, kAudioObjectClassID, kAudioPlugInClassID) {
        return Ok(value);
    }
    let published = driver.state().is_published();
    let value = match address.mSelector {
        kAudioObjectPropertyOwner => PropertyValue::U32(kAudioObjectUnknown),
        kAudioObjectPropertyManufacturer => PropertyValue::Str(driver.config().manufacturer),
        kAudioObjectPropertyOwnedObjects | kAudioPlugInPropertyDeviceList => {
            PropertyValue::Objects(if published {
                ObjectList::one(DEVICE_ID)
            } else {
                ObjectList::new()
            })
        }
        kAudioPlugInPropertyTranslateUIDToDevice => {
            let matches = matches!(
                qualifier,
                Qualifier::Uid(uid) if uid.as_str() == driver.config().device_uid
            );
            PropertyValue::U32(if matches && published {
                DEVICE_ID
            } else {
                kAudioObjectUnknown
            })
        }
        kAudioPlugInPropertyResourceBundle => PropertyValue::Str(""),
        selector => return Err(HalError::unknown_property(kAudioObjectPlugInObject, selector)),
    };
    Ok(value)
}
