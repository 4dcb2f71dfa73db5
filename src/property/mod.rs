//! Object model and property protocol.
//!
//! Every object kind has a static table listing the selectors it answers and,
//! for settable ones, the type of data a client must supply. Reads produce a
//! [`PropertyValue`]; the plug-in boundary turns it into bytes. Scope only
//! matters for list-valued properties (streams, controls, owned objects),
//! where the global scope selects every direction.

mod control;
mod device;
mod plugin;
mod stream;

use std::mem::size_of;

use crate::abi::{
    kAudioObjectPropertyBaseClass, kAudioObjectPropertyClass, AudioObjectID,
    AudioObjectPropertyAddress, AudioObjectPropertySelector, AudioStreamBasicDescription,
    AudioStreamRangedDescription, AudioValueRange,
};
use crate::driver::Driver;
use crate::error::{HalError, HalResult};
use crate::format::{RangedFormat, StreamFormat, ValueRange};
use crate::object::{AudioObject, ObjectList};
use crate::platform::HostString;

/// Data type a settable property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    U32,
    F32,
    F64,
    Format,
}

impl ValueKind {
    /// Bytes a client must pass to set a value of this kind.
    #[must_use]
    pub fn size(self) -> u32 {
        match self {
            Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
            Self::Format => size_of::<AudioStreamBasicDescription>() as u32,
        }
    }
}

/// One row of an object's property table.
#[derive(Debug, Clone, Copy)]
pub struct PropertyEntry {
    pub selector: AudioObjectPropertySelector,
    /// `Some` when clients may set the property.
    pub settable: Option<ValueKind>,
}

impl PropertyEntry {
    pub(crate) const fn read_only(selector: AudioObjectPropertySelector) -> Self {
        Self {
            selector,
            settable: None,
        }
    }

    pub(crate) const fn settable(selector: AudioObjectPropertySelector, kind: ValueKind) -> Self {
        Self {
            selector,
            settable: Some(kind),
        }
    }
}

/// Extra input some reads need.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Qualifier {
    #[default]
    None,
    /// UID to translate into a device id.
    Uid(HostString),
    /// Value to convert, for the scalar ↔ decibel conversion properties.
    Value(f32),
}

/// The value of a property read. Holds no heap data, so reads never allocate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    U32(u32),
    F32(f32),
    F64(f64),
    /// Handed to the host as a newly created string it takes ownership of.
    Str(&'static str),
    Objects(ObjectList),
    Channels([u32; 2]),
    Range(ValueRange),
    Ranges(&'static [ValueRange]),
    Format(StreamFormat),
    Formats(&'static [RangedFormat]),
}

impl PropertyValue {
    /// Encoded size in bytes. Strings are pointer-sized references.
    #[must_use]
    pub fn size(&self) -> u32 {
        let bytes = match self {
            Self::U32(_) | Self::F32(_) => 4,
            Self::F64(_) => 8,
            Self::Str(_) => size_of::<*const std::ffi::c_void>(),
            Self::Objects(ids) => ids.len() * size_of::<AudioObjectID>(),
            Self::Channels(_) => 8,
            Self::Range(_) => size_of::<AudioValueRange>(),
            Self::Ranges(ranges) => ranges.len() * size_of::<AudioValueRange>(),
            Self::Format(_) => size_of::<AudioStreamBasicDescription>(),
            Self::Formats(formats) => formats.len() * size_of::<AudioStreamRangedDescription>(),
        };
        bytes as u32
    }
}

/// Data a client supplies to a set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetValue {
    U32(u32),
    F32(f32),
    F64(f64),
    Format(StreamFormat),
}

impl SetValue {
    pub(crate) fn as_u32(self) -> HalResult<u32> {
        match self {
            Self::U32(value) => Ok(value),
            _ => Err(HalError::illegal("expected a UInt32")),
        }
    }

    pub(crate) fn as_f32(self) -> HalResult<f32> {
        match self {
            Self::F32(value) => Ok(value),
            _ => Err(HalError::illegal("expected a Float32")),
        }
    }

    pub(crate) fn as_f64(self) -> HalResult<f64> {
        match self {
            Self::F64(value) => Ok(value),
            _ => Err(HalError::illegal("expected a Float64")),
        }
    }

    pub(crate) fn as_format(self) -> HalResult<StreamFormat> {
        match self {
            Self::Format(value) => Ok(value),
            _ => Err(HalError::illegal("expected a stream format")),
        }
    }
}

/// Property table for `object`.
#[must_use]
pub fn properties(object: AudioObject) -> &'static [PropertyEntry] {
    match object {
        AudioObject::PlugIn => plugin::PROPERTIES,
        AudioObject::Device => device::PROPERTIES,
        AudioObject::Stream(_) => stream::PROPERTIES,
        AudioObject::Volume(_) => control::VOLUME_PROPERTIES,
        AudioObject::Mute(_) => control::MUTE_PROPERTIES,
    }
}

/// Finds the table entry for `address`.
pub fn find(
    object: AudioObject,
    address: &AudioObjectPropertyAddress,
) -> HalResult<&'static PropertyEntry> {
    properties(object)
        .iter()
        .find(|entry| entry.selector == address.mSelector)
        .ok_or_else(|| HalError::unknown_property(object.id(), address.mSelector))
}

/// Reads a property. The caller has already resolved `object`.
pub(crate) fn get(
    driver: &Driver,
    object: AudioObject,
    address: &AudioObjectPropertyAddress,
    qualifier: &Qualifier,
) -> HalResult<PropertyValue> {
    find(object, address)?;
    match object {
        AudioObject::PlugIn => plugin::get(driver, address, qualifier),
        AudioObject::Device => device::get(driver, address),
        AudioObject::Stream(direction) => stream::get(driver, direction, address),
        AudioObject::Volume(direction) => {
            control::get_volume(driver, direction, address, qualifier)
        }
        AudioObject::Mute(direction) => control::get_mute(driver, direction, address),
    }
}

/// Writes a property. The caller has already resolved `object`.
pub(crate) fn set(
    driver: &Driver,
    object: AudioObject,
    address: &AudioObjectPropertyAddress,
    value: SetValue,
) -> HalResult<()> {
    if find(object, address)?.settable.is_none() {
        return Err(HalError::illegal("property is read-only"));
    }
    match object {
        AudioObject::PlugIn => Err(HalError::illegal("plug-in has no settable properties")),
        AudioObject::Device => device::set(driver, address, value),
        AudioObject::Stream(direction) => stream::set(driver, direction, address, value),
        AudioObject::Volume(direction) => control::set_volume(driver, direction, address, value),
        AudioObject::Mute(direction) => control::set_mute(driver, direction, address, value),
    }
}

/// Selectors every object answers with a class id.
fn class_value(
    selector: AudioObjectPropertySelector,
    base_class: u32,
    class: u32,
) -> Option<PropertyValue> {
    match selector {
        kAudioObjectPropertyBaseClass => Some(PropertyValue::U32(base_class)),
        kAudioObjectPropertyClass => Some(PropertyValue::U32(class)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{
        global_address, kAudioDevicePropertyDeviceUID, kAudioObjectPropertyOwnedObjects,
        kAudioObjectPropertyOwner,
    };
    use crate::format::{available_formats, available_sample_rates};
    use crate::object::Direction;

    #[test]
    fn test_value_sizes() {
        assert_eq!(PropertyValue::U32(1).size(), 4);
        assert_eq!(PropertyValue::F64(1.0).size(), 8);
        assert_eq!(
            PropertyValue::Str("x").size() as usize,
            std::mem::size_of::<usize>()
        );
        assert_eq!(PropertyValue::Objects([3, 4].into_iter().collect()).size(), 8);
        assert_eq!(PropertyValue::Objects(ObjectList::new()).size(), 0);
        assert_eq!(PropertyValue::Ranges(available_sample_rates()).size(), 64);
        assert_eq!(PropertyValue::Formats(available_formats()).size(), 224);
        assert_eq!(ValueKind::Format.size(), 40);
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        for object in AudioObject::ALL {
            let table = properties(object);
            for (i, entry) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|e| e.selector != entry.selector),
                    "{object:?} lists a selector twice"
                );
            }
        }
    }

    #[test]
    fn test_every_object_has_class_and_owner() {
        for object in AudioObject::ALL {
            for selector in [
                kAudioObjectPropertyBaseClass,
                kAudioObjectPropertyClass,
                kAudioObjectPropertyOwner,
                kAudioObjectPropertyOwnedObjects,
            ] {
                assert!(
                    find(object, &global_address(selector)).is_ok(),
                    "{object:?} is missing a core selector"
                );
            }
        }
    }

    #[test]
    fn test_unknown_selector() {
        let err = find(
            AudioObject::Stream(Direction::Input),
            &global_address(kAudioDevicePropertyDeviceUID),
        )
        .unwrap_err();
        assert!(matches!(err, HalError::UnknownProperty { id: 3, .. }));
    }
}
