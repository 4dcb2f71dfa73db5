//! Raw pointer marshalling for the property calls.

// FFI requires unsafe
#![allow(unsafe_code)]

use std::ffi::c_void;
use std::mem::size_of;

use crate::abi::{
    kAudioLevelControlPropertyConvertDecibelsToScalar,
    kAudioLevelControlPropertyConvertScalarToDecibels, kAudioPlugInPropertyTranslateUIDToDevice,
    AudioObjectPropertyAddress, AudioStreamBasicDescription, AudioStreamRangedDescription,
    AudioValueRange,
};
use crate::error::{HalError, HalResult};
use crate::format::StreamFormat;
use crate::platform::{string_from_host, string_to_host};
use crate::property::{PropertyValue, Qualifier, SetValue, ValueKind};

/// Copies the property address, refusing null.
///
/// # Safety
///
/// `address` must be null or point to a readable `AudioObjectPropertyAddress`.
pub(super) unsafe fn read_address(
    address: *const AudioObjectPropertyAddress,
) -> HalResult<AudioObjectPropertyAddress> {
    if address.is_null() {
        return Err(HalError::illegal("null property address"));
    }
    Ok(address.read_unaligned())
}

/// Decodes the extra input a read needs.
///
/// The UID translation takes a host string reference as its qualifier. The
/// level conversions take their input value from the data buffer, which is
/// then overwritten with the result.
///
/// # Safety
///
/// `qualifier` must be null or point to `qualifier_size` readable bytes, and
/// `data` must be null or point to `data_size` readable bytes.
pub(super) unsafe fn read_qualifier(
    address: &AudioObjectPropertyAddress,
    qualifier_size: u32,
    qualifier: *const c_void,
    data_size: u32,
    data: *const c_void,
) -> Qualifier {
    match address.mSelector {
        kAudioPlugInPropertyTranslateUIDToDevice => {
            if qualifier.is_null() || (qualifier_size as usize) < size_of::<*const c_void>() {
                return Qualifier::None;
            }
            let uid = qualifier.cast::<*const c_void>().read_unaligned();
            string_from_host(uid).map_or(Qualifier::None, Qualifier::Uid)
        }
        kAudioLevelControlPropertyConvertScalarToDecibels
        | kAudioLevelControlPropertyConvertDecibelsToScalar => {
            if data.is_null() || (data_size as usize) < size_of::<f32>() {
                return Qualifier::None;
            }
            Qualifier::Value(data.cast::<f32>().read_unaligned())
        }
        _ => Qualifier::None,
    }
}

/// Writes `value` into the host's buffer, in the host's layouts.
///
/// With a null `out_data` only the required size is reported. A buffer
/// smaller than the value fails before anything is written. Lists are written
/// element by element; nothing is collected on the way.
///
/// # Safety
///
/// `out_size` must be null or writable; `out_data` must be null or point to
/// `in_size` writable bytes.
pub(super) unsafe fn write_value(
    value: &PropertyValue,
    in_size: u32,
    out_size: *mut u32,
    out_data: *mut c_void,
) -> HalResult<()> {
    if out_size.is_null() {
        return Err(HalError::illegal("null size pointer"));
    }
    let required = value.size();
    if out_data.is_null() {
        out_size.write_unaligned(required);
        return Ok(());
    }
    if in_size < required {
        return Err(HalError::BadPropertySize {
            expected: required,
            actual: in_size,
        });
    }
    match value {
        PropertyValue::U32(v) => write(out_data, *v),
        PropertyValue::F32(v) => write(out_data, *v),
        PropertyValue::F64(v) => write(out_data, *v),
        PropertyValue::Str(s) => write(out_data, string_to_host(s)),
        PropertyValue::Objects(ids) => write_each(out_data, ids.as_slice().iter().copied()),
        PropertyValue::Channels(channels) => write_each(out_data, channels.iter().copied()),
        PropertyValue::Range(range) => write(out_data, AudioValueRange::from(*range)),
        PropertyValue::Ranges(ranges) => write_each(
            out_data,
            ranges.iter().map(|&range| AudioValueRange::from(range)),
        ),
        PropertyValue::Format(format) => {
            write(out_data, AudioStreamBasicDescription::from(*format));
        }
        PropertyValue::Formats(formats) => write_each(
            out_data,
            formats
                .iter()
                .map(|&ranged| AudioStreamRangedDescription::from(ranged)),
        ),
    }
    out_size.write_unaligned(required);
    Ok(())
}

/// Reads the data of a set as `kind`.
///
/// # Safety
///
/// `data` must be null or point to `size` readable bytes.
pub(super) unsafe fn read_set_value(
    kind: ValueKind,
    size: u32,
    data: *const c_void,
) -> HalResult<SetValue> {
    if data.is_null() {
        return Err(HalError::illegal("null property data"));
    }
    if size < kind.size() {
        return Err(HalError::BadPropertySize {
            expected: kind.size(),
            actual: size,
        });
    }
    Ok(match kind {
        ValueKind::U32 => SetValue::U32(read(data)),
        ValueKind::F32 => SetValue::F32(read(data)),
        ValueKind::F64 => SetValue::F64(read(data)),
        ValueKind::Format => {
            SetValue::Format(StreamFormat::from(read::<AudioStreamBasicDescription>(data)))
        }
    })
}

unsafe fn write<T>(dst: *mut c_void, value: T) {
    dst.cast::<T>().write_unaligned(value);
}

unsafe fn write_each<T>(dst: *mut c_void, values: impl Iterator<Item = T>) {
    let dst = dst.cast::<T>();
    for (i, value) in values.enumerate() {
        dst.add(i).write_unaligned(value);
    }
}

unsafe fn read<T: Copy>(src: *const c_void) -> T {
    src.cast::<T>().read_unaligned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{global_address, kAudioDevicePropertyStreams};
    use crate::format::{available_formats, canonical_format};
    use crate::object::ObjectList;

    #[test]
    fn test_null_address_is_illegal() {
        // SAFETY: null is an accepted input.
        let err = unsafe { read_address(std::ptr::null()) }.unwrap_err();
        assert!(matches!(err, HalError::IllegalOperation { .. }));
    }

    #[test]
    fn test_size_only_when_data_is_null() {
        let mut size = 0u32;
        let value = PropertyValue::Objects([3, 4].into_iter().collect::<ObjectList>());
        // SAFETY: size is a valid u32 and data is null.
        unsafe { write_value(&value, 0, &mut size, std::ptr::null_mut()) }.unwrap();
        assert_eq!(size, 8);
    }

    #[test]
    fn test_small_buffer_is_untouched() {
        let mut size = 0u32;
        let mut buffer = [0xAAu8; 4];
        let value = PropertyValue::Objects([3, 4].into_iter().collect::<ObjectList>());
        // SAFETY: buffer holds the 4 bytes declared.
        let err = unsafe {
            write_value(&value, 4, &mut size, buffer.as_mut_ptr().cast())
        }
        .unwrap_err();
        assert_eq!(
            err,
            HalError::BadPropertySize {
                expected: 8,
                actual: 4
            }
        );
        assert_eq!(buffer, [0xAA; 4]);
        assert_eq!(size, 0);
    }

    #[test]
    fn test_writes_object_list() {
        let mut size = 0u32;
        let mut ids = [0u32; 4];
        let value = PropertyValue::Objects([3, 4].into_iter().collect::<ObjectList>());
        // SAFETY: ids holds 16 writable bytes.
        unsafe { write_value(&value, 16, &mut size, ids.as_mut_ptr().cast()) }.unwrap();
        assert_eq!(size, 8);
        assert_eq!(ids, [3, 4, 0, 0]);
    }

    #[test]
    fn test_writes_format() {
        let mut size = 0u32;
        let mut format = AudioStreamBasicDescription::from(StreamFormat::default());
        let value = PropertyValue::Format(canonical_format(96_000.0));
        // SAFETY: format is a writable AudioStreamBasicDescription.
        unsafe {
            write_value(
                &value,
                size_of::<AudioStreamBasicDescription>() as u32,
                &mut size,
                std::ptr::addr_of_mut!(format).cast(),
            )
        }
        .unwrap();
        assert_eq!(size, 40);
        assert_eq!(format.mBytesPerPacket, 8);
        assert_eq!(StreamFormat::from(format), canonical_format(96_000.0));
    }

    #[test]
    fn test_writes_ranged_formats_in_host_layout() {
        let mut size = 0u32;
        let mut out = [0u8; 4 * 56];
        let value = PropertyValue::Formats(available_formats());
        // SAFETY: out holds four ranged descriptions.
        unsafe { write_value(&value, out.len() as u32, &mut size, out.as_mut_ptr().cast()) }
            .unwrap();
        assert_eq!(size, 224);
        // SAFETY: the last 56 bytes hold one AudioStreamRangedDescription.
        let last = unsafe {
            out[3 * 56..]
                .as_ptr()
                .cast::<AudioStreamRangedDescription>()
                .read_unaligned()
        };
        assert_eq!(last.mFormat.mSampleRate, 192_000.0);
        assert_eq!(last.mSampleRateRange.mMinimum, 192_000.0);
        assert_eq!(last.mSampleRateRange.mMaximum, 192_000.0);
    }

    #[test]
    fn test_reads_format_set() {
        let format = AudioStreamBasicDescription::from(canonical_format(44_100.0));
        // SAFETY: format is 40 readable bytes.
        let value = unsafe {
            read_set_value(
                ValueKind::Format,
                size_of::<AudioStreamBasicDescription>() as u32,
                std::ptr::addr_of!(format).cast(),
            )
        }
        .unwrap();
        assert_eq!(value, SetValue::Format(canonical_format(44_100.0)));
    }

    #[test]
    fn test_set_value_checks_size() {
        let rate = 44_100.0f64;
        // SAFETY: rate is 8 readable bytes; 4 are declared.
        let err = unsafe { read_set_value(ValueKind::F64, 4, std::ptr::addr_of!(rate).cast()) }
            .unwrap_err();
        assert!(matches!(err, HalError::BadPropertySize { expected: 8, .. }));
        // SAFETY: as above, with the full size.
        let value =
            unsafe { read_set_value(ValueKind::F64, 8, std::ptr::addr_of!(rate).cast()) }.unwrap();
        assert_eq!(value, SetValue::F64(44_100.0));
    }

    #[test]
    fn test_conversion_qualifier_comes_from_data() {
        let input = 0.5f32;
        let address = global_address(kAudioLevelControlPropertyConvertScalarToDecibels);
        // SAFETY: input is 4 readable bytes.
        let qualifier = unsafe {
            read_qualifier(&address, 0, std::ptr::null(), 4, std::ptr::addr_of!(input).cast())
        };
        assert_eq!(qualifier, Qualifier::Value(0.5));

        // SAFETY: null inputs are accepted.
        let none = unsafe {
            read_qualifier(
                &global_address(kAudioDevicePropertyStreams),
                0,
                std::ptr::null(),
                0,
                std::ptr::null(),
            )
        };
        assert_eq!(none, Qualifier::None);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_uid_qualifier_and_string_value() {
        use crate::platform::release_host_string;

        let uid = string_to_host("SurgeAudioDevice_UID");
        let address = global_address(kAudioPlugInPropertyTranslateUIDToDevice);
        // SAFETY: the qualifier is a pointer-sized string reference.
        let qualifier = unsafe {
            read_qualifier(
                &address,
                size_of::<*const c_void>() as u32,
                std::ptr::addr_of!(uid).cast(),
                0,
                std::ptr::null(),
            )
        };
        assert_eq!(qualifier, Qualifier::Uid("SurgeAudioDevice_UID".into()));

        let mut size = 0u32;
        let mut out: *const c_void = std::ptr::null();
        // SAFETY: out is a writable pointer slot; both strings are released once.
        unsafe {
            write_value(
                &PropertyValue::Str("Surge Audio"),
                size_of::<*const c_void>() as u32,
                &mut size,
                std::ptr::addr_of_mut!(out).cast(),
            )
            .unwrap();
            assert_eq!(string_from_host(out), Some("Surge Audio".into()));
            release_host_string(out);
            release_host_string(uid);
        }
        assert_eq!(size as usize, size_of::<*const c_void>());
    }
}
