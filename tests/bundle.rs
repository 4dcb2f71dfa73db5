//! Checks that the bundle metadata registers the exported factory.

use surge_audio::config::{FACTORY_SYMBOL, FACTORY_UUID};

const INFO_PLIST: &str = include_str!("../bundle/Info.plist");

/// Text between `<key>{key}</key>` and the closing tag of its value.
fn value_after_key<'a>(plist: &'a str, key: &str) -> &'a str {
    let marker = format!("<key>{key}</key>");
    let start = plist
        .find(&marker)
        .unwrap_or_else(|| panic!("missing key {key}"))
        + marker.len();
    let rest = &plist[start..];
    let end = rest.find("</dict>").unwrap_or(rest.len());
    &rest[..end]
}

#[test]
fn test_factory_is_registered() {
    let factories = value_after_key(INFO_PLIST, "CFPlugInFactories");
    assert!(factories.contains(&format!("<key>{FACTORY_UUID}</key>")));
    assert!(factories.contains(&format!("<string>{FACTORY_SYMBOL}</string>")));
}

#[test]
fn test_plugin_type_maps_to_factory() {
    let types = value_after_key(INFO_PLIST, "CFPlugInTypes");
    assert!(types.contains("<key>443ABAB8-E7B3-491A-B985-BEB9187030DB</key>"));
    assert!(types.contains(&format!("<string>{FACTORY_UUID}</string>")));
}

#[test]
fn test_symbol_matches_export() {
    // The exported function must carry the name the plist points at.
    let exported: unsafe extern "C" fn(
        *const std::ffi::c_void,
        *const std::ffi::c_void,
    ) -> *mut std::ffi::c_void = surge_audio::plugin::SurgeAudioDriverPlugInFactory;
    assert!(!(exported as *const ()).is_null());
    assert_eq!(FACTORY_SYMBOL, "SurgeAudioDriverPlugInFactory");
}
