//! Fuzz target for lenient preference parsing.
//!
//! # Safety Properties Tested
//! - No panics on arbitrary text
//! - Whatever parses resolves to a mode whose range contains its start value

#![no_main]

use jugger_stones::{ModePreferences, Preferences};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(preferences) = Preferences::from_json(text) else {
        return;
    };

    let mode_preferences = ModePreferences::new(preferences, None);
    let mode = mode_preferences.current_mode();
    let range = mode.range();
    assert!(range.contains(range.start()), "{mode:?}");
    assert!(!mode_preferences.interval().is_zero());
});
