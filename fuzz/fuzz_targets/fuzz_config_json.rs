//! Fuzz target: `ComponentConfig::from_json`
//!
//! Feeds arbitrary bytes to the JSON configuration parser and verifies:
//! - No panics on malformed or hostile input
//! - Anything accepted also passes `validate()`
//! - Accepted configs survive a serialise/parse cycle unchanged
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use bme68x_bsec2::config::ComponentConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = ComponentConfig::from_json(text) else {
        return;
    };

    assert!(cfg.validate().is_ok(), "accepted config must validate");

    let json = serde_json::to_string(&cfg).expect("serialise accepted config");
    let again = ComponentConfig::from_json(&json).expect("re-parse serialised config");
    assert_eq!(cfg, again);
});
