#![no_main]

use libfuzzer_sys::fuzz_target;
use scrollcheck::config::Config;

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = serde_json::from_slice::<serde_json::Value>(data)
        && let Ok(config) = serde_json::from_value::<Config>(v)
    {
        // Bad input must come back as an error, never a panic
        let _ = config.validate();
        let _ = config.filters.resolve(None);
    }
});
