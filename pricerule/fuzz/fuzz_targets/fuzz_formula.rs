#![no_main]

use libfuzzer_sys::fuzz_target;
use pricerule::Engine;
use std::collections::HashMap;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();
        let values = HashMap::from([
            ("booking_hours".to_string(), 4.0),
            ("guest_count".to_string(), 12.0),
        ]);

        let _ = engine.evaluate(s, &values);
    }
});
