#![no_main]

use libfuzzer_sys::fuzz_target;
use pricerule::Engine;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();

        if let Ok(definition) = engine.from_json(s) {
            let _ = engine.serialize(&definition);
        }
    }
});
