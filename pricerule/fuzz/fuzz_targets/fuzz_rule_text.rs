#![no_main]

use libfuzzer_sys::fuzz_target;
use pricerule::{Definition, Engine};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();
        let base = Definition::with_reserved();

        // Accepted text must survive a trip through its canonical form
        if let Ok(definition) = engine.apply_expression(&base, s) {
            let canonical = engine.serialize(&definition);
            assert!(engine.apply_expression(&base, &canonical).is_ok());
        }
    }
});
