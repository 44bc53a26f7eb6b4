#![no_main]

use libfuzzer_sys::fuzz_target;
use pricerule::{Definition, Engine};

fuzz_target!(|depth: u8| {
    let engine = Engine::new();

    let depth = depth as usize + 1;

    let mut expr = String::from("booking_hours");
    for _ in 0..depth {
        expr = format!("({} + 1)", expr);
    }

    let text = format!("IF guest_count > 2 THEN {}", expr);
    let _ = engine.apply_expression(&Definition::with_reserved(), &text);
});
