use crate::{Definition, Engine, RuleError};
use serde_json::{json, Value};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmEngine {
    engine: Engine,
}

impl Default for WasmEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();

        WasmEngine {
            engine: Engine::new(),
        }
    }

    /// Apply rule text to a definition.
    ///
    /// An empty `definition_json` starts from the reserved variables. The
    /// form keeps its previous definition whenever `success` is false.
    #[wasm_bindgen(js_name = validate)]
    pub fn validate(&self, text: &str, definition_json: &str) -> String {
        let result = self.load(definition_json).and_then(|definition| {
            let updated = self.engine.apply_expression(&definition, text)?;
            let canonical = self.engine.serialize(&updated);
            Ok((updated, canonical))
        });

        match result {
            Ok((definition, canonical)) => json!({
                "success": true,
                "definition": definition,
                "canonical": canonical,
                "error": Value::Null,
            })
            .to_string(),
            Err(e) => error_envelope(&e),
        }
    }

    /// Canonical text of a stored definition
    #[wasm_bindgen(js_name = serialize)]
    pub fn serialize(&self, definition_json: &str) -> String {
        match self.load(definition_json) {
            Ok(definition) => json!({
                "success": true,
                "canonical": self.engine.serialize(&definition),
                "error": Value::Null,
            })
            .to_string(),
            Err(e) => error_envelope(&e),
        }
    }

    /// Evaluate a formula against `{"key": number}` values
    #[wasm_bindgen(js_name = evaluate)]
    pub fn evaluate(&self, expression: &str, variables_json: &str) -> String {
        let variables: HashMap<String, f64> = if variables_json.trim().is_empty() {
            HashMap::new()
        } else {
            match serde_json::from_str(variables_json) {
                Ok(v) => v,
                Err(e) => return error_envelope(&RuleError::from(e)),
            }
        };

        match self.engine.evaluate(expression, &variables) {
            Ok(value) => json!({
                "success": true,
                "value": value,
                "error": Value::Null,
            })
            .to_string(),
            Err(e) => error_envelope(&e),
        }
    }
}

impl WasmEngine {
    fn load(&self, definition_json: &str) -> Result<Definition, RuleError> {
        if definition_json.trim().is_empty() {
            return Ok(Definition::with_reserved());
        }
        self.engine.from_json(definition_json)
    }
}

fn error_envelope(error: &RuleError) -> String {
    json!({
        "success": false,
        "error": {
            "category": error.category().name(),
            "message": error.to_string(),
            "offendingText": error.offending_text(),
        },
    })
    .to_string()
}
