use jsonschema::JSONSchema;
use std::collections::HashMap;
use std::sync::Mutex;

/// Sentinel every closed controlled-vocabulary field normalizes to when the
/// model's output doesn't match any recognized value.
const INVALID: &str = "INVALID";

/// Outcome of validating one piece of raw model output against a schema.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// The extracted JSON parsed and validated; enum fields are already
    /// normalized to upper case (or `INVALID`).
    Valid(serde_json::Value),
    /// No `{...}` or `[...]` substring could be found in the raw text.
    BadContent,
    /// A JSON substring was found but did not parse.
    ParseError(String),
    /// The parsed value does not conform to the schema.
    SchemaInvalid(Vec<String>),
}

/// Finds the first balanced `{...}` or `[...]` substring in `text`,
/// preferring whichever opens first. Handles string literals (including
/// escapes) so braces inside string values don't unbalance the scan.
/// Markdown code fences are stripped first if present.
pub fn extract_json_substring(text: &str) -> Option<&str> {
    let unfenced = strip_markdown_fence(text);
    let bytes = unfenced.as_bytes();

    let open_positions: Vec<(usize, u8, u8)> = [(b'{', b'}'), (b'[', b']')]
        .iter()
        .filter_map(|&(open, close)| unfenced.find(open as char).map(|pos| (pos, open, close)))
        .collect();

    let &(start, open, close) = open_positions.iter().min_by_key(|&&(pos, _, _)| pos)?;

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&unfenced[start..=i]);
            }
        }
        i += 1;
    }
    None
}

/// Returns a copy of `schema` with `INVALID` added to every `enum` array,
/// so a schema written against the recognized vocabulary still accepts the
/// sentinel `normalize_enums` may have substituted. Used only for the
/// compiled validation step; `normalize_enums` itself never needs to know
/// about this copy since it always maps unrecognized values to `INVALID`
/// regardless of what the schema declares.
fn with_invalid_sentinel(schema: &serde_json::Value) -> serde_json::Value {
    let mut schema = schema.clone();
    add_invalid_sentinel(&mut schema);
    schema
}

fn add_invalid_sentinel(schema: &mut serde_json::Value) {
    if let Some(enum_values) = schema.get_mut("enum").and_then(|e| e.as_array_mut()) {
        let has_invalid = enum_values.iter().any(|v| v.as_str() == Some(INVALID));
        if !has_invalid {
            enum_values.push(serde_json::Value::String(INVALID.to_string()));
        }
        return;
    }

    if let Some(serde_json::Value::Object(props)) = schema.get_mut("properties") {
        for child in props.values_mut() {
            add_invalid_sentinel(child);
        }
    }
    if let Some(items) = schema.get_mut("items") {
        add_invalid_sentinel(items);
    }
}

fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let after_lang = rest.find('\n').map(|i| &rest[i + 1..]).unwrap_or(rest);
        after_lang.trim_end().strip_suffix("```").unwrap_or(after_lang).trim()
    } else {
        trimmed
    }
}

/// Recursively normalizes enum-typed string fields to upper case, mapping
/// any value absent from the schema's declared `enum` set to `INVALID`.
/// Arrays of enums are normalized element-wise. Walks `schema` and `value`
/// in tandem so only fields the schema actually declares as closed
/// vocabularies are touched.
fn normalize_enums(value: &mut serde_json::Value, schema: &serde_json::Value) {
    if let Some(enum_values) = schema.get("enum").and_then(|e| e.as_array()) {
        let vocabulary: Vec<String> = enum_values
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_uppercase()))
            .collect();
        if let Some(s) = value.as_str() {
            let upper = s.to_uppercase();
            *value = serde_json::Value::String(if vocabulary.contains(&upper) {
                upper
            } else {
                INVALID.to_string()
            });
        }
        return;
    }

    match (schema.get("type").and_then(|t| t.as_str()), value) {
        (Some("object"), serde_json::Value::Object(map)) => {
            if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
                for (key, child_schema) in props {
                    if let Some(child_value) = map.get_mut(key) {
                        normalize_enums(child_value, child_schema);
                    }
                }
            }
        }
        (Some("array"), serde_json::Value::Array(items)) => {
            if let Some(item_schema) = schema.get("items") {
                for item in items {
                    normalize_enums(item, item_schema);
                }
            }
        }
        _ => {}
    }
}

/// Compiles and caches a `JSONSchema` per template id, then extracts,
/// parses, normalizes, and validates one piece of raw model output.
pub struct ResponseValidator {
    schema_cache: Mutex<HashMap<String, std::sync::Arc<JSONSchema>>>,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self { schema_cache: Mutex::new(HashMap::new()) }
    }

    fn compiled_schema(
        &self,
        template_id: &str,
        schema: &serde_json::Value,
    ) -> Result<std::sync::Arc<JSONSchema>, String> {
        let mut cache = self.schema_cache.lock().expect("schema cache mutex poisoned");
        if let Some(compiled) = cache.get(template_id) {
            return Ok(compiled.clone());
        }
        let augmented = with_invalid_sentinel(schema);
        let compiled = JSONSchema::compile(&augmented).map_err(|e| e.to_string())?;
        let compiled = std::sync::Arc::new(compiled);
        cache.insert(template_id.to_string(), compiled.clone());
        Ok(compiled)
    }

    pub fn validate(
        &self,
        template_id: &str,
        raw_text: &str,
        schema: &serde_json::Value,
    ) -> ValidationOutcome {
        let Some(json_substring) = extract_json_substring(raw_text) else {
            return ValidationOutcome::BadContent;
        };

        let mut parsed: serde_json::Value = match serde_json::from_str(json_substring) {
            Ok(v) => v,
            Err(e) => return ValidationOutcome::ParseError(e.to_string()),
        };

        normalize_enums(&mut parsed, schema);

        let compiled = match self.compiled_schema(template_id, schema) {
            Ok(c) => c,
            Err(reason) => return ValidationOutcome::SchemaInvalid(vec![reason]),
        };

        let result = compiled.validate(&parsed);
        match result {
            Ok(()) => ValidationOutcome::Valid(parsed),
            Err(errors) => {
                let messages: Vec<String> = errors
                    .map(|e| format!("{} at {}", e, e.instance_path))
                    .collect();
                ValidationOutcome::SchemaInvalid(messages)
            }
        }
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience entry point for one-off validation without a cache (used by
/// tests and by call sites that don't expect repeated validation against
/// the same template).
pub fn validate_response(raw_text: &str, schema: &serde_json::Value) -> ValidationOutcome {
    ResponseValidator::new().validate("ad-hoc", raw_text, schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_raw_object() {
        let text = r#"here is the result: {"a": 1} thanks"#;
        assert_eq!(extract_json_substring(text), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn extracts_from_markdown_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_substring(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn handles_braces_inside_string_values() {
        let text = r#"{"note": "use {curly} braces", "a": 1}"#;
        let extracted = extract_json_substring(text).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn no_json_returns_bad_content() {
        let schema = serde_json::json!({"type": "object"});
        match validate_response("no json here", &schema) {
            ValidationOutcome::BadContent => {}
            other => panic!("expected BadContent, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_enum_value_normalizes_to_invalid() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "complexity": {"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]}
            }
        });
        match validate_response(r#"{"complexity": "medium-ish"}"#, &schema) {
            ValidationOutcome::Valid(v) => assert_eq!(v["complexity"], "INVALID"),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn recognized_enum_value_normalizes_case() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "complexity": {"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]}
            }
        });
        match validate_response(r#"{"complexity": "low"}"#, &schema) {
            ValidationOutcome::Valid(v) => assert_eq!(v["complexity"], "LOW"),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn normalized_sentinel_does_not_trip_the_enum_constraint_it_was_checked_against() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "complexity": {"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]}
            }
        });
        let validator = ResponseValidator::new();
        match validator.validate("t", r#"{"complexity": "extreme"}"#, &schema) {
            ValidationOutcome::Valid(v) => assert_eq!(v["complexity"], "INVALID"),
            other => panic!("expected Valid with the INVALID sentinel, got {other:?}"),
        }
    }

    #[test]
    fn array_of_enums_normalizes_elementwise() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "smells": {
                    "type": "array",
                    "items": {"type": "string", "enum": ["LONG_METHOD", "GOD_CLASS"]}
                }
            }
        });
        match validate_response(r#"{"smells": ["long_method", "nonsense"]}"#, &schema) {
            ValidationOutcome::Valid(v) => {
                assert_eq!(v["smells"][0], "LONG_METHOD");
                assert_eq!(v["smells"][1], "INVALID");
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn schema_violation_reported_as_invalid() {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["purpose"],
            "properties": {"purpose": {"type": "string"}}
        });
        match validate_response(r#"{"notPurpose": "x"}"#, &schema) {
            ValidationOutcome::SchemaInvalid(errors) => assert!(!errors.is_empty()),
            other => panic!("expected SchemaInvalid, got {other:?}"),
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalized_enum_is_always_in_vocabulary_or_invalid(raw in "[a-zA-Z_ -]{0,16}") {
                let schema = serde_json::json!({"type": "string", "enum": ["LOW", "MEDIUM", "HIGH"]});
                let mut value = serde_json::Value::String(raw);
                normalize_enums(&mut value, &schema);

                let normalized = value.as_str().unwrap().to_string();
                prop_assert!(["LOW", "MEDIUM", "HIGH", INVALID].contains(&normalized.as_str()));
            }
        }
    }
}
