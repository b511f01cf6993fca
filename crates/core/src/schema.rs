//! Output schema generation.
//!
//! Output types derive `JsonSchema`; the generated document is reduced to the
//! OpenAPI subset accepted by structured-output endpoints (no `$ref`, no
//! `title`, no `additionalProperties`).

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};

/// Keywords kept in every schema object.
const ALLOWED_KEYWORDS: &[&str] = &[
    "type",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
];

/// Build the response schema for `T`.
pub fn output_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let value = serde_json::to_value(root).unwrap_or(Value::Null);
    sanitize(value)
}

/// Strip keywords outside the supported subset, recursively.
pub fn sanitize(schema: Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if !ALLOWED_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let value = match key.as_str() {
                    "properties" => sanitize_properties(value),
                    "items" => sanitize(value),
                    _ => value,
                };
                out.insert(key, value);
            }
            Value::Object(out)
        }
        other => other,
    }
}

fn sanitize_properties(properties: Value) -> Value {
    match properties {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, schema)| (name, sanitize(schema)))
                .collect(),
        ),
        other => other,
    }
}

/// Unwrap a payload the model wrapped in a Markdown code fence.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim().contains(['{', '[']) => inner.trim(),
        _ => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinancialAdviceOutput, OrchestrateOutput};
    use serde_json::json;

    #[test]
    fn test_orchestrate_schema_lists_labels() {
        let schema = output_schema::<OrchestrateOutput>();
        let agent = &schema["properties"]["agent"];
        assert_eq!(agent["type"], "string");
        let labels = agent["enum"].as_array().unwrap();
        assert_eq!(labels.len(), 9);
        assert!(labels.contains(&json!("Farmer's Training")));
        assert!(labels.contains(&json!("Unknown")));

        assert_eq!(schema["required"], json!(["agent"]));
        assert_eq!(schema["properties"]["clarifyingQuestion"]["nullable"], true);
    }

    /// Keywords found on schema objects, skipping property names.
    fn keywords(schema: &Value, found: &mut Vec<String>) {
        let Value::Object(map) = schema else {
            return;
        };
        for (key, value) in map {
            found.push(key.clone());
            match key.as_str() {
                "properties" => {
                    if let Value::Object(props) = value {
                        props.values().for_each(|p| keywords(p, found));
                    }
                }
                _ => keywords(value, found),
            }
        }
    }

    #[test]
    fn test_schema_has_no_unsupported_keywords() {
        let schema = output_schema::<FinancialAdviceOutput>();
        let mut found = Vec::new();
        keywords(&schema, &mut found);

        for keyword in ["$ref", "$schema", "title", "additionalProperties", "definitions"] {
            assert!(!found.iter().any(|k| k == keyword), "unexpected {}", keyword);
        }
        assert!(found.iter().all(|k| ALLOWED_KEYWORDS.contains(&k.as_str())));

        let item = &schema["properties"]["opportunities"]["items"];
        assert_eq!(item["type"], "object");
        assert!(item["properties"]["title"].is_object());
    }

    #[test]
    fn test_sanitize_keeps_property_named_like_keyword() {
        let raw = json!({
            "type": "object",
            "title": "X",
            "properties": {"title": {"type": "string", "format": "x"}}
        });
        let clean = sanitize(raw);
        assert_eq!(clean, json!({"type": "object", "properties": {"title": {"type": "string"}}}));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }
}
