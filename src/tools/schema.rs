//! Argument validation against the JSON schemas tools declare.
//!
//! Covers the subset tools actually use: object type, `required`,
//! per-property `type` (single or list), `enum`, numeric `minimum`/`maximum`
//! and `additionalProperties: false`.

use serde_json::Value;

/// Check `args` against `schema`, describing the first mismatch
pub fn validate_args(schema: &Value, args: &Value) -> Result<(), String> {
    if let Some(expected) = schema.get("type") {
        if !type_matches(expected, args) {
            return Err(format!(
                "expected {}, got {}",
                describe_type(expected),
                json_type(args)
            ));
        }
    }

    let Some(object) = args.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required.iter().filter_map(|f| f.as_str()) {
            match object.get(field) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required field '{}'", field));
                }
                Some(_) => {}
            }
        }
    }

    let properties = schema.get("properties").and_then(|p| p.as_object());

    for (key, value) in object {
        let Some(property) = properties.and_then(|p| p.get(key)) else {
            if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
                return Err(format!("unexpected field '{}'", key));
            }
            continue;
        };

        // Optional fields may be sent as explicit nulls
        if value.is_null() && !is_required(schema, key) {
            continue;
        }

        if let Some(expected) = property.get("type") {
            if !type_matches(expected, value) {
                return Err(format!(
                    "field '{}' must be {}, got {}",
                    key,
                    describe_type(expected),
                    json_type(value)
                ));
            }
        }

        if let Some(allowed) = property.get("enum").and_then(|e| e.as_array()) {
            if !allowed.contains(value) {
                return Err(format!(
                    "field '{}' must be one of {}",
                    key,
                    Value::Array(allowed.clone())
                ));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = property.get("minimum").and_then(|m| m.as_f64()) {
                if n < min {
                    return Err(format!("field '{}' must be >= {}", key, min));
                }
            }
            if let Some(max) = property.get("maximum").and_then(|m| m.as_f64()) {
                if n > max {
                    return Err(format!("field '{}' must be <= {}", key, max));
                }
            }
        }
    }

    Ok(())
}

fn is_required(schema: &Value, key: &str) -> bool {
    schema
        .get("required")
        .and_then(|r| r.as_array())
        .is_some_and(|r| r.iter().any(|f| f.as_str() == Some(key)))
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(t) => single_type_matches(t, value),
        Value::Array(types) => types
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| single_type_matches(t, value)),
        _ => true,
    }
}

fn single_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "max_results": { "type": "integer", "minimum": 1, "maximum": 20 },
                "region": { "type": "string", "enum": ["us-en", "uk-en"] }
            },
            "required": ["query"]
        })
    }

    #[test]
    fn test_valid_args() {
        let schema = search_schema();
        assert!(validate_args(&schema, &json!({"query": "rust"})).is_ok());
        assert!(validate_args(&schema, &json!({"query": "rust", "max_results": 3})).is_ok());
        assert!(validate_args(&schema, &json!({"query": "rust", "max_results": null})).is_ok());
        assert!(validate_args(&schema, &json!({"query": "rust", "extra": 1})).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let err = validate_args(&search_schema(), &json!({"max_results": 3})).unwrap_err();
        assert_eq!(err, "missing required field 'query'");

        let err = validate_args(&search_schema(), &json!({"query": null})).unwrap_err();
        assert_eq!(err, "missing required field 'query'");
    }

    #[test]
    fn test_wrong_types() {
        let err = validate_args(&search_schema(), &json!({"query": 42})).unwrap_err();
        assert_eq!(err, "field 'query' must be string, got integer");

        let err =
            validate_args(&search_schema(), &json!({"query": "x", "max_results": 2.5})).unwrap_err();
        assert!(err.contains("must be integer"));

        let err = validate_args(&search_schema(), &json!("just a string")).unwrap_err();
        assert_eq!(err, "expected object, got string");
    }

    #[test]
    fn test_enum_and_bounds() {
        let schema = search_schema();
        assert!(validate_args(&schema, &json!({"query": "x", "region": "de-de"})).is_err());
        assert!(validate_args(&schema, &json!({"query": "x", "max_results": 0})).is_err());
        assert!(validate_args(&schema, &json!({"query": "x", "max_results": 21})).is_err());
    }

    #[test]
    fn test_type_lists_and_closed_objects() {
        let schema = json!({
            "type": "object",
            "properties": { "limit": { "type": ["integer", "null"] } },
            "additionalProperties": false
        });
        assert!(validate_args(&schema, &json!({"limit": 5})).is_ok());
        assert!(validate_args(&schema, &json!({"limit": "5"})).is_err());
        assert_eq!(
            validate_args(&schema, &json!({"other": 1})).unwrap_err(),
            "unexpected field 'other'"
        );
    }
}
