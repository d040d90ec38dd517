//! Argument validation against a tool's parameter schema.
//!
//! Supports the JSON-schema subset the tool catalogue uses: `type`,
//! `required`, `properties` (recursive), `additionalProperties: false`.
//! An empty or non-object schema accepts anything.

use serde_json::Value;

/// Check `value` against `schema`, naming the offending field on failure.
pub fn validate_args(value: &Value, schema: &Value) -> Result<(), String> {
    validate_at(value, schema, "")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let Some(schema) = schema.as_object().filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        let matches = match expected {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            "null" => value.is_null(),
            _ => true,
        };
        if !matches {
            return Err(format!(
                "{}expected {expected}, got {}",
                field_prefix(path),
                json_type_name(value)
            ));
        }
    }

    let Some(object) = value.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                return Err(format!("missing required field '{}'", join(path, key)));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
        if let Some(unknown) = object
            .keys()
            .find(|key| !properties.is_some_and(|p| p.contains_key(*key)))
        {
            return Err(format!("unknown field '{}'", join(path, unknown)));
        }
    }

    if let Some(properties) = properties {
        for (key, prop_schema) in properties {
            if let Some(prop_value) = object.get(key) {
                validate_at(prop_value, prop_schema, &join(path, key))?;
            }
        }
    }

    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn field_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

fn json_type_name(value: &Value) -> &'static str {
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
