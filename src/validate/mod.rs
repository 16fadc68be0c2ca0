use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::PlannerError;
use crate::schema::mvp_plan_schema;
use crate::wire::MvpPlan;

/// One failed constraint, located by a JSON-pointer style path.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Validate `instance` against `schema`.
///
/// Supports the keywords the MVP plan schema uses: `type`, `required`,
/// `properties`, `items`, `minItems`, `maxItems`, `enum`, `minimum`,
/// `maximum` and `pattern`. Unknown keywords are ignored.
pub fn validate(schema: &Value, instance: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    check(schema, instance, String::new(), &mut out);
    out
}

/// Validate a raw model response against the MVP plan schema and decode it.
pub fn validate_plan(value: &Value) -> Result<MvpPlan, PlannerError> {
    let violations = validate(mvp_plan_schema(), value);
    if !violations.is_empty() {
        return Err(PlannerError::Validation(violations));
    }
    let mut value = value.clone();
    integral_floats_to_ints(&mut value);
    serde_json::from_value(value).map_err(|e| PlannerError::Schema(e.to_string()))
}

/// `10000.0` is a valid JSON-Schema integer but serde refuses it for `u64`
/// fields, so whole floats are rewritten as integers before decoding.
fn integral_floats_to_ints(v: &mut Value) {
    match v {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) {
                if f >= 0.0 && f <= u64::MAX as f64 {
                    *v = Value::from(f as u64);
                } else if f < 0.0 && f >= i64::MIN as f64 {
                    *v = Value::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_ints),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_ints),
        _ => {}
    }
}

fn push(out: &mut Vec<Violation>, path: &str, message: String) {
    out.push(Violation { path: path.to_string(), message });
}

fn check(schema: &Value, instance: &Value, path: String, out: &mut Vec<Violation>) {
    let Some(s) = schema.as_object() else { return };

    if let Some(ty) = s.get("type").and_then(Value::as_str) {
        if !type_matches(ty, instance) {
            push(out, &path, format!("expected {}, found {}", ty, type_name(instance)));
            // Nested keywords are meaningless once the type is wrong.
            return;
        }
    }

    if let Some(allowed) = s.get("enum").and_then(Value::as_array) {
        if !allowed.iter().any(|a| json_eq(a, instance)) {
            push(out, &path, format!("{} is not one of {}", instance, Value::Array(allowed.clone())));
        }
    }

    if let Some(n) = instance.as_f64() {
        if let Some(min) = s.get("minimum").and_then(Value::as_f64) {
            if n < min {
                push(out, &path, format!("{} is less than minimum {}", instance, min));
            }
        }
        if let Some(max) = s.get("maximum").and_then(Value::as_f64) {
            if n > max {
                push(out, &path, format!("{} is greater than maximum {}", instance, max));
            }
        }
    }

    if let (Some(text), Some(pattern)) = (instance.as_str(), s.get("pattern").and_then(Value::as_str)) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(text) => {
                push(out, &path, format!("\"{}\" does not match pattern {}", text, pattern))
            }
            Ok(_) => {}
            Err(e) => push(out, &path, format!("invalid pattern {}: {}", pattern, e)),
        }
    }

    if let Some(items) = instance.as_array() {
        check_array(s, items, &path, out);
    }

    if let Some(obj) = instance.as_object() {
        check_object(s, obj, &path, out);
    }
}

fn check_array(s: &Map<String, Value>, items: &[Value], path: &str, out: &mut Vec<Violation>) {
    let len = items.len() as u64;
    if let Some(min) = s.get("minItems").and_then(Value::as_u64) {
        if len < min {
            push(out, path, format!("expected at least {} items, found {}", min, len));
        }
    }
    if let Some(max) = s.get("maxItems").and_then(Value::as_u64) {
        if len > max {
            push(out, path, format!("expected at most {} items, found {}", max, len));
        }
    }
    if let Some(item_schema) = s.get("items") {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, format!("{}/{}", path, i), out);
        }
    }
}

fn check_object(s: &Map<String, Value>, obj: &Map<String, Value>, path: &str, out: &mut Vec<Violation>) {
    if let Some(required) = s.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                push(out, path, format!("missing required property \"{}\"", key));
            }
        }
    }
    if let Some(props) = s.get("properties").and_then(Value::as_object) {
        for (key, sub) in props {
            if let Some(v) = obj.get(key) {
                check(sub, v, format!("{}/{}", path, key), out);
            }
        }
    }
}

fn type_matches(ty: &str, v: &Value) -> bool {
    match ty {
        "object" => v.is_object(),
        "array" => v.is_array(),
        "string" => v.is_string(),
        "boolean" => v.is_boolean(),
        "null" => v.is_null(),
        "number" => v.is_number(),
        "integer" => v.is_i64() || v.is_u64() || v.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false),
        _ => true,
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numbers compare by value so `10000` and `10000.0` are the same enum member.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
