//! JSON Schema for the model's MVP plan response.
//!
//! The constraints here are the only place the pricing invariants are
//! written declaratively; `validate` enforces them on whatever comes back.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::plan::{ADDITIONAL_FEATURE_COST, BASE_FEATURE_COUNT, BASE_PACKAGE_COST};

pub const COST_PER_USER_PATTERN: &str = r"^\$\d+\.\d{2} - \$\d+\.\d{2}$";

static MVP_PLAN_SCHEMA: Lazy<Value> = Lazy::new(build);

pub fn mvp_plan_schema() -> &'static Value {
    &MVP_PLAN_SCHEMA
}

fn string_array() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn feature() -> Value {
    json!({
        "type": "object",
        "required": ["name", "description", "priority"],
        "properties": {
            "name": { "type": "string" },
            "description": { "type": "string" },
            "priority": { "type": "string", "enum": ["high", "medium", "low"] }
        }
    })
}

fn build() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "MVPPlan",
        "type": "object",
        "required": ["summary", "userCapabilities", "investment", "techStack", "timeline", "features"],
        "properties": {
            "summary": { "type": "string" },
            "userCapabilities": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 8,
                "maxItems": 12
            },
            "investment": {
                "type": "object",
                "required": ["developmentCost", "featureBreakdown", "costPerUser", "paymentTerms"],
                "properties": {
                    "developmentCost": { "type": "integer", "minimum": BASE_PACKAGE_COST },
                    "featureBreakdown": {
                        "type": "object",
                        "required": ["basePackage", "additionalFeatures"],
                        "properties": {
                            "basePackage": {
                                "type": "object",
                                "required": ["cost", "features"],
                                "properties": {
                                    "cost": { "type": "integer", "enum": [BASE_PACKAGE_COST] },
                                    "features": {
                                        "type": "array",
                                        "items": { "type": "string" },
                                        "minItems": BASE_FEATURE_COUNT,
                                        "maxItems": BASE_FEATURE_COUNT
                                    }
                                }
                            },
                            "additionalFeatures": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "required": ["name", "cost"],
                                    "properties": {
                                        "name": { "type": "string" },
                                        "cost": { "type": "integer", "enum": [ADDITIONAL_FEATURE_COST] }
                                    }
                                }
                            }
                        }
                    },
                    "costPerUser": { "type": "string", "pattern": COST_PER_USER_PATTERN },
                    "paymentTerms": { "type": "string" }
                }
            },
            "techStack": {
                "type": "object",
                "required": ["frontend", "backend", "database", "hosting"],
                "properties": {
                    "frontend": string_array(),
                    "backend": string_array(),
                    "database": string_array(),
                    "hosting": string_array(),
                    "other": string_array()
                }
            },
            "timeline": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["week", "milestone", "deliverables"],
                    "properties": {
                        "week": { "type": "integer", "minimum": 1 },
                        "milestone": { "type": "string" },
                        "deliverables": string_array()
                    }
                }
            },
            "features": {
                "type": "object",
                "required": ["core", "additional"],
                "properties": {
                    "core": {
                        "type": "array",
                        "items": feature(),
                        "minItems": BASE_FEATURE_COUNT,
                        "maxItems": BASE_FEATURE_COUNT
                    },
                    "additional": { "type": "array", "items": feature() }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::tests::sample_plan;

    #[test]
    fn base_package_cost_is_pinned() {
        let s = mvp_plan_schema();
        let cost = &s["properties"]["investment"]["properties"]["featureBreakdown"]["properties"]
            ["basePackage"]["properties"]["cost"]["enum"];
        assert_eq!(cost, &json!([10000]));
    }

    #[test]
    fn core_features_are_exactly_three() {
        let core = &mvp_plan_schema()["properties"]["features"]["properties"]["core"];
        assert_eq!(core["minItems"], 3);
        assert_eq!(core["maxItems"], 3);
    }

    #[test]
    fn capabilities_and_costs_are_bounded() {
        let p = &mvp_plan_schema()["properties"];
        assert_eq!(p["userCapabilities"]["minItems"], 8);
        assert_eq!(p["userCapabilities"]["maxItems"], 12);
        let inv = &p["investment"]["properties"];
        assert_eq!(inv["developmentCost"]["minimum"], 10000);
        assert_eq!(
            inv["featureBreakdown"]["properties"]["additionalFeatures"]["items"]["properties"]["cost"]["enum"],
            json!([3333])
        );
        assert_eq!(inv["costPerUser"]["pattern"], COST_PER_USER_PATTERN);
    }

    /// Every object in the schema lists exactly the keys the serde model
    /// emits for a fully populated plan, and requires only keys it emits.
    fn assert_matches_model(schema: &Value, value: &Value, path: &str) {
        match value {
            Value::Object(obj) => {
                let props = schema["properties"].as_object().unwrap_or_else(|| panic!("{path}: no properties"));
                let mut declared: Vec<&String> = props.keys().collect();
                let mut emitted: Vec<&String> = obj.keys().collect();
                declared.sort();
                emitted.sort();
                assert_eq!(declared, emitted, "{path}: schema and model keys differ");
                for key in schema["required"].as_array().into_iter().flatten() {
                    let key = key.as_str().unwrap();
                    assert!(obj.contains_key(key), "{path}: required \"{key}\" is not in the model");
                }
                for (key, v) in obj {
                    assert_matches_model(&props[key], v, &format!("{path}/{key}"));
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    assert_matches_model(&schema["items"], item, &format!("{path}/{i}"));
                }
            }
            _ => {}
        }
    }

    #[test]
    fn schema_agrees_with_wire_model() {
        let plan = serde_json::to_value(sample_plan()).unwrap();
        assert_matches_model(mvp_plan_schema(), &plan, "");
    }

    #[test]
    fn standard_validator_round_trip() {
        let validator = jsonschema::validator_for(mvp_plan_schema()).unwrap();
        let plan = serde_json::to_value(sample_plan()).unwrap();
        assert!(validator.is_valid(&plan));

        let mut two = plan.clone();
        two["features"]["core"].as_array_mut().unwrap().pop();
        assert!(!validator.is_valid(&two));

        let mut four = plan.clone();
        let extra = four["features"]["core"][0].clone();
        four["features"]["core"].as_array_mut().unwrap().push(extra);
        assert!(!validator.is_valid(&four));

        let mut cost = plan.clone();
        cost["investment"]["featureBreakdown"]["basePackage"]["cost"] = json!(9999);
        assert!(!validator.is_valid(&cost));
    }

    #[test]
    fn standard_and_local_validators_agree() {
        let validator = jsonschema::validator_for(mvp_plan_schema()).unwrap();
        let base = serde_json::to_value(sample_plan()).unwrap();
        let edits: Vec<(&str, Value)> = vec![
            ("/investment/featureBreakdown/basePackage/cost", json!(10000.0)),
            ("/timeline/0/week", json!(1.0)),
            ("/timeline/0/week", json!(1.5)),
            ("/investment/costPerUser", json!("$1 - $2")),
            ("/investment/developmentCost", json!(9000)),
            ("/features/core/0/priority", json!("urgent")),
            ("/userCapabilities", json!(["one"])),
            ("/techStack/hosting", json!("Vercel")),
        ];
        for (pointer, replacement) in edits {
            let mut v = base.clone();
            *v.pointer_mut(pointer).unwrap() = replacement.clone();
            let local_ok = crate::validate::validate(mvp_plan_schema(), &v).is_empty();
            assert_eq!(local_ok, validator.is_valid(&v), "{pointer} = {replacement}");
        }
    }

    #[test]
    fn cost_per_user_pattern_matches_range() {
        let re = regex::Regex::new(COST_PER_USER_PATTERN).unwrap();
        assert!(re.is_match("$0.10 - $0.25"));
        assert!(re.is_match("$12.00 - $140.50"));
        assert!(!re.is_match("$0.1 - $0.25"));
        assert!(!re.is_match("0.10 - 0.25"));
    }
}
