//! Triage request validation.
//!
//! Collects every problem in the body instead of stopping at the first,
//! so clients can fix a submission in one round trip.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::models::{Language, SymptomDuration, SymptomText, TriageLocation, TriageRequest};

pub const SYMPTOM_TEXT_MIN_CHARS: usize = 3;
pub const SYMPTOM_TEXT_MAX_CHARS: usize = 500;
pub const SYMPTOM_LIST_MAX_ITEMS: usize = 10;
pub const SYMPTOM_PHRASE_MAX_CHARS: usize = 100;
pub const LOCATION_FIELD_MAX_CHARS: usize = 100;

const REQUEST_FIELDS: &[&str] = &["symptoms", "duration", "language", "location"];
const LOCATION_FIELDS: &[&str] = &["camp", "region", "country"];

/// Validate a raw triage body, applying defaults for omitted fields.
pub fn validate_triage_request(body: &Value) -> Result<TriageRequest, Vec<String>> {
    let Some(fields) = body.as_object() else {
        return Err(vec!["request body must be a JSON object".to_string()]);
    };

    let mut errors = Vec::new();
    reject_unknown_fields(fields, REQUEST_FIELDS, "", &mut errors);

    let symptoms = validate_symptoms(fields.get("symptoms"), &mut errors);
    let duration = validate_enum::<SymptomDuration>(
        fields.get("duration"),
        "duration",
        SymptomDuration::variants(),
        &mut errors,
    );
    let language = validate_enum::<Language>(
        fields.get("language"),
        "language",
        Language::variants(),
        &mut errors,
    );
    let location = validate_location(fields.get("location"), &mut errors);

    match symptoms {
        Some(symptoms) if errors.is_empty() => Ok(TriageRequest {
            symptoms,
            duration: duration.unwrap_or_default(),
            language: language.unwrap_or_default(),
            location,
        }),
        _ => Err(errors),
    }
}

fn reject_unknown_fields(
    fields: &Map<String, Value>,
    allowed: &[&str],
    prefix: &str,
    errors: &mut Vec<String>,
) {
    for key in fields.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("\"{prefix}{key}\" is not allowed"));
        }
    }
}

fn validate_symptoms(value: Option<&Value>, errors: &mut Vec<String>) -> Option<SymptomText> {
    match value {
        None | Some(Value::Null) => {
            errors.push("\"symptoms\" is required".to_string());
            None
        }
        Some(Value::String(text)) => {
            let len = text.chars().count();
            if len < SYMPTOM_TEXT_MIN_CHARS {
                errors.push(format!(
                    "\"symptoms\" length must be at least {SYMPTOM_TEXT_MIN_CHARS} characters long"
                ));
                None
            } else if len > SYMPTOM_TEXT_MAX_CHARS {
                errors.push(format!(
                    "\"symptoms\" length must be less than or equal to {SYMPTOM_TEXT_MAX_CHARS} characters long"
                ));
                None
            } else {
                Some(SymptomText::Single(text.clone()))
            }
        }
        Some(Value::Array(items)) => validate_symptom_list(items, errors),
        Some(_) => {
            errors.push("\"symptoms\" must be a string or an array of strings".to_string());
            None
        }
    }
}

fn validate_symptom_list(items: &[Value], errors: &mut Vec<String>) -> Option<SymptomText> {
    let before = errors.len();

    if items.is_empty() {
        errors.push("\"symptoms\" must contain at least 1 items".to_string());
    }
    if items.len() > SYMPTOM_LIST_MAX_ITEMS {
        errors.push(format!(
            "\"symptoms\" must contain less than or equal to {SYMPTOM_LIST_MAX_ITEMS} items"
        ));
    }

    let mut phrases = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(phrase) => {
                let len = phrase.chars().count();
                if len == 0 {
                    errors.push(format!("\"symptoms[{i}]\" is not allowed to be empty"));
                } else if len > SYMPTOM_PHRASE_MAX_CHARS {
                    errors.push(format!(
                        "\"symptoms[{i}]\" length must be less than or equal to {SYMPTOM_PHRASE_MAX_CHARS} characters long"
                    ));
                } else {
                    phrases.push(phrase.to_string());
                }
            }
            None => errors.push(format!("\"symptoms[{i}]\" must be a string")),
        }
    }

    (errors.len() == before).then_some(SymptomText::List(phrases))
}

fn validate_enum<T: FromStr>(
    value: Option<&Value>,
    field: &str,
    allowed: &[&str],
    errors: &mut Vec<String>,
) -> Option<T> {
    let value = value?;
    match value.as_str().and_then(|s| T::from_str(s).ok()) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(format!(
                "\"{field}\" must be one of [{}]",
                allowed.join(", ")
            ));
            None
        }
    }
}

fn validate_location(value: Option<&Value>, errors: &mut Vec<String>) -> Option<TriageLocation> {
    let value = value?;
    let Some(fields) = value.as_object() else {
        errors.push("\"location\" must be of type object".to_string());
        return None;
    };

    reject_unknown_fields(fields, LOCATION_FIELDS, "location.", errors);

    let mut field = |name: &str| -> Option<String> {
        match fields.get(name) {
            None => None,
            Some(Value::String(s)) => check_location_field(name, s, errors),
            Some(_) => {
                errors.push(format!("\"location.{name}\" must be a string"));
                None
            }
        }
    };

    Some(TriageLocation {
        camp: field("camp"),
        region: field("region"),
        country: field("country"),
    })
}

fn check_location_field(name: &str, value: &str, errors: &mut Vec<String>) -> Option<String> {
    let len = value.chars().count();
    if len == 0 {
        errors.push(format!("\"location.{name}\" is not allowed to be empty"));
        None
    } else if len > LOCATION_FIELD_MAX_CHARS {
        errors.push(format!(
            "\"location.{name}\" length must be less than or equal to {LOCATION_FIELD_MAX_CHARS} characters long"
        ));
        None
    } else {
        Some(value.to_string())
    }
}

/// Validate a location used as a lookup filter. `None` when no field is set.
pub fn validate_location_filter(
    location: &TriageLocation,
) -> Result<Option<TriageLocation>, Vec<String>> {
    let mut errors = Vec::new();
    let mut field = |name: &str, value: &Option<String>| {
        value
            .as_deref()
            .and_then(|v| check_location_field(name, v, &mut errors))
    };
    let checked = TriageLocation {
        camp: field("camp", &location.camp),
        region: field("region", &location.region),
        country: field("country", &location.country),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(checked.is_set().then_some(checked))
}
