//! Declarative request body validation
//!
//! Rules address fields by dotted path into the JSON body. Every rule is
//! evaluated and all failures are reported together; once a field has failed
//! one rule, later rules on the same field are skipped.

use crate::core::error::{BackendError, FieldError, Result};
use crate::db::models::VehicleType;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

const MAX_EMAIL_LENGTH: usize = 254;

/// A single check applied to a field
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Present and not blank
    NotEmpty,
    /// Syntactically valid email address
    Email,
    /// At least this many characters
    MinLength(usize),
    /// A JSON number or a string holding one
    Numeric,
    /// A whole number between 1 and `u32::MAX`
    PositiveInteger,
    /// One of the listed strings
    OneOf(&'static [&'static str]),
}

/// Declarative validation rule
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub path: &'static str,
    pub check: Check,
    pub message: &'static str,
    /// Keep the submitted value out of the error report
    pub sensitive: bool,
}

impl FieldRule {
    pub const fn new(path: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            path,
            check,
            message,
            sensitive: false,
        }
    }

    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

const VEHICLE_TYPES: &[&str] = &["car", "bike", "truck", "van"];

/// Rules for `POST /captains/register`
pub const REGISTER_RULES: &[FieldRule] = &[
    FieldRule::new("fullname.firstname", Check::NotEmpty, "First name is required"),
    FieldRule::new("email", Check::Email, "Invalid email address"),
    FieldRule::new(
        "password",
        Check::MinLength(MIN_PASSWORD_LENGTH),
        "Password must be at least 6 characters long",
    )
    .sensitive(),
    FieldRule::new("vehicle.color", Check::NotEmpty, "Vehicle color is required"),
    FieldRule::new("vehicle.plate", Check::NotEmpty, "Vehicle plate is required"),
    FieldRule::new("vehicle.capacity", Check::Numeric, "Vehicle capacity must be a number"),
    FieldRule::new(
        "vehicle.capacity",
        Check::PositiveInteger,
        "Vehicle capacity must be at least 1",
    ),
    FieldRule::new("vehicle.type", Check::OneOf(VEHICLE_TYPES), "Invalid vehicle type"),
];

/// Rules for `POST /captains/login`
pub const LOGIN_RULES: &[FieldRule] = &[
    FieldRule::new("email", Check::Email, "Please enter a valid email address"),
    FieldRule::new(
        "password",
        Check::MinLength(MIN_PASSWORD_LENGTH),
        "Password must be at least 6 characters long",
    )
    .sensitive(),
];

/// Apply `rules` to `body`, failing with every field error found
pub fn validate(body: &Value, rules: &[FieldRule]) -> Result<()> {
    let mut failed: HashSet<&str> = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if failed.contains(rule.path) {
            continue;
        }

        let value = lookup(body, rule.path);
        if !passes(rule.check, value) {
            failed.insert(rule.path);
            let mut error = FieldError::new(rule.path, rule.message);
            if let (Some(v), false) = (value, rule.sensitive) {
                error = error.with_value(v.clone());
            }
            errors.push(error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BackendError::ValidationError(errors))
    }
}

/// Follow a dotted path into a JSON value
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(body, |node, key| node.get(key))
}

/// Scalar field as text: strings as-is, numbers and booleans formatted
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric field as a number, accepting numeric strings
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Numeric field as a positive `u32`
pub fn as_positive_integer(value: &Value) -> Option<u32> {
    as_number(value)
        .filter(|n| n.fract() == 0.0 && *n >= 1.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
}

/// Syntactic email check
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,63}$",
        )
        .expect("email pattern is valid")
    });

    email.len() <= MAX_EMAIL_LENGTH && re.is_match(email)
}

fn passes(check: Check, value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return false;
    };

    match check {
        Check::NotEmpty => as_text(value).is_some_and(|s| !s.trim().is_empty()),
        Check::Email => value.as_str().is_some_and(is_valid_email),
        Check::MinLength(min) => as_text(value).is_some_and(|s| s.chars().count() >= min),
        Check::Numeric => as_number(value).is_some(),
        Check::PositiveInteger => as_positive_integer(value).is_some(),
        Check::OneOf(options) => value.as_str().is_some_and(|s| options.contains(&s)),
    }
}

/// Vehicle type of an already-validated body
pub fn vehicle_type(value: &Value) -> Option<VehicleType> {
    value.as_str().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_registration() -> Value {
        json!({
            "fullname": {"firstname": "A", "lastname": "B"},
            "email": "a@b.com",
            "password": "secret1",
            "vehicle": {"color": "red", "plate": "XY1", "capacity": 4, "type": "car"}
        })
    }

    fn field_errors(result: Result<()>) -> Vec<FieldError> {
        match result {
            Err(BackendError::ValidationError(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate(&valid_registration(), REGISTER_RULES).is_ok());
    }

    #[test]
    fn test_vehicle_type_list_matches_enum() {
        let from_enum: Vec<&str> = VehicleType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(from_enum, VEHICLE_TYPES);
    }

    #[test]
    fn test_each_register_rule_reports_its_field() {
        let cases: Vec<(&str, Value, &str)> = vec![
            ("fullname.firstname", json!(""), "First name is required"),
            ("email", json!("not-an-email"), "Invalid email address"),
            ("password", json!("short"), "Password must be at least 6 characters long"),
            ("vehicle.color", json!("  "), "Vehicle color is required"),
            ("vehicle.plate", json!(""), "Vehicle plate is required"),
            ("vehicle.capacity", json!("four"), "Vehicle capacity must be a number"),
            ("vehicle.capacity", json!(0), "Vehicle capacity must be at least 1"),
            ("vehicle.capacity", json!(2.5), "Vehicle capacity must be at least 1"),
            ("vehicle.type", json!("boat"), "Invalid vehicle type"),
        ];

        for (path, bad_value, message) in cases {
            let mut body = valid_registration();
            let mut node = &mut body;
            let keys: Vec<&str> = path.split('.').collect();
            for key in &keys[..keys.len() - 1] {
                node = node.get_mut(*key).unwrap();
            }
            node[keys[keys.len() - 1]] = bad_value;

            let errors = field_errors(validate(&body, REGISTER_RULES));
            assert_eq!(errors.len(), 1, "case {}", path);
            assert_eq!(errors[0].field, path);
            assert_eq!(errors[0].message, message);
        }
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = field_errors(validate(&json!({}), REGISTER_RULES));
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(
            fields,
            vec![
                "fullname.firstname",
                "email",
                "password",
                "vehicle.color",
                "vehicle.plate",
                "vehicle.capacity",
                "vehicle.type",
            ]
        );
    }

    #[test]
    fn test_capacity_reports_one_error_per_field() {
        let mut body = valid_registration();
        body["vehicle"]["capacity"] = json!("many");

        let errors = field_errors(validate(&body, REGISTER_RULES));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Vehicle capacity must be a number");
    }

    #[test]
    fn test_numeric_string_capacity_accepted() {
        let mut body = valid_registration();
        body["vehicle"]["capacity"] = json!("4");
        assert!(validate(&body, REGISTER_RULES).is_ok());
    }

    #[test]
    fn test_password_value_not_echoed() {
        let errors = field_errors(validate(
            &json!({"email": "bad", "password": "abc"}),
            LOGIN_RULES,
        ));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].value, Some(json!("bad")));
        assert_eq!(errors[0].message, "Please enter a valid email address");
        assert_eq!(errors[1].field, "password");
        assert!(errors[1].value.is_none());
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a..b@c.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_lookup_paths() {
        let body = valid_registration();
        assert_eq!(lookup(&body, "vehicle.plate"), Some(&json!("XY1")));
        assert_eq!(lookup(&body, "vehicle.wheels"), None);
        assert_eq!(lookup(&json!([1, 2]), "email"), None);
    }
}
