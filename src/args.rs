//! Untyped argument coercion for job files and other dynamic callers.
//!
//! A missing or `null` argument and an argument of the wrong JSON kind are
//! type errors; range checks are left to the typed setters and placements.

use serde_json::Value;

use crate::{
    anchor::Anchor,
    foundation::error::{WatermarkError, WatermarkResult},
};

fn present<'a>(name: &str, value: Option<&'a Value>) -> WatermarkResult<&'a Value> {
    match value {
        None | Some(Value::Null) => Err(WatermarkError::type_error(format!(
            "{name} must be provided"
        ))),
        Some(v) => Ok(v),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a float",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn as_int(name: &str, value: &Value) -> WatermarkResult<i64> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }
    if value.is_u64() {
        return Err(WatermarkError::value(format!("{name} is out of range")));
    }
    Err(WatermarkError::type_error(format!(
        "{name} must be an integer, got {}",
        kind(value)
    )))
}

pub fn require_str<'a>(name: &str, value: Option<&'a Value>) -> WatermarkResult<&'a str> {
    let v = present(name, value)?;
    v.as_str().ok_or_else(|| {
        WatermarkError::type_error(format!("{name} must be a string, got {}", kind(v)))
    })
}

pub fn require_int(name: &str, value: Option<&Value>) -> WatermarkResult<i64> {
    as_int(name, present(name, value)?)
}

/// `None` and `null` mean "use the default"; anything else must be an integer.
pub fn optional_int(name: &str, value: Option<&Value>) -> WatermarkResult<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_int(name, v).map(Some),
    }
}

pub fn require_bool(name: &str, value: Option<&Value>) -> WatermarkResult<bool> {
    let v = present(name, value)?;
    v.as_bool().ok_or_else(|| {
        WatermarkError::type_error(format!("{name} must be a boolean, got {}", kind(v)))
    })
}

/// Every element must be an integer; the length is not checked here.
pub fn require_int_list(name: &str, value: Option<&Value>) -> WatermarkResult<Vec<i64>> {
    let v = present(name, value)?;
    let items = v.as_array().ok_or_else(|| {
        WatermarkError::type_error(format!("{name} must be an array, got {}", kind(v)))
    })?;
    items
        .iter()
        .map(|item| as_int(&format!("each {name} value"), item))
        .collect()
}

/// Anchors are referenced by name only. Arrays of fractions and unknown names
/// are not anchors.
pub fn anchor(name: &str, value: Option<&Value>) -> WatermarkResult<Option<Anchor>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Anchor::from_name(s).map(Some).ok_or_else(|| {
            WatermarkError::type_error(format!("'{s}' is not a known {name} value"))
        }),
        Some(v) => Err(WatermarkError::type_error(format!(
            "only named {name} values are valid, got {}",
            kind(v)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_null_are_type_errors() {
        assert!(require_int("size", None).unwrap_err().is_type_error());
        assert!(require_int("size", Some(&Value::Null)).unwrap_err().is_type_error());
        assert!(require_str("font", None).unwrap_err().is_type_error());
        assert!(require_bool("mirror", None).unwrap_err().is_type_error());
        assert!(require_int_list("colour", None).unwrap_err().is_type_error());
    }

    #[test]
    fn missing_message_names_the_argument() {
        let err = require_int("size", None).unwrap_err();
        assert_eq!(err.to_string(), "type error: size must be provided");
    }

    #[test]
    fn wrong_kinds_are_type_errors() {
        assert!(require_int("size", Some(&json!("big"))).unwrap_err().is_type_error());
        assert!(require_int("size", Some(&json!(2.5))).unwrap_err().is_type_error());
        assert!(require_str("font", Some(&json!(2017))).unwrap_err().is_type_error());
        assert!(require_bool("mirror", Some(&json!(1))).unwrap_err().is_type_error());
        assert!(
            require_int_list("colour", Some(&json!("red")))
                .unwrap_err()
                .is_type_error()
        );
        assert!(
            require_int_list("colour", Some(&json!([255, "x", 0])))
                .unwrap_err()
                .is_type_error()
        );
    }

    #[test]
    fn integers_outside_i64_are_value_errors() {
        let huge = json!(u64::MAX);
        assert!(require_int("margin", Some(&huge)).unwrap_err().is_value_error());
    }

    #[test]
    fn well_formed_values_pass_through() {
        assert_eq!(require_int("x", Some(&json!(-7))).unwrap(), -7);
        assert_eq!(require_str("font", Some(&json!(" a "))).unwrap(), " a ");
        assert!(require_bool("mirror", Some(&json!(true))).unwrap());
        assert_eq!(
            require_int_list("colour", Some(&json!([1, 2, 3, 4]))).unwrap(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(optional_int("start", None).unwrap(), None);
        assert_eq!(optional_int("start", Some(&json!(5))).unwrap(), Some(5));
        assert!(optional_int("start", Some(&json!("5"))).unwrap_err().is_type_error());
    }

    #[test]
    fn anchors_resolve_by_name_only() {
        use crate::anchor::Corner;

        assert_eq!(
            anchor("corner", Some(&json!("top_left"))).unwrap(),
            Some(Anchor::Corner(Corner::TopLeft))
        );
        assert_eq!(anchor("corner", None).unwrap(), None);
        assert!(anchor("corner", Some(&json!([0, 0]))).unwrap_err().is_type_error());
        assert!(anchor("corner", Some(&json!("middle"))).unwrap_err().is_type_error());
    }
}
