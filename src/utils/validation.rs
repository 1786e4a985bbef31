// Validation utilities for request fields

use serde::{Deserialize, Deserializer};

/// Trim an optional field, collapsing blank input to `None`
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trim a tri-state field. `Some(None)` (explicit null) and blank strings both clear.
pub fn trim_nullable_field(field: Option<&Option<String>>) -> Option<Option<String>> {
    field.map(|inner| trim_optional_field(inner.as_ref()))
}

/// Deserializer for tri-state patch fields.
///
/// Paired with `#[serde(default)]`: an omitted key stays `None`, an explicit
/// `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Whether `value` parses as an absolute URL with a host
pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| parsed.has_host())
        .unwrap_or(false)
}

/// Length check in characters for a tri-state field; null and omission always pass
pub fn validate_nullable_length(
    field_name: &str,
    value: &Option<Option<String>>,
    max: usize,
) -> Result<(), String> {
    if let Some(Some(v)) = value {
        if v.chars().count() > max {
            return Err(format!(
                "{} must be at most {} characters",
                field_name, max
            ));
        }
    }
    Ok(())
}

/// URL check for a tri-state field; null and omission always pass
pub fn validate_nullable_url(field_name: &str, value: &Option<Option<String>>) -> Result<(), String> {
    if let Some(Some(v)) = value {
        if !is_absolute_url(v) {
            return Err(format!("{} must be a valid URL", field_name));
        }
    }
    Ok(())
}
