//! Helpers for raw scraped records.
//!
//! The registrar APIs are inconsistent about whether numeric fields are sent as
//! JSON strings or numbers, so raw structs read both into a `String` and the
//! record constructors parse them with field-named errors.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{ZjuicalError, ZjuicalResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

pub(crate) fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

/// Parse a raw field, naming the field in the error.
pub(crate) fn parse_field<T: FromStr>(field: &'static str, value: &str) -> ZjuicalResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ZjuicalError::field(field, format!("cannot parse '{}'", value)))
}

/// First `n` characters of a raw code (class ids are prefixes of longer codes).
pub(crate) fn truncate_chars(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

/// Non-empty, trimmed value of an optional raw field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "lenient_string")]
        value: String,
        #[serde(default, deserialize_with = "lenient_opt_string")]
        extra: Option<String>,
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let probe: Probe = serde_json::from_value(json!({ "value": "3" })).unwrap();
        assert_eq!(probe.value, "3");
        assert_eq!(probe.extra, None);

        let probe: Probe = serde_json::from_value(json!({ "value": 3, "extra": 2.5 })).unwrap();
        assert_eq!(probe.value, "3");
        assert_eq!(probe.extra.as_deref(), Some("2.5"));

        let probe: Probe = serde_json::from_value(json!({ "value": "x", "extra": null })).unwrap();
        assert_eq!(probe.extra, None);
    }

    #[test]
    fn parse_field_names_the_field() {
        assert_eq!(parse_field::<u32>("xqj", " 3 ").unwrap(), 3);
        let err = parse_field::<u32>("xqj", "three").unwrap_err();
        assert!(err.to_string().contains("xqj"), "got: {}", err);
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("(2024-2025-1)-CS101", 5), "(2024");
        assert_eq!(truncate_chars("课程", 7), "课程");
    }
}
